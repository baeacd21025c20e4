use criterion::{
    black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput,
};
use mimic_engine::filter::{ArgumentFilter, ArgumentFilters, ANY};
use mimic_engine::{Behavior, MemberKey, MemberTable, Mock, Parameter, ReturnType, TypeTag, Value};

fn member() -> MemberKey {
    MemberKey::method(
        "lookup",
        vec![Parameter::new(TypeTag::Int), Parameter::new(TypeTag::Str)],
    )
}

/// Specification `i` matches `(i, <anything>)`; specification 0 is a catch-all.
fn build_mock(count: usize) -> Mock {
    let mock = Mock::new();
    mock.register(member(), ArgumentFilters::any(2), Behavior::returns(-1))
        .unwrap();
    for i in 1..count {
        mock.register(
            member(),
            ArgumentFilters::new(vec![ArgumentFilter::equals(i as i64), ANY]),
            Behavior::returns(i as i64),
        )
        .unwrap();
    }
    mock
}

fn args(key: i64) -> Vec<Value> {
    vec![Value::Int(key), Value::from("k")]
}

fn bench_dispatch(c: &mut Criterion) {
    let mut group = c.benchmark_group("dispatch");
    let returns = ReturnType::Of(TypeTag::Int);

    for count in [10, 100, 500].iter() {
        // Newest specification (best case)
        let newest = args(*count as i64 - 1);
        // Only the catch-all matches (worst case)
        let fallback = args(-5);

        group.throughput(Throughput::Elements(1));
        group.bench_with_input(BenchmarkId::new("match_newest", count), count, |b, &n| {
            b.iter_batched_ref(
                || build_mock(n),
                |mock| mock.dispatch(black_box(&member()), &returns, black_box(&newest)),
                BatchSize::LargeInput,
            );
        });
        group.bench_with_input(BenchmarkId::new("match_oldest", count), count, |b, &n| {
            b.iter_batched_ref(
                || build_mock(n),
                |mock| mock.dispatch(black_box(&member()), &returns, black_box(&fallback)),
                BatchSize::LargeInput,
            );
        });
    }

    group.finish();
}

fn bench_explain(c: &mut Criterion) {
    let mut group = c.benchmark_group("explain");

    for count in [10, 100, 500].iter() {
        let mock = build_mock(*count);
        let middle = args(*count as i64 / 2);

        group.throughput(Throughput::Elements(1));
        group.bench_with_input(BenchmarkId::new("middle", count), count, |b, _| {
            b.iter(|| mock.explain(black_box(&member()), black_box(&middle)));
        });
    }

    group.finish();
}

fn bench_filter_matching(c: &mut Criterion) {
    let mut group = c.benchmark_group("filter_matching");

    let simple = ArgumentFilters::new(vec![ArgumentFilter::equals(42), ANY]);
    let regex = ArgumentFilters::new(vec![
        ArgumentFilter::one_of([1, 2, 42]),
        ArgumentFilter::regex(r"^k\d*$").unwrap(),
    ]);
    let call = args(42);

    group.throughput(Throughput::Elements(1));
    group.bench_function("equals_any", |b| {
        b.iter(|| simple.matches(black_box(&call)));
    });
    group.bench_function("one_of_regex", |b| {
        b.iter(|| regex.matches(black_box(&call)));
    });

    group.finish();
}

fn bench_parse_pattern(c: &mut Criterion) {
    let mut table = MemberTable::new();
    table.declare_method(
        "lookup",
        vec![Parameter::new(TypeTag::Int), Parameter::new(TypeTag::Str)],
        ReturnType::Of(TypeTag::Int),
    );

    c.bench_function("parse_and_extract", |b| {
        b.iter(|| {
            let pattern = mimic_engine::parse_pattern(
                black_box(r#"lookup(IsInRange(1, 10), IsMatch("^k"))"#),
                &table,
            )
            .unwrap();
            mimic_engine::extract(&pattern).unwrap()
        });
    });
}

criterion_group!(
    benches,
    bench_dispatch,
    bench_explain,
    bench_filter_matching,
    bench_parse_pattern
);
criterion_main!(benches);

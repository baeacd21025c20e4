//! Tests for the registry module.
//!
//! Covers:
//! - Precedence of overlapping specifications
//! - Defaults and logging of unmatched calls
//! - Behaviors (throw, invoke, sequence) as seen through dispatch
//! - Explain reports and concurrent use

use super::*;
use crate::behavior::{Behavior, Fault};
use crate::config::MockOptions;
use crate::filter::{ArgumentFilter, ArgumentFilters, ANY};
use crate::member::{MemberKey, Parameter, ReturnType};
use crate::pattern::{arg, PatternExpr};
use crate::value::{TypeTag, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing_test::traced_test;

fn square() -> MemberKey {
    MemberKey::method("square", vec![Parameter::new(TypeTag::Int)])
}

fn int() -> ReturnType {
    ReturnType::Of(TypeTag::Int)
}

#[test]
fn test_later_specification_wins_where_it_overlaps() {
    let mock = Mock::new();
    mock.register(square(), ArgumentFilters::new(vec![ANY]), Behavior::returns(1))
        .unwrap();
    mock.register(
        square(),
        ArgumentFilters::new(vec![ArgumentFilter::equals(5)]),
        Behavior::returns(2),
    )
    .unwrap();

    assert_eq!(mock.dispatch(&square(), &int(), &[5.into()]), Ok(Value::Int(2)));
    assert_eq!(mock.dispatch(&square(), &int(), &[7.into()]), Ok(Value::Int(1)));
}

#[test]
fn test_catch_all_registered_last_shadows_everything() {
    let mock = Mock::new();
    mock.register(
        square(),
        ArgumentFilters::new(vec![ArgumentFilter::equals(5)]),
        Behavior::returns(2),
    )
    .unwrap();
    mock.register(square(), ArgumentFilters::any(1), Behavior::returns(1))
        .unwrap();

    assert_eq!(mock.dispatch(&square(), &int(), &[5.into()]), Ok(Value::Int(1)));
}

#[test]
fn test_register_rejects_wrong_arity() {
    let mock = Mock::new();
    let err = mock
        .register(square(), ArgumentFilters::any(2), Behavior::returns(1))
        .unwrap_err();
    assert!(matches!(
        err,
        crate::error::ExtractionError::ArityMismatch {
            expected: 1,
            actual: 2,
            ..
        }
    ));
    assert_eq!(mock.specification_count(&square()), 0);
}

#[test]
fn test_register_returns_increasing_sequence_numbers() {
    let mock = Mock::new();
    let name = MemberKey::getter("Name");
    assert_eq!(
        mock.register(square(), ArgumentFilters::any(1), Behavior::returns(1)),
        Ok(0)
    );
    assert_eq!(
        mock.register(name.clone(), ArgumentFilters::any(0), Behavior::returns("x")),
        Ok(1)
    );
    assert_eq!(mock.specification_count(&square()), 1);
    assert_eq!(mock.specification_count(&name), 1);
}

#[test]
fn test_unconfigured_member_returns_default_and_logs_each_call() {
    let mock = Mock::new();
    let void = MemberKey::method("reset", vec![]);

    assert_eq!(mock.dispatch(&square(), &int(), &[3.into()]), Ok(Value::Int(0)));
    assert_eq!(
        mock.dispatch(&square(), &ReturnType::Of(TypeTag::Str), &[3.into()]),
        Ok(Value::Null)
    );
    assert_eq!(mock.dispatch(&void, &ReturnType::Void, &[]), Ok(Value::Unit));

    let log = mock.invocations();
    assert_eq!(log.len(), 3);
    assert!(log.iter().all(|r| r.matched.is_none()));
    assert_eq!(
        log.iter().map(|r| r.sequence).collect::<Vec<_>>(),
        vec![0, 1, 2]
    );
    assert_eq!(mock.invocations_of(&square()).len(), 2);
}

#[test]
fn test_dispatch_is_repeatable() {
    let mock = Mock::new();
    mock.register(square(), ArgumentFilters::any(1), Behavior::returns_with(|args| {
        let n = args[0].as_int().unwrap_or_default();
        Value::Int(n * n)
    }))
    .unwrap();

    for expected_len in 1..=3 {
        assert_eq!(mock.dispatch(&square(), &int(), &[4.into()]), Ok(Value::Int(16)));
        assert_eq!(mock.invocation_count(), expected_len);
    }
}

#[test]
fn test_throwing_behavior_still_records_the_call() {
    let mock = Mock::new();
    mock.register(
        square(),
        ArgumentFilters::any(1),
        Behavior::throws(Fault::new("Overflow", "too big")),
    )
    .unwrap();

    let fault = mock.dispatch(&square(), &int(), &[1.into()]).unwrap_err();
    assert_eq!(fault.kind, "Overflow");

    let log = mock.invocations();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].matched_sequence(), Some(0));
    assert_eq!(log[0].describe(), "square(1)");
}

#[test]
fn test_invoke_callback_can_reenter_the_mock() {
    let mock = Arc::new(Mock::new());
    let seen = Arc::new(AtomicUsize::new(0));

    let inner = Arc::clone(&mock);
    let counter = Arc::clone(&seen);
    mock.register(
        square(),
        ArgumentFilters::new(vec![ArgumentFilter::equals(1)]),
        Behavior::invoke(move |_| {
            // Nested call is logged while the outer behavior runs.
            let nested = inner.dispatch(&square(), &ReturnType::Of(TypeTag::Int), &[2.into()]);
            assert_eq!(nested, Ok(Value::Int(0)));
            counter.store(inner.invocation_count(), Ordering::SeqCst);
        }),
    )
    .unwrap();

    assert_eq!(mock.dispatch(&square(), &int(), &[1.into()]), Ok(Value::Int(0)));
    assert_eq!(seen.load(Ordering::SeqCst), 2);

    let log = mock.invocations();
    assert_eq!(log[0].arguments, vec![Value::Int(1)]);
    assert_eq!(log[1].arguments, vec![Value::Int(2)]);
}

#[test]
fn test_sequence_advances_per_match_and_repeats_last_step() {
    let mock = Mock::new();
    let name = MemberKey::getter("Name");
    let text = ReturnType::Of(TypeTag::Str);
    mock.register(
        name.clone(),
        ArgumentFilters::any(0),
        Behavior::sequence(vec![
            Behavior::returns("a"),
            Behavior::throws(Fault::new("Gone", "")),
            Behavior::returns("c"),
        ]),
    )
    .unwrap();

    assert_eq!(mock.dispatch(&name, &text, &[]), Ok(Value::from("a")));
    assert!(mock.dispatch(&name, &text, &[]).is_err());
    assert_eq!(mock.dispatch(&name, &text, &[]), Ok(Value::from("c")));
    assert_eq!(mock.dispatch(&name, &text, &[]), Ok(Value::from("c")));
}

#[test]
fn test_when_extracts_and_registers() {
    let mock = Mock::new();
    let pattern = PatternExpr::call(square(), vec![arg::is_greater_than(10)]);
    mock.when(&pattern, Behavior::returns(100)).unwrap();

    assert_eq!(mock.dispatch(&square(), &int(), &[11.into()]), Ok(Value::Int(100)));
    assert_eq!(mock.dispatch(&square(), &int(), &[10.into()]), Ok(Value::Int(0)));

    let nested = PatternExpr::array(vec![pattern]);
    assert!(mock.when(&nested, Behavior::returns(1)).is_err());
    assert_eq!(mock.specification_count(&square()), 1);
}

#[test]
fn test_explain_reports_candidates_without_logging() {
    let mock = Mock::new();
    mock.register(square(), ArgumentFilters::any(1), Behavior::returns(1))
        .unwrap();
    mock.register(
        square(),
        ArgumentFilters::new(vec![ArgumentFilter::equals(5)]),
        Behavior::returns(2),
    )
    .unwrap();

    let report = mock.explain(&square(), &[7.into()]);
    assert!(report.matched);
    assert_eq!(report.matched_sequence, Some(0));
    assert_eq!(report.candidates.len(), 2);
    assert_eq!(report.candidates[0].sequence, 1);
    assert!(!report.candidates[0].matches);
    assert_eq!(report.candidates[0].first_mismatch, Some(0));
    assert!(report.candidates[1].matches);
    assert_eq!(mock.invocation_count(), 0);

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["matchedSequence"], 0);
    assert_eq!(json["member"], "square(int)");
}

#[test]
fn test_explain_unknown_member() {
    let mock = Mock::new();
    let report = mock.explain(&square(), &[1.into()]);
    assert!(!report.matched);
    assert!(report.candidates.is_empty());
    assert!(report.reason.unwrap().contains("no specifications"));
}

#[traced_test]
#[test]
fn test_unmatched_call_warns_when_requested() {
    let mock = Mock::with_options(MockOptions {
        name: Some("calc".to_string()),
        warn_on_unmatched: true,
    });
    mock.dispatch(&square(), &int(), &[9.into()]).unwrap();
    assert!(logs_contain("calc: no specification matched square(9)"));
}

#[test]
fn test_mock_is_shared_across_threads() {
    let mock = Arc::new(Mock::new());
    mock.register(square(), ArgumentFilters::any(1), Behavior::returns(1))
        .unwrap();

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let mock = Arc::clone(&mock);
            std::thread::spawn(move || {
                for j in 0..25 {
                    let result = mock.dispatch(&square(), &int(), &[Value::Int(i * 100 + j)]);
                    assert_eq!(result, Ok(Value::Int(1)));
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let log = mock.invocations();
    assert_eq!(log.len(), 100);
    assert!(log.iter().enumerate().all(|(i, r)| r.sequence == i as u64));
}

#[test]
fn test_sequence_steps_follow_log_order_across_threads() {
    let mock = Arc::new(Mock::new());
    mock.register(
        square(),
        ArgumentFilters::any(1),
        Behavior::sequence((0..200).map(Behavior::returns)),
    )
    .unwrap();

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let mock = Arc::clone(&mock);
            std::thread::spawn(move || {
                (0..50)
                    .map(|j| {
                        let arg = Value::Int(i * 100 + j);
                        let result = mock.dispatch(&square(), &int(), &[arg.clone()]);
                        (arg, result)
                    })
                    .collect::<Vec<_>>()
            })
        })
        .collect();
    let returned: Vec<(Value, _)> = handles
        .into_iter()
        .flat_map(|handle| handle.join().unwrap())
        .collect();

    let log = mock.invocations();
    assert_eq!(log.len(), 200);
    for record in &log {
        let (_, result) = returned
            .iter()
            .find(|(arg, _)| *arg == record.arguments[0])
            .unwrap();
        assert_eq!(*result, Ok(Value::Int(record.sequence as i64)));
    }
}

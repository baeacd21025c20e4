//! Single-argument filters.
//!
//! `ArgumentFilter` is a closed union with one exhaustive `matches`. Filters
//! are immutable and side-effect free, so a collection may short-circuit.

use crate::value::{TypeTag, Value};
use regex::Regex;
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

/// Matches any argument, including `Null`.
pub const ANY: ArgumentFilter = ArgumentFilter::Any;
/// Matches only `Null`.
pub const NULL: ArgumentFilter = ArgumentFilter::Null;
/// Matches everything except `Null`.
pub const NOT_NULL: ArgumentFilter = ArgumentFilter::NotNull;

/// A user-supplied predicate over one argument.
///
/// Equality is identity of the function: two clones of the same
/// `PredicateFn` are equal, two separately built predicates never are.
#[derive(Clone)]
pub struct PredicateFn {
    label: Arc<str>,
    func: Arc<dyn Fn(&Value) -> bool + Send + Sync>,
}

impl PredicateFn {
    pub fn new<F>(label: impl Into<Arc<str>>, func: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        Self {
            label: label.into(),
            func: Arc::new(func),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    #[inline]
    pub fn call(&self, value: &Value) -> bool {
        (self.func)(value)
    }
}

impl PartialEq for PredicateFn {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(
            Arc::as_ptr(&self.func) as *const (),
            Arc::as_ptr(&other.func) as *const (),
        )
    }
}

impl fmt::Debug for PredicateFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PredicateFn").field(&self.label).finish()
    }
}

/// Relational operator of a `Compare` filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Lt,
    Le,
    Gt,
    Ge,
}

impl CompareOp {
    /// Whether `actual <op> bound` holds given `actual.compare(bound)`.
    fn accepts(self, ordering: Ordering) -> bool {
        match self {
            CompareOp::Lt => ordering == Ordering::Less,
            CompareOp::Le => ordering != Ordering::Greater,
            CompareOp::Gt => ordering == Ordering::Greater,
            CompareOp::Ge => ordering != Ordering::Less,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
        }
    }
}

/// Predicate over a single actual argument.
#[derive(Debug, Clone)]
pub enum ArgumentFilter {
    /// Matches every value
    Any,
    /// Structural equality, identity for objects
    Equals(Value),
    /// Equal to any member of the set
    OneOf(Vec<Value>),
    /// Runtime type equals the tag; never matches `Null`
    OfType(TypeTag),
    Null,
    NotNull,
    Predicate(PredicateFn),
    /// `actual <op> bound` for values of the same kind
    Compare(CompareOp, Value),
    /// `low <= actual <= high`
    InRange(Value, Value),
    /// Regex search over string arguments
    Matches(Arc<Regex>),
}

impl ArgumentFilter {
    pub fn equals(value: impl Into<Value>) -> Self {
        ArgumentFilter::Equals(value.into())
    }

    pub fn one_of<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        ArgumentFilter::OneOf(values.into_iter().map(Into::into).collect())
    }

    pub fn predicate<F>(label: &str, func: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        ArgumentFilter::Predicate(PredicateFn::new(label, func))
    }

    pub fn regex(pattern: &str) -> Result<Self, regex::Error> {
        Ok(ArgumentFilter::Matches(Arc::new(Regex::new(pattern)?)))
    }

    /// Check whether a single actual argument satisfies this filter.
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            ArgumentFilter::Any => true,
            ArgumentFilter::Equals(expected) => value == expected,
            ArgumentFilter::OneOf(set) => set.iter().any(|candidate| candidate == value),
            ArgumentFilter::OfType(tag) => value.type_tag().as_ref() == Some(tag),
            ArgumentFilter::Null => value.is_null(),
            ArgumentFilter::NotNull => !value.is_null(),
            ArgumentFilter::Predicate(pred) => pred.call(value),
            ArgumentFilter::Compare(op, bound) => value
                .compare(bound)
                .is_some_and(|ordering| op.accepts(ordering)),
            ArgumentFilter::InRange(low, high) => {
                CompareOp::Ge.accepts_opt(value.compare(low))
                    && CompareOp::Le.accepts_opt(value.compare(high))
            }
            ArgumentFilter::Matches(regex) => value.as_str().is_some_and(|s| regex.is_match(s)),
        }
    }
}

impl CompareOp {
    #[inline]
    fn accepts_opt(self, ordering: Option<Ordering>) -> bool {
        ordering.is_some_and(|o| self.accepts(o))
    }
}

impl PartialEq for ArgumentFilter {
    fn eq(&self, other: &Self) -> bool {
        use ArgumentFilter::*;
        match (self, other) {
            (Any, Any) | (Null, Null) | (NotNull, NotNull) => true,
            (Equals(a), Equals(b)) => a == b,
            (OneOf(a), OneOf(b)) => a == b,
            (OfType(a), OfType(b)) => a == b,
            (Predicate(a), Predicate(b)) => a == b,
            (Compare(op_a, a), Compare(op_b, b)) => op_a == op_b && a == b,
            (InRange(la, ha), InRange(lb, hb)) => la == lb && ha == hb,
            (Matches(a), Matches(b)) => a.as_str() == b.as_str(),
            _ => false,
        }
    }
}

impl fmt::Display for ArgumentFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgumentFilter::Any => f.write_str("Any"),
            ArgumentFilter::Equals(value) => write!(f, "{value}"),
            ArgumentFilter::OneOf(values) => {
                f.write_str("In[")?;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{value}")?;
                }
                f.write_str("]")
            }
            ArgumentFilter::OfType(tag) => write!(f, "OfType<{tag}>"),
            ArgumentFilter::Null => f.write_str("IsNull"),
            ArgumentFilter::NotNull => f.write_str("IsNotNull"),
            ArgumentFilter::Predicate(pred) => write!(f, "Is({})", pred.label()),
            ArgumentFilter::Compare(op, bound) => write!(f, "{} {bound}", op.symbol()),
            ArgumentFilter::InRange(low, high) => write!(f, "InRange({low}, {high})"),
            ArgumentFilter::Matches(regex) => write!(f, "Matches(/{}/)", regex.as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::ObjectRef;

    #[test]
    fn test_any_matches_everything() {
        for value in [
            Value::Null,
            Value::Int(0),
            Value::from("x"),
            Value::List(vec![]),
        ] {
            assert!(ANY.matches(&value));
        }
    }

    #[test]
    fn test_equals() {
        let filter = ArgumentFilter::equals(3);
        assert!(filter.matches(&Value::Int(3)));
        assert!(!filter.matches(&Value::Int(4)));
        assert!(!filter.matches(&Value::Float(3.0)));
        assert!(!filter.matches(&Value::Null));
    }

    #[test]
    fn test_one_of() {
        let filter = ArgumentFilter::one_of([1, 2, 3]);
        assert!(filter.matches(&Value::Int(2)));
        assert!(!filter.matches(&Value::Int(5)));
        assert!(!ArgumentFilter::OneOf(vec![]).matches(&Value::Int(1)));
    }

    #[test]
    fn test_of_type() {
        let filter = ArgumentFilter::OfType(TypeTag::Object("Customer".into()));
        assert!(filter.matches(&Value::Object(ObjectRef::new("Customer", ()))));
        assert!(!filter.matches(&Value::Object(ObjectRef::new("Order", ()))));
        assert!(!filter.matches(&Value::Null));
        assert!(ArgumentFilter::OfType(TypeTag::Str).matches(&Value::from("s")));
    }

    #[test]
    fn test_null_and_not_null() {
        assert!(NULL.matches(&Value::Null));
        assert!(!NULL.matches(&Value::Int(0)));
        assert!(NOT_NULL.matches(&Value::Int(0)));
        assert!(!NOT_NULL.matches(&Value::Null));
    }

    #[test]
    fn test_predicate_and_identity_equality() {
        let pred = PredicateFn::new("even", |v| v.as_int().is_some_and(|i| i % 2 == 0));
        let filter = ArgumentFilter::Predicate(pred.clone());
        assert!(filter.matches(&Value::Int(4)));
        assert!(!filter.matches(&Value::Int(3)));

        assert_eq!(filter, ArgumentFilter::Predicate(pred));
        let other = ArgumentFilter::predicate("even", |v| v.as_int().is_some_and(|i| i % 2 == 0));
        assert_ne!(filter, other);
    }

    #[test]
    fn test_compare() {
        let gt = ArgumentFilter::Compare(CompareOp::Gt, Value::Int(3));
        assert!(gt.matches(&Value::Int(4)));
        assert!(!gt.matches(&Value::Int(3)));
        assert!(!gt.matches(&Value::Float(4.0)));

        let le = ArgumentFilter::Compare(CompareOp::Le, Value::from("m"));
        assert!(le.matches(&Value::from("apple")));
        assert!(le.matches(&Value::from("m")));
        assert!(!le.matches(&Value::from("zebra")));
    }

    #[test]
    fn test_in_range_inclusive() {
        let filter = ArgumentFilter::InRange(Value::Int(1), Value::Int(5));
        assert!(filter.matches(&Value::Int(1)));
        assert!(filter.matches(&Value::Int(5)));
        assert!(!filter.matches(&Value::Int(6)));
        assert!(!filter.matches(&Value::Null));
    }

    #[test]
    fn test_regex() {
        let filter = ArgumentFilter::regex(r"^order-\d+$").unwrap();
        assert!(filter.matches(&Value::from("order-17")));
        assert!(!filter.matches(&Value::from("order-x")));
        assert!(!filter.matches(&Value::Int(17)));
        assert_eq!(filter, ArgumentFilter::regex(r"^order-\d+$").unwrap());
    }

    #[test]
    fn test_display() {
        assert_eq!(ANY.to_string(), "Any");
        assert_eq!(ArgumentFilter::equals("a").to_string(), "\"a\"");
        assert_eq!(ArgumentFilter::one_of([1, 2]).to_string(), "In[1, 2]");
        assert_eq!(
            ArgumentFilter::Compare(CompareOp::Ge, Value::Int(2)).to_string(),
            ">= 2"
        );
    }
}

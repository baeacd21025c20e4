//! Structured call-pattern representation.

use crate::filter::PredicateFn;
use crate::member::MemberKey;
use crate::value::{TypeTag, Value};
use std::fmt;

/// Names of the recognized matcher builders.
pub mod matcher_names {
    pub const IS_ANY: &str = "IsAny";
    pub const IS: &str = "Is";
    pub const IS_IN: &str = "IsIn";
    pub const IS_OF_TYPE: &str = "IsOfType";
    pub const IS_NULL: &str = "IsNull";
    pub const IS_NOT_NULL: &str = "IsNotNull";
    pub const IS_GREATER_THAN: &str = "IsGreaterThan";
    pub const IS_GREATER_THAN_OR_EQUAL: &str = "IsGreaterThanOrEqual";
    pub const IS_LESS_THAN: &str = "IsLessThan";
    pub const IS_LESS_THAN_OR_EQUAL: &str = "IsLessThanOrEqual";
    pub const IS_IN_RANGE: &str = "IsInRange";
    pub const IS_MATCH: &str = "IsMatch";
}

/// One node of a call pattern.
#[derive(Debug, Clone, PartialEq)]
pub enum PatternExpr {
    /// A literal value
    Literal(Value),
    /// A named constant such as an enum member, already folded to its value
    Constant { path: String, value: Value },
    /// A call to a matcher builder, or to any other function by name
    MatcherCall {
        name: String,
        type_args: Vec<TypeTag>,
        args: Vec<PatternExpr>,
    },
    /// A predicate closure passed to `Is`
    Closure(PredicateFn),
    /// A method call on the mock
    Call {
        member: MemberKey,
        args: Vec<PatternExpr>,
    },
    /// A property read (`value == None`) or write on the mock
    MemberAccess {
        member: MemberKey,
        value: Option<Box<PatternExpr>>,
    },
    Array(Vec<PatternExpr>),
    /// A runtime variable whose value is not statically known
    Capture(String),
}

impl PatternExpr {
    pub fn call(member: MemberKey, args: Vec<PatternExpr>) -> Self {
        PatternExpr::Call { member, args }
    }

    pub fn get(name: impl Into<String>) -> Self {
        PatternExpr::MemberAccess {
            member: MemberKey::getter(name),
            value: None,
        }
    }

    pub fn set(name: impl Into<String>, value: PatternExpr) -> Self {
        PatternExpr::MemberAccess {
            member: MemberKey::setter(name),
            value: Some(Box::new(value)),
        }
    }

    pub fn literal(value: impl Into<Value>) -> Self {
        PatternExpr::Literal(value.into())
    }

    pub fn constant(path: impl Into<String>, value: Value) -> Self {
        PatternExpr::Constant {
            path: path.into(),
            value,
        }
    }

    pub fn capture(name: impl Into<String>) -> Self {
        PatternExpr::Capture(name.into())
    }

    pub fn array(items: Vec<PatternExpr>) -> Self {
        PatternExpr::Array(items)
    }

    /// Compile-time value of a literal or named constant.
    pub fn constant_value(&self) -> Option<&Value> {
        match self {
            PatternExpr::Literal(value) | PatternExpr::Constant { value, .. } => Some(value),
            _ => None,
        }
    }

    /// Short description of the node kind for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            PatternExpr::Literal(_) => "literal",
            PatternExpr::Constant { .. } => "constant",
            PatternExpr::MatcherCall { .. } => "function call",
            PatternExpr::Closure(_) => "closure",
            PatternExpr::Call { .. } => "member call",
            PatternExpr::MemberAccess { .. } => "member access",
            PatternExpr::Array(_) => "array literal",
            PatternExpr::Capture(_) => "variable",
        }
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, items: &[PatternExpr]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

impl fmt::Display for PatternExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatternExpr::Literal(value) => write!(f, "{value}"),
            PatternExpr::Constant { path, .. } => f.write_str(path),
            PatternExpr::MatcherCall {
                name,
                type_args,
                args,
            } => {
                f.write_str(name)?;
                if !type_args.is_empty() {
                    f.write_str("<")?;
                    for (i, ty) in type_args.iter().enumerate() {
                        if i > 0 {
                            f.write_str(", ")?;
                        }
                        write!(f, "{ty}")?;
                    }
                    f.write_str(">")?;
                }
                f.write_str("(")?;
                write_list(f, args)?;
                f.write_str(")")
            }
            PatternExpr::Closure(pred) => write!(f, "|x| {}", pred.label()),
            PatternExpr::Call { member, args } => {
                write!(f, "{}(", member.name())?;
                write_list(f, args)?;
                f.write_str(")")
            }
            PatternExpr::MemberAccess {
                member,
                value: None,
            } => f.write_str(member.name()),
            PatternExpr::MemberAccess {
                member,
                value: Some(value),
            } => write!(f, "{} = {value}", member.name()),
            PatternExpr::Array(items) => {
                f.write_str("[")?;
                write_list(f, items)?;
                f.write_str("]")
            }
            PatternExpr::Capture(name) => f.write_str(name),
        }
    }
}

/// Builders for matcher-call argument nodes.
pub mod arg {
    use super::matcher_names::*;
    use super::PatternExpr;
    use crate::filter::PredicateFn;
    use crate::value::{TypeTag, Value};

    fn matcher(name: &str, type_args: Vec<TypeTag>, args: Vec<PatternExpr>) -> PatternExpr {
        PatternExpr::MatcherCall {
            name: name.to_string(),
            type_args,
            args,
        }
    }

    /// `IsAny<T>()`
    pub fn is_any(ty: TypeTag) -> PatternExpr {
        matcher(IS_ANY, vec![ty], vec![])
    }

    /// `IsAny()` without a type argument
    pub fn any() -> PatternExpr {
        matcher(IS_ANY, vec![], vec![])
    }

    /// `Is(predicate)`
    pub fn is<F>(label: &str, func: F) -> PatternExpr
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        matcher(
            IS,
            vec![],
            vec![PatternExpr::Closure(PredicateFn::new(label, func))],
        )
    }

    /// `IsIn(a, b, ...)`
    pub fn is_in<I, V>(values: I) -> PatternExpr
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        matcher(
            IS_IN,
            vec![],
            values.into_iter().map(PatternExpr::literal).collect(),
        )
    }

    /// `IsOfType<T>()`
    pub fn is_of_type(ty: TypeTag) -> PatternExpr {
        matcher(IS_OF_TYPE, vec![ty], vec![])
    }

    pub fn is_null() -> PatternExpr {
        matcher(IS_NULL, vec![], vec![])
    }

    pub fn is_not_null() -> PatternExpr {
        matcher(IS_NOT_NULL, vec![], vec![])
    }

    pub fn is_greater_than(bound: impl Into<Value>) -> PatternExpr {
        matcher(IS_GREATER_THAN, vec![], vec![PatternExpr::literal(bound)])
    }

    pub fn is_greater_than_or_equal(bound: impl Into<Value>) -> PatternExpr {
        matcher(
            IS_GREATER_THAN_OR_EQUAL,
            vec![],
            vec![PatternExpr::literal(bound)],
        )
    }

    pub fn is_less_than(bound: impl Into<Value>) -> PatternExpr {
        matcher(IS_LESS_THAN, vec![], vec![PatternExpr::literal(bound)])
    }

    pub fn is_less_than_or_equal(bound: impl Into<Value>) -> PatternExpr {
        matcher(
            IS_LESS_THAN_OR_EQUAL,
            vec![],
            vec![PatternExpr::literal(bound)],
        )
    }

    pub fn is_in_range(low: impl Into<Value>, high: impl Into<Value>) -> PatternExpr {
        matcher(
            IS_IN_RANGE,
            vec![],
            vec![PatternExpr::literal(low), PatternExpr::literal(high)],
        )
    }

    /// `IsMatch("regex")`
    pub fn is_match(pattern: &str) -> PatternExpr {
        matcher(IS_MATCH, vec![], vec![PatternExpr::literal(pattern)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::member::Parameter;

    #[test]
    fn test_display() {
        let member = MemberKey::method(
            "add",
            vec![Parameter::new(TypeTag::Int), Parameter::new(TypeTag::Int)],
        );
        let pattern = PatternExpr::call(member, vec![arg::is_any(TypeTag::Int), arg::is_in([1, 2])]);
        assert_eq!(pattern.to_string(), "add(IsAny<int>(), IsIn(1, 2))");

        let setter = PatternExpr::set("Name", PatternExpr::literal("bob"));
        assert_eq!(setter.to_string(), "Name = \"bob\"");
    }

    #[test]
    fn test_constant_value() {
        assert_eq!(
            PatternExpr::literal(3).constant_value(),
            Some(&Value::Int(3))
        );
        assert!(PatternExpr::capture("x").constant_value().is_none());
        assert!(arg::any().constant_value().is_none());
    }
}

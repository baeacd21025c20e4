//! Compile a call pattern into an argument filter collection.
//!
//! Extraction either yields a fully populated collection or fails as a
//! whole. A non-constant argument is rejected rather than widened to `Any`.

use super::expr::{matcher_names as names, PatternExpr};
use crate::error::ExtractionError;
use crate::filter::{ArgumentFilter, ArgumentFilters, CompareOp, ANY, NOT_NULL, NULL};
use crate::member::MemberKey;
use crate::value::{TypeTag, Value};
use regex::Regex;
use std::sync::Arc;

/// A compiled pattern: the member it targets and one filter per parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedPattern {
    pub member: MemberKey,
    pub filters: ArgumentFilters,
}

/// Compile `pattern` into filters for the member at its root.
pub fn extract(pattern: &PatternExpr) -> Result<ExtractedPattern, ExtractionError> {
    let (member, args): (&MemberKey, Vec<&PatternExpr>) = match pattern {
        PatternExpr::Call { member, args } => (member, args.iter().collect()),
        PatternExpr::MemberAccess { member, value } => {
            (member, value.iter().map(|v| v.as_ref()).collect())
        }
        other => {
            return Err(ExtractionError::NotRootLevel {
                found: format!("{} `{other}`", other.kind()),
            })
        }
    };

    if args.len() != member.arity() {
        return Err(ExtractionError::ArityMismatch {
            member: member.to_string(),
            expected: member.arity(),
            actual: args.len(),
        });
    }

    let filters = args
        .iter()
        .enumerate()
        .map(|(index, arg)| {
            if member.parameter_mode(index).is_by_reference() {
                Ok(ANY)
            } else {
                argument_filter(arg).map_err(|reason| ExtractionError::UnsupportedExpression {
                    member: member.to_string(),
                    index,
                    expression: arg.to_string(),
                    reason,
                })
            }
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ExtractedPattern {
        member: member.clone(),
        filters: ArgumentFilters::new(filters),
    })
}

fn argument_filter(arg: &PatternExpr) -> Result<ArgumentFilter, String> {
    match arg {
        PatternExpr::MatcherCall {
            name,
            type_args,
            args,
        } => matcher_filter(name, type_args, args),
        PatternExpr::Literal(Value::Null) => Ok(NULL),
        PatternExpr::Literal(Value::Unit) => Err("unit is not an argument value".to_string()),
        PatternExpr::Literal(value) | PatternExpr::Constant { value, .. } => {
            Ok(ArgumentFilter::Equals(value.clone()))
        }
        other => Err(format!("{} is not a compile-time constant", other.kind())),
    }
}

fn constant_arg<'a>(name: &str, arg: &'a PatternExpr) -> Result<&'a Value, String> {
    arg.constant_value()
        .ok_or_else(|| format!("{name} expects constant arguments, found {}", arg.kind()))
}

fn expect_args(name: &str, args: &[PatternExpr], count: usize) -> Result<(), String> {
    if args.len() == count {
        Ok(())
    } else {
        Err(format!(
            "{name} expects {count} argument(s), found {}",
            args.len()
        ))
    }
}

fn matcher_filter(
    name: &str,
    type_args: &[TypeTag],
    args: &[PatternExpr],
) -> Result<ArgumentFilter, String> {
    let compare = |op: CompareOp| -> Result<ArgumentFilter, String> {
        expect_args(name, args, 1)?;
        Ok(ArgumentFilter::Compare(op, constant_arg(name, &args[0])?.clone()))
    };

    match name {
        names::IS_ANY => {
            expect_args(name, args, 0)?;
            if type_args.len() > 1 {
                return Err(format!("{name} takes at most one type argument"));
            }
            Ok(ANY)
        }
        names::IS => {
            expect_args(name, args, 1)?;
            match &args[0] {
                PatternExpr::Closure(pred) => Ok(ArgumentFilter::Predicate(pred.clone())),
                other => Err(format!("{name} expects a predicate, found {}", other.kind())),
            }
        }
        names::IS_IN => {
            let items: &[PatternExpr] = match args {
                [PatternExpr::Array(items)] => items.as_slice(),
                _ => args,
            };
            if items.is_empty() {
                return Err(format!("{name} needs at least one value"));
            }
            let values = items
                .iter()
                .map(|item| constant_arg(name, item).cloned())
                .collect::<Result<Vec<_>, _>>()?;
            Ok(ArgumentFilter::OneOf(values))
        }
        names::IS_OF_TYPE => {
            expect_args(name, args, 0)?;
            match type_args {
                [tag] => Ok(ArgumentFilter::OfType(tag.clone())),
                _ => Err(format!("{name} takes exactly one type argument")),
            }
        }
        names::IS_NULL => {
            expect_args(name, args, 0)?;
            Ok(NULL)
        }
        names::IS_NOT_NULL => {
            expect_args(name, args, 0)?;
            Ok(NOT_NULL)
        }
        names::IS_GREATER_THAN => compare(CompareOp::Gt),
        names::IS_GREATER_THAN_OR_EQUAL => compare(CompareOp::Ge),
        names::IS_LESS_THAN => compare(CompareOp::Lt),
        names::IS_LESS_THAN_OR_EQUAL => compare(CompareOp::Le),
        names::IS_IN_RANGE => {
            expect_args(name, args, 2)?;
            let low = constant_arg(name, &args[0])?.clone();
            let high = constant_arg(name, &args[1])?.clone();
            Ok(ArgumentFilter::InRange(low, high))
        }
        names::IS_MATCH => {
            expect_args(name, args, 1)?;
            let pattern = constant_arg(name, &args[0])?
                .as_str()
                .ok_or_else(|| format!("{name} expects a string pattern"))?;
            let regex = Regex::new(pattern).map_err(|e| format!("invalid regex: {e}"))?;
            Ok(ArgumentFilter::Matches(Arc::new(regex)))
        }
        other => Err(format!("'{other}' is not a recognized matcher")),
    }
}

//! Ordered argument filter sequences.

use super::argument::{ArgumentFilter, ANY};
use crate::error::ExtractionError;
use crate::member::MemberKey;
use crate::value::Value;
use std::fmt;

/// One filter per formal parameter, in declaration order.
///
/// Built once when a specification is configured and never mutated.
/// Equality is elementwise.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ArgumentFilters(Vec<ArgumentFilter>);

impl ArgumentFilters {
    pub fn new(filters: Vec<ArgumentFilter>) -> Self {
        Self(filters)
    }

    /// Build a collection for `member`, rejecting a length that differs from
    /// its arity.
    pub fn for_member(
        member: &MemberKey,
        filters: Vec<ArgumentFilter>,
    ) -> Result<Self, ExtractionError> {
        if filters.len() != member.arity() {
            return Err(ExtractionError::ArityMismatch {
                member: member.to_string(),
                expected: member.arity(),
                actual: filters.len(),
            });
        }
        Ok(Self(filters))
    }

    /// A collection that accepts every call of the given arity.
    pub fn any(arity: usize) -> Self {
        Self(vec![ANY; arity])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ArgumentFilter> {
        self.0.iter()
    }

    pub fn get(&self, index: usize) -> Option<&ArgumentFilter> {
        self.0.get(index)
    }

    /// The matching primitive shared by dispatch and verification: every
    /// positional filter must accept its argument.
    pub fn matches(&self, args: &[Value]) -> bool {
        self.0.len() == args.len()
            && self
                .0
                .iter()
                .zip(args)
                .all(|(filter, arg)| filter.matches(arg))
    }

    /// Index of the first argument this collection rejects, if any.
    pub fn first_mismatch(&self, args: &[Value]) -> Option<usize> {
        if self.0.len() != args.len() {
            return Some(self.0.len().min(args.len()));
        }
        self.0
            .iter()
            .zip(args)
            .position(|(filter, arg)| !filter.matches(arg))
    }
}

impl FromIterator<ArgumentFilter> for ArgumentFilters {
    fn from_iter<I: IntoIterator<Item = ArgumentFilter>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a ArgumentFilters {
    type Item = &'a ArgumentFilter;
    type IntoIter = std::slice::Iter<'a, ArgumentFilter>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for ArgumentFilters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, filter) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{filter}")?;
        }
        f.write_str(")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::member::Parameter;
    use crate::value::TypeTag;

    #[test]
    fn test_all_filters_must_match() {
        let filters = ArgumentFilters::new(vec![ANY, ArgumentFilter::equals(3)]);
        assert!(filters.matches(&[Value::Null, Value::Int(3)]));
        assert!(!filters.matches(&[Value::Null, Value::Int(4)]));
    }

    #[test]
    fn test_length_mismatch_never_matches() {
        let filters = ArgumentFilters::any(2);
        assert!(!filters.matches(&[Value::Int(1)]));
        assert!(!filters.matches(&[Value::Int(1), Value::Int(2), Value::Int(3)]));
        assert!(ArgumentFilters::any(0).matches(&[]));
    }

    #[test]
    fn test_for_member_checks_arity() {
        let member = MemberKey::method("f", vec![Parameter::new(TypeTag::Int)]);
        assert!(ArgumentFilters::for_member(&member, vec![ANY]).is_ok());
        let err = ArgumentFilters::for_member(&member, vec![ANY, ANY]).unwrap_err();
        assert!(matches!(
            err,
            ExtractionError::ArityMismatch {
                expected: 1,
                actual: 2,
                ..
            }
        ));
    }

    #[test]
    fn test_first_mismatch() {
        let filters = ArgumentFilters::new(vec![ArgumentFilter::equals(1), ArgumentFilter::equals(2)]);
        assert_eq!(filters.first_mismatch(&[Value::Int(1), Value::Int(2)]), None);
        assert_eq!(filters.first_mismatch(&[Value::Int(1), Value::Int(9)]), Some(1));
        assert_eq!(filters.first_mismatch(&[Value::Int(1)]), Some(1));
    }

    #[test]
    fn test_elementwise_equality_and_display() {
        let a = ArgumentFilters::new(vec![ANY, ArgumentFilter::one_of([1, 2, 3])]);
        let b: ArgumentFilters = vec![ANY, ArgumentFilter::one_of([1, 2, 3])]
            .into_iter()
            .collect();
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "(Any, In[1, 2, 3])");
    }
}

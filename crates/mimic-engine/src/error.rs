//! Error types raised while building specifications.
//!
//! Extraction failures surface at configuration time, before any call is
//! dispatched. An unmatched call at dispatch time is never an error.

/// Failure to turn a call pattern into an argument filter collection.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtractionError {
    #[error("call pattern must be a single member call or access at its root, found {found}")]
    NotRootLevel { found: String },

    #[error("argument {index} of {member} cannot be matched: {expression} ({reason})")]
    UnsupportedExpression {
        member: String,
        index: usize,
        expression: String,
        reason: String,
    },

    #[error("{member} takes {expected} argument(s) but {actual} were supplied")]
    ArityMismatch {
        member: String,
        expected: usize,
        actual: usize,
    },
}

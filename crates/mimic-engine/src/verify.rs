//! Call-count verification against the invocation log.
//!
//! Verification uses `ArgumentFilters::matches`, the same primitive dispatch
//! uses, so "would have matched" and "was counted" always agree.

use crate::error::ExtractionError;
use crate::filter::ArgumentFilters;
use crate::member::MemberKey;
use crate::pattern::{extract, ParseError, PatternExpr};
use crate::registry::Mock;
use std::fmt;

/// Expected number of matching calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Times {
    Exactly(usize),
    AtLeast(usize),
    AtMost(usize),
    /// Inclusive on both ends
    Between(usize, usize),
    Never,
    Once,
}

impl Times {
    pub fn check(self, actual: usize) -> bool {
        match self {
            Times::Exactly(n) => actual == n,
            Times::AtLeast(n) => actual >= n,
            Times::AtMost(n) => actual <= n,
            Times::Between(lo, hi) => lo <= actual && actual <= hi,
            Times::Never => actual == 0,
            Times::Once => actual == 1,
        }
    }
}

impl fmt::Display for Times {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Times::Exactly(n) => write!(f, "exactly {n}"),
            Times::AtLeast(n) => write!(f, "at least {n}"),
            Times::AtMost(n) => write!(f, "at most {n}"),
            Times::Between(lo, hi) => write!(f, "between {lo} and {hi}"),
            Times::Never => f.write_str("never"),
            Times::Once => f.write_str("exactly 1"),
        }
    }
}

/// A cardinality assertion that did not hold.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum VerificationError {
    #[error("{mock}: expected {member}{filters} to be called {expected} time(s) but it was called {actual} time(s); recorded calls: {}", format_calls(.recorded))]
    CountMismatch {
        mock: String,
        member: String,
        filters: String,
        expected: Times,
        actual: usize,
        /// Every logged call of the member, matching or not
        recorded: Vec<String>,
    },

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

fn format_calls(calls: &[String]) -> String {
    if calls.is_empty() {
        "none".to_string()
    } else {
        calls.join(", ")
    }
}

impl Mock {
    /// Number of logged calls of `member` that `filters` accepts.
    ///
    /// A filter count that differs from the arity of the logged calls
    /// matches nothing.
    pub fn verify_count(&self, member: &MemberKey, filters: &ArgumentFilters) -> usize {
        self.with_log(|log| {
            log.iter()
                .filter(|record| &record.member == member && filters.matches(&record.arguments))
                .count()
        })
    }

    /// Assert the number of matching calls.
    pub fn verify(
        &self,
        member: &MemberKey,
        filters: &ArgumentFilters,
        times: Times,
    ) -> Result<(), VerificationError> {
        let (actual, recorded) = self.with_log(|log| {
            let calls: Vec<_> = log.iter().filter(|r| &r.member == member).collect();
            let actual = calls
                .iter()
                .filter(|r| filters.matches(&r.arguments))
                .count();
            (actual, calls.iter().map(|r| r.describe()).collect::<Vec<_>>())
        });

        if times.check(actual) {
            return Ok(());
        }
        Err(VerificationError::CountMismatch {
            mock: self.options().display_name().to_string(),
            member: member.name().to_string(),
            filters: filters.to_string(),
            expected: times,
            actual,
            recorded,
        })
    }

    /// Extract `pattern` and verify the calls it describes.
    pub fn verify_pattern(&self, pattern: &PatternExpr, times: Times) -> Result<(), VerificationError> {
        let extracted = extract(pattern)?;
        self.verify(&extracted.member, &extracted.filters, times)
    }
}

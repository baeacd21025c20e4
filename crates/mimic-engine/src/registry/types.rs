//! Type definitions for the invocation registry.

use crate::behavior::{Behavior, Outcome, SequenceCursor};
use crate::filter::ArgumentFilters;
use crate::member::{MemberKey, ReturnType};
use crate::value::Value;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

// ============================================================================
// Specifications
// ============================================================================

/// A registered pattern: filters and behavior bound to a member.
///
/// Specifications are never removed; a later one for the same member
/// shadows earlier ones wherever their filters overlap.
#[derive(Debug)]
pub struct InvocationSpecification {
    pub member: MemberKey,
    pub filters: ArgumentFilters,
    pub behavior: Behavior,
    /// Registration order across the whole mock, starting at 0
    pub sequence: u64,
    /// Progress through a `Sequence` behavior
    pub(crate) cursor: SequenceCursor,
}

impl InvocationSpecification {
    pub(crate) fn new(
        member: MemberKey,
        filters: ArgumentFilters,
        behavior: Behavior,
        sequence: u64,
    ) -> Self {
        Self {
            member,
            filters,
            behavior,
            sequence,
            cursor: SequenceCursor::new(),
        }
    }

    /// Claim the step the next matched call runs. Dispatch calls this while
    /// it holds the mock's write lock, so steps are handed out in log order.
    pub(crate) fn claim_step(&self) -> usize {
        match &self.behavior {
            Behavior::Sequence(steps) => self.cursor.advance(steps.len()),
            _ => 0,
        }
    }

    /// Run this specification's behavior for one matched call, using the
    /// step claimed for it.
    pub(crate) fn execute(&self, step: usize, args: &[Value], returns: &ReturnType) -> Outcome {
        match &self.behavior {
            Behavior::Sequence(steps) => match steps.get(step) {
                Some(behavior) => behavior.run(args, returns),
                None => Ok(returns.default_value()),
            },
            other => other.run(args, returns),
        }
    }
}

// ============================================================================
// Invocation Log
// ============================================================================

/// One real call of a mocked member, appended before its behavior runs.
#[derive(Debug, Clone)]
pub struct InvocationRecord {
    pub member: MemberKey,
    /// Arguments as they were at call time
    pub arguments: Vec<Value>,
    /// The specification that handled the call, if any
    pub matched: Option<Arc<InvocationSpecification>>,
    /// Position in the mock's invocation log, starting at 0
    pub sequence: u64,
    pub recorded_at: DateTime<Utc>,
}

impl InvocationRecord {
    /// Sequence number of the matched specification.
    pub fn matched_sequence(&self) -> Option<u64> {
        self.matched.as_ref().map(|spec| spec.sequence)
    }

    /// Render as `name(arg, ...)` for diagnostics.
    pub fn describe(&self) -> String {
        let args: Vec<String> = self.arguments.iter().map(ToString::to_string).collect();
        format!("{}({})", self.member.name(), args.join(", "))
    }
}

// ============================================================================
// Match Reports
// ============================================================================

/// How a call would be dispatched, without recording or executing it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchReport {
    pub member: String,
    pub arguments: Vec<String>,
    pub matched: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_sequence: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub behavior: Option<String>,
    /// Specifications in precedence order (most recent first)
    pub candidates: Vec<CandidateInfo>,
    /// Reason for no match
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// One specification considered while explaining a call.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateInfo {
    pub sequence: u64,
    pub filters: Vec<String>,
    pub behavior: String,
    pub matches: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_mismatch: Option<usize>,
}

impl CandidateInfo {
    pub(crate) fn from_spec(spec: &InvocationSpecification, args: &[Value]) -> Self {
        let first_mismatch = spec.filters.first_mismatch(args);
        Self {
            sequence: spec.sequence,
            filters: spec.filters.iter().map(ToString::to_string).collect(),
            behavior: spec.behavior.to_string(),
            matches: first_mismatch.is_none(),
            first_mismatch,
        }
    }
}

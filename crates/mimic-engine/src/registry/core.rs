//! Core Mock struct and the dispatch algorithm.
//!
//! A `Mock` owns the specifications configured for one mocked instance and
//! the log of every call made through it. Both live behind a single lock so
//! registration order and log order are total.

use super::types::{CandidateInfo, InvocationRecord, InvocationSpecification, MatchReport};
use crate::behavior::{Behavior, Outcome};
use crate::config::MockOptions;
use crate::error::ExtractionError;
use crate::filter::ArgumentFilters;
use crate::member::{MemberKey, ReturnType};
use crate::pattern::{extract, PatternExpr};
use crate::value::Value;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Debug, Default)]
struct MockState {
    /// Per member, in registration order
    specifications: HashMap<MemberKey, Vec<Arc<InvocationSpecification>>>,
    log: Vec<InvocationRecord>,
    next_registration: u64,
    next_invocation: u64,
}

/// Configured behavior and call history of one mocked instance.
#[derive(Debug, Default)]
pub struct Mock {
    options: MockOptions,
    state: RwLock<MockState>,
}

impl Mock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: MockOptions) -> Self {
        Self {
            options,
            state: RwLock::new(MockState::default()),
        }
    }

    pub fn options(&self) -> &MockOptions {
        &self.options
    }

    /// Add a specification for `member`. Returns its registration sequence
    /// number, or `ArityMismatch` when the filter count differs from the
    /// member's arity.
    pub fn register(
        &self,
        member: MemberKey,
        filters: ArgumentFilters,
        behavior: Behavior,
    ) -> Result<u64, ExtractionError> {
        if filters.len() != member.arity() {
            return Err(ExtractionError::ArityMismatch {
                member: member.to_string(),
                expected: member.arity(),
                actual: filters.len(),
            });
        }

        let mut state = self.state.write();
        let sequence = state.next_registration;
        state.next_registration += 1;

        debug!(
            "{}: registered #{} {}{} -> {}",
            self.options.display_name(),
            sequence,
            member.name(),
            filters,
            behavior
        );

        let spec = InvocationSpecification::new(member.clone(), filters, behavior, sequence);
        state
            .specifications
            .entry(member)
            .or_default()
            .push(Arc::new(spec));
        Ok(sequence)
    }

    /// Extract `pattern` and register the result.
    pub fn when(&self, pattern: &PatternExpr, behavior: Behavior) -> Result<u64, ExtractionError> {
        let extracted = extract(pattern)?;
        self.register(extracted.member, extracted.filters, behavior)
    }

    /// Handle one real call of `member`.
    ///
    /// The most recently registered specification whose filters accept
    /// `args` handles the call; with no match the call returns the default
    /// for `returns`. The call is logged before its behavior runs, so a
    /// behavior that fails still leaves a record.
    pub fn dispatch(&self, member: &MemberKey, returns: &ReturnType, args: &[Value]) -> Outcome {
        let matched = {
            let mut state = self.state.write();
            let matched = state
                .specifications
                .get(member)
                .and_then(|specs| specs.iter().rev().find(|s| s.filters.matches(args)))
                .map(|spec| (Arc::clone(spec), spec.claim_step()));

            let sequence = state.next_invocation;
            state.next_invocation += 1;
            state.log.push(InvocationRecord {
                member: member.clone(),
                arguments: args.to_vec(),
                matched: matched.as_ref().map(|(spec, _)| Arc::clone(spec)),
                sequence,
                recorded_at: chrono::Utc::now(),
            });
            matched
        };

        match matched {
            Some((spec, step)) => {
                debug!(
                    "{}: {} matched #{} ({})",
                    self.options.display_name(),
                    describe_call(member, args),
                    spec.sequence,
                    spec.behavior
                );
                spec.execute(step, args, returns)
            }
            None => {
                if self.options.warn_on_unmatched {
                    warn!(
                        "{}: no specification matched {}, returning default",
                        self.options.display_name(),
                        describe_call(member, args)
                    );
                } else {
                    debug!(
                        "{}: {} unmatched, returning default",
                        self.options.display_name(),
                        describe_call(member, args)
                    );
                }
                Ok(returns.default_value())
            }
        }
    }

    /// Describe how `args` would be dispatched for `member` without logging
    /// the call or running any behavior.
    pub fn explain(&self, member: &MemberKey, args: &[Value]) -> MatchReport {
        let state = self.state.read();
        let specs = state.specifications.get(member);

        let candidates: Vec<CandidateInfo> = specs
            .map(|specs| {
                specs
                    .iter()
                    .rev()
                    .map(|spec| CandidateInfo::from_spec(spec, args))
                    .collect()
            })
            .unwrap_or_default();

        let winner = specs.and_then(|specs| specs.iter().rev().find(|s| s.filters.matches(args)));

        let reason = match (winner, specs) {
            (Some(_), _) => None,
            (None, None) => Some(format!("no specifications registered for {member}")),
            (None, Some(specs)) => Some(format!(
                "none of {} specification(s) matched",
                specs.len()
            )),
        };

        MatchReport {
            member: member.to_string(),
            arguments: args.iter().map(ToString::to_string).collect(),
            matched: winner.is_some(),
            matched_sequence: winner.map(|s| s.sequence),
            behavior: winner.map(|s| s.behavior.to_string()),
            candidates,
            reason,
        }
    }

    /// Snapshot of the whole invocation log in call order.
    pub fn invocations(&self) -> Vec<InvocationRecord> {
        self.state.read().log.clone()
    }

    /// Snapshot of the calls made to `member`, in call order.
    pub fn invocations_of(&self, member: &MemberKey) -> Vec<InvocationRecord> {
        self.state
            .read()
            .log
            .iter()
            .filter(|record| &record.member == member)
            .cloned()
            .collect()
    }

    pub fn invocation_count(&self) -> usize {
        self.state.read().log.len()
    }

    /// Number of specifications registered for `member`.
    pub fn specification_count(&self, member: &MemberKey) -> usize {
        self.state
            .read()
            .specifications
            .get(member)
            .map_or(0, Vec::len)
    }

    /// Run `f` over the invocation log under the read lock.
    pub(crate) fn with_log<R>(&self, f: impl FnOnce(&[InvocationRecord]) -> R) -> R {
        let state = self.state.read();
        f(&state.log)
    }
}

fn describe_call(member: &MemberKey, args: &[Value]) -> String {
    let args: Vec<String> = args.iter().map(ToString::to_string).collect();
    format!("{}({})", member.name(), args.join(", "))
}

//! Per-mock invocation registry.
//!
//! This module provides:
//! - `Mock`: the state owned by one mock instance, with `register`,
//!   `dispatch` and `explain`
//! - `InvocationSpecification` / `InvocationRecord`: configured patterns and
//!   the append-only call log
//! - `MatchReport`: a serializable account of a dispatch decision
//!
//! ## Module Structure
//!
//! - `types`: Specification, record and report types
//! - `core`: The `Mock` struct and the dispatch algorithm

mod core;
mod types;

#[cfg(test)]
mod tests;

pub use self::core::Mock;
pub use types::{CandidateInfo, InvocationRecord, InvocationSpecification, MatchReport};

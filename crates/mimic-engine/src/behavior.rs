//! Behaviors executed when a call matches a specification.
//!
//! A behavior is bound when the specification is configured and executed
//! at dispatch time with the actual arguments of the call.

use crate::member::ReturnType;
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

pub type ComputeFn = Arc<dyn Fn(&[Value]) -> Value + Send + Sync>;
pub type CallbackFn = Arc<dyn Fn(&[Value]) + Send + Sync>;
pub type FaultFactory = Arc<dyn Fn(&[Value]) -> Fault + Send + Sync>;

/// Result of dispatching one call: the value the mocked member returns, or
/// the fault it raises.
pub type Outcome = Result<Value, Fault>;

/// A failure raised by a `Throw` behavior, surfaced unchanged to the caller
/// of the mocked member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct Fault {
    pub kind: String,
    #[serde(default)]
    pub message: String,
}

impl Fault {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
        }
    }
}

/// Where a `Throw` behavior gets its fault from.
#[derive(Clone)]
pub enum ThrowSource {
    Value(Fault),
    Factory(FaultFactory),
}

/// What a matched call does.
#[derive(Clone)]
pub enum Behavior {
    ReturnConstant(Value),
    ReturnComputed(ComputeFn),
    Throw(ThrowSource),
    /// Run the callback, then return the member's default value
    Invoke(CallbackFn),
    PassThroughDefault,
    /// Successive matches run successive steps; the last step repeats
    Sequence(Vec<Behavior>),
}

impl Behavior {
    pub fn returns(value: impl Into<Value>) -> Self {
        Behavior::ReturnConstant(value.into())
    }

    pub fn returns_with<F>(func: F) -> Self
    where
        F: Fn(&[Value]) -> Value + Send + Sync + 'static,
    {
        Behavior::ReturnComputed(Arc::new(func))
    }

    pub fn throws(fault: Fault) -> Self {
        Behavior::Throw(ThrowSource::Value(fault))
    }

    pub fn throws_with<F>(factory: F) -> Self
    where
        F: Fn(&[Value]) -> Fault + Send + Sync + 'static,
    {
        Behavior::Throw(ThrowSource::Factory(Arc::new(factory)))
    }

    pub fn invoke<F>(callback: F) -> Self
    where
        F: Fn(&[Value]) + Send + Sync + 'static,
    {
        Behavior::Invoke(Arc::new(callback))
    }

    /// Build a sequence; an empty sequence behaves as `PassThroughDefault`.
    pub fn sequence<I: IntoIterator<Item = Behavior>>(steps: I) -> Self {
        let steps: Vec<Behavior> = steps.into_iter().collect();
        if steps.is_empty() {
            Behavior::PassThroughDefault
        } else {
            Behavior::Sequence(steps)
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Behavior::ReturnConstant(_) => "returnConstant",
            Behavior::ReturnComputed(_) => "returnComputed",
            Behavior::Throw(_) => "throw",
            Behavior::Invoke(_) => "invoke",
            Behavior::PassThroughDefault => "passThroughDefault",
            Behavior::Sequence(_) => "sequence",
        }
    }

    /// Execute against the actual arguments. A nested sequence runs its first
    /// step; only the outermost sequence advances a cursor.
    pub fn run(&self, args: &[Value], returns: &ReturnType) -> Outcome {
        match self {
            Behavior::ReturnConstant(value) => Ok(value.clone()),
            Behavior::ReturnComputed(func) => Ok(func(args)),
            Behavior::Throw(ThrowSource::Value(fault)) => Err(fault.clone()),
            Behavior::Throw(ThrowSource::Factory(factory)) => Err(factory(args)),
            Behavior::Invoke(callback) => {
                callback(args);
                Ok(returns.default_value())
            }
            Behavior::PassThroughDefault => Ok(returns.default_value()),
            Behavior::Sequence(steps) => match steps.first() {
                Some(step) => step.run(args, returns),
                None => Ok(returns.default_value()),
            },
        }
    }
}

impl fmt::Debug for Behavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Behavior::ReturnConstant(value) => f.debug_tuple("ReturnConstant").field(value).finish(),
            Behavior::Throw(ThrowSource::Value(fault)) => f.debug_tuple("Throw").field(fault).finish(),
            Behavior::Sequence(steps) => f.debug_tuple("Sequence").field(steps).finish(),
            other => f.write_str(other.kind()),
        }
    }
}

impl fmt::Display for Behavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Behavior::ReturnConstant(value) => write!(f, "returns {value}"),
            Behavior::ReturnComputed(_) => f.write_str("returns <computed>"),
            Behavior::Throw(ThrowSource::Value(fault)) => write!(f, "throws {fault}"),
            Behavior::Throw(ThrowSource::Factory(_)) => f.write_str("throws <computed>"),
            Behavior::Invoke(_) => f.write_str("invokes callback"),
            Behavior::PassThroughDefault => f.write_str("returns default"),
            Behavior::Sequence(steps) => write!(f, "sequence of {}", steps.len()),
        }
    }
}

/// Position of a specification within its `Sequence` behavior.
#[derive(Default)]
pub struct SequenceCursor(AtomicUsize);

impl SequenceCursor {
    #[must_use]
    pub const fn new() -> Self {
        Self(AtomicUsize::new(0))
    }

    /// Return the step index for this call and advance, saturating at the
    /// last step.
    pub fn advance(&self, step_count: usize) -> usize {
        let last = step_count.saturating_sub(1);
        let previous = self
            .0
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |idx| {
                Some(idx.saturating_add(1).min(last))
            })
            .unwrap_or_else(|e| {
                debug_assert!(false, "we never return None from fetch_update");
                e
            });
        previous.min(last)
    }

    pub fn peek(&self) -> usize {
        self.0.load(Ordering::Relaxed)
    }
}

impl fmt::Debug for SequenceCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SequenceCursor").field(&self.peek()).finish()
    }
}

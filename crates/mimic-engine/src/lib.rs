// Invocation specification, call matching and verification for mock objects.

// ===== Core data model =====
pub mod behavior;
pub mod config;
pub mod error;
pub mod member;
pub mod value;

// ===== Matching =====
pub mod filter;
pub mod pattern;
pub mod registry;
pub mod verify;

// ===== Declarative configuration =====
pub mod scenario;

pub use behavior::{Behavior, Fault, Outcome};
pub use config::MockOptions;
pub use error::ExtractionError;
pub use filter::{ArgumentFilter, ArgumentFilters, ANY, NOT_NULL, NULL};
pub use member::{Accessor, MemberKey, Parameter, PassingMode, ReturnType};
pub use pattern::{arg, extract, parse_pattern, MemberTable, PatternExpr};
pub use registry::{InvocationRecord, MatchReport, Mock};
pub use scenario::{LoadedScenario, Scenario, ScenarioError};
pub use value::{ObjectRef, TypeTag, Value};
pub use verify::{Times, VerificationError};

//! Declarative scenario files.
//!
//! A scenario names the members of a mocked type and the stubs to configure
//! on it, so a mock can be built from YAML or JSON instead of code.
//!
//! ## Module Structure
//!
//! - `types`: Serde types for the file format and `ScenarioError`
//! - `loader`: `Scenario` loading and `LoadedScenario`

mod loader;
mod types;

pub use loader::{LoadedScenario, Scenario};
pub use types::{json_to_value, MemberDecl, ScenarioError, ScenarioFile, StubDecl};

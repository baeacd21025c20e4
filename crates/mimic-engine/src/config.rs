//! Per-mock options.

use serde::{Deserialize, Serialize};

/// Options that change how a mock reports its activity. None of them affect
/// matching, logging of invocations, or the outcome of a call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MockOptions {
    /// Name used in log lines and verification messages
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Emit a warning for calls no specification matched
    #[serde(default, skip_serializing_if = "is_false")]
    pub warn_on_unmatched: bool,
}

fn is_false(b: &bool) -> bool {
    !*b
}

impl MockOptions {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("mock")
    }
}

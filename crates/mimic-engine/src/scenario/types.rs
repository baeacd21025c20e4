//! Type definitions for scenario files.
//!
//! A scenario file declares the members of a mocked type and the stubs
//! configured on it. Files are YAML or JSON with the same shape.

use crate::behavior::{Behavior, Fault};
use crate::config::MockOptions;
use crate::error::ExtractionError;
use crate::member::{MemberKey, ReturnType};
use crate::pattern::{MemberTable, ParseError};
use crate::value::{TypeTag, Value};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

// ============================================================================
// File Structure
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default)]
    pub options: MockOptions,

    /// Enumerations by name; members in ordinal order
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub enums: BTreeMap<String, Vec<String>>,

    /// Absent and empty are told apart so tooling can flag a missing list
    #[serde(default)]
    pub members: Option<Vec<MemberDecl>>,

    #[serde(default)]
    pub stubs: Vec<StubDecl>,
}

/// A declared method or property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MemberDecl {
    Method {
        method: String,
        #[serde(default)]
        parameters: Vec<String>,
        /// Omitted for void methods
        #[serde(default, skip_serializing_if = "Option::is_none")]
        returns: Option<String>,
    },
    Property {
        property: String,
        #[serde(rename = "type")]
        ty: String,
    },
}

impl MemberDecl {
    pub fn name(&self) -> &str {
        match self {
            MemberDecl::Method { method, .. } => method,
            MemberDecl::Property { property, .. } => property,
        }
    }

    /// Add this declaration to `table`. Returns `Ok(false)` when an
    /// identical member was already declared.
    pub fn declare_into(&self, table: &mut MemberTable) -> Result<bool, ScenarioError> {
        let unknown = |message: String| ScenarioError::UnknownType {
            member: self.name().to_string(),
            message,
        };
        match self {
            MemberDecl::Method {
                method,
                parameters,
                returns,
            } => {
                let parameters = parameters
                    .iter()
                    .map(|p| table.parse_parameter(p))
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(unknown)?;
                let returns = match returns.as_deref().map(str::trim) {
                    None | Some("void") => ReturnType::Void,
                    Some(ty) => ReturnType::Of(table.resolve_type(ty).map_err(unknown)?),
                };
                Ok(table.declare(MemberKey::method(method.clone(), parameters), returns))
            }
            MemberDecl::Property { property, ty } => {
                let ty = table.resolve_type(ty).map_err(unknown)?;
                Ok(table.declare_property(property.clone(), ty))
            }
        }
    }
}

/// A call pattern with the behavior to configure for it.
///
/// Exactly one of `returns`, `throws`, `sequence` or `default: true` must be
/// given.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StubDecl {
    pub when: String,

    /// `returns: null` is kept as an explicit null value
    #[serde(
        default,
        deserialize_with = "deserialize_present",
        skip_serializing_if = "Option::is_none"
    )]
    pub returns: Option<serde_json::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub throws: Option<Fault>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequence: Option<Vec<serde_json::Value>>,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub default: bool,
}

fn deserialize_present<'de, D>(deserializer: D) -> Result<Option<serde_json::Value>, D::Error>
where
    D: Deserializer<'de>,
{
    serde_json::Value::deserialize(deserializer).map(Some)
}

impl StubDecl {
    /// Number of behavior keys present.
    pub fn behavior_count(&self) -> usize {
        [
            self.returns.is_some(),
            self.throws.is_some(),
            self.sequence.is_some(),
            self.default,
        ]
        .iter()
        .filter(|present| **present)
        .count()
    }

    /// Build the configured behavior, converting values against the
    /// member's declared return type.
    pub fn behavior(&self, returns: &ReturnType, table: &MemberTable) -> Result<Behavior, String> {
        if self.behavior_count() != 1 {
            return Err(format!(
                "expected exactly one of returns, throws, sequence or default, found {}",
                self.behavior_count()
            ));
        }
        let expected = match returns {
            ReturnType::Of(tag) => tag,
            ReturnType::Void if self.returns.is_some() || self.sequence.is_some() => {
                return Err("void members cannot return a value".to_string());
            }
            ReturnType::Void => return Ok(self.value_free_behavior()),
        };

        if let Some(value) = &self.returns {
            return Ok(Behavior::ReturnConstant(json_to_value(value, Some(expected), table)?));
        }
        if let Some(steps) = &self.sequence {
            let steps = steps
                .iter()
                .map(|step| json_to_value(step, Some(expected), table).map(Behavior::ReturnConstant))
                .collect::<Result<Vec<_>, _>>()?;
            return Ok(Behavior::sequence(steps));
        }
        Ok(self.value_free_behavior())
    }

    fn value_free_behavior(&self) -> Behavior {
        match &self.throws {
            Some(fault) => Behavior::throws(fault.clone()),
            None => Behavior::PassThroughDefault,
        }
    }
}

/// Convert a file value to a runtime value. Strings become enum constants
/// when `expected` names a declared enumeration; numbers become floats when
/// `expected` is `float`. The result must fit `expected`: `null` only for
/// reference types, anything else only for its own type.
pub fn json_to_value(
    json: &serde_json::Value,
    expected: Option<&TypeTag>,
    table: &MemberTable,
) -> Result<Value, String> {
    let value = match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(*b),
        serde_json::Value::Number(n) => match (expected, n.as_i64()) {
            (Some(TypeTag::Float), _) | (_, None) => n
                .as_f64()
                .map(Value::Float)
                .ok_or_else(|| format!("number {n} is out of range"))?,
            (_, Some(i)) => Value::Int(i),
        },
        serde_json::Value::String(s) => match expected {
            Some(TypeTag::Enum(ty)) => table
                .enum_constant(ty, s)
                .ok_or_else(|| format!("'{s}' is not a member of enum {ty}"))?,
            _ => Value::Str(s.clone()),
        },
        serde_json::Value::Array(items) => items
            .iter()
            .map(|item| json_to_value(item, None, table))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::List)?,
        serde_json::Value::Object(_) => return Err("object values are not supported".to_string()),
    };

    match expected {
        Some(ty) if value.is_null() && ty.is_value_type() => {
            Err(format!("null does not fit value type {ty}"))
        }
        Some(ty) if !value.is_null() && value.type_tag().as_ref() != Some(ty) => {
            Err(format!("{value} does not fit type {ty}"))
        }
        _ => Ok(value),
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Failure to turn scenario text into a configured mock.
#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("scenario declares no members")]
    MissingMembers,

    #[error("member '{member}': {message}")]
    UnknownType { member: String, message: String },

    #[error("stub {index} ('{when}'): {source}")]
    Parse {
        index: usize,
        when: String,
        #[source]
        source: ParseError,
    },

    #[error("stub {index} ('{when}'): {source}")]
    Extraction {
        index: usize,
        when: String,
        #[source]
        source: ExtractionError,
    },

    #[error("stub {index} ('{when}'): {message}")]
    Behavior {
        index: usize,
        when: String,
        message: String,
    },
}

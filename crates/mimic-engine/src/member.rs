//! Logical identity of mocked members.
//!
//! A `MemberKey` identifies a method by name and ordered parameter list (so
//! overloads stay distinct) or a property accessor by name and accessor kind.
//! Equality and hashing use only this identity, so every configuration call
//! naming the same member lands in the same specification bucket.

use crate::value::{TypeTag, Value};
use std::fmt;
use std::str::FromStr;

/// How an argument is passed to a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PassingMode {
    #[default]
    In,
    Ref,
    Out,
}

impl PassingMode {
    /// By-reference and output-only parameters have no matchable pre-call value.
    pub fn is_by_reference(self) -> bool {
        matches!(self, PassingMode::Ref | PassingMode::Out)
    }
}

/// A formal parameter of a mocked method.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Parameter {
    pub ty: TypeTag,
    pub mode: PassingMode,
}

impl Parameter {
    pub fn new(ty: TypeTag) -> Self {
        Self {
            ty,
            mode: PassingMode::In,
        }
    }

    pub fn by_ref(ty: TypeTag) -> Self {
        Self {
            ty,
            mode: PassingMode::Ref,
        }
    }

    pub fn out(ty: TypeTag) -> Self {
        Self {
            ty,
            mode: PassingMode::Out,
        }
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.mode {
            PassingMode::In => write!(f, "{}", self.ty),
            PassingMode::Ref => write!(f, "ref {}", self.ty),
            PassingMode::Out => write!(f, "out {}", self.ty),
        }
    }
}

impl FromStr for Parameter {
    type Err = String;

    /// Parses `int`, `ref int` or `out Customer`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(rest) = s.strip_prefix("ref ") {
            Ok(Parameter::by_ref(rest.parse()?))
        } else if let Some(rest) = s.strip_prefix("out ") {
            Ok(Parameter::out(rest.parse()?))
        } else {
            Ok(Parameter::new(s.parse()?))
        }
    }
}

/// Property accessor kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Accessor {
    Get,
    Set,
}

/// Identity of a method or property accessor.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MemberKey {
    Method {
        name: String,
        parameters: Vec<Parameter>,
    },
    Property {
        name: String,
        accessor: Accessor,
    },
}

impl MemberKey {
    pub fn method(name: impl Into<String>, parameters: Vec<Parameter>) -> Self {
        MemberKey::Method {
            name: name.into(),
            parameters,
        }
    }

    pub fn getter(name: impl Into<String>) -> Self {
        MemberKey::Property {
            name: name.into(),
            accessor: Accessor::Get,
        }
    }

    pub fn setter(name: impl Into<String>) -> Self {
        MemberKey::Property {
            name: name.into(),
            accessor: Accessor::Set,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            MemberKey::Method { name, .. } | MemberKey::Property { name, .. } => name,
        }
    }

    /// Number of actual arguments a call of this member carries.
    pub fn arity(&self) -> usize {
        match self {
            MemberKey::Method { parameters, .. } => parameters.len(),
            MemberKey::Property {
                accessor: Accessor::Get,
                ..
            } => 0,
            MemberKey::Property {
                accessor: Accessor::Set,
                ..
            } => 1,
        }
    }

    /// Passing mode of the parameter at `index`. Setter values are always `In`.
    pub fn parameter_mode(&self, index: usize) -> PassingMode {
        match self {
            MemberKey::Method { parameters, .. } => parameters
                .get(index)
                .map(|p| p.mode)
                .unwrap_or_default(),
            MemberKey::Property { .. } => PassingMode::In,
        }
    }
}

impl fmt::Display for MemberKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemberKey::Method { name, parameters } => {
                write!(f, "{name}(")?;
                for (i, param) in parameters.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{param}")?;
                }
                f.write_str(")")
            }
            MemberKey::Property {
                name,
                accessor: Accessor::Get,
            } => write!(f, "{name}.get"),
            MemberKey::Property {
                name,
                accessor: Accessor::Set,
            } => write!(f, "{name}.set"),
        }
    }
}

/// Declared return type of a member, used for the unmatched-call fallback.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ReturnType {
    #[default]
    Void,
    Of(TypeTag),
}

impl ReturnType {
    /// `Unit` for void members, otherwise the type's default value.
    pub fn default_value(&self) -> Value {
        match self {
            ReturnType::Void => Value::Unit,
            ReturnType::Of(ty) => ty.default_value(),
        }
    }
}

impl From<TypeTag> for ReturnType {
    fn from(ty: TypeTag) -> Self {
        ReturnType::Of(ty)
    }
}

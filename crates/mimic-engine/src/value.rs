//! Runtime values passed to and returned from mocked members.
//!
//! - `Value` - a dynamically typed actual argument or return value
//! - `TypeTag` - the declared type of a parameter, return value or filter
//! - `ObjectRef` - a reference-like value compared by identity
//!
//! Value-like variants (`List`, `Str`, numbers) are snapshotted by copy when a
//! call is recorded; `Object` is snapshotted by reference, so later mutation of
//! the referenced data is visible but the identity of the recorded argument is not.

use serde::{Deserialize, Serialize};
use std::any::Any;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Declared type of a parameter, property or return value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TypeTag {
    Bool,
    Int,
    Float,
    Str,
    List,
    /// Named enumeration; values are ordinals
    Enum(String),
    /// Named reference type
    Object(String),
}

impl TypeTag {
    /// Value types default to their zero value, reference types to `Null`.
    pub fn is_value_type(&self) -> bool {
        matches!(
            self,
            TypeTag::Bool | TypeTag::Int | TypeTag::Float | TypeTag::Enum(_)
        )
    }

    /// The value a member of this type yields when nothing was configured.
    pub fn default_value(&self) -> Value {
        match self {
            TypeTag::Bool => Value::Bool(false),
            TypeTag::Int => Value::Int(0),
            TypeTag::Float => Value::Float(0.0),
            TypeTag::Enum(name) => Value::Enum {
                ty: name.clone(),
                ordinal: 0,
            },
            TypeTag::Str | TypeTag::List | TypeTag::Object(_) => Value::Null,
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeTag::Bool => f.write_str("bool"),
            TypeTag::Int => f.write_str("int"),
            TypeTag::Float => f.write_str("float"),
            TypeTag::Str => f.write_str("string"),
            TypeTag::List => f.write_str("list"),
            TypeTag::Enum(name) => write!(f, "enum:{name}"),
            TypeTag::Object(name) => f.write_str(name),
        }
    }
}

impl FromStr for TypeTag {
    type Err = String;

    /// Primitive names are lowercase; `enum:Name` names an enumeration and any
    /// other identifier starting with an uppercase letter names a reference type.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s {
            "bool" => Ok(TypeTag::Bool),
            "int" => Ok(TypeTag::Int),
            "float" => Ok(TypeTag::Float),
            "string" => Ok(TypeTag::Str),
            "list" => Ok(TypeTag::List),
            _ => {
                if let Some(name) = s.strip_prefix("enum:") {
                    if is_type_identifier(name) {
                        return Ok(TypeTag::Enum(name.to_string()));
                    }
                } else if is_type_identifier(s) {
                    return Ok(TypeTag::Object(s.to_string()));
                }
                Err(format!("unknown type name: '{s}'"))
            }
        }
    }
}

fn is_type_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_uppercase() => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
        }
        _ => false,
    }
}

impl TryFrom<String> for TypeTag {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TypeTag> for String {
    fn from(tag: TypeTag) -> Self {
        tag.to_string()
    }
}

/// A reference-like value. Two `ObjectRef`s are equal only when they point at
/// the same allocation.
#[derive(Clone)]
pub struct ObjectRef {
    type_name: Arc<str>,
    inner: Arc<dyn Any + Send + Sync>,
}

impl ObjectRef {
    pub fn new<T: Any + Send + Sync>(type_name: impl Into<Arc<str>>, value: T) -> Self {
        Self {
            type_name: type_name.into(),
            inner: Arc::new(value),
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.downcast_ref::<T>()
    }

    /// Identity comparison on the data pointer (vtable pointers are ignored).
    pub fn ptr_eq(&self, other: &ObjectRef) -> bool {
        std::ptr::eq(
            Arc::as_ptr(&self.inner) as *const (),
            Arc::as_ptr(&other.inner) as *const (),
        )
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}@{:p}",
            self.type_name,
            Arc::as_ptr(&self.inner) as *const ()
        )
    }
}

impl PartialEq for ObjectRef {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

/// A dynamically typed argument or return value.
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// Result of a member that returns nothing
    Unit,
    /// Absent value
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Enum { ty: String, ordinal: i64 },
    List(Vec<Value>),
    Object(ObjectRef),
}

impl Value {
    /// Runtime type of this value; `Null` and `Unit` have none.
    pub fn type_tag(&self) -> Option<TypeTag> {
        match self {
            Value::Unit | Value::Null => None,
            Value::Bool(_) => Some(TypeTag::Bool),
            Value::Int(_) => Some(TypeTag::Int),
            Value::Float(_) => Some(TypeTag::Float),
            Value::Str(_) => Some(TypeTag::Str),
            Value::Enum { ty, .. } => Some(TypeTag::Enum(ty.clone())),
            Value::List(_) => Some(TypeTag::List),
            Value::Object(obj) => Some(TypeTag::Object(obj.type_name().to_string())),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Ordering between values of the same kind. Numbers of different kinds,
    /// enums of different types and all other combinations are unordered.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
            (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
            (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
            (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
            (
                Value::Enum { ty: ta, ordinal: a },
                Value::Enum { ty: tb, ordinal: b },
            ) if ta == tb => Some(a.cmp(b)),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    /// Structural equality without coercion: `Int(3) != Float(3.0)`. NaN
    /// equals NaN, so a recorded NaN argument can be matched and verified.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Unit, Value::Unit) | (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b || (a.is_nan() && b.is_nan()),
            (Value::Str(a), Value::Str(b)) => a == b,
            (
                Value::Enum { ty: ta, ordinal: a },
                Value::Enum { ty: tb, ordinal: b },
            ) => ta == tb && a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Unit => f.write_str("()"),
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x:?}"),
            Value::Str(s) => write!(f, "{s:?}"),
            Value::Enum { ty, ordinal } => write!(f, "{ty}({ordinal})"),
            Value::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Value::Object(obj) => write!(f, "<{obj:?}>"),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl From<ObjectRef> for Value {
    fn from(obj: ObjectRef) -> Self {
        Value::Object(obj)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Value::Null, Into::into)
    }
}

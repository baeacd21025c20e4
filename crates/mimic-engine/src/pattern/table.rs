//! Declared members and enumerations of a mocked type.
//!
//! The text parser resolves member, type and enum names through this table;
//! scenario-built mocks read declared return types from it.

use crate::member::{Accessor, MemberKey, Parameter, ReturnType};
use crate::value::{TypeTag, Value};
use std::collections::HashMap;

/// A member together with its declared return type.
#[derive(Debug, Clone, PartialEq)]
pub struct DeclaredMember {
    pub key: MemberKey,
    pub returns: ReturnType,
}

#[derive(Debug, Clone, Default)]
pub struct MemberTable {
    members: Vec<DeclaredMember>,
    enums: HashMap<String, Vec<String>>,
}

impl MemberTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a member. Returns `false` (and keeps the first declaration)
    /// when the same key was declared before.
    pub fn declare(&mut self, key: MemberKey, returns: ReturnType) -> bool {
        if self.contains(&key) {
            return false;
        }
        self.members.push(DeclaredMember { key, returns });
        true
    }

    pub fn declare_method(
        &mut self,
        name: impl Into<String>,
        parameters: Vec<Parameter>,
        returns: ReturnType,
    ) -> MemberKey {
        let key = MemberKey::method(name, parameters);
        self.declare(key.clone(), returns);
        key
    }

    /// Declare both accessors of a property of type `ty`.
    pub fn declare_property(&mut self, name: impl Into<String>, ty: TypeTag) -> bool {
        let name = name.into();
        let added = self.declare(MemberKey::getter(name.clone()), ReturnType::Of(ty));
        self.declare(MemberKey::setter(name), ReturnType::Void) && added
    }

    pub fn declare_enum(&mut self, name: impl Into<String>, members: Vec<String>) {
        self.enums.insert(name.into(), members);
    }

    pub fn members(&self) -> &[DeclaredMember] {
        &self.members
    }

    pub fn contains(&self, key: &MemberKey) -> bool {
        self.members.iter().any(|m| &m.key == key)
    }

    /// Declared return type, `Void` for undeclared members.
    pub fn returns(&self, key: &MemberKey) -> ReturnType {
        self.members
            .iter()
            .find(|m| &m.key == key)
            .map(|m| m.returns.clone())
            .unwrap_or_default()
    }

    /// Resolve a method by name. A name with a single declaration resolves
    /// regardless of `arity`, so the extractor can report the mismatch;
    /// overloads are told apart by arity.
    pub fn resolve_method(&self, name: &str, arity: usize) -> Result<&MemberKey, String> {
        let candidates: Vec<&MemberKey> = self
            .members
            .iter()
            .map(|m| &m.key)
            .filter(|key| matches!(key, MemberKey::Method { .. }) && key.name() == name)
            .collect();

        match candidates.as_slice() {
            [] => Err(format!("unknown method '{name}'")),
            [only] => Ok(*only),
            _ => {
                let by_arity: Vec<&MemberKey> = candidates
                    .iter()
                    .copied()
                    .filter(|key| key.arity() == arity)
                    .collect();
                match by_arity.as_slice() {
                    [only] => Ok(*only),
                    [] => Err(format!(
                        "no overload of '{name}' takes {arity} argument(s)"
                    )),
                    _ => Err(format!(
                        "ambiguous call to '{name}' with {arity} argument(s)"
                    )),
                }
            }
        }
    }

    pub fn resolve_property(&self, name: &str, accessor: Accessor) -> Option<&MemberKey> {
        self.members.iter().map(|m| &m.key).find(|key| {
            matches!(key, MemberKey::Property { name: n, accessor: a } if n == name && *a == accessor)
        })
    }

    /// Resolve a type name, preferring declared enums.
    pub fn resolve_type(&self, name: &str) -> Result<TypeTag, String> {
        let name = name.trim();
        if self.enums.contains_key(name) {
            return Ok(TypeTag::Enum(name.to_string()));
        }
        name.parse()
    }

    /// Parse `int`, `ref Color` or `out Customer` against this table.
    pub fn parse_parameter(&self, spec: &str) -> Result<Parameter, String> {
        let spec = spec.trim();
        if let Some(rest) = spec.strip_prefix("ref ") {
            Ok(Parameter::by_ref(self.resolve_type(rest)?))
        } else if let Some(rest) = spec.strip_prefix("out ") {
            Ok(Parameter::out(self.resolve_type(rest)?))
        } else {
            Ok(Parameter::new(self.resolve_type(spec)?))
        }
    }

    /// Value of `Type.Member` for a declared enum; the ordinal is the
    /// member's position in the declaration.
    pub fn enum_constant(&self, ty: &str, member: &str) -> Option<Value> {
        let members = self.enums.get(ty)?;
        let ordinal = members.iter().position(|m| m == member)?;
        Some(Value::Enum {
            ty: ty.to_string(),
            ordinal: ordinal as i64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> MemberTable {
        let mut table = MemberTable::new();
        table.declare_enum("Color", vec!["Red".into(), "Green".into()]);
        table.declare_method("add", vec![Parameter::new(TypeTag::Int); 2], TypeTag::Int.into());
        table.declare_method("log", vec![Parameter::new(TypeTag::Str)], ReturnType::Void);
        table.declare_method(
            "log",
            vec![Parameter::new(TypeTag::Str), Parameter::new(TypeTag::Int)],
            ReturnType::Void,
        );
        table.declare_property("Name", TypeTag::Str);
        table
    }

    #[test]
    fn test_resolve_method_overloads() {
        let table = table();
        assert_eq!(table.resolve_method("add", 5).unwrap().arity(), 2);
        assert_eq!(table.resolve_method("log", 2).unwrap().arity(), 2);
        assert!(table.resolve_method("log", 3).is_err());
        assert!(table.resolve_method("missing", 0).is_err());
    }

    #[test]
    fn test_duplicate_declaration_is_reported() {
        let mut table = table();
        assert!(!table.declare(
            MemberKey::method("add", vec![Parameter::new(TypeTag::Int); 2]),
            ReturnType::Void
        ));
        assert_eq!(
            table.returns(&MemberKey::method("add", vec![Parameter::new(TypeTag::Int); 2])),
            ReturnType::Of(TypeTag::Int)
        );
    }

    #[test]
    fn test_properties_and_enums() {
        let table = table();
        assert!(table.resolve_property("Name", Accessor::Set).is_some());
        assert_eq!(
            table.returns(&MemberKey::getter("Name")),
            ReturnType::Of(TypeTag::Str)
        );
        assert_eq!(
            table.resolve_type("Color").unwrap(),
            TypeTag::Enum("Color".into())
        );
        assert_eq!(
            table.enum_constant("Color", "Green"),
            Some(Value::Enum {
                ty: "Color".into(),
                ordinal: 1
            })
        );
        assert_eq!(table.enum_constant("Color", "Blue"), None);
        assert_eq!(
            table.parse_parameter("ref Color").unwrap(),
            Parameter::by_ref(TypeTag::Enum("Color".into()))
        );
    }
}

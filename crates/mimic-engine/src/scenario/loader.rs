//! Loading scenario files into configured mocks.

use super::types::{ScenarioError, ScenarioFile};
use crate::behavior::Outcome;
use crate::config::MockOptions;
use crate::member::{Accessor, MemberKey};
use crate::pattern::{extract, parse_pattern, MemberTable};
use crate::registry::Mock;
use crate::value::Value;
use crate::verify::{Times, VerificationError};
use anyhow::Context;
use std::path::Path;
use tracing::{info, warn};

/// A parsed scenario whose member declarations have been resolved.
#[derive(Debug, Clone)]
pub struct Scenario {
    file: ScenarioFile,
    table: MemberTable,
}

impl Scenario {
    /// Load a scenario file; `.json` files are read as JSON, anything else
    /// as YAML.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, anyhow::Error> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read scenario file {}", path.display()))?;

        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let scenario = if is_json {
            Self::from_json_str(&contents)
        } else {
            Self::from_yaml_str(&contents)
        };
        scenario.with_context(|| format!("invalid scenario file {}", path.display()))
    }

    pub fn from_yaml_str(text: &str) -> Result<Self, ScenarioError> {
        Self::from_parsed(serde_yaml::from_str(text)?)
    }

    pub fn from_json_str(text: &str) -> Result<Self, ScenarioError> {
        Self::from_parsed(serde_json::from_str(text)?)
    }

    /// Resolve the declarations of an already parsed file.
    pub fn from_parsed(file: ScenarioFile) -> Result<Self, ScenarioError> {
        let table = Self::member_table(&file)?;
        Ok(Self { file, table })
    }

    fn member_table(file: &ScenarioFile) -> Result<MemberTable, ScenarioError> {
        let members = file.members.as_ref().ok_or(ScenarioError::MissingMembers)?;

        let mut table = MemberTable::new();
        for (name, values) in &file.enums {
            table.declare_enum(name.clone(), values.clone());
        }
        for decl in members {
            if !decl.declare_into(&mut table)? {
                warn!("Member '{}' declared more than once; keeping the first", decl.name());
            }
        }
        Ok(table)
    }

    pub fn file(&self) -> &ScenarioFile {
        &self.file
    }

    pub fn table(&self) -> &MemberTable {
        &self.table
    }

    /// Options for the built mock; the scenario name is used when the
    /// options do not carry one.
    pub fn options(&self) -> MockOptions {
        let mut options = self.file.options.clone();
        if options.name.is_none() {
            options.name = self.file.name.clone();
        }
        options
    }

    /// Create a mock and register every stub in file order.
    pub fn build(&self) -> Result<LoadedScenario, ScenarioError> {
        let mock = Mock::with_options(self.options());

        for (index, stub) in self.file.stubs.iter().enumerate() {
            let pattern =
                parse_pattern(&stub.when, &self.table).map_err(|source| ScenarioError::Parse {
                    index,
                    when: stub.when.clone(),
                    source,
                })?;
            let extracted = extract(&pattern).map_err(|source| ScenarioError::Extraction {
                index,
                when: stub.when.clone(),
                source,
            })?;
            let returns = self.table.returns(&extracted.member);
            let behavior = stub.behavior(&returns, &self.table).map_err(|message| {
                ScenarioError::Behavior {
                    index,
                    when: stub.when.clone(),
                    message,
                }
            })?;
            mock.register(extracted.member, extracted.filters, behavior)
                .map_err(|source| ScenarioError::Extraction {
                    index,
                    when: stub.when.clone(),
                    source,
                })?;
        }

        info!(
            "Loaded scenario '{}' with {} member(s) and {} stub(s)",
            mock.options().display_name(),
            self.table.members().len(),
            self.file.stubs.len()
        );

        Ok(LoadedScenario {
            mock,
            table: self.table.clone(),
        })
    }
}

/// A mock built from a scenario, with the declarations needed to call it
/// by name.
#[derive(Debug)]
pub struct LoadedScenario {
    pub mock: Mock,
    pub table: MemberTable,
}

impl LoadedScenario {
    /// Call a declared method by name; overloads are resolved by arity.
    pub fn call(&self, name: &str, args: &[Value]) -> Result<Outcome, String> {
        let member = self.table.resolve_method(name, args.len())?.clone();
        if member.arity() != args.len() {
            return Err(format!(
                "{member} takes {} argument(s) but {} were supplied",
                member.arity(),
                args.len()
            ));
        }
        Ok(self.dispatch(&member, args))
    }

    /// Read a declared property.
    pub fn get(&self, property: &str) -> Result<Outcome, String> {
        let member = self.property(property, Accessor::Get)?;
        Ok(self.dispatch(&member, &[]))
    }

    /// Assign a declared property.
    pub fn set(&self, property: &str, value: Value) -> Result<Outcome, String> {
        let member = self.property(property, Accessor::Set)?;
        Ok(self.dispatch(&member, &[value]))
    }

    /// Verify calls described by a pattern in the scenario's text syntax.
    pub fn verify(&self, pattern: &str, times: Times) -> Result<(), VerificationError> {
        let pattern = parse_pattern(pattern, &self.table)?;
        self.mock.verify_pattern(&pattern, times)
    }

    fn property(&self, name: &str, accessor: Accessor) -> Result<MemberKey, String> {
        self.table
            .resolve_property(name, accessor)
            .cloned()
            .ok_or_else(|| format!("unknown property '{name}'"))
    }

    fn dispatch(&self, member: &MemberKey, args: &[Value]) -> Outcome {
        self.mock.dispatch(member, &self.table.returns(member), args)
    }
}

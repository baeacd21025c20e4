//! Core validation logic for scenario files.

use crate::types::{LintIssue, LintOptions, LintResult};
use mimic_engine::filter::ArgumentFilters;
use mimic_engine::pattern::{extract, parse_pattern, MemberTable};
use mimic_engine::scenario::{ScenarioError, ScenarioFile, StubDecl};
use mimic_engine::MemberKey;
use std::collections::HashSet;
use std::path::Path;
use tracing::debug;

/// A stub that compiled: its index, target and filters.
#[derive(Debug)]
struct CompiledStub {
    index: usize,
    member: MemberKey,
    filters: ArgumentFilters,
}

/// Validate a complete, already parsed scenario.
pub fn validate_scenario(
    file: &Path,
    scenario: &ScenarioFile,
    result: &mut LintResult,
    options: &LintOptions,
) {
    let Some(table) = validate_members(file, scenario, result) else {
        return;
    };

    if scenario.stubs.is_empty() {
        result.add_issue(
            LintIssue::info("I001", "Scenario configures no stubs", file)
                .with_location("stubs")
                .with_suggestion("Every call will return its member's default value"),
        );
        return;
    }

    let compiled: Vec<CompiledStub> = scenario
        .stubs
        .iter()
        .enumerate()
        .filter_map(|(idx, stub)| validate_stub(file, stub, idx, &table, result, options))
        .collect();

    check_shadowed_stubs(file, &compiled, result);
    check_unstubbed_members(file, &table, &compiled, result);
}

/// Declare every member, reporting missing lists, unknown types and
/// duplicates. Returns `None` when stubs cannot be checked.
fn validate_members(
    file: &Path,
    scenario: &ScenarioFile,
    result: &mut LintResult,
) -> Option<MemberTable> {
    let Some(members) = &scenario.members else {
        result.add_issue(
            LintIssue::error("E003", "Missing required field: members", file)
                .with_suggestion("Declare the methods and properties of the mocked type"),
        );
        return None;
    };

    let mut table = MemberTable::new();
    for (name, values) in &scenario.enums {
        table.declare_enum(name.clone(), values.clone());
    }

    for (idx, decl) in members.iter().enumerate() {
        let location = format!("members[{idx}]");
        match decl.declare_into(&mut table) {
            Ok(true) => {}
            Ok(false) => result.add_issue(
                LintIssue::warning(
                    "W001",
                    format!("Member '{}' is declared more than once", decl.name()),
                    file,
                )
                .with_location(location)
                .with_suggestion("Remove the duplicate; the first declaration is used"),
            ),
            Err(ScenarioError::UnknownType { message, .. }) => result.add_issue(
                LintIssue::error("E004", message, file)
                    .with_location(location)
                    .with_suggestion(
                        "Use bool, int, float, string, list, a declared enum or a capitalized type name",
                    ),
            ),
            Err(other) => result.add_issue(
                LintIssue::error("E004", other.to_string(), file).with_location(location),
            ),
        }
    }
    Some(table)
}

/// Validate one stub. Returns the compiled stub when its pattern extracts.
fn validate_stub(
    file: &Path,
    stub: &StubDecl,
    idx: usize,
    table: &MemberTable,
    result: &mut LintResult,
    options: &LintOptions,
) -> Option<CompiledStub> {
    let location = format!("stubs[{idx}]");

    let behaviors = stub.behavior_count();
    if behaviors != 1 {
        let message = if behaviors == 0 {
            "Stub has no behavior".to_string()
        } else {
            format!("Stub has {behaviors} behaviors")
        };
        result.add_issue(
            LintIssue::error("E007", message, file)
                .with_location(&location)
                .with_suggestion("Use exactly one of returns, throws, sequence or default: true"),
        );
    }

    let pattern = match parse_pattern(&stub.when, table) {
        Ok(pattern) => pattern,
        Err(e) => {
            result.add_issue(
                LintIssue::error("E005", format!("Invalid call pattern '{}': {e}", stub.when), file)
                    .with_location(format!("{location}.when")),
            );
            return None;
        }
    };

    let extracted = match extract(&pattern) {
        Ok(extracted) => extracted,
        Err(e) => {
            result.add_issue(
                LintIssue::error("E006", e.to_string(), file)
                    .with_location(format!("{location}.when")),
            );
            return None;
        }
    };

    if behaviors == 1 {
        let returns = table.returns(&extracted.member);
        if let Err(message) = stub.behavior(&returns, table) {
            result.add_issue(
                LintIssue::error("E008", message, file)
                    .with_location(&location)
                    .with_suggestion(format!("Values must fit the return type of {}", extracted.member)),
            );
        }
    }

    if options.verbose {
        debug!(
            "{}: stub {} targets {} with {}",
            file.display(),
            idx,
            extracted.member,
            extracted.filters
        );
    }

    Some(CompiledStub {
        index: idx,
        member: extracted.member,
        filters: extracted.filters,
    })
}

/// A stub is unreachable when a later stub has the same member and filters.
fn check_shadowed_stubs(file: &Path, compiled: &[CompiledStub], result: &mut LintResult) {
    for (pos, stub) in compiled.iter().enumerate() {
        let later = compiled[pos + 1..]
            .iter()
            .find(|other| other.member == stub.member && other.filters == stub.filters);
        if let Some(later) = later {
            result.add_issue(
                LintIssue::warning(
                    "W002",
                    format!(
                        "Stub {} is shadowed by stub {} with the same pattern",
                        stub.index, later.index
                    ),
                    file,
                )
                .with_location(format!("stubs[{}]", stub.index))
                .with_suggestion("Later stubs take precedence; remove or reorder one of them"),
            );
        }
    }
}

/// Report declared members no stub targets. A property counts as stubbed
/// when either accessor is.
fn check_unstubbed_members(
    file: &Path,
    table: &MemberTable,
    compiled: &[CompiledStub],
    result: &mut LintResult,
) {
    let stubbed: HashSet<&MemberKey> = compiled.iter().map(|c| &c.member).collect();
    let stubbed_properties: HashSet<&str> = compiled
        .iter()
        .filter(|c| matches!(c.member, MemberKey::Property { .. }))
        .map(|c| c.member.name())
        .collect();

    for declared in table.members() {
        let unused = match &declared.key {
            MemberKey::Method { .. } => !stubbed.contains(&declared.key),
            MemberKey::Property { name, accessor } => {
                *accessor == mimic_engine::Accessor::Get
                    && !stubbed_properties.contains(name.as_str())
            }
        };
        if unused {
            result.add_issue(
                LintIssue::warning(
                    "W003",
                    format!("Member {} is never stubbed", declared.key),
                    file,
                )
                .with_location("members"),
            );
        }
    }
}

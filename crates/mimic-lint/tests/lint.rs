//! Integration tests for scenario linting.

use mimic_lint::{lint_directory, lint_file, lint_str, Format, LintOptions, Severity};
use std::fs;
use std::path::Path;

const CLEAN: &str = r#"
name: calculator
enums:
  Color: [Red, Green]
members:
  - method: add
    parameters: [int, int]
    returns: int
  - method: paint
    parameters: [Color]
    returns: Color
  - property: Name
    type: string
stubs:
  - when: "add(IsAny<int>(), 3)"
    returns: 7
  - when: "paint(Color.Red)"
    returns: Green
  - when: "Name"
    sequence: [a, b]
"#;

fn lint_yaml(text: &str) -> mimic_lint::LintResult {
    lint_str(text, Format::Yaml, Path::new("test.yaml"), &LintOptions::default())
}

#[test]
fn test_clean_scenario_has_no_issues() {
    let result = lint_yaml(CLEAN);
    assert!(result.issues.is_empty(), "unexpected issues: {:?}", result.issues);
    assert_eq!(result.files_checked, 1);
}

#[test]
fn test_invalid_yaml() {
    let result = lint_yaml("members: [\n");
    assert_eq!(result.codes(), vec!["E002"]);
}

#[test]
fn test_invalid_json() {
    let result = lint_str("{", Format::Json, Path::new("x.json"), &LintOptions::default());
    assert_eq!(result.codes(), vec!["E002"]);
    assert!(result.issues[0].message.starts_with("Invalid JSON"));
}

#[test]
fn test_missing_members() {
    let result = lint_yaml("stubs: []\n");
    assert_eq!(result.codes(), vec!["E003"]);
}

#[test]
fn test_unknown_type_and_duplicate_member() {
    let yaml = r#"
members:
  - method: add
    parameters: [int, int]
  - method: add
    parameters: [int, int]
  - method: scale
    parameters: [decimal]
stubs:
  - when: "add(1, 2)"
    default: true
"#;
    let result = lint_yaml(yaml);
    let codes = result.codes();
    assert!(codes.contains(&"W001"));
    assert!(codes.contains(&"E004"));
    let e004 = result.issues.iter().find(|i| i.code == "E004").unwrap();
    assert_eq!(e004.location.as_deref(), Some("members[2]"));
}

#[test]
fn test_stub_pattern_errors() {
    let yaml = r#"
members:
  - method: add
    parameters: [int, int]
    returns: int
stubs:
  - when: "add(1, 2"
    returns: 1
  - when: "add(1)"
    returns: 1
  - when: "add(x, 2)"
    returns: 1
  - when: "add(1, 2)"
  - when: "add(2, 2)"
    returns: 1
    default: true
"#;
    let result = lint_yaml(yaml);
    let codes = result.codes();
    assert_eq!(codes.iter().filter(|c| **c == "E005").count(), 1);
    assert_eq!(codes.iter().filter(|c| **c == "E006").count(), 2);
    assert_eq!(codes.iter().filter(|c| **c == "E007").count(), 2);
    assert!(result.fails(false));
}

#[test]
fn test_deeply_nested_pattern_is_a_parse_error() {
    let yaml = format!(
        "members:\n  - method: count\n    parameters: [list]\n    returns: int\nstubs:\n  - when: \"count({}{})\"\n    returns: 1\n",
        "[".repeat(100_000),
        "]".repeat(100_000)
    );
    let result = lint_yaml(&yaml);
    assert_eq!(result.codes(), vec!["E005", "W003"]);
    assert!(result.issues[0].message.contains("nests deeper than"));
}

#[test]
fn test_bad_return_value() {
    let yaml = r#"
enums:
  Color: [Red]
members:
  - method: pick
    returns: Color
stubs:
  - when: "pick()"
    returns: Purple
"#;
    let result = lint_yaml(yaml);
    assert_eq!(result.codes(), vec!["E008"]);
}

#[test]
fn test_values_must_fit_the_return_type() {
    let yaml = r#"
members:
  - method: count
    parameters: [int]
    returns: int
  - method: reset
stubs:
  - when: "count(1)"
    returns: "abc"
  - when: "count(2)"
    returns: 3.5
  - when: "count(3)"
    sequence: [1, null]
  - when: "reset()"
    returns: 5
"#;
    let result = lint_yaml(yaml);
    assert_eq!(result.codes(), vec!["E008", "E008", "E008", "E008"]);
    let locations: Vec<_> = result
        .issues
        .iter()
        .filter_map(|i| i.location.as_deref())
        .collect();
    assert_eq!(locations, vec!["stubs[0]", "stubs[1]", "stubs[2]", "stubs[3]"]);
}

#[test]
fn test_shadowed_and_unstubbed() {
    let yaml = r#"
members:
  - method: add
    parameters: [int, int]
    returns: int
  - method: reset
  - property: Name
    type: string
stubs:
  - when: "add(1, IsAny<int>())"
    returns: 1
  - when: "add(1, IsAny<int>())"
    returns: 2
  - when: "add(1, 2)"
    returns: 3
  - when: "Name = IsNotNull()"
    default: true
"#;
    let result = lint_yaml(yaml);
    let shadowed: Vec<_> = result.issues.iter().filter(|i| i.code == "W002").collect();
    assert_eq!(shadowed.len(), 1);
    assert_eq!(shadowed[0].location.as_deref(), Some("stubs[0]"));

    let unstubbed: Vec<_> = result.issues.iter().filter(|i| i.code == "W003").collect();
    assert_eq!(unstubbed.len(), 1);
    assert!(unstubbed[0].message.contains("reset()"));

    assert!(!result.fails(false));
    assert!(result.fails(true));
    assert!(result.issues.iter().all(|i| i.severity == Severity::Warning));
}

#[test]
fn test_no_stubs_is_info() {
    let yaml = "members:\n  - method: reset\n";
    let result = lint_yaml(yaml);
    assert_eq!(result.codes(), vec!["I001"]);
    assert!(!result.fails(true));
}

#[test]
fn test_files_and_directories() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.yaml"), CLEAN).unwrap();
    fs::write(dir.path().join("b.json"), r#"{"stubs": []}"#).unwrap();
    fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

    let result = lint_directory(dir.path(), &LintOptions::default());
    assert_eq!(result.files_checked, 2);
    assert_eq!(result.codes(), vec!["E003"]);
    assert!(result.issues[0].file.ends_with("b.json"));

    let missing = lint_file(&dir.path().join("missing.yml"), &LintOptions::default());
    assert_eq!(missing.codes(), vec!["E001"]);

    let not_a_dir = lint_directory(&dir.path().join("nope"), &LintOptions::default());
    assert_eq!(not_a_dir.codes(), vec!["E001"]);
}

//! Scenario file linting library for Mimic.
//!
//! This library checks scenario files (the YAML or JSON files a mock can be
//! built from) for problems before they are loaded. It can be used as a
//! standalone library or through the `mimic-lint` CLI binary.
//!
//! # Example
//!
//! ```no_run
//! use mimic_lint::{lint_file, lint_directory, LintOptions};
//! use std::path::Path;
//!
//! // Lint a single file
//! let result = lint_file(Path::new("calculator.yaml"), &LintOptions::default());
//!
//! // Lint a directory
//! let result = lint_directory(Path::new("./scenarios"), &LintOptions::default());
//!
//! if result.has_errors() {
//!     eprintln!("Found {} errors", result.errors);
//! }
//! ```

mod types;
mod validator;

use mimic_engine::scenario::ScenarioFile;
use std::path::Path;

// Re-export public types
pub use types::{LintIssue, LintOptions, LintResult, Severity};

pub use validator::validate_scenario;

/// Text format of a scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Yaml,
    Json,
}

impl Format {
    /// Format for a path, or `None` when the extension is not a scenario
    /// extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "yaml" | "yml" => Some(Format::Yaml),
            "json" => Some(Format::Json),
            _ => None,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Format::Yaml => "YAML",
            Format::Json => "JSON",
        }
    }
}

/// Lint a single scenario file. Files without a `.json` extension are read
/// as YAML.
pub fn lint_file(path: &Path, options: &LintOptions) -> LintResult {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            let mut result = LintResult::new();
            result.files_checked = 1;
            result.add_issue(LintIssue::error(
                "E001",
                format!("Failed to read file: {e}"),
                path,
            ));
            return result;
        }
    };

    let format = Format::from_path(path).unwrap_or(Format::Yaml);
    lint_str(&content, format, path, options)
}

/// Lint all scenario files (`.yaml`, `.yml`, `.json`) in a directory,
/// non-recursively and in file name order.
pub fn lint_directory(path: &Path, options: &LintOptions) -> LintResult {
    let mut result = LintResult::new();

    let entries = match std::fs::read_dir(path) {
        Ok(e) => e,
        Err(e) => {
            result.add_issue(LintIssue::error(
                "E001",
                format!("Failed to read directory: {e}"),
                path,
            ));
            return result;
        }
    };

    let mut files: Vec<_> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|p| p.is_file() && Format::from_path(p).is_some())
        .collect();
    files.sort();

    for file_path in files {
        result.merge(lint_file(&file_path, options));
    }
    result
}

/// Lint scenario text directly; `source` names it in reported issues.
pub fn lint_str(text: &str, format: Format, source: &Path, options: &LintOptions) -> LintResult {
    let mut result = LintResult::new();
    result.files_checked = 1;

    let parsed: Result<ScenarioFile, String> = match format {
        Format::Yaml => serde_yaml::from_str(text).map_err(|e| e.to_string()),
        Format::Json => serde_json::from_str(text).map_err(|e| e.to_string()),
    };

    match parsed {
        Ok(scenario) => validate_scenario(source, &scenario, &mut result, options),
        Err(e) => result.add_issue(
            LintIssue::error("E002", format!("Invalid {}: {e}", format.label()), source)
                .with_suggestion("Check the file against the scenario format"),
        ),
    }
    result
}

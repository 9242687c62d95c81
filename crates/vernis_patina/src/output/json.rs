//! JSON output for tooling integration.

use super::display_path;
use crate::diagnostic::{LintFailure, Severity};
use crate::linter::{FileLintResult, LintReport};
use serde::Serialize;
use std::path::Path;

/// JSON output structure for a single file
#[derive(Debug, Serialize)]
pub struct JsonFileResult {
    #[serde(rename = "filePath")]
    pub file_path: String,
    pub messages: Vec<JsonMessage>,
    #[serde(rename = "errorCount")]
    pub error_count: usize,
    #[serde(rename = "warningCount")]
    pub warning_count: usize,
    #[serde(rename = "fixCount")]
    pub fix_count: usize,
}

/// JSON output structure for a single message
#[derive(Debug, Serialize)]
pub struct JsonMessage {
    #[serde(rename = "ruleId")]
    pub rule_id: &'static str,
    /// 2 for errors, 1 for warnings
    pub severity: u8,
    pub message: String,
    pub line: u32,
    pub column: u32,
    #[serde(rename = "endLine")]
    pub end_line: u32,
    #[serde(rename = "endColumn")]
    pub end_column: u32,
    pub fixable: bool,
}

impl From<&LintFailure> for JsonMessage {
    fn from(failure: &LintFailure) -> Self {
        Self {
            rule_id: failure.rule_name,
            severity: match failure.severity {
                Severity::Error => 2,
                Severity::Warning => 1,
            },
            message: failure.message.to_string(),
            line: failure.start_position.line,
            column: failure.start_position.column,
            end_line: failure.end_position.line,
            end_column: failure.end_position.column,
            fixable: failure.fixable,
        }
    }
}

impl JsonFileResult {
    fn new(result: &FileLintResult, base: &Path) -> Self {
        let count = |severity: Severity| result.failures.iter().filter(|f| f.severity == severity).count();
        Self {
            file_path: display_path(&result.path, base),
            messages: result.failures.iter().map(JsonMessage::from).collect(),
            error_count: count(Severity::Error),
            warning_count: count(Severity::Warning),
            fix_count: result.fixes_applied,
        }
    }
}

/// Format a report as JSON. Files without failures are left out.
pub fn format_json(report: &LintReport, base: &Path) -> String {
    let results: Vec<JsonFileResult> = report
        .results
        .iter()
        .filter(|result| result.has_failures())
        .map(|result| JsonFileResult::new(result, base))
        .collect();

    serde_json::to_string_pretty(&results).unwrap_or_else(|_| "[]".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::test_utils::report;

    #[test]
    fn test_format_json() {
        let output = format_json(&report(), Path::new("/project"));
        insta::assert_snapshot!(output, @r#"
        [
          {
            "filePath": "src/App.vue",
            "messages": [
              {
                "ruleId": "no-unused-imports",
                "severity": 2,
                "message": "'a' is declared but its value is never read.",
                "line": 2,
                "column": 10,
                "endLine": 2,
                "endColumn": 11,
                "fixable": false
              },
              {
                "ruleId": "no-consecutive-blank-lines",
                "severity": 1,
                "message": "Consecutive blank lines are forbidden",
                "line": 4,
                "column": 1,
                "endLine": 5,
                "endColumn": 1,
                "fixable": false
              }
            ],
            "errorCount": 1,
            "warningCount": 1,
            "fixCount": 0
          }
        ]
        "#);
    }

    #[test]
    fn test_empty_report() {
        let output = format_json(&LintReport::new(), Path::new("/project"));
        assert_eq!(output, "[]");
    }
}

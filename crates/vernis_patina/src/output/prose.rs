//! Plain one-line-per-failure output.

use super::display_path;
use crate::diagnostic::Severity;
use crate::linter::LintReport;
use std::fmt::Write;
use std::path::Path;

/// Format a report as prose: applied fixes first, then one line per failure.
pub fn format_prose(report: &LintReport, base: &Path) -> String {
    let mut output = String::new();

    for result in report.results.iter().filter(|r| r.fixes_applied > 0) {
        let _ = writeln!(
            output,
            "Fixed {} error(s) in {}",
            result.fixes_applied,
            display_path(&result.path, base)
        );
    }

    let mut failures = report.failures().peekable();
    if !output.is_empty() && failures.peek().is_some() {
        output.push('\n');
    }
    for (result, failure) in failures {
        let severity = match failure.severity {
            Severity::Error => "ERROR",
            Severity::Warning => "WARNING",
        };
        let _ = writeln!(
            output,
            "{severity}: {}[{}, {}]: {}",
            display_path(&result.path, base),
            failure.start_position.line,
            failure.start_position.column,
            failure.message
        );
    }

    output
}

//! Rich terminal output using oxc_diagnostics.

use super::display_path;
use crate::linter::LintReport;
use oxc_diagnostics::{GraphicalReportHandler, GraphicalTheme, NamedSource};
use std::path::Path;
use std::sync::Arc;

/// Format a report as rich terminal output, followed by a summary line.
///
/// Returns an empty string when nothing failed.
pub fn format_text(report: &LintReport, base: &Path) -> String {
    if !report.has_failures() {
        return String::new();
    }

    let mut output = String::new();
    let handler = GraphicalReportHandler::new_themed(GraphicalTheme::unicode());

    for result in report.results.iter().filter(|r| r.has_failures()) {
        let named_source = Arc::new(NamedSource::new(
            display_path(&result.path, base),
            result.document.to_string(),
        ));

        for failure in &result.failures {
            let report = failure
                .to_oxc_diagnostic()
                .with_source_code(Arc::clone(&named_source));

            let mut buf = String::new();
            if handler.render_report(&mut buf, report.as_ref()).is_ok() {
                output.push_str(&buf);
                output.push('\n');
            }
        }
    }

    let summary = report.summary;
    output.push_str(&format_summary(
        summary.error_count,
        summary.warning_count,
        summary.file_count,
    ));
    output.push('\n');
    output
}

/// Format a summary line
pub fn format_summary(error_count: usize, warning_count: usize, file_count: usize) -> String {
    let plural = |n: usize| if n == 1 { "" } else { "s" };
    let mut parts = Vec::new();

    if error_count > 0 {
        parts.push(format!("{} error{}", error_count, plural(error_count)));
    }
    if warning_count > 0 {
        parts.push(format!("{} warning{}", warning_count, plural(warning_count)));
    }

    if parts.is_empty() {
        format!("No problems found in {} file{}", file_count, plural(file_count))
    } else {
        format!("{} in {} file{}", parts.join(", "), file_count, plural(file_count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::test_utils::report;

    #[test]
    fn test_format_text() {
        let output = format_text(&report(), Path::new("/project"));
        assert!(output.contains("'a' is declared but its value is never read. (no-unused-imports)"));
        assert!(output.contains("src/App.vue"));
        assert!(output.ends_with("1 error, 1 warning in 2 files\n"));
    }

    #[test]
    fn test_silent_when_clean() {
        assert_eq!(format_text(&LintReport::new(), Path::new("/project")), "");
    }

    #[test]
    fn test_format_summary() {
        assert_eq!(format_summary(0, 0, 1), "No problems found in 1 file");
        assert_eq!(format_summary(2, 0, 3), "2 errors in 3 files");
    }
}

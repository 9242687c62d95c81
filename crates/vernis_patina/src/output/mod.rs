//! Output formatters for lint reports.

mod json;
mod prose;
mod text;

pub use json::*;
pub use prose::*;
pub use text::*;

use crate::linter::LintReport;
use std::path::Path;
use std::str::FromStr;

/// Output format for lint results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Rich terminal output with colors and code snippets
    #[default]
    Text,
    /// JSON output for tooling integration
    Json,
    /// One line per failure
    Prose,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" | "stylish" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            "prose" => Ok(Self::Prose),
            other => Err(format!("unknown format '{other}' (expected text, json or prose)")),
        }
    }
}

/// Format a report according to the specified format.
///
/// Paths are shown relative to `base` when they are inside it.
pub fn format_results(report: &LintReport, base: &Path, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => format_text(report, base),
        OutputFormat::Json => format_json(report, base),
        OutputFormat::Prose => format_prose(report, base),
    }
}

/// What a lint run prints: the chosen format, the prose format when the
/// chosen one is silent about applied fixes, or a success line.
pub fn format_report(report: &LintReport, base: &Path, format: OutputFormat) -> String {
    let output = format_results(report, base, format);
    if !output.trim().is_empty() {
        return output;
    }
    if report.summary.fixed_count > 0 {
        return format_prose(report, base);
    }
    if !report.has_failures() {
        return "No lint errors found.\n".to_string();
    }
    output
}

pub(crate) fn display_path(path: &Path, base: &Path) -> String {
    path.strip_prefix(base).unwrap_or(path).display().to_string()
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::linter::FileLintResult;
    use std::path::PathBuf;
    use std::sync::Arc;

    fn clean(fixes_applied: usize) -> LintReport {
        let mut report = LintReport::new();
        report.push(FileLintResult {
            path: PathBuf::from("/project/src/main.ts"),
            document: Arc::from(""),
            failures: Vec::new(),
            fixes_applied,
        });
        report
    }

    #[test]
    fn test_clean_report() {
        let out = format_report(&clean(0), Path::new("/project"), OutputFormat::Text);
        assert_eq!(out, "No lint errors found.\n");
    }

    #[test]
    fn test_fixes_fall_back_to_prose() {
        let out = format_report(&clean(2), Path::new("/project"), OutputFormat::Text);
        assert_eq!(out, "Fixed 2 error(s) in src/main.ts\n");
    }

    #[test]
    fn test_parse_format() {
        assert_eq!("json".parse::<OutputFormat>(), Ok(OutputFormat::Json));
        assert_eq!("prose".parse::<OutputFormat>(), Ok(OutputFormat::Prose));
        assert!("checkstyle".parse::<OutputFormat>().is_err());
    }
}

//! Diagnostic types for the vernis_patina linter.
//!
//! Rules report [`LintDiagnostic`]s in unit coordinates; the linter turns
//! the ones that survive fixing into [`LintFailure`]s positioned in the
//! document the user sees.

use compact_str::CompactString;
use oxc_diagnostics::OxcDiagnostic;
use oxc_span::Span;
use serde::{Deserialize, Serialize};

/// Lint diagnostic severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// A text edit for auto-fixing a diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextEdit {
    /// Start byte offset
    pub start: u32,
    /// End byte offset
    pub end: u32,
    /// Replacement text
    pub new_text: String,
}

impl TextEdit {
    #[inline]
    pub fn new(start: u32, end: u32, new_text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            new_text: new_text.into(),
        }
    }

    #[inline]
    pub fn delete(start: u32, end: u32) -> Self {
        Self::new(start, end, "")
    }

    #[inline]
    pub fn replace(start: u32, end: u32, text: impl Into<String>) -> Self {
        Self::new(start, end, text)
    }
}

/// A fix for a diagnostic, containing one or more text edits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Fix {
    /// Description of the fix
    pub message: String,
    /// Text edits to apply
    pub edits: Vec<TextEdit>,
}

impl Fix {
    /// Create a new fix with a single edit
    #[inline]
    pub fn new(message: impl Into<String>, edit: TextEdit) -> Self {
        Self {
            message: message.into(),
            edits: vec![edit],
        }
    }

    /// Byte range covered by all edits.
    pub fn range(&self) -> (u32, u32) {
        let start = self.edits.iter().map(|e| e.start).min().unwrap_or(0);
        let end = self.edits.iter().map(|e| e.end).max().unwrap_or(0);
        (start, end)
    }
}

/// A diagnostic reported by a rule, in unit coordinates.
#[derive(Debug, Clone)]
pub struct LintDiagnostic {
    /// Rule that triggered this diagnostic
    pub rule_name: &'static str,
    pub severity: Severity,
    pub message: CompactString,
    /// Start byte offset in the unit text
    pub start: u32,
    /// End byte offset in the unit text
    pub end: u32,
    pub help: Option<CompactString>,
    pub fix: Option<Fix>,
}

impl LintDiagnostic {
    #[inline]
    pub fn new(
        rule_name: &'static str,
        severity: Severity,
        message: impl Into<CompactString>,
        span: Span,
    ) -> Self {
        Self {
            rule_name,
            severity,
            message: message.into(),
            start: span.start,
            end: span.end,
            help: None,
            fix: None,
        }
    }

    #[inline]
    pub fn with_help(mut self, help: impl Into<CompactString>) -> Self {
        self.help = Some(help.into());
        self
    }

    #[inline]
    pub fn with_fix(mut self, fix: Fix) -> Self {
        self.fix = Some(fix);
        self
    }

    #[inline]
    pub fn has_fix(&self) -> bool {
        self.fix.is_some()
    }
}

/// 1-based line and column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    /// Position of a byte offset in `text`. Columns count characters.
    pub fn at(text: &str, offset: usize) -> Self {
        let offset = floor_char_boundary(text, offset.min(text.len()));
        let before = &text.as_bytes()[..offset];
        let line = memchr::memchr_iter(b'\n', before).count() as u32 + 1;
        let line_start = memchr::memrchr(b'\n', before).map_or(0, |idx| idx + 1);
        let column = text[line_start..offset].chars().count() as u32 + 1;
        Self { line, column }
    }
}

fn floor_char_boundary(text: &str, mut offset: usize) -> usize {
    while !text.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}

/// A lint finding positioned in the document it is reported against.
#[derive(Debug, Clone)]
pub struct LintFailure {
    pub rule_name: &'static str,
    pub severity: Severity,
    pub message: CompactString,
    pub help: Option<CompactString>,
    /// Start byte offset in the document
    pub start: u32,
    /// End byte offset in the document
    pub end: u32,
    pub start_position: Position,
    pub end_position: Position,
    /// Whether a fix was available
    pub fixable: bool,
}

/// Rule name of failures raised by the lint pass itself.
pub const INTERNAL_RULE: &str = "internal";

impl LintFailure {
    /// Position a unit diagnostic in `document`, where the unit text starts
    /// at byte `offset`.
    pub fn from_diagnostic(diagnostic: LintDiagnostic, document: &str, offset: usize) -> Self {
        let start = diagnostic.start as usize + offset;
        let end = diagnostic.end as usize + offset;
        Self {
            rule_name: diagnostic.rule_name,
            severity: diagnostic.severity,
            fixable: diagnostic.has_fix(),
            message: diagnostic.message,
            help: diagnostic.help,
            start: start as u32,
            end: end as u32,
            start_position: Position::at(document, start),
            end_position: Position::at(document, end),
        }
    }

    /// A failure of the pass itself, such as a file that cannot be written.
    pub fn internal(message: impl Into<CompactString>) -> Self {
        Self {
            rule_name: INTERNAL_RULE,
            severity: Severity::Error,
            message: message.into(),
            help: None,
            start: 0,
            end: 0,
            start_position: Position { line: 1, column: 1 },
            end_position: Position { line: 1, column: 1 },
            fixable: false,
        }
    }

    /// Convert to OxcDiagnostic for rich rendering
    pub fn to_oxc_diagnostic(&self) -> OxcDiagnostic {
        let message = format!("{} ({})", self.message, self.rule_name);
        let mut diag = match self.severity {
            Severity::Error => OxcDiagnostic::error(message),
            Severity::Warning => OxcDiagnostic::warn(message),
        };
        diag = diag.with_label(Span::new(self.start, self.end));
        if let Some(help) = &self.help {
            diag = diag.with_help(help.to_string());
        }
        diag
    }
}

/// Summary of lint results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LintSummary {
    pub error_count: usize,
    pub warning_count: usize,
    pub fixed_count: usize,
    pub file_count: usize,
}

impl LintSummary {
    #[inline]
    pub fn add(&mut self, failure: &LintFailure) {
        match failure.severity {
            Severity::Error => self.error_count += 1,
            Severity::Warning => self.warning_count += 1,
        }
    }

    #[inline]
    pub fn has_failures(&self) -> bool {
        self.error_count + self.warning_count > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fix_range() {
        let fix = Fix::new("edit", TextEdit::replace(8, 9, "z"));
        assert_eq!(fix.range(), (8, 9));
        assert_eq!(Fix::new("noop", TextEdit::delete(4, 4)).range(), (4, 4));
    }

    #[test]
    fn test_position_at() {
        let text = "ab\ncdé\nf";
        assert_eq!(Position::at(text, 0), Position { line: 1, column: 1 });
        assert_eq!(Position::at(text, 3), Position { line: 2, column: 1 });
        assert_eq!(Position::at(text, 7), Position { line: 2, column: 4 });
        assert_eq!(Position::at(text, 9), Position { line: 3, column: 2 });
        assert_eq!(Position::at(text, 100), Position { line: 3, column: 2 });
    }

    #[test]
    fn test_failure_from_diagnostic_with_offset() {
        let document = "<script lang=\"ts\">\nimport a from 'a'\n</script>";
        let offset = document.find('\n').unwrap();
        let diagnostic = LintDiagnostic::new(
            "no-unused-imports",
            Severity::Error,
            "unused",
            Span::new(8, 9),
        );

        let failure = LintFailure::from_diagnostic(diagnostic, document, offset);
        assert_eq!(&document[failure.start as usize..failure.end as usize], "a");
        assert_eq!(failure.start_position, Position { line: 2, column: 8 });
        assert!(!failure.fixable);
    }
}

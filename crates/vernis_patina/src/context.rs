//! Lint context for rule execution.

use crate::diagnostic::{Fix, LintDiagnostic, Severity};
use compact_str::CompactString;
use oxc_span::Span;
use std::path::Path;
use vernis_canon::{Program, SourceUnit};

/// Context passed to every rule while linting one unit.
pub struct LintContext<'a> {
    /// Text being linted (the unit text, or its fixed version)
    pub source: &'a str,
    /// Unit the text belongs to
    pub unit: &'a SourceUnit,
    program: Option<&'a Program>,
    diagnostics: Vec<LintDiagnostic>,
    /// Current rule name (set by the linter before running a rule)
    pub current_rule: &'static str,
    current_severity: Severity,
}

impl<'a> LintContext<'a> {
    const INITIAL_DIAGNOSTICS_CAPACITY: usize = 16;

    pub fn new(source: &'a str, unit: &'a SourceUnit, program: Option<&'a Program>) -> Self {
        Self {
            source,
            unit,
            program,
            diagnostics: Vec::with_capacity(Self::INITIAL_DIAGNOSTICS_CAPACITY),
            current_rule: "",
            current_severity: Severity::Error,
        }
    }

    #[inline]
    pub fn path(&self) -> &'a Path {
        &self.unit.path
    }

    /// The program, when linting with type information.
    #[inline]
    pub fn program(&self) -> Option<&'a Program> {
        self.program
    }

    /// Whether the unit was virtualized from a composite document.
    #[inline]
    pub fn is_composite(&self) -> bool {
        self.unit.is_composite()
    }

    pub(crate) fn enter_rule(&mut self, name: &'static str, severity: Severity) {
        self.current_rule = name;
        self.current_severity = severity;
    }

    /// Report a diagnostic for the current rule
    #[inline]
    pub fn report(&mut self, message: impl Into<CompactString>, span: Span) {
        let diagnostic =
            LintDiagnostic::new(self.current_rule, self.current_severity, message, span);
        self.diagnostics.push(diagnostic);
    }

    /// Report a diagnostic with a hint on how to resolve it
    #[inline]
    pub fn report_with_help(
        &mut self,
        message: impl Into<CompactString>,
        help: impl Into<CompactString>,
        span: Span,
    ) {
        let diagnostic =
            LintDiagnostic::new(self.current_rule, self.current_severity, message, span)
                .with_help(help);
        self.diagnostics.push(diagnostic);
    }

    /// Report a diagnostic that carries a fix
    #[inline]
    pub fn report_with_fix(&mut self, message: impl Into<CompactString>, span: Span, fix: Fix) {
        let diagnostic =
            LintDiagnostic::new(self.current_rule, self.current_severity, message, span)
                .with_fix(fix);
        self.diagnostics.push(diagnostic);
    }

    #[inline]
    pub fn diagnostics(&self) -> &[LintDiagnostic] {
        &self.diagnostics
    }

    #[inline]
    pub fn into_diagnostics(self) -> Vec<LintDiagnostic> {
        self.diagnostics
    }
}

//! # vernis_patina
//!
//! Lint rules, autofix and write-back for TypeScript projects with Vue
//! components.
//!
//! Rules run over one [`SourceUnit`](vernis_canon::SourceUnit) at a time.
//! For a component the unit is its script segment: diagnostics are mapped
//! back to the component's own lines and columns, and fixed text is spliced
//! back into the component by a [`WriteBackReassembler`] before it is
//! written.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use vernis_patina::{Linter, LintReport, OsFileWriter, OutputFormat, format_report};
//!
//! let linter = Linter::new().with_fix(false);
//! let mut report = LintReport::new();
//! report.push(linter.lint_unit(&unit, Some(&program), &OsFileWriter)?);
//! print!("{}", format_report(&report, &cwd, OutputFormat::Text));
//! ```
//!
//! ## Rules
//!
//! - `no-unused-imports` - Disallow import bindings that are never referenced
//! - `no-consecutive-blank-lines` - Disallow more than one consecutive blank line
//! - `no-unresolved-imports` - Disallow imports of modules or members that
//!   cannot be found (type-aware)

pub mod context;
pub mod diagnostic;
pub mod fixer;
pub mod linter;
pub mod output;
pub mod rule;
pub mod rules;
pub mod write_back;

pub use context::LintContext;
pub use diagnostic::{
    Fix, LintDiagnostic, LintFailure, LintSummary, Position, Severity, TextEdit, INTERNAL_RULE,
};
pub use fixer::{apply_fixes, MAX_FIX_PASSES};
pub use linter::{FileLintResult, LintError, LintReport, Linter, SYNTAX_RULE};
pub use output::{format_report, format_results, OutputFormat};
pub use rule::{Rule, RuleMeta, RuleRegistry, RuleSetting};
pub use write_back::{Activation, FileWriter, OsFileWriter, WriteBackReassembler};

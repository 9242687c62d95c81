//! Main linter entry point.
//!
//! Runs the configured rules over one unit, applies their fixes, writes the
//! fixed text once and reports what is left, positioned in the document the
//! user sees.

use crate::context::LintContext;
use crate::diagnostic::{LintDiagnostic, LintFailure, LintSummary, Severity};
use crate::fixer::{apply_fixes, MAX_FIX_PASSES};
use crate::rule::{Rule, RuleRegistry, RuleSetting};
use crate::rules::NoConsecutiveBlankLines;
use crate::write_back::FileWriter;
use oxc_allocator::Allocator;
use oxc_parser::Parser;
use oxc_span::Span;
use rustc_hash::FxHashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use vernis_canon::{CanonError, CompositeOrigin, Program, SourceHost, SourceUnit};
use vernis_sfc::ReassemblyEntry;

/// Rule name of parse errors.
pub const SYNTAX_RULE: &str = "syntax";

/// Errors that abort linting of one file.
#[derive(Debug, Error)]
pub enum LintError {
    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Canon(#[from] CanonError),
}

/// Lint result for a single file
#[derive(Debug, Clone)]
pub struct FileLintResult {
    /// Path that was linted
    pub path: PathBuf,
    /// Document the failures are positioned in (after fixes)
    pub document: Arc<str>,
    pub failures: Vec<LintFailure>,
    /// Number of fixes written back
    pub fixes_applied: usize,
}

impl FileLintResult {
    /// A result carrying only a failure of the pass itself.
    pub fn internal(path: &Path, message: impl Into<compact_str::CompactString>) -> Self {
        Self {
            path: path.to_path_buf(),
            document: Arc::from(""),
            failures: vec![LintFailure::internal(message)],
            fixes_applied: 0,
        }
    }

    #[inline]
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// Results of one lint pass.
#[derive(Debug, Clone, Default)]
pub struct LintReport {
    pub results: Vec<FileLintResult>,
    pub summary: LintSummary,
}

impl LintReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, result: FileLintResult) {
        for failure in &result.failures {
            self.summary.add(failure);
        }
        self.summary.fixed_count += result.fixes_applied;
        self.summary.file_count += 1;
        self.results.push(result);
    }

    pub fn failures(&self) -> impl Iterator<Item = (&FileLintResult, &LintFailure)> {
        self.results
            .iter()
            .flat_map(|result| result.failures.iter().map(move |failure| (result, failure)))
    }

    #[inline]
    pub fn has_failures(&self) -> bool {
        self.summary.has_failures()
    }
}

/// Main linter struct.
pub struct Linter {
    registry: RuleRegistry,
    settings: FxHashMap<String, RuleSetting>,
    /// Run `no-consecutive-blank-lines` on composite documents
    composite_blank_lines: bool,
    fix: bool,
}

impl Linter {
    /// Create a new linter with recommended rules
    #[inline]
    pub fn new() -> Self {
        Self::with_registry(RuleRegistry::with_recommended())
    }

    /// Create a linter with a custom rule registry
    #[inline]
    pub fn with_registry(registry: RuleRegistry) -> Self {
        Self {
            registry,
            settings: FxHashMap::default(),
            composite_blank_lines: false,
            fix: true,
        }
    }

    /// Configure one rule by name
    #[inline]
    pub fn with_setting(mut self, name: impl Into<String>, setting: RuleSetting) -> Self {
        self.settings.insert(name.into(), setting);
        self
    }

    #[inline]
    pub fn with_composite_blank_lines(mut self, enabled: bool) -> Self {
        self.composite_blank_lines = enabled;
        self
    }

    /// Enable or disable autofix
    #[inline]
    pub fn with_fix(mut self, fix: bool) -> Self {
        self.fix = fix;
        self
    }

    #[inline]
    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    #[inline]
    pub fn fix_enabled(&self) -> bool {
        self.fix
    }

    /// Effective severity of a rule for a unit, `None` when it does not run.
    fn severity_for(&self, rule: &dyn Rule, unit: &SourceUnit, typed: bool) -> Option<Severity> {
        let meta = rule.meta();
        if meta.type_aware && !typed {
            return None;
        }
        if meta.name == NoConsecutiveBlankLines::NAME
            && unit.is_composite()
            && !self.composite_blank_lines
        {
            return None;
        }
        self.settings
            .get(meta.name)
            .copied()
            .unwrap_or_default()
            .severity(meta)
    }

    /// Run every enabled rule over `source`, a version of `unit`'s text.
    ///
    /// Text that does not parse yields its syntax errors only.
    pub fn lint_source(
        &self,
        source: &str,
        unit: &SourceUnit,
        program: Option<&Program>,
    ) -> Vec<LintDiagnostic> {
        let allocator = Allocator::default();
        let ret = Parser::new(&allocator, source, unit.source_type).parse();

        if !ret.errors.is_empty() {
            return ret
                .errors
                .iter()
                .map(|error| {
                    let span = error
                        .labels
                        .as_ref()
                        .and_then(|labels| labels.first())
                        .map(|label| {
                            Span::new(label.offset() as u32, (label.offset() + label.len()) as u32)
                        })
                        .unwrap_or_default();
                    LintDiagnostic::new(SYNTAX_RULE, Severity::Error, error.message.to_string(), span)
                })
                .collect();
        }

        let mut ctx = LintContext::new(source, unit, program);
        for rule in self.registry.rules() {
            let Some(severity) = self.severity_for(rule.as_ref(), unit, program.is_some()) else {
                continue;
            };
            ctx.enter_rule(rule.meta().name, severity);
            rule.run(&mut ctx, &ret.program);
        }

        let mut diagnostics = ctx.into_diagnostics();
        diagnostics.sort_by_key(|d| (d.start, d.end));
        diagnostics
    }

    /// Lint a unit, fixing it in place through `writer` when fixes apply.
    ///
    /// Type-aware rules run only when `program` contains the unit.
    pub fn lint_unit(
        &self,
        unit: &SourceUnit,
        program: Option<&Program>,
        writer: &dyn FileWriter,
    ) -> Result<FileLintResult, LintError> {
        let program = program.filter(|program| {
            let known = program.contains(&unit.path);
            if !known {
                tracing::debug!(
                    path = %unit.path.display(),
                    "not part of the program, skipping type-aware rules"
                );
            }
            known
        });

        let mut text = unit.text.to_string();
        let mut diagnostics = self.lint_source(&text, unit, program);
        let mut fixes_applied = 0;

        if self.fix {
            for _ in 0..MAX_FIX_PASSES {
                if diagnostics.iter().any(|d| d.rule_name == SYNTAX_RULE) {
                    break;
                }
                let (fixed, applied) = apply_fixes(&text, &diagnostics);
                if applied == 0 || fixed == text {
                    break;
                }
                fixes_applied += applied;
                text = fixed;
                diagnostics = self.lint_source(&text, unit, program);
            }
        }

        if fixes_applied == 0 {
            let document = unit.document_text();
            let offset = unit.origin_offset();
            return Ok(FileLintResult {
                path: unit.path.clone(),
                document: Arc::from(document),
                failures: position(diagnostics, document, offset),
                fixes_applied,
            });
        }

        writer
            .write_file(&unit.path, &text)
            .map_err(|source| LintError::Io {
                path: unit.path.clone(),
                source,
            })?;
        tracing::debug!(path = %unit.path.display(), fixes = fixes_applied, "wrote fixes");

        let Some(origin) = &unit.origin else {
            let failures = position(diagnostics, &text, 0);
            return Ok(FileLintResult {
                path: unit.path.clone(),
                document: Arc::from(text),
                failures,
                fixes_applied,
            });
        };

        // The document on disk now frames the trimmed script with single
        // newlines; lint exactly that script.
        let relinted = reassembled_unit(unit, origin, &text);
        let diagnostics = self.lint_source(&relinted.text, &relinted, program);
        let document = relinted.document_text();
        Ok(FileLintResult {
            path: unit.path.clone(),
            document: Arc::from(document),
            failures: position(diagnostics, document, relinted.origin_offset()),
            fixes_applied,
        })
    }

    /// Lint the file at `path`, loading it from the program or `host`.
    ///
    /// Returns `None` when the host has no such file.
    pub fn lint_file(
        &self,
        path: &Path,
        host: &dyn SourceHost,
        program: Option<&Program>,
        writer: &dyn FileWriter,
    ) -> Result<Option<FileLintResult>, LintError> {
        if let Some(unit) = program.and_then(|program| program.unit(path)) {
            return self.lint_unit(unit, program, writer).map(Some);
        }
        let Some(unit) = host.get_source(path).map_err(CanonError::from)? else {
            return Ok(None);
        };
        self.lint_unit(&unit, program, writer).map(Some)
    }
}

impl Default for Linter {
    fn default() -> Self {
        Self::new()
    }
}

fn position(diagnostics: Vec<LintDiagnostic>, document: &str, offset: usize) -> Vec<LintFailure> {
    diagnostics
        .into_iter()
        .map(|diagnostic| LintFailure::from_diagnostic(diagnostic, document, offset))
        .collect()
}

/// The unit of a composite document as reassembled around `fixed`.
fn reassembled_unit(unit: &SourceUnit, origin: &CompositeOrigin, fixed: &str) -> SourceUnit {
    let end = origin.offset + unit.text.len();
    let entry = ReassemblyEntry {
        path: unit.path.clone(),
        prefix: origin.document[..origin.offset].to_string(),
        suffix: origin.document[end..].to_string(),
    };
    SourceUnit {
        path: unit.path.clone(),
        text: Arc::from(fixed.trim()),
        source_type: unit.source_type,
        origin: Some(CompositeOrigin {
            document: Arc::from(entry.reassemble(fixed)),
            offset: entry.reassembled_script_start(),
        }),
    }
}

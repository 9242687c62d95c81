//! no-unresolved-imports
//!
//! Report module requests that do not resolve, and named imports that the
//! resolved module does not export.
//!
//! Requires type information: the rule reads the program's cross-file
//! diagnostics and is skipped when linting without a program.
//!
//! ## Examples
//!
//! ### Invalid
//! ```ts
//! import { missing } from './util'
//! import gone from './does-not-exist'
//! ```

use crate::context::LintContext;
use crate::diagnostic::Severity;
use crate::rule::{Rule, RuleMeta};
use oxc_ast::ast;
use vernis_canon::{scan_module, SemanticDiagnosticKind};

static META: RuleMeta = RuleMeta {
    name: "no-unresolved-imports",
    description: "Disallow imports of modules or members that cannot be found",
    fixable: false,
    type_aware: true,
    default_severity: Severity::Error,
};

const UNRESOLVED_HELP: &str =
    "Check the path, or the `compilerOptions.paths` aliases in tsconfig.json";

/// Disallow unresolved imports
pub struct NoUnresolvedImports;

impl NoUnresolvedImports {
    pub const NAME: &'static str = "no-unresolved-imports";
}

impl Rule for NoUnresolvedImports {
    fn meta(&self) -> &'static RuleMeta {
        &META
    }

    fn run(&self, ctx: &mut LintContext<'_>, _program: &ast::Program<'_>) {
        let Some(program) = ctx.program() else {
            return;
        };

        let loaded = program
            .unit(ctx.path())
            .is_some_and(|unit| *unit.text == *ctx.source);
        let diagnostics = if loaded {
            program.semantic_diagnostics(ctx.path()).to_vec()
        } else {
            let record = scan_module(ctx.source, ctx.unit.source_type);
            program.diagnose(ctx.path(), &record)
        };

        for diagnostic in diagnostics {
            match diagnostic.kind {
                SemanticDiagnosticKind::UnresolvedModule => {
                    ctx.report_with_help(diagnostic.message, UNRESOLVED_HELP, diagnostic.span);
                }
                SemanticDiagnosticKind::MissingExport => {
                    ctx.report(diagnostic.message, diagnostic.span);
                }
                // Reported by the linter itself.
                SemanticDiagnosticKind::Syntax => {}
            }
        }
    }
}

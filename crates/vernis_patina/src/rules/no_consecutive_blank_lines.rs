//! no-consecutive-blank-lines
//!
//! Disallow more than one blank line in a row.
//!
//! Blank lines inside template literals are content and are not counted.
//! Vue components are exempt unless `compositeBlankLines` is set: the line
//! structure of an embedded script is shaped by the surrounding markup.
//!
//! ## Examples
//!
//! ### Invalid
//! ```ts
//! const a = 1
//!
//!
//! const b = 2
//! ```

use crate::context::LintContext;
use crate::diagnostic::{Fix, Severity, TextEdit};
use crate::rule::{Rule, RuleMeta};
use oxc_ast::ast::{self, TemplateLiteral};
use oxc_ast_visit::{walk, Visit};
use oxc_span::Span;

static META: RuleMeta = RuleMeta {
    name: "no-consecutive-blank-lines",
    description: "Disallow more than one consecutive blank line",
    fixable: true,
    type_aware: false,
    default_severity: Severity::Warning,
};

/// Disallow consecutive blank lines
pub struct NoConsecutiveBlankLines;

impl NoConsecutiveBlankLines {
    pub const NAME: &'static str = "no-consecutive-blank-lines";
}

impl Rule for NoConsecutiveBlankLines {
    fn meta(&self) -> &'static RuleMeta {
        &META
    }

    fn run(&self, ctx: &mut LintContext<'_>, program: &ast::Program<'_>) {
        let mut templates = TemplateCollector::default();
        templates.visit_program(program);

        let source = ctx.source;
        let mut run: Vec<usize> = Vec::new();
        let mut offset = 0;

        for line in source.split_inclusive('\n') {
            let is_blank = line.trim().is_empty() && !templates.contains(offset);
            if is_blank {
                run.push(offset);
            } else {
                report_run(ctx, &run, offset);
                run.clear();
            }
            offset += line.len();
        }
        report_run(ctx, &run, offset);
    }
}

/// Report a run of blank lines starting at the given offsets, ending at `end`.
fn report_run(ctx: &mut LintContext<'_>, run: &[usize], end: usize) {
    if run.len() < 2 {
        return;
    }
    // Keep the first blank line, drop the rest.
    let start = run[1] as u32;
    let end = end as u32;
    ctx.report_with_fix(
        "Consecutive blank lines are forbidden",
        Span::new(start, end),
        Fix::new("Remove extra blank lines", TextEdit::delete(start, end)),
    );
}

/// Spans of template literals.
#[derive(Default)]
struct TemplateCollector {
    spans: Vec<Span>,
}

impl TemplateCollector {
    fn contains(&self, offset: usize) -> bool {
        let offset = offset as u32;
        self.spans
            .iter()
            .any(|span| span.start < offset && offset < span.end)
    }
}

impl<'a> Visit<'a> for TemplateCollector {
    fn visit_template_literal(&mut self, lit: &TemplateLiteral<'a>) {
        self.spans.push(lit.span);
        walk::walk_template_literal(self, lit);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::test_utils::{fix, run_rule, ts_unit};

    #[test]
    fn test_single_blank_line_ok() {
        let unit = ts_unit("const a = 1\n\nconst b = 2\n");
        assert!(run_rule(&NoConsecutiveBlankLines, &unit).is_empty());
    }

    #[test]
    fn test_consecutive_blank_lines() {
        let unit = ts_unit("const a = 1\n\n  \n\nconst b = 2\n");
        let diagnostics = run_rule(&NoConsecutiveBlankLines, &unit);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].start, 13);
        assert_eq!(fix(&NoConsecutiveBlankLines, &unit), "const a = 1\n\nconst b = 2\n");
    }

    #[test]
    fn test_trailing_blank_lines() {
        let unit = ts_unit("const a = 1\n\n\n");
        assert_eq!(fix(&NoConsecutiveBlankLines, &unit), "const a = 1\n\n");
    }

    #[test]
    fn test_template_literal_lines_ignored() {
        let unit = ts_unit("const s = `a\n\n\n\nb`\n");
        assert!(run_rule(&NoConsecutiveBlankLines, &unit).is_empty());
    }
}

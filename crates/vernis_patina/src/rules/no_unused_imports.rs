//! no-unused-imports
//!
//! Disallow import bindings that are never referenced.
//!
//! In a Vue component the markup around the script counts as a reference:
//! a binding whose name (or its kebab-case form) appears there is used.
//!
//! ## Examples
//!
//! ### Invalid
//! ```ts
//! import { ref, computed } from 'vue'
//! export const count = ref(0)
//! ```
//!
//! ### Valid
//! ```ts
//! import { ref } from 'vue'
//! export const count = ref(0)
//! ```

use crate::context::LintContext;
use crate::diagnostic::{Fix, Severity, TextEdit};
use crate::rule::{Rule, RuleMeta};
use memchr::memmem;
use oxc_ast::ast::{self, IdentifierReference, ImportDeclarationSpecifier, Statement};
use oxc_ast_visit::Visit;
use oxc_span::Span;
use rustc_hash::FxHashSet;

static META: RuleMeta = RuleMeta {
    name: "no-unused-imports",
    description: "Disallow import bindings that are never referenced",
    fixable: true,
    type_aware: false,
    default_severity: Severity::Error,
};

/// Disallow unused import bindings
pub struct NoUnusedImports;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BindingKind {
    Default,
    Namespace,
    Named,
}

struct Binding<'s> {
    kind: BindingKind,
    local: &'s str,
    /// Whole specifier (`a as b`, `* as ns`)
    span: Span,
    local_span: Span,
}

impl Rule for NoUnusedImports {
    fn meta(&self) -> &'static RuleMeta {
        &META
    }

    fn run(&self, ctx: &mut LintContext<'_>, program: &ast::Program<'_>) {
        let mut references = ReferenceCollector::default();
        references.visit_program(program);
        let markup = markup_text(ctx);

        for stmt in &program.body {
            let Statement::ImportDeclaration(decl) = stmt else {
                continue;
            };
            // Side-effect imports bind nothing
            let Some(specifiers) = &decl.specifiers else {
                continue;
            };
            if specifiers.is_empty() {
                continue;
            }

            let bindings: Vec<Binding<'_>> = specifiers.iter().map(Binding::from_specifier).collect();
            let used: Vec<bool> = bindings
                .iter()
                .map(|binding| {
                    references.names.contains(binding.local)
                        || markup.iter().any(|part| mentions(part, binding.local))
                })
                .collect();
            if used.iter().all(|&u| u) {
                continue;
            }

            let fix = removal_fix(ctx.source, decl.span, &bindings, &used);
            let unused: Vec<&Binding<'_>> = bindings
                .iter()
                .zip(&used)
                .filter(|(_, &u)| !u)
                .map(|(binding, _)| binding)
                .collect();

            if unused.len() == bindings.len() && bindings.len() > 1 {
                ctx.report_with_fix("All imports in import declaration are unused.", decl.span, fix);
                continue;
            }

            // One fix per declaration covers all of its unused bindings.
            let mut fix = Some(fix);
            for binding in unused {
                let message = format!("'{}' is declared but its value is never read.", binding.local);
                match fix.take() {
                    Some(fix) => ctx.report_with_fix(message, binding.local_span, fix),
                    None => ctx.report(message, binding.local_span),
                }
            }
        }
    }
}

impl<'s> Binding<'s> {
    fn from_specifier(specifier: &'s ImportDeclarationSpecifier<'_>) -> Self {
        match specifier {
            ImportDeclarationSpecifier::ImportDefaultSpecifier(spec) => Self {
                kind: BindingKind::Default,
                local: spec.local.name.as_str(),
                span: spec.span,
                local_span: spec.local.span,
            },
            ImportDeclarationSpecifier::ImportNamespaceSpecifier(spec) => Self {
                kind: BindingKind::Namespace,
                local: spec.local.name.as_str(),
                span: spec.span,
                local_span: spec.local.span,
            },
            ImportDeclarationSpecifier::ImportSpecifier(spec) => Self {
                kind: BindingKind::Named,
                local: spec.local.name.as_str(),
                span: spec.span,
                local_span: spec.local.span,
            },
        }
    }
}

/// Edit that removes the unused bindings of one declaration.
///
/// With nothing left the whole declaration goes, along with the rest of its
/// line. Otherwise the import clause is rebuilt from the kept specifiers.
fn removal_fix(source: &str, decl_span: Span, bindings: &[Binding<'_>], used: &[bool]) -> Fix {
    let kept: Vec<&Binding<'_>> = bindings
        .iter()
        .zip(used)
        .filter(|(_, &u)| u)
        .map(|(binding, _)| binding)
        .collect();

    if kept.is_empty() {
        let end = decl_span.end as usize;
        let rest = &source[end..];
        let trailing = rest.len() - rest.trim_start_matches([' ', '\t']).len();
        let after = &rest[trailing..];
        let line_break = if after.starts_with("\r\n") {
            2
        } else if after.starts_with('\n') {
            1
        } else {
            0
        };
        let end = if line_break > 0 { end + trailing + line_break } else { end };
        return Fix::new(
            "Remove unused import declaration",
            TextEdit::delete(decl_span.start, end as u32),
        );
    }

    let first = &bindings[0];
    let clause_start = match first.kind {
        BindingKind::Named => source[..first.span.start as usize]
            .rfind('{')
            .unwrap_or(first.span.start as usize),
        _ => first.span.start as usize,
    };
    let last = &bindings[bindings.len() - 1];
    let clause_end = match last.kind {
        BindingKind::Named => {
            let end = last.span.end as usize;
            source[end..].find('}').map_or(end, |idx| end + idx + 1)
        }
        _ => last.span.end as usize,
    };

    let slice = |binding: &Binding<'_>| &source[binding.span.start as usize..binding.span.end as usize];
    let mut parts: Vec<String> = kept
        .iter()
        .filter(|binding| binding.kind != BindingKind::Named)
        .map(|binding| slice(*binding).to_string())
        .collect();
    let named: Vec<&str> = kept
        .iter()
        .filter(|binding| binding.kind == BindingKind::Named)
        .map(|binding| slice(*binding))
        .collect();
    if !named.is_empty() {
        parts.push(format!("{{ {} }}", named.join(", ")));
    }

    Fix::new(
        "Remove unused imports",
        TextEdit::replace(clause_start as u32, clause_end as u32, parts.join(", ")),
    )
}

/// Parts of a composite document outside the script.
fn markup_text<'a>(ctx: &LintContext<'a>) -> Vec<&'a str> {
    let unit = ctx.unit;
    let Some(origin) = &unit.origin else {
        return Vec::new();
    };
    let document: &str = &origin.document;
    let end = (origin.offset + unit.text.len()).min(document.len());
    vec![&document[..origin.offset], &document[end..]]
}

/// Whether `name` or its kebab-case form appears as a whole word.
fn mentions(haystack: &str, name: &str) -> bool {
    contains_word(haystack, name) || {
        let kebab = to_kebab_case(name);
        kebab != name && contains_word(haystack, &kebab)
    }
}

fn contains_word(haystack: &str, word: &str) -> bool {
    let bytes = haystack.as_bytes();
    memmem::find_iter(bytes, word.as_bytes()).any(|start| {
        let end = start + word.len();
        let before_ok = start == 0 || !is_ident_byte(bytes[start - 1]);
        let after_ok = end == bytes.len() || !is_ident_byte(bytes[end]);
        before_ok && after_ok
    })
}

#[inline]
fn is_ident_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_' || byte == b'$'
}

fn to_kebab_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (idx, ch) in name.chars().enumerate() {
        if ch.is_ascii_uppercase() {
            if idx > 0 {
                out.push('-');
            }
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

/// Names of every identifier reference in the unit.
#[derive(Default)]
struct ReferenceCollector {
    names: FxHashSet<String>,
}

impl<'a> Visit<'a> for ReferenceCollector {
    fn visit_identifier_reference(&mut self, ident: &IdentifierReference<'a>) {
        self.names.insert(ident.name.to_string());
    }
}

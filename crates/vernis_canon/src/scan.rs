//! Module request and export scanning.
//!
//! Parses one unit with oxc and records what the program needs to link it
//! to other units: the modules it requests, the names it imports from them,
//! the names it exports, and its syntax errors.

use oxc_allocator::Allocator;
use oxc_ast::ast::{
    BindingIdentifier, Declaration, Expression, ImportDeclarationSpecifier, ImportExpression,
    ModuleExportName, Statement,
};
use oxc_ast_visit::{walk, Visit};
use oxc_parser::Parser;
use oxc_span::{GetSpan, SourceType, Span};
use rustc_hash::FxHashSet;

/// How a module is requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    /// `import ... from 'x'` or `import 'x'`
    Import,
    /// `export ... from 'x'`
    ReExport,
    /// `import('x')`
    Dynamic,
}

/// A name imported from a requested module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportedName {
    /// Exported name looked up in the target (`default` for default imports)
    pub name: String,
    pub span: Span,
}

/// One module request of a unit.
#[derive(Debug, Clone)]
pub struct ModuleRequest {
    pub specifier: String,
    /// Span of the specifier string literal, quotes included
    pub span: Span,
    pub kind: RequestKind,
    pub type_only: bool,
    pub names: Vec<ImportedName>,
}

/// Names a unit exports.
#[derive(Debug, Clone, Default)]
pub struct ModuleExports {
    names: FxHashSet<String>,
    opaque: bool,
}

impl ModuleExports {
    /// Whether `name` is (or may be) exported.
    pub fn contains(&self, name: &str) -> bool {
        self.opaque || self.names.contains(name)
    }

    /// Set when the export table cannot be known statically
    /// (`export * from`, `export =`).
    pub fn is_opaque(&self) -> bool {
        self.opaque
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn insert(&mut self, name: impl Into<String>) {
        self.names.insert(name.into());
    }

    pub fn mark_opaque(&mut self) {
        self.opaque = true;
    }
}

/// A parse error of a unit.
#[derive(Debug, Clone)]
pub struct SyntaxError {
    pub message: String,
    pub span: Span,
}

/// Everything the program records about one unit.
#[derive(Debug, Clone, Default)]
pub struct ModuleRecord {
    pub requests: Vec<ModuleRequest>,
    pub exports: ModuleExports,
    pub syntax_errors: Vec<SyntaxError>,
}

/// Parse `source` and collect its module record.
pub fn scan_module(source: &str, source_type: SourceType) -> ModuleRecord {
    let allocator = Allocator::default();
    let result = Parser::new(&allocator, source, source_type).parse();

    let mut record = ModuleRecord::default();

    for error in &result.errors {
        let span = error
            .labels
            .as_ref()
            .and_then(|labels| labels.first())
            .map(|label| Span::new(label.offset() as u32, (label.offset() + label.len()) as u32))
            .unwrap_or_default();
        record.syntax_errors.push(SyntaxError {
            message: error.message.to_string(),
            span,
        });
    }

    for stmt in &result.program.body {
        match stmt {
            Statement::ImportDeclaration(decl) => {
                let mut names = Vec::new();
                for specifier in decl.specifiers.iter().flatten() {
                    match specifier {
                        ImportDeclarationSpecifier::ImportSpecifier(spec) => {
                            names.push(ImportedName {
                                name: export_name(&spec.imported),
                                span: spec.imported.span(),
                            });
                        }
                        ImportDeclarationSpecifier::ImportDefaultSpecifier(spec) => {
                            names.push(ImportedName {
                                name: "default".to_string(),
                                span: spec.local.span,
                            });
                        }
                        ImportDeclarationSpecifier::ImportNamespaceSpecifier(_) => {}
                    }
                }
                record.requests.push(ModuleRequest {
                    specifier: decl.source.value.to_string(),
                    span: decl.source.span,
                    kind: RequestKind::Import,
                    type_only: decl.import_kind.is_type(),
                    names,
                });
            }
            Statement::ExportNamedDeclaration(decl) => {
                if let Some(declaration) = &decl.declaration {
                    declaration_names(declaration, &mut record.exports);
                }
                for spec in &decl.specifiers {
                    record.exports.insert(export_name(&spec.exported));
                }
                if let Some(source) = &decl.source {
                    record.requests.push(ModuleRequest {
                        specifier: source.value.to_string(),
                        span: source.span,
                        kind: RequestKind::ReExport,
                        type_only: decl.export_kind.is_type(),
                        names: decl
                            .specifiers
                            .iter()
                            .map(|spec| ImportedName {
                                name: export_name(&spec.local),
                                span: spec.local.span(),
                            })
                            .collect(),
                    });
                }
            }
            Statement::ExportAllDeclaration(decl) => {
                match &decl.exported {
                    Some(name) => record.exports.insert(export_name(name)),
                    None => record.exports.mark_opaque(),
                }
                record.requests.push(ModuleRequest {
                    specifier: decl.source.value.to_string(),
                    span: decl.source.span,
                    kind: RequestKind::ReExport,
                    type_only: decl.export_kind.is_type(),
                    names: Vec::new(),
                });
            }
            Statement::ExportDefaultDeclaration(_) => record.exports.insert("default"),
            Statement::TSExportAssignment(_) => record.exports.mark_opaque(),
            _ => {}
        }
    }

    let mut collector = DynamicImportCollector::default();
    collector.visit_program(&result.program);
    record.requests.extend(collector.requests);

    record
}

fn export_name(name: &ModuleExportName<'_>) -> String {
    match name {
        ModuleExportName::IdentifierName(ident) => ident.name.to_string(),
        ModuleExportName::IdentifierReference(ident) => ident.name.to_string(),
        ModuleExportName::StringLiteral(lit) => lit.value.to_string(),
    }
}

fn declaration_names(declaration: &Declaration<'_>, exports: &mut ModuleExports) {
    match declaration {
        Declaration::VariableDeclaration(var) => {
            let mut collector = BindingCollector::default();
            for declarator in &var.declarations {
                collector.visit_binding_pattern(&declarator.id);
            }
            for name in collector.names {
                exports.insert(name);
            }
        }
        Declaration::FunctionDeclaration(func) => {
            if let Some(id) = &func.id {
                exports.insert(id.name.as_str());
            }
        }
        Declaration::ClassDeclaration(class) => {
            if let Some(id) = &class.id {
                exports.insert(id.name.as_str());
            }
        }
        Declaration::TSTypeAliasDeclaration(decl) => exports.insert(decl.id.name.as_str()),
        Declaration::TSInterfaceDeclaration(decl) => exports.insert(decl.id.name.as_str()),
        Declaration::TSEnumDeclaration(decl) => exports.insert(decl.id.name.as_str()),
        Declaration::TSImportEqualsDeclaration(decl) => exports.insert(decl.id.name.as_str()),
        _ => {}
    }
}

/// Collects every name bound by a pattern.
#[derive(Default)]
struct BindingCollector {
    names: Vec<String>,
}

impl<'a> Visit<'a> for BindingCollector {
    fn visit_binding_identifier(&mut self, ident: &BindingIdentifier<'a>) {
        self.names.push(ident.name.to_string());
    }
}

/// Visitor to collect dynamic imports with a literal specifier.
#[derive(Default)]
struct DynamicImportCollector {
    requests: Vec<ModuleRequest>,
}

impl<'a> Visit<'a> for DynamicImportCollector {
    fn visit_import_expression(&mut self, expr: &ImportExpression<'a>) {
        if let Expression::StringLiteral(lit) = &expr.source {
            self.requests.push(ModuleRequest {
                specifier: lit.value.to_string(),
                span: lit.span,
                kind: RequestKind::Dynamic,
                type_only: false,
                names: Vec::new(),
            });
        }
        walk::walk_import_expression(self, expr);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn specifiers(record: &ModuleRecord) -> Vec<(&str, RequestKind)> {
        record
            .requests
            .iter()
            .map(|r| (r.specifier.as_str(), r.kind))
            .collect()
    }

    #[test]
    fn test_scan_imports() {
        let source = r#"
import Foo, { bar, baz as qux } from './foo'
import * as ns from '@/ns'
import type { T } from './types'
import './side-effect.css'
const lazy = () => import('./Lazy.vue')
"#;
        let record = scan_module(source, SourceType::ts());
        assert!(record.syntax_errors.is_empty());
        assert_eq!(
            specifiers(&record),
            vec![
                ("./foo", RequestKind::Import),
                ("@/ns", RequestKind::Import),
                ("./types", RequestKind::Import),
                ("./side-effect.css", RequestKind::Import),
                ("./Lazy.vue", RequestKind::Dynamic),
            ]
        );

        let foo: Vec<&str> = record.requests[0].names.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(foo, vec!["default", "bar", "baz"]);
        assert!(record.requests[1].names.is_empty());
        assert!(record.requests[2].type_only);
    }

    #[test]
    fn test_scan_exports() {
        let source = r#"
export const a = 1, { b, c: [d] } = obj
export function f() {}
export class K {}
export interface I {}
export type Alias = string
export enum E { X }
const local = 1
export { local as renamed }
export default {}
"#;
        let record = scan_module(source, SourceType::ts());
        let mut names: Vec<&str> = record.exports.names().collect();
        names.sort_unstable();
        assert_eq!(
            names,
            vec!["Alias", "E", "I", "K", "a", "b", "d", "default", "f", "renamed"]
        );
        assert!(!record.exports.is_opaque());
        assert!(!record.exports.contains("local"));
    }

    #[test]
    fn test_scan_reexports() {
        let source = "export { x, y as z } from './xy'\nexport * as all from './all'\nexport * from './star'\n";
        let record = scan_module(source, SourceType::ts());

        assert_eq!(
            specifiers(&record),
            vec![
                ("./xy", RequestKind::ReExport),
                ("./all", RequestKind::ReExport),
                ("./star", RequestKind::ReExport),
            ]
        );
        let xy: Vec<&str> = record.requests[0].names.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(xy, vec!["x", "y"]);
        assert!(record.exports.is_opaque());
        assert!(record.exports.contains("anything"));
    }

    #[test]
    fn test_scan_syntax_error() {
        let record = scan_module("const = ;\n", SourceType::ts());
        assert!(!record.syntax_errors.is_empty());
        assert!(record.syntax_errors[0].span.end <= 10);
    }
}

//! The program: every unit of the tsconfig file set, linked by resolved
//! module requests.

use crate::error::CanonResult;
use crate::host::{SourceHost, SourceUnit};
use crate::resolver::{ModuleResolutionHost, ModuleResolver};
use crate::scan::{scan_module, ModuleExports, ModuleRecord, ModuleRequest, RequestKind};
use crate::tsconfig::TsConfig;
use once_cell::sync::OnceCell;
use oxc_span::Span;
use rayon::prelude::*;
use rustc_hash::{FxHashMap, FxHashSet};
use std::path::{Path, PathBuf};
use std::time::Instant;
use vernis_sfc::cache_key;

/// Kind of a semantic diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SemanticDiagnosticKind {
    Syntax,
    UnresolvedModule,
    MissingExport,
}

/// A cross-file diagnostic of one unit. The span is in unit coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SemanticDiagnostic {
    pub kind: SemanticDiagnosticKind,
    pub message: String,
    pub span: Span,
}

struct ProgramUnit {
    unit: SourceUnit,
    record: ModuleRecord,
    resolutions: Vec<Option<PathBuf>>,
    diagnostics: OnceCell<Vec<SemanticDiagnostic>>,
}

/// Parsed units of a project and the links between them.
pub struct Program {
    resolver: ModuleResolver,
    target: Option<String>,
    units: Vec<ProgramUnit>,
    index: FxHashMap<PathBuf, usize>,
}

impl Program {
    /// Load the tsconfig file set through `host` and link it.
    #[tracing::instrument(skip_all, fields(config = %config.path.display()))]
    pub fn build(config: &TsConfig, host: &dyn SourceHost) -> CanonResult<Self> {
        let start = Instant::now();
        let files = config.file_names()?;

        // An unreadable file is left out; the lint pass reports it per file.
        let units: Vec<SourceUnit> = files
            .par_iter()
            .filter_map(|path| match host.get_source(path) {
                Ok(unit) => unit,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "skipping unreadable source");
                    None
                }
            })
            .collect();

        let resolver = ModuleResolver::new(
            config.base_dir(),
            config.compiler_options.paths.as_deref(),
        );
        let mut program = Self::from_units(resolver, units, host);
        program.target = config.compiler_options.target.clone();

        tracing::info!(
            units = program.len(),
            target = program.target.as_deref().unwrap_or("default"),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "program built"
        );
        Ok(program)
    }

    /// Link already-loaded units.
    pub fn from_units(resolver: ModuleResolver, units: Vec<SourceUnit>, host: &dyn SourceHost) -> Self {
        let scanned: Vec<(SourceUnit, ModuleRecord)> = units
            .into_par_iter()
            .map(|unit| {
                let mut record = scan_module(&unit.text, unit.source_type);
                if unit.is_composite() {
                    // Components always have a default export; without an
                    // analyzable script nothing else is known.
                    record.exports.insert("default");
                    if unit.text.is_empty() {
                        record.exports.mark_opaque();
                    }
                }
                (unit, record)
            })
            .collect();

        let known: FxHashSet<PathBuf> = scanned.iter().map(|(unit, _)| unit.path.clone()).collect();
        let resolution_host = ModuleResolutionHost::new(host, &known);

        let units: Vec<ProgramUnit> = scanned
            .into_par_iter()
            .map(|(unit, record)| {
                let resolutions = record
                    .requests
                    .iter()
                    .map(|request| resolution_host.resolve(&resolver, &request.specifier, &unit.path))
                    .collect();
                ProgramUnit {
                    unit,
                    record,
                    resolutions,
                    diagnostics: OnceCell::new(),
                }
            })
            .collect();

        let index = units
            .iter()
            .enumerate()
            .map(|(idx, entry)| (entry.unit.path.clone(), idx))
            .collect();

        Self {
            resolver,
            target: None,
            units,
            index,
        }
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn resolver(&self) -> &ModuleResolver {
        &self.resolver
    }

    /// `compilerOptions.target` the program was built for.
    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    pub fn units(&self) -> impl Iterator<Item = &SourceUnit> {
        self.units.iter().map(|entry| &entry.unit)
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.index.contains_key(&cache_key(path))
    }

    pub fn unit(&self, path: &Path) -> Option<&SourceUnit> {
        self.entry(path).map(|entry| &entry.unit)
    }

    pub fn imports(&self, path: &Path) -> Option<&[ModuleRequest]> {
        self.entry(path).map(|entry| entry.record.requests.as_slice())
    }

    pub fn exports(&self, path: &Path) -> Option<&ModuleExports> {
        self.entry(path).map(|entry| &entry.record.exports)
    }

    /// Resolved target of `specifier` as imported by `path`.
    pub fn resolve_import(&self, path: &Path, specifier: &str) -> Option<&Path> {
        self.entry(path)?
            .resolution(specifier)
            .flatten()
            .map(PathBuf::as_path)
    }

    /// Compute semantic diagnostics of every unit in parallel.
    pub fn warm_up(&self) {
        let start = Instant::now();
        (0..self.units.len()).into_par_iter().for_each(|idx| {
            self.diagnostics_at(idx);
        });
        tracing::info!(
            units = self.units.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "program warmed up"
        );
    }

    /// Semantic diagnostics of a unit; empty for paths outside the program.
    pub fn semantic_diagnostics(&self, path: &Path) -> &[SemanticDiagnostic] {
        match self.index.get(&cache_key(path)) {
            Some(&idx) => self.diagnostics_at(idx),
            None => &[],
        }
    }

    fn entry(&self, path: &Path) -> Option<&ProgramUnit> {
        self.index.get(&cache_key(path)).map(|&idx| &self.units[idx])
    }

    fn diagnostics_at(&self, idx: usize) -> &[SemanticDiagnostic] {
        self.units[idx]
            .diagnostics
            .get_or_init(|| self.compute_diagnostics(idx))
    }

    fn compute_diagnostics(&self, idx: usize) -> Vec<SemanticDiagnostic> {
        let entry = &self.units[idx];
        self.diagnose_entry(entry, &entry.record)
    }

    /// Semantic diagnostics of a rescanned version of a unit's text.
    ///
    /// Requests are looked up by specifier among the unit's resolved
    /// requests, so edits that only drop or move imports are checked without
    /// touching the disk. Spans are those of `record`.
    pub fn diagnose(&self, path: &Path, record: &ModuleRecord) -> Vec<SemanticDiagnostic> {
        match self.entry(path) {
            Some(entry) => self.diagnose_entry(entry, record),
            None => Vec::new(),
        }
    }

    fn diagnose_entry(&self, entry: &ProgramUnit, record: &ModuleRecord) -> Vec<SemanticDiagnostic> {
        let mut diagnostics: Vec<SemanticDiagnostic> = record
            .syntax_errors
            .iter()
            .map(|error| SemanticDiagnostic {
                kind: SemanticDiagnosticKind::Syntax,
                message: error.message.clone(),
                span: error.span,
            })
            .collect();

        for request in &record.requests {
            let Some(resolved) = entry.resolution(&request.specifier) else {
                continue;
            };
            let Some(target) = resolved else {
                diagnostics.push(SemanticDiagnostic {
                    kind: SemanticDiagnosticKind::UnresolvedModule,
                    message: format!(
                        "Cannot find module '{}' or its corresponding type declarations.",
                        request.specifier
                    ),
                    span: request.span,
                });
                continue;
            };

            // Targets outside the program (packages, assets) are not checked.
            let Some(exports) = self.index.get(target).map(|&t| &self.units[t].record.exports) else {
                continue;
            };
            if request.kind == RequestKind::Dynamic {
                continue;
            }
            for name in &request.names {
                if exports.contains(&name.name) {
                    continue;
                }
                let message = if name.name == "default" {
                    format!("Module '{}' has no default export.", request.specifier)
                } else {
                    format!(
                        "Module '{}' has no exported member '{}'.",
                        request.specifier, name.name
                    )
                };
                diagnostics.push(SemanticDiagnostic {
                    kind: SemanticDiagnosticKind::MissingExport,
                    message,
                    span: name.span,
                });
            }
        }

        diagnostics.sort_by_key(|d| d.span.start);
        diagnostics
    }
}

impl ProgramUnit {
    /// `None` when the unit never requested `specifier`.
    fn resolution(&self, specifier: &str) -> Option<Option<&PathBuf>> {
        self.record
            .requests
            .iter()
            .position(|request| request.specifier == specifier)
            .map(|idx| self.resolutions[idx].as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{OsSourceHost, VirtualSourceHost};
    use std::fs;
    use vernis_sfc::ReassemblyCache;

    fn write(root: &Path, rel: &str, contents: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    fn project() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(root, "tsconfig.json", r#"{ "compilerOptions": { "target": "es2017" }, "include": ["src"] }"#);
        write(
            root,
            "src/main.ts",
            "import App from './App.vue'\nimport { helper, nope } from '@/util'\nimport missing from './missing'\nhelper(App)\n",
        );
        write(root, "src/util.ts", "export function helper(x: unknown) { return x }\n");
        write(
            root,
            "src/App.vue",
            "<template><p/></template>\n<script lang=\"ts\">\nimport { helper } from './util'\nexport default { name: helper('App') }\n</script>\n",
        );
        dir
    }

    #[test]
    fn test_build_links_units() {
        let dir = project();
        let cache = ReassemblyCache::new();
        let host = VirtualSourceHost::new(OsSourceHost, &cache);
        let config = TsConfig::load(&dir.path().join("tsconfig.json")).unwrap();

        let program = Program::build(&config, &host).unwrap();
        let root = &config.root;
        assert_eq!(program.len(), 3);
        assert_eq!(program.target(), Some("es2017"));
        assert!(cache.contains(&root.join("src/App.vue")));

        let main = root.join("src/main.ts");
        assert_eq!(program.imports(&main).unwrap().len(), 3);
        assert_eq!(
            program.resolve_import(&main, "./App.vue"),
            Some(root.join("src/App.vue").as_path())
        );
        assert_eq!(
            program.resolve_import(&main, "@/util"),
            Some(root.join("src/util.ts").as_path())
        );
        assert_eq!(program.resolve_import(&main, "./missing"), None);

        let app = program.unit(&root.join("src/App.vue")).unwrap();
        assert!(app.is_composite());
        assert!(program.exports(&root.join("src/App.vue")).unwrap().contains("default"));
    }

    #[test]
    fn test_semantic_diagnostics() {
        let dir = project();
        let cache = ReassemblyCache::new();
        let host = VirtualSourceHost::new(OsSourceHost, &cache);
        let config = TsConfig::load(&dir.path().join("tsconfig.json")).unwrap();
        let program = Program::build(&config, &host).unwrap();
        program.warm_up();

        let diagnostics = program.semantic_diagnostics(&config.root.join("src/main.ts"));
        let summary: Vec<_> = diagnostics.iter().map(|d| (d.kind, d.message.as_str())).collect();
        assert_eq!(
            summary,
            vec![
                (
                    SemanticDiagnosticKind::MissingExport,
                    "Module '@/util' has no exported member 'nope'."
                ),
                (
                    SemanticDiagnosticKind::UnresolvedModule,
                    "Cannot find module './missing' or its corresponding type declarations."
                ),
            ]
        );

        assert!(program
            .semantic_diagnostics(&config.root.join("src/App.vue"))
            .is_empty());
        assert!(program
            .semantic_diagnostics(Path::new("/outside/file.ts"))
            .is_empty());
    }

    #[test]
    fn test_build_skips_unreadable_units() {
        let dir = project();
        fs::write(dir.path().join("src/bad.ts"), b"const s = '\xff\xfe'\n").unwrap();
        let cache = ReassemblyCache::new();
        let host = VirtualSourceHost::new(OsSourceHost, &cache);
        let config = TsConfig::load(&dir.path().join("tsconfig.json")).unwrap();

        let program = Program::build(&config, &host).unwrap();
        assert_eq!(program.len(), 3);
        assert!(!program.contains(&config.root.join("src/bad.ts")));
        assert!(program.contains(&config.root.join("src/main.ts")));
    }

    #[test]
    fn test_diagnose_edited_text() {
        let dir = project();
        let cache = ReassemblyCache::new();
        let host = VirtualSourceHost::new(OsSourceHost, &cache);
        let config = TsConfig::load(&dir.path().join("tsconfig.json")).unwrap();
        let program = Program::build(&config, &host).unwrap();
        let main = config.root.join("src/main.ts");

        let edited = "import { helper } from '@/util'\nimport missing from './missing'\n";
        let record = scan_module(edited, oxc_span::SourceType::ts());
        let diagnostics = program.diagnose(&main, &record);

        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].kind, SemanticDiagnosticKind::UnresolvedModule);
        let start = diagnostics[0].span.start as usize;
        assert_eq!(&edited[start..start + 11], "'./missing'");
    }
}

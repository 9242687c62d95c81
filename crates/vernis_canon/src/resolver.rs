//! Module specifier resolution.
//!
//! [`ModuleResolver`] turns a specifier into a candidate path: alias
//! substitution from tsconfig `paths`, then relative resolution against the
//! importing file. [`ModuleResolutionHost`] decides which file a candidate
//! actually names.

use crate::host::SourceHost;
use crate::tsconfig::PathMapping;
use rustc_hash::FxHashSet;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use vernis_sfc::normalize_path;

/// Alias symbol used when tsconfig has no `paths` table.
pub const DEFAULT_ALIAS_SYMBOL: &str = "@";

/// Directory an alias maps to when it has no substitution.
pub const DEFAULT_ALIAS_DIR: &str = "src";

/// Extensions tried, in order, when a candidate names no file directly.
pub const RESOLVE_EXTENSIONS: &[&str] = &["ts", "tsx", "d.ts", "vue", "js", "jsx", "mjs", "cjs"];

/// A path alias such as `@` → `src/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasRule {
    /// Leading specifier segment, e.g. `@` or `~`
    pub symbol: String,
    /// Replacement directory relative to the base directory
    pub substitution: Option<String>,
}

impl AliasRule {
    /// Derive the working alias set from a `paths` table.
    ///
    /// Without a table the set is the single rule `@` with no substitution.
    pub fn from_paths(paths: Option<&[PathMapping]>) -> Vec<AliasRule> {
        let Some(paths) = paths else {
            return vec![AliasRule {
                symbol: DEFAULT_ALIAS_SYMBOL.to_string(),
                substitution: None,
            }];
        };

        let mut rules: Vec<AliasRule> = Vec::new();
        for mapping in paths {
            let key = mapping.pattern.as_str();
            if key.starts_with('.') || key.starts_with('/') {
                continue;
            }
            let symbol = key.split('/').next().unwrap_or(key);
            let wildcard = format!("{symbol}/*");
            let substitution = paths
                .iter()
                .find(|m| m.pattern == wildcard)
                .and_then(|m| m.targets.first())
                .map(|target| target.replacen('*', "", 1));

            let rule = AliasRule {
                symbol: symbol.to_string(),
                substitution,
            };
            match rules.iter_mut().find(|r| r.symbol == rule.symbol) {
                Some(existing) => *existing = rule,
                None => rules.push(rule),
            }
        }
        rules
    }

    /// Remainder of `specifier` after `<symbol>/`, if the rule applies.
    fn strip<'s>(&self, specifier: &'s str) -> Option<&'s str> {
        specifier
            .strip_prefix(self.symbol.as_str())
            .and_then(|rest| rest.strip_prefix('/'))
    }
}

/// Maps specifiers to candidate paths.
#[derive(Debug, Clone)]
pub struct ModuleResolver {
    base_dir: PathBuf,
    rules: Vec<AliasRule>,
}

impl ModuleResolver {
    pub fn new(base_dir: &Path, paths: Option<&[PathMapping]>) -> Self {
        Self::with_rules(base_dir, AliasRule::from_paths(paths))
    }

    pub fn with_rules(base_dir: &Path, rules: Vec<AliasRule>) -> Self {
        Self {
            base_dir: normalize_path(base_dir),
            rules,
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn rules(&self) -> &[AliasRule] {
        &self.rules
    }

    /// Resolve a specifier imported from `containing_file` to a candidate path.
    ///
    /// Purely lexical: nothing on disk is consulted.
    pub fn resolve(&self, specifier: &str, containing_file: &Path) -> PathBuf {
        if let Some((rule, rest)) = self.match_alias(specifier) {
            let substitution = rule.substitution.as_deref().unwrap_or(DEFAULT_ALIAS_DIR);
            return normalize_path(&self.base_dir.join(substitution).join(rest));
        }

        let path = Path::new(specifier);
        if path.is_absolute() {
            return path.to_path_buf();
        }
        let dir = containing_file.parent().unwrap_or(Path::new(""));
        normalize_path(&dir.join(path))
    }

    /// Whether a specifier names a package rather than a file.
    pub fn is_bare(&self, specifier: &str) -> bool {
        !specifier.starts_with('.')
            && !Path::new(specifier).is_absolute()
            && self.match_alias(specifier).is_none()
    }

    fn match_alias<'s>(&self, specifier: &'s str) -> Option<(&AliasRule, &'s str)> {
        self.rules
            .iter()
            .find_map(|rule| rule.strip(specifier).map(|rest| (rule, rest)))
    }
}

/// Decides which file, if any, a candidate path names.
///
/// Units already in the program count as existing even when the host cannot
/// see them.
pub struct ModuleResolutionHost<'h> {
    host: &'h dyn SourceHost,
    known: &'h FxHashSet<PathBuf>,
}

impl<'h> ModuleResolutionHost<'h> {
    pub fn new(host: &'h dyn SourceHost, known: &'h FxHashSet<PathBuf>) -> Self {
        Self { host, known }
    }

    fn exists(&self, path: &Path) -> bool {
        self.known.contains(path) || self.host.file_exists(path)
    }

    /// Exact file, then with an extension, then a directory index.
    pub fn resolve_candidate(&self, candidate: &Path) -> Option<PathBuf> {
        if self.exists(candidate) {
            return Some(candidate.to_path_buf());
        }

        // `./a.js` written against `a.ts`
        if let Some(stem) = strip_js_extension(candidate) {
            for ext in ["ts", "tsx"] {
                let path = with_extension(&stem, ext);
                if self.exists(&path) {
                    return Some(path);
                }
            }
        }

        for ext in RESOLVE_EXTENSIONS {
            let path = with_extension(candidate, ext);
            if self.exists(&path) {
                return Some(path);
            }
        }

        for ext in RESOLVE_EXTENSIONS {
            let path = candidate.join(format!("index.{ext}"));
            if self.exists(&path) {
                return Some(path);
            }
        }

        None
    }

    /// Look a package up in `node_modules`, walking up from the importer.
    pub fn resolve_package(&self, specifier: &str, containing_file: &Path) -> Option<PathBuf> {
        let mut dir = containing_file.parent();
        while let Some(current) = dir {
            let node_modules = current.join("node_modules");
            for base in [node_modules.join(specifier), node_modules.join("@types").join(specifier)] {
                if let Some(found) = self.resolve_candidate(&base) {
                    return Some(found);
                }
                if self.host.directory_exists(&base) {
                    return Some(base);
                }
            }
            dir = current.parent();
        }
        None
    }

    /// Full resolution of one import of `containing_file`.
    pub fn resolve(
        &self,
        resolver: &ModuleResolver,
        specifier: &str,
        containing_file: &Path,
    ) -> Option<PathBuf> {
        if specifier.starts_with("node:") {
            return Some(PathBuf::from(specifier));
        }
        let candidate = resolver.resolve(specifier, containing_file);
        if let Some(found) = self.resolve_candidate(&candidate) {
            return Some(found);
        }
        if resolver.is_bare(specifier) {
            return self.resolve_package(specifier, containing_file);
        }
        None
    }
}

fn with_extension(path: &Path, ext: &str) -> PathBuf {
    let mut name: OsString = path.as_os_str().to_os_string();
    name.push(".");
    name.push(ext);
    PathBuf::from(name)
}

fn strip_js_extension(path: &Path) -> Option<PathBuf> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("js" | "jsx") => Some(path.with_extension("")),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::OsSourceHost;

    fn mapping(pattern: &str, targets: &[&str]) -> PathMapping {
        PathMapping {
            pattern: pattern.to_string(),
            targets: targets.iter().map(|t| t.to_string()).collect(),
        }
    }

    #[test]
    fn test_default_alias_maps_to_src() {
        let resolver = ModuleResolver::new(Path::new("/base"), None);
        assert_eq!(
            resolver.resolve("@/a/b", Path::new("/base/src/main.ts")),
            PathBuf::from("/base/src/a/b")
        );
    }

    #[test]
    fn test_paths_substitution() {
        let paths = [mapping("@/*", &["lib/*"])];
        let resolver = ModuleResolver::new(Path::new("/base"), Some(&paths[..]));
        assert_eq!(
            resolver.resolve("@/a/b", Path::new("/base/x.ts")),
            PathBuf::from("/base/lib/a/b")
        );
    }

    #[test]
    fn test_relative_and_absolute() {
        let resolver = ModuleResolver::new(Path::new("/base"), None);
        assert_eq!(
            resolver.resolve("./x", Path::new("/p/q/file.ts")),
            PathBuf::from("/p/q/x")
        );
        assert_eq!(
            resolver.resolve("../y/z", Path::new("/p/q/file.ts")),
            PathBuf::from("/p/y/z")
        );
        assert_eq!(
            resolver.resolve("/abs/x", Path::new("/p/q/file.ts")),
            PathBuf::from("/abs/x")
        );
    }

    #[test]
    fn test_alias_rules_from_paths() {
        let paths = [
            mapping("~/*", &["app/*"]),
            mapping("./local/*", &["x/*"]),
            mapping("#shared", &["shared/index.ts"]),
            mapping("~", &["app"]),
        ];
        let rules = AliasRule::from_paths(Some(&paths[..]));
        assert_eq!(
            rules,
            vec![
                AliasRule {
                    symbol: "~".to_string(),
                    substitution: Some("app/".to_string()),
                },
                AliasRule {
                    symbol: "#shared".to_string(),
                    substitution: None,
                },
            ]
        );
    }

    #[test]
    fn test_empty_paths_table_has_no_alias() {
        let resolver = ModuleResolver::new(Path::new("/base"), Some(&[][..]));
        assert!(resolver.rules().is_empty());
        assert_eq!(
            resolver.resolve("@/a", Path::new("/base/src/main.ts")),
            PathBuf::from("/base/src/@/a")
        );
    }

    #[test]
    fn test_first_matching_alias_wins() {
        let resolver = ModuleResolver::with_rules(
            Path::new("/base"),
            vec![
                AliasRule {
                    symbol: "@".to_string(),
                    substitution: Some("first/".to_string()),
                },
                AliasRule {
                    symbol: "@".to_string(),
                    substitution: Some("second/".to_string()),
                },
            ],
        );
        assert_eq!(
            resolver.resolve("@/m", Path::new("/base/a.ts")),
            PathBuf::from("/base/first/m")
        );
    }

    #[test]
    fn test_is_bare() {
        let resolver = ModuleResolver::new(Path::new("/base"), None);
        assert!(resolver.is_bare("vue"));
        assert!(resolver.is_bare("@vue/runtime-core"));
        assert!(!resolver.is_bare("@/components/A.vue"));
        assert!(!resolver.is_bare("./a"));
        assert!(!resolver.is_bare("/abs"));
    }

    #[test]
    fn test_resolution_host_extensions_and_packages() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        std::fs::create_dir_all(root.join("src/util")).unwrap();
        std::fs::create_dir_all(root.join("node_modules/vue")).unwrap();
        std::fs::write(root.join("src/a.ts"), "").unwrap();
        std::fs::write(root.join("src/util/index.ts"), "").unwrap();
        std::fs::write(root.join("node_modules/vue/package.json"), "{}").unwrap();

        let known: FxHashSet<PathBuf> = [root.join("src/Comp.vue")].into_iter().collect();
        let host = OsSourceHost;
        let resolution = ModuleResolutionHost::new(&host, &known);
        let resolver = ModuleResolver::new(root, None);
        let importer = root.join("src/main.ts");

        assert_eq!(resolution.resolve(&resolver, "./a", &importer), Some(root.join("src/a.ts")));
        assert_eq!(resolution.resolve(&resolver, "./a.js", &importer), Some(root.join("src/a.ts")));
        assert_eq!(
            resolution.resolve(&resolver, "@/util", &importer),
            Some(root.join("src/util/index.ts"))
        );
        assert_eq!(
            resolution.resolve(&resolver, "./Comp.vue", &importer),
            Some(root.join("src/Comp.vue"))
        );
        assert_eq!(
            resolution.resolve(&resolver, "vue", &importer),
            Some(root.join("node_modules/vue"))
        );
        assert!(resolution.resolve(&resolver, "node:fs", &importer).is_some());
        assert_eq!(resolution.resolve(&resolver, "./missing", &importer), None);
        assert_eq!(resolution.resolve(&resolver, "left-pad", &importer), None);
    }
}

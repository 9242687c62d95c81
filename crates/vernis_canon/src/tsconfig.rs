//! tsconfig.json loading and file set expansion.

use crate::error::{CanonError, CanonResult};
use glob::{MatchOptions, Pattern};
use rustc_hash::FxHashSet;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use vernis_sfc::normalize_path;

/// Extensions that make up the program's file set.
pub const SOURCE_EXTENSIONS: &[&str] = &[".d.ts", ".ts", ".tsx", ".vue"];

const DEFAULT_INCLUDE: &str = "**/*";
const DEFAULT_EXCLUDE: &str = "node_modules";

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: true,
};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTsConfig {
    extends: Option<RawExtends>,
    #[serde(default)]
    compiler_options: RawCompilerOptions,
    include: Option<Vec<String>>,
    exclude: Option<Vec<String>>,
    files: Option<Vec<String>>,
}

/// `extends`: one base config, or several where later ones win.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawExtends {
    One(String),
    Many(Vec<String>),
}

impl RawExtends {
    fn into_vec(self) -> Vec<String> {
        match self {
            RawExtends::One(base) => vec![base],
            RawExtends::Many(bases) => bases,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCompilerOptions {
    base_url: Option<String>,
    paths: Option<serde_json::Map<String, serde_json::Value>>,
    target: Option<String>,
}

/// One entry of `compilerOptions.paths`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathMapping {
    /// Key as written, e.g. `@/*`
    pub pattern: String,
    /// Substitution targets in declaration order
    pub targets: Vec<String>,
}

/// The compiler options the program cares about.
#[derive(Debug, Clone, Default)]
pub struct CompilerOptions {
    /// `baseUrl`, resolved against the config directory
    pub base_url: Option<PathBuf>,
    /// `paths`, in declaration order
    pub paths: Option<Vec<PathMapping>>,
    /// `target` language version
    pub target: Option<String>,
}

/// A loaded tsconfig.json.
#[derive(Debug, Clone)]
pub struct TsConfig {
    /// Path of the config file
    pub path: PathBuf,
    /// Directory containing the config file
    pub root: PathBuf,
    pub compiler_options: CompilerOptions,
    include: Option<Vec<String>>,
    exclude: Option<Vec<String>>,
    files: Option<Vec<String>>,
}

impl TsConfig {
    /// Load a tsconfig from disk, following `extends`.
    #[tracing::instrument(fields(path = %path.display()))]
    pub fn load(path: &Path) -> CanonResult<Self> {
        let config = Self::load_chain(path, &mut Vec::new())?;
        tracing::info!(
            paths = config.compiler_options.paths.as_ref().map_or(0, Vec::len),
            target = config.compiler_options.target.as_deref().unwrap_or("default"),
            "tsconfig loaded"
        );
        Ok(config)
    }

    /// Parse tsconfig content. `path` locates the project root.
    ///
    /// `extends` is only followed by [`TsConfig::load`].
    pub fn from_str(contents: &str, path: &Path) -> CanonResult<Self> {
        let raw = parse_raw(contents, path)?;
        if raw.extends.is_some() {
            tracing::warn!(path = %path.display(), "`extends` is not followed for in-memory config");
        }
        Ok(Self::from_raw(raw, path))
    }

    fn load_chain(path: &Path, chain: &mut Vec<PathBuf>) -> CanonResult<Self> {
        let key = vernis_sfc::cache_key(path);
        if chain.contains(&key) {
            return Err(CanonError::Config {
                path: path.to_path_buf(),
                message: "circular `extends`".to_string(),
            });
        }
        chain.push(key);

        let contents = std::fs::read_to_string(path).map_err(|e| CanonError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let mut raw = parse_raw(&contents, path)?;
        let extends = raw.extends.take();
        let mut config = Self::from_raw(raw, path);

        // Fill from the last base first so later bases take precedence.
        for specifier in extends.map(RawExtends::into_vec).unwrap_or_default().iter().rev() {
            let Some(base_path) = config.resolve_extends(specifier) else {
                tracing::warn!(path = %path.display(), extends = %specifier, "base config not found, ignoring");
                continue;
            };
            let base = Self::load_chain(&base_path, chain)?;
            config.inherit(base);
        }

        chain.pop();
        Ok(config)
    }

    fn from_raw(raw: RawTsConfig, path: &Path) -> Self {
        let path = vernis_sfc::cache_key(path);
        let root = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("/"));

        let paths = raw.compiler_options.paths.map(|table| {
            table
                .into_iter()
                .map(|(pattern, targets)| PathMapping {
                    pattern,
                    targets: match targets {
                        serde_json::Value::Array(items) => items
                            .into_iter()
                            .filter_map(|item| item.as_str().map(str::to_string))
                            .collect(),
                        serde_json::Value::String(single) => vec![single],
                        _ => Vec::new(),
                    },
                })
                .collect()
        });

        Self {
            compiler_options: CompilerOptions {
                base_url: raw
                    .compiler_options
                    .base_url
                    .map(|base| normalize_path(&root.join(base))),
                paths,
                target: raw.compiler_options.target,
            },
            path,
            root,
            include: raw.include,
            exclude: raw.exclude,
            files: raw.files,
        }
    }

    /// Locate a base config: a path relative to this config, or a package
    /// under `node_modules`.
    fn resolve_extends(&self, specifier: &str) -> Option<PathBuf> {
        let candidates = |base: PathBuf| {
            let with_json = PathBuf::from(format!("{}.json", base.display()));
            let nested = base.join("tsconfig.json");
            [base, with_json, nested]
        };

        if specifier.starts_with('.') || Path::new(specifier).is_absolute() {
            let base = normalize_path(&self.root.join(specifier));
            return candidates(base).into_iter().find(|path| path.is_file());
        }

        self.root.ancestors().find_map(|dir| {
            let base = dir.join("node_modules").join(specifier);
            candidates(base).into_iter().find(|path| path.is_file())
        })
    }

    /// Take every setting this config leaves unset from `base`.
    fn inherit(&mut self, base: TsConfig) {
        let TsConfig {
            root: base_root,
            compiler_options: base_options,
            include,
            exclude,
            files,
            ..
        } = base;
        let options = &mut self.compiler_options;

        if options.paths.is_none() && base_options.paths.is_some() {
            options.paths = base_options.paths;
            // Inherited aliases stay relative to the config declaring them.
            if options.base_url.is_none() {
                options.base_url = Some(base_options.base_url.clone().unwrap_or_else(|| base_root.clone()));
            }
        }
        if options.base_url.is_none() {
            options.base_url = base_options.base_url;
        }
        if options.target.is_none() {
            options.target = base_options.target;
        }

        let rebase = |patterns: Vec<String>| -> Vec<String> {
            patterns
                .iter()
                .map(|pattern| base_root.join(pattern).to_string_lossy().into_owned())
                .collect()
        };
        if self.include.is_none() {
            self.include = include.map(rebase);
        }
        if self.exclude.is_none() {
            self.exclude = exclude.map(rebase);
        }
        if self.files.is_none() {
            self.files = files.map(rebase);
        }
    }

    /// Directory that alias substitutions are resolved against.
    pub fn base_dir(&self) -> &Path {
        self.compiler_options.base_url.as_deref().unwrap_or(&self.root)
    }

    /// Expand `files` and `include` minus `exclude` into a sorted, deduplicated
    /// list of absolute paths.
    pub fn file_names(&self) -> CanonResult<Vec<PathBuf>> {
        let mut seen = FxHashSet::default();
        let mut names = Vec::new();

        for file in self.files.iter().flatten() {
            let path = normalize_path(&self.root.join(file));
            if seen.insert(path.clone()) {
                names.push(path);
            }
        }

        let default_include = [DEFAULT_INCLUDE.to_string()];
        let include: &[String] = match (&self.include, &self.files) {
            (Some(include), _) => include,
            (None, Some(_)) => &[],
            (None, None) => &default_include,
        };
        let excludes = self.exclude_patterns();

        let mut globbed = Vec::new();
        for pattern in include {
            let full = self.include_pattern(pattern);
            let entries = glob::glob_with(&full, MATCH_OPTIONS).map_err(|e| CanonError::Config {
                path: self.path.clone(),
                message: format!("invalid include pattern {pattern:?}: {e}"),
            })?;
            for entry in entries {
                let path = entry.map_err(glob::GlobError::into_error)?;
                if path.is_file() && has_source_extension(&path) && !self.is_excluded(&path, &excludes) {
                    globbed.push(normalize_path(&path));
                }
            }
        }
        globbed.sort();

        for path in globbed {
            if seen.insert(path.clone()) {
                names.push(path);
            }
        }

        tracing::debug!(files = names.len(), "expanded tsconfig file set");
        Ok(names)
    }

    /// A directory include (no wildcard, no extension) means everything below it.
    fn include_pattern(&self, pattern: &str) -> String {
        let joined = self.root.join(pattern);
        let is_dir_like = !pattern.contains('*') && joined.is_dir();
        let full = if is_dir_like {
            joined.join(DEFAULT_INCLUDE)
        } else {
            joined
        };
        full.to_string_lossy().into_owned()
    }

    fn exclude_patterns(&self) -> Vec<Pattern> {
        let default_exclude = [DEFAULT_EXCLUDE.to_string()];
        let exclude: &[String] = self.exclude.as_deref().unwrap_or(&default_exclude);
        exclude
            .iter()
            .filter_map(|pattern| {
                let full = normalize_path(&self.root.join(pattern));
                match Pattern::new(&full.to_string_lossy()) {
                    Ok(compiled) => Some(compiled),
                    Err(e) => {
                        tracing::warn!(pattern = %pattern, error = %e, "ignoring invalid exclude pattern");
                        None
                    }
                }
            })
            .collect()
    }

    /// A path is excluded when it or one of its directories below the root
    /// matches an exclude pattern.
    fn is_excluded(&self, path: &Path, excludes: &[Pattern]) -> bool {
        path.ancestors()
            .take_while(|ancestor| *ancestor != self.root)
            .any(|ancestor| excludes.iter().any(|p| p.matches_path_with(ancestor, MATCH_OPTIONS)))
    }
}

fn parse_raw(contents: &str, path: &Path) -> CanonResult<RawTsConfig> {
    serde_json::from_str(contents).map_err(|e| CanonError::Config {
        path: path.to_path_buf(),
        message: format!("JSON parse error: {e}"),
    })
}

/// Whether a file belongs to the program's file set by extension.
pub fn has_source_extension(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
        return false;
    };
    SOURCE_EXTENSIONS.iter().any(|ext| name.ends_with(ext))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(root: &Path, rel: &str, contents: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn test_parse_compiler_options() {
        let config = TsConfig::from_str(
            r#"{
                "compilerOptions": {
                    "baseUrl": ".",
                    "target": "es2017",
                    "paths": { "~/*": ["lib/*"], "@/*": ["src/*", "other/*"] }
                }
            }"#,
            Path::new("/proj/tsconfig.json"),
        )
        .unwrap();

        assert_eq!(config.root, PathBuf::from("/proj"));
        assert_eq!(config.base_dir(), Path::new("/proj"));
        assert_eq!(config.compiler_options.target.as_deref(), Some("es2017"));

        let paths = config.compiler_options.paths.unwrap();
        assert_eq!(paths[0].pattern, "~/*");
        assert_eq!(paths[1].pattern, "@/*");
        assert_eq!(paths[1].targets, vec!["src/*", "other/*"]);
    }

    #[test]
    fn test_malformed_config() {
        let err = TsConfig::from_str("{ \"compilerOptions\": ", Path::new("/p/tsconfig.json"))
            .unwrap_err();
        assert!(matches!(err, CanonError::Config { .. }));
        assert!(err.to_string().contains("JSON parse error"));
    }

    #[test]
    fn test_missing_config() {
        let err = TsConfig::load(Path::new("/nope/tsconfig.json")).unwrap_err();
        assert!(matches!(err, CanonError::Config { .. }));
    }

    #[test]
    fn test_file_names_default_include() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(root, "src/main.ts", "");
        write(root, "src/App.vue", "");
        write(root, "src/types.d.ts", "");
        write(root, "src/style.css", "");
        write(root, "node_modules/vue/index.d.ts", "");
        write(root, ".cache/x.ts", "");

        let config = TsConfig::from_str("{}", &root.join("tsconfig.json")).unwrap();
        let names = config.file_names().unwrap();
        let rel: Vec<_> = names
            .iter()
            .map(|p| p.strip_prefix(&config.root).unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(rel, vec!["src/App.vue", "src/main.ts", "src/types.d.ts"]);
    }

    #[test]
    fn test_file_names_include_exclude_files() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(root, "src/a.ts", "");
        write(root, "src/gen/b.ts", "");
        write(root, "extra.ts", "");
        write(root, "tests/c.ts", "");

        let config = TsConfig::from_str(
            r#"{ "files": ["extra.ts"], "include": ["src"], "exclude": ["src/gen"] }"#,
            &root.join("tsconfig.json"),
        )
        .unwrap();
        let names = config.file_names().unwrap();
        let rel: Vec<_> = names
            .iter()
            .map(|p| p.strip_prefix(&config.root).unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(rel, vec!["extra.ts", "src/a.ts"]);
    }

    #[test]
    fn test_extends_inherits_unset_options() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(
            root,
            "configs/base.json",
            r#"{ "compilerOptions": { "target": "es2017", "paths": { "@/*": ["../src/*"] } }, "include": ["../lib"] }"#,
        );
        write(root, "tsconfig.json", r#"{ "extends": "./configs/base", "include": ["src"] }"#);

        let config = TsConfig::load(&root.join("tsconfig.json")).unwrap();
        assert_eq!(config.compiler_options.target.as_deref(), Some("es2017"));
        assert_eq!(config.compiler_options.paths.as_ref().unwrap()[0].pattern, "@/*");
        assert_eq!(config.base_dir(), config.root.join("configs"));
        assert_eq!(config.include, Some(vec!["src".to_string()]));
    }

    #[test]
    fn test_extends_later_base_wins() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(
            root,
            "node_modules/@vue/tsconfig/tsconfig.json",
            r#"{ "compilerOptions": { "target": "esnext", "baseUrl": "." } }"#,
        );
        write(root, "tsconfig.base.json", r#"{ "compilerOptions": { "target": "es2020" } }"#);
        write(
            root,
            "tsconfig.json",
            r#"{ "extends": ["@vue/tsconfig", "./tsconfig.base.json", "./gone.json"] }"#,
        );

        let config = TsConfig::load(&root.join("tsconfig.json")).unwrap();
        assert_eq!(config.compiler_options.target.as_deref(), Some("es2020"));
        assert_eq!(
            config.base_dir(),
            config.root.join("node_modules/@vue/tsconfig")
        );
    }

    #[test]
    fn test_circular_extends() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(root, "a.json", r#"{ "extends": "./b.json" }"#);
        write(root, "b.json", r#"{ "extends": "./a.json" }"#);

        let err = TsConfig::load(&root.join("a.json")).unwrap_err();
        assert!(err.to_string().contains("circular"));
    }

    #[test]
    fn test_has_source_extension() {
        assert!(has_source_extension(Path::new("a.ts")));
        assert!(has_source_extension(Path::new("a.d.ts")));
        assert!(has_source_extension(Path::new("A.vue")));
        assert!(!has_source_extension(Path::new("a.js")));
        assert!(!has_source_extension(Path::new("a.json")));
    }
}

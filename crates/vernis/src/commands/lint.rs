//! Lint command - Lint and fix TypeScript sources and Vue components

use crate::config::{VernisConfig, DEFAULT_CONFIG};
use crate::error::CliError;
use clap::Args;
use rustc_hash::FxHashSet;
use std::path::{Path, PathBuf};
use std::time::Instant;
use vernis_canon::{OsSourceHost, Program, SourceHost, TsConfig, VirtualSourceHost};
use vernis_patina::{
    format_report, FileLintResult, FileWriter, LintReport, Linter, OsFileWriter, OutputFormat,
    WriteBackReassembler,
};
use vernis_sfc::{is_composite_path, normalize_path, ReassemblyCache, SegmentExtractor};

/// `*` stops at path separators in exclusion globs.
const EXCLUDE_MATCH: glob::MatchOptions = glob::MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Files linted when no pattern is given.
pub const DEFAULT_PATTERNS: &[&str] = &[
    "src/**/*.ts",
    "src/**/*.vue",
    "src/**/*.tsx",
    "tests/**/*.ts",
    "tests/**/*.tsx",
];

#[derive(Args, Debug, Clone)]
pub struct LintArgs {
    /// Files or glob patterns to lint (default: sources under src/ and tests/)
    pub patterns: Vec<String>,

    /// Path to the project's tsconfig.json
    #[arg(short, long, default_value = "tsconfig.json")]
    pub project: PathBuf,

    /// Lint config file (default: vernis.json, if present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output format (text, json, prose)
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,

    /// Report problems without fixing them
    #[arg(long)]
    pub no_fix: bool,

    /// Exit with 0 even if problems remain
    #[arg(long)]
    pub force: bool,

    /// Print nothing
    #[arg(long)]
    pub silent: bool,
}

impl Default for LintArgs {
    fn default() -> Self {
        Self {
            patterns: Vec::new(),
            project: PathBuf::from("tsconfig.json"),
            config: None,
            format: OutputFormat::Text,
            no_fix: false,
            force: false,
            silent: false,
        }
    }
}

/// Result of a lint run.
#[derive(Debug)]
pub struct LintOutcome {
    pub report: LintReport,
    /// What the run prints to stdout
    pub output: String,
    pub exit_code: i32,
}

pub fn run(args: LintArgs) -> i32 {
    let cwd = match std::env::current_dir() {
        Ok(cwd) => cwd,
        Err(e) => {
            eprintln!("error: current directory is not accessible: {e}");
            return 2;
        }
    };

    match lint(&args, &cwd) {
        Ok(outcome) => {
            print!("{}", outcome.output);
            outcome.exit_code
        }
        Err(e) => {
            eprintln!("error: {e}");
            2
        }
    }
}

/// Run one lint pass over the project in `cwd`.
pub fn lint(args: &LintArgs, cwd: &Path) -> Result<LintOutcome, CliError> {
    let start = Instant::now();
    let cwd = normalize_path(cwd);

    let config = match &args.config {
        Some(path) => VernisConfig::load(&cwd.join(path), true)?,
        None => VernisConfig::load(&cwd.join(DEFAULT_CONFIG), false)?,
    };
    let tsconfig = TsConfig::load(&cwd.join(&args.project))?;

    let patterns: Vec<String> = if args.patterns.is_empty() {
        DEFAULT_PATTERNS.iter().map(|p| p.to_string()).collect()
    } else {
        args.patterns.clone()
    };
    let files = discover(&cwd, &patterns, &config.linter_options.exclude)?;

    let cache = ReassemblyCache::new();
    let host = VirtualSourceHost::new(OsSourceHost, &cache);
    let program = Program::build(&tsconfig, &host)?;
    program.warm_up();

    let linter = config.configure(Linter::new().with_fix(!args.no_fix));
    let writer = WriteBackReassembler::new(OsFileWriter, &cache);
    let extractor = SegmentExtractor::new(&cache);

    let mut report = LintReport::new();
    for path in &files {
        if let Some(result) = lint_path(&linter, path, &extractor, &host, &program, &writer) {
            report.push(result);
        }
    }

    let summary = report.summary;
    tracing::info!(
        files = summary.file_count,
        errors = summary.error_count,
        warnings = summary.warning_count,
        fixed = summary.fixed_count,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "lint pass finished"
    );

    let output = if args.silent {
        String::new()
    } else {
        format_report(&report, &cwd, args.format)
    };
    let exit_code = if report.has_failures() && !args.force { 1 } else { 0 };

    Ok(LintOutcome {
        report,
        output,
        exit_code,
    })
}

/// Lint one file. `None` when the file has nothing to lint.
fn lint_path<W: FileWriter>(
    linter: &Linter,
    path: &Path,
    extractor: &SegmentExtractor<'_>,
    host: &dyn SourceHost,
    program: &Program,
    writer: &WriteBackReassembler<'_, W>,
) -> Option<FileLintResult> {
    if is_composite_path(path) {
        match extractor.extract(path) {
            Ok(Some(_)) => {}
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to extract script");
                return Some(FileLintResult::internal(path, e.to_string()));
            }
        }
    }

    let _active = writer.activate();
    match linter.lint_file(path, host, Some(program), writer) {
        Ok(result) => result,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "failed to lint file");
            Some(FileLintResult::internal(path, e.to_string()))
        }
    }
}

/// Expand `patterns` relative to `cwd`, keeping the first occurrence of each
/// file and dropping paths matched by an `exclude` glob.
pub fn discover(cwd: &Path, patterns: &[String], exclude: &[String]) -> Result<Vec<PathBuf>, CliError> {
    let excluded = exclude
        .iter()
        .map(|pattern| {
            glob::Pattern::new(pattern).map_err(|source| CliError::Pattern {
                pattern: pattern.clone(),
                source,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut seen = FxHashSet::default();
    let mut files = Vec::new();
    for pattern in patterns {
        let full = cwd.join(pattern);
        let entries = glob::glob(&full.to_string_lossy()).map_err(|source| CliError::Pattern {
            pattern: pattern.clone(),
            source,
        })?;
        for path in entries.flatten() {
            if !path.is_file() {
                continue;
            }
            let path = normalize_path(&path);
            let relative = path.strip_prefix(cwd).unwrap_or(&path);
            if excluded.iter().any(|pattern| pattern.matches_path_with(relative, EXCLUDE_MATCH)) {
                tracing::debug!(path = %relative.display(), "excluded");
                continue;
            }
            if seen.insert(path.clone()) {
                files.push(path);
            }
        }
    }

    tracing::debug!(files = files.len(), "discovered files");
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }

    #[test]
    fn test_discover_defaults_and_exclusions() {
        let dir = tempfile::tempdir().unwrap();
        let root = normalize_path(dir.path());
        touch(&root, "src/main.ts");
        touch(&root, "src/App.vue");
        touch(&root, "src/generated/api.ts");
        touch(&root, "tests/unit/app.spec.ts");
        touch(&root, "scripts/build.ts");

        let patterns: Vec<String> = DEFAULT_PATTERNS.iter().map(|p| p.to_string()).collect();
        let files = discover(&root, &patterns, &["src/generated/**".to_string()]).unwrap();
        let relative: Vec<_> = files
            .iter()
            .map(|p| p.strip_prefix(&root).unwrap().to_string_lossy().replace('\\', "/"))
            .collect();

        assert_eq!(relative, vec!["src/main.ts", "src/App.vue", "tests/unit/app.spec.ts"]);
    }

    #[test]
    fn test_discover_deduplicates() {
        let dir = tempfile::tempdir().unwrap();
        let root = normalize_path(dir.path());
        touch(&root, "src/main.ts");

        let patterns = vec!["src/*.ts".to_string(), "src/main.ts".to_string()];
        let files = discover(&root, &patterns, &[]).unwrap();
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn test_exclusion_star_stays_in_directory() {
        let dir = tempfile::tempdir().unwrap();
        let root = normalize_path(dir.path());
        touch(&root, "src/main.ts");
        touch(&root, "src/a/b.ts");

        let files = discover(&root, &["src/**/*.ts".to_string()], &["src/*.ts".to_string()]).unwrap();
        assert_eq!(files, vec![root.join("src/a/b.ts")]);
    }

    #[test]
    fn test_invalid_exclusion() {
        let err = discover(Path::new("/project"), &[], &["src/[".to_string()]).unwrap_err();
        assert!(matches!(err, CliError::Pattern { .. }));
    }
}

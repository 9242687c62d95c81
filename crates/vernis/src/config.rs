//! Lint configuration loading for vernis.
//!
//! Reads `vernis.json` from the working directory unless another path is
//! given. Without a config file every recommended rule runs with its
//! default severity.

use crate::error::CliError;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use vernis_patina::{Linter, RuleSetting, Severity};

/// Default lint config file name.
pub const DEFAULT_CONFIG: &str = "vernis.json";

/// Top-level vernis configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VernisConfig {
    /// JSON Schema reference (for editor autocompletion).
    #[serde(rename = "$schema", default)]
    pub schema: Option<String>,

    /// Per-rule settings, keyed by rule name.
    #[serde(default)]
    pub rules: BTreeMap<String, RuleConfig>,

    #[serde(default)]
    pub linter_options: LinterOptions,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinterOptions {
    /// Globs removed from the discovered file set, relative to the working
    /// directory.
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Check blank lines inside Vue components too.
    #[serde(default)]
    pub composite_blank_lines: bool,
}

/// One rule entry: `true`/`false`, a level, or `{ "severity": level }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RuleConfig {
    Enabled(bool),
    Level(RuleLevel),
    Detailed { severity: RuleLevel },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleLevel {
    Default,
    Error,
    #[serde(alias = "warn")]
    Warning,
    #[serde(alias = "none")]
    Off,
}

impl RuleConfig {
    pub fn setting(self) -> RuleSetting {
        let level = match self {
            RuleConfig::Enabled(true) => RuleLevel::Default,
            RuleConfig::Enabled(false) => RuleLevel::Off,
            RuleConfig::Level(level) | RuleConfig::Detailed { severity: level } => level,
        };
        match level {
            RuleLevel::Default => RuleSetting::Default,
            RuleLevel::Error => RuleSetting::Severity(Severity::Error),
            RuleLevel::Warning => RuleSetting::Severity(Severity::Warning),
            RuleLevel::Off => RuleSetting::Off,
        }
    }
}

impl VernisConfig {
    /// Parse config content.
    pub fn from_str(contents: &str, path: &Path) -> Result<Self, CliError> {
        serde_json::from_str(contents).map_err(|source| CliError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load the config at `path`. A missing file is an error only when
    /// `required` is set.
    pub fn load(path: &Path, required: bool) -> Result<Self, CliError> {
        if !required && !path.exists() {
            tracing::debug!(path = %path.display(), "no lint config, using recommended rules");
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path).map_err(|source| CliError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_str(&contents, path)
    }

    /// Apply the rule settings to `linter`. Unknown rule names are ignored.
    pub fn configure(&self, mut linter: Linter) -> Linter {
        linter = linter.with_composite_blank_lines(self.linter_options.composite_blank_lines);
        for (name, rule) in &self.rules {
            if linter.registry().find(name).is_none() {
                tracing::warn!(rule = %name, "unknown rule in lint config, ignoring");
                continue;
            }
            linter = linter.with_setting(name.clone(), rule.setting());
        }
        linter
    }
}

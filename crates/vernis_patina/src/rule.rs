//! Rule trait and registry for lint rules.

use crate::context::LintContext;
use crate::diagnostic::Severity;
use oxc_ast::ast;

/// Rule metadata
pub struct RuleMeta {
    /// Rule name (e.g., "no-unused-imports")
    pub name: &'static str,
    /// Human-readable description
    pub description: &'static str,
    /// Whether rule is auto-fixable
    pub fixable: bool,
    /// Whether the rule needs the program (cross-file information)
    pub type_aware: bool,
    /// Default severity
    pub default_severity: Severity,
}

/// How a rule is configured for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RuleSetting {
    /// Enabled with the rule's default severity
    #[default]
    Default,
    /// Enabled with an explicit severity
    Severity(Severity),
    Off,
}

impl RuleSetting {
    /// Effective severity, `None` when the rule is off.
    pub fn severity(self, meta: &RuleMeta) -> Option<Severity> {
        match self {
            RuleSetting::Default => Some(meta.default_severity),
            RuleSetting::Severity(severity) => Some(severity),
            RuleSetting::Off => None,
        }
    }
}

/// Rule trait for implementing lint rules
///
/// A rule runs once per unit over the parsed script and reports through the
/// context, which carries the rule's effective severity.
pub trait Rule: Send + Sync {
    /// Get rule metadata
    fn meta(&self) -> &'static RuleMeta;

    fn run(&self, ctx: &mut LintContext<'_>, program: &ast::Program<'_>);
}

/// Registry holding all available lint rules
pub struct RuleRegistry {
    rules: Vec<Box<dyn Rule>>,
}

impl RuleRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Register a rule
    pub fn register(&mut self, rule: Box<dyn Rule>) {
        self.rules.push(rule);
    }

    /// Get all registered rules
    pub fn rules(&self) -> &[Box<dyn Rule>] {
        &self.rules
    }

    /// Look up a rule by name
    pub fn find(&self, name: &str) -> Option<&dyn Rule> {
        self.rules
            .iter()
            .find(|rule| rule.meta().name == name)
            .map(|rule| rule.as_ref())
    }

    /// Create registry with all built-in rules
    pub fn with_recommended() -> Self {
        let mut registry = Self::new();

        registry.register(Box::new(crate::rules::NoUnusedImports));
        registry.register(Box::new(crate::rules::NoConsecutiveBlankLines));
        registry.register(Box::new(crate::rules::NoUnresolvedImports));

        registry
    }
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::with_recommended()
    }
}

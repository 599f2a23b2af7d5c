//! Watch rules: which file events trigger which action.
//!
//! Patterns are globs relative to the project root. A pattern starting with
//! `!` excludes matching paths from the rule. Wildcards never match a leading
//! dot, so editor swap files and other dotfiles do not fire rules.

use glob::{MatchOptions, Pattern};
use kiln_pipeline::{PipelineError, WatchAction, WatchEvent, WatchRuleConfig};
use std::path::Path;

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: true,
};

/// One compiled watch rule.
#[derive(Debug, Clone)]
pub struct WatchRule {
    include: Vec<Pattern>,
    exclude: Vec<Pattern>,
    events: Vec<WatchEvent>,
    action: WatchAction,
}

impl WatchRule {
    /// Compile a configured rule.
    pub fn compile(config: &WatchRuleConfig) -> Result<Self, PipelineError> {
        let mut include = Vec::new();
        let mut exclude = Vec::new();

        for raw in &config.patterns {
            let (negated, pattern) = match raw.strip_prefix('!') {
                Some(rest) => (true, rest),
                None => (false, raw.as_str()),
            };
            let pattern = pattern.strip_prefix("./").unwrap_or(pattern);
            let compiled = Pattern::new(pattern).map_err(|e| {
                PipelineError::Config(format!("invalid watch pattern '{}': {}", raw, e))
            })?;

            if negated {
                exclude.push(compiled);
            } else {
                include.push(compiled);
            }
        }

        Ok(Self {
            include,
            exclude,
            events: config.events.clone(),
            action: config.action.clone(),
        })
    }

    pub fn action(&self) -> &WatchAction {
        &self.action
    }

    /// Whether `event` on `path` (relative to the project root) fires this rule.
    pub fn matches(&self, path: &Path, event: WatchEvent) -> bool {
        if !self.events.iter().any(|accepted| accepted.accepts(event)) {
            return false;
        }

        let path = normalize(path);
        self.include
            .iter()
            .any(|p| p.matches_with(&path, MATCH_OPTIONS))
            && !self
                .exclude
                .iter()
                .any(|p| p.matches_with(&path, MATCH_OPTIONS))
    }
}

/// The full rule set of a watcher.
#[derive(Debug, Clone, Default)]
pub struct WatchRules {
    rules: Vec<WatchRule>,
}

impl WatchRules {
    pub fn compile(configs: &[WatchRuleConfig]) -> Result<Self, PipelineError> {
        let rules = configs
            .iter()
            .map(WatchRule::compile)
            .collect::<Result<_, _>>()?;
        Ok(Self { rules })
    }

    /// Task names referenced by any rule.
    pub fn task_names(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().filter_map(|rule| match rule.action() {
            WatchAction::Task(name) => Some(name.as_str()),
            WatchAction::Reload => None,
        })
    }

    /// Actions of every rule fired by `event` on `path`, in rule order.
    pub fn actions_for(&self, path: &Path, event: WatchEvent) -> Vec<&WatchAction> {
        self.rules
            .iter()
            .filter(|rule| rule.matches(path, event))
            .map(WatchRule::action)
            .collect()
    }
}

fn normalize(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

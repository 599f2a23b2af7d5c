use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result};

impl PipelineConfig {
    /// Validate configuration for logical consistency.
    pub fn validate(&self) -> Result<()> {
        if self.scripts.files.is_empty() {
            return Err(invalid("scripts.files", "list at least one script to bundle"));
        }

        if self.styles.files.is_empty() {
            return Err(invalid("styles.files", "list at least one stylesheet to bundle"));
        }

        if self.scripts.output.trim().is_empty() {
            return Err(invalid("scripts.output", "bundle file name cannot be empty"));
        }

        if self.styles.output.trim().is_empty() {
            return Err(invalid("styles.output", "bundle file name cannot be empty"));
        }

        for (index, rule) in self.watch.rules.iter().enumerate() {
            if rule.patterns.iter().all(|p| p.starts_with('!')) {
                return Err(invalid(
                    &format!("watch.rules[{}].patterns", index),
                    "a rule needs at least one non-negated pattern",
                ));
            }
            if rule.events.is_empty() {
                return Err(invalid(
                    &format!("watch.rules[{}].events", index),
                    "a rule needs at least one event",
                ));
            }
        }

        Ok(())
    }
}

fn invalid(field: &str, hint: &str) -> PipelineError {
    PipelineError::Config(format!("{}: {}", field, hint))
}

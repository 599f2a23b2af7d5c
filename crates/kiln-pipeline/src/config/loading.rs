use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result};
use figment::{
    providers::{Env, Format as _, Json, Serialized},
    Figment,
};
use std::path::Path;

/// Config file looked up in the project root when no explicit path is given.
pub const CONFIG_FILE_NAME: &str = "kiln.config.json";

impl PipelineConfig {
    /// Load configuration from multiple sources.
    /// Priority: environment variables > config file > defaults
    ///
    /// `config_path` is resolved against `root` when relative. An explicit
    /// path that does not exist is an error; the implicit `kiln.config.json`
    /// is optional.
    pub fn load(root: &Path, config_path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::new().merge(Serialized::defaults(Self::default()));

        let config_file = match config_path {
            Some(path) => {
                let path = if path.is_absolute() {
                    path.to_path_buf()
                } else {
                    root.join(path)
                };
                if !path.is_file() {
                    return Err(PipelineError::Config(format!(
                        "config file not found: {}",
                        path.display()
                    )));
                }
                Some(path)
            }
            None => {
                let default_path = root.join(CONFIG_FILE_NAME);
                default_path.is_file().then_some(default_path)
            }
        };

        if let Some(path) = config_file {
            tracing::debug!("Loading configuration from {}", path.display());
            figment = figment.merge(Json::file(path));
        }

        // KILN_SERVER__PORT=4000 -> server.port, KILN_STYLES__SCSS_DIR -> styles.scssDir
        figment = figment.merge(
            Env::prefixed("KILN_")
                .lowercase(false)
                .map(|key| env_key(key.as_str()).into()),
        );

        let config: Self = figment
            .extract()
            .map_err(|e| PipelineError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}

/// Map an environment variable name (prefix stripped) to a config key path.
///
/// `__` separates nesting levels and each level is converted from
/// SCREAMING_SNAKE_CASE to the camelCase used by the config file.
fn env_key(raw: &str) -> String {
    raw.split("__")
        .map(camel_case)
        .collect::<Vec<_>>()
        .join(".")
}

fn camel_case(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    for (index, word) in segment
        .split('_')
        .filter(|word| !word.is_empty())
        .enumerate()
    {
        let word = word.to_ascii_lowercase();
        if index == 0 {
            out.push_str(&word);
            continue;
        }
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            out.push(first.to_ascii_uppercase());
            out.push_str(chars.as_str());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_key_conversion() {
        assert_eq!(env_key("SRC_DIR"), "srcDir");
        assert_eq!(env_key("STYLES__SCSS_DIR"), "styles.scssDir");
        assert_eq!(env_key("SERVER__PORT"), "server.port");
        assert_eq!(env_key("WATCH__DEBOUNCE_MS"), "watch.debounceMs");
        assert_eq!(env_key("MAPS_DIR"), "mapsDir");
    }
}

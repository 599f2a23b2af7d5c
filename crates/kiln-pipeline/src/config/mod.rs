//! Pipeline configuration with multi-source loading.
//!
//! Merges settings from built-in defaults, `kiln.config.json`, and `KILN_`
//! environment variables. Priority: Environment > File > Defaults.
//!
//! Every path is relative to the project root passed to the runner.

mod defaults;
mod loading;
mod validation;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::net::IpAddr;
use std::path::PathBuf;

pub use defaults::*;
pub use loading::CONFIG_FILE_NAME;

/// Complete pipeline configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct PipelineConfig {
    /// Source tree root (watched in development)
    pub src_dir: PathBuf,

    /// Directory receiving bundle source maps
    pub maps_dir: PathBuf,

    /// Stylesheet compilation and bundling
    pub styles: StylesConfig,

    /// Script bundling
    pub scripts: ScriptsConfig,

    /// Markup placeholder rewriting
    pub markup: MarkupConfig,

    /// Manifest copy
    pub manifest: CopyConfig,

    /// Static asset copy
    pub assets: CopyConfig,

    /// Development server
    pub server: ServerConfig,

    /// File watching
    pub watch: WatchConfig,
}

/// Stylesheet settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct StylesConfig {
    /// Root of the Sass sources
    pub scss_dir: PathBuf,

    /// Where compiled stylesheets are written (also the bundler's input tree)
    pub css_dir: PathBuf,

    /// Stylesheets to bundle, in concatenation order
    pub files: Vec<PathBuf>,

    /// Bundle file name
    pub output: String,

    /// Bundle directory
    pub dest: PathBuf,
}

/// Script settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct ScriptsConfig {
    /// Scripts to bundle, in concatenation order
    pub files: Vec<PathBuf>,

    /// Bundle file name
    pub output: String,

    /// Bundle directory
    pub dest: PathBuf,
}

/// Markup rewriting settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct MarkupConfig {
    /// Markup file containing `build:<name>` blocks
    pub source: PathBuf,

    /// Output directory for the rewritten file
    pub dest: PathBuf,

    /// Block name to replacement tag
    pub replacements: BTreeMap<String, String>,

    /// Keep `build:` blocks that have no replacement instead of removing them
    pub keep_unassigned: bool,
}

/// Source/destination pair for verbatim copies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CopyConfig {
    /// File or directory to copy
    pub source: PathBuf,

    /// Destination directory
    pub dest: PathBuf,
}

/// Development server settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct ServerConfig {
    /// Directory served over HTTP
    pub root: PathBuf,

    /// Interface to bind
    pub host: IpAddr,

    /// Preferred port (the next free port is used when busy)
    pub port: u16,

    /// Open the browser once the server is listening
    pub open: bool,
}

/// Watcher settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct WatchConfig {
    /// Suppress repeated events for the same path within this window (0 = off)
    pub debounce_ms: u64,

    /// Rules evaluated for every file system event
    pub rules: Vec<WatchRuleConfig>,
}

/// A single watch rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct WatchRuleConfig {
    /// Globs relative to the project root; a leading `!` excludes
    pub patterns: Vec<String>,

    /// Events the rule reacts to
    pub events: Vec<WatchEvent>,

    /// What happens when the rule matches
    pub action: WatchAction,
}

/// File system event kinds a rule can select.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WatchEvent {
    Added,
    Changed,
    Deleted,
    All,
}

impl WatchEvent {
    /// Whether this selector accepts `event`.
    pub fn accepts(self, event: WatchEvent) -> bool {
        self == WatchEvent::All || self == event
    }
}

/// Action triggered by a matching watch rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WatchAction {
    /// Run the named task
    Task(String),
    /// Signal connected browsers
    Reload,
}

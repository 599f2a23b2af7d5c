use crate::config::{
    CopyConfig, MarkupConfig, PipelineConfig, ScriptsConfig, ServerConfig, StylesConfig,
    WatchAction, WatchConfig, WatchEvent, WatchRuleConfig,
};
use std::collections::BTreeMap;
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;

/// Scripts in bundle order: libraries, then components, entry file last.
pub const DEFAULT_SCRIPT_FILES: [&str; 14] = [
    "src/js/jquery-3.2.1.js",
    "src/js/jquery-ui.min.js",
    "src/js/tinycolor.js",
    "src/js/helpers.js",
    "src/js/components/clocks.js",
    "src/js/components/greeting.js",
    "src/js/components/newsfeed.js",
    "src/js/components/toolbox.js",
    "src/js/components/colorpicker.js",
    "src/js/components/background.js",
    "src/js/components/stickyNote.js",
    "src/js/components/quickLink.js",
    "src/js/components/settings.js",
    "src/js/main.js",
];

/// Stylesheets in bundle order.
pub const DEFAULT_STYLE_FILES: [&str; 2] = ["src/css/reset.css", "src/css/styles.css"];

pub const DEFAULT_PORT: u16 = 3000;

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            src_dir: PathBuf::from("src"),
            maps_dir: PathBuf::from("dist/maps"),
            styles: StylesConfig::default(),
            scripts: ScriptsConfig::default(),
            markup: MarkupConfig::default(),
            manifest: CopyConfig {
                source: PathBuf::from("src/manifest.json"),
                dest: PathBuf::from("dist"),
            },
            assets: CopyConfig {
                source: PathBuf::from("src/assets"),
                dest: PathBuf::from("dist/assets"),
            },
            server: ServerConfig::default(),
            watch: WatchConfig::default(),
        }
    }
}

impl Default for StylesConfig {
    fn default() -> Self {
        Self {
            scss_dir: PathBuf::from("src/scss"),
            css_dir: PathBuf::from("src/css"),
            files: DEFAULT_STYLE_FILES.iter().map(PathBuf::from).collect(),
            output: "styles.css".to_string(),
            dest: PathBuf::from("dist/css"),
        }
    }
}

impl Default for ScriptsConfig {
    fn default() -> Self {
        Self {
            files: DEFAULT_SCRIPT_FILES.iter().map(PathBuf::from).collect(),
            output: "app.min.js".to_string(),
            dest: PathBuf::from("dist/js"),
        }
    }
}

impl Default for MarkupConfig {
    fn default() -> Self {
        let mut replacements = BTreeMap::new();
        replacements.insert(
            "css".to_string(),
            r#"<link rel="stylesheet" href="css/styles.css">"#.to_string(),
        );
        replacements.insert(
            "js".to_string(),
            r#"<script src="js/app.min.js" defer></script>"#.to_string(),
        );

        Self {
            source: PathBuf::from("src/index.html"),
            dest: PathBuf::from("dist"),
            replacements,
            keep_unassigned: false,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("src"),
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: DEFAULT_PORT,
            open: true,
        }
    }
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 0,
            rules: default_watch_rules(),
        }
    }
}

/// The development watch rules.
///
/// 1. Sass sources recompile on any event.
/// 2. Any file added under the source tree reloads the page.
/// 3. Any change outside the Sass tree reloads the page.
pub fn default_watch_rules() -> Vec<WatchRuleConfig> {
    vec![
        WatchRuleConfig {
            patterns: vec!["src/scss/**/*.scss".to_string()],
            events: vec![WatchEvent::All],
            action: WatchAction::Task("scss".to_string()),
        },
        WatchRuleConfig {
            patterns: vec!["src/**/*".to_string()],
            events: vec![WatchEvent::Added],
            action: WatchAction::Reload,
        },
        WatchRuleConfig {
            patterns: vec![
                "src/**/*".to_string(),
                "!src/scss".to_string(),
                "!src/scss/**/*".to_string(),
            ],
            events: vec![WatchEvent::Changed],
            action: WatchAction::Reload,
        },
    ]
}

//! Browser reload signaling.
//!
//! Tasks announce what they wrote through a [`ReloadSink`]. One-shot builds use
//! [`NoopReload`]; the development server supplies a sink that forwards the
//! signal to every connected browser.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// A reload signal for connected browsers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Reload {
    /// Navigate the page again
    Full,
    /// Swap matching stylesheets in place without navigation
    Inject {
        /// File names of the changed stylesheets
        files: Vec<String>,
    },
}

impl Reload {
    /// Classify a set of written or changed paths.
    ///
    /// Stylesheet-only changes are injected; anything else, including an empty
    /// set, needs a full reload.
    pub fn for_paths<P: AsRef<Path>>(paths: &[P]) -> Self {
        let all_css = !paths.is_empty()
            && paths.iter().all(|p| {
                p.as_ref()
                    .extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("css"))
            });

        if !all_css {
            return Reload::Full;
        }

        let files = paths
            .iter()
            .filter_map(|p| p.as_ref().file_name())
            .map(|name| name.to_string_lossy().into_owned())
            .collect();
        Reload::Inject { files }
    }
}

/// Receiver of reload signals.
pub trait ReloadSink: Send + Sync {
    /// Deliver `reload` to whoever is listening. Must not block.
    fn reload(&self, reload: Reload);
}

/// Sink that drops every signal.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopReload;

impl ReloadSink for NoopReload {
    fn reload(&self, reload: Reload) {
        tracing::trace!(?reload, "no reload listeners");
    }
}

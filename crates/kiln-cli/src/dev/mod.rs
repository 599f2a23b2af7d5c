//! Development mode: the live-reload server and the file watcher.
//!
//! - Serves the source tree with the reload client injected into pages
//! - Pushes reload events over Server-Sent Events
//! - Maps file changes to tasks or reloads through watch rules

pub mod rules;
pub mod server;
pub mod state;
pub mod watcher;

// Re-exports
pub use rules::{WatchRule, WatchRules};
pub use server::{bind_listener, open_browser, server_url, DevServer};
pub use state::{DevServerState, SharedState};
pub use watcher::{FileChange, FileWatcher};

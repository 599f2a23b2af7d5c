//! File system watcher for development mode.
//!
//! Watches the source tree recursively and reports changes as paths relative
//! to the project root, which is what watch rule patterns are written against.

use crate::error::{CliError, Result};
use kiln_pipeline::WatchEvent;
use notify::event::{ModifyKind, RenameMode};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

/// A single file change, relative to the project root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChange {
    event: WatchEvent,
    path: PathBuf,
}

impl FileChange {
    pub fn new(event: WatchEvent, path: impl Into<PathBuf>) -> Self {
        Self {
            event,
            path: path.into(),
        }
    }

    /// Kind of change: added, changed or deleted.
    pub fn event(&self) -> WatchEvent {
        self.event
    }

    /// Get the path affected by this change.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Recursive watcher over one directory.
pub struct FileWatcher {
    /// Underlying notify watcher
    _watcher: RecommendedWatcher,
    /// Directory being watched
    watch_dir: PathBuf,
}

impl FileWatcher {
    /// Watch `watch_dir` and report changes relative to `root`.
    ///
    /// Both paths are canonicalized so the absolute paths notify reports can
    /// be stripped of the root prefix. With a non-zero `debounce_ms`, repeated
    /// events for the same path inside the window are dropped.
    ///
    /// # Errors
    ///
    /// Returns error if either directory doesn't exist or the watcher cannot
    /// be created
    pub fn new(
        root: &Path,
        watch_dir: &Path,
        debounce_ms: u64,
    ) -> Result<(Self, mpsc::Receiver<FileChange>)> {
        let root = root
            .canonicalize()
            .map_err(|_| CliError::FileNotFound(root.to_path_buf()))?;
        let watch_dir = watch_dir
            .canonicalize()
            .map_err(|_| CliError::FileNotFound(watch_dir.to_path_buf()))?;

        let (tx, rx) = mpsc::channel(100);

        let debounce = Duration::from_millis(debounce_ms);
        let mut last_event: Option<(PathBuf, Instant)> = None;
        let root_clone = root.clone();

        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            let event = match res {
                Ok(event) => event,
                Err(e) => {
                    tracing::warn!("Watch error: {}", e);
                    return;
                }
            };

            let Some(kind) = classify(&event.kind) else {
                return;
            };

            for path in &event.paths {
                let Some(relative) = relative_to(path, &root_clone) else {
                    continue;
                };

                if !debounce.is_zero() {
                    let now = Instant::now();
                    if let Some((last_path, last_time)) = &last_event {
                        if last_path == path && now.duration_since(*last_time) < debounce {
                            continue;
                        }
                    }
                    last_event = Some((path.clone(), now));
                }

                if tx.blocking_send(FileChange::new(kind, relative)).is_err() {
                    return;
                }
            }
        })?;

        watcher.watch(&watch_dir, RecursiveMode::Recursive)?;

        Ok((
            Self {
                _watcher: watcher,
                watch_dir,
            },
            rx,
        ))
    }

    /// Get the directory being watched.
    pub fn watch_dir(&self) -> &Path {
        &self.watch_dir
    }
}

/// Map a notify event kind onto the rule event kinds.
///
/// Metadata-only modifications (permissions, timestamps) are not changes.
fn classify(kind: &EventKind) -> Option<WatchEvent> {
    match kind {
        EventKind::Create(_) => Some(WatchEvent::Added),
        EventKind::Remove(_) => Some(WatchEvent::Deleted),
        EventKind::Modify(ModifyKind::Metadata(_)) => None,
        EventKind::Modify(ModifyKind::Name(RenameMode::From)) => Some(WatchEvent::Deleted),
        EventKind::Modify(ModifyKind::Name(RenameMode::To)) => Some(WatchEvent::Added),
        EventKind::Modify(_) => Some(WatchEvent::Changed),
        _ => None,
    }
}

/// Path relative to `root`, or `None` for paths outside it.
fn relative_to(path: &Path, root: &Path) -> Option<PathBuf> {
    path.strip_prefix(root).ok().map(Path::to_path_buf)
}

//! The [`Task`] abstraction and the context tasks run against.

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::reload::{NoopReload, Reload, ReloadSink};
use crate::runner::Runner;
use async_trait::async_trait;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A named unit of build work.
///
/// A task starts only after every task named by [`Task::prerequisites`] has
/// completed within the same run.
#[async_trait]
pub trait Task: Send + Sync {
    /// Unique task name used on the command line and in prerequisite lists.
    fn name(&self) -> &str;

    /// Tasks that must complete before this one starts.
    fn prerequisites(&self) -> &[&'static str] {
        &[]
    }

    /// One-line summary for task listings.
    fn description(&self) -> &str {
        ""
    }

    /// Execute the task.
    ///
    /// The runner gives access to the shared [`TaskContext`] and lets
    /// long-running tasks (such as the watcher) start further runs.
    async fn run(&self, runner: &Runner) -> Result<()>;
}

impl fmt::Debug for dyn Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("name", &self.name())
            .field("prerequisites", &self.prerequisites())
            .finish()
    }
}

/// A task with no body of its own; it only groups prerequisites.
#[derive(Debug, Clone)]
pub struct Aggregate {
    name: &'static str,
    description: &'static str,
    prerequisites: Vec<&'static str>,
}

impl Aggregate {
    pub fn new(
        name: &'static str,
        description: &'static str,
        prerequisites: impl IntoIterator<Item = &'static str>,
    ) -> Self {
        Self {
            name,
            description,
            prerequisites: prerequisites.into_iter().collect(),
        }
    }
}

#[async_trait]
impl Task for Aggregate {
    fn name(&self) -> &str {
        self.name
    }

    fn prerequisites(&self) -> &[&'static str] {
        &self.prerequisites
    }

    fn description(&self) -> &str {
        self.description
    }

    async fn run(&self, _runner: &Runner) -> Result<()> {
        Ok(())
    }
}

/// Explicit state shared by every task of a run.
///
/// Holds the project root, the loaded configuration and the reload sink. It
/// replaces any process-wide state: whoever creates the runner decides which
/// sink tasks signal.
pub struct TaskContext {
    root: PathBuf,
    config: PipelineConfig,
    reload: Arc<dyn ReloadSink>,
}

impl TaskContext {
    /// Create a context whose reload signals go nowhere.
    pub fn new(root: impl Into<PathBuf>, config: PipelineConfig) -> Self {
        Self {
            root: root.into(),
            config,
            reload: Arc::new(NoopReload),
        }
    }

    /// Route reload signals to `sink`.
    pub fn with_reload(mut self, sink: Arc<dyn ReloadSink>) -> Self {
        self.reload = sink;
        self
    }

    /// Project root all configured paths are relative to.
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Resolve a configured path against the project root.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    /// Send a reload signal.
    pub fn reload(&self, reload: Reload) {
        self.reload.reload(reload);
    }
}

impl fmt::Debug for TaskContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskContext")
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

//! Error types for the kiln pipeline.
//!
//! Every task surfaces failures through [`PipelineError`]. There is no retry
//! logic anywhere in the pipeline: an error ends the task that produced it and
//! the [`Runner`](crate::Runner) decides, based on its error policy, whether the
//! rest of the run continues.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors produced while loading configuration, planning, or running tasks.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Invalid configuration value or unreadable configuration source.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// I/O failure on a specific path.
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        /// Path being read or written
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A declared input file does not exist.
    #[error("Input file not found: {}", .0.display())]
    MissingInput(PathBuf),

    /// Sass compilation failed.
    #[error("Sass error in {}: {message}", .file.display())]
    Sass {
        /// Source file that failed to compile
        file: PathBuf,
        /// Compiler message
        message: String,
    },

    /// Stylesheet parsing or minification failed.
    #[error("CSS error in {}: {message}", .file.display())]
    Css {
        /// Stylesheet that failed
        file: PathBuf,
        /// Parser or printer message
        message: String,
    },

    /// Script parsing or minification failed.
    #[error("Script error in {}: {message}", .file.display())]
    Script {
        /// Script that failed
        file: PathBuf,
        /// Parser message
        message: String,
    },

    /// A task name was requested that is not registered.
    #[error("Task '{name}' is not defined (available: {available})")]
    UnknownTask {
        /// Requested task name
        name: String,
        /// Comma-separated registered task names
        available: String,
    },

    /// A task lists a prerequisite that is not registered.
    #[error("Task '{task}' depends on unknown task '{prerequisite}'")]
    UnknownPrerequisite {
        /// Task declaring the prerequisite
        task: String,
        /// Missing prerequisite name
        prerequisite: String,
    },

    /// Two tasks were registered under the same name.
    #[error("Task '{0}' is registered more than once")]
    DuplicateTask(String),

    /// The prerequisite graph contains a cycle.
    #[error("Task graph contains a cycle through '{0}'")]
    Cycle(String),

    /// A task failed during a strict run.
    #[error("Task '{task}' failed: {source}")]
    TaskFailed {
        /// Name of the failing task
        task: String,
        /// The task's error
        #[source]
        source: Box<PipelineError>,
    },

    /// A spawned task panicked or was cancelled.
    #[error("Task execution aborted: {0}")]
    Join(String),

    /// Long-running service failure (server bind, watcher setup).
    #[error("{0}")]
    Service(String),
}

impl PipelineError {
    /// Build an [`PipelineError::Io`] for `path`.
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

/// Result type alias for pipeline operations.
pub type Result<T, E = PipelineError> = std::result::Result<T, E>;

/// Extension trait attaching a path to raw I/O results.
pub trait IoResultExt<T> {
    /// Convert an I/O error into [`PipelineError`], reporting a missing file as
    /// [`PipelineError::MissingInput`].
    fn with_path(self, path: impl AsRef<Path>) -> Result<T>;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
    fn with_path(self, path: impl AsRef<Path>) -> Result<T> {
        self.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                PipelineError::MissingInput(path.as_ref().to_path_buf())
            } else {
                PipelineError::io(path, e)
            }
        })
    }
}

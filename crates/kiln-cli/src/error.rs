//! Error handling for the kiln CLI.
//!
//! [`CliError`] wraps pipeline failures together with the failures only the
//! CLI can hit (argument handling, the dev server socket, the file watcher).
//! `main` turns it into a [`miette::Report`] via [`cli_error_to_miette`], so
//! every error exits non-zero with a readable message.
//!
//! # Example
//!
//! ```rust,no_run
//! use kiln_cli::error::{Result, ResultExt};
//! use std::path::Path;
//!
//! fn project_root(dir: &Path) -> Result<std::path::PathBuf> {
//!     dir.canonicalize().with_path(dir)
//! }
//! ```

mod report;

use kiln_pipeline::PipelineError;
use std::path::PathBuf;
use thiserror::Error;

pub use report::cli_error_to_miette;

/// Top-level CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration, planning or task failures from the pipeline
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    /// File or directory not found
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// I/O errors from file system operations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Development server errors
    #[error("Server error: {0}")]
    Server(String),

    /// File watching errors
    #[error("File watcher error: {0}")]
    Watch(#[from] notify::Error),

    /// Generic errors with custom messages
    #[error("{0}")]
    Custom(String),
}

/// Result type alias using `CliError` as the default error type.
pub type Result<T, E = CliError> = std::result::Result<T, E>;

/// Lets the dev tasks, which run inside the pipeline runner, report CLI
/// failures as pipeline failures.
impl From<CliError> for PipelineError {
    fn from(err: CliError) -> Self {
        match err {
            CliError::Pipeline(inner) => inner,
            other => PipelineError::Service(other.to_string()),
        }
    }
}

/// Extension trait for adding context to `Result` types.
pub trait ResultExt<T> {
    /// Report a missing file as [`CliError::FileNotFound`] for `path`.
    fn with_path(self, path: impl AsRef<std::path::Path>) -> Result<T>;

    /// Prefix the error with `msg`.
    fn context(self, msg: impl std::fmt::Display) -> Result<T>;
}

impl<T, E: Into<CliError>> ResultExt<T> for std::result::Result<T, E> {
    fn with_path(self, path: impl AsRef<std::path::Path>) -> Result<T> {
        self.map_err(|e| match e.into() {
            CliError::Io(io_err) if io_err.kind() == std::io::ErrorKind::NotFound => {
                CliError::FileNotFound(path.as_ref().to_path_buf())
            }
            other => other,
        })
    }

    fn context(self, msg: impl std::fmt::Display) -> Result<T> {
        self.map_err(|e| {
            let err: CliError = e.into();
            CliError::Custom(format!("{}: {}", msg, err))
        })
    }
}

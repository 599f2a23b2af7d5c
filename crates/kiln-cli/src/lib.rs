//! Kiln CLI - front-end asset pipeline with a live-reload dev server.
//!
//! This crate puts a terminal in front of `kiln-pipeline`: it parses the
//! command line, sets up logging, and adds the development tasks that only
//! make sense with a process that stays alive.
//!
//! # Architecture
//!
//! - [`cli`] - clap definition of `kiln [TASK]`
//! - [`commands`] - the run/list flow behind the binary
//! - [`dev`] - dev server, reload state, file watcher and watch rules
//! - [`tasks`] - the `serve`, `watch` and `default` tasks
//! - [`error`] - CLI error type and miette reporting
//! - [`logger`] - tracing subscriber setup
//! - [`ui`] - colored status messages and formatting
//!
//! # Example
//!
//! ```rust,no_run
//! use kiln_cli::{error::Result, logger};
//!
//! fn main() -> Result<()> {
//!     logger::init_logger(false, false, false);
//!     // Task registration and the run itself...
//!     Ok(())
//! }
//! ```

// Public modules
pub mod cli;
pub mod commands;
pub mod dev;
pub mod error;
pub mod logger;
pub mod tasks;
pub mod ui;

// Re-export commonly used types
pub use error::{CliError, Result, ResultExt};

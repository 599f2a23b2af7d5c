//! Command-line interface definition for kiln.
//!
//! kiln takes a single optional task name, like a classic task runner:
//!
//! - `kiln` runs `default` (dev server + watcher)
//! - `kiln build` runs the one-shot production build
//! - `kiln css` runs one task and its prerequisites
//! - `kiln --tasks` lists every task


use clap::Parser;
use std::path::PathBuf;

/// Task run when no name is given.
pub const DEFAULT_TASK: &str = "default";

/// kiln - front-end asset pipeline with a live-reload dev server
#[derive(Parser, Debug)]
#[command(
    name = "kiln",
    version,
    about = "Front-end asset pipeline with a live-reload dev server",
    long_about = "kiln compiles Sass, bundles and minifies stylesheets and scripts,\n\
                  rewrites markup references, copies static assets, and serves the\n\
                  source tree with live reload while you work."
)]
pub struct Cli {
    /// Task to run (see --tasks)
    #[arg(value_name = "TASK", default_value = DEFAULT_TASK)]
    pub task: String,

    /// Path to the config file
    ///
    /// Relative paths resolve against --cwd. Defaults to kiln.config.json in
    /// the project root when present.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Project root all configured paths are relative to
    #[arg(long, value_name = "DIR")]
    pub cwd: Option<PathBuf>,

    /// List available tasks and exit
    #[arg(long)]
    pub tasks: bool,

    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

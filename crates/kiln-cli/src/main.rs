//! kiln - front-end asset pipeline with a live-reload dev server.
//!
//! Parses the command line, initializes logging and colors, and runs the
//! requested task.

use clap::Parser;
use kiln_cli::{cli, commands, error, logger, ui};
use miette::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();

    logger::init_logger(args.verbose, args.quiet, args.no_color);
    ui::init_colors(args.no_color);

    // Convert CLI errors to miette diagnostics for readable error reporting
    commands::execute(args).await.map_err(error::cli_error_to_miette)
}

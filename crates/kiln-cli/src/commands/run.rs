//! The single kiln command: run a task, or list tasks.

use crate::cli::Cli;
use crate::dev::DevServerState;
use crate::error::{CliError, Result, ResultExt};
use crate::tasks::register_dev_tasks;
use crate::ui::{self, TaskListEntry};
use kiln_pipeline::{
    register_pipeline_tasks, ErrorPolicy, PipelineConfig, Runner, TaskContext, TaskGraph,
    TaskGraphBuilder,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::signal;

/// Execute the command line.
///
/// # Process Flow
///
/// 1. Resolve the project root and load configuration
/// 2. Register the pipeline and development tasks
/// 3. With `--tasks`, print the task list and stop
/// 4. Otherwise run the requested task strictly until it finishes or Ctrl+C
///
/// # Errors
///
/// Returns errors for:
/// - A missing project root or invalid configuration
/// - Unknown task names
/// - The first task failure of the run
pub async fn execute(args: Cli) -> Result<()> {
    let root = resolve_root(args.cwd.as_deref())?;
    let config = PipelineConfig::load(&root, args.config.as_deref())?;

    let state = Arc::new(DevServerState::new());
    let mut builder = TaskGraphBuilder::new();
    register_pipeline_tasks(&mut builder);
    register_dev_tasks(&mut builder, state.clone());
    let graph = builder.build()?;

    if args.tasks {
        print!("{}", ui::format_task_list(&task_list(&graph)));
        return Ok(());
    }

    let context = TaskContext::new(root, config).with_reload(state);
    let runner = Runner::new(graph, context);

    let start = Instant::now();
    tokio::select! {
        result = runner.run(&args.task, ErrorPolicy::Strict) => {
            result?;
            if !args.quiet {
                ui::success(&format!(
                    "Finished '{}' after {}",
                    args.task,
                    ui::format_duration(start.elapsed())
                ));
            }
        }
        signal = signal::ctrl_c() => {
            signal.context("Failed to listen for Ctrl+C")?;
            ui::info("Shutting down...");
        }
    }

    Ok(())
}

/// Canonical project root: `--cwd` or the current directory.
fn resolve_root(cwd: Option<&Path>) -> Result<PathBuf> {
    let dir = match cwd {
        Some(dir) => dir.to_path_buf(),
        None => std::env::current_dir()?,
    };

    if !dir.is_dir() {
        return Err(CliError::FileNotFound(dir));
    }
    dir.canonicalize().with_path(&dir)
}

/// Rows of `kiln --tasks`, sorted by name.
fn task_list(graph: &TaskGraph) -> Vec<TaskListEntry> {
    let mut entries: Vec<TaskListEntry> = graph
        .tasks()
        .map(|task| TaskListEntry {
            name: task.name().to_string(),
            description: task.description().to_string(),
            prerequisites: task.prerequisites().iter().map(|p| p.to_string()).collect(),
        })
        .collect();
    entries.sort_by(|a, b| a.name.cmp(&b.name));
    entries
}

//! Kiln pipeline - task graph, runner and asset transforms.
//!
//! This crate holds everything a build needs without a terminal attached:
//!
//! - [`config`] - layered configuration (defaults, `kiln.config.json`, `KILN_*`)
//! - [`graph`] - named tasks with prerequisite edges, validated as a DAG
//! - [`runner`] - event-driven execution of a task and its prerequisites
//! - [`reload`] - the seam tasks use to ask connected browsers to refresh
//! - [`transforms`] - Sass, stylesheet, script, markup and file transforms
//! - [`tasks`] - the file tasks built on those transforms, plus `build`
//!
//! # Example
//!
//! ```no_run
//! use kiln_pipeline::{
//!     register_pipeline_tasks, ErrorPolicy, PipelineConfig, Runner, TaskContext,
//!     TaskGraphBuilder,
//! };
//! use std::path::Path;
//!
//! # async fn example() -> kiln_pipeline::Result<()> {
//! let root = Path::new(".");
//! let config = PipelineConfig::load(root, None)?;
//!
//! let mut builder = TaskGraphBuilder::new();
//! register_pipeline_tasks(&mut builder);
//!
//! let runner = Runner::new(builder.build()?, TaskContext::new(root, config));
//! runner.run("build", ErrorPolicy::Strict).await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod graph;
pub mod reload;
pub mod runner;
pub mod task;
pub mod tasks;
pub mod transforms;

pub use config::{PipelineConfig, WatchAction, WatchEvent, WatchRuleConfig};
pub use error::{PipelineError, Result};
pub use graph::{Plan, TaskGraph, TaskGraphBuilder};
pub use reload::{NoopReload, Reload, ReloadSink};
pub use runner::{ErrorPolicy, RunReport, Runner, TaskFailure};
pub use task::{Aggregate, Task, TaskContext};
pub use tasks::register_pipeline_tasks;

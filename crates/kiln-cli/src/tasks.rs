//! The development tasks: `serve`, `watch` and the `default` aggregate.
//!
//! Both tasks run until the process is interrupted.

use crate::dev::{
    bind_listener, open_browser, server_url, DevServer, FileWatcher, SharedState, WatchRules,
};
use crate::error::CliError;
use crate::ui;
use async_trait::async_trait;
use kiln_pipeline::{
    Aggregate, ErrorPolicy, PipelineError, Reload, Result, Runner, Task, TaskGraphBuilder,
    WatchAction,
};

/// Register `serve`, `watch` and `default` on `builder`.
///
/// `state` receives the reload signals of every run; the same state must be
/// the run context's reload sink.
pub fn register_dev_tasks(
    builder: &mut TaskGraphBuilder,
    state: SharedState,
) -> &mut TaskGraphBuilder {
    builder
        .register(ServeTask::new(state))
        .register(WatchTask)
        .register(Aggregate::new(
            "default",
            "Serve the source tree and watch it for changes",
            ["serve", "watch"],
        ))
}

/// Serves the source tree with live reload.
pub struct ServeTask {
    state: SharedState,
}

impl ServeTask {
    pub fn new(state: SharedState) -> Self {
        Self { state }
    }
}

#[async_trait]
impl Task for ServeTask {
    fn name(&self) -> &str {
        "serve"
    }

    fn description(&self) -> &str {
        "Serve the source tree with live reload"
    }

    async fn run(&self, runner: &Runner) -> Result<()> {
        let ctx = runner.context();
        let server = &ctx.config().server;
        let root = ctx.resolve(&server.root);

        if !root.is_dir() {
            return Err(CliError::FileNotFound(root).into());
        }

        let listener = bind_listener(server.host, server.port).await?;
        let addr = listener
            .local_addr()
            .map_err(|e| CliError::Server(format!("Failed to read bound address: {}", e)))?;
        let url = server_url(addr);

        ui::success(&format!("Serving {} at {}", root.display(), url));
        if server.open {
            open_browser(&url);
        }

        DevServer::new(root, self.state.clone()).serve(listener).await?;
        Ok(())
    }
}

/// Watches the source tree and applies the watch rules.
pub struct WatchTask;

#[async_trait]
impl Task for WatchTask {
    fn name(&self) -> &str {
        "watch"
    }

    fn description(&self) -> &str {
        "Re-run tasks or reload browsers when sources change"
    }

    async fn run(&self, runner: &Runner) -> Result<()> {
        let ctx = runner.context();
        let config = ctx.config();
        let rules = WatchRules::compile(&config.watch.rules)?;

        for name in rules.task_names() {
            if !runner.graph().contains(name) {
                let mut available: Vec<&str> =
                    runner.graph().tasks().map(|t| t.name()).collect();
                available.sort_unstable();
                return Err(PipelineError::UnknownTask {
                    name: name.to_string(),
                    available: available.join(", "),
                });
            }
        }

        let src_dir = ctx.resolve(&config.src_dir);
        let (watcher, mut changes) =
            FileWatcher::new(ctx.root(), &src_dir, config.watch.debounce_ms)?;
        ui::info(&format!("Watching {} for changes", watcher.watch_dir().display()));

        while let Some(change) = changes.recv().await {
            tracing::debug!("{:?} {}", change.event(), change.path().display());

            for action in rules.actions_for(change.path(), change.event()) {
                match action {
                    WatchAction::Task(name) => {
                        let runner = runner.clone();
                        let name = name.clone();
                        tokio::spawn(async move {
                            if let Err(e) = runner.run(&name, ErrorPolicy::Guarded).await {
                                tracing::error!("Watch run of '{}' failed: {}", name, e);
                            }
                        });
                    }
                    WatchAction::Reload => ctx.reload(Reload::for_paths(&[change.path()])),
                }
            }
        }

        Ok(())
    }
}

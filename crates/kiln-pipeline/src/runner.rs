//! Event-driven task scheduling.
//!
//! The runner walks a [`Plan`](crate::graph::Plan): every task whose
//! prerequisites have completed is spawned immediately, so independent tasks
//! overlap while dependents wait only for their own prerequisites.

use crate::error::{PipelineError, Result};
use crate::graph::TaskGraph;
use crate::task::{Task, TaskContext};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::{JoinHandle, JoinSet};

/// What a run does when a task fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorPolicy {
    /// Abort the run and return the first failure.
    Strict,
    /// Log the failure, record it in the report and keep going.
    Guarded,
}

/// A task failure recorded by a guarded run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskFailure {
    pub task: String,
    pub error: String,
}

/// Outcome of a run, in completion order.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub completed: Vec<String>,
    pub failed: Vec<TaskFailure>,
}

impl RunReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Runs tasks from a [`TaskGraph`] against a shared [`TaskContext`].
///
/// Cheap to clone; clones share the graph and context.
#[derive(Clone)]
pub struct Runner {
    graph: Arc<TaskGraph>,
    context: Arc<TaskContext>,
}

type Outcome = (String, Duration, Result<()>);

impl Runner {
    pub fn new(graph: TaskGraph, context: TaskContext) -> Self {
        Self {
            graph: Arc::new(graph),
            context: Arc::new(context),
        }
    }

    pub fn graph(&self) -> &TaskGraph {
        &self.graph
    }

    pub fn context(&self) -> &TaskContext {
        &self.context
    }

    /// Run `target` and its prerequisites.
    ///
    /// # Errors
    ///
    /// - [`PipelineError::UnknownTask`] if `target` is not registered
    /// - [`PipelineError::TaskFailed`] for the first failure under
    ///   [`ErrorPolicy::Strict`]; tasks still running are aborted
    pub async fn run(&self, target: &str, policy: ErrorPolicy) -> Result<RunReport> {
        let steps = self.graph.plan(target)?.into_steps();

        let mut order = Vec::with_capacity(steps.len());
        let mut tasks: HashMap<String, Arc<dyn Task>> = HashMap::new();
        let mut remaining: HashMap<String, usize> = HashMap::new();
        let mut dependents: HashMap<String, Vec<String>> = HashMap::new();

        for step in steps {
            let name = step.task.name().to_string();
            for prerequisite in &step.prerequisites {
                dependents
                    .entry(prerequisite.clone())
                    .or_default()
                    .push(name.clone());
            }
            remaining.insert(name.clone(), step.prerequisites.len());
            tasks.insert(name.clone(), step.task);
            order.push(name);
        }

        let mut set: JoinSet<Outcome> = JoinSet::new();
        for name in order.iter().filter(|name| remaining[*name] == 0) {
            self.spawn(&mut set, Arc::clone(&tasks[name]));
        }

        let mut report = RunReport::default();
        while let Some(joined) = set.join_next().await {
            let (name, elapsed, result) = joined.map_err(|e| PipelineError::Join(e.to_string()))?;

            match result {
                Ok(()) => {
                    tracing::info!("Finished '{}' after {} ms", name, elapsed.as_millis());
                    report.completed.push(name.clone());
                }
                Err(error) => match policy {
                    ErrorPolicy::Strict => {
                        tracing::error!("'{}' errored after {} ms", name, elapsed.as_millis());
                        set.abort_all();
                        return Err(PipelineError::TaskFailed {
                            task: name,
                            source: Box::new(error),
                        });
                    }
                    ErrorPolicy::Guarded => {
                        tracing::error!("'{}' errored after {} ms: {}", name, elapsed.as_millis(), error);
                        report.failed.push(TaskFailure {
                            task: name.clone(),
                            error: error.to_string(),
                        });
                    }
                },
            }

            if let Some(children) = dependents.get(&name) {
                for child in children {
                    let Some(count) = remaining.get_mut(child) else {
                        continue;
                    };
                    *count -= 1;
                    if *count == 0 {
                        self.spawn(&mut set, Arc::clone(&tasks[child]));
                    }
                }
            }
        }

        Ok(report)
    }

    fn spawn(&self, set: &mut JoinSet<Outcome>, task: Arc<dyn Task>) {
        let runner = self.clone();
        let name = task.name().to_string();

        set.spawn(async move {
            tracing::info!("Starting '{}'...", name);
            let started = Instant::now();

            // Run in a separate task so a panic is reported against this task's name.
            let mut handle = AbortOnDrop(tokio::spawn(async move { task.run(&runner).await }));
            let result = match (&mut handle.0).await {
                Ok(result) => result,
                Err(e) => Err(PipelineError::Join(e.to_string())),
            };

            (name, started.elapsed(), result)
        });
    }
}

/// Aborts the wrapped task when dropped, so cancelling a run stops its tasks.
struct AbortOnDrop<T>(JoinHandle<T>);

impl<T> Drop for AbortOnDrop<T> {
    fn drop(&mut self) {
        self.0.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PipelineConfig;
    use crate::graph::TaskGraphBuilder;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Clone, Default)]
    struct Log(Arc<Mutex<Vec<String>>>);

    impl Log {
        fn push(&self, entry: impl Into<String>) {
            self.0.lock().unwrap().push(entry.into());
        }

        fn entries(&self) -> Vec<String> {
            self.0.lock().unwrap().clone()
        }
    }

    struct Step {
        name: &'static str,
        prerequisites: Vec<&'static str>,
        delay_ms: u64,
        fail: bool,
        log: Log,
    }

    impl Step {
        fn new(name: &'static str, prerequisites: Vec<&'static str>, log: &Log) -> Self {
            Self {
                name,
                prerequisites,
                delay_ms: 0,
                fail: false,
                log: log.clone(),
            }
        }

        fn delay(mut self, ms: u64) -> Self {
            self.delay_ms = ms;
            self
        }

        fn failing(mut self) -> Self {
            self.fail = true;
            self
        }
    }

    #[async_trait]
    impl Task for Step {
        fn name(&self) -> &str {
            self.name
        }

        fn prerequisites(&self) -> &[&'static str] {
            &self.prerequisites
        }

        async fn run(&self, _runner: &Runner) -> Result<()> {
            self.log.push(format!("start:{}", self.name));
            if self.delay_ms > 0 {
                tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
            }
            if self.fail {
                return Err(PipelineError::Service(format!("{} broke", self.name)));
            }
            self.log.push(format!("end:{}", self.name));
            Ok(())
        }
    }

    fn runner(builder: TaskGraphBuilder) -> Runner {
        let graph = builder.build().expect("valid graph");
        Runner::new(graph, TaskContext::new(".", PipelineConfig::default()))
    }

    fn index_of(entries: &[String], entry: &str) -> usize {
        entries
            .iter()
            .position(|e| e == entry)
            .unwrap_or_else(|| panic!("missing {entry} in {entries:?}"))
    }

    #[tokio::test]
    async fn test_prerequisites_complete_before_dependents_start() {
        let log = Log::default();
        let mut builder = TaskGraphBuilder::new();
        builder
            .register(Step::new("scss", vec![], &log).delay(30))
            .register(Step::new("css", vec!["scss"], &log))
            .register(Step::new("js", vec![], &log))
            .register(Step::new("build", vec!["css", "js"], &log));

        let report = runner(builder).run("build", ErrorPolicy::Strict).await.unwrap();
        assert!(report.is_success());
        assert_eq!(report.completed.len(), 4);
        assert_eq!(report.completed.last().map(String::as_str), Some("build"));

        let entries = log.entries();
        assert!(index_of(&entries, "end:scss") < index_of(&entries, "start:css"));
        assert!(index_of(&entries, "end:css") < index_of(&entries, "start:build"));
        assert!(index_of(&entries, "end:js") < index_of(&entries, "start:build"));
    }

    #[tokio::test]
    async fn test_independent_tasks_overlap() {
        let log = Log::default();
        let mut builder = TaskGraphBuilder::new();
        builder
            .register(Step::new("slow", vec![], &log).delay(50))
            .register(Step::new("fast", vec![], &log))
            .register(Step::new("all", vec!["slow", "fast"], &log));

        runner(builder).run("all", ErrorPolicy::Strict).await.unwrap();

        let entries = log.entries();
        assert!(index_of(&entries, "end:fast") < index_of(&entries, "end:slow"));
    }

    #[tokio::test]
    async fn test_each_task_runs_once() {
        let log = Log::default();
        let mut builder = TaskGraphBuilder::new();
        builder
            .register(Step::new("base", vec![], &log))
            .register(Step::new("left", vec!["base"], &log))
            .register(Step::new("right", vec!["base"], &log))
            .register(Step::new("top", vec!["left", "right"], &log));

        runner(builder).run("top", ErrorPolicy::Strict).await.unwrap();

        let starts = log.entries().iter().filter(|e| *e == "start:base").count();
        assert_eq!(starts, 1);
    }

    #[tokio::test]
    async fn test_strict_failure_aborts_run() {
        let log = Log::default();
        let mut builder = TaskGraphBuilder::new();
        builder
            .register(Step::new("js", vec![], &log).failing())
            .register(Step::new("html", vec![], &log).delay(200))
            .register(Step::new("build", vec!["js", "html"], &log));

        let err = runner(builder).run("build", ErrorPolicy::Strict).await.unwrap_err();
        assert!(matches!(err, PipelineError::TaskFailed { ref task, .. } if task == "js"));

        let entries = log.entries();
        assert!(!entries.contains(&"start:build".to_string()));
        assert!(!entries.contains(&"end:html".to_string()));
    }

    #[tokio::test]
    async fn test_guarded_failure_is_reported_and_run_continues() {
        let log = Log::default();
        let mut builder = TaskGraphBuilder::new();
        builder
            .register(Step::new("scss", vec![], &log).failing())
            .register(Step::new("css", vec!["scss"], &log));

        let report = runner(builder).run("css", ErrorPolicy::Guarded).await.unwrap();
        assert!(!report.is_success());
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].task, "scss");
        assert!(report.failed[0].error.contains("scss broke"));
        assert_eq!(report.completed, vec!["css".to_string()]);
    }

    #[tokio::test]
    async fn test_unknown_target_fails_before_running() {
        let log = Log::default();
        let mut builder = TaskGraphBuilder::new();
        builder.register(Step::new("js", vec![], &log));

        let err = runner(builder).run("missing", ErrorPolicy::Guarded).await.unwrap_err();
        assert!(matches!(err, PipelineError::UnknownTask { .. }));
        assert!(log.entries().is_empty());
    }
}

//! Task dependency graph.
//!
//! Tasks and their prerequisite edges form a directed acyclic graph backed by
//! petgraph. The graph is validated once when built (unique names, known
//! prerequisites, no cycles) and then answers execution plans for any target.

use crate::error::{PipelineError, Result};
use crate::task::Task;
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::{Dfs, Reversed};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Collects tasks before validation.
#[derive(Default)]
pub struct TaskGraphBuilder {
    tasks: Vec<Arc<dyn Task>>,
}

impl TaskGraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a task.
    pub fn register(&mut self, task: impl Task + 'static) -> &mut Self {
        self.tasks.push(Arc::new(task));
        self
    }

    /// Register an already shared task.
    pub fn register_shared(&mut self, task: Arc<dyn Task>) -> &mut Self {
        self.tasks.push(task);
        self
    }

    /// Validate the registered tasks and build the graph.
    ///
    /// # Errors
    ///
    /// - [`PipelineError::DuplicateTask`] when two tasks share a name
    /// - [`PipelineError::UnknownPrerequisite`] when a prerequisite is not registered
    /// - [`PipelineError::Cycle`] when prerequisites form a cycle
    pub fn build(self) -> Result<TaskGraph> {
        let mut graph: DiGraph<Arc<dyn Task>, ()> = DiGraph::new();
        let mut index: HashMap<String, NodeIndex> = HashMap::new();

        for task in self.tasks {
            let name = task.name().to_string();
            if index.contains_key(&name) {
                return Err(PipelineError::DuplicateTask(name));
            }
            let node = graph.add_node(task);
            index.insert(name, node);
        }

        let nodes: Vec<NodeIndex> = graph.node_indices().collect();
        for node in nodes {
            let task = Arc::clone(&graph[node]);
            for prerequisite in task.prerequisites() {
                let from = index.get(*prerequisite).copied().ok_or_else(|| {
                    PipelineError::UnknownPrerequisite {
                        task: task.name().to_string(),
                        prerequisite: prerequisite.to_string(),
                    }
                })?;
                // Edge direction: prerequisite -> dependent
                graph.add_edge(from, node, ());
            }
        }

        let order = toposort(&graph, None)
            .map_err(|cycle| PipelineError::Cycle(graph[cycle.node_id()].name().to_string()))?;

        Ok(TaskGraph {
            graph,
            index,
            order,
        })
    }
}

/// A validated, acyclic task graph.
pub struct TaskGraph {
    graph: DiGraph<Arc<dyn Task>, ()>,
    index: HashMap<String, NodeIndex>,
    /// Topological order of every node, computed once
    order: Vec<NodeIndex>,
}

impl TaskGraph {
    /// Look up a task by name.
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Task>> {
        self.index.get(name).map(|&node| &self.graph[node])
    }

    /// Whether a task with this name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Registered tasks in registration order.
    pub fn tasks(&self) -> impl Iterator<Item = &Arc<dyn Task>> {
        self.graph.node_indices().map(move |node| &self.graph[node])
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Resolve the tasks needed to run `target`.
    ///
    /// The plan contains `target` and all of its transitive prerequisites,
    /// each exactly once, in topological order.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::UnknownTask`] if `target` is not registered.
    pub fn plan(&self, target: &str) -> Result<Plan> {
        let start = self
            .index
            .get(target)
            .copied()
            .ok_or_else(|| PipelineError::UnknownTask {
                name: target.to_string(),
                available: self.available_names(),
            })?;

        let mut needed = HashSet::new();
        let reversed = Reversed(&self.graph);
        let mut dfs = Dfs::new(reversed, start);
        while let Some(node) = dfs.next(reversed) {
            needed.insert(node);
        }

        let steps = self
            .order
            .iter()
            .filter(|node| needed.contains(*node))
            .map(|&node| {
                let task = Arc::clone(&self.graph[node]);
                let prerequisites = task.prerequisites().iter().map(|p| p.to_string()).collect();
                PlanStep {
                    task,
                    prerequisites,
                }
            })
            .collect();

        Ok(Plan {
            target: target.to_string(),
            steps,
        })
    }

    fn available_names(&self) -> String {
        let mut names: Vec<&str> = self.index.keys().map(String::as_str).collect();
        names.sort_unstable();
        names.join(", ")
    }
}

/// Ordered tasks for one run.
pub struct Plan {
    target: String,
    steps: Vec<PlanStep>,
}

/// A task inside a [`Plan`] with the prerequisites it waits for.
pub struct PlanStep {
    pub task: Arc<dyn Task>,
    pub prerequisites: Vec<String>,
}

impl Plan {
    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn steps(&self) -> &[PlanStep] {
        &self.steps
    }

    /// Task names in execution order.
    pub fn names(&self) -> Vec<&str> {
        self.steps.iter().map(|step| step.task.name()).collect()
    }

    pub(crate) fn into_steps(self) -> Vec<PlanStep> {
        self.steps
    }
}

// src/graph/registry.rs

use std::collections::BTreeMap;
use std::sync::Arc;

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;

use crate::errors::{BuildError, Result};
use crate::pipeline::BoxFuture;

/// A leaf unit of work: performs I/O or transforms directly, as opposed to
/// composing other tasks.
pub trait Task: Send + Sync {
    fn run(&self) -> BoxFuture<'_, Result<()>>;
}

/// How a registered name resolves.
pub enum TaskSpec {
    Leaf(LeafSpec),
    /// Ordered composition: each step completes before the next starts.
    Series(Vec<String>),
    /// Unordered composition: siblings start together, all must settle.
    Parallel(Vec<String>),
}

pub struct LeafSpec {
    pub task: Arc<dyn Task>,
    /// Watch leaves arm long-lived watchers instead of running to a real
    /// completion; invocations reaching one never exit on task errors.
    pub watch: bool,
}

impl TaskSpec {
    fn references(&self) -> &[String] {
        match self {
            TaskSpec::Leaf(_) => &[],
            TaskSpec::Series(refs) | TaskSpec::Parallel(refs) => refs,
        }
    }

    pub fn shape(&self) -> &'static str {
        match self {
            TaskSpec::Leaf(spec) if spec.watch => "watch",
            TaskSpec::Leaf(_) => "leaf",
            TaskSpec::Series(_) => "series",
            TaskSpec::Parallel(_) => "parallel",
        }
    }
}

/// The process-wide mapping from task name to task descriptor.
///
/// Built once at startup from the configuration, validated, and then handed
/// by reference into the executor; never mutated during execution.
#[derive(Default)]
pub struct TaskRegistry {
    tasks: BTreeMap<String, TaskSpec>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a one-shot leaf task.
    pub fn leaf(&mut self, name: impl Into<String>, task: impl Task + 'static) {
        self.tasks.insert(
            name.into(),
            TaskSpec::Leaf(LeafSpec {
                task: Arc::new(task),
                watch: false,
            }),
        );
    }

    /// Register a watcher-arming leaf task.
    pub fn watch_leaf(&mut self, name: impl Into<String>, task: impl Task + 'static) {
        self.tasks.insert(
            name.into(),
            TaskSpec::Leaf(LeafSpec {
                task: Arc::new(task),
                watch: true,
            }),
        );
    }

    /// Register an ordered composition of already-named tasks.
    pub fn series(&mut self, name: impl Into<String>, refs: &[&str]) {
        self.tasks.insert(
            name.into(),
            TaskSpec::Series(refs.iter().map(|r| r.to_string()).collect()),
        );
    }

    /// Register an unordered composition of already-named tasks.
    pub fn parallel(&mut self, name: impl Into<String>, refs: &[&str]) {
        self.tasks.insert(
            name.into(),
            TaskSpec::Parallel(refs.iter().map(|r| r.to_string()).collect()),
        );
    }

    pub fn get(&self, name: &str) -> Option<&TaskSpec> {
        self.tasks.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tasks.keys().map(String::as_str)
    }

    /// Check the whole table: every composite reference resolves, and no
    /// chain of composites loops back on itself. Fatal at startup, a
    /// configuration error.
    pub fn validate(&self) -> Result<()> {
        let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();

        for name in self.tasks.keys() {
            graph.add_node(name.as_str());
        }

        for (name, spec) in self.tasks.iter() {
            for reference in spec.references() {
                if !self.tasks.contains_key(reference) {
                    return Err(BuildError::UnknownTask(reference.clone()));
                }
                graph.add_edge(name.as_str(), reference.as_str(), ());
            }
        }

        match toposort(&graph, None) {
            Ok(_) => Ok(()),
            Err(cycle) => Err(BuildError::TaskCycle(cycle.node_id().to_string())),
        }
    }

    /// Whether running the given entry points would reach any watch leaf.
    ///
    /// Errors on an unknown entry name, same as execution would.
    pub fn reaches_watch_leaf(&self, names: &[String]) -> Result<bool> {
        let mut stack: Vec<&str> = names.iter().map(String::as_str).collect();
        let mut seen: Vec<&str> = Vec::new();

        while let Some(name) = stack.pop() {
            if seen.contains(&name) {
                continue;
            }
            seen.push(name);

            match self.tasks.get(name) {
                None => return Err(BuildError::UnknownTask(name.to_string())),
                Some(TaskSpec::Leaf(leaf)) if leaf.watch => return Ok(true),
                Some(TaskSpec::Leaf(_)) => {}
                Some(spec) => stack.extend(spec.references().iter().map(String::as_str)),
            }
        }

        Ok(false)
    }
}

// src/graph/executor.rs

use std::sync::Arc;

use anyhow::anyhow;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::errors::{BuildError, Result};
use crate::graph::registry::{TaskRegistry, TaskSpec};
use crate::pipeline::BoxFuture;

/// Runs named tasks against a validated [`TaskRegistry`].
///
/// `series` awaits each step in order and aborts on the first error.
/// `parallel` starts siblings in listed order, lets every one of them settle
/// (no sibling is abandoned mid-flight, nothing can hang), and then reports
/// the first error observed.
pub struct GraphExecutor {
    registry: Arc<TaskRegistry>,
}

impl GraphExecutor {
    pub fn new(registry: Arc<TaskRegistry>) -> Self {
        Self { registry }
    }

    /// Run the given entry points as a series, exactly as if they had been
    /// registered as one.
    pub async fn run_series(&self, names: &[String]) -> Result<()> {
        for name in names {
            run_named(Arc::clone(&self.registry), name.clone()).await?;
        }
        Ok(())
    }
}

/// Resolve one name and run it. Boxed because composites recurse, owned
/// because parallel groups spawn their siblings.
fn run_named(registry: Arc<TaskRegistry>, name: String) -> BoxFuture<'static, Result<()>> {
    Box::pin(async move {
        let spec = registry
            .get(&name)
            .ok_or_else(|| BuildError::UnknownTask(name.clone()))?;

        match spec {
            TaskSpec::Leaf(leaf) => {
                debug!(task = %name, "task starting");
                let result = leaf.task.run().await;
                match &result {
                    Ok(()) => info!(task = %name, "task finished"),
                    Err(err) => warn!(task = %name, error = %err, "task failed"),
                }
                result
            }
            TaskSpec::Series(steps) => {
                debug!(task = %name, steps = steps.len(), "series starting");
                for step in steps {
                    run_named(Arc::clone(&registry), step.clone()).await?;
                }
                Ok(())
            }
            TaskSpec::Parallel(siblings) => {
                debug!(task = %name, siblings = siblings.len(), "parallel group starting");
                let mut set = JoinSet::new();
                for sibling in siblings {
                    set.spawn(run_named(Arc::clone(&registry), sibling.clone()));
                }

                let mut first_error = None;
                while let Some(joined) = set.join_next().await {
                    let outcome = match joined {
                        Ok(outcome) => outcome,
                        Err(join_err) => Err(BuildError::Other(anyhow!(
                            "task panicked in parallel group '{name}': {join_err}"
                        ))),
                    };
                    if let Err(err) = outcome {
                        if first_error.is_none() {
                            first_error = Some(err);
                        } else {
                            // Later sibling failures still settle; only the
                            // first is reported upward.
                            debug!(task = %name, error = %err, "additional parallel failure");
                        }
                    }
                }

                match first_error {
                    Some(err) => Err(err),
                    None => Ok(()),
                }
            }
        }
    })
}

use std::error::Error;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::anyhow;
use mpbuild::errors::{BuildError, Result as BuildResult};
use mpbuild::graph::{GraphExecutor, Task, TaskRegistry};
use mpbuild::pipeline::BoxFuture;

type TestResult = Result<(), Box<dyn Error>>;

/// Probe leaf: optionally sleeps, records its name, optionally fails.
struct Probe {
    name: &'static str,
    delay: Duration,
    fail: bool,
    log: Arc<Mutex<Vec<String>>>,
}

impl Probe {
    fn ok(name: &'static str, log: &Arc<Mutex<Vec<String>>>) -> Self {
        Self::with(name, Duration::ZERO, false, log)
    }

    fn slow(name: &'static str, millis: u64, log: &Arc<Mutex<Vec<String>>>) -> Self {
        Self::with(name, Duration::from_millis(millis), false, log)
    }

    fn failing(name: &'static str, log: &Arc<Mutex<Vec<String>>>) -> Self {
        Self::with(name, Duration::ZERO, true, log)
    }

    fn with(
        name: &'static str,
        delay: Duration,
        fail: bool,
        log: &Arc<Mutex<Vec<String>>>,
    ) -> Self {
        Self {
            name,
            delay,
            fail,
            log: Arc::clone(log),
        }
    }
}

impl Task for Probe {
    fn run(&self) -> BoxFuture<'_, BuildResult<()>> {
        Box::pin(async move {
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            self.log.lock().unwrap().push(self.name.to_string());
            if self.fail {
                Err(anyhow!("probe '{}' failed", self.name).into())
            } else {
                Ok(())
            }
        })
    }
}

fn run_log() -> Arc<Mutex<Vec<String>>> {
    Arc::new(Mutex::new(Vec::new()))
}

#[tokio::test]
async fn series_waits_for_each_step_before_the_next() -> TestResult {
    let log = run_log();
    let mut registry = TaskRegistry::new();
    registry.leaf("slow", Probe::slow("slow", 50, &log));
    registry.leaf("fast", Probe::ok("fast", &log));
    registry.series("both", &["slow", "fast"]);
    registry.validate()?;

    let executor = GraphExecutor::new(Arc::new(registry));
    executor.run_series(&["both".to_string()]).await?;

    assert_eq!(*log.lock().unwrap(), vec!["slow", "fast"]);
    Ok(())
}

#[tokio::test]
async fn series_aborts_remaining_steps_on_first_error() -> TestResult {
    let log = run_log();
    let mut registry = TaskRegistry::new();
    registry.leaf("bad", Probe::failing("bad", &log));
    registry.leaf("after", Probe::ok("after", &log));
    registry.series("chain", &["bad", "after"]);
    registry.validate()?;

    let executor = GraphExecutor::new(Arc::new(registry));
    let result = executor.run_series(&["chain".to_string()]).await;

    assert!(result.is_err());
    assert_eq!(*log.lock().unwrap(), vec!["bad"]);
    Ok(())
}

#[tokio::test]
async fn parallel_settles_every_sibling_and_reports_the_first_error() -> TestResult {
    let log = run_log();
    let mut registry = TaskRegistry::new();
    registry.leaf("bad", Probe::failing("bad", &log));
    registry.leaf("slow-ok", Probe::slow("slow-ok", 80, &log));
    registry.parallel("group", &["bad", "slow-ok"]);
    registry.validate()?;

    let executor = GraphExecutor::new(Arc::new(registry));
    let err = executor
        .run_series(&["group".to_string()])
        .await
        .expect_err("group must fail");

    assert!(err.to_string().contains("probe 'bad' failed"));
    // The failing sibling never aborted the healthy one.
    let entries = log.lock().unwrap().clone();
    assert!(entries.contains(&"slow-ok".to_string()));
    Ok(())
}

#[tokio::test]
async fn unknown_entry_name_is_a_graph_error() {
    let registry = Arc::new(TaskRegistry::new());
    let executor = GraphExecutor::new(registry);

    let err = executor
        .run_series(&["missing".to_string()])
        .await
        .expect_err("unknown task must fail");
    assert!(matches!(err, BuildError::UnknownTask(name) if name == "missing"));
}

#[test]
fn validation_rejects_unknown_references() {
    let mut registry = TaskRegistry::new();
    registry.series("top", &["nowhere"]);

    let err = registry.validate().expect_err("validation must fail");
    assert!(matches!(err, BuildError::UnknownTask(name) if name == "nowhere"));
}

#[test]
fn validation_rejects_composite_cycles() {
    let mut registry = TaskRegistry::new();
    registry.series("a", &["b"]);
    registry.series("b", &["a"]);

    let err = registry.validate().expect_err("validation must fail");
    assert!(matches!(err, BuildError::TaskCycle(_)));
}

#[test]
fn watch_reachability_follows_composites() -> TestResult {
    let log = run_log();
    let mut registry = TaskRegistry::new();
    registry.leaf("build-leaf", Probe::ok("build-leaf", &log));
    registry.watch_leaf("watch-leaf", Probe::ok("watch-leaf", &log));
    registry.series("oneshot", &["build-leaf"]);
    registry.parallel("watchers", &["watch-leaf"]);
    registry.series("dev", &["oneshot", "watchers"]);
    registry.validate()?;

    assert!(!registry.reaches_watch_leaf(&["oneshot".to_string()])?);
    assert!(registry.reaches_watch_leaf(&["dev".to_string()])?);
    assert!(registry
        .reaches_watch_leaf(&["oneshot".to_string(), "watchers".to_string()])?);
    Ok(())
}

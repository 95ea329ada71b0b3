// src/lib.rs

pub mod cli;
pub mod config;
pub mod errors;
pub mod globs;
pub mod graph;
pub mod logging;
pub mod pipeline;
pub mod tasks;
pub mod watch;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use crate::cli::CliArgs;
use crate::config::load_and_validate;
use crate::errors::log_error;
use crate::graph::{GraphExecutor, TaskRegistry, TaskSpec};
use crate::watch::WatchHub;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading and normalization
/// - the task registry built from the config
/// - the graph executor
/// - the watch hub (armed only if the requested tasks reach a watch leaf)
/// - Ctrl-C handling for watch-mode invocations
pub async fn run(args: CliArgs) -> Result<()> {
    let config_path = PathBuf::from(&args.config);
    let config = Arc::new(load_and_validate(&config_path)?);

    let hub = WatchHub::new(".", &config.project.src);
    let registry = Arc::new(tasks::register_all(&config, &hub)?);

    if args.list {
        print_task_list(&registry);
        return Ok(());
    }

    let names: Vec<String> = if args.tasks.is_empty() {
        vec!["build".to_string()]
    } else {
        args.tasks.clone()
    };

    // Decided up front: an invocation that reaches a watch leaf must never
    // exit because a task failed, only on external termination.
    let watch_mode = registry.reaches_watch_leaf(&names)?;

    info!(tasks = ?names, watch_mode, "running task series");

    let executor = GraphExecutor::new(registry);
    match executor.run_series(&names).await {
        Ok(()) => {}
        Err(err) if watch_mode => log_error(&err),
        Err(err) => return Err(err.into()),
    }

    if watch_mode {
        info!("watching; press Ctrl-C to stop");
        tokio::signal::ctrl_c().await?;
        info!("shutdown requested, stopping watchers");
    }

    Ok(())
}

/// `--list` output: every registered task and its shape.
fn print_task_list(registry: &TaskRegistry) {
    println!("registered tasks:");
    for name in registry.names() {
        let shape = registry.get(name).map(TaskSpec::shape).unwrap_or("?");
        println!("  {name:<20} [{shape}]");
    }
}

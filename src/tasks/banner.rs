// src/tasks/banner.rs

use console::style;

use crate::config::model::ConfigFile;
use crate::errors::Result;
use crate::graph::registry::Task;
use crate::pipeline::BoxFuture;

/// Observational task that prints a styled line and always succeeds; used
/// to frame `compile` and announce that watchers are up. Never affects the
/// outcome of the series it sits in.
pub struct Banner {
    message: String,
}

impl Banner {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Task for Banner {
    fn run(&self) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            println!("{}", self.message);
            Ok(())
        })
    }
}

pub fn compile_start(config: &ConfigFile) -> String {
    format!(
        "↓↓↓↓↓↓ start compile: {} → {} ↓↓↓↓↓↓",
        style(&config.project.src).cyan().bold().underlined(),
        style(&config.project.dist).green().bold().underlined(),
    )
}

pub fn compile_done() -> String {
    format!(
        "↑↑↑↑↑↑ {} ↑↑↑↑↑↑",
        style("✓ All compilation tasks done!").green().bold()
    )
}

pub fn watch_started() -> String {
    style("All watching tasks started ...").cyan().to_string()
}

// src/tasks/category.rs

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::config::model::ConfigFile;
use crate::errors::{log_error, Result};
use crate::globs::{self, PatternSet};
use crate::graph::registry::Task;
use crate::pipeline::{self, BoxFuture, FileRecord, Transform};
use crate::watch::{hash_inputs, WatchHub};

/// Everything one asset category needs to run: its task name, the
/// synthesized glob set, whether inputs travel buffered or streamed, and
/// the transform stage they go through.
pub struct CategorySpec {
    pub name: &'static str,
    pub patterns: Vec<String>,
    pub streamed: bool,
    pub transform: Arc<dyn Transform>,
}

/// Select this category's inputs and push them through its transform into
/// the destination tree. Returns the number of files written.
pub async fn run_category(config: &ConfigFile, spec: &CategorySpec) -> Result<usize> {
    let files = globs::select_files(&spec.patterns, &config.project.src)?;
    debug!(category = spec.name, files = files.len(), "selected inputs");

    let mut written = 0usize;
    for path in files {
        let record = if spec.streamed {
            FileRecord::open_streamed(&config.project.src, &path).await?
        } else {
            FileRecord::read_buffered(&config.project.src, &path).await?
        };
        if let Some(out) = spec.transform.apply(record).await? {
            pipeline::write_record(&config.project.dist, out).await?;
            written += 1;
        }
    }

    Ok(written)
}

/// One-shot build task for a category.
pub struct CategoryBuild {
    config: Arc<ConfigFile>,
    spec: Arc<CategorySpec>,
}

impl CategoryBuild {
    pub fn new(config: Arc<ConfigFile>, spec: Arc<CategorySpec>) -> Self {
        Self { config, spec }
    }
}

impl Task for CategoryBuild {
    fn run(&self) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            let written = run_category(&self.config, &self.spec).await?;
            info!(category = self.spec.name, files = written, "category built");
            Ok(())
        })
    }
}

/// Watch task for a category: arms a subscription on the hub and spawns the
/// rebuild loop, then completes. The loop runs for the process lifetime.
pub struct CategoryWatch {
    config: Arc<ConfigFile>,
    spec: Arc<CategorySpec>,
    hub: Arc<WatchHub>,
}

impl CategoryWatch {
    pub fn new(config: Arc<ConfigFile>, spec: Arc<CategorySpec>, hub: Arc<WatchHub>) -> Self {
        Self { config, spec, hub }
    }
}

impl Task for CategoryWatch {
    fn run(&self) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            let patterns = PatternSet::compile(&self.spec.patterns)?;
            let rx = self.hub.subscribe(self.spec.name, patterns)?;

            let config = Arc::clone(&self.config);
            let spec = Arc::clone(&self.spec);
            tokio::spawn(rebuild_loop(config, spec, rx));

            Ok(())
        })
    }
}

/// Single consumer per category: at most one rebuild in flight, bursts
/// coalesced by the capacity-one channel plus a short settle window. A
/// failed rebuild is reported and the loop keeps watching; each run opens
/// its inputs fresh.
async fn rebuild_loop(
    config: Arc<ConfigFile>,
    spec: Arc<CategorySpec>,
    mut rx: mpsc::Receiver<()>,
) {
    let mut last_hash: Option<String> = None;

    while rx.recv().await.is_some() {
        // Let the editor finish writing sibling files, then fold whatever
        // queued up in the meantime into this run.
        tokio::time::sleep(Duration::from_millis(100)).await;
        while rx.try_recv().is_ok() {}

        if let Err(err) = rebuild_once(&config, &spec, &mut last_hash).await {
            log_error(&err);
        }
    }

    debug!(category = spec.name, "rebuild loop ended");
}

async fn rebuild_once(
    config: &ConfigFile,
    spec: &CategorySpec,
    last_hash: &mut Option<String>,
) -> Result<()> {
    let files = globs::select_files(&spec.patterns, &config.project.src)?;
    let hash = hash_inputs(&files)?;
    if last_hash.as_deref() == Some(hash.as_str()) {
        debug!(category = spec.name, "inputs unchanged; skipping rebuild");
        return Ok(());
    }

    let written = run_category(config, spec).await?;
    *last_hash = Some(hash);
    info!(category = spec.name, files = written, "rebuilt");
    Ok(())
}

// src/tasks/clean.rs

use std::ffi::OsStr;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info};

use crate::config::model::ConfigFile;
use crate::errors::{BuildError, Result};
use crate::graph::registry::Task;
use crate::pipeline::BoxFuture;

/// Files at the destination root that `clean` must never delete. The
/// developer tools own these; regenerating them loses local settings.
pub const PROTECTED_FILES: [&str; 2] = ["project.config.json", "app.json"];

/// Empty the destination tree, keeping the protected root files.
///
/// Idempotent: a missing or already-empty destination succeeds, as does an
/// entry that vanishes mid-delete. Any other I/O failure is fatal. The
/// future resolves only after every delete has been confirmed, which is
/// what lets `build` order clean strictly before compile.
pub async fn clean_dist(dist: &str) -> Result<()> {
    let root = Path::new(dist);
    info!(dist, protected = ?PROTECTED_FILES, "cleaning destination tree");

    let mut entries = match tokio::fs::read_dir(root).await {
        Ok(entries) => entries,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            debug!(dist, "destination absent; nothing to clean");
            return Ok(());
        }
        Err(err) => return Err(delete_error(root, err)),
    };

    loop {
        let entry = match entries.next_entry().await {
            Ok(Some(entry)) => entry,
            Ok(None) => break,
            Err(err) => return Err(delete_error(root, err)),
        };

        let name = entry.file_name();
        if PROTECTED_FILES.iter().any(|p| name == OsStr::new(p)) {
            debug!(file = ?name, "protected; keeping");
            continue;
        }

        let path = entry.path();
        let is_dir = match entry.file_type().await {
            Ok(ft) => ft.is_dir(),
            Err(err) if err.kind() == ErrorKind::NotFound => continue,
            Err(err) => return Err(delete_error(&path, err)),
        };

        let removed = if is_dir {
            tokio::fs::remove_dir_all(&path).await
        } else {
            tokio::fs::remove_file(&path).await
        };
        match removed {
            Ok(()) => {}
            Err(err) if err.kind() == ErrorKind::NotFound => {}
            Err(err) => return Err(delete_error(&path, err)),
        }
    }

    Ok(())
}

fn delete_error(path: &Path, source: std::io::Error) -> BuildError {
    BuildError::Delete {
        path: PathBuf::from(path),
        source,
    }
}

pub struct CleanTask {
    config: Arc<ConfigFile>,
}

impl CleanTask {
    pub fn new(config: Arc<ConfigFile>) -> Self {
        Self { config }
    }
}

impl Task for CleanTask {
    fn run(&self) -> BoxFuture<'_, Result<()>> {
        Box::pin(clean_dist(&self.config.project.dist))
    }
}

// src/watch/watcher.rs

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::globs::PatternSet;

/// One armed category: its compiled pattern set and the channel its rebuild
/// loop listens on.
struct Subscriber {
    name: String,
    patterns: PatternSet,
    tx: mpsc::Sender<()>,
}

/// The process-wide filesystem watch hub.
///
/// One recursive `notify` watcher over the source tree feeds every
/// subscribed category. Each subscription gets a capacity-one channel: a
/// burst of matching events collapses into a single pending ping, so a
/// category has at most one rebuild in flight and at most one queued behind
/// it. The hub lives for the whole process; dropping it stops watching.
pub struct WatchHub {
    /// Directory events are relativized against (the project root, where
    /// glob patterns are anchored).
    root: PathBuf,
    /// Directory actually watched (the source tree).
    watch_dir: PathBuf,
    subscribers: Arc<Mutex<Vec<Subscriber>>>,
    watcher: Mutex<Option<RecommendedWatcher>>,
}

impl WatchHub {
    pub fn new(root: impl Into<PathBuf>, watch_dir: impl Into<PathBuf>) -> Arc<Self> {
        Arc::new(Self {
            root: root.into(),
            watch_dir: watch_dir.into(),
            subscribers: Arc::new(Mutex::new(Vec::new())),
            watcher: Mutex::new(None),
        })
    }

    /// Arm a category: register its pattern set and hand back the receiver
    /// its rebuild loop consumes. The underlying watcher starts on the
    /// first subscription.
    pub fn subscribe(&self, name: impl Into<String>, patterns: PatternSet) -> Result<mpsc::Receiver<()>> {
        let name = name.into();
        let (tx, rx) = mpsc::channel(1);

        self.subscribers
            .lock()
            .expect("subscriber lock poisoned")
            .push(Subscriber {
                name: name.clone(),
                patterns,
                tx,
            });

        self.ensure_watching()?;
        info!(category = %name, "watcher armed");
        Ok(rx)
    }

    /// Whether any category has been armed.
    pub fn armed(&self) -> bool {
        !self
            .subscribers
            .lock()
            .expect("subscriber lock poisoned")
            .is_empty()
    }

    /// Route a batch of changed paths to every matching subscriber.
    ///
    /// Public so the dispatch semantics are testable without real
    /// filesystem events; the notify callback goes through the same path.
    pub fn dispatch(&self, paths: &[PathBuf]) {
        dispatch_to(&self.root, &self.subscribers, paths);
    }

    fn ensure_watching(&self) -> Result<()> {
        let mut guard = self.watcher.lock().expect("watcher lock poisoned");
        if guard.is_some() {
            return Ok(());
        }

        let root = self.root.clone();
        let subscribers = Arc::clone(&self.subscribers);

        // The callback runs on notify's thread; dispatch only touches the
        // subscriber list and non-blocking channel sends.
        let mut watcher = RecommendedWatcher::new(
            move |result: notify::Result<Event>| match result {
                Ok(event) => dispatch_to(&root, &subscribers, &event.paths),
                Err(err) => {
                    eprintln!("mpbuild: file watch error: {err}");
                }
            },
            Config::default(),
        )?;

        watcher
            .watch(&self.watch_dir, RecursiveMode::Recursive)
            .with_context(|| format!("watching source tree {:?}", self.watch_dir))?;

        info!(dir = ?self.watch_dir, "file watcher started");
        *guard = Some(watcher);
        Ok(())
    }
}

/// Shared dispatch body; the notify callback cannot hold the hub itself
/// without a reference cycle, so it captures the pieces instead.
fn dispatch_to(root: &Path, subscribers: &Mutex<Vec<Subscriber>>, paths: &[PathBuf]) {
    let subscribers = subscribers.lock().expect("subscriber lock poisoned");

    for subscriber in subscribers.iter() {
        // Patterns are anchored wherever the config anchored `src`, so a
        // changed path is tried both relativized against the project root
        // and as reported.
        let hit = paths.iter().any(|path| {
            let as_reported = path.to_string_lossy().replace('\\', "/");
            if subscriber.patterns.is_match(&as_reported) {
                return true;
            }
            relative_str(root, path)
                .map(|rel| subscriber.patterns.is_match(&rel))
                .unwrap_or(false)
        });
        if !hit {
            continue;
        }

        match subscriber.tx.try_send(()) {
            Ok(()) => debug!(category = %subscriber.name, "change queued"),
            // A pending ping already covers this change.
            Err(mpsc::error::TrySendError::Full(())) => {
                debug!(category = %subscriber.name, "change coalesced")
            }
            Err(mpsc::error::TrySendError::Closed(())) => {
                warn!(category = %subscriber.name, "rebuild loop gone; dropping change")
            }
        }
    }
}

/// Convert an event path into the project-root-relative, forward-slash form
/// glob patterns are written in. Absolute watcher paths are relativized
/// against the canonicalized root.
fn relative_str(root: &Path, path: &Path) -> Option<String> {
    let rel = match path.strip_prefix(root) {
        Ok(rel) => rel,
        Err(_) => {
            let canonical = root.canonicalize().ok()?;
            path.strip_prefix(&canonical).ok()?
        }
    };
    Some(rel.to_string_lossy().replace('\\', "/"))
}

// src/errors.rs

//! Crate-wide error taxonomy.
//!
//! Leaf stages produce structured [`BuildError`]s; composites propagate the
//! first error they see. The [`log_error`] surface is what watch loops call
//! to report a failure without tearing the process down.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BuildError {
    /// Streaming file input reached a stage that only accepts buffered
    /// contents. Fatal to that file, not to the pipeline.
    #[error("streaming input is not supported for {path:?}")]
    UnsupportedInput { path: PathBuf },

    /// An external compiler rejected its input.
    #[error(transparent)]
    Compile(#[from] CompileError),

    /// Clean-stage I/O failure other than "nothing to delete".
    #[error("cleaning {path:?}: {source}")]
    Delete {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A composition referenced a task name that was never registered.
    #[error("unknown task '{0}' referenced in a composition")]
    UnknownTask(String),

    /// A chain of composite tasks references itself.
    #[error("cycle detected in task graph involving '{0}'")]
    TaskCycle(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, BuildError>;

/// Error produced when an external compiler rejects a source file.
///
/// Carries both a styled message (underlined file header, for terminals) and
/// the plain equivalent, plus the source path resolved relative to the
/// working directory.
#[derive(Debug)]
pub struct CompileError {
    /// Two-line message with ANSI styling: file header, then compiler detail.
    pub message_styled: String,
    /// The same message with all styling stripped.
    pub message: String,
    /// The erroring source file, relative to the working directory where
    /// possible.
    pub relative_path: PathBuf,
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for CompileError {}

/// Report an error without aborting.
///
/// Compile errors print their styled form; everything else prints through
/// `Display`. Watch loops route every rebuild failure through here so a bad
/// source file never kills the watcher.
pub fn log_error(err: &BuildError) {
    match err {
        BuildError::Compile(e) => eprintln!("{}", e.message_styled),
        other => eprintln!("mpbuild error: {other}"),
    }
}

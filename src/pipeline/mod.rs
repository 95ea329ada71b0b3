// src/pipeline/mod.rs

//! Per-file transform stages.
//!
//! Every asset category pushes its selected files through one [`Transform`]:
//! a stage takes ownership of a [`FileRecord`], and yields the transformed
//! record, `None` to swallow it, or an error. The actual content work is
//! delegated to external collaborators ([`compiler`] for styles, an external
//! command for scripts); the stages own lifecycle, renaming, and error
//! shaping.

pub mod compiler;
pub mod record;
pub mod script;
pub mod sink;
pub mod style;

use std::future::Future;
use std::pin::Pin;

use crate::errors::Result;

pub use compiler::{GrassCompiler, RenderFailure, RenderOptions, RenderOutput, StyleCompiler};
pub use record::{Contents, FileRecord};
pub use script::{PassthroughTransform, ScriptTransform};
pub use sink::write_record;
pub use style::StyleTransform;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A per-file transform stage.
///
/// Records are moved in and out; a stage never sees the same record twice
/// and nothing else holds it while the stage runs.
pub trait Transform: Send + Sync {
    /// Transform one record. `Ok(None)` swallows it without error.
    fn apply<'a>(&'a self, record: FileRecord) -> BoxFuture<'a, Result<Option<FileRecord>>>;
}

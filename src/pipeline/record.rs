// src/pipeline/record.rs

use std::path::{Path, PathBuf};

use tokio::fs::File;

use crate::errors::Result;

/// Contents of an in-flight file record.
///
/// Text transforms work on `Buffered` data; large binaries travel as
/// `Streamed` handles so a copy never holds the whole file in memory. A
/// stage that needs buffered input must reject `Streamed` records rather
/// than silently draining them.
pub enum Contents {
    /// No content: a placeholder that stages pass through untouched apart
    /// from extension renaming.
    Empty,
    Buffered(Vec<u8>),
    Streamed(File),
}

impl Contents {
    pub fn is_empty(&self) -> bool {
        matches!(self, Contents::Empty)
    }

    pub fn is_streamed(&self) -> bool {
        matches!(self, Contents::Streamed(_))
    }
}

impl std::fmt::Debug for Contents {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Contents::Empty => f.write_str("Empty"),
            Contents::Buffered(b) => write!(f, "Buffered({} bytes)", b.len()),
            Contents::Streamed(_) => f.write_str("Streamed"),
        }
    }
}

/// One file moving through a transform stage.
///
/// Owned exclusively by the active stage and passed by move; `base` is the
/// source root the record was selected under, so `relative()` yields the
/// path that the destination tree mirrors.
#[derive(Debug)]
pub struct FileRecord {
    pub base: PathBuf,
    pub path: PathBuf,
    pub contents: Contents,
    /// Normalized source map produced by a compile stage, written next to
    /// the output by the sink.
    pub source_map: Option<serde_json::Value>,
}

impl FileRecord {
    /// Read a file fully into memory. Zero-length files become `Empty`.
    pub async fn read_buffered(base: impl Into<PathBuf>, path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let bytes = tokio::fs::read(&path).await?;
        let contents = if bytes.is_empty() {
            Contents::Empty
        } else {
            Contents::Buffered(bytes)
        };
        Ok(Self {
            base: base.into(),
            path,
            contents,
            source_map: None,
        })
    }

    /// Open a file as a stream without buffering it.
    pub async fn open_streamed(base: impl Into<PathBuf>, path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let file = File::open(&path).await?;
        Ok(Self {
            base: base.into(),
            path,
            contents: Contents::Streamed(file),
            source_map: None,
        })
    }

    /// Path relative to the record's base, i.e. the layout the destination
    /// tree mirrors. Falls back to the full path when the record was built
    /// outside its base.
    pub fn relative(&self) -> &Path {
        self.path.strip_prefix(&self.base).unwrap_or(&self.path)
    }

    /// File extension, if any, lowercased for dialect checks.
    pub fn extension(&self) -> Option<String> {
        self.path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
    }

    /// Whether the base name marks this as a partial (`_`-prefixed include
    /// file, never an independent compilation unit).
    pub fn is_partial(&self) -> bool {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().starts_with('_'))
            .unwrap_or(false)
    }

    /// Replace the extension in place, e.g. `foo.scss` → `foo.wxss`.
    pub fn rename_extension(&mut self, ext: &str) {
        self.path = replace_extension(&self.path, ext);
    }
}

/// `foo/bar.scss` + `wxss` → `foo/bar.wxss`. A path without an extension
/// gains one.
pub fn replace_extension(path: &Path, ext: &str) -> PathBuf {
    path.with_extension(ext)
}

// src/pipeline/style.rs

//! The style transform stage: `sass`/`scss` (and plain `wxss`) in, compiled
//! `wxss` out.
//!
//! This is the one stage with real per-file ceremony: partial suppression,
//! the indented-dialect flag, include-path wiring, source-map normalization
//! and the two-line styled error contract. Everything compiler-specific
//! stays behind [`StyleCompiler`].

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, Context};
use serde_json::Value;
use tracing::debug;

use crate::errors::{BuildError, CompileError, Result};
use crate::pipeline::compiler::{RenderFailure, RenderOptions, RenderOutput, StyleCompiler};
use crate::pipeline::record::{replace_extension, Contents, FileRecord};
use crate::pipeline::{BoxFuture, Transform};

/// Extension every output of this stage is renamed to.
const OUT_EXT: &str = "wxss";

/// File name compilers report when fed from memory instead of from disk.
const STDIN_SENTINEL: &str = "stdin";

/// Extension selecting the whitespace-significant indented dialect.
const INDENTED_EXT: &str = "sass";

pub struct StyleTransform {
    compiler: Arc<dyn StyleCompiler>,
    include_paths: Vec<PathBuf>,
    source_map: bool,
    sync: bool,
}

impl StyleTransform {
    /// Asynchronous mode: compiler invocations run off the event loop.
    pub fn new(
        compiler: Arc<dyn StyleCompiler>,
        include_paths: Vec<PathBuf>,
        source_map: bool,
    ) -> Self {
        Self {
            compiler,
            include_paths,
            source_map,
            sync: false,
        }
    }

    /// Synchronous mode: a thin variant of [`StyleTransform::new`] that
    /// invokes the compiler in place, with identical success and error
    /// handling.
    pub fn sync(
        compiler: Arc<dyn StyleCompiler>,
        include_paths: Vec<PathBuf>,
        source_map: bool,
    ) -> Self {
        Self {
            compiler,
            include_paths,
            source_map,
            sync: true,
        }
    }

    fn render_options(&self, record: &FileRecord, data: String) -> RenderOptions {
        // The file's own directory always resolves first, ahead of any
        // caller-supplied include paths.
        let mut include_paths = Vec::with_capacity(self.include_paths.len() + 1);
        if let Some(dir) = record.path.parent() {
            include_paths.push(dir.to_path_buf());
        }
        include_paths.extend(self.include_paths.iter().cloned());

        RenderOptions {
            data,
            file: record.path.clone(),
            indented_syntax: record.extension().as_deref() == Some(INDENTED_EXT),
            include_paths,
            source_map: self.source_map,
            omit_source_map_url: self.source_map,
            source_map_contents: self.source_map,
        }
    }

    async fn compile(&self, mut record: FileRecord, data: String) -> Result<Option<FileRecord>> {
        let options = self.render_options(&record, data);

        let rendered = if self.sync {
            self.compiler.render(&options)
        } else {
            let compiler = Arc::clone(&self.compiler);
            tokio::task::spawn_blocking(move || compiler.render(&options))
                .await
                .map_err(|e| anyhow!("style compiler task panicked: {e}"))?
        };

        match rendered {
            Ok(output) => {
                finish_record(&mut record, output)?;
                Ok(Some(record))
            }
            Err(failure) => Err(BuildError::Compile(shape_error(&record.path, failure))),
        }
    }
}

impl Transform for StyleTransform {
    fn apply<'a>(&'a self, mut record: FileRecord) -> BoxFuture<'a, Result<Option<FileRecord>>> {
        Box::pin(async move {
            match &record.contents {
                // Placeholders pass through with only the extension changed;
                // the compiler is never consulted.
                Contents::Empty => {
                    record.rename_extension(OUT_EXT);
                    Ok(Some(record))
                }
                Contents::Streamed(_) => Err(BuildError::UnsupportedInput {
                    path: record.path.clone(),
                }),
                Contents::Buffered(_) if record.is_partial() => {
                    // Private include file: swallowed, never emitted.
                    debug!(path = ?record.path, "skipping partial");
                    Ok(None)
                }
                Contents::Buffered(bytes) => {
                    let data = String::from_utf8_lossy(bytes).into_owned();
                    self.compile(record, data).await
                }
            }
        })
    }
}

/// Apply a successful compile to the record: contents replaced, extension
/// renamed, source map normalized when one was produced.
fn finish_record(record: &mut FileRecord, output: RenderOutput) -> Result<()> {
    if let Some(map) = output.map {
        record.source_map = Some(normalize_map(&map, record)?);
    }
    record.contents = Contents::Buffered(output.css);
    record.rename_extension(OUT_EXT);
    Ok(())
}

/// Rewrite a compiler-produced source map so it refers to real files.
///
/// Compilers fed from memory emit the `stdout`/`stdin` sentinels and leave
/// import references relative to nothing in particular. This re-homes every
/// source under the compiled file's directory (except the entry naming the
/// main file itself), drops leftover sentinel entries, and points the map's
/// `file` at the renamed output.
fn normalize_map(raw: &[u8], record: &FileRecord) -> Result<Value> {
    let mut map: Value =
        serde_json::from_slice(raw).context("parsing compiler-produced source map")?;
    if !map.is_object() {
        return Err(anyhow!("compiler-produced source map is not a JSON object").into());
    }

    let map_file = map
        .get("file")
        .and_then(Value::as_str)
        .map(|f| if f == "stdout" { STDIN_SENTINEL } else { f }.to_string())
        .unwrap_or_else(|| STDIN_SENTINEL.to_string());

    let src_rel = forward(record.relative());
    let src_dir = Path::new(&src_rel)
        .parent()
        .map(forward)
        .filter(|d| !d.is_empty());

    if let Some(sources) = map.get_mut("sources").and_then(Value::as_array_mut) {
        if let Some(dir) = &src_dir {
            let main_index = sources
                .iter()
                .position(|s| s.as_str() == Some(map_file.as_str()));
            for (index, source) in sources.iter_mut().enumerate() {
                if Some(index) == main_index {
                    continue;
                }
                if let Some(s) = source.as_str().filter(|s| !s.is_empty()) {
                    *source = Value::String(format!("{dir}/{s}"));
                }
            }
        }
        sources.retain(|s| {
            s.as_str()
                .is_some_and(|s| s != STDIN_SENTINEL && !s.is_empty())
        });
    }

    map["file"] = Value::String(forward(&replace_extension(Path::new(&src_rel), OUT_EXT)));
    Ok(map)
}

/// Shape a compiler rejection into the stable [`CompileError`] contract.
///
/// The erroring path falls back to the file being compiled when the
/// compiler reports nothing or the in-memory sentinel, and is relativized
/// against the working directory for the header line.
fn shape_error(record_path: &Path, failure: RenderFailure) -> CompileError {
    let file_path = match failure.file {
        Some(f) if f != Path::new(STDIN_SENTINEL) => f,
        _ => record_path.to_path_buf(),
    };

    let cwd = std::env::current_dir().unwrap_or_default();
    let relative_path = file_path
        .strip_prefix(&cwd)
        .map(Path::to_path_buf)
        .unwrap_or(file_path);

    let header = console::style(relative_path.display().to_string()).underlined();
    let message_styled = format!("{header}\n{}", failure.formatted);
    let message = console::strip_ansi_codes(&message_styled).into_owned();

    CompileError {
        message_styled,
        message,
        relative_path,
    }
}

fn forward(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

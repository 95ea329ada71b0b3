// src/pipeline/compiler.rs

//! The external style-compiler collaborator.
//!
//! The pipeline never compiles style sheets itself; it hands each file to a
//! [`StyleCompiler`] and shapes whatever comes back. The default binding
//! wraps the `grass` compiler. `grass` reports errors against an anonymous
//! input when fed from memory, which is why [`RenderFailure::file`] is
//! optional: the transform stage resolves a missing or sentinel file back to
//! the record it was compiling.

use std::path::PathBuf;

/// Options for one compiler invocation.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Raw textual contents of the file being compiled.
    pub data: String,
    /// The file's own path, so nested imports resolve relative to it.
    pub file: PathBuf,
    /// Select the whitespace-significant indented dialect.
    pub indented_syntax: bool,
    /// Import search paths; the transform stage prepends the file's own
    /// directory before any caller-supplied entries.
    pub include_paths: Vec<PathBuf>,
    /// Produce a source map alongside the css.
    pub source_map: bool,
    /// Suppress the `sourceMappingURL` comment in the css output.
    pub omit_source_map_url: bool,
    /// Inline the original sources into the map.
    pub source_map_contents: bool,
}

/// Successful compiler output.
#[derive(Debug, Clone)]
pub struct RenderOutput {
    pub css: Vec<u8>,
    /// JSON-encoded source map, when requested and supported.
    pub map: Option<Vec<u8>>,
}

/// Compiler rejection.
#[derive(Debug, Clone)]
pub struct RenderFailure {
    /// The file the compiler blames, when it knows one. May be the `stdin`
    /// sentinel for compilers fed from memory.
    pub file: Option<PathBuf>,
    /// Multi-line, human-oriented error rendering.
    pub formatted: String,
    /// Single-line summary.
    pub message: String,
}

/// A single-file style compiler.
///
/// The method is synchronous; the transform stage decides whether to call it
/// in place or move it off the event loop.
pub trait StyleCompiler: Send + Sync {
    fn render(&self, options: &RenderOptions) -> Result<RenderOutput, RenderFailure>;
}

/// The `grass` compiler as the default collaborator.
///
/// `grass` does not emit source maps; [`RenderOutput::map`] is always `None`
/// here, and the map-normalization path of the transform stage is exercised
/// through compilers that do.
pub struct GrassCompiler;

impl StyleCompiler for GrassCompiler {
    fn render(&self, options: &RenderOptions) -> Result<RenderOutput, RenderFailure> {
        let mut opts = grass::Options::default()
            .style(grass::OutputStyle::Expanded)
            .input_syntax(if options.indented_syntax {
                grass::InputSyntax::Sass
            } else {
                grass::InputSyntax::Scss
            });
        for path in &options.include_paths {
            opts = opts.load_path(path);
        }

        match grass::from_string(options.data.clone(), &opts) {
            Ok(css) => Ok(RenderOutput {
                css: css.into_bytes(),
                map: None,
            }),
            Err(err) => {
                let formatted = err.to_string();
                let message = formatted.lines().next().unwrap_or_default().to_string();
                Err(RenderFailure {
                    file: None,
                    formatted,
                    message,
                })
            }
        }
    }
}

// src/pipeline/script.rs

//! Script transform stage.
//!
//! Script compilation is delegated to an external command (`tsc`, `esbuild`,
//! whatever the config names): the file's contents are piped through the
//! command's stdin and its stdout becomes the output. With no command
//! configured the stage degrades to a rename-only passthrough, which is the
//! correct behavior for plain `js`/`wxs` categories.

use std::path::Path;
use std::process::Stdio;

use anyhow::Context;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use crate::errors::{BuildError, CompileError, Result};
use crate::pipeline::record::{Contents, FileRecord};
use crate::pipeline::{BoxFuture, Transform};

pub struct ScriptTransform {
    command: Option<String>,
    output_ext: Option<String>,
}

impl ScriptTransform {
    pub fn new(command: Option<String>, output_ext: Option<String>) -> Self {
        Self {
            command,
            output_ext,
        }
    }

    fn rename(&self, record: &mut FileRecord) {
        if let Some(ext) = &self.output_ext {
            record.rename_extension(ext);
        }
    }

    async fn run_command(&self, command: &str, mut record: FileRecord) -> Result<FileRecord> {
        let bytes = match &record.contents {
            Contents::Buffered(b) => b.clone(),
            // Script sources are always selected buffered; a streamed record
            // reaching a compiling stage is a caller bug.
            _ => {
                return Err(BuildError::UnsupportedInput {
                    path: record.path.clone(),
                })
            }
        };

        debug!(path = ?record.path, command, "piping file through external compiler");

        let mut cmd = if cfg!(windows) {
            let mut c = Command::new("cmd");
            c.arg("/C").arg(command);
            c
        } else {
            let mut c = Command::new("sh");
            c.arg("-c").arg(command);
            c
        };

        let mut child = cmd
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("spawning compiler command '{command}'"))?;

        // Feed stdin from a separate task so a command that interleaves
        // reading and writing can never deadlock against us.
        if let Some(mut stdin) = child.stdin.take() {
            let path = record.path.clone();
            tokio::spawn(async move {
                if let Err(err) = stdin.write_all(&bytes).await {
                    debug!(path = ?path, "compiler stdin closed early: {err}");
                }
            });
        }

        let output = child
            .wait_with_output()
            .await
            .with_context(|| format!("waiting for compiler command '{command}'"))?;

        if !output.status.success() {
            return Err(BuildError::Compile(command_error(
                &record.path,
                command,
                &output.stderr,
            )));
        }

        record.contents = Contents::Buffered(output.stdout);
        self.rename(&mut record);
        Ok(record)
    }
}

impl Transform for ScriptTransform {
    fn apply<'a>(&'a self, mut record: FileRecord) -> BoxFuture<'a, Result<Option<FileRecord>>> {
        Box::pin(async move {
            if record.contents.is_empty() {
                self.rename(&mut record);
                return Ok(Some(record));
            }

            match &self.command {
                Some(command) => self.run_command(command, record).await.map(Some),
                None => {
                    self.rename(&mut record);
                    Ok(Some(record))
                }
            }
        })
    }
}

fn command_error(path: &Path, command: &str, stderr: &[u8]) -> CompileError {
    let cwd = std::env::current_dir().unwrap_or_default();
    let relative_path = path.strip_prefix(&cwd).unwrap_or(path).to_path_buf();

    let detail = String::from_utf8_lossy(stderr);
    let detail = detail.trim_end();
    let header = console::style(relative_path.display().to_string()).underlined();
    let message_styled = format!("{header}\n{command}: {detail}");
    let message = console::strip_ansi_codes(&message_styled).into_owned();

    CompileError {
        message_styled,
        message,
        relative_path,
    }
}

/// Copy-through stage for categories with no transform at all (markup, data,
/// images, raw assets). Streamed records flow untouched.
pub struct PassthroughTransform;

impl Transform for PassthroughTransform {
    fn apply<'a>(&'a self, record: FileRecord) -> BoxFuture<'a, Result<Option<FileRecord>>> {
        Box::pin(async move { Ok(Some(record)) })
    }
}

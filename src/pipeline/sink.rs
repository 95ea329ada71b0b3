// src/pipeline/sink.rs

use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::debug;

use crate::errors::Result;
use crate::pipeline::record::{Contents, FileRecord};

/// Write a finished record into the destination tree.
///
/// The output path mirrors the record's base-relative layout under `dist`.
/// Returns the path written.
pub async fn write_record(dist: &str, record: FileRecord) -> Result<PathBuf> {
    let out_path = Path::new(dist).join(record.relative());

    if let Some(parent) = out_path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("creating output directory {parent:?}"))?;
    }

    match record.contents {
        Contents::Empty => {
            tokio::fs::write(&out_path, b"").await?;
        }
        Contents::Buffered(bytes) => {
            tokio::fs::write(&out_path, bytes).await?;
        }
        Contents::Streamed(mut file) => {
            let mut out = tokio::fs::File::create(&out_path)
                .await
                .with_context(|| format!("creating output file {out_path:?}"))?;
            tokio::io::copy(&mut file, &mut out)
                .await
                .with_context(|| format!("streaming into {out_path:?}"))?;
        }
    }

    if let Some(map) = record.source_map {
        let map_path = sibling_map_path(&out_path);
        let rendered = serde_json::to_vec(&map).context("serializing source map")?;
        tokio::fs::write(&map_path, rendered).await?;
        debug!(path = ?map_path, "wrote source map");
    }

    debug!(path = ?out_path, "wrote output file");
    Ok(out_path)
}

/// `dist/pages/index.wxss` → `dist/pages/index.wxss.map`.
fn sibling_map_path(out_path: &Path) -> PathBuf {
    let mut os = out_path.as_os_str().to_os_string();
    os.push(".map");
    PathBuf::from(os)
}

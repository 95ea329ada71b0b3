// src/watch/hash.rs

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use blake3::Hasher;
use tracing::debug;

/// Compute a deterministic aggregate hash over the contents of the given
/// files.
///
/// Watch loops use this to skip a rebuild whose input set has not actually
/// changed (editors love firing events for no-op saves). Paths are sorted
/// before hashing so iteration order never perturbs the result; files that
/// vanished since selection are skipped rather than failing the hash.
pub fn hash_inputs<I, P>(paths: I) -> Result<String>
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    let mut sorted: Vec<PathBuf> = paths
        .into_iter()
        .map(|p| p.as_ref().to_path_buf())
        .collect();
    sorted.sort();

    let mut hasher = Hasher::new();
    let mut buf = [0u8; 8192];

    for path in sorted {
        let mut file = match File::open(&path) {
            Ok(f) => f,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => continue,
            Err(err) => {
                return Err(err).with_context(|| format!("opening file for hashing: {path:?}"))
            }
        };
        // Path participates too, so a rename with identical contents still
        // counts as a change.
        hasher.update(path.to_string_lossy().as_bytes());
        loop {
            let n = file
                .read(&mut buf)
                .with_context(|| format!("hashing {path:?}"))?;
            if n == 0 {
                break;
            }
            hasher.update(&buf[..n]);
        }
    }

    let hash = hasher.finalize().to_hex().to_string();
    debug!(hash = %hash, "computed aggregate input hash");
    Ok(hash)
}

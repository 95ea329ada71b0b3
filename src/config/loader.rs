// src/config/loader.rs

use std::fs;
use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result};

use crate::config::model::ConfigFile;
use crate::config::validate::validate_config;

/// Load a configuration file from a given path and return the raw
/// [`ConfigFile`].
///
/// This performs TOML deserialization and path normalization only; semantic
/// validation lives in [`load_and_validate`].
pub fn load_from_path(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let path = path.as_ref();
    let contents =
        fs::read_to_string(path).with_context(|| format!("reading config file at {path:?}"))?;

    let mut config: ConfigFile =
        toml::from_str(&contents).with_context(|| format!("parsing TOML config from {path:?}"))?;

    normalize_roots(&mut config);
    Ok(config)
}

/// Load a configuration file and run semantic validation.
///
/// The recommended entry point for the rest of the application: after this
/// returns, `src`/`dist` are normalized, every synthesized glob set compiles,
/// and the basic invariants (distinct non-empty roots) hold. The config is
/// read-only from here on.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let config = load_from_path(&path)?;
    validate_config(&config)?;
    Ok(config)
}

/// Normalize `src` and `dist` once, before the first task runs.
fn normalize_roots(config: &mut ConfigFile) {
    config.project.src = normalize_path(&config.project.src);
    config.project.dist = normalize_path(&config.project.dist);
}

/// Clean a configured path string into the form glob synthesis expects:
/// forward slashes, no `.` components, no trailing separator.
pub fn normalize_path(raw: &str) -> String {
    let mut parts: Vec<String> = Vec::new();
    for component in Path::new(&raw.replace('\\', "/")).components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match parts.last().map(String::as_str) {
                Some(last) if last != ".." && !last.is_empty() => {
                    parts.pop();
                }
                _ => parts.push("..".to_string()),
            },
            Component::RootDir => parts.push(String::new()),
            other => parts.push(other.as_os_str().to_string_lossy().into_owned()),
        }
    }
    if parts.is_empty() {
        ".".to_string()
    } else {
        parts.join("/")
    }
}

/// Default config path: `Mpbuild.toml` in the current working directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("Mpbuild.toml")
}

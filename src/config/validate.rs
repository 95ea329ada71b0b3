// src/config/validate.rs

use anyhow::{anyhow, Context, Result};

use crate::config::model::ConfigFile;
use crate::globs::{self, PatternSet};

/// Run semantic validation against a loaded configuration.
///
/// This checks:
/// - `src` and `dist` are non-empty and distinct
/// - `assets` (when set) is a relative path under `src`
/// - every glob pattern the config can produce actually compiles
///
/// Task-graph validation (unknown references, cycles) happens later, once
/// the registry has been built from this config.
pub fn validate_config(cfg: &ConfigFile) -> Result<()> {
    validate_roots(cfg)?;
    validate_assets(cfg)?;
    validate_patterns(cfg)?;
    Ok(())
}

fn validate_roots(cfg: &ConfigFile) -> Result<()> {
    if cfg.project.src.is_empty() || cfg.project.src == "." {
        return Err(anyhow!("[project].src must name a source directory"));
    }
    if cfg.project.dist.is_empty() || cfg.project.dist == "." {
        return Err(anyhow!("[project].dist must name a destination directory"));
    }
    if cfg.project.src == cfg.project.dist {
        return Err(anyhow!(
            "[project].src and [project].dist must be distinct (both are '{}')",
            cfg.project.src
        ));
    }
    Ok(())
}

fn validate_assets(cfg: &ConfigFile) -> Result<()> {
    if let Some(assets) = &cfg.project.assets {
        if assets.starts_with('/') || assets.contains(':') {
            return Err(anyhow!(
                "[project].assets must be a path relative to src (got '{assets}')"
            ));
        }
    }
    Ok(())
}

/// Compile every glob set the categories will use, so a bad pattern fails at
/// startup instead of mid-build.
fn validate_patterns(cfg: &ConfigFile) -> Result<()> {
    let sections: [(&str, &[String]); 8] = [
        ("style", cfg.style.extensions.as_slice()),
        ("typescript", cfg.typescript.extensions.as_slice()),
        ("javascript", cfg.javascript.extensions.as_slice()),
        ("wxts", cfg.wxts.extensions.as_slice()),
        ("wxjs", cfg.wxjs.extensions.as_slice()),
        ("wxml", cfg.wxml.extensions.as_slice()),
        ("json", cfg.json.extensions.as_slice()),
        ("image", cfg.image.extensions.as_slice()),
    ];

    for (name, exts) in sections {
        let patterns = globs::ext_globs(&cfg.project, exts, false);
        PatternSet::compile(&patterns)
            .with_context(|| format!("compiling glob set for [{name}]"))?;
    }

    let copy = globs::ext_globs(&cfg.project, &cfg.copy.extensions, true);
    PatternSet::compile(&copy).context("compiling glob set for [copy]")?;

    let npm = globs::subtree_globs(&cfg.project, &cfg.npm.dir);
    PatternSet::compile(&npm).context("compiling glob set for [npm]")?;

    Ok(())
}

// src/globs.rs

//! Glob synthesis and source-file selection.
//!
//! [`ext_globs`] derives the ordered pattern list for an asset category from
//! the project configuration: primary inclusion first, then the configured
//! exclusions, then the assets pattern (positive or negated depending on the
//! caller). [`PatternSet`] compiles such a list into include/exclude matchers
//! and [`select_files`] walks the source tree through it.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use walkdir::WalkDir;

use crate::config::model::ProjectSection;

/// Synthesize the glob set for a category selecting the given extensions.
///
/// - One extension → `<src>/**/*.<ext>`
/// - Several → `<src>/**/*.{ext1,ext2,...}`
/// - None → no primary pattern; the set is driven by exclusions/assets alone.
///
/// `config.exclude` entries are appended verbatim, in order. The assets
/// pattern is appended last: positive when `include_assets`, otherwise
/// negated with a leading `!`. Empty entries never survive.
///
/// Pure function of its inputs; no I/O.
pub fn ext_globs(project: &ProjectSection, exts: &[String], include_assets: bool) -> Vec<String> {
    let mut globs: Vec<String> = Vec::new();

    match exts {
        [] => {}
        [ext] => globs.push(format!("{}/**/*.{}", project.src, ext)),
        many => globs.push(format!("{}/**/*.{{{}}}", project.src, many.join(","))),
    }

    if let Some(exclude) = &project.exclude {
        globs.extend(exclude.as_slice().iter().cloned());
    }

    if let Some(assets) = project.assets.as_deref().filter(|a| !a.is_empty()) {
        let assets_glob = format!("{}/**/*", join_forward(&project.src, assets));
        if include_assets {
            globs.push(assets_glob);
        } else {
            globs.push(format!("!{assets_glob}"));
        }
    }

    globs.retain(|g| !g.is_empty());
    globs
}

/// The pattern covering a whole subtree of `src`, in synthesized form.
pub fn subtree_pattern(project: &ProjectSection, dir: &str) -> String {
    format!("{}/**/*", join_forward(&project.src, dir))
}

/// Synthesize the glob set selecting a whole subtree of `src` (used for the
/// packaged-npm directory). The configured exclusions still apply.
pub fn subtree_globs(project: &ProjectSection, dir: &str) -> Vec<String> {
    let mut globs = vec![subtree_pattern(project, dir)];

    if let Some(exclude) = &project.exclude {
        globs.extend(exclude.as_slice().iter().cloned());
    }

    globs.retain(|g| !g.is_empty());
    globs
}

fn join_forward(base: &str, rest: &str) -> String {
    let joined = Path::new(base).join(rest);
    joined.to_string_lossy().replace('\\', "/")
}

/// A synthesized glob set compiled for matching: positive patterns in one
/// [`GlobSet`], `!`-negated patterns in another. A path matches when some
/// inclusion matches and no exclusion does.
#[derive(Debug)]
pub struct PatternSet {
    include: GlobSet,
    exclude: GlobSet,
}

impl PatternSet {
    /// Compile an ordered pattern list, splitting on the leading `!`.
    pub fn compile(patterns: &[String]) -> Result<Self> {
        let mut include = GlobSetBuilder::new();
        let mut exclude = GlobSetBuilder::new();

        for pattern in patterns {
            if let Some(negated) = pattern.strip_prefix('!') {
                exclude.add(
                    Glob::new(negated)
                        .with_context(|| format!("invalid glob pattern: {pattern}"))?,
                );
            } else {
                include.add(
                    Glob::new(pattern)
                        .with_context(|| format!("invalid glob pattern: {pattern}"))?,
                );
            }
        }

        Ok(Self {
            include: include.build()?,
            exclude: exclude.build()?,
        })
    }

    /// Returns true if the path (relative to the project root, forward
    /// slashes) is selected by this set.
    pub fn is_match(&self, path: &str) -> bool {
        self.include.is_match(path) && !self.exclude.is_match(path)
    }
}

/// Walk the source tree and collect every file selected by `patterns`.
///
/// Candidate paths are matched in the same form glob synthesis produced them:
/// rooted at the configured `src` string, forward slashes. The result is
/// sorted so repeated runs see an identical input order.
pub fn select_files(patterns: &[String], src_root: &str) -> Result<Vec<PathBuf>> {
    let set = PatternSet::compile(patterns)?;
    let mut files = Vec::new();

    for entry in WalkDir::new(src_root).follow_links(false) {
        let entry = match entry {
            Ok(e) => e,
            // A subtree vanishing mid-walk is routine under watch mode.
            Err(err) if err.io_error().is_some_and(is_not_found) => continue,
            Err(err) => {
                return Err(err).with_context(|| format!("walking source tree {src_root:?}"))
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let candidate = entry.path().to_string_lossy().replace('\\', "/");
        if set.is_match(&candidate) {
            files.push(entry.path().to_path_buf());
        }
    }

    files.sort();
    Ok(files)
}

fn is_not_found(err: &std::io::Error) -> bool {
    err.kind() == std::io::ErrorKind::NotFound
}

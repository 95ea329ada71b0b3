// src/tasks/mod.rs

//! The full task table.
//!
//! Each asset category contributes a one-shot build leaf and a `-watch`
//! leaf; composites group them into the user-facing entry points
//! (`compile`, `build`, `watch`, `dev`). The table is built once from the
//! configuration and validated before anything runs.

pub mod banner;
pub mod category;
pub mod clean;

use std::path::PathBuf;
use std::sync::Arc;

use crate::config::model::{CategorySection, ConfigFile};
use crate::errors::Result;
use crate::globs;
use crate::graph::registry::TaskRegistry;
use crate::pipeline::{
    GrassCompiler, PassthroughTransform, ScriptTransform, StyleTransform, Transform,
};
use crate::watch::WatchHub;

pub use banner::Banner;
pub use category::{run_category, CategoryBuild, CategorySpec, CategoryWatch};
pub use clean::{clean_dist, CleanTask, PROTECTED_FILES};

/// Names of the per-category build tasks, in the order `compile` runs them.
const COMPILE_GROUP: [&str; 8] = ["js", "wxs", "wxss", "wxml", "json", "image", "copy", "npm"];

/// Build the process-wide registry from a validated config.
pub fn register_all(config: &Arc<ConfigFile>, hub: &Arc<WatchHub>) -> Result<TaskRegistry> {
    let mut registry = TaskRegistry::new();

    for spec in category_specs(config) {
        let spec = Arc::new(spec);
        registry.leaf(
            spec.name,
            CategoryBuild::new(Arc::clone(config), Arc::clone(&spec)),
        );
        registry.watch_leaf(
            format!("{}-watch", spec.name),
            CategoryWatch::new(Arc::clone(config), Arc::clone(&spec), Arc::clone(hub)),
        );
    }

    // Script groups pair the typed and plain variants.
    registry.parallel("js", &["typescript", "javascript"]);
    registry.parallel("js-watch", &["typescript-watch", "javascript-watch"]);
    registry.parallel("wxs", &["wxts", "wxjs"]);
    registry.parallel("wxs-watch", &["wxts-watch", "wxjs-watch"]);

    registry.leaf("clean", CleanTask::new(Arc::clone(config)));

    registry.leaf("compile:start", Banner::new(banner::compile_start(config)));
    registry.leaf("compile:done", Banner::new(banner::compile_done()));
    registry.leaf("watch:started", Banner::new(banner::watch_started()));

    registry.parallel("compile:all", &COMPILE_GROUP);
    registry.series("compile", &["compile:start", "compile:all", "compile:done"]);
    registry.series("build", &["clean", "compile"]);

    let watch_group: Vec<String> = COMPILE_GROUP.iter().map(|n| format!("{n}-watch")).collect();
    let watch_refs: Vec<&str> = watch_group.iter().map(String::as_str).collect();
    registry.parallel("watch:all", &watch_refs);
    registry.series("watch", &["watch:all", "watch:started"]);

    registry.series("dev", &["build", "watch"]);

    registry.validate()?;
    Ok(registry)
}

/// The per-category table: name, glob set, buffering mode, transform.
fn category_specs(config: &ConfigFile) -> Vec<CategorySpec> {
    let project = &config.project;

    // The npm subtree belongs to the npm category alone; every
    // extension-driven category excludes it so no two tasks ever write the
    // same output path.
    let npm_exclude = format!("!{}", globs::subtree_pattern(project, &config.npm.dir));
    let ext_globs = |exts: &[String], include_assets: bool| -> Vec<String> {
        let mut patterns = globs::ext_globs(project, exts, include_assets);
        patterns.push(npm_exclude.clone());
        patterns
    };

    let style_include_paths: Vec<PathBuf> = config
        .style
        .include_paths
        .iter()
        .map(PathBuf::from)
        .collect();
    let style: Arc<dyn Transform> = Arc::new(StyleTransform::new(
        Arc::new(GrassCompiler),
        style_include_paths,
        config.style.source_map,
    ));

    let script = |section: &CategorySection| -> Arc<dyn Transform> {
        Arc::new(ScriptTransform::new(
            section.command.clone(),
            section.output_extension.clone(),
        ))
    };

    vec![
        CategorySpec {
            name: "typescript",
            patterns: ext_globs(&config.typescript.extensions, false),
            streamed: false,
            transform: script(&config.typescript),
        },
        CategorySpec {
            name: "javascript",
            patterns: ext_globs(&config.javascript.extensions, false),
            streamed: false,
            transform: script(&config.javascript),
        },
        CategorySpec {
            name: "wxts",
            patterns: ext_globs(&config.wxts.extensions, false),
            streamed: false,
            transform: script(&config.wxts),
        },
        CategorySpec {
            name: "wxjs",
            patterns: ext_globs(&config.wxjs.extensions, false),
            streamed: false,
            transform: script(&config.wxjs),
        },
        CategorySpec {
            name: "wxss",
            patterns: ext_globs(&config.style.extensions, false),
            streamed: false,
            transform: style,
        },
        CategorySpec {
            name: "wxml",
            patterns: ext_globs(&config.wxml.extensions, false),
            streamed: false,
            transform: Arc::new(PassthroughTransform),
        },
        CategorySpec {
            name: "json",
            patterns: ext_globs(&config.json.extensions, false),
            streamed: false,
            transform: Arc::new(PassthroughTransform),
        },
        CategorySpec {
            name: "image",
            patterns: ext_globs(&config.image.extensions, false),
            streamed: true,
            transform: Arc::new(PassthroughTransform),
        },
        // The copy category is the one place assets are included positively;
        // everywhere else the assets pattern lands as a negation.
        CategorySpec {
            name: "copy",
            patterns: ext_globs(&config.copy.extensions, true),
            streamed: true,
            transform: Arc::new(PassthroughTransform),
        },
        CategorySpec {
            name: "npm",
            patterns: globs::subtree_globs(project, &config.npm.dir),
            streamed: true,
            transform: Arc::new(PassthroughTransform),
        },
    ]
}

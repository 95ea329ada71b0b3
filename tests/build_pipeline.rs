use std::error::Error;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use mpbuild::config::load_and_validate;
use mpbuild::graph::GraphExecutor;
use mpbuild::tasks::register_all;
use mpbuild::watch::WatchHub;

type TestResult = Result<(), Box<dyn Error>>;

/// Lay down a small but representative project: styles (with a partial),
/// scripts, markup, manifests, assets, packaged npm output, and a dist tree
/// that already contains protected and stale files.
fn scaffold(root: &Path) -> TestResult {
    let src = root.join("src");
    fs::create_dir_all(src.join("pages/index"))?;
    fs::create_dir_all(src.join("assets"))?;
    fs::create_dir_all(src.join("miniprogram_npm/pkg"))?;

    fs::write(src.join("app.json"), r#"{"pages":["pages/index/index"]}"#)?;
    fs::write(src.join("app.scss"), "$c: red;\npage { color: $c; }\n")?;
    fs::write(src.join("base.wxss"), "page { width: 100%; }\n")?;
    fs::write(src.join("util.ts"), "export const n = 1;\n")?;
    fs::write(src.join("pages/index/index.wxml"), "<view>hi</view>")?;
    fs::write(src.join("pages/index/index.js"), "module.exports = 1;\n")?;
    fs::write(src.join("pages/index/index.scss"), "view { margin: 0; }\n")?;
    fs::write(src.join("pages/index/_helper.scss"), "$pad: 2px;\n")?;
    fs::write(src.join("assets/logo.png"), [0x89u8, 0x50, 0x4e, 0x47])?;
    fs::write(src.join("miniprogram_npm/pkg/index.js"), "exports.ok=1;\n")?;

    let dist = root.join("dist");
    fs::create_dir_all(dist.join("stale"))?;
    fs::write(dist.join("project.config.json"), r#"{"setting":{}}"#)?;
    fs::write(dist.join("stale/old.wxss"), "page {}")?;
    fs::write(dist.join("leftover.js"), "old")?;

    let config = format!(
        r#"
        [project]
        src = "{src}"
        dist = "{dist}"
        assets = "assets"
        "#,
        src = src.display(),
        dist = dist.display(),
    );
    fs::write(root.join("Mpbuild.toml"), config)?;
    Ok(())
}

async fn run_tasks(root: &Path, names: &[&str]) -> TestResult {
    let config = Arc::new(load_and_validate(root.join("Mpbuild.toml"))?);
    let hub = WatchHub::new(root, &config.project.src);
    let registry = Arc::new(register_all(&config, &hub)?);
    let executor = GraphExecutor::new(registry);

    let names: Vec<String> = names.iter().map(|n| n.to_string()).collect();
    executor.run_series(&names).await?;
    Ok(())
}

#[tokio::test]
async fn build_cleans_then_compiles_the_whole_tree() -> TestResult {
    let tmp = tempfile::tempdir()?;
    scaffold(tmp.path())?;
    let dist = tmp.path().join("dist");

    run_tasks(tmp.path(), &["build"]).await?;

    // Clean ran first: stale outputs are gone, protected files survived.
    assert!(!dist.join("stale").exists());
    assert!(!dist.join("leftover.js").exists());
    assert_eq!(
        fs::read_to_string(dist.join("project.config.json"))?,
        r#"{"setting":{}}"#
    );

    // Styles compiled and renamed; the partial was swallowed.
    let app_css = fs::read_to_string(dist.join("app.wxss"))?;
    assert!(app_css.contains("color: red"));
    assert!(fs::read_to_string(dist.join("base.wxss"))?.contains("width: 100%"));
    assert!(fs::read_to_string(dist.join("pages/index/index.wxss"))?.contains("margin: 0"));
    assert!(!dist.join("pages/index/_helper.wxss").exists());
    assert!(!dist.join("pages/index/_helper.scss").exists());

    // Scripts, markup, manifests, assets, npm output all landed.
    assert_eq!(
        fs::read_to_string(dist.join("pages/index/index.wxml"))?,
        "<view>hi</view>"
    );
    assert_eq!(
        fs::read_to_string(dist.join("pages/index/index.js"))?,
        "module.exports = 1;\n"
    );
    assert!(dist.join("app.json").exists());
    assert!(dist.join("util.js").exists(), "ts outputs renamed to js");
    assert!(dist.join("assets/logo.png").exists());
    assert!(dist.join("miniprogram_npm/pkg/index.js").exists());

    // Sources themselves never leak into dist.
    assert!(!dist.join("app.scss").exists());
    assert!(!dist.join("util.ts").exists());
    Ok(())
}

#[tokio::test]
async fn compile_is_idempotent_over_unchanged_sources() -> TestResult {
    let tmp = tempfile::tempdir()?;
    scaffold(tmp.path())?;
    let dist = tmp.path().join("dist");

    run_tasks(tmp.path(), &["compile"]).await?;
    let first = fs::read(dist.join("app.wxss"))?;
    let first_js = fs::read(dist.join("pages/index/index.js"))?;

    run_tasks(tmp.path(), &["compile"]).await?;
    assert_eq!(fs::read(dist.join("app.wxss"))?, first);
    assert_eq!(fs::read(dist.join("pages/index/index.js"))?, first_js);
    Ok(())
}

#[tokio::test]
async fn clean_task_alone_empties_the_destination() -> TestResult {
    let tmp = tempfile::tempdir()?;
    scaffold(tmp.path())?;
    let dist = tmp.path().join("dist");

    run_tasks(tmp.path(), &["clean"]).await?;

    assert!(dist.join("project.config.json").exists());
    assert!(!dist.join("stale").exists());
    assert!(!dist.join("leftover.js").exists());
    Ok(())
}

use std::error::Error;
use std::path::Path;

use mpbuild::tasks::{clean_dist, PROTECTED_FILES};

type TestResult = Result<(), Box<dyn Error>>;

fn populate(dist: &Path) -> std::io::Result<()> {
    std::fs::create_dir_all(dist.join("pages/index"))?;
    std::fs::write(dist.join("project.config.json"), "{}")?;
    std::fs::write(dist.join("app.json"), "{}")?;
    std::fs::write(dist.join("app.wxss"), "page {}")?;
    std::fs::write(dist.join("pages/index/index.wxml"), "<view/>")?;
    Ok(())
}

#[tokio::test]
async fn clean_keeps_protected_files_and_removes_the_rest() -> TestResult {
    let tmp = tempfile::tempdir()?;
    let dist = tmp.path().join("dist");
    populate(&dist)?;

    clean_dist(dist.to_str().unwrap()).await?;

    for protected in PROTECTED_FILES {
        assert!(dist.join(protected).exists(), "{protected} must survive");
    }
    assert!(!dist.join("app.wxss").exists());
    assert!(!dist.join("pages").exists());
    Ok(())
}

#[tokio::test]
async fn clean_succeeds_when_the_destination_is_missing() -> TestResult {
    let tmp = tempfile::tempdir()?;
    let dist = tmp.path().join("never-created");

    clean_dist(dist.to_str().unwrap()).await?;
    assert!(!dist.exists());
    Ok(())
}

#[tokio::test]
async fn clean_is_idempotent() -> TestResult {
    let tmp = tempfile::tempdir()?;
    let dist = tmp.path().join("dist");
    populate(&dist)?;

    clean_dist(dist.to_str().unwrap()).await?;
    clean_dist(dist.to_str().unwrap()).await?;

    for protected in PROTECTED_FILES {
        assert!(dist.join(protected).exists());
    }
    Ok(())
}

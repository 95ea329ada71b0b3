use std::error::Error;
use std::fs;
use std::path::PathBuf;

use mpbuild::globs::PatternSet;
use mpbuild::watch::WatchHub;

type TestResult = Result<(), Box<dyn Error>>;

fn style_patterns() -> PatternSet {
    PatternSet::compile(&[
        "src/**/*.{sass,scss}".to_string(),
        "!src/vendor/**".to_string(),
    ])
    .expect("patterns must compile")
}

#[test]
fn bursts_coalesce_into_a_single_pending_rebuild() -> TestResult {
    let tmp = tempfile::tempdir()?;
    fs::create_dir_all(tmp.path().join("src"))?;

    let hub = WatchHub::new(tmp.path(), tmp.path().join("src"));
    let mut rx = hub.subscribe("wxss", style_patterns())?;
    assert!(hub.armed());

    let changed = vec![tmp.path().join("src/app.scss")];
    hub.dispatch(&changed);
    hub.dispatch(&changed);
    hub.dispatch(&changed);

    // Exactly one ping pending, the rest were coalesced.
    assert!(rx.try_recv().is_ok());
    assert!(rx.try_recv().is_err());

    // Once consumed, the next change queues again.
    hub.dispatch(&changed);
    assert!(rx.try_recv().is_ok());
    Ok(())
}

#[test]
fn only_matching_subscribers_are_pinged() -> TestResult {
    let tmp = tempfile::tempdir()?;
    fs::create_dir_all(tmp.path().join("src"))?;

    let hub = WatchHub::new(tmp.path(), tmp.path().join("src"));
    let mut rx = hub.subscribe("wxss", style_patterns())?;

    hub.dispatch(&[tmp.path().join("src/pages/index.wxml")]);
    assert!(rx.try_recv().is_err(), "markup change must not ping styles");

    hub.dispatch(&[tmp.path().join("src/vendor/lib.scss")]);
    assert!(rx.try_recv().is_err(), "excluded path must not ping");

    hub.dispatch(&[tmp.path().join("src/pages/index.scss")]);
    assert!(rx.try_recv().is_ok());
    Ok(())
}

#[test]
fn events_outside_the_root_are_ignored() -> TestResult {
    let tmp = tempfile::tempdir()?;
    fs::create_dir_all(tmp.path().join("src"))?;

    let hub = WatchHub::new(tmp.path(), tmp.path().join("src"));
    let mut rx = hub.subscribe("wxss", style_patterns())?;

    hub.dispatch(&[PathBuf::from("/elsewhere/app.scss")]);
    assert!(rx.try_recv().is_err());
    Ok(())
}

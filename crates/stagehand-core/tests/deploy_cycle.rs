//! End-to-end deployment cycle behavior against a real temp filesystem.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use tempfile::TempDir;

use stagehand_core::{
    CacheController, DeployConfig, Deployer, InjectionEngine, InjectionError, ResourceScanner,
};

fn setup() -> (TempDir, DeployConfig) {
    let tmp = TempDir::new().unwrap();
    let config = DeployConfig::new(tmp.path().join("server"), tmp.path().join("extensions"));
    fs::create_dir_all(config.resources_dir()).unwrap();
    fs::create_dir_all(&config.extensions_root).unwrap();
    (tmp, config)
}

fn add_extension(config: &DeployConfig, name: &str, with_marker: bool, files: &[(&str, &str)]) {
    let payload = config.payload_dir(name);
    fs::create_dir_all(&payload).unwrap();
    if with_marker {
        fs::write(payload.join("__resource.lua"), "-- manifest").unwrap();
    }
    for (rel, contents) in files {
        let path = payload.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }
}

fn cache_children(cache_dir: &Path) -> BTreeSet<String> {
    fs::read_dir(cache_dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect()
}

#[tokio::test]
async fn cycle_deploys_only_marked_extensions() {
    let (_tmp, config) = setup();
    add_extension(&config, "a", true, &[("x.txt", "hello")]);
    add_extension(&config, "b", false, &[("ignored.txt", "nope")]);
    add_extension(&config, "c", true, &[("one.txt", "1"), ("two.txt", "2")]);

    let report = Deployer::new(config.clone()).run_cycle().await.unwrap();

    assert_eq!(report.eligible, 2);
    assert_eq!(report.injected, 2);

    let cache = config.cache_dir();
    assert_eq!(
        cache_children(&cache),
        BTreeSet::from(["a".to_string(), "c".to_string()])
    );
    assert_eq!(fs::read_to_string(cache.join("a/x.txt")).unwrap(), "hello");
    assert!(cache.join("c/one.txt").is_file());
    assert!(cache.join("c/two.txt").is_file());
    assert!(!cache.join("b").exists());
}

#[tokio::test]
async fn cycle_is_idempotent_for_unchanged_source_tree() {
    let (_tmp, config) = setup();
    add_extension(&config, "a", true, &[("x.txt", "x")]);
    add_extension(&config, "c", true, &[("deep/nested.txt", "n")]);

    let deployer = Deployer::new(config.clone());
    deployer.run_cycle().await.unwrap();
    let first = cache_children(&config.cache_dir());

    deployer.run_cycle().await.unwrap();
    let second = cache_children(&config.cache_dir());

    assert_eq!(first, second);
    assert_eq!(
        fs::read_to_string(config.cache_dir().join("c/deep/nested.txt")).unwrap(),
        "n"
    );
}

#[tokio::test]
async fn stale_cache_entries_are_wiped_by_the_next_cycle() {
    let (_tmp, config) = setup();
    add_extension(&config, "a", true, &[("x.txt", "x")]);

    let stale = config.cache_dir().join("old");
    fs::create_dir_all(&stale).unwrap();
    fs::write(stale.join("leftover.txt"), "stale").unwrap();

    Deployer::new(config.clone()).run_cycle().await.unwrap();

    let cache = config.cache_dir();
    assert!(!cache.join("old").exists());
    assert_eq!(cache_children(&cache), BTreeSet::from(["a".to_string()]));
}

#[tokio::test]
async fn removed_extension_disappears_on_the_next_cycle() {
    let (_tmp, config) = setup();
    add_extension(&config, "a", true, &[("x.txt", "x")]);
    add_extension(&config, "gone", true, &[("y.txt", "y")]);

    let deployer = Deployer::new(config.clone());
    deployer.run_cycle().await.unwrap();
    assert!(config.cache_dir().join("gone").is_dir());

    fs::remove_dir_all(config.extensions_root.join("gone")).unwrap();
    deployer.run_cycle().await.unwrap();

    assert_eq!(
        cache_children(&config.cache_dir()),
        BTreeSet::from(["a".to_string()])
    );
}

#[tokio::test]
async fn source_vanishing_mid_cycle_fails_that_extension_only() {
    let (_tmp, config) = setup();
    add_extension(&config, "stable", true, &[("x.txt", "x")]);
    add_extension(&config, "doomed", true, &[("y.txt", "y")]);

    // Drive the phases by hand so the source can vanish between scan and
    // inject, simulating a deletion mid-cycle.
    CacheController::new(config.clone()).reset().await.unwrap();
    let extensions = ResourceScanner::new(config.clone()).list().await.unwrap();
    assert_eq!(extensions.len(), 2);

    fs::remove_dir_all(config.extensions_root.join("doomed")).unwrap();

    let engine = InjectionEngine::new(config.clone(), Arc::new(AtomicBool::new(false)));
    let err = engine.inject(&extensions).await.unwrap_err();

    let InjectionError::Failed { failures } = err;
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].extension, "doomed");

    // The surviving extension is fully present.
    assert_eq!(
        fs::read_to_string(config.cache_dir().join("stable/x.txt")).unwrap(),
        "x"
    );
}

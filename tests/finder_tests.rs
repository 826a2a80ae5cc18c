//! Discovery integration tests
//!
//! These build small app trees in temp directories and run the public
//! discovery API over them.

use buildapps::buildsystem::cmake::{CMAKELISTS, PROJECT_LINE};
use buildapps::{
    find_apps, find_apps_recursive, parse_rules, AppRecord, BuildAppsConfig, BuildSystem,
    BuildSystemId, CMakeBuildSystem, ExcludeSet, FindOptions, Manifest, RunContext, ScanOptions,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

fn context() -> RunContext {
    RunContext::with_build_system(
        BuildAppsConfig::default(),
        Arc::new(CMakeBuildSystem::new(vec![
            "esp32".to_string(),
            "esp32s3".to_string(),
        ])),
    )
}

fn make_app(dir: &Path) {
    fs::create_dir_all(dir).unwrap();
    fs::write(
        dir.join(CMAKELISTS),
        format!("cmake_minimum_required(VERSION 3.16)\n{}\nproject(app)\n", PROJECT_LINE),
    )
    .unwrap();
}

fn dirs(apps: &[AppRecord]) -> Vec<PathBuf> {
    apps.iter().map(|a| a.directory.clone()).collect()
}

fn recursive(rules: &[&str]) -> FindOptions {
    FindOptions::new(ScanOptions::new("esp32", parse_rules(rules).unwrap())).recursive(true)
}

/// CMake detection that also records every directory it was asked about
struct ProbeBuildSystem {
    inner: CMakeBuildSystem,
    visited: Mutex<Vec<PathBuf>>,
}

impl BuildSystem for ProbeBuildSystem {
    fn id(&self) -> BuildSystemId {
        BuildSystemId::CMake
    }

    fn is_app(&self, directory: &Path) -> bool {
        self.visited.lock().unwrap().push(directory.to_path_buf());
        self.inner.is_app(directory)
    }

    fn enabled_targets(&self, directory: &Path) -> Vec<String> {
        self.inner.enabled_targets(directory)
    }
}

#[test]
fn test_discovery_is_repeatable() {
    let root = TempDir::new().unwrap();
    for name in ["zeta", "alpha", "mid/beta"] {
        let dir = root.path().join(name);
        make_app(&dir);
        fs::write(dir.join("sdkconfig.ci.one"), "").unwrap();
        fs::write(dir.join("sdkconfig.ci.two"), "").unwrap();
    }

    let ctx = context();
    let options = recursive(&["sdkconfig.ci.*="]);
    let first = find_apps(&ctx, &[root.path()], &options);
    let second = find_apps(&ctx, &[root.path()], &options);

    assert_eq!(first.len(), 6);
    assert_eq!(first, second);

    let mut sorted = first.clone();
    sorted.sort();
    assert_eq!(first, sorted);
}

#[test]
fn test_nested_apps_are_pruned() {
    let root = TempDir::new().unwrap();
    let outer = root.path().join("outer");
    make_app(&outer);
    make_app(&outer.join("inner"));
    make_app(&root.path().join("sibling"));

    let apps = find_apps(&context(), &[root.path()], &recursive(&[]));
    assert_eq!(dirs(&apps), vec![outer, root.path().join("sibling")]);
}

#[test]
fn test_excluded_directories_are_never_inspected() {
    let root = TempDir::new().unwrap();
    make_app(&root.path().join("keep/app"));
    make_app(&root.path().join("skip/app"));

    let probe = Arc::new(ProbeBuildSystem {
        inner: CMakeBuildSystem::new(vec!["esp32".to_string()]),
        visited: Mutex::new(Vec::new()),
    });
    let ctx = RunContext::with_build_system(BuildAppsConfig::default(), probe.clone());

    let skip = root.path().join("skip");
    let scan = ScanOptions::new("esp32", Vec::new());
    let apps = find_apps_recursive(&ctx, root.path(), &ExcludeSet::new([&skip]), &scan);

    assert_eq!(dirs(&apps), vec![root.path().join("keep/app")]);
    let visited = probe.visited.lock().unwrap();
    assert!(visited.iter().all(|d| !d.starts_with(&skip)));
    assert!(visited.contains(&root.path().join("keep")));
}

#[test]
fn test_exclude_paths_are_normalized() {
    let root = TempDir::new().unwrap();
    make_app(&root.path().join("a"));
    make_app(&root.path().join("b"));

    let options = recursive(&[]).exclude(ExcludeSet::new([root.path().join("x/../b/.")]));
    let apps = find_apps(&context(), &[root.path()], &options);
    assert_eq!(dirs(&apps), vec![root.path().join("a")]);
}

#[test]
fn test_non_recursive_only_checks_given_directory() {
    let root = TempDir::new().unwrap();
    make_app(&root.path().join("child"));

    let scan = ScanOptions::new("esp32", Vec::new());
    let options = FindOptions::new(scan.clone());
    assert!(find_apps(&context(), &[root.path()], &options).is_empty());

    let apps = find_apps(&context(), &[root.path().join("child")], &FindOptions::new(scan));
    assert_eq!(apps.len(), 1);
}

#[test]
fn test_overlapping_roots_are_deduplicated() {
    let root = TempDir::new().unwrap();
    make_app(&root.path().join("a"));
    make_app(&root.path().join("b"));

    let apps = find_apps(
        &context(),
        &[root.path().to_path_buf(), root.path().join("a"), root.path().to_path_buf()],
        &recursive(&[]),
    );
    assert_eq!(dirs(&apps), vec![root.path().join("a"), root.path().join("b")]);
}

#[test]
fn test_wildcard_names_and_default_fallback() {
    let root = TempDir::new().unwrap();
    let with_configs = root.path().join("with_configs");
    let without = root.path().join("without");
    make_app(&with_configs);
    make_app(&without);
    fs::write(with_configs.join("sdkconfig.ci.release"), "").unwrap();
    fs::write(with_configs.join("sdkconfig.ci.psram"), "").unwrap();

    let apps = find_apps(
        &context(),
        &[root.path()],
        &recursive(&["sdkconfig.ci.*=", "=default"]),
    );
    let summary: Vec<_> = apps
        .iter()
        .map(|a| {
            (
                a.directory.file_name().unwrap().to_string_lossy().to_string(),
                a.config_name.clone(),
                a.sdkconfig_path.clone(),
            )
        })
        .collect();

    assert_eq!(
        summary,
        vec![
            (
                "with_configs".to_string(),
                "psram".to_string(),
                Some(PathBuf::from("sdkconfig.ci.psram"))
            ),
            (
                "with_configs".to_string(),
                "release".to_string(),
                Some(PathBuf::from("sdkconfig.ci.release"))
            ),
            ("without".to_string(), "default".to_string(), None),
        ]
    );
}

#[test]
fn test_fragment_pinned_to_other_target_is_skipped() {
    let root = TempDir::new().unwrap();
    let app = root.path().join("app");
    make_app(&app);
    fs::write(app.join("sdkconfig.ci.s3"), "CONFIG_IDF_TARGET=\"esp32s3\"\n").unwrap();
    fs::write(app.join("sdkconfig.ci.any"), "CONFIG_FREERTOS_HZ=1000\n").unwrap();

    let apps = find_apps(&context(), &[root.path()], &recursive(&["sdkconfig.ci.*="]));
    let names: Vec<_> = apps.iter().map(|a| a.config_name.as_str()).collect();
    assert_eq!(names, vec!["any"]);
}

#[test]
fn test_readme_targets_filter_apps() {
    let root = TempDir::new().unwrap();
    let s3_only = root.path().join("s3_only");
    make_app(&s3_only);
    fs::write(
        s3_only.join("README.md"),
        "# Demo\n\n| Supported Targets | ESP32-S3 |\n| ----------------- | -------- |\n",
    )
    .unwrap();
    make_app(&root.path().join("any"));

    let apps = find_apps(&context(), &[root.path()], &recursive(&[]));
    assert_eq!(dirs(&apps), vec![root.path().join("any")]);

    let options =
        FindOptions::new(ScanOptions::new("esp32s3", Vec::new())).recursive(true);
    let apps = find_apps(&context(), &[root.path()], &options);
    assert_eq!(apps.len(), 2);
}

#[test]
fn test_manifest_overrides_declared_targets() {
    let root = TempDir::new().unwrap();
    make_app(&root.path().join("examples/blink"));
    make_app(&root.path().join("examples/wifi"));

    let manifest_path = root.path().join(".build-rules.yml");
    fs::write(
        &manifest_path,
        "examples/wifi:\n  disable: [esp32]\n  reason: radio not ready\n\
         examples/blink:\n  enable: [esp32c3]\n",
    )
    .unwrap();
    let ctx = context().with_manifest(Manifest::from_files(&[&manifest_path]).unwrap());

    let esp32 = find_apps(&ctx, &[root.path()], &recursive(&[]));
    assert!(esp32.is_empty());

    let options = FindOptions::new(ScanOptions::new("esp32c3", Vec::new())).recursive(true);
    let c3 = find_apps(&ctx, &[root.path()], &options);
    assert_eq!(
        dirs(&c3),
        vec![
            root.path().join("examples/blink"),
            root.path().join("examples/wifi")
        ]
    );
}

#[test]
fn test_context_from_build_system_id() {
    let root = TempDir::new().unwrap();
    make_app(&root.path().join("app"));

    let config = BuildAppsConfig {
        default_targets: vec!["esp32".to_string()],
        ..BuildAppsConfig::default()
    };
    let ctx = RunContext::new(config, BuildSystemId::CMake).unwrap();
    assert_eq!(find_apps(&ctx, &[root.path()], &recursive(&[])).len(), 1);
}

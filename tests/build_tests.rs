//! Build orchestration integration tests
//!
//! A recording build step stands in for the real driver so the tests can
//! check which apps each worker dispatches and in what order.

use buildapps::{
    build_apps, partition, AppRecord, AppTemplate, BuildError, BuildOptions, BuildStep, SetupError,
};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

struct RecordingStep {
    failing: HashSet<PathBuf>,
    built: Mutex<Vec<(usize, PathBuf)>>,
    sized: Mutex<Vec<PathBuf>>,
}

impl RecordingStep {
    fn new(failing: &[&str]) -> Self {
        Self {
            failing: failing.iter().map(|d| PathBuf::from(format!("/apps/{}", d))).collect(),
            built: Mutex::new(Vec::new()),
            sized: Mutex::new(Vec::new()),
        }
    }

    fn built_dirs(&self) -> Vec<String> {
        self.built
            .lock()
            .unwrap()
            .iter()
            .map(|(_, d)| d.file_name().unwrap().to_string_lossy().to_string())
            .collect()
    }
}

impl BuildStep for RecordingStep {
    fn build(&self, app: &AppRecord) -> Result<(), BuildError> {
        self.built
            .lock()
            .unwrap()
            .push((app.index.unwrap(), app.directory.clone()));

        if self.failing.contains(&app.directory) {
            return Err(BuildError::Failed {
                app: app.directory.display().to_string(),
                message: "ninja: build stopped: subcommand failed.".to_string(),
            });
        }
        Ok(())
    }

    fn collect_size_info(&self, app: &AppRecord, _destination: &Path) -> Result<(), BuildError> {
        self.sized.lock().unwrap().push(app.directory.clone());
        Ok(())
    }
}

fn apps(names: &[&str]) -> Vec<AppRecord> {
    let mut apps: Vec<AppRecord> = names
        .iter()
        .map(|n| {
            AppTemplate::default().instantiate(
                Path::new(&format!("/apps/{}", n)),
                "esp32",
                "",
                None,
            )
        })
        .collect();
    apps.sort();
    apps
}

#[test]
fn test_keep_going_attempts_every_app_and_collects_failures() {
    let step = RecordingStep::new(&["b", "d"]);
    let mut list = apps(&["a", "b", "c", "d", "e"]);

    let options = BuildOptions {
        keep_going: true,
        ..BuildOptions::default()
    };
    let report = build_apps(&mut list, &step, &options).unwrap();

    assert_eq!(step.built_dirs(), vec!["a", "b", "c", "d", "e"]);
    assert_eq!(report.attempted, 5);
    assert_eq!(report.succeeded, 3);
    let failed: Vec<_> = report.failed.iter().map(|a| a.directory.clone()).collect();
    assert_eq!(failed, vec![PathBuf::from("/apps/b"), PathBuf::from("/apps/d")]);
    assert_eq!(report.exit_code(), 1);
}

#[test]
fn test_fail_fast_stops_after_first_failure() {
    let step = RecordingStep::new(&["b", "d"]);
    let mut list = apps(&["a", "b", "c", "d", "e"]);

    let report = build_apps(&mut list, &step, &BuildOptions::default()).unwrap();

    assert_eq!(step.built_dirs(), vec!["a", "b"]);
    assert!(report.aborted);
    assert_eq!(report.exit_code(), 1);
}

#[test]
fn test_workers_cover_every_app_exactly_once() {
    let names: Vec<String> = (0..11).map(|i| format!("app{:02}", i)).collect();
    let refs: Vec<&str> = names.iter().map(String::as_str).collect();

    let mut seen = Vec::new();
    for index in 1..=4 {
        let step = RecordingStep::new(&[]);
        let mut list = apps(&refs);
        let options = BuildOptions {
            parallel_count: 4,
            parallel_index: index,
            ..BuildOptions::default()
        };
        let report = build_apps(&mut list, &step, &options).unwrap();
        assert!(report.is_success());

        let built = step.built.lock().unwrap().clone();
        let expected = partition(11, 4, index).unwrap();
        let indices: Vec<usize> = built.iter().map(|(i, _)| *i).collect();
        assert_eq!(indices, expected.collect::<Vec<_>>());
        seen.extend(built.into_iter().map(|(_, d)| d));
    }

    let all: Vec<PathBuf> = apps(&refs).into_iter().map(|a| a.directory).collect();
    assert_eq!(seen, all);
}

#[test]
fn test_more_workers_than_apps() {
    let step = RecordingStep::new(&[]);
    let mut list = apps(&["a", "b"]);
    let options = BuildOptions {
        parallel_count: 5,
        parallel_index: 4,
        ..BuildOptions::default()
    };

    let report = build_apps(&mut list, &step, &options).unwrap();
    assert_eq!(report.attempted, 0);
    assert!(report.is_success());
    assert!(step.built_dirs().is_empty());
}

#[test]
fn test_invalid_parallel_index_is_setup_error() {
    let step = RecordingStep::new(&[]);
    let mut list = apps(&["a"]);
    let options = BuildOptions {
        parallel_count: 2,
        parallel_index: 0,
        ..BuildOptions::default()
    };

    let result = build_apps(&mut list, &step, &options);
    assert!(matches!(result, Err(SetupError::InvalidPartition { index: 0, count: 2 })));
    assert!(step.built_dirs().is_empty());
}

#[test]
fn test_size_info_only_for_successful_builds() {
    let step = RecordingStep::new(&["b"]);
    let mut list = apps(&["a", "b", "c"]);
    let options = BuildOptions {
        keep_going: true,
        collect_size_info: Some(PathBuf::from("/tmp/size_info.txt")),
        ..BuildOptions::default()
    };

    build_apps(&mut list, &step, &options).unwrap();
    assert_eq!(
        *step.sized.lock().unwrap(),
        vec![PathBuf::from("/apps/a"), PathBuf::from("/apps/c")]
    );
}

//! Sequential build loop over one worker's partition

use super::{partition, BuildStep};
use crate::app::AppRecord;
use crate::error::SetupError;
use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, error, info};

#[derive(Debug, Clone)]
pub struct BuildOptions {
    pub parallel_count: usize,
    /// 1-based
    pub parallel_index: usize,
    pub dry_run: bool,
    pub keep_going: bool,
    pub verbose: bool,
    /// File receiving one size-info line per built app
    pub collect_size_info: Option<PathBuf>,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            parallel_count: 1,
            parallel_index: 1,
            dry_run: false,
            keep_going: false,
            verbose: false,
            collect_size_info: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BuildReport {
    pub total: usize,
    pub start: usize,
    pub stop: usize,
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: Vec<AppRecord>,
    /// Fail-fast stopped the loop before the partition was finished
    pub aborted: bool,
}

impl BuildReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty() && !self.aborted
    }

    pub fn exit_code(&self) -> i32 {
        if self.is_success() {
            0
        } else {
            1
        }
    }
}

/// Builds this worker's slice of `apps`, which must already be sorted.
///
/// Without `keep_going` the loop stops at the first failure and the
/// remaining apps of the slice are never attempted.
pub fn build_apps(
    apps: &mut [AppRecord],
    step: &dyn BuildStep,
    options: &BuildOptions,
) -> Result<BuildReport, SetupError> {
    let range = partition(apps.len(), options.parallel_count, options.parallel_index)?;
    let started = Instant::now();

    info!(
        total = apps.len(),
        first = range.start + 1,
        last = range.end,
        "Running build for apps in partition"
    );

    let mut report = BuildReport {
        total: apps.len(),
        start: range.start,
        stop: range.end,
        ..BuildReport::default()
    };

    for (index, app) in apps[range.clone()].iter_mut().enumerate() {
        let index = range.start + index;
        app.dry_run = options.dry_run;
        app.index = Some(index);
        app.verbose = options.verbose;
        let app = &*app;

        debug!(index, app = %app, "Building app");
        report.attempted += 1;

        let result = step.build(app).and_then(|()| match &options.collect_size_info {
            Some(destination) => step.collect_size_info(app, destination),
            None => Ok(()),
        });

        match result {
            Ok(()) => report.succeeded += 1,
            Err(e) => {
                error!(index, error = %e, "Build failed");
                report.failed.push(app.clone());
                if !options.keep_going {
                    report.aborted = true;
                    break;
                }
            }
        }
    }

    info!(
        attempted = report.attempted,
        succeeded = report.succeeded,
        failed = report.failed.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Build finished"
    );

    Ok(report)
}

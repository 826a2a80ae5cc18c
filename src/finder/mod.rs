//! App discovery
//!
//! [`find_apps`] is the entry point: it discovers apps under each root path,
//! then sorts and deduplicates the combined list so that every worker of a
//! partitioned build sees the same sequence.
//!
//! In recursive mode the tree is walked top-down in file name order. A
//! directory that yields apps is not descended into, so an app nested inside
//! another app's directory is never reported. Excluded directories are
//! neither scanned nor descended into.

mod scanner;

pub use scanner::{scan_directory, ScanOptions};

use crate::app::AppRecord;
use crate::context::RunContext;
use crate::util::paths::normalize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Directories skipped during a recursive walk, stored normalized
#[derive(Debug, Clone, Default)]
pub struct ExcludeSet {
    paths: HashSet<PathBuf>,
}

impl ExcludeSet {
    pub fn new<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        Self {
            paths: paths.into_iter().map(|p| normalize(p.as_ref())).collect(),
        }
    }

    pub fn contains(&self, path: &Path) -> bool {
        !self.paths.is_empty() && self.paths.contains(&normalize(path))
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct FindOptions {
    pub recursive: bool,
    pub exclude: ExcludeSet,
    pub scan: ScanOptions,
}

impl FindOptions {
    pub fn new(scan: ScanOptions) -> Self {
        Self {
            recursive: false,
            exclude: ExcludeSet::default(),
            scan,
        }
    }

    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    pub fn exclude(mut self, exclude: ExcludeSet) -> Self {
        self.exclude = exclude;
        self
    }
}

/// Walks `root` collecting apps, in discovery order
pub fn find_apps_recursive(
    ctx: &RunContext,
    root: &Path,
    exclude: &ExcludeSet,
    scan: &ScanOptions,
) -> Vec<AppRecord> {
    let mut apps = Vec::new();
    let mut walker = WalkDir::new(root).sort_by_file_name().into_iter();

    while let Some(result) = walker.next() {
        let entry = match result {
            Ok(e) => e,
            Err(err) => {
                warn!(error = %err, "Failed to read directory entry");
                continue;
            }
        };

        if !entry.file_type().is_dir() {
            continue;
        }

        let dir = entry.path();
        debug!(path = %dir.display(), "Entering directory");

        if exclude.contains(dir) {
            debug!(path = %dir.display(), "Skipping excluded directory");
            walker.skip_current_dir();
            continue;
        }

        let found = scan_directory(ctx, dir, scan);
        if !found.is_empty() {
            debug!(
                path = %dir.display(),
                apps = found.len(),
                "Not descending into app directory"
            );
            walker.skip_current_dir();
            apps.extend(found);
        }
    }

    apps
}

/// Apps under a single root, recursively or not
pub fn find_apps_in(ctx: &RunContext, path: &Path, options: &FindOptions) -> Vec<AppRecord> {
    debug!(
        build_system = %ctx.build_system().id(),
        path = %path.display(),
        recursive = options.recursive,
        "Looking for apps"
    );

    if !options.recursive {
        if !options.exclude.is_empty() {
            warn!("--exclude is ignored when used without --recursive");
        }
        return scan_directory(ctx, path, &options.scan);
    }

    find_apps_recursive(ctx, path, &options.exclude, &options.scan)
}

/// Apps under every root, sorted and deduplicated
pub fn find_apps<P: AsRef<Path>>(
    ctx: &RunContext,
    paths: &[P],
    options: &FindOptions,
) -> Vec<AppRecord> {
    let mut apps: Vec<AppRecord> = paths
        .iter()
        .flat_map(|p| find_apps_in(ctx, p.as_ref(), options))
        .collect();

    apps.sort();
    apps.dedup();

    info!(count = apps.len(), target = %options.scan.target, "Found apps");
    apps
}

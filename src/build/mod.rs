//! Building a partition of the discovered apps
//!
//! The orchestrator only sequences builds; the work for one app is behind
//! [`BuildStep`]. [`IdfBuilder`] is the implementation driving `idf.py`.

mod idf;
mod orchestrator;
mod partition;
mod warnings;

pub use idf::IdfBuilder;
pub use orchestrator::{build_apps, BuildOptions, BuildReport};
pub use partition::partition;
pub use warnings::find_warnings;

use crate::app::AppRecord;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Build failed for {app}: {message}")]
    Failed { app: String, message: String },

    #[error("Build succeeded for {app} with {count} warning(s), first: {first}")]
    Warnings {
        app: String,
        count: usize,
        first: String,
    },

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to collect size info for {app}: {message}")]
    SizeInfo { app: String, message: String },
}

impl BuildError {
    pub fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Builds one app
#[cfg_attr(test, mockall::automock)]
pub trait BuildStep {
    fn build(&self, app: &AppRecord) -> Result<(), BuildError>;

    /// Records size information for a built app into `destination`
    fn collect_size_info(&self, app: &AppRecord, destination: &Path) -> Result<(), BuildError>;
}

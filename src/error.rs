//! Setup errors
//!
//! Everything here is fatal and raised before the first build is attempted.
//! Per-directory discovery problems never surface as errors, and per-app
//! build failures use [`crate::build::BuildError`].

use crate::app::UnsupportedBuildSystem;
use crate::manifest::ManifestError;
use crate::rules::RuleError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SetupError {
    #[error(transparent)]
    InvalidRule(#[from] RuleError),

    #[error(transparent)]
    UnsupportedBuildSystem(#[from] UnsupportedBuildSystem),

    #[error("Invalid partition: parallel index {index} is outside 1..={count}")]
    InvalidPartition { index: usize, count: usize },

    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error("Invalid ignore-warning pattern '{pattern}': {source}")]
    InvalidWarningPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Failed to read ignore-warning file {path}: {source}")]
    WarningFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

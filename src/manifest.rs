//! Manifest files: per-folder target enablement overrides
//!
//! ```yaml
//! examples/get-started/blink:
//!   enable: [esp32, esp32s3]
//! examples/wifi:
//!   disable: [esp32h2]
//!   reason: no radio
//! ```
//!
//! Folders are relative to the manifest file's directory. Several files are
//! merged by set union of their rules.

use crate::util::paths::normalize;
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("Failed to read manifest file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse manifest file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Outcome of asking the manifest about a (directory, target) pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestDecision {
    Enabled,
    Disabled,
    /// No rule covers the directory; the build system decides.
    NotCovered,
}

#[derive(Debug, Default, Deserialize)]
struct FolderRuleEntry {
    #[serde(default)]
    enable: Option<Vec<String>>,
    #[serde(default)]
    disable: Vec<String>,
    #[serde(default)]
    reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FolderRule {
    pub folder: PathBuf,
    pub enable: Option<BTreeSet<String>>,
    pub disable: BTreeSet<String>,
    pub reason: Option<String>,
}

impl FolderRule {
    fn depth(&self) -> usize {
        self.folder.components().count()
    }

    fn disables(&self, target: &str) -> bool {
        self.disable.contains(target)
            || self
                .enable
                .as_ref()
                .map_or(false, |enabled| !enabled.contains(target))
    }
}

#[derive(Debug, Clone, Default)]
pub struct Manifest {
    rules: BTreeSet<FolderRule>,
}

impl Manifest {
    pub fn new(rules: impl IntoIterator<Item = FolderRule>) -> Self {
        Self {
            rules: rules.into_iter().collect(),
        }
    }

    /// Parses manifest YAML; folders are resolved against `base`
    pub fn parse(content: &str, base: &Path, origin: &Path) -> Result<Self, ManifestError> {
        let entries: BTreeMap<String, Option<FolderRuleEntry>> =
            serde_yaml::from_str(content).map_err(|source| ManifestError::Parse {
                path: origin.to_path_buf(),
                source,
            })?;

        let rules = entries.into_iter().map(|(folder, entry)| {
            let entry = entry.unwrap_or_default();
            FolderRule {
                folder: normalize(&base.join(folder)),
                enable: entry.enable.map(|targets| targets.into_iter().collect()),
                disable: entry.disable.into_iter().collect(),
                reason: entry.reason,
            }
        });

        Ok(Self::new(rules))
    }

    pub fn from_file(path: &Path) -> Result<Self, ManifestError> {
        let content = fs::read_to_string(path).map_err(|source| ManifestError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        Self::parse(&content, base, path)
    }

    /// Loads and merges several manifest files
    pub fn from_files<P: AsRef<Path>>(paths: &[P]) -> Result<Self, ManifestError> {
        let mut merged = Self::default();
        for path in paths {
            let path = path.as_ref();
            info!(path = %path.display(), "Loading manifest file");
            merged.merge(Self::from_file(path)?);
        }
        Ok(merged)
    }

    pub fn merge(&mut self, other: Manifest) {
        self.rules.extend(other.rules);
    }

    pub fn rules(&self) -> impl Iterator<Item = &FolderRule> {
        self.rules.iter()
    }

    /// Decides enablement using the deepest folder rules containing
    /// `directory`. Any of them disabling the target wins.
    pub fn applies_to(&self, directory: &Path, target: &str) -> ManifestDecision {
        let directory = normalize(directory);
        let covering: Vec<&FolderRule> = self
            .rules
            .iter()
            .filter(|rule| directory.starts_with(&rule.folder))
            .collect();

        let Some(deepest) = covering.iter().map(|rule| rule.depth()).max() else {
            return ManifestDecision::NotCovered;
        };

        let disabled_by = covering
            .iter()
            .filter(|rule| rule.depth() == deepest)
            .find(|rule| rule.disables(target));

        match disabled_by {
            Some(rule) => {
                debug!(
                    path = %directory.display(),
                    target,
                    reason = rule.reason.as_deref().unwrap_or(""),
                    "Target disabled by manifest"
                );
                ManifestDecision::Disabled
            }
            None => ManifestDecision::Enabled,
        }
    }
}

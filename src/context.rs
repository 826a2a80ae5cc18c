//! Per-invocation run context
//!
//! Built once at the entry point and passed by reference to discovery and
//! build. Holds the resolved build system, the merged manifest and the
//! compiled ignore-warning patterns.

use crate::app::BuildSystemId;
use crate::buildsystem::{BuildSystem, BuildSystemRegistry};
use crate::config::BuildAppsConfig;
use crate::error::SetupError;
use crate::manifest::{Manifest, ManifestDecision};
use regex::Regex;
use std::fs;
use std::path::Path;
use std::sync::Arc;

pub struct RunContext {
    pub config: BuildAppsConfig,
    build_system: Arc<dyn BuildSystem>,
    manifest: Option<Manifest>,
    ignore_warnings: Vec<Regex>,
}

impl RunContext {
    pub fn new(config: BuildAppsConfig, build_system: BuildSystemId) -> Result<Self, SetupError> {
        let registry = BuildSystemRegistry::with_defaults(&config.default_targets);
        let build_system = registry.get(build_system).ok_or_else(|| {
            SetupError::UnsupportedBuildSystem(crate::app::UnsupportedBuildSystem(
                build_system.to_string(),
            ))
        })?;
        Ok(Self::with_build_system(config, build_system))
    }

    pub fn with_build_system(config: BuildAppsConfig, build_system: Arc<dyn BuildSystem>) -> Self {
        Self {
            config,
            build_system,
            manifest: None,
            ignore_warnings: Vec::new(),
        }
    }

    pub fn with_manifest(mut self, manifest: Manifest) -> Self {
        self.manifest = Some(manifest);
        self
    }

    pub fn with_ignore_warnings(mut self, patterns: Vec<Regex>) -> Self {
        self.ignore_warnings = patterns;
        self
    }

    pub fn build_system(&self) -> &dyn BuildSystem {
        self.build_system.as_ref()
    }

    pub fn manifest(&self) -> Option<&Manifest> {
        self.manifest.as_ref()
    }

    pub fn ignore_warnings(&self) -> &[Regex] {
        &self.ignore_warnings
    }

    /// Whether `target` may be built in `directory`. The manifest decides
    /// when it covers the directory, otherwise the build system's declared
    /// targets do.
    pub fn target_enabled(&self, directory: &Path, target: &str) -> bool {
        let decision = self
            .manifest
            .as_ref()
            .map_or(ManifestDecision::NotCovered, |m| m.applies_to(directory, target));

        match decision {
            ManifestDecision::Enabled => true,
            ManifestDecision::Disabled => false,
            ManifestDecision::NotCovered => self
                .build_system
                .enabled_targets(directory)
                .iter()
                .any(|t| t == target),
        }
    }
}

/// Compiles ignore-warning patterns: literal strings are escaped, file lines
/// are taken as regexes.
pub fn compile_ignore_warnings(
    literals: &[String],
    file: Option<&Path>,
) -> Result<Vec<Regex>, SetupError> {
    let mut patterns: Vec<String> = literals.iter().map(|s| regex::escape(s)).collect();

    if let Some(path) = file {
        let content = fs::read_to_string(path).map_err(|source| SetupError::WarningFile {
            path: path.to_path_buf(),
            source,
        })?;
        patterns.extend(
            content
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(String::from),
        );
    }

    patterns
        .into_iter()
        .map(|pattern| {
            Regex::new(&pattern)
                .map_err(|source| SetupError::InvalidWarningPattern { pattern, source })
        })
        .collect()
}

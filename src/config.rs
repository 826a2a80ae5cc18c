//! Configuration management for buildapps
//!
//! Settings are loaded from environment variables with defaults. Command line
//! arguments take precedence over these where both exist.
//!
//! # Environment Variables
//!
//! - `BUILDAPPS_IDF_PY`: build driver executable - default: "idf.py"
//! - `BUILDAPPS_DEFAULT_TARGETS`: comma separated targets assumed for apps
//!   that declare none - default: all ESP32 family targets
//! - `BUILDAPPS_BUILD_DIR`: default build directory template - default: "build"
//!
//! Logging is configured separately by `util::logging::config_from_env`.
//!
//! # Example
//!
//! ```no_run
//! use buildapps::BuildAppsConfig;
//!
//! let config = BuildAppsConfig::default();
//! config.validate().expect("Invalid configuration");
//! ```

use std::env;
use thiserror::Error;

const DEFAULT_IDF_PY: &str = "idf.py";
const DEFAULT_BUILD_DIR: &str = "build";
const DEFAULT_TARGETS: &[&str] = &[
    "esp32", "esp32s2", "esp32s3", "esp32c2", "esp32c3", "esp32c6", "esp32h2", "esp32p4",
];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),

    #[error("Failed to parse {field}: {error}")]
    ParseError { field: String, error: String },
}

#[derive(Debug, Clone)]
pub struct BuildAppsConfig {
    /// Executable driving a single app build
    pub idf_py: String,

    /// Targets assumed when an app declares no supported targets
    pub default_targets: Vec<String>,

    /// Build directory template used when none is given
    pub build_dir: String,
}

impl Default for BuildAppsConfig {
    /// Loads from `BUILDAPPS_*` environment variables, falling back to
    /// defaults for anything unset.
    fn default() -> Self {
        let idf_py = env::var("BUILDAPPS_IDF_PY").unwrap_or_else(|_| DEFAULT_IDF_PY.to_string());

        let default_targets = env::var("BUILDAPPS_DEFAULT_TARGETS")
            .ok()
            .map(|v| parse_target_list(&v))
            .unwrap_or_else(|| DEFAULT_TARGETS.iter().map(|t| t.to_string()).collect());

        let build_dir =
            env::var("BUILDAPPS_BUILD_DIR").unwrap_or_else(|_| DEFAULT_BUILD_DIR.to_string());

        Self {
            idf_py,
            default_targets,
            build_dir,
        }
    }
}

impl BuildAppsConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.idf_py.trim().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "Build driver executable must not be empty".to_string(),
            ));
        }

        if self.default_targets.is_empty() {
            return Err(ConfigError::ParseError {
                field: "BUILDAPPS_DEFAULT_TARGETS".to_string(),
                error: "no targets listed".to_string(),
            });
        }

        if self.build_dir.trim().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "Build directory must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}

fn parse_target_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

//! App records: one (directory, target, config variant) build unit

mod template;

pub use template::expand_placeholders;

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Unsupported build system: {0}. Valid options: cmake")]
pub struct UnsupportedBuildSystem(pub String);

/// Build system discriminator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildSystemId {
    CMake,
}

impl BuildSystemId {
    pub fn name(&self) -> &'static str {
        match self {
            Self::CMake => "cmake",
        }
    }
}

impl fmt::Display for BuildSystemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BuildSystemId {
    type Err = UnsupportedBuildSystem;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cmake" => Ok(Self::CMake),
            _ => Err(UnsupportedBuildSystem(s.to_string())),
        }
    }
}

/// One buildable unit found by the scanner.
///
/// Identity is `(directory, target, config_name, sdkconfig_path)`; the other
/// fields describe how to build it and do not take part in equality or
/// ordering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppRecord {
    pub directory: PathBuf,
    pub target: String,
    pub build_system: BuildSystemId,
    pub config_name: String,
    /// Relative to `directory`; `None` means the default sdkconfig.
    pub sdkconfig_path: Option<PathBuf>,

    pub work_dir: Option<String>,
    pub build_dir: String,
    pub build_log_path: Option<String>,
    pub size_json_path: Option<String>,
    pub preserve: bool,
    pub check_warnings: bool,

    // Set by the orchestrator right before dispatch
    #[serde(skip)]
    pub dry_run: bool,
    #[serde(skip)]
    pub index: Option<usize>,
    #[serde(skip)]
    pub verbose: bool,
}

impl AppRecord {
    fn identity(&self) -> (&Path, &str, &str, Option<&Path>) {
        (
            &self.directory,
            &self.target,
            &self.config_name,
            self.sdkconfig_path.as_deref(),
        )
    }

    /// Resolves `@` placeholders in a path template for this app
    pub fn expand(&self, template: &str) -> String {
        expand_placeholders(template, self)
    }

    /// Directory the build runs in; the app directory unless a work dir
    /// template was given.
    pub fn work_path(&self) -> PathBuf {
        match &self.work_dir {
            Some(t) => PathBuf::from(self.expand(t)),
            None => self.directory.clone(),
        }
    }

    /// Build directory, relative templates resolved against the work dir
    pub fn build_path(&self) -> PathBuf {
        let build = PathBuf::from(self.expand(&self.build_dir));
        if build.is_absolute() {
            build
        } else {
            self.work_path().join(build)
        }
    }

    pub fn build_log(&self) -> Option<PathBuf> {
        self.build_log_path
            .as_deref()
            .map(|t| PathBuf::from(self.expand(t)))
    }

    /// Size report destination, `size.json` in the build dir by default
    pub fn size_json(&self) -> PathBuf {
        match &self.size_json_path {
            Some(t) => {
                let path = PathBuf::from(self.expand(t));
                if path.is_absolute() {
                    path
                } else {
                    self.build_path().join(path)
                }
            }
            None => self.build_path().join("size.json"),
        }
    }

    /// Absolute sdkconfig fragment path, if this app uses one
    pub fn sdkconfig_file(&self) -> Option<PathBuf> {
        self.sdkconfig_path
            .as_ref()
            .map(|p| self.directory.join(p))
    }
}

impl PartialEq for AppRecord {
    fn eq(&self, other: &Self) -> bool {
        self.identity() == other.identity()
    }
}

impl Eq for AppRecord {}

impl Hash for AppRecord {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identity().hash(state);
    }
}

impl Ord for AppRecord {
    fn cmp(&self, other: &Self) -> Ordering {
        self.identity().cmp(&other.identity())
    }
}

impl PartialOrd for AppRecord {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for AppRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}) App {}, target {}, sdkconfig {}, build in {}",
            self.build_system,
            self.directory.display(),
            self.target,
            self.sdkconfig_path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "(default)".to_string()),
            self.build_path().display(),
        )
    }
}

/// Builder-style constructor used by the scanner and tests
#[derive(Debug, Clone)]
pub struct AppTemplate {
    pub build_system: BuildSystemId,
    pub work_dir: Option<String>,
    pub build_dir: String,
    pub build_log_path: Option<String>,
    pub size_json_path: Option<String>,
    pub preserve: bool,
    pub check_warnings: bool,
}

impl Default for AppTemplate {
    fn default() -> Self {
        Self {
            build_system: BuildSystemId::CMake,
            work_dir: None,
            build_dir: "build".to_string(),
            build_log_path: None,
            size_json_path: None,
            preserve: true,
            check_warnings: false,
        }
    }
}

impl AppTemplate {
    pub fn instantiate(
        &self,
        directory: &Path,
        target: &str,
        config_name: &str,
        sdkconfig_path: Option<PathBuf>,
    ) -> AppRecord {
        AppRecord {
            directory: directory.to_path_buf(),
            target: target.to_string(),
            build_system: self.build_system,
            config_name: config_name.to_string(),
            sdkconfig_path,
            work_dir: self.work_dir.clone(),
            build_dir: self.build_dir.clone(),
            build_log_path: self.build_log_path.clone(),
            size_json_path: self.size_json_path.clone(),
            preserve: self.preserve,
            check_warnings: self.check_warnings,
            dry_run: false,
            index: None,
            verbose: false,
        }
    }
}

//! buildapps - find and build firmware apps across a source tree
//!
//! Discovery walks one or more root directories looking for app directories
//! (for CMake, a `CMakeLists.txt` including the IDF project file). Each app
//! directory is expanded into one record per sdkconfig variant using
//! [`ConfigRule`]s, filtered by target through the build system's declared
//! targets or a [`Manifest`], and the sorted list is split into partitions so
//! several CI workers can build it without coordinating.
//!
//! # Example Usage
//!
//! ```no_run
//! use buildapps::{
//!     build_apps, find_apps, parse_rules, BuildAppsConfig, BuildOptions, BuildSystemId,
//!     FindOptions, IdfBuilder, RunContext, ScanOptions,
//! };
//!
//! # fn main() -> anyhow::Result<()> {
//! let ctx = RunContext::new(BuildAppsConfig::default(), BuildSystemId::CMake)?;
//! let rules = parse_rules(["sdkconfig.ci.*="])?;
//! let options = FindOptions::new(ScanOptions::new("esp32", rules)).recursive(true);
//!
//! let mut apps = find_apps(&ctx, &["examples"], &options);
//! let report = build_apps(&mut apps, &IdfBuilder::from_context(&ctx), &BuildOptions::default())?;
//! println!("{} failed", report.failed.len());
//! # Ok(())
//! # }
//! ```
//!
//! # Project Structure
//!
//! - [`rules`]: config rule parsing and wildcard naming
//! - [`finder`]: directory scanning and the recursive walk
//! - [`build`]: partitioning, the build loop and the `idf.py` build step
//! - [`buildsystem`], [`manifest`], [`sdkconfig`]: collaborators consulted
//!   during discovery

pub mod app;
pub mod build;
pub mod buildsystem;
pub mod cli;
pub mod config;
pub mod context;
pub mod error;
pub mod finder;
pub mod manifest;
pub mod rules;
pub mod sdkconfig;
pub mod util;

pub use app::{AppRecord, AppTemplate, BuildSystemId};
pub use build::{build_apps, partition, BuildError, BuildOptions, BuildReport, BuildStep, IdfBuilder};
pub use buildsystem::{BuildSystem, BuildSystemRegistry, CMakeBuildSystem};
pub use config::{BuildAppsConfig, ConfigError};
pub use context::RunContext;
pub use error::SetupError;
pub use finder::{find_apps, find_apps_recursive, scan_directory, ExcludeSet, FindOptions, ScanOptions};
pub use manifest::{Manifest, ManifestDecision, ManifestError};
pub use rules::{parse_rules, ConfigRule, RuleError};
pub use util::{config_from_env, init_logging, LoggingConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

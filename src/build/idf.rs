//! `idf.py` driven build step

use super::{find_warnings, BuildError, BuildStep};
use crate::app::AppRecord;
use crate::context::RunContext;
use regex::Regex;
use serde::Serialize;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

const SDKCONFIG: &str = "sdkconfig";
const SDKCONFIG_DEFAULTS: &str = "sdkconfig.defaults";

#[derive(Debug, Serialize)]
struct SizeInfoLine<'a> {
    app_dir: &'a Path,
    target: &'a str,
    config_name: &'a str,
    path: &'a Path,
}

pub struct IdfBuilder {
    idf_py: String,
    ignore_warnings: Vec<Regex>,
    collects_size: bool,
}

impl IdfBuilder {
    pub fn new(idf_py: impl Into<String>) -> Self {
        Self {
            idf_py: idf_py.into(),
            ignore_warnings: Vec::new(),
            collects_size: false,
        }
    }

    pub fn from_context(ctx: &RunContext) -> Self {
        Self::new(ctx.config.idf_py.clone()).with_ignore_warnings(ctx.ignore_warnings().to_vec())
    }

    pub fn with_ignore_warnings(mut self, patterns: Vec<Regex>) -> Self {
        self.ignore_warnings = patterns;
        self
    }

    /// Size info will be collected after each build, so non-preserved build
    /// directories are cleaned up after collection instead of after build.
    pub fn with_size_collection(mut self, enabled: bool) -> Self {
        self.collects_size = enabled;
        self
    }

    /// Arguments passed to the build driver for `app`
    pub fn build_args(&self, app: &AppRecord) -> Vec<String> {
        let work = app.work_path();
        let mut args = vec![
            "-B".to_string(),
            app.build_path().display().to_string(),
            "-C".to_string(),
            work.display().to_string(),
            format!("-DIDF_TARGET={}", app.target),
        ];

        if let Some(fragment) = &app.sdkconfig_path {
            let mut defaults = Vec::new();
            if app.directory.join(SDKCONFIG_DEFAULTS).is_file() {
                defaults.push(work.join(SDKCONFIG_DEFAULTS).display().to_string());
            }
            defaults.push(work.join(fragment).display().to_string());
            args.push(format!("-DSDKCONFIG_DEFAULTS={}", defaults.join(";")));
        }

        if app.verbose {
            args.push("-v".to_string());
        }
        args.push("build".to_string());
        args
    }

    fn run(&self, app: &AppRecord, args: &[String]) -> Result<String, BuildError> {
        let mut command = Command::new(&self.idf_py);
        command.args(args);

        let failed = |message: String| BuildError::Failed {
            app: app.directory.display().to_string(),
            message,
        };

        match app.build_log() {
            Some(log) => {
                if let Some(parent) = log.parent() {
                    fs::create_dir_all(parent).map_err(|e| BuildError::io(parent, e))?;
                }
                let stdout = fs::File::create(&log).map_err(|e| BuildError::io(&log, e))?;
                let stderr = stdout.try_clone().map_err(|e| BuildError::io(&log, e))?;

                let status = command
                    .stdout(Stdio::from(stdout))
                    .stderr(Stdio::from(stderr))
                    .status()
                    .map_err(|e| failed(format!("failed to run {}: {}", self.idf_py, e)))?;

                if !status.success() {
                    return Err(failed(format!(
                        "{} exited with {}, see {}",
                        self.idf_py,
                        status,
                        log.display()
                    )));
                }
                fs::read_to_string(&log).map_err(|e| BuildError::io(&log, e))
            }
            None => {
                let output = command
                    .output()
                    .map_err(|e| failed(format!("failed to run {}: {}", self.idf_py, e)))?;
                let text = format!(
                    "{}{}",
                    String::from_utf8_lossy(&output.stdout),
                    String::from_utf8_lossy(&output.stderr)
                );

                if app.verbose || !output.status.success() {
                    eprint!("{}", text);
                }
                if !output.status.success() {
                    return Err(failed(format!("{} exited with {}", self.idf_py, output.status)));
                }
                Ok(text)
            }
        }
    }
}

impl BuildStep for IdfBuilder {
    fn build(&self, app: &AppRecord) -> Result<(), BuildError> {
        let work = app.work_path();
        let build = app.build_path();
        let args = self.build_args(app);

        if app.dry_run {
            info!(
                app = %app,
                command = %format!("{} {}", self.idf_py, args.join(" ")),
                "Dry run, skipping build"
            );
            return Ok(());
        }

        info!(app = %app, "Building");

        if work != app.directory {
            copy_app(&app.directory, &work, &build)?;
            let stale = work.join(SDKCONFIG);
            if stale.is_file() {
                fs::remove_file(&stale).map_err(|e| BuildError::io(&stale, e))?;
            }
        }
        fs::create_dir_all(&build).map_err(|e| BuildError::io(&build, e))?;

        let log = self.run(app, &args)?;

        if app.check_warnings {
            let warnings = find_warnings(&log, &self.ignore_warnings);
            if let Some(first) = warnings.first() {
                for line in &warnings {
                    warn!(app = %app.directory.display(), "{}", line);
                }
                return Err(BuildError::Warnings {
                    app: app.directory.display().to_string(),
                    count: warnings.len(),
                    first: first.to_string(),
                });
            }
        }

        if !app.preserve && !self.collects_size {
            clean_build_dir(&build, None)?;
        }

        Ok(())
    }

    fn collect_size_info(&self, app: &AppRecord, destination: &Path) -> Result<(), BuildError> {
        if app.dry_run {
            return Ok(());
        }

        let build = app.build_path();
        let size_error = |message: String| BuildError::SizeInfo {
            app: app.directory.display().to_string(),
            message,
        };

        let build_arg = build.display().to_string();
        let output = Command::new(&self.idf_py)
            .args(["-B", build_arg.as_str(), "size", "--format", "json"])
            .output()
            .map_err(|e| size_error(format!("failed to run {}: {}", self.idf_py, e)))?;
        if !output.status.success() {
            return Err(size_error(format!(
                "{} size exited with {}",
                self.idf_py, output.status
            )));
        }

        let size_json = app.size_json();
        if let Some(parent) = size_json.parent() {
            fs::create_dir_all(parent).map_err(|e| BuildError::io(parent, e))?;
        }
        fs::write(&size_json, &output.stdout).map_err(|e| BuildError::io(&size_json, e))?;

        let line = serde_json::to_string(&SizeInfoLine {
            app_dir: &app.directory,
            target: &app.target,
            config_name: &app.config_name,
            path: &size_json,
        })
        .map_err(|e| size_error(e.to_string()))?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(destination)
            .map_err(|e| BuildError::io(destination, e))?;
        writeln!(file, "{}", line).map_err(|e| BuildError::io(destination, e))?;
        debug!(path = %size_json.display(), "Collected size info");

        if !app.preserve {
            clean_build_dir(&build, Some(&size_json))?;
        }
        Ok(())
    }
}

/// Copies the app tree into `work`, leaving out `build` and `work` itself
/// when they sit inside the source tree.
fn copy_app(source: &Path, work: &Path, build: &Path) -> Result<(), BuildError> {
    debug!(from = %source.display(), to = %work.display(), "Copying app to work directory");

    let walker = WalkDir::new(source)
        .into_iter()
        .filter_entry(|e| e.path() != build && e.path() != work);

    for entry in walker {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(source).to_path_buf();
            BuildError::io(&path, e.into())
        })?;
        let relative = entry.path().strip_prefix(source).unwrap_or(entry.path());
        let dest = work.join(relative);

        if entry.file_type().is_symlink() {
            copy_symlink(entry.path(), &dest)?;
        } else if entry.file_type().is_dir() {
            fs::create_dir_all(&dest).map_err(|e| BuildError::io(&dest, e))?;
        } else {
            fs::copy(entry.path(), &dest).map_err(|e| BuildError::io(&dest, e))?;
        }
    }
    Ok(())
}

/// Recreates the link itself rather than copying what it points to
#[cfg(unix)]
fn copy_symlink(link: &Path, dest: &Path) -> Result<(), BuildError> {
    let target = fs::read_link(link).map_err(|e| BuildError::io(link, e))?;
    std::os::unix::fs::symlink(&target, dest).map_err(|e| BuildError::io(dest, e))
}

#[cfg(not(unix))]
fn copy_symlink(link: &Path, dest: &Path) -> Result<(), BuildError> {
    if link.is_dir() {
        copy_app(link, dest, dest)
    } else {
        fs::copy(link, dest)
            .map(|_| ())
            .map_err(|e| BuildError::io(dest, e))
    }
}

/// Removes the contents of a build directory, optionally sparing one file
fn clean_build_dir(build: &Path, keep: Option<&Path>) -> Result<(), BuildError> {
    info!(path = %build.display(), "Removing build artifacts");

    let entries = match fs::read_dir(build) {
        Ok(entries) => entries,
        Err(_) => return Ok(()),
    };

    for entry in entries {
        let path: PathBuf = entry.map_err(|e| BuildError::io(build, e))?.path();
        if Some(path.as_path()) == keep {
            continue;
        }
        let result = if path.is_dir() {
            fs::remove_dir_all(&path)
        } else {
            fs::remove_file(&path)
        };
        result.map_err(|e| BuildError::io(&path, e))?;
    }
    Ok(())
}

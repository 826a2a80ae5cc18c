//! Single-directory scan: expands one app directory into its App records

use crate::app::{AppRecord, AppTemplate};
use crate::context::RunContext;
use crate::rules::ConfigRule;
use crate::sdkconfig;
use glob::{MatchOptions, Pattern};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Inputs shared by every directory scan in one discovery run
#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub target: String,
    pub config_rules: Vec<ConfigRule>,
    pub template: AppTemplate,
}

impl ScanOptions {
    pub fn new(target: impl Into<String>, config_rules: Vec<ConfigRule>) -> Self {
        Self {
            target: target.into(),
            config_rules,
            template: AppTemplate::default(),
        }
    }

    pub fn with_template(mut self, template: AppTemplate) -> Self {
        self.template = template;
        self
    }
}

/// Returns the apps `directory` provides for the requested target.
///
/// Empty when the directory is not an app or does not support the target.
/// Otherwise every non-default rule contributes one app per matching
/// sdkconfig fragment, and if none matched, a single app with the default
/// rule's config name (or `""`) and no fragment is returned.
pub fn scan_directory(ctx: &RunContext, directory: &Path, options: &ScanOptions) -> Vec<AppRecord> {
    let build_system = ctx.build_system();
    let target = options.target.as_str();

    if !build_system.is_app(directory) {
        debug!(path = %directory.display(), "Skipping, not an app");
        return Vec::new();
    }

    if !ctx.target_enabled(directory, target) {
        debug!(
            path = %directory.display(),
            target,
            "Skipping, target not supported by app"
        );
        return Vec::new();
    }

    let mut apps = Vec::new();
    let mut default_config_name = String::new();

    for rule in &options.config_rules {
        if rule.is_default() {
            default_config_name = rule.config_name.clone();
            continue;
        }

        for relative in matching_fragments(directory, rule) {
            let fragment = directory.join(&relative);
            if let Some(required) = sdkconfig::target_override(&fragment) {
                if required != target {
                    debug!(
                        sdkconfig = %fragment.display(),
                        required_target = %required,
                        "Skipping sdkconfig which requires another target"
                    );
                    continue;
                }
            }

            let config_name = rule.config_name_for(&relative);
            debug!(
                build_system = %build_system.id(),
                path = %directory.display(),
                sdkconfig = %relative,
                config_name = %config_name,
                "Found app"
            );
            apps.push(options.template.instantiate(
                directory,
                target,
                &config_name,
                Some(PathBuf::from(relative)),
            ));
        }
    }

    if apps.is_empty() {
        debug!(
            build_system = %build_system.id(),
            path = %directory.display(),
            config_name = %default_config_name,
            "Found app with default sdkconfig"
        );
        apps.push(
            options
                .template
                .instantiate(directory, target, &default_config_name, None),
        );
    }

    apps
}

/// Files under `directory` matching `rule`, as `/`-separated relative
/// paths in lexicographic order.
fn matching_fragments(directory: &Path, rule: &ConfigRule) -> Vec<String> {
    let pattern = match Pattern::new(&rule.glob_pattern()) {
        Ok(p) => p,
        Err(e) => {
            warn!(rule = %rule, error = %e, "Ignoring config rule with invalid pattern");
            return Vec::new();
        }
    };
    let depth = rule.file_name_pattern.split('/').count();

    let mut matches: Vec<String> = WalkDir::new(directory)
        .min_depth(1)
        .max_depth(depth)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_file())
        .filter_map(|entry| {
            entry
                .path()
                .strip_prefix(directory)
                .ok()
                .map(|p| p.to_string_lossy().replace('\\', "/"))
        })
        .filter(|relative| pattern.matches_with(relative, MATCH_OPTIONS))
        .collect();

    matches.sort();
    matches
}

//! Sdkconfig fragment parsing
//!
//! Fragments are `KEY=value` files. Only the target override key is needed
//! during discovery, so parsing is lenient: comments, blank lines and lines
//! without `=` are skipped, and an unreadable file yields an empty map.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::debug;

pub const TARGET_KEY: &str = "CONFIG_IDF_TARGET";

pub fn parse_str(content: &str) -> HashMap<String, String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| {
            let value = value.trim();
            let value = value
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .unwrap_or(value);
            (key.trim().to_string(), value.to_string())
        })
        .collect()
}

pub fn parse_file(path: &Path) -> HashMap<String, String> {
    match fs::read_to_string(path) {
        Ok(content) => parse_str(&content),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "Failed to read sdkconfig fragment");
            HashMap::new()
        }
    }
}

/// Target a fragment pins the build to, if it sets one
pub fn target_override(path: &Path) -> Option<String> {
    parse_file(path).remove(TARGET_KEY)
}

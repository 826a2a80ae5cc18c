//! CMake (ESP-IDF project) build system

use super::BuildSystem;
use crate::app::BuildSystemId;
use regex::Regex;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;
use tracing::debug;

pub const CMAKELISTS: &str = "CMakeLists.txt";
pub const PROJECT_LINE: &str = "include($ENV{IDF_PATH}/tools/cmake/project.cmake)";
const README: &str = "README.md";

fn supported_targets_row() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?m)^\|\s*Supported Targets\s*\|(.*)$")
            .expect("Invalid supported targets regex")
    })
}

pub struct CMakeBuildSystem {
    default_targets: Vec<String>,
}

impl CMakeBuildSystem {
    pub fn new(default_targets: Vec<String>) -> Self {
        Self { default_targets }
    }

    /// Targets listed in a `| Supported Targets | ESP32 | ESP32-S2 |` row
    pub fn targets_from_readme(content: &str) -> Option<Vec<String>> {
        let caps = supported_targets_row().captures(content)?;
        let targets: Vec<String> = caps[1]
            .split('|')
            .map(|cell| cell.trim().to_lowercase().replace('-', ""))
            .filter(|cell| !cell.is_empty())
            .collect();

        if targets.is_empty() {
            None
        } else {
            Some(targets)
        }
    }
}

impl BuildSystem for CMakeBuildSystem {
    fn id(&self) -> BuildSystemId {
        BuildSystemId::CMake
    }

    fn is_app(&self, directory: &Path) -> bool {
        let path = directory.join(CMAKELISTS);
        if !path.is_file() {
            return false;
        }

        match fs::read_to_string(&path) {
            Ok(content) => !content.is_empty() && content.contains(PROJECT_LINE),
            Err(e) => {
                debug!(path = %path.display(), error = %e, "Failed to read CMakeLists.txt");
                false
            }
        }
    }

    fn enabled_targets(&self, directory: &Path) -> Vec<String> {
        fs::read_to_string(directory.join(README))
            .ok()
            .and_then(|content| Self::targets_from_readme(&content))
            .unwrap_or_else(|| self.default_targets.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn cmake() -> CMakeBuildSystem {
        CMakeBuildSystem::new(vec!["esp32".to_string(), "esp32s2".to_string()])
    }

    #[test]
    fn test_is_app_with_project_line() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(CMAKELISTS),
            format!("cmake_minimum_required(VERSION 3.16)\n{}\nproject(hello)\n", PROJECT_LINE),
        )
        .unwrap();
        assert!(cmake().is_app(dir.path()));
    }

    #[test]
    fn test_component_cmakelists_is_not_app() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(CMAKELISTS),
            "idf_component_register(SRCS \"main.c\")\n",
        )
        .unwrap();
        assert!(!cmake().is_app(dir.path()));
    }

    #[test]
    fn test_empty_or_missing_cmakelists() {
        let dir = TempDir::new().unwrap();
        assert!(!cmake().is_app(dir.path()));

        fs::write(dir.path().join(CMAKELISTS), "").unwrap();
        assert!(!cmake().is_app(dir.path()));
    }

    #[test]
    fn test_targets_from_readme_table() {
        let readme = "# Blink\n\n| Supported Targets | ESP32 | ESP32-S2 | ESP32-C3 |\n| ----------------- | ----- | -------- | -------- |\n";
        assert_eq!(
            CMakeBuildSystem::targets_from_readme(readme),
            Some(vec![
                "esp32".to_string(),
                "esp32s2".to_string(),
                "esp32c3".to_string()
            ])
        );
    }

    #[test]
    fn test_targets_from_readme_without_table() {
        assert_eq!(CMakeBuildSystem::targets_from_readme("# Blink\n"), None);
    }

    #[test]
    fn test_enabled_targets_falls_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        assert_eq!(
            cmake().enabled_targets(dir.path()),
            vec!["esp32".to_string(), "esp32s2".to_string()]
        );
    }

    #[test]
    fn test_enabled_targets_from_readme() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(README), "| Supported Targets | ESP32-C6 |\n").unwrap();
        assert_eq!(cmake().enabled_targets(dir.path()), vec!["esp32c6".to_string()]);
    }
}

//! Lexical path normalization
//!
//! Exclusions and manifest folders are compared against walked directories,
//! so both sides go through [`normalize`]: made absolute against the current
//! directory, with `.` and `..` components folded. Symlinks are not resolved.

use std::env;
use std::path::{Component, Path, PathBuf};

pub fn normalize(path: &Path) -> PathBuf {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    };

    let mut out = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

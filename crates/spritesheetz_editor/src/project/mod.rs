//! Project file management
//!
//! A project file is a single JSON document holding either a sprite sheet or
//! a map. Paths stored inside a project file (the sheet's image, a map's
//! attached sheets) may be relative to the file that stores them.

mod file;

pub use file::*;

use std::path::{Path, PathBuf};

/// Resolve a path stored in a project file against that file's directory
pub fn resolve_stored_path(project_file: Option<&Path>, stored: &Path) -> PathBuf {
    match project_file.and_then(Path::parent) {
        Some(dir) if stored.is_relative() => dir.join(stored),
        _ => stored.to_path_buf(),
    }
}

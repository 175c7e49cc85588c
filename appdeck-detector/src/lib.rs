//! Application discovery for `appdeck-detector`.
//!
//! `discover_apps(root, entry_point)` walks `root` recursively and returns every
//! directory that directly contains the entry-point file. The walk never
//! follows directory symlinks, results come back sorted by path, and
//! unreadable subtrees are skipped and reported rather than aborting the walk.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use appdeck_core::AppRoot;
use serde::Serialize;
use thiserror::Error;
use walkdir::{DirEntry, WalkDir};

pub use appdeck_core::settings::DEFAULT_ENTRY_POINT;

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// A path the walk could not read, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedPath {
    pub path: PathBuf,
    pub reason: String,
}

/// Result of one discovery walk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Discovery {
    /// Directories containing the entry point, sorted by path.
    pub apps: Vec<PathBuf>,
    /// Subtrees that could not be read; their contents were not searched.
    pub skipped: Vec<SkippedPath>,
}

impl Discovery {
    /// Discovered directories as registry keys, in discovery order.
    pub fn roots(&self) -> impl Iterator<Item = AppRoot> + '_ {
        self.apps.iter().map(|p| AppRoot::from(p.as_path()))
    }
}

/// Errors from application discovery.
#[derive(Debug, Error)]
pub enum DetectError {
    #[error("scan root '{path}' does not exist")]
    RootNotFound { path: PathBuf },

    #[error("scan root '{path}' is not a directory")]
    NotADirectory { path: PathBuf },

    #[error("entry point must be a bare file name, got '{0}'")]
    InvalidEntryPoint(String),
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Find every directory under `root` (including `root`) that directly
/// contains a file named `entry_point`.
pub fn discover_apps(root: &Path, entry_point: &str) -> Result<Discovery, DetectError> {
    discover_apps_within(root, entry_point, None)
}

/// Like [`discover_apps`], but app directories deeper than `max_depth` levels
/// below `root` are ignored. `Some(0)` only considers `root` itself.
pub fn discover_apps_within(
    root: &Path,
    entry_point: &str,
    max_depth: Option<usize>,
) -> Result<Discovery, DetectError> {
    validate_entry_point(entry_point)?;
    if !root.exists() {
        return Err(DetectError::RootNotFound {
            path: root.to_path_buf(),
        });
    }
    if !root.is_dir() {
        return Err(DetectError::NotADirectory {
            path: root.to_path_buf(),
        });
    }

    let mut walker = WalkDir::new(root).follow_links(false).sort_by_file_name();
    if let Some(depth) = max_depth {
        // The marker file sits one level below its app directory.
        walker = walker.max_depth(depth.saturating_add(1));
    }

    let mut discovery = Discovery::default();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                let path = err
                    .path()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| root.to_path_buf());
                tracing::warn!(path = %path.display(), error = %err, "skipping unreadable path");
                discovery.skipped.push(SkippedPath {
                    path,
                    reason: err.to_string(),
                });
                continue;
            }
        };

        if is_entry_point(&entry, entry_point) {
            if let Some(dir) = entry.path().parent() {
                tracing::debug!(app = %dir.display(), "found app");
                discovery.apps.push(dir.to_path_buf());
            }
        }
    }

    discovery.apps.sort();
    discovery.apps.dedup();
    Ok(discovery)
}

// ---------------------------------------------------------------------------
// Utilities
// ---------------------------------------------------------------------------

fn is_entry_point(entry: &DirEntry, entry_point: &str) -> bool {
    if entry.depth() == 0 || entry.file_name() != OsStr::new(entry_point) {
        return false;
    }
    let ft = entry.file_type();
    // A symlinked marker file counts; a directory with the marker's name does not.
    ft.is_file() || (ft.is_symlink() && entry.path().is_file())
}

fn validate_entry_point(entry_point: &str) -> Result<(), DetectError> {
    let p = Path::new(entry_point);
    match p.file_name() {
        Some(name) if name == p.as_os_str() => Ok(()),
        _ => Err(DetectError::InvalidEntryPoint(entry_point.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn root_itself_can_be_an_app() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(DEFAULT_ENTRY_POINT), "").unwrap();
        let found = discover_apps(dir.path(), DEFAULT_ENTRY_POINT).unwrap();
        assert_eq!(found.apps, vec![dir.path().to_path_buf()]);
    }

    #[test]
    fn missing_root_is_an_error() {
        let dir = TempDir::new().unwrap();
        let err = discover_apps(&dir.path().join("nope"), DEFAULT_ENTRY_POINT).unwrap_err();
        assert!(matches!(err, DetectError::RootNotFound { .. }));
    }

    #[test]
    fn file_root_is_an_error() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("plain.txt");
        std::fs::write(&file, "x").unwrap();
        let err = discover_apps(&file, DEFAULT_ENTRY_POINT).unwrap_err();
        assert!(matches!(err, DetectError::NotADirectory { .. }));
    }

    #[test]
    fn entry_point_with_separator_is_rejected() {
        let dir = TempDir::new().unwrap();
        let err = discover_apps(dir.path(), "sub/streamlit_app.py").unwrap_err();
        assert!(matches!(err, DetectError::InvalidEntryPoint(_)));
    }
}

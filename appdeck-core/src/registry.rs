//! Flat JSON app registry.
//!
//! # Storage layout
//!
//! ```text
//! <root>/
//!   streamlit_apps_config.json       (registry: one object keyed by app root)
//!   streamlit_apps_config.json.lock  (advisory lock, present while a run holds it)
//! ```
//!
//! # API pattern
//!
//! Every function takes the registry path explicitly; callers derive it once
//! with [`registry_path_at`]. Nothing here depends on the process working
//! directory.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use fs2::FileExt;
use serde::Serialize;

use crate::error::{io_err, RegistryError};
use crate::types::Registry;

/// Default registry file name, created in the scanned root.
pub const REGISTRY_FILE: &str = "streamlit_apps_config.json";

// ---------------------------------------------------------------------------
// 1. Path helpers
// ---------------------------------------------------------------------------

/// `<root>/<file>`, or `file` itself when it is absolute. No I/O.
pub fn registry_path_at(root: &Path, file: Option<&Path>) -> PathBuf {
    match file {
        Some(f) if f.is_absolute() => f.to_path_buf(),
        Some(f) => root.join(f),
        None => root.join(REGISTRY_FILE),
    }
}

fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(suffix);
    path.with_file_name(name)
}

// ---------------------------------------------------------------------------
// 2. Load
// ---------------------------------------------------------------------------

/// Load the registry at `path`.
///
/// A missing file yields an empty registry. Malformed content is
/// `RegistryError::Parse` with the path; callers treat it as fatal.
pub fn load_at(path: &Path) -> Result<Registry, RegistryError> {
    if !path.exists() {
        return Ok(Registry::new());
    }
    let contents = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
    serde_json::from_str(&contents).map_err(|e| RegistryError::Parse {
        path: path.to_path_buf(),
        source: e,
    })
}

// ---------------------------------------------------------------------------
// 3. Save (atomic)
// ---------------------------------------------------------------------------

/// Serialize `registry` as four-space indented JSON.
pub fn to_json(registry: &Registry) -> Result<String, RegistryError> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    registry.serialize(&mut ser)?;
    // serde_json only ever emits UTF-8.
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Atomically replace the registry file at `path`.
///
/// Write flow: serialize → `<file>.tmp` sibling → `rename`. The `.tmp` lives
/// in the same directory as the target so the rename never crosses devices.
pub fn save_at(path: &Path, registry: &Registry) -> Result<(), RegistryError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
    }
    let tmp_path = sibling(path, ".tmp");
    let json = to_json(registry)?;

    let mut file = File::create(&tmp_path).map_err(|e| io_err(&tmp_path, e))?;
    file.write_all(json.as_bytes())
        .and_then(|()| file.sync_all())
        .map_err(|e| io_err(&tmp_path, e))?;
    drop(file);

    if let Err(e) = std::fs::rename(&tmp_path, path) {
        let _ = std::fs::remove_file(&tmp_path);
        return Err(io_err(path, e));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// 4. Lock
// ---------------------------------------------------------------------------

/// Exclusive advisory lock around a load-modify-save sequence.
///
/// Released on drop. The lock file itself stays behind: deleting it would let
/// a waiter lock the old inode while a newcomer locks a fresh one.
#[derive(Debug)]
pub struct RegistryLock {
    file: File,
    path: PathBuf,
}

impl RegistryLock {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for RegistryLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}

/// Block until the `<file>.lock` sibling of `path` is exclusively held.
pub fn lock_at(path: &Path) -> Result<RegistryLock, RegistryError> {
    let lock_path = sibling(path, ".lock");
    if let Some(parent) = lock_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(&lock_path)
        .map_err(|e| RegistryError::Lock {
            path: lock_path.clone(),
            source: e,
        })?;
    file.lock_exclusive().map_err(|e| RegistryError::Lock {
        path: lock_path.clone(),
        source: e,
    })?;
    Ok(RegistryLock {
        file,
        path: lock_path,
    })
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

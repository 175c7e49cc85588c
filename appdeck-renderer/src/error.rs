//! Error types for appdeck-renderer.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise from dashboard rendering.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Tera template engine error.
    #[error("template engine error: {0}")]
    Tera(#[from] tera::Error),

    /// Filesystem error loading an override template or writing the page.
    #[error("dashboard io error at {path}: {source}")]
    Io { path: PathBuf, source: std::io::Error },
}

//! Common error types for gplrel.

use std::path::PathBuf;
use thiserror::Error;

/// Common error type for gplrel operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error({errno}) reading manifest {}: {reason}", path.display())]
    Manifest {
        path: PathBuf,
        errno: i32,
        reason: String,
    },

    #[error("Directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("Command execution failed: {cmd} - {reason}")]
    CommandFailed { cmd: String, reason: String },

    #[error("Invalid layout: {0}")]
    Layout(String),

    #[error("{name} was not found in {}", start.display())]
    PackageNotFound { name: String, start: PathBuf },

    #[error("Deletion plan is stale: {} no longer exists", .0.display())]
    PlanDrift(PathBuf),

    #[error("{0}")]
    Other(String),
}

/// Result type alias using common Error.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Build a manifest error from the underlying I/O failure.
    pub fn manifest(path: impl Into<PathBuf>, err: &std::io::Error) -> Self {
        Error::Manifest {
            path: path.into(),
            errno: err.raw_os_error().unwrap_or(0),
            reason: strerror(err),
        }
    }
}

/// The OS description of an I/O error, without the "(os error N)" suffix.
fn strerror(err: &std::io::Error) -> String {
    let text = err.to_string();
    match text.rfind(" (os error") {
        Some(idx) => text[..idx].to_string(),
        None => text,
    }
}

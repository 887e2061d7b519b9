//! Common error types for sndmirror

use std::path::PathBuf;
use thiserror::Error;

/// Common result type for sndmirror operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the sync and prune tools
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error on a specific path
    #[error("IO error at {}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Directory traversal error (wraps walkdir::Error)
    #[error("Directory traversal error: {0}")]
    Walk(#[from] walkdir::Error),

    /// External normalization tool failed for a source file
    #[error("Normalization failed for {}: {}", .path.display(), .reason)]
    Normalize { path: PathBuf, reason: String },

    /// Required path does not exist
    #[error("Not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Invalid input path or argument
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration error (roots, normalizer template)
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Attach the offending path to an I/O error
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

//! Failure policy and per-item failure records

use crate::Error;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// What a run does after one file fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Record the failure and continue with the next file
    #[default]
    Continue,
    /// Record the failure and stop the run
    Abort,
}

impl FailurePolicy {
    pub fn should_abort(self) -> bool {
        matches!(self, FailurePolicy::Abort)
    }
}

/// A single file or directory that could not be processed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemFailure {
    pub path: PathBuf,
    pub error: String,
}

impl ItemFailure {
    pub fn new(path: &Path, error: &Error) -> Self {
        Self {
            path: path.to_path_buf(),
            error: error.to_string(),
        }
    }
}

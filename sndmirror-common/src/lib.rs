//! # sndmirror Common Library
//!
//! Shared code for the sndmirror tools including:
//! - Error types
//! - Source/output tree layout and the path mapping between them
//! - Command-line root and run configuration
//! - Failure policy and per-item failure records for run reports

pub mod config;
pub mod error;
pub mod layout;
pub mod report;

pub use error::{Error, Result};
pub use layout::{TreeLayout, OUTPUT_SUFFIX};
pub use report::{FailurePolicy, ItemFailure};

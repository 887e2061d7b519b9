//! Command-line root and run configuration
//!
//! With no flags both tools operate on `prenormalized/` and `sounds/` relative
//! to the working directory. Each root can be overridden by flag or
//! environment variable (flag wins).

use crate::{FailurePolicy, Result, TreeLayout};
use clap::Args;
use std::path::PathBuf;

/// Default source root, relative to the working directory
pub const DEFAULT_SOURCE_ROOT: &str = "prenormalized";

/// Default output root, relative to the working directory
pub const DEFAULT_OUTPUT_ROOT: &str = "sounds";

/// Environment variable overriding the source root
pub const SOURCE_ROOT_ENV: &str = "SNDMIRROR_SOURCE";

/// Environment variable overriding the output root
pub const OUTPUT_ROOT_ENV: &str = "SNDMIRROR_OUTPUT";

/// Tree roots shared by the sync and prune binaries
#[derive(Args, Debug, Clone)]
pub struct RootArgs {
    /// Input tree holding the original audio files
    #[arg(long, value_name = "DIR", default_value = DEFAULT_SOURCE_ROOT, env = SOURCE_ROOT_ENV)]
    pub source: PathBuf,

    /// Output tree holding the normalized files
    #[arg(long, value_name = "DIR", default_value = DEFAULT_OUTPUT_ROOT, env = OUTPUT_ROOT_ENV)]
    pub output: PathBuf,
}

impl RootArgs {
    pub fn layout(&self) -> Result<TreeLayout> {
        TreeLayout::new(&self.source, &self.output)
    }
}

/// Run behavior flags shared by the sync and prune binaries
#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// Stop at the first failing file instead of continuing with the rest
    #[arg(long)]
    pub fail_fast: bool,

    /// Log what would change without touching the filesystem
    #[arg(long)]
    pub dry_run: bool,

    /// Print the run report as JSON on stdout
    #[arg(long)]
    pub json: bool,
}

impl RunArgs {
    pub fn failure_policy(&self) -> FailurePolicy {
        if self.fail_fast {
            FailurePolicy::Abort
        } else {
            FailurePolicy::Continue
        }
    }
}

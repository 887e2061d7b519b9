//! Prune pass: drop outputs whose source is gone
//!
//! Two phases over the output root:
//! 1. Orphan removal - every output file whose mapped source path has
//!    nothing on disk is deleted
//! 2. Directory cleanup - directories are visited deepest-first and removed
//!    when empty, so a chain of directories emptied by phase 1 collapses in
//!    one run
//!
//! The source tree is only ever read.

use serde::Serialize;
use sndmirror_common::{Error, FailurePolicy, ItemFailure, Result, TreeLayout};
use std::collections::HashSet;
use std::fs;
use std::io;
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Prune run options
#[derive(Debug, Clone, Copy, Default)]
pub struct PruneOptions {
    pub failure_policy: FailurePolicy,
    /// Report what would be removed without deleting anything
    pub dry_run: bool,
    /// Never remove the output root itself, even when it ends up empty
    pub keep_output_root: bool,
}

/// Prune run statistics
#[derive(Debug, Clone, Default, Serialize)]
pub struct PruneReport {
    /// Output files examined
    pub examined: usize,
    /// Output files whose source still exists
    pub kept: usize,
    pub removed_files: Vec<PathBuf>,
    pub removed_dirs: Vec<PathBuf>,
    pub failures: Vec<ItemFailure>,
    /// Run stopped early under [`FailurePolicy::Abort`]
    pub aborted: bool,
    pub dry_run: bool,
}

impl PruneReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Reconciles the output tree with deletions in the source tree
pub struct Pruner {
    layout: TreeLayout,
    options: PruneOptions,
}

impl Pruner {
    pub fn new(layout: TreeLayout) -> Self {
        Self {
            layout,
            options: PruneOptions::default(),
        }
    }

    pub fn with_options(mut self, options: PruneOptions) -> Self {
        self.options = options;
        self
    }

    /// Run both phases
    ///
    /// A missing output root means there is nothing to prune. A missing
    /// source root is an error: treating it as empty would delete every
    /// output.
    pub fn run(&self) -> Result<PruneReport> {
        let source_root = self.layout.source_root();
        let output_root = self.layout.output_root();

        if !source_root.exists() {
            return Err(Error::NotFound(source_root.to_path_buf()));
        }
        if !source_root.is_dir() {
            return Err(Error::InvalidInput(format!(
                "source root {} is not a directory",
                source_root.display()
            )));
        }

        let mut report = PruneReport {
            dry_run: self.options.dry_run,
            ..PruneReport::default()
        };

        if !output_root.exists() {
            info!("Nothing to prune: {} does not exist", output_root.display());
            return Ok(report);
        }
        if !output_root.is_dir() {
            return Err(Error::InvalidInput(format!(
                "output root {} is not a directory",
                output_root.display()
            )));
        }

        info!(
            "Pruning {} against {}{}",
            output_root.display(),
            source_root.display(),
            if self.options.dry_run { " (dry run)" } else { "" }
        );

        if self.run_phases(&mut report).is_break() {
            info!("Prune stopped before completing both phases");
        }

        info!(
            "Prune complete: {} examined, {} kept, {} files removed, {} directories removed, {} failed",
            report.examined,
            report.kept,
            report.removed_files.len(),
            report.removed_dirs.len(),
            report.failures.len()
        );

        Ok(report)
    }

    fn run_phases(&self, report: &mut PruneReport) -> ControlFlow<()> {
        // Paths deleted so far (or that would be, in a dry run)
        let mut removed = HashSet::new();

        self.remove_orphans(report, &mut removed)?;
        self.remove_empty_dirs(report, &mut removed)
    }

    fn remove_orphans(
        &self,
        report: &mut PruneReport,
        removed: &mut HashSet<PathBuf>,
    ) -> ControlFlow<()> {
        let walker = WalkDir::new(self.layout.output_root())
            .follow_links(false)
            .sort_by_file_name();

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    let path = e.path().unwrap_or(self.layout.output_root()).to_path_buf();
                    self.record_failure(report, &path, Error::from(e))?;
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            report.examined += 1;

            match self.is_orphan(path) {
                Ok(false) => {
                    debug!("Keeping {}", path.display());
                    report.kept += 1;
                }
                Ok(true) => match self.delete(path, |p| fs::remove_file(p)) {
                    Ok(()) => {
                        info!("Removed orphaned output {}", path.display());
                        removed.insert(path.to_path_buf());
                        report.removed_files.push(path.to_path_buf());
                    }
                    Err(e) => self.record_failure(report, path, e)?,
                },
                Err(e) => self.record_failure(report, path, e)?,
            }
        }

        ControlFlow::Continue(())
    }

    fn remove_empty_dirs(
        &self,
        report: &mut PruneReport,
        removed: &mut HashSet<PathBuf>,
    ) -> ControlFlow<()> {
        let min_depth = if self.options.keep_output_root { 1 } else { 0 };
        let walker = WalkDir::new(self.layout.output_root())
            .follow_links(false)
            .min_depth(min_depth)
            .contents_first(true)
            .sort_by_file_name();

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    let path = e.path().unwrap_or(self.layout.output_root()).to_path_buf();
                    self.record_failure(report, &path, Error::from(e))?;
                    continue;
                }
            };
            if !entry.file_type().is_dir() {
                continue;
            }

            let path = entry.path();
            match is_effectively_empty(path, removed) {
                Ok(false) => {}
                Ok(true) => match self.delete(path, |p| fs::remove_dir(p)) {
                    Ok(()) => {
                        info!("Removed empty directory {}", path.display());
                        removed.insert(path.to_path_buf());
                        report.removed_dirs.push(path.to_path_buf());
                    }
                    Err(e) => self.record_failure(report, path, e)?,
                },
                Err(e) => self.record_failure(report, path, e)?,
            }
        }

        ControlFlow::Continue(())
    }

    /// An output is orphaned unless its mapped source path is a regular file
    ///
    /// Symlinks are not followed, matching the sync walk, which never
    /// normalizes through a symlink. A directory at the source path does not
    /// keep the output either.
    fn is_orphan(&self, output: &Path) -> Result<bool> {
        let Some(source) = self.layout.source_for(output)? else {
            return Ok(true);
        };

        match fs::symlink_metadata(&source) {
            Ok(metadata) => Ok(!metadata.is_file()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(true),
            Err(e) => Err(Error::io(source, e)),
        }
    }

    fn delete(&self, path: &Path, remove: fn(&Path) -> io::Result<()>) -> Result<()> {
        if self.options.dry_run {
            return Ok(());
        }
        remove(path).map_err(|e| Error::io(path, e))
    }

    fn record_failure(
        &self,
        report: &mut PruneReport,
        path: &Path,
        error: Error,
    ) -> ControlFlow<()> {
        warn!("Failed to prune {}: {}", path.display(), error);
        report.failures.push(ItemFailure::new(path, &error));

        if self.options.failure_policy.should_abort() {
            warn!("Aborting prune after first failure");
            report.aborted = true;
            return ControlFlow::Break(());
        }
        ControlFlow::Continue(())
    }
}

/// A directory is empty once every entry it still lists has been removed
///
/// In a real run removed entries are already gone from the listing; in a dry
/// run they are still on disk and filtered out here.
fn is_effectively_empty(dir: &Path, removed: &HashSet<PathBuf>) -> Result<bool> {
    let entries = fs::read_dir(dir).map_err(|e| Error::io(dir, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| Error::io(dir, e))?;
        if !removed.contains(&entry.path()) {
            return Ok(false);
        }
    }
    Ok(true)
}

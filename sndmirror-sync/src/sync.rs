//! Sync pass: normalize every audio source that has no output yet
//!
//! Walks the source root in file name order. For each regular file:
//! 1. Non-audio content is ignored without a log line at info level
//! 2. An existing output file means the source is skipped
//! 3. Otherwise the output's parent directories are created and the
//!    normalizer is invoked
//!
//! Existence of the output path is the only signal that a source has been
//! handled, so a second run over an unchanged tree calls the normalizer zero
//! times.

use crate::mime::{is_audio_mime, MimeDetector};
use crate::normalizer::Normalizer;
use serde::Serialize;
use sndmirror_common::{Error, FailurePolicy, ItemFailure, Result, TreeLayout};
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Sync run options
#[derive(Debug, Clone, Copy, Default)]
pub struct SyncOptions {
    pub failure_policy: FailurePolicy,
    /// Report what would be normalized without writing anything
    pub dry_run: bool,
}

/// Sync run statistics
#[derive(Debug, Clone, Default, Serialize)]
pub struct SyncReport {
    /// Regular files found under the source root
    pub scanned: usize,
    /// Files whose content is not audio
    pub ignored: usize,
    /// Audio files whose output already existed
    pub skipped: usize,
    /// Audio files normalized (or that would be, in a dry run)
    pub normalized: usize,
    pub failures: Vec<ItemFailure>,
    /// Run stopped early under [`FailurePolicy::Abort`]
    pub aborted: bool,
    pub dry_run: bool,
}

impl SyncReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Ignored,
    Skipped,
    Normalized,
}

/// Mirrors the audio files of the source tree into the output tree
pub struct SyncNormalizer<M, N> {
    layout: TreeLayout,
    mime: M,
    normalizer: N,
    options: SyncOptions,
}

impl<M: MimeDetector, N: Normalizer> SyncNormalizer<M, N> {
    pub fn new(layout: TreeLayout, mime: M, normalizer: N) -> Self {
        Self {
            layout,
            mime,
            normalizer,
            options: SyncOptions::default(),
        }
    }

    pub fn with_options(mut self, options: SyncOptions) -> Self {
        self.options = options;
        self
    }

    pub fn layout(&self) -> &TreeLayout {
        &self.layout
    }

    /// Run one sync pass over the whole source tree
    ///
    /// Per-file failures are collected in the report; only an unusable
    /// source root is returned as an error.
    pub fn run(&self) -> Result<SyncReport> {
        let source_root = self.layout.source_root();
        if !source_root.exists() {
            return Err(Error::NotFound(source_root.to_path_buf()));
        }
        if !source_root.is_dir() {
            return Err(Error::InvalidInput(format!(
                "source root {} is not a directory",
                source_root.display()
            )));
        }

        info!(
            "Syncing {} -> {}{}",
            source_root.display(),
            self.layout.output_root().display(),
            if self.options.dry_run { " (dry run)" } else { "" }
        );

        let mut report = SyncReport {
            dry_run: self.options.dry_run,
            ..SyncReport::default()
        };

        let walker = WalkDir::new(source_root)
            .follow_links(false)
            .sort_by_file_name();

        for entry in walker {
            let result = match entry {
                Ok(entry) => {
                    if !entry.file_type().is_file() {
                        continue;
                    }
                    report.scanned += 1;
                    self.process(entry.path())
                        .map_err(|e| (entry.path().to_path_buf(), e))
                }
                Err(e) => {
                    let path = e.path().unwrap_or(source_root).to_path_buf();
                    Err((path, Error::from(e)))
                }
            };

            match result {
                Ok(Outcome::Ignored) => report.ignored += 1,
                Ok(Outcome::Skipped) => report.skipped += 1,
                Ok(Outcome::Normalized) => report.normalized += 1,
                Err((path, e)) => {
                    warn!("Failed to sync {}: {}", path.display(), e);
                    report.failures.push(ItemFailure::new(&path, &e));
                    if self.options.failure_policy.should_abort() {
                        warn!("Aborting sync after first failure");
                        report.aborted = true;
                        break;
                    }
                }
            }
        }

        info!(
            "Sync complete: {} scanned, {} normalized, {} skipped, {} ignored, {} failed",
            report.scanned,
            report.normalized,
            report.skipped,
            report.ignored,
            report.failures.len()
        );

        Ok(report)
    }

    fn process(&self, source: &Path) -> Result<Outcome> {
        let mime = self.mime.mime_type(source)?;
        if !mime.as_deref().is_some_and(is_audio_mime) {
            debug!("Ignoring non-audio file {} ({:?})", source.display(), mime);
            return Ok(Outcome::Ignored);
        }

        let destination = self.layout.output_for(source)?;
        if destination.is_file() {
            info!("Skipping {}: output already exists", source.display());
            return Ok(Outcome::Skipped);
        }

        if self.options.dry_run {
            info!(
                "Would normalize {} -> {}",
                source.display(),
                destination.display()
            );
            return Ok(Outcome::Normalized);
        }

        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }

        info!(
            "Normalizing {} -> {}",
            source.display(),
            destination.display()
        );

        if let Err(e) = self.normalizer.normalize(source, &destination) {
            discard_partial_output(&destination);
            return Err(e);
        }

        Ok(Outcome::Normalized)
    }
}

/// Remove a half-written output so the next run retries the source
fn discard_partial_output(destination: &Path) {
    if !destination.is_file() {
        return;
    }
    match fs::remove_file(destination) {
        Ok(()) => debug!("Removed partial output {}", destination.display()),
        Err(e) => warn!(
            "Could not remove partial output {}: {}",
            destination.display(),
            e
        ),
    }
}

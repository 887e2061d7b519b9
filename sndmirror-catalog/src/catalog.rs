//! Weighted catalog of the output tree
//!
//! Every directory splits its weight evenly between its entries (files and
//! subdirectories), so a file's weight is the product of `1 / entries` over
//! each directory from the root down to it. A folder of many takes therefore
//! counts as much as a single file beside it. Empty subdirectories still take
//! a share, which is simply never chosen.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use sndmirror_common::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// One playable file and its selection weight
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SoundEntry {
    pub path: PathBuf,
    pub weight: f64,
}

/// All regular files under a root, in file name order
#[derive(Debug, Clone, Default, Serialize)]
pub struct Catalog {
    entries: Vec<SoundEntry>,
}

impl Catalog {
    /// Walk `root` recursively and assign per-directory weights
    pub fn collect(root: &Path) -> Result<Self> {
        if !root.exists() {
            return Err(Error::NotFound(root.to_path_buf()));
        }
        if !root.is_dir() {
            return Err(Error::InvalidInput(format!(
                "{} is not a directory",
                root.display()
            )));
        }

        let mut entries = Vec::new();
        collect_dir(root, 1.0, &mut entries)?;
        debug!("Collected {} sounds under {}", entries.len(), root.display());

        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[SoundEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Pick one entry at random, proportionally to its weight
    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&SoundEntry> {
        self.entries.choose_weighted(rng, |entry| entry.weight).ok()
    }
}

fn collect_dir(dir: &Path, weight: f64, entries: &mut Vec<SoundEntry>) -> Result<()> {
    let mut children = Vec::new();
    for child in fs::read_dir(dir).map_err(|e| Error::io(dir, e))? {
        let child = child.map_err(|e| Error::io(dir, e))?;
        let file_type = child.file_type().map_err(|e| Error::io(child.path(), e))?;
        // Symlinks and special files are neither listed nor counted
        if file_type.is_file() || file_type.is_dir() {
            children.push((child.path(), file_type.is_dir()));
        }
    }
    children.sort();

    if children.is_empty() {
        return Ok(());
    }
    let share = weight / children.len() as f64;

    for (path, is_dir) in children {
        if is_dir {
            collect_dir(&path, share, entries)?;
        } else {
            entries.push(SoundEntry {
                path,
                weight: share,
            });
        }
    }

    Ok(())
}

//! Test doubles for the sync capabilities

#![allow(dead_code)]

use sndmirror_common::{Error, Result, TreeLayout};
use sndmirror_sync::{MimeDetector, Normalizer};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Fixed mapping from file extension to MIME type
pub struct ExtensionMime {
    types: HashMap<&'static str, &'static str>,
}

impl ExtensionMime {
    pub fn new() -> Self {
        let types = HashMap::from([
            ("ogg", "audio/ogg"),
            ("mp3", "audio/mpeg"),
            ("flac", "audio/x-flac"),
            ("wav", "audio/x-wav"),
            ("txt", "text/plain"),
            ("jpg", "image/jpeg"),
            ("mp4", "video/mp4"),
        ]);
        Self { types }
    }
}

impl MimeDetector for ExtensionMime {
    fn mime_type(&self, path: &Path) -> Result<Option<String>> {
        Ok(path
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| self.types.get(ext))
            .map(|mime| mime.to_string()))
    }
}

/// Copies the source to the destination and records every call
#[derive(Default)]
pub struct CopyNormalizer {
    calls: RefCell<Vec<(PathBuf, PathBuf)>>,
    fail_names: Vec<String>,
}

impl CopyNormalizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail for any source whose file name is listed
    pub fn failing_on(names: &[&str]) -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            fail_names: names.iter().map(|n| n.to_string()).collect(),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }

    pub fn calls(&self) -> Vec<(PathBuf, PathBuf)> {
        self.calls.borrow().clone()
    }
}

impl Normalizer for CopyNormalizer {
    fn normalize(&self, source: &Path, destination: &Path) -> Result<()> {
        self.calls
            .borrow_mut()
            .push((source.to_path_buf(), destination.to_path_buf()));

        let name = source
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        if self.fail_names.contains(&name) {
            return Err(Error::Normalize {
                path: source.to_path_buf(),
                reason: "unsupported format".to_string(),
            });
        }

        fs::copy(source, destination).map_err(|e| Error::io(destination, e))?;
        Ok(())
    }
}

/// Temporary `prenormalized/` + `sounds/` pair
pub struct Trees {
    pub dir: TempDir,
    pub layout: TreeLayout,
}

impl Trees {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("prenormalized");
        fs::create_dir_all(&source).unwrap();
        let layout = TreeLayout::new(source, dir.path().join("sounds")).unwrap();
        Self { dir, layout }
    }

    pub fn add_source(&self, relative: &str) -> PathBuf {
        let path = self.layout.source_root().join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, relative.as_bytes()).unwrap();
        path
    }

    pub fn output(&self, relative: &str) -> PathBuf {
        self.layout.output_root().join(relative)
    }
}

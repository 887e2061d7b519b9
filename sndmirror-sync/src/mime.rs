//! MIME type detection
//!
//! Only files whose content type starts with `audio/` are sent to the
//! normalizer; everything else under the source root is ignored.

use sndmirror_common::{Error, Result};
use std::path::Path;

/// Content type detection capability
pub trait MimeDetector {
    /// Detect the MIME type of a file, `None` when it cannot be identified
    fn mime_type(&self, path: &Path) -> Result<Option<String>>;
}

impl<T: MimeDetector + ?Sized> MimeDetector for &T {
    fn mime_type(&self, path: &Path) -> Result<Option<String>> {
        (**self).mime_type(path)
    }
}

/// True for any `audio/*` MIME type
pub fn is_audio_mime(mime: &str) -> bool {
    mime.starts_with("audio/")
}

/// Magic byte sniffing via the `infer` crate
#[derive(Debug, Clone, Copy, Default)]
pub struct InferMimeDetector;

impl MimeDetector for InferMimeDetector {
    fn mime_type(&self, path: &Path) -> Result<Option<String>> {
        let kind = infer::get_from_path(path).map_err(|e| Error::io(path, e))?;
        Ok(kind.map(|k| k.mime_type().to_string()))
    }
}

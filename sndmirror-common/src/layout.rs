//! Source/output tree layout
//!
//! An output entry lives at the source entry's relative path with
//! [`OUTPUT_SUFFIX`] appended to the full file name. The original extension
//! is retained: `a/b/song.mp3` maps to `a/b/song.mp3.wav`.
//!
//! The same rule is applied in reverse when pruning, so an output file whose
//! name does not end in the suffix has no possible source.

use crate::{Error, Result};
use std::ffi::OsString;
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Suffix appended to every source file name to form its output name
pub const OUTPUT_SUFFIX: &str = ".wav";

/// Extension form of [`OUTPUT_SUFFIX`] as reported by `Path::extension`
const OUTPUT_EXTENSION: &str = "wav";

/// Pair of root directories mirrored by the sync and prune tools
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeLayout {
    source_root: PathBuf,
    output_root: PathBuf,
}

impl TreeLayout {
    /// Create a layout from the two roots
    ///
    /// The roots must differ and neither may contain the other, otherwise the
    /// sync pass would pick up its own outputs as sources. The check runs on
    /// resolved paths, so `..` segments and symlinked roots cannot hide an
    /// overlap.
    pub fn new(source_root: impl Into<PathBuf>, output_root: impl Into<PathBuf>) -> Result<Self> {
        let source_root = source_root.into();
        let output_root = output_root.into();

        let source_abs = resolve(&source_root)?;
        let output_abs = resolve(&output_root)?;

        if source_abs.starts_with(&output_abs) || output_abs.starts_with(&source_abs) {
            return Err(Error::Config(format!(
                "source root {} and output root {} must not overlap",
                source_root.display(),
                output_root.display()
            )));
        }

        Ok(Self {
            source_root,
            output_root,
        })
    }

    pub fn source_root(&self) -> &Path {
        &self.source_root
    }

    pub fn output_root(&self) -> &Path {
        &self.output_root
    }

    /// Map a source file to its output path
    pub fn output_for(&self, source: &Path) -> Result<PathBuf> {
        let relative = source.strip_prefix(&self.source_root).map_err(|_| {
            Error::InvalidInput(format!(
                "{} is not under source root {}",
                source.display(),
                self.source_root.display()
            ))
        })?;

        let file_name = relative.file_name().ok_or_else(|| {
            Error::InvalidInput(format!("{} has no file name", source.display()))
        })?;

        let mut output_name = OsString::from(file_name);
        output_name.push(OUTPUT_SUFFIX);

        Ok(self.output_root.join(relative).with_file_name(output_name))
    }

    /// Map an output file back to the source path it was produced from
    ///
    /// Returns `Ok(None)` when the file name does not carry the output suffix,
    /// i.e. no source could ever map to it.
    pub fn source_for(&self, output: &Path) -> Result<Option<PathBuf>> {
        let relative = output.strip_prefix(&self.output_root).map_err(|_| {
            Error::InvalidInput(format!(
                "{} is not under output root {}",
                output.display(),
                self.output_root.display()
            ))
        })?;

        let file_name = relative.file_name().ok_or_else(|| {
            Error::InvalidInput(format!("{} has no file name", output.display()))
        })?;

        let file_name = Path::new(file_name);
        if file_name.extension().map_or(true, |ext| ext != OUTPUT_EXTENSION) {
            return Ok(None);
        }

        match file_name.file_stem() {
            Some(stem) if stem != "." && stem != ".." => {
                Ok(Some(self.source_root.join(relative).with_file_name(stem)))
            }
            _ => Ok(None),
        }
    }
}

/// Absolute form of a root with symlinks and `..` resolved
///
/// A root may not exist yet (the output root is created on demand), so the
/// longest existing prefix is canonicalized and the remaining components are
/// applied lexically.
fn resolve(path: &Path) -> Result<PathBuf> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        let cwd = std::env::current_dir().map_err(|e| Error::io(".", e))?;
        cwd.join(path)
    };

    let components: Vec<Component> = absolute.components().collect();
    for split in (1..=components.len()).rev() {
        let prefix: PathBuf = components[..split].iter().collect();
        let Ok(mut resolved) = fs::canonicalize(&prefix) else {
            continue;
        };

        for component in &components[split..] {
            match component {
                Component::ParentDir => {
                    resolved.pop();
                }
                Component::Normal(name) => resolved.push(name),
                _ => {}
            }
        }
        return Ok(resolved);
    }

    Ok(absolute)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> TreeLayout {
        TreeLayout::new("prenormalized", "sounds").unwrap()
    }

    #[test]
    fn test_output_path_appends_suffix() {
        let output = layout()
            .output_for(Path::new("prenormalized/a/b/song.mp3"))
            .unwrap();
        assert_eq!(output, PathBuf::from("sounds/a/b/song.mp3.wav"));
    }

    #[test]
    fn test_output_path_for_existing_wav_source() {
        let output = layout()
            .output_for(Path::new("prenormalized/take.wav"))
            .unwrap();
        assert_eq!(output, PathBuf::from("sounds/take.wav.wav"));
    }

    #[test]
    fn test_output_path_for_extensionless_source() {
        let output = layout()
            .output_for(Path::new("prenormalized/dir/README"))
            .unwrap();
        assert_eq!(output, PathBuf::from("sounds/dir/README.wav"));
    }

    #[test]
    fn test_source_path_strips_suffix() {
        let source = layout()
            .source_for(Path::new("sounds/a/b/song.mp3.wav"))
            .unwrap();
        assert_eq!(source, Some(PathBuf::from("prenormalized/a/b/song.mp3")));
    }

    #[test]
    fn test_source_path_without_suffix_is_none() {
        let layout = layout();
        assert_eq!(layout.source_for(Path::new("sounds/a/notes.txt")).unwrap(), None);
        assert_eq!(layout.source_for(Path::new("sounds/a/song.WAV")).unwrap(), None);
        assert_eq!(layout.source_for(Path::new("sounds/.wav")).unwrap(), None);
    }

    #[test]
    fn test_mapping_is_inverse() {
        let layout = layout();
        for source in [
            "prenormalized/voice.ogg",
            "prenormalized/a/b/song.mp3",
            "prenormalized/take.wav",
            "prenormalized/x.",
            "prenormalized/.hidden",
        ] {
            let source = PathBuf::from(source);
            let output = layout.output_for(&source).unwrap();
            assert_eq!(layout.source_for(&output).unwrap(), Some(source));
        }
    }

    #[test]
    fn test_paths_outside_roots_are_rejected() {
        let layout = layout();
        assert!(matches!(
            layout.output_for(Path::new("elsewhere/song.mp3")),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            layout.source_for(Path::new("prenormalized/song.mp3.wav")),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_overlapping_roots_are_rejected() {
        assert!(matches!(
            TreeLayout::new("audio", "audio"),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            TreeLayout::new("audio", "audio/sounds"),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            TreeLayout::new("/srv/audio/in", "/srv/audio"),
            Err(Error::Config(_))
        ));
        assert!(TreeLayout::new("/srv/audio/in", "/srv/audio/inbox").is_ok());
    }

    #[test]
    fn test_parent_segments_cannot_hide_overlap() {
        let dir = tempfile::TempDir::new().unwrap();
        let output = dir.path().join("sounds");

        // Neither root exists yet
        assert!(matches!(
            TreeLayout::new(dir.path().join("x/../sounds"), &output),
            Err(Error::Config(_))
        ));

        fs::create_dir_all(dir.path().join("x")).unwrap();
        fs::create_dir_all(&output).unwrap();
        assert!(matches!(
            TreeLayout::new(dir.path().join("x/../sounds"), &output),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            TreeLayout::new(dir.path().join("prenormalized"), dir.path().join("x/../prenormalized/out")),
            Err(Error::Config(_))
        ));
        assert!(TreeLayout::new(dir.path().join("x/../prenormalized"), &output).is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_root_cannot_hide_overlap() {
        let dir = tempfile::TempDir::new().unwrap();
        let output = dir.path().join("sounds");
        fs::create_dir_all(&output).unwrap();
        let link = dir.path().join("prenormalized");
        std::os::unix::fs::symlink(&output, &link).unwrap();

        assert!(matches!(
            TreeLayout::new(&link, &output),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            TreeLayout::new(dir.path().join("in"), link.join("nested")),
            Ok(_)
        ));
        assert!(matches!(
            TreeLayout::new(&output, link.join("nested")),
            Err(Error::Config(_))
        ));
    }
}

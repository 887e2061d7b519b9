//! External normalization tool
//!
//! The sync pass only needs "normalize this source into that destination, or
//! fail". The production implementation shells out to a command-line tool,
//! `ffmpeg-normalize` by default.

use sndmirror_common::{Error, Result};
use std::ffi::OsString;
use std::path::Path;
use std::process::Command;
use tracing::debug;

/// Default normalization program
pub const DEFAULT_PROGRAM: &str = "ffmpeg-normalize";

/// Argument placeholder replaced by the source path
pub const INPUT_PLACEHOLDER: &str = "{input}";

/// Argument placeholder replaced by the destination path
pub const OUTPUT_PLACEHOLDER: &str = "{output}";

/// Default argument template: `ffmpeg-normalize <input> -o <output>`
pub const DEFAULT_ARGS: [&str; 3] = [INPUT_PLACEHOLDER, "-o", OUTPUT_PLACEHOLDER];

/// Number of trailing stderr lines kept in a failure message
const STDERR_TAIL_LINES: usize = 5;

/// Normalization capability
pub trait Normalizer {
    /// Produce a normalized file at `destination` from `source`
    fn normalize(&self, source: &Path, destination: &Path) -> Result<()>;
}

impl<T: Normalizer + ?Sized> Normalizer for &T {
    fn normalize(&self, source: &Path, destination: &Path) -> Result<()> {
        (**self).normalize(source, destination)
    }
}

/// Runs an external program once per file
#[derive(Debug, Clone)]
pub struct CommandNormalizer {
    program: OsString,
    args: Vec<String>,
}

impl CommandNormalizer {
    /// Use `program` with the default argument template
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            args: DEFAULT_ARGS.iter().map(|a| a.to_string()).collect(),
        }
    }

    /// Use `program` with a custom argument template
    ///
    /// An argument equal to `{input}` or `{output}` is replaced by the
    /// corresponding path. Both placeholders must appear.
    pub fn with_args(program: impl Into<OsString>, args: Vec<String>) -> Result<Self> {
        for placeholder in [INPUT_PLACEHOLDER, OUTPUT_PLACEHOLDER] {
            if !args.iter().any(|a| a == placeholder) {
                return Err(Error::Config(format!(
                    "normalizer arguments must include {}",
                    placeholder
                )));
            }
        }

        Ok(Self {
            program: program.into(),
            args,
        })
    }

    /// Build the command for one file
    pub fn command(&self, source: &Path, destination: &Path) -> Command {
        let mut command = Command::new(&self.program);
        for arg in &self.args {
            match arg.as_str() {
                INPUT_PLACEHOLDER => command.arg(source),
                OUTPUT_PLACEHOLDER => command.arg(destination),
                other => command.arg(other),
            };
        }
        command
    }
}

impl Default for CommandNormalizer {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRAM)
    }
}

impl Normalizer for CommandNormalizer {
    fn normalize(&self, source: &Path, destination: &Path) -> Result<()> {
        let program = Path::new(&self.program).display().to_string();
        debug!("Running {} for {}", program, source.display());

        let output = self
            .command(source, destination)
            .output()
            .map_err(|e| Error::Normalize {
                path: source.to_path_buf(),
                reason: format!("failed to run {}: {}", program, e),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let lines: Vec<&str> = stderr.lines().collect();
            let tail = lines[lines.len().saturating_sub(STDERR_TAIL_LINES)..].join("\n");

            let mut reason = format!("{} exited with {}", program, output.status);
            if !tail.trim().is_empty() {
                reason.push_str(": ");
                reason.push_str(tail.trim());
            }

            return Err(Error::Normalize {
                path: source.to_path_buf(),
                reason,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsStr;

    fn args_of(command: &Command) -> Vec<&OsStr> {
        command.get_args().collect()
    }

    #[test]
    fn test_default_command_line() {
        let normalizer = CommandNormalizer::default();
        let command = normalizer.command(
            Path::new("prenormalized/a/song.mp3"),
            Path::new("sounds/a/song.mp3.wav"),
        );

        assert_eq!(command.get_program(), OsStr::new("ffmpeg-normalize"));
        assert_eq!(
            args_of(&command),
            vec![
                OsStr::new("prenormalized/a/song.mp3"),
                OsStr::new("-o"),
                OsStr::new("sounds/a/song.mp3.wav"),
            ]
        );
    }

    #[test]
    fn test_custom_template() {
        let normalizer = CommandNormalizer::with_args(
            "loudnorm-wrapper",
            vec![
                "--target".to_string(),
                "-16".to_string(),
                "{output}".to_string(),
                "{input}".to_string(),
            ],
        )
        .unwrap();
        let command = normalizer.command(Path::new("in.ogg"), Path::new("out.ogg.wav"));

        assert_eq!(
            args_of(&command),
            vec![
                OsStr::new("--target"),
                OsStr::new("-16"),
                OsStr::new("out.ogg.wav"),
                OsStr::new("in.ogg"),
            ]
        );
    }

    #[test]
    fn test_template_requires_both_placeholders() {
        let result = CommandNormalizer::with_args("tool", vec!["{input}".to_string()]);
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_missing_program_is_normalize_error() {
        let normalizer = CommandNormalizer::new("sndmirror-no-such-normalizer");
        let result = normalizer.normalize(Path::new("in.ogg"), Path::new("out.ogg.wav"));
        match result {
            Err(Error::Normalize { path, reason }) => {
                assert_eq!(path, Path::new("in.ogg"));
                assert!(reason.contains("failed to run"));
            }
            other => panic!("Expected Normalize error, got {:?}", other),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_non_zero_exit_is_normalize_error() {
        let normalizer = CommandNormalizer::with_args(
            "sh",
            vec![
                "-c".to_string(),
                "echo broken input >&2; exit 3".to_string(),
                "{input}".to_string(),
                "{output}".to_string(),
            ],
        )
        .unwrap();
        let result = normalizer.normalize(Path::new("in.ogg"), Path::new("out.ogg.wav"));
        match result {
            Err(Error::Normalize { reason, .. }) => {
                assert!(reason.contains("broken input"), "reason: {}", reason);
            }
            other => panic!("Expected Normalize error, got {:?}", other),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_successful_command() {
        let normalizer = CommandNormalizer::with_args(
            "sh",
            vec![
                "-c".to_string(),
                "exit 0".to_string(),
                "{input}".to_string(),
                "{output}".to_string(),
            ],
        )
        .unwrap();
        assert!(normalizer
            .normalize(Path::new("in.ogg"), Path::new("out.ogg.wav"))
            .is_ok());
    }
}

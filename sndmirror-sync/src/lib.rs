//! sndmirror-sync library interface for testing
//!
//! Exposes the sync pass and its two injectable capabilities: MIME detection
//! and the external normalization tool.

pub mod mime;
pub mod normalizer;
pub mod sync;

pub use mime::{is_audio_mime, InferMimeDetector, MimeDetector};
pub use normalizer::{CommandNormalizer, Normalizer};
pub use sync::{SyncNormalizer, SyncOptions, SyncReport};

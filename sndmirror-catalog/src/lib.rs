//! sndmirror-catalog library interface for testing

pub mod catalog;

pub use catalog::{Catalog, SoundEntry};

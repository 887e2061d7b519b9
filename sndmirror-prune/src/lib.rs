//! sndmirror-prune library interface for testing

pub mod prune;

pub use prune::{PruneOptions, PruneReport, Pruner};

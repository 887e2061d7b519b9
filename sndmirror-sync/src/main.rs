//! sndmirror-sync - normalize new audio files into the output tree
//!
//! Walks `prenormalized/` and runs the normalization tool for every audio
//! file that has no `sounds/<path>.wav` yet. Safe to re-run: existing
//! outputs are skipped.

use anyhow::{bail, Context, Result};
use clap::Parser;
use sndmirror_common::config::{RootArgs, RunArgs};
use sndmirror_sync::normalizer::DEFAULT_PROGRAM;
use sndmirror_sync::{CommandNormalizer, InferMimeDetector, SyncNormalizer, SyncOptions};
use std::path::PathBuf;
use tracing::info;

/// Command-line arguments for sndmirror-sync
#[derive(Parser, Debug)]
#[command(name = "sndmirror-sync")]
#[command(about = "Normalize audio files that have no output yet")]
#[command(version)]
struct Args {
    #[command(flatten)]
    roots: RootArgs,

    #[command(flatten)]
    run: RunArgs,

    /// Normalization program to run for each file
    #[arg(long, value_name = "PROGRAM", default_value = DEFAULT_PROGRAM, env = "SNDMIRROR_NORMALIZER")]
    normalizer: PathBuf,

    /// Argument template for the normalizer, repeatable; `{input}` and
    /// `{output}` are replaced by the file paths
    #[arg(long = "normalizer-arg", value_name = "ARG", allow_hyphen_values = true)]
    normalizer_args: Vec<String>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    info!(
        "Starting sndmirror-sync v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let args = Args::parse();
    let layout = args.roots.layout().context("Invalid tree roots")?;

    let normalizer = if args.normalizer_args.is_empty() {
        CommandNormalizer::new(&args.normalizer)
    } else {
        CommandNormalizer::with_args(&args.normalizer, args.normalizer_args.clone())
            .context("Invalid normalizer arguments")?
    };

    let options = SyncOptions {
        failure_policy: args.run.failure_policy(),
        dry_run: args.run.dry_run,
    };

    let report = SyncNormalizer::new(layout, InferMimeDetector, normalizer)
        .with_options(options)
        .run()
        .context("Sync failed")?;

    if args.run.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    if !report.is_success() {
        bail!("{} file(s) failed to normalize", report.failures.len());
    }

    Ok(())
}

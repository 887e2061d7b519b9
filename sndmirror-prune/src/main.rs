//! sndmirror-prune - remove outputs whose source was deleted
//!
//! Deletes every `sounds/<path>.wav` whose `prenormalized/<path>` no longer
//! exists, then removes directories left empty, deepest first.

use anyhow::{bail, Context, Result};
use clap::Parser;
use sndmirror_common::config::{RootArgs, RunArgs};
use sndmirror_prune::{PruneOptions, Pruner};
use tracing::info;

/// Command-line arguments for sndmirror-prune
#[derive(Parser, Debug)]
#[command(name = "sndmirror-prune")]
#[command(about = "Remove normalized outputs whose source file is gone")]
#[command(version)]
struct Args {
    #[command(flatten)]
    roots: RootArgs,

    #[command(flatten)]
    run: RunArgs,

    /// Keep the output root directory even when it ends up empty
    #[arg(long)]
    keep_root: bool,
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
        "Starting sndmirror-prune v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let args = Args::parse();
    let layout = args.roots.layout().context("Invalid tree roots")?;

    let options = PruneOptions {
        failure_policy: args.run.failure_policy(),
        dry_run: args.run.dry_run,
        keep_output_root: args.keep_root,
    };

    let report = Pruner::new(layout)
        .with_options(options)
        .run()
        .context("Prune failed")?;

    if args.run.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    if !report.is_success() {
        bail!("{} item(s) could not be pruned", report.failures.len());
    }

    Ok(())
}

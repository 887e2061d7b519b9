//! sndmirror-catalog - list or pick from the normalized output tree
//!
//! Prints every file under `sounds/` with its selection weight, or with
//! `--pick` a single weighted random choice.

use anyhow::{bail, Context, Result};
use clap::Parser;
use sndmirror_catalog::Catalog;
use sndmirror_common::config::{DEFAULT_OUTPUT_ROOT, OUTPUT_ROOT_ENV};
use std::path::PathBuf;
use tracing::info;

/// Command-line arguments for sndmirror-catalog
#[derive(Parser, Debug)]
#[command(name = "sndmirror-catalog")]
#[command(about = "List the normalized sounds with their selection weights")]
#[command(version)]
struct Args {
    /// Output tree holding the normalized files
    #[arg(long, value_name = "DIR", default_value = DEFAULT_OUTPUT_ROOT, env = OUTPUT_ROOT_ENV)]
    output: PathBuf,

    /// Print one weighted random pick instead of the full listing
    #[arg(long)]
    pick: bool,

    /// Print the catalog (or the pick) as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    info!("sndmirror-catalog v{}", env!("CARGO_PKG_VERSION"));

    let catalog = Catalog::collect(&args.output)
        .with_context(|| format!("Could not read {}", args.output.display()))?;

    if args.pick {
        let Some(entry) = catalog.choose(&mut rand::thread_rng()) else {
            bail!("No sounds under {}", args.output.display());
        };
        if args.json {
            println!("{}", serde_json::to_string_pretty(entry)?);
        } else {
            println!("{}", entry.path.display());
        }
        return Ok(());
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&catalog)?);
    } else {
        for entry in catalog.entries() {
            println!("{:.6}\t{}", entry.weight, entry.path.display());
        }
    }

    Ok(())
}

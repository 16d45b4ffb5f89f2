//! Demo Drilling Dataset Generator
//!
//! Writes a labelled drilling dataset with a known deviation structure, for
//! trying out `bore-drift` without field data.
//!
//! # Usage
//! ```bash
//! ./demo-data --rows 1000 --seed 42 --output holes.csv
//! ./demo-data --rows 50 | head
//! ```

use std::fs::File;
use std::io::{self, BufWriter};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use bore_drift::dataset::{generate, write_csv, DemoOptions};

#[derive(Parser, Debug)]
#[command(name = "demo-data")]
#[command(about = "Synthetic drill hole dataset for bore-drift")]
#[command(version)]
struct Args {
    /// Number of holes
    #[arg(short, long, default_value_t = 1000, value_parser = clap::value_parser!(u32).range(1..=1_000_000))]
    rows: u32,

    /// Random seed for reproducibility
    #[arg(short, long, default_value_t = 42)]
    seed: u64,

    /// Output CSV (stdout when omitted)
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let records = generate(DemoOptions {
        rows: args.rows as usize,
        seed: args.seed,
    })?;

    match &args.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            write_csv(&records, BufWriter::new(file))?;
            info!(path = %path.display(), rows = records.len(), "Demo CSV written");
        }
        None => write_csv(&records, io::stdout().lock())?,
    }

    Ok(())
}

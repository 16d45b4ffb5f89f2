//! bore-drift - drill hole deviation prediction
//!
//! Trains a deviation model on a drilling dataset (CSV or generated demo
//! data), reports its held-out accuracy, and predicts the trajectory of a
//! planned hole.
//!
//! # Usage
//!
//! ```bash
//! # Explore a dataset
//! bore-drift summary --csv holes.csv
//!
//! # Train and score a model on demo data
//! bore-drift train --demo --strategy kernel_svr
//!
//! # Predict a planned hole, writing the report to a file
//! bore-drift predict --csv holes.csv --map depth_final=Depth \
//!     --depth 500 --azimuth 45 --inclination=-60 --rock-type Granite \
//!     --rotation-speed 120 --report report.txt
//! ```
//!
//! # Environment Variables
//!
//! - `BORE_DRIFT_CONFIG`: Path to a TOML config file (default: ./drift_config.toml)
//! - `RUST_LOG`: Logging level (default: info)

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use bore_drift::dataset::{self, DemoOptions};
use bore_drift::report::{self, DeviationReport};
use bore_drift::{
    reconstruct_with, DriftConfig, DrillingRecord, StrategyKind, TrainedModelPair,
    TrainingCheckpoint, TrainingMetrics,
};

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "bore-drift")]
#[command(about = "Drill hole deviation prediction and trajectory reconstruction")]
#[command(version)]
struct CliArgs {
    /// Config file (overrides BORE_DRIFT_CONFIG and ./drift_config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Print results as JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    /// Emit log lines as JSON
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Column statistics, rock type balance and notable correlations
    Summary {
        #[command(flatten)]
        source: DataSource,
    },

    /// Train both deviation models and report held-out metrics
    Train {
        #[command(flatten)]
        source: DataSource,

        /// random_forest | kernel_svr | linear | neural_network (default from config)
        #[arg(long)]
        strategy: Option<StrategyKind>,
    },

    /// Train, then predict the deviation and trajectory of one planned hole
    Predict {
        #[command(flatten)]
        source: DataSource,

        #[arg(long)]
        strategy: Option<StrategyKind>,

        /// Final depth (m)
        #[arg(long)]
        depth: f64,

        /// Planned azimuth (degrees)
        #[arg(long, allow_negative_numbers = true)]
        azimuth: f64,

        /// Planned inclination (degrees, -90 vertical to 0 horizontal)
        #[arg(long, allow_negative_numbers = true)]
        inclination: f64,

        #[arg(long)]
        rock_type: String,

        /// Rod rotation speed (rpm)
        #[arg(long)]
        rotation_speed: f64,

        /// Points per reconstructed path (default from config)
        #[arg(long)]
        samples: Option<usize>,

        /// Write the text report here instead of printing it
        #[arg(long, value_name = "PATH")]
        report: Option<PathBuf>,
    },

    /// Print the effective configuration as TOML
    ShowConfig,
}

/// Where the drilling records come from.
#[derive(Args, Debug)]
struct DataSource {
    /// CSV file with one row per hole
    #[arg(long, value_name = "PATH", conflicts_with = "demo")]
    csv: Option<PathBuf>,

    /// Column override, e.g. depth_final=Depth (repeatable)
    #[arg(long = "map", value_name = "FIELD=HEADER")]
    map: Vec<String>,

    /// Use generated demo data
    #[arg(long)]
    demo: bool,

    /// Demo rows
    #[arg(long, default_value_t = 1000)]
    rows: usize,

    /// Demo seed
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

// ============================================================================
// Data Loading
// ============================================================================

fn load_dataset(source: &DataSource, require_labels: bool) -> Result<Vec<DrillingRecord>> {
    if let Some(path) = &source.csv {
        let overrides = source
            .map
            .iter()
            .map(|arg| dataset::parse_override(arg))
            .collect::<Result<Vec<_>, _>>()
            .context("Invalid --map override")?;

        let loaded = dataset::load_records(path, &overrides, require_labels)
            .with_context(|| format!("Failed to load {}", path.display()))?;
        let s = &loaded.summary;
        info!(
            source = %s.source,
            rows = s.rows_loaded,
            skipped = s.skipped_rows,
            errors = s.error_rows,
            rock_type_defaulted = s.rock_type_defaulted,
            "CSV loaded"
        );
        info!("Column mapping: {}", s.mapping);
        return Ok(loaded.records);
    }

    if !source.demo {
        bail!("No data source: pass --csv PATH or --demo");
    }
    if !source.map.is_empty() {
        warn!("--map is ignored with --demo");
    }
    dataset::generate(DemoOptions {
        rows: source.rows,
        seed: source.seed,
    })
    .context("Failed to generate demo data")
}

// ============================================================================
// Training
// ============================================================================

/// Run training on the blocking pool, logging checkpoints as they arrive.
async fn train(
    config: &DriftConfig,
    records: Vec<DrillingRecord>,
    strategy: StrategyKind,
) -> Result<(TrainedModelPair, TrainingMetrics)> {
    let (tx, mut rx) = mpsc::unbounded_channel::<TrainingCheckpoint>();
    let trainer = config.trainer();

    let handle = tokio::task::spawn_blocking(move || {
        trainer.train_with_progress(&records, strategy, &mut |stage| {
            // Receiver outlives the task unless main is already unwinding
            let _ = tx.send(stage);
        })
    });

    while let Some(stage) = rx.recv().await {
        info!(stage = %stage, percent = stage.percent(), "Training progress");
    }

    let result = handle.await.context("Training task did not complete")?;
    result.with_context(|| format!("Training with {} failed", strategy.display_name()))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn write_report(path: &Path, report: &DeviationReport) -> Result<()> {
    std::fs::write(path, report.render())
        .with_context(|| format!("Failed to write report {}", path.display()))?;
    info!(path = %path.display(), "Report written");
    Ok(())
}

// ============================================================================
// Entry Point
// ============================================================================

fn init_tracing(json: bool) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse();
    init_tracing(args.log_json);

    let config = match &args.config {
        Some(path) => DriftConfig::load_from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => DriftConfig::load(),
    };

    match args.command {
        Command::Summary { source } => {
            let records = load_dataset(&source, false)?;
            let summary = dataset::summarize(&records)?;
            if args.json {
                print_json(&summary)?;
            } else {
                print!("{}", report::render_dataset(&summary));
            }
        }

        Command::Train { source, strategy } => {
            let records = load_dataset(&source, true)?;
            let strategy = strategy.unwrap_or(config.training.strategy);
            let (_, metrics) = train(&config, records, strategy).await?;
            if args.json {
                print_json(&metrics)?;
            } else {
                print!("{}", report::render_training(&metrics));
            }
        }

        Command::Predict {
            source,
            strategy,
            depth,
            azimuth,
            inclination,
            rock_type,
            rotation_speed,
            samples,
            report: report_path,
        } => {
            let records = load_dataset(&source, true)?;
            let strategy = strategy.unwrap_or(config.training.strategy);
            let (pair, metrics) = train(&config, records, strategy).await?;
            info!(
                mean_r2 = metrics.mean_r2(),
                rating = %metrics.performance(),
                "Model ready"
            );

            let record = DrillingRecord::new(depth, azimuth, inclination, rock_type, rotation_speed);
            if !pair.azimuth().transform().knows_rock_type(&record.rock_type) {
                warn!(
                    rock_type = %record.rock_type,
                    "Rock type not seen in training data, predicting without a lithology effect"
                );
            }

            let predicted = pair.predict(&record).context("Prediction failed")?;
            let trajectory = reconstruct_with(
                &config.severity,
                record.azimuth_initial,
                record.inclination_initial,
                record.depth_final,
                predicted.azimuth,
                predicted.inclination,
                samples.unwrap_or(config.trajectory.sample_count),
            )
            .context("Trajectory reconstruction failed")?;

            let report = DeviationReport::new(record, trajectory);
            match (&report_path, args.json) {
                (Some(path), _) => write_report(path, &report)?,
                (None, true) => print_json(&report)?,
                (None, false) => print!("{}", report.render()),
            }
        }

        Command::ShowConfig => {
            print!("{}", config.to_toml()?);
        }
    }

    Ok(())
}

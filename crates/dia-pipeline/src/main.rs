//! CLI entry point for the screening feature pipeline.

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use dia_pipeline::{
    CsvSource, LearningPipeline, ObservationSource, PipelineConfig, ServingPipeline,
};
use dotenv::dotenv;
use polars::prelude::*;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Feature transformation pipeline for diabetes-risk screening",
    long_about = "Converts joined screening exports into model-ready feature matrices.\n\n\
                  EXAMPLES:\n  \
                  # Fit statistics over a labelled export and persist them\n  \
                  dia-pipeline fit -i screening.csv -a artifacts\n\n  \
                  # Transform a new batch with the persisted statistics\n  \
                  dia-pipeline transform -i batch.csv -a artifacts -o features.csv"
)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show warnings and errors)
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fit imputation and scaling statistics over a labelled export,
    /// persist them, and report the resulting partitions
    Fit {
        /// Path to the joined screening export (CSV)
        #[arg(short, long)]
        input: PathBuf,

        /// Directory the fitted artifacts are written to
        #[arg(short, long, default_value = "artifacts")]
        artifacts: PathBuf,

        /// Test partition share (0.0 - 1.0, exclusive)
        #[arg(long, default_value_t = dia_pipeline::DEFAULT_TEST_SIZE)]
        test_size: f64,

        /// Split seed; fixed by default so refits are reproducible
        #[arg(long, default_value_t = dia_pipeline::DEFAULT_RANDOM_SEED)]
        seed: u64,

        /// Also write the transformed train/test partitions as CSV next to
        /// the artifacts
        #[arg(long)]
        emit_matrices: bool,
    },

    /// Transform a batch with previously persisted statistics
    Transform {
        /// Path to the screening export (CSV, no diagnosis required)
        #[arg(short, long)]
        input: PathBuf,

        /// Directory holding the fitted artifacts
        #[arg(short, long, default_value = "artifacts")]
        artifacts: PathBuf,

        /// Where the transformed feature matrix is written (CSV)
        #[arg(short, long)]
        output: PathBuf,
    },
}

/// Initialize the tracing subscriber for logging.
fn init_logging(level: &str, quiet: bool) {
    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level, args.quiet);
    dotenv().ok();

    match args.command {
        Command::Fit {
            input,
            artifacts,
            test_size,
            seed,
            emit_matrices,
        } => run_fit(&input, &artifacts, test_size, seed, emit_matrices).await,
        Command::Transform {
            input,
            artifacts,
            output,
        } => run_transform(&input, &artifacts, &output).await,
    }
}

async fn run_fit(
    input: &Path,
    artifacts: &Path,
    test_size: f64,
    seed: u64,
    emit_matrices: bool,
) -> Result<()> {
    if !input.exists() {
        return Err(anyhow!("input file not found: {}", input.display()));
    }

    let config = PipelineConfig::builder()
        .test_size(test_size)
        .random_seed(seed)
        .artifacts_dir(artifacts)
        .build()?;

    info!("fetching screening records from {}", input.display());
    let records = CsvSource::new(input).fetch().await?;

    let pipeline = LearningPipeline::new(config.clone())?;
    let output = pipeline.run(records)?;

    println!("Fit complete");
    println!(
        "  Train: {} rows x {} columns",
        output.train_features.height(),
        output.train_features.width()
    );
    println!(
        "  Test:  {} rows x {} columns",
        output.test_features.height(),
        output.test_features.width()
    );
    println!(
        "  Medians fitted for {} columns, scale parameters for {}",
        output.parameters.medians.medians.len(),
        output.parameters.scales.columns.len()
    );
    println!("  Artifacts: {}", config.medians_path.display());
    println!("             {}", config.scaler_path.display());

    if emit_matrices {
        let mut train = output.train_features.clone();
        train.with_column(Series::new("diagnosis".into(), output.train_target.clone()))?;
        let mut test = output.test_features.clone();
        test.with_column(Series::new("diagnosis".into(), output.test_target.clone()))?;

        let train_path = artifacts.join("train.csv");
        let test_path = artifacts.join("test.csv");
        write_csv(&train_path, &mut train)?;
        write_csv(&test_path, &mut test)?;
        println!("  Matrices:  {}", train_path.display());
        println!("             {}", test_path.display());
    }

    Ok(())
}

async fn run_transform(input: &Path, artifacts: &Path, output: &Path) -> Result<()> {
    if !input.exists() {
        return Err(anyhow!("input file not found: {}", input.display()));
    }

    let config = PipelineConfig::builder().artifacts_dir(artifacts).build()?;
    let pipeline = ServingPipeline::load(&config)?;

    info!("fetching screening records from {}", input.display());
    let records = CsvSource::new(input).fetch().await?;

    let mut features = pipeline.transform(&records)?;
    write_csv(output, &mut features)?;

    println!("Transform complete");
    println!(
        "  Features: {} rows x {} columns -> {}",
        features.height(),
        features.width(),
        output.display()
    );

    Ok(())
}

fn write_csv(path: &Path, df: &mut DataFrame) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    let mut file = std::fs::File::create(path)?;
    CsvWriter::new(&mut file).include_header(true).finish(df)?;
    Ok(())
}

//! Command-line interface for kolosal-tune

use clap::{Parser, Subcommand};
use colored::*;
use std::path::PathBuf;
use std::time::Instant;

use crate::dataset::{describe_columns, load_dataframe};
use crate::orchestrator::{self, RunContext};
use crate::report::style::{dim, muted, section, step_done, step_run};
use crate::tuning::TuningConfig;

#[derive(Parser)]
#[command(name = "kolosal-tune")]
#[command(author = "KolosalAI")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Grid-search hyperparameter tuning for LR, LDA and SVM classifiers")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Tune every algorithm on a dataset and compare the results
    Tune {
        /// Input data file (CSV, TSV, JSON, or Parquet)
        #[arg(short, long)]
        data: PathBuf,

        /// Directory for written images
        #[arg(short, long, default_value = "output")]
        output: PathBuf,

        /// Columns to drop before splitting, comma separated
        #[arg(long, value_delimiter = ',')]
        drop: Vec<String>,

        /// Label column (defaults to the last column)
        #[arg(short, long)]
        label: Option<String>,

        /// Skip writing the comparison chart
        #[arg(long)]
        no_images: bool,

        /// Number of cross-validation folds
        #[arg(long)]
        folds: Option<usize>,

        /// Seed for the split and fold shuffling
        #[arg(long)]
        seed: Option<u64>,

        /// Fraction of rows held out for validation
        #[arg(long)]
        validation_size: Option<f64>,

        /// Threads used to evaluate grid points
        #[arg(long)]
        n_jobs: Option<usize>,

        /// JSON tuning configuration; flags override its values
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Show data information
    Info {
        /// Input data file
        #[arg(short, long)]
        data: PathBuf,
    },
}

/// Options of the `tune` command
#[derive(Debug, Clone, Default)]
pub struct TuneArgs {
    pub data: PathBuf,
    pub output: PathBuf,
    pub drop: Vec<String>,
    pub label: Option<String>,
    pub no_images: bool,
    pub folds: Option<usize>,
    pub seed: Option<u64>,
    pub validation_size: Option<f64>,
    pub n_jobs: Option<usize>,
    pub config: Option<PathBuf>,
}

impl TuneArgs {
    /// Config file values (or defaults) with command-line overrides applied
    pub fn resolve_config(&self) -> anyhow::Result<TuningConfig> {
        let mut config = match &self.config {
            Some(path) => TuningConfig::from_json_file(path)?,
            None => TuningConfig::default(),
        };
        if let Some(folds) = self.folds {
            config = config.with_n_folds(folds);
        }
        if let Some(seed) = self.seed {
            config = config.with_random_state(seed);
        }
        if let Some(size) = self.validation_size {
            config = config.with_validation_size(size);
        }
        if let Some(n) = self.n_jobs {
            config = config.with_n_jobs(n);
        }
        if let Some(label) = &self.label {
            config = config.with_label_column(label.clone());
        }
        config.validate()?;
        Ok(config)
    }
}

pub fn cmd_tune(args: &TuneArgs) -> anyhow::Result<()> {
    let config = args.resolve_config()?;
    let mut ctx = RunContext::new(config, &args.output).with_images(!args.no_images);
    let summary = orchestrator::run_default(&mut ctx, &args.data, &args.drop)?;

    if let Some(path) = &summary.image_path {
        println!("  {} {}", muted("Chart"), path.display());
    }
    println!();
    Ok(())
}

pub fn cmd_info(data_path: &PathBuf) -> anyhow::Result<()> {
    section("Data Info");

    step_run("Loading data");
    let start = Instant::now();
    let df = load_dataframe(data_path)?;
    step_done(&format!("{:.2}s", start.elapsed().as_secs_f64()));
    println!();

    println!("  {:<12} {}", muted("File"), data_path.display());
    println!("  {:<12} {}", muted("Rows"), df.height());
    println!("  {:<12} {}", muted("Columns"), df.width());
    println!("  {:<12} {:.2} MB", muted("Memory"), df.estimated_size() as f64 / 1024.0 / 1024.0);
    println!();

    println!("  {:<20} {:<12} {:>6} {:>8}", muted("Column"), muted("Type"), muted("Nulls"), muted("Unique"));
    println!("  {}", dim(&"─".repeat(50)));

    for col in describe_columns(&df) {
        println!(
            "  {:<20} {:<12} {:>6} {:>8}",
            col.name,
            col.dtype.truecolor(140, 140, 140),
            col.null_count,
            col.n_unique
        );
    }

    println!();
    println!("  {}", dim("The last column is used as the label unless --label is given"));
    println!();
    Ok(())
}

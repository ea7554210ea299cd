//! End-to-end tuning run
//!
//! Load → drop columns → split → tune every algorithm in isolation → report.
//! Setup and reporting errors abort the run; a failing tuner only removes its
//! own results.

use crate::dataset::{drop_columns, load_dataframe, split_validation};
use crate::error::Result;
use crate::report::{self, console, ImageSequence};
use crate::tuning::{default_tuners, BestResult, TuneOutcome, Tuner, TuningConfig};
use ndarray::{Array1, Array2};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, warn};

/// Settings and run-scoped state of one tuning run
#[derive(Debug, Clone)]
pub struct RunContext {
    pub config: TuningConfig,
    pub output_dir: PathBuf,
    create_images: bool,
    images: ImageSequence,
}

impl RunContext {
    pub fn new(config: TuningConfig, output_dir: impl Into<PathBuf>) -> Self {
        let images = ImageSequence::new(config.image_digits);
        Self {
            config,
            output_dir: output_dir.into(),
            create_images: true,
            images,
        }
    }

    pub fn with_images(mut self, enabled: bool) -> Self {
        self.create_images = enabled;
        self
    }

    pub fn set_create_images(&mut self, enabled: bool) {
        self.create_images = enabled;
    }

    pub fn create_images(&self) -> bool {
        self.create_images
    }

    pub fn images(&self) -> &ImageSequence {
        &self.images
    }
}

/// Everything a run produced
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// One entry per tuner, in tuning order
    pub outcomes: Vec<TuneOutcome>,
    /// `(name, mean test scores)` of every tuned algorithm
    pub results: Vec<(String, Vec<f64>)>,
    pub best_records: Vec<BestResult>,
    pub image_path: Option<PathBuf>,
    pub elapsed_secs: f64,
}

impl RunSummary {
    fn from_outcomes(outcomes: Vec<TuneOutcome>, image_path: Option<PathBuf>, elapsed_secs: f64) -> Self {
        let results = outcomes
            .iter()
            .filter_map(TuneOutcome::report)
            .map(|r| (r.name.clone(), r.mean_test_scores.clone()))
            .collect();
        let best_records = outcomes
            .iter()
            .filter_map(TuneOutcome::report)
            .map(|r| r.best.clone())
            .collect();
        Self {
            outcomes,
            results,
            best_records,
            image_path,
            elapsed_secs,
        }
    }

    pub fn n_tuned(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_tuned()).count()
    }

    pub fn n_failed(&self) -> usize {
        self.outcomes.len() - self.n_tuned()
    }
}

/// Run each tuner in order, isolating failures.
pub fn tune_all(
    tuners: &[Box<dyn Tuner>],
    x: &Array2<f64>,
    y: &Array1<f64>,
    config: &TuningConfig,
) -> Vec<TuneOutcome> {
    let mut outcomes = Vec::with_capacity(tuners.len());
    for tuner in tuners {
        console::print_tuning_start(tuner.name());
        let start = Instant::now();
        match tuner.tune(x, y, config) {
            Ok(report) => {
                console::print_tune_report(&report);
                info!(
                    algorithm = tuner.name(),
                    elapsed_secs = start.elapsed().as_secs_f64(),
                    "Tuner finished"
                );
                outcomes.push(TuneOutcome::Tuned(report));
            }
            Err(e) => {
                let reason = e.to_string();
                console::print_tune_failure(tuner.name(), &reason);
                warn!(algorithm = tuner.name(), error = %reason, "Tuner failed");
                outcomes.push(TuneOutcome::Failed {
                    name: tuner.name().to_string(),
                    reason,
                });
            }
        }
    }
    outcomes
}

/// Tune `tuners` on the dataset at `data_path` and report the comparison.
pub fn run(
    ctx: &mut RunContext,
    data_path: &Path,
    columns_to_drop: &[String],
    tuners: &[Box<dyn Tuner>],
) -> Result<RunSummary> {
    ctx.config.validate()?;
    ctx.images.reset();
    std::fs::create_dir_all(&ctx.output_dir)?;
    let start = Instant::now();
    console::print_opening_banner(data_path, &ctx.output_dir, ctx.create_images);
    info!(data = %data_path.display(), output = %ctx.output_dir.display(), "Run started");

    let df = load_dataframe(data_path)?;
    let df = drop_columns(&df, columns_to_drop)?;
    let split = split_validation(
        &df,
        ctx.config.label_column.as_deref(),
        ctx.config.validation_size,
        ctx.config.random_state,
    )?;

    let outcomes = tune_all(tuners, &split.x_train, &split.y_train, &ctx.config);

    let image_path = report::report_comparison(
        &outcomes,
        &ctx.output_dir,
        ctx.create_images,
        &mut ctx.images,
    )?;

    let elapsed_secs = start.elapsed().as_secs_f64();
    let summary = RunSummary::from_outcomes(outcomes, image_path, elapsed_secs);
    console::print_closing_banner(summary.n_tuned(), summary.n_failed(), elapsed_secs);
    info!(
        tuned = summary.n_tuned(),
        failed = summary.n_failed(),
        elapsed_secs,
        "Run finished"
    );
    Ok(summary)
}

/// [`run`] with the standard LR, LDA and SVM tuners
pub fn run_default(ctx: &mut RunContext, data_path: &Path, columns_to_drop: &[String]) -> Result<RunSummary> {
    run(ctx, data_path, columns_to_drop, &default_tuners())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TuneError;
    use crate::tuning::TuneReport;

    struct Failing;

    impl Tuner for Failing {
        fn name(&self) -> &str {
            "BROKEN"
        }

        fn tune(&self, _x: &Array2<f64>, _y: &Array1<f64>, _c: &TuningConfig) -> Result<TuneReport> {
            Err(TuneError::TrainingError("did not converge".to_string()))
        }
    }

    #[test]
    fn test_failure_is_isolated() {
        let tuners: Vec<Box<dyn Tuner>> = vec![Box::new(Failing), Box::new(Failing)];
        let x = Array2::zeros((4, 2));
        let y = Array1::zeros(4);
        let outcomes = tune_all(&tuners, &x, &y, &TuningConfig::default());
        assert_eq!(outcomes.len(), 2);
        assert!(outcomes.iter().all(|o| !o.is_tuned()));
        match &outcomes[0] {
            TuneOutcome::Failed { name, reason } => {
                assert_eq!(name, "BROKEN");
                assert!(reason.contains("did not converge"));
            }
            TuneOutcome::Tuned(_) => panic!("expected failure"),
        }
    }

    #[test]
    fn test_context_image_toggle() {
        let mut ctx = RunContext::new(TuningConfig::default(), "out");
        assert!(ctx.create_images());
        ctx.set_create_images(false);
        assert!(!ctx.create_images());
        assert_eq!(ctx.images().current(), 1);
    }

    #[test]
    fn test_summary_counts() {
        let outcomes = vec![TuneOutcome::Failed {
            name: "LR".to_string(),
            reason: "x".to_string(),
        }];
        let summary = RunSummary::from_outcomes(outcomes, None, 0.5);
        assert_eq!(summary.n_tuned(), 0);
        assert_eq!(summary.n_failed(), 1);
        assert!(summary.results.is_empty());
        assert!(summary.best_records.is_empty());
    }
}

//! Per-algorithm tuners

use super::config::TuningConfig;
use super::grid::{ParamGrid, ParamSet};
use super::search::{GridSearch, GridSearchResult, RankedResult};
use crate::error::{Result, TuneError};
use crate::preprocessing::PreprocessingPipeline;
use crate::training::{
    KFold, LdaSolver, LinearDiscriminantAnalysis, LogisticRegression, SVMClassifier, SVMConfig,
};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::info;

/// Algorithms with a built-in tuning grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Algorithm {
    #[serde(rename = "LR")]
    LogisticRegression,
    #[serde(rename = "LDA")]
    LinearDiscriminant,
    #[serde(rename = "SVM")]
    SupportVector,
}

impl Algorithm {
    /// Short display name
    pub fn name(&self) -> &'static str {
        match self {
            Algorithm::LogisticRegression => "LR",
            Algorithm::LinearDiscriminant => "LDA",
            Algorithm::SupportVector => "SVM",
        }
    }

    /// The hyperparameter grid searched for this algorithm
    pub fn param_grid(&self) -> ParamGrid {
        match self {
            Algorithm::LogisticRegression => ParamGrid::new()
                .add("C", vec![0.001, 0.01, 0.1, 1.0, 10.0, 100.0, 1000.0]),
            Algorithm::LinearDiscriminant => ParamGrid::new()
                .add("solver", vec!["svd", "lsqr", "eigen"])
                .add("tol", vec![0.00001, 0.0001, 0.001, 0.01]),
            Algorithm::SupportVector => ParamGrid::new()
                .add("C", vec![0.1, 0.3, 0.5, 0.7, 0.9, 1.0, 1.3, 1.5, 1.7, 2.0])
                .add("kernel", vec!["linear", "poly", "rbf", "sigmoid"]),
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Best grid point of one tuned algorithm
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BestResult {
    pub name: String,
    pub mean: f64,
    pub std: f64,
    pub params: ParamSet,
}

/// Everything one successful tuning run produced
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TuneReport {
    pub name: String,
    pub search: GridSearchResult,
    /// Highest fold-size-weighted mean test score
    pub best_score: f64,
    pub best_params: ParamSet,
    /// Grid points by unweighted mean, descending
    pub ranked: Vec<RankedResult>,
    /// Weighted mean test score per grid point, in enumeration order
    pub mean_test_scores: Vec<f64>,
    pub best: BestResult,
}

impl TuneReport {
    /// Derive the summary views of a finished grid search.
    pub fn from_search(name: impl Into<String>, search: GridSearchResult) -> Result<Self> {
        let name = name.into();
        let (best_score, best_params) = match (search.best_score(), search.best_params()) {
            (Some(score), Some(params)) => (score, params.clone()),
            _ => {
                return Err(TuneError::ComputationError(format!(
                    "{}: grid search produced no comparable scores",
                    name
                )))
            }
        };
        let top = search.best_ranked().ok_or_else(|| {
            TuneError::ComputationError(format!("{}: no ranked grid points", name))
        })?;

        Ok(Self {
            best: BestResult {
                name: name.clone(),
                mean: top.mean,
                std: top.std,
                params: top.params,
            },
            ranked: search.ranked(),
            mean_test_scores: search.mean_test_scores(),
            best_score,
            best_params,
            search,
            name,
        })
    }
}

/// Result of one tuner, success or isolated failure
#[derive(Debug, Clone)]
pub enum TuneOutcome {
    Tuned(TuneReport),
    Failed { name: String, reason: String },
}

impl TuneOutcome {
    pub fn name(&self) -> &str {
        match self {
            TuneOutcome::Tuned(report) => &report.name,
            TuneOutcome::Failed { name, .. } => name,
        }
    }

    pub fn report(&self) -> Option<&TuneReport> {
        match self {
            TuneOutcome::Tuned(report) => Some(report),
            TuneOutcome::Failed { .. } => None,
        }
    }

    pub fn is_tuned(&self) -> bool {
        matches!(self, TuneOutcome::Tuned(_))
    }
}

/// Something that can tune a model on training data
pub trait Tuner: Send + Sync {
    fn name(&self) -> &str;

    fn tune(&self, x: &Array2<f64>, y: &Array1<f64>, config: &TuningConfig) -> Result<TuneReport>;
}

/// Preprocess, then grid-search one of the built-in algorithms
#[derive(Debug, Clone)]
pub struct AlgorithmTuner {
    algorithm: Algorithm,
}

impl AlgorithmTuner {
    pub fn new(algorithm: Algorithm) -> Self {
        Self { algorithm }
    }
}

impl Tuner for AlgorithmTuner {
    fn name(&self) -> &str {
        self.algorithm.name()
    }

    fn tune(&self, x: &Array2<f64>, y: &Array1<f64>, config: &TuningConfig) -> Result<TuneReport> {
        config.validate()?;

        let mut pipeline = PreprocessingPipeline::standard(config.pca_components);
        let rescaled = pipeline.fit_transform(x)?;

        let cv = KFold::new(config.n_folds)
            .with_shuffle(config.shuffle_folds)
            .with_random_state(config.random_state);
        let search = GridSearch::new(cv).with_n_jobs(config.n_jobs);
        let grid = self.algorithm.param_grid();

        let result = match self.algorithm {
            Algorithm::LogisticRegression => search.fit(
                &grid,
                |params| Ok(LogisticRegression::new().with_c(params.get_f64("C")?)),
                &rescaled,
                y,
            )?,
            Algorithm::LinearDiscriminant => search.fit(
                &grid,
                |params| {
                    let solver: LdaSolver = params.get_str("solver")?.parse()?;
                    Ok(LinearDiscriminantAnalysis::new(solver).with_tol(params.get_f64("tol")?))
                },
                &rescaled,
                y,
            )?,
            Algorithm::SupportVector => search.fit(
                &grid,
                |params| {
                    Ok(SVMClassifier::new(SVMConfig {
                        c: params.get_f64("C")?,
                        kernel: params.get_str("kernel")?.parse()?,
                        random_state: config.random_state,
                        ..Default::default()
                    }))
                },
                &rescaled,
                y,
            )?,
        };

        let report = TuneReport::from_search(self.algorithm.name(), result)?;
        info!(
            algorithm = %self.algorithm,
            best_score = report.best_score,
            best_params = %report.best_params,
            "Tuning finished"
        );
        Ok(report)
    }
}

/// The tuners of a standard run, in order: LR, LDA, SVM
pub fn default_tuners() -> Vec<Box<dyn Tuner>> {
    vec![
        Box::new(AlgorithmTuner::new(Algorithm::LogisticRegression)),
        Box::new(AlgorithmTuner::new(Algorithm::LinearDiscriminant)),
        Box::new(AlgorithmTuner::new(Algorithm::SupportVector)),
    ]
}

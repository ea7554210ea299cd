//! Exhaustive cross-validated grid search

use super::grid::{ParamGrid, ParamSet};
use crate::error::{Result, TuneError};
use crate::training::{cross_val_score, CVResults, CVSplit, Classifier, KFold};
use ndarray::{Array1, Array2};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::time::Instant;
use tracing::{debug, info};

/// Cross-validation outcome of one grid point
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridPointResult {
    pub params: ParamSet,
    pub cv: CVResults,
}

/// Unweighted mean/std of one grid point, as listed in rankings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedResult {
    pub mean: f64,
    pub std: f64,
    pub params: ParamSet,
}

/// Result of a full grid search
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridSearchResult {
    /// Every grid point in enumeration order
    pub points: Vec<GridPointResult>,
    pub n_folds: usize,
    /// Wall-clock seconds for the whole search
    pub elapsed_secs: f64,
}

impl GridSearchResult {
    /// Fold-size-weighted mean test score of every grid point, in enumeration order.
    pub fn mean_test_scores(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.cv.weighted_mean_score).collect()
    }

    /// Arg-max of the mean test scores; the earliest grid point wins ties.
    pub fn best_index(&self) -> Option<usize> {
        first_argmax(self.points.iter().map(|p| p.cv.weighted_mean_score))
    }

    pub fn best_score(&self) -> Option<f64> {
        self.best_index().map(|i| self.points[i].cv.weighted_mean_score)
    }

    pub fn best_params(&self) -> Option<&ParamSet> {
        self.best_index().map(|i| &self.points[i].params)
    }

    /// Grid points by unweighted mean, descending. The sort is stable, so
    /// equal means keep enumeration order.
    pub fn ranked(&self) -> Vec<RankedResult> {
        let mut ranked: Vec<RankedResult> = self
            .points
            .iter()
            .map(|p| RankedResult {
                mean: p.cv.mean_score,
                std: p.cv.std_score,
                params: p.params.clone(),
            })
            .collect();
        ranked.sort_by(|a, b| b.mean.partial_cmp(&a.mean).unwrap_or(Ordering::Equal));
        ranked
    }

    /// Grid point with the highest unweighted mean; the earliest wins ties.
    pub fn best_ranked(&self) -> Option<RankedResult> {
        first_argmax(self.points.iter().map(|p| p.cv.mean_score)).map(|i| {
            let point = &self.points[i];
            RankedResult {
                mean: point.cv.mean_score,
                std: point.cv.std_score,
                params: point.params.clone(),
            }
        })
    }
}

/// Index of the first maximum; NaN never wins.
fn first_argmax(values: impl Iterator<Item = f64>) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, v) in values.enumerate() {
        match best {
            Some((_, b)) if !(v > b) => {}
            _ if v.is_nan() => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}

/// Grid search driver
#[derive(Debug, Clone)]
pub struct GridSearch {
    cv: KFold,
    n_jobs: usize,
}

impl GridSearch {
    pub fn new(cv: KFold) -> Self {
        Self { cv, n_jobs: 1 }
    }

    /// Evaluate grid points on a dedicated pool of `n` threads when `n > 1`
    pub fn with_n_jobs(mut self, n: usize) -> Self {
        self.n_jobs = n.max(1);
        self
    }

    /// Cross-validate every grid point. `make_model` builds an unfitted
    /// classifier for one parameter set; the first error aborts the search.
    pub fn fit<C, F>(
        &self,
        grid: &ParamGrid,
        make_model: F,
        x: &Array2<f64>,
        y: &Array1<f64>,
    ) -> Result<GridSearchResult>
    where
        C: Classifier,
        F: Fn(&ParamSet) -> Result<C> + Sync,
    {
        let candidates = grid.combinations();
        if candidates.is_empty() {
            return Err(TuneError::ConfigError(
                "parameter grid has no candidates".to_string(),
            ));
        }

        let splits = self.cv.split(x.nrows())?;
        let start = Instant::now();

        let evaluate = |params: &ParamSet| -> Result<GridPointResult> {
            let cv = evaluate_point(&make_model, params, x, y, &splits)?;
            Ok(GridPointResult {
                params: params.clone(),
                cv,
            })
        };

        let points: Vec<GridPointResult> = if self.n_jobs > 1 {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(self.n_jobs)
                .build()
                .map_err(|e| TuneError::ThreadPoolError(e.to_string()))?;
            pool.install(|| candidates.par_iter().map(evaluate).collect::<Result<Vec<_>>>())?
        } else {
            candidates.iter().map(evaluate).collect::<Result<Vec<_>>>()?
        };

        let elapsed_secs = start.elapsed().as_secs_f64();
        info!(
            candidates = points.len(),
            folds = splits.len(),
            n_jobs = self.n_jobs,
            elapsed_secs,
            "Grid search finished"
        );

        Ok(GridSearchResult {
            points,
            n_folds: splits.len(),
            elapsed_secs,
        })
    }
}

fn evaluate_point<C, F>(
    make_model: &F,
    params: &ParamSet,
    x: &Array2<f64>,
    y: &Array1<f64>,
    splits: &[CVSplit],
) -> Result<CVResults>
where
    C: Classifier,
    F: Fn(&ParamSet) -> Result<C>,
{
    let cv = cross_val_score(|| make_model(params), x, y, splits)
        .map_err(|e| TuneError::TrainingError(format!("{} with {}", e, params)))?;
    debug!(
        params = %params,
        mean = cv.mean_score,
        std = cv.std_score,
        weighted_mean = cv.weighted_mean_score,
        "Grid point evaluated"
    );
    Ok(cv)
}

//! Hyperparameter tuning
//!
//! Grid definitions, the cross-validated grid search and the per-algorithm
//! tuners that combine preprocessing with the search.

mod config;
mod grid;
mod search;
mod tuners;

pub use config::TuningConfig;
pub use grid::{ParamGrid, ParamSet, ParamValue};
pub use search::{GridPointResult, GridSearch, GridSearchResult, RankedResult};
pub use tuners::{
    default_tuners, Algorithm, AlgorithmTuner, BestResult, TuneOutcome, TuneReport, Tuner,
};

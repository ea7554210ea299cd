//! Kolosal Tune - hyperparameter tuning for classic classifiers
//!
//! Tunes logistic regression, linear discriminant analysis and kernel SVMs on
//! one tabular dataset with exhaustive grid search and k-fold
//! cross-validation, then compares the tuned algorithms in a box plot.
//!
//! # Modules
//!
//! - [`dataset`] - Loading, column dropping and the train/validation split
//! - [`preprocessing`] - PCA, min-max and standard scaling
//! - [`training`] - Classifiers, k-fold cross-validation and accuracy
//! - [`tuning`] - Parameter grids, grid search and the per-algorithm tuners
//! - [`report`] - Console report and the comparison chart
//! - [`orchestrator`] - The end-to-end run
//! - [`cli`] - Command-line interface

// Core error handling
pub mod error;

pub mod dataset;
pub mod preprocessing;
pub mod training;
pub mod tuning;

pub mod report;
pub mod orchestrator;

pub mod cli;
pub mod utils;

pub use error::{Result, TuneError};
pub use orchestrator::{run, run_default, RunContext, RunSummary};
pub use tuning::{default_tuners, Algorithm, AlgorithmTuner, TuneOutcome, TuneReport, Tuner, TuningConfig};

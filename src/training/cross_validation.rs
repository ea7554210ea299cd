//! K-Fold cross-validation

use super::models::Classifier;
use crate::error::{Result, TuneError};
use crate::utils::{mean_std, select_rows};
use ndarray::{Array1, Array2, Axis};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// A single train/test split
#[derive(Debug, Clone)]
pub struct CVSplit {
    pub train_indices: Vec<usize>,
    pub test_indices: Vec<usize>,
    pub fold_idx: usize,
}

/// K-Fold splitter.
///
/// Fold sizes differ by at most one; the first `n_samples % n_splits` folds
/// get the extra sample. With `shuffle`, row order is permuted with the seed
/// before folds are cut.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KFold {
    pub n_splits: usize,
    pub shuffle: bool,
    pub random_state: u64,
}

impl Default for KFold {
    fn default() -> Self {
        Self::new(10)
    }
}

impl KFold {
    pub fn new(n_splits: usize) -> Self {
        Self {
            n_splits,
            shuffle: true,
            random_state: 7,
        }
    }

    pub fn with_shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }

    /// Set random state for reproducibility
    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = seed;
        self
    }

    /// Generate train/test splits
    pub fn split(&self, n_samples: usize) -> Result<Vec<CVSplit>> {
        let n_splits = self.n_splits;
        if n_splits < 2 {
            return Err(TuneError::ValidationError(
                "n_splits must be at least 2".to_string(),
            ));
        }
        if n_samples < n_splits {
            return Err(TuneError::ValidationError(format!(
                "n_samples ({}) must be >= n_splits ({})",
                n_samples, n_splits
            )));
        }

        let mut indices: Vec<usize> = (0..n_samples).collect();
        if self.shuffle {
            let mut rng = ChaCha8Rng::seed_from_u64(self.random_state);
            indices.shuffle(&mut rng);
        }

        let base = n_samples / n_splits;
        let remainder = n_samples % n_splits;

        let mut splits = Vec::with_capacity(n_splits);
        let mut current = 0;

        for fold_idx in 0..n_splits {
            let fold_size = if fold_idx < remainder { base + 1 } else { base };
            let test_indices: Vec<usize> = indices[current..current + fold_size].to_vec();
            let train_indices: Vec<usize> = indices[..current]
                .iter()
                .chain(indices[current + fold_size..].iter())
                .copied()
                .collect();

            splits.push(CVSplit {
                train_indices,
                test_indices,
                fold_idx,
            });

            current += fold_size;
        }

        Ok(splits)
    }
}

/// Cross-validation results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CVResults {
    /// Scores for each fold
    pub scores: Vec<f64>,
    /// Test-set size of each fold
    pub fold_sizes: Vec<usize>,
    /// Unweighted mean score across folds
    pub mean_score: f64,
    /// Population standard deviation of fold scores
    pub std_score: f64,
    /// Mean score weighted by fold size
    pub weighted_mean_score: f64,
    /// Number of folds
    pub n_folds: usize,
}

impl CVResults {
    /// Create CV results from per-fold scores and test-set sizes
    pub fn from_folds(scores: Vec<f64>, fold_sizes: Vec<usize>) -> Self {
        let n_folds = scores.len();
        let (mean_score, std_score) = mean_std(&scores);

        let total: usize = fold_sizes.iter().sum();
        let weighted_mean_score = if total > 0 {
            scores
                .iter()
                .zip(fold_sizes.iter())
                .map(|(s, &w)| s * w as f64)
                .sum::<f64>()
                / total as f64
        } else {
            mean_score
        };

        Self {
            scores,
            fold_sizes,
            mean_score,
            std_score,
            weighted_mean_score,
            n_folds,
        }
    }
}

/// Fit a fresh model per fold and score it on the held-out rows.
pub fn cross_val_score<C, F>(
    make_model: F,
    x: &Array2<f64>,
    y: &Array1<f64>,
    splits: &[CVSplit],
) -> Result<CVResults>
where
    C: Classifier,
    F: Fn() -> Result<C>,
{
    let mut scores = Vec::with_capacity(splits.len());
    let mut fold_sizes = Vec::with_capacity(splits.len());

    for split in splits {
        let x_train = select_rows(x, &split.train_indices);
        let y_train = y.select(Axis(0), &split.train_indices);
        let x_test = select_rows(x, &split.test_indices);
        let y_test = y.select(Axis(0), &split.test_indices);

        let mut model = make_model()?;
        model.fit(&x_train, &y_train)?;
        scores.push(model.score(&x_test, &y_test)?);
        fold_sizes.push(split.test_indices.len());
    }

    Ok(CVResults::from_folds(scores, fold_sizes))
}

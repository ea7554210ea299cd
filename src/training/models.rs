//! Classifier trait and shared evaluation helpers

use crate::error::{Result, TuneError};
use ndarray::{Array1, Array2};

/// A trainable classifier over class-index labels stored as `f64`.
pub trait Classifier: Send + Sync {
    /// Fit the model to training data
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()>;

    /// Predict class labels
    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>>;

    /// Accuracy of the predictions on `x` against `y`
    fn score(&self, x: &Array2<f64>, y: &Array1<f64>) -> Result<f64> {
        let y_pred = self.predict(x)?;
        Ok(accuracy(y, &y_pred))
    }
}

/// Fraction of predictions equal to the true label (0.0 for empty input).
pub fn accuracy(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> f64 {
    if y_true.is_empty() {
        return 0.0;
    }
    let correct = y_true
        .iter()
        .zip(y_pred.iter())
        .filter(|(t, p)| (*t - *p).abs() < 0.5)
        .count();
    correct as f64 / y_true.len() as f64
}

/// Validate a training pair: non-empty, matching lengths, finite features.
pub(crate) fn check_fit_input(x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
    if x.nrows() == 0 || x.ncols() == 0 {
        return Err(TuneError::TrainingError(
            "training data must have at least one row and one column".to_string(),
        ));
    }
    if x.nrows() != y.len() {
        return Err(TuneError::ShapeError {
            expected: format!("y length = {}", x.nrows()),
            actual: format!("y length = {}", y.len()),
        });
    }
    if x.iter().any(|v| !v.is_finite()) {
        return Err(TuneError::TrainingError(
            "training data contains non-finite values".to_string(),
        ));
    }
    Ok(())
}

/// Sorted distinct class labels; at least two are required.
pub(crate) fn class_labels(y: &Array1<f64>) -> Result<Vec<f64>> {
    for (i, &v) in y.iter().enumerate() {
        if (v - v.round()).abs() > 1e-9 {
            return Err(TuneError::TrainingError(format!(
                "class labels must be integral, sample {} has label {}",
                i, v
            )));
        }
    }

    let mut classes: Vec<f64> = y.iter().map(|v| v.round()).collect();
    classes.sort_by(|a, b| a.total_cmp(b));
    classes.dedup();

    if classes.len() < 2 {
        return Err(TuneError::TrainingError(
            "at least 2 distinct classes are required".to_string(),
        ));
    }
    Ok(classes)
}

/// Index of the largest value; the first one wins ties.
pub(crate) fn argmax<'a>(values: impl IntoIterator<Item = &'a f64>) -> usize {
    let mut best = 0;
    let mut best_value = f64::NEG_INFINITY;
    for (i, &v) in values.into_iter().enumerate() {
        if v > best_value {
            best = i;
            best_value = v;
        }
    }
    best
}

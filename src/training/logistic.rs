//! L2-regularized logistic regression

use super::models::{argmax, check_fit_input, class_labels, Classifier};
use crate::error::{Result, TuneError};
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Logistic regression classifier.
///
/// Minimizes `0.5 * ||w||² + C * Σ logloss` with full-batch gradient descent.
/// The intercept is not penalized. More than two classes are handled
/// one-vs-rest, predicting the class with the highest decision score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticRegression {
    /// Inverse regularization strength
    pub c: f64,
    /// Maximum gradient steps per binary problem
    pub max_iter: usize,
    /// Gradient-norm convergence tolerance
    pub tol: f64,
    classes: Vec<f64>,
    /// One row per binary problem
    coefficients: Option<Array2<f64>>,
    intercepts: Option<Array1<f64>>,
    is_fitted: bool,
}

impl Default for LogisticRegression {
    fn default() -> Self {
        Self::new()
    }
}

impl LogisticRegression {
    pub fn new() -> Self {
        Self {
            c: 1.0,
            max_iter: 1000,
            tol: 1e-4,
            classes: Vec::new(),
            coefficients: None,
            intercepts: None,
            is_fitted: false,
        }
    }

    /// Set inverse regularization strength
    pub fn with_c(mut self, c: f64) -> Self {
        self.c = c;
        self
    }

    pub fn with_tol(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }

    pub fn classes(&self) -> &[f64] {
        &self.classes
    }

    fn sigmoid(z: &Array1<f64>) -> Array1<f64> {
        z.mapv(|v| 1.0 / (1.0 + (-v).exp()))
    }

    /// Gradient descent on one binary problem with 0/1 targets.
    fn fit_binary(&self, x: &Array2<f64>, targets: &Array1<f64>) -> (Array1<f64>, f64) {
        let n_samples = x.nrows() as f64;
        let alpha = 1.0 / (self.c * n_samples);

        // Step from the Lipschitz bound of the mean log-loss gradient
        let mean_sq_norm = x.mapv(|v| v * v).sum() / n_samples;
        let lr = 1.0 / (0.25 * (mean_sq_norm + 1.0) + alpha);

        let mut weights = Array1::zeros(x.ncols());
        let mut bias = 0.0;

        for iter in 0..self.max_iter {
            let linear = x.dot(&weights) + bias;
            let errors = &Self::sigmoid(&linear) - targets;

            let dw = (x.t().dot(&errors) / n_samples) + (alpha * &weights);
            let db = errors.mean().unwrap_or(0.0);

            let grad_norm = (dw.mapv(|v| v * v).sum() + db * db).sqrt();
            if grad_norm < self.tol {
                trace!(iter, grad_norm, "Logistic regression converged");
                break;
            }

            weights = weights - lr * dw;
            bias -= lr * db;
        }

        (weights, bias)
    }

    /// Raw decision scores, one column per binary problem.
    pub fn decision_function(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        let (coefficients, intercepts) = match (&self.coefficients, &self.intercepts) {
            (Some(c), Some(i)) if self.is_fitted => (c, i),
            _ => return Err(TuneError::ModelNotFitted),
        };
        if x.ncols() != coefficients.ncols() {
            return Err(TuneError::ShapeError {
                expected: format!("{} features", coefficients.ncols()),
                actual: format!("{} features", x.ncols()),
            });
        }
        Ok(x.dot(&coefficients.t()) + intercepts)
    }
}

impl Classifier for LogisticRegression {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        if !(self.c > 0.0) {
            return Err(TuneError::InvalidParameter {
                name: "C".to_string(),
                value: self.c.to_string(),
                reason: "must be positive".to_string(),
            });
        }
        check_fit_input(x, y)?;
        let classes = class_labels(y)?;

        // Binary problems fit a single model for the larger label
        let positives: Vec<f64> = if classes.len() == 2 {
            vec![classes[1]]
        } else {
            classes.clone()
        };

        let mut coefficients = Array2::zeros((positives.len(), x.ncols()));
        let mut intercepts = Array1::zeros(positives.len());
        for (k, &positive) in positives.iter().enumerate() {
            let targets = y.mapv(|v| if v.round() == positive { 1.0 } else { 0.0 });
            let (w, b) = self.fit_binary(x, &targets);
            coefficients.row_mut(k).assign(&w);
            intercepts[k] = b;
        }

        self.classes = classes;
        self.coefficients = Some(coefficients);
        self.intercepts = Some(intercepts);
        self.is_fitted = true;
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let scores = self.decision_function(x)?;

        if self.classes.len() == 2 {
            return Ok(scores
                .column(0)
                .mapv(|s| if s > 0.0 { self.classes[1] } else { self.classes[0] }));
        }

        Ok(scores
            .axis_iter(Axis(0))
            .map(|row| self.classes[argmax(row.iter())])
            .collect())
    }
}

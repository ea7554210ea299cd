//! Support Vector Machine classifier
//!
//! Kernel SVM trained with SMO (Sequential Minimal Optimization). Binary
//! problems are solved directly; more than two classes use one-vs-rest.

use super::models::{argmax, check_fit_input, class_labels, Classifier};
use crate::error::{Result, TuneError};
use ndarray::{Array1, Array2, ArrayView1, Axis};
use rand::prelude::*;
use rand_xoshiro::Xoshiro256PlusPlus;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Maximum number of samples for eager kernel matrix computation.
/// Beyond this, training will return an error to prevent OOM.
const MAX_KERNEL_MATRIX_SAMPLES: usize = 10_000;

/// Kernel function type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KernelType {
    /// K(x, y) = x · y
    Linear,
    /// K(x, y) = (γ x · y + r)^d
    Poly,
    /// K(x, y) = exp(-γ ||x - y||²)
    Rbf,
    /// K(x, y) = tanh(γ x · y + r)
    Sigmoid,
}

impl Default for KernelType {
    fn default() -> Self {
        KernelType::Rbf
    }
}

impl fmt::Display for KernelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            KernelType::Linear => "linear",
            KernelType::Poly => "poly",
            KernelType::Rbf => "rbf",
            KernelType::Sigmoid => "sigmoid",
        };
        f.write_str(name)
    }
}

impl FromStr for KernelType {
    type Err = TuneError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "linear" => Ok(KernelType::Linear),
            "poly" => Ok(KernelType::Poly),
            "rbf" => Ok(KernelType::Rbf),
            "sigmoid" => Ok(KernelType::Sigmoid),
            other => Err(TuneError::InvalidParameter {
                name: "kernel".to_string(),
                value: other.to_string(),
                reason: "expected one of linear, poly, rbf, sigmoid".to_string(),
            }),
        }
    }
}

/// Kernel coefficient
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Gamma {
    /// `1 / (n_features * Var(X))`, resolved at fit time
    Scale,
    Value(f64),
}

/// SVM configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SVMConfig {
    /// Regularization parameter (C)
    pub c: f64,
    pub kernel: KernelType,
    pub gamma: Gamma,
    /// Polynomial degree
    pub degree: i32,
    /// Independent term of the poly and sigmoid kernels
    pub coef0: f64,
    /// Tolerance for the KKT check
    pub tol: f64,
    /// Maximum number of passes over the data
    pub max_iter: usize,
    /// Seed for partner selection
    pub random_state: u64,
}

impl Default for SVMConfig {
    fn default() -> Self {
        Self {
            c: 1.0,
            kernel: KernelType::Rbf,
            gamma: Gamma::Scale,
            degree: 3,
            coef0: 0.0,
            tol: 1e-3,
            max_iter: 1000,
            random_state: 7,
        }
    }
}

/// Kernel with its coefficients resolved for one training set
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct Kernel {
    kind: KernelType,
    gamma: f64,
    degree: i32,
    coef0: f64,
}

impl Kernel {
    fn eval(&self, a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
        match self.kind {
            KernelType::Linear => a.dot(&b),
            KernelType::Poly => (self.gamma * a.dot(&b) + self.coef0).powi(self.degree),
            KernelType::Rbf => {
                let norm_sq: f64 = a.iter().zip(b.iter()).map(|(x, y)| (x - y).powi(2)).sum();
                (-self.gamma * norm_sq).exp()
            }
            KernelType::Sigmoid => (self.gamma * a.dot(&b) + self.coef0).tanh(),
        }
    }

    /// Full kernel matrix, rows computed in parallel for larger inputs.
    fn matrix(&self, x: &Array2<f64>) -> Array2<f64> {
        let n = x.nrows();
        let mut k = Array2::zeros((n, n));

        // For small matrices, sequential is faster due to overhead
        if n < 100 {
            for i in 0..n {
                for j in i..n {
                    let val = self.eval(x.row(i), x.row(j));
                    k[[i, j]] = val;
                    k[[j, i]] = val;
                }
            }
            return k;
        }

        let rows: Vec<Vec<f64>> = (0..n)
            .into_par_iter()
            .map(|i| (i..n).map(|j| self.eval(x.row(i), x.row(j))).collect())
            .collect();
        for (i, row_vals) in rows.into_iter().enumerate() {
            for (offset, val) in row_vals.into_iter().enumerate() {
                let j = i + offset;
                k[[i, j]] = val;
                k[[j, i]] = val;
            }
        }
        k
    }
}

/// A single binary SVM (positive class vs the rest)
#[derive(Debug, Clone, Serialize, Deserialize)]
struct BinarySVM {
    support_vectors: Array2<f64>,
    /// alpha_i * y_i for every support vector
    dual_coef: Array1<f64>,
    bias: f64,
}

impl BinarySVM {
    fn decision(&self, kernel: &Kernel, sample: ArrayView1<f64>) -> f64 {
        self.support_vectors
            .axis_iter(Axis(0))
            .zip(self.dual_coef.iter())
            .map(|(sv, &coef)| coef * kernel.eval(sample, sv))
            .sum::<f64>()
            + self.bias
    }
}

/// Support Vector Classifier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SVMClassifier {
    config: SVMConfig,
    kernel: Option<Kernel>,
    classes: Vec<f64>,
    /// One model for binary problems, one per class otherwise
    estimators: Vec<BinarySVM>,
    is_fitted: bool,
}

impl Default for SVMClassifier {
    fn default() -> Self {
        Self::new(SVMConfig::default())
    }
}

impl SVMClassifier {
    /// Create a new SVM classifier
    pub fn new(config: SVMConfig) -> Self {
        Self {
            config,
            kernel: None,
            classes: Vec::new(),
            estimators: Vec::new(),
            is_fitted: false,
        }
    }

    pub fn config(&self) -> &SVMConfig {
        &self.config
    }

    /// Get number of support vectors across all binary models
    pub fn n_support_vectors(&self) -> usize {
        self.estimators.iter().map(|e| e.support_vectors.nrows()).sum()
    }

    fn resolve_gamma(&self, x: &Array2<f64>) -> f64 {
        match self.config.gamma {
            Gamma::Value(g) => g,
            Gamma::Scale => {
                let n = x.len() as f64;
                let mean = x.sum() / n;
                let var = x.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
                if var > 0.0 {
                    1.0 / (x.ncols() as f64 * var)
                } else {
                    1.0
                }
            }
        }
    }

    /// SMO over a precomputed kernel matrix with ±1 targets.
    ///
    /// Errors `E_i = f(x_i) - y_i` are cached and updated in O(n) after
    /// every successful pair step.
    fn smo_train(&self, k: &Array2<f64>, y: &Array1<f64>) -> (Array1<f64>, f64) {
        let n = y.len();
        let c = self.config.c;
        let tol = self.config.tol;

        let mut alphas = Array1::<f64>::zeros(n);
        let mut bias = 0.0;
        let mut errors: Array1<f64> = y.mapv(|v| -v);

        let mut rng = Xoshiro256PlusPlus::seed_from_u64(self.config.random_state);

        let mut passes = 0;
        let max_passes = 5;
        let mut total_iter = 0;

        while passes < max_passes && total_iter < self.config.max_iter && n > 1 {
            let mut num_changed = 0;

            for i in 0..n {
                let e_i = errors[i];

                // Check KKT conditions
                if !((y[i] * e_i < -tol && alphas[i] < c) || (y[i] * e_i > tol && alphas[i] > 0.0)) {
                    continue;
                }

                let j = loop {
                    let j = rng.gen_range(0..n);
                    if j != i {
                        break j;
                    }
                };
                let e_j = errors[j];

                let alpha_i_old = alphas[i];
                let alpha_j_old = alphas[j];

                let (l, h) = if y[i] != y[j] {
                    ((alpha_j_old - alpha_i_old).max(0.0), (c + alpha_j_old - alpha_i_old).min(c))
                } else {
                    ((alpha_i_old + alpha_j_old - c).max(0.0), (alpha_i_old + alpha_j_old).min(c))
                };
                if (l - h).abs() < 1e-10 {
                    continue;
                }

                let eta = 2.0 * k[[i, j]] - k[[i, i]] - k[[j, j]];
                if eta >= 0.0 {
                    continue;
                }

                let alpha_j = (alpha_j_old - y[j] * (e_i - e_j) / eta).clamp(l, h);
                if (alpha_j - alpha_j_old).abs() < 1e-5 {
                    continue;
                }
                let alpha_i = alpha_i_old + y[i] * y[j] * (alpha_j_old - alpha_j);

                let d_i = y[i] * (alpha_i - alpha_i_old);
                let d_j = y[j] * (alpha_j - alpha_j_old);

                let b1 = bias - e_i - d_i * k[[i, i]] - d_j * k[[i, j]];
                let b2 = bias - e_j - d_i * k[[i, j]] - d_j * k[[j, j]];
                let new_bias = if alpha_i > 0.0 && alpha_i < c {
                    b1
                } else if alpha_j > 0.0 && alpha_j < c {
                    b2
                } else {
                    (b1 + b2) / 2.0
                };

                let d_b = new_bias - bias;
                for (m, e) in errors.iter_mut().enumerate() {
                    *e += d_i * k[[i, m]] + d_j * k[[j, m]] + d_b;
                }

                alphas[i] = alpha_i;
                alphas[j] = alpha_j;
                bias = new_bias;
                num_changed += 1;
            }

            total_iter += 1;
            if num_changed == 0 {
                passes += 1;
            } else {
                passes = 0;
            }
        }

        (alphas, bias)
    }

    fn fit_binary(&self, x: &Array2<f64>, k: &Array2<f64>, y_binary: &Array1<f64>) -> BinarySVM {
        let (alphas, bias) = self.smo_train(k, y_binary);

        // Support vectors have alpha > 0
        let support: Vec<usize> = alphas
            .iter()
            .enumerate()
            .filter(|(_, &a)| a > 1e-8)
            .map(|(i, _)| i)
            .collect();

        BinarySVM {
            support_vectors: x.select(Axis(0), &support),
            dual_coef: support.iter().map(|&i| alphas[i] * y_binary[i]).collect(),
            bias,
        }
    }

    fn fitted_kernel(&self) -> Result<&Kernel> {
        match &self.kernel {
            Some(kernel) if self.is_fitted => Ok(kernel),
            _ => Err(TuneError::ModelNotFitted),
        }
    }

    /// Decision scores, one column per binary model.
    pub fn decision_function(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        let kernel = self.fitted_kernel()?;
        let n_features = self
            .estimators
            .first()
            .map(|e| e.support_vectors.ncols())
            .unwrap_or(x.ncols());
        if x.ncols() != n_features {
            return Err(TuneError::ShapeError {
                expected: format!("{} features", n_features),
                actual: format!("{} features", x.ncols()),
            });
        }

        let mut scores = Array2::zeros((x.nrows(), self.estimators.len()));
        for (i, sample) in x.axis_iter(Axis(0)).enumerate() {
            for (m, estimator) in self.estimators.iter().enumerate() {
                scores[[i, m]] = estimator.decision(kernel, sample);
            }
        }
        Ok(scores)
    }
}

impl Classifier for SVMClassifier {
    /// Fit the classifier (binary directly, multi-class via One-vs-Rest)
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        if !(self.config.c > 0.0) {
            return Err(TuneError::InvalidParameter {
                name: "C".to_string(),
                value: self.config.c.to_string(),
                reason: "must be positive".to_string(),
            });
        }
        check_fit_input(x, y)?;
        let classes = class_labels(y)?;

        if x.nrows() > MAX_KERNEL_MATRIX_SAMPLES {
            return Err(TuneError::TrainingError(format!(
                "{} samples exceed the SVM kernel matrix limit of {}",
                x.nrows(),
                MAX_KERNEL_MATRIX_SAMPLES
            )));
        }

        let kernel = Kernel {
            kind: self.config.kernel,
            gamma: self.resolve_gamma(x),
            degree: self.config.degree,
            coef0: self.config.coef0,
        };
        let k = kernel.matrix(x);

        let positives: Vec<f64> = if classes.len() == 2 {
            vec![classes[1]]
        } else {
            classes.clone()
        };

        self.estimators = positives
            .iter()
            .map(|&positive| {
                let y_binary = y.mapv(|v| if v.round() == positive { 1.0 } else { -1.0 });
                self.fit_binary(x, &k, &y_binary)
            })
            .collect();

        self.kernel = Some(kernel);
        self.classes = classes;
        self.is_fitted = true;
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let scores = self.decision_function(x)?;

        if self.classes.len() == 2 {
            return Ok(scores
                .column(0)
                .mapv(|s| if s >= 0.0 { self.classes[1] } else { self.classes[0] }));
        }

        Ok(scores
            .axis_iter(Axis(0))
            .map(|row| self.classes[argmax(row.iter())])
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_linear_separable_data() -> (Array2<f64>, Array1<f64>) {
        let x = Array2::from_shape_vec((10, 2), vec![
            1.0, 1.0,
            1.5, 1.2,
            2.0, 2.0,
            1.2, 1.8,
            0.8, 1.5,
            5.0, 5.0,
            5.5, 5.2,
            6.0, 6.0,
            5.2, 5.8,
            4.8, 5.5,
        ]).unwrap();

        let y = Array1::from_vec(vec![0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0, 1.0]);

        (x, y)
    }

    #[test]
    fn test_kernel_parse_and_display() {
        for name in ["linear", "poly", "rbf", "sigmoid"] {
            let kernel: KernelType = name.parse().unwrap();
            assert_eq!(kernel.to_string(), name);
        }
        assert!("cubic".parse::<KernelType>().is_err());
    }

    #[test]
    fn test_svm_classifier_linear() {
        let (x, y) = create_linear_separable_data();

        let config = SVMConfig {
            c: 1.0,
            kernel: KernelType::Linear,
            ..Default::default()
        };

        let mut svm = SVMClassifier::new(config);
        svm.fit(&x, &y).unwrap();

        let accuracy = svm.score(&x, &y).unwrap();
        assert!(accuracy > 0.8, "Accuracy {} should be > 0.8", accuracy);
        assert!(svm.n_support_vectors() > 0);
    }

    #[test]
    fn test_svm_classifier_rbf() {
        let (x, y) = create_linear_separable_data();

        let config = SVMConfig {
            c: 1.0,
            kernel: KernelType::Rbf,
            gamma: Gamma::Value(0.5),
            ..Default::default()
        };

        let mut svm = SVMClassifier::new(config);
        svm.fit(&x, &y).unwrap();

        let predictions = svm.predict(&x).unwrap();
        assert_eq!(predictions.len(), 10);
        assert!(svm.score(&x, &y).unwrap() > 0.8);
    }

    #[test]
    fn test_svm_classifier_multiclass() {
        let x = Array2::from_shape_vec((15, 2), vec![
            1.0, 1.0,  1.5, 1.2,  2.0, 2.0,  1.2, 1.8,  0.8, 1.5,
            5.0, 5.0,  5.5, 5.2,  6.0, 6.0,  5.2, 5.8,  4.8, 5.5,
            1.0, 5.0,  1.5, 5.2,  2.0, 6.0,  1.2, 5.8,  0.8, 5.5,
        ]).unwrap();

        let y = Array1::from_vec(vec![
            0.0, 0.0, 0.0, 0.0, 0.0,
            1.0, 1.0, 1.0, 1.0, 1.0,
            2.0, 2.0, 2.0, 2.0, 2.0,
        ]);

        let config = SVMConfig {
            c: 10.0,
            kernel: KernelType::Rbf,
            gamma: Gamma::Value(0.5),
            ..Default::default()
        };

        let mut svm = SVMClassifier::new(config);
        svm.fit(&x, &y).unwrap();

        let predictions = svm.predict(&x).unwrap();
        for &p in predictions.iter() {
            assert!(p == 0.0 || p == 1.0 || p == 2.0, "Unexpected class: {}", p);
        }

        let accuracy = svm.score(&x, &y).unwrap();
        assert!(accuracy > 0.6, "Multi-class accuracy {} should be > 0.6", accuracy);
    }

    #[test]
    fn test_every_kernel_fits() {
        let (x, y) = create_linear_separable_data();
        for kernel in [KernelType::Linear, KernelType::Poly, KernelType::Rbf, KernelType::Sigmoid] {
            let mut svm = SVMClassifier::new(SVMConfig {
                kernel,
                ..Default::default()
            });
            svm.fit(&x, &y).unwrap();
            assert_eq!(svm.predict(&x).unwrap().len(), 10);
        }
    }

    #[test]
    fn test_training_is_deterministic() {
        let (x, y) = create_linear_separable_data();
        let mut a = SVMClassifier::default();
        let mut b = SVMClassifier::default();
        a.fit(&x, &y).unwrap();
        b.fit(&x, &y).unwrap();
        assert_eq!(a.decision_function(&x).unwrap(), b.decision_function(&x).unwrap());
    }

    #[test]
    fn test_gamma_scale() {
        let x = Array2::from_shape_vec((2, 2), vec![0.0, 0.0, 2.0, 2.0]).unwrap();
        let svm = SVMClassifier::default();
        // Var over all entries is 1.0, two features
        assert!((svm.resolve_gamma(&x) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_invalid_c() {
        let (x, y) = create_linear_separable_data();
        let mut svm = SVMClassifier::new(SVMConfig {
            c: -1.0,
            ..Default::default()
        });
        assert!(matches!(svm.fit(&x, &y), Err(TuneError::InvalidParameter { .. })));
    }

    #[test]
    fn test_single_class_rejected() {
        let x = Array2::from_shape_vec((3, 1), vec![1.0, 2.0, 3.0]).unwrap();
        let y = Array1::from_vec(vec![1.0, 1.0, 1.0]);
        let mut svm = SVMClassifier::default();
        assert!(svm.fit(&x, &y).is_err());
    }
}

//! Linear Discriminant Analysis classifier
//!
//! Gaussian class-conditional model with a shared covariance matrix. The
//! decision score for class k is `x·β_k - ½ μ_k·β_k + ln π_k`, where β_k
//! solves `Σ β_k = μ_k`. The three solvers differ in how β is obtained:
//!
//! - `svd`: pseudo-inverse of Σ truncated at `tol`, computed on the
//!   correlation-scaled covariance
//! - `lsqr`: direct symmetric solve (Cholesky with ridge fallback)
//! - `eigen`: generalized eigenproblem `S_b v = λ Σ v` via a Cholesky factor
//!   of Σ, which must be positive definite
//!
//! `tol` only affects the `svd` solver.

use super::models::{argmax, check_fit_input, class_labels, Classifier};
use crate::error::{Result, TuneError};
use crate::utils::{cholesky_factor, lower_triangular_inverse, solve_symmetric, symmetric_eigen};
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Strategy used to invert the within-class covariance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LdaSolver {
    Svd,
    Lsqr,
    Eigen,
}

impl Default for LdaSolver {
    fn default() -> Self {
        LdaSolver::Svd
    }
}

impl fmt::Display for LdaSolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LdaSolver::Svd => "svd",
            LdaSolver::Lsqr => "lsqr",
            LdaSolver::Eigen => "eigen",
        };
        f.write_str(name)
    }
}

impl FromStr for LdaSolver {
    type Err = TuneError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "svd" => Ok(LdaSolver::Svd),
            "lsqr" => Ok(LdaSolver::Lsqr),
            "eigen" => Ok(LdaSolver::Eigen),
            other => Err(TuneError::InvalidParameter {
                name: "solver".to_string(),
                value: other.to_string(),
                reason: "expected one of svd, lsqr, eigen".to_string(),
            }),
        }
    }
}

/// Linear Discriminant Analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearDiscriminantAnalysis {
    pub solver: LdaSolver,
    /// Singular value threshold for the `svd` solver
    pub tol: f64,
    classes: Vec<f64>,
    priors: Option<Array1<f64>>,
    /// Class means, one row per class
    means: Option<Array2<f64>>,
    /// Discriminant weights, one row per class
    coef: Option<Array2<f64>>,
    intercept: Option<Array1<f64>>,
    is_fitted: bool,
}

impl Default for LinearDiscriminantAnalysis {
    fn default() -> Self {
        Self::new(LdaSolver::Svd)
    }
}

impl LinearDiscriminantAnalysis {
    pub fn new(solver: LdaSolver) -> Self {
        Self {
            solver,
            tol: 1e-4,
            classes: Vec::new(),
            priors: None,
            means: None,
            coef: None,
            intercept: None,
            is_fitted: false,
        }
    }

    pub fn with_tol(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }

    pub fn priors(&self) -> Option<&Array1<f64>> {
        self.priors.as_ref()
    }

    pub fn means(&self) -> Option<&Array2<f64>> {
        self.means.as_ref()
    }

    /// Per-class discriminant scores, one column per class.
    pub fn decision_function(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        let (coef, intercept) = match (&self.coef, &self.intercept) {
            (Some(c), Some(i)) if self.is_fitted => (c, i),
            _ => return Err(TuneError::ModelNotFitted),
        };
        if x.ncols() != coef.ncols() {
            return Err(TuneError::ShapeError {
                expected: format!("{} features", coef.ncols()),
                actual: format!("{} features", x.ncols()),
            });
        }
        Ok(x.dot(&coef.t()) + intercept)
    }

    /// Map of Σ⁻¹ (or its truncated pseudo-inverse) applied to every class mean.
    fn solve_weights(&self, sigma: &Array2<f64>, means: &Array2<f64>, priors: &Array1<f64>) -> Result<Array2<f64>> {
        match self.solver {
            LdaSolver::Svd => {
                let pinv = truncated_pseudo_inverse(sigma, self.tol)?;
                Ok(means.dot(&pinv))
            }
            LdaSolver::Lsqr => {
                let mut coef = Array2::zeros(means.raw_dim());
                for (k, mean) in means.axis_iter(Axis(0)).enumerate() {
                    let beta = solve_symmetric(sigma, &mean.to_owned()).ok_or_else(|| {
                        TuneError::ComputationError(
                            "within-class covariance is singular".to_string(),
                        )
                    })?;
                    coef.row_mut(k).assign(&beta);
                }
                Ok(coef)
            }
            LdaSolver::Eigen => {
                let l = cholesky_factor(sigma).ok_or_else(|| {
                    TuneError::ComputationError(
                        "within-class covariance is not positive definite".to_string(),
                    )
                })?;
                let l_inv = lower_triangular_inverse(&l).ok_or_else(|| {
                    TuneError::ComputationError("singular Cholesky factor".to_string())
                })?;

                // Between-class scatter around the prior-weighted overall mean
                let overall = priors.dot(means);
                let centered = means - &overall;
                let weighted = &centered * &priors.view().insert_axis(Axis(1));
                let s_b = centered.t().dot(&weighted);

                let reduced = l_inv.dot(&s_b).dot(&l_inv.t());
                let (_, w) = symmetric_eigen(&reduced);
                // Columns are Σ-orthonormal: Vᵀ Σ V = I
                let v = l_inv.t().dot(&w);
                Ok(means.dot(&v).dot(&v.t()))
            }
        }
    }
}

/// Pseudo-inverse of a covariance matrix, dropping directions whose singular
/// value on the correlation scale is at most `tol`.
fn truncated_pseudo_inverse(sigma: &Array2<f64>, tol: f64) -> Result<Array2<f64>> {
    let scale = sigma
        .diag()
        .mapv(|v| if v > 0.0 { v.sqrt() } else { 1.0 });
    let outer = scale
        .view()
        .insert_axis(Axis(1))
        .dot(&scale.view().insert_axis(Axis(0)));
    let correlation = sigma / &outer;

    let (eigenvalues, eigenvectors) = symmetric_eigen(&correlation);
    let kept: Vec<usize> = eigenvalues
        .iter()
        .enumerate()
        .filter(|(_, &ev)| ev > 0.0 && ev.sqrt() > tol)
        .map(|(i, _)| i)
        .collect();

    if kept.is_empty() {
        return Err(TuneError::ComputationError(
            "all within-class variance directions fall below tol".to_string(),
        ));
    }

    let u = eigenvectors.select(Axis(1), &kept);
    let inv_ev = Array1::from_iter(kept.iter().map(|&i| 1.0 / eigenvalues[i]));
    let pinv_correlation = (&u * &inv_ev).dot(&u.t());

    Ok(pinv_correlation / &outer)
}

impl Classifier for LinearDiscriminantAnalysis {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        if !(self.tol > 0.0) {
            return Err(TuneError::InvalidParameter {
                name: "tol".to_string(),
                value: self.tol.to_string(),
                reason: "must be positive".to_string(),
            });
        }
        check_fit_input(x, y)?;
        let classes = class_labels(y)?;

        let n_samples = x.nrows();
        let n_features = x.ncols();
        let n_classes = classes.len();

        let class_of: Vec<usize> = y
            .iter()
            .map(|v| classes.iter().position(|&c| c == v.round()).unwrap_or(0))
            .collect();

        let mut counts = vec![0usize; n_classes];
        let mut means = Array2::<f64>::zeros((n_classes, n_features));
        for (row, &k) in x.axis_iter(Axis(0)).zip(class_of.iter()) {
            counts[k] += 1;
            let mut mean = means.row_mut(k);
            mean += &row;
        }
        for (k, mut mean) in means.axis_iter_mut(Axis(0)).enumerate() {
            mean /= counts[k] as f64;
        }
        let priors = Array1::from_iter(counts.iter().map(|&c| c as f64 / n_samples as f64));

        // Σ = Σ_k π_k Cov_k with biased class covariances
        let mut centered = x.to_owned();
        for (mut row, &k) in centered.axis_iter_mut(Axis(0)).zip(class_of.iter()) {
            row -= &means.row(k);
        }
        let sigma = centered.t().dot(&centered) / n_samples as f64;

        let coef = self.solve_weights(&sigma, &means, &priors)?;
        let intercept = Array1::from_iter((0..n_classes).map(|k| {
            -0.5 * means.row(k).dot(&coef.row(k)) + priors[k].ln()
        }));

        self.classes = classes;
        self.priors = Some(priors);
        self.means = Some(means);
        self.coef = Some(coef);
        self.intercept = Some(intercept);
        self.is_fitted = true;
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let scores = self.decision_function(x)?;
        Ok(scores
            .axis_iter(Axis(0))
            .map(|row| self.classes[argmax(row.iter())])
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn two_blobs() -> (Array2<f64>, Array1<f64>) {
        let x = array![
            [1.0, 2.0],
            [1.5, 1.8],
            [2.0, 2.4],
            [1.2, 1.1],
            [0.8, 1.6],
            [5.0, 6.0],
            [5.5, 5.8],
            [6.0, 6.4],
            [5.2, 5.1],
            [4.8, 5.6],
        ];
        let y = array![0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0, 1.0];
        (x, y)
    }

    #[test]
    fn test_solver_parse_and_display() {
        for name in ["svd", "lsqr", "eigen"] {
            let solver: LdaSolver = name.parse().unwrap();
            assert_eq!(solver.to_string(), name);
        }
        assert!("cholesky".parse::<LdaSolver>().is_err());
    }

    #[test]
    fn test_all_solvers_separate_blobs() {
        let (x, y) = two_blobs();
        for solver in [LdaSolver::Svd, LdaSolver::Lsqr, LdaSolver::Eigen] {
            let mut lda = LinearDiscriminantAnalysis::new(solver);
            lda.fit(&x, &y).unwrap();
            let accuracy = lda.score(&x, &y).unwrap();
            assert_eq!(accuracy, 1.0, "solver {} accuracy {}", solver, accuracy);
        }
    }

    #[test]
    fn test_solvers_agree_on_full_rank_data() {
        let (x, y) = two_blobs();
        let probe = array![[3.0, 3.5], [2.0, 5.0], [4.5, 3.0]];

        let mut lsqr = LinearDiscriminantAnalysis::new(LdaSolver::Lsqr);
        lsqr.fit(&x, &y).unwrap();
        let mut eigen = LinearDiscriminantAnalysis::new(LdaSolver::Eigen);
        eigen.fit(&x, &y).unwrap();
        let mut svd = LinearDiscriminantAnalysis::new(LdaSolver::Svd).with_tol(1e-8);
        svd.fit(&x, &y).unwrap();

        let a = lsqr.decision_function(&probe).unwrap();
        let b = eigen.decision_function(&probe).unwrap();
        let c = svd.decision_function(&probe).unwrap();
        for ((l, r), s) in a.iter().zip(b.iter()).zip(c.iter()) {
            assert!((l - r).abs() < 1e-6, "lsqr {} vs eigen {}", l, r);
            assert!((l - s).abs() < 1e-6, "lsqr {} vs svd {}", l, s);
        }
    }

    #[test]
    fn test_priors_and_means() {
        let x = array![[0.0], [2.0], [10.0], [11.0], [12.0]];
        let y = array![0.0, 0.0, 1.0, 1.0, 1.0];
        let mut lda = LinearDiscriminantAnalysis::new(LdaSolver::Lsqr);
        lda.fit(&x, &y).unwrap();

        let priors = lda.priors().unwrap();
        assert!((priors[0] - 0.4).abs() < 1e-12);
        assert!((priors[1] - 0.6).abs() < 1e-12);
        let means = lda.means().unwrap();
        assert!((means[[0, 0]] - 1.0).abs() < 1e-12);
        assert!((means[[1, 0]] - 11.0).abs() < 1e-12);
    }

    #[test]
    fn test_eigen_rejects_singular_covariance() {
        // Second feature is constant within every class
        let x = array![[1.0, 0.0], [2.0, 0.0], [5.0, 0.0], [6.0, 0.0]];
        let y = array![0.0, 0.0, 1.0, 1.0];
        let mut lda = LinearDiscriminantAnalysis::new(LdaSolver::Eigen);
        assert!(matches!(
            lda.fit(&x, &y),
            Err(TuneError::ComputationError(_))
        ));
    }

    #[test]
    fn test_svd_handles_singular_covariance() {
        let x = array![[1.0, 0.0], [2.0, 0.0], [5.0, 0.0], [6.0, 0.0]];
        let y = array![0.0, 0.0, 1.0, 1.0];
        let mut lda = LinearDiscriminantAnalysis::new(LdaSolver::Svd);
        lda.fit(&x, &y).unwrap();
        assert_eq!(lda.score(&x, &y).unwrap(), 1.0);
    }

    #[test]
    fn test_multiclass() {
        let x = array![
            [0.0, 0.0],
            [0.5, 0.3],
            [0.2, 0.6],
            [5.0, 0.1],
            [5.4, 0.5],
            [4.8, 0.3],
            [0.3, 5.0],
            [0.6, 5.2],
            [0.1, 4.7],
        ];
        let y = array![0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 2.0, 2.0, 2.0];
        let mut lda = LinearDiscriminantAnalysis::new(LdaSolver::Svd);
        lda.fit(&x, &y).unwrap();
        assert_eq!(lda.score(&x, &y).unwrap(), 1.0);
    }

    #[test]
    fn test_invalid_tol() {
        let (x, y) = two_blobs();
        let mut lda = LinearDiscriminantAnalysis::new(LdaSolver::Svd).with_tol(0.0);
        assert!(matches!(
            lda.fit(&x, &y),
            Err(TuneError::InvalidParameter { .. })
        ));
    }
}

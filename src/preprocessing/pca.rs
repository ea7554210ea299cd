//! Principal Component Analysis
//!
//! Linear dimensionality reduction fitted on training features. Components are
//! the eigenvectors of the sample covariance matrix, ordered by explained
//! variance, with a deterministic sign convention: the largest-magnitude
//! loading of every component is positive.

use crate::error::{Result, TuneError};
use crate::utils::symmetric_eigen;
use ndarray::{s, Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

/// PCA configuration parameters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PcaConfig {
    /// Number of output dimensions (`None` keeps `min(n_samples, n_features)`)
    pub n_components: Option<usize>,
}

/// PCA dimensionality reduction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pca {
    config: PcaConfig,
    /// Per-feature mean of the training data
    mean: Option<Array1<f64>>,
    /// Projection matrix: n_features x n_components
    components: Option<Array2<f64>>,
    /// Eigenvalues (raw variance per component)
    explained_variance: Option<Array1<f64>>,
    /// Explained variance ratio for each component (sums to <= 1.0)
    explained_variance_ratio: Option<Array1<f64>>,
}

impl Pca {
    /// Create a new PCA instance
    pub fn new(config: PcaConfig) -> Self {
        Self {
            config,
            mean: None,
            components: None,
            explained_variance: None,
            explained_variance_ratio: None,
        }
    }

    /// Fit the projection on training data.
    pub fn fit(&mut self, x: &Array2<f64>) -> Result<&mut Self> {
        let n = x.nrows();
        let d = x.ncols();

        if n < 2 {
            return Err(TuneError::PreprocessingError(
                "PCA requires at least 2 samples".to_string(),
            ));
        }
        if d < 1 {
            return Err(TuneError::PreprocessingError(
                "PCA requires at least 1 feature".to_string(),
            ));
        }

        let n_components = match self.config.n_components {
            Some(0) => {
                return Err(TuneError::InvalidParameter {
                    name: "n_components".to_string(),
                    value: "0".to_string(),
                    reason: "must be at least 1".to_string(),
                })
            }
            Some(k) => k.min(d).min(n),
            None => d.min(n),
        };

        let mean = x
            .mean_axis(Axis(0))
            .ok_or_else(|| TuneError::PreprocessingError("empty input".to_string()))?;
        let centered = x - &mean;

        let cov = centered.t().dot(&centered) / (n as f64 - 1.0);
        let (eigenvalues, eigenvectors) = symmetric_eigen(&cov);

        let mut components = eigenvectors.slice(s![.., ..n_components]).to_owned();
        for mut component in components.columns_mut() {
            let pivot = component
                .iter()
                .copied()
                .fold(0.0f64, |best, v| if v.abs() > best.abs() { v } else { best });
            if pivot < 0.0 {
                component.mapv_inplace(|v| -v);
            }
        }

        let explained: Array1<f64> = eigenvalues
            .slice(s![..n_components])
            .mapv(|v| v.max(0.0));
        let full_variance: f64 = cov.diag().sum().max(1e-12);

        self.explained_variance_ratio = Some(explained.mapv(|v| v / full_variance));
        self.explained_variance = Some(explained);
        self.components = Some(components);
        self.mean = Some(mean);
        Ok(self)
    }

    /// Project data onto the fitted components.
    pub fn transform(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        let (mean, components) = match (&self.mean, &self.components) {
            (Some(mean), Some(components)) => (mean, components),
            _ => return Err(TuneError::ModelNotFitted),
        };

        if x.ncols() != mean.len() {
            return Err(TuneError::ShapeError {
                expected: format!("{} features", mean.len()),
                actual: format!("{} features", x.ncols()),
            });
        }

        Ok((x - mean).dot(components))
    }

    /// Fit and transform in one step
    pub fn fit_transform(&mut self, x: &Array2<f64>) -> Result<Array2<f64>> {
        self.fit(x)?;
        self.transform(x)
    }

    /// Number of fitted components (0 before fit)
    pub fn n_components(&self) -> usize {
        self.components.as_ref().map(|c| c.ncols()).unwrap_or(0)
    }

    pub fn explained_variance_ratio(&self) -> Option<&Array1<f64>> {
        self.explained_variance_ratio.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_pca_basic() {
        // Perfectly linear data: one component carries all variance
        let x = array![[1.0, 2.0], [2.0, 4.0], [3.0, 6.0], [4.0, 8.0], [5.0, 10.0]];

        let mut pca = Pca::new(PcaConfig::default());
        let projected = pca.fit_transform(&x).unwrap();

        assert_eq!(projected.dim(), (5, 2));
        let ratio = pca.explained_variance_ratio().unwrap();
        assert!(ratio[0] > 0.999, "first component ratio = {}", ratio[0]);
        assert!(ratio[1].abs() < 1e-9);
    }

    #[test]
    fn test_pca_default_keeps_all_components() {
        let x = array![[1.0, 0.0, 0.5], [0.0, 1.0, 0.3], [1.0, 1.0, 0.8], [0.5, 0.5, 0.4]];
        let mut pca = Pca::new(PcaConfig::default());
        pca.fit(&x).unwrap();
        assert_eq!(pca.n_components(), 3);

        let total: f64 = pca.explained_variance_ratio().unwrap().sum();
        assert!((total - 1.0).abs() < 1e-9, "sum = {}", total);
    }

    #[test]
    fn test_pca_components_capped_by_samples() {
        let x = array![[1.0, 2.0, 3.0, 4.0], [2.0, 1.0, 0.0, 5.0]];
        let mut pca = Pca::new(PcaConfig::default());
        pca.fit(&x).unwrap();
        assert_eq!(pca.n_components(), 2);
    }

    #[test]
    fn test_pca_projection_is_centered() {
        let x = array![[2.0, 1.0], [3.0, 5.0], [4.0, 2.0], [7.0, 3.0], [9.0, 8.0]];
        let mut pca = Pca::new(PcaConfig::default());
        let projected = pca.fit_transform(&x).unwrap();
        for col in projected.columns() {
            assert!(col.sum().abs() < 1e-9);
        }
    }

    #[test]
    fn test_pca_sign_convention() {
        let x = array![[1.0, -2.0], [2.0, -4.0], [3.0, -6.5], [4.0, -8.0]];
        let mut pca = Pca::new(PcaConfig::default());
        pca.fit(&x).unwrap();
        let components = pca.components.as_ref().unwrap();
        for col in components.columns() {
            let pivot = col.iter().copied().fold(0.0f64, |b, v| if v.abs() > b.abs() { v } else { b });
            assert!(pivot > 0.0);
        }
    }

    #[test]
    fn test_pca_too_few_samples() {
        let x = array![[1.0, 2.0]];
        let mut pca = Pca::new(PcaConfig::default());
        assert!(pca.fit(&x).is_err());
    }

    #[test]
    fn test_pca_transform_before_fit() {
        let pca = Pca::new(PcaConfig::default());
        assert!(matches!(pca.transform(&array![[1.0]]), Err(TuneError::ModelNotFitted)));
    }
}

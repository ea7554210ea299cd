//! Preprocessing pipeline: PCA, then min-max rescaling, then standardization

use super::pca::{Pca, PcaConfig};
use super::scaler::{Scaler, ScalerType};
use crate::error::{Result, TuneError};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

/// One fitted stage of the pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PipelineStep {
    Pca(Pca),
    Scale(Scaler),
}

impl PipelineStep {
    fn fit_transform(&mut self, x: &Array2<f64>) -> Result<Array2<f64>> {
        match self {
            PipelineStep::Pca(pca) => pca.fit_transform(x),
            PipelineStep::Scale(scaler) => scaler.fit_transform(x),
        }
    }

    fn transform(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        match self {
            PipelineStep::Pca(pca) => pca.transform(x),
            PipelineStep::Scale(scaler) => scaler.transform(x),
        }
    }
}

/// Ordered chain of named feature transforms, fitted on training data only
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreprocessingPipeline {
    steps: Vec<(String, PipelineStep)>,
    is_fitted: bool,
    /// Timing: seconds spent in last fit call
    fit_time: Option<f64>,
}

impl Default for PreprocessingPipeline {
    fn default() -> Self {
        Self::standard(None)
    }
}

impl PreprocessingPipeline {
    /// The tuning pipeline: `PCA` → `MinMaxScaler` → `Scaler`.
    pub fn standard(pca_components: Option<usize>) -> Self {
        Self {
            steps: vec![
                (
                    "PCA".to_string(),
                    PipelineStep::Pca(Pca::new(PcaConfig {
                        n_components: pca_components,
                    })),
                ),
                (
                    "MinMaxScaler".to_string(),
                    PipelineStep::Scale(Scaler::new(ScalerType::MinMax)),
                ),
                (
                    "Scaler".to_string(),
                    PipelineStep::Scale(Scaler::new(ScalerType::Standard)),
                ),
            ],
            is_fitted: false,
            fit_time: None,
        }
    }

    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn is_fitted(&self) -> bool {
        self.is_fitted
    }

    pub fn fit_time(&self) -> Option<f64> {
        self.fit_time
    }

    /// Fit every step in order, each on the output of the previous one.
    pub fn fit(&mut self, x: &Array2<f64>) -> Result<&mut Self> {
        self.fit_transform(x)?;
        Ok(self)
    }

    pub fn fit_transform(&mut self, x: &Array2<f64>) -> Result<Array2<f64>> {
        let start = Instant::now();
        let mut current = x.to_owned();
        for (name, step) in self.steps.iter_mut() {
            current = step
                .fit_transform(&current)
                .map_err(|e| TuneError::PreprocessingError(format!("{}: {}", name, e)))?;
            debug!(step = %name, width = current.ncols(), "Pipeline step fitted");
        }
        self.is_fitted = true;
        self.fit_time = Some(start.elapsed().as_secs_f64());
        Ok(current)
    }

    pub fn transform(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        if !self.is_fitted {
            return Err(TuneError::ModelNotFitted);
        }
        let mut current = x.to_owned();
        for (name, step) in &self.steps {
            current = step
                .transform(&current)
                .map_err(|e| TuneError::PreprocessingError(format!("{}: {}", name, e)))?;
        }
        Ok(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Axis};

    fn sample() -> Array2<f64> {
        array![
            [5.1, 3.5, 1.4],
            [4.9, 3.0, 1.4],
            [6.2, 3.4, 5.4],
            [5.9, 3.0, 5.1],
            [5.5, 2.3, 4.0],
            [6.7, 3.1, 4.4]
        ]
    }

    #[test]
    fn test_step_order() {
        let pipeline = PreprocessingPipeline::standard(None);
        assert_eq!(pipeline.step_names(), vec!["PCA", "MinMaxScaler", "Scaler"]);
    }

    #[test]
    fn test_output_is_standardized() {
        let mut pipeline = PreprocessingPipeline::default();
        let out = pipeline.fit_transform(&sample()).unwrap();

        assert_eq!(out.dim(), (6, 3));
        let means = out.mean_axis(Axis(0)).unwrap();
        let stds = out.std_axis(Axis(0), 0.0);
        for j in 0..out.ncols() {
            assert!(means[j].abs() < 1e-9);
            assert!((stds[j] - 1.0).abs() < 1e-9);
        }
        assert!(pipeline.is_fitted());
        assert!(pipeline.fit_time().is_some());
    }

    #[test]
    fn test_fit_then_transform_matches_fit_transform() {
        let x = sample();
        let mut a = PreprocessingPipeline::default();
        let direct = a.fit_transform(&x).unwrap();

        let mut b = PreprocessingPipeline::default();
        b.fit(&x).unwrap();
        let two_step = b.transform(&x).unwrap();

        for (l, r) in direct.iter().zip(two_step.iter()) {
            assert!((l - r).abs() < 1e-12);
        }
    }

    #[test]
    fn test_pca_components_limit_width() {
        let mut pipeline = PreprocessingPipeline::standard(Some(2));
        let out = pipeline.fit_transform(&sample()).unwrap();
        assert_eq!(out.ncols(), 2);
    }

    #[test]
    fn test_transform_before_fit() {
        let pipeline = PreprocessingPipeline::default();
        assert!(matches!(pipeline.transform(&sample()), Err(TuneError::ModelNotFitted)));
    }

    #[test]
    fn test_single_row_is_rejected() {
        let mut pipeline = PreprocessingPipeline::default();
        let result = pipeline.fit(&array![[1.0, 2.0]]);
        assert!(matches!(result, Err(TuneError::PreprocessingError(_))));
    }
}

//! Feature scaling implementations

use crate::error::{Result, TuneError};
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

/// Type of scaler to use
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ScalerType {
    /// Standard scaling (z-score normalization): (x - mean) / std
    Standard,
    /// Min-Max scaling to [0, 1]: (x - min) / (max - min)
    MinMax,
}

/// Per-feature parameters of a fitted scaler
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ScalerParams {
    center: Array1<f64>, // mean or min
    scale: Array1<f64>,  // std or range
}

/// Column-wise feature scaler
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scaler {
    scaler_type: ScalerType,
    params: Option<ScalerParams>,
}

impl Scaler {
    /// Create a new scaler
    pub fn new(scaler_type: ScalerType) -> Self {
        Self {
            scaler_type,
            params: None,
        }
    }

    pub fn scaler_type(&self) -> &ScalerType {
        &self.scaler_type
    }

    /// Fit the scaler to the data
    pub fn fit(&mut self, x: &Array2<f64>) -> Result<&mut Self> {
        if x.nrows() == 0 {
            return Err(TuneError::PreprocessingError(
                "cannot fit a scaler on zero rows".to_string(),
            ));
        }

        let params = match self.scaler_type {
            ScalerType::Standard => {
                let mean = x
                    .mean_axis(Axis(0))
                    .ok_or_else(|| TuneError::PreprocessingError("empty input".to_string()))?;
                // Population std; constant columns keep scale 1
                let std = x.std_axis(Axis(0), 0.0).mapv(|s| if s == 0.0 { 1.0 } else { s });
                ScalerParams { center: mean, scale: std }
            }
            ScalerType::MinMax => {
                let min = x.fold_axis(Axis(0), f64::INFINITY, |acc, &v| acc.min(v));
                let max = x.fold_axis(Axis(0), f64::NEG_INFINITY, |acc, &v| acc.max(v));
                let range = (&max - &min).mapv(|r| if r == 0.0 { 1.0 } else { r });
                ScalerParams { center: min, scale: range }
            }
        };

        self.params = Some(params);
        Ok(self)
    }

    /// Transform the data with the fitted parameters
    pub fn transform(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        let params = self.params.as_ref().ok_or(TuneError::ModelNotFitted)?;

        if x.ncols() != params.center.len() {
            return Err(TuneError::ShapeError {
                expected: format!("{} features", params.center.len()),
                actual: format!("{} features", x.ncols()),
            });
        }

        Ok((x - &params.center) / &params.scale)
    }

    /// Fit and transform in one step
    pub fn fit_transform(&mut self, x: &Array2<f64>) -> Result<Array2<f64>> {
        self.fit(x)?;
        self.transform(x)
    }
}

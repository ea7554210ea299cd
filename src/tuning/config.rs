//! Tuning run configuration

use crate::error::{Result, TuneError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for a tuning run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TuningConfig {
    /// Cross-validation folds
    pub n_folds: usize,

    /// Seed for the validation split, fold shuffling and SVM partner selection
    pub random_state: u64,

    /// Metric to optimize (only "accuracy" is supported)
    pub scoring: String,

    /// Fraction of rows held out for validation
    pub validation_size: f64,

    /// Worker threads for grid search (1 = sequential)
    pub n_jobs: usize,

    /// Zero-padded width of image indices in file names
    pub image_digits: usize,

    /// Label column name (`None` = last column)
    pub label_column: Option<String>,

    /// Shuffle rows before cutting folds
    pub shuffle_folds: bool,

    /// PCA output width (`None` = all components)
    pub pca_components: Option<usize>,
}

impl Default for TuningConfig {
    fn default() -> Self {
        Self {
            n_folds: 10,
            random_state: 7,
            scoring: "accuracy".to_string(),
            validation_size: 0.20,
            n_jobs: 1,
            image_digits: 3,
            label_column: None,
            shuffle_folds: true,
            pca_components: None,
        }
    }
}

impl TuningConfig {
    /// Create a new configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the number of folds
    pub fn with_n_folds(mut self, n: usize) -> Self {
        self.n_folds = n;
        self
    }

    /// Builder method to set the random seed
    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = seed;
        self
    }

    /// Builder method to set the validation fraction
    pub fn with_validation_size(mut self, size: f64) -> Self {
        self.validation_size = size;
        self
    }

    /// Builder method to enable parallel execution
    pub fn with_n_jobs(mut self, n: usize) -> Self {
        self.n_jobs = n;
        self
    }

    pub fn with_label_column(mut self, name: impl Into<String>) -> Self {
        self.label_column = Some(name.into());
        self
    }

    pub fn with_shuffle_folds(mut self, shuffle: bool) -> Self {
        self.shuffle_folds = shuffle;
        self
    }

    pub fn with_pca_components(mut self, n: usize) -> Self {
        self.pca_components = Some(n);
        self
    }

    pub fn with_image_digits(mut self, digits: usize) -> Self {
        self.image_digits = digits;
        self
    }

    /// Check every field for a usable value
    pub fn validate(&self) -> Result<()> {
        if self.n_folds < 2 {
            return Err(TuneError::ConfigError(format!(
                "n_folds must be at least 2, got {}",
                self.n_folds
            )));
        }
        if !(self.validation_size > 0.0 && self.validation_size < 1.0) {
            return Err(TuneError::ConfigError(format!(
                "validation_size must be in (0, 1), got {}",
                self.validation_size
            )));
        }
        if self.n_jobs == 0 {
            return Err(TuneError::ConfigError("n_jobs must be at least 1".to_string()));
        }
        if self.image_digits == 0 {
            return Err(TuneError::ConfigError(
                "image_digits must be at least 1".to_string(),
            ));
        }
        if self.scoring != "accuracy" {
            return Err(TuneError::ConfigError(format!(
                "unsupported scoring '{}', only 'accuracy' is available",
                self.scoring
            )));
        }
        if self.pca_components == Some(0) {
            return Err(TuneError::ConfigError(
                "pca_components must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Load a configuration from a JSON file; missing fields take defaults
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Write the configuration as pretty JSON
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let text = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), text)?;
        Ok(())
    }
}

//! Error types for the tuning pipeline

use thiserror::Error;

/// Result type alias for tuning operations
pub type Result<T> = std::result::Result<T, TuneError>;

/// Main error type for the crate
#[derive(Error, Debug)]
pub enum TuneError {
    #[error("Data error: {0}")]
    DataError(String),

    #[error("Preprocessing error: {0}")]
    PreprocessingError(String),

    #[error("Training error: {0}")]
    TrainingError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Image error: {0}")]
    ImageError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Invalid shape: expected {expected}, got {actual}")]
    ShapeError { expected: String, actual: String },

    #[error("Feature not found: {0}")]
    FeatureNotFound(String),

    #[error("Model not fitted")]
    ModelNotFitted,

    #[error("Invalid parameter: {name} = {value}, {reason}")]
    InvalidParameter {
        name: String,
        value: String,
        reason: String,
    },

    #[error("Thread pool error: {0}")]
    ThreadPoolError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Computation error: {0}")]
    ComputationError(String),
}

impl From<polars::error::PolarsError> for TuneError {
    fn from(err: polars::error::PolarsError) -> Self {
        TuneError::DataError(err.to_string())
    }
}

impl From<serde_json::Error> for TuneError {
    fn from(err: serde_json::Error) -> Self {
        TuneError::SerializationError(err.to_string())
    }
}

impl From<ndarray::ShapeError> for TuneError {
    fn from(err: ndarray::ShapeError) -> Self {
        TuneError::ShapeError {
            expected: "valid shape".to_string(),
            actual: err.to_string(),
        }
    }
}

impl From<image::ImageError> for TuneError {
    fn from(err: image::ImageError) -> Self {
        TuneError::ImageError(err.to_string())
    }
}

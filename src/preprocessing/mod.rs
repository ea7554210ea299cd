//! Feature preprocessing
//!
//! The tuning pipeline reduces features with PCA, rescales them to [0, 1]
//! and then standardizes them. Every stage is fitted on training data only.

mod pca;
mod pipeline;
mod scaler;

pub use pca::{Pca, PcaConfig};
pub use pipeline::{PipelineStep, PreprocessingPipeline};
pub use scaler::{Scaler, ScalerType};

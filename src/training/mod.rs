//! Model training module
//!
//! Provides the classifiers that are tuned, plus cross-validation:
//! - Logistic regression (L2, one-vs-rest)
//! - Linear Discriminant Analysis (svd, lsqr, eigen solvers)
//! - Kernel Support Vector Machines (SMO)
//! - K-Fold cross-validation

mod models;
pub mod cross_validation;
pub mod lda;
pub mod logistic;
pub mod svm;

pub use cross_validation::{cross_val_score, CVResults, CVSplit, KFold};
pub use lda::{LdaSolver, LinearDiscriminantAnalysis};
pub use logistic::LogisticRegression;
pub use models::{accuracy, Classifier};
pub use svm::{Gamma, KernelType, SVMClassifier, SVMConfig};

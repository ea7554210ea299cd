//! Utility functions and types

pub mod linalg;

pub use linalg::{cholesky_factor, cholesky_solve, lower_triangular_inverse, matrix_inverse, solve_symmetric, symmetric_eigen};

use ndarray::{Array2, Axis};

/// Select rows of a matrix by index, preserving the given order.
pub fn select_rows(x: &Array2<f64>, indices: &[usize]) -> Array2<f64> {
    x.select(Axis(0), indices)
}

/// Mean and population standard deviation of a slice (0.0 / 0.0 when empty).
pub fn mean_std(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, variance.sqrt())
}

//! Feature/label extraction and the deterministic train/validation split

use crate::error::{Result, TuneError};
use ndarray::{Array1, Array2};
use polars::prelude::*;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::BTreeSet;
use tracing::info;

/// Train/validation partitions of a labelled dataset.
///
/// Labels are class indices into `class_names`, stored as `f64` the way
/// the classifiers consume them.
#[derive(Debug, Clone)]
pub struct DatasetSplit {
    pub feature_names: Vec<String>,
    pub class_names: Vec<String>,
    pub x_train: Array2<f64>,
    pub x_validation: Array2<f64>,
    pub y_train: Array1<f64>,
    pub y_validation: Array1<f64>,
}

impl DatasetSplit {
    pub fn n_classes(&self) -> usize {
        self.class_names.len()
    }
}

/// Split a frame into shuffled training and validation partitions.
///
/// The label is `label_column`, or the last column when `None`. The validation
/// partition holds `ceil(n_rows * validation_size)` rows; row order comes from
/// a permutation seeded with `seed`.
pub fn split_validation(
    df: &DataFrame,
    label_column: Option<&str>,
    validation_size: f64,
    seed: u64,
) -> Result<DatasetSplit> {
    if !(validation_size > 0.0 && validation_size < 1.0) {
        return Err(TuneError::ValidationError(format!(
            "validation_size must be in (0, 1), got {}",
            validation_size
        )));
    }

    let column_names: Vec<String> = df
        .get_column_names()
        .into_iter()
        .map(|name| name.to_string())
        .collect();

    if column_names.len() < 2 {
        return Err(TuneError::DataError(
            "dataset needs at least one feature column and one label column".to_string(),
        ));
    }

    let label = match label_column {
        Some(name) => {
            if !column_names.iter().any(|c| c == name) {
                return Err(TuneError::FeatureNotFound(name.to_string()));
            }
            name.to_string()
        }
        None => column_names[column_names.len() - 1].clone(),
    };

    let feature_names: Vec<String> = column_names
        .into_iter()
        .filter(|name| *name != label)
        .collect();

    let x = columns_to_array2(df, &feature_names)?;
    let (y, class_names) = encode_labels(df, &label)?;

    let n = x.nrows();
    let n_validation = (n as f64 * validation_size).ceil() as usize;
    if n_validation == 0 || n_validation >= n {
        return Err(TuneError::ValidationError(format!(
            "validation_size {} leaves no training rows for {} samples",
            validation_size, n
        )));
    }

    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let (validation_idx, train_idx) = indices.split_at(n_validation);

    let split = DatasetSplit {
        feature_names,
        class_names,
        x_train: x.select(ndarray::Axis(0), train_idx),
        x_validation: x.select(ndarray::Axis(0), validation_idx),
        y_train: y.select(ndarray::Axis(0), train_idx),
        y_validation: y.select(ndarray::Axis(0), validation_idx),
    };

    info!(
        label = %label,
        features = split.feature_names.len(),
        classes = split.n_classes(),
        train_rows = split.x_train.nrows(),
        validation_rows = split.x_validation.nrows(),
        "Dataset split"
    );

    Ok(split)
}

/// Extract named columns into a row-major `Array2<f64>`. Missing values are rejected.
fn columns_to_array2(df: &DataFrame, col_names: &[String]) -> Result<Array2<f64>> {
    let n_rows = df.height();
    let n_cols = col_names.len();

    let col_data: Vec<Vec<f64>> = col_names
        .iter()
        .map(|col_name| {
            let column = df
                .column(col_name)
                .map_err(|_| TuneError::FeatureNotFound(col_name.clone()))?;
            let as_f64 = column
                .cast(&DataType::Float64)
                .map_err(|e| TuneError::DataError(format!("column '{}': {}", col_name, e)))?;
            let values = as_f64
                .as_materialized_series()
                .f64()
                .map_err(|e| TuneError::DataError(e.to_string()))?
                .into_iter()
                .map(|v| {
                    v.ok_or_else(|| {
                        TuneError::DataError(format!("column '{}' has missing values", col_name))
                    })
                })
                .collect::<Result<Vec<f64>>>()?;
            Ok(values)
        })
        .collect::<Result<Vec<Vec<f64>>>>()?;

    let col_refs: Vec<&[f64]> = col_data.iter().map(|c| c.as_slice()).collect();
    Ok(Array2::from_shape_fn((n_rows, n_cols), |(r, c)| col_refs[c][r]))
}

/// Encode the label column as class indices over its sorted distinct string values.
fn encode_labels(df: &DataFrame, label: &str) -> Result<(Array1<f64>, Vec<String>)> {
    let column = df
        .column(label)
        .map_err(|_| TuneError::FeatureNotFound(label.to_string()))?;
    let as_str = column
        .cast(&DataType::String)
        .map_err(|e| TuneError::DataError(format!("label '{}': {}", label, e)))?;
    let values: Vec<String> = as_str
        .as_materialized_series()
        .str()
        .map_err(|e| TuneError::DataError(e.to_string()))?
        .into_iter()
        .map(|v| {
            v.map(|s| s.to_string())
                .ok_or_else(|| TuneError::DataError(format!("label '{}' has missing values", label)))
        })
        .collect::<Result<Vec<String>>>()?;

    let class_names: Vec<String> = values
        .iter()
        .cloned()
        .collect::<BTreeSet<String>>()
        .into_iter()
        .collect();

    let y: Array1<f64> = values
        .iter()
        .map(|v| class_names.binary_search(v).unwrap_or(0) as f64)
        .collect();

    Ok((y, class_names))
}

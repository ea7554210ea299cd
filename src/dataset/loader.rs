//! Data loading and column cleansing

use crate::error::{Result, TuneError};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;
use tracing::{debug, info};

/// Data loader for the supported tabular formats
#[derive(Debug, Clone)]
pub struct DataLoader {
    /// Rows scanned to infer the CSV schema
    infer_schema_length: Option<usize>,
}

impl Default for DataLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl DataLoader {
    /// Create a new data loader
    pub fn new() -> Self {
        Self {
            infer_schema_length: Some(1000),
        }
    }

    /// Set how many rows are scanned for schema inference (`None` = all rows)
    pub fn with_infer_schema_length(mut self, rows: Option<usize>) -> Self {
        self.infer_schema_length = rows;
        self
    }

    /// Load a delimited text file with a header row
    pub fn load_csv(&self, path: &Path, delimiter: u8) -> Result<DataFrame> {
        let parse_opts = CsvParseOptions::default().with_separator(delimiter);

        CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(self.infer_schema_length)
            .with_parse_options(parse_opts)
            .try_into_reader_with_file_path(Some(path.to_path_buf()))
            .map_err(|e| TuneError::DataError(format!("{}: {}", path.display(), e)))?
            .finish()
            .map_err(|e| TuneError::DataError(format!("{}: {}", path.display(), e)))
    }

    /// Load a Parquet file
    pub fn load_parquet(&self, path: &Path) -> Result<DataFrame> {
        let file = File::open(path)
            .map_err(|e| TuneError::DataError(format!("{}: {}", path.display(), e)))?;

        ParquetReader::new(file)
            .finish()
            .map_err(|e| TuneError::DataError(e.to_string()))
    }

    /// Load a JSON file
    pub fn load_json(&self, path: &Path) -> Result<DataFrame> {
        let file = File::open(path)
            .map_err(|e| TuneError::DataError(format!("{}: {}", path.display(), e)))?;

        JsonReader::new(file)
            .finish()
            .map_err(|e| TuneError::DataError(e.to_string()))
    }

    /// Detect file format from extension and load
    pub fn load_auto(&self, path: &Path) -> Result<DataFrame> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();

        let df = match ext.as_str() {
            "tsv" => self.load_csv(path, b'\t')?,
            "parquet" | "pq" => self.load_parquet(path)?,
            "json" => self.load_json(path)?,
            // CSV is the default for unknown extensions
            _ => self.load_csv(path, b',')?,
        };

        info!(
            path = %path.display(),
            rows = df.height(),
            columns = df.width(),
            "Dataset loaded"
        );
        Ok(df)
    }
}

/// Load a dataset, choosing the reader from the file extension.
pub fn load_dataframe(path: impl AsRef<Path>) -> Result<DataFrame> {
    DataLoader::new().load_auto(path.as_ref())
}

/// Remove the named columns. Every name must exist in the frame.
pub fn drop_columns(df: &DataFrame, columns: &[String]) -> Result<DataFrame> {
    let mut result = df.clone();
    for name in columns {
        if result.column(name).is_err() {
            return Err(TuneError::FeatureNotFound(name.clone()));
        }
        result = result
            .drop(name)
            .map_err(|e| TuneError::DataError(e.to_string()))?;
        debug!(column = %name, "Dropped column");
    }
    Ok(result)
}

/// Per-column overview used by the `info` command
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnSummary {
    pub name: String,
    pub dtype: String,
    pub null_count: usize,
    pub n_unique: usize,
}

/// Summarize every column of a frame in order.
pub fn describe_columns(df: &DataFrame) -> Vec<ColumnSummary> {
    df.get_columns()
        .iter()
        .map(|col| ColumnSummary {
            name: col.name().to_string(),
            dtype: format!("{:?}", col.dtype()),
            null_count: col.null_count(),
            n_unique: col.n_unique().unwrap_or(0),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_df() -> DataFrame {
        df!(
            "a" => &[1.0, 2.0, 3.0],
            "b" => &[4.0, 5.0, 6.0],
            "class" => &["x", "y", "x"]
        )
        .unwrap()
    }

    #[test]
    fn test_drop_columns() {
        let df = sample_df();
        let dropped = drop_columns(&df, &["b".to_string()]).unwrap();
        assert_eq!(dropped.width(), 2);
        assert!(dropped.column("b").is_err());
        assert!(dropped.column("a").is_ok());
    }

    #[test]
    fn test_drop_unknown_column_fails() {
        let df = sample_df();
        let result = drop_columns(&df, &["missing".to_string()]);
        assert!(matches!(result, Err(TuneError::FeatureNotFound(name)) if name == "missing"));
    }

    #[test]
    fn test_drop_nothing_is_identity() {
        let df = sample_df();
        let same = drop_columns(&df, &[]).unwrap();
        assert_eq!(same.width(), 3);
        assert_eq!(same.height(), 3);
    }

    #[test]
    fn test_describe_columns() {
        let df = sample_df();
        let summary = describe_columns(&df);
        assert_eq!(summary.len(), 3);
        assert_eq!(summary[2].name, "class");
        assert_eq!(summary[2].n_unique, 2);
        assert_eq!(summary[0].null_count, 0);
    }

    #[test]
    fn test_load_missing_file() {
        let result = load_dataframe("/definitely/not/here.csv");
        assert!(matches!(result, Err(TuneError::DataError(_))));
    }
}

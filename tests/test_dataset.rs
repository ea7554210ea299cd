//! Integration tests for dataset loading, column dropping and splitting

use kolosal_tune::dataset::{describe_columns, drop_columns, load_dataframe, split_validation};
use kolosal_tune::orchestrator::{run, RunContext};
use kolosal_tune::tuning::{Algorithm, AlgorithmTuner, Tuner, TuningConfig};
use kolosal_tune::TuneError;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Two classes with an identifier column and a free-text column.
fn write_fixture(dir: &Path, name: &str, delimiter: char) -> PathBuf {
    let path = dir.join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    let d = delimiter;
    writeln!(file, "id{d}comment{d}x1{d}x2{d}label").unwrap();
    for i in 0..60 {
        let positive = i % 2 == 0;
        let shift = if positive { 2.0 } else { -2.0 };
        let x1 = shift + 0.5 * (i as f64 * 0.9).sin();
        let x2 = -shift + 0.5 * (i as f64 * 1.3).cos();
        let label = if positive { "yes" } else { "no" };
        writeln!(file, "{i}{d}row {i}{d}{x1:.5}{d}{x2:.5}{d}{label}").unwrap();
    }
    path
}

#[test]
fn test_load_csv_and_tsv() {
    let dir = tempfile::tempdir().unwrap();
    let csv = load_dataframe(write_fixture(dir.path(), "d.csv", ',')).unwrap();
    let tsv = load_dataframe(write_fixture(dir.path(), "d.tsv", '\t')).unwrap();
    assert_eq!(csv.shape(), (60, 5));
    assert_eq!(tsv.shape(), (60, 5));
}

#[test]
fn test_load_missing_file() {
    let result = load_dataframe("/nonexistent/data.csv");
    assert!(result.is_err());
}

#[test]
fn test_describe_columns() {
    let dir = tempfile::tempdir().unwrap();
    let df = load_dataframe(write_fixture(dir.path(), "d.csv", ',')).unwrap();
    let summary = describe_columns(&df);
    assert_eq!(summary.len(), 5);
    assert_eq!(summary[0].name, "id");
    assert_eq!(summary[0].n_unique, 60);
    assert_eq!(summary[4].n_unique, 2);
    assert!(summary.iter().all(|c| c.null_count == 0));
}

#[test]
fn test_drop_unknown_column_fails() {
    let dir = tempfile::tempdir().unwrap();
    let df = load_dataframe(write_fixture(dir.path(), "d.csv", ',')).unwrap();
    let result = drop_columns(&df, &["missing".to_string()]);
    assert!(matches!(result, Err(TuneError::FeatureNotFound(name)) if name == "missing"));
}

#[test]
fn test_dropped_columns_never_reach_features() {
    let dir = tempfile::tempdir().unwrap();
    let df = load_dataframe(write_fixture(dir.path(), "d.csv", ',')).unwrap();
    let cleaned = drop_columns(&df, &["id".to_string(), "comment".to_string()]).unwrap();

    let split = split_validation(&cleaned, None, 0.2, 7).unwrap();
    assert_eq!(split.feature_names, vec!["x1".to_string(), "x2".to_string()]);
    assert_eq!(split.x_train.ncols(), 2);
    assert_eq!(split.x_validation.ncols(), 2);
    assert_eq!(split.x_validation.nrows(), 12);
    assert_eq!(split.x_train.nrows(), 48);
    assert_eq!(split.class_names, vec!["no".to_string(), "yes".to_string()]);

    let report = AlgorithmTuner::new(Algorithm::LogisticRegression)
        .tune(&split.x_train, &split.y_train, &TuningConfig::default())
        .unwrap();
    assert!(report.best.mean > 0.9);
}

#[test]
fn test_text_feature_column_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let df = load_dataframe(write_fixture(dir.path(), "d.csv", ',')).unwrap();
    assert!(split_validation(&df, None, 0.2, 7).is_err());
}

#[test]
fn test_explicit_label_column() {
    let dir = tempfile::tempdir().unwrap();
    let df = load_dataframe(write_fixture(dir.path(), "d.csv", ',')).unwrap();
    let cleaned = drop_columns(&df, &["comment".to_string()]).unwrap();

    let split = split_validation(&cleaned, Some("label"), 0.2, 7).unwrap();
    assert_eq!(split.feature_names.len(), 3);
    assert!(split_validation(&cleaned, Some("nope"), 0.2, 7).is_err());
}

#[test]
fn test_setup_errors_abort_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let data = write_fixture(dir.path(), "d.csv", ',');
    let mut ctx = RunContext::new(TuningConfig::default(), dir.path().join("out"));
    let tuners: Vec<Box<dyn Tuner>> = vec![];

    let result = run(&mut ctx, &data, &["unknown".to_string()], &tuners);
    assert!(result.is_err());
    // The output directory is created before loading
    assert!(dir.path().join("out").is_dir());
}

//! Integration tests for the comparison chart and image numbering

use kolosal_tune::orchestrator::{run, RunContext};
use kolosal_tune::report::{comparison_plot, report_comparison, ImageSequence};
use kolosal_tune::tuning::{
    Algorithm, AlgorithmTuner, BestResult, GridSearchResult, ParamSet, TuneOutcome, TuneReport,
    Tuner, TuningConfig,
};
use std::io::Write;
use std::path::{Path, PathBuf};

fn fake_report(name: &str, scores: &[f64]) -> TuneReport {
    TuneReport {
        name: name.to_string(),
        search: GridSearchResult {
            points: Vec::new(),
            n_folds: 10,
            elapsed_secs: 0.0,
        },
        best_score: scores.iter().copied().fold(f64::MIN, f64::max),
        best_params: ParamSet::new(),
        ranked: Vec::new(),
        mean_test_scores: scores.to_vec(),
        best: BestResult {
            name: name.to_string(),
            mean: 0.9,
            std: 0.05,
            params: ParamSet::new().with("C", 1.0),
        },
    }
}

fn write_fixture(dir: &Path) -> PathBuf {
    let path = dir.join("d.csv");
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(file, "a,b,class").unwrap();
    for i in 0..50 {
        let c = i % 2;
        let a = c as f64 * 4.0 + 0.3 * (i as f64).sin();
        let b = c as f64 * -4.0 + 0.3 * (i as f64 * 2.1).cos();
        writeln!(file, "{:.5},{:.5},{}", a, b, c).unwrap();
    }
    path
}

#[test]
fn test_images_disabled_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let outcomes = vec![TuneOutcome::Tuned(fake_report("LR", &[0.8, 0.9]))];
    let mut images = ImageSequence::default();

    let path = report_comparison(&outcomes, dir.path(), false, &mut images).unwrap();
    assert!(path.is_none());
    assert_eq!(images.current(), 1);
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn test_images_enabled_writes_next_index() {
    let dir = tempfile::tempdir().unwrap();
    let outcomes = vec![
        TuneOutcome::Tuned(fake_report("LR", &[0.8, 0.9, 0.85])),
        TuneOutcome::Failed {
            name: "LDA".to_string(),
            reason: "singular".to_string(),
        },
        TuneOutcome::Tuned(fake_report("SVM", &[0.5, 0.7, 0.95, 0.9])),
    ];
    let mut images = ImageSequence::default();

    let first = report_comparison(&outcomes, dir.path(), true, &mut images).unwrap().unwrap();
    assert!(first.ends_with("001-Tuned-Algorithm-Comparison.png"));
    assert!(first.is_file());
    assert_eq!(images.current(), 2);

    let second = report_comparison(&outcomes, dir.path(), true, &mut images).unwrap().unwrap();
    assert!(second.ends_with("002-Tuned-Algorithm-Comparison.png"));

    let decoded = image::open(&first).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (800, 600));
}

#[test]
fn test_plot_has_one_box_per_success() {
    let outcomes = vec![
        TuneOutcome::Failed {
            name: "LR".to_string(),
            reason: "x".to_string(),
        },
        TuneOutcome::Tuned(fake_report("SVM", &[0.5, 0.7])),
    ];
    assert_eq!(comparison_plot(&outcomes).unwrap().n_boxes(), 1);
    assert_eq!(comparison_plot(&[]).unwrap().n_boxes(), 0);
}

#[test]
fn test_zero_successes_still_writes_chart() {
    let dir = tempfile::tempdir().unwrap();
    let outcomes = vec![TuneOutcome::Failed {
        name: "SVM".to_string(),
        reason: "x".to_string(),
    }];
    let mut images = ImageSequence::default();
    let path = report_comparison(&outcomes, dir.path(), true, &mut images).unwrap();
    assert!(path.unwrap().is_file());
}

#[test]
fn test_run_resets_sequence_and_creates_output_dir() {
    let dir = tempfile::tempdir().unwrap();
    let data = write_fixture(dir.path());
    let output = dir.path().join("nested").join("images");
    let tuners: Vec<Box<dyn Tuner>> = vec![Box::new(AlgorithmTuner::new(Algorithm::LogisticRegression))];

    let mut ctx = RunContext::new(TuningConfig::default(), &output);
    let first = run(&mut ctx, &data, &[], &tuners).unwrap();
    let second = run(&mut ctx, &data, &[], &tuners).unwrap();

    let expected = output.join("001-Tuned-Algorithm-Comparison.png");
    assert_eq!(first.image_path.as_deref(), Some(expected.as_path()));
    assert_eq!(second.image_path.as_deref(), Some(expected.as_path()));
    assert_eq!(ctx.images().current(), 2);
}

#[test]
fn test_run_without_images() {
    let dir = tempfile::tempdir().unwrap();
    let data = write_fixture(dir.path());
    let output = dir.path().join("out");
    let tuners: Vec<Box<dyn Tuner>> = vec![Box::new(AlgorithmTuner::new(Algorithm::LogisticRegression))];

    let mut ctx = RunContext::new(TuningConfig::default().with_image_digits(4), &output).with_images(false);
    let summary = run(&mut ctx, &data, &[], &tuners).unwrap();
    assert!(summary.image_path.is_none());
    assert_eq!(ctx.images().current(), 1);
    assert_eq!(std::fs::read_dir(&output).unwrap().count(), 0);
}

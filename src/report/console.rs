//! Human-readable console report

use super::style::{
    dim, kv, line_box, line_box_bottom, line_box_center, line_box_empty, line_box_sep,
    line_box_top, muted, ok, section, warn,
};
use crate::tuning::{TuneOutcome, TuneReport};
use colored::*;
use std::path::Path;

/// Box shown when a run starts
pub fn print_opening_banner(data: &Path, output_dir: &Path, create_images: bool) {
    println!();
    line_box_top();
    line_box_empty();
    line_box_center(&format!("{}", "Hyperparameter Tuning".white().bold()));
    line_box_center(&format!("{}", dim(&format!("v{}", env!("CARGO_PKG_VERSION")))));
    line_box_empty();
    line_box_sep();
    line_box_empty();
    line_box(&kv("Data   ", &data.display().to_string()));
    line_box(&kv("Output ", &output_dir.display().to_string()));
    line_box(&kv("Images ", if create_images { "on" } else { "off" }));
    line_box_empty();
    line_box_bottom();
}

/// Box shown when a run ends
pub fn print_closing_banner(tuned: usize, failed: usize, elapsed_secs: f64) {
    println!();
    line_box_top();
    line_box_empty();
    line_box_center(&format!("{}", "Tuning complete".white().bold()));
    line_box_empty();
    line_box(&kv("Tuned  ", &tuned.to_string()));
    line_box(&kv("Failed ", &failed.to_string()));
    line_box(&kv("Time   ", &format!("{:.2}s", elapsed_secs)));
    line_box_empty();
    line_box_bottom();
    println!();
}

pub fn print_tuning_start(name: &str) {
    section(&format!("tune {}", name));
}

/// Best line, then every grid point ranked by mean score.
pub fn print_tune_report(report: &TuneReport) {
    println!(
        "  {} {} using {}",
        ok("Best:"),
        format!("{:.6}", report.best_score).white().bold(),
        report.best_params
    );
    for row in &report.ranked {
        println!(
            "  {:.6} {} with: {}",
            row.mean,
            muted(&format!("({:.6})", row.std)),
            row.params
        );
    }
}

/// Two-line diagnostic for a tuner that could not finish
fn failure_lines(name: &str, reason: &str) -> [String; 2] {
    [
        format!("ERROR: couldn't tune {}", name),
        format!("Message: {}", reason),
    ]
}

pub fn print_tune_failure(name: &str, reason: &str) {
    let [headline, message] = failure_lines(name, reason);
    println!("  {}", warn(&headline));
    println!("  {}", muted(&message));
}

/// Best record of every tuned algorithm, one JSON object per line, then the
/// algorithms that produced nothing.
pub fn print_comparison(outcomes: &[TuneOutcome]) {
    section("=== Tuned Algorithms Comparison ===");
    for outcome in outcomes {
        match outcome {
            TuneOutcome::Tuned(report) => match serde_json::to_string(&report.best) {
                Ok(json) => println!("  {}", json),
                Err(e) => println!("  {}: {}", report.name, warn(&e.to_string())),
            },
            TuneOutcome::Failed { name, reason } => {
                println!("  {}", dim(&format!("{}: no result ({})", name, reason)));
            }
        }
    }
}

pub fn print_image_written(path: &Path) {
    println!("  {} {}", ok("✓"), kv("Saved", &path.display().to_string()));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_lines() {
        let [headline, message] = failure_lines("SVM", "Training error: no support vectors");
        assert_eq!(headline, "ERROR: couldn't tune SVM");
        assert_eq!(message, "Message: Training error: no support vectors");
    }
}

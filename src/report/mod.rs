//! Reporting: console output and the comparison chart
//!
//! The chart holds one box per tuned algorithm, each summarizing that
//! algorithm's mean test scores across its whole grid.

mod boxplot;
pub mod console;
mod font;
mod images;
pub(crate) mod style;

pub use boxplot::{BoxPlot, BoxStats};
pub use images::ImageSequence;

use crate::error::Result;
use crate::tuning::TuneOutcome;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Chart title
pub const COMPARISON_TITLE: &str = "Final Tuned-Algorithms Comparison";
/// File name stem, prefixed with the image index
pub const COMPARISON_STEM: &str = "Tuned-Algorithm-Comparison";

/// Chart of the successful outcomes, in tuning order
pub fn comparison_plot(outcomes: &[TuneOutcome]) -> Result<BoxPlot> {
    let mut plot = BoxPlot::new(COMPARISON_TITLE);
    for report in outcomes.iter().filter_map(TuneOutcome::report) {
        plot.add_series(report.name.clone(), &report.mean_test_scores)?;
    }
    Ok(plot)
}

/// Print the best records and, when enabled, write the comparison chart.
///
/// Returns the written image path, if any.
pub fn report_comparison(
    outcomes: &[TuneOutcome],
    output_dir: &Path,
    create_images: bool,
    images: &mut ImageSequence,
) -> Result<Option<PathBuf>> {
    console::print_comparison(outcomes);

    if !create_images {
        debug!("Image output disabled, skipping comparison chart");
        return Ok(None);
    }

    let plot = comparison_plot(outcomes)?;
    let path = images.write_next(output_dir, COMPARISON_STEM, |path| plot.save(path))?;
    info!(boxes = plot.n_boxes(), "Comparison chart rendered");
    console::print_image_written(&path);
    Ok(Some(path))
}

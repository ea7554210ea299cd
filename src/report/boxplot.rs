//! Box-and-whisker chart rendering

use super::font::{draw_text, put_pixel_clipped, text_width, GLYPH_HEIGHT};
use crate::error::{Result, TuneError};
use image::{Rgb, RgbImage};
use serde::{Deserialize, Serialize};
use std::path::Path;

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const AXIS: Rgb<u8> = Rgb([40, 40, 40]);
const GRID: Rgb<u8> = Rgb([225, 225, 225]);
const BOX: Rgb<u8> = Rgb([31, 119, 180]);
const MEDIAN: Rgb<u8> = Rgb([255, 127, 14]);
const TEXT: Rgb<u8> = Rgb([20, 20, 20]);

const MARGIN_LEFT: u32 = 90;
const MARGIN_RIGHT: u32 = 30;
const MARGIN_TOP: u32 = 60;
const MARGIN_BOTTOM: u32 = 60;
const Y_TICKS: usize = 5;

/// Five-number summary with Tukey whiskers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxStats {
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    /// Lowest value within `q1 - 1.5 * IQR`
    pub whisker_low: f64,
    /// Highest value within `q3 + 1.5 * IQR`
    pub whisker_high: f64,
    pub outliers: Vec<f64>,
}

impl BoxStats {
    /// Summarize a sample; `None` when it is empty or contains NaN.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() || values.iter().any(|v| v.is_nan()) {
            return None;
        }
        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        let q1 = quantile(&sorted, 0.25);
        let median = quantile(&sorted, 0.5);
        let q3 = quantile(&sorted, 0.75);
        let iqr = q3 - q1;
        let low_fence = q1 - 1.5 * iqr;
        let high_fence = q3 + 1.5 * iqr;

        let inside = sorted.iter().copied().filter(|v| *v >= low_fence && *v <= high_fence);
        let whisker_low = inside.clone().fold(f64::INFINITY, f64::min);
        let whisker_high = inside.fold(f64::NEG_INFINITY, f64::max);
        let outliers = sorted
            .iter()
            .copied()
            .filter(|v| *v < low_fence || *v > high_fence)
            .collect();

        Some(Self {
            q1,
            median,
            q3,
            whisker_low,
            whisker_high,
            outliers,
        })
    }

    fn min(&self) -> f64 {
        self.outliers.iter().copied().fold(self.whisker_low, f64::min)
    }

    fn max(&self) -> f64 {
        self.outliers.iter().copied().fold(self.whisker_high, f64::max)
    }
}

/// Quantile of sorted data with linear interpolation between ranks
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let frac = pos - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * frac
}

/// A titled chart with one box per labelled sample
#[derive(Debug, Clone)]
pub struct BoxPlot {
    title: String,
    labels: Vec<String>,
    stats: Vec<BoxStats>,
    width: u32,
    height: u32,
}

impl BoxPlot {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            labels: Vec::new(),
            stats: Vec::new(),
            width: 800,
            height: 600,
        }
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width.max(MARGIN_LEFT + MARGIN_RIGHT + 10);
        self.height = height.max(MARGIN_TOP + MARGIN_BOTTOM + 10);
        self
    }

    /// Add one box. Empty or NaN samples are rejected.
    pub fn add_series(&mut self, label: impl Into<String>, values: &[f64]) -> Result<()> {
        let label = label.into();
        let stats = BoxStats::from_values(values).ok_or_else(|| {
            TuneError::ImageError(format!("series '{}' has no plottable values", label))
        })?;
        self.labels.push(label);
        self.stats.push(stats);
        Ok(())
    }

    pub fn n_boxes(&self) -> usize {
        self.stats.len()
    }

    fn value_range(&self) -> (f64, f64) {
        let lo = self.stats.iter().map(BoxStats::min).fold(f64::INFINITY, f64::min);
        let hi = self.stats.iter().map(BoxStats::max).fold(f64::NEG_INFINITY, f64::max);
        if !lo.is_finite() || !hi.is_finite() {
            return (0.0, 1.0);
        }
        let span = hi - lo;
        if span <= f64::EPSILON {
            return (lo - 0.05, hi + 0.05);
        }
        (lo - 0.05 * span, hi + 0.05 * span)
    }

    /// Draw the chart
    pub fn render(&self) -> RgbImage {
        let mut img = RgbImage::from_pixel(self.width, self.height, BACKGROUND);

        let left = MARGIN_LEFT as i64;
        let right = (self.width - MARGIN_RIGHT) as i64;
        let top = MARGIN_TOP as i64;
        let bottom = (self.height - MARGIN_BOTTOM) as i64;
        let (lo, hi) = self.value_range();
        let to_y = |v: f64| -> i64 { bottom - ((v - lo) / (hi - lo) * (bottom - top) as f64).round() as i64 };

        let title_width = text_width(&self.title, 2) as i64;
        draw_text(&mut img, (self.width as i64 - title_width) / 2, 20, &self.title, 2, TEXT);

        for t in 0..Y_TICKS {
            let value = lo + (hi - lo) * t as f64 / (Y_TICKS - 1) as f64;
            let y = to_y(value);
            hline(&mut img, left + 1, right, y, GRID);
            hline(&mut img, left - 5, left, y, AXIS);
            let label = format!("{:.3}", value);
            let w = text_width(&label, 1) as i64;
            draw_text(&mut img, left - 10 - w, y - GLYPH_HEIGHT as i64 / 2, &label, 1, TEXT);
        }

        vline(&mut img, left, top, bottom, AXIS);
        hline(&mut img, left, right, bottom, AXIS);

        let n = self.stats.len().max(1) as i64;
        let slot = (right - left) / n;
        let half_box = (slot / 4).clamp(4, 60);

        for (i, (label, stats)) in self.labels.iter().zip(self.stats.iter()).enumerate() {
            let cx = left + slot * i as i64 + slot / 2;

            // Whiskers and caps
            vline(&mut img, cx, to_y(stats.whisker_high), to_y(stats.q3), AXIS);
            vline(&mut img, cx, to_y(stats.q1), to_y(stats.whisker_low), AXIS);
            hline(&mut img, cx - half_box / 2, cx + half_box / 2, to_y(stats.whisker_high), AXIS);
            hline(&mut img, cx - half_box / 2, cx + half_box / 2, to_y(stats.whisker_low), AXIS);

            rect_outline(&mut img, cx - half_box, to_y(stats.q3), cx + half_box, to_y(stats.q1), BOX);
            for offset in 0..2 {
                hline(&mut img, cx - half_box + 1, cx + half_box - 1, to_y(stats.median) + offset, MEDIAN);
            }

            for &outlier in &stats.outliers {
                circle_outline(&mut img, cx, to_y(outlier), 3, AXIS);
            }

            vline(&mut img, cx, bottom, bottom + 5, AXIS);
            let w = text_width(label, 1) as i64;
            draw_text(&mut img, cx - w / 2, bottom + 12, label, 1, TEXT);
        }

        img
    }

    /// Render and write the chart as PNG
    pub fn save(&self, path: &Path) -> Result<()> {
        self.render()
            .save_with_format(path, image::ImageFormat::Png)
            .map_err(TuneError::from)
    }
}

fn hline(img: &mut RgbImage, x0: i64, x1: i64, y: i64, color: Rgb<u8>) {
    for x in x0.min(x1)..=x0.max(x1) {
        put_pixel_clipped(img, x, y, color);
    }
}

fn vline(img: &mut RgbImage, x: i64, y0: i64, y1: i64, color: Rgb<u8>) {
    for y in y0.min(y1)..=y0.max(y1) {
        put_pixel_clipped(img, x, y, color);
    }
}

fn rect_outline(img: &mut RgbImage, x0: i64, y0: i64, x1: i64, y1: i64, color: Rgb<u8>) {
    hline(img, x0, x1, y0, color);
    hline(img, x0, x1, y1, color);
    vline(img, x0, y0, y1, color);
    vline(img, x1, y0, y1, color);
}

fn circle_outline(img: &mut RgbImage, cx: i64, cy: i64, r: i64, color: Rgb<u8>) {
    for dy in -r..=r {
        for dx in -r..=r {
            let d = ((dx * dx + dy * dy) as f64).sqrt();
            if (d - r as f64).abs() < 0.6 {
                put_pixel_clipped(img, cx + dx, cy + dy, color);
            }
        }
    }
}

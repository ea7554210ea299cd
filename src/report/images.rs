//! Run-scoped numbering of written images

use crate::error::Result;
use std::path::{Path, PathBuf};
use tracing::info;

/// Sequential, zero-padded index shared by every image of a run.
///
/// The index only advances after an image has been written successfully.
#[derive(Debug, Clone)]
pub struct ImageSequence {
    next: usize,
    digits: usize,
}

impl Default for ImageSequence {
    fn default() -> Self {
        Self::new(3)
    }
}

impl ImageSequence {
    pub fn new(digits: usize) -> Self {
        Self {
            next: 1,
            digits: digits.max(1),
        }
    }

    /// Restart numbering at 1
    pub fn reset(&mut self) {
        self.next = 1;
    }

    /// Index the next written image will get
    pub fn current(&self) -> usize {
        self.next
    }

    /// File name for the next image, e.g. `001-Tuned-Algorithm-Comparison.png`
    pub fn file_name(&self, stem: &str) -> String {
        format!("{:0width$}-{}.png", self.next, stem, width = self.digits)
    }

    /// Write the next image into `dir` with `write`, advancing the index on success.
    pub fn write_next<F>(&mut self, dir: &Path, stem: &str, write: F) -> Result<PathBuf>
    where
        F: FnOnce(&Path) -> Result<()>,
    {
        let path = dir.join(self.file_name(stem));
        write(&path)?;
        info!(path = %path.display(), index = self.next, "Image written");
        self.next += 1;
        Ok(path)
    }
}

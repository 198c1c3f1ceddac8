//! The loaded radiometric image.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use ndarray::Array2;

use crate::data::LoadError;

/// Single-band sample grid of the open image.
///
/// Samples are indexed `[row, col]` with row 0 at the top. The array is
/// never modified after loading; the session replaces the whole value when a
/// new file is opened.
#[derive(Debug, Clone)]
pub struct DataImage {
    samples: Arc<Array2<f32>>,
    path: PathBuf,
    min: f32,
    max: f32,
}

impl DataImage {
    /// Wrap a sample array. Fails on an array with no rows or columns.
    pub fn new(samples: Array2<f32>, path: impl Into<PathBuf>) -> Result<Self, LoadError> {
        if samples.is_empty() {
            return Err(LoadError::Empty);
        }

        let (min, max) = samples
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });

        Ok(Self {
            samples: Arc::new(samples),
            path: path.into(),
            min,
            max,
        })
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.samples.ncols()
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.samples.nrows()
    }

    pub fn samples(&self) -> &Array2<f32> {
        &self.samples
    }

    /// Shared handle to the samples, used by render scenes.
    pub fn shared_samples(&self) -> &Arc<Array2<f32>> {
        &self.samples
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File stem of the source, used to name exports and reports.
    pub fn stem(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string())
    }

    /// Sample at an integer cell.
    pub fn sample(&self, col: usize, row: usize) -> Option<f32> {
        self.samples.get([row, col]).copied()
    }

    /// Sample at a real data-space coordinate (floored), `None` outside.
    pub fn sample_at(&self, x: f32, y: f32) -> Option<f32> {
        if !(x >= 0.0 && y >= 0.0) {
            return None;
        }
        self.sample(x.floor() as usize, y.floor() as usize)
    }

    /// Whether a data-space position lies on the image extent, edges included.
    pub fn contains(&self, x: f32, y: f32) -> bool {
        (0.0..=self.width() as f32).contains(&x) && (0.0..=self.height() as f32).contains(&y)
    }

    /// Global `(min, max)` over all samples.
    pub fn value_range(&self) -> (f32, f32) {
        (self.min, self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp() -> DataImage {
        let samples = Array2::from_shape_fn((3, 4), |(r, c)| (r * 10 + c) as f32);
        DataImage::new(samples, "/data/flight/IR_0042.tiff").unwrap()
    }

    #[test]
    fn test_dimensions_and_range() {
        let img = ramp();
        assert_eq!(img.width(), 4);
        assert_eq!(img.height(), 3);
        assert_eq!(img.value_range(), (0.0, 23.0));
        assert_eq!(img.stem(), "IR_0042");
    }

    #[test]
    fn test_sample_at_floors_coordinates() {
        let img = ramp();
        assert_eq!(img.sample_at(2.9, 1.2), Some(12.0));
        assert_eq!(img.sample_at(0.0, 0.0), Some(0.0));
        assert_eq!(img.sample_at(4.0, 0.0), None);
        assert_eq!(img.sample_at(-0.1, 0.0), None);
        assert_eq!(img.sample_at(f32::NAN, 0.0), None);
    }

    #[test]
    fn test_contains_includes_edges() {
        let image = ramp();
        let (w, h) = (image.width() as f32, image.height() as f32);
        assert!(image.contains(0.0, 0.0));
        assert!(image.contains(w, h));
        assert!(!image.contains(w + 0.1, 1.0));
        assert!(!image.contains(1.0, -0.1));
        assert!(!image.contains(f32::NAN, 1.0));
    }

    #[test]
    fn test_empty_array_is_rejected() {
        let result = DataImage::new(Array2::zeros((0, 5)), "empty.npy");
        assert!(matches!(result, Err(LoadError::Empty)));
    }
}

//! Loader for grayscale PNG files.
//!
//! Some radiometric tools export raw counts as 16-bit grayscale PNG. Values
//! are taken verbatim; color PNGs are rejected.

use image::{DynamicImage, ImageFormat};
use ndarray::Array2;

use crate::data::loader::{ImageLoader, LoadError};

/// Loader for 8/16-bit grayscale PNG images.
pub struct PngLoader;

impl PngLoader {
    const MAGIC: &'static [u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
}

impl ImageLoader for PngLoader {
    fn id(&self) -> &'static str {
        "png"
    }

    fn display_name(&self) -> &'static str {
        "Grayscale PNG"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["png"]
    }

    fn can_load(&self, data: &[u8]) -> bool {
        data.starts_with(Self::MAGIC)
    }

    fn load(&self, data: &[u8]) -> Result<Array2<f32>, LoadError> {
        let img = image::load_from_memory_with_format(data, ImageFormat::Png)
            .map_err(|e| LoadError::decode(self.id(), e))?;

        let (width, height) = (img.width() as usize, img.height() as usize);
        let values: Vec<f32> = match img {
            DynamicImage::ImageLuma8(buf) => buf.into_raw().into_iter().map(f32::from).collect(),
            DynamicImage::ImageLuma16(buf) => buf.into_raw().into_iter().map(f32::from).collect(),
            other => {
                return Err(LoadError::UnsupportedLayout(format!(
                    "expected a grayscale PNG, found {:?}",
                    other.color()
                )));
            }
        };

        Array2::from_shape_vec((height, width), values)
            .map_err(|e| LoadError::decode(self.id(), e))
    }
}

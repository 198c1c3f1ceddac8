//! Loader for radiometric TIFF files.
//!
//! Thermal cameras and their desktop tools export per-pixel temperatures as
//! single-band TIFFs, typically `f32` degrees or `u16` raw counts. Only
//! grayscale images are accepted; RGB previews are rejected as an
//! unsupported layout since they carry no radiometric values.

use std::io::Cursor;

use ndarray::Array2;
use tiff::ColorType;
use tiff::decoder::{Decoder, DecodingResult};

use crate::data::loader::{ImageLoader, LoadError};

/// Loader for single-band TIFF images.
pub struct TiffLoader;

impl TiffLoader {
    const MAGIC_LE: &'static [u8] = &[0x49, 0x49, 0x2A, 0x00];
    const MAGIC_BE: &'static [u8] = &[0x4D, 0x4D, 0x00, 0x2A];

    fn to_grid<T: Copy>(
        buf: Vec<T>,
        width: u32,
        height: u32,
        convert: impl Fn(T) -> f32,
    ) -> Result<Array2<f32>, LoadError> {
        let shape = (height as usize, width as usize);
        let values: Vec<f32> = buf.into_iter().map(convert).collect();
        Array2::from_shape_vec(shape, values).map_err(|e| {
            LoadError::UnsupportedLayout(format!(
                "sample count does not match {}x{}: {}",
                width, height, e
            ))
        })
    }
}

impl ImageLoader for TiffLoader {
    fn id(&self) -> &'static str {
        "tiff"
    }

    fn display_name(&self) -> &'static str {
        "Radiometric TIFF"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["tiff", "tif"]
    }

    fn can_load(&self, data: &[u8]) -> bool {
        data.starts_with(Self::MAGIC_LE) || data.starts_with(Self::MAGIC_BE)
    }

    fn load(&self, data: &[u8]) -> Result<Array2<f32>, LoadError> {
        let mut decoder =
            Decoder::new(Cursor::new(data)).map_err(|e| LoadError::decode(self.id(), e))?;

        let (width, height) = decoder
            .dimensions()
            .map_err(|e| LoadError::decode(self.id(), e))?;
        let color_type = decoder
            .colortype()
            .map_err(|e| LoadError::decode(self.id(), e))?;

        if !matches!(color_type, ColorType::Gray(_)) {
            return Err(LoadError::UnsupportedLayout(format!(
                "expected a single-band TIFF, found {:?}",
                color_type
            )));
        }

        let image_data = decoder
            .read_image()
            .map_err(|e| LoadError::decode(self.id(), e))?;

        log::debug!(
            "TiffLoader: {}x{} {:?}",
            width,
            height,
            color_type
        );

        match image_data {
            DecodingResult::U8(buf) => Self::to_grid(buf, width, height, f32::from),
            DecodingResult::U16(buf) => Self::to_grid(buf, width, height, f32::from),
            DecodingResult::U32(buf) => Self::to_grid(buf, width, height, |v| v as f32),
            DecodingResult::U64(buf) => Self::to_grid(buf, width, height, |v| v as f32),
            DecodingResult::I8(buf) => Self::to_grid(buf, width, height, f32::from),
            DecodingResult::I16(buf) => Self::to_grid(buf, width, height, f32::from),
            DecodingResult::I32(buf) => Self::to_grid(buf, width, height, |v| v as f32),
            DecodingResult::I64(buf) => Self::to_grid(buf, width, height, |v| v as f32),
            DecodingResult::F32(buf) => Self::to_grid(buf, width, height, |v| v),
            DecodingResult::F64(buf) => Self::to_grid(buf, width, height, |v| v as f32),
        }
    }

    fn priority(&self) -> i32 {
        5
    }
}

#[cfg(test)]
mod tests {
    use tiff::encoder::{TiffEncoder, colortype};

    use super::*;

    fn encode_gray32f(width: u32, height: u32, values: &[f32]) -> Vec<u8> {
        let mut cursor = Cursor::new(Vec::new());
        let mut encoder = TiffEncoder::new(&mut cursor).unwrap();
        encoder
            .write_image::<colortype::Gray32Float>(width, height, values)
            .unwrap();
        cursor.into_inner()
    }

    #[test]
    fn test_magic_detection() {
        let loader = TiffLoader;
        assert!(loader.can_load(&[0x49, 0x49, 0x2A, 0x00, 0x08]));
        assert!(loader.can_load(&[0x4D, 0x4D, 0x00, 0x2A, 0x00]));
        assert!(!loader.can_load(b"\x93NUMPY"));
    }

    #[test]
    fn test_load_float_temperatures() {
        let values = [20.0, 21.5, 22.0, 35.25, 36.0, 19.75];
        let bytes = encode_gray32f(3, 2, &values);

        let grid = TiffLoader.load(&bytes).unwrap();
        assert_eq!(grid.shape(), &[2, 3]);
        assert_eq!(grid[[0, 1]], 21.5);
        assert_eq!(grid[[1, 0]], 35.25);
    }

    #[test]
    fn test_rgb_tiff_is_unsupported() {
        let mut cursor = Cursor::new(Vec::new());
        let mut encoder = TiffEncoder::new(&mut cursor).unwrap();
        encoder
            .write_image::<colortype::RGB8>(1, 1, &[255, 0, 0])
            .unwrap();
        let bytes = cursor.into_inner();

        let result = TiffLoader.load(&bytes);
        assert!(matches!(result, Err(LoadError::UnsupportedLayout(_))));
    }
}

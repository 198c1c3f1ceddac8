//! Loader for NumPy `.npy` files.
//!
//! Radiometric grids exported from analysis scripts are usually stored as
//! 2-D arrays of temperatures. The array is read as `(rows, cols)` with
//! values kept as-is (no normalization).

use std::io::Cursor;

use ndarray::{Array2, ArrayD};
use ndarray_npy::ReadNpyExt;

use crate::data::loader::{ImageLoader, LoadError};

/// Loader for NumPy `.npy` files.
///
/// Supported data types: `f32`, `f64`, `u8`, `u16`, `i16`, `i32`.
pub struct NpyLoader;

impl NpyLoader {
    /// NumPy magic bytes: \x93NUMPY
    const MAGIC: &'static [u8] = &[0x93, b'N', b'U', b'M', b'P', b'Y'];

    fn read_as<T>(data: &[u8]) -> Option<Array2<f32>>
    where
        T: ndarray_npy::ReadableElement + Copy + Into<f64>,
    {
        Array2::<T>::read_npy(Cursor::new(data))
            .ok()
            .map(|array| array.mapv(|v| v.into() as f32))
    }

    /// Number of dimensions of an array that failed to read as 2-D, if the
    /// header is readable at all.
    fn ndim(data: &[u8]) -> Option<usize> {
        ArrayD::<f32>::read_npy(Cursor::new(data))
            .map(|a| a.ndim())
            .or_else(|_| ArrayD::<f64>::read_npy(Cursor::new(data)).map(|a| a.ndim()))
            .ok()
    }
}

impl ImageLoader for NpyLoader {
    fn id(&self) -> &'static str {
        "npy"
    }

    fn display_name(&self) -> &'static str {
        "NumPy Array (.npy)"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["npy"]
    }

    fn can_load(&self, data: &[u8]) -> bool {
        data.starts_with(Self::MAGIC)
    }

    fn load(&self, data: &[u8]) -> Result<Array2<f32>, LoadError> {
        // f32 first, it is by far the most common for temperature grids
        let array = Self::read_as::<f32>(data)
            .or_else(|| Self::read_as::<f64>(data))
            .or_else(|| Self::read_as::<u16>(data))
            .or_else(|| Self::read_as::<i16>(data))
            .or_else(|| Self::read_as::<u8>(data))
            .or_else(|| Self::read_as::<i32>(data));

        match array {
            Some(array) => {
                log::debug!("NpyLoader: array shape = {:?}", array.shape());
                Ok(array)
            }
            None => match Self::ndim(data) {
                Some(ndim) => Err(LoadError::UnsupportedLayout(format!(
                    "expected a 2-D array, found {} dimensions",
                    ndim
                ))),
                None => Err(LoadError::decode(
                    self.id(),
                    "unsupported dtype or invalid format",
                )),
            },
        }
    }

    fn priority(&self) -> i32 {
        10
    }
}

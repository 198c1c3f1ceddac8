//! Radiometric image data and loaders.
//!
//! This module provides:
//! - `DataImage`: the immutable single-band sample array of the open image
//! - `LoaderRegistry`: format detection and loading
//! - Built-in loaders for TIFF, NumPy (.npy) and grayscale PNG files
//!
//! ## Adding New Formats
//!
//! Implement `ImageLoader` in `loaders/` and register it in
//! `LoaderRegistry::new()`:
//!
//! ```rust,ignore
//! use ndarray::Array2;
//! use thermark::data::{ImageLoader, LoadError};
//!
//! pub struct MyFormatLoader;
//!
//! impl ImageLoader for MyFormatLoader {
//!     fn id(&self) -> &'static str { "myformat" }
//!     fn display_name(&self) -> &'static str { "My Format" }
//!     fn extensions(&self) -> &'static [&'static str] { &["myf"] }
//!     fn can_load(&self, data: &[u8]) -> bool { /* check magic bytes */ }
//!     fn load(&self, data: &[u8]) -> Result<Array2<f32>, LoadError> { /* ... */ }
//! }
//! ```

mod data_image;
mod loader;
pub mod loaders;

pub use data_image::DataImage;
pub use loader::{ImageLoader, LoadError, LoaderRegistry};

//! Built-in image loaders.
//!
//! Implementations of the `ImageLoader` trait for the supported file formats.

mod npy_loader;
mod png_loader;
mod tiff_loader;

pub use npy_loader::NpyLoader;
pub use png_loader::PngLoader;
pub use tiff_loader::TiffLoader;

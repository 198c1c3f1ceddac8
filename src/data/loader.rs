//! Trait-based image loading.
//!
//! Each supported file format implements [`ImageLoader`], turning raw bytes
//! into a 2-D sample array. [`LoaderRegistry`] picks the right loader for a
//! file.
//!
//! ## Supported Formats
//!
//! - **TIFF**: single-band (grayscale) radiometric exports, any sample type
//! - **NumPy Arrays**: 2-D `.npy` files
//! - **PNG**: 8- or 16-bit grayscale
//!
//! ## Usage
//!
//! ```rust,ignore
//! use thermark::data::LoaderRegistry;
//!
//! let registry = LoaderRegistry::new();
//! let image = registry.load_path(Path::new("IR_0042.tiff"))?;
//! ```

use std::path::Path;

use ndarray::Array2;

use crate::data::DataImage;

/// Errors that can occur while loading an image.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The file could not be read
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A loader recognized the data but failed to decode it
    #[error("[{loader}] {message}")]
    Decode {
        loader: &'static str,
        message: String,
    },

    /// The file decoded but is not a single-band 2-D grid
    #[error("Unsupported layout: {0}")]
    UnsupportedLayout(String),

    /// The image has no samples
    #[error("Image contains no samples")]
    Empty,

    /// No registered loader accepted the data
    #[error("No loader could handle the data{0}")]
    NoLoader(String),
}

impl LoadError {
    /// Build a decode error attributed to a loader.
    pub fn decode(loader: &'static str, message: impl std::fmt::Display) -> Self {
        Self::Decode {
            loader,
            message: message.to_string(),
        }
    }
}

/// Trait for image format loaders.
pub trait ImageLoader: Send + Sync {
    /// Unique identifier for this loader (e.g., "tiff", "npy").
    fn id(&self) -> &'static str;

    /// Human-readable name.
    fn display_name(&self) -> &'static str;

    /// File extensions this loader handles (lowercase, without dots).
    fn extensions(&self) -> &'static [&'static str];

    /// Check magic bytes to see if this loader can likely handle the data.
    fn can_load(&self, data: &[u8]) -> bool;

    /// Decode raw bytes into a `[row, col]` sample array.
    fn load(&self, data: &[u8]) -> Result<Array2<f32>, LoadError>;

    /// Priority for format detection (higher = checked first).
    fn priority(&self) -> i32 {
        0
    }
}

/// Registry of available loaders.
pub struct LoaderRegistry {
    loaders: Vec<Box<dyn ImageLoader>>,
}

impl LoaderRegistry {
    /// Create a new registry with all built-in loaders.
    pub fn new() -> Self {
        let mut registry = Self {
            loaders: Vec::new(),
        };

        registry.register(Box::new(super::loaders::TiffLoader));
        registry.register(Box::new(super::loaders::NpyLoader));
        registry.register(Box::new(super::loaders::PngLoader));

        registry
    }

    /// Register a new loader.
    pub fn register(&mut self, loader: Box<dyn ImageLoader>) {
        self.loaders.push(loader);
        self.loaders.sort_by(|a, b| b.priority().cmp(&a.priority()));
    }

    /// Get all supported file extensions.
    pub fn supported_extensions(&self) -> Vec<&'static str> {
        let mut extensions: Vec<&'static str> = self
            .loaders
            .iter()
            .flat_map(|l| l.extensions().iter().copied())
            .collect();
        extensions.sort();
        extensions.dedup();
        extensions
    }

    fn loaders_for_extension(&self, ext: &str) -> impl Iterator<Item = &dyn ImageLoader> + '_ {
        let ext_lower = ext.to_lowercase();
        self.loaders
            .iter()
            .filter(move |l| l.extensions().iter().any(|e| *e == ext_lower))
            .map(|l| l.as_ref())
    }

    /// Decode raw bytes, auto-detecting the format.
    ///
    /// Tries loaders in this order:
    /// 1. By file extension (if filename provided)
    /// 2. By magic byte detection
    ///
    /// When a loader claimed the data and failed, its error is returned
    /// instead of the generic "no loader" error so layout problems are
    /// reported precisely.
    pub fn load(&self, data: &[u8], filename: Option<&str>) -> Result<Array2<f32>, LoadError> {
        let extension = filename
            .and_then(|f| Path::new(f).extension())
            .map(|e| e.to_string_lossy().to_lowercase());

        let mut first_error = None;

        if let Some(ref ext) = extension {
            for loader in self.loaders_for_extension(ext) {
                match loader.load(data) {
                    Ok(result) => {
                        log::debug!("Loaded with {} loader (by extension)", loader.id());
                        return Ok(result);
                    }
                    Err(e) => {
                        log::trace!("Loader {} failed: {}", loader.id(), e);
                        first_error.get_or_insert(e);
                    }
                }
            }
        }

        for loader in self.loaders.iter().filter(|l| l.can_load(data)) {
            match loader.load(data) {
                Ok(result) => {
                    log::debug!("Loaded with {} loader (by detection)", loader.id());
                    return Ok(result);
                }
                Err(e) => {
                    log::trace!("Detected loader {} failed: {}", loader.id(), e);
                    first_error.get_or_insert(e);
                }
            }
        }

        Err(first_error.unwrap_or_else(|| {
            LoadError::NoLoader(
                filename
                    .map(|f| format!(" (file: {})", f))
                    .unwrap_or_default(),
            )
        }))
    }

    /// Read and decode a file into a [`DataImage`].
    pub fn load_path(&self, path: &Path) -> Result<DataImage, LoadError> {
        let bytes = std::fs::read(path)?;
        let name = path.file_name().map(|n| n.to_string_lossy());
        let samples = self.load(&bytes, name.as_deref())?;
        let image = DataImage::new(samples, path)?;
        log::info!(
            "Loaded {:?}: {}x{} samples",
            path,
            image.width(),
            image.height()
        );
        Ok(image)
    }

    /// Check if a filename has a supported extension.
    pub fn is_supported_file(&self, filename: &str) -> bool {
        let lower = filename.to_lowercase();
        self.supported_extensions()
            .iter()
            .any(|ext| lower.ends_with(&format!(".{}", ext)))
    }

    /// Get all registered loaders.
    pub fn loaders(&self) -> &[Box<dyn ImageLoader>] {
        &self.loaders
    }
}

impl Default for LoaderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

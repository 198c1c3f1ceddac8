//! thermark_render - Scene description and rasterizer for annotated heat-maps
//!
//! A [`Scene`] bundles a single-band sample array, its colormap and display
//! levels, the visible window and a list of overlay glyphs. [`Rasterizer`]
//! turns it into an RGBA image.

mod color;
mod colormap;
mod error;
mod raster;
mod scene;
pub mod svg;

pub use color::Color;
pub use colormap::Colormap;
pub use error::{RenderError, Result};
pub use raster::{save_png, RasterOptions, Rasterizer};
pub use scene::{
    Glyph, GlyphOwner, Halo, ImageLayer, Scene, SceneWindow, Stroke, TaggedGlyph, TextAnchor,
    TextStyle,
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Cannot allocate a {width}x{height} pixmap")]
    PixmapAllocation { width: u32, height: u32 },

    #[error("Scene window is empty ({width}x{height} data units)")]
    EmptyWindow { width: f32, height: f32 },

    #[error("Failed to parse overlay SVG: {0}")]
    Svg(#[from] resvg::usvg::Error),

    #[error("Failed to encode image: {0}")]
    Encode(#[from] image::ImageError),

    #[error("Unknown colormap '{0}'")]
    UnknownColormap(String),
}

pub type Result<T> = std::result::Result<T, RenderError>;

//! Export composer.
//!
//! Builds a [`Scene`] from the same state the live view renders (data,
//! colormap, levels, visible window and annotation glyphs) and rasterizes it
//! to `export_<stem>.png`. An export is a snapshot; nothing links the file
//! back to the session afterwards.

use std::path::{Path, PathBuf};

use thermark_render::{RasterOptions, Rasterizer, RenderError, Scene};

use crate::config::ExportConfig;
use crate::overlay;
use crate::session::Session;

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("No image is loaded")]
    NoImage,

    #[error("Render failed: {0}")]
    Render(#[from] RenderError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// File name of the export for an image stem.
pub fn export_file_name(stem: &str) -> String {
    format!("export_{}.png", stem)
}

/// Compose the displayed view into a scene. `None` without an image.
///
/// Only reads the session; calling it twice yields the same scene.
pub fn compose(session: &Session, colorbar: bool) -> Option<Scene> {
    let frame = session.frame()?;
    let mut scene = Scene::new(frame.layer(), frame.window.into()).with_colorbar(colorbar);
    for annotation in session.store().iter() {
        scene.extend(
            overlay::owner(annotation.id()),
            overlay::annotation_glyphs(annotation),
        );
    }
    Some(scene)
}

/// Writes composed views as PNG files.
pub struct Exporter {
    rasterizer: Rasterizer,
    options: RasterOptions,
    colorbar: bool,
    output_dir: PathBuf,
}

impl Exporter {
    pub fn new(output_dir: impl Into<PathBuf>, config: &ExportConfig) -> Self {
        Self::with_rasterizer(Rasterizer::new(), output_dir, config)
    }

    pub fn with_rasterizer(
        rasterizer: Rasterizer,
        output_dir: impl Into<PathBuf>,
        config: &ExportConfig,
    ) -> Self {
        Self {
            rasterizer,
            options: config.raster_options(),
            colorbar: config.colorbar,
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Export the current view. Returns the written path.
    pub fn export(&self, session: &Session) -> Result<PathBuf, ExportError> {
        let image = session.image().ok_or(ExportError::NoImage)?;
        let scene = compose(session, self.colorbar).ok_or(ExportError::NoImage)?;
        let raster = self.rasterizer.rasterize(&scene, &self.options)?;

        std::fs::create_dir_all(&self.output_dir)?;
        let path = self.output_dir.join(export_file_name(&image.stem()));
        thermark_render::save_png(&raster, &path)?;
        log::info!(
            "Exported {}x{} view with {} annotations to {:?}",
            raster.width(),
            raster.height(),
            session.store().len(),
            path
        );
        Ok(path)
    }
}

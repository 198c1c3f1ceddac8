//! Renderer seam.
//!
//! The session draws through the [`Renderer`] trait. Glyphs are submitted per
//! owner so a frontend can drop exactly one annotation's glyphs on undo.
//! [`SceneRecorder`] is the bundled implementation; it keeps the latest
//! frame as a [`Scene`] that can be inspected or rasterized.

use std::sync::Arc;

use ndarray::Array2;
use thermark_render::{Colormap, Glyph, GlyphOwner, ImageLayer, Scene};

use crate::viewport::Window;

/// The heat-map part of a frame.
#[derive(Debug, Clone, Copy)]
pub struct ImageFrame<'a> {
    pub samples: &'a Arc<Array2<f32>>,
    pub colormap: Colormap,
    pub low: f32,
    pub high: f32,
    pub window: Window,
}

impl ImageFrame<'_> {
    pub fn layer(&self) -> ImageLayer {
        ImageLayer {
            samples: Arc::clone(self.samples),
            colormap: self.colormap,
            low: self.low,
            high: self.high,
        }
    }
}

pub trait Renderer {
    /// Draw (or redraw) the image layer with its visible window.
    fn draw_image(&mut self, frame: &ImageFrame<'_>);

    /// Replace the glyphs of `owner`.
    fn draw_glyphs(&mut self, owner: GlyphOwner, glyphs: &[Glyph]);

    /// Remove every glyph of `owner`.
    fn remove_glyphs(&mut self, owner: GlyphOwner);
}

/// Records frames into a [`Scene`].
#[derive(Debug, Clone, Default)]
pub struct SceneRecorder {
    scene: Option<Scene>,
    frames: usize,
}

impl SceneRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Latest recorded scene, `None` before the first image frame.
    pub fn scene(&self) -> Option<&Scene> {
        self.scene.as_ref()
    }

    pub fn into_scene(self) -> Option<Scene> {
        self.scene
    }

    /// Number of image frames drawn so far.
    pub fn frames(&self) -> usize {
        self.frames
    }
}

impl Renderer for SceneRecorder {
    fn draw_image(&mut self, frame: &ImageFrame<'_>) {
        self.frames += 1;
        match &mut self.scene {
            Some(scene) => {
                scene.image = frame.layer();
                scene.window = frame.window.into();
            }
            None => self.scene = Some(Scene::new(frame.layer(), frame.window.into())),
        }
    }

    fn draw_glyphs(&mut self, owner: GlyphOwner, glyphs: &[Glyph]) {
        if let Some(scene) = &mut self.scene {
            scene.remove_owner(owner);
            scene.extend(owner, glyphs.iter().cloned());
        }
    }

    fn remove_glyphs(&mut self, owner: GlyphOwner) {
        if let Some(scene) = &mut self.scene {
            scene.remove_owner(owner);
        }
    }
}

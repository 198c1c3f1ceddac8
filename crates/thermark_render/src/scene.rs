//! Renderable scene description.
//!
//! A [`Scene`] is self-contained: it owns (a shared handle to) the sample
//! array, the display levels, the visible window and every overlay glyph.
//! Geometry is expressed in data space (column = x, row = y, row 0 at the
//! top), while stroke widths and font sizes are in points so that they stay
//! constant on screen regardless of zoom.

use std::sync::Arc;

use ndarray::Array2;

use crate::color::Color;
use crate::colormap::Colormap;

/// Identifies which owner a group of glyphs belongs to.
///
/// Frontends use this to remove exactly the glyphs of one annotation
/// without inspecting their content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GlyphOwner {
    /// Glyphs of a committed annotation, keyed by its id.
    Annotation(u64),
    /// The rubber-band preview of a box being drawn.
    Preview,
}

/// Outline drawn beneath a stroke or text to keep it legible on any background.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Halo {
    pub color: Color,
    /// Total width of the halo in points.
    pub width: f32,
}

/// Stroke styling for outlines and lines.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub color: Color,
    /// Line width in points.
    pub width: f32,
    pub halo: Option<Halo>,
}

impl Stroke {
    pub fn new(color: Color, width: f32) -> Self {
        Self {
            color,
            width,
            halo: None,
        }
    }

    pub fn with_halo(mut self, color: Color, width: f32) -> Self {
        self.halo = Some(Halo { color, width });
        self
    }
}

/// Horizontal anchoring of a text label relative to its position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAnchor {
    #[default]
    Start,
    Middle,
    End,
}

/// Text styling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    /// Font size in points.
    pub size: f32,
    pub bold: bool,
    pub anchor: TextAnchor,
    pub fill: Color,
    pub outline: Option<Halo>,
}

/// A single overlay primitive.
#[derive(Debug, Clone, PartialEq)]
pub enum Glyph {
    /// Outline of an axis-aligned rectangle.
    Rect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        stroke: Stroke,
    },
    /// Circle; `radius` is in data units.
    Circle {
        cx: f32,
        cy: f32,
        radius: f32,
        fill: Option<Color>,
        stroke: Stroke,
    },
    /// Straight line segment.
    Line {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        stroke: Stroke,
    },
    /// Text whose baseline starts (or is centred) at `(x, y)`.
    Text {
        x: f32,
        y: f32,
        text: String,
        style: TextStyle,
    },
}

/// A glyph together with its owner.
#[derive(Debug, Clone, PartialEq)]
pub struct TaggedGlyph {
    pub owner: GlyphOwner,
    pub glyph: Glyph,
}

/// Visible rectangle of data space.
///
/// `top < bottom` in row coordinates for an upright image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneWindow {
    pub x_min: f32,
    pub x_max: f32,
    pub top: f32,
    pub bottom: f32,
}

impl SceneWindow {
    pub fn width(&self) -> f32 {
        self.x_max - self.x_min
    }

    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }
}

/// The heat-map layer: samples plus the mapping to colors.
#[derive(Debug, Clone)]
pub struct ImageLayer {
    /// Sample array indexed `[row, col]`.
    pub samples: Arc<Array2<f32>>,
    pub colormap: Colormap,
    /// Values at or below `low` map to the bottom of the colormap.
    pub low: f32,
    /// Values at or above `high` map to the top of the colormap.
    pub high: f32,
}

/// A complete renderable scene.
#[derive(Debug, Clone)]
pub struct Scene {
    pub image: ImageLayer,
    pub window: SceneWindow,
    pub glyphs: Vec<TaggedGlyph>,
    /// Draw a colorbar strip to the right of the image.
    pub colorbar: bool,
}

impl Scene {
    pub fn new(image: ImageLayer, window: SceneWindow) -> Self {
        Self {
            image,
            window,
            glyphs: Vec::new(),
            colorbar: false,
        }
    }

    pub fn with_colorbar(mut self, colorbar: bool) -> Self {
        self.colorbar = colorbar;
        self
    }

    /// Append glyphs for one owner, preserving draw order.
    pub fn extend(&mut self, owner: GlyphOwner, glyphs: impl IntoIterator<Item = Glyph>) {
        self.glyphs
            .extend(glyphs.into_iter().map(|glyph| TaggedGlyph { owner, glyph }));
    }

    /// Drop every glyph of the given owner.
    pub fn remove_owner(&mut self, owner: GlyphOwner) {
        self.glyphs.retain(|g| g.owner != owner);
    }

    /// Iterate over the glyphs of one owner.
    pub fn glyphs_of(&self, owner: GlyphOwner) -> impl Iterator<Item = &Glyph> + '_ {
        self.glyphs
            .iter()
            .filter(move |g| g.owner == owner)
            .map(|g| &g.glyph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scene() -> Scene {
        let layer = ImageLayer {
            samples: Arc::new(Array2::zeros((4, 4))),
            colormap: Colormap::Gray,
            low: 0.0,
            high: 1.0,
        };
        Scene::new(
            layer,
            SceneWindow {
                x_min: 0.0,
                x_max: 4.0,
                top: 0.0,
                bottom: 4.0,
            },
        )
    }

    fn line() -> Glyph {
        Glyph::Line {
            x1: 0.0,
            y1: 0.0,
            x2: 1.0,
            y2: 1.0,
            stroke: Stroke::new(Color::WHITE, 1.0),
        }
    }

    #[test]
    fn test_remove_owner_only_touches_that_owner() {
        let mut s = scene();
        s.extend(GlyphOwner::Annotation(1), [line(), line()]);
        s.extend(GlyphOwner::Annotation(2), [line()]);
        s.extend(GlyphOwner::Preview, [line()]);

        s.remove_owner(GlyphOwner::Annotation(1));

        assert_eq!(s.glyphs.len(), 2);
        assert_eq!(s.glyphs_of(GlyphOwner::Annotation(1)).count(), 0);
        assert_eq!(s.glyphs_of(GlyphOwner::Annotation(2)).count(), 1);
        assert_eq!(s.glyphs_of(GlyphOwner::Preview).count(), 1);
    }

    #[test]
    fn test_window_dimensions() {
        let w = SceneWindow {
            x_min: 2.0,
            x_max: 10.0,
            top: 1.0,
            bottom: 7.0,
        };
        assert_eq!(w.width(), 8.0);
        assert_eq!(w.height(), 6.0);
    }
}

//! Scene rasterization.
//!
//! The heat-map is written pixel by pixel (nearest sample) into a
//! `tiny_skia::Pixmap`. Overlay glyphs are emitted as SVG, rendered by resvg
//! into a pixmap of the same size as the image area and composited on top,
//! which clips them to the visible window exactly like the live view.

use std::path::Path;

use image::{ImageFormat, Rgba, RgbaImage};
use resvg::usvg;
use tiny_skia::{Pixmap, PixmapPaint, Transform};

use crate::color::Color;
use crate::error::{RenderError, Result};
use crate::scene::{Glyph, ImageLayer, Scene, SceneWindow, TextAnchor, TextStyle};
use crate::svg::{self, PixelMapping};

/// Output resolution settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterOptions {
    /// Output pixels per data unit (sample).
    pub pixels_per_unit: f32,
    /// Output pixels per typographic point, for strokes and fonts.
    pub pixels_per_point: f32,
}

impl Default for RasterOptions {
    fn default() -> Self {
        Self {
            pixels_per_unit: 4.0,
            pixels_per_point: 2.0,
        }
    }
}

/// Fraction of the image width used by the colorbar strip.
const COLORBAR_FRACTION: f32 = 0.05;
/// Colorbar label font size in points.
const COLORBAR_LABEL_SIZE: f32 = 10.0;
/// Background behind the colorbar area.
const FIGURE_BACKGROUND: Color = Color::WHITE;

/// Rasterizes scenes. Holds the SVG options (and the loaded font database)
/// so repeated exports don't rescan system fonts.
pub struct Rasterizer {
    options: usvg::Options<'static>,
}

impl Rasterizer {
    /// Create a rasterizer with system fonts available for labels.
    pub fn new() -> Self {
        let mut options = usvg::Options::default();
        options.fontdb_mut().load_system_fonts();
        log::debug!("Rasterizer: loaded {} font faces", options.fontdb.len());
        Self { options }
    }

    /// Create a rasterizer without any fonts; text glyphs are skipped by resvg.
    pub fn without_fonts() -> Self {
        Self {
            options: usvg::Options::default(),
        }
    }

    /// Pixel size of the image area for a window.
    pub fn image_size(window: &SceneWindow, options: &RasterOptions) -> Result<(u32, u32)> {
        let (w, h) = (window.width(), window.height());
        if !(w > 0.0 && h > 0.0) {
            return Err(RenderError::EmptyWindow {
                width: w,
                height: h,
            });
        }
        let px_w = (w * options.pixels_per_unit).ceil().max(1.0) as u32;
        let px_h = (h * options.pixels_per_unit).ceil().max(1.0) as u32;
        Ok((px_w, px_h))
    }

    /// Render a scene to an RGBA image.
    pub fn rasterize(&self, scene: &Scene, options: &RasterOptions) -> Result<RgbaImage> {
        let (img_w, img_h) = Self::image_size(&scene.window, options)?;
        let bar = scene
            .colorbar
            .then(|| ColorbarLayout::new(img_w, options));
        let total_w = img_w + bar.map(|b| b.total_width()).unwrap_or(0);

        let mut pixmap = new_pixmap(total_w, img_h)?;
        pixmap.fill(to_skia(FIGURE_BACKGROUND));

        paint_heatmap(&mut pixmap, &scene.image, &scene.window, options);

        let mapping = PixelMapping {
            window: scene.window,
            pixels_per_unit: options.pixels_per_unit,
            pixels_per_point: options.pixels_per_point,
        };
        let overlay_svg = svg::document(
            img_w,
            img_h,
            &mapping,
            scene.glyphs.iter().map(|g| &g.glyph),
        );
        let overlay = self.render_svg(&overlay_svg, img_w, img_h)?;
        pixmap.draw_pixmap(
            0,
            0,
            overlay.as_ref(),
            &PixmapPaint::default(),
            Transform::identity(),
            None,
        );

        if let Some(bar) = bar {
            self.paint_colorbar(&mut pixmap, &scene.image, bar, img_h, options)?;
        }

        log::debug!(
            "Rasterized scene: {}x{} px, {} glyphs",
            total_w,
            img_h,
            scene.glyphs.len()
        );
        Ok(to_rgba_image(&pixmap))
    }

    fn render_svg(&self, document: &str, width: u32, height: u32) -> Result<Pixmap> {
        let tree = usvg::Tree::from_str(document, &self.options)?;
        let mut pixmap = new_pixmap(width, height)?;
        resvg::render(&tree, Transform::identity(), &mut pixmap.as_mut());
        Ok(pixmap)
    }

    fn paint_colorbar(
        &self,
        pixmap: &mut Pixmap,
        layer: &ImageLayer,
        bar: ColorbarLayout,
        height: u32,
        options: &RasterOptions,
    ) -> Result<()> {
        let width = pixmap.width();
        let data = pixmap.data_mut();
        for py in 0..height {
            // Top of the bar is the high end
            let t = if height > 1 {
                1.0 - py as f32 / (height - 1) as f32
            } else {
                1.0
            };
            let rgba = layer.colormap.sample(t).to_rgba8();
            for px in bar.x..bar.x + bar.width {
                let idx = ((py * width + px) * 4) as usize;
                data[idx..idx + 4].copy_from_slice(&rgba);
            }
        }

        let label_x = (bar.x + bar.width + bar.gap) as f32;
        let size_px = COLORBAR_LABEL_SIZE * options.pixels_per_point;
        let style = TextStyle {
            size: COLORBAR_LABEL_SIZE,
            bold: false,
            anchor: TextAnchor::Start,
            fill: Color::BLACK,
            outline: None,
        };
        let labels = [
            Glyph::Text {
                x: label_x,
                y: size_px,
                text: format!("{:.1}", layer.high),
                style,
            },
            Glyph::Text {
                x: label_x,
                y: height as f32 - 2.0,
                text: format!("{:.1}", layer.low),
                style,
            },
        ];
        // Labels are positioned in pixels directly
        let identity = PixelMapping {
            window: SceneWindow {
                x_min: 0.0,
                x_max: width as f32,
                top: 0.0,
                bottom: height as f32,
            },
            pixels_per_unit: 1.0,
            pixels_per_point: options.pixels_per_point,
        };
        let doc = svg::document(width, height, &identity, labels.iter());
        let text_layer = self.render_svg(&doc, width, height)?;
        pixmap.draw_pixmap(
            0,
            0,
            text_layer.as_ref(),
            &PixmapPaint::default(),
            Transform::identity(),
            None,
        );
        Ok(())
    }
}

impl Default for Rasterizer {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy)]
struct ColorbarLayout {
    /// Left edge of the strip in pixels.
    x: u32,
    width: u32,
    gap: u32,
    label_width: u32,
}

impl ColorbarLayout {
    fn new(image_width: u32, options: &RasterOptions) -> Self {
        let width = ((image_width as f32 * COLORBAR_FRACTION).round() as u32).max(8);
        let gap = (width / 2).max(4);
        let label_width = (COLORBAR_LABEL_SIZE * options.pixels_per_point * 4.0).ceil() as u32;
        Self {
            x: image_width + gap,
            width,
            gap,
            label_width,
        }
    }

    fn total_width(&self) -> u32 {
        self.gap + self.width + self.gap + self.label_width
    }
}

fn new_pixmap(width: u32, height: u32) -> Result<Pixmap> {
    Pixmap::new(width, height).ok_or(RenderError::PixmapAllocation { width, height })
}

fn to_skia(color: Color) -> tiny_skia::Color {
    let [r, g, b, a] = color.to_rgba8();
    tiny_skia::Color::from_rgba8(r, g, b, a)
}

/// Fill the image area with colormapped samples (nearest neighbour).
fn paint_heatmap(
    pixmap: &mut Pixmap,
    layer: &ImageLayer,
    window: &SceneWindow,
    options: &RasterOptions,
) {
    let (rows, cols) = layer.samples.dim();
    let stride = pixmap.width();
    let img_h = pixmap.height();
    let img_w = ((window.width() * options.pixels_per_unit).ceil() as u32).min(stride);
    let data = pixmap.data_mut();

    for py in 0..img_h {
        let row = window.top + (py as f32 + 0.5) / options.pixels_per_unit;
        let r = row.floor();
        for px in 0..img_w {
            let col = window.x_min + (px as f32 + 0.5) / options.pixels_per_unit;
            let c = col.floor();
            let rgba = if r >= 0.0 && c >= 0.0 && (r as usize) < rows && (c as usize) < cols {
                let value = layer.samples[[r as usize, c as usize]];
                layer
                    .colormap
                    .map_value(value, layer.low, layer.high)
                    .to_rgba8()
            } else {
                [0, 0, 0, 255]
            };
            let idx = ((py * stride + px) * 4) as usize;
            data[idx..idx + 4].copy_from_slice(&rgba);
        }
    }
}

fn to_rgba_image(pixmap: &Pixmap) -> RgbaImage {
    let mut out = RgbaImage::new(pixmap.width(), pixmap.height());
    for (dst, src) in out.pixels_mut().zip(pixmap.pixels()) {
        let c = src.demultiply();
        *dst = Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
    }
    out
}

/// Write an image as PNG.
pub fn save_png(image: &RgbaImage, path: &Path) -> Result<()> {
    image.save_with_format(path, ImageFormat::Png)?;
    log::info!("Saved {}x{} PNG to {:?}", image.width(), image.height(), path);
    Ok(())
}

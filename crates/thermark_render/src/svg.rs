//! SVG emission for overlay glyphs.
//!
//! Glyphs are converted to an SVG document in output pixel space and then
//! rasterized with resvg on top of the heat-map pixmap. Halos are emitted as
//! a wider stroke beneath the main stroke; text outlines use
//! `paint-order="stroke"` so the fill stays on top.

use std::fmt::Write as _;

use crate::color::Color;
use crate::scene::{Glyph, Halo, SceneWindow, Stroke, TextAnchor, TextStyle};

/// Maps data-space coordinates and point sizes to output pixels.
#[derive(Debug, Clone, Copy)]
pub struct PixelMapping {
    pub window: SceneWindow,
    pub pixels_per_unit: f32,
    pub pixels_per_point: f32,
}

impl PixelMapping {
    pub fn x(&self, x: f32) -> f32 {
        (x - self.window.x_min) * self.pixels_per_unit
    }

    pub fn y(&self, y: f32) -> f32 {
        (y - self.window.top) * self.pixels_per_unit
    }

    pub fn len(&self, data_units: f32) -> f32 {
        data_units * self.pixels_per_unit
    }

    pub fn pt(&self, points: f32) -> f32 {
        points * self.pixels_per_point
    }
}

fn stroke_attr(color: Color, width: f32) -> String {
    format!(
        "stroke=\"{}\" stroke-opacity=\"{:.3}\" stroke-width=\"{:.2}\"",
        color.to_svg_hex(),
        color.a,
        width
    )
}

fn fill_attr(color: Option<Color>) -> String {
    match color {
        Some(c) if c.a > 0.0 => format!(
            "fill=\"{}\" fill-opacity=\"{:.3}\"",
            c.to_svg_hex(),
            c.a
        ),
        _ => "fill=\"none\"".to_string(),
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

/// Emit `shape` twice when the stroke has a halo: once wide in the halo color,
/// then with the real stroke.
fn stroked(out: &mut String, map: &PixelMapping, shape: &str, stroke: &Stroke, fill: &str) {
    if let Some(Halo { color, width }) = stroke.halo {
        let _ = writeln!(
            out,
            "<{shape} {fill} {} stroke-linecap=\"round\"/>",
            stroke_attr(color, map.pt(width.max(stroke.width))),
        );
    }
    let _ = writeln!(
        out,
        "<{shape} {fill} {} stroke-linecap=\"round\"/>",
        stroke_attr(stroke.color, map.pt(stroke.width)),
    );
}

fn text(out: &mut String, map: &PixelMapping, x: f32, y: f32, content: &str, style: &TextStyle) {
    let anchor = match style.anchor {
        TextAnchor::Start => "start",
        TextAnchor::Middle => "middle",
        TextAnchor::End => "end",
    };
    let weight = if style.bold { "bold" } else { "normal" };
    let outline = match style.outline {
        Some(Halo { color, width }) => format!(
            " {} stroke-linejoin=\"round\" paint-order=\"stroke\"",
            stroke_attr(color, map.pt(width)),
        ),
        None => String::new(),
    };
    let _ = writeln!(
        out,
        "<text x=\"{:.2}\" y=\"{:.2}\" font-family=\"sans-serif\" font-size=\"{:.2}\" font-weight=\"{weight}\" text-anchor=\"{anchor}\" {}{outline}>{}</text>",
        map.x(x),
        map.y(y),
        map.pt(style.size),
        fill_attr(Some(style.fill)),
        escape(content),
    );
}

/// Append the SVG elements for one glyph.
pub fn write_glyph(out: &mut String, map: &PixelMapping, glyph: &Glyph) {
    match glyph {
        Glyph::Rect {
            x,
            y,
            width,
            height,
            stroke,
        } => {
            // Normalize so negative extents still draw
            let (x0, x1) = (x.min(x + width), x.max(x + width));
            let (y0, y1) = (y.min(y + height), y.max(y + height));
            let shape = format!(
                "rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\"",
                map.x(x0),
                map.y(y0),
                map.len(x1 - x0),
                map.len(y1 - y0),
            );
            stroked(out, map, &shape, stroke, "fill=\"none\"");
        }
        Glyph::Circle {
            cx,
            cy,
            radius,
            fill,
            stroke,
        } => {
            let shape = format!(
                "circle cx=\"{:.2}\" cy=\"{:.2}\" r=\"{:.2}\"",
                map.x(*cx),
                map.y(*cy),
                map.len(*radius),
            );
            stroked(out, map, &shape, stroke, &fill_attr(*fill));
        }
        Glyph::Line {
            x1,
            y1,
            x2,
            y2,
            stroke,
        } => {
            let shape = format!(
                "line x1=\"{:.2}\" y1=\"{:.2}\" x2=\"{:.2}\" y2=\"{:.2}\"",
                map.x(*x1),
                map.y(*y1),
                map.x(*x2),
                map.y(*y2),
            );
            stroked(out, map, &shape, stroke, "fill=\"none\"");
        }
        Glyph::Text { x, y, text: t, style } => text(out, map, *x, *y, t, style),
    }
}

/// Build a complete SVG document of the given pixel size.
pub fn document<'a>(
    width: u32,
    height: u32,
    map: &PixelMapping,
    glyphs: impl IntoIterator<Item = &'a Glyph>,
) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">"
    );
    for glyph in glyphs {
        write_glyph(&mut out, map, glyph);
    }
    out.push_str("</svg>\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping() -> PixelMapping {
        PixelMapping {
            window: SceneWindow {
                x_min: 10.0,
                x_max: 20.0,
                top: 5.0,
                bottom: 15.0,
            },
            pixels_per_unit: 4.0,
            pixels_per_point: 2.0,
        }
    }

    #[test]
    fn test_pixel_mapping() {
        let m = mapping();
        assert_eq!(m.x(10.0), 0.0);
        assert_eq!(m.x(12.5), 10.0);
        assert_eq!(m.y(5.0), 0.0);
        assert_eq!(m.y(15.0), 40.0);
        assert_eq!(m.pt(3.0), 6.0);
    }

    #[test]
    fn test_rect_with_halo_emits_two_elements() {
        let mut out = String::new();
        let glyph = Glyph::Rect {
            x: 12.0,
            y: 6.0,
            width: -2.0,
            height: 3.0,
            stroke: Stroke::new(Color::WHITE, 2.0).with_halo(Color::BLACK, 3.0),
        };
        write_glyph(&mut out, &mapping(), &glyph);

        assert_eq!(out.matches("<rect").count(), 2);
        // Negative width is normalized to start at x = 10
        assert!(out.contains("x=\"0.00\""));
        assert!(out.contains("width=\"8.00\""));
        // Halo first, black, then the white stroke
        let black = out.find("#000000").unwrap();
        let white = out.find("#ffffff").unwrap();
        assert!(black < white);
    }

    #[test]
    fn test_text_is_escaped_and_outlined() {
        let mut out = String::new();
        let glyph = Glyph::Text {
            x: 10.0,
            y: 5.0,
            text: "A<B & C".to_string(),
            style: TextStyle {
                size: 9.0,
                bold: true,
                anchor: TextAnchor::Middle,
                fill: Color::WHITE,
                outline: Some(Halo {
                    color: Color::BLACK,
                    width: 3.0,
                }),
            },
        };
        write_glyph(&mut out, &mapping(), &glyph);

        assert!(out.contains("A&lt;B &amp; C"));
        assert!(out.contains("paint-order=\"stroke\""));
        assert!(out.contains("text-anchor=\"middle\""));
        assert!(out.contains("font-size=\"18.00\""));
    }

    #[test]
    fn test_document_wraps_glyphs() {
        let glyph = Glyph::Line {
            x1: 10.0,
            y1: 5.0,
            x2: 20.0,
            y2: 15.0,
            stroke: Stroke::new(Color::WHITE, 1.0),
        };
        let doc = document(40, 40, &mapping(), [&glyph]);
        assert!(doc.starts_with("<svg"));
        assert!(doc.trim_end().ends_with("</svg>"));
        assert!(doc.contains("x2=\"40.00\""));
    }
}

//! Annotation overlay glyphs.
//!
//! The live view and the export both draw annotations through
//! [`annotation_glyphs`], so the two can never disagree about what an
//! annotation looks like.

use thermark_render::{Color, Glyph, GlyphOwner, Halo, Stroke, TextAnchor, TextStyle};

use crate::annotation::{Annotation, AnnotationId, BoxAnnotation, BoxGeometry, PointAnnotation};
use crate::constants::{
    BOX_LABEL_OFFSET, BOX_LABEL_SPACING, BOX_LINE_THICKNESS, CIRCLE_RADIUS, LINE_GAP, LINE_LENGTH,
    LINE_THICKNESS, OVERLAY_UNIT, POINT_NAME_OFFSET, POINT_VALUE_OFFSET, STROKE_THICKNESS,
    TEXT_SIZE, TITLE_SIZE,
};

/// Glyph owner for a committed annotation.
pub fn owner(id: AnnotationId) -> GlyphOwner {
    GlyphOwner::Annotation(id)
}

/// Format a value the way overlay labels show it (`42.0°C`).
pub fn format_temperature(value: f32) -> String {
    format!("{:.1}{}", value, OVERLAY_UNIT)
}

fn halo() -> Halo {
    Halo {
        color: Color::BLACK,
        width: STROKE_THICKNESS,
    }
}

fn outlined(width: f32) -> Stroke {
    Stroke::new(Color::WHITE, width).with_halo(Color::BLACK, STROKE_THICKNESS)
}

fn label(x: f32, y: f32, text: String, size: f32, anchor: TextAnchor) -> Glyph {
    Glyph::Text {
        x,
        y,
        text,
        style: TextStyle {
            size,
            bold: true,
            anchor,
            fill: Color::WHITE,
            outline: Some(halo()),
        },
    }
}

fn marker(cx: f32, cy: f32, fill: Color) -> Glyph {
    Glyph::Circle {
        cx,
        cy,
        radius: CIRCLE_RADIUS,
        fill: Some(fill),
        stroke: Stroke::new(fill, 0.0).with_halo(Color::BLACK, STROKE_THICKNESS),
    }
}

/// Glyphs for any annotation.
pub fn annotation_glyphs(annotation: &Annotation) -> Vec<Glyph> {
    match annotation {
        Annotation::Point(p) => point_glyphs(p),
        Annotation::Box(b) => box_glyphs(b),
    }
}

/// Outline, min/max markers and the side labels of a box.
pub fn box_glyphs(b: &BoxAnnotation) -> Vec<Glyph> {
    let (min_x, min_y) = b.min_pos.center();
    let (max_x, max_y) = b.max_pos.center();
    let label_x = b.x + b.width + BOX_LABEL_OFFSET;
    let row = |k: f32| b.y + k * BOX_LABEL_SPACING;

    vec![
        Glyph::Rect {
            x: b.x,
            y: b.y,
            width: b.width,
            height: b.height,
            stroke: outlined(BOX_LINE_THICKNESS),
        },
        marker(min_x, min_y, Color::BLUE),
        marker(max_x, max_y, Color::RED),
        label(label_x, row(0.0), b.name.to_uppercase(), TITLE_SIZE, TextAnchor::Start),
        label(
            label_x,
            row(1.0),
            format!("Min: {}", format_temperature(b.min_temp)),
            TEXT_SIZE,
            TextAnchor::Start,
        ),
        label(
            label_x,
            row(2.0),
            format!("Avg: {}", format_temperature(b.avg_temp)),
            TEXT_SIZE,
            TextAnchor::Start,
        ),
        label(
            label_x,
            row(3.0),
            format!("Max: {}", format_temperature(b.max_temp)),
            TEXT_SIZE,
            TextAnchor::Start,
        ),
    ]
}

/// Hollow circle, gapped crosshair and the value/name labels of a point.
pub fn point_glyphs(p: &PointAnnotation) -> Vec<Glyph> {
    let (x, y) = (p.x, p.y);
    let arm = |x1: f32, y1: f32, x2: f32, y2: f32| Glyph::Line {
        x1,
        y1,
        x2,
        y2,
        stroke: outlined(LINE_THICKNESS),
    };

    vec![
        Glyph::Circle {
            cx: x,
            cy: y,
            radius: CIRCLE_RADIUS,
            fill: None,
            stroke: outlined(LINE_THICKNESS),
        },
        arm(x - LINE_LENGTH, y, x - LINE_GAP, y),
        arm(x + LINE_GAP, y, x + LINE_LENGTH, y),
        arm(x, y - LINE_LENGTH, x, y - LINE_GAP),
        arm(x, y + LINE_GAP, x, y + LINE_LENGTH),
        label(
            x,
            y - POINT_VALUE_OFFSET,
            format_temperature(p.temperature),
            TEXT_SIZE,
            TextAnchor::Middle,
        ),
        label(
            x,
            y - POINT_NAME_OFFSET,
            p.name.to_uppercase(),
            TITLE_SIZE,
            TextAnchor::Middle,
        ),
    ]
}

/// Rubber-band outline of a box being drawn.
pub fn preview_glyphs(geometry: BoxGeometry) -> Vec<Glyph> {
    vec![Glyph::Rect {
        x: geometry.x,
        y: geometry.y,
        width: geometry.width,
        height: geometry.height,
        stroke: Stroke::new(Color::WHITE, BOX_LINE_THICKNESS),
    }]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::SamplePos;

    fn sample_box() -> BoxAnnotation {
        BoxAnnotation {
            id: 4,
            name: "panel a".to_string(),
            x: 10.0,
            y: 20.0,
            width: 30.0,
            height: 15.0,
            min_temp: 10.05,
            min_pos: SamplePos::new(10, 20),
            max_temp: 55.54,
            max_pos: SamplePos::new(39, 34),
            avg_temp: 31.27,
        }
    }

    fn texts(glyphs: &[Glyph]) -> Vec<(f32, f32, &str)> {
        glyphs
            .iter()
            .filter_map(|g| match g {
                Glyph::Text { x, y, text, .. } => Some((*x, *y, text.as_str())),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_box_labels_sit_right_of_box() {
        let glyphs = box_glyphs(&sample_box());
        let labels = texts(&glyphs);
        assert_eq!(labels.len(), 4);
        assert_eq!(labels[0], (50.0, 20.0, "PANEL A"));
        assert_eq!(labels[1].1, 33.0);
        assert_eq!(labels[3], (50.0, 59.0, "Max: 55.5°C"));
        assert!(labels[2].2.starts_with("Avg: 31.3"));
    }

    #[test]
    fn test_box_markers_are_blue_min_red_max() {
        let glyphs = box_glyphs(&sample_box());
        let fills: Vec<_> = glyphs
            .iter()
            .filter_map(|g| match g {
                Glyph::Circle { cx, cy, fill, .. } => Some((*cx, *cy, *fill)),
                _ => None,
            })
            .collect();
        assert_eq!(fills, vec![
            (10.5, 20.5, Some(Color::BLUE)),
            (39.5, 34.5, Some(Color::RED)),
        ]);
    }

    #[test]
    fn test_point_crosshair_and_labels() {
        let p = PointAnnotation {
            id: 1,
            name: "joint".to_string(),
            x: 50.0,
            y: 25.0,
            temperature: 42.0,
        };
        let glyphs = annotation_glyphs(&Annotation::Point(p));
        let arms = glyphs.iter().filter(|g| matches!(g, Glyph::Line { .. })).count();
        assert_eq!(arms, 4);

        let labels = texts(&glyphs);
        assert_eq!(labels, vec![(50.0, 13.0, "42.0°C"), (50.0, 5.0, "JOINT")]);

        // Arms leave a gap around the centre
        let reach = |x: f32, y: f32| (x - 50.0).abs().max((y - 25.0).abs());
        for g in &glyphs {
            if let Glyph::Line { x1, y1, x2, y2, .. } = *g {
                assert_eq!(reach(x1, y1).min(reach(x2, y2)), LINE_GAP);
                assert_eq!(reach(x1, y1).max(reach(x2, y2)), LINE_LENGTH);
            }
        }
    }

    #[test]
    fn test_preview_is_single_outline() {
        let g = BoxGeometry {
            x: 1.0,
            y: 2.0,
            width: 3.0,
            height: 4.0,
        };
        assert!(matches!(preview_glyphs(g).as_slice(), [Glyph::Rect { .. }]));
        assert_eq!(owner(9), GlyphOwner::Annotation(9));
    }
}

//! Annotation types.
//!
//! Two primitives exist: a named point carrying the sample value under it,
//! and a named box carrying the min/avg/max of the samples it covers. Both
//! freeze their values at creation time.

use serde::{Deserialize, Serialize};

use crate::stats::SamplePos;
use crate::viewport::DataPos;

/// Unique identifier for an annotation. Allocated monotonically, never reused.
pub type AnnotationId = u64;

/// Minimum size (width/height) for a valid box, in samples.
pub const MIN_BOX_SIZE: f32 = 1.0;

/// Annotation variant without payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnotationKind {
    Point,
    Box,
}

impl AnnotationKind {
    /// Get the display name for this kind.
    pub fn name(&self) -> &'static str {
        match self {
            AnnotationKind::Point => "Point",
            AnnotationKind::Box => "Box",
        }
    }

    /// Prefix used for listing labels (`P1`, `B2`, ...).
    pub fn prefix(&self) -> &'static str {
        match self {
            AnnotationKind::Point => "P",
            AnnotationKind::Box => "B",
        }
    }

    pub fn all() -> &'static [AnnotationKind] {
        &[AnnotationKind::Point, AnnotationKind::Box]
    }
}

/// A named point with the sample value under it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointAnnotation {
    pub id: AnnotationId,
    pub name: String,
    pub x: f32,
    pub y: f32,
    pub temperature: f32,
}

/// A named rectangle with statistics over the samples it covers.
///
/// `(x, y)` is the top-left corner; width and height are positive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxAnnotation {
    pub id: AnnotationId,
    pub name: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub min_temp: f32,
    pub min_pos: SamplePos,
    pub max_temp: f32,
    pub max_pos: SamplePos,
    pub avg_temp: f32,
}

/// A committed annotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Annotation {
    Point(PointAnnotation),
    Box(BoxAnnotation),
}

impl Annotation {
    pub fn id(&self) -> AnnotationId {
        match self {
            Annotation::Point(p) => p.id,
            Annotation::Box(b) => b.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Annotation::Point(p) => &p.name,
            Annotation::Box(b) => &b.name,
        }
    }

    pub fn kind(&self) -> AnnotationKind {
        match self {
            Annotation::Point(_) => AnnotationKind::Point,
            Annotation::Box(_) => AnnotationKind::Box,
        }
    }

    pub fn as_box(&self) -> Option<&BoxAnnotation> {
        match self {
            Annotation::Box(b) => Some(b),
            Annotation::Point(_) => None,
        }
    }

    pub fn as_point(&self) -> Option<&PointAnnotation> {
        match self {
            Annotation::Point(p) => Some(p),
            Annotation::Box(_) => None,
        }
    }
}

/// Which annotations an operation applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    Points,
    Boxes,
    #[default]
    All,
}

impl Scope {
    pub fn includes(&self, kind: AnnotationKind) -> bool {
        match self {
            Scope::Points => kind == AnnotationKind::Point,
            Scope::Boxes => kind == AnnotationKind::Box,
            Scope::All => true,
        }
    }
}

/// Normalized rectangle geometry: top-left corner plus positive size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxGeometry {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl BoxGeometry {
    /// Create a normalized box from two corner points.
    pub fn from_corners(a: DataPos, b: DataPos) -> Self {
        Self {
            x: a.x.min(b.x),
            y: a.y.min(b.y),
            width: (b.x - a.x).abs(),
            height: (b.y - a.y).abs(),
        }
    }

    /// Whether both sides reach [`MIN_BOX_SIZE`].
    pub fn is_large_enough(&self) -> bool {
        self.width >= MIN_BOX_SIZE && self.height >= MIN_BOX_SIZE
    }
}

/// State for a box currently being drawn.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DrawingState {
    /// Not currently drawing anything.
    #[default]
    Idle,
    /// Drawing a box from the anchor corner to the current pointer.
    Box { start: DataPos, current: DataPos },
}

impl DrawingState {
    pub fn is_drawing(&self) -> bool {
        !matches!(self, DrawingState::Idle)
    }

    /// Geometry of the in-progress box, if any.
    pub fn geometry(&self) -> Option<BoxGeometry> {
        match self {
            DrawingState::Idle => None,
            DrawingState::Box { start, current } => {
                Some(BoxGeometry::from_corners(*start, *current))
            }
        }
    }
}

/// Validation failures when creating an annotation.
///
/// On any of these the store is left unchanged.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AnnotationError {
    /// The name is empty after trimming
    #[error("Annotation name must not be empty")]
    EmptyName,

    /// The box is smaller than the minimum size
    #[error("Box {width:.1}x{height:.1} is smaller than the minimum size")]
    TooSmall { width: f32, height: f32 },

    /// The point lies outside the image
    #[error("Position ({x:.1}, {y:.1}) is outside the image")]
    OutOfBounds { x: f32, y: f32 },

    /// Commit was requested with no box being drawn
    #[error("No box is being drawn")]
    NotDrawing,

    /// The box covers no samples
    #[error("Box does not cover any samples")]
    EmptyRegion,

    /// There is no image to annotate
    #[error("No image is loaded")]
    NoImage,
}

/// Trim a user-entered name, rejecting empty input.
pub fn validate_name(name: &str) -> Result<String, AnnotationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        Err(AnnotationError::EmptyName)
    } else {
        Ok(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_box_from_corners_normalizes() {
        let g = BoxGeometry::from_corners(DataPos::new(20.0, 5.0), DataPos::new(10.0, 15.0));
        assert_eq!(g, BoxGeometry { x: 10.0, y: 5.0, width: 10.0, height: 10.0 });
        assert!(g.is_large_enough());

        let thin = BoxGeometry::from_corners(DataPos::new(3.0, 3.0), DataPos::new(3.5, 9.0));
        assert!(!thin.is_large_enough());
    }

    #[test]
    fn test_validate_name() {
        assert_eq!(validate_name("  hotspot "), Ok("hotspot".to_string()));
        assert_eq!(validate_name("   "), Err(AnnotationError::EmptyName));
        assert_eq!(validate_name(""), Err(AnnotationError::EmptyName));
    }

    #[test]
    fn test_scope_includes() {
        assert!(Scope::All.includes(AnnotationKind::Point));
        assert!(Scope::Boxes.includes(AnnotationKind::Box));
        assert!(!Scope::Boxes.includes(AnnotationKind::Point));
        assert!(!Scope::Points.includes(AnnotationKind::Box));
    }

    #[test]
    fn test_drawing_state_geometry() {
        assert_eq!(DrawingState::Idle.geometry(), None);
        let drawing = DrawingState::Box {
            start: DataPos::new(4.0, 4.0),
            current: DataPos::new(1.0, 6.0),
        };
        assert!(drawing.is_drawing());
        assert_eq!(drawing.geometry().map(|g| g.x), Some(1.0));
    }

    #[test]
    fn test_annotation_serializes_with_kind_tag() {
        let a = Annotation::Point(PointAnnotation {
            id: 3,
            name: "joint".to_string(),
            x: 1.5,
            y: 2.5,
            temperature: 42.0,
        });
        let json = serde_json::to_string(&a).unwrap();
        assert!(json.contains("\"kind\":\"point\""));
        let back: Annotation = serde_json::from_str(&json).unwrap();
        assert_eq!(back, a);
    }
}

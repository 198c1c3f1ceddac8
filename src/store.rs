//! Annotation storage with undo.
//!
//! Boxes are created in three phases (`begin_box`, `update_box`,
//! `commit_box`); points in one (`place_point`). Every creation is
//! all-or-nothing: on a validation error no annotation and no undo entry is
//! added.

use crate::annotation::{
    Annotation, AnnotationError, AnnotationId, AnnotationKind, BoxAnnotation, BoxGeometry,
    DrawingState, PointAnnotation, Scope, validate_name,
};
use crate::data::DataImage;
use crate::stats;
use crate::undo::{UndoEntry, UndoStack};
use crate::viewport::DataPos;

/// An annotation together with its 1-based index among annotations of the
/// same kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Listed<'a> {
    pub index: usize,
    pub annotation: &'a Annotation,
}

impl Listed<'_> {
    /// Short label such as `P1` or `B3`.
    pub fn label(&self) -> String {
        format!("{}{}", self.annotation.kind().prefix(), self.index)
    }
}

/// Lazy listing of annotations in creation order.
///
/// The listing is finite and `Clone`; cloning it before iterating gives an
/// independent pass over the same annotations.
#[derive(Debug, Clone)]
pub struct Listing<'a> {
    inner: std::slice::Iter<'a, Annotation>,
    scope: Scope,
    points: usize,
    boxes: usize,
}

impl<'a> Iterator for Listing<'a> {
    type Item = Listed<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        for annotation in self.inner.by_ref() {
            let counter = match annotation.kind() {
                AnnotationKind::Point => &mut self.points,
                AnnotationKind::Box => &mut self.boxes,
            };
            *counter += 1;
            if self.scope.includes(annotation.kind()) {
                return Some(Listed {
                    index: *counter,
                    annotation,
                });
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.inner.len()))
    }
}

/// All annotations of the open image plus the undo history and the
/// in-progress box.
#[derive(Debug, Clone, Default)]
pub struct AnnotationStore {
    annotations: Vec<Annotation>,
    undo: UndoStack,
    drawing: DrawingState,
    next_id: AnnotationId,
}

impl AnnotationStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate_id(&mut self) -> AnnotationId {
        self.next_id += 1;
        self.next_id
    }

    fn append(&mut self, annotation: Annotation) -> AnnotationId {
        let id = annotation.id();
        self.undo.push(UndoEntry {
            kind: annotation.kind(),
            id,
        });
        self.annotations.push(annotation);
        id
    }

    /// Start drawing a box anchored at `(x, y)`. Restarts any box in progress.
    pub fn begin_box(&mut self, x: f32, y: f32) {
        let start = DataPos::new(x, y);
        self.drawing = DrawingState::Box {
            start,
            current: start,
        };
        log::trace!("Box drawing started at ({:.1}, {:.1})", x, y);
    }

    /// Move the free corner of the box in progress. Returns false when idle.
    pub fn update_box(&mut self, x: f32, y: f32) -> bool {
        match &mut self.drawing {
            DrawingState::Box { current, .. } => {
                *current = DataPos::new(x, y);
                true
            }
            DrawingState::Idle => false,
        }
    }

    /// Geometry of the box in progress, for the live preview.
    pub fn pending_box(&self) -> Option<BoxGeometry> {
        self.drawing.geometry()
    }

    pub fn is_drawing(&self) -> bool {
        self.drawing.is_drawing()
    }

    /// Discard the box in progress. Returns true if one was being drawn.
    pub fn abandon_box(&mut self) -> bool {
        let was_drawing = self.drawing.is_drawing();
        self.drawing = DrawingState::Idle;
        if was_drawing {
            log::debug!("Box drawing abandoned");
        }
        was_drawing
    }

    /// Finish the box in progress, computing and freezing its statistics.
    ///
    /// The in-progress box is consumed whether or not this succeeds.
    pub fn commit_box(
        &mut self,
        image: &DataImage,
        name: &str,
    ) -> Result<AnnotationId, AnnotationError> {
        let drawing = std::mem::take(&mut self.drawing);
        let geometry = drawing.geometry().ok_or(AnnotationError::NotDrawing)?;
        let name = validate_name(name)?;

        if !geometry.is_large_enough() {
            return Err(AnnotationError::TooSmall {
                width: geometry.width,
                height: geometry.height,
            });
        }

        let region = stats::region_stats(
            image.samples(),
            geometry.x,
            geometry.y,
            geometry.width,
            geometry.height,
        )
        .ok_or(AnnotationError::EmptyRegion)?;

        let id = self.allocate_id();
        log::debug!(
            "Box '{}' committed: min {:.1} avg {:.1} max {:.1}",
            name,
            region.min,
            region.mean,
            region.max
        );
        Ok(self.append(Annotation::Box(BoxAnnotation {
            id,
            name,
            x: geometry.x,
            y: geometry.y,
            width: geometry.width,
            height: geometry.height,
            min_temp: region.min,
            min_pos: region.min_pos,
            max_temp: region.max,
            max_pos: region.max_pos,
            avg_temp: region.mean,
        })))
    }

    /// Place a named point, sampling the value under the floored position.
    pub fn place_point(
        &mut self,
        image: &DataImage,
        x: f32,
        y: f32,
        name: &str,
    ) -> Result<AnnotationId, AnnotationError> {
        let in_bounds = x >= 0.0
            && y >= 0.0
            && x < image.width() as f32
            && y < image.height() as f32;
        let temperature = image
            .sample_at(x, y)
            .filter(|_| in_bounds)
            .ok_or(AnnotationError::OutOfBounds { x, y })?;
        let name = validate_name(name)?;

        let id = self.allocate_id();
        log::debug!("Point '{}' placed: {:.1}", name, temperature);
        Ok(self.append(Annotation::Point(PointAnnotation {
            id,
            name,
            x,
            y,
            temperature,
        })))
    }

    /// Remove the most recently created annotation still present.
    ///
    /// Returns the removed annotation, or `None` when there is nothing to undo.
    pub fn undo(&mut self) -> Option<Annotation> {
        let entry = self.undo.pop()?;
        let pos = self.annotations.iter().position(|a| a.id() == entry.id)?;
        Some(self.annotations.remove(pos))
    }

    /// Remove every annotation within `scope` together with its undo
    /// entries. Returns how many annotations were removed.
    pub fn clear(&mut self, scope: Scope) -> usize {
        let before = self.annotations.len();
        self.annotations.retain(|a| !scope.includes(a.kind()));
        self.undo.remove_scope(scope);
        let removed = before - self.annotations.len();
        log::debug!("Cleared {} annotations ({:?})", removed, scope);
        removed
    }

    /// Drop everything for a newly opened image. Ids keep increasing.
    pub fn reset(&mut self) {
        self.annotations.clear();
        self.undo.clear();
        self.drawing = DrawingState::Idle;
    }

    /// List annotations within `scope` in creation order.
    pub fn list(&self, scope: Scope) -> Listing<'_> {
        Listing {
            inner: self.annotations.iter(),
            scope,
            points: 0,
            boxes: 0,
        }
    }

    /// All annotations in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &Annotation> + '_ {
        self.annotations.iter()
    }

    pub fn get(&self, id: AnnotationId) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.id() == id)
    }

    /// The earliest box still present, used by the report.
    pub fn first_box(&self) -> Option<&BoxAnnotation> {
        self.annotations.iter().find_map(Annotation::as_box)
    }

    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    pub fn can_undo(&self) -> bool {
        self.undo.can_undo()
    }
}

#[cfg(test)]
mod tests {
    use ndarray::Array2;

    use super::*;

    const EPSILON: f32 = 0.0001;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    fn gradient() -> DataImage {
        let samples = Array2::from_shape_fn((50, 100), |(_, c)| 10.0 * c as f32 / 99.0);
        DataImage::new(samples, "gradient.npy").unwrap()
    }

    fn constant() -> DataImage {
        DataImage::new(Array2::from_elem((50, 100), 42.0), "flat.npy").unwrap()
    }

    fn draw_box(store: &mut AnnotationStore, x0: f32, y0: f32, x1: f32, y1: f32) {
        store.begin_box(x0, y0);
        store.update_box((x0 + x1) / 2.0, (y0 + y1) / 2.0);
        store.update_box(x1, y1);
    }

    #[test]
    fn test_commit_box_freezes_statistics() {
        let image = gradient();
        let mut store = AnnotationStore::new();
        draw_box(&mut store, 10.0, 10.0, 20.0, 20.0);

        let id = store.commit_box(&image, "B-hot").unwrap();
        let b = store.get(id).and_then(Annotation::as_box).unwrap();

        assert!(approx_eq(b.min_temp, 10.0 * 10.0 / 99.0));
        assert!(approx_eq(b.max_temp, 10.0 * 19.0 / 99.0));
        assert!(approx_eq(b.avg_temp, 10.0 * 14.5 / 99.0));
        assert_eq!((b.x, b.y, b.width, b.height), (10.0, 10.0, 10.0, 10.0));
        assert_eq!(store.undo_len(), 1);
        assert!(!store.is_drawing());
    }

    #[test]
    fn test_box_dragged_backwards_is_normalized() {
        let image = gradient();
        let mut store = AnnotationStore::new();
        draw_box(&mut store, 20.0, 20.0, 10.0, 10.0);
        let id = store.commit_box(&image, "reverse").unwrap();
        let b = store.get(id).and_then(Annotation::as_box).unwrap();
        assert_eq!((b.x, b.y, b.width, b.height), (10.0, 10.0, 10.0, 10.0));
    }

    #[test]
    fn test_place_point_samples_floored_cell() {
        let image = constant();
        let mut store = AnnotationStore::new();
        let id = store.place_point(&image, 5.7, 5.2, "joint").unwrap();

        let p = store.get(id).and_then(Annotation::as_point).unwrap();
        assert_eq!(p.temperature, 42.0);
        assert_eq!(p.name, "joint");
        assert_eq!(store.len(), 1);
        assert_eq!(store.undo_len(), 1);
    }

    #[test]
    fn test_rejected_creations_leave_store_unchanged() {
        let image = gradient();
        let mut store = AnnotationStore::new();

        draw_box(&mut store, 10.0, 10.0, 20.0, 20.0);
        assert_eq!(store.commit_box(&image, "  "), Err(AnnotationError::EmptyName));
        assert!(!store.is_drawing());

        draw_box(&mut store, 10.0, 10.0, 10.5, 30.0);
        assert!(matches!(
            store.commit_box(&image, "thin"),
            Err(AnnotationError::TooSmall { .. })
        ));

        draw_box(&mut store, 200.0, 200.0, 220.0, 220.0);
        assert_eq!(store.commit_box(&image, "off"), Err(AnnotationError::EmptyRegion));

        assert_eq!(store.commit_box(&image, "idle"), Err(AnnotationError::NotDrawing));

        assert!(matches!(
            store.place_point(&image, 100.0, 3.0, "edge"),
            Err(AnnotationError::OutOfBounds { .. })
        ));
        assert!(matches!(
            store.place_point(&image, -0.5, 3.0, "neg"),
            Err(AnnotationError::OutOfBounds { .. })
        ));
        assert_eq!(store.place_point(&image, 3.0, 3.0, ""), Err(AnnotationError::EmptyName));

        assert!(store.is_empty());
        assert_eq!(store.undo_len(), 0);
    }

    #[test]
    fn test_create_then_undo_restores_prior_state() {
        let image = gradient();
        let mut store = AnnotationStore::new();
        store.place_point(&image, 1.0, 1.0, "first").unwrap();
        let before: Vec<Annotation> = store.iter().cloned().collect();
        let undo_before = store.undo_len();

        store.place_point(&image, 2.0, 2.0, "second").unwrap();
        let undone = store.undo().unwrap();
        assert_eq!(undone.name(), "second");
        assert_eq!(store.iter().cloned().collect::<Vec<_>>(), before);
        assert_eq!(store.undo_len(), undo_before);

        draw_box(&mut store, 0.0, 0.0, 5.0, 5.0);
        store.commit_box(&image, "box").unwrap();
        assert_eq!(store.undo().map(|a| a.kind()), Some(AnnotationKind::Box));
        assert_eq!(store.iter().cloned().collect::<Vec<_>>(), before);
        assert_eq!(store.undo_len(), undo_before);
    }

    #[test]
    fn test_undo_on_empty_is_noop() {
        let mut store = AnnotationStore::new();
        assert_eq!(store.undo(), None);
        assert!(store.is_empty());
    }

    #[test]
    fn test_clear_all_empties_store_and_history() {
        let image = gradient();
        let mut store = AnnotationStore::new();
        store.place_point(&image, 1.0, 1.0, "p").unwrap();
        draw_box(&mut store, 0.0, 0.0, 5.0, 5.0);
        store.commit_box(&image, "b").unwrap();

        assert_eq!(store.clear(Scope::All), 2);
        assert!(store.is_empty());
        assert_eq!(store.undo_len(), 0);
        assert_eq!(store.undo(), None);
        assert!(store.is_empty());
    }

    #[test]
    fn test_clear_scope_removes_matching_undo_entries() {
        let image = gradient();
        let mut store = AnnotationStore::new();
        store.place_point(&image, 1.0, 1.0, "p1").unwrap();
        draw_box(&mut store, 0.0, 0.0, 5.0, 5.0);
        store.commit_box(&image, "b1").unwrap();
        store.place_point(&image, 2.0, 2.0, "p2").unwrap();

        assert_eq!(store.clear(Scope::Points), 2);
        assert_eq!(store.undo_len(), 1);

        // The next undo targets the box, not a cleared point
        assert_eq!(store.undo().map(|a| a.name().to_string()), Some("b1".to_string()));
        assert!(store.is_empty());
    }

    #[test]
    fn test_listing_indices_and_restart() {
        let image = gradient();
        let mut store = AnnotationStore::new();
        store.place_point(&image, 1.0, 1.0, "a").unwrap();
        draw_box(&mut store, 0.0, 0.0, 5.0, 5.0);
        store.commit_box(&image, "x").unwrap();
        store.place_point(&image, 2.0, 2.0, "b").unwrap();

        let labels: Vec<String> = store.list(Scope::All).map(|l| l.label()).collect();
        assert_eq!(labels, ["P1", "B1", "P2"]);

        let points: Vec<String> = store.list(Scope::Points).map(|l| l.label()).collect();
        assert_eq!(points, ["P1", "P2"]);

        let boxes = store.list(Scope::Boxes);
        let again = boxes.clone();
        assert_eq!(boxes.count(), 1);
        assert_eq!(again.count(), 1);
    }

    #[test]
    fn test_ids_are_never_reused() {
        let image = constant();
        let mut store = AnnotationStore::new();
        let a = store.place_point(&image, 1.0, 1.0, "a").unwrap();
        store.undo();
        let b = store.place_point(&image, 1.0, 1.0, "b").unwrap();
        store.reset();
        let c = store.place_point(&image, 1.0, 1.0, "c").unwrap();
        assert!(a < b && b < c);
    }

    #[test]
    fn test_first_box_skips_points() {
        let image = gradient();
        let mut store = AnnotationStore::new();
        assert!(store.first_box().is_none());
        store.place_point(&image, 1.0, 1.0, "p").unwrap();
        draw_box(&mut store, 0.0, 0.0, 4.0, 4.0);
        store.commit_box(&image, "first").unwrap();
        draw_box(&mut store, 5.0, 5.0, 9.0, 9.0);
        store.commit_box(&image, "second").unwrap();
        assert_eq!(store.first_box().map(|b| b.name.as_str()), Some("first"));
    }
}

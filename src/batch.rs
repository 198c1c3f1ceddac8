//! Scripted annotation from a JSON job file.
//!
//! A job lists points and boxes in data coordinates. They are replayed
//! through the same interaction path a pointer would take, with names
//! answered by a [`ScriptedPrompt`].
//!
//! ```json
//! {
//!   "colormap": "inferno",
//!   "low": 20.0,
//!   "points": [{ "name": "joint", "x": 120.5, "y": 40.0 }],
//!   "boxes": [{ "name": "panel a", "x": 10, "y": 10, "width": 80, "height": 40 }]
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thermark_render::Colormap;
use web_time::Instant;

use crate::annotation::{AnnotationError, AnnotationId};
use crate::interaction::{
    Change, InteractionMode, PointerButton, PointerEvent, PointerPhase, ScreenPos, ScriptedPrompt,
};
use crate::report::ProjectInfo;
use crate::session::Session;
use crate::viewport::DataPos;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointSpec {
    pub name: String,
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxSpec {
    pub name: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchJob {
    pub colormap: Option<Colormap>,
    pub low: Option<f32>,
    pub high: Option<f32>,
    pub points: Vec<PointSpec>,
    pub boxes: Vec<BoxSpec>,
    /// Report fields, when a report should be generated
    pub project: Option<ProjectInfo>,
}

#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("Failed to read job file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse job file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Result of replaying a job.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BatchOutcome {
    pub created: Vec<AnnotationId>,
    /// Name and reason of every annotation that was not created
    pub rejected: Vec<(String, AnnotationError)>,
    /// Display levels that were out of range and ignored
    pub ignored_levels: Vec<f32>,
}

impl BatchJob {
    pub fn from_json(json: &str) -> Result<Self, BatchError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self, BatchError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Apply display settings and replay annotations onto `session`.
    pub fn apply(&self, session: &mut Session, now: Instant) -> BatchOutcome {
        let mut outcome = BatchOutcome::default();

        if let Some(colormap) = self.colormap {
            session.set_colormap(colormap);
        }
        if let Some(low) = self.low {
            if !session.set_low(low) {
                outcome.ignored_levels.push(low);
            }
        }
        if let Some(high) = self.high {
            if !session.set_high(high) {
                outcome.ignored_levels.push(high);
            }
        }

        let Some(image) = session.image().cloned() else {
            let names = self.points.iter().map(|p| &p.name);
            for name in names.chain(self.boxes.iter().map(|b| &b.name)) {
                reject(&mut outcome, name, AnnotationError::NoImage);
            }
            return outcome;
        };
        let previous = session.mode();
        let view_width = image.width() as f32;
        let event = |phase, button, x: f32, y: f32| {
            let data = image.contains(x, y).then(|| DataPos::new(x, y));
            PointerEvent::new(phase, button, ScreenPos::default(), data)
        };

        session.set_mode(InteractionMode::PlacePoint);
        for point in &self.points {
            let mut prompt = ScriptedPrompt::new([point.name.as_str()]);
            let press = event(PointerPhase::Press, PointerButton::Primary, point.x, point.y);
            let change = session.handle_pointer(press, view_width, &mut prompt, now).change;
            let skipped = if press.data.is_none() {
                AnnotationError::OutOfBounds {
                    x: point.x,
                    y: point.y,
                }
            } else {
                // A blank point name is ignored without a change
                AnnotationError::EmptyName
            };
            record(&mut outcome, &point.name, change, skipped);
        }

        session.set_mode(InteractionMode::DrawBox);
        for spec in &self.boxes {
            let mut prompt = ScriptedPrompt::new([spec.name.as_str()]);
            let (end_x, end_y) = (spec.x + spec.width, spec.y + spec.height);
            let press = event(PointerPhase::Press, PointerButton::Secondary, spec.x, spec.y);
            let release = event(PointerPhase::Release, PointerButton::Secondary, end_x, end_y);
            let skipped = match press.data {
                None => AnnotationError::OutOfBounds {
                    x: spec.x,
                    y: spec.y,
                },
                Some(_) => AnnotationError::OutOfBounds { x: end_x, y: end_y },
            };
            session.handle_pointer(press, view_width, &mut prompt, now);
            let change = session.handle_pointer(release, view_width, &mut prompt, now).change;
            record(&mut outcome, &spec.name, change, skipped);
        }

        session.set_mode(previous);
        log::info!(
            "Batch applied: {} created, {} rejected",
            outcome.created.len(),
            outcome.rejected.len()
        );
        outcome
    }
}

/// Record the change of one replayed entry. `skipped` is the reason used
/// when the interaction abandoned the entry or ignored it.
fn record(
    outcome: &mut BatchOutcome,
    name: &str,
    change: Option<Change>,
    skipped: AnnotationError,
) {
    match change {
        Some(Change::Created(id)) => outcome.created.push(id),
        Some(Change::Rejected(e)) => reject(outcome, name, e),
        Some(Change::Abandoned) | None => reject(outcome, name, skipped),
    }
}

fn reject(outcome: &mut BatchOutcome, name: &str, reason: AnnotationError) {
    log::warn!("Skipping '{}': {}", name, reason);
    outcome.rejected.push((name.to_string(), reason));
}

#[cfg(test)]
mod tests {
    use ndarray::Array2;

    use super::*;
    use crate::annotation::{Annotation, Scope};
    use crate::data::DataImage;

    fn session() -> Session {
        let samples = Array2::from_shape_fn((50, 100), |(_, c)| 10.0 * c as f32 / 99.0);
        let mut session = Session::default();
        session.load(DataImage::new(samples, "gradient.npy").unwrap());
        session
    }

    const JOB: &str = r#"{
        "colormap": "gray",
        "low": 1.0,
        "high": 500.0,
        "points": [{ "name": "joint", "x": 0.5, "y": 3.0 }],
        "boxes": [
            { "name": "left", "x": 0, "y": 0, "width": 10, "height": 10 },
            { "name": "tiny", "x": 5, "y": 5, "width": 0.2, "height": 4 },
            { "name": "", "x": 20, "y": 5, "width": 10, "height": 10 }
        ]
    }"#;

    #[test]
    fn test_apply_job() {
        let mut session = session();
        let job = BatchJob::from_json(JOB).unwrap();
        let outcome = job.apply(&mut session, Instant::now());

        assert_eq!(outcome.created.len(), 2);
        assert_eq!(outcome.ignored_levels, vec![500.0]);
        let rejected: Vec<_> = outcome.rejected.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(rejected, vec!["tiny", ""]);
        assert!(matches!(outcome.rejected[0].1, AnnotationError::TooSmall { .. }));

        assert_eq!(session.colormap(), Colormap::Gray);
        assert_eq!(session.intensity().unwrap().low, 1.0);
        assert_eq!(session.mode(), InteractionMode::Navigate);

        let left = session.store().first_box().unwrap();
        assert_eq!(left.name, "left");
        assert_eq!(left.min_temp, 0.0);
        let points: Vec<_> = session.store().list(Scope::Points).collect();
        assert!(matches!(points[0].annotation, Annotation::Point(p) if p.temperature == 0.0));
    }

    #[test]
    fn test_entries_outside_image_are_skipped() {
        let mut session = session();
        let job = BatchJob::from_json(
            r#"{
                "points": [
                    { "name": "off", "x": 120.0, "y": 3.0 },
                    { "name": " ", "x": 2.0, "y": 3.0 }
                ],
                "boxes": [
                    { "name": "overhang", "x": 90, "y": 10, "width": 20, "height": 5 },
                    { "name": "edge", "x": 90, "y": 40, "width": 10, "height": 10 }
                ]
            }"#,
        )
        .unwrap();
        let outcome = job.apply(&mut session, Instant::now());

        assert_eq!(outcome.created.len(), 1);
        assert_eq!(session.store().first_box().unwrap().name, "edge");
        assert_eq!(
            outcome.rejected,
            vec![
                ("off".to_string(), AnnotationError::OutOfBounds { x: 120.0, y: 3.0 }),
                (" ".to_string(), AnnotationError::EmptyName),
                ("overhang".to_string(), AnnotationError::OutOfBounds { x: 110.0, y: 15.0 }),
            ]
        );
        assert!(!session.store().is_drawing());
    }

    #[test]
    fn test_apply_without_image() {
        let mut session = Session::default();
        let outcome = BatchJob::from_json(JOB).unwrap().apply(&mut session, Instant::now());
        assert!(outcome.created.is_empty());
        assert_eq!(outcome.rejected.len(), 4);
        assert!(outcome
            .rejected
            .iter()
            .all(|(_, e)| *e == AnnotationError::NoImage));
    }

    #[test]
    fn test_empty_job_file_is_valid() {
        let job = BatchJob::from_json("{}").unwrap();
        assert!(job.points.is_empty() && job.project.is_none());
    }

    #[test]
    fn test_load_missing_file() {
        assert!(matches!(
            BatchJob::load(Path::new("/no/such/job.json")),
            Err(BatchError::Io(_))
        ));
    }
}

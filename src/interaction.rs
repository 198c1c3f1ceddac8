//! Interaction state machine.
//!
//! Maps abstract pointer and scroll events onto viewport and annotation
//! store operations according to the active [`InteractionMode`]. Exactly one
//! mode is active at a time. Events whose `data` position is `None` (outside
//! the displayed image) are ignored, except a release while a box is being
//! drawn, which abandons that box.

use std::collections::VecDeque;

use crate::annotation::{AnnotationError, AnnotationId};
use crate::data::DataImage;
use crate::store::AnnotationStore;
use crate::viewport::{DataPos, Viewport, ZoomDirection};

/// Input modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InteractionMode {
    /// Pan with the primary button, zoom with the wheel
    #[default]
    Navigate,
    /// Draw boxes with the secondary button
    DrawBox,
    /// Place points with the primary button
    PlacePoint,
}

impl InteractionMode {
    pub fn name(&self) -> &'static str {
        match self {
            InteractionMode::Navigate => "Navigate",
            InteractionMode::DrawBox => "Draw Box",
            InteractionMode::PlacePoint => "Place Point",
        }
    }

    pub fn all() -> &'static [InteractionMode] {
        &[
            InteractionMode::Navigate,
            InteractionMode::DrawBox,
            InteractionMode::PlacePoint,
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerPhase {
    Press,
    Move,
    Release,
}

/// Button involved in the event. For `Move` this is the button held, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
    None,
}

/// Device position in pixels, y pointing down.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScreenPos {
    pub x: f32,
    pub y: f32,
}

impl ScreenPos {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub phase: PointerPhase,
    pub button: PointerButton,
    pub screen: ScreenPos,
    /// Data-space position, `None` outside the displayed image.
    pub data: Option<DataPos>,
}

impl PointerEvent {
    pub fn new(
        phase: PointerPhase,
        button: PointerButton,
        screen: ScreenPos,
        data: Option<DataPos>,
    ) -> Self {
        Self {
            phase,
            button,
            screen,
            data,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollEvent {
    /// Positive scrolls away from the user (zoom in).
    pub delta: f32,
    pub data: Option<DataPos>,
}

/// What a name prompt is asking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptRequest {
    BoxName,
    PointName,
}

impl PromptRequest {
    pub fn title(&self) -> &'static str {
        match self {
            PromptRequest::BoxName => "Box Name",
            PromptRequest::PointName => "Point Name",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            PromptRequest::BoxName => "Enter a name for this region:",
            PromptRequest::PointName => "Enter a name for this point:",
        }
    }
}

/// Asks the operator for an annotation name.
pub trait NamePrompt {
    /// Returns `None` when the operator cancels.
    fn prompt(&mut self, request: PromptRequest) -> Option<String>;
}

/// Prompt answering from a queue. Exhausted queues answer "cancel".
#[derive(Debug, Clone, Default)]
pub struct ScriptedPrompt {
    answers: VecDeque<Option<String>>,
    asked: Vec<PromptRequest>,
}

impl ScriptedPrompt {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(|s| Some(s.into())).collect(),
            asked: Vec::new(),
        }
    }

    /// Queue a name.
    pub fn answer(&mut self, name: impl Into<String>) {
        self.answers.push_back(Some(name.into()));
    }

    /// Queue a cancellation.
    pub fn cancel(&mut self) {
        self.answers.push_back(None);
    }

    /// Requests seen so far, in order.
    pub fn asked(&self) -> &[PromptRequest] {
        &self.asked
    }
}

impl NamePrompt for ScriptedPrompt {
    fn prompt(&mut self, request: PromptRequest) -> Option<String> {
        self.asked.push(request);
        self.answers.pop_front().flatten()
    }
}

/// Sample value under the pointer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hover {
    pub pos: DataPos,
    pub value: f32,
}

/// Hover label text while the pointer is outside the image.
pub const HOVER_IDLE: &str = "🎯 Temp: Move cursor over image";

impl Hover {
    /// Label text for the hover readout.
    pub fn readout(&self) -> String {
        format!("🎯 Temp: {:.2} °C", self.value)
    }
}

/// Annotation-level result of an event.
#[derive(Debug, Clone, PartialEq)]
pub enum Change {
    Created(AnnotationId),
    Rejected(AnnotationError),
    /// An in-progress box was discarded
    Abandoned,
}

/// Result of handling one event.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Outcome {
    /// The view needs repainting
    pub redraw: bool,
    pub hover: Option<Hover>,
    pub change: Option<Change>,
}

impl Outcome {
    fn redraw() -> Self {
        Self {
            redraw: true,
            ..Self::default()
        }
    }

    fn changed(change: Change) -> Self {
        Self {
            redraw: true,
            hover: None,
            change: Some(change),
        }
    }
}

/// Everything an event may touch.
pub struct Targets<'a> {
    pub image: &'a DataImage,
    pub viewport: &'a mut Viewport,
    pub store: &'a mut AnnotationStore,
    /// Width of the view widget in device pixels, for pan scaling.
    pub view_width_px: f32,
}

/// Active mode and gesture tracking.
#[derive(Debug, Clone, Default)]
pub struct Interaction {
    mode: InteractionMode,
    /// Last screen position of an active pan drag.
    pan_anchor: Option<ScreenPos>,
}

impl Interaction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> InteractionMode {
        self.mode
    }

    pub fn is_panning(&self) -> bool {
        self.pan_anchor.is_some()
    }

    /// Switch mode, abandoning any gesture in progress.
    pub fn set_mode(&mut self, mode: InteractionMode, store: &mut AnnotationStore) -> Outcome {
        self.pan_anchor = None;
        let abandoned = store.abandon_box();
        if mode != self.mode {
            log::debug!("Interaction mode: {} -> {}", self.mode.name(), mode.name());
        }
        self.mode = mode;
        if abandoned {
            Outcome::changed(Change::Abandoned)
        } else {
            Outcome::default()
        }
    }

    /// Zoom step requested by a scroll event, if it applies.
    pub fn handle_scroll(&self, event: ScrollEvent) -> Option<ZoomDirection> {
        if self.mode != InteractionMode::Navigate || event.data.is_none() {
            return None;
        }
        ZoomDirection::from_scroll(event.delta)
    }

    /// Handle a pointer event.
    pub fn handle_pointer(
        &mut self,
        event: PointerEvent,
        targets: Targets<'_>,
        prompt: &mut dyn NamePrompt,
    ) -> Outcome {
        if event.phase == PointerPhase::Release && event.button == PointerButton::Primary {
            self.pan_anchor = None;
        }
        let Some(pos) = event.data else {
            if event.phase == PointerPhase::Release && targets.store.abandon_box() {
                return Outcome::changed(Change::Abandoned);
            }
            return Outcome::default();
        };

        let mut outcome = match self.mode {
            InteractionMode::Navigate => {
                self.navigate(event, targets.viewport, targets.view_width_px)
            }
            InteractionMode::DrawBox => {
                Self::draw_box(event, pos, targets.image, targets.store, prompt)
            }
            InteractionMode::PlacePoint => {
                Self::place_point(event, pos, targets.image, targets.store, prompt)
            }
        };

        if event.phase == PointerPhase::Move {
            outcome.hover = targets
                .image
                .sample_at(pos.x, pos.y)
                .map(|value| Hover { pos, value });
        }
        outcome
    }

    fn navigate(
        &mut self,
        event: PointerEvent,
        viewport: &mut Viewport,
        view_width_px: f32,
    ) -> Outcome {
        match (event.phase, event.button) {
            (PointerPhase::Press, PointerButton::Primary) => {
                self.pan_anchor = Some(event.screen);
                Outcome::default()
            }
            (PointerPhase::Move, PointerButton::Primary) => {
                let Some(anchor) = self.pan_anchor else {
                    return Outcome::default();
                };
                let scale = viewport.screen_to_data_scale(view_width_px);
                viewport.pan(event.screen.x - anchor.x, event.screen.y - anchor.y, scale);
                self.pan_anchor = Some(event.screen);
                Outcome::redraw()
            }
            (PointerPhase::Release, PointerButton::Primary) => {
                self.pan_anchor = None;
                Outcome::default()
            }
            _ => Outcome::default(),
        }
    }

    fn draw_box(
        event: PointerEvent,
        pos: DataPos,
        image: &DataImage,
        store: &mut AnnotationStore,
        prompt: &mut dyn NamePrompt,
    ) -> Outcome {
        match (event.phase, event.button) {
            (PointerPhase::Press, PointerButton::Secondary) => {
                store.begin_box(pos.x, pos.y);
                Outcome::redraw()
            }
            (PointerPhase::Move, _) => {
                if store.update_box(pos.x, pos.y) {
                    Outcome::redraw()
                } else {
                    Outcome::default()
                }
            }
            (PointerPhase::Release, PointerButton::Secondary) if store.is_drawing() => {
                store.update_box(pos.x, pos.y);
                match prompt.prompt(PromptRequest::BoxName) {
                    None => {
                        store.abandon_box();
                        Outcome::changed(Change::Abandoned)
                    }
                    Some(name) => match store.commit_box(image, &name) {
                        Ok(id) => Outcome::changed(Change::Created(id)),
                        Err(e) => {
                            log::debug!("Box rejected: {}", e);
                            Outcome::changed(Change::Rejected(e))
                        }
                    },
                }
            }
            _ => Outcome::default(),
        }
    }

    fn place_point(
        event: PointerEvent,
        pos: DataPos,
        image: &DataImage,
        store: &mut AnnotationStore,
        prompt: &mut dyn NamePrompt,
    ) -> Outcome {
        if (event.phase, event.button) != (PointerPhase::Press, PointerButton::Primary) {
            return Outcome::default();
        }

        let Some(name) = prompt.prompt(PromptRequest::PointName) else {
            return Outcome::default();
        };
        match store.place_point(image, pos.x, pos.y, &name) {
            Ok(id) => Outcome::changed(Change::Created(id)),
            // A blank answer counts as a cancel
            Err(AnnotationError::EmptyName) => Outcome::default(),
            Err(e) => {
                log::debug!("Point rejected: {}", e);
                Outcome::changed(Change::Rejected(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use ndarray::Array2;

    use super::*;
    use crate::annotation::Annotation;

    struct Fixture {
        image: DataImage,
        viewport: Viewport,
        store: AnnotationStore,
        interaction: Interaction,
    }

    impl Fixture {
        fn new() -> Self {
            let samples = Array2::from_shape_fn((50, 100), |(_, c)| 10.0 * c as f32 / 99.0);
            Self {
                image: DataImage::new(samples, "gradient.npy").unwrap(),
                viewport: Viewport::new(100, 50),
                store: AnnotationStore::new(),
                interaction: Interaction::new(),
            }
        }

        fn send(&mut self, event: PointerEvent, prompt: &mut dyn NamePrompt) -> Outcome {
            let targets = Targets {
                image: &self.image,
                viewport: &mut self.viewport,
                store: &mut self.store,
                view_width_px: 200.0,
            };
            self.interaction.handle_pointer(event, targets, prompt)
        }

        fn set_mode(&mut self, mode: InteractionMode) -> Outcome {
            self.interaction.set_mode(mode, &mut self.store)
        }
    }

    fn at(phase: PointerPhase, button: PointerButton, x: f32, y: f32) -> PointerEvent {
        PointerEvent::new(phase, button, ScreenPos::new(x * 2.0, y * 2.0), Some(DataPos::new(x, y)))
    }

    fn outside(phase: PointerPhase, button: PointerButton) -> PointerEvent {
        PointerEvent::new(phase, button, ScreenPos::new(-5.0, -5.0), None)
    }

    #[test]
    fn test_draw_box_gesture_creates_box() {
        let mut f = Fixture::new();
        let mut prompt = ScriptedPrompt::new(["Panel A"]);
        f.set_mode(InteractionMode::DrawBox);

        f.send(at(PointerPhase::Press, PointerButton::Secondary, 10.0, 10.0), &mut prompt);
        let moved = f.send(
            at(PointerPhase::Move, PointerButton::Secondary, 15.0, 15.0),
            &mut prompt,
        );
        assert!(moved.redraw);
        assert!(f.store.pending_box().is_some());

        let done = f.send(
            at(PointerPhase::Release, PointerButton::Secondary, 20.0, 20.0),
            &mut prompt,
        );
        let Some(Change::Created(id)) = done.change else {
            panic!("expected a created box, got {:?}", done.change);
        };
        let b = f.store.get(id).and_then(Annotation::as_box).unwrap();
        assert_eq!(b.name, "Panel A");
        assert_eq!((b.width, b.height), (10.0, 10.0));
        assert_eq!(prompt.asked(), &[PromptRequest::BoxName]);
    }

    #[test]
    fn test_cancelled_box_prompt_abandons() {
        let mut f = Fixture::new();
        let mut prompt = ScriptedPrompt::default();
        prompt.cancel();
        f.set_mode(InteractionMode::DrawBox);

        f.send(at(PointerPhase::Press, PointerButton::Secondary, 10.0, 10.0), &mut prompt);
        let out = f.send(
            at(PointerPhase::Release, PointerButton::Secondary, 20.0, 20.0),
            &mut prompt,
        );
        assert_eq!(out.change, Some(Change::Abandoned));
        assert!(f.store.is_empty());
        assert!(!f.store.is_drawing());
    }

    #[test]
    fn test_release_outside_abandons_box_without_prompt() {
        let mut f = Fixture::new();
        let mut prompt = ScriptedPrompt::new(["never asked"]);
        f.set_mode(InteractionMode::DrawBox);

        f.send(at(PointerPhase::Press, PointerButton::Secondary, 10.0, 10.0), &mut prompt);
        let out = f.send(outside(PointerPhase::Release, PointerButton::Secondary), &mut prompt);
        assert_eq!(out.change, Some(Change::Abandoned));
        assert!(prompt.asked().is_empty());
        assert_eq!(f.store.undo_len(), 0);
    }

    #[test]
    fn test_too_small_box_is_rejected() {
        let mut f = Fixture::new();
        let mut prompt = ScriptedPrompt::new(["dot"]);
        f.set_mode(InteractionMode::DrawBox);

        f.send(at(PointerPhase::Press, PointerButton::Secondary, 10.0, 10.0), &mut prompt);
        let out = f.send(
            at(PointerPhase::Release, PointerButton::Secondary, 10.4, 10.2),
            &mut prompt,
        );
        assert!(matches!(out.change, Some(Change::Rejected(AnnotationError::TooSmall { .. }))));
        assert!(f.store.is_empty());
    }

    #[test]
    fn test_place_point_and_blank_name() {
        let mut f = Fixture::new();
        let mut prompt = ScriptedPrompt::new(["   ", "Joint 3"]);
        f.set_mode(InteractionMode::PlacePoint);

        let blank = f.send(at(PointerPhase::Press, PointerButton::Primary, 5.0, 5.0), &mut prompt);
        assert_eq!(blank.change, None);
        assert!(f.store.is_empty());

        let out = f.send(at(PointerPhase::Press, PointerButton::Primary, 5.0, 5.0), &mut prompt);
        assert!(matches!(out.change, Some(Change::Created(_))));
        assert_eq!(f.store.list(crate::annotation::Scope::Points).count(), 1);
    }

    #[test]
    fn test_secondary_press_in_navigate_does_nothing() {
        let mut f = Fixture::new();
        let mut prompt = ScriptedPrompt::default();
        let out = f.send(
            at(PointerPhase::Press, PointerButton::Secondary, 10.0, 10.0),
            &mut prompt,
        );
        assert_eq!(out, Outcome::default());
        assert!(!f.store.is_drawing());
    }

    #[test]
    fn test_navigate_drag_pans() {
        let mut f = Fixture::new();
        let mut prompt = ScriptedPrompt::default();
        for _ in 0..5 {
            f.viewport.zoom(ZoomDirection::In);
        }
        let before = f.viewport.window();

        f.send(at(PointerPhase::Press, PointerButton::Primary, 50.0, 25.0), &mut prompt);
        assert!(f.interaction.is_panning());
        // Screen moves 10 px left
        let drag = PointerEvent::new(
            PointerPhase::Move,
            PointerButton::Primary,
            ScreenPos::new(90.0, 50.0),
            Some(DataPos::new(45.0, 25.0)),
        );
        let out = f.send(drag, &mut prompt);
        assert!(out.redraw);

        let scale = before.width() / 200.0;
        let after = f.viewport.window();
        assert!((after.x_min - (before.x_min + 10.0 * scale)).abs() < 1e-4);

        f.send(at(PointerPhase::Release, PointerButton::Primary, 45.0, 25.0), &mut prompt);
        assert!(!f.interaction.is_panning());
    }

    #[test]
    fn test_release_outside_ends_pan() {
        let mut f = Fixture::new();
        let mut prompt = ScriptedPrompt::default();
        for _ in 0..10 {
            f.viewport.zoom(ZoomDirection::In);
        }

        f.send(at(PointerPhase::Press, PointerButton::Primary, 50.0, 25.0), &mut prompt);
        assert!(f.interaction.is_panning());
        f.send(outside(PointerPhase::Release, PointerButton::Primary), &mut prompt);
        assert!(!f.interaction.is_panning());

        // A drag starting outside the image never pans
        let before = f.viewport.window();
        f.send(outside(PointerPhase::Press, PointerButton::Primary), &mut prompt);
        let out = f.send(at(PointerPhase::Move, PointerButton::Primary, 5.0, 25.0), &mut prompt);
        assert!(!out.redraw);
        assert_eq!(f.viewport.window(), before);
    }

    #[test]
    fn test_hover_reports_value_in_any_mode() {
        let mut f = Fixture::new();
        let mut prompt = ScriptedPrompt::default();
        for &mode in InteractionMode::all() {
            f.set_mode(mode);
            let out = f.send(at(PointerPhase::Move, PointerButton::None, 99.5, 1.0), &mut prompt);
            let hover = out.hover.unwrap();
            assert!((hover.value - 10.0).abs() < 1e-4);
            assert_eq!(hover.readout(), "🎯 Temp: 10.00 °C");
        }
        assert!(f.store.is_empty());
    }

    #[test]
    fn test_events_outside_are_ignored() {
        let mut f = Fixture::new();
        let mut prompt = ScriptedPrompt::new(["p"]);
        f.set_mode(InteractionMode::PlacePoint);
        let out = f.send(outside(PointerPhase::Press, PointerButton::Primary), &mut prompt);
        assert_eq!(out, Outcome::default());
        assert!(prompt.asked().is_empty());
    }

    #[test]
    fn test_mode_switch_abandons_pending_box() {
        let mut f = Fixture::new();
        let mut prompt = ScriptedPrompt::default();
        f.set_mode(InteractionMode::DrawBox);
        f.send(at(PointerPhase::Press, PointerButton::Secondary, 10.0, 10.0), &mut prompt);

        let out = f.set_mode(InteractionMode::PlacePoint);
        assert_eq!(out.change, Some(Change::Abandoned));
        assert!(!f.store.is_drawing());
        assert_eq!(f.interaction.mode(), InteractionMode::PlacePoint);
        assert_eq!(f.store.list(crate::annotation::Scope::All).count(), 0);
    }

    #[test]
    fn test_scroll_only_zooms_in_navigate() {
        let mut f = Fixture::new();
        let inside = ScrollEvent {
            delta: 1.0,
            data: Some(DataPos::new(3.0, 3.0)),
        };
        assert_eq!(f.interaction.handle_scroll(inside), Some(ZoomDirection::In));
        assert_eq!(
            f.interaction.handle_scroll(ScrollEvent { delta: 1.0, data: None }),
            None
        );
        f.set_mode(InteractionMode::DrawBox);
        assert_eq!(f.interaction.handle_scroll(inside), None);
    }
}

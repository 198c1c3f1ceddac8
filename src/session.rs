//! Editing session for one image at a time.
//!
//! [`Session`] owns everything the engine mutates: the open image with its
//! viewport and intensity window, the annotation store, the interaction
//! state and the two debouncers (zoom and summary refresh). It is driven by a
//! single event path and never shares state across threads.

use std::path::Path;
use std::time::Duration;

use thermark_render::{Colormap, GlyphOwner};
use web_time::Instant;

use crate::annotation::{Annotation, AnnotationError, AnnotationId, Scope};
use crate::constants::{SUMMARY_REFRESH_MS, ZOOM_DEBOUNCE_MS};
use crate::data::{DataImage, LoadError, LoaderRegistry};
use crate::debounce::Debouncer;
use crate::interaction::{
    Change, Interaction, InteractionMode, NamePrompt, Outcome, PointerEvent, ScrollEvent, Targets,
};
use crate::overlay;
use crate::render::{ImageFrame, Renderer};
use crate::store::AnnotationStore;
use crate::summary::Summary;
use crate::viewport::{Viewport, ZoomConfig, ZoomDirection};

/// Display levels for the heat map.
///
/// `floor` and `ceiling` bound what `low` and `high` may be set to. The
/// floor never goes below zero, and `low` never exceeds `high`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntensityWindow {
    pub low: f32,
    pub high: f32,
    pub floor: f32,
    pub ceiling: f32,
}

impl IntensityWindow {
    /// Levels spanning the data range of a freshly loaded image.
    pub fn from_range(min: f32, max: f32) -> Self {
        let floor = if min < 0.0 { 0.0 } else { min };
        Self {
            low: floor,
            high: max,
            floor,
            ceiling: max,
        }
    }

    fn accepts(&self, value: f32) -> bool {
        value >= self.floor && value <= self.ceiling
    }

    /// Set the low level. Values out of range or above `high` keep the
    /// previous level.
    pub fn set_low(&mut self, value: f32) -> bool {
        let ok = self.accepts(value) && value <= self.high;
        if ok {
            self.low = value;
        }
        ok
    }

    /// Set the high level. Values out of range or below `low` keep the
    /// previous level.
    pub fn set_high(&mut self, value: f32) -> bool {
        let ok = self.accepts(value) && value >= self.low;
        if ok {
            self.high = value;
        }
        ok
    }
}

/// Tunables for a session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSettings {
    pub zoom: ZoomConfig,
    pub zoom_debounce: Duration,
    pub summary_refresh: Duration,
    pub colormap: Colormap,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            zoom: ZoomConfig::default(),
            zoom_debounce: Duration::from_millis(ZOOM_DEBOUNCE_MS),
            summary_refresh: Duration::from_millis(SUMMARY_REFRESH_MS),
            colormap: Colormap::default(),
        }
    }
}

/// What a call to [`Session::tick`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickResult {
    pub zoomed: bool,
    pub summary_refreshed: bool,
}

#[derive(Debug)]
struct Loaded {
    image: DataImage,
    viewport: Viewport,
    intensity: IntensityWindow,
}

pub struct Session {
    settings: SessionSettings,
    registry: LoaderRegistry,
    loaded: Option<Loaded>,
    store: AnnotationStore,
    interaction: Interaction,
    colormap: Colormap,
    zoom: Debouncer<ZoomDirection>,
    summary_refresh: Debouncer<()>,
    summary: Summary,
    /// Glyph owners whose glyphs must be removed on the next render
    stale: Vec<GlyphOwner>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(SessionSettings::default())
    }
}

impl Session {
    pub fn new(settings: SessionSettings) -> Self {
        Self::with_registry(settings, LoaderRegistry::new())
    }

    pub fn with_registry(settings: SessionSettings, registry: LoaderRegistry) -> Self {
        Self {
            colormap: settings.colormap,
            zoom: Debouncer::new(settings.zoom_debounce),
            summary_refresh: Debouncer::new(settings.summary_refresh),
            settings,
            registry,
            loaded: None,
            store: AnnotationStore::new(),
            interaction: Interaction::new(),
            summary: Summary::default(),
            stale: Vec::new(),
        }
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    pub fn registry(&self) -> &LoaderRegistry {
        &self.registry
    }

    /// Load an image file. On failure the current state is left untouched.
    pub fn open(&mut self, path: &Path) -> Result<(), LoadError> {
        let image = self.registry.load_path(path)?;
        self.load(image);
        Ok(())
    }

    /// Replace the open image, discarding all annotations and history.
    pub fn load(&mut self, image: DataImage) {
        self.stale
            .extend(self.store.iter().map(|a| overlay::owner(a.id())));
        self.stale.push(GlyphOwner::Preview);
        self.store.reset();
        let mode = self.interaction.mode();
        self.interaction.set_mode(mode, &mut self.store);
        self.zoom.cancel();
        self.summary_refresh.cancel();
        self.summary = Summary::default();

        let (min, max) = image.value_range();
        log::info!(
            "Opened {} ({}x{}, range {:.2}..{:.2})",
            image.path().display(),
            image.width(),
            image.height(),
            min,
            max
        );
        self.loaded = Some(Loaded {
            viewport: Viewport::with_zoom(image.width(), image.height(), self.settings.zoom),
            intensity: IntensityWindow::from_range(min, max),
            image,
        });
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.is_some()
    }

    pub fn image(&self) -> Option<&DataImage> {
        self.loaded.as_ref().map(|l| &l.image)
    }

    pub fn viewport(&self) -> Option<&Viewport> {
        self.loaded.as_ref().map(|l| &l.viewport)
    }

    pub fn viewport_mut(&mut self) -> Option<&mut Viewport> {
        self.loaded.as_mut().map(|l| &mut l.viewport)
    }

    pub fn intensity(&self) -> Option<&IntensityWindow> {
        self.loaded.as_ref().map(|l| &l.intensity)
    }

    /// Set the low display level. Returns false if the value was rejected.
    pub fn set_low(&mut self, value: f32) -> bool {
        self.loaded
            .as_mut()
            .is_some_and(|l| l.intensity.set_low(value))
    }

    /// Set the high display level. Returns false if the value was rejected.
    pub fn set_high(&mut self, value: f32) -> bool {
        self.loaded
            .as_mut()
            .is_some_and(|l| l.intensity.set_high(value))
    }

    pub fn colormap(&self) -> Colormap {
        self.colormap
    }

    pub fn set_colormap(&mut self, colormap: Colormap) {
        self.colormap = colormap;
    }

    pub fn store(&self) -> &AnnotationStore {
        &self.store
    }

    pub fn mode(&self) -> InteractionMode {
        self.interaction.mode()
    }

    pub fn set_mode(&mut self, mode: InteractionMode) -> Outcome {
        self.interaction.set_mode(mode, &mut self.store)
    }

    /// Feed a pointer event through the interaction state machine.
    pub fn handle_pointer(
        &mut self,
        event: PointerEvent,
        view_width_px: f32,
        prompt: &mut dyn NamePrompt,
        now: Instant,
    ) -> Outcome {
        let Some(loaded) = self.loaded.as_mut() else {
            return Outcome::default();
        };
        let targets = Targets {
            image: &loaded.image,
            viewport: &mut loaded.viewport,
            store: &mut self.store,
            view_width_px,
        };
        let outcome = self.interaction.handle_pointer(event, targets, prompt);
        if let Some(Change::Created(_)) = outcome.change {
            self.summary_refresh.schedule((), now);
        }
        outcome
    }

    /// Feed a scroll event. Returns true if a zoom was scheduled.
    pub fn handle_scroll(&mut self, event: ScrollEvent, now: Instant) -> bool {
        match self.interaction.handle_scroll(event) {
            Some(direction) => self.request_zoom(direction, now),
            None => false,
        }
    }

    /// Schedule a zoom step, replacing any pending one.
    pub fn request_zoom(&mut self, direction: ZoomDirection, now: Instant) -> bool {
        if self.loaded.is_none() {
            return false;
        }
        self.zoom.schedule(direction, now);
        true
    }

    /// Run deferred work that is due at `now`.
    pub fn tick(&mut self, now: Instant) -> TickResult {
        let mut result = TickResult::default();
        if let Some(direction) = self.zoom.poll(now) {
            if let Some(loaded) = self.loaded.as_mut() {
                loaded.viewport.zoom(direction);
                result.zoomed = true;
            }
        }
        if self.summary_refresh.poll(now).is_some() {
            self.refresh_summary();
            result.summary_refreshed = true;
        }
        result
    }

    /// Earliest instant at which [`Session::tick`] has work to do.
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.zoom.due(), self.summary_refresh.due()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Place a named point directly, bypassing the pointer path.
    pub fn add_point(
        &mut self,
        x: f32,
        y: f32,
        name: &str,
        now: Instant,
    ) -> Result<AnnotationId, AnnotationError> {
        let loaded = self.loaded.as_ref().ok_or(AnnotationError::NoImage)?;
        let id = self.store.place_point(&loaded.image, x, y, name)?;
        self.summary_refresh.schedule((), now);
        Ok(id)
    }

    /// Create a box directly from its corner and size.
    pub fn add_box(
        &mut self,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        name: &str,
        now: Instant,
    ) -> Result<AnnotationId, AnnotationError> {
        let loaded = self.loaded.as_ref().ok_or(AnnotationError::NoImage)?;
        self.store.begin_box(x, y);
        self.store.update_box(x + width, y + height);
        let id = self.store.commit_box(&loaded.image, name)?;
        self.summary_refresh.schedule((), now);
        Ok(id)
    }

    /// Undo the most recent creation.
    pub fn undo(&mut self, now: Instant) -> Option<Annotation> {
        let removed = self.store.undo()?;
        self.stale.push(overlay::owner(removed.id()));
        self.summary_refresh.schedule((), now);
        Some(removed)
    }

    /// Remove every annotation in `scope`. Returns how many were removed.
    pub fn clear(&mut self, scope: Scope, now: Instant) -> usize {
        let owners: Vec<_> = self
            .store
            .list(scope)
            .map(|l| overlay::owner(l.annotation.id()))
            .collect();
        let removed = self.store.clear(scope);
        self.stale.extend(owners);
        if removed > 0 {
            self.summary_refresh.schedule((), now);
        }
        removed
    }

    /// Current summary table. Rebuilt by [`Session::tick`] after changes.
    pub fn summary(&self) -> &Summary {
        &self.summary
    }

    /// Rebuild the summary table now.
    pub fn refresh_summary(&mut self) {
        self.summary = Summary::build(&self.store);
        log::trace!("Summary refreshed ({} entries)", self.summary.entries().len());
    }

    /// Frame describing the heat-map layer as currently displayed.
    pub fn frame(&self) -> Option<ImageFrame<'_>> {
        let loaded = self.loaded.as_ref()?;
        Some(ImageFrame {
            samples: loaded.image.shared_samples(),
            colormap: self.colormap,
            low: loaded.intensity.low,
            high: loaded.intensity.high,
            window: loaded.viewport.window(),
        })
    }

    /// Draw the current state, including the preview of a box being drawn.
    pub fn render(&mut self, renderer: &mut impl Renderer) {
        for owner in self.stale.drain(..) {
            renderer.remove_glyphs(owner);
        }
        let Some(frame) = self.frame() else {
            return;
        };
        renderer.draw_image(&frame);
        for annotation in self.store.iter() {
            renderer.draw_glyphs(
                overlay::owner(annotation.id()),
                &overlay::annotation_glyphs(annotation),
            );
        }
        match self.store.pending_box() {
            Some(geometry) => {
                renderer.draw_glyphs(GlyphOwner::Preview, &overlay::preview_glyphs(geometry))
            }
            None => renderer.remove_glyphs(GlyphOwner::Preview),
        }
    }
}

//! Viewport over the fixed data image.
//!
//! The window is kept in data space. Rows grow downward while the vertical
//! axis is drawn upward-inverted, so `y_min` is the bottom limit (the larger
//! row) and `y_max` the top limit: an upright view always has
//! `y_min > y_max`. Every operation ends in [`Viewport::clamp`], which shifts
//! the window back inside the image without resizing it.

use serde::{Deserialize, Serialize};
use thermark_render::SceneWindow;

/// Smallest window dimension reachable by zooming in, in samples.
pub const MIN_VIEW_SPAN: f32 = 1.0;

/// A position in data space (column = x, row = y).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DataPos {
    pub x: f32,
    pub y: f32,
}

impl DataPos {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Visible rectangle of data space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Window {
    pub x_min: f32,
    pub x_max: f32,
    /// Bottom limit of the vertical axis (largest visible row).
    pub y_min: f32,
    /// Top limit of the vertical axis (smallest visible row).
    pub y_max: f32,
}

impl Window {
    /// The window showing a whole `width x height` image.
    pub fn full(width: f32, height: f32) -> Self {
        Self {
            x_min: 0.0,
            x_max: width,
            y_min: height,
            y_max: 0.0,
        }
    }

    pub fn width(&self) -> f32 {
        self.x_max - self.x_min
    }

    pub fn height(&self) -> f32 {
        self.y_min - self.y_max
    }

    pub fn top(&self) -> f32 {
        self.y_max
    }

    pub fn bottom(&self) -> f32 {
        self.y_min
    }

    pub fn center(&self) -> DataPos {
        DataPos::new(
            (self.x_min + self.x_max) * 0.5,
            (self.y_min + self.y_max) * 0.5,
        )
    }

    /// Whether a data position is visible.
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x_min && x <= self.x_max && y >= self.top() && y <= self.bottom()
    }

    fn is_finite(&self) -> bool {
        [self.x_min, self.x_max, self.y_min, self.y_max]
            .iter()
            .all(|v| v.is_finite())
    }

    fn translate(&mut self, dx: f32, dy: f32) {
        self.x_min += dx;
        self.x_max += dx;
        self.y_min += dy;
        self.y_max += dy;
    }
}

impl From<Window> for SceneWindow {
    fn from(w: Window) -> Self {
        SceneWindow {
            x_min: w.x_min,
            x_max: w.x_max,
            top: w.top(),
            bottom: w.bottom(),
        }
    }
}

/// Direction of a zoom step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomDirection {
    In,
    Out,
}

impl ZoomDirection {
    /// Scroll wheel mapping: positive delta zooms in, negative zooms out.
    pub fn from_scroll(delta: f32) -> Option<Self> {
        if delta > 0.0 {
            Some(ZoomDirection::In)
        } else if delta < 0.0 {
            Some(ZoomDirection::Out)
        } else {
            None
        }
    }
}

/// Per-step zoom factors applied to the window dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomConfig {
    /// Factor applied when zooming in (< 1 shrinks the window)
    pub zoom_in_factor: f32,
    /// Factor applied when zooming out (> 1 grows the window)
    pub zoom_out_factor: f32,
}

impl Default for ZoomConfig {
    fn default() -> Self {
        Self {
            zoom_in_factor: 0.9,
            zoom_out_factor: 1.1,
        }
    }
}

impl ZoomConfig {
    pub fn factor(&self, direction: ZoomDirection) -> f32 {
        match direction {
            ZoomDirection::In => self.zoom_in_factor,
            ZoomDirection::Out => self.zoom_out_factor,
        }
    }
}

/// Window state over an image of fixed size.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    window: Window,
    width: f32,
    height: f32,
    zoom: ZoomConfig,
}

impl Viewport {
    /// Viewport showing the whole of a `width x height` image.
    pub fn new(width: usize, height: usize) -> Self {
        Self::with_zoom(width, height, ZoomConfig::default())
    }

    pub fn with_zoom(width: usize, height: usize, zoom: ZoomConfig) -> Self {
        let (width, height) = (width as f32, height as f32);
        Self {
            window: Window::full(width, height),
            width,
            height,
            zoom,
        }
    }

    pub fn window(&self) -> Window {
        self.window
    }

    pub fn zoom_config(&self) -> ZoomConfig {
        self.zoom
    }

    /// Data extent `(width, height)`.
    pub fn extent(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    /// Show the full extent again.
    pub fn reset(&mut self) {
        self.window = Window::full(self.width, self.height);
        log::trace!("Viewport reset to {:?}", self.window);
    }

    /// Restore a previously saved window. Non-finite or empty windows are ignored.
    pub fn set_window(&mut self, window: Window) {
        if !window.is_finite() || window.width() <= 0.0 || window.height() <= 0.0 {
            log::warn!("Ignoring invalid viewport window {:?}", window);
            return;
        }
        self.window = window;
        self.clamp();
    }

    /// Move the window by a pointer displacement in screen pixels (y down).
    ///
    /// The window moves opposite to the pointer so the content follows the
    /// drag.
    pub fn pan(&mut self, dx_screen: f32, dy_screen: f32, screen_to_data_scale: f32) {
        let dx = dx_screen * screen_to_data_scale;
        let dy = dy_screen * screen_to_data_scale;
        if !(dx.is_finite() && dy.is_finite()) {
            return;
        }
        self.window.translate(-dx, -dy);
        self.clamp();
    }

    /// Scale the window about its centre by one zoom step.
    pub fn zoom(&mut self, direction: ZoomDirection) {
        let w = self.window.width();
        let h = self.window.height();
        let mut factor = self.zoom.factor(direction);

        match direction {
            ZoomDirection::Out => {
                // Saturate at the full extent, keeping the aspect ratio
                factor = factor.min(self.width / w).min(self.height / h).max(1.0);
            }
            ZoomDirection::In => {
                factor = factor.max(MIN_VIEW_SPAN / w).max(MIN_VIEW_SPAN / h).min(1.0);
            }
        }
        if !factor.is_finite() {
            return;
        }

        let c = self.window.center();
        let (half_w, half_h) = (w * factor * 0.5, h * factor * 0.5);
        self.window = Window {
            x_min: c.x - half_w,
            x_max: c.x + half_w,
            y_min: c.y + half_h,
            y_max: c.y - half_h,
        };
        self.clamp();
        log::trace!("Zoom {:?} x{:.3} -> {:?}", direction, factor, self.window);
    }

    /// Shift the window back inside the image bounds without resizing it.
    ///
    /// A dimension larger than the image is placed flush against the left or
    /// top edge.
    pub fn clamp(&mut self) {
        let (x_min, x_max) = clamp_span(self.window.x_min, self.window.x_max, self.width);
        let (top, bottom) = clamp_span(self.window.top(), self.window.bottom(), self.height);
        self.window = Window {
            x_min,
            x_max,
            y_min: bottom,
            y_max: top,
        };
    }

    /// Data units per screen pixel for a view of the given pixel width.
    pub fn screen_to_data_scale(&self, view_width_px: f32) -> f32 {
        if view_width_px > 0.0 {
            self.window.width() / view_width_px
        } else {
            0.0
        }
    }

    /// Convert a position inside a view of `view_size` pixels to data space.
    pub fn screen_to_data(&self, px: f32, py: f32, view_size: (f32, f32)) -> Option<DataPos> {
        let (vw, vh) = view_size;
        if !(vw > 0.0 && vh > 0.0) {
            return None;
        }
        Some(DataPos::new(
            self.window.x_min + px / vw * self.window.width(),
            self.window.top() + py / vh * self.window.height(),
        ))
    }
}

/// Shift `[lo, hi]` into `[0, limit]`, preserving its length.
fn clamp_span(lo: f32, hi: f32, limit: f32) -> (f32, f32) {
    let len = hi - lo;
    if len >= limit || lo < 0.0 {
        (0.0, len)
    } else if hi > limit {
        (limit - len, limit)
    } else {
        (lo, hi)
    }
}

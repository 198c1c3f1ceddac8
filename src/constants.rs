//! Global constants for Thermark

/// Quiet period before a burst of scroll zooms is applied (ms)
pub const ZOOM_DEBOUNCE_MS: u64 = 50;

/// Quiet period before the summary table is rebuilt (ms)
pub const SUMMARY_REFRESH_MS: u64 = 100;

/// Point marker and crosshair line width (pt)
pub const LINE_THICKNESS: f32 = 2.0;

/// Box outline width (pt)
pub const BOX_LINE_THICKNESS: f32 = 2.0;

/// Black outline drawn beneath overlay lines and text (pt)
pub const STROKE_THICKNESS: f32 = 3.0;

/// Radius of the point marker and box min/max markers (data units)
pub const CIRCLE_RADIUS: f32 = 2.0;

/// Crosshair arms reach this far from the point centre (data units)
pub const LINE_LENGTH: f32 = 7.0;

/// Crosshair arms start this far from the point centre (data units)
pub const LINE_GAP: f32 = 5.0;

/// Value label size (pt)
pub const TEXT_SIZE: f32 = 8.0;

/// Name label size (pt)
pub const TITLE_SIZE: f32 = 9.0;

/// Horizontal gap between a box and its side labels (data units)
pub const BOX_LABEL_OFFSET: f32 = 10.0;

/// Vertical spacing of box side labels (data units)
pub const BOX_LABEL_SPACING: f32 = 13.0;

/// Point value label sits this far above the point (data units)
pub const POINT_VALUE_OFFSET: f32 = 12.0;

/// Point name label sits this far above the point (data units)
pub const POINT_NAME_OFFSET: f32 = 20.0;

/// Unit suffix on overlay labels
pub const OVERLAY_UNIT: &str = "°C";

/// Unit suffix in the summary table
pub const SUMMARY_UNIT: &str = "℃";

/// Upper bound accepted for solar radiation in reports (W/m²)
pub const MAX_RADIATION: f64 = 1000.0;

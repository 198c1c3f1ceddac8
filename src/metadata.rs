//! Capture metadata (GPS position, capture date, altitude).
//!
//! The bundled extractor runs `exiftool -j` and reads its JSON output.
//! Extraction never fails: anything missing or malformed becomes `None` and
//! is shown with a placeholder.

use std::path::Path;
use std::process::Command;

use chrono::NaiveDateTime;
use serde_json::{Map, Value};

pub const GPS_UNKNOWN: &str = "GPS: Unknown";
pub const DATE_UNKNOWN: &str = "Date: Unknown";

/// Date tags in order of preference.
const DATE_TAGS: [&str; 3] = ["DateTimeOriginal", "CreateDate", "ModifyDate"];

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CaptureMetadata {
    /// Decimal degrees, formatted as `13.753428°, 100.500278°`
    pub gps: Option<String>,
    /// Formatted as `DD/MM/YYYY HH:MM:SS` when the source date parses
    pub captured_at: Option<String>,
    /// Altitude text as reported by the source
    pub altitude: Option<String>,
}

impl CaptureMetadata {
    pub fn gps_label(&self) -> &str {
        self.gps.as_deref().unwrap_or(GPS_UNKNOWN)
    }

    pub fn date_label(&self) -> &str {
        self.captured_at.as_deref().unwrap_or(DATE_UNKNOWN)
    }

    /// GPS and date on two lines, as copied to the clipboard.
    pub fn clipboard_text(&self) -> String {
        format!("{}\n{}", self.gps_label(), self.date_label())
    }

    /// Build from one exiftool JSON record.
    pub fn from_tags(tags: &Map<String, Value>) -> Self {
        let text = |key: &str| tags.get(key).and_then(value_text);

        let gps = text("GPSPosition").and_then(|raw| {
            let parsed = parse_gps_position(&raw);
            if parsed.is_none() {
                log::warn!("Unrecognized GPS position '{}'", raw);
            }
            parsed.map(|(lat, lon)| format_decimal_degrees(lat, lon))
        });
        let captured_at = DATE_TAGS
            .iter()
            .find_map(|key| text(key))
            .map(|raw| format_capture_date(&raw));

        Self {
            gps,
            captured_at,
            altitude: text("GPSAltitude"),
        }
    }
}

fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn dms_to_decimal(part: &str) -> Option<f64> {
    // "13 deg 45' 12.34\" N"
    let fields: Vec<&str> = part.split_whitespace().collect();
    let [deg, _, min, sec, dir] = fields.as_slice() else {
        return None;
    };
    let deg: f64 = deg.parse().ok()?;
    let min: f64 = min.trim_end_matches('\'').parse().ok()?;
    let sec: f64 = sec.trim_end_matches('"').parse().ok()?;
    let value = deg + min / 60.0 + sec / 3600.0;
    match *dir {
        "N" | "E" => Some(value),
        "S" | "W" => Some(-value),
        _ => None,
    }
}

/// Parse `lat, lon` given in degrees, minutes and seconds.
pub fn parse_gps_position(raw: &str) -> Option<(f64, f64)> {
    let (lat, lon) = raw.split_once(',')?;
    Some((dms_to_decimal(lat)?, dms_to_decimal(lon)?))
}

pub fn format_decimal_degrees(lat: f64, lon: f64) -> String {
    format!("{:.6}°, {:.6}°", lat, lon)
}

/// EXIF date layout, `YYYY:MM:DD HH:MM:SS`.
const EXIF_DATE_FORMAT: &str = "%Y:%m:%d %H:%M:%S";

/// Reformat an EXIF date as `DD/MM/YYYY HH:MM:SS`.
///
/// Subseconds or a zone suffix after the seconds are dropped. Anything that
/// does not parse as a valid date is returned unchanged.
pub fn format_capture_date(raw: &str) -> String {
    let trimmed = raw.trim();
    NaiveDateTime::parse_from_str(trimmed, EXIF_DATE_FORMAT)
        .or_else(|e| {
            // "2024:02:13 15:30:45" is 19 characters
            let head = trimmed.get(..19).ok_or(e)?;
            NaiveDateTime::parse_from_str(head, EXIF_DATE_FORMAT)
        })
        .map(|date| date.format("%d/%m/%Y %H:%M:%S").to_string())
        .unwrap_or_else(|_| raw.to_string())
}

pub trait MetadataExtractor {
    fn extract(&self, path: &Path) -> CaptureMetadata;
}

#[derive(Debug, thiserror::Error)]
enum ExifToolError {
    #[error("could not run {program}: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },
    #[error("{program} exited with {status}")]
    Failed { program: String, status: String },
    #[error("unexpected output: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("no metadata record in output")]
    Empty,
}

/// Runs the `exiftool` program.
#[derive(Debug, Clone)]
pub struct ExifTool {
    program: String,
}

impl Default for ExifTool {
    fn default() -> Self {
        Self::new("exiftool")
    }
}

impl ExifTool {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn run(&self, path: &Path) -> Result<Map<String, Value>, ExifToolError> {
        let output = Command::new(&self.program)
            .arg("-j")
            .arg(path)
            .output()
            .map_err(|source| ExifToolError::Spawn {
                program: self.program.clone(),
                source,
            })?;
        if !output.status.success() {
            return Err(ExifToolError::Failed {
                program: self.program.clone(),
                status: output.status.to_string(),
            });
        }
        parse_records(&output.stdout)
    }
}

/// First record of `exiftool -j` output.
fn parse_records(stdout: &[u8]) -> Result<Map<String, Value>, ExifToolError> {
    let records: Vec<Map<String, Value>> = serde_json::from_slice(stdout)?;
    records.into_iter().next().ok_or(ExifToolError::Empty)
}

impl MetadataExtractor for ExifTool {
    fn extract(&self, path: &Path) -> CaptureMetadata {
        match self.run(path) {
            Ok(tags) => {
                let metadata = CaptureMetadata::from_tags(&tags);
                log::debug!(
                    "Metadata for {:?}: {} / {}",
                    path,
                    metadata.gps_label(),
                    metadata.date_label()
                );
                metadata
            }
            Err(e) => {
                log::warn!("Metadata extraction failed for {:?}: {}", path, e);
                CaptureMetadata::default()
            }
        }
    }
}

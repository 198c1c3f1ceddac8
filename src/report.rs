//! Inspection report input.
//!
//! A [`ReportRequest`] bundles the project fields entered by the operator,
//! the capture metadata, the exported image and the statistics of the first
//! box. Building one validates everything up front; the generator only has
//! to lay it out.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::MAX_RADIATION;
use crate::metadata::CaptureMetadata;
use crate::session::Session;

/// Inspection finding categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DefectType {
    #[serde(rename = "Module open circuit")]
    ModuleOpenCircuit,
    #[serde(rename = "String open circuit")]
    StringOpenCircuit,
    #[serde(rename = "Module short circuit")]
    ModuleShortCircuit,
    #[serde(rename = "Modules crack")]
    ModulesCrack,
    #[serde(rename = "Substring in short circuit")]
    SubstringShortCircuit,
    #[serde(rename = "Bypass Diode")]
    BypassDiode,
    #[serde(rename = "Bypass Diode Multi")]
    BypassDiodeMulti,
    #[serde(rename = "Hot spot")]
    HotSpot,
    #[serde(rename = "Hot spot multi")]
    HotSpotMulti,
    #[serde(rename = "Dirty or Shade")]
    DirtyOrShade,
    #[serde(rename = "Module broken front (thin film)")]
    BrokenFrontThinFilm,
    #[serde(rename = "Transfer resistance or Delamination (thin film)")]
    DelaminationThinFilm,
    #[serde(rename = "Transfer resistance or Delamination (Si)")]
    DelaminationSi,
    #[serde(rename = "Hot module junction box (line Si and thin film)")]
    HotJunctionBox,
    #[default]
    #[serde(rename = "No Abnormality")]
    NoAbnormality,
}

impl DefectType {
    pub fn name(&self) -> &'static str {
        match self {
            DefectType::ModuleOpenCircuit => "Module open circuit",
            DefectType::StringOpenCircuit => "String open circuit",
            DefectType::ModuleShortCircuit => "Module short circuit",
            DefectType::ModulesCrack => "Modules crack",
            DefectType::SubstringShortCircuit => "Substring in short circuit",
            DefectType::BypassDiode => "Bypass Diode",
            DefectType::BypassDiodeMulti => "Bypass Diode Multi",
            DefectType::HotSpot => "Hot spot",
            DefectType::HotSpotMulti => "Hot spot multi",
            DefectType::DirtyOrShade => "Dirty or Shade",
            DefectType::BrokenFrontThinFilm => "Module broken front (thin film)",
            DefectType::DelaminationThinFilm => "Transfer resistance or Delamination (thin film)",
            DefectType::DelaminationSi => "Transfer resistance or Delamination (Si)",
            DefectType::HotJunctionBox => "Hot module junction box (line Si and thin film)",
            DefectType::NoAbnormality => "No Abnormality",
        }
    }

    pub fn all() -> &'static [DefectType] {
        &[
            DefectType::ModuleOpenCircuit,
            DefectType::StringOpenCircuit,
            DefectType::ModuleShortCircuit,
            DefectType::ModulesCrack,
            DefectType::SubstringShortCircuit,
            DefectType::BypassDiode,
            DefectType::BypassDiodeMulti,
            DefectType::HotSpot,
            DefectType::HotSpotMulti,
            DefectType::DirtyOrShade,
            DefectType::BrokenFrontThinFilm,
            DefectType::DelaminationThinFilm,
            DefectType::DelaminationSi,
            DefectType::HotJunctionBox,
            DefectType::NoAbnormality,
        ]
    }
}

impl fmt::Display for DefectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DefectType {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        DefectType::all()
            .iter()
            .copied()
            .find(|d| d.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ReportError::UnknownDefect(wanted.to_string()))
    }
}

/// Project fields entered by the operator.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectInfo {
    pub project_name: String,
    pub project_owner: String,
    pub location: String,
    pub defect: DefectType,
    /// Solar radiation in W/m², as typed
    pub radiation: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("Field '{0}' must be filled in")]
    MissingField(&'static str),

    #[error("Radiation '{0}' is not a number")]
    InvalidRadiation(String),

    #[error("Radiation {0} W/m² exceeds the maximum of 1000 W/m²")]
    RadiationTooHigh(f64),

    #[error("At least one box annotation is required")]
    NoBox,

    #[error("No image is loaded")]
    NoImage,

    #[error("Unknown defect type '{0}'")]
    UnknownDefect(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize report: {0}")]
    Json(#[from] serde_json::Error),
}

/// Round half away from zero to `places` decimals.
pub fn round_to(value: f64, places: i32) -> f64 {
    let scale = 10f64.powi(places);
    (value * scale).round() / scale
}

fn required(field: &'static str, value: &str) -> Result<String, ReportError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ReportError::MissingField(field))
    } else {
        Ok(trimmed.to_string())
    }
}

/// Validated report contents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRequest {
    /// The source radiometric image
    pub thermal_path: PathBuf,
    /// The exported annotated view
    pub thermal_image_path: PathBuf,
    pub project_name: String,
    pub project_owner: String,
    pub location: String,
    pub category: DefectType,
    pub coordinates: String,
    pub image_taken: String,
    pub temp_min: f64,
    pub temp_avg: f64,
    pub temp_max: f64,
    pub radiation: f64,
}

impl ReportRequest {
    /// Validate the inputs and assemble a request.
    ///
    /// Statistics come from the first box of the session.
    pub fn build(
        info: &ProjectInfo,
        metadata: &CaptureMetadata,
        session: &Session,
        exported: &Path,
    ) -> Result<Self, ReportError> {
        let project_name = required("project name", &info.project_name)?;
        let project_owner = required("project owner", &info.project_owner)?;
        let location = required("location", &info.location)?;
        let coordinates = required("coordinates", metadata.gps_label())?;
        let image_taken = required("image taken", metadata.date_label())?;
        let radiation_text = required("radiation", &info.radiation)?;

        let radiation: f64 = radiation_text
            .parse()
            .ok()
            .filter(|r: &f64| r.is_finite())
            .ok_or(ReportError::InvalidRadiation(radiation_text))?;
        if radiation > MAX_RADIATION {
            return Err(ReportError::RadiationTooHigh(radiation));
        }

        let image = session.image().ok_or(ReportError::NoImage)?;
        let first = session.store().first_box().ok_or(ReportError::NoBox)?;

        Ok(Self {
            thermal_path: image.path().to_path_buf(),
            thermal_image_path: exported.to_path_buf(),
            project_name,
            project_owner,
            location,
            category: info.defect,
            coordinates,
            image_taken,
            temp_min: round_to(f64::from(first.min_temp), 1),
            temp_avg: round_to(f64::from(first.avg_temp), 1),
            temp_max: round_to(f64::from(first.max_temp), 2),
            radiation: round_to(radiation, 2),
        })
    }

    /// `<source stem>_<location>`, used to name the report file.
    pub fn report_stem(&self) -> String {
        let stem = self
            .thermal_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());
        let location: String = self
            .location
            .chars()
            .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
            .collect();
        format!("{}_{}", stem, location)
    }
}

pub trait ReportGenerator {
    /// Produce the report and return its path.
    fn generate(&self, request: &ReportRequest) -> Result<PathBuf, ReportError>;
}

/// Writes the report fields as pretty JSON.
#[derive(Debug, Clone)]
pub struct JsonReportWriter {
    dir: PathBuf,
}

impl JsonReportWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl ReportGenerator for JsonReportWriter {
    fn generate(&self, request: &ReportRequest) -> Result<PathBuf, ReportError> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(format!("{}.json", request.report_stem()));
        let json = serde_json::to_string_pretty(request)?;
        std::fs::write(&path, json)?;
        log::info!("Report written to {:?}", path);
        Ok(path)
    }
}

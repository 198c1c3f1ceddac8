//! Crate-level error type.

use crate::annotation::AnnotationError;
use crate::batch::BatchError;
use crate::config::ConfigError;
use crate::data::LoadError;
use crate::export::ExportError;
use crate::report::ReportError;

/// Any error surfaced by a Thermark operation.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Annotation(#[from] AnnotationError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error(transparent)]
    Report(#[from] ReportError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Batch(#[from] BatchError),

    #[error(transparent)]
    Render(#[from] thermark_render::RenderError),
}

pub type Result<T> = std::result::Result<T, Error>;

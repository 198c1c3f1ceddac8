//! Thermark - Thermal Image Annotation Engine
//!
//! Load a single-band radiometric image, pan and zoom it, mark points and
//! boxes with frozen min/avg/max statistics, and export the annotated view.
//!
//! The engine is frontend-agnostic. A frontend feeds [`interaction`] events
//! into a [`session::Session`], answers name prompts through
//! [`interaction::NamePrompt`] and draws through [`render::Renderer`].

pub mod annotation;
pub mod batch;
pub mod config;
pub mod constants;
pub mod data;
pub mod debounce;
pub mod error;
pub mod export;
pub mod interaction;
pub mod metadata;
pub mod overlay;
pub mod render;
pub mod report;
pub mod session;
pub mod stats;
pub mod store;
pub mod summary;
pub mod undo;
pub mod viewport;

pub use error::{Error, Result};
pub use session::Session;
pub use thermark_render::Colormap;

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Map layer composition and rendering.
//!
//! [`compose::compose`] merges boundary rings, observation datasets, and
//! city markers into an ordered list of layer specs; a
//! [`render::FigureRenderer`] turns that list into a figure.

pub mod cities;
pub mod compose;
pub mod render;

pub use globe_map_map_models::{
    CityMarker, FigureLayout, HoverTemplate, LayerKind, LayerSpec, LayerStyle, TextAnchor,
};
use thiserror::Error;

/// Errors that can occur while rendering a figure.
#[derive(Debug, Error)]
pub enum MapError {
    /// Figure serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Writing the figure failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A layer cannot be drawn.
    #[error("Invalid layer '{name}': {message}")]
    InvalidLayer {
        /// Layer name.
        name: String,
        /// Description of what went wrong.
        message: String,
    },
}

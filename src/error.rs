//! Error types for the placement engine
//!
//! Analysis failures (bounds detection, cropping, vector rendering) are
//! reported as [`AnalysisError`] but never escape the artwork pipeline: it
//! logs them and falls back to the unmodified image. [`EngineError`] covers
//! what callers of the transform and session APIs can observe.

use crate::types::{PrintLocation, View};
use thiserror::Error;

/// Errors raised while analysing or transforming artwork pixels
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// Image has a zero dimension
    #[error("Empty image: {width}x{height}")]
    EmptyImage { width: u32, height: u32 },

    /// Crop rectangle falls outside the source image
    #[error("Bounds {x},{y} {width}x{height} exceed image {image_width}x{image_height}")]
    BoundsOutsideImage {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        image_width: u32,
        image_height: u32,
    },

    /// Markup is not an SVG document or lacks usable dimensions
    #[error("Invalid vector document: {0}")]
    InvalidVector(String),

    /// Markup is not well-formed XML
    #[error("XML parse error: {0}")]
    Xml(#[from] roxmltree::Error),

    /// usvg failed to parse the markup
    #[error("SVG parse error: {0}")]
    Svg(#[from] resvg::usvg::Error),

    /// Pixmap allocation failed
    #[error("Could not allocate {width}x{height} render target")]
    RenderTarget { width: u32, height: u32 },

    /// Error from the image crate
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

/// Result type alias for analysis operations
pub type AnalysisResult<T> = Result<T, AnalysisError>;

/// Errors surfaced by the transform state machine and the editing session
#[derive(Error, Debug)]
pub enum EngineError {
    /// Scale must be finite and strictly positive
    #[error("Invalid scale: {0}")]
    InvalidScale(f64),

    /// Writes are refused while the displayed view is being swapped
    #[error("View transition {from:?} -> {to:?} in progress")]
    Transitioning { from: View, to: View },

    /// No artwork is loaded for the location
    #[error("No artwork loaded for {0}")]
    NoArtwork(PrintLocation),

    /// The requested view has no image yet
    #[error("No {0:?} image available")]
    ViewUnavailable(View),

    /// Artwork bytes could not be decoded
    #[error("Decode failed: {0}")]
    Decode(String),

    /// Pixel pipeline error
    #[error(transparent)]
    Analysis(#[from] AnalysisError),
}

/// Result type alias for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors loading or validating settings
#[derive(Error, Debug)]
pub enum SettingsError {
    /// IO error from std::io
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error from serde_json
    #[error("Settings parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// A value is out of its allowed range
    #[error("Invalid setting {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

//! Engine-wide constants.
//!
//! Centralizes the placement, analysis and interaction policy values. Every
//! value here is also exposed as a field of [`crate::settings::EngineSettings`]
//! so it can be tuned without recompiling; these are the defaults.

// ============================================================================
// Placement Policy
// ============================================================================

/// Fraction of the print area a freshly placed artwork occupies
pub const DEFAULT_FIT_RATIO: f64 = 0.8;

/// Upper bound on the initial scale (never upscale past native size)
pub const MAX_INITIAL_SCALE: f64 = 1.0;

/// Full turn in degrees
pub const FULL_ROTATION: f64 = 360.0;

/// Toolbar rotation step in degrees
pub const ROTATION_STEP: f64 = 90.0;

// ============================================================================
// Content Bounds Detection
// ============================================================================

/// Longest side of the working canvas used for the pixel scan
pub const BOUNDS_MAX_WORKING_DIMENSION: u32 = 500;

/// Padding added around detected content, as a fraction of the content extent
/// (split evenly between both sides of an axis)
pub const BOUNDS_PADDING_RATIO: f64 = 0.02;

/// Pixels with alpha below this are treated as transparent background
pub const BOUNDS_ALPHA_THRESHOLD: u8 = 10;

/// Pixels whose composited R, G and B all exceed this are treated as white background
pub const BOUNDS_WHITE_THRESHOLD: u8 = 245;

/// A crop is only applied when the cropped area is below this fraction of the original
pub const SIGNIFICANT_CROP_RATIO: f64 = 0.9;

// ============================================================================
// Vector Re-rendering
// ============================================================================

/// Longest side of a full-resolution vector re-render
pub const VECTOR_MAX_RENDER_DIMENSION: u32 = 2000;

/// A decoded bitmap is a low-fidelity proxy when the viewBox exceeds it by this factor
pub const VECTOR_PROXY_FACTOR: f64 = 2.0;

// ============================================================================
// Interaction
// ============================================================================

/// Minimum on-canvas width/height of the artwork box during resize
pub const MIN_ARTWORK_BOX_SIZE: f64 = 20.0;

/// Keyboard nudge distance in canvas pixels
pub const NUDGE_STEP: f64 = 1.0;

/// Keyboard nudge distance with the modifier held
pub const NUDGE_STEP_LARGE: f64 = 10.0;

/// Maximum undo history entries kept per print location
pub const MAX_HISTORY_ENTRIES: usize = 50;

// ============================================================================
// Canvas & Capture
// ============================================================================

/// Width of the placement canvas in pixels
pub const CANVAS_WIDTH: u32 = 500;

/// Height of the placement canvas in pixels
pub const CANVAS_HEIGHT: u32 = 500;

/// Frames both backdrop and artwork must have rendered after load before capture
pub const CAPTURE_SETTLE_FRAMES: u32 = 1;

/// Print-area guide color (RGBA)
pub const GUIDE_COLOR: [u8; 4] = [0, 153, 255, 255];

/// Guide dash length in pixels
pub const GUIDE_DASH: u32 = 6;

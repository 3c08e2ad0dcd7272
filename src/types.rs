//! Core types for the placement engine.
//!
//! Print locations, print areas, transforms, content bounds and the two
//! artwork views. Geometry lives in [`crate::transform::geometry`]; this
//! module only holds data and small invariant-preserving helpers.

use crate::constants::FULL_ROTATION;
use image::RgbaImage;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

// ============================================================================
// Print Locations
// ============================================================================

/// A named placement zone on a garment.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PrintLocation {
    #[default]
    Front,
    Back,
    LeftChest,
    RightChest,
    FullBack,
}

impl PrintLocation {
    pub const ALL: [PrintLocation; 5] = [
        PrintLocation::Front,
        PrintLocation::Back,
        PrintLocation::LeftChest,
        PrintLocation::RightChest,
        PrintLocation::FullBack,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PrintLocation::Front => "front",
            PrintLocation::Back => "back",
            PrintLocation::LeftChest => "left-chest",
            PrintLocation::RightChest => "right-chest",
            PrintLocation::FullBack => "full-back",
        }
    }
}

impl fmt::Display for PrintLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PrintLocation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PrintLocation::ALL
            .into_iter()
            .find(|loc| loc.as_str() == s)
            .ok_or_else(|| format!("unknown print location: {s}"))
    }
}

// ============================================================================
// Geometry Primitives
// ============================================================================

/// Axis-aligned rectangle in canvas pixels.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// Print-area rectangle for one location. Never mutated at runtime.
pub type PrintArea = Rect;

/// Maximum printable size in inches.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MaxPrintDimensions {
    pub width: f64,
    pub height: f64,
}

/// Pixels per inch along each canvas axis.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PixelsPerInch {
    pub x: f64,
    pub y: f64,
}

/// Pixel dimensions of a bitmap.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

impl ImageSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl From<(u32, u32)> for ImageSize {
    fn from((width, height): (u32, u32)) -> Self {
        Self { width, height }
    }
}

// ============================================================================
// Transforms
// ============================================================================

/// Placement of an artwork inside a print area.
///
/// `x`/`y` is the top-left of the scaled, unrotated artwork box in canvas
/// pixels. `scale` is a uniform multiplier over the image's native pixel
/// size and is always positive. `rotation` is in degrees within `[0, 360)`
/// and pivots around the box center.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ArtworkTransform {
    pub x: f64,
    pub y: f64,
    pub scale: f64,
    pub rotation: f64,
}

impl ArtworkTransform {
    pub fn new(x: f64, y: f64, scale: f64, rotation: f64) -> Self {
        Self {
            x,
            y,
            scale,
            rotation: normalize_rotation(rotation),
        }
    }

    /// Copy of this transform rotated by `degrees`, wrapped into `[0, 360)`.
    pub fn rotated_by(&self, degrees: f64) -> Self {
        Self {
            rotation: normalize_rotation(self.rotation + degrees),
            ..*self
        }
    }

    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }

    /// On-canvas size of the unrotated box for an image of `size`.
    pub fn box_size(&self, size: ImageSize) -> (f64, f64) {
        (
            f64::from(size.width) * self.scale,
            f64::from(size.height) * self.scale,
        )
    }

    /// Visual center of the box for an image of `size`.
    pub fn visual_center(&self, size: ImageSize) -> (f64, f64) {
        let (w, h) = self.box_size(size);
        (self.x + w / 2.0, self.y + h / 2.0)
    }

    pub fn has_valid_scale(&self) -> bool {
        self.scale.is_finite() && self.scale > 0.0
    }
}

/// Wrap degrees into `[0, 360)`, including negative input.
pub fn normalize_rotation(degrees: f64) -> f64 {
    let wrapped = degrees.rem_euclid(FULL_ROTATION);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if wrapped >= FULL_ROTATION { 0.0 } else { wrapped }
}

/// Horizontal/vertical mirroring, tracked beside the transform.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flip {
    pub horizontal: bool,
    pub vertical: bool,
}

impl Flip {
    /// Signed unit factor multiplied into the rendered width.
    pub fn x(&self) -> f64 {
        if self.horizontal { -1.0 } else { 1.0 }
    }

    /// Signed unit factor multiplied into the rendered height.
    pub fn y(&self) -> f64 {
        if self.vertical { -1.0 } else { 1.0 }
    }
}

// ============================================================================
// Content Bounds
// ============================================================================

/// Tight rectangle of visible content in source-image pixels, padding included.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentBounds {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl ContentBounds {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    pub fn size(&self) -> ImageSize {
        ImageSize::new(self.width, self.height)
    }

    pub fn area(&self) -> u64 {
        self.size().area()
    }

    /// True if the rectangle lies entirely inside an image of `size`.
    pub fn fits_within(&self, size: ImageSize) -> bool {
        u64::from(self.x) + u64::from(self.width) <= u64::from(size.width)
            && u64::from(self.y) + u64::from(self.height) <= u64::from(size.height)
    }

    pub fn covers_full(&self, size: ImageSize) -> bool {
        self.x == 0 && self.y == 0 && self.width == size.width && self.height == size.height
    }
}

// ============================================================================
// Views & Images
// ============================================================================

/// One of the two parallel representations of an artwork.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum View {
    #[default]
    Original,
    Vectorized,
}

impl View {
    /// Slot index for per-view storage.
    pub const fn index(self) -> usize {
        match self {
            View::Original => 0,
            View::Vectorized => 1,
        }
    }
}

/// A decoded bitmap tagged with its provenance.
///
/// Pixels are shared so the original and vectorized images can be held by a
/// context and handed to capture without copying.
#[derive(Clone, Debug)]
pub struct ArtworkImage {
    pub pixels: Arc<RgbaImage>,
    pub provenance: View,
    pub cropped: bool,
}

impl ArtworkImage {
    pub fn new(pixels: RgbaImage, provenance: View) -> Self {
        Self {
            pixels: Arc::new(pixels),
            provenance,
            cropped: false,
        }
    }

    pub fn size(&self) -> ImageSize {
        ImageSize::new(self.pixels.width(), self.pixels.height())
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }
}

/// Identity of one artwork load. Assigned monotonically by the session and
/// carried by every async dispatch so stale results can be dropped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArtworkToken(pub u64);

/// Physical footprint of the placed artwork.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DimensionReport {
    pub width_inches: f64,
    pub height_inches: f64,
    pub oversize: bool,
}

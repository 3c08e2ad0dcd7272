//! Unit conversion table.
//!
//! Static mapping from a print location to its print-area rectangle (canvas
//! pixels) and maximum printable size (inches). Pixels-per-inch is derived
//! per axis from the two.

use crate::types::{MaxPrintDimensions, PixelsPerInch, PrintArea, PrintLocation, Rect};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Print area and physical limit for one location.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PrintSpec {
    pub area: PrintArea,
    pub max: MaxPrintDimensions,
}

impl PrintSpec {
    pub const fn new(area: Rect, max_width_in: f64, max_height_in: f64) -> Self {
        Self {
            area,
            max: MaxPrintDimensions {
                width: max_width_in,
                height: max_height_in,
            },
        }
    }

    pub fn pixels_per_inch(&self) -> PixelsPerInch {
        PixelsPerInch {
            x: self.area.width / self.max.width,
            y: self.area.height / self.max.height,
        }
    }
}

/// One [`PrintSpec`] per [`PrintLocation`]. The location set is closed, so
/// lookups cannot fail.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PrintTable {
    pub front: PrintSpec,
    pub back: PrintSpec,
    pub left_chest: PrintSpec,
    pub right_chest: PrintSpec,
    pub full_back: PrintSpec,
}

/// Print areas laid out on the default 500x500 canvas, all at 15 px/in.
pub static DEFAULT_PRINT_TABLE: Lazy<PrintTable> = Lazy::new(|| PrintTable {
    front: PrintSpec::new(Rect::new(167.5, 135.0, 165.0, 255.0), 11.0, 17.0),
    back: PrintSpec::new(Rect::new(160.0, 120.0, 180.0, 240.0), 12.0, 16.0),
    left_chest: PrintSpec::new(Rect::new(280.0, 140.0, 60.0, 60.0), 4.0, 4.0),
    right_chest: PrintSpec::new(Rect::new(160.0, 140.0, 60.0, 60.0), 4.0, 4.0),
    full_back: PrintSpec::new(Rect::new(145.0, 100.0, 210.0, 300.0), 14.0, 20.0),
});

impl Default for PrintTable {
    fn default() -> Self {
        DEFAULT_PRINT_TABLE.clone()
    }
}

impl PrintTable {
    pub fn get(&self, location: PrintLocation) -> &PrintSpec {
        match location {
            PrintLocation::Front => &self.front,
            PrintLocation::Back => &self.back,
            PrintLocation::LeftChest => &self.left_chest,
            PrintLocation::RightChest => &self.right_chest,
            PrintLocation::FullBack => &self.full_back,
        }
    }

    pub fn print_area(&self, location: PrintLocation) -> PrintArea {
        self.get(location).area
    }

    pub fn max_dimensions(&self, location: PrintLocation) -> MaxPrintDimensions {
        self.get(location).max
    }

    pub fn pixels_per_inch(&self, location: PrintLocation) -> PixelsPerInch {
        self.get(location).pixels_per_inch()
    }

    /// Every location must have positive area and positive physical limits.
    pub fn is_valid(&self) -> bool {
        PrintLocation::ALL.iter().all(|loc| {
            let spec = self.get(*loc);
            spec.area.width > 0.0
                && spec.area.height > 0.0
                && spec.max.width > 0.0
                && spec.max.height > 0.0
        })
    }
}

/// Pixels-per-inch for `location` in the default table.
pub fn pixels_per_inch(location: PrintLocation) -> PixelsPerInch {
    DEFAULT_PRINT_TABLE.pixels_per_inch(location)
}

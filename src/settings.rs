//! Engine settings.
//!
//! Every policy constant from [`crate::constants`] can be overridden from a
//! JSON file. Missing fields fall back to the defaults, so a settings file
//! only needs the values it changes.

use crate::constants::*;
use crate::error::SettingsError;
use crate::units::PrintTable;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Initial placement policy.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementSettings {
    pub fit_ratio: f64,
    pub max_initial_scale: f64,
    pub history_limit: usize,
}

impl Default for PlacementSettings {
    fn default() -> Self {
        Self {
            fit_ratio: DEFAULT_FIT_RATIO,
            max_initial_scale: MAX_INITIAL_SCALE,
            history_limit: MAX_HISTORY_ENTRIES,
        }
    }
}

/// Content bounds detection policy.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoundsSettings {
    pub max_working_dimension: u32,
    pub padding_ratio: f64,
    pub alpha_threshold: u8,
    pub white_threshold: u8,
    pub significant_crop_ratio: f64,
}

impl Default for BoundsSettings {
    fn default() -> Self {
        Self {
            max_working_dimension: BOUNDS_MAX_WORKING_DIMENSION,
            padding_ratio: BOUNDS_PADDING_RATIO,
            alpha_threshold: BOUNDS_ALPHA_THRESHOLD,
            white_threshold: BOUNDS_WHITE_THRESHOLD,
            significant_crop_ratio: SIGNIFICANT_CROP_RATIO,
        }
    }
}

/// Full-resolution vector re-render policy.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorSettings {
    pub max_render_dimension: u32,
    pub proxy_factor: f64,
}

impl Default for VectorSettings {
    fn default() -> Self {
        Self {
            max_render_dimension: VECTOR_MAX_RENDER_DIMENSION,
            proxy_factor: VECTOR_PROXY_FACTOR,
        }
    }
}

/// Gesture and keyboard policy.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionSettings {
    pub min_box_size: f64,
    pub nudge_step: f64,
    pub nudge_step_large: f64,
    pub rotation_step: f64,
}

impl Default for InteractionSettings {
    fn default() -> Self {
        Self {
            min_box_size: MIN_ARTWORK_BOX_SIZE,
            nudge_step: NUDGE_STEP,
            nudge_step_large: NUDGE_STEP_LARGE,
            rotation_step: ROTATION_STEP,
        }
    }
}

/// Placement canvas and capture.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasSettings {
    pub width: u32,
    pub height: u32,
    pub settle_frames: u32,
}

impl Default for CanvasSettings {
    fn default() -> Self {
        Self {
            width: CANVAS_WIDTH,
            height: CANVAS_HEIGHT,
            settle_frames: CAPTURE_SETTLE_FRAMES,
        }
    }
}

/// All tunable engine settings.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    pub placement: PlacementSettings,
    pub bounds: BoundsSettings,
    pub vector: VectorSettings,
    pub interaction: InteractionSettings,
    pub canvas: CanvasSettings,
    pub print_table: PrintTable,
}

impl EngineSettings {
    /// Default settings file location: `<config dir>/printfit/settings.json`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("printfit").join("settings.json"))
    }

    /// Load and validate settings from a JSON file.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let raw = std::fs::read_to_string(path)?;
        let settings: Self = serde_json::from_str(&raw)?;
        settings.validate()?;
        debug!(path = %path.display(), "Loaded settings");
        Ok(settings)
    }

    /// Load from `path`, or from the default location when `None`. A missing
    /// file yields defaults; an unreadable or invalid one is an error.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, SettingsError> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => match Self::default_path() {
                Some(p) => p,
                None => return Ok(Self::default()),
            },
        };
        if !path.exists() {
            info!(path = %path.display(), "No settings file, using defaults");
            return Ok(Self::default());
        }
        Self::load(&path)
    }

    /// Write settings as pretty JSON, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        fn invalid(field: &'static str, reason: impl Into<String>) -> SettingsError {
            SettingsError::Invalid {
                field,
                reason: reason.into(),
            }
        }

        let p = &self.placement;
        if !(p.fit_ratio > 0.0 && p.fit_ratio <= 1.0) {
            return Err(invalid("placement.fit_ratio", format!("{} not in (0, 1]", p.fit_ratio)));
        }
        if !(p.max_initial_scale > 0.0) {
            return Err(invalid("placement.max_initial_scale", "must be positive"));
        }
        if p.history_limit == 0 {
            return Err(invalid("placement.history_limit", "must be at least 1"));
        }

        let b = &self.bounds;
        if b.max_working_dimension == 0 {
            return Err(invalid("bounds.max_working_dimension", "must be at least 1"));
        }
        if !(0.0..1.0).contains(&b.padding_ratio) {
            return Err(invalid("bounds.padding_ratio", format!("{} not in [0, 1)", b.padding_ratio)));
        }
        if !(b.significant_crop_ratio > 0.0 && b.significant_crop_ratio <= 1.0) {
            return Err(invalid("bounds.significant_crop_ratio", "must be in (0, 1]"));
        }

        let v = &self.vector;
        if v.max_render_dimension == 0 {
            return Err(invalid("vector.max_render_dimension", "must be at least 1"));
        }
        if !(v.proxy_factor >= 1.0) {
            return Err(invalid("vector.proxy_factor", "must be at least 1"));
        }

        let i = &self.interaction;
        if !(i.min_box_size > 0.0) {
            return Err(invalid("interaction.min_box_size", "must be positive"));
        }
        if !(i.nudge_step > 0.0 && i.nudge_step_large > 0.0) {
            return Err(invalid("interaction.nudge_step", "must be positive"));
        }

        if self.canvas.width == 0 || self.canvas.height == 0 {
            return Err(invalid("canvas", "width and height must be non-zero"));
        }
        if !self.print_table.is_valid() {
            return Err(invalid("print_table", "every location needs a positive area and size"));
        }
        Ok(())
    }
}

//! Gesture state machine - one explicit state for the pointer interaction in
//! progress on the artwork.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Dragging     (pointer down on the artwork body)
//! Idle -> Resizing     (pointer down on a corner handle)
//! Idle -> Rotating     (pointer down on the rotate handle)
//!
//! Any -> Idle          (pointer up commits, cancel restores)
//! ```

use crate::types::ArtworkTransform;

/// Corner handle used for uniform resizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeHandle {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl ResizeHandle {
    /// Direction the handle moves outward along the box's local axes.
    pub fn signs(&self) -> (f64, f64) {
        match self {
            ResizeHandle::TopLeft => (-1.0, -1.0),
            ResizeHandle::TopRight => (1.0, -1.0),
            ResizeHandle::BottomLeft => (-1.0, 1.0),
            ResizeHandle::BottomRight => (1.0, 1.0),
        }
    }
}

/// Pointer gesture in progress.
#[derive(Debug, Clone, Default)]
pub enum GestureState {
    /// No active gesture
    #[default]
    Idle,

    /// Moving the artwork
    Dragging {
        /// Pointer position at gesture start (canvas pixels)
        start_pointer: (f64, f64),
        /// Transform committed before the gesture
        start: ArtworkTransform,
    },

    /// Scaling from a corner handle
    Resizing {
        handle: ResizeHandle,
        start_pointer: (f64, f64),
        start: ArtworkTransform,
        /// Most recent preview that satisfied the minimum size
        last_valid: ArtworkTransform,
    },

    /// Turning around the visual center
    Rotating {
        center: (f64, f64),
        /// Pointer angle at gesture start, degrees
        start_angle: f64,
        start: ArtworkTransform,
    },
}

impl GestureState {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self, Self::Dragging { .. })
    }

    pub fn is_resizing(&self) -> bool {
        matches!(self, Self::Resizing { .. })
    }

    pub fn is_rotating(&self) -> bool {
        matches!(self, Self::Rotating { .. })
    }

    /// Transform committed before the current gesture.
    pub fn start_transform(&self) -> Option<ArtworkTransform> {
        match self {
            Self::Idle => None,
            Self::Dragging { start, .. }
            | Self::Resizing { start, .. }
            | Self::Rotating { start, .. } => Some(*start),
        }
    }

    pub fn reset(&mut self) {
        *self = Self::Idle;
    }
}

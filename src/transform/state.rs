//! View state machine for a placement context.
//!
//! Replaces the "initial load in progress" and "toggling" boolean guards
//! with a single tagged state. Only `Idle` accepts writes into the per-view
//! transform cache.
//!
//! ## State Transitions
//!
//! ```text
//! Idle(v)          -> Loading(v)               (artwork pipeline dispatched)
//! Loading(v)       -> Idle(v)                  (first transform applied)
//! Idle(a)          -> Transitioning{a -> b}    (view toggle begins)
//! Transitioning{a -> b} -> Idle(b)             (target image applied)
//! Transitioning{a -> b} -> Idle(a)             (toggle cancelled)
//! ```

use crate::types::View;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewState {
    /// Showing `View`; edits flow into that view's cache
    Idle(View),

    /// Artwork for `View` is being decoded/cropped; cache writes suppressed
    Loading(View),

    /// Swapping the displayed image; all external writes refused
    Transitioning { from: View, to: View },
}

impl Default for ViewState {
    fn default() -> Self {
        Self::Idle(View::Original)
    }
}

impl ViewState {
    /// The view whose image is (or is about to be) displayed.
    pub fn displayed(&self) -> View {
        match self {
            Self::Idle(view) | Self::Loading(view) => *view,
            Self::Transitioning { from, .. } => *from,
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle(_))
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading(_))
    }

    pub fn is_transitioning(&self) -> bool {
        matches!(self, Self::Transitioning { .. })
    }

    /// Per-view cache writes are only allowed when idle.
    pub fn accepts_cache_writes(&self) -> bool {
        self.is_idle()
    }

    pub fn transition_target(&self) -> Option<View> {
        match self {
            Self::Transitioning { to, .. } => Some(*to),
            _ => None,
        }
    }
}

/// Lifecycle of the artwork in a context.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Phase {
    /// No artwork
    #[default]
    Empty,
    /// Artwork decoded, default transform computed
    Loaded,
    /// At least one user edit applied
    Edited,
}

//! Pointer, keyboard and toolbar input for the placement surface.
//!
//! ## Architecture
//!
//! The gesture system uses an explicit state machine (`GestureState`) to
//! track the pointer interaction in progress, so in-progress previews and
//! committed edits are never confused.
//!
//! ## Modules
//!
//! - `state` - gesture state machine enum and helper methods
//! - `keyboard` - key chord resolution (undo/redo before nudge)
//! - `surface` - toolbar actions, nudges and gesture handling on `PlacementContext`

mod keyboard;
mod state;
mod surface;

pub use keyboard::{Direction, Key, KeyAction, Modifiers, resolve_key};
pub use state::{GestureState, ResizeHandle};

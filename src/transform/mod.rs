//! Transform state machine.
//!
//! ## Modules
//!
//! - `geometry` - pure placement math (default placement, fit, recenter, physical size)
//! - `state` - `ViewState` tagged union replacing the load/toggle boolean guards
//! - `context` - per-(artwork, location) context owning images, view caches and history

mod context;
pub mod geometry;
mod state;

pub use context::PlacementContext;
pub use state::{Phase, ViewState};

//! Image analysis for artwork placement.
//!
//! ## Modules
//!
//! - `bounds` - content bounds detection on a downscaled working canvas
//! - `vector` - full-resolution re-rendering of SVG proxies
//! - `crop` - sub-rectangle extraction, delegating to `vector` when needed
//! - `pipeline` - detect → re-render → crop, with failures absorbed

mod bounds;
mod crop;
mod pipeline;
mod vector;

pub use bounds::*;
pub use crop::*;
pub use pipeline::*;
pub use vector::*;

//! printfit - artwork placement engine for custom-printed garments.
//!
//! Takes an uploaded design, trims its transparent or white margins, places
//! it inside a print area on a garment mockup and tracks every edit (move,
//! scale, rotate, flip) with undo history, optionally swapping between the
//! original upload and a machine-vectorized version.

pub mod analysis;
pub mod capture;
pub mod constants;
pub mod error;
pub mod history;
pub mod input;
pub mod perf;
pub mod session;
pub mod settings;
pub mod transform;
pub mod types;
pub mod units;

pub use error::{AnalysisError, EngineError, EngineResult, SettingsError};
pub use session::EditingSession;

use tracing_subscriber::EnvFilter;

/// Install the global `tracing` subscriber. Honours `RUST_LOG`, defaulting
/// to `info` for this crate. Safe to call more than once.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("printfit=info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

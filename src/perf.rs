//! Performance instrumentation for the pixel pipeline.
//!
//! Bounds detection, cropping and vector re-rendering scale with image size.
//! Wrap them in [`profile_scope!`] to get timing in the logs when the
//! `profiling` feature is enabled:
//!
//! ```ignore
//! fn detect(image: &RgbaImage) {
//!     profile_scope!("detect_bounds");
//!     // ... scan ...
//! }
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
use tracing::warn;
#[cfg(feature = "profiling")]
use tracing::trace;

/// Default threshold above which a scope is reported at warn level
pub const SLOW_OPERATION_MS: f64 = 50.0;

/// Runtime switch; only has an effect with the `profiling` feature.
static PROFILING_ENABLED: AtomicBool = AtomicBool::new(cfg!(feature = "profiling"));

/// Profile a scope with the given name. Zero-cost when profiling is disabled.
#[macro_export]
macro_rules! profile_scope {
    ($name:expr) => {
        #[cfg(feature = "profiling")]
        let _timer = $crate::perf::ScopedTimer::new($name, $crate::perf::SLOW_OPERATION_MS);
        #[cfg(not(feature = "profiling"))]
        let _ = $name;
    };
    ($name:expr, $threshold_ms:expr) => {
        #[cfg(feature = "profiling")]
        let _timer = $crate::perf::ScopedTimer::new($name, $threshold_ms);
        #[cfg(not(feature = "profiling"))]
        let _ = ($name, $threshold_ms);
    };
}

pub use crate::profile_scope;

pub fn set_profiling_enabled(enabled: bool) {
    PROFILING_ENABLED.store(enabled, Ordering::Relaxed);
}

pub fn is_profiling_enabled() -> bool {
    PROFILING_ENABLED.load(Ordering::Relaxed)
}

/// RAII timer: logs the elapsed time of its scope on drop.
pub struct ScopedTimer {
    name: &'static str,
    start: Instant,
    threshold_ms: f64,
}

impl ScopedTimer {
    pub fn new(name: &'static str, threshold_ms: f64) -> Self {
        Self {
            name,
            start: Instant::now(),
            threshold_ms,
        }
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

impl Drop for ScopedTimer {
    fn drop(&mut self) {
        if !is_profiling_enabled() {
            return;
        }
        let elapsed = self.elapsed_ms();
        if elapsed > self.threshold_ms {
            warn!(
                operation = self.name,
                elapsed_ms = elapsed,
                threshold_ms = self.threshold_ms,
                "Slow operation"
            );
        } else {
            #[cfg(feature = "profiling")]
            trace!(operation = self.name, elapsed_ms = elapsed, "Timed");
        }
    }
}

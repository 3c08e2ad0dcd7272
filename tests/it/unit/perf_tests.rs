//! Unit tests for perf module.

use printfit::perf::{ScopedTimer, is_profiling_enabled, set_profiling_enabled};

#[test]
fn test_scoped_timer_creation() {
    // High threshold: dropping must not warn or panic
    let _timer = ScopedTimer::new("test_op", 1000.0);
}

#[test]
fn test_scoped_timer_elapsed_is_monotonic() {
    let timer = ScopedTimer::new("elapsed", 1000.0);
    let first = timer.elapsed_ms();
    let second = timer.elapsed_ms();
    assert!(first >= 0.0);
    assert!(second >= first);
}

#[test]
fn test_profiling_toggle() {
    let initial = is_profiling_enabled();
    set_profiling_enabled(true);
    assert!(is_profiling_enabled());
    {
        // Zero threshold always counts as slow
        let _timer = ScopedTimer::new("slow_op", 0.0);
    }
    set_profiling_enabled(initial);
}

#[test]
fn test_profile_scope_macro_compiles_in_callers() {
    fn scan() -> u32 {
        printfit::profile_scope!("scan");
        printfit::profile_scope!("scan_strict", 1.0);
        42
    }
    assert_eq!(scan(), 42);
}

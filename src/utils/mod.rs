//! # Utilities Module
//!
//! Cross-cutting helpers that don't belong in domain-specific modules.
//!
//! ## Sub-modules
//! - `int_set`: indexed integer set used for per-variant carrier sets

pub mod int_set;

pub use int_set::IntSet;

/// Format an elapsed duration as `H hours M minutes S seconds`
pub fn elapsed_str(elapsed: std::time::Duration) -> String {
    let secs = elapsed.as_secs();
    let (h, m, s) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    if h > 0 {
        format!("{h} hours {m} minutes {s} seconds")
    } else if m > 0 {
        format!("{m} minutes {s} seconds")
    } else {
        format!("{}.{:03} seconds", s, elapsed.subsec_millis())
    }
}

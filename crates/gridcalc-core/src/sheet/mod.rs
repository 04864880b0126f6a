//! Sheet state and incremental recalculation (UI-agnostic).

mod eval;
mod ops;
mod state;

pub use state::Sheet;

/// Message stored in every cell found on a circular reference.
pub const CIRCULAR_REFERENCE: &str = "Circular reference detected";

//! gridcalc_engine - Formula parsing, evaluation, and dependency tracking for a bounded grid.

pub mod engine;

//! gridcalc-core - Sheet model with incremental recalculation.

pub mod config;
pub mod error;
pub mod sheet;

pub use config::SheetConfig;
pub use error::{GridcalcError, Result};
pub use sheet::Sheet;

pub use gridcalc_engine::engine::{CellError, CellRef, CellValue, GridSize};

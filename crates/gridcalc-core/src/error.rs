//! Error types for gridcalc core.

use thiserror::Error;

/// Errors that can occur outside of cell evaluation.
///
/// Formula failures never surface here; they are stored as cell values.
#[derive(Error, Debug)]
pub enum GridcalcError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid cell reference: {0}")]
    InvalidCellRef(String),

    #[error("Cell (col {col}, row {row}) is outside the {columns}x{rows} grid")]
    OutOfBounds {
        col: usize,
        row: usize,
        columns: usize,
        rows: usize,
    },

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Config parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, GridcalcError>;

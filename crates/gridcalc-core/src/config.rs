//! Sheet configuration.
//!
//! Read from TOML:
//!
//! ```toml
//! columns = 26
//! rows = 100
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{GridcalcError, Result};
use gridcalc_engine::engine::{GridSize, MAX_COLUMNS};

const MAX_CONFIG_FILE_BYTES: u64 = 1_048_576; // 1 MiB

/// Upper bound on rows; the dependency graph preallocates one slot per cell.
pub const MAX_ROWS: usize = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SheetConfig {
    /// Number of columns, lettered from `A`.
    pub columns: usize,
    /// Number of rows, numbered from 1.
    pub rows: usize,
}

impl Default for SheetConfig {
    fn default() -> Self {
        let size = GridSize::default();
        SheetConfig {
            columns: size.columns,
            rows: size.rows,
        }
    }
}

impl SheetConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: SheetConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a config file.
    pub fn load(path: &Path) -> Result<Self> {
        let len = std::fs::metadata(path)?.len();
        if len > MAX_CONFIG_FILE_BYTES {
            return Err(GridcalcError::InvalidConfig(format!(
                "refusing to read {}: file too large ({} bytes, max {})",
                path.display(),
                len,
                MAX_CONFIG_FILE_BYTES
            )));
        }
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!(path = %path.display(), ?config, "loaded sheet config");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_COLUMNS).contains(&self.columns) {
            return Err(GridcalcError::InvalidConfig(format!(
                "columns must be between 1 and {}, got {}",
                MAX_COLUMNS, self.columns
            )));
        }
        if !(1..=MAX_ROWS).contains(&self.rows) {
            return Err(GridcalcError::InvalidConfig(format!(
                "rows must be between 1 and {}, got {}",
                MAX_ROWS, self.rows
            )));
        }
        Ok(())
    }

    pub fn grid_size(&self) -> GridSize {
        GridSize::new(self.columns, self.rows)
    }
}

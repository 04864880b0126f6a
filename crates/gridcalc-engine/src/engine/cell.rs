//! Cell data structures for the spreadsheet grid.
//!
//! This module provides the core data types for representing cells:
//! - [`CellError`] - A terminal error value (`#ERR` or `#CYC`)
//! - [`CellValue`] - The computed value of a cell (number, text, or error)
//! - [`Cell`] - One cell's record: raw input, parsed formula, value, and dependencies

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::ast::Expr;
use super::cell_ref::{CellRef, GridSize};
use super::deps::extract_dependencies;
use super::parser::parse_formula;

/// Marker that distinguishes formula input from literal input.
pub const FORMULA_PREFIX: char = '=';

/// An error value stored in a cell.
///
/// Errors are values, not failures: formulas that read an errored cell
/// evaluate to the same tag.
#[derive(Clone, Debug, Error, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellError {
    /// Parse or evaluation failure.
    #[error("#ERR: {0}")]
    Err(String),
    /// The cell participates in a circular reference.
    #[error("#CYC: {0}")]
    Cyc(String),
}

impl CellError {
    pub fn err(message: impl Into<String>) -> CellError {
        CellError::Err(message.into())
    }

    pub fn cyc(message: impl Into<String>) -> CellError {
        CellError::Cyc(message.into())
    }

    /// `ERR` or `CYC`.
    pub fn tag(&self) -> &'static str {
        match self {
            CellError::Err(_) => "ERR",
            CellError::Cyc(_) => "CYC",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            CellError::Err(message) | CellError::Cyc(message) => message,
        }
    }
}

/// The computed value of a cell.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum CellValue {
    Number(f64),
    Text(String),
    Error(CellError),
}

impl CellValue {
    /// Value of a blank cell: empty text, which reads as 0 in arithmetic.
    pub fn blank() -> CellValue {
        CellValue::Text(String::new())
    }

    /// Classify literal (non-formula) input.
    ///
    /// Text whose trimmed form is a finite number is stored as that number;
    /// anything else is kept verbatim.
    pub fn from_literal(input: &str) -> CellValue {
        match input.trim().parse::<f64>() {
            Ok(n) if n.is_finite() => CellValue::Number(n),
            _ => CellValue::Text(input.to_string()),
        }
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, CellValue::Text(s) if s.trim().is_empty())
    }

    pub fn as_error(&self) -> Option<&CellError> {
        match self {
            CellValue::Error(e) => Some(e),
            _ => None,
        }
    }
}

/// A cell in the spreadsheet grid.
///
/// Replaced wholesale on every edit, never patched in place except for
/// `value` during recalculation.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Cell {
    /// Verbatim input, for re-editing.
    pub raw: String,
    /// Parsed formula; `None` for literals and for formulas that failed to parse.
    pub formula: Option<Expr>,
    /// Last computed value.
    pub value: CellValue,
    /// Cells the formula references, with ranges expanded.
    pub depends_on: Vec<CellRef>,
}

impl Cell {
    pub fn new_literal(input: &str) -> Cell {
        Cell {
            raw: input.to_string(),
            formula: None,
            value: CellValue::from_literal(input),
            depends_on: vec![],
        }
    }

    /// Create a cell holding a parsed formula. Its value is blank until evaluated.
    pub fn new_formula(input: &str, expr: Expr) -> Cell {
        Cell {
            raw: input.to_string(),
            depends_on: extract_dependencies(&expr),
            formula: Some(expr),
            value: CellValue::blank(),
        }
    }

    pub fn new_error(input: &str, error: CellError) -> Cell {
        Cell {
            raw: input.to_string(),
            formula: None,
            value: CellValue::Error(error),
            depends_on: vec![],
        }
    }

    /// Classify user input and create the matching cell.
    /// - Starts with `=` -> formula (or `#ERR` if it does not parse)
    /// - Otherwise -> literal number or text
    pub fn from_input(input: &str, size: GridSize) -> Cell {
        if !is_formula(input) {
            return Cell::new_literal(input);
        }
        match parse_formula(input, size) {
            Ok(expr) => Cell::new_formula(input, expr),
            Err(e) => {
                tracing::debug!(input, error = %e, "formula failed to parse");
                Cell::new_error(input, CellError::err(e.message))
            }
        }
    }

    pub fn is_formula(&self) -> bool {
        is_formula(&self.raw)
    }
}

/// Whether raw input is formula-marked.
pub fn is_formula(input: &str) -> bool {
    input.starts_with(FORMULA_PREFIX)
}

//! Spreadsheet engine API.
//!
//! This module provides the core computation engine for the spreadsheet:
//!
//! - [`CellRef`], [`GridSize`] - Cell addresses (A1 notation <-> col/row indices) and grid bounds
//! - [`Cell`], [`CellValue`], [`CellError`] - Per-cell records and computed values
//! - [`Expr`], [`parse_formula`] - Formula expression tree and parser
//! - [`evaluate`], [`EvalContext`] - Formula evaluation against current cell values
//! - [`extract_dependencies`] - Cells a parsed formula reads
//! - [`DependencyGraph`] - Reverse-edge dependency index and topological ordering
//! - [`detect_cycle`] - Circular dependency detection
//! - [`format_value`] - Format values for display

mod ast;
mod cell;
mod cell_ref;
mod cycle;
mod deps;
mod eval;
mod format;
mod graph;
mod parser;

pub use ast::{BinaryOperator, Expr, Function};
pub use cell::{Cell, CellError, CellValue, FORMULA_PREFIX, is_formula};
pub use cell_ref::{CellRef, GridSize, MAX_COLUMNS, cells_in_range};
pub use cycle::detect_cycle;
pub use deps::extract_dependencies;
pub use eval::{EvalContext, evaluate};
pub use format::{format_number, format_value};
pub use graph::{CycleDetected, DependencyGraph};
pub use parser::{ParseError, parse_formula};

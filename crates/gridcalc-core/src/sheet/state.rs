use std::collections::BTreeMap;

use crate::config::SheetConfig;
use gridcalc_engine::engine::{Cell, CellRef, CellValue, DependencyGraph, Expr, GridSize, format_value};

/// UI-agnostic sheet state.
///
/// Owns the cell store and the dependency graph. Every edit goes through
/// [`Sheet::set_cell_content`], which keeps the two in step and recomputes
/// affected formulas before returning.
#[derive(Clone, Debug)]
pub struct Sheet {
    pub(super) size: GridSize,
    /// Occupied cells, row-major.
    pub(super) cells: BTreeMap<CellRef, Cell>,
    pub(super) graph: DependencyGraph,
}

impl Sheet {
    /// Create an empty sheet with the default 10x20 grid.
    pub fn new() -> Self {
        Self::with_size(GridSize::default())
    }

    pub fn with_config(config: SheetConfig) -> Self {
        Self::with_size(config.grid_size())
    }

    pub fn with_size(size: GridSize) -> Self {
        Sheet {
            size,
            cells: BTreeMap::new(),
            graph: DependencyGraph::new(size),
        }
    }

    pub fn size(&self) -> GridSize {
        self.size
    }

    /// Typed value of a cell. Unset and blank cells read as 0.
    pub fn cell_value(&self, cell: &CellRef) -> CellValue {
        match self.cells.get(cell) {
            Some(c) if !c.value.is_blank() => c.value.clone(),
            _ => CellValue::Number(0.0),
        }
    }

    /// Display string for a cell.
    ///
    /// Literal cells show their raw text, formula cells their formatted value
    /// (`#ERR` or `#CYC` for errors), and unset cells an empty string.
    pub fn display_value(&self, cell: &CellRef) -> String {
        match self.cells.get(cell) {
            None => String::new(),
            Some(c) if c.is_formula() => format_value(&c.value),
            Some(c) => c.raw.clone(),
        }
    }

    /// Verbatim last-set text, or an empty string for unset cells.
    pub fn raw_content(&self, cell: &CellRef) -> &str {
        self.cells.get(cell).map(|c| c.raw.as_str()).unwrap_or_default()
    }

    /// Parsed formula, if the cell holds one that parsed.
    pub fn formula(&self, cell: &CellRef) -> Option<&Expr> {
        self.cells.get(cell).and_then(|c| c.formula.as_ref())
    }

    /// Cells the cell's formula references, ranges expanded.
    pub fn cell_dependencies(&self, cell: &CellRef) -> &[CellRef] {
        self.cells
            .get(cell)
            .map(|c| c.depends_on.as_slice())
            .unwrap_or_default()
    }

    /// Cells whose formulas directly reference `cell`.
    pub fn dependents_of(&self, cell: &CellRef) -> Vec<CellRef> {
        self.graph.dependents_of(cell)
    }

    /// Stored cell record, if any.
    pub fn get(&self, cell: &CellRef) -> Option<&Cell> {
        self.cells.get(cell)
    }

    /// Occupied cells in row-major order.
    pub fn occupied_cells(&self) -> impl Iterator<Item = (CellRef, &Cell)> {
        self.cells.iter().map(|(r, c)| (*r, c))
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl Default for Sheet {
    fn default() -> Self {
        Self::new()
    }
}

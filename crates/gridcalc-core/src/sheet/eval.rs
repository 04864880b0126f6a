use std::collections::BTreeMap;

use gridcalc_engine::engine::{Cell, CellRef, CellValue, EvalContext};

/// Evaluation context backed by the sheet's stored values.
///
/// Unset cells read as blank so aggregates skip them and arithmetic sees 0.
pub(crate) struct SheetContext<'a> {
    cells: &'a BTreeMap<CellRef, Cell>,
}

impl<'a> SheetContext<'a> {
    pub(crate) fn new(cells: &'a BTreeMap<CellRef, Cell>) -> Self {
        SheetContext { cells }
    }
}

impl EvalContext for SheetContext<'_> {
    fn value_of(&self, cell: &CellRef) -> CellValue {
        self.cells
            .get(cell)
            .map(|c| c.value.clone())
            .unwrap_or_else(CellValue::blank)
    }
}

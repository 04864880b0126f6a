use std::collections::HashSet;

use super::eval::SheetContext;
use super::{CIRCULAR_REFERENCE, Sheet};
use crate::error::{GridcalcError, Result};
use gridcalc_engine::engine::{
    Cell, CellError, CellRef, CellValue, CycleDetected, detect_cycle, evaluate,
};

impl Sheet {
    /// Set a cell from user input and recompute everything that depends on it.
    ///
    /// Parse and evaluation failures are stored in the cell as `#ERR`, and
    /// cells on a circular reference are stored as `#CYC`. The only error
    /// returned is for a cell outside the grid.
    pub fn set_cell_content(&mut self, cell: CellRef, text: &str) -> Result<()> {
        if !self.size.contains(&cell) {
            return Err(GridcalcError::OutOfBounds {
                col: cell.col,
                row: cell.row,
                columns: self.size.columns,
                rows: self.size.rows,
            });
        }

        self.graph.remove_all_edges_from(&cell);

        if text.is_empty() {
            tracing::debug!(%cell, "cleared cell");
            self.cells.remove(&cell);
        } else {
            let mut record = Cell::from_input(text, self.size);
            for dependency in &record.depends_on {
                self.graph.add_edge(&cell, dependency);
            }
            if let Some(expr) = &record.formula {
                record.value = evaluate(expr, &SheetContext::new(&self.cells))
                    .unwrap_or_else(CellValue::Error);
            }
            tracing::debug!(
                %cell,
                formula = record.is_formula(),
                dependencies = record.depends_on.len(),
                "set cell"
            );
            self.cells.insert(cell, record);
        }

        self.recalculate(&cell);
        Ok(())
    }

    /// Parse an address like `B3` and set it.
    pub fn set(&mut self, name: &str, text: &str) -> Result<()> {
        let cell = CellRef::parse(name, self.size)
            .ok_or_else(|| GridcalcError::InvalidCellRef(name.to_string()))?;
        self.set_cell_content(cell, text)
    }

    /// Clear a cell. Formulas reading it see a blank cell afterwards.
    pub fn clear_cell(&mut self, cell: &CellRef) -> Result<()> {
        self.set_cell_content(*cell, "")
    }

    /// Propagate a change at `origin` to its transitive dependents.
    ///
    /// A cycle reachable from `origin` is marked `#CYC` first. The remaining
    /// dependents are then recomputed dependencies-first, so they pick up
    /// the new values (including any `#CYC`).
    fn recalculate(&mut self, origin: &CellRef) {
        let mut pinned = HashSet::new();
        if let Some(cycle) = detect_cycle(&self.graph, origin) {
            self.mark_cycle(&cycle, &mut pinned);
        }

        let mut pending: Vec<CellRef> = self
            .graph
            .transitive_dependents(origin)
            .into_iter()
            .filter(|c| !pinned.contains(c))
            .collect();

        loop {
            match self.graph.topological_order(&pending) {
                Ok(order) => {
                    for cell in &order {
                        self.recompute(cell);
                    }
                    return;
                }
                Err(CycleDetected { cycle }) => {
                    self.mark_cycle(&cycle, &mut pinned);
                    pending.retain(|c| !pinned.contains(c));
                }
            }
        }
    }

    fn mark_cycle(&mut self, cycle: &[CellRef], pinned: &mut HashSet<CellRef>) {
        tracing::warn!(
            cycle = %cycle.iter().map(|c| c.to_string()).collect::<Vec<_>>().join(" -> "),
            "circular reference"
        );
        for cell in cycle {
            if let Some(record) = self.cells.get_mut(cell) {
                record.value = CellValue::Error(CellError::cyc(CIRCULAR_REFERENCE));
            }
            pinned.insert(*cell);
        }
    }

    /// Re-evaluate one stored formula. Literals and failed parses keep their value.
    fn recompute(&mut self, cell: &CellRef) {
        let Some(expr) = self.cells.get(cell).and_then(|c| c.formula.as_ref()) else {
            return;
        };
        let value = evaluate(expr, &SheetContext::new(&self.cells)).unwrap_or_else(CellValue::Error);
        tracing::trace!(%cell, ?value, "recomputed");
        if let Some(record) = self.cells.get_mut(cell) {
            record.value = value;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Sheet;
    use crate::error::GridcalcError;
    use gridcalc_engine::engine::{CellError, CellRef, CellValue};

    fn c(name: &str) -> CellRef {
        CellRef::parse_default(name).unwrap()
    }

    #[test]
    fn test_out_of_bounds_is_rejected() {
        let mut sheet = Sheet::new();
        let err = sheet.set_cell_content(CellRef::new(10, 0), "1").unwrap_err();
        assert!(matches!(err, GridcalcError::OutOfBounds { col: 10, row: 0, .. }));
        assert!(sheet.is_empty());
    }

    #[test]
    fn test_set_rejects_bad_address() {
        let mut sheet = Sheet::new();
        assert!(matches!(
            sheet.set("A0", "1"),
            Err(GridcalcError::InvalidCellRef(name)) if name == "A0"
        ));
        assert!(matches!(sheet.set("K1", "1"), Err(GridcalcError::InvalidCellRef(_))));
    }

    #[test]
    fn test_formula_edges_replace_old_ones() {
        let mut sheet = Sheet::new();
        sheet.set("C1", "=A1+B1").unwrap();
        assert_eq!(sheet.dependents_of(&c("A1")), vec![c("C1")]);
        sheet.set("C1", "=B1*2").unwrap();
        assert!(sheet.dependents_of(&c("A1")).is_empty());
        assert_eq!(sheet.dependents_of(&c("B1")), vec![c("C1")]);
        sheet.set("C1", "7").unwrap();
        assert!(sheet.dependents_of(&c("B1")).is_empty());
        assert_eq!(sheet.graph.edge_count(), 0);
    }

    #[test]
    fn test_parse_failure_has_no_edges() {
        let mut sheet = Sheet::new();
        sheet.set("B1", "=A1+").unwrap();
        assert!(sheet.formula(&c("B1")).is_none());
        assert!(sheet.cell_dependencies(&c("B1")).is_empty());
        assert!(sheet.dependents_of(&c("A1")).is_empty());
        assert_eq!(
            sheet.cell_value(&c("B1")),
            CellValue::Error(CellError::err("Unexpected character"))
        );
    }

    #[test]
    fn test_cycle_cells_carry_message() {
        let mut sheet = Sheet::new();
        sheet.set("A1", "=B1").unwrap();
        sheet.set("B1", "=A1").unwrap();
        let expected = CellValue::Error(CellError::cyc("Circular reference detected"));
        assert_eq!(sheet.cell_value(&c("A1")), expected);
        assert_eq!(sheet.cell_value(&c("B1")), expected);
    }

    #[test]
    fn test_clear_cell_recomputes_dependents() {
        let mut sheet = Sheet::new();
        sheet.set("A1", "4").unwrap();
        sheet.set("B1", "=A1*2").unwrap();
        sheet.clear_cell(&c("A1")).unwrap();
        assert_eq!(sheet.cell_value(&c("B1")), CellValue::Number(0.0));
        assert_eq!(sheet.raw_content(&c("A1")), "");
        assert_eq!(sheet.display_value(&c("A1")), "");
        assert!(sheet.get(&c("A1")).is_none());
    }

    #[test]
    fn test_cycle_in_dependents_is_marked() {
        // B1 and C1 loop on each other, fed by A1; D1 reads the loop.
        let mut sheet = Sheet::new();
        sheet.set("B1", "=A1+C1").unwrap();
        sheet.set("C1", "=B1").unwrap();
        assert_eq!(sheet.display_value(&c("B1")), "#CYC");
        assert_eq!(sheet.display_value(&c("C1")), "#CYC");

        sheet.set("D1", "=C1+1").unwrap();
        sheet.set("A1", "3").unwrap();
        assert_eq!(sheet.display_value(&c("B1")), "#CYC");
        assert_eq!(sheet.display_value(&c("C1")), "#CYC");
        assert_eq!(sheet.display_value(&c("D1")), "#CYC");
    }

    #[test]
    fn test_second_cycle_found_while_ordering_dependents() {
        // A1 feeds two separate loops: B1 <-> C1 and D1 <-> E1.
        let mut sheet = Sheet::new();
        for (name, text) in [
            ("B1", "=A1+C1"),
            ("C1", "=B1"),
            ("D1", "=A1+E1"),
            ("E1", "=D1"),
            ("F1", "=E1+1"),
            ("G1", "=A1*2"),
        ] {
            sheet.set(name, text).unwrap();
        }

        // The walk from A1 stops at the first loop, so the second one only
        // shows up when ordering the remaining dependents.
        sheet.set("A1", "3").unwrap();
        for name in ["B1", "C1", "D1", "E1", "F1"] {
            assert_eq!(sheet.display_value(&c(name)), "#CYC", "{name}");
        }
        assert_eq!(sheet.cell_value(&c("G1")), CellValue::Number(6.0));
    }
}

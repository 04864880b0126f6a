//! Circular dependency detection for formula cells.
//!
//! When a formula is entered, we must find out whether it closes a loop
//! (e.g., A1 references B1, B1 references C1, C1 references A1). This module
//! walks dependent edges depth-first from the edited cell and reports the
//! concrete cycle, so every cell on it can be flagged.

use std::collections::HashSet;

use super::cell_ref::CellRef;
use super::graph::DependencyGraph;

/// Detect a circular dependency reachable from a cell.
///
/// Returns `Some(cycle)` with the cells of the first cycle found, starting at
/// the cell where the walk closed back on itself. A self-referencing cell
/// yields a one-element cycle. Each cell is expanded at most once, so the
/// walk is bounded by the number of edges.
pub fn detect_cycle(graph: &DependencyGraph, start: &CellRef) -> Option<Vec<CellRef>> {
    let start = graph.index_of(start)?;
    let mut visited = HashSet::from([start]);
    let mut on_path = HashSet::from([start]);
    let mut path = vec![start];
    let mut frames = vec![graph.dependent_indices(start)];

    while let Some(frame) = frames.last_mut() {
        match frame.next().copied() {
            Some(next) if on_path.contains(&next) => {
                let at = path.iter().position(|&c| c == next)?;
                return Some(path[at..].iter().map(|&i| graph.cell_at(i)).collect());
            }
            Some(next) => {
                if visited.insert(next) {
                    on_path.insert(next);
                    path.push(next);
                    frames.push(graph.dependent_indices(next));
                }
            }
            None => {
                frames.pop();
                if let Some(done) = path.pop() {
                    on_path.remove(&done);
                }
            }
        }
    }

    None
}

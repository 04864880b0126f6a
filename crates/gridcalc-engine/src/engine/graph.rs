//! Reverse-edge dependency graph.
//!
//! Edges point from a dependency to its dependents, so walking them answers
//! "what must be recomputed when this cell changes". Storage is a pair of
//! flat arenas indexed by packed cell index (`row * columns + col`):
//! `dependents[i]` holds the cells that read cell `i`, and `precedents[i]`
//! holds the cells that cell `i` reads. Neighbour sets are ordered, so every
//! traversal visits cells in row-major order.

use std::collections::btree_set;
use std::collections::{BTreeSet, HashMap, HashSet};
use thiserror::Error;

use super::cell_ref::{CellRef, GridSize};

/// A subset passed to [`DependencyGraph::topological_order`] contains a cycle.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("circular reference: {}", format_path(.cycle))]
pub struct CycleDetected {
    /// Cells on the cycle, each depended on by the next, closing on the first.
    pub cycle: Vec<CellRef>,
}

fn format_path(cycle: &[CellRef]) -> String {
    cycle.iter().map(|c| c.to_string()).collect::<Vec<_>>().join(" -> ")
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    InProgress,
    Done,
}

#[derive(Clone, Debug)]
pub struct DependencyGraph {
    size: GridSize,
    dependents: Vec<BTreeSet<usize>>,
    precedents: Vec<BTreeSet<usize>>,
}

impl DependencyGraph {
    pub fn new(size: GridSize) -> Self {
        let count = size.cell_count();
        DependencyGraph {
            size,
            dependents: vec![BTreeSet::new(); count],
            precedents: vec![BTreeSet::new(); count],
        }
    }

    pub fn size(&self) -> GridSize {
        self.size
    }

    fn index(&self, cell: &CellRef) -> Option<usize> {
        self.size.contains(cell).then(|| self.size.index_of(cell))
    }

    /// Record that `dependent`'s formula references `dependency`.
    ///
    /// Cells outside the grid are ignored.
    pub fn add_edge(&mut self, dependent: &CellRef, dependency: &CellRef) {
        let (Some(from), Some(to)) = (self.index(dependency), self.index(dependent)) else {
            tracing::warn!(%dependent, %dependency, "ignoring edge outside grid bounds");
            return;
        };
        self.dependents[from].insert(to);
        self.precedents[to].insert(from);
    }

    /// Remove every edge where `dependent` is the dependent side.
    pub fn remove_all_edges_from(&mut self, dependent: &CellRef) {
        let Some(to) = self.index(dependent) else {
            return;
        };
        for from in std::mem::take(&mut self.precedents[to]) {
            self.dependents[from].remove(&to);
        }
    }

    /// Cells whose formulas directly reference `cell`.
    pub fn dependents_of(&self, cell: &CellRef) -> Vec<CellRef> {
        self.cells(self.index(cell).map(|i| &self.dependents[i]))
    }

    /// Cells that `cell`'s formula directly references.
    pub fn precedents_of(&self, cell: &CellRef) -> Vec<CellRef> {
        self.cells(self.index(cell).map(|i| &self.precedents[i]))
    }

    fn cells(&self, set: Option<&BTreeSet<usize>>) -> Vec<CellRef> {
        set.map(|s| s.iter().map(|&i| self.size.cell_at(i)).collect())
            .unwrap_or_default()
    }

    pub(crate) fn dependent_indices(&self, index: usize) -> btree_set::Iter<'_, usize> {
        self.dependents[index].iter()
    }

    pub(crate) fn index_of(&self, cell: &CellRef) -> Option<usize> {
        self.index(cell)
    }

    pub(crate) fn cell_at(&self, index: usize) -> CellRef {
        self.size.cell_at(index)
    }

    /// Total number of dependency edges.
    pub fn edge_count(&self) -> usize {
        self.dependents.iter().map(BTreeSet::len).sum()
    }

    /// Every cell reachable from `cell` along dependent edges, deduplicated,
    /// in discovery order. `cell` itself is included only when it reaches
    /// itself through a cycle.
    pub fn transitive_dependents(&self, cell: &CellRef) -> Vec<CellRef> {
        let Some(start) = self.index(cell) else {
            return Vec::new();
        };
        let mut seen = HashSet::new();
        let mut result = Vec::new();
        let mut stack = vec![start];
        while let Some(current) = stack.pop() {
            for &next in self.dependents[current].iter().rev() {
                if seen.insert(next) {
                    result.push(self.size.cell_at(next));
                    stack.push(next);
                }
            }
        }
        result
    }

    /// Order `cells` so that every cell comes after each cell in the subset
    /// it depends on.
    ///
    /// Depth-first post-order over dependent edges restricted to the subset,
    /// reversed. Reaching a cell that is still in progress means the subset
    /// is cyclic, and the cycle found is returned instead.
    pub fn topological_order(&self, cells: &[CellRef]) -> Result<Vec<CellRef>, CycleDetected> {
        let subset: HashSet<usize> = cells.iter().filter_map(|c| self.index(c)).collect();
        let mut marks: HashMap<usize, Mark> = HashMap::new();
        let mut post_order = Vec::with_capacity(subset.len());

        for root in cells.iter().filter_map(|c| self.index(c)) {
            if marks.contains_key(&root) {
                continue;
            }
            marks.insert(root, Mark::InProgress);
            let mut path = vec![root];
            let mut frames = vec![self.dependents[root].iter()];

            while let Some(frame) = frames.last_mut() {
                match frame.next().copied() {
                    Some(next) if !subset.contains(&next) => {}
                    Some(next) => match marks.get(&next).copied() {
                        None => {
                            marks.insert(next, Mark::InProgress);
                            path.push(next);
                            frames.push(self.dependents[next].iter());
                        }
                        Some(Mark::InProgress) => {
                            let at = path.iter().position(|&c| c == next).unwrap_or(0);
                            return Err(CycleDetected {
                                cycle: path[at..].iter().map(|&i| self.size.cell_at(i)).collect(),
                            });
                        }
                        Some(Mark::Done) => {}
                    },
                    None => {
                        frames.pop();
                        if let Some(done) = path.pop() {
                            marks.insert(done, Mark::Done);
                            post_order.push(done);
                        }
                    }
                }
            }
        }

        Ok(post_order
            .into_iter()
            .rev()
            .map(|i| self.size.cell_at(i))
            .collect())
    }
}

//! Formula dependency extraction.
//!
//! Collects every cell a parsed formula reads: direct references plus every
//! cell covered by a range argument. The result is the static dependency set
//! used to link the formula into the dependency graph.

use std::collections::HashSet;

use super::ast::Expr;
use super::cell_ref::{CellRef, cells_in_range};

/// Extract all referenced cells from a formula, deduplicated, in first-seen order.
pub fn extract_dependencies(expr: &Expr) -> Vec<CellRef> {
    let mut deps = Vec::new();
    let mut seen = HashSet::new();
    collect(expr, &mut deps, &mut seen);
    deps
}

fn collect(expr: &Expr, deps: &mut Vec<CellRef>, seen: &mut HashSet<CellRef>) {
    match expr {
        Expr::Number(_) => {}
        Expr::CellRef(cell) => {
            if seen.insert(*cell) {
                deps.push(*cell);
            }
        }
        Expr::Range { start, end } => {
            for cell in cells_in_range(start, end) {
                if seen.insert(cell) {
                    deps.push(cell);
                }
            }
        }
        Expr::BinaryOp { left, right, .. } => {
            collect(left, deps, seen);
            collect(right, deps, seen);
        }
        Expr::Call { args, .. } => {
            for arg in args {
                collect(arg, deps, seen);
            }
        }
    }
}

//! Formula expression tree.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::cell_ref::CellRef;

/// Parsed formula. Immutable once built; owned by the cell it was parsed for.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    /// Numeric literal
    Number(f64),
    /// Single cell reference
    CellRef(CellRef),
    /// Inclusive rectangle; only legal as a direct function argument
    Range { start: CellRef, end: CellRef },
    /// Arithmetic
    BinaryOp {
        op: BinaryOperator,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// Aggregate function call
    Call { function: Function, args: Vec<Expr> },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl BinaryOperator {
    pub fn from_byte(b: u8) -> Option<BinaryOperator> {
        match b {
            b'+' => Some(BinaryOperator::Add),
            b'-' => Some(BinaryOperator::Subtract),
            b'*' => Some(BinaryOperator::Multiply),
            b'/' => Some(BinaryOperator::Divide),
            _ => None,
        }
    }
}

/// Built-in aggregate functions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Function {
    Sum,
    Avg,
}

impl Function {
    /// Case-insensitive lookup.
    pub fn lookup(name: &str) -> Option<Function> {
        if name.eq_ignore_ascii_case("SUM") {
            Some(Function::Sum)
        } else if name.eq_ignore_ascii_case("AVG") {
            Some(Function::Avg)
        } else {
            None
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Function::Sum => "SUM",
            Function::Avg => "AVG",
        }
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Expr {
    pub fn binary(op: BinaryOperator, left: Expr, right: Expr) -> Expr {
        Expr::BinaryOp {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }
}

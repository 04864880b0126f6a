//! Tree-walking formula evaluation.
//!
//! Cell values are read through an [`EvalContext`], so the evaluator has no
//! knowledge of how cells are stored. Every failure is an `ERR`; the
//! evaluator only ever passes a `CYC` through from a referenced cell.

use super::ast::{BinaryOperator, Expr, Function};
use super::cell::{CellError, CellValue};
use super::cell_ref::{CellRef, cells_in_range};

/// Read access to current cell values during evaluation.
pub trait EvalContext {
    /// Current value of a cell. Blank cells read as empty text.
    fn value_of(&self, cell: &CellRef) -> CellValue;

    /// Values of the rectangle spanned by two corners, row-major.
    fn values_of(&self, start: &CellRef, end: &CellRef) -> Vec<CellValue> {
        cells_in_range(start, end).map(|cell| self.value_of(&cell)).collect()
    }
}

/// Evaluate an expression to a value, or to the first error encountered.
pub fn evaluate(expr: &Expr, ctx: &dyn EvalContext) -> Result<CellValue, CellError> {
    eval_number(expr, ctx).map(CellValue::Number)
}

fn eval_number(expr: &Expr, ctx: &dyn EvalContext) -> Result<f64, CellError> {
    match expr {
        Expr::Number(n) => finite(*n),
        Expr::CellRef(cell) => coerce(ctx.value_of(cell)),
        Expr::BinaryOp { op, left, right } => {
            let l = eval_number(left, ctx)?;
            let r = eval_number(right, ctx)?;
            apply(*op, l, r)
        }
        Expr::Range { .. } => Err(CellError::err("Range cannot be evaluated directly")),
        Expr::Call { function, args } => aggregate(*function, args, ctx),
    }
}

/// Text (including blank) reads as 0 in arithmetic; errors short-circuit.
fn coerce(value: CellValue) -> Result<f64, CellError> {
    match value {
        CellValue::Number(n) => Ok(n),
        CellValue::Text(_) => Ok(0.0),
        CellValue::Error(e) => Err(e),
    }
}

fn apply(op: BinaryOperator, l: f64, r: f64) -> Result<f64, CellError> {
    let result = match op {
        BinaryOperator::Add => l + r,
        BinaryOperator::Subtract => l - r,
        BinaryOperator::Multiply => l * r,
        BinaryOperator::Divide => {
            if r == 0.0 {
                return Err(CellError::err("Division by zero"));
            }
            l / r
        }
    };
    finite(result)
}

fn aggregate(function: Function, args: &[Expr], ctx: &dyn EvalContext) -> Result<f64, CellError> {
    let [Expr::Range { start, end }] = args else {
        return Err(CellError::err("Function requires a range argument"));
    };
    let values = ctx.values_of(start, end);

    let mut sum = 0.0;
    let mut count = 0usize;
    for value in values {
        match value {
            CellValue::Number(n) => {
                sum += n;
                count += 1;
            }
            CellValue::Text(_) => {}
            CellValue::Error(e) => return Err(e),
        }
    }

    let result = match function {
        Function::Sum => sum,
        Function::Avg if count == 0 => 0.0,
        Function::Avg => sum / count as f64,
    };
    finite(result)
}

fn finite(n: f64) -> Result<f64, CellError> {
    if n.is_finite() {
        Ok(n)
    } else {
        Err(CellError::err("Numeric overflow"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{GridSize, parse_formula};
    use std::collections::HashMap;

    #[derive(Default)]
    struct MapContext {
        values: HashMap<CellRef, CellValue>,
    }

    impl MapContext {
        fn with(mut self, name: &str, value: CellValue) -> Self {
            self.values.insert(CellRef::parse_default(name).unwrap(), value);
            self
        }
    }

    impl EvalContext for MapContext {
        fn value_of(&self, cell: &CellRef) -> CellValue {
            self.values.get(cell).cloned().unwrap_or_else(CellValue::blank)
        }
    }

    fn eval(formula: &str, ctx: &MapContext) -> Result<CellValue, CellError> {
        let expr = parse_formula(formula, GridSize::default()).unwrap();
        evaluate(&expr, ctx)
    }

    #[test]
    fn test_arithmetic() {
        let ctx = MapContext::default();
        assert_eq!(eval("=1+2*3", &ctx), Ok(CellValue::Number(7.0)));
        assert_eq!(eval("=(1+2)*3", &ctx), Ok(CellValue::Number(9.0)));
        assert_eq!(eval("=10-4-3", &ctx), Ok(CellValue::Number(3.0)));
        assert_eq!(eval("=7/2", &ctx), Ok(CellValue::Number(3.5)));
    }

    #[test]
    fn test_division_by_zero() {
        let ctx = MapContext::default().with("A1", CellValue::Number(0.0));
        assert_eq!(eval("=1/0", &ctx), Err(CellError::err("Division by zero")));
        assert_eq!(eval("=5/A1", &ctx), Err(CellError::err("Division by zero")));
        // blank reads as 0
        assert_eq!(eval("=5/B1", &ctx), Err(CellError::err("Division by zero")));
    }

    #[test]
    fn test_references_coerce_text_and_blank_to_zero() {
        let ctx = MapContext::default()
            .with("A1", CellValue::Number(4.0))
            .with("A2", CellValue::Text("hello".into()));
        assert_eq!(eval("=A1+A2+A3", &ctx), Ok(CellValue::Number(4.0)));
    }

    #[test]
    fn test_reference_errors_propagate_with_tag() {
        let ctx = MapContext::default()
            .with("A1", CellValue::Error(CellError::cyc("Circular reference detected")))
            .with("A2", CellValue::Error(CellError::err("Division by zero")));
        assert_eq!(eval("=A1*2", &ctx).unwrap_err().tag(), "CYC");
        assert_eq!(eval("=1+A2", &ctx).unwrap_err().tag(), "ERR");
        // left operand wins when both sides are errors
        assert_eq!(eval("=A1+A2", &ctx).unwrap_err().tag(), "CYC");
    }

    #[test]
    fn test_sum_and_avg_skip_text_and_blanks() {
        let ctx = MapContext::default()
            .with("A1", CellValue::Number(1.0))
            .with("A2", CellValue::Text("x".into()))
            .with("A3", CellValue::Number(5.0));
        assert_eq!(eval("=SUM(A1:A4)", &ctx), Ok(CellValue::Number(6.0)));
        assert_eq!(eval("=AVG(A1:A4)", &ctx), Ok(CellValue::Number(3.0)));
        assert_eq!(eval("=SUM(A4:A1)", &ctx), Ok(CellValue::Number(6.0)));
    }

    #[test]
    fn test_aggregates_over_empty_ranges_are_zero() {
        let ctx = MapContext::default();
        assert_eq!(eval("=SUM(B1:C5)", &ctx), Ok(CellValue::Number(0.0)));
        assert_eq!(eval("=AVG(B1:C5)", &ctx), Ok(CellValue::Number(0.0)));
    }

    #[test]
    fn test_aggregate_returns_first_error_row_major() {
        let ctx = MapContext::default()
            .with("B1", CellValue::Error(CellError::err("first")))
            .with("A2", CellValue::Error(CellError::cyc("second")));
        assert_eq!(eval("=SUM(A1:B2)", &ctx), Err(CellError::err("first")));
    }

    #[test]
    fn test_single_cell_argument_is_an_error() {
        let ctx = MapContext::default().with("C3", CellValue::Number(8.0));
        let expected = Err(CellError::err("Function requires a range argument"));
        assert_eq!(eval("=AVG(C3)", &ctx), expected);
        assert_eq!(eval("=SUM(C3)", &ctx), expected);
        assert_eq!(eval("=SUM(C3:C3)", &ctx), Ok(CellValue::Number(8.0)));
    }

    #[test]
    fn test_bare_range_is_an_error() {
        let ctx = MapContext::default();
        assert_eq!(
            eval("=A1:B2", &ctx),
            Err(CellError::err("Range cannot be evaluated directly"))
        );
    }

    #[test]
    fn test_malformed_call_is_an_error() {
        let ctx = MapContext::default();
        let call = Expr::Call {
            function: Function::Sum,
            args: vec![Expr::Number(1.0)],
        };
        assert_eq!(
            evaluate(&call, &ctx),
            Err(CellError::err("Function requires a range argument"))
        );
    }

    #[test]
    fn test_overflow_is_an_error() {
        let ctx = MapContext::default().with("A1", CellValue::Number(f64::MAX));
        assert_eq!(eval("=A1*10", &ctx), Err(CellError::err("Numeric overflow")));
    }
}

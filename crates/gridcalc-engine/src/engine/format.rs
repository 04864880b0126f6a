//! Display strings for cell values.

use super::cell::CellValue;

/// Format a value for display. Errors render as their `#` tag.
pub fn format_value(value: &CellValue) -> String {
    match value {
        CellValue::Number(n) => format_number(*n),
        CellValue::Text(s) => s.clone(),
        CellValue::Error(e) => format!("#{}", e.tag()),
    }
}

/// Format a number for display. Non-finite numbers render as `#ERR`.
pub fn format_number(n: f64) -> String {
    if !n.is_finite() {
        "#ERR".to_string()
    } else if n == 0.0 {
        // also catches -0
        "0".to_string()
    } else {
        n.to_string()
    }
}

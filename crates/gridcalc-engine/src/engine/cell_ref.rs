//! Cell reference parsing and formatting.
//!
//! Provides bidirectional conversion between spreadsheet-style cell references
//! (e.g., "A1", "J20") and zero-indexed column/row coordinates, validated
//! against the bounds of a fixed-size grid.
//!
//! Columns are a single uppercase letter, so a grid has at most 26 columns.
//!
//! # Examples
//!
//! ```
//! use gridcalc_engine::engine::{CellRef, GridSize};
//!
//! let cell = CellRef::parse("B3", GridSize::default()).unwrap();
//! assert_eq!(cell.col, 1); // 0-indexed
//! assert_eq!(cell.row, 2);
//! assert_eq!(cell.to_string(), "B3");
//! ```

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// Widest grid a single-letter column can address.
pub const MAX_COLUMNS: usize = 26;

/// A reference to a cell by column and row indices (0-indexed).
///
/// Field order makes the derived `Ord` row-major.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub struct CellRef {
    pub row: usize,
    pub col: usize,
}

/// Bounds of the grid: `columns` letters starting at `A`, `rows` rows starting at 1.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct GridSize {
    pub columns: usize,
    pub rows: usize,
}

impl Default for GridSize {
    /// Columns `A..=J`, rows `1..=20`.
    fn default() -> Self {
        GridSize {
            columns: 10,
            rows: 20,
        }
    }
}

impl GridSize {
    pub fn new(columns: usize, rows: usize) -> GridSize {
        GridSize { columns, rows }
    }

    /// Total number of addressable cells.
    pub fn cell_count(&self) -> usize {
        self.columns * self.rows
    }

    pub fn contains(&self, cell: &CellRef) -> bool {
        cell.col < self.columns && cell.row < self.rows
    }

    /// Packed arena index (`row * columns + col`).
    pub fn index_of(&self, cell: &CellRef) -> usize {
        cell.row * self.columns + cell.col
    }

    /// Inverse of [`GridSize::index_of`].
    pub fn cell_at(&self, index: usize) -> CellRef {
        CellRef::new(index % self.columns, index / self.columns)
    }

    /// Last addressable column letter.
    pub fn last_column_letter(&self) -> char {
        CellRef::col_to_letter(self.columns.clamp(1, MAX_COLUMNS) - 1)
    }
}

impl CellRef {
    pub fn new(col: usize, row: usize) -> CellRef {
        CellRef { row, col }
    }

    /// Parse a cell reference (e.g., "A1", "J20") within the given grid bounds.
    ///
    /// Exactly one uppercase letter followed by a 1-based row number with no
    /// leading zeros. Lowercase letters, multi-letter columns, row 0, and
    /// anything outside `size` are rejected.
    pub fn parse(name: &str, size: GridSize) -> Option<CellRef> {
        let caps = cell_ref_re().captures(name)?;
        let letter = caps["letter"].as_bytes()[0];
        let col = (letter - b'A') as usize;
        let row = caps["numbers"].parse::<usize>().ok()?.checked_sub(1)?;

        let cell = CellRef::new(col, row);
        size.contains(&cell).then_some(cell)
    }

    /// Parse against the default 10 x 20 grid.
    pub fn parse_default(name: &str) -> Option<CellRef> {
        Self::parse(name, GridSize::default())
    }

    /// Convert a column index to its letter (0 -> A, 25 -> Z).
    ///
    /// Columns past Z have no letter and render as `?`.
    pub fn col_to_letter(col: usize) -> char {
        if col < MAX_COLUMNS {
            (b'A' + col as u8) as char
        } else {
            '?'
        }
    }
}

/// Cells of the rectangle spanned by two corners, row-major.
///
/// Corners may be given in any order; the bounding rectangle is used.
pub fn cells_in_range(start: &CellRef, end: &CellRef) -> impl Iterator<Item = CellRef> + use<> {
    let min_row = start.row.min(end.row);
    let max_row = start.row.max(end.row);
    let min_col = start.col.min(end.col);
    let max_col = start.col.max(end.col);
    (min_row..=max_row).flat_map(move |row| (min_col..=max_col).map(move |col| CellRef::new(col, row)))
}

fn cell_ref_re() -> &'static Regex {
    static CELL_RE: OnceLock<Regex> = OnceLock::new();
    CELL_RE.get_or_init(|| {
        Regex::new(r"^(?<letter>[A-Z])(?<numbers>[1-9][0-9]*)$").expect("cell reference regex must compile")
    })
}

impl std::str::FromStr for CellRef {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_default(s).ok_or_else(|| format!("Invalid cell reference: {}", s))
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", CellRef::col_to_letter(self.col), self.row + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_corners() {
        let size = GridSize::default();
        assert_eq!(CellRef::parse("A1", size), Some(CellRef::new(0, 0)));
        assert_eq!(CellRef::parse("J20", size), Some(CellRef::new(9, 19)));
        assert_eq!(CellRef::parse("C7", size), Some(CellRef::new(2, 6)));
    }

    #[test]
    fn test_parse_rejects_out_of_bounds() {
        let size = GridSize::default();
        assert!(CellRef::parse("A0", size).is_none());
        assert!(CellRef::parse("A21", size).is_none());
        assert!(CellRef::parse("K1", size).is_none());
        assert!(CellRef::parse("A99999999999999999999999", size).is_none());
    }

    #[test]
    fn test_parse_rejects_bad_shapes() {
        let size = GridSize::default();
        for bad in ["", "1", "A", "a1", "AA1", "1A", "A 1", " A1", "A1 ", "A1:B2", "A-1", "A1.5", "A01", "B007"] {
            assert!(CellRef::parse(bad, size).is_none(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn test_parse_honours_grid_size() {
        let wide = GridSize::new(26, 100);
        assert_eq!(CellRef::parse("Z100", wide), Some(CellRef::new(25, 99)));
        assert!(CellRef::parse("Z100", GridSize::default()).is_none());
    }

    #[test]
    fn test_from_str_reports_token() {
        let err = "Q1".parse::<CellRef>().unwrap_err();
        assert_eq!(err, "Invalid cell reference: Q1");
        assert_eq!("B2".parse::<CellRef>(), Ok(CellRef::new(1, 1)));
    }

    #[test]
    fn test_index_packing() {
        let size = GridSize::default();
        let cell = CellRef::new(3, 4);
        assert_eq!(size.index_of(&cell), 43);
        assert_eq!(size.cell_at(43), cell);
        assert_eq!(size.last_column_letter(), 'J');
    }

    #[test]
    fn test_cells_in_range_normalises_corners() {
        let forward: Vec<_> = cells_in_range(&CellRef::new(0, 0), &CellRef::new(1, 1)).collect();
        let backward: Vec<_> = cells_in_range(&CellRef::new(1, 1), &CellRef::new(0, 0)).collect();
        assert_eq!(forward, backward);
        assert_eq!(
            forward,
            vec![CellRef::new(0, 0), CellRef::new(1, 0), CellRef::new(0, 1), CellRef::new(1, 1)]
        );
    }

    proptest! {
        #[test]
        fn prop_format_then_parse_round_trips(col in 0usize..10, row in 0usize..20) {
            let cell = CellRef::new(col, row);
            prop_assert_eq!(CellRef::parse(&cell.to_string(), GridSize::default()), Some(cell));
        }

        #[test]
        fn prop_parse_then_format_round_trips(text in "[A-J](20|1[0-9]|[1-9])") {
            let cell = CellRef::parse(&text, GridSize::default()).unwrap();
            prop_assert_eq!(cell.to_string(), text);
        }
    }
}

// LineDash - core/table.rs
//
// Tabular sheet data: header-first tables, raw A1-addressed grids, and the
// lenient value coercions applied to spreadsheet cells.
// Core layer: pure logic, operates on in-memory text only.

use crate::util::constants;
use crate::util::error::TableError;
use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;
use std::sync::OnceLock;

// =============================================================================
// Table (header row + data rows)
// =============================================================================

/// A worksheet whose first row holds column names.
///
/// Header names are whitespace-trimmed on construction and every row is padded
/// to the header width, so `cell(row, col)` never goes out of bounds for a
/// valid column index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Build a table from CSV text. Fully blank rows are dropped.
    pub fn from_csv(text: &str) -> Result<Self, TableError> {
        let mut records = read_records(text)?.into_iter();

        let headers: Vec<String> = match records.next() {
            Some(first) => first.iter().map(|h| h.trim().to_string()).collect(),
            None => return Ok(Self::default()),
        };

        let rows = records
            .filter(|row| row.iter().any(|cell| !cell.trim().is_empty()))
            .map(|mut row| {
                if row.len() < headers.len() {
                    row.resize(headers.len(), String::new());
                }
                row
            })
            .collect();

        Ok(Self { headers, rows })
    }

    /// True when the table has no data rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of the column whose trimmed header equals `name`.
    pub fn column(&self, name: &str) -> Option<usize> {
        let name = name.trim();
        self.headers.iter().position(|h| h == name)
    }

    /// Cell text, or "" when the row or column does not exist.
    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// The first `limit` rows, for preview display.
    pub fn preview(&self, limit: usize) -> &[Vec<String>] {
        &self.rows[..self.rows.len().min(limit)]
    }
}

// =============================================================================
// Grid (raw sheet, A1 addressed)
// =============================================================================

/// A worksheet kept exactly as laid out, so cell references resolve to the
/// same cells they name in the spreadsheet. Row 1 is `cells[0]`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Grid {
    pub cells: Vec<Vec<String>>,
}

impl Grid {
    /// Build a grid from CSV text. Blank rows are kept to preserve row numbers.
    pub fn from_csv(text: &str) -> Result<Self, TableError> {
        Ok(Self {
            cells: read_records(text)?,
        })
    }

    /// True when no cell holds any text.
    pub fn is_empty(&self) -> bool {
        self.cells
            .iter()
            .all(|row| row.iter().all(|c| c.trim().is_empty()))
    }

    /// Cell text at zero-based coordinates, or "" outside the stored sheet.
    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.cells
            .get(row)
            .and_then(|r| r.get(col))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Values inside `range`, row-major, trimmed, clipped to the stored sheet.
    pub fn range(&self, range: &CellRange) -> Vec<Vec<String>> {
        self.range_at_least(range, 1, 1)
    }

    /// As `range`, but padded with empty strings to at least
    /// `min_rows` x `min_cols` (never beyond `range` itself).
    ///
    /// Only stored cells are materialised, so a huge reference over a small
    /// sheet costs no more than the sheet.
    pub fn range_at_least(
        &self,
        range: &CellRange,
        min_rows: usize,
        min_cols: usize,
    ) -> Vec<Vec<String>> {
        let width = self.cells.iter().map(Vec::len).max().unwrap_or(0);
        let last_row = clip(range.first_row, range.last_row, self.cells.len(), min_rows);
        let last_col = clip(range.first_col, range.last_col, width, min_cols);

        (range.first_row..=last_row)
            .map(|r| {
                (range.first_col..=last_col)
                    .map(|c| self.cell(r, c).trim().to_string())
                    .collect()
            })
            .collect()
    }
}

/// Last index to read along one axis: the stored extent, stretched to
/// `min_len` from `first`, and never past `last`.
fn clip(first: usize, last: usize, stored_len: usize, min_len: usize) -> usize {
    let stored_last = stored_len.saturating_sub(1);
    let min_last = first + min_len.max(1) - 1;
    last.min(stored_last.max(min_last))
}

// =============================================================================
// Cell ranges
// =============================================================================

/// An inclusive rectangular block of cells, zero-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRange {
    pub first_row: usize,
    pub first_col: usize,
    pub last_row: usize,
    pub last_col: usize,
}

fn cell_ref_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\$?([A-Za-z]{1,3})\$?([1-9][0-9]{0,6})$").expect("static cell regex")
    })
}

impl CellRange {
    /// Parse A1 notation: `"X8:Y8"`, `"AA2:AB4"`, or a single cell `"B3"`.
    ///
    /// Corners given in reverse order are normalised so `first <= last`.
    pub fn parse(reference: &str) -> Result<Self, TableError> {
        let invalid = || TableError::InvalidRange {
            reference: reference.to_string(),
        };

        let trimmed = reference.trim();
        let (a, b) = match trimmed.split_once(':') {
            Some((a, b)) => (a, b),
            None => (trimmed, trimmed),
        };
        let (r1, c1) = parse_cell(a).ok_or_else(invalid)?;
        let (r2, c2) = parse_cell(b).ok_or_else(invalid)?;

        Ok(Self {
            first_row: r1.min(r2),
            first_col: c1.min(c2),
            last_row: r1.max(r2),
            last_col: c1.max(c2),
        })
    }

    pub fn rows(&self) -> usize {
        self.last_row - self.first_row + 1
    }

    pub fn cols(&self) -> usize {
        self.last_col - self.first_col + 1
    }
}

/// Parse one cell reference into zero-based `(row, col)`.
fn parse_cell(s: &str) -> Option<(usize, usize)> {
    let caps = cell_ref_regex().captures(s.trim())?;
    let col = column_index(&caps[1])?;
    let row: usize = caps[2].parse().ok()?;
    if row > constants::MAX_SHEET_ROWS || col >= constants::MAX_SHEET_COLUMNS {
        return None;
    }
    Some((row - 1, col))
}

/// Convert column letters to a zero-based index (`A` = 0, `Z` = 25, `AA` = 26).
pub fn column_index(letters: &str) -> Option<usize> {
    if letters.is_empty() {
        return None;
    }
    let mut acc: usize = 0;
    for ch in letters.chars() {
        if !ch.is_ascii_alphabetic() {
            return None;
        }
        let digit = (ch.to_ascii_uppercase() as u8 - b'A') as usize + 1;
        acc = acc.checked_mul(26)?.checked_add(digit)?;
    }
    Some(acc - 1)
}

// =============================================================================
// Value coercion
// =============================================================================

/// Parse a cell as a number. Blank, non-numeric and non-finite text is `None`.
pub fn coerce_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse a cell as an integer count, accepting whole-valued decimals ("12.0").
pub fn coerce_count(raw: &str) -> Option<i64> {
    let value = coerce_number(raw)?;
    if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        Some(value as i64)
    } else {
        None
    }
}

/// Date-only formats tried in order. Month-first wins over day-first for
/// slash dates, matching how the upstream sheet is filled in.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d", "%d-%b-%Y", "%b %d, %Y", "%d %b %Y"];

/// Date-time formats whose date part is kept.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// Parse a date-like cell. Anything unrecognised is `None`, never an error.
pub fn parse_date_lenient(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                .map(|dt| dt.date())
        })
}

fn read_records(text: &str) -> Result<Vec<Vec<String>>, TableError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    reader
        .records()
        .map(|rec| {
            rec.map(|r| r.iter().map(str::to_string).collect())
                .map_err(|e| TableError::Csv { source: e })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_trims_headers_and_pads_rows() {
        let table = Table::from_csv(" Date of Assambly ,Device Type , PWA No\n2024-03-01,TypeA\n").unwrap();
        assert_eq!(table.headers, vec!["Date of Assambly", "Device Type", "PWA No"]);
        assert_eq!(table.rows[0].len(), 3);
        assert_eq!(table.cell(0, 2), "");
        assert_eq!(table.column("Device Type"), Some(1));
        assert_eq!(table.column("  PWA No "), Some(2));
    }

    #[test]
    fn test_table_drops_blank_rows() {
        let table = Table::from_csv("a,b\n1,2\n,\n \n3,4\n").unwrap();
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.cell(1, 0), "3");
    }

    #[test]
    fn test_empty_csv_is_empty_table() {
        let table = Table::from_csv("").unwrap();
        assert!(table.is_empty());
        assert!(table.headers.is_empty());
    }

    #[test]
    fn test_column_index() {
        assert_eq!(column_index("A"), Some(0));
        assert_eq!(column_index("z"), Some(25));
        assert_eq!(column_index("AA"), Some(26));
        assert_eq!(column_index("AB"), Some(27));
        assert_eq!(column_index("X"), Some(23));
        assert_eq!(column_index("XFD"), Some(16_383));
        assert_eq!(column_index(""), None);
        assert_eq!(column_index("A1"), None);
    }

    #[test]
    fn test_cell_range_parse() {
        let r = CellRange::parse("X8:Y8").unwrap();
        assert_eq!((r.first_row, r.first_col, r.last_row, r.last_col), (7, 23, 7, 24));

        let r = CellRange::parse("AA2:AB4").unwrap();
        assert_eq!((r.rows(), r.cols()), (3, 2));
        assert_eq!(r.first_col, 26);

        let single = CellRange::parse("B3").unwrap();
        assert_eq!((single.rows(), single.cols()), (1, 1));

        let reversed = CellRange::parse("Z2:W1").unwrap();
        assert_eq!(reversed, CellRange::parse("W1:Z2").unwrap());

        let absolute = CellRange::parse("$W$1:$Z$2").unwrap();
        assert_eq!(absolute, CellRange::parse("W1:Z2").unwrap());
    }

    #[test]
    fn test_cell_range_rejects_garbage() {
        for bad in ["", "8X", "X0:Y1", "A1:B", "A1:B2:C3", "ABCD1"] {
            assert!(
                matches!(CellRange::parse(bad), Err(TableError::InvalidRange { .. })),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_grid_range_clips_to_stored_cells() {
        // Spreadsheet exports write empty rows as bare separators.
        let grid = Grid::from_csv("a,b\n,,\nc, d ,e\n").unwrap();
        let range = CellRange::parse("B1:D3").unwrap();
        let values = grid.range(&range);
        assert_eq!(
            values,
            vec![
                vec!["b".to_string(), String::new()],
                vec![String::new(), String::new()],
                vec!["d".to_string(), "e".to_string()],
            ]
        );
    }

    #[test]
    fn test_grid_range_pads_to_minimum_shape() {
        let grid = Grid::from_csv("x\n").unwrap();
        let range = CellRange::parse("A1:C5").unwrap();
        let values = grid.range_at_least(&range, 2, 3);
        assert_eq!(
            values,
            vec![
                vec!["x".to_string(), String::new(), String::new()],
                vec![String::new(), String::new(), String::new()],
            ]
        );

        // The minimum never stretches past the range itself.
        let narrow = CellRange::parse("A1:B1").unwrap();
        assert_eq!(grid.range_at_least(&narrow, 2, 3), vec![vec!["x".to_string(), String::new()]]);
    }

    #[test]
    fn test_grid_range_over_whole_sheet_reads_only_stored_cells() {
        let grid = Grid::from_csv("x\n").unwrap();
        let whole = CellRange::parse("A1:XFD1048576").unwrap();
        assert_eq!(grid.range(&whole), vec![vec!["x".to_string()]]);

        let wide = CellRange::parse("A1:XFD200").unwrap();
        let values = grid.range_at_least(&wide, 2, 3);
        assert_eq!(values.len(), 2);
        assert!(values.iter().all(|row| row.len() == 3));

        // Starting beyond the stored sheet still yields the minimum shape.
        let far = CellRange::parse("X15:Z27").unwrap();
        let values = grid.range_at_least(&far, 2, 3);
        assert_eq!(values, vec![vec![String::new(); 3]; 2]);
    }

    #[test]
    fn test_coerce_number() {
        assert_eq!(coerce_number(" 42 "), Some(42.0));
        assert_eq!(coerce_number("3.5"), Some(3.5));
        assert_eq!(coerce_number(""), None);
        assert_eq!(coerce_number("n/a"), None);
        assert_eq!(coerce_number("NaN"), None);
        assert_eq!(coerce_count("12.0"), Some(12));
        assert_eq!(coerce_count("12.5"), None);
    }

    #[test]
    fn test_parse_date_lenient() {
        let d = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert_eq!(parse_date_lenient("2024-03-01"), Some(d));
        assert_eq!(parse_date_lenient("03/01/2024"), Some(d));
        assert_eq!(parse_date_lenient("2024/03/01"), Some(d));
        assert_eq!(parse_date_lenient("01-Mar-2024"), Some(d));
        assert_eq!(parse_date_lenient("Mar 01, 2024"), Some(d));
        assert_eq!(parse_date_lenient("2024-03-01 14:22:05"), Some(d));
        assert_eq!(parse_date_lenient("2024-03-01T08:00:00"), Some(d));
        assert_eq!(parse_date_lenient("not a date"), None);
        assert_eq!(parse_date_lenient("2024-02-30"), None);
        assert_eq!(parse_date_lenient("  "), None);
    }
}

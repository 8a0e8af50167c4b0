// LineDash - core/model.rs
//
// Core data model types. Pure data definitions with no I/O, no UI,
// no platform dependencies.
//
// These types are the shared vocabulary across all layers.

use crate::core::table::{parse_date_lenient, Table};
use crate::util::constants;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// =============================================================================
// Assembly records
// =============================================================================

/// One row of the records sheet as delivered, before normalisation.
///
/// Every field is kept as text; the date may be blank or malformed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    pub assembly_date: String,
    pub device_type: String,
    pub unit_id: String,
}

impl RawRecord {
    pub fn new(
        assembly_date: impl Into<String>,
        device_type: impl Into<String>,
        unit_id: impl Into<String>,
    ) -> Self {
        Self {
            assembly_date: assembly_date.into(),
            device_type: device_type.into(),
            unit_id: unit_id.into(),
        }
    }

    /// Normalise into an `AssemblyRecord`.
    ///
    /// Returns `None` when the date does not parse or the device type is blank.
    pub fn normalize(&self) -> Option<AssemblyRecord> {
        let assembly_date = parse_date_lenient(&self.assembly_date)?;
        let device_type = self.device_type.trim();
        if device_type.is_empty() {
            return None;
        }
        Some(AssemblyRecord {
            assembly_date,
            device_type: device_type.to_string(),
            unit_id: self.unit_id.trim().to_string(),
        })
    }
}

/// A validated assembly record: valid date, non-empty device type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssemblyRecord {
    pub assembly_date: NaiveDate,
    pub device_type: String,
    pub unit_id: String,
}

/// Column names under which the records sheet publishes each field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordSchema {
    pub date_column: String,
    pub device_type_column: String,
    pub unit_id_column: String,
}

impl Default for RecordSchema {
    fn default() -> Self {
        Self {
            date_column: constants::DEFAULT_DATE_COLUMN.to_string(),
            device_type_column: constants::DEFAULT_DEVICE_TYPE_COLUMN.to_string(),
            unit_id_column: constants::DEFAULT_UNIT_ID_COLUMN.to_string(),
        }
    }
}

impl RecordSchema {
    /// Names of schema columns that `table` does not have.
    pub fn missing_columns<'a>(&'a self, table: &Table) -> Vec<&'a str> {
        [
            self.date_column.as_str(),
            self.device_type_column.as_str(),
            self.unit_id_column.as_str(),
        ]
        .into_iter()
        .filter(|name| table.column(name).is_none())
        .collect()
    }

    /// Map every table row onto a `RawRecord`.
    ///
    /// A column absent from the table yields empty fields, which normalisation
    /// then drops; callers wanting a hard failure check `missing_columns` first.
    pub fn extract(&self, table: &Table) -> Vec<RawRecord> {
        let date = table.column(&self.date_column);
        let device = table.column(&self.device_type_column);
        let unit = table.column(&self.unit_id_column);
        let field = |row: usize, col: Option<usize>| -> String {
            col.map(|c| table.cell(row, c).to_string()).unwrap_or_default()
        };

        (0..table.rows.len())
            .map(|row| RawRecord {
                assembly_date: field(row, date),
                device_type: field(row, device),
                unit_id: field(row, unit),
            })
            .collect()
    }
}

// =============================================================================
// Trend types
// =============================================================================

/// An inclusive calendar interval. Valid when `start <= end`.
///
/// Fields are public so an unvalidated range can be handed to the trend
/// aggregator, which reports a reversed range as `InvalidRange`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn is_valid(&self) -> bool {
        self.start <= self.end
    }

    /// Inclusive membership test.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

impl std::fmt::Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} \u{2013} {}",
            self.start.format(constants::DATE_DISPLAY_FORMAT),
            self.end.format(constants::DATE_DISPLAY_FORMAT)
        )
    }
}

/// Quick-range shorthand selectable in the trend view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum RangeMode {
    #[default]
    Custom,
    ThisWeek,
    ThisMonth,
    ThisQuarter,
}

impl RangeMode {
    /// Returns all variants in display order.
    pub fn all() -> &'static [RangeMode] {
        &[
            RangeMode::Custom,
            RangeMode::ThisWeek,
            RangeMode::ThisMonth,
            RangeMode::ThisQuarter,
        ]
    }

    /// Human-readable label for display.
    pub fn label(&self) -> &'static str {
        match self {
            RangeMode::Custom => "Custom",
            RangeMode::ThisWeek => "This Week",
            RangeMode::ThisMonth => "This Month",
            RangeMode::ThisQuarter => "This Quarter",
        }
    }
}

impl std::fmt::Display for RangeMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// User-selected trend parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrendQuery {
    pub device_type: String,
    pub range_mode: RangeMode,
    /// Only consulted when `range_mode == Custom`.
    pub custom_range: Option<DateRange>,
}

/// Units of the selected type assembled on one calendar day. `count >= 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub count: u32,
}

/// Aggregation output plus what the chart needs for its title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrendSeries {
    pub device_type: String,
    pub range: DateRange,
    /// Ascending by date, no duplicates; empty means no activity in range.
    pub points: Vec<TrendPoint>,
}

impl TrendSeries {
    pub fn total_units(&self) -> u64 {
        self.points.iter().map(|p| u64::from(p.count)).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_normalize_drops_bad_rows() {
        assert!(RawRecord::new("garbage", "TypeA", "U1").normalize().is_none());
        assert!(RawRecord::new("", "TypeA", "U1").normalize().is_none());
        assert!(RawRecord::new("2024-03-01", "   ", "U1").normalize().is_none());

        let ok = RawRecord::new("2024-03-01", " TypeA ", " U1 ").normalize().unwrap();
        assert_eq!(ok.assembly_date, d(2024, 3, 1));
        assert_eq!(ok.device_type, "TypeA");
        assert_eq!(ok.unit_id, "U1");
    }

    #[test]
    fn test_schema_extract_and_missing_columns() {
        let table = Table::from_csv(
            "Date of Assambly,Device Type,PWA No,Notes\n2024-03-01,TypeA,U1,x\n2024-03-02,TypeB,U2,\n",
        )
        .unwrap();
        let schema = RecordSchema::default();
        assert!(schema.missing_columns(&table).is_empty());

        let records = schema.extract(&table);
        assert_eq!(records.len(), 2);
        assert_eq!(records[1], RawRecord::new("2024-03-02", "TypeB", "U2"));

        let renamed = RecordSchema {
            unit_id_column: "Serial".to_string(),
            ..Default::default()
        };
        assert_eq!(renamed.missing_columns(&table), vec!["Serial"]);
        assert_eq!(renamed.extract(&table)[0].unit_id, "");
    }

    #[test]
    fn test_date_range_contains_is_inclusive() {
        let r = DateRange::new(d(2024, 3, 1), d(2024, 3, 2));
        assert!(r.is_valid());
        assert!(r.contains(d(2024, 3, 1)));
        assert!(r.contains(d(2024, 3, 2)));
        assert!(!r.contains(d(2024, 3, 3)));
        assert!(!DateRange::new(d(2024, 3, 10), d(2024, 3, 1)).is_valid());
    }
}

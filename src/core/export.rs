// LineDash - core/export.rs
//
// CSV and JSON export of the current device-assembly trend.
// Core layer: writes to any Write trait object.

use crate::core::model::TrendSeries;
use crate::util::constants::DATE_DISPLAY_FORMAT;
use crate::util::error::ExportError;
use std::io::Write;
use std::path::Path;

/// Export a trend series to CSV.
///
/// Writes: date, device_type, count. Returns the number of data rows written.
pub fn export_csv<W: Write>(
    series: &TrendSeries,
    writer: W,
    export_path: &Path,
) -> Result<usize, ExportError> {
    let csv_err = |e| ExportError::Csv {
        path: export_path.to_path_buf(),
        source: e,
    };
    let mut csv_writer = csv::Writer::from_writer(writer);

    csv_writer
        .write_record(["date", "device_type", "count"])
        .map_err(csv_err)?;

    let mut count = 0;
    for point in &series.points {
        csv_writer
            .write_record([
                point.date.format(DATE_DISPLAY_FORMAT).to_string().as_str(),
                series.device_type.as_str(),
                point.count.to_string().as_str(),
            ])
            .map_err(csv_err)?;
        count += 1;
    }

    csv_writer.flush().map_err(|e| ExportError::Io {
        path: export_path.to_path_buf(),
        source: e,
    })?;

    tracing::info!(path = %export_path.display(), rows = count, "Trend exported to CSV");
    Ok(count)
}

/// Export a trend series to JSON (device type, range, points).
pub fn export_json<W: Write>(
    series: &TrendSeries,
    writer: W,
    export_path: &Path,
) -> Result<usize, ExportError> {
    serde_json::to_writer_pretty(writer, series).map_err(|e| ExportError::Json {
        path: export_path.to_path_buf(),
        source: e,
    })?;
    tracing::info!(path = %export_path.display(), rows = series.points.len(), "Trend exported to JSON");
    Ok(series.points.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::{DateRange, TrendPoint};
    use chrono::NaiveDate;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
    }

    fn series() -> TrendSeries {
        TrendSeries {
            device_type: "TypeA".to_string(),
            range: DateRange::new(d(1), d(2)),
            points: vec![
                TrendPoint { date: d(1), count: 2 },
                TrendPoint { date: d(2), count: 1 },
            ],
        }
    }

    #[test]
    fn test_csv_export() {
        let mut buf = Vec::new();
        let count = export_csv(&series(), &mut buf, Path::new("out.csv")).unwrap();
        assert_eq!(count, 2);

        let output = String::from_utf8(buf).unwrap();
        assert_eq!(
            output,
            "date,device_type,count\n2024-03-01,TypeA,2\n2024-03-02,TypeA,1\n"
        );
    }

    #[test]
    fn test_json_export() {
        let mut buf = Vec::new();
        let count = export_json(&series(), &mut buf, Path::new("out.json")).unwrap();
        assert_eq!(count, 2);

        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value["device_type"], "TypeA");
        assert_eq!(value["range"]["start"], "2024-03-01");
        assert_eq!(value["points"][0]["count"], 2);
    }

    #[test]
    fn test_empty_series_exports_header_only() {
        let empty = TrendSeries {
            points: Vec::new(),
            ..series()
        };
        let mut buf = Vec::new();
        assert_eq!(export_csv(&empty, &mut buf, Path::new("out.csv")).unwrap(), 0);
        assert_eq!(String::from_utf8(buf).unwrap(), "date,device_type,count\n");
    }
}

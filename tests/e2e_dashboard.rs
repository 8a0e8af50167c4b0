// LineDash - tests/e2e_dashboard.rs
//
// End-to-end tests for the dashboard pipeline.
//
// These tests write real CSV worksheets to a temporary directory and drive
// them through the real source, cache, table/grid parsing, trend
// aggregation, figure extraction, state folding, and export. Only the
// clock is fixed.

use chrono::NaiveDate;
use linedash::app::fetch::{run_fetch, FetchProgress, FetchRequest};
use linedash::app::source::{CachedSource, CsvDirSource, DataSource};
use linedash::app::state::DashboardState;
use linedash::core::auth::LoginGate;
use linedash::core::model::{DateRange, RangeMode, RecordSchema, TrendQuery};
use linedash::core::report::{build_figures, ReportLayout};
use linedash::core::table::CellRange;
use linedash::core::trend::{FixedClock, TrendAggregator};
use linedash::platform::config::{load_config, SourceKind};
use linedash::util::error::TrendError;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::mpsc;
use std::time::Duration;
use tempfile::TempDir;

// =============================================================================
// Fixtures
// =============================================================================

const RECORDS_CSV: &str = "\
 Date of Assambly , Device Type ,PWA No,Notes
2024-03-01,TypeA,U1,
2024-03-01,TypeA,U2,rework
03/04/2024,TypeA,U3,
2024-03-04,TypeB,U4,
2024-03-05 14:30:00,TypeA,U5,
,TypeA,U6,missing date
2024-02-28,TypeA,U7,
2024-03-06,,U8,missing type
";

fn d(m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, m, day).unwrap()
}

/// Write `cells` (A1 reference, value) into a 27 x 28 sheet as CSV.
fn write_report(path: &Path, cells: &[(&str, &str)]) {
    let mut grid = vec![vec![String::new(); 28]; 27];
    for (reference, value) in cells {
        let r = CellRange::parse(reference).unwrap();
        grid[r.first_row][r.first_col] = value.to_string();
    }
    let mut writer = csv::Writer::from_path(path).unwrap();
    for row in &grid {
        writer.write_record(row).unwrap();
    }
    writer.flush().unwrap();
}

fn report_cells() -> Vec<(&'static str, &'static str)> {
    vec![
        // Progress
        ("W1", "Assembled"),
        ("X1", "Tested"),
        ("Y1", "Shipped"),
        ("Z1", "Total"),
        ("W2", "40"),
        ("X2", "25"),
        ("Y2", "10"),
        ("Z2", "100"),
        // Scorecards
        ("AA2", "Batch 1"),
        ("AB2", "30"),
        ("AA3", "Batch 2"),
        ("AB3", "45"),
        ("AA4", "Batch 3"),
        ("AB4", "n/a"),
        ("X8", "PWA Inventory"),
        ("Y8", "120"),
        // Distribution
        ("W9", "Board"),
        ("X9", "Count"),
        ("W10", "Alpha"),
        ("X10", "10"),
        ("W11", "Beta"),
        ("X11", "30"),
        ("W12", "Gamma"),
        ("X12", "60"),
        ("W13", "Delta"),
        // Production
        ("X15", "Month"),
        ("Y15", "Line 1"),
        ("Z15", "Line 2"),
        ("X16", "Jan"),
        ("Y16", "5"),
        ("Z16", "3"),
        ("X17", "Feb"),
        ("Y17", "0"),
        ("Z17", "0"),
        ("X18", "Mar"),
        ("Y18", "7"),
    ]
}

fn fixture_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("Sheet2.csv"), RECORDS_CSV).unwrap();
    write_report(&dir.path().join("DashBoard.csv"), &report_cells());
    dir
}

fn query(device: &str, mode: RangeMode, custom: Option<DateRange>) -> TrendQuery {
    TrendQuery {
        device_type: device.to_string(),
        range_mode: mode,
        custom_range: custom,
    }
}

// =============================================================================
// Records → trend
// =============================================================================

#[test]
fn e2e_records_sheet_to_trend_series() {
    let dir = fixture_dir();
    let source = CsvDirSource::new(dir.path());
    let table = source.fetch_table("Sheet2").unwrap();

    let schema = RecordSchema::default();
    assert!(schema.missing_columns(&table).is_empty());
    let raw = schema.extract(&table);
    assert_eq!(raw.len(), 8);

    let aggregator = TrendAggregator::new(FixedClock(d(3, 6)));
    let series = aggregator
        .aggregate(&raw, &query("TypeA", RangeMode::Custom, Some(DateRange::new(d(3, 1), d(3, 6)))))
        .unwrap();

    let points: Vec<(NaiveDate, u32)> = series.points.iter().map(|p| (p.date, p.count)).collect();
    assert_eq!(points, vec![(d(3, 1), 2), (d(3, 4), 1), (d(3, 5), 1)]);
    assert!(series.points.windows(2).all(|w| w[0].date < w[1].date));
    assert!(series.points.iter().all(|p| p.count >= 1));
}

#[test]
fn e2e_quick_ranges_follow_the_clock() {
    let dir = fixture_dir();
    let table = CsvDirSource::new(dir.path()).fetch_table("Sheet2").unwrap();
    let raw = RecordSchema::default().extract(&table);

    // 2024-03-06 is a Wednesday.
    let aggregator = TrendAggregator::new(FixedClock(d(3, 6)));

    let week = aggregator.aggregate(&raw, &query("TypeA", RangeMode::ThisWeek, None)).unwrap();
    assert_eq!(week.range, DateRange::new(d(3, 4), d(3, 6)));
    assert_eq!(week.total_units(), 2);

    let month = aggregator.aggregate(&raw, &query("TypeA", RangeMode::ThisMonth, None)).unwrap();
    assert_eq!(month.total_units(), 4);

    let quarter = aggregator
        .aggregate(&raw, &query("TypeA", RangeMode::ThisQuarter, None))
        .unwrap();
    assert_eq!(quarter.range.start, d(1, 1));
    assert_eq!(quarter.total_units(), 5);
}

#[test]
fn e2e_validation_errors_surface_before_counting() {
    let dir = fixture_dir();
    let table = CsvDirSource::new(dir.path()).fetch_table("Sheet2").unwrap();
    let raw = RecordSchema::default().extract(&table);
    let aggregator = TrendAggregator::new(FixedClock(d(3, 6)));

    let unknown = aggregator.aggregate(&raw, &query("TypeZ", RangeMode::ThisMonth, None));
    assert!(matches!(unknown, Err(TrendError::InvalidSelection { .. })));

    let reversed = aggregator.aggregate(
        &raw,
        &query("TypeA", RangeMode::Custom, Some(DateRange::new(d(3, 6), d(3, 1)))),
    );
    assert!(matches!(reversed, Err(TrendError::InvalidRange { .. })));
}

// =============================================================================
// Report → figures
// =============================================================================

#[test]
fn e2e_report_sheet_to_figures() {
    let dir = fixture_dir();
    let grid = CsvDirSource::new(dir.path()).fetch_grid("DashBoard").unwrap();
    let (figures, warnings) = build_figures(&grid, &ReportLayout::default());
    assert!(warnings.is_empty(), "{warnings:?}");

    let primary = figures.primary_scorecard.unwrap();
    assert_eq!(primary.label, "PWA Inventory");
    assert_eq!(primary.value, Some(120));

    assert_eq!(figures.extra_scorecards.len(), 3);
    assert_eq!(figures.extra_scorecards[2].value, None);

    let progress = figures.progress.unwrap();
    assert_eq!(progress.axis_max, 100.0);
    assert_eq!(progress.segments.len(), 3);
    assert_eq!(progress.segments[0], ("Assembled".to_string(), 40.0));

    let dist = figures.distribution.unwrap();
    assert_eq!(dist.category_name, "Board");
    assert_eq!(dist.slices.len(), 4);
    let pct = dist.percentages();
    assert_eq!(pct[3], None);
    assert!((pct[2].unwrap() - 60.0).abs() < 1e-9);

    let prod = figures.production.unwrap();
    let periods: Vec<&str> = prod.rows.iter().map(|r| r.period.as_str()).collect();
    assert_eq!(periods, vec!["Jan", "Mar"]);
    assert_eq!(prod.stacked_lines(), vec![(5.0, 8.0), (7.0, 7.0)]);
}

// =============================================================================
// Cache
// =============================================================================

#[test]
fn e2e_cache_serves_snapshot_until_invalidated() {
    let dir = fixture_dir();
    let cached = CachedSource::new(CsvDirSource::new(dir.path()), Duration::from_secs(300));
    assert_eq!(cached.fetch_table("Sheet2").unwrap().rows.len(), 8);

    std::fs::write(
        dir.path().join("Sheet2.csv"),
        "Date of Assambly,Device Type,PWA No\n2024-03-01,TypeA,U1\n",
    )
    .unwrap();
    assert_eq!(cached.fetch_table("Sheet2").unwrap().rows.len(), 8);

    cached.invalidate();
    assert_eq!(cached.fetch_table("Sheet2").unwrap().rows.len(), 1);
}

// =============================================================================
// Fetch → state → export
// =============================================================================

#[test]
fn e2e_fetch_into_state_and_export() {
    let dir = fixture_dir();
    let source = CsvDirSource::new(dir.path());
    let (tx, rx) = mpsc::channel();
    let request = FetchRequest {
        records_sheet: "Sheet2".to_string(),
        report_sheet: "DashBoard".to_string(),
        force: true,
    };
    run_fetch(&source, &request, &tx, &AtomicBool::new(false));
    drop(tx);

    let mut state = DashboardState::new(
        LoginGate::open(),
        RecordSchema::default(),
        ReportLayout::default(),
        50,
        FixedClock(d(3, 6)),
        false,
    );
    for msg in rx {
        state.apply_progress(msg);
    }

    assert!(!state.fetch_in_progress);
    assert!(state.records_error.is_none());
    assert!(state.report_error.is_none());
    assert_eq!(state.device_types, vec!["TypeA", "TypeB"]);
    assert!(state.figures.is_some());

    state.range_mode = RangeMode::ThisMonth;
    state.recompute_trend();
    let series = state.series().unwrap().clone();
    assert_eq!(series.total_units(), 4);

    let out = dir.path().join("trend.csv");
    let file = std::fs::File::create(&out).unwrap();
    let rows = linedash::core::export::export_csv(&series, file, &out).unwrap();
    assert_eq!(rows, 3);
    let text = std::fs::read_to_string(&out).unwrap();
    assert!(text.starts_with("date,device_type,count\n2024-03-01,TypeA,2\n"));
}

#[test]
fn e2e_missing_report_sheet_keeps_records() {
    let dir = fixture_dir();
    std::fs::remove_file(dir.path().join("DashBoard.csv")).unwrap();
    let (tx, rx) = mpsc::channel();
    let request = FetchRequest {
        records_sheet: "Sheet2".to_string(),
        report_sheet: "DashBoard".to_string(),
        force: false,
    };
    run_fetch(&CsvDirSource::new(dir.path()), &request, &tx, &AtomicBool::new(false));
    drop(tx);

    let msgs: Vec<FetchProgress> = rx.into_iter().collect();
    assert!(msgs
        .iter()
        .any(|m| matches!(m, FetchProgress::RecordsLoaded { .. })));
    assert!(msgs.iter().any(|m| matches!(
        m,
        FetchProgress::Completed {
            records_ok: true,
            report_ok: false,
            ..
        }
    )));
}

// =============================================================================
// Config → source
// =============================================================================

#[test]
fn e2e_config_selects_csv_directory() {
    let data = fixture_dir();
    let conf_dir = TempDir::new().unwrap();
    let conf = conf_dir.path().join("config.toml");
    std::fs::write(
        &conf,
        format!(
            "[source]\nkind = \"csv_dir\"\npath = {:?}\nttl_seconds = 0\n",
            data.path().display().to_string()
        ),
    )
    .unwrap();

    let (config, warnings) = load_config(&conf);
    assert!(warnings.is_empty(), "{warnings:?}");
    assert_eq!(config.cache_ttl_secs, 0);
    let dir = match config.source {
        Some(SourceKind::CsvDir(dir)) => dir,
        other => panic!("expected a csv_dir source, got {other:?}"),
    };
    let table = CsvDirSource::new(dir).fetch_table(&config.records_sheet).unwrap();
    assert_eq!(table.rows.len(), 8);
}

// LineDash - core/report.rs
//
// Published aggregate figures read from the report sheet.
//
// The report sheet is addressed through `ReportLayout`, a named schema that
// maps each figure to an A1 range. Every figure is independently optional:
// an unusable range or an empty block produces `None` plus a warning, and
// the panel for that figure shows a message instead of a chart.

use crate::core::table::{coerce_count, coerce_number, CellRange, Grid};
use crate::util::constants;
use serde::Serialize;

// =============================================================================
// Layout
// =============================================================================

/// Where each published figure lives on the report sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportLayout {
    /// One row: label, value.
    pub primary_scorecard: String,
    /// One (label, value) pair per row.
    pub extra_scorecards: String,
    /// Two rows: segment labels, then values. The last value is the total.
    pub progress: String,
    /// Header row, then (category, value) rows.
    pub distribution: String,
    /// Header row, then (period, series A, series B) rows.
    pub production: String,
}

impl Default for ReportLayout {
    fn default() -> Self {
        Self {
            primary_scorecard: constants::DEFAULT_PRIMARY_SCORECARD_RANGE.to_string(),
            extra_scorecards: constants::DEFAULT_EXTRA_SCORECARDS_RANGE.to_string(),
            progress: constants::DEFAULT_PROGRESS_RANGE.to_string(),
            distribution: constants::DEFAULT_DISTRIBUTION_RANGE.to_string(),
            production: constants::DEFAULT_PRODUCTION_RANGE.to_string(),
        }
    }
}

// =============================================================================
// Figures
// =============================================================================

/// A labelled headline number.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scorecard {
    pub label: String,
    /// `None` when the published value is not numeric.
    pub value: Option<i64>,
}

/// Stacked horizontal inventory bar.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InventoryProgress {
    /// `(label, value)`; non-numeric values count as zero width.
    pub segments: Vec<(String, f64)>,
    /// Axis maximum: the published total when positive, otherwise 1.
    pub axis_max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistributionSlice {
    pub label: String,
    pub value: Option<f64>,
}

/// Category breakdown shown as bars and as a doughnut.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Distribution {
    pub category_name: String,
    pub value_name: String,
    pub slices: Vec<DistributionSlice>,
}

impl Distribution {
    /// Share of each slice in the sum of valid, non-negative values.
    /// `None` for slices without a usable value or when the sum is zero.
    pub fn percentages(&self) -> Vec<Option<f64>> {
        let total: f64 = self
            .slices
            .iter()
            .filter_map(|s| s.value)
            .filter(|v| *v >= 0.0)
            .sum();
        self.slices
            .iter()
            .map(|s| match s.value {
                Some(v) if v >= 0.0 && total > 0.0 => Some(v / total * 100.0),
                _ => None,
            })
            .collect()
    }

    pub fn max_value(&self) -> f64 {
        self.slices
            .iter()
            .filter_map(|s| s.value)
            .fold(0.0, f64::max)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductionRow {
    pub period: String,
    pub series_a: Option<f64>,
    pub series_b: Option<f64>,
}

impl ProductionRow {
    /// Stacked height; missing values count as zero.
    pub fn total(&self) -> f64 {
        self.series_a.unwrap_or(0.0) + self.series_b.unwrap_or(0.0)
    }
}

/// Monthly production as two stacked series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyProduction {
    pub period_name: String,
    pub series_a_name: String,
    pub series_b_name: String,
    /// Only periods where either series is positive.
    pub rows: Vec<ProductionRow>,
}

impl MonthlyProduction {
    /// Cumulative line values per row: `(a, a + b)`.
    pub fn stacked_lines(&self) -> Vec<(f64, f64)> {
        self.rows
            .iter()
            .map(|r| {
                let a = r.series_a.unwrap_or(0.0);
                (a, a + r.series_b.unwrap_or(0.0))
            })
            .collect()
    }

    pub fn max_total(&self) -> f64 {
        self.rows.iter().map(ProductionRow::total).fold(0.0, f64::max)
    }
}

/// Everything read from the report sheet in one pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardFigures {
    pub primary_scorecard: Option<Scorecard>,
    pub extra_scorecards: Vec<Scorecard>,
    pub progress: Option<InventoryProgress>,
    pub distribution: Option<Distribution>,
    pub production: Option<MonthlyProduction>,
}

// =============================================================================
// Building
// =============================================================================

/// Read every figure named by `layout` from `grid`.
///
/// Returns the figures and a list of non-fatal warnings (unusable ranges,
/// blocks too narrow for their figure).
pub fn build_figures(grid: &Grid, layout: &ReportLayout) -> (DashboardFigures, Vec<String>) {
    let mut warnings = Vec::new();
    let mut block = |name: &str, reference: &str, min_rows: usize, min_cols: usize| {
        match CellRange::parse(reference) {
            Ok(range) if range.rows() >= min_rows && range.cols() >= min_cols => {
                Some(grid.range_at_least(&range, min_rows, min_cols))
            }
            Ok(_) => {
                warnings.push(format!(
                    "Report range {name} = \"{reference}\" must span at least {min_rows} row(s) and {min_cols} column(s)"
                ));
                None
            }
            Err(e) => {
                warnings.push(format!("Report range {name}: {e}"));
                None
            }
        }
    };

    let primary = block("primary_scorecard", layout.primary_scorecard.as_str(), 1, 2);
    let extra = block("extra_scorecards", layout.extra_scorecards.as_str(), 1, 2);
    let progress = block("progress", layout.progress.as_str(), 2, 2);
    let distribution = block("distribution", layout.distribution.as_str(), 2, 2);
    let production = block("production", layout.production.as_str(), 2, 3);

    let figures = DashboardFigures {
        primary_scorecard: primary.as_deref().and_then(|b| scorecards(b).into_iter().next()),
        extra_scorecards: extra
            .as_deref()
            .map(|b| {
                let mut cards = scorecards(b);
                cards.truncate(constants::MAX_EXTRA_SCORECARDS);
                cards
            })
            .unwrap_or_default(),
        progress: progress.as_deref().and_then(inventory_progress),
        distribution: distribution.as_deref().and_then(distribution_table),
        production: production.as_deref().and_then(monthly_production),
    };

    tracing::debug!(
        primary = figures.primary_scorecard.is_some(),
        extra = figures.extra_scorecards.len(),
        progress = figures.progress.is_some(),
        distribution = figures.distribution.is_some(),
        production = figures.production.is_some(),
        warnings = warnings.len(),
        "Report figures built"
    );

    (figures, warnings)
}

fn is_blank(row: &[String]) -> bool {
    row.iter().all(|c| c.is_empty())
}

/// One card per non-blank row of a (label, value) block.
fn scorecards(block: &[Vec<String>]) -> Vec<Scorecard> {
    block
        .iter()
        .filter(|row| !is_blank(row))
        .map(|row| Scorecard {
            label: row[0].clone(),
            value: coerce_count(&row[1]),
        })
        .collect()
}

fn inventory_progress(block: &[Vec<String>]) -> Option<InventoryProgress> {
    let labels = &block[0];
    let values = &block[1];
    if is_blank(values) {
        return None;
    }

    let numbers: Vec<f64> = values.iter().map(|v| coerce_number(v).unwrap_or(0.0)).collect();
    let total = numbers.last().copied().unwrap_or(0.0);
    let axis_max = if total > 0.0 { total } else { 1.0 };

    let segments = labels
        .iter()
        .zip(&numbers)
        .take(constants::PROGRESS_SEGMENTS.min(numbers.len().saturating_sub(1)).max(1))
        .map(|(label, value)| (label.clone(), *value))
        .collect();

    Some(InventoryProgress { segments, axis_max })
}

fn distribution_table(block: &[Vec<String>]) -> Option<Distribution> {
    let header = &block[0];
    let slices: Vec<DistributionSlice> = block[1..]
        .iter()
        .filter(|row| !row[0].is_empty())
        .map(|row| DistributionSlice {
            label: row[0].clone(),
            value: coerce_number(&row[1]),
        })
        .collect();
    if slices.is_empty() {
        return None;
    }
    Some(Distribution {
        category_name: header[0].clone(),
        value_name: header[1].clone(),
        slices,
    })
}

fn monthly_production(block: &[Vec<String>]) -> Option<MonthlyProduction> {
    let header = &block[0];
    let positive = |v: Option<f64>| v.is_some_and(|x| x > 0.0);
    let rows: Vec<ProductionRow> = block[1..]
        .iter()
        .map(|row| ProductionRow {
            period: row[0].clone(),
            series_a: coerce_number(&row[1]),
            series_b: coerce_number(&row[2]),
        })
        .filter(|r| positive(r.series_a) || positive(r.series_b))
        .collect();
    if rows.is_empty() {
        return None;
    }
    Some(MonthlyProduction {
        period_name: header[0].clone(),
        series_a_name: header[1].clone(),
        series_b_name: header[2].clone(),
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Place `value` at an A1 cell of a growing grid.
    fn put(grid: &mut Grid, cell: &str, value: &str) {
        let r = CellRange::parse(cell).unwrap();
        while grid.cells.len() <= r.first_row {
            grid.cells.push(Vec::new());
        }
        let row = &mut grid.cells[r.first_row];
        if row.len() <= r.first_col {
            row.resize(r.first_col + 1, String::new());
        }
        row[r.first_col] = value.to_string();
    }

    fn sample_grid() -> Grid {
        let mut g = Grid::default();
        // Progress W1:Z2
        for (cell, v) in [
            ("W1", "Assembled"),
            ("X1", "Tested"),
            ("Y1", "Shipped"),
            ("Z1", "Total PWA"),
            ("W2", "40"),
            ("X2", "25"),
            ("Y2", "10"),
            ("Z2", "120"),
        ] {
            put(&mut g, cell, v);
        }
        // Extra scorecards AA2:AB4 (third row blank)
        for (cell, v) in [("AA2", "Spare PWA"), ("AB2", "14"), ("AA3", "Faulty PWA"), ("AB3", "n/a")] {
            put(&mut g, cell, v);
        }
        // Primary scorecard X8:Y8
        put(&mut g, "X8", "PWA Inventory");
        put(&mut g, "Y8", "312");
        // Distribution W9:X13
        for (cell, v) in [
            ("W9", "Stage "),
            ("X9", "Units"),
            ("W10", "Stage A"),
            ("X10", "30"),
            ("W11", "Stage B"),
            ("X11", "10"),
            ("W12", "Stage C"),
            ("X12", "oops"),
        ] {
            put(&mut g, cell, v);
        }
        // Production X15:Z27
        for (cell, v) in [
            ("X15", "Month"),
            ("Y15", "Batch 2"),
            ("Z15", "Batch 3"),
            ("X16", "Jan"),
            ("Y16", "5"),
            ("Z16", "0"),
            ("X17", "Feb"),
            ("Y17", "0"),
            ("Z17", "0"),
            ("X18", "Mar"),
            ("Y18", ""),
            ("Z18", "7"),
        ] {
            put(&mut g, cell, v);
        }
        g
    }

    #[test]
    fn test_build_all_figures() {
        let (fig, warnings) = build_figures(&sample_grid(), &ReportLayout::default());
        assert!(warnings.is_empty(), "unexpected warnings: {warnings:?}");

        assert_eq!(
            fig.primary_scorecard,
            Some(Scorecard {
                label: "PWA Inventory".to_string(),
                value: Some(312)
            })
        );

        assert_eq!(fig.extra_scorecards.len(), 2);
        assert_eq!(fig.extra_scorecards[1].value, None);

        let progress = fig.progress.unwrap();
        assert_eq!(progress.axis_max, 120.0);
        assert_eq!(
            progress.segments,
            vec![
                ("Assembled".to_string(), 40.0),
                ("Tested".to_string(), 25.0),
                ("Shipped".to_string(), 10.0),
            ]
        );

        let dist = fig.distribution.unwrap();
        assert_eq!(dist.category_name, "Stage");
        assert_eq!(dist.slices.len(), 3);
        assert_eq!(dist.percentages(), vec![Some(75.0), Some(25.0), None]);
        assert_eq!(dist.max_value(), 30.0);

        let prod = fig.production.unwrap();
        assert_eq!(prod.series_b_name, "Batch 3");
        let periods: Vec<_> = prod.rows.iter().map(|r| r.period.as_str()).collect();
        assert_eq!(periods, vec!["Jan", "Mar"]);
        assert_eq!(prod.rows[1].total(), 7.0);
        assert_eq!(prod.stacked_lines(), vec![(5.0, 5.0), (0.0, 7.0)]);
        assert_eq!(prod.max_total(), 7.0);
    }

    #[test]
    fn test_progress_axis_falls_back_to_one() {
        let mut g = Grid::default();
        for (cell, v) in [("A1", "Done"), ("B1", "Total"), ("A2", "3"), ("B2", "0")] {
            put(&mut g, cell, v);
        }
        let layout = ReportLayout {
            progress: "A1:B2".to_string(),
            ..Default::default()
        };
        let (fig, _) = build_figures(&g, &layout);
        let progress = fig.progress.unwrap();
        assert_eq!(progress.axis_max, 1.0);
        assert_eq!(progress.segments, vec![("Done".to_string(), 3.0)]);
    }

    #[test]
    fn test_empty_sheet_yields_no_figures() {
        let (fig, warnings) = build_figures(&Grid::default(), &ReportLayout::default());
        assert!(warnings.is_empty());
        assert_eq!(fig, DashboardFigures::default());
    }

    #[test]
    fn test_whole_sheet_range_reads_only_stored_rows() {
        let layout = ReportLayout {
            production: "X15:XFD1048576".to_string(),
            ..Default::default()
        };
        let (fig, warnings) = build_figures(&sample_grid(), &layout);
        assert!(warnings.is_empty());
        let prod = fig.production.unwrap();
        let periods: Vec<_> = prod.rows.iter().map(|r| r.period.as_str()).collect();
        assert_eq!(periods, vec!["Jan", "Mar"]);
    }

    #[test]
    fn test_bad_layout_produces_warnings_not_errors() {
        let layout = ReportLayout {
            primary_scorecard: "nonsense".to_string(),
            production: "X15:Y27".to_string(),
            ..Default::default()
        };
        let (fig, warnings) = build_figures(&sample_grid(), &layout);
        assert_eq!(warnings.len(), 2);
        assert!(fig.primary_scorecard.is_none());
        assert!(fig.production.is_none());
        assert!(fig.distribution.is_some());
    }
}

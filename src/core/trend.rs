// LineDash - core/trend.rs
//
// Device-assembly trend: quick-range resolution, validation, and per-day
// unit counts for one device type.
//
// Pure over its inputs plus an injected `Clock`. Malformed rows are dropped
// during normalisation and never surface as errors; only the caller's
// parameters can fail validation.

use crate::core::model::{AssemblyRecord, DateRange, RangeMode, RawRecord, TrendPoint, TrendQuery, TrendSeries};
use crate::util::error::TrendError;
use chrono::{Datelike, Duration, Local, NaiveDate};
use std::collections::BTreeMap;

// =============================================================================
// Clock
// =============================================================================

/// Supplies "today" for quick-range resolution.
pub trait Clock {
    fn today(&self) -> NaiveDate;
}

/// Local wall-clock date.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// A clock pinned to one date.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

// =============================================================================
// Range resolution
// =============================================================================

/// Resolve a quick-range mode to a concrete, validated range.
///
/// Derived modes end today and are valid by construction. `Custom` uses the
/// supplied range verbatim and fails with `InvalidRange` when reversed.
pub fn resolve_range(
    mode: RangeMode,
    custom: Option<DateRange>,
    today: NaiveDate,
) -> Result<DateRange, TrendError> {
    let range = match mode {
        RangeMode::ThisWeek => {
            let back = i64::from(today.weekday().num_days_from_monday());
            DateRange::new(today - Duration::days(back), today)
        }
        RangeMode::ThisMonth => DateRange::new(today.with_day(1).unwrap_or(today), today),
        RangeMode::ThisQuarter => {
            let first_month = ((today.month() - 1) / 3) * 3 + 1;
            let start = NaiveDate::from_ymd_opt(today.year(), first_month, 1).unwrap_or(today);
            DateRange::new(start, today)
        }
        RangeMode::Custom => custom.ok_or(TrendError::MissingCustomRange)?,
    };

    if !range.is_valid() {
        return Err(TrendError::InvalidRange {
            start: range.start,
            end: range.end,
        });
    }
    Ok(range)
}

/// Normalise raw rows, dropping any that fail date parsing or lack a type.
pub fn normalize_records(records: &[RawRecord]) -> Vec<AssemblyRecord> {
    let normalized: Vec<AssemblyRecord> = records.iter().filter_map(RawRecord::normalize).collect();
    let dropped = records.len() - normalized.len();
    if dropped > 0 {
        tracing::debug!(
            dropped,
            kept = normalized.len(),
            "Dropped assembly rows with unparseable date or blank device type"
        );
    }
    normalized
}

/// Distinct device types in first-seen order.
pub fn observed_device_types(records: &[AssemblyRecord]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for record in records {
        if !seen.iter().any(|t| t == &record.device_type) {
            seen.push(record.device_type.clone());
        }
    }
    seen
}

// =============================================================================
// TrendAggregator
// =============================================================================

/// Produces the per-day unit-count series behind the trend chart.
#[derive(Debug, Clone, Default)]
pub struct TrendAggregator<C: Clock = SystemClock> {
    clock: C,
}

impl<C: Clock> TrendAggregator<C> {
    pub fn new(clock: C) -> Self {
        Self { clock }
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Resolve `query`'s range mode against this aggregator's clock.
    pub fn resolve_range(&self, query: &TrendQuery) -> Result<DateRange, TrendError> {
        resolve_range(query.range_mode, query.custom_range, self.clock.today())
    }

    /// Aggregate raw rows into the trend series for `query`.
    ///
    /// Validation (device type, then range) happens before any counting.
    pub fn aggregate(
        &self,
        records: &[RawRecord],
        query: &TrendQuery,
    ) -> Result<TrendSeries, TrendError> {
        let normalized = normalize_records(records);
        self.aggregate_normalized(&normalized, query)
    }

    /// As `aggregate`, over rows that have already been normalised.
    pub fn aggregate_normalized(
        &self,
        records: &[AssemblyRecord],
        query: &TrendQuery,
    ) -> Result<TrendSeries, TrendError> {
        let selected = query.device_type.as_str();
        if selected.is_empty() || !records.iter().any(|r| r.device_type == selected) {
            return Err(TrendError::InvalidSelection {
                device_type: query.device_type.clone(),
            });
        }

        let range = self.resolve_range(query)?;

        let mut per_day: BTreeMap<NaiveDate, u32> = BTreeMap::new();
        for record in records
            .iter()
            .filter(|r| r.device_type == selected && range.contains(r.assembly_date))
        {
            *per_day.entry(record.assembly_date).or_insert(0) += 1;
        }

        // BTreeMap iteration is ascending by date; groups exist only for
        // present rows, so the count filter never removes anything.
        let points: Vec<TrendPoint> = per_day
            .into_iter()
            .filter(|&(_, count)| count > 0)
            .map(|(date, count)| TrendPoint { date, count })
            .collect();

        tracing::debug!(
            device_type = selected,
            start = %range.start,
            end = %range.end,
            days = points.len(),
            "Trend aggregated"
        );

        Ok(TrendSeries {
            device_type: query.device_type.clone(),
            range,
            points,
        })
    }
}

// LineDash - app/state.rs
//
// Application state management. Holds the login session, the fetched
// sheets and what was derived from them, the trend selection, and the
// current trend result.
// Owned by the eframe::App implementation.

use crate::app::fetch::{FetchProgress, SheetKind};
use crate::app::session::{SessionData, SESSION_VERSION};
use crate::core::auth::{AuthSession, LoginGate};
use crate::core::model::{AssemblyRecord, DateRange, RangeMode, RecordSchema, TrendQuery, TrendSeries};
use crate::core::report::{build_figures, DashboardFigures, ReportLayout};
use crate::core::table::{Grid, Table};
use crate::core::trend::{normalize_records, observed_device_types, Clock, SystemClock, TrendAggregator};
use crate::util::constants;
use crate::util::error::TrendError;
use chrono::{DateTime, Duration, Local, NaiveDate};

/// Top-level application state.
#[derive(Debug)]
pub struct DashboardState<C: Clock = SystemClock> {
    // -- Login --
    pub gate: LoginGate,
    /// `None` until the gate admits the user.
    pub session: Option<AuthSession>,
    pub login_username: String,
    pub login_password: String,
    pub login_error: Option<String>,

    // -- Sheet layout --
    pub schema: RecordSchema,
    pub layout: ReportLayout,
    pub preview_rows: usize,

    // -- Records sheet --
    pub records: Option<Table>,
    pub assembly: Vec<AssemblyRecord>,
    /// Distinct device types in first-seen order.
    pub device_types: Vec<String>,
    pub records_error: Option<String>,

    // -- Report sheet --
    pub figures: Option<DashboardFigures>,
    pub report_error: Option<String>,

    // -- Trend selection --
    pub selected_device: Option<String>,
    pub range_mode: RangeMode,
    /// From/To text as typed, `YYYY-MM-DD`.
    pub custom_from: String,
    pub custom_to: String,
    /// Set when From/To text does not parse.
    pub input_error: Option<String>,
    pub trend: Option<Result<TrendSeries, TrendError>>,

    // -- Fetch / status --
    pub fetch_in_progress: bool,
    pub last_fetch: Option<DateTime<Local>>,
    pub status_message: String,
    /// Non-fatal warnings from fetch and figure extraction.
    pub warnings: Vec<String>,
    pub debug_mode: bool,

    // -- Dialogs --
    pub show_about: bool,
    pub show_warnings: bool,

    aggregator: TrendAggregator<C>,
}

impl<C: Clock> DashboardState<C> {
    pub fn new(
        gate: LoginGate,
        schema: RecordSchema,
        layout: ReportLayout,
        preview_rows: usize,
        clock: C,
        debug_mode: bool,
    ) -> Self {
        let aggregator = TrendAggregator::new(clock);
        let today = aggregator.today();
        let from = today - Duration::days(constants::DEFAULT_CUSTOM_RANGE_DAYS);
        let session = gate.anonymous_session();

        Self {
            gate,
            session,
            login_username: String::new(),
            login_password: String::new(),
            login_error: None,
            schema,
            layout,
            preview_rows,
            records: None,
            assembly: Vec::new(),
            device_types: Vec::new(),
            records_error: None,
            figures: None,
            report_error: None,
            selected_device: None,
            range_mode: RangeMode::Custom,
            custom_from: format_date(from),
            custom_to: format_date(today),
            input_error: None,
            trend: None,
            fetch_in_progress: false,
            last_fetch: None,
            status_message: "Ready.".to_string(),
            warnings: Vec::new(),
            debug_mode,
            show_about: false,
            show_warnings: false,
            aggregator,
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.aggregator.today()
    }

    // -------------------------------------------------------------------------
    // Login
    // -------------------------------------------------------------------------

    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    /// Check the typed credentials. The password field is cleared either way.
    pub fn attempt_login(&mut self) -> bool {
        let password = std::mem::take(&mut self.login_password);
        match self.gate.login(&self.login_username, &password) {
            Ok(session) => {
                self.status_message = format!("Signed in as {}.", session.username);
                self.session = Some(session);
                self.login_error = None;
                true
            }
            Err(e) => {
                self.login_error = Some(e.to_string());
                false
            }
        }
    }

    pub fn logout(&mut self) {
        if let Some(session) = self.session.take() {
            tracing::info!(user = %session.username, "Signed out");
        }
        self.session = self.gate.anonymous_session();
        self.login_password.clear();
    }

    // -------------------------------------------------------------------------
    // Fetch results
    // -------------------------------------------------------------------------

    /// Fold one fetch progress message into the state.
    pub fn apply_progress(&mut self, msg: FetchProgress) {
        match msg {
            FetchProgress::Started { source } => {
                self.fetch_in_progress = true;
                self.status_message = format!("Loading from {source}...");
            }
            FetchProgress::RecordsLoaded { table } => self.apply_records(table),
            FetchProgress::ReportLoaded { grid } => self.apply_report(&grid),
            FetchProgress::Warning { message } => self.push_warning(message),
            FetchProgress::Failed { kind, sheet, error } => {
                tracing::debug!(sheet = %sheet, "Worksheet failure applied");
                match kind {
                    SheetKind::Records => {
                        self.records_error = Some(error.clone());
                        self.recompute_trend();
                    }
                    SheetKind::Report => self.report_error = Some(error.clone()),
                }
                self.push_warning(error);
            }
            FetchProgress::Completed {
                records_ok,
                report_ok,
                elapsed,
            } => {
                self.fetch_in_progress = false;
                self.last_fetch = Some(Local::now());
                self.status_message = match (records_ok, report_ok) {
                    (true, true) => format!("Loaded in {:.1}s.", elapsed.as_secs_f64()),
                    (false, false) => "Failed to load data.".to_string(),
                    _ => "Loaded with errors; see warnings.".to_string(),
                };
            }
            FetchProgress::Cancelled => {
                self.fetch_in_progress = false;
                self.status_message = "Load cancelled.".to_string();
            }
        }
    }

    /// Replace the records sheet and everything derived from it.
    pub fn apply_records(&mut self, table: Table) {
        let missing = self.schema.missing_columns(&table);
        if !missing.is_empty() {
            let msg = format!("Failed to load data: missing column(s) {}", missing.join(", "));
            tracing::warn!(missing = ?missing, "Records sheet lacks required columns");
            self.records_error = Some(msg);
            self.records = Some(table);
            self.assembly.clear();
            self.device_types.clear();
            self.recompute_trend();
            return;
        }

        let raw = self.schema.extract(&table);
        self.assembly = normalize_records(&raw);
        self.device_types = observed_device_types(&self.assembly);
        self.records = Some(table);
        self.records_error = None;

        let keep = self
            .selected_device
            .as_ref()
            .is_some_and(|d| self.device_types.contains(d));
        if !keep {
            self.selected_device = self.device_types.first().cloned();
        }

        tracing::info!(
            rows = raw.len(),
            usable = self.assembly.len(),
            device_types = self.device_types.len(),
            "Records applied"
        );
        self.recompute_trend();
    }

    /// Rebuild the dashboard figures from the report sheet.
    pub fn apply_report(&mut self, grid: &Grid) {
        let (figures, warnings) = build_figures(grid, &self.layout);
        for w in warnings {
            self.push_warning(w);
        }
        self.figures = Some(figures);
        self.report_error = None;
    }

    pub fn push_warning(&mut self, message: String) {
        if self.warnings.len() >= constants::MAX_WARNINGS {
            self.warnings.remove(0);
        }
        self.warnings.push(message);
    }

    // -------------------------------------------------------------------------
    // Trend
    // -------------------------------------------------------------------------

    /// Parse the From/To text. `Ok(None)` when either field is blank.
    pub fn custom_range(&self) -> Result<Option<DateRange>, String> {
        let from = self.custom_from.trim();
        let to = self.custom_to.trim();
        if from.is_empty() || to.is_empty() {
            return Ok(None);
        }
        let parse = |label: &str, text: &str| {
            NaiveDate::parse_from_str(text, constants::DATE_DISPLAY_FORMAT)
                .map_err(|_| format!("{label} date '{text}' is not in YYYY-MM-DD format"))
        };
        Ok(Some(DateRange::new(parse("From", from)?, parse("To", to)?)))
    }

    /// The query the current selection describes.
    pub fn query(&self) -> Result<TrendQuery, String> {
        let custom_range = match self.range_mode {
            RangeMode::Custom => self.custom_range()?,
            _ => None,
        };
        Ok(TrendQuery {
            device_type: self.selected_device.clone().unwrap_or_default(),
            range_mode: self.range_mode,
            custom_range,
        })
    }

    /// Recompute the trend series after any selection or data change.
    pub fn recompute_trend(&mut self) {
        if self.records.is_none() || self.records_error.is_some() {
            self.trend = None;
            self.input_error = None;
            return;
        }

        match self.query() {
            Ok(query) => {
                self.input_error = None;
                self.trend = Some(self.aggregator.aggregate_normalized(&self.assembly, &query));
            }
            Err(msg) => {
                self.input_error = Some(msg);
                self.trend = None;
            }
        }
    }

    /// The range the current selection resolves to, for display.
    pub fn resolved_range(&self) -> Option<DateRange> {
        let query = self.query().ok()?;
        self.aggregator.resolve_range(&query).ok()
    }

    /// The current series, if the last recompute succeeded.
    pub fn series(&self) -> Option<&TrendSeries> {
        self.trend.as_ref().and_then(|r| r.as_ref().ok())
    }

    // -------------------------------------------------------------------------
    // Session
    // -------------------------------------------------------------------------

    pub fn session_data(&self) -> SessionData {
        SessionData {
            version: SESSION_VERSION,
            device_type: self.selected_device.clone(),
            range_mode: self.range_mode,
            custom_from: self.custom_from.clone(),
            custom_to: self.custom_to.clone(),
        }
    }

    /// Restore a saved selection. A device type absent from the current
    /// records is kept until records arrive, then replaced if still absent.
    pub fn restore_session(&mut self, data: SessionData) {
        self.selected_device = data.device_type;
        self.range_mode = data.range_mode;
        if !data.custom_from.trim().is_empty() {
            self.custom_from = data.custom_from;
        }
        if !data.custom_to.trim().is_empty() {
            self.custom_to = data.custom_to;
        }
        self.recompute_trend();
    }
}

fn format_date(date: NaiveDate) -> String {
    date.format(constants::DATE_DISPLAY_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::auth::Credentials;
    use crate::core::trend::FixedClock;

    const RECORDS: &str = "\
Date of Assambly,Device Type,PWA No
2024-03-01,TypeA,U1
2024-03-01,TypeA,U2
2024-03-03,TypeB,U3
2024-03-05,TypeA,U4
not a date,TypeC,U5
";

    fn d(m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, day).unwrap()
    }

    fn state() -> DashboardState<FixedClock> {
        DashboardState::new(
            LoginGate::open(),
            RecordSchema::default(),
            ReportLayout::default(),
            constants::DEFAULT_PREVIEW_ROWS,
            FixedClock(d(3, 6)),
            false,
        )
    }

    fn loaded() -> DashboardState<FixedClock> {
        let mut s = state();
        s.apply_records(Table::from_csv(RECORDS).unwrap());
        s
    }

    #[test]
    fn test_default_custom_range_is_last_thirty_days() {
        let s = state();
        assert_eq!(s.custom_from, "2024-02-05");
        assert_eq!(s.custom_to, "2024-03-06");
        assert!(s.is_authenticated());
    }

    #[test]
    fn test_records_select_first_device_and_compute_trend() {
        let s = loaded();
        assert_eq!(s.device_types, vec!["TypeA", "TypeB"]);
        assert_eq!(s.selected_device.as_deref(), Some("TypeA"));
        let series = s.series().unwrap();
        assert_eq!(series.points.len(), 2);
        assert_eq!(series.points[0].count, 2);
        assert_eq!(series.total_units(), 3);
    }

    #[test]
    fn test_selection_survives_refetch_when_still_present() {
        let mut s = loaded();
        s.selected_device = Some("TypeB".to_string());
        s.apply_records(Table::from_csv(RECORDS).unwrap());
        assert_eq!(s.selected_device.as_deref(), Some("TypeB"));
    }

    #[test]
    fn test_invalid_range_is_reported() {
        let mut s = loaded();
        s.custom_from = "2024-03-05".to_string();
        s.custom_to = "2024-03-01".to_string();
        s.recompute_trend();
        assert!(matches!(s.trend, Some(Err(TrendError::InvalidRange { .. }))));
    }

    #[test]
    fn test_unparseable_date_text_sets_input_error() {
        let mut s = loaded();
        s.custom_from = "03/01/2024".to_string();
        s.recompute_trend();
        assert!(s.input_error.is_some());
        assert!(s.trend.is_none());

        // Quick ranges ignore the custom text.
        s.range_mode = RangeMode::ThisWeek;
        s.recompute_trend();
        assert!(s.input_error.is_none());
        assert_eq!(s.resolved_range(), Some(DateRange::new(d(3, 4), d(3, 6))));
        assert_eq!(s.series().unwrap().total_units(), 1);
    }

    #[test]
    fn test_blank_custom_text_is_missing_range() {
        let mut s = loaded();
        s.custom_to.clear();
        s.recompute_trend();
        assert_eq!(s.trend, Some(Err(TrendError::MissingCustomRange)));
    }

    #[test]
    fn test_missing_columns_block_trend() {
        let mut s = state();
        s.apply_records(Table::from_csv("Date,Type\n2024-03-01,TypeA\n").unwrap());
        assert!(s.records_error.as_deref().unwrap().contains("Date of Assambly"));
        assert!(s.device_types.is_empty());
        assert!(s.trend.is_none());
    }

    #[test]
    fn test_login_flow() {
        let mut s = state();
        s.gate = LoginGate::new(Credentials {
            username: "lead".to_string(),
            password: "pw".to_string(),
        });
        s.session = None;

        s.login_username = "lead".to_string();
        s.login_password = "wrong".to_string();
        assert!(!s.attempt_login());
        assert!(s.login_error.is_some());
        assert!(s.login_password.is_empty());

        s.login_password = "pw".to_string();
        assert!(s.attempt_login());
        assert!(s.is_authenticated());

        s.logout();
        assert!(!s.is_authenticated());
    }

    #[test]
    fn test_session_round_trip_through_state() {
        let mut s = loaded();
        s.selected_device = Some("TypeB".to_string());
        s.range_mode = RangeMode::ThisMonth;
        let data = s.session_data();

        let mut restored = state();
        restored.restore_session(data);
        restored.apply_records(Table::from_csv(RECORDS).unwrap());
        assert_eq!(restored.selected_device.as_deref(), Some("TypeB"));
        assert_eq!(restored.range_mode, RangeMode::ThisMonth);
        assert_eq!(restored.series().unwrap().total_units(), 1);
    }

    #[test]
    fn test_warnings_are_capped() {
        let mut s = state();
        for i in 0..constants::MAX_WARNINGS + 5 {
            s.push_warning(format!("w{i}"));
        }
        assert_eq!(s.warnings.len(), constants::MAX_WARNINGS);
        assert_eq!(s.warnings[0], "w5");
    }
}

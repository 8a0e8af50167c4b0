// LineDash - platform/config.rs
//
// Platform-specific configuration, data directory resolution, and config.toml
// loading with startup validation.
//
// Uses the `directories` crate for XDG (Linux), AppData (Windows),
// Library (macOS) compliance.

use crate::core::auth::Credentials;
use crate::core::model::RecordSchema;
use crate::core::report::ReportLayout;
use crate::core::table::CellRange;
use crate::util::constants;
use crate::util::error::ConfigError;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Resolved platform paths for LineDash data and configuration.
#[derive(Debug, Clone)]
pub struct PlatformPaths {
    /// Configuration directory (e.g. ~/.config/linedash/ or %APPDATA%\LineDash\config\)
    pub config_dir: PathBuf,

    /// Data directory for the persisted view session.
    pub data_dir: PathBuf,
}

impl PlatformPaths {
    /// Resolve platform-appropriate paths.
    ///
    /// Falls back to current directory if platform dirs cannot be determined.
    pub fn resolve() -> Self {
        if let Some(proj_dirs) = ProjectDirs::from("", "", constants::APP_ID) {
            let config_dir = proj_dirs.config_dir().to_path_buf();
            let data_dir = proj_dirs.data_dir().to_path_buf();

            tracing::debug!(
                config = %config_dir.display(),
                data = %data_dir.display(),
                "Platform paths resolved"
            );

            Self {
                config_dir,
                data_dir,
            }
        } else {
            tracing::warn!("Could not determine platform directories, using current directory");
            let fallback = PathBuf::from(".");
            Self {
                config_dir: fallback.clone(),
                data_dir: fallback,
            }
        }
    }

    /// Default location of config.toml.
    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(constants::CONFIG_FILE_NAME)
    }
}

// =============================================================================
// config.toml loading and validation
// =============================================================================

/// Raw deserialisable shape of config.toml.
///
/// Unknown keys are silently ignored for forward compatibility.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct RawConfig {
    pub source: SourceSection,
    pub records: RecordsSection,
    pub report: ReportSection,
    pub ui: UiSection,
    pub auth: AuthSection,
    pub logging: LoggingSection,
}

/// `[source]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct SourceSection {
    /// "csv_dir" or "sheets".
    pub kind: Option<String>,
    /// Directory of `<sheet>.csv` files (csv_dir).
    pub path: Option<String>,
    /// Spreadsheet URL or ID (sheets).
    pub spreadsheet: Option<String>,
    /// Worksheet with one row per assembled unit.
    pub records_sheet: Option<String>,
    /// Worksheet with the published figures.
    pub report_sheet: Option<String>,
    /// Snapshot staleness window in seconds.
    pub ttl_seconds: Option<u64>,
}

/// `[records]` config section: column headers of the records sheet.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct RecordsSection {
    pub date_column: Option<String>,
    pub device_type_column: Option<String>,
    pub unit_id_column: Option<String>,
}

/// `[report]` config section: A1 ranges of each figure.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct ReportSection {
    pub primary_scorecard: Option<String>,
    pub extra_scorecards: Option<String>,
    pub progress: Option<String>,
    pub distribution: Option<String>,
    pub production: Option<String>,
}

/// `[ui]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct UiSection {
    /// Theme: "dark" or "light".
    pub theme: Option<String>,
    /// Rows shown in the inventory overview table.
    pub preview_rows: Option<usize>,
}

/// `[auth]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct AuthSection {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// `[logging]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub level: Option<String>,
}

/// Where sheet data comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceKind {
    /// A directory holding `<sheet>.csv` exports.
    CsvDir(PathBuf),
    /// A shared spreadsheet, by URL or ID.
    Sheets(String),
}

/// Validated application configuration derived from `config.toml`.
///
/// Invalid values produce actionable warnings and fall back to defaults.
#[derive(Debug, Clone)]
pub struct AppConfig {
    // -- Source --
    /// `None` until a source is configured or given on the command line.
    pub source: Option<SourceKind>,
    pub records_sheet: String,
    pub report_sheet: String,
    pub cache_ttl_secs: u64,

    // -- Schema --
    pub schema: RecordSchema,
    pub layout: ReportLayout,

    // -- UI --
    /// Dark mode (true) or light mode (false).
    pub dark_mode: bool,
    pub preview_rows: usize,

    // -- Auth --
    pub credentials: Option<Credentials>,

    // -- Logging --
    /// Logging level string (for init before tracing is available).
    pub log_level: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            source: None,
            records_sheet: constants::DEFAULT_RECORDS_SHEET.to_string(),
            report_sheet: constants::DEFAULT_REPORT_SHEET.to_string(),
            cache_ttl_secs: constants::DEFAULT_CACHE_TTL_SECS,
            schema: RecordSchema::default(),
            layout: ReportLayout::default(),
            dark_mode: true,
            preview_rows: constants::DEFAULT_PREVIEW_ROWS,
            credentials: None,
            log_level: None,
        }
    }
}

fn read_raw(config_path: &Path) -> Result<RawConfig, ConfigError> {
    let content = std::fs::read_to_string(config_path).map_err(|e| ConfigError::Io {
        path: config_path.to_path_buf(),
        source: e,
    })?;
    toml::from_str(&content).map_err(|e| ConfigError::TomlParse {
        path: config_path.to_path_buf(),
        source: e,
    })
}

/// Load and validate the config file at `config_path`.
///
/// Returns `AppConfig` with validated values and a list of non-fatal warnings.
/// If the file does not exist, returns defaults with no warnings (first run).
/// If the file is unparseable, returns defaults with a warning so the
/// application still starts and the user is informed.
pub fn load_config(config_path: &Path) -> (AppConfig, Vec<String>) {
    let mut warnings: Vec<String> = Vec::new();

    if !config_path.exists() {
        tracing::debug!(path = %config_path.display(), "No config.toml found; using defaults");
        return (AppConfig::default(), warnings);
    }

    let raw = match read_raw(config_path) {
        Ok(r) => r,
        Err(e) => {
            let msg = format!("{e}. Using defaults.");
            tracing::warn!("{}", msg);
            warnings.push(msg);
            return (AppConfig::default(), warnings);
        }
    };

    tracing::info!(path = %config_path.display(), "Loaded config.toml");

    let config = validate(raw, &mut warnings);

    if !warnings.is_empty() {
        tracing::warn!(
            count = warnings.len(),
            "Config validation produced warnings"
        );
    }

    (config, warnings)
}

/// Validate each field of `raw` against named constants, accumulating all
/// problems into `warnings`.
pub fn validate(raw: RawConfig, warnings: &mut Vec<String>) -> AppConfig {
    let mut config = AppConfig::default();

    // -- Source: kind + location --
    let kind = raw.source.kind.as_deref().map(str::to_lowercase);
    match kind.as_deref() {
        None => {}
        Some("csv_dir") => match non_blank(raw.source.path) {
            Some(path) => config.source = Some(SourceKind::CsvDir(PathBuf::from(path))),
            None => warnings.push(
                "[source] kind = \"csv_dir\" requires path = \"<directory>\". No source configured."
                    .to_string(),
            ),
        },
        Some("sheets") => match non_blank(raw.source.spreadsheet) {
            Some(sheet) => config.source = Some(SourceKind::Sheets(sheet)),
            None => warnings.push(
                "[source] kind = \"sheets\" requires spreadsheet = \"<url or id>\". No source configured."
                    .to_string(),
            ),
        },
        Some(other) => warnings.push(format!(
            "[source] kind = \"{other}\" is not recognised. Expected \"csv_dir\" or \"sheets\"."
        )),
    }

    if let Some(name) = non_blank(raw.source.records_sheet) {
        config.records_sheet = name;
    }
    if let Some(name) = non_blank(raw.source.report_sheet) {
        config.report_sheet = name;
    }

    // -- Source: ttl_seconds --
    if let Some(ttl) = raw.source.ttl_seconds {
        if (constants::MIN_CACHE_TTL_SECS..=constants::MAX_CACHE_TTL_SECS).contains(&ttl) {
            config.cache_ttl_secs = ttl;
        } else {
            warnings.push(format!(
                "[source] ttl_seconds = {ttl} is out of range ({}-{}). Using default ({}).",
                constants::MIN_CACHE_TTL_SECS,
                constants::MAX_CACHE_TTL_SECS,
                constants::DEFAULT_CACHE_TTL_SECS,
            ));
        }
    }

    // -- Records: column names --
    if let Some(col) = non_blank(raw.records.date_column) {
        config.schema.date_column = col;
    }
    if let Some(col) = non_blank(raw.records.device_type_column) {
        config.schema.device_type_column = col;
    }
    if let Some(col) = non_blank(raw.records.unit_id_column) {
        config.schema.unit_id_column = col;
    }

    // -- Report: ranges --
    let ranges = [
        ("primary_scorecard", raw.report.primary_scorecard, &mut config.layout.primary_scorecard),
        ("extra_scorecards", raw.report.extra_scorecards, &mut config.layout.extra_scorecards),
        ("progress", raw.report.progress, &mut config.layout.progress),
        ("distribution", raw.report.distribution, &mut config.layout.distribution),
        ("production", raw.report.production, &mut config.layout.production),
    ];
    for (name, value, slot) in ranges {
        let Some(reference) = value else { continue };
        match CellRange::parse(&reference) {
            Ok(range) if range.rows().saturating_mul(range.cols()) > constants::MAX_REPORT_RANGE_CELLS => {
                warnings.push(format!(
                    "[report] {name} = \"{}\" spans {} x {} cells, more than {}. Using default ({slot}).",
                    reference.trim(),
                    range.rows(),
                    range.cols(),
                    constants::MAX_REPORT_RANGE_CELLS,
                ));
            }
            Ok(_) => *slot = reference.trim().to_string(),
            Err(e) => warnings.push(format!("[report] {name}: {e}. Using default ({slot}).")),
        }
    }

    // -- UI: theme --
    if let Some(ref theme) = raw.ui.theme {
        match theme.to_lowercase().as_str() {
            "dark" => config.dark_mode = true,
            "light" => config.dark_mode = false,
            other => {
                warnings.push(format!(
                    "[ui] theme = \"{other}\" is not recognised. Expected \"dark\" or \"light\". Using default (dark).",
                ));
            }
        }
    }

    // -- UI: preview_rows --
    if let Some(rows) = raw.ui.preview_rows {
        if (constants::MIN_PREVIEW_ROWS..=constants::MAX_PREVIEW_ROWS).contains(&rows) {
            config.preview_rows = rows;
        } else {
            warnings.push(format!(
                "[ui] preview_rows = {rows} is out of range ({}-{}). Using default ({}).",
                constants::MIN_PREVIEW_ROWS,
                constants::MAX_PREVIEW_ROWS,
                constants::DEFAULT_PREVIEW_ROWS,
            ));
        }
    }

    // -- Auth --
    config.credentials = credentials_from(raw.auth.username, raw.auth.password, "[auth]", warnings);

    // -- Logging: level --
    if let Some(ref level) = raw.logging.level {
        let valid = ["error", "warn", "info", "debug", "trace"];
        if valid.contains(&level.to_lowercase().as_str()) {
            config.log_level = Some(level.clone());
        } else {
            warnings.push(format!(
                "[logging] level = \"{level}\" is not recognised. \
                 Valid values: error, warn, info, debug, trace. Using default (info).",
            ));
        }
    }

    config
}

/// Overlay credentials from the environment (`LINEDASH_USERNAME` /
/// `LINEDASH_PASSWORD`, including values loaded from `.env`).
pub fn apply_env_credentials(config: &mut AppConfig, warnings: &mut Vec<String>) {
    let user = std::env::var(constants::ENV_USERNAME).ok();
    let pass = std::env::var(constants::ENV_PASSWORD).ok();
    if user.is_none() && pass.is_none() {
        return;
    }
    if let Some(creds) = credentials_from(user, pass, "environment", warnings) {
        tracing::debug!(user = %creds.username, "Dashboard credentials taken from environment");
        config.credentials = Some(creds);
    }
}

/// Both halves present and non-blank → credentials; one half missing → warning
/// and no login gate.
fn credentials_from(
    username: Option<String>,
    password: Option<String>,
    origin: &str,
    warnings: &mut Vec<String>,
) -> Option<Credentials> {
    match (non_blank(username), password.filter(|p| !p.is_empty())) {
        (Some(username), Some(password)) => Some(Credentials { username, password }),
        (None, None) => None,
        _ => {
            warnings.push(format!(
                "{origin}: both a username and a password are required. Login is disabled."
            ));
            None
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

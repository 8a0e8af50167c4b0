// LineDash - util/error.rs
//
// Typed error hierarchy with context-preserving error chains.
// Errors are categorised by the subsystem that produced them so the UI can
// decide between "show a message and withhold the chart" and "stop loading".

use std::fmt;
use std::io;
use std::path::PathBuf;

use chrono::NaiveDate;

/// Top-level error type for all LineDash operations.
#[derive(Debug)]
pub enum LineDashError {
    /// The data source could not deliver a sheet.
    Source(SourceError),

    /// A sheet could not be interpreted as a table or grid.
    Table(TableError),

    /// Trend parameters failed validation.
    Trend(TrendError),

    /// Login failed.
    Auth(AuthError),

    /// Export operation failed.
    Export(ExportError),

    /// Configuration loading or validation failed.
    Config(ConfigError),
}

impl fmt::Display for LineDashError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Source(e) => write!(f, "Data source error: {e}"),
            Self::Table(e) => write!(f, "Table error: {e}"),
            Self::Trend(e) => write!(f, "Trend error: {e}"),
            Self::Auth(e) => write!(f, "Login error: {e}"),
            Self::Export(e) => write!(f, "Export error: {e}"),
            Self::Config(e) => write!(f, "Configuration error: {e}"),
        }
    }
}

impl std::error::Error for LineDashError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Source(e) => Some(e),
            Self::Table(e) => Some(e),
            Self::Trend(e) => Some(e),
            Self::Auth(e) => Some(e),
            Self::Export(e) => Some(e),
            Self::Config(e) => Some(e),
        }
    }
}

// ---------------------------------------------------------------------------
// Source errors
// ---------------------------------------------------------------------------

/// Errors raised while fetching a worksheet from the data source.
#[derive(Debug)]
pub enum SourceError {
    /// The worksheet file could not be read.
    Io { path: PathBuf, source: io::Error },

    /// The HTTP request failed before a response was received.
    Http {
        sheet: String,
        source: reqwest::Error,
    },

    /// The service answered with a non-success status.
    Status { sheet: String, status: u16 },

    /// The worksheet export exceeded the size limit.
    TooLarge {
        sheet: String,
        size: usize,
        max_size: usize,
    },

    /// The worksheet was delivered but contains no data.
    EmptySheet { sheet: String },

    /// The configured spreadsheet URL or ID is not usable.
    InvalidLocation { location: String },

    /// The delivered CSV could not be parsed.
    Table { sheet: String, source: TableError },
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "Cannot read worksheet '{}': {source}", path.display())
            }
            Self::Http { sheet, source } => {
                write!(f, "Request for worksheet '{sheet}' failed: {source}")
            }
            Self::Status { sheet, status } => {
                write!(f, "Request for worksheet '{sheet}' failed with status {status}")
            }
            Self::TooLarge {
                sheet,
                size,
                max_size,
            } => write!(
                f,
                "Worksheet '{sheet}' is {size} bytes, exceeds maximum of {max_size} bytes"
            ),
            Self::EmptySheet { sheet } => {
                write!(f, "Failed to load data: worksheet '{sheet}' is empty")
            }
            Self::Table { sheet, source } => {
                write!(f, "Worksheet '{sheet}' is malformed: {source}")
            }
            Self::InvalidLocation { location } => {
                write!(f, "'{location}' is not a spreadsheet URL or ID")
            }
        }
    }
}

impl std::error::Error for SourceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Http { source, .. } => Some(source),
            Self::Table { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<SourceError> for LineDashError {
    fn from(e: SourceError) -> Self {
        Self::Source(e)
    }
}

// ---------------------------------------------------------------------------
// Table errors
// ---------------------------------------------------------------------------

/// Errors related to tabular data and cell addressing.
#[derive(Debug)]
pub enum TableError {
    /// CSV text could not be decoded.
    Csv { source: csv::Error },

    /// A cell range reference is not valid A1 notation.
    InvalidRange { reference: String },
}

impl fmt::Display for TableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Csv { source } => write!(f, "CSV decode error: {source}"),
            Self::InvalidRange { reference } => {
                write!(f, "'{reference}' is not a valid cell range (expected e.g. \"X8:Y8\")")
            }
        }
    }
}

impl std::error::Error for TableError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Csv { source } => Some(source),
            Self::InvalidRange { .. } => None,
        }
    }
}

impl From<TableError> for LineDashError {
    fn from(e: TableError) -> Self {
        Self::Table(e)
    }
}

// ---------------------------------------------------------------------------
// Trend errors
// ---------------------------------------------------------------------------

/// Validation errors for the device-assembly trend. Reported before any
/// aggregation work; the caller withholds the chart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrendError {
    /// Device type is empty or not among the observed types.
    InvalidSelection { device_type: String },

    /// Resolved range has its start after its end.
    InvalidRange { start: NaiveDate, end: NaiveDate },

    /// Custom range mode was chosen without supplying a range.
    MissingCustomRange,
}

impl fmt::Display for TrendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSelection { device_type } if device_type.is_empty() => {
                write!(f, "No device type selected")
            }
            Self::InvalidSelection { device_type } => {
                write!(f, "Device type '{device_type}' is not present in the data")
            }
            Self::InvalidRange { start, end } => {
                write!(f, "Start date cannot be after end date ({start} > {end})")
            }
            Self::MissingCustomRange => write!(f, "Enter both a start and an end date"),
        }
    }
}

impl std::error::Error for TrendError {}

impl From<TrendError> for LineDashError {
    fn from(e: TrendError) -> Self {
        Self::Trend(e)
    }
}

// ---------------------------------------------------------------------------
// Auth errors
// ---------------------------------------------------------------------------

/// Errors from the dashboard login gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Username or password was left blank.
    MissingInput,

    /// Username/password pair did not match the configured credentials.
    InvalidCredentials,
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingInput => write!(f, "Enter a username and password"),
            Self::InvalidCredentials => write!(f, "Incorrect username or password"),
        }
    }
}

impl std::error::Error for AuthError {}

impl From<AuthError> for LineDashError {
    fn from(e: AuthError) -> Self {
        Self::Auth(e)
    }
}

// ---------------------------------------------------------------------------
// Export errors
// ---------------------------------------------------------------------------

/// Errors related to export operations.
#[derive(Debug)]
pub enum ExportError {
    /// I/O error writing the export file.
    Io { path: PathBuf, source: io::Error },

    /// CSV serialisation error.
    Csv { path: PathBuf, source: csv::Error },

    /// JSON serialisation error.
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "Export I/O error '{}': {source}", path.display())
            }
            Self::Csv { path, source } => {
                write!(f, "CSV export error '{}': {source}", path.display())
            }
            Self::Json { path, source } => {
                write!(f, "JSON export error '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Csv { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
        }
    }
}

impl From<ExportError> for LineDashError {
    fn from(e: ExportError) -> Self {
        Self::Export(e)
    }
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

/// Errors related to configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    /// TOML parsing failed.
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// I/O error reading config file.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TomlParse { path, source } => {
                write!(f, "Config parse error '{}': {source}", path.display())
            }
            Self::Io { path, source } => {
                write!(f, "Config I/O error '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::TomlParse { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
        }
    }
}

impl From<ConfigError> for LineDashError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

/// Convenience type alias for LineDash results.
pub type Result<T> = std::result::Result<T, LineDashError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_trend_error_messages() {
        let err = TrendError::InvalidRange {
            start: NaiveDate::from_ymd_opt(2024, 3, 10).unwrap(),
            end: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        };
        assert_eq!(
            err.to_string(),
            "Start date cannot be after end date (2024-03-10 > 2024-03-01)"
        );

        let err = TrendError::InvalidSelection {
            device_type: String::new(),
        };
        assert_eq!(err.to_string(), "No device type selected");
    }

    #[test]
    fn test_source_chain_preserved() {
        let inner = TableError::InvalidRange {
            reference: "??".to_string(),
        };
        let err: LineDashError = SourceError::Table {
            sheet: "DashBoard".to_string(),
            source: inner,
        }
        .into();
        let source = err.source().expect("top-level error must expose its cause");
        assert!(source.to_string().contains("DashBoard"));
        assert!(source.source().is_some());
    }
}

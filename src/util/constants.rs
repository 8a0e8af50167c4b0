// LineDash - util/constants.rs
//
// Single source of truth for all named constants, limits, and defaults.

// =============================================================================
// Application metadata
// =============================================================================

/// Application display name.
pub const APP_NAME: &str = "LineDash";

/// Application identifier used for config/data directories.
pub const APP_ID: &str = "LineDash";

/// Current application version.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Dashboard page title.
pub const DASHBOARD_TITLE: &str = "Device Manufacturing and Assembly Dashboard";

// =============================================================================
// Data source
// =============================================================================

/// Default staleness window for cached sheet snapshots (seconds).
pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;

/// Minimum user-configurable cache TTL (seconds). Zero disables caching.
pub const MIN_CACHE_TTL_SECS: u64 = 0;

/// Maximum user-configurable cache TTL (seconds).
pub const MAX_CACHE_TTL_SECS: u64 = 24 * 60 * 60;

/// Shortest interval between automatic reloads (seconds), regardless of TTL.
pub const MIN_REFRESH_INTERVAL_SECS: u64 = 30;

/// HTTP timeout for a single sheet export request (seconds).
pub const HTTP_TIMEOUT_SECS: u64 = 30;

/// Maximum accepted size of a single sheet export in bytes.
pub const MAX_SHEET_BYTES: usize = 32 * 1024 * 1024; // 32 MB

/// Worksheet holding one row per assembled unit.
pub const DEFAULT_RECORDS_SHEET: &str = "Sheet2";

/// Worksheet holding the published aggregate figures.
pub const DEFAULT_REPORT_SHEET: &str = "DashBoard";

/// Base URL of the shared spreadsheet service.
pub const SHEETS_BASE_URL: &str = "https://docs.google.com/spreadsheets/d";

// =============================================================================
// Record schema (column headers of the records sheet)
// =============================================================================

/// Header of the assembly date column.
pub const DEFAULT_DATE_COLUMN: &str = "Date of Assambly";

/// Header of the device type column.
pub const DEFAULT_DEVICE_TYPE_COLUMN: &str = "Device Type";

/// Header of the unit identifier column.
pub const DEFAULT_UNIT_ID_COLUMN: &str = "PWA No";

// =============================================================================
// Report layout (A1 ranges on the report sheet)
// =============================================================================

/// Primary inventory scorecard (label, value).
pub const DEFAULT_PRIMARY_SCORECARD_RANGE: &str = "X8:Y8";

/// Additional inventory scorecards, one (label, value) pair per row.
pub const DEFAULT_EXTRA_SCORECARDS_RANGE: &str = "AA2:AB4";

/// Inventory progress bar: labels row then values row.
pub const DEFAULT_PROGRESS_RANGE: &str = "W1:Z2";

/// Batch distribution table (header row first).
pub const DEFAULT_DISTRIBUTION_RANGE: &str = "W9:X13";

/// Monthly production table (header row first, three columns).
pub const DEFAULT_PRODUCTION_RANGE: &str = "X15:Z27";

/// Maximum number of additional scorecards displayed next to the primary one.
pub const MAX_EXTRA_SCORECARDS: usize = 3;

/// Number of stacked segments drawn in the inventory progress bar.
pub const PROGRESS_SEGMENTS: usize = 3;

/// Maximum number of columns addressable by a cell reference (`XFD`).
pub const MAX_SHEET_COLUMNS: usize = 16_384;

/// Maximum number of rows addressable by a cell reference.
pub const MAX_SHEET_ROWS: usize = 1_048_576;

/// Largest block (rows x columns) a `[report]` range may name.
pub const MAX_REPORT_RANGE_CELLS: usize = 10_000;

// =============================================================================
// Trend view
// =============================================================================

/// Length of the default custom range, ending today (days).
pub const DEFAULT_CUSTOM_RANGE_DAYS: i64 = 30;

/// Display format for dates in inputs, axes and exports.
pub const DATE_DISPLAY_FORMAT: &str = "%Y-%m-%d";

// =============================================================================
// UI defaults
// =============================================================================

/// Default number of rows shown in the inventory overview table.
pub const DEFAULT_PREVIEW_ROWS: usize = 50;

/// Minimum user-configurable preview row count.
pub const MIN_PREVIEW_ROWS: usize = 1;

/// Maximum user-configurable preview row count.
pub const MAX_PREVIEW_ROWS: usize = 5_000;

/// Maximum number of non-fatal warnings kept in the status area.
pub const MAX_WARNINGS: usize = 200;

/// Maximum number of fetch messages processed per UI frame.
pub const MAX_FETCH_MESSAGES_PER_FRAME: usize = 50;

// =============================================================================
// Logging
// =============================================================================

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

// =============================================================================
// Authentication
// =============================================================================

/// Environment variable holding the dashboard username.
pub const ENV_USERNAME: &str = "LINEDASH_USERNAME";

/// Environment variable holding the dashboard password.
pub const ENV_PASSWORD: &str = "LINEDASH_PASSWORD";

// =============================================================================
// Files
// =============================================================================

/// Configuration file name.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// View-session persistence file name (stored in the platform data directory).
pub const SESSION_FILE_NAME: &str = "session.json";

// LineDash - app/source.rs
//
// Worksheet sources. A source hands back the CSV text of a named worksheet;
// the trait's provided methods turn that text into a `Table` or `Grid`.
//
//   - `CsvDirSource` reads `<sheet>.csv` from a local directory.
//   - `SheetsCsvSource` reads a shared spreadsheet through its CSV export
//     endpoint with a blocking HTTP client.
//   - `CachedSource` wraps either and serves snapshots younger than its TTL.
//
// Sources are shared with the fetch thread, so every implementation is
// `Send + Sync`.

use crate::core::table::{Grid, Table};
use crate::util::constants;
use crate::util::error::SourceError;
use regex::Regex;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};
use std::time::{Duration, Instant};

/// Retry limits for transient I/O errors.
const MAX_RETRIES: u32 = 3;
const RETRY_DELAYS_MS: [u64; 3] = [50, 100, 200];

// =============================================================================
// DataSource trait
// =============================================================================

/// Anything that can deliver a worksheet as CSV text.
pub trait DataSource: Send + Sync {
    /// Raw CSV text of `sheet`.
    fn fetch_text(&self, sheet: &str) -> Result<Arc<String>, SourceError>;

    /// Human-readable location, for the status bar and logs.
    fn describe(&self) -> String;

    /// Fetch `sheet` as a header-first table. A sheet without data rows is
    /// `SourceError::EmptySheet`.
    fn fetch_table(&self, sheet: &str) -> Result<Table, SourceError> {
        let text = self.fetch_text(sheet)?;
        let table = Table::from_csv(&text).map_err(|source| SourceError::Table {
            sheet: sheet.to_string(),
            source,
        })?;
        if table.is_empty() {
            return Err(SourceError::EmptySheet {
                sheet: sheet.to_string(),
            });
        }
        Ok(table)
    }

    /// Fetch `sheet` as a raw A1-addressed grid.
    fn fetch_grid(&self, sheet: &str) -> Result<Grid, SourceError> {
        let text = self.fetch_text(sheet)?;
        let grid = Grid::from_csv(&text).map_err(|source| SourceError::Table {
            sheet: sheet.to_string(),
            source,
        })?;
        if grid.is_empty() {
            return Err(SourceError::EmptySheet {
                sheet: sheet.to_string(),
            });
        }
        Ok(grid)
    }

    /// Drop any cached snapshot. No-op for uncached sources.
    fn invalidate(&self) {}
}

// =============================================================================
// CsvDirSource
// =============================================================================

/// A directory of CSV exports, one file per worksheet.
#[derive(Debug, Clone)]
pub struct CsvDirSource {
    dir: PathBuf,
}

impl CsvDirSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of the export for `sheet`.
    pub fn sheet_path(&self, sheet: &str) -> PathBuf {
        self.dir.join(format!("{sheet}.csv"))
    }
}

impl DataSource for CsvDirSource {
    fn fetch_text(&self, sheet: &str) -> Result<Arc<String>, SourceError> {
        let path = self.sheet_path(sheet);
        let io_err = |source| SourceError::Io {
            path: path.clone(),
            source,
        };

        let size = std::fs::metadata(&path).map_err(io_err)?.len() as usize;
        if size > constants::MAX_SHEET_BYTES {
            return Err(SourceError::TooLarge {
                sheet: sheet.to_string(),
                size,
                max_size: constants::MAX_SHEET_BYTES,
            });
        }

        let text = read_file_with_retry(&path).map_err(io_err)?;
        tracing::debug!(file = %path.display(), bytes = text.len(), "Worksheet read from disk");
        Ok(Arc::new(text))
    }

    fn describe(&self) -> String {
        self.dir.display().to_string()
    }
}

/// Read a file with transient-error retries.
fn read_file_with_retry(path: &Path) -> io::Result<String> {
    let mut last_err: Option<io::Error> = None;

    for attempt in 0..MAX_RETRIES {
        match std::fs::read_to_string(path) {
            Ok(content) => return Ok(content),
            Err(e) if is_transient_error(&e) => {
                tracing::debug!(
                    file = %path.display(),
                    attempt = attempt + 1,
                    error = %e,
                    "Transient I/O error, retrying"
                );
                std::thread::sleep(Duration::from_millis(RETRY_DELAYS_MS[attempt as usize]));
                last_err = Some(e);
            }
            Err(e) => return Err(e),
        }
    }

    Err(last_err.unwrap_or_else(|| io::Error::other("Unknown read error")))
}

fn is_transient_error(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted | io::ErrorKind::TimedOut
    )
}

// =============================================================================
// SheetsCsvSource
// =============================================================================

/// A shared spreadsheet read through its CSV export endpoint.
///
/// The spreadsheet must be readable by anyone with the link.
#[derive(Debug, Clone)]
pub struct SheetsCsvSource {
    spreadsheet_id: String,
    client: reqwest::blocking::Client,
}

impl SheetsCsvSource {
    /// Build a source from a spreadsheet URL or bare ID.
    pub fn new(location: &str) -> Result<Self, SourceError> {
        let spreadsheet_id =
            spreadsheet_id(location).ok_or_else(|| SourceError::InvalidLocation {
                location: location.to_string(),
            })?;

        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(constants::HTTP_TIMEOUT_SECS))
            .user_agent(concat!("linedash/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|source| SourceError::Http {
                sheet: String::new(),
                source,
            })?;

        Ok(Self {
            spreadsheet_id,
            client,
        })
    }

    pub fn spreadsheet_id(&self) -> &str {
        &self.spreadsheet_id
    }

    fn export_url(&self) -> String {
        format!("{}/{}/gviz/tq", constants::SHEETS_BASE_URL, self.spreadsheet_id)
    }

    /// Query parameters for one worksheet. `headers=0` stops the endpoint
    /// from folding leading rows into a header line, so row N of the CSV is
    /// row N of the sheet.
    pub fn export_params(sheet: &str) -> [(&'static str, &str); 3] {
        [("tqx", "out:csv"), ("headers", "0"), ("sheet", sheet)]
    }
}

impl DataSource for SheetsCsvSource {
    fn fetch_text(&self, sheet: &str) -> Result<Arc<String>, SourceError> {
        let http_err = |source| SourceError::Http {
            sheet: sheet.to_string(),
            source,
        };

        let started = Instant::now();
        let response = self
            .client
            .get(self.export_url())
            .query(&Self::export_params(sheet))
            .send()
            .map_err(http_err)?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                sheet: sheet.to_string(),
                status: status.as_u16(),
            });
        }

        if let Some(len) = response.content_length() {
            let len = len as usize;
            if len > constants::MAX_SHEET_BYTES {
                return Err(SourceError::TooLarge {
                    sheet: sheet.to_string(),
                    size: len,
                    max_size: constants::MAX_SHEET_BYTES,
                });
            }
        }

        let text = response.text().map_err(http_err)?;
        if text.len() > constants::MAX_SHEET_BYTES {
            return Err(SourceError::TooLarge {
                sheet: sheet.to_string(),
                size: text.len(),
                max_size: constants::MAX_SHEET_BYTES,
            });
        }

        tracing::debug!(
            sheet,
            bytes = text.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Worksheet downloaded"
        );
        Ok(Arc::new(text))
    }

    fn describe(&self) -> String {
        format!("spreadsheet {}", self.spreadsheet_id)
    }
}

/// Extract the spreadsheet ID from a sharing URL, or accept a bare ID.
pub fn spreadsheet_id(location: &str) -> Option<String> {
    static URL_RE: OnceLock<Regex> = OnceLock::new();
    static ID_RE: OnceLock<Regex> = OnceLock::new();

    let location = location.trim();
    let url_re = URL_RE.get_or_init(|| {
        Regex::new(r"/spreadsheets/d/([A-Za-z0-9_-]+)").expect("spreadsheet URL regex is valid")
    });
    if let Some(caps) = url_re.captures(location) {
        return Some(caps[1].to_string());
    }

    let id_re = ID_RE
        .get_or_init(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("spreadsheet ID regex is valid"));
    id_re.is_match(location).then(|| location.to_string())
}

// =============================================================================
// CachedSource
// =============================================================================

/// Serves worksheet snapshots younger than `ttl` without touching the inner
/// source. A zero TTL disables caching.
pub struct CachedSource<S> {
    inner: S,
    ttl: Duration,
    snapshots: Mutex<HashMap<String, (Instant, Arc<String>)>>,
}

impl<S: DataSource> CachedSource<S> {
    pub fn new(inner: S, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            snapshots: Mutex::new(HashMap::new()),
        }
    }

    /// Age of the snapshot held for `sheet`, if any.
    pub fn snapshot_age(&self, sheet: &str) -> Option<Duration> {
        let snapshots = self.snapshots.lock().ok()?;
        snapshots.get(sheet).map(|(at, _)| at.elapsed())
    }
}

impl<S: DataSource> DataSource for CachedSource<S> {
    fn fetch_text(&self, sheet: &str) -> Result<Arc<String>, SourceError> {
        if let Ok(snapshots) = self.snapshots.lock() {
            if let Some((at, text)) = snapshots.get(sheet) {
                if at.elapsed() < self.ttl {
                    tracing::trace!(sheet, age_ms = at.elapsed().as_millis() as u64, "Cache hit");
                    return Ok(Arc::clone(text));
                }
            }
        }

        let text = self.inner.fetch_text(sheet)?;

        // A poisoned lock only costs us the cache entry.
        if let Ok(mut snapshots) = self.snapshots.lock() {
            snapshots.insert(sheet.to_string(), (Instant::now(), Arc::clone(&text)));
        }
        Ok(text)
    }

    fn describe(&self) -> String {
        self.inner.describe()
    }

    fn invalidate(&self) {
        if let Ok(mut snapshots) = self.snapshots.lock() {
            snapshots.clear();
        }
        self.inner.invalidate();
        tracing::debug!(source = %self.inner.describe(), "Worksheet cache cleared");
    }
}

// =============================================================================
// Unit tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    /// Counts calls and returns a fixed body.
    struct CountingSource {
        body: &'static str,
        calls: AtomicUsize,
    }

    impl DataSource for CountingSource {
        fn fetch_text(&self, _sheet: &str) -> Result<Arc<String>, SourceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(self.body.to_string()))
        }

        fn describe(&self) -> String {
            "counting".to_string()
        }
    }

    fn counting(body: &'static str) -> CountingSource {
        CountingSource {
            body,
            calls: AtomicUsize::new(0),
        }
    }

    #[test]
    fn test_csv_dir_reads_table_and_grid() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("Sheet2.csv"),
            "Date of Assambly,Device Type,PWA No\n2024-03-01,TypeA,U1\n",
        )
        .unwrap();
        std::fs::write(dir.path().join("DashBoard.csv"), "a,b\n1,2\n").unwrap();

        let source = CsvDirSource::new(dir.path());
        let table = source.fetch_table("Sheet2").unwrap();
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.column("Device Type"), Some(1));

        let grid = source.fetch_grid("DashBoard").unwrap();
        assert_eq!(grid.cell(1, 1), "2");
    }

    #[test]
    fn test_csv_dir_missing_sheet_is_io_error() {
        let dir = TempDir::new().unwrap();
        let source = CsvDirSource::new(dir.path());
        assert!(matches!(
            source.fetch_table("Sheet2"),
            Err(SourceError::Io { .. })
        ));
    }

    #[test]
    fn test_header_only_sheet_is_empty() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("Sheet2.csv"), "Date of Assambly,Device Type\n").unwrap();
        let source = CsvDirSource::new(dir.path());
        let err = source.fetch_table("Sheet2").unwrap_err();
        assert!(matches!(err, SourceError::EmptySheet { .. }));
        assert!(err.to_string().starts_with("Failed to load data"));
    }

    #[test]
    fn test_blank_file_grid_is_empty() {
        let source = counting("");
        assert!(matches!(
            source.fetch_grid("DashBoard"),
            Err(SourceError::EmptySheet { .. })
        ));
    }

    #[test]
    fn test_cache_serves_fresh_snapshot() {
        let cached = CachedSource::new(counting("a\n1\n"), Duration::from_secs(300));
        cached.fetch_table("Sheet2").unwrap();
        cached.fetch_table("Sheet2").unwrap();
        assert_eq!(cached.inner.calls.load(Ordering::SeqCst), 1);
        assert!(cached.snapshot_age("Sheet2").is_some());

        // Different sheets are cached independently.
        cached.fetch_grid("DashBoard").unwrap();
        assert_eq!(cached.inner.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_cache_invalidate_forces_live_read() {
        let cached = CachedSource::new(counting("a\n1\n"), Duration::from_secs(300));
        cached.fetch_table("Sheet2").unwrap();
        cached.invalidate();
        assert!(cached.snapshot_age("Sheet2").is_none());
        cached.fetch_table("Sheet2").unwrap();
        assert_eq!(cached.inner.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_zero_ttl_disables_cache() {
        let cached = CachedSource::new(counting("a\n1\n"), Duration::ZERO);
        cached.fetch_table("Sheet2").unwrap();
        cached.fetch_table("Sheet2").unwrap();
        assert_eq!(cached.inner.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_spreadsheet_id_from_url_or_bare_id() {
        assert_eq!(
            spreadsheet_id("https://docs.google.com/spreadsheets/d/1AbC-d_9/edit#gid=0").as_deref(),
            Some("1AbC-d_9")
        );
        assert_eq!(spreadsheet_id(" 1AbC-d_9 ").as_deref(), Some("1AbC-d_9"));
        assert_eq!(spreadsheet_id("https://example.com/not-a-sheet"), None);
        assert_eq!(spreadsheet_id(""), None);
    }

    #[test]
    fn test_sheets_source_rejects_bad_location() {
        assert!(matches!(
            SheetsCsvSource::new("not a sheet"),
            Err(SourceError::InvalidLocation { .. })
        ));
        let source = SheetsCsvSource::new("abc123").unwrap();
        assert_eq!(source.spreadsheet_id(), "abc123");
        assert_eq!(
            source.export_url(),
            "https://docs.google.com/spreadsheets/d/abc123/gviz/tq"
        );
    }

    #[test]
    fn test_sheets_export_keeps_raw_rows() {
        let params = SheetsCsvSource::export_params("DashBoard");
        assert!(params.contains(&("tqx", "out:csv")));
        assert!(params.contains(&("headers", "0")));
        assert!(params.contains(&("sheet", "DashBoard")));
    }
}

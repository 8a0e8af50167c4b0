// LineDash - app/fetch.rs
//
// Fetch lifecycle management. Loads the records sheet and the report sheet
// on a background thread, sending progress messages to the UI thread via
// an mpsc channel.
//
// Architecture:
//   - `FetchManager` lives on the UI thread; `run_fetch` runs on a background thread.
//   - An `Arc<AtomicBool>` cancel flag lets a newer fetch supersede an older one.
//   - All cross-thread communication is via `FetchProgress` channel messages.
//   - A failure on one sheet is reported and the other sheet is still loaded.

use crate::app::source::DataSource;
use crate::core::table::{Grid, Table};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::time::{Duration, Instant};

/// Which worksheets to load, and whether to bypass cached snapshots.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub records_sheet: String,
    pub report_sheet: String,
    pub force: bool,
}

/// The two worksheets a fetch loads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetKind {
    Records,
    Report,
}

/// Progress messages sent from the fetch thread to the UI.
#[derive(Debug)]
pub enum FetchProgress {
    Started { source: String },
    RecordsLoaded { table: Table },
    ReportLoaded { grid: Grid },
    Warning { message: String },
    /// One worksheet could not be loaded; the fetch carries on.
    Failed {
        kind: SheetKind,
        sheet: String,
        error: String,
    },
    Completed {
        records_ok: bool,
        report_ok: bool,
        elapsed: Duration,
    },
    Cancelled,
}

// =============================================================================
// FetchManager
// =============================================================================

/// Manages a fetch operation on a background thread.
pub struct FetchManager {
    /// Channel receiver for the UI to poll progress messages.
    pub progress_rx: Option<mpsc::Receiver<FetchProgress>>,

    /// Cancel flag shared with the background thread.
    cancel_flag: Option<Arc<AtomicBool>>,
}

impl FetchManager {
    pub fn new() -> Self {
        Self {
            progress_rx: None,
            cancel_flag: None,
        }
    }

    /// Start fetching both worksheets from `source`.
    ///
    /// If a fetch is already running it is cancelled first.
    pub fn start_fetch(&mut self, source: Arc<dyn DataSource>, request: FetchRequest) {
        self.cancel_fetch();

        let (tx, rx) = mpsc::channel();
        let cancel = Arc::new(AtomicBool::new(false));

        self.progress_rx = Some(rx);
        self.cancel_flag = Some(Arc::clone(&cancel));

        std::thread::spawn(move || {
            run_fetch(source.as_ref(), &request, &tx, &cancel);
        });

        tracing::info!("Fetch started");
    }

    /// Request cancellation of the running fetch.
    ///
    /// The receiver is dropped too, so messages already queued by the
    /// cancelled thread never reach the dashboard.
    pub fn cancel_fetch(&mut self) {
        if let Some(flag) = &self.cancel_flag {
            flag.store(true, Ordering::SeqCst);
        }
        self.cancel_flag = None;
        self.progress_rx = None;
    }

    /// True while a fetch thread may still send messages.
    pub fn is_running(&self) -> bool {
        self.cancel_flag.is_some()
    }

    /// Poll for up to `limit` progress messages without blocking.
    pub fn poll_progress(&mut self, limit: usize) -> Vec<FetchProgress> {
        let mut messages = Vec::new();
        if let Some(ref rx) = self.progress_rx {
            while messages.len() < limit {
                match rx.try_recv() {
                    Ok(msg) => messages.push(msg),
                    Err(_) => break,
                }
            }
        }
        if messages
            .iter()
            .any(|m| matches!(m, FetchProgress::Completed { .. } | FetchProgress::Cancelled))
        {
            self.cancel_flag = None;
        }
        messages
    }
}

impl Default for FetchManager {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Background fetch pipeline
// =============================================================================

/// Records sheet, then report sheet. Checks `cancel` between the two.
pub fn run_fetch(
    source: &dyn DataSource,
    request: &FetchRequest,
    tx: &mpsc::Sender<FetchProgress>,
    cancel: &AtomicBool,
) {
    macro_rules! send {
        ($msg:expr) => {
            if tx.send($msg).is_err() {
                return; // Receiver dropped (UI closed or fetch superseded).
            }
        };
    }

    macro_rules! check_cancel {
        () => {
            if cancel.load(Ordering::SeqCst) {
                send!(FetchProgress::Cancelled);
                return;
            }
        };
    }

    let started = Instant::now();
    send!(FetchProgress::Started {
        source: source.describe(),
    });

    if request.force {
        source.invalidate();
    }

    // -------------------------------------------------------------------------
    // Records sheet
    // -------------------------------------------------------------------------
    let records_ok = match source.fetch_table(&request.records_sheet) {
        Ok(table) => {
            tracing::info!(
                sheet = %request.records_sheet,
                rows = table.rows.len(),
                "Records sheet loaded"
            );
            send!(FetchProgress::RecordsLoaded { table });
            true
        }
        Err(e) => {
            tracing::warn!(sheet = %request.records_sheet, error = %e, "Records sheet failed");
            send!(FetchProgress::Failed {
                kind: SheetKind::Records,
                sheet: request.records_sheet.clone(),
                error: e.to_string(),
            });
            false
        }
    };

    check_cancel!();

    // -------------------------------------------------------------------------
    // Report sheet
    // -------------------------------------------------------------------------
    let report_ok = match source.fetch_grid(&request.report_sheet) {
        Ok(grid) => {
            tracing::info!(
                sheet = %request.report_sheet,
                rows = grid.cells.len(),
                "Report sheet loaded"
            );
            send!(FetchProgress::ReportLoaded { grid });
            true
        }
        Err(e) => {
            tracing::warn!(sheet = %request.report_sheet, error = %e, "Report sheet failed");
            send!(FetchProgress::Failed {
                kind: SheetKind::Report,
                sheet: request.report_sheet.clone(),
                error: e.to_string(),
            });
            false
        }
    };

    check_cancel!();

    send!(FetchProgress::Completed {
        records_ok,
        report_ok,
        elapsed: started.elapsed(),
    });
}

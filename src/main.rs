// LineDash - main.rs
//
// Application entry point. Handles:
// 1. CLI argument parsing and `.env` loading
// 2. config.toml loading and validation
// 3. Logging initialisation (debug mode support)
// 4. Data source construction and view-session restore
// 5. eframe GUI launch

#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod gui;

// Re-export modules from the library crate so that `gui.rs` can still use
// `crate::app::...`, `crate::core::...` etc.
pub use linedash::app;
pub use linedash::core;
pub use linedash::platform;
pub use linedash::ui;
pub use linedash::util;

use app::source::{CachedSource, CsvDirSource, DataSource, SheetsCsvSource};
use clap::Parser;
use platform::config::SourceKind;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use util::error::SourceError;

/// LineDash - Manufacturing line dashboard.
///
/// Shows device assembly trends and inventory figures read from a shared
/// spreadsheet or a directory of CSV exports.
#[derive(Parser, Debug)]
#[command(name = "LineDash", version, about)]
struct Cli {
    /// Path to config.toml (defaults to the platform config directory).
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Read worksheets from `<sheet>.csv` files in this directory.
    #[arg(long = "data-dir", conflicts_with = "sheet_url")]
    data_dir: Option<PathBuf>,

    /// Read worksheets from this shared spreadsheet (URL or ID).
    #[arg(long = "sheet-url")]
    sheet_url: Option<String>,

    /// Enable debug logging (equivalent to RUST_LOG=debug).
    #[arg(short = 'd', long = "debug")]
    debug: bool,
}

/// Wrap the configured source in a TTL cache.
fn build_source(kind: &SourceKind, ttl: Duration) -> Result<Arc<dyn DataSource>, SourceError> {
    let source: Arc<dyn DataSource> = match kind {
        SourceKind::CsvDir(dir) => {
            Arc::new(CachedSource::new(CsvDirSource::new(dir.clone()), ttl))
        }
        SourceKind::Sheets(location) => {
            Arc::new(CachedSource::new(SheetsCsvSource::new(location)?, ttl))
        }
    };
    Ok(source)
}

fn main() {
    let cli = Cli::parse();

    // `.env` may supply LINEDASH_USERNAME / LINEDASH_PASSWORD.
    let dotenv = dotenvy::dotenv();

    // Load config first so its log level can seed the subscriber.
    let platform_paths = platform::config::PlatformPaths::resolve();
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| platform_paths.config_file());
    let (mut config, mut warnings) = platform::config::load_config(&config_path);

    util::logging::init(cli.debug, config.log_level.as_deref());

    tracing::info!(
        version = util::constants::APP_VERSION,
        debug = cli.debug,
        config = %config_path.display(),
        "LineDash starting"
    );
    if let Ok(path) = dotenv {
        tracing::debug!(path = %path.display(), "Loaded .env");
    }

    platform::config::apply_env_credentials(&mut config, &mut warnings);

    // CLI source flags override config.toml.
    if let Some(dir) = cli.data_dir {
        config.source = Some(SourceKind::CsvDir(dir));
    } else if let Some(url) = cli.sheet_url {
        config.source = Some(SourceKind::Sheets(url));
    }

    let ttl = Duration::from_secs(config.cache_ttl_secs);
    let source = match config.source.as_ref().map(|kind| build_source(kind, ttl)) {
        Some(Ok(source)) => {
            tracing::info!(source = %source.describe(), ttl_secs = ttl.as_secs(), "Data source ready");
            Some(source)
        }
        Some(Err(e)) => {
            tracing::error!(error = %e, "Data source unusable");
            warnings.push(e.to_string());
            None
        }
        None => {
            tracing::warn!("No data source configured");
            None
        }
    };

    for w in &warnings {
        tracing::warn!(warning = %w, "Startup warning");
    }

    // Create application state
    let gate = match config.credentials.clone() {
        Some(creds) => core::auth::LoginGate::new(creds),
        None => core::auth::LoginGate::open(),
    };
    let mut state = app::state::DashboardState::new(
        gate,
        config.schema.clone(),
        config.layout.clone(),
        config.preview_rows,
        core::trend::SystemClock,
        cli.debug,
    );
    for w in warnings {
        state.push_warning(w);
    }

    let session_path = app::session::session_path(&platform_paths.data_dir);
    if let Some(data) = app::session::load(&session_path) {
        state.restore_session(data);
    }

    let settings = gui::SourceSettings {
        source,
        records_sheet: config.records_sheet.clone(),
        report_sheet: config.report_sheet.clone(),
        refresh_every: Duration::from_secs(
            config
                .cache_ttl_secs
                .max(util::constants::MIN_REFRESH_INTERVAL_SECS),
        ),
    };
    let dark_mode = config.dark_mode;

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(format!(
                "{} v{}",
                util::constants::APP_NAME,
                util::constants::APP_VERSION
            ))
            .with_inner_size([1280.0, 900.0])
            .with_min_inner_size([900.0, 600.0]),
        ..Default::default()
    };

    let result = eframe::run_native(
        util::constants::APP_NAME,
        native_options,
        Box::new(move |cc| {
            ui::theme::apply(&cc.egui_ctx, dark_mode);
            Ok(Box::new(gui::LineDashApp::new(
                state,
                settings,
                session_path,
                dark_mode,
            )))
        }),
    );

    if let Err(e) = result {
        tracing::error!(error = %e, "Failed to launch GUI");
        eprintln!("Error: Failed to launch LineDash GUI: {e}");
        std::process::exit(1);
    }
}

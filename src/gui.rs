// LineDash - gui.rs
//
// Top-level eframe::App implementation.
// Wires together all UI panels and manages the fetch lifecycle.

use crate::app::fetch::{FetchManager, FetchRequest};
use crate::app::session;
use crate::app::source::DataSource;
use crate::app::state::DashboardState;
use crate::core::export;
use crate::ui;
use crate::util::constants;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Where and how the dashboard loads its worksheets.
pub struct SourceSettings {
    /// `None` when no source is configured; the dashboard shows a hint.
    pub source: Option<Arc<dyn DataSource>>,
    pub records_sheet: String,
    pub report_sheet: String,
    /// Reload interval; the cached source decides whether a reload is live.
    pub refresh_every: Duration,
}

/// The LineDash application.
pub struct LineDashApp {
    pub state: DashboardState,
    pub fetch_manager: FetchManager,
    settings: SourceSettings,
    session_path: PathBuf,
    dark_mode: bool,
    last_fetch_started: Option<Instant>,
}

impl LineDashApp {
    pub fn new(
        state: DashboardState,
        settings: SourceSettings,
        session_path: PathBuf,
        dark_mode: bool,
    ) -> Self {
        Self {
            state,
            fetch_manager: FetchManager::new(),
            settings,
            session_path,
            dark_mode,
            last_fetch_started: None,
        }
    }

    /// Start loading both worksheets. `force` bypasses cached snapshots.
    fn start_fetch(&mut self, force: bool) {
        let Some(source) = self.settings.source.clone() else {
            self.state.status_message =
                "No data source configured. Pass --data-dir or --sheet-url, or edit config.toml."
                    .to_string();
            return;
        };
        self.fetch_manager.start_fetch(
            source,
            FetchRequest {
                records_sheet: self.settings.records_sheet.clone(),
                report_sheet: self.settings.report_sheet.clone(),
                force,
            },
        );
        self.state.fetch_in_progress = true;
        self.last_fetch_started = Some(Instant::now());
    }

    fn save_session(&self) {
        if let Err(e) = session::save(&self.state.session_data(), &self.session_path) {
            tracing::warn!(error = %e, "Session save failed");
        }
    }

    /// Export the current trend series through a save dialog.
    fn export_trend(&mut self, json: bool) {
        let Some(series) = self.state.series().cloned() else {
            return;
        };
        let (filter, ext) = if json { ("JSON", "json") } else { ("CSV", "csv") };
        let file_name = format!("trend-{}.{ext}", series.device_type.replace(' ', "_"));
        let Some(dest) = rfd::FileDialog::new()
            .add_filter(filter, &[ext])
            .set_file_name(file_name)
            .save_file()
        else {
            return;
        };

        self.state.status_message = match write_export(&series, &dest, json) {
            Ok(n) => format!("Exported {n} day(s) to {}.", dest.display()),
            Err(e) => format!("Export failed: {e}"),
        };
    }
}

fn write_export(
    series: &crate::core::model::TrendSeries,
    dest: &Path,
    json: bool,
) -> Result<usize, crate::util::error::ExportError> {
    let file = std::fs::File::create(dest).map_err(|e| crate::util::error::ExportError::Io {
        path: dest.to_path_buf(),
        source: e,
    })?;
    let writer = std::io::BufWriter::new(file);
    if json {
        export::export_json(series, writer, dest)
    } else {
        export::export_csv(series, writer, dest)
    }
}

impl eframe::App for LineDashApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Login gate: nothing else is shown or fetched until it opens.
        if !self.state.is_authenticated() {
            if ui::panels::login::render(ctx, &mut self.state) {
                self.start_fetch(false);
            }
            return;
        }

        // First frame after sign-in (or launch with an open gate).
        if self.last_fetch_started.is_none() {
            self.start_fetch(false);
        }

        // Poll for fetch progress
        let messages = self
            .fetch_manager
            .poll_progress(constants::MAX_FETCH_MESSAGES_PER_FRAME);
        let had_messages = !messages.is_empty();
        for msg in messages {
            self.state.apply_progress(msg);
        }
        if had_messages || self.state.fetch_in_progress {
            ctx.request_repaint_after(Duration::from_millis(100));
        }

        // Periodic reload through the cache.
        if !self.fetch_manager.is_running()
            && self
                .last_fetch_started
                .is_some_and(|t| t.elapsed() >= self.settings.refresh_every)
        {
            self.start_fetch(false);
        }
        ctx.request_repaint_after(self.settings.refresh_every);

        // Top menu bar
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Refresh").clicked() {
                        self.start_fetch(true);
                        ui.close_menu();
                    }
                    ui.separator();
                    let has_series = self.state.series().is_some_and(|s| !s.points.is_empty());
                    ui.add_enabled_ui(has_series, |ui| {
                        ui.menu_button("Export Trend", |ui| {
                            if ui.button("Export CSV...").clicked() {
                                self.export_trend(false);
                                ui.close_menu();
                            }
                            if ui.button("Export JSON...").clicked() {
                                self.export_trend(true);
                                ui.close_menu();
                            }
                        });
                    });
                    ui.separator();
                    if self.state.gate.is_required() && ui.button("Sign Out").clicked() {
                        self.save_session();
                        self.state.logout();
                        ui.close_menu();
                    }
                    if ui.button("Exit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });
                ui.menu_button("View", |ui| {
                    let label = if self.dark_mode { "Light Mode" } else { "Dark Mode" };
                    if ui.button(label).clicked() {
                        self.dark_mode = !self.dark_mode;
                        ui::theme::apply(ctx, self.dark_mode);
                        ui.close_menu();
                    }
                    let n = self.state.warnings.len();
                    if ui.button(format!("Warnings ({n})")).clicked() {
                        self.state.show_warnings = true;
                        ui.close_menu();
                    }
                });
                ui.menu_button("Help", |ui| {
                    if ui.button("About").clicked() {
                        self.state.show_about = true;
                        ui.close_menu();
                    }
                });
            });
        });

        // Status bar
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if self.state.fetch_in_progress {
                    ui.spinner();
                }
                ui.label(&self.state.status_message);
                if self.state.fetch_in_progress && ui.small_button("Cancel").clicked() {
                    self.fetch_manager.cancel_fetch();
                    self.state.fetch_in_progress = false;
                    self.state.status_message = "Load cancelled.".to_string();
                }
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if let Some(at) = self.state.last_fetch {
                        ui.weak(format!("Updated {}", at.format("%H:%M:%S")));
                    }
                    if !self.state.warnings.is_empty()
                        && ui
                            .small_button(format!("\u{26a0} {}", self.state.warnings.len()))
                            .clicked()
                    {
                        self.state.show_warnings = true;
                    }
                });
            });
        });

        // Dashboard body
        let mut selection_changed = false;
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .id_salt("dashboard")
                .auto_shrink([false; 2])
                .show(ui, |ui| {
                    ui.label(
                        egui::RichText::new(constants::DASHBOARD_TITLE)
                            .size(24.0)
                            .strong(),
                    );
                    ui.add_space(8.0);

                    ui::panels::scorecards::render(ui, &self.state);
                    ui.add_space(8.0);
                    ui::panels::progress::render(ui, &self.state);

                    ui.separator();
                    selection_changed = ui::panels::trend::render(ui, &mut self.state);
                    ui::panels::overview::render(ui, &self.state);

                    ui.separator();
                    ui::panels::distribution::render(ui, &self.state);

                    ui.separator();
                    ui::panels::production::render(ui, &self.state);
                });
        });
        if selection_changed {
            self.save_session();
        }

        // Dialogs
        ui::panels::about::render(ctx, &mut self.state);
        ui::panels::warnings::render(ctx, &mut self.state);
    }

    /// Saves the current view session so the next launch can restore it.
    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.fetch_manager.cancel_fetch();
        self.save_session();
    }
}

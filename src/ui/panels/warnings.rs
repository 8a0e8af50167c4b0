// LineDash - ui/panels/warnings.rs
//
// Warnings window: non-fatal problems from config loading, fetching, and
// figure extraction, newest last.

use crate::app::state::DashboardState;
use crate::ui::theme;

/// Render the warnings window (if `state.show_warnings` is true).
pub fn render(ctx: &egui::Context, state: &mut DashboardState) {
    if !state.show_warnings {
        return;
    }

    let mut open = true;
    let mut clear = false;
    egui::Window::new(format!("Warnings ({})", state.warnings.len()))
        .open(&mut open)
        .collapsible(false)
        .resizable(true)
        .min_width(420.0)
        .show(ctx, |ui| {
            if state.warnings.is_empty() {
                ui.weak("No warnings.");
                return;
            }
            egui::ScrollArea::vertical()
                .id_salt("warnings_list")
                .max_height(300.0)
                .show(ui, |ui| {
                    for w in &state.warnings {
                        ui.colored_label(theme::WARNING_TEXT, w);
                    }
                });
            ui.separator();
            if ui.button("Clear").clicked() {
                clear = true;
            }
        });

    if clear {
        state.warnings.clear();
    }
    if !open {
        state.show_warnings = false;
    }
}

// LineDash - ui/panels/overview.rs
//
// Records preview: the first rows of the records sheet as fetched, in a
// collapsible striped table.

use crate::app::state::DashboardState;
use crate::ui::theme;

pub fn render(ui: &mut egui::Ui, state: &DashboardState) {
    let Some(ref table) = state.records else {
        return;
    };

    let shown = table.rows.len().min(state.preview_rows);
    egui::CollapsingHeader::new(format!(
        "Data Preview ({shown} of {} rows)",
        table.rows.len()
    ))
    .id_salt("records_preview")
    .default_open(false)
    .show(ui, |ui| {
        egui::ScrollArea::both()
            .id_salt("records_preview_scroll")
            .max_height(theme::ROW_HEIGHT * 16.0)
            .show(ui, |ui| {
                egui::Grid::new("records_preview_table")
                    .num_columns(table.headers.len())
                    .striped(true)
                    .spacing([12.0, 3.0])
                    .show(ui, |ui| {
                        for header in &table.headers {
                            ui.strong(header);
                        }
                        ui.end_row();

                        for row in table.preview(state.preview_rows) {
                            for cell in row.iter().take(table.headers.len()) {
                                ui.label(cell);
                            }
                            ui.end_row();
                        }
                    });
            });

        ui.weak(format!(
            "{} usable record(s) across {} device type(s)",
            state.assembly.len(),
            state.device_types.len()
        ));
    });
}

// LineDash - ui/panels/progress.rs
//
// Board inventory tracking: one horizontal stacked bar on a 0..total axis.

use crate::app::state::DashboardState;
use crate::ui::{charts, theme};

pub fn render(ui: &mut egui::Ui, state: &DashboardState) {
    let Some(progress) = state.figures.as_ref().and_then(|f| f.progress.as_ref()) else {
        return;
    };

    ui.strong("Board Inventory Tracking");

    let segments: Vec<(String, f64, egui::Color32)> = progress
        .segments
        .iter()
        .enumerate()
        .map(|(i, (label, value))| (label.clone(), *value, theme::series_colour(i)))
        .collect();

    charts::horizontal_stacked_bar(ui, &segments, progress.axis_max, theme::PROGRESS_HEIGHT);

    let items: Vec<(&str, egui::Color32)> = segments
        .iter()
        .map(|(label, _, colour)| (label.as_str(), *colour))
        .collect();
    charts::legend(ui, &items);
}

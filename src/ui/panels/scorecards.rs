// LineDash - ui/panels/scorecards.rs
//
// Inventory Overview: the primary scorecard followed by up to three extra
// scorecards, side by side.

use crate::app::state::DashboardState;
use crate::core::report::Scorecard;
use crate::ui::theme;
use crate::util::constants;

pub fn render(ui: &mut egui::Ui, state: &DashboardState) {
    ui.heading("Inventory Overview");

    let Some(ref figures) = state.figures else {
        if let Some(ref err) = state.report_error {
            ui.colored_label(theme::ERROR_TEXT, err);
        } else {
            ui.weak("Waiting for dashboard data...");
        }
        return;
    };

    let cards: Vec<(&Scorecard, egui::Color32)> = figures
        .primary_scorecard
        .iter()
        .map(|c| (c, theme::PRIMARY))
        .chain(
            figures
                .extra_scorecards
                .iter()
                .take(constants::MAX_EXTRA_SCORECARDS)
                .map(|c| (c, theme::ACCENT)),
        )
        .collect();

    if cards.is_empty() {
        ui.weak("No scorecards published.");
        return;
    }

    ui.columns(1 + constants::MAX_EXTRA_SCORECARDS, |columns| {
        for (col, (card, colour)) in columns.iter_mut().zip(cards) {
            scorecard(col, card, colour);
        }
    });
}

fn scorecard(ui: &mut egui::Ui, card: &Scorecard, colour: egui::Color32) {
    egui::Frame::group(ui.style()).show(ui, |ui| {
        ui.set_min_height(theme::SCORECARD_HEIGHT);
        ui.vertical_centered(|ui| {
            ui.label(egui::RichText::new(&card.label).size(16.0));
            ui.add_space(4.0);
            let value = card
                .value
                .map(|v| v.to_string())
                .unwrap_or_else(|| "\u{2014}".to_string());
            ui.label(
                egui::RichText::new(value)
                    .size(theme::SCORECARD_VALUE_SIZE)
                    .strong()
                    .color(colour),
            );
        });
    });
}

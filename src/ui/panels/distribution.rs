// LineDash - ui/panels/distribution.rs
//
// Board distribution: the same category breakdown as a doughnut with
// percentages and as a bar chart with value badges.

use crate::app::state::DashboardState;
use crate::ui::charts::{self, Bar};
use crate::ui::theme;

pub fn render(ui: &mut egui::Ui, state: &DashboardState) {
    let Some(dist) = state.figures.as_ref().and_then(|f| f.distribution.as_ref()) else {
        return;
    };

    ui.heading("Board Distribution");
    if dist.slices.is_empty() {
        ui.weak("No distribution rows published.");
        return;
    }

    let percentages = dist.percentages();
    let slices: Vec<(String, f64, Option<f64>)> = dist
        .slices
        .iter()
        .zip(&percentages)
        .map(|(s, pct)| (s.label.clone(), s.value.unwrap_or(0.0), *pct))
        .collect();

    let bars: Vec<Bar> = dist
        .slices
        .iter()
        .map(|s| {
            let shown = s
                .value
                .map(|v| format!("{v}"))
                .unwrap_or_else(|| "n/a".to_string());
            Bar {
                label: s.label.clone(),
                segments: vec![(s.value.unwrap_or(0.0), theme::ACCENT)],
                badge: s.value.map(|_| (shown.clone(), theme::ACCENT)),
                hover: format!("{}: {shown}", s.label),
            }
        })
        .collect();

    ui.columns(2, |columns| {
        columns[0].strong("Percentage Distribution");
        charts::doughnut(&mut columns[0], &slices, theme::CHART_HEIGHT);
        let items: Vec<(&str, egui::Color32)> = slices
            .iter()
            .enumerate()
            .map(|(i, (label, _, _))| (label.as_str(), theme::series_colour(i)))
            .collect();
        charts::legend(&mut columns[0], &items);

        columns[1].strong("Distribution");
        charts::bar_chart(
            &mut columns[1],
            &bars,
            &dist.category_name,
            &dist.value_name,
            theme::CHART_HEIGHT,
        );
    });
}

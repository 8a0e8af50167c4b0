// LineDash - ui/panels/production.rs
//
// Monthly Production: two series as stacked bars (total in a badge on top)
// and as stacked filled lines.

use crate::app::state::DashboardState;
use crate::ui::charts::{self, Bar, Line};
use crate::ui::theme;

pub fn render(ui: &mut egui::Ui, state: &DashboardState) {
    let Some(prod) = state.figures.as_ref().and_then(|f| f.production.as_ref()) else {
        return;
    };

    ui.heading("Monthly Production");
    if prod.rows.is_empty() {
        ui.weak("No production recorded.");
        return;
    }

    let bars: Vec<Bar> = prod
        .rows
        .iter()
        .map(|r| {
            let a = r.series_a.unwrap_or(0.0);
            let b = r.series_b.unwrap_or(0.0);
            let total = r.total();
            Bar {
                label: r.period.clone(),
                segments: vec![(a, theme::PRIMARY), (b, theme::ACCENT)],
                badge: Some((format!("{total}"), theme::TOTAL_BADGE)),
                hover: format!(
                    "{}\n{}: {a}\n{}: {b}\nTotal: {total}",
                    r.period, prod.series_a_name, prod.series_b_name
                ),
            }
        })
        .collect();

    let stacked = prod.stacked_lines();
    let lines = [
        Line {
            name: prod.series_a_name.clone(),
            values: stacked.iter().map(|(a, _)| *a).collect(),
            colour: theme::PRIMARY,
        },
        Line {
            name: format!("{} (stacked)", prod.series_b_name),
            values: stacked.iter().map(|(_, ab)| *ab).collect(),
            colour: theme::ACCENT,
        },
    ];
    let labels: Vec<&str> = prod.rows.iter().map(|r| r.period.as_str()).collect();
    let legend = [
        (prod.series_a_name.as_str(), theme::PRIMARY),
        (prod.series_b_name.as_str(), theme::ACCENT),
    ];

    ui.columns(2, |columns| {
        charts::bar_chart(
            &mut columns[0],
            &bars,
            &prod.period_name,
            "Value",
            theme::CHART_HEIGHT,
        );
        charts::legend(&mut columns[0], &legend);

        charts::stacked_line_chart(
            &mut columns[1],
            &labels,
            &lines,
            &prod.period_name,
            "Value",
            theme::CHART_HEIGHT,
        );
        charts::legend(&mut columns[1], &legend);
    });
}

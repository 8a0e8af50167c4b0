// LineDash - ui/panels/trend.rs
//
// Device Assembly Trend: device-type and quick-range selectors on the left,
// the per-day bar chart on the right. Any change to the selection
// recomputes the series immediately.

use crate::app::state::DashboardState;
use crate::core::model::RangeMode;
use crate::ui::charts::{self, Bar};
use crate::ui::theme;
use crate::util::constants;

/// Render the trend section. Returns true when the selection changed.
pub fn render(ui: &mut egui::Ui, state: &mut DashboardState) -> bool {
    ui.heading("Device Assembly Trend");

    if let Some(ref err) = state.records_error {
        ui.colored_label(theme::ERROR_TEXT, err);
        return false;
    }
    if state.records.is_none() {
        ui.weak("Waiting for assembly records...");
        return false;
    }

    let mut changed = false;
    ui.columns(2, |columns| {
        changed = controls(&mut columns[0], state);
        chart(&mut columns[1], state);
    });

    if changed {
        state.recompute_trend();
    }
    changed
}

fn controls(ui: &mut egui::Ui, state: &mut DashboardState) -> bool {
    let mut changed = false;

    ui.strong("Select Device Type");
    if state.device_types.is_empty() {
        ui.colored_label(theme::WARNING_TEXT, "No device types available.");
        return false;
    }
    ui.horizontal_wrapped(|ui| {
        for device in &state.device_types {
            changed |= ui
                .radio_value(&mut state.selected_device, Some(device.clone()), device.as_str())
                .changed();
        }
    });

    ui.add_space(8.0);
    ui.strong("Quick Select Date Range");
    ui.horizontal_wrapped(|ui| {
        for mode in RangeMode::all() {
            changed |= ui
                .radio_value(&mut state.range_mode, *mode, mode.label())
                .changed();
        }
    });

    if state.range_mode == RangeMode::Custom {
        ui.add_space(4.0);
        ui.horizontal(|ui| {
            ui.label("From");
            changed |= ui
                .add(
                    egui::TextEdit::singleline(&mut state.custom_from)
                        .desired_width(96.0)
                        .hint_text("YYYY-MM-DD"),
                )
                .changed();
            ui.label("To");
            changed |= ui
                .add(
                    egui::TextEdit::singleline(&mut state.custom_to)
                        .desired_width(96.0)
                        .hint_text("YYYY-MM-DD"),
                )
                .changed();
        });
    } else if let Some(range) = state.resolved_range() {
        ui.add_space(4.0);
        ui.weak(range.to_string());
    }

    if let Some(ref msg) = state.input_error {
        ui.colored_label(theme::ERROR_TEXT, msg);
    }

    changed
}

fn chart(ui: &mut egui::Ui, state: &DashboardState) {
    let series = match state.trend {
        Some(Ok(ref series)) => series,
        Some(Err(ref e)) => {
            ui.colored_label(theme::ERROR_TEXT, e.to_string());
            return;
        }
        None => return,
    };

    ui.strong(format!("Device Assembly Trend for {}", series.device_type));
    if series.points.is_empty() {
        ui.weak(format!("No assemblies between {}.", series.range));
        return;
    }

    let bars: Vec<Bar> = series
        .points
        .iter()
        .map(|p| {
            let date = p.date.format(constants::DATE_DISPLAY_FORMAT).to_string();
            Bar {
                hover: format!("{date}: {} unit(s)", p.count),
                label: date,
                segments: vec![(f64::from(p.count), theme::TREND)],
                badge: Some((p.count.to_string(), theme::TREND)),
            }
        })
        .collect();

    charts::bar_chart(ui, &bars, "", "Count", theme::CHART_HEIGHT);
    ui.weak(format!(
        "{} unit(s) over {} day(s) with assemblies",
        series.total_units(),
        series.points.len()
    ));
}

// LineDash - ui/charts.rs
//
// Chart widgets drawn directly with the egui painter: vertical (stacked)
// bars with value badges, stacked filled lines, a horizontal stacked bar,
// and a doughnut. Each widget allocates its own rect and shows a tooltip
// for the hovered element.

use crate::ui::theme;
use egui::{Align2, Color32, FontId, Pos2, Rect, Sense, Shape, Stroke, Vec2};
use std::f32::consts::{FRAC_PI_2, TAU};

/// Space reserved around the plot area for axis labels.
const LEFT_MARGIN: f32 = 44.0;
const BOTTOM_MARGIN: f32 = 34.0;
const TOP_MARGIN: f32 = 18.0;
const RIGHT_MARGIN: f32 = 8.0;

/// Gridlines drawn on the value axis.
const Y_DIVISIONS: usize = 4;

/// Minimum horizontal room per category label before labels are thinned.
const MIN_LABEL_WIDTH: f32 = 64.0;

/// Doughnut arcs are approximated with quads of at most this many radians.
const ARC_STEP: f32 = 0.05;

/// One category on a bar chart.
#[derive(Debug, Clone)]
pub struct Bar {
    pub label: String,
    /// Stacked bottom-up.
    pub segments: Vec<(f64, Color32)>,
    /// Text drawn in a circle at the top of the bar.
    pub badge: Option<(String, Color32)>,
    pub hover: String,
}

impl Bar {
    fn total(&self) -> f64 {
        self.segments.iter().map(|(v, _)| v.max(0.0)).sum()
    }
}

/// A line on a stacked line chart.
#[derive(Debug, Clone)]
pub struct Line {
    pub name: String,
    pub values: Vec<f64>,
    pub colour: Color32,
}

// =============================================================================
// Axis helpers
// =============================================================================

/// Round `raw` up to 1, 2, 5 or 10 times a power of ten.
pub fn nice_step(raw: f64) -> f64 {
    if !raw.is_finite() || raw <= 0.0 {
        return 1.0;
    }
    let magnitude = 10f64.powf(raw.log10().floor());
    let fraction = raw / magnitude;
    let nice = if fraction <= 1.0 {
        1.0
    } else if fraction <= 2.0 {
        2.0
    } else if fraction <= 5.0 {
        5.0
    } else {
        10.0
    };
    nice * magnitude
}

/// Axis maximum: `max` rounded up to a whole number of nice steps.
pub fn axis_ceiling(max: f64) -> f64 {
    let step = nice_step(max / Y_DIVISIONS as f64);
    (max / step).ceil().max(1.0) * step
}

/// Show every `n`th category label so labels do not overlap.
pub fn label_stride(categories: usize, width: f32) -> usize {
    if categories == 0 || width <= 0.0 {
        return 1;
    }
    let fit = (width / MIN_LABEL_WIDTH).floor().max(1.0) as usize;
    categories.div_ceil(fit).max(1)
}

/// Start and end angle of each slice, clockwise from 12 o'clock.
/// Non-positive values get an empty arc.
pub fn slice_angles(values: &[f64]) -> Vec<(f32, f32)> {
    let total: f64 = values.iter().filter(|v| **v > 0.0).sum();
    let mut start = -FRAC_PI_2;
    values
        .iter()
        .map(|v| {
            let sweep = if total > 0.0 && *v > 0.0 {
                (v / total) as f32 * TAU
            } else {
                0.0
            };
            let arc = (start, start + sweep);
            start += sweep;
            arc
        })
        .collect()
}

fn format_value(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{v:.0}")
    } else {
        format!("{v:.1}")
    }
}

fn plot_rect(outer: Rect) -> Rect {
    Rect::from_min_max(
        Pos2::new(outer.left() + LEFT_MARGIN, outer.top() + TOP_MARGIN),
        Pos2::new(outer.right() - RIGHT_MARGIN, outer.bottom() - BOTTOM_MARGIN),
    )
}

/// Gridlines, value labels and axis titles.
fn draw_value_axis(painter: &egui::Painter, plot: Rect, y_max: f64, y_title: &str, ui: &egui::Ui) {
    let grid = ui.visuals().widgets.noninteractive.bg_stroke.color;
    let text = ui.visuals().weak_text_color();
    let font = FontId::proportional(11.0);

    for i in 0..=Y_DIVISIONS {
        let value = y_max * i as f64 / Y_DIVISIONS as f64;
        let y = plot.bottom() - plot.height() * i as f32 / Y_DIVISIONS as f32;
        painter.line_segment(
            [Pos2::new(plot.left(), y), Pos2::new(plot.right(), y)],
            Stroke::new(1.0, grid),
        );
        painter.text(
            Pos2::new(plot.left() - 6.0, y),
            Align2::RIGHT_CENTER,
            format_value(value),
            font.clone(),
            text,
        );
    }

    if !y_title.is_empty() {
        painter.text(
            Pos2::new(plot.left() - LEFT_MARGIN + 2.0, plot.top() - TOP_MARGIN + 2.0),
            Align2::LEFT_TOP,
            y_title,
            font,
            text,
        );
    }
}

fn draw_category_labels(
    painter: &egui::Painter,
    plot: Rect,
    labels: &[&str],
    x_title: &str,
    ui: &egui::Ui,
) {
    let text = ui.visuals().text_color();
    let weak = ui.visuals().weak_text_color();
    let font = FontId::proportional(11.0);
    let n = labels.len().max(1);
    let slot = plot.width() / n as f32;
    let stride = label_stride(labels.len(), plot.width());

    for (i, label) in labels.iter().enumerate().step_by(stride) {
        let x = plot.left() + slot * (i as f32 + 0.5);
        painter.text(
            Pos2::new(x, plot.bottom() + 4.0),
            Align2::CENTER_TOP,
            *label,
            font.clone(),
            text,
        );
    }

    if !x_title.is_empty() {
        painter.text(
            Pos2::new(plot.center().x, plot.bottom() + BOTTOM_MARGIN - 2.0),
            Align2::CENTER_BOTTOM,
            x_title,
            font,
            weak,
        );
    }
}

// =============================================================================
// Widgets
// =============================================================================

/// Vertical bars, stacked when a bar has several segments.
pub fn bar_chart(ui: &mut egui::Ui, bars: &[Bar], x_title: &str, y_title: &str, height: f32) {
    let (response, painter) =
        ui.allocate_painter(Vec2::new(ui.available_width(), height), Sense::hover());
    let plot = plot_rect(response.rect);

    let max = bars.iter().map(Bar::total).fold(0.0, f64::max);
    let y_max = axis_ceiling(max);
    draw_value_axis(&painter, plot, y_max, y_title, ui);

    let n = bars.len().max(1);
    let slot = plot.width() / n as f32;
    let bar_width = (slot * 0.8).max(1.0);
    let scale = |v: f64| (v / y_max) as f32 * plot.height();

    let mut hovered: Option<&Bar> = None;
    for (i, bar) in bars.iter().enumerate() {
        let centre_x = plot.left() + slot * (i as f32 + 0.5);
        let mut base = plot.bottom();
        let last = bar.segments.len().saturating_sub(1);

        for (s, (value, colour)) in bar.segments.iter().enumerate() {
            let h = scale(value.max(0.0));
            if h <= 0.0 {
                continue;
            }
            let rect = Rect::from_min_max(
                Pos2::new(centre_x - bar_width / 2.0, base - h),
                Pos2::new(centre_x + bar_width / 2.0, base),
            );
            let radius = if s == last { theme::BAR_CORNER_RADIUS } else { 0.0 };
            painter.rect_filled(rect, radius, *colour);
            base -= h;
        }

        if let Some((text, colour)) = &bar.badge {
            let centre = Pos2::new(centre_x, base);
            painter.circle_filled(centre, theme::BADGE_RADIUS, theme::faded(*colour, 160));
            painter.text(
                centre,
                Align2::CENTER_CENTER,
                text,
                FontId::proportional(12.0),
                Color32::WHITE,
            );
        }

        if let Some(pos) = response.hover_pos() {
            if (pos.x - centre_x).abs() <= slot / 2.0 && plot.y_range().contains(pos.y) {
                hovered = Some(bar);
            }
        }
    }

    let labels: Vec<&str> = bars.iter().map(|b| b.label.as_str()).collect();
    draw_category_labels(&painter, plot, &labels, x_title, ui);

    if let Some(bar) = hovered {
        response.on_hover_text_at_pointer(bar.hover.as_str());
    }
}

/// Lines drawn over a shared category axis; the band under each line down
/// to the previous one is filled.
pub fn stacked_line_chart(
    ui: &mut egui::Ui,
    labels: &[&str],
    lines: &[Line],
    x_title: &str,
    y_title: &str,
    height: f32,
) {
    let (response, painter) =
        ui.allocate_painter(Vec2::new(ui.available_width(), height), Sense::hover());
    let plot = plot_rect(response.rect);

    let max = lines
        .iter()
        .flat_map(|l| l.values.iter().copied())
        .fold(0.0, f64::max);
    let y_max = axis_ceiling(max);
    draw_value_axis(&painter, plot, y_max, y_title, ui);

    let n = labels.len().max(1);
    let slot = plot.width() / n as f32;
    let point = |i: usize, v: f64| {
        Pos2::new(
            plot.left() + slot * (i as f32 + 0.5),
            plot.bottom() - (v.max(0.0) / y_max) as f32 * plot.height(),
        )
    };

    let mut floor: Vec<f64> = vec![0.0; labels.len()];
    for line in lines {
        let points: Vec<Pos2> = line
            .values
            .iter()
            .take(labels.len())
            .enumerate()
            .map(|(i, v)| point(i, *v))
            .collect();

        // Fill band between this line and the one beneath, one quad per interval.
        for i in 1..points.len() {
            let quad = vec![
                point(i - 1, floor[i - 1]),
                point(i, floor[i]),
                points[i],
                points[i - 1],
            ];
            painter.add(Shape::convex_polygon(
                quad,
                theme::faded(line.colour, 70),
                Stroke::NONE,
            ));
        }

        if points.len() > 1 {
            painter.add(Shape::line(points.clone(), Stroke::new(3.0, line.colour)));
        }
        for p in &points {
            painter.circle_filled(*p, 3.0, line.colour);
        }

        for (f, v) in floor.iter_mut().zip(&line.values) {
            *f = *v;
        }
    }

    draw_category_labels(&painter, plot, labels, x_title, ui);

    if let Some(pos) = response.hover_pos() {
        let idx = ((pos.x - plot.left()) / slot).floor();
        if idx >= 0.0 && (idx as usize) < labels.len() && plot.contains(pos) {
            let i = idx as usize;
            let mut text = labels[i].to_string();
            for line in lines {
                if let Some(v) = line.values.get(i) {
                    text.push_str(&format!("\n{}: {}", line.name, format_value(*v)));
                }
            }
            response.on_hover_text_at_pointer(text);
        }
    }
}

/// One horizontal bar split into coloured segments on a `0..axis_max` axis.
pub fn horizontal_stacked_bar(
    ui: &mut egui::Ui,
    segments: &[(String, f64, Color32)],
    axis_max: f64,
    height: f32,
) {
    let (response, painter) =
        ui.allocate_painter(Vec2::new(ui.available_width(), height), Sense::hover());
    let outer = response.rect;
    let track = Rect::from_min_max(
        Pos2::new(outer.left() + 4.0, outer.top() + 4.0),
        Pos2::new(outer.right() - 4.0, outer.bottom() - 18.0),
    );
    let axis_max = if axis_max > 0.0 { axis_max } else { 1.0 };
    let text = ui.visuals().weak_text_color();

    painter.rect_filled(track, theme::BAR_CORNER_RADIUS, ui.visuals().extreme_bg_color);

    let mut x = track.left();
    let mut hovered: Option<String> = None;
    for (label, value, colour) in segments {
        let w = ((value.max(0.0) / axis_max) as f32 * track.width()).min(track.right() - x);
        if w <= 0.0 {
            continue;
        }
        let rect = Rect::from_min_max(Pos2::new(x, track.top()), Pos2::new(x + w, track.bottom()));
        painter.rect_filled(rect, theme::BAR_CORNER_RADIUS, *colour);
        painter.line_segment(
            [rect.right_top(), rect.right_bottom()],
            Stroke::new(1.0, Color32::WHITE),
        );
        if rect.width() > 28.0 {
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                format_value(*value),
                FontId::proportional(12.0),
                Color32::WHITE,
            );
        }
        if response.hover_pos().is_some_and(|p| rect.contains(p)) {
            hovered = Some(format!("{label}: {}", format_value(*value)));
        }
        x += w;
    }

    painter.text(
        Pos2::new(track.left(), track.bottom() + 2.0),
        Align2::LEFT_TOP,
        "0",
        FontId::proportional(11.0),
        text,
    );
    painter.text(
        Pos2::new(track.right(), track.bottom() + 2.0),
        Align2::RIGHT_TOP,
        format_value(axis_max),
        FontId::proportional(11.0),
        text,
    );

    if let Some(tip) = hovered {
        response.on_hover_text_at_pointer(tip);
    }
}

/// Ring chart; each slice is labelled with its percentage.
pub fn doughnut(ui: &mut egui::Ui, slices: &[(String, f64, Option<f64>)], height: f32) {
    let (response, painter) =
        ui.allocate_painter(Vec2::new(ui.available_width(), height), Sense::hover());
    let centre = response.rect.center();
    let outer_r = (response.rect.width().min(response.rect.height()) / 2.0 - 6.0).max(10.0);
    let inner_r = outer_r * theme::DOUGHNUT_HOLE;

    let values: Vec<f64> = slices.iter().map(|(_, v, _)| *v).collect();
    let angles = slice_angles(&values);
    let at = |angle: f32, r: f32| centre + Vec2::angled(angle) * r;

    let hover_angle = response.hover_pos().and_then(|p| {
        let d = p - centre;
        let r = d.length();
        (r >= inner_r && r <= outer_r).then(|| {
            let a = d.y.atan2(d.x);
            // Normalise into the [-pi/2, 3pi/2) span the slices use.
            if a < -FRAC_PI_2 {
                a + TAU
            } else {
                a
            }
        })
    });

    let mut hovered: Option<usize> = None;
    for (i, (start, end)) in angles.iter().copied().enumerate() {
        if end <= start {
            continue;
        }
        let colour = theme::series_colour(i);
        let steps = ((end - start) / ARC_STEP).ceil().max(1.0) as usize;
        let step = (end - start) / steps as f32;
        for s in 0..steps {
            let a0 = start + step * s as f32;
            let a1 = a0 + step;
            painter.add(Shape::convex_polygon(
                vec![at(a0, inner_r), at(a0, outer_r), at(a1, outer_r), at(a1, inner_r)],
                colour,
                Stroke::NONE,
            ));
        }

        if let Some(Some(pct)) = slices.get(i).map(|(_, _, p)| *p) {
            let mid = (start + end) / 2.0;
            painter.text(
                at(mid, (inner_r + outer_r) / 2.0),
                Align2::CENTER_CENTER,
                format!("{pct:.1}%"),
                FontId::proportional(11.0),
                Color32::WHITE,
            );
        }

        if hover_angle.is_some_and(|a| a >= start && a < end) {
            hovered = Some(i);
        }
    }

    if let Some((label, value, pct)) = hovered.and_then(|i| slices.get(i)) {
        let pct = pct.map(|p| format!(" ({p:.1}%)")).unwrap_or_default();
        response.on_hover_text_at_pointer(format!("{label}: {}{pct}", format_value(*value)));
    }
}

/// Horizontal legend of coloured squares.
pub fn legend(ui: &mut egui::Ui, items: &[(&str, Color32)]) {
    ui.horizontal_wrapped(|ui| {
        for (name, colour) in items {
            let (rect, _) = ui.allocate_exact_size(Vec2::new(10.0, 10.0), Sense::hover());
            ui.painter().rect_filled(rect, 2.0, *colour);
            ui.label(*name);
            ui.add_space(8.0);
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nice_step() {
        assert_eq!(nice_step(0.7), 1.0);
        assert_eq!(nice_step(1.3), 2.0);
        assert_eq!(nice_step(3.0), 5.0);
        assert_eq!(nice_step(7.0), 10.0);
        assert_eq!(nice_step(23.0), 50.0);
        assert_eq!(nice_step(0.0), 1.0);
        assert_eq!(nice_step(f64::NAN), 1.0);
    }

    #[test]
    fn test_axis_ceiling_covers_max() {
        assert_eq!(axis_ceiling(0.0), 1.0);
        assert_eq!(axis_ceiling(3.0), 3.0);
        assert_eq!(axis_ceiling(17.0), 20.0);
        for max in [1.0, 9.0, 42.0, 999.0, 12_345.0] {
            assert!(axis_ceiling(max) >= max);
        }
    }

    #[test]
    fn test_label_stride() {
        assert_eq!(label_stride(0, 500.0), 1);
        assert_eq!(label_stride(5, 640.0), 1);
        // 640px fits 10 labels; 30 categories → every 3rd.
        assert_eq!(label_stride(30, 640.0), 3);
        assert_eq!(label_stride(10, 10.0), 10);
    }

    #[test]
    fn test_slice_angles_cover_full_circle() {
        let angles = slice_angles(&[1.0, 1.0, 2.0]);
        assert_eq!(angles.len(), 3);
        assert!((angles[0].0 + FRAC_PI_2).abs() < 1e-6);
        assert!((angles[2].1 - (TAU - FRAC_PI_2)).abs() < 1e-5);
        assert!(((angles[2].1 - angles[2].0) - TAU / 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_slice_angles_skip_non_positive() {
        let angles = slice_angles(&[0.0, -3.0, 5.0]);
        assert_eq!(angles[0].0, angles[0].1);
        assert_eq!(angles[1].0, angles[1].1);
        assert!(((angles[2].1 - angles[2].0) - TAU).abs() < 1e-5);

        let empty = slice_angles(&[0.0, 0.0]);
        assert!(empty.iter().all(|(a, b)| a == b));
    }
}

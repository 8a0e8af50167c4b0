// LineDash - ui/theme.rs
//
// Chart palette, visuals, and layout constants.
// No dependencies on app state or business logic.

use egui::Color32;

/// Primary scorecard number and first stacked series.
pub const PRIMARY: Color32 = Color32::from_rgb(0x63, 0x6E, 0xFA);
/// Extra scorecards, distribution bars, second stacked series.
pub const ACCENT: Color32 = Color32::from_rgb(0xFF, 0xA6, 0x00);
/// Trend bars.
pub const TREND: Color32 = Color32::from_rgb(0x66, 0xCD, 0xFB);
/// Badge behind stacked totals.
pub const TOTAL_BADGE: Color32 = Color32::from_rgb(0xFF, 0x57, 0x33);

/// Progress segment and doughnut slice colours, cycled.
pub const SERIES: [Color32; 5] = [
    Color32::from_rgb(0x63, 0x6E, 0xFA),
    Color32::from_rgb(0xEF, 0x55, 0x3B),
    Color32::from_rgb(0x00, 0xCC, 0x96),
    Color32::from_rgb(0xAB, 0x63, 0xFA),
    Color32::from_rgb(0xFF, 0xA1, 0x5A),
];

/// Colour for the `index`th slice or segment.
pub fn series_colour(index: usize) -> Color32 {
    SERIES[index % SERIES.len()]
}

/// Same colour at reduced opacity, for value badges and line fills.
pub fn faded(colour: Color32, alpha: u8) -> Color32 {
    Color32::from_rgba_unmultiplied(colour.r(), colour.g(), colour.b(), alpha)
}

/// Error text.
pub const ERROR_TEXT: Color32 = Color32::from_rgb(248, 113, 113); // Red 400
/// Warning text.
pub const WARNING_TEXT: Color32 = Color32::from_rgb(253, 186, 116); // Orange 300

/// Switch between the dark and light egui visuals.
pub fn apply(ctx: &egui::Context, dark_mode: bool) {
    let visuals = if dark_mode {
        egui::Visuals::dark()
    } else {
        egui::Visuals::light()
    };
    ctx.set_visuals(visuals);
}

/// Layout constants.
pub const SCORECARD_HEIGHT: f32 = 110.0;
pub const SCORECARD_VALUE_SIZE: f32 = 40.0;
pub const CHART_HEIGHT: f32 = 260.0;
pub const PROGRESS_HEIGHT: f32 = 70.0;
pub const BAR_CORNER_RADIUS: f32 = 6.0;
pub const BADGE_RADIUS: f32 = 13.0;
pub const DOUGHNUT_HOLE: f32 = 0.4;
pub const LOGIN_WIDTH: f32 = 320.0;
pub const ROW_HEIGHT: f32 = 20.0;

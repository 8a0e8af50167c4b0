// LineDash - ui/panels/login.rs
//
// Sign-in form shown in place of the dashboard while the login gate is
// closed. The password field is masked and cleared after every attempt.

use crate::app::state::DashboardState;
use crate::ui::theme;
use crate::util::constants;

/// Render the login form. Returns true once the user is signed in.
pub fn render(ctx: &egui::Context, state: &mut DashboardState) -> bool {
    let mut submitted = false;

    egui::CentralPanel::default().show(ctx, |ui| {
        ui.vertical_centered(|ui| {
            ui.add_space(ui.available_height() * 0.2);
            ui.label(egui::RichText::new(constants::DASHBOARD_TITLE).size(22.0).strong());
            ui.add_space(16.0);

            egui::Frame::group(ui.style()).show(ui, |ui| {
                ui.set_width(theme::LOGIN_WIDTH);
                ui.strong("Sign in");
                ui.add_space(6.0);

                egui::Grid::new("login_form")
                    .num_columns(2)
                    .spacing([8.0, 6.0])
                    .show(ui, |ui| {
                        ui.label("Username:");
                        let user = ui.text_edit_singleline(&mut state.login_username);
                        ui.end_row();

                        ui.label("Password:");
                        let pass = ui.add(
                            egui::TextEdit::singleline(&mut state.login_password).password(true),
                        );
                        ui.end_row();

                        let enter = ui.input(|i| i.key_pressed(egui::Key::Enter));
                        if enter && (user.lost_focus() || pass.lost_focus()) {
                            submitted = true;
                        }
                    });

                ui.add_space(6.0);
                if ui.button("Login").clicked() {
                    submitted = true;
                }

                if let Some(ref err) = state.login_error {
                    ui.add_space(4.0);
                    ui.colored_label(theme::ERROR_TEXT, err);
                }
            });
        });
    });

    submitted && state.attempt_login()
}

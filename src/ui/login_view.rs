use egui::{Button, Color32, RichText, TextEdit, Ui, vec2};
use log::{info, warn};

use windtunnel::{IdentityProvider, Route, identity::messages};

use super::{Dialog, FORM_WIDTH, PALETTE_BLUE, UiAction};

#[derive(Default)]
pub(crate) struct LoginForm {
    email: String,
    password: String,
}

impl LoginForm {
    pub(crate) fn show(
        &mut self,
        ui: &mut Ui,
        provider: &dyn IdentityProvider,
        actions: &mut Vec<UiAction>,
    ) {
        ui.vertical_centered(|ui| {
            ui.add_space(40.);
            ui.heading(RichText::new("Sign In").size(28.).strong());
            ui.add_space(20.);

            ui.add(
                TextEdit::singleline(&mut self.email)
                    .hint_text("Email")
                    .desired_width(FORM_WIDTH),
            );
            ui.add_space(6.);
            let password = ui.add(
                TextEdit::singleline(&mut self.password)
                    .hint_text("Password")
                    .password(true)
                    .desired_width(FORM_WIDTH),
            );
            ui.add_space(12.);

            let submitted = password.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
            if ui
                .add(
                    Button::new(RichText::new("Sign In").color(Color32::WHITE))
                        .fill(PALETTE_BLUE)
                        .min_size(vec2(FORM_WIDTH, 36.)),
                )
                .clicked()
                || submitted
            {
                self.submit(provider, actions);
            }

            ui.add_space(12.);
            if ui.link("Don't have an account? Register").clicked() {
                actions.push(UiAction::Push(Route::Register));
            }
        });
    }

    fn submit(&mut self, provider: &dyn IdentityProvider, actions: &mut Vec<UiAction>) {
        if let Err(message) = messages::validate_login_form(&self.email, &self.password) {
            actions.push(UiAction::Show(Dialog::error(message)));
            return;
        }

        match provider.sign_in(self.email.trim(), &self.password) {
            Err(e) => {
                warn!("Sign in failed: {} ({})", e, e.code());
                actions.push(UiAction::Show(Dialog::error(messages::sign_in_message(&e))));
            }
            Ok(principal) if !principal.email_verified => {
                info!("{} signed in with an unverified email", principal.email);
                actions.push(UiAction::Show(
                    Dialog::new("Email Verification", messages::EMAIL_NOT_VERIFIED)
                        .button("No", Vec::new())
                        .button("Yes", vec![UiAction::SendVerification(principal)]),
                ));
            }
            Ok(_) => {
                self.password.clear();
                actions.push(UiAction::Replace(Route::WingSelection));
            }
        }
    }
}

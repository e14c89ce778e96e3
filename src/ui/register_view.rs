use egui::{Button, Color32, RichText, TextEdit, Ui, vec2};
use log::warn;

use windtunnel::{IdentityProvider, Route, identity::messages};

use super::{Dialog, FORM_WIDTH, PALETTE_BLUE, UiAction};

#[derive(Default)]
pub(crate) struct RegisterForm {
    email: String,
    password: String,
    confirm_password: String,
}

impl RegisterForm {
    pub(crate) fn show(
        &mut self,
        ui: &mut Ui,
        provider: &dyn IdentityProvider,
        actions: &mut Vec<UiAction>,
    ) {
        ui.vertical_centered(|ui| {
            ui.add_space(40.);
            ui.heading(RichText::new("Register").size(28.).strong());
            ui.add_space(20.);

            for (value, hint, is_password) in [
                (&mut self.email, "Email", false),
                (&mut self.password, "Password", true),
                (&mut self.confirm_password, "Confirm password", true),
            ] {
                ui.add(
                    TextEdit::singleline(value)
                        .hint_text(hint)
                        .password(is_password)
                        .desired_width(FORM_WIDTH),
                );
                ui.add_space(6.);
            }
            ui.add_space(6.);

            if ui
                .add(
                    Button::new(RichText::new("Register").color(Color32::WHITE))
                        .fill(PALETTE_BLUE)
                        .min_size(vec2(FORM_WIDTH, 36.)),
                )
                .clicked()
            {
                self.submit(provider, actions);
            }

            ui.add_space(12.);
            if ui.link("Already have an account? Sign in").clicked() {
                actions.push(UiAction::Replace(Route::Login));
            }
        });
    }

    fn submit(&mut self, provider: &dyn IdentityProvider, actions: &mut Vec<UiAction>) {
        if let Err(message) =
            messages::validate_register_form(&self.email, &self.password, &self.confirm_password)
        {
            actions.push(UiAction::Show(Dialog::error(message)));
            return;
        }

        match provider.sign_up(self.email.trim(), &self.password) {
            Err(e) => {
                warn!("Registration failed: {} ({})", e, e.code());
                actions.push(UiAction::Show(Dialog::error(messages::sign_up_message(&e))));
            }
            Ok(_) => {
                self.password.clear();
                self.confirm_password.clear();
                actions.push(UiAction::Show(
                    Dialog::new("Success", messages::REGISTRATION_SUCCEEDED)
                        .button("OK", vec![UiAction::Replace(Route::Login)]),
                ));
            }
        }
    }
}

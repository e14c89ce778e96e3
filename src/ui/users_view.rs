use egui::{Color32, CornerRadius, Frame, Margin, RichText, Ui};

use windtunnel::Principal;

pub(crate) fn show_users(ui: &mut Ui, session: Option<&Principal>) {
    let Some(principal) = session else {
        ui.vertical_centered(|ui| {
            ui.add_space(30.);
            ui.label(RichText::new("No users signed in").color(Color32::GRAY));
        });
        return;
    };

    Frame::new()
        .fill(Color32::WHITE)
        .corner_radius(CornerRadius::same(8))
        .inner_margin(Margin::same(12))
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.label(RichText::new(principal.email.as_str()).size(16.).strong());
            ui.label(RichText::new(format!("UID: {}", principal.uid)).small().weak());
            if principal.email_verified {
                ui.colored_label(Color32::from_rgb(52, 199, 89), "Email verified");
            } else {
                ui.colored_label(Color32::from_rgb(255, 149, 0), "Email not verified");
            }
        });
}

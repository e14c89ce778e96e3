use egui::{Color32, CornerRadius, CursorIcon, Frame, Margin, RichText, Sense, Ui};

use windtunnel::{Route, WING_PROFILES};

use super::UiAction;

const CARD_CORNER_RADIUS: u8 = 10;

pub(crate) fn show_wing_selection(ui: &mut Ui, actions: &mut Vec<UiAction>) {
    ui.vertical_centered(|ui| {
        ui.add_space(10.);
        ui.heading(RichText::new("Select a Wing Profile").size(24.).strong());
    });
    ui.add_space(20.);

    for profile in WING_PROFILES.iter() {
        let card = Frame::new()
            .fill(Color32::WHITE)
            .corner_radius(CornerRadius::same(CARD_CORNER_RADIUS))
            .inner_margin(Margin::same(15))
            .show(ui, |ui| {
                ui.set_width(ui.available_width());
                ui.label(RichText::new(profile.name).size(18.).strong());
                ui.label(RichText::new(profile.description).color(Color32::GRAY));
                ui.label(
                    RichText::new(format!("Max wind speed: {:.0} m/s", profile.max_speed)).small(),
                );
            });

        let response = card
            .response
            .interact(Sense::click())
            .on_hover_cursor(CursorIcon::PointingHand);
        if response.clicked() {
            actions.push(UiAction::Push(Route::test(profile.id)));
        }
        ui.add_space(15.);
    }
}

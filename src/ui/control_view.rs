use egui::{Button, Color32, RichText, Slider, Ui, vec2};
use log::info;

use windtunnel::{Route, wing_profile::DEFAULT_PROFILE_ID};

use super::{Dialog, PALETTE_BLUE, UiAction};

const CONNECTED_COLOR: Color32 = Color32::from_rgb(52, 199, 89);
const DISCONNECTED_COLOR: Color32 = Color32::from_rgb(255, 59, 48);

/// Manual tunnel controls. The connection is a local toggle; there is no tunnel
/// on the other end.
#[derive(Default)]
pub(crate) struct ControlPanel {
    connected: bool,
    fan_speed_pct: f32,
    attack_angle_deg: f32,
}

impl ControlPanel {
    pub(crate) fn show(&mut self, ui: &mut Ui, actions: &mut Vec<UiAction>) {
        ui.vertical_centered(|ui| {
            ui.heading(RichText::new("Wind Tunnel Control").size(24.).strong());
            if ui.link("View Users").clicked() {
                actions.push(UiAction::Push(Route::Users));
            }
        });
        ui.add_space(12.);

        ui.group(|ui| {
            ui.horizontal(|ui| {
                let (status, color) = if self.connected {
                    ("Connected", CONNECTED_COLOR)
                } else {
                    ("Disconnected", DISCONNECTED_COLOR)
                };
                ui.label("Status:");
                ui.colored_label(color, status);
            });

            let (label, fill) = if self.connected {
                ("Disconnect", DISCONNECTED_COLOR)
            } else {
                ("Connect", CONNECTED_COLOR)
            };
            if ui
                .add(Button::new(RichText::new(label).color(Color32::WHITE)).fill(fill))
                .clicked()
            {
                self.connected = !self.connected;
                let dialog = if self.connected {
                    info!("Connected to wind tunnel");
                    Dialog::new("Success", "Connected to Wind Tunnel")
                } else {
                    info!("Disconnected from wind tunnel");
                    Dialog::new("Info", "Disconnected from Wind Tunnel")
                };
                actions.push(UiAction::Show(dialog));
            }
        });
        ui.add_space(12.);

        ui.group(|ui| {
            ui.label(format!("Fan Speed: {:.0}%", self.fan_speed_pct));
            ui.add_enabled(
                self.connected,
                Slider::new(&mut self.fan_speed_pct, 0.0..=100.0).suffix(" %"),
            );
            ui.label(format!("Attack Angle: {:.0}°", self.attack_angle_deg));
            ui.add_enabled(
                self.connected,
                Slider::new(&mut self.attack_angle_deg, -15.0..=15.0).suffix("°"),
            );
        });
        ui.add_space(12.);

        ui.vertical_centered(|ui| {
            let button = Button::new(RichText::new("Start Test").color(Color32::WHITE))
                .fill(if self.connected {
                    PALETTE_BLUE
                } else {
                    Color32::GRAY
                })
                .min_size(vec2(200., 40.));
            if ui.add(button).clicked() {
                actions.push(self.start_test_action());
            }
        });
    }

    fn start_test_action(&self) -> UiAction {
        if !self.connected {
            return UiAction::Show(Dialog::error("Please connect to the wind tunnel first"));
        }
        info!("Starting test from the control panel");
        UiAction::Push(Route::test(DEFAULT_PROFILE_ID))
    }
}

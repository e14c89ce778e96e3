mod control_view;
mod login_view;
mod register_view;
mod test_view;
mod users_view;
mod wing_selection_view;

use std::{sync::Arc, time::Duration};

use egui::{Align, Align2, Color32, Layout, RichText, Visuals, style::Widgets};
use log::{error, warn};

use windtunnel::{
    IdentityProvider, Navigator, Route, ScreenStack, SessionGuard,
    config::{AppConfig, WindowSize},
    find_profile,
    identity::{Principal, messages},
};

use control_view::ControlPanel;
use login_view::LoginForm;
use register_view::RegisterForm;
use test_view::TestScreen;

pub(crate) const PALETTE_BLUE: Color32 = Color32::from_rgb(0, 122, 255);
pub(crate) const PALETTE_LIGHT_GREY: Color32 = Color32::from_rgb(245, 245, 245);
pub(crate) const LIFT_COLOR: Color32 = Color32::from_rgb(0, 128, 255);
pub(crate) const DRAG_COLOR: Color32 = Color32::from_rgb(255, 0, 0);

pub(crate) const FORM_WIDTH: f32 = 280.;
// the guard is polled at least this often even when nothing is happening
const GUARD_POLL_MS: u64 = 100;

/// Something a screen asks the application to do once the frame is drawn.
pub(crate) enum UiAction {
    Replace(Route),
    Push(Route),
    Back,
    Show(Dialog),
    SignOut,
    SendVerification(Principal),
}

pub(crate) struct DialogButton {
    label: String,
    actions: Vec<UiAction>,
}

/// A modal message with optional buttons. Without buttons a plain "OK" is shown.
pub(crate) struct Dialog {
    title: String,
    message: String,
    buttons: Vec<DialogButton>,
}

impl Dialog {
    pub(crate) fn new(title: &str, message: &str) -> Self {
        Self {
            title: title.to_string(),
            message: message.to_string(),
            buttons: Vec::new(),
        }
    }

    pub(crate) fn error(message: &str) -> Self {
        Self::new("Error", message)
    }

    pub(crate) fn button(mut self, label: &str, actions: Vec<UiAction>) -> Self {
        self.buttons.push(DialogButton {
            label: label.to_string(),
            actions,
        });
        self
    }
}

enum Screen {
    Index,
    Login(LoginForm),
    Register(RegisterForm),
    WingSelection,
    Test(Box<TestScreen>),
    UnknownWing(String),
    Control(ControlPanel),
    Users,
}

/// `WindTunnelApp` hosts every screen of the wind tunnel demo.
///
/// # Fields
///
/// * `provider` - The identity provider users authenticate against.
/// * `navigator` - The screen stack.
/// * `guard` - Keeps the screen stack consistent with the session.
/// * `screens` - State of every screen on the stack. A screen keeps its state
///   while others are pushed over it and is dropped, stopping any running test,
///   once it leaves the stack.
/// * `dialog` - The message box currently shown, if any.
/// * `app_config` - The config in effect, command line overrides included.
/// * `saved_config` - The config file contents written back on exit. `None` when
///   the file must not be overwritten.
pub(crate) struct WindTunnelApp {
    provider: Arc<dyn IdentityProvider>,
    navigator: Navigator,
    guard: SessionGuard,
    screens: ScreenStack<Screen>,
    dialog: Option<Dialog>,
    app_config: AppConfig,
    saved_config: Option<AppConfig>,
}

impl WindTunnelApp {
    pub(crate) fn new(
        provider: Arc<dyn IdentityProvider>,
        app_config: AppConfig,
        saved_config: Option<AppConfig>,
        cc: &eframe::CreationContext<'_>,
    ) -> Self {
        let default_visuals = Visuals {
            dark_mode: false,
            hyperlink_color: PALETTE_BLUE,
            panel_fill: PALETTE_LIGHT_GREY,
            widgets: Widgets::light(),
            striped: true,
            ..Visuals::light()
        };
        cc.egui_ctx.set_visuals(default_visuals);

        let navigator = Navigator::default();
        let guard = SessionGuard::mount(provider.clone(), navigator.current());

        Self {
            provider,
            navigator,
            guard,
            screens: ScreenStack::default(),
            dialog: None,
            app_config,
            saved_config,
        }
    }

    /// Keep one screen state per stack entry, building the ones that are new.
    fn mount_screens(&mut self) {
        let app_config = &self.app_config;
        self.screens
            .sync(&self.navigator, |route| build_screen(route, app_config));
    }

    /// Remember the window size so the next session opens at the same size.
    fn track_window_size(&mut self, ctx: &egui::Context) {
        if let Some(saved_config) = self.saved_config.as_mut()
            && let Some(inner_rect) = ctx.input(|i| i.viewport().inner_rect)
        {
            saved_config.window_size = WindowSize {
                width: inner_rect.width(),
                height: inner_rect.height(),
            };
        }
    }

    fn apply(&mut self, actions: Vec<UiAction>) {
        for action in actions {
            match action {
                UiAction::Replace(route) => self.navigator.replace(route),
                UiAction::Push(route) => self.navigator.push(route),
                UiAction::Back => {
                    self.navigator.back();
                }
                UiAction::Show(dialog) => self.dialog = Some(dialog),
                UiAction::SignOut => {
                    if let Err(e) = self.provider.sign_out() {
                        error!("Sign out failed: {}", e);
                        self.dialog = Some(Dialog::error(messages::SIGN_OUT_FAILED));
                    }
                }
                UiAction::SendVerification(principal) => {
                    self.dialog = Some(match self.provider.send_verification_email(&principal) {
                        Ok(()) => Dialog::new("Success", messages::VERIFICATION_SENT),
                        Err(e) => {
                            error!("Could not send verification email: {}", e);
                            Dialog::error(messages::VERIFICATION_FAILED)
                        }
                    });
                }
            }
        }
    }

    fn header_view(&self, ctx: &egui::Context, actions: &mut Vec<UiAction>) {
        egui::TopBottomPanel::top("header")
            .min_height(36.)
            .show(ctx, |ui| {
                ui.with_layout(Layout::left_to_right(Align::Center), |ui| {
                    if self.navigator.can_go_back() && ui.button("< Back").clicked() {
                        actions.push(UiAction::Back);
                    }
                    ui.heading(
                        RichText::new(self.navigator.current().title())
                            .color(PALETTE_BLUE)
                            .strong(),
                    );

                    if let Some(principal) = self.guard.session() {
                        ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                            if ui.button("Sign out").clicked() {
                                actions.push(UiAction::SignOut);
                            }
                            if ui.button("Users").clicked() {
                                actions.push(UiAction::Push(Route::Users));
                            }
                            if ui.button("Control").clicked() {
                                actions.push(UiAction::Push(Route::Control));
                            }
                            ui.label(RichText::new(principal.email.as_str()).weak());
                        });
                    }
                });
            });
    }

    fn dialog_view(&mut self, ctx: &egui::Context, actions: &mut Vec<UiAction>) {
        let Some(dialog) = &self.dialog else {
            return;
        };

        let mut clicked: Option<usize> = None;
        egui::Window::new(dialog.title.as_str())
            .collapsible(false)
            .resizable(false)
            .anchor(Align2::CENTER_CENTER, [0., 0.])
            .show(ctx, |ui| {
                ui.label(dialog.message.as_str());
                ui.add_space(8.);
                ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                    if dialog.buttons.is_empty() {
                        if ui.button("OK").clicked() {
                            clicked = Some(0);
                        }
                    } else {
                        // right to left: last button is the rightmost
                        for (idx, button) in dialog.buttons.iter().enumerate().rev() {
                            if ui.button(button.label.as_str()).clicked() {
                                clicked = Some(idx);
                            }
                        }
                    }
                });
            });

        if let Some(idx) = clicked
            && let Some(dialog) = self.dialog.take()
        {
            if let Some(button) = dialog.buttons.into_iter().nth(idx) {
                actions.extend(button.actions);
            }
        }
    }
}

fn build_screen(route: &Route, app_config: &AppConfig) -> Screen {
    match route {
        Route::Index => Screen::Index,
        Route::Login => Screen::Login(LoginForm::default()),
        Route::Register => Screen::Register(RegisterForm::default()),
        Route::WingSelection => Screen::WingSelection,
        Route::Test { wing_id } => match find_profile(wing_id) {
            Some(profile) => Screen::Test(Box::new(TestScreen::new(profile, app_config))),
            None => {
                warn!("Unknown wing profile requested: {}", wing_id);
                Screen::UnknownWing(wing_id.clone())
            }
        },
        Route::Control => Screen::Control(ControlPanel::default()),
        Route::Users => Screen::Users,
    }
}

impl eframe::App for WindTunnelApp {
    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        if let Some(saved_config) = &self.saved_config
            && let Err(e) = saved_config.save()
        {
            error!("Error while saving config file: {}", e);
        }
    }

    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.guard.poll(&mut self.navigator);
        self.mount_screens();
        self.track_window_size(ctx);

        let mut actions = Vec::new();
        self.header_view(ctx, &mut actions);

        egui::CentralPanel::default().show(ctx, |ui| {
            let provider = self.provider.as_ref();
            let Some(screen) = self.screens.top_mut() else {
                return;
            };
            match screen {
                Screen::Index => {
                    ui.centered_and_justified(|ui| {
                        ui.spinner();
                    });
                    if self.guard.is_session_known() {
                        let target = if self.guard.session().is_some() {
                            Route::DEFAULT_AUTHENTICATED
                        } else {
                            Route::DEFAULT_UNAUTHENTICATED
                        };
                        actions.push(UiAction::Replace(target));
                    }
                }
                Screen::Login(form) => form.show(ui, provider, &mut actions),
                Screen::Register(form) => form.show(ui, provider, &mut actions),
                Screen::WingSelection => wing_selection_view::show_wing_selection(ui, &mut actions),
                Screen::Test(test) => test.show(ui, &mut actions),
                Screen::UnknownWing(wing_id) => {
                    ui.vertical_centered(|ui| {
                        ui.add_space(40.);
                        ui.colored_label(
                            Color32::RED,
                            format!("Unknown wing profile: {}", wing_id),
                        );
                        if ui.button("Back").clicked() {
                            actions.push(UiAction::Back);
                        }
                    });
                }
                Screen::Control(panel) => panel.show(ui, &mut actions),
                Screen::Users => users_view::show_users(ui, self.guard.session()),
            }
        });

        self.dialog_view(ctx, &mut actions);
        self.apply(actions);

        ctx.request_repaint_after(Duration::from_millis(GUARD_POLL_MS));
    }
}

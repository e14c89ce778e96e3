use std::time::Duration;

use egui::{Button, Color32, Grid, ProgressBar, RichText, ScrollArea, Ui, Vec2b, vec2};
use egui_extras::{Column, TableBuilder};
use egui_plot::{Legend, Line, PlotPoints};
use log::info;

use windtunnel::{
    TestRun, TestStatus, TickOutcome, Ticker, WingProfile, config::AppConfig,
    measurement::HISTORY_LEN,
};

use super::{DRAG_COLOR, Dialog, LIFT_COLOR, PALETTE_BLUE, UiAction};

const CHART_HEIGHT: f32 = 220.;
const ANGLE_BUTTON_SIZE: f32 = 36.;

/// The test screen: one [`TestRun`] and the ticker driving it.
///
/// Dropping the screen drops the ticker, which stops its thread.
pub(crate) struct TestScreen {
    run: TestRun,
    ticker: Option<Ticker>,
    tick_interval: Duration,
}

impl TestScreen {
    pub(crate) fn new(profile: &'static WingProfile, app_config: &AppConfig) -> Self {
        Self {
            run: TestRun::new(profile).with_angle_bound(app_config.angle_upper_bound),
            ticker: None,
            tick_interval: Duration::from_millis(app_config.tick_interval_ms),
        }
    }

    fn start(&mut self, ctx: &egui::Context) {
        if !self.run.start_test() {
            return;
        }
        let ctx = ctx.clone();
        self.ticker = Some(Ticker::start_with_waker(self.tick_interval, move || {
            ctx.request_repaint()
        }));
    }

    fn process_ticks(&mut self) {
        let Some(ticker) = &self.ticker else {
            return;
        };
        let pending = ticker.drain().count();
        for _ in 0..pending {
            if self.run.tick() == TickOutcome::Completed {
                // stops the ticker thread
                self.ticker = None;
                break;
            }
        }
    }

    pub(crate) fn show(&mut self, ui: &mut Ui, actions: &mut Vec<UiAction>) {
        self.process_ticks();

        ScrollArea::vertical().show(ui, |ui| {
            let profile = self.run.profile();
            ui.vertical_centered(|ui| {
                ui.heading(RichText::new("Wind Tunnel Test").size(24.).strong());
                ui.label(RichText::new(profile.name).size(18.).color(PALETTE_BLUE));
                ui.label(RichText::new(profile.description).color(Color32::GRAY));
            });
            ui.add_space(12.);

            self.controls(ui);
            ui.add_space(12.);
            self.forces_chart(ui);
            ui.add_space(12.);
            self.readings(ui);
            ui.add_space(12.);
            self.history_table(ui);
            ui.add_space(12.);
            self.status_area(ui, actions);
        });
    }

    fn controls(&mut self, ui: &mut Ui) {
        ui.group(|ui| {
            ui.label(RichText::new("Wind Speed").strong());
            ui.label(format!("{:.1} m/s", self.run.wind_speed()));
            ui.add(ProgressBar::new(self.run.progress()).fill(PALETTE_BLUE));
        });

        ui.group(|ui| {
            ui.label(RichText::new("Angle of Attack").strong());
            ui.horizontal(|ui| {
                let angle = self.run.angle_of_attack();
                if ui
                    .add_enabled(
                        angle > 0,
                        Button::new("-").min_size(vec2(ANGLE_BUTTON_SIZE, ANGLE_BUTTON_SIZE)),
                    )
                    .clicked()
                {
                    self.run.decrease_angle();
                }
                ui.label(RichText::new(format!("{}°", angle)).size(20.));
                if ui
                    .add_enabled(
                        self.run.accepts_angle(angle.saturating_add(1)),
                        Button::new("+").min_size(vec2(ANGLE_BUTTON_SIZE, ANGLE_BUTTON_SIZE)),
                    )
                    .clicked()
                {
                    self.run.increase_angle();
                }
            });
        });
    }

    fn forces_chart(&self, ui: &mut Ui) {
        ui.label(RichText::new("Force Change").strong());

        let mut lift_vec = Vec::<[f64; 2]>::new();
        let mut drag_vec = Vec::<[f64; 2]>::new();
        for (idx, sample) in self.run.history().iter().enumerate() {
            lift_vec.push([idx as f64, sample.lift]);
            drag_vec.push([idx as f64, sample.drag]);
        }

        egui_plot::Plot::new("forces")
            .height(CHART_HEIGHT)
            .legend(Legend::default())
            .allow_drag(false)
            .allow_scroll(false)
            .allow_zoom(false)
            .include_x(0.)
            .include_x((HISTORY_LEN - 1) as f64)
            .include_y(0.)
            .auto_bounds(Vec2b::new(false, true))
            .show(ui, |plot_ui| {
                plot_ui.line(Line::new("Lift", PlotPoints::new(lift_vec)).color(LIFT_COLOR));
                plot_ui.line(Line::new("Drag", PlotPoints::new(drag_vec)).color(DRAG_COLOR));
            });
    }

    fn readings(&self, ui: &mut Ui) {
        Grid::new("readings")
            .num_columns(2)
            .spacing([40., 6.])
            .striped(true)
            .show(ui, |ui| {
                ui.label("Lift Force");
                ui.label(RichText::new(format!("{:.2} N", self.run.lift())).strong());
                ui.end_row();
                ui.label("Drag Force");
                ui.label(RichText::new(format!("{:.2} N", self.run.drag())).strong());
                ui.end_row();
                ui.label("Pressure");
                ui.label(RichText::new(format!("{:.2} Pa", self.run.pressure())).strong());
                ui.end_row();
                ui.label("Temperature");
                ui.label(RichText::new(format!("{:.1} °C", self.run.temperature())).strong());
                ui.end_row();
            });
    }

    fn history_table(&self, ui: &mut Ui) {
        if self.run.history().is_empty() {
            return;
        }
        TableBuilder::new(ui)
            .striped(true)
            .vscroll(false)
            .columns(Column::remainder(), 3)
            .header(20., |mut header| {
                for title in ["Speed (m/s)", "Lift (N)", "Drag (N)"] {
                    header.col(|ui| {
                        ui.strong(title);
                    });
                }
            })
            .body(|mut body| {
                for sample in self.run.history() {
                    body.row(18., |mut row| {
                        for value in [sample.speed, sample.lift, sample.drag] {
                            row.col(|ui| {
                                ui.label(format!("{:.1}", value));
                            });
                        }
                    });
                }
            });
    }

    fn status_area(&mut self, ui: &mut Ui, actions: &mut Vec<UiAction>) {
        ui.vertical_centered(|ui| match self.run.status() {
            TestStatus::Ready => {
                if ui
                    .add(
                        Button::new(RichText::new("Start Test").color(Color32::WHITE).size(18.))
                            .fill(Color32::from_rgb(76, 175, 80))
                            .min_size(vec2(200., 40.)),
                    )
                    .clicked()
                {
                    self.start(ui.ctx());
                }
            }
            TestStatus::Running => {
                ui.label(RichText::new("Test running...").size(18.));
                ui.add(
                    ProgressBar::new(self.run.progress())
                        .show_percentage()
                        .fill(PALETTE_BLUE),
                );
            }
            TestStatus::Completed => {
                ui.label(
                    RichText::new("Test Completed!")
                        .size(20.)
                        .color(Color32::from_rgb(76, 175, 80))
                        .strong(),
                );
                if let Some(summary) = self.run.summary() {
                    ui.label(format!("Maximum Speed: {:.1} m/s", summary.max_speed));
                    ui.label(format!("Angle of Attack: {}°", summary.angle_of_attack));
                    ui.label(format!("Lift Force: {:.2} N", summary.lift));
                    ui.label(format!("Drag Force: {:.2} N", summary.drag));
                }
                ui.add_space(8.);
                if ui.button("Save Results").clicked() {
                    info!("Test results acknowledged for {}", self.run.profile().name);
                    actions.push(UiAction::Show(Dialog::new("Success", "Test results saved")));
                    actions.push(UiAction::Back);
                }
            }
        });
    }
}

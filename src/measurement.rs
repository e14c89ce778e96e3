use std::collections::VecDeque;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::wing_profile::WingProfile;

/// Time between two ticks of a running test
pub const TICK_INTERVAL_MS: u64 = 500;
/// Wind speed added on every tick (m/s)
pub const SPEED_STEP: f64 = 0.5;
/// Number of samples kept for the chart
pub const HISTORY_LEN: usize = 10;

const LIFT_COEFFICIENT: f64 = 0.5;
const DRAG_COEFFICIENT: f64 = 0.2;
const PRESSURE_PER_SPEED: f64 = 10.;
const AMBIENT_TEMPERATURE_C: f64 = 25.;
const TEMPERATURE_PER_SPEED: f64 = 0.1;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TestStatus {
    #[default]
    Ready,
    Running,
    Completed,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Forces {
    pub lift: f64,
    pub drag: f64,
}

/// One point of the rolling chart history, rounded to one decimal.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub speed: f64,
    pub lift: f64,
    pub drag: f64,
}

/// Upper limit accepted by [`TestRun::set_angle`].
///
/// `ProfileMaxSpeed` reuses the profile's speed ceiling as the angle limit, which
/// is how the tunnel has always behaved. `Degrees` sets an explicit limit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum AngleUpperBound {
    #[default]
    ProfileMaxSpeed,
    Degrees(i32),
}

impl AngleUpperBound {
    pub fn resolve(&self, profile: &WingProfile) -> f64 {
        match self {
            Self::ProfileMaxSpeed => profile.max_speed,
            Self::Degrees(degrees) => *degrees as f64,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// The test is not running; nothing changed
    Idle,
    Advanced,
    /// Max speed was reached on this tick and the run is over
    Completed,
}

/// Final values of a completed run.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TestSummary {
    pub profile_name: String,
    pub max_speed: f64,
    pub angle_of_attack: i32,
    pub lift: f64,
    pub drag: f64,
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0. }
}

fn round_one_decimal(value: f64) -> f64 {
    finite_or_zero((finite_or_zero(value) * 10.).round() / 10.)
}

/// Lift and drag on the wing for a wind speed (m/s) and attack angle (degrees).
///
/// `lift = v² · cos(α) · 0.5`, `drag = v² · sin(α) · 0.2`. Non-finite results are
/// reported as zero.
pub fn compute_forces(speed: f64, angle_deg: f64) -> Forces {
    let angle_rad = angle_deg * std::f64::consts::PI / 180.;
    let speed_sq = speed.powi(2);
    Forces {
        lift: finite_or_zero(speed_sq * angle_rad.cos() * LIFT_COEFFICIENT),
        drag: finite_or_zero(speed_sq * angle_rad.sin() * DRAG_COEFFICIENT),
    }
}

/// State of one simulated test on one wing profile.
///
/// The run is a state machine `Ready -> Running -> Completed` advanced by
/// [`TestRun::tick`]. It does not own a timer: the caller drives it, see
/// [`crate::ticker::Ticker`].
#[derive(Clone, Debug)]
pub struct TestRun {
    profile: &'static WingProfile,
    angle_bound: AngleUpperBound,
    status: TestStatus,
    wind_speed: f64,
    angle_of_attack: i32,
    forces: Forces,
    pressure: f64,
    temperature: f64,
    history: VecDeque<Sample>,
}

impl TestRun {
    pub fn new(profile: &'static WingProfile) -> Self {
        Self {
            profile,
            angle_bound: AngleUpperBound::default(),
            status: TestStatus::Ready,
            wind_speed: 0.,
            angle_of_attack: 0,
            forces: Forces::default(),
            pressure: 0.,
            temperature: AMBIENT_TEMPERATURE_C,
            history: VecDeque::with_capacity(HISTORY_LEN + 1),
        }
    }

    pub fn with_angle_bound(mut self, angle_bound: AngleUpperBound) -> Self {
        self.angle_bound = angle_bound;
        self
    }

    pub fn profile(&self) -> &'static WingProfile {
        self.profile
    }

    pub fn status(&self) -> TestStatus {
        self.status
    }

    pub fn wind_speed(&self) -> f64 {
        self.wind_speed
    }

    pub fn angle_of_attack(&self) -> i32 {
        self.angle_of_attack
    }

    pub fn lift(&self) -> f64 {
        self.forces.lift
    }

    pub fn drag(&self) -> f64 {
        self.forces.drag
    }

    pub fn pressure(&self) -> f64 {
        self.pressure
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    /// Samples oldest first, at most [`HISTORY_LEN`] of them.
    pub fn history(&self) -> &VecDeque<Sample> {
        &self.history
    }

    /// Begin the run. Returns false when the run is already running or finished.
    pub fn start_test(&mut self) -> bool {
        match self.status {
            TestStatus::Running => {
                debug!("start ignored: test already running");
                false
            }
            TestStatus::Completed => {
                debug!("start ignored: test already completed");
                false
            }
            TestStatus::Ready => {
                self.history.clear();
                self.wind_speed = 0.;
                self.status = TestStatus::Running;
                info!("Test started on {}", self.profile.name);
                true
            }
        }
    }

    /// Advance the running test by one step of [`SPEED_STEP`].
    pub fn tick(&mut self) -> TickOutcome {
        if self.status != TestStatus::Running {
            return TickOutcome::Idle;
        }

        let mut outcome = TickOutcome::Advanced;
        let mut speed = self.wind_speed + SPEED_STEP;
        if speed >= self.profile.max_speed {
            speed = self.profile.max_speed;
            self.status = TestStatus::Completed;
            outcome = TickOutcome::Completed;
        }
        self.wind_speed = finite_or_zero(speed);

        let forces = compute_forces(self.wind_speed, self.angle_of_attack as f64);
        self.pressure = finite_or_zero(self.wind_speed * PRESSURE_PER_SPEED);
        self.temperature =
            finite_or_zero(AMBIENT_TEMPERATURE_C + self.wind_speed * TEMPERATURE_PER_SPEED);
        self.publish(forces);

        debug!(
            "tick: speed {:.1} m/s, lift {:.2} N, drag {:.2} N",
            self.wind_speed, self.forces.lift, self.forces.drag
        );
        if outcome == TickOutcome::Completed {
            info!(
                "Test completed on {} at {:.1} m/s",
                self.profile.name, self.wind_speed
            );
        }
        outcome
    }

    /// Change the attack angle. Rejected outside `0..=upper bound`; on success the
    /// forces are recomputed at the current speed and a sample is recorded, even
    /// when the test is not running.
    pub fn set_angle(&mut self, new_angle: i32) -> bool {
        if !self.accepts_angle(new_angle) {
            debug!("angle {} rejected", new_angle);
            return false;
        }
        self.angle_of_attack = new_angle;
        let forces = compute_forces(self.wind_speed, new_angle as f64);
        self.publish(forces);
        true
    }

    pub fn accepts_angle(&self, angle: i32) -> bool {
        angle >= 0 && angle as f64 <= self.angle_bound.resolve(self.profile)
    }

    pub fn increase_angle(&mut self) -> bool {
        self.set_angle(self.angle_of_attack.saturating_add(1))
    }

    pub fn decrease_angle(&mut self) -> bool {
        self.set_angle(self.angle_of_attack.saturating_sub(1))
    }

    /// Wind speed as a fraction of the profile's maximum.
    pub fn progress(&self) -> f32 {
        if self.profile.max_speed <= 0. {
            return 0.;
        }
        (self.wind_speed / self.profile.max_speed).clamp(0., 1.) as f32
    }

    pub fn summary(&self) -> Option<TestSummary> {
        if self.status != TestStatus::Completed {
            return None;
        }
        Some(TestSummary {
            profile_name: self.profile.name.to_string(),
            max_speed: self.wind_speed,
            angle_of_attack: self.angle_of_attack,
            lift: self.forces.lift,
            drag: self.forces.drag,
        })
    }

    fn publish(&mut self, forces: Forces) {
        self.forces = forces;
        self.history.push_back(Sample {
            speed: round_one_decimal(self.wind_speed),
            lift: round_one_decimal(forces.lift),
            drag: round_one_decimal(forces.drag),
        });
        while self.history.len() > HISTORY_LEN {
            self.history.pop_front();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wing_profile::{WING_PROFILES, find_profile};
    use proptest::prelude::*;

    const EPSILON: f64 = 1e-9;

    static SLOW_PROFILE: WingProfile = WingProfile {
        id: "slow",
        name: "Slow",
        description: "Test profile",
        max_speed: 2.2,
    };

    fn naca0012() -> &'static WingProfile {
        find_profile("naca0012").unwrap()
    }

    #[test]
    fn test_compute_forces_at_zero_angle() {
        let forces = compute_forces(0.5, 0.);
        assert!((forces.lift - 0.125).abs() < EPSILON);
        assert!(forces.drag.abs() < EPSILON);
    }

    #[test]
    fn test_compute_forces_at_right_angle() {
        let forces = compute_forces(10., 90.);
        assert!(forces.lift.abs() < 1e-6);
        assert!((forces.drag - 20.).abs() < EPSILON);
    }

    #[test]
    fn test_compute_forces_non_finite_is_zero() {
        let forces = compute_forces(f64::INFINITY, 0.);
        assert_eq!(forces.lift, 0.);
        let forces = compute_forces(f64::NAN, 45.);
        assert_eq!(forces, Forces::default());
        let forces = compute_forces(3., f64::INFINITY);
        assert_eq!(forces, Forces::default());
    }

    #[test]
    fn test_first_tick() {
        let mut run = TestRun::new(naca0012());
        assert_eq!(run.status(), TestStatus::Ready);
        assert_eq!(run.tick(), TickOutcome::Idle);

        assert!(run.start_test());
        assert_eq!(run.tick(), TickOutcome::Advanced);
        assert_eq!(run.wind_speed(), 0.5);
        assert!((run.lift() - 0.125).abs() < EPSILON);
        assert_eq!(run.drag(), 0.);
        assert_eq!(run.pressure(), 5.);
        assert!((run.temperature() - 25.05).abs() < EPSILON);
        assert_eq!(
            run.history().back(),
            Some(&Sample {
                speed: 0.5,
                lift: 0.1,
                drag: 0.
            })
        );
    }

    #[test]
    fn test_sixty_ticks_complete_exactly_at_max_speed() {
        let mut run = TestRun::new(naca0012());
        run.start_test();
        for tick in 1..60 {
            assert_eq!(run.tick(), TickOutcome::Advanced, "tick {}", tick);
            assert_eq!(run.status(), TestStatus::Running);
        }
        assert_eq!(run.tick(), TickOutcome::Completed);
        assert_eq!(run.wind_speed(), 30.);
        assert_eq!(run.status(), TestStatus::Completed);
        assert_eq!(run.progress(), 1.);

        // completed is terminal
        assert_eq!(run.tick(), TickOutcome::Idle);
        assert!(!run.start_test());
        assert_eq!(run.wind_speed(), 30.);
    }

    #[test]
    fn test_speed_is_clamped_to_max() {
        let mut run = TestRun::new(&SLOW_PROFILE);
        run.start_test();
        let mut outcomes = Vec::new();
        loop {
            let outcome = run.tick();
            outcomes.push(outcome);
            assert!(run.wind_speed() <= SLOW_PROFILE.max_speed);
            if outcome == TickOutcome::Completed {
                break;
            }
        }
        // 0.5, 1.0, 1.5, 2.0, then 2.5 clamps to 2.2
        assert_eq!(outcomes.len(), 5);
        assert_eq!(run.wind_speed(), 2.2);
        assert_eq!(run.history().back().map(|s| s.speed), Some(2.2));
    }

    #[test]
    fn test_start_while_running_is_noop() {
        let mut run = TestRun::new(naca0012());
        run.start_test();
        run.tick();
        run.tick();
        let history = run.history().clone();
        let speed = run.wind_speed();

        assert!(!run.start_test());
        assert_eq!(run.status(), TestStatus::Running);
        assert_eq!(run.history(), &history);
        assert_eq!(run.wind_speed(), speed);
    }

    #[test]
    fn test_start_clears_angle_samples() {
        let mut run = TestRun::new(naca0012());
        assert!(run.set_angle(5));
        assert_eq!(run.history().len(), 1);
        run.start_test();
        assert!(run.history().is_empty());
        assert_eq!(run.angle_of_attack(), 5);
    }

    #[test]
    fn test_tick_uses_current_angle() {
        let mut run = TestRun::new(naca0012());
        run.start_test();
        for _ in 0..20 {
            run.tick();
        }
        assert!(run.set_angle(90));
        run.tick();
        assert_eq!(run.wind_speed(), 10.5);
        assert!((run.drag() - 10.5f64.powi(2) * 0.2).abs() < 1e-9);
        assert!(run.lift().abs() < 1e-6);
    }

    #[test]
    fn test_set_angle_records_sample_when_idle() {
        let mut run = TestRun::new(naca0012());
        assert!(run.set_angle(10));
        assert_eq!(run.status(), TestStatus::Ready);
        assert_eq!(run.history().len(), 1);
        // at zero speed there is no force whatever the angle
        assert_eq!(run.lift(), 0.);
        assert_eq!(run.drag(), 0.);
    }

    #[test]
    fn test_angle_bound_reuses_max_speed_by_default() {
        let mut run = TestRun::new(naca0012());
        assert!(run.set_angle(30));
        assert!(!run.set_angle(31));
        assert!(!run.set_angle(-1));
        assert_eq!(run.angle_of_attack(), 30);
        assert_eq!(run.history().len(), 1);
        assert!(!run.increase_angle());
        assert!(run.decrease_angle());
        assert_eq!(run.angle_of_attack(), 29);
    }

    #[test]
    fn test_angle_bound_in_degrees() {
        let mut run =
            TestRun::new(naca0012()).with_angle_bound(AngleUpperBound::Degrees(15));
        assert!(run.set_angle(15));
        assert!(!run.set_angle(16));
        let mut run = TestRun::new(naca0012()).with_angle_bound(AngleUpperBound::Degrees(90));
        assert!(run.set_angle(45));
    }

    #[test]
    fn test_summary_only_when_completed() {
        let mut run = TestRun::new(&WING_PROFILES[1]);
        assert!(run.summary().is_none());
        run.set_angle(4);
        run.start_test();
        while run.tick() != TickOutcome::Completed {}
        let summary = run.summary().unwrap();
        assert_eq!(summary.profile_name, "NACA 2412");
        assert_eq!(summary.max_speed, 30.);
        assert_eq!(summary.angle_of_attack, 4);
        assert_eq!(summary.lift, run.lift());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn prop_history_is_bounded_fifo(
            angles in proptest::collection::vec(prop_oneof![Just(None), (0i32..=30).prop_map(Some)], 0..80),
        ) {
            let mut run = TestRun::new(naca0012());
            run.start_test();
            let mut expected: Vec<Sample> = Vec::new();
            for angle in angles {
                let changed = match angle {
                    Some(angle) => run.set_angle(angle),
                    None => run.tick() != TickOutcome::Idle,
                };
                if changed {
                    let last = *run.history().back().unwrap();
                    expected.push(last);
                }
                prop_assert!(run.history().len() <= HISTORY_LEN);
                prop_assert!(run.wind_speed() <= naca0012().max_speed);
            }
            let tail: Vec<Sample> = expected
                .iter()
                .skip(expected.len().saturating_sub(HISTORY_LEN))
                .copied()
                .collect();
            let history: Vec<Sample> = run.history().iter().copied().collect();
            prop_assert_eq!(history, tail);
        }

        #[test]
        fn prop_published_values_are_finite(speed in any::<f64>(), angle in any::<f64>()) {
            let forces = compute_forces(speed, angle);
            prop_assert!(forces.lift.is_finite());
            prop_assert!(forces.drag.is_finite());
        }
    }
}

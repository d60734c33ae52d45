use std::sync::Arc;

use bevy::prelude::*;

use super::components::KinematicBody;
use super::constants::{BRAKE_REVERSE_THRESHOLD, REVERSE_ACCEL_SCALE};
use super::drift::{DriftState, DriftStateMachine, SlipMeasurement, TransitionState};
use super::error::ConfigurationError;
use super::math::{
    apply_friction, forward_vector, lerp, normalize_angle, per_second_retention, tick_retention,
};
use super::tuning::PhysicsTuning;
use crate::input::InputSignal;
use crate::state_snapshot::CarPhysicsSnapshot;

/// Simulates one car. Owns its body and drift state exclusively; the tuning is shared.
#[derive(Component, Debug, Clone)]
pub struct CarIntegrator {
    tuning: Arc<PhysicsTuning>,
    body: KinematicBody,
    drift: DriftStateMachine,
    // slip measured at the start of the last update
    slip: SlipMeasurement,
    last_input: InputSignal,
}

impl CarIntegrator {
    /// Spawn a car at rest. Rejects bad tuning before any frame can run.
    pub fn new(
        tuning: Arc<PhysicsTuning>,
        position: Vec2,
        rotation_degrees: f32,
    ) -> Result<Self, ConfigurationError> {
        tuning.validate()?;
        Ok(Self {
            tuning,
            body: KinematicBody::at_rest(position, rotation_degrees),
            drift: DriftStateMachine::new(),
            slip: SlipMeasurement::default(),
            last_input: InputSignal::default(),
        })
    }

    pub fn tuning(&self) -> &PhysicsTuning {
        &self.tuning
    }

    pub fn body(&self) -> &KinematicBody {
        &self.body
    }

    pub fn drift_state(&self) -> DriftState {
        self.drift.current_state()
    }

    pub fn transition(&self) -> TransitionState {
        self.drift.transition()
    }

    pub fn effective_friction(&self) -> f32 {
        self.drift.effective_friction(&self.tuning)
    }

    /// Advance one frame.
    ///
    /// The steps run in a fixed order and each one depends on the previous one,
    /// so they must not be rearranged. A non-positive or non-finite
    /// `delta_seconds` leaves the car untouched.
    pub fn update(&mut self, signal: &InputSignal, delta_seconds: f32) {
        if !delta_seconds.is_finite() || delta_seconds <= 0.0 {
            return;
        }
        let tuning: &PhysicsTuning = &self.tuning;
        let body = &mut self.body;

        // Heading for the whole frame
        let forward = forward_vector(body.rotation_degrees);

        // Classify on last frame's velocity
        self.slip = SlipMeasurement::measure(body.velocity, forward);
        self.drift
            .update(self.slip.lateral_velocity, signal.handbrake_held, delta_seconds, tuning);

        apply_throttle(body, forward, signal.acceleration_axis, tuning, delta_seconds);
        apply_steering(body, signal.steering_axis, tuning, delta_seconds);

        // Friction, blended across regime changes
        apply_friction(
            &mut body.velocity,
            self.drift.effective_friction(tuning),
            delta_seconds,
        );

        // Extra speed bleed while sliding
        let retention = match self.drift.current_state() {
            DriftState::Normal => 1.0,
            DriftState::Drift => {
                per_second_retention(tuning.drift_speed_retention_per_second, delta_seconds)
            }
            DriftState::Handbrake => {
                per_second_retention(tuning.handbrake_speed_retention_per_second, delta_seconds)
            }
        };
        body.velocity *= retention;

        // Ambient drag
        body.velocity *= tick_retention(tuning.drag, delta_seconds);
        body.angular_velocity *= tick_retention(tuning.angular_drag, delta_seconds);

        clamp_speeds(body, forward, tuning);

        body.position += body.velocity * delta_seconds;
        self.last_input = *signal;
    }

    /// Put the car back at rest, settled in `Normal`. Body, drift state and
    /// cached slip are all replaced together.
    pub fn reset(&mut self, position: Vec2, rotation_degrees: f32) {
        info!(
            "car reset to ({:.1}, {:.1}) heading {:.1}",
            position.x, position.y, rotation_degrees
        );
        self.body = KinematicBody::at_rest(position, rotation_degrees);
        self.drift.reset();
        self.slip = SlipMeasurement::default();
        self.last_input = InputSignal::default();
    }

    /// Independent copy of the current state.
    pub fn snapshot(&self) -> CarPhysicsSnapshot {
        CarPhysicsSnapshot::capture(
            &self.body,
            &self.slip,
            self.drift.current_state(),
            &self.last_input,
        )
    }
}

/// Turn rate (deg/s) for a speed: the tight rate up to `speed_threshold_tight`,
/// then blending toward the high-speed rate as speed approaches `max_speed`.
pub fn turn_rate_for_speed(speed: f32, tuning: &PhysicsTuning) -> f32 {
    if speed <= tuning.speed_threshold_tight {
        return tuning.turn_rate_low;
    }
    let span = tuning.max_speed - tuning.speed_threshold_tight;
    if span <= 0.0 {
        return tuning.turn_rate_high;
    }
    let t = (speed - tuning.speed_threshold_tight) / span;
    lerp(tuning.turn_rate_low, tuning.turn_rate_high, t)
}

fn apply_throttle(
    body: &mut KinematicBody,
    forward: Vec2,
    acceleration_axis: f32,
    tuning: &PhysicsTuning,
    delta_seconds: f32,
) {
    if acceleration_axis > 0.0 {
        body.velocity += forward * tuning.acceleration * delta_seconds;
    } else if acceleration_axis < 0.0 {
        let forward_speed = body.velocity.dot(forward);
        if forward_speed > BRAKE_REVERSE_THRESHOLD {
            // Brake opposes forward motion, capped at a full stop for this frame
            let brake = (tuning.brake_force * delta_seconds).min(forward_speed);
            body.velocity -= forward * brake;
        } else {
            // Reverse is slower than forward acceleration
            body.velocity -= forward * tuning.acceleration * REVERSE_ACCEL_SCALE * delta_seconds;
        }
    }
}

fn apply_steering(
    body: &mut KinematicBody,
    steering_axis: f32,
    tuning: &PhysicsTuning,
    delta_seconds: f32,
) {
    if steering_axis == 0.0 {
        return;
    }
    let turn_rate = turn_rate_for_speed(body.speed(), tuning);
    body.angular_velocity = turn_rate * steering_axis;
    body.rotation_degrees =
        normalize_angle(body.rotation_degrees + body.angular_velocity * delta_seconds);
}

fn clamp_speeds(body: &mut KinematicBody, forward: Vec2, tuning: &PhysicsTuning) {
    body.velocity = body.velocity.clamp_length_max(tuning.max_speed);

    let forward_speed = body.velocity.dot(forward);
    if forward_speed < -tuning.reverse_speed_limit {
        body.velocity += forward * (-tuning.reverse_speed_limit - forward_speed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    const DT: f32 = 1.0 / 60.0;
    const EPS: f32 = 1e-3;

    fn car_with(tuning: PhysicsTuning) -> CarIntegrator {
        CarIntegrator::new(Arc::new(tuning), Vec2::ZERO, 0.0).unwrap()
    }

    // friction and drag that keep everything, so only the step under test moves velocity
    fn frictionless() -> PhysicsTuning {
        PhysicsTuning {
            friction_normal: 1.0,
            friction_drift: 1.0,
            friction_handbrake: 1.0,
            drag: 1.0,
            ..Default::default()
        }
    }

    fn throttle(axis: f32) -> InputSignal {
        InputSignal {
            acceleration_axis: axis,
            ..Default::default()
        }
    }

    #[test]
    fn test_new_rejects_invalid_tuning() {
        let tuning = PhysicsTuning {
            acceleration: -5.0,
            ..Default::default()
        };
        assert!(CarIntegrator::new(Arc::new(tuning), Vec2::ZERO, 0.0).is_err());
    }

    #[test]
    fn test_acceleration_plateaus_below_max_speed() {
        let mut car = car_with(PhysicsTuning {
            max_speed: 400.0,
            acceleration: 300.0,
            friction_normal: 0.95,
            drag: 0.99,
            ..Default::default()
        });

        let mut last_speed = 0.0;
        for _ in 0..60 {
            car.update(&throttle(1.0), DT);
            let speed = car.body().speed();
            assert!(speed >= last_speed);
            last_speed = speed;
        }
        assert!(last_speed > 0.0 && last_speed < 400.0);
        assert_eq!(car.drift_state(), DriftState::Normal);
        // moved along +x
        assert!(car.body().position.x > 0.0);
        assert!(car.body().position.y.abs() < EPS);
    }

    #[test]
    fn test_speed_never_exceeds_max() {
        let mut car = car_with(PhysicsTuning {
            acceleration: 5000.0,
            friction_normal: 1.0,
            drag: 1.0,
            ..Default::default()
        });
        for _ in 0..600 {
            car.update(&throttle(1.0), DT);
            assert!(car.body().speed() <= car.tuning().max_speed + EPS);
        }
        assert!((car.body().speed() - car.tuning().max_speed).abs() < EPS);
    }

    #[test]
    fn test_speed_clamp_holds_under_random_input() {
        let mut rng = StdRng::seed_from_u64(67);
        let mut car = car_with(PhysicsTuning {
            acceleration: 2000.0,
            ..Default::default()
        });
        for _ in 0..2000 {
            let signal = InputSignal {
                acceleration_axis: rng.random_range(-1..=1) as f32,
                steering_axis: rng.random_range(-1..=1) as f32,
                handbrake_held: rng.random_bool(0.1),
                ..Default::default()
            };
            let dt = rng.random_range(1.0 / 144.0..1.0 / 30.0);
            car.update(&signal, dt);
            let body = car.body();
            assert!(body.speed() <= car.tuning().max_speed + EPS);
            assert!(body.velocity.is_finite() && body.position.is_finite());
            assert!((0.0..360.0).contains(&body.rotation_degrees));
        }
    }

    #[test]
    fn test_reverse_speed_limited() {
        let mut car = car_with(PhysicsTuning::default());
        let limit = car.tuning().reverse_speed_limit;
        for _ in 0..600 {
            car.update(&throttle(-1.0), DT);
            let forward_speed = car.body().velocity.dot(forward_vector(car.body().rotation_degrees));
            assert!(forward_speed >= -limit - EPS);
        }
        // default tuning reverses hard enough to reach the limit
        assert!((car.body().velocity.x + limit).abs() < EPS);
    }

    #[test]
    fn test_brake_applies_full_force_above_standstill() {
        let mut car = car_with(frictionless());
        car.body.velocity = Vec2::new(100.0, 0.0);
        car.update(&throttle(-1.0), DT);

        let expected = 100.0 - car.tuning().brake_force * DT;
        assert!((car.body().velocity.x - expected).abs() < 1e-4);
    }

    #[test]
    fn test_brake_stops_without_reversing_in_one_frame() {
        let mut car = car_with(frictionless());
        car.body.velocity = Vec2::new(10.0, 0.0);
        car.update(&throttle(-1.0), DT);
        // 900 * 1/60 = 15 > 10, so the brake stops at zero rather than overshooting
        assert_eq!(car.body().velocity, Vec2::ZERO);

        // from standstill the same input reverses
        car.update(&throttle(-1.0), DT);
        assert!(car.body().velocity.x < 0.0);
    }

    #[test]
    fn test_reverse_is_half_strength() {
        let mut reversing = car_with(frictionless());
        reversing.update(&throttle(-1.0), DT);

        let mut accelerating = car_with(frictionless());
        accelerating.update(&throttle(1.0), DT);

        let expected = -reversing.tuning().acceleration * REVERSE_ACCEL_SCALE * DT;
        assert!((reversing.body().velocity.x - expected).abs() < 1e-5);
        assert!((reversing.body().velocity.x + accelerating.body().velocity.x * 0.5).abs() < 1e-5);
        assert_eq!(reversing.body().velocity.y, 0.0);
    }

    #[test]
    fn test_handbrake_bleeds_more_speed_than_drift() {
        let tuning = frictionless();
        let pull = InputSignal {
            handbrake_held: true,
            ..Default::default()
        };

        let mut handbraking = car_with(tuning.clone());
        handbraking.body.velocity = Vec2::new(300.0, 0.0);
        handbraking.drift.update(0.0, true, 1.0, &tuning);
        assert_eq!(handbraking.drift_state(), DriftState::Handbrake);

        let mut drifting = car_with(tuning.clone());
        drifting.body.velocity = Vec2::new(300.0, 0.0);
        drifting.drift.update(500.0, false, 1.0, &tuning);
        assert_eq!(drifting.drift_state(), DriftState::Drift);

        let per_frame = per_second_retention(tuning.handbrake_speed_retention_per_second, DT);
        for _ in 0..10 {
            let before = handbraking.body().speed();
            handbraking.update(&pull, DT);
            assert!((handbraking.body().speed() - before * per_frame).abs() < 1e-3);

            drifting.update(&InputSignal::default(), DT);
        }

        // still inside the blend back to Normal, so the slide keeps its drift loss
        assert_eq!(handbraking.drift_state(), DriftState::Handbrake);
        assert_eq!(drifting.drift_state(), DriftState::Drift);
        assert!(handbraking.body().speed() < drifting.body().speed());
    }

    #[test]
    fn test_turn_rate_for_speed() {
        let tuning = PhysicsTuning::default();
        assert_eq!(turn_rate_for_speed(0.0, &tuning), tuning.turn_rate_low);
        assert_eq!(
            turn_rate_for_speed(tuning.speed_threshold_tight, &tuning),
            tuning.turn_rate_low
        );
        assert_eq!(turn_rate_for_speed(tuning.max_speed, &tuning), tuning.turn_rate_high);
        assert_eq!(
            turn_rate_for_speed(tuning.max_speed * 2.0, &tuning),
            tuning.turn_rate_high
        );

        let mid = (tuning.speed_threshold_tight + tuning.max_speed) / 2.0;
        let expected = (tuning.turn_rate_low + tuning.turn_rate_high) / 2.0;
        assert!((turn_rate_for_speed(mid, &tuning) - expected).abs() < EPS);
    }

    #[test]
    fn test_steering_at_rest_uses_tight_rate() {
        let mut car = car_with(PhysicsTuning::default());
        let signal = InputSignal {
            steering_axis: 1.0,
            ..Default::default()
        };
        for _ in 0..30 {
            car.update(&signal, DT);
        }
        let expected = car.tuning().turn_rate_low * 0.5;
        assert!((car.body().rotation_degrees - expected).abs() < 0.01);
        let yaw = car.tuning().turn_rate_low * tick_retention(car.tuning().angular_drag, DT);
        assert!((car.body().angular_velocity - yaw).abs() < EPS);

        // releasing the wheel keeps the heading and lets the yaw rate decay
        car.update(&InputSignal::default(), DT);
        assert!((car.body().rotation_degrees - expected).abs() < 0.01);
        assert!(car.body().angular_velocity < yaw);
    }

    #[test]
    fn test_steering_left_wraps_heading() {
        let mut car = car_with(PhysicsTuning::default());
        let signal = InputSignal {
            steering_axis: -1.0,
            ..Default::default()
        };
        car.update(&signal, DT);
        let expected = 360.0 - car.tuning().turn_rate_low * DT;
        assert!((car.body().rotation_degrees - expected).abs() < 0.01);
    }

    #[test]
    fn test_handbrake_overrides_drift() {
        let mut car = car_with(PhysicsTuning {
            drift_threshold: 100.0,
            ..Default::default()
        });
        // heading +x, sliding sideways at 150
        car.body.velocity = Vec2::new(0.0, 150.0);
        let signal = InputSignal {
            handbrake_held: true,
            ..Default::default()
        };

        car.update(&signal, DT);
        assert_eq!(car.transition().target, DriftState::Handbrake);

        for _ in 0..30 {
            car.update(&signal, DT);
        }
        assert_eq!(car.drift_state(), DriftState::Handbrake);
        assert!(car.snapshot().handbraking);
    }

    #[test]
    fn test_lateral_slip_blends_into_drift() {
        let tuning = PhysicsTuning {
            drift_threshold: 100.0,
            ..Default::default()
        };
        let mut car = car_with(tuning.clone());
        car.body.velocity = Vec2::new(0.0, 300.0);

        car.update(&InputSignal::default(), DT);
        assert_eq!(car.drift_state(), DriftState::Normal);
        assert_eq!(car.transition().target, DriftState::Drift);
        let friction = car.effective_friction();
        assert!(friction > tuning.friction_normal && friction < tuning.friction_drift);

        let snapshot = car.snapshot();
        assert!((snapshot.lateral_velocity - 300.0).abs() < EPS);
        assert!((snapshot.drift_angle_degrees - 90.0).abs() < EPS);
    }

    #[test]
    fn test_drift_bleeds_more_speed_than_grip() {
        let tuning = PhysicsTuning {
            friction_normal: 0.99,
            friction_drift: 0.99,
            ..Default::default()
        };
        let mut gripping = car_with(tuning.clone());
        gripping.body.velocity = Vec2::new(300.0, 0.0);

        let mut sliding = car_with(tuning.clone());
        sliding.body.velocity = Vec2::new(300.0, 0.0);
        sliding.drift.update(500.0, false, 1.0, &tuning);
        assert_eq!(sliding.drift_state(), DriftState::Drift);

        // the slide starts unwinding this frame but is still settled in Drift
        gripping.update(&InputSignal::default(), DT);
        sliding.update(&InputSignal::default(), DT);
        assert_eq!(sliding.drift_state(), DriftState::Drift);
        assert!(sliding.body().speed() < gripping.body().speed());
    }

    #[test]
    fn test_zero_delta_leaves_state_unchanged() {
        let mut car = car_with(PhysicsTuning::default());
        car.update(&throttle(1.0), DT);
        let before = car.snapshot();
        car.update(&throttle(1.0), 0.0);
        car.update(&throttle(1.0), f32::NAN);
        assert_eq!(car.snapshot(), before);
    }

    #[test]
    fn test_reset_replaces_body_and_drift_state() {
        let mut car = car_with(PhysicsTuning::default());
        car.body.velocity = Vec2::new(0.0, 300.0);
        let signal = InputSignal {
            handbrake_held: true,
            acceleration_axis: 1.0,
            ..Default::default()
        };
        for _ in 0..10 {
            car.update(&signal, DT);
        }
        assert_ne!(car.transition(), TransitionState::settled(DriftState::Normal));

        car.reset(Vec2::new(50.0, -20.0), 450.0);
        let snapshot = car.snapshot();
        assert_eq!(snapshot.position, Vec2::new(50.0, -20.0));
        assert_eq!(snapshot.velocity, Vec2::ZERO);
        assert_eq!(snapshot.rotation_degrees, 90.0);
        assert_eq!(snapshot.drift_state, DriftState::Normal);
        assert_eq!(snapshot.lateral_velocity, 0.0);
        assert!(!snapshot.handbraking && !snapshot.accelerating);
        assert_eq!(car.transition(), TransitionState::settled(DriftState::Normal));
    }

    #[test]
    fn test_snapshot_is_an_independent_copy() {
        let mut car = car_with(PhysicsTuning::default());
        car.update(&throttle(1.0), DT);

        let first = car.snapshot();
        let second = car.snapshot();
        assert_eq!(first, second);

        let mut edited = car.snapshot();
        edited.position = Vec2::new(1000.0, 1000.0);
        edited.drift_state = DriftState::Handbrake;
        assert_eq!(car.snapshot(), first);
        assert_eq!(car.body().position, first.position);
    }

    #[test]
    fn test_identical_runs_are_deterministic() {
        let tuning = Arc::new(PhysicsTuning::default());
        let mut a = CarIntegrator::new(tuning.clone(), Vec2::new(5.0, 5.0), 30.0).unwrap();
        let mut b = CarIntegrator::new(tuning, Vec2::new(5.0, 5.0), 30.0).unwrap();

        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1000 {
            let signal = InputSignal {
                acceleration_axis: rng.random_range(-1..=1) as f32,
                steering_axis: rng.random_range(-1..=1) as f32,
                handbrake_held: rng.random_bool(0.2),
                ..Default::default()
            };
            let dt = rng.random_range(1.0 / 144.0..1.0 / 30.0);
            a.update(&signal, dt);
            b.update(&signal, dt);
            assert_eq!(a.snapshot(), b.snapshot());
        }
    }
}

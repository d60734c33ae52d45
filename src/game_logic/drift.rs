//! Friction-regime classification with a timed blend between regimes.
//!
//! Each frame the car is classified as `Normal`, `Drift` or `Handbrake`. A change
//! of classification does not switch friction instantly: the effective friction
//! slides from the settled regime toward the new one over
//! `transition_duration_seconds`, then the new regime settles.

use bevy::prelude::*;

use super::constants::TRANSITION_SETTLE_EPSILON;
use super::math::{lateral_axis, lerp, rad_to_deg};
use super::tuning::PhysicsTuning;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DriftState {
    #[default]
    Normal,
    Drift,
    Handbrake,
}

impl DriftState {
    pub fn as_str(&self) -> &'static str {
        match self {
            DriftState::Normal => "Normal",
            DriftState::Drift => "Drift",
            DriftState::Handbrake => "Handbrake",
        }
    }

    /// Target regime for this frame. Handbrake overrides everything.
    pub fn classify(lateral_velocity: f32, handbrake_held: bool, drift_threshold: f32) -> Self {
        if handbrake_held {
            DriftState::Handbrake
        } else if lateral_velocity.abs() >= drift_threshold {
            DriftState::Drift
        } else {
            DriftState::Normal
        }
    }
}

/// Blend bookkeeping. `progress == 1.0` means `current == target` and nothing is blending.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitionState {
    pub current: DriftState,
    pub target: DriftState,
    pub progress: f32,
}

impl TransitionState {
    pub fn settled(state: DriftState) -> Self {
        Self {
            current: state,
            target: state,
            progress: 1.0,
        }
    }

    pub fn is_settled(&self) -> bool {
        self.progress >= 1.0
    }
}

impl Default for TransitionState {
    fn default() -> Self {
        Self::settled(DriftState::Normal)
    }
}

/// Velocity decomposed against the heading.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SlipMeasurement {
    pub forward_speed: f32,
    pub lateral_velocity: f32,
    pub drift_angle_degrees: f32,
}

impl SlipMeasurement {
    /// `forward` must be a unit vector. A zero velocity measures as no slip.
    pub fn measure(velocity: Vec2, forward: Vec2) -> Self {
        let forward_speed = velocity.dot(forward);
        let lateral_velocity = velocity.dot(lateral_axis(forward));
        let drift_angle_degrees = if velocity.length_squared() > 0.0 {
            rad_to_deg(lateral_velocity.atan2(forward_speed))
        } else {
            0.0
        };
        Self {
            forward_speed,
            lateral_velocity,
            drift_angle_degrees,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DriftStateMachine {
    transition: TransitionState,
}

impl DriftStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transition(&self) -> TransitionState {
        self.transition
    }

    pub fn current_state(&self) -> DriftState {
        self.transition.current
    }

    pub fn target_state(&self) -> DriftState {
        self.transition.target
    }

    pub fn progress(&self) -> f32 {
        self.transition.progress
    }

    /// Replace the whole transition record at once.
    pub fn reset(&mut self) {
        self.transition = TransitionState::default();
    }

    /// Classify this frame and advance the blend.
    ///
    /// A new target restarts the blend from zero even mid-transition; the last
    /// classification wins. Non-positive or non-finite `delta_seconds` leaves the
    /// machine untouched.
    pub fn update(
        &mut self,
        lateral_velocity: f32,
        handbrake_held: bool,
        delta_seconds: f32,
        tuning: &PhysicsTuning,
    ) {
        if !delta_seconds.is_finite() || delta_seconds <= 0.0 {
            return;
        }

        let target = DriftState::classify(lateral_velocity, handbrake_held, tuning.drift_threshold);
        let t = &mut self.transition;

        if target != t.target {
            debug!(
                "drift target {} -> {} (lateral {:.1})",
                t.target.as_str(),
                target.as_str(),
                lateral_velocity
            );
            t.target = target;
            t.progress = 0.0;
        }

        if t.progress < 1.0 {
            t.progress += delta_seconds / tuning.transition_duration_seconds;
            if t.progress >= 1.0 - TRANSITION_SETTLE_EPSILON {
                t.progress = 1.0;
            }
        }

        if t.progress >= 1.0 && t.current != t.target {
            debug!("drift state settled: {}", t.target.as_str());
            t.current = t.target;
        }
    }

    /// Friction coefficient for this frame, blended while a transition is running.
    pub fn effective_friction(&self, tuning: &PhysicsTuning) -> f32 {
        let t = &self.transition;
        let settled = tuning.friction_for(t.current);
        if t.is_settled() {
            settled
        } else {
            lerp(settled, tuning.friction_for(t.target), t.progress)
        }
    }
}

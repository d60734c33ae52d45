use bevy::prelude::*;

use crate::game_logic::{DriftState, KinematicBody, SlipMeasurement};
use crate::input::InputSignal;

/// Read-only copy of a car's physics state for the renderer and scoring.
///
/// Always handed out by value; nothing in it points back into the integrator.
#[derive(Component, Clone, Copy, Debug, Default, PartialEq)]
pub struct CarPhysicsSnapshot {
    pub position: Vec2,
    pub velocity: Vec2,
    pub rotation_degrees: f32,
    pub angular_velocity: f32,
    pub speed: f32,
    pub lateral_velocity: f32,
    pub drift_angle_degrees: f32,
    pub drift_state: DriftState,
    pub accelerating: bool,
    pub braking: bool,
    pub handbraking: bool,
}

impl CarPhysicsSnapshot {
    pub fn capture(
        body: &KinematicBody,
        slip: &SlipMeasurement,
        drift_state: DriftState,
        input: &InputSignal,
    ) -> Self {
        Self {
            position: body.position,
            velocity: body.velocity,
            rotation_degrees: body.rotation_degrees,
            angular_velocity: body.angular_velocity,
            speed: body.speed(),
            lateral_velocity: slip.lateral_velocity,
            drift_angle_degrees: slip.drift_angle_degrees,
            drift_state,
            accelerating: input.is_accelerating(),
            braking: input.is_braking(),
            handbraking: input.handbrake_held,
        }
    }

    /// Place a sprite for this snapshot. The simulation is y-down and Bevy is
    /// y-up, so y and the rotation sense are flipped.
    pub fn apply_to_transform(&self, transform: &mut Transform) {
        transform.translation.x = self.position.x;
        transform.translation.y = -self.position.y;
        transform.rotation = Quat::from_rotation_z(-self.rotation_degrees.to_radians());
    }
}

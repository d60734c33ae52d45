use bevy::prelude::*;

use super::math::normalize_angle;

#[derive(Component)]
pub struct Car;

#[derive(Component)]
pub struct PlayerControlled;

/// Where a car goes back to on restart.
#[derive(Component, Clone, Copy, Debug, PartialEq)]
pub struct SpawnPoint {
    pub position: Vec2,
    pub rotation_degrees: f32,
}

/// Position, heading and velocity of one car. Speed is always derived.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct KinematicBody {
    pub position: Vec2,
    pub velocity: Vec2,
    /// Heading in degrees, kept in `[0, 360)`.
    pub rotation_degrees: f32,
    /// Yaw rate in degrees/sec from the most recent steering input.
    pub angular_velocity: f32,
}

impl KinematicBody {
    /// A body at rest.
    pub fn at_rest(position: Vec2, rotation_degrees: f32) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            rotation_degrees: normalize_angle(rotation_degrees),
            angular_velocity: 0.0,
        }
    }

    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }
}

use bevy::prelude::*;

use crate::game_logic::PlayerControlled;
use crate::state_snapshot::CarPhysicsSnapshot;

// Camera-related constants
pub const WIN_W: f32 = 1280.;
pub const WIN_H: f32 = 720.;

pub fn camera_setup(mut commands: Commands) {
    commands.spawn(Camera2d);
}

// Camera movement system that follows the player
pub fn move_camera(
    player_car: Single<&CarPhysicsSnapshot, With<PlayerControlled>>,
    mut camera: Single<&mut Transform, (With<Camera>, Without<PlayerControlled>)>,
) {
    // simulation is y-down, the camera lives in bevy's y-up space
    let target = Vec3::new(player_car.position.x, -player_car.position.y, camera.translation.z);

    // round to integers to prevent subpixel jitter
    camera.translation = target.round();
}

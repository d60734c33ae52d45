//! Stateless numeric helpers shared by the drift state machine and the integrator.
//!
//! Angles are in degrees. Rotation 0° points along +x and 90° along +y, which is
//! screen-down in the simulation's y-down convention.

use bevy::math::Vec2;

use super::constants::REFERENCE_TICKS_PER_SECOND;

pub fn deg_to_rad(degrees: f32) -> f32 {
    degrees.to_radians()
}

pub fn rad_to_deg(radians: f32) -> f32 {
    radians.to_degrees()
}

/// Wrap an angle into `[0, 360)`. Multiples of 360 map to `0.0`, never `-0.0`.
pub fn normalize_angle(degrees: f32) -> f32 {
    let wrapped = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs, and
    // returns -0.0 for negative multiples of 360
    if wrapped == 0.0 || wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Shortest signed rotation from `from` to `to`, in `[-180, 180]`.
pub fn angle_difference(from: f32, to: f32) -> f32 {
    let delta = normalize_angle(to - from);
    if delta > 180.0 { delta - 360.0 } else { delta }
}

/// Linear blend with `t` clamped to `[0, 1]`; never extrapolates.
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    a + (b - a) * t
}

/// Unit vector the nose points along for a heading in degrees.
pub fn forward_vector(rotation_degrees: f32) -> Vec2 {
    let (sin, cos) = deg_to_rad(rotation_degrees).sin_cos();
    Vec2::new(cos, sin)
}

/// Right-hand perpendicular of `forward`: `(-forward.y, forward.x)`.
pub fn lateral_axis(forward: Vec2) -> Vec2 {
    Vec2::new(-forward.y, forward.x)
}

/// Scale factor for a coefficient expressed as "fraction kept per 1/60 s tick",
/// generalized to an arbitrary frame duration.
///
/// Returns `1.0` for a non-positive or non-finite `delta_seconds` so callers
/// leave their state untouched.
pub fn tick_retention(coefficient: f32, delta_seconds: f32) -> f32 {
    if !delta_seconds.is_finite() || delta_seconds <= 0.0 {
        return 1.0;
    }
    coefficient
        .clamp(0.0, 1.0)
        .powf(delta_seconds * REFERENCE_TICKS_PER_SECOND)
}

/// Exponential friction decay: `velocity *= coefficient^(delta_seconds * 60)`.
///
/// `coefficient == 1` leaves the velocity alone, `coefficient == 0` stops it.
pub fn apply_friction(velocity: &mut Vec2, friction_coefficient: f32, delta_seconds: f32) {
    *velocity *= tick_retention(friction_coefficient, delta_seconds);
}

/// Per-second retention (`retention^delta_seconds`), used for drift speed loss.
pub fn per_second_retention(retention_per_second: f32, delta_seconds: f32) -> f32 {
    if !delta_seconds.is_finite() || delta_seconds <= 0.0 {
        return 1.0;
    }
    retention_per_second.clamp(0.0, 1.0).powf(delta_seconds)
}

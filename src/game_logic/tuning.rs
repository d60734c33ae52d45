use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::constants::*;
use super::drift::DriftState;
use super::error::ConfigurationError;

/// Handling constants for one car model.
///
/// Built once at startup, validated, then shared read-only (typically behind an
/// `Arc`) by every car that uses it. Speeds are in units/sec, turn rates in
/// degrees/sec. Friction, drag and angular drag are "fraction kept per 1/60 s
/// tick"; the speed retentions are "fraction kept per second".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsTuning {
    pub max_speed: f32,
    pub acceleration: f32,
    pub brake_force: f32,
    pub reverse_speed_limit: f32,
    /// Turn rate at or below `speed_threshold_tight`.
    pub turn_rate_low: f32,
    /// Turn rate at `max_speed`.
    pub turn_rate_high: f32,
    pub speed_threshold_tight: f32,
    /// Lateral speed at which the car is classified as drifting.
    pub drift_threshold: f32,
    pub friction_normal: f32,
    pub friction_drift: f32,
    pub friction_handbrake: f32,
    pub transition_duration_seconds: f32,
    pub drift_speed_retention_per_second: f32,
    pub handbrake_speed_retention_per_second: f32,
    pub drag: f32,
    pub angular_drag: f32,
}

impl Default for PhysicsTuning {
    fn default() -> Self {
        Self {
            max_speed: DEFAULT_MAX_SPEED,
            acceleration: DEFAULT_ACCELERATION,
            brake_force: DEFAULT_BRAKE_FORCE,
            reverse_speed_limit: DEFAULT_REVERSE_SPEED_LIMIT,
            turn_rate_low: DEFAULT_TURN_RATE_LOW,
            turn_rate_high: DEFAULT_TURN_RATE_HIGH,
            speed_threshold_tight: DEFAULT_SPEED_THRESHOLD_TIGHT,
            drift_threshold: DEFAULT_DRIFT_THRESHOLD,
            friction_normal: DEFAULT_FRICTION_NORMAL,
            friction_drift: DEFAULT_FRICTION_DRIFT,
            friction_handbrake: DEFAULT_FRICTION_HANDBRAKE,
            transition_duration_seconds: DEFAULT_TRANSITION_DURATION,
            drift_speed_retention_per_second: DEFAULT_DRIFT_SPEED_RETENTION,
            handbrake_speed_retention_per_second: DEFAULT_HANDBRAKE_SPEED_RETENTION,
            drag: DEFAULT_DRAG,
            angular_drag: DEFAULT_ANGULAR_DRAG,
        }
    }
}

impl PhysicsTuning {
    /// Friction coefficient of a drift regime.
    pub fn friction_for(&self, state: DriftState) -> f32 {
        match state {
            DriftState::Normal => self.friction_normal,
            DriftState::Drift => self.friction_drift,
            DriftState::Handbrake => self.friction_handbrake,
        }
    }

    /// Check every field and the threshold ordering. Fails on the first problem found.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let positives = [
            ("max_speed", self.max_speed),
            ("acceleration", self.acceleration),
            ("brake_force", self.brake_force),
            ("reverse_speed_limit", self.reverse_speed_limit),
            ("turn_rate_low", self.turn_rate_low),
            ("turn_rate_high", self.turn_rate_high),
            ("speed_threshold_tight", self.speed_threshold_tight),
            ("drift_threshold", self.drift_threshold),
            ("transition_duration_seconds", self.transition_duration_seconds),
        ];
        for (field, value) in positives {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigurationError::NonPositive { field, value });
            }
        }

        let coefficients = [
            ("friction_normal", self.friction_normal),
            ("friction_drift", self.friction_drift),
            ("friction_handbrake", self.friction_handbrake),
            ("drift_speed_retention_per_second", self.drift_speed_retention_per_second),
            (
                "handbrake_speed_retention_per_second",
                self.handbrake_speed_retention_per_second,
            ),
            ("drag", self.drag),
            ("angular_drag", self.angular_drag),
        ];
        for (field, value) in coefficients {
            // NaN fails both comparisons and lands here too
            if !(value > 0.0 && value <= 1.0) {
                return Err(ConfigurationError::CoefficientOutOfRange { field, value });
            }
        }

        let orderings = [
            ("speed_threshold_tight", self.speed_threshold_tight, false),
            ("reverse_speed_limit", self.reverse_speed_limit, true),
            ("drift_threshold", self.drift_threshold, false),
        ];
        for (lower, lower_value, allow_equal) in orderings {
            let ordered = if allow_equal {
                lower_value <= self.max_speed
            } else {
                lower_value < self.max_speed
            };
            if !ordered {
                return Err(ConfigurationError::ThresholdOrder {
                    lower,
                    lower_value,
                    upper: "max_speed",
                    upper_value: self.max_speed,
                });
            }
        }

        Ok(())
    }
}

/// Read a JSON tuning file and validate it. Missing fields fall back to the defaults.
pub fn load_tuning_from_file(path: impl AsRef<Path>) -> Result<PhysicsTuning, ConfigurationError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|source| ConfigurationError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let tuning: PhysicsTuning =
        serde_json::from_str(&contents).map_err(|source| ConfigurationError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    tuning.validate()?;
    Ok(tuning)
}

// Simulation timing
pub const FIXED_TIMESTEP_HZ: f64 = 60.0;
/// Friction, drag and retention coefficients are "fraction kept per tick" at this rate.
pub const REFERENCE_TICKS_PER_SECOND: f32 = 60.0;

// Forward speed (units/sec) above which a brake input brakes instead of reversing
pub const BRAKE_REVERSE_THRESHOLD: f32 = 5.0;
// Reverse thrust relative to forward acceleration
pub const REVERSE_ACCEL_SCALE: f32 = 0.5;

// Restart key cooldown in milliseconds
pub const RESTART_COOLDOWN_MS: u64 = 300;

// Blend progress within this distance of 1.0 counts as settled
pub const TRANSITION_SETTLE_EPSILON: f32 = 1e-5;

// Default handling constants
pub const DEFAULT_MAX_SPEED: f32 = 400.0;
pub const DEFAULT_ACCELERATION: f32 = 600.0;
pub const DEFAULT_BRAKE_FORCE: f32 = 900.0;
pub const DEFAULT_REVERSE_SPEED_LIMIT: f32 = 150.0;
pub const DEFAULT_TURN_RATE_LOW: f32 = 200.0; // deg/s
pub const DEFAULT_TURN_RATE_HIGH: f32 = 110.0; // deg/s
pub const DEFAULT_SPEED_THRESHOLD_TIGHT: f32 = 120.0;
pub const DEFAULT_DRIFT_THRESHOLD: f32 = 100.0;
pub const DEFAULT_FRICTION_NORMAL: f32 = 0.985;
pub const DEFAULT_FRICTION_DRIFT: f32 = 0.993;
pub const DEFAULT_FRICTION_HANDBRAKE: f32 = 0.975;
pub const DEFAULT_TRANSITION_DURATION: f32 = 0.25;
pub const DEFAULT_DRIFT_SPEED_RETENTION: f32 = 0.7;
pub const DEFAULT_HANDBRAKE_SPEED_RETENTION: f32 = 0.4;
pub const DEFAULT_DRAG: f32 = 0.998;
pub const DEFAULT_ANGULAR_DRAG: f32 = 0.9;

// Rendering constants
pub const CAR_WIDTH: f32 = 48.0;
pub const CAR_HEIGHT: f32 = 24.0;

//! Top-down car handling: input sampling, a drift-aware integrator and the
//! Bevy systems that drive it.

pub mod camera;
pub mod car;
pub mod game_logic;
pub mod input;
pub mod state_snapshot;

pub use car::{DriftPhysicsPlugin, SharedTuning, SimulationPaused, TuningSource};
pub use game_logic::{CarIntegrator, ConfigurationError, DriftState, PhysicsTuning};
pub use input::{InputSampler, InputSignal, RawKeyState};
pub use state_snapshot::CarPhysicsSnapshot;

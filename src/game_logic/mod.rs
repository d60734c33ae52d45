pub mod components;
pub mod constants;
pub mod drift;
pub mod error;
pub mod math;
pub mod physics;
pub mod tuning;

pub use components::*;
pub use constants::*;
pub use drift::*;
pub use error::*;
pub use physics::*;
pub use tuning::*;

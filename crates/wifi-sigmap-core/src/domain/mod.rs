//! Domain value objects shared across the engine.

pub mod emitter;
pub mod obstacle;

pub use emitter::{percent_to_rssi, Band, Emitter, EmitterId};
pub use obstacle::Obstacle;

//! Arcade world: entities and the per-tick physics/collision engine.

pub mod entities;
pub mod physics;

pub use entities::*;
pub use physics::{
    asteroid_count_for_wave, break_asteroid, check_collision, initialize, spawn_wave, step,
    wave_speed_factor, StepEvents,
};

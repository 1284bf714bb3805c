//! Block Dodge - a falling-block dodging arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (spawning, pixel collisions, hit/invincibility, scoring)
//! - `renderer`: Frame description, CPU compositing and WebGPU presentation
//! - `assets`: Sprite decoding and opacity masks
//! - `input`: Keyboard/gamepad mapping onto tick input
//! - `settings`: Data-driven game tuning

pub mod assets;
pub mod input;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use assets::{Assets, Sprite};
pub use settings::{Ramp, Settings};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Milliseconds of session time covered by one tick
    pub const TICK_MS: f64 = 1000.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Largest frame delta fed into the accumulator (seconds)
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Playfield dimensions
    pub const SCREEN_WIDTH: u32 = 800;
    pub const SCREEN_HEIGHT: u32 = 480;

    /// Player horizontal speed (pixels per tick)
    pub const PERSON_MOVE_SPEED: f32 = 5.0;

    /// Block fall speed (pixels per tick)
    pub const BLOCK_FALL_SPEED: f32 = 2.0;
    pub const BLOCK_FALL_SPEED_MAX: f32 = 8.0;
    pub const BLOCK_FALL_ACCEL_PER_MS: f32 = 0.00002;

    /// Chance of a new block per tick
    pub const BLOCK_SPAWN_PROBABILITY: f32 = 0.01;
    pub const BLOCK_SPAWN_PROBABILITY_MAX: f32 = 0.1;
    pub const BLOCK_SPAWN_ACCEL_PER_MS: f32 = 0.000001;

    /// Difficulty is raised once per ramp period
    pub const RAMP_PERIOD_MS: f64 = 1000.0;

    /// Post-hit grace window
    pub const INVINCIBLE_PERIOD_MS: f64 = 1500.0;
}

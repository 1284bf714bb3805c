//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Seeded RNG only
//! - Fixed per-tick deltas
//! - No rendering or platform dependencies

pub mod autopilot;
pub mod difficulty;
pub mod pixel;
pub mod state;
pub mod tick;

pub use autopilot::autopilot;
pub use difficulty::{Difficulty, RampedValue};
pub use pixel::{AlphaMask, Rect, pixels_intersect};
pub use state::{Block, GameEvent, GameState, HitState, Player, PlayerPhase, Score};
pub use tick::{TickClock, TickInput, tick};

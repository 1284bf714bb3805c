//! Difficulty ramp
//!
//! Fall speed and spawn probability grow in discrete steps, once per ramp
//! period, by `accel_per_ms * accumulated_ms`. Fall speed gates the step:
//! once it reaches its cap, spawn probability stops rising too. A value that
//! is still below its cap takes the full step, so it may end up to one step
//! above the cap.

use crate::settings::{Ramp, Settings};

/// A single ramping parameter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RampedValue {
    pub current: f32,
    pub max: f32,
    pub accel_per_ms: f32,
}

impl RampedValue {
    pub fn new(ramp: &Ramp) -> Self {
        Self {
            current: ramp.start,
            max: ramp.max,
            accel_per_ms: ramp.accel_per_ms,
        }
    }

    /// Step size for a given accumulated time
    #[inline]
    pub fn step_for(&self, accumulated_ms: f64) -> f32 {
        self.accel_per_ms * accumulated_ms as f32
    }

    /// Apply one ramp step if still below the cap
    fn bump(&mut self, accumulated_ms: f64) -> bool {
        if self.current < self.max {
            self.current += self.step_for(accumulated_ms);
            true
        } else {
            false
        }
    }
}

/// Both difficulty parameters plus the ramp clock
#[derive(Debug, Clone, PartialEq)]
pub struct Difficulty {
    /// Block fall speed (pixels per tick)
    pub fall_speed: RampedValue,
    /// Chance per tick that a block spawns
    pub spawn_probability: RampedValue,
    pub ramp_period_ms: f64,
    accumulated_ms: f64,
}

impl Difficulty {
    pub fn new(settings: &Settings) -> Self {
        Self {
            fall_speed: RampedValue::new(&settings.fall_speed),
            spawn_probability: RampedValue::new(&settings.spawn_probability),
            ramp_period_ms: settings.ramp_period_ms,
            accumulated_ms: 0.0,
        }
    }

    /// Milliseconds gathered toward the next ramp step
    pub fn accumulated_ms(&self) -> f64 {
        self.accumulated_ms
    }

    /// Feed elapsed time; returns true when a ramp step was taken
    pub fn advance(&mut self, elapsed_ms: f64) -> bool {
        self.accumulated_ms += elapsed_ms;
        if self.accumulated_ms <= self.ramp_period_ms {
            return false;
        }

        let accumulated = self.accumulated_ms;
        self.accumulated_ms = 0.0;

        // Fall speed gates the whole step; spawn probability only rises with it
        if !self.fall_speed.bump(accumulated) {
            return false;
        }
        self.spawn_probability.bump(accumulated);

        log::debug!(
            "Difficulty up: fall speed {:.3}, spawn probability {:.4}",
            self.fall_speed.current,
            self.spawn_probability.current
        );
        true
    }
}

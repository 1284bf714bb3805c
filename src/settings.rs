//! Game settings and tuning
//!
//! Loaded once at startup. Native reads a JSON file named by
//! `BLOCK_DODGE_SETTINGS`; the web build reads an optional
//! `<script id="settings" type="application/json">` element.

use anyhow::{Context, ensure};
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// A difficulty parameter that climbs toward a cap
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ramp {
    /// Value at session start
    pub start: f32,
    /// Growth stops once the value reaches this
    pub max: f32,
    /// Growth per accumulated millisecond of play
    pub accel_per_ms: f32,
}

impl Ramp {
    pub const fn new(start: f32, max: f32, accel_per_ms: f32) -> Self {
        Self {
            start,
            max,
            accel_per_ms,
        }
    }

    /// A ramp that never moves
    pub const fn fixed(value: f32) -> Self {
        Self::new(value, value, 0.0)
    }
}

/// Game settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Playfield ===
    pub screen_width: u32,
    pub screen_height: u32,

    // === Player ===
    /// Pixels per tick
    pub person_move_speed: f32,

    // === Difficulty ===
    /// Block fall speed in pixels per tick
    pub fall_speed: Ramp,
    /// Chance per tick that a new block appears
    pub spawn_probability: Ramp,
    pub ramp_period_ms: f64,

    // === Hits ===
    pub invincible_period_ms: f64,

    /// Fixed RNG seed (None = derive from the clock)
    pub seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            screen_width: SCREEN_WIDTH,
            screen_height: SCREEN_HEIGHT,
            person_move_speed: PERSON_MOVE_SPEED,
            fall_speed: Ramp::new(
                BLOCK_FALL_SPEED,
                BLOCK_FALL_SPEED_MAX,
                BLOCK_FALL_ACCEL_PER_MS,
            ),
            spawn_probability: Ramp::new(
                BLOCK_SPAWN_PROBABILITY,
                BLOCK_SPAWN_PROBABILITY_MAX,
                BLOCK_SPAWN_ACCEL_PER_MS,
            ),
            ramp_period_ms: RAMP_PERIOD_MS,
            invincible_period_ms: INVINCIBLE_PERIOD_MS,
            seed: None,
        }
    }
}

impl Settings {
    /// Parse and validate a JSON settings document
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let settings: Settings =
            serde_json::from_str(json).context("settings are not valid JSON")?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Reject settings the simulation cannot run with
    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(
            self.screen_width > 0 && self.screen_height > 0,
            "screen must be at least 1x1, got {}x{}",
            self.screen_width,
            self.screen_height
        );
        // The RGBA frame buffer holds 4 bytes per pixel
        ensure!(
            self.screen_width
                .checked_mul(self.screen_height)
                .and_then(|area| area.checked_mul(4))
                .is_some(),
            "screen {}x{} is too large",
            self.screen_width,
            self.screen_height
        );
        ensure!(
            self.person_move_speed >= 0.0,
            "person_move_speed must not be negative"
        );
        ensure!(self.ramp_period_ms > 0.0, "ramp_period_ms must be positive");
        ensure!(
            self.invincible_period_ms >= 0.0,
            "invincible_period_ms must not be negative"
        );
        check_ramp("fall_speed", &self.fall_speed)?;
        check_ramp("spawn_probability", &self.spawn_probability)?;
        ensure!(
            (0.0..=1.0).contains(&self.spawn_probability.start)
                && (0.0..=1.0).contains(&self.spawn_probability.max),
            "spawn_probability must stay within [0, 1]"
        );
        Ok(())
    }

    /// Load settings from `BLOCK_DODGE_SETTINGS` (defaults when unset)
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> anyhow::Result<Self> {
        match std::env::var_os(Self::ENV_VAR) {
            Some(path) => {
                let json = std::fs::read_to_string(&path)
                    .with_context(|| format!("reading settings from {:?}", path))?;
                let settings = Self::from_json(&json)
                    .with_context(|| format!("loading settings from {:?}", path))?;
                log::info!("Loaded settings from {:?}", path);
                Ok(settings)
            }
            None => {
                log::info!("Using default settings");
                Ok(Self::default())
            }
        }
    }

    /// Load settings from the page's `#settings` element (defaults when absent)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> anyhow::Result<Self> {
        let json = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(Self::ELEMENT_ID))
            .and_then(|el| el.text_content());

        match json {
            Some(json) if !json.trim().is_empty() => {
                let settings = Self::from_json(&json).context("loading #settings element")?;
                log::info!("Loaded settings from page");
                Ok(settings)
            }
            _ => {
                log::info!("Using default settings");
                Ok(Self::default())
            }
        }
    }

    /// Environment variable naming a settings file
    #[cfg(not(target_arch = "wasm32"))]
    const ENV_VAR: &'static str = "BLOCK_DODGE_SETTINGS";

    /// DOM element holding inline settings JSON
    #[cfg(target_arch = "wasm32")]
    const ELEMENT_ID: &'static str = "settings";
}

fn check_ramp(name: &str, ramp: &Ramp) -> anyhow::Result<()> {
    ensure!(ramp.start >= 0.0, "{name}.start must not be negative");
    ensure!(
        ramp.max >= ramp.start,
        "{name}.max ({}) is below its start ({})",
        ramp.max,
        ramp.start
    );
    ensure!(ramp.accel_per_ms >= 0.0, "{name}.accel_per_ms must not be negative");
    Ok(())
}

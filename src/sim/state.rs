//! Game state and core simulation types
//!
//! One `GameState` owns everything a session needs. Update and render take it
//! by reference; nothing lives in globals.

use anyhow::ensure;
use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::difficulty::Difficulty;
use super::pixel::{AlphaMask, Rect};
use crate::settings::Settings;

/// Where the player is in the hit/invincibility cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerPhase {
    /// Not touching anything
    Normal,
    /// Overlapping a block this tick while vulnerable
    Hit,
    /// Inside the post-hit grace window
    Invincible { blink_on: bool },
}

/// The player-controlled sprite
#[derive(Debug, Clone)]
pub struct Player {
    /// Top-left corner in screen pixels
    pub pos: Vec2,
    /// Pixels per tick
    pub move_speed: f32,
    pub mask: AlphaMask,
    pub invincible: bool,
    /// Flips every tick while invincible
    pub blink: bool,
}

impl Player {
    #[inline]
    pub fn width(&self) -> u32 {
        self.mask.width()
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.mask.height()
    }

    /// Integer bounding rectangle used for collision tests
    pub fn rect(&self) -> Rect {
        Rect::at(self.pos, self.width(), self.height())
    }
}

/// A falling obstacle; all blocks share the session's block mask
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub id: u32,
    /// Top-left corner, y grows downward
    pub pos: Vec2,
    /// Set when this block registered a hit on the player
    pub struck: bool,
}

/// Collision bookkeeping carried across ticks
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HitState {
    /// Player overlaps at least one block this tick
    pub person_hit: bool,
    /// Overlap status of the previous tick (onset detection)
    pub hit_last_tick: bool,
    /// Session time of the most recent registered hit
    pub collision_time_ms: Option<f64>,
}

impl HitState {
    /// True while `now` falls inside the grace window of the last hit
    pub fn is_invincible(&self, now_ms: f64, period_ms: f64) -> bool {
        self.collision_time_ms
            .is_some_and(|hit_at| now_ms - hit_at < period_ms)
    }
}

/// Block counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Score {
    /// Blocks that left the screen
    pub all_blocks: u32,
    /// Retired blocks that counted as hits (never exceeds `all_blocks`)
    pub hit_blocks: u32,
}

impl Score {
    pub fn dodged(&self) -> u32 {
        self.all_blocks - self.hit_blocks
    }
}

/// Things that happened during the last tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameEvent {
    BlockSpawned { id: u32, x: f32 },
    HitOnset { time_ms: f64 },
    InvincibilityEnded,
    BlockRetired { id: u32, counted_as_hit: bool },
}

/// Complete session state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    pub screen_width: u32,
    pub screen_height: u32,
    pub invincible_period_ms: f64,
    pub player: Player,
    /// Live blocks in spawn order
    pub blocks: Vec<Block>,
    pub block_mask: AlphaMask,
    pub difficulty: Difficulty,
    pub hit: HitState,
    pub score: Score,
    /// Session time at the last tick
    pub time_ms: f64,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Events from the most recent tick
    pub events: Vec<GameEvent>,
    /// Next block ID
    next_id: u32,
}

impl GameState {
    /// Create a session with the player standing centred on the bottom edge
    pub fn new(
        settings: &Settings,
        player_mask: AlphaMask,
        block_mask: AlphaMask,
        seed: u64,
    ) -> anyhow::Result<Self> {
        settings.validate()?;
        ensure!(
            player_mask.width() <= settings.screen_width
                && player_mask.height() <= settings.screen_height,
            "player sprite {}x{} does not fit a {}x{} screen",
            player_mask.width(),
            player_mask.height(),
            settings.screen_width,
            settings.screen_height
        );
        ensure!(
            block_mask.width() <= settings.screen_width,
            "block sprite is {} px wide, screen is {} px",
            block_mask.width(),
            settings.screen_width
        );

        let pos = Vec2::new(
            ((settings.screen_width - player_mask.width()) / 2) as f32,
            (settings.screen_height - player_mask.height()) as f32,
        );

        Ok(Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            screen_width: settings.screen_width,
            screen_height: settings.screen_height,
            invincible_period_ms: settings.invincible_period_ms,
            player: Player {
                pos,
                move_speed: settings.person_move_speed,
                mask: player_mask,
                invincible: false,
                blink: false,
            },
            blocks: Vec::new(),
            block_mask,
            difficulty: Difficulty::new(settings),
            hit: HitState::default(),
            score: Score::default(),
            time_ms: 0.0,
            time_ticks: 0,
            events: Vec::new(),
            next_id: 1,
        })
    }

    /// Allocate a new block ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Bounding rectangle of a block
    pub fn block_rect(&self, block: &Block) -> Rect {
        Rect::at(block.pos, self.block_mask.width(), self.block_mask.height())
    }

    /// Rightmost legal x for the player
    pub fn player_max_x(&self) -> f32 {
        (self.screen_width - self.player.width()) as f32
    }

    /// Rightmost legal spawn x for a block
    pub fn block_max_x(&self) -> f32 {
        (self.screen_width - self.block_mask.width()) as f32
    }

    pub fn phase(&self) -> PlayerPhase {
        if self.player.invincible {
            PlayerPhase::Invincible {
                blink_on: self.player.blink,
            }
        } else if self.hit.person_hit {
            PlayerPhase::Hit
        } else {
            PlayerPhase::Normal
        }
    }
}

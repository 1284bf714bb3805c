//! Frame description
//!
//! Turns a `GameState` into what should be on screen, without touching any
//! graphics API. Both the CPU compositor and the DOM scoreboard read this.

use glam::Vec2;

use crate::sim::{GameState, PlayerPhase, Score};

/// RGBA8 colour
pub type Color = [u8; 4];

/// Colors for game elements
pub mod colors {
    use super::Color;

    pub const CORNFLOWER_BLUE: Color = [100, 149, 237, 255];
    pub const RED: Color = [255, 0, 0, 255];
    pub const WHITE: Color = [255, 255, 255, 255];
    pub const BLACK: Color = [0, 0, 0, 255];

    pub const BACKGROUND: Color = CORNFLOWER_BLUE;
    pub const BACKGROUND_HIT: Color = RED;
}

/// Which loaded sprite to draw
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpriteKind {
    Player,
    Block,
}

/// One sprite draw call
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpriteDraw {
    pub sprite: SpriteKind,
    /// Top-left corner in screen pixels
    pub pos: Vec2,
    /// Mirror horizontally
    pub flip: bool,
    /// Multiplied into every pixel (white = untouched)
    pub tint: Color,
}

/// Everything needed to present one frame
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub clear: Color,
    /// Back to front
    pub draws: Vec<SpriteDraw>,
    pub score_lines: [String; 2],
}

/// Build the frame for the current state
pub fn build_frame(state: &GameState) -> Frame {
    let clear = if state.hit.person_hit {
        colors::BACKGROUND_HIT
    } else {
        colors::BACKGROUND
    };

    let mut draws = Vec::with_capacity(state.blocks.len() + 1);

    let player = match state.phase() {
        PlayerPhase::Normal | PlayerPhase::Hit => Some(false),
        PlayerPhase::Invincible { blink_on: true } => Some(true),
        PlayerPhase::Invincible { blink_on: false } => None,
    };
    if let Some(flip) = player {
        draws.push(SpriteDraw {
            sprite: SpriteKind::Player,
            pos: state.player.pos,
            flip,
            tint: colors::WHITE,
        });
    }

    draws.extend(state.blocks.iter().map(|block| SpriteDraw {
        sprite: SpriteKind::Block,
        pos: block.pos,
        flip: false,
        tint: colors::WHITE,
    }));

    Frame {
        clear,
        draws,
        score_lines: score_lines(&state.score),
    }
}

/// The two scoreboard lines
pub fn score_lines(score: &Score) -> [String; 2] {
    [
        format!(
            "DODGED BLOCKS  {} : {} ALL BLOCKS",
            score.dodged(),
            score.all_blocks
        ),
        format!("HIT BLOCKS  {}", score.hit_blocks),
    ]
}

//! Idle/demo mode - the game plays itself
//!
//! Steers away from the lowest block that is about to land on the player.
//! Used by the headless runner and the web build's idle toggle.

use super::state::GameState;
use super::tick::TickInput;

/// Extra horizontal clearance kept from a threatening block (pixels)
const CLEARANCE: f32 = 4.0;

/// Pick this tick's input for the current state
pub fn autopilot(state: &GameState) -> TickInput {
    let player = state.player.rect();
    let block_w = state.block_mask.width() as f32;
    let block_h = state.block_mask.height() as f32;
    let fall = state.difficulty.fall_speed.current.max(0.1);
    let speed = state.player.move_speed.max(0.1);

    // Ticks needed to fully clear a block's column from the worst case
    let escape_ticks = (player.width as f32 + block_w + 2.0 * CLEARANCE) / speed;
    let horizon = player.top() as f32 - escape_ticks * fall - block_h;

    let left = player.left() as f32 - CLEARANCE;
    let right = player.right() as f32 + CLEARANCE;

    let threat = state
        .blocks
        .iter()
        .filter(|b| b.pos.y + block_h >= horizon && b.pos.y < player.bottom() as f32)
        .filter(|b| b.pos.x < right && b.pos.x + block_w > left)
        .max_by(|a, b| a.pos.y.total_cmp(&b.pos.y));

    let Some(block) = threat else {
        return TickInput::default();
    };

    let player_centre = (left + right) / 2.0;
    let block_centre = block.pos.x + block_w / 2.0;
    let room_left = state.player.pos.x;
    let room_right = state.player_max_x() - state.player.pos.x;

    // Dodge toward the side the block leaves open, unless a wall is in the way
    let go_left = if block_centre >= player_centre {
        room_left >= speed || room_right < speed
    } else {
        room_right < speed && room_left >= speed
    };

    TickInput {
        move_left: go_left,
        move_right: !go_left,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{Ramp, Settings};
    use crate::sim::pixel::AlphaMask;
    use crate::sim::state::Block;
    use crate::sim::tick::{TickClock, tick};
    use glam::Vec2;

    fn state_with(settings: &Settings) -> GameState {
        GameState::new(
            settings,
            AlphaMask::opaque(24, 40),
            AlphaMask::opaque(32, 32),
            7,
        )
        .unwrap()
    }

    #[test]
    fn test_idle_without_threats() {
        let state = state_with(&Settings::default());
        assert_eq!(autopilot(&state), TickInput::default());
    }

    #[test]
    fn test_moves_away_from_block() {
        let mut state = state_with(&Settings::default());
        let x = state.player.pos.x;
        // Block slightly right of centre, close above
        state.blocks.push(Block {
            id: 1,
            pos: Vec2::new(x + 10.0, 380.0),
            struck: false,
        });
        let input = autopilot(&state);
        assert!(input.move_left && !input.move_right);

        state.blocks[0].pos.x = x - 20.0;
        let input = autopilot(&state);
        assert!(input.move_right && !input.move_left);
    }

    #[test]
    fn test_turns_back_at_wall() {
        let mut state = state_with(&Settings::default());
        state.player.pos.x = 0.0;
        state.blocks.push(Block {
            id: 1,
            pos: Vec2::new(4.0, 380.0),
            struck: false,
        });
        let input = autopilot(&state);
        assert!(input.move_right);
    }

    #[test]
    fn test_dodges_more_than_it_is_hit() {
        let settings = Settings {
            spawn_probability: Ramp::fixed(0.02),
            fall_speed: Ramp::fixed(2.0),
            ..Default::default()
        };
        let mut state = state_with(&settings);
        for _ in 0..6000 {
            let input = autopilot(&state);
            let clock = TickClock::next_fixed(&state);
            tick(&mut state, &input, clock);
        }
        assert!(state.score.all_blocks > 50);
        assert!(state.score.dodged() > state.score.hit_blocks);
    }
}

//! Simulation tick
//!
//! Order within one tick: player movement, difficulty ramp, spawn, fall,
//! collision, invincibility window, retirement and scoring.
//!
//! Distances are per tick, not per millisecond. The frontends call `tick` at
//! a fixed 60 Hz so play speed does not depend on the display rate.

use glam::Vec2;
use rand::Rng;

use super::pixel::{Rect, pixels_intersect};
use super::state::{Block, GameEvent, GameState};
use crate::consts::TICK_MS;

/// Input commands for a single tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    pub move_left: bool,
    pub move_right: bool,
}

/// Time supplied by the loop driver
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickClock {
    /// Time since the previous tick
    pub elapsed_ms: f64,
    /// Session time at this tick
    pub total_ms: f64,
}

impl TickClock {
    /// Clock for the tick following `state`'s last one at the fixed step
    pub fn next_fixed(state: &GameState) -> Self {
        Self {
            elapsed_ms: TICK_MS,
            total_ms: (state.time_ticks + 1) as f64 * TICK_MS,
        }
    }
}

/// Advance the game state by one tick
pub fn tick(state: &mut GameState, input: &TickInput, clock: TickClock) {
    state.events.clear();
    state.time_ticks += 1;
    state.time_ms = clock.total_ms;

    let invincible = state
        .hit
        .is_invincible(clock.total_ms, state.invincible_period_ms);

    move_player(state, input, invincible);
    state.difficulty.advance(clock.elapsed_ms);
    maybe_spawn_block(state);

    let fall_speed = state.difficulty.fall_speed.current;
    for block in &mut state.blocks {
        block.pos.y += fall_speed;
    }

    detect_hits(state, clock.total_ms, invincible);
    update_invincibility(state, clock.total_ms);
    retire_blocks(state);
}

/// Apply movement (frozen while invincible) and keep the player on screen
fn move_player(state: &mut GameState, input: &TickInput, invincible: bool) {
    let max_x = state.player_max_x();
    let player = &mut state.player;

    if !invincible {
        if input.move_left {
            player.pos.x -= player.move_speed;
        }
        if input.move_right {
            player.pos.x += player.move_speed;
        }
    }

    player.pos.x = player.pos.x.clamp(0.0, max_x);
}

/// Roll for a new block just above the visible area
fn maybe_spawn_block(state: &mut GameState) {
    let roll: f32 = state.rng.random();
    if roll >= state.difficulty.spawn_probability.current {
        return;
    }

    let x = state.rng.random::<f32>() * state.block_max_x();
    let id = state.next_entity_id();
    state.blocks.push(Block {
        id,
        pos: Vec2::new(x, -(state.block_mask.height() as f32)),
        struck: false,
    });
    state.events.push(GameEvent::BlockSpawned { id, x });
    log::debug!("Block {} spawned at x={:.1}", id, x);
}

/// Test every live block against the player
///
/// A hit registers on the first overlapping tick after a tick without
/// overlap, and only while the player is vulnerable. Every block overlapping
/// on that tick is marked as struck and later counts as a hit when retired.
fn detect_hits(state: &mut GameState, now_ms: f64, invincible: bool) {
    let GameState {
        player,
        blocks,
        block_mask,
        hit,
        events,
        ..
    } = state;

    let player_rect = player.rect();
    let onset_possible = !hit.hit_last_tick && !invincible;

    hit.person_hit = false;
    for block in blocks.iter_mut() {
        let block_rect = Rect::at(block.pos, block_mask.width(), block_mask.height());
        if !pixels_intersect(player_rect, &player.mask, block_rect, block_mask) {
            continue;
        }

        if !hit.person_hit && onset_possible {
            hit.collision_time_ms = Some(now_ms);
            events.push(GameEvent::HitOnset { time_ms: now_ms });
            log::debug!("Hit by block {} at {:.0} ms", block.id, now_ms);
        }
        hit.person_hit = true;
        if onset_possible {
            block.struck = true;
        }
    }

    hit.hit_last_tick = hit.person_hit;
}

/// Refresh the invincible flag and flip the blink flag every tick inside the window
fn update_invincibility(state: &mut GameState, now_ms: f64) {
    let active = state.hit.is_invincible(now_ms, state.invincible_period_ms);
    let player = &mut state.player;

    if active {
        player.blink = !player.blink;
    } else {
        if player.invincible {
            state.events.push(GameEvent::InvincibilityEnded);
            log::debug!("Invincibility ended at {:.0} ms", now_ms);
        }
        player.blink = false;
    }
    player.invincible = active;
}

/// Remove blocks whose top edge has passed the bottom of the screen
fn retire_blocks(state: &mut GameState) {
    let GameState {
        blocks,
        score,
        events,
        screen_height,
        ..
    } = state;
    let bottom = *screen_height as f32;

    blocks.retain(|block| {
        if block.pos.y <= bottom {
            return true;
        }

        score.all_blocks += 1;
        if block.struck {
            score.hit_blocks += 1;
        }
        events.push(GameEvent::BlockRetired {
            id: block.id,
            counted_as_hit: block.struck,
        });
        log::debug!(
            "Block {} retired ({}), dodged {} of {}",
            block.id,
            if block.struck { "hit" } else { "dodged" },
            score.dodged(),
            score.all_blocks
        );
        false
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{Ramp, Settings};
    use crate::sim::pixel::AlphaMask;
    use crate::sim::state::PlayerPhase;

    fn quiet_settings() -> Settings {
        Settings {
            fall_speed: Ramp::fixed(2.0),
            spawn_probability: Ramp::fixed(0.0),
            invincible_period_ms: 100.0,
            ..Default::default()
        }
    }

    fn new_state(settings: &Settings) -> GameState {
        GameState::new(
            settings,
            AlphaMask::opaque(50, 40),
            AlphaMask::opaque(20, 20),
            42,
        )
        .unwrap()
    }

    fn step(state: &mut GameState, input: TickInput) {
        let clock = TickClock::next_fixed(state);
        tick(state, &input, clock);
    }

    fn drop_block_on_player(state: &mut GameState) -> u32 {
        let id = state.next_entity_id();
        let pos = state.player.pos;
        state.blocks.push(Block {
            id,
            pos: Vec2::new(pos.x, pos.y - 2.0),
            struck: false,
        });
        id
    }

    #[test]
    fn test_move_right_ten_ticks() {
        let mut state = new_state(&quiet_settings());
        state.player.pos.x = 100.0;
        let right = TickInput {
            move_right: true,
            ..Default::default()
        };
        for _ in 0..10 {
            step(&mut state, right);
        }
        assert_eq!(state.player.pos.x, 150.0);
        assert!(state.player.pos.x <= state.player_max_x());
    }

    #[test]
    fn test_both_directions_cancel() {
        let mut state = new_state(&quiet_settings());
        let start = state.player.pos.x;
        step(
            &mut state,
            TickInput {
                move_left: true,
                move_right: true,
            },
        );
        assert_eq!(state.player.pos.x, start);
    }

    #[test]
    fn test_player_clamped_to_screen() {
        let mut state = new_state(&quiet_settings());
        let left = TickInput {
            move_left: true,
            ..Default::default()
        };
        for _ in 0..200 {
            step(&mut state, left);
        }
        assert_eq!(state.player.pos.x, 0.0);

        let right = TickInput {
            move_right: true,
            ..Default::default()
        };
        for _ in 0..400 {
            step(&mut state, right);
        }
        assert_eq!(state.player.pos.x, 750.0);
    }

    #[test]
    fn test_certain_spawn_adds_one_block_per_tick() {
        let settings = Settings {
            spawn_probability: Ramp::fixed(1.0),
            ..quiet_settings()
        };
        let mut state = new_state(&settings);
        for n in 1..=20 {
            step(&mut state, TickInput::default());
            assert_eq!(state.blocks.len(), n);
            let spawned = state
                .events
                .iter()
                .filter(|e| matches!(e, GameEvent::BlockSpawned { .. }))
                .count();
            assert_eq!(spawned, 1);
        }
        for block in &state.blocks {
            assert!(block.pos.x >= 0.0 && block.pos.x <= state.block_max_x());
        }
    }

    #[test]
    fn test_spawned_block_starts_above_screen() {
        let settings = Settings {
            spawn_probability: Ramp::fixed(1.0),
            ..quiet_settings()
        };
        let mut state = new_state(&settings);
        step(&mut state, TickInput::default());
        // Spawned at -height, then fell once
        assert_eq!(state.blocks[0].pos.y, -20.0 + 2.0);
    }

    #[test]
    fn test_blocks_fall_by_fall_speed() {
        let mut state = new_state(&quiet_settings());
        state.blocks.push(Block {
            id: 99,
            pos: Vec2::new(0.0, 10.0),
            struck: false,
        });
        step(&mut state, TickInput::default());
        step(&mut state, TickInput::default());
        assert_eq!(state.blocks[0].pos.y, 14.0);
    }

    #[test]
    fn test_overlapping_block_registers_hit() {
        let mut state = new_state(&quiet_settings());
        drop_block_on_player(&mut state);
        step(&mut state, TickInput::default());

        assert!(state.hit.person_hit);
        assert_eq!(state.hit.collision_time_ms, Some(TICK_MS));
        assert!(state.blocks[0].struck);
        assert!(state.player.invincible);
        assert!(
            state
                .events
                .iter()
                .any(|e| matches!(e, GameEvent::HitOnset { .. }))
        );
    }

    #[test]
    fn test_transparent_player_is_never_hit() {
        let mut state = GameState::new(
            &quiet_settings(),
            AlphaMask::transparent(50, 40),
            AlphaMask::opaque(20, 20),
            42,
        )
        .unwrap();
        drop_block_on_player(&mut state);
        step(&mut state, TickInput::default());
        assert!(!state.hit.person_hit);
        assert_eq!(state.phase(), PlayerPhase::Normal);
    }

    #[test]
    fn test_movement_frozen_for_invincible_period() {
        // 100 ms window at 16.67 ms per tick
        let mut state = new_state(&quiet_settings());
        drop_block_on_player(&mut state);
        step(&mut state, TickInput::default());
        let hit_at = state.hit.collision_time_ms.unwrap();
        state.blocks.clear();

        let right = TickInput {
            move_right: true,
            ..Default::default()
        };
        let start_x = state.player.pos.x;
        let mut frozen_ticks = 0;
        loop {
            let before = state.player.pos.x;
            step(&mut state, right);
            if state.player.pos.x != before {
                break;
            }
            frozen_ticks += 1;
            assert!(state.time_ms - hit_at < 100.0);
        }
        assert!(state.time_ms - hit_at >= 100.0);
        assert_eq!(frozen_ticks, 5);
        assert_eq!(state.player.pos.x, start_x + 5.0);
    }

    #[test]
    fn test_blink_alternates_every_tick_while_invincible() {
        let mut state = new_state(&quiet_settings());
        drop_block_on_player(&mut state);
        step(&mut state, TickInput::default());
        state.blocks.clear();

        let mut phases = vec![state.phase()];
        for _ in 0..8 {
            step(&mut state, TickInput::default());
            phases.push(state.phase());
        }
        assert_eq!(phases[0], PlayerPhase::Invincible { blink_on: true });
        assert_eq!(phases[1], PlayerPhase::Invincible { blink_on: false });
        assert_eq!(phases[2], PlayerPhase::Invincible { blink_on: true });
        assert_eq!(*phases.last().unwrap(), PlayerPhase::Normal);
        assert!(!state.player.blink);
    }

    #[test]
    fn test_invincibility_end_event() {
        let mut state = new_state(&quiet_settings());
        drop_block_on_player(&mut state);
        step(&mut state, TickInput::default());
        state.blocks.clear();

        let mut ended = 0;
        for _ in 0..20 {
            step(&mut state, TickInput::default());
            ended += state
                .events
                .iter()
                .filter(|e| matches!(e, GameEvent::InvincibilityEnded))
                .count();
        }
        assert_eq!(ended, 1);
    }

    #[test]
    fn test_new_block_during_invincibility_does_not_count() {
        let mut state = new_state(&quiet_settings());
        drop_block_on_player(&mut state);
        step(&mut state, TickInput::default());
        state.blocks.clear();

        // Gap tick without overlap, then a fresh block inside the window
        step(&mut state, TickInput::default());
        assert!(state.player.invincible);
        let first_hit = state.hit.collision_time_ms;
        drop_block_on_player(&mut state);
        step(&mut state, TickInput::default());

        assert!(state.hit.person_hit);
        assert!(!state.blocks[0].struck);
        assert_eq!(state.hit.collision_time_ms, first_hit);
    }

    #[test]
    fn test_continuous_overlap_registers_once() {
        let settings = Settings {
            invincible_period_ms: 0.0,
            ..quiet_settings()
        };
        let mut state = new_state(&settings);
        drop_block_on_player(&mut state);
        step(&mut state, TickInput::default());
        let first = state.hit.collision_time_ms;
        step(&mut state, TickInput::default());
        assert!(state.hit.person_hit);
        assert_eq!(state.hit.collision_time_ms, first);
    }

    #[test]
    fn test_retirement_scores_struck_and_dodged_blocks() {
        let mut state = new_state(&quiet_settings());
        let struck = drop_block_on_player(&mut state);
        step(&mut state, TickInput::default());

        // A second block far from the player
        let dodged = state.next_entity_id();
        state.blocks.push(Block {
            id: dodged,
            pos: Vec2::new(0.0, 300.0),
            struck: false,
        });

        let mut retired = Vec::new();
        for _ in 0..200 {
            step(&mut state, TickInput::default());
            for event in &state.events {
                if let GameEvent::BlockRetired { id, counted_as_hit } = *event {
                    retired.push((id, counted_as_hit));
                }
            }
        }

        assert!(state.blocks.is_empty());
        assert_eq!(retired.len(), 2);
        assert!(retired.contains(&(struck, true)));
        assert!(retired.contains(&(dodged, false)));
        assert_eq!(state.score.all_blocks, 2);
        assert_eq!(state.score.hit_blocks, 1);
        assert_eq!(state.score.dodged(), 1);
    }

    #[test]
    fn test_retirement_keeps_spawn_order_and_skips_nothing() {
        let mut state = new_state(&quiet_settings());
        // Alternate blocks about to leave and blocks staying
        for i in 0..6 {
            let id = state.next_entity_id();
            let y = if i % 2 == 0 { 479.5 } else { 100.0 };
            state.blocks.push(Block {
                id,
                pos: Vec2::new(0.0, y),
                struck: false,
            });
        }
        step(&mut state, TickInput::default());
        assert_eq!(state.score.all_blocks, 3);
        let ids: Vec<u32> = state.blocks.iter().map(|b| b.id).collect();
        assert_eq!(ids, vec![2, 4, 6]);
    }

    #[test]
    fn test_block_at_exact_bottom_edge_stays() {
        let mut state = new_state(&quiet_settings());
        state.blocks.push(Block {
            id: 1,
            pos: Vec2::new(0.0, 478.0),
            struck: false,
        });
        step(&mut state, TickInput::default());
        assert_eq!(state.blocks.len(), 1);
        step(&mut state, TickInput::default());
        assert!(state.blocks.is_empty());
    }

    #[test]
    fn test_determinism() {
        let settings = Settings {
            spawn_probability: Ramp::fixed(0.3),
            ..Default::default()
        };
        let mut a = new_state(&settings);
        let mut b = new_state(&settings);
        let inputs = [
            TickInput::default(),
            TickInput {
                move_left: true,
                ..Default::default()
            },
            TickInput {
                move_right: true,
                ..Default::default()
            },
        ];
        for i in 0..600 {
            let input = inputs[i % inputs.len()];
            step(&mut a, input);
            step(&mut b, input);
        }
        assert_eq!(a.blocks, b.blocks);
        assert_eq!(a.score, b.score);
        assert_eq!(a.player.pos, b.player.pos);
    }
}

//! Keyboard and gamepad input handling
//!
//! Both sources are OR'd into one logical control set. Quit is a control
//! action for the frontend and never reaches the simulation.

use crate::sim::TickInput;

/// Gamepad button indices in the W3C "standard" mapping
pub mod buttons {
    pub const BACK: usize = 8;
    pub const DPAD_LEFT: usize = 14;
    pub const DPAD_RIGHT: usize = 15;
}

/// Held keyboard keys
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyboardState {
    pub left: bool,
    pub right: bool,
    pub quit: bool,
}

impl KeyboardState {
    /// Record a key press; returns true if the key is one of ours
    pub fn key_down(&mut self, key: &str) -> bool {
        self.set(key, true)
    }

    /// Record a key release; returns true if the key is one of ours
    pub fn key_up(&mut self, key: &str) -> bool {
        self.set(key, false)
    }

    fn set(&mut self, key: &str, down: bool) -> bool {
        match key {
            "ArrowLeft" | "Left" => self.left = down,
            "ArrowRight" | "Right" => self.right = down,
            "Escape" | "Esc" => self.quit = down,
            _ => return false,
        }
        true
    }

    /// Release everything (window lost focus)
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Snapshot of the first connected gamepad
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GamepadState {
    pub dpad_left: bool,
    pub dpad_right: bool,
    pub back: bool,
}

impl GamepadState {
    /// Build from a button lookup in the standard mapping
    pub fn from_buttons(pressed: impl Fn(usize) -> bool) -> Self {
        Self {
            dpad_left: pressed(buttons::DPAD_LEFT),
            dpad_right: pressed(buttons::DPAD_RIGHT),
            back: pressed(buttons::BACK),
        }
    }
}

/// Logical controls for one frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Controls {
    pub input: TickInput,
    pub quit: bool,
}

impl Controls {
    pub fn combine(keyboard: &KeyboardState, gamepad: &GamepadState) -> Self {
        Self {
            input: TickInput {
                move_left: keyboard.left || gamepad.dpad_left,
                move_right: keyboard.right || gamepad.dpad_right,
            },
            quit: keyboard.quit || gamepad.back,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_tracking() {
        let mut kb = KeyboardState::default();
        assert!(kb.key_down("ArrowLeft"));
        assert!(kb.left);
        assert!(!kb.key_down("a"));
        assert!(kb.key_up("ArrowLeft"));
        assert!(!kb.left);
    }

    #[test]
    fn test_sources_are_ored() {
        let kb = KeyboardState {
            left: true,
            ..Default::default()
        };
        let pad = GamepadState {
            dpad_right: true,
            ..Default::default()
        };
        let controls = Controls::combine(&kb, &pad);
        assert!(controls.input.move_left);
        assert!(controls.input.move_right);
        assert!(!controls.quit);
    }

    #[test]
    fn test_gamepad_back_quits() {
        let pad = GamepadState::from_buttons(|i| i == buttons::BACK);
        assert!(pad.back && !pad.dpad_left && !pad.dpad_right);
        assert!(Controls::combine(&KeyboardState::default(), &pad).quit);
    }

    #[test]
    fn test_clear_releases_keys() {
        let mut kb = KeyboardState::default();
        kb.key_down("ArrowRight");
        kb.key_down("Escape");
        kb.clear();
        assert_eq!(kb, KeyboardState::default());
    }
}

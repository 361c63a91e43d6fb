//! Keyboard snapshot handed to the session each tick

use serde::{Deserialize, Serialize};

/// Logical keys the runner polls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Key {
    Left,
    Right,
    Up,
    Down,
    Space,
}

/// Held keys for one tick, plus keys that went down this tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputSnapshot {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    pub space: bool,
    /// Space transitioned from released to pressed this tick
    pub space_just_pressed: bool,
}

impl InputSnapshot {
    pub fn none() -> Self {
        Self::default()
    }

    /// Snapshot with the given keys held (and freshly pressed)
    pub fn holding(keys: &[Key]) -> Self {
        let mut input = Self::default();
        for key in keys {
            input.set(*key, true);
        }
        input.space_just_pressed = input.space;
        input
    }

    fn set(&mut self, key: Key, down: bool) {
        match key {
            Key::Left => self.left = down,
            Key::Right => self.right = down,
            Key::Up => self.up = down,
            Key::Down => self.down = down,
            Key::Space => self.space = down,
        }
    }

    /// Any arrow key held
    pub fn any_direction(&self) -> bool {
        self.left || self.right || self.up || self.down
    }

    /// Retry accepts either a fresh press or a held key
    pub fn retry_requested(&self) -> bool {
        self.space || self.space_just_pressed
    }

    /// Derive `space_just_pressed` from the previous tick's snapshot
    pub fn with_edges(mut self, previous: &InputSnapshot) -> Self {
        self.space_just_pressed = self.space && !previous.space;
        self
    }
}

//! Per-frame keyboard input resource.
//!
//! The host loop polls its device and hands the set of held keys to
//! [`InputState::advance`] once per frame. Gameplay code then asks for
//! edge-triggered transitions (`was_just_pressed`, `was_just_released`) by
//! comparing the current snapshot with the previous one.

use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};

/// Maximum number of simultaneously held keys tracked per frame.
pub const MAX_HELD_KEYS: usize = 16;

/// Keys the game reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    W,
    A,
    S,
    D,
    Up,
    Down,
    Left,
    Right,
    Escape,
    O,
    Space,
    Enter,
    F1,
    F2,
    F3,
    F4,
}

/// Current and previous snapshot of held keys.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    current: ArrayVec<Key, MAX_HELD_KEYS>,
    previous: ArrayVec<Key, MAX_HELD_KEYS>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Roll the current snapshot into `previous` and record `held` as current.
    ///
    /// Duplicates are ignored; keys beyond [`MAX_HELD_KEYS`] are dropped.
    pub fn advance(&mut self, held: &[Key]) {
        self.previous = std::mem::take(&mut self.current);
        for key in held {
            if self.current.contains(key) {
                continue;
            }
            if self.current.try_push(*key).is_err() {
                log::debug!("Dropping held key {:?}: snapshot is full", key);
                break;
            }
        }
    }

    pub fn is_pressed(&self, key: Key) -> bool {
        self.current.contains(&key)
    }

    pub fn is_released(&self, key: Key) -> bool {
        !self.current.contains(&key)
    }

    /// Held this frame but not the previous one.
    pub fn was_just_pressed(&self, key: Key) -> bool {
        self.current.contains(&key) && !self.previous.contains(&key)
    }

    /// Held the previous frame but not this one.
    pub fn was_just_released(&self, key: Key) -> bool {
        !self.current.contains(&key) && self.previous.contains(&key)
    }

    pub fn held(&self) -> &[Key] {
        &self.current
    }
}

//! High-level game state.
//!
//! The authoritative value lives in a shared [`GameStateCell`] owned by the
//! [`StateManager`](crate::systems::gamestate::StateManager); the frame loop
//! and input bindings read it to decide which phases run.

use std::cell::Cell;
use std::rc::Rc;

use serde::Serialize;

/// Discrete high-level states the game can be in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum GameStates {
    #[default]
    Playing,
    Paused,
    Won,
    Lost,
}

impl GameStates {
    /// Won and Lost end the run; nothing moves out of them.
    pub fn is_finished(&self) -> bool {
        matches!(self, GameStates::Won | GameStates::Lost)
    }
}

/// Shared, single-threaded handle to the current state.
pub type GameStateCell = Rc<Cell<GameStates>>;

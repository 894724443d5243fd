use serde::Serialize;

use super::EventAction;

/// Menu transitions; gameplay runs only while the menu is hidden.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MenuEvent {
    /// Show the menu and pause gameplay.
    Pause,
    /// Hide the menu and resume gameplay.
    Play,
}

impl MenuEvent {
    pub fn action(&self) -> EventAction {
        match self {
            MenuEvent::Pause => EventAction::OnPause,
            MenuEvent::Play => EventAction::OnPlay,
        }
    }
}

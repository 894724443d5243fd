use serde::Serialize;

use super::EventAction;
use crate::resources::arena::ObjectId;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum GameObjectEvent {
    /// Ask the owning scene to drop `target` at the end of the frame.
    Remove { target: ObjectId },
    /// The object `source` decided the player lost.
    Lose { source: ObjectId },
    Win,
}

impl GameObjectEvent {
    pub fn action(&self) -> EventAction {
        match self {
            GameObjectEvent::Remove { .. } => EventAction::OnRemoveObject,
            GameObjectEvent::Lose { .. } => EventAction::OnLose,
            GameObjectEvent::Win => EventAction::OnWin,
        }
    }
}

use serde::Serialize;

use super::EventAction;
use crate::resources::arena::ObjectId;

/// Changes addressed to a UI object by handle.
///
/// Subscribers compare `target` with the object they belong to and ignore
/// events meant for someone else.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum UiEvent {
    HealthDelta { target: ObjectId, delta: i32 },
    SetVisible { target: ObjectId, visible: bool },
}

impl UiEvent {
    pub fn target(&self) -> ObjectId {
        match self {
            UiEvent::HealthDelta { target, .. } | UiEvent::SetVisible { target, .. } => *target,
        }
    }

    pub fn action(&self) -> EventAction {
        match self {
            UiEvent::HealthDelta { .. } => EventAction::OnHealthDelta,
            UiEvent::SetVisible { .. } => EventAction::OnSetVisible,
        }
    }
}

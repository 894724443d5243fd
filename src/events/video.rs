use serde::Serialize;

use super::EventAction;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum VideoEvent {
    Play { name: String },
    Stop { name: String },
}

impl VideoEvent {
    pub fn play(name: impl Into<String>) -> Self {
        VideoEvent::Play { name: name.into() }
    }

    pub fn action(&self) -> EventAction {
        match self {
            VideoEvent::Play { .. } => EventAction::OnPlay,
            VideoEvent::Stop { .. } => EventAction::OnStop,
        }
    }
}

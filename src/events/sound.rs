use serde::Serialize;

use super::EventAction;

/// Requests for the audio collaborator, addressed by cue name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SoundEvent {
    Play2D { cue: String },
    Play3D { cue: String, position: [f32; 3] },
    Stop { cue: String },
    Pause { cue: String },
    Resume { cue: String },
}

impl SoundEvent {
    pub fn play_2d(cue: impl Into<String>) -> Self {
        SoundEvent::Play2D { cue: cue.into() }
    }

    pub fn stop(cue: impl Into<String>) -> Self {
        SoundEvent::Stop { cue: cue.into() }
    }

    pub fn cue(&self) -> &str {
        match self {
            SoundEvent::Play2D { cue }
            | SoundEvent::Play3D { cue, .. }
            | SoundEvent::Stop { cue }
            | SoundEvent::Pause { cue }
            | SoundEvent::Resume { cue } => cue,
        }
    }

    pub fn action(&self) -> EventAction {
        match self {
            SoundEvent::Play2D { .. } => EventAction::OnPlay2D,
            SoundEvent::Play3D { .. } => EventAction::OnPlay3D,
            SoundEvent::Stop { .. } => EventAction::OnStop,
            SoundEvent::Pause { .. } => EventAction::OnPause,
            SoundEvent::Resume { .. } => EventAction::OnResume,
        }
    }
}

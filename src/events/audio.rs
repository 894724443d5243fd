//! Messages crossing the audio thread boundary.
//!
//! The [`SoundManager`](crate::systems::audio::SoundManager) turns bus events
//! into [`AudioCmd`]s; the audio thread answers with [`AudioMessage`]s.

/// Commands sent *to* the audio thread.
#[derive(Debug, Clone, PartialEq)]
pub enum AudioCmd {
    Load { id: String, volume: f32, looped: bool },
    Play { id: String },
    Play3D { id: String, position: [f32; 3] },
    Stop { id: String },
    Pause { id: String },
    Resume { id: String },
    UnloadAll,
    Shutdown,
}

/// Messages sent *back* from the audio thread.
#[derive(Debug, Clone, PartialEq)]
pub enum AudioMessage {
    Loaded { id: String },
    Started { id: String },
    Stopped { id: String },
    Paused { id: String },
    Resumed { id: String },
    /// A command named a cue the thread never loaded.
    Unknown { id: String },
    UnloadedAll,
}

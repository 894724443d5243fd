//! Engine systems.
//!
//! Everything that runs once per frame or reacts to bus events on behalf of
//! the whole game rather than a single object.
//!
//! Submodules overview
//! - [`audio`] – cue registry, `Sound` event adapter and the audio thread
//! - [`frame`] – the fixed per-frame protocol driving everything else
//! - [`gamestate`] – pause, resume and end-of-game transitions
//! - [`input`] – key bindings turned into bus events
//! - [`physics`] – contact detection between colliders and contact delivery
//! - [`render`] – draw-call sinks and scene traversal
//! - [`scene`] – scenes, deferred structural commands and scene switching
//! - [`trace`] – records bus traffic for inspection
//! - [`video`] – video cue registry and `Video` event adapter

pub mod audio;
pub mod frame;
pub mod gamestate;
pub mod input;
pub mod physics;
pub mod render;
pub mod scene;
pub mod trace;
pub mod video;

//! Mineshaft library.
//!
//! This module exposes the event bus, the component/object model, the scene
//! and frame systems, and the level builder for use in integration tests and
//! by the headless runner.

pub mod components;
pub mod error;
pub mod events;
pub mod game;
pub mod resources;
pub mod systems;

//! Long-lived data shared by systems and components.
//!
//! Overview
//! - `arena` – generational storage addressing scene objects by handle
//! - `assetstore` – shared meshes, materials and textures keyed by name
//! - `audio` – bridge and channels for the background audio thread
//! - `gameconfig` – INI-backed game configuration
//! - `gamestate` – the current high-level game state
//! - `input` – per-frame keyboard state of keys relevant to the game
//! - `worldtime` – simulation time and delta
pub mod arena;
pub mod assetstore;
pub mod audio;
pub mod gameconfig;
pub mod gamestate;
pub mod input;
pub mod worldtime;

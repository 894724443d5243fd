//! Error types shared across the crate.
//!
//! Two families exist:
//! - [`HandlerError`] is returned by event handlers. The
//!   [`EventBus`](crate::events::bus::EventBus) logs it and keeps delivering,
//!   so it never crosses the bus boundary.
//! - [`EngineError`] covers fallible setup work: loading configuration and
//!   level files, switching scenes, talking to the audio backend.

use std::path::PathBuf;

use thiserror::Error;

use crate::events::{EventAction, EventCategory};

/// Failure reported by a single event handler.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// The handler received an action it has no meaning for.
    #[error("unexpected {action:?} event delivered to a {category:?} handler")]
    Unexpected {
        category: EventCategory,
        action: EventAction,
    },
    /// The handler understood the event but could not act on it.
    #[error("{0}")]
    Failed(String),
}

/// Errors raised while building or driving the game.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to load config {path:?}: {reason}")]
    Config { path: PathBuf, reason: String },

    #[error("failed to access {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid level data: {0}")]
    Level(#[from] serde_json::Error),

    #[error("unknown scene '{0}'")]
    UnknownScene(String),

    #[error("audio backend disconnected")]
    AudioDisconnected,
}

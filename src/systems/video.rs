//! Video collaborator adapter.
//!
//! [`VideoManager`] keeps a registry of [`VideoCue`]s and follows `Video`
//! events to know which one is on screen. Decoding and presentation belong to
//! the host.

use std::cell::RefCell;
use std::rc::Rc;

use log::{debug, info};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::HandlerError;
use crate::events::bus::{EventBus, HandlerResult, SubscriptionToken};
use crate::events::{Event, EventCategory, VideoEvent};

const DEFAULT_NAME: &str = "Default_Name";
const FALLBACK_VOLUME: f32 = 0.5;
const FALLBACK_FPS: f32 = 30.0;

/// Serialized description of a video cue in level files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoCueData {
    pub name: String,
    #[serde(default = "default_volume")]
    pub volume: f32,
    #[serde(default)]
    pub looped: bool,
    #[serde(default)]
    pub muted: bool,
    #[serde(default = "default_fps")]
    pub fps: f32,
}

fn default_volume() -> f32 {
    1.0
}

fn default_fps() -> f32 {
    FALLBACK_FPS
}

#[derive(Debug, Clone, PartialEq)]
pub struct VideoCue {
    name: String,
    volume: f32,
    pub looped: bool,
    pub muted: bool,
    frame_update_rate_ms: u32,
}

impl VideoCue {
    /// Blank names become `Default_Name`; volumes outside 0..=1 become 0.5.
    pub fn new(name: &str, volume: f32, looped: bool, muted: bool, fps: f32) -> Self {
        let name = name.trim();
        let fps = if fps > 0.0 { fps } else { FALLBACK_FPS };
        Self {
            name: if name.is_empty() {
                DEFAULT_NAME.to_string()
            } else {
                name.to_string()
            },
            volume: if (0.0..=1.0).contains(&volume) {
                volume
            } else {
                FALLBACK_VOLUME
            },
            looped,
            muted,
            frame_update_rate_ms: (1000.0 / fps).ceil() as u32,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// Milliseconds between two frames.
    pub fn frame_update_rate_ms(&self) -> u32 {
        self.frame_update_rate_ms
    }
}

impl From<&VideoCueData> for VideoCue {
    fn from(data: &VideoCueData) -> Self {
        VideoCue::new(&data.name, data.volume, data.looped, data.muted, data.fps)
    }
}

#[derive(Default)]
struct VideoState {
    cues: FxHashMap<String, VideoCue>,
    current: Option<String>,
    started: u64,
}

pub struct VideoManager {
    bus: Rc<EventBus>,
    state: Rc<RefCell<VideoState>>,
    token: SubscriptionToken,
}

impl VideoManager {
    pub fn new(bus: Rc<EventBus>) -> Self {
        let state = Rc::new(RefCell::new(VideoState::default()));
        let handler_state = Rc::clone(&state);
        let token = bus.subscribe(EventCategory::Video, move |event: &Event| -> HandlerResult {
            let Event::Video(video) = event else {
                return Err(event.unexpected());
            };
            let mut state = handler_state
                .try_borrow_mut()
                .map_err(|_| HandlerError::Failed("video state is busy".into()))?;
            match video {
                VideoEvent::Play { name } => {
                    if !state.cues.contains_key(name) {
                        debug!("No video named '{}'", name);
                        return Ok(());
                    }
                    info!("Playing video '{}'", name);
                    state.current = Some(name.clone());
                    state.started += 1;
                }
                VideoEvent::Stop { name } => {
                    if state.current.as_deref() == Some(name.as_str()) {
                        state.current = None;
                    }
                }
            }
            Ok(())
        });
        Self { bus, state, token }
    }

    pub fn register(&self, cue: VideoCue) {
        self.state
            .borrow_mut()
            .cues
            .insert(cue.name().to_string(), cue);
    }

    pub fn cue(&self, name: &str) -> Option<VideoCue> {
        self.state.borrow().cues.get(name).cloned()
    }

    /// Name of the video on screen, if any.
    pub fn current(&self) -> Option<String> {
        self.state.borrow().current.clone()
    }

    /// Number of play requests honoured so far.
    pub fn started(&self) -> u64 {
        self.state.borrow().started
    }
}

impl Drop for VideoManager {
    fn drop(&mut self) {
        self.bus.unsubscribe(self.token);
    }
}

//! Audio collaborator: cue registry, bus adapter and the audio thread.
//!
//! - [`SoundManager`] subscribes to `Sound` events and forwards requests for
//!   registered cues as [`AudioCmd`]s. Requests for unknown cues are dropped
//!   with a debug log; the gameplay change that raised them has already
//!   happened and is not affected.
//! - [`audio_thread`] runs on its own OS thread and owns playback state. This
//!   build has no output device, so it only tracks which cues are loaded and
//!   playing and reports every change back as an [`AudioMessage`].
//!
//! The thread is started by [`crate::resources::audio::setup_audio`] and
//! stopped by [`crate::resources::audio::shutdown_audio`].

use std::cell::RefCell;
use std::rc::Rc;

use crossbeam_channel::{Receiver, Sender};
use log::{debug, info, warn};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use crate::error::HandlerError;
use crate::events::audio::{AudioCmd, AudioMessage};
use crate::events::bus::{EventBus, HandlerResult, SubscriptionToken};
use crate::events::{Event, EventCategory, SoundEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundCategory {
    Effect,
    Dialogue,
    Ambient,
    Music,
}

/// A named, playable sound.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cue {
    pub name: String,
    pub category: SoundCategory,
    #[serde(default = "default_volume")]
    pub volume: f32,
    #[serde(default)]
    pub looped: bool,
}

fn default_volume() -> f32 {
    1.0
}

impl Cue {
    pub fn new(name: impl Into<String>, category: SoundCategory, volume: f32, looped: bool) -> Self {
        Self {
            name: name.into(),
            category,
            volume: volume.clamp(0.0, 1.0),
            looped,
        }
    }
}

#[derive(Default)]
struct CueRegistry {
    cues: FxHashMap<String, Cue>,
    playing: FxHashSet<String>,
    forwarded: u64,
    ignored: u64,
}

/// Forwards `Sound` events for registered cues to the audio backend.
pub struct SoundManager {
    bus: Rc<EventBus>,
    tx_cmd: Sender<AudioCmd>,
    registry: Rc<RefCell<CueRegistry>>,
    token: SubscriptionToken,
}

impl SoundManager {
    pub fn new(bus: Rc<EventBus>, tx_cmd: Sender<AudioCmd>) -> Self {
        let registry = Rc::new(RefCell::new(CueRegistry::default()));
        let handler_registry = Rc::clone(&registry);
        let handler_tx = tx_cmd.clone();
        let token = bus.subscribe(EventCategory::Sound, move |event: &Event| -> HandlerResult {
            let Event::Sound(sound) = event else {
                return Err(event.unexpected());
            };
            let mut registry = handler_registry
                .try_borrow_mut()
                .map_err(|_| HandlerError::Failed("cue registry is busy".into()))?;
            let Some(cue) = registry.cues.get(sound.cue()) else {
                debug!("No cue named '{}', ignoring {:?}", sound.cue(), sound.action());
                registry.ignored += 1;
                return Ok(());
            };
            let id = cue.name.clone();
            let command = match sound {
                SoundEvent::Play2D { .. } => AudioCmd::Play { id: id.clone() },
                SoundEvent::Play3D { position, .. } => AudioCmd::Play3D {
                    id: id.clone(),
                    position: *position,
                },
                SoundEvent::Stop { .. } => AudioCmd::Stop { id: id.clone() },
                SoundEvent::Pause { .. } => AudioCmd::Pause { id: id.clone() },
                SoundEvent::Resume { .. } => AudioCmd::Resume { id: id.clone() },
            };
            handler_tx
                .send(command)
                .map_err(|_| HandlerError::Failed("audio backend disconnected".into()))?;
            match sound {
                SoundEvent::Play2D { .. } | SoundEvent::Play3D { .. } | SoundEvent::Resume { .. } => {
                    registry.playing.insert(id);
                }
                SoundEvent::Stop { .. } | SoundEvent::Pause { .. } => {
                    registry.playing.remove(&id);
                }
            }
            registry.forwarded += 1;
            Ok(())
        });

        Self {
            bus,
            tx_cmd,
            registry,
            token,
        }
    }

    /// Register `cue` and ask the backend to load it.
    ///
    /// Volumes outside `[0, 1]` (e.g. from a level file) are clamped.
    pub fn register(&self, mut cue: Cue) {
        cue.volume = cue.volume.clamp(0.0, 1.0);
        let load = AudioCmd::Load {
            id: cue.name.clone(),
            volume: cue.volume,
            looped: cue.looped,
        };
        if self.tx_cmd.send(load).is_err() {
            warn!("Audio backend gone; cue '{}' registered without loading", cue.name);
        }
        self.registry.borrow_mut().cues.insert(cue.name.clone(), cue);
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.registry.borrow().cues.contains_key(name)
    }

    /// Cues a play request was forwarded for and not stopped since.
    pub fn is_playing(&self, name: &str) -> bool {
        self.registry.borrow().playing.contains(name)
    }

    pub fn cue_count(&self) -> usize {
        self.registry.borrow().cues.len()
    }

    /// Requests forwarded to the backend so far.
    pub fn forwarded(&self) -> u64 {
        self.registry.borrow().forwarded
    }

    /// Requests dropped because they named an unknown cue.
    pub fn ignored(&self) -> u64 {
        self.registry.borrow().ignored
    }
}

impl Drop for SoundManager {
    fn drop(&mut self) {
        self.bus.unsubscribe(self.token);
    }
}

struct LoadedCue {
    volume: f32,
    looped: bool,
}

/// Entry point of the dedicated audio thread.
///
/// Blocks on the command channel and answers each command with a message.
/// Returns on [`AudioCmd::Shutdown`] or when every sender is gone.
pub fn audio_thread(rx_cmd: Receiver<AudioCmd>, tx_msg: Sender<AudioMessage>) {
    info!(
        "[audio] thread starting (id={:?})",
        std::thread::current().id()
    );

    let mut loaded: FxHashMap<String, LoadedCue> = FxHashMap::default();
    let mut playing: FxHashSet<String> = FxHashSet::default();

    while let Ok(cmd) = rx_cmd.recv() {
        let reply = match cmd {
            AudioCmd::Load { id, volume, looped } => {
                debug!("[audio] load id='{}' volume={} looped={}", id, volume, looped);
                loaded.insert(id.clone(), LoadedCue { volume, looped });
                AudioMessage::Loaded { id }
            }
            AudioCmd::Play { id } | AudioCmd::Play3D { id, .. } => match loaded.get(&id) {
                Some(cue) => {
                    debug!(
                        "[audio] play id='{}' volume={} looped={}",
                        id, cue.volume, cue.looped
                    );
                    playing.insert(id.clone());
                    AudioMessage::Started { id }
                }
                None => AudioMessage::Unknown { id },
            },
            AudioCmd::Stop { id } => {
                if loaded.contains_key(&id) {
                    playing.remove(&id);
                    AudioMessage::Stopped { id }
                } else {
                    AudioMessage::Unknown { id }
                }
            }
            AudioCmd::Pause { id } => {
                if loaded.contains_key(&id) {
                    playing.remove(&id);
                    AudioMessage::Paused { id }
                } else {
                    AudioMessage::Unknown { id }
                }
            }
            AudioCmd::Resume { id } => {
                if loaded.contains_key(&id) {
                    playing.insert(id.clone());
                    AudioMessage::Resumed { id }
                } else {
                    AudioMessage::Unknown { id }
                }
            }
            AudioCmd::UnloadAll => {
                loaded.clear();
                playing.clear();
                AudioMessage::UnloadedAll
            }
            AudioCmd::Shutdown => break,
        };
        // the game side may already be gone during teardown
        let _ = tx_msg.send(reply);
    }

    info!(
        "[audio] thread exiting ({} cue(s) loaded, {} playing)",
        loaded.len(),
        playing.len()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::unbounded;

    #[test]
    fn thread_acknowledges_commands() {
        let (tx_cmd, rx_cmd) = unbounded();
        let (tx_msg, rx_msg) = unbounded();
        let handle = std::thread::spawn(move || audio_thread(rx_cmd, tx_msg));

        tx_cmd
            .send(AudioCmd::Load {
                id: "Steps".into(),
                volume: 0.5,
                looped: true,
            })
            .unwrap();
        tx_cmd.send(AudioCmd::Play { id: "Steps".into() }).unwrap();
        tx_cmd.send(AudioCmd::Play { id: "Nope".into() }).unwrap();
        tx_cmd.send(AudioCmd::Shutdown).unwrap();
        handle.join().unwrap();

        let messages: Vec<AudioMessage> = rx_msg.try_iter().collect();
        assert_eq!(
            messages,
            vec![
                AudioMessage::Loaded { id: "Steps".into() },
                AudioMessage::Started { id: "Steps".into() },
                AudioMessage::Unknown { id: "Nope".into() },
            ]
        );
    }

    #[test]
    fn cue_volume_is_clamped() {
        let cue = Cue::new("loud", SoundCategory::Effect, 3.0, false);
        assert_eq!(cue.volume, 1.0);
    }

    #[test]
    fn register_clamps_deserialized_volume() {
        let bus = Rc::new(EventBus::new());
        let (tx_cmd, rx_cmd) = unbounded();
        let sounds = SoundManager::new(bus, tx_cmd);

        let loud: Cue =
            serde_json::from_str(r#"{"name":"Steps","category":"Effect","volume":3.0}"#).unwrap();
        let muted: Cue =
            serde_json::from_str(r#"{"name":"Drip","category":"Ambient","volume":-0.5}"#).unwrap();
        sounds.register(loud);
        sounds.register(muted);

        let volumes: Vec<f32> = rx_cmd
            .try_iter()
            .filter_map(|cmd| match cmd {
                AudioCmd::Load { volume, .. } => Some(volume),
                _ => None,
            })
            .collect();
        assert_eq!(volumes, vec![1.0, 0.0]);
    }
}

//! Input bindings.
//!
//! Once per frame [`dispatch_input_events`] reads the edges of the
//! [`InputState`] and publishes the matching events. Pausing and resuming
//! work in their own states; every other binding is live only while playing.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::events::bus::EventBus;
use crate::events::{Event, MenuEvent, SoundEvent, UiEvent, VideoEvent};
use crate::resources::arena::ObjectId;
use crate::resources::gamestate::GameStates;
use crate::resources::input::{InputState, Key};

/// Plays `cue` when `key` goes down.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoundBinding {
    pub key: Key,
    pub cue: String,
    /// Also stop the cue when the key is released (footsteps).
    #[serde(default)]
    pub stop_on_release: bool,
}

#[derive(Debug, Clone)]
pub struct InputBindings {
    /// Health UI object the up/down keys address.
    pub health_target: Option<ObjectId>,
    pub health_up: Key,
    pub health_down: Key,
    pub health_step: i32,
    pub pause_key: Key,
    pub resume_key: Key,
    /// Video shown while paused.
    pub pause_video: Option<String>,
    /// Cues silenced when pausing.
    pub ambient_cues: Vec<String>,
    pub sound_bindings: Vec<SoundBinding>,
}

impl Default for InputBindings {
    fn default() -> Self {
        Self {
            health_target: None,
            health_up: Key::Up,
            health_down: Key::Down,
            health_step: 1,
            pause_key: Key::Escape,
            resume_key: Key::O,
            pause_video: None,
            ambient_cues: Vec::new(),
            sound_bindings: Vec::new(),
        }
    }
}

/// Publish the events bound to this frame's key edges, in binding order.
/// Returns how many events were published.
pub fn dispatch_input_events(
    bindings: &InputBindings,
    input: &InputState,
    state: GameStates,
    bus: &EventBus,
) -> usize {
    let events = bound_events(bindings, input, state);
    let count = events.len();
    for event in events {
        bus.publish(event);
    }
    count
}

fn bound_events(bindings: &InputBindings, input: &InputState, state: GameStates) -> Vec<Event> {
    let mut events: Vec<Event> = Vec::new();

    match state {
        GameStates::Playing if input.was_just_pressed(bindings.pause_key) => {
            debug!("Pause requested");
            if let Some(video) = &bindings.pause_video {
                events.push(VideoEvent::play(video.clone()).into());
            }
            events.push(MenuEvent::Pause.into());
            for cue in &bindings.ambient_cues {
                events.push(SoundEvent::stop(cue.clone()).into());
            }
            return events;
        }
        GameStates::Paused if input.was_just_pressed(bindings.resume_key) => {
            debug!("Resume requested");
            events.push(MenuEvent::Play.into());
            if let Some(video) = &bindings.pause_video {
                events.push(
                    VideoEvent::Stop {
                        name: video.clone(),
                    }
                    .into(),
                );
            }
            return events;
        }
        GameStates::Playing => {}
        _ => return events,
    }

    if let Some(target) = bindings.health_target {
        if input.was_just_pressed(bindings.health_up) {
            events.push(
                UiEvent::HealthDelta {
                    target,
                    delta: bindings.health_step,
                }
                .into(),
            );
        }
        if input.was_just_pressed(bindings.health_down) {
            events.push(
                UiEvent::HealthDelta {
                    target,
                    delta: -bindings.health_step,
                }
                .into(),
            );
        }
    }

    for binding in &bindings.sound_bindings {
        if input.was_just_pressed(binding.key) {
            events.push(SoundEvent::play_2d(binding.cue.clone()).into());
        } else if binding.stop_on_release && input.was_just_released(binding.key) {
            events.push(SoundEvent::stop(binding.cue.clone()).into());
        }
    }

    events
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::events::EventCategory;
    use crate::events::bus::HandlerResult;

    fn recording_bus() -> (EventBus, Rc<RefCell<Vec<Event>>>) {
        let bus = EventBus::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        for category in EventCategory::ALL {
            let seen = Rc::clone(&seen);
            bus.subscribe(category, move |event: &Event| -> HandlerResult {
                seen.borrow_mut().push(event.clone());
                Ok(())
            });
        }
        (bus, seen)
    }

    #[test]
    fn footsteps_start_and_stop() {
        let (bus, seen) = recording_bus();
        let bindings = InputBindings {
            sound_bindings: vec![SoundBinding {
                key: Key::W,
                cue: "Steps".into(),
                stop_on_release: true,
            }],
            ..Default::default()
        };
        let mut input = InputState::new();

        input.advance(&[Key::W]);
        dispatch_input_events(&bindings, &input, GameStates::Playing, &bus);
        input.advance(&[Key::W]);
        dispatch_input_events(&bindings, &input, GameStates::Playing, &bus);
        input.advance(&[]);
        dispatch_input_events(&bindings, &input, GameStates::Playing, &bus);

        assert_eq!(
            *seen.borrow(),
            vec![
                Event::from(SoundEvent::play_2d("Steps")),
                Event::from(SoundEvent::stop("Steps")),
            ]
        );
    }

    #[test]
    fn pause_plays_video_and_silences_ambience() {
        let (bus, seen) = recording_bus();
        let bindings = InputBindings {
            pause_video: Some("main menu video".into()),
            ambient_cues: vec!["Heartbeat".into()],
            ..Default::default()
        };
        let mut input = InputState::new();
        input.advance(&[Key::Escape]);

        let published = dispatch_input_events(&bindings, &input, GameStates::Playing, &bus);
        assert_eq!(published, 3);
        assert_eq!(
            *seen.borrow(),
            vec![
                Event::from(VideoEvent::play("main menu video")),
                Event::from(MenuEvent::Pause),
                Event::from(SoundEvent::stop("Heartbeat")),
            ]
        );
    }

    #[test]
    fn gameplay_keys_are_ignored_while_paused() {
        let (bus, seen) = recording_bus();
        let bindings = InputBindings {
            health_target: Some(ObjectId::new(crate::resources::arena::SceneId(0), 0, 0)),
            ..Default::default()
        };
        let mut input = InputState::new();
        input.advance(&[Key::Up]);
        assert_eq!(
            dispatch_input_events(&bindings, &input, GameStates::Paused, &bus),
            0
        );
        assert!(seen.borrow().is_empty());
    }
}

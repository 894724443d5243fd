//! Fixed frame protocol.
//!
//! [`Engine::tick`] runs one frame:
//!
//! 1. advance world time and input, publish bound input events
//! 2. while playing: detect contacts and deliver them
//! 3. while playing: update world objects
//! 4. while playing: update UI objects
//! 5. apply queued scene commands
//! 6. render the active scene
//!
//! Events are synchronous, so by the time a step returns every consequence
//! it published has been handled. Structural changes those handlers asked
//! for wait until step 5.

use std::rc::Rc;

use log::trace;
use serde::Serialize;

use crate::events::bus::EventBus;
use crate::resources::gamestate::{GameStateCell, GameStates};
use crate::resources::input::{InputState, Key};
use crate::resources::worldtime::WorldTime;
use crate::systems::input::{InputBindings, dispatch_input_events};
use crate::systems::physics::{AabbContactDetector, ContactSource, dispatch_contacts};
use crate::systems::render::{RenderSink, render_scene};
use crate::systems::scene::SceneManager;

/// What happened during one [`Engine::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FrameReport {
    pub frame: u64,
    pub state: GameStates,
    pub contacts: usize,
    pub commands_applied: usize,
    pub draw_calls: usize,
    pub events_published: u64,
}

pub struct Engine {
    bus: Rc<EventBus>,
    scenes: SceneManager,
    state: GameStateCell,
    input: InputState,
    time: WorldTime,
    bindings: InputBindings,
    contacts: Box<dyn ContactSource>,
}

impl Engine {
    pub fn new(scenes: SceneManager, state: GameStateCell, bindings: InputBindings) -> Self {
        Self {
            bus: Rc::clone(scenes.bus()),
            scenes,
            state,
            input: InputState::new(),
            time: WorldTime::default(),
            bindings,
            contacts: Box::new(AabbContactDetector::new()),
        }
    }

    pub fn with_contact_source(mut self, source: impl ContactSource + 'static) -> Self {
        self.contacts = Box::new(source);
        self
    }

    pub fn tick(&mut self, dt_ms: u64, held: &[Key], sink: &mut dyn RenderSink) -> FrameReport {
        let published_before = self.bus.published_count();

        self.time.advance(dt_ms);
        self.input.advance(held);
        dispatch_input_events(&self.bindings, &self.input, self.state.get(), &self.bus);

        let mut contacts = 0;
        if self.state.get() == GameStates::Playing {
            let queue = self.scenes.queue().clone();
            if let Some(scene) = self.scenes.active_mut() {
                let found = self.contacts.detect(scene);
                contacts = dispatch_contacts(scene, &found, &queue);
            }
        }

        // a contact may have ended the game
        if self.state.get() == GameStates::Playing
            && let Some(scene) = self.scenes.active_mut()
        {
            scene.update_objects(false, &self.input, &self.time);
        }
        if self.state.get() == GameStates::Playing
            && let Some(scene) = self.scenes.active_mut()
        {
            scene.update_objects(true, &self.input, &self.time);
        }

        let commands_applied = self.scenes.apply_pending();

        let draw_calls = self
            .scenes
            .active()
            .map_or(0, |scene| render_scene(scene, sink));

        let report = FrameReport {
            frame: self.time.frame,
            state: self.state.get(),
            contacts,
            commands_applied,
            draw_calls,
            events_published: self.bus.published_count() - published_before,
        };
        trace!("{:?}", report);
        report
    }

    pub fn bus(&self) -> &Rc<EventBus> {
        &self.bus
    }

    pub fn scenes(&self) -> &SceneManager {
        &self.scenes
    }

    pub fn scenes_mut(&mut self) -> &mut SceneManager {
        &mut self.scenes
    }

    pub fn state(&self) -> GameStates {
        self.state.get()
    }

    pub fn time(&self) -> &WorldTime {
        &self.time
    }

    pub fn input(&self) -> &InputState {
        &self.input
    }

    pub fn bindings_mut(&mut self) -> &mut InputBindings {
        &mut self.bindings
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::components::gameobject::{GameObject, GameObjectType};
    use crate::events::bus::HandlerResult;
    use crate::events::{Event, EventCategory, MenuEvent};
    use crate::systems::render::DrawList;

    fn engine_with(state: GameStates) -> Engine {
        let bus = Rc::new(EventBus::new());
        let mut scenes = SceneManager::new(bus);
        let mut scene = scenes.create_scene("level");
        scene.add(GameObject::new("block", GameObjectType::Architecture));
        scenes.add_scene(scene);
        scenes.load_scene("level").unwrap();
        Engine::new(scenes, Rc::new(Cell::new(state)), InputBindings::default())
    }

    #[test]
    fn time_advances_even_while_paused() {
        let mut engine = engine_with(GameStates::Paused);
        let mut sink = DrawList::new();
        let first = engine.tick(16, &[], &mut sink);
        let second = engine.tick(16, &[], &mut sink);
        assert_eq!(first.frame, 1);
        assert_eq!(second.frame, 2);
        assert_eq!(second.state, GameStates::Paused);
        assert_eq!(engine.time().elapsed_ms, 32);
    }

    #[test]
    fn escape_pauses_through_the_bus() {
        let mut engine = engine_with(GameStates::Playing);
        let handle = Rc::clone(&engine.state);
        let bus = Rc::clone(engine.bus());
        bus.subscribe(EventCategory::Menu, move |event: &Event| -> HandlerResult {
            if matches!(event, Event::Menu(MenuEvent::Pause)) {
                handle.set(GameStates::Paused);
            }
            Ok(())
        });
        let report = engine.tick(16, &[Key::Escape], &mut DrawList::new());
        assert_eq!(report.state, GameStates::Paused);
        assert_eq!(report.events_published, 1);
    }
}

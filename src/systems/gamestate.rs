//! Game state transitions driven by bus events.
//!
//! | event               | from      | to      | side effects                   |
//! |---------------------|-----------|---------|--------------------------------|
//! | `Menu::Pause`       | Playing   | Paused  |                                |
//! | `Menu::Play`        | Paused    | Playing |                                |
//! | `GameObject::Lose`  | not final | Lost    | defeat cue, `Menu::Pause`      |
//! | `GameObject::Win`   | not final | Won     | victory cue, `Menu::Pause`     |
//!
//! Anything else leaves the state untouched.

use std::cell::Cell;
use std::rc::{Rc, Weak};

use log::{debug, info};

use crate::events::bus::{EventBus, HandlerResult, SubscriptionToken};
use crate::events::{Event, EventCategory, GameObjectEvent, MenuEvent, SoundEvent};
use crate::resources::gamestate::{GameStateCell, GameStates};

pub struct StateManager {
    bus: Rc<EventBus>,
    state: GameStateCell,
    tokens: [SubscriptionToken; 2],
}

impl StateManager {
    pub fn new(
        bus: Rc<EventBus>,
        start_paused: bool,
        defeat_cue: Option<String>,
        victory_cue: Option<String>,
    ) -> Self {
        let initial = if start_paused {
            GameStates::Paused
        } else {
            GameStates::Playing
        };
        let state: GameStateCell = Rc::new(Cell::new(initial));

        let menu_state = Rc::clone(&state);
        let menu_token = bus.subscribe(EventCategory::Menu, move |event: &Event| -> HandlerResult {
            let Event::Menu(menu) = event else {
                return Err(event.unexpected());
            };
            let next = match (menu, menu_state.get()) {
                (MenuEvent::Pause, GameStates::Playing) => GameStates::Paused,
                (MenuEvent::Play, GameStates::Paused) => GameStates::Playing,
                (_, current) => {
                    debug!("Ignoring {:?} while {:?}", menu, current);
                    return Ok(());
                }
            };
            info!("Game state {:?} -> {:?}", menu_state.get(), next);
            menu_state.set(next);
            Ok(())
        });

        let outcome_state = Rc::clone(&state);
        let weak_bus: Weak<EventBus> = Rc::downgrade(&bus);
        let outcome_token = bus.subscribe(
            EventCategory::GameObject,
            move |event: &Event| -> HandlerResult {
                let (next, cue) = match event {
                    Event::GameObject(GameObjectEvent::Lose { .. }) => {
                        (GameStates::Lost, defeat_cue.as_deref())
                    }
                    Event::GameObject(GameObjectEvent::Win) => {
                        (GameStates::Won, victory_cue.as_deref())
                    }
                    Event::GameObject(_) => return Ok(()),
                    other => return Err(other.unexpected()),
                };
                if outcome_state.get().is_finished() {
                    debug!("Ignoring {:?}: game already over", event.action());
                    return Ok(());
                }
                info!("Game state {:?} -> {:?}", outcome_state.get(), next);
                outcome_state.set(next);
                if let Some(bus) = weak_bus.upgrade() {
                    if let Some(cue) = cue {
                        bus.publish(SoundEvent::play_2d(cue));
                    }
                    bus.publish(MenuEvent::Pause);
                }
                Ok(())
            },
        );

        Self {
            bus,
            state,
            tokens: [menu_token, outcome_token],
        }
    }

    pub fn state(&self) -> GameStates {
        self.state.get()
    }

    pub fn is_playing(&self) -> bool {
        self.state.get() == GameStates::Playing
    }

    /// Shared handle read by the frame loop.
    pub fn handle(&self) -> GameStateCell {
        Rc::clone(&self.state)
    }
}

impl Drop for StateManager {
    fn drop(&mut self) {
        for token in self.tokens {
            self.bus.unsubscribe(token);
        }
    }
}

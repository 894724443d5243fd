//! Event types exchanged over the [`EventBus`](bus::EventBus).
//!
//! Every event belongs to an [`EventCategory`] (the subscription key) and
//! carries an [`EventAction`] verb. Payloads are typed per category so a
//! subscriber can never misread the arity or type of a field.
//!
//! Submodules:
//! - [`bus`] – synchronous publish/subscribe dispatcher with scopes
//! - [`sound`] – requests to play/stop/pause named audio cues
//! - [`ui`] – health deltas and visibility toggles addressed to UI objects
//! - [`gameobject`] – object removal and end-of-game notifications
//! - [`menu`] – pause/resume of gameplay
//! - [`video`] – play/stop named video cues
//! - [`inventory`] – items collected by the player
//! - [`audio`] – commands and messages for the background audio thread
pub mod audio;
pub mod bus;
pub mod gameobject;
pub mod inventory;
pub mod menu;
pub mod sound;
pub mod ui;
pub mod video;

use serde::Serialize;

pub use gameobject::GameObjectEvent;
pub use inventory::InventoryEvent;
pub use menu::MenuEvent;
pub use sound::SoundEvent;
pub use ui::UiEvent;
pub use video::VideoEvent;

/// Subscription namespace of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum EventCategory {
    Sound,
    Ui,
    GameObject,
    Menu,
    Video,
    Inventory,
}

impl EventCategory {
    pub const ALL: [EventCategory; 6] = [
        EventCategory::Sound,
        EventCategory::Ui,
        EventCategory::GameObject,
        EventCategory::Menu,
        EventCategory::Video,
        EventCategory::Inventory,
    ];
}

/// Verb of an event within its category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum EventAction {
    OnPlay2D,
    OnPlay3D,
    OnStop,
    OnPause,
    OnResume,
    OnPlay,
    OnHealthDelta,
    OnSetVisible,
    OnWin,
    OnLose,
    OnRemoveObject,
    OnAddInventory,
}

/// An immutable notification delivered to every subscriber of its category.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "category", content = "event")]
pub enum Event {
    Sound(SoundEvent),
    Ui(UiEvent),
    GameObject(GameObjectEvent),
    Menu(MenuEvent),
    Video(VideoEvent),
    Inventory(InventoryEvent),
}

impl Event {
    pub fn category(&self) -> EventCategory {
        match self {
            Event::Sound(_) => EventCategory::Sound,
            Event::Ui(_) => EventCategory::Ui,
            Event::GameObject(_) => EventCategory::GameObject,
            Event::Menu(_) => EventCategory::Menu,
            Event::Video(_) => EventCategory::Video,
            Event::Inventory(_) => EventCategory::Inventory,
        }
    }

    pub fn action(&self) -> EventAction {
        match self {
            Event::Sound(e) => e.action(),
            Event::Ui(e) => e.action(),
            Event::GameObject(e) => e.action(),
            Event::Menu(e) => e.action(),
            Event::Video(e) => e.action(),
            Event::Inventory(e) => e.action(),
        }
    }

    /// Handler error for an event a subscriber did not expect.
    pub fn unexpected(&self) -> crate::error::HandlerError {
        crate::error::HandlerError::Unexpected {
            category: self.category(),
            action: self.action(),
        }
    }
}

macro_rules! impl_from_event {
    ($($variant:ident => $ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Event {
                fn from(event: $ty) -> Self {
                    Event::$variant(event)
                }
            }
        )*
    };
}

impl_from_event! {
    Sound => SoundEvent,
    Ui => UiEvent,
    GameObject => GameObjectEvent,
    Menu => MenuEvent,
    Video => VideoEvent,
    Inventory => InventoryEvent,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_and_action_follow_variant() {
        let event: Event = SoundEvent::play_2d("Steps").into();
        assert_eq!(event.category(), EventCategory::Sound);
        assert_eq!(event.action(), EventAction::OnPlay2D);

        let event: Event = MenuEvent::Pause.into();
        assert_eq!(event.category(), EventCategory::Menu);
        assert_eq!(event.action(), EventAction::OnPause);
    }

    #[test]
    fn serializes_with_category_tag() {
        let event: Event = InventoryEvent::Add {
            description: "ammo pack".into(),
            value: 15,
        }
        .into();
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["category"], "Inventory");
        assert_eq!(json["event"]["Add"]["value"], 15);
    }
}

//! Gameplay responses run by solid colliders on contact.
//!
//! A response looks at the other object's declared type and turns the contact
//! into bus events. It never touches the scene directly: removal is requested
//! with [`GameObjectEvent::Remove`] and applied by the scene manager at the
//! end of the frame.

use std::any::Any;
use std::rc::Rc;

use log::debug;

use super::component::ContactContext;
use super::gameobject::GameObjectType;
use super::pickup::PickupBehaviour;
use crate::events::bus::EventBus;
use crate::events::{GameObjectEvent, InventoryEvent, SoundEvent};

pub trait ContactResponse: Any {
    fn kind(&self) -> &'static str;

    fn respond(&mut self, contact: &ContactContext<'_>);

    fn box_clone(&self) -> Box<dyn ContactResponse>;

    fn as_any(&self) -> &dyn Any;
}

impl Clone for Box<dyn ContactResponse> {
    fn clone(&self) -> Self {
        self.box_clone()
    }
}

/// Collects objects of `target_type`.
///
/// For each collected object, in order:
/// 1. `GameObject::Remove` naming it,
/// 2. `Sound::Play2D` with the pickup's own cue,
/// 3. `Inventory::Add` with its description and value,
/// 4. `Sound::Play2D` with the follow-up cue, when configured.
///
/// Objects without a [`PickupBehaviour`] are still removed.
#[derive(Clone)]
pub struct PickupResponse {
    bus: Rc<EventBus>,
    target_type: GameObjectType,
    follow_up_cue: Option<String>,
    collected: u32,
}

impl PickupResponse {
    pub fn new(bus: Rc<EventBus>, target_type: GameObjectType) -> Self {
        Self {
            bus,
            target_type,
            follow_up_cue: None,
            collected: 0,
        }
    }

    pub fn with_follow_up_cue(mut self, cue: Option<String>) -> Self {
        self.follow_up_cue = cue;
        self
    }

    pub fn target_type(&self) -> GameObjectType {
        self.target_type
    }

    /// Contacts that matched the target type.
    pub fn collected(&self) -> u32 {
        self.collected
    }
}

impl ContactResponse for PickupResponse {
    fn kind(&self) -> &'static str {
        "PickupResponse"
    }

    fn respond(&mut self, contact: &ContactContext<'_>) {
        if contact.other.object_type() != self.target_type {
            return;
        }
        self.collected += 1;
        debug!(
            "{} collected '{}' ({})",
            contact.owner,
            contact.other.name(),
            contact.other_id
        );

        self.bus.publish(GameObjectEvent::Remove {
            target: contact.other_id,
        });

        match contact.other.get_component::<PickupBehaviour>() {
            Some(pickup) => {
                self.bus.publish(SoundEvent::play_2d(pickup.sound.clone()));
                self.bus.publish(InventoryEvent::Add {
                    description: pickup.description.clone(),
                    value: pickup.value,
                });
            }
            None => debug!("'{}' has no pickup data", contact.other.name()),
        }

        if let Some(cue) = &self.follow_up_cue {
            self.bus.publish(SoundEvent::play_2d(cue.clone()));
        }
    }

    fn box_clone(&self) -> Box<dyn ContactResponse> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

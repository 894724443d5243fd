//! Game objects: a named, typed transform plus an ordered component list.
//!
//! Objects are owned by a [`Scene`](crate::systems::scene::Scene) and
//! addressed by [`ObjectId`]. Names are only labels; they may repeat.
//!
//! Cloning an object (for example to stamp out copies of an archetype) deep
//! copies every component through [`Component::box_clone`] and copies the
//! transform by value. Shared render resources held in `Rc`s stay shared.

use log::trace;
use serde::{Deserialize, Serialize};

use super::component::{AttachContext, Capabilities, Component, ContactContext, UpdateContext};
use super::transform::Transform;
use super::uisprite::UiSprite;
use crate::resources::arena::ObjectId;
use crate::resources::input::InputState;
use crate::resources::worldtime::WorldTime;
use crate::systems::render::RenderSink;

/// Declared role of an object; collision responses branch on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameObjectType {
    Player,
    Consumable,
    Interactable,
    Architecture,
    Camera,
    Ground,
    Skybox,
    Editor,
    Ui,
}

#[derive(Clone)]
pub struct GameObject {
    name: String,
    object_type: GameObjectType,
    pub transform: Transform,
    /// Present on UI objects only.
    pub sprite: Option<UiSprite>,
    enabled: bool,
    components: Vec<Box<dyn Component>>,
}

impl std::fmt::Debug for GameObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameObject")
            .field("name", &self.name)
            .field("object_type", &self.object_type)
            .field("transform", &self.transform)
            .field("enabled", &self.enabled)
            .field(
                "components",
                &self.components.iter().map(|c| c.kind()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl GameObject {
    pub fn new(name: impl Into<String>, object_type: GameObjectType) -> Self {
        Self {
            name: name.into(),
            object_type,
            transform: Transform::default(),
            sprite: None,
            enabled: true,
            components: Vec::new(),
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_sprite(mut self, sprite: UiSprite) -> Self {
        self.sprite = Some(sprite);
        self
    }

    pub fn with_component(mut self, component: impl Component) -> Self {
        self.add_component(component);
        self
    }

    /// Clone this object under a new name.
    pub fn clone_as(&self, name: impl Into<String>) -> Self {
        let mut copy = self.clone();
        copy.name = name.into();
        copy
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn object_type(&self) -> GameObjectType {
        self.object_type
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_ui(&self) -> bool {
        self.object_type == GameObjectType::Ui
    }

    pub fn add_component(&mut self, component: impl Component) {
        self.components.push(Box::new(component));
    }

    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    /// First component of type `C`.
    pub fn get_component<C: Component>(&self) -> Option<&C> {
        self.components
            .iter()
            .find_map(|c| c.as_any().downcast_ref::<C>())
    }

    pub fn get_component_mut<C: Component>(&mut self) -> Option<&mut C> {
        self.components
            .iter_mut()
            .find_map(|c| c.as_any_mut().downcast_mut::<C>())
    }

    pub(crate) fn attach(&mut self, ctx: &AttachContext) {
        trace!("Attaching '{}' as {}", self.name, ctx.owner);
        for component in self.components.iter_mut() {
            component.on_attach(ctx);
        }
    }

    pub(crate) fn detach(&mut self) {
        for component in self.components.iter_mut() {
            component.on_detach();
        }
    }

    /// Run `update` on every enabled updatable component.
    pub fn update(&mut self, owner: ObjectId, input: &InputState, time: &WorldTime) {
        if !self.enabled {
            return;
        }
        let GameObject {
            transform,
            sprite,
            components,
            ..
        } = self;
        for component in components.iter_mut() {
            if !component.is_enabled() || !component.capabilities().contains(Capabilities::UPDATABLE) {
                continue;
            }
            let mut ctx = UpdateContext {
                owner,
                transform: &mut *transform,
                sprite: sprite.as_mut(),
                input,
                time,
            };
            component.update(&mut ctx);
        }
    }

    /// Forward a contact with `other` to every collision-responding component.
    pub fn respond_to_contact(
        &mut self,
        owner: ObjectId,
        other_id: ObjectId,
        other: &GameObject,
        normal: bevy_math::Vec3,
        depth: f32,
    ) {
        if !self.enabled {
            return;
        }
        let GameObject {
            transform,
            components,
            ..
        } = self;
        for component in components.iter_mut() {
            if !component.is_enabled()
                || !component
                    .capabilities()
                    .contains(Capabilities::COLLISION_RESPONDING)
            {
                continue;
            }
            let mut ctx = ContactContext {
                owner,
                transform: &mut *transform,
                other_id,
                other,
                normal,
                depth,
            };
            component.on_contact(&mut ctx);
        }
    }

    pub fn draw(&self, owner: ObjectId, sink: &mut dyn RenderSink) {
        if !self.enabled {
            return;
        }
        for component in &self.components {
            if component.is_enabled() && component.capabilities().contains(Capabilities::DRAWABLE) {
                component.draw(owner, &self.transform, sink);
            }
        }
    }
}

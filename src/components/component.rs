//! The component trait every piece of object behaviour implements.
//!
//! A [`GameObject`](super::gameobject::GameObject) owns an ordered list of
//! boxed components. Each component declares its [`Capabilities`]; the object
//! only calls the hooks a component advertised:
//! - `UPDATABLE` components get [`Component::update`] once per frame.
//! - `COLLISION_RESPONDING` components get [`Component::on_contact`].
//! - `DRAWABLE` components get [`Component::draw`] during the render pass.
//! - `INPUT_HANDLING` marks controllers that read the input snapshot.
//!
//! A disabled component is skipped by every hook.

use std::any::Any;
use std::ops::BitOr;

use bevy_math::Vec3;

use super::gameobject::GameObject;
use super::transform::Transform;
use super::uisprite::UiSprite;
use crate::events::bus::ScopeId;
use crate::resources::arena::ObjectId;
use crate::resources::input::InputState;
use crate::resources::worldtime::WorldTime;
use crate::systems::render::RenderSink;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities(u8);

impl Capabilities {
    pub const NONE: Capabilities = Capabilities(0);
    pub const UPDATABLE: Capabilities = Capabilities(1);
    pub const DRAWABLE: Capabilities = Capabilities(1 << 1);
    pub const INPUT_HANDLING: Capabilities = Capabilities(1 << 2);
    pub const COLLISION_RESPONDING: Capabilities = Capabilities(1 << 3);

    pub fn contains(self, other: Capabilities) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for Capabilities {
    type Output = Capabilities;

    fn bitor(self, rhs: Capabilities) -> Capabilities {
        Capabilities(self.0 | rhs.0)
    }
}

/// Passed to [`Component::on_attach`] when the owner enters an active scene.
#[derive(Debug, Clone, Copy)]
pub struct AttachContext {
    pub owner: ObjectId,
    /// Bus scope of the scene; subscriptions made here die with the scene.
    pub scope: ScopeId,
}

/// Per-frame view of the owning object handed to [`Component::update`].
pub struct UpdateContext<'a> {
    pub owner: ObjectId,
    pub transform: &'a mut Transform,
    pub sprite: Option<&'a mut UiSprite>,
    pub input: &'a InputState,
    pub time: &'a WorldTime,
}

/// A single contact between the owner and `other`.
pub struct ContactContext<'a> {
    pub owner: ObjectId,
    pub transform: &'a mut Transform,
    pub other_id: ObjectId,
    pub other: &'a GameObject,
    /// Direction that pushes the owner out of `other`.
    pub normal: Vec3,
    pub depth: f32,
}

pub trait Component: Any {
    /// Short type name used in logs.
    fn kind(&self) -> &'static str;

    fn capabilities(&self) -> Capabilities;

    fn is_enabled(&self) -> bool;

    fn set_enabled(&mut self, enabled: bool);

    fn on_attach(&mut self, _ctx: &AttachContext) {}

    /// Called when the owner leaves the active scene.
    fn on_detach(&mut self) {}

    fn update(&mut self, _ctx: &mut UpdateContext<'_>) {}

    fn on_contact(&mut self, _ctx: &mut ContactContext<'_>) {}

    fn draw(&self, _owner: ObjectId, _transform: &Transform, _sink: &mut dyn RenderSink) {}

    /// Deep copy used when cloning the owning object.
    fn box_clone(&self) -> Box<dyn Component>;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl Clone for Box<dyn Component> {
    fn clone(&self) -> Self {
        self.box_clone()
    }
}

/// Implements the `kind`/`box_clone`/`as_any` plumbing for a `Clone` type.
macro_rules! component_boilerplate {
    ($kind:literal) => {
        fn kind(&self) -> &'static str {
            $kind
        }

        fn box_clone(&self) -> Box<dyn $crate::components::component::Component> {
            Box::new(self.clone())
        }

        fn as_any(&self) -> &dyn std::any::Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
            self
        }
    };
}

pub(crate) use component_boilerplate;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capabilities_combine() {
        let caps = Capabilities::UPDATABLE | Capabilities::DRAWABLE;
        assert!(caps.contains(Capabilities::UPDATABLE));
        assert!(caps.contains(Capabilities::DRAWABLE));
        assert!(!caps.contains(Capabilities::COLLISION_RESPONDING));
        assert!(caps.contains(Capabilities::NONE));
    }
}

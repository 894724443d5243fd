//! Render pass.
//!
//! Drawing itself belongs to the host renderer, reached through the
//! [`RenderSink`] trait. [`render_scene`] walks the active scene and emits
//! world geometry first, then UI sprites on top. [`DrawList`] is a sink that
//! just records what it was asked to draw.

use std::rc::Rc;

use bevy_math::Vec3;

use crate::components::renderer::{Color, Material, Mesh};
use crate::components::transform::Transform;
use crate::components::uisprite::UiSprite;
use crate::resources::arena::ObjectId;
use crate::systems::scene::Scene;

pub trait RenderSink {
    fn draw_mesh(
        &mut self,
        owner: ObjectId,
        mesh: &Rc<Mesh>,
        material: &Rc<Material>,
        transform: &Transform,
    );

    fn draw_sprite(&mut self, owner: ObjectId, sprite: &UiSprite);
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Mesh {
        owner: ObjectId,
        mesh: String,
        material: String,
        translation: Vec3,
    },
    Sprite {
        owner: ObjectId,
        texture: String,
        source_width: u32,
        color: Color,
    },
}

/// Sink that records draw calls in order.
#[derive(Debug, Default)]
pub struct DrawList {
    pub commands: Vec<DrawCommand>,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl RenderSink for DrawList {
    fn draw_mesh(
        &mut self,
        owner: ObjectId,
        mesh: &Rc<Mesh>,
        material: &Rc<Material>,
        transform: &Transform,
    ) {
        self.commands.push(DrawCommand::Mesh {
            owner,
            mesh: mesh.name.clone(),
            material: material.name.clone(),
            translation: transform.translation,
        });
    }

    fn draw_sprite(&mut self, owner: ObjectId, sprite: &UiSprite) {
        self.commands.push(DrawCommand::Sprite {
            owner,
            texture: sprite.texture.name.clone(),
            source_width: sprite.source_width,
            color: sprite.color,
        });
    }
}

/// Sink that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl RenderSink for NullSink {
    fn draw_mesh(&mut self, _: ObjectId, _: &Rc<Mesh>, _: &Rc<Material>, _: &Transform) {}

    fn draw_sprite(&mut self, _: ObjectId, _: &UiSprite) {}
}

/// Draw `scene` into `sink`: world objects, then UI. Returns the number of
/// objects visited.
pub fn render_scene(scene: &Scene, sink: &mut dyn RenderSink) -> usize {
    let mut drawn = 0;
    for (id, object) in scene.iter() {
        if object.is_enabled() && !object.is_ui() {
            object.draw(id, sink);
            drawn += 1;
        }
    }
    for (id, object) in scene.iter() {
        if !object.is_enabled() || !object.is_ui() {
            continue;
        }
        object.draw(id, sink);
        if let Some(sprite) = &object.sprite {
            sink.draw_sprite(id, sprite);
        }
        drawn += 1;
    }
    drawn
}

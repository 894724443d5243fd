//! Shared render resources and the mesh renderer component.
//!
//! Meshes, materials and textures are immutable once loaded and handed around
//! as `Rc`s. Cloning a [`MeshRenderer`] (or the object that owns it) copies the
//! handles, never the data, so every clone of an archetype draws the same
//! mesh instance.

use std::rc::Rc;

use serde::{Deserialize, Serialize};

use super::component::{Capabilities, Component, component_boilerplate};
use super::transform::Transform;
use crate::resources::arena::ObjectId;
use crate::systems::render::RenderSink;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const RED: Color = Color::rgb(255, 0, 0);
    pub const YELLOW: Color = Color::rgb(255, 255, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color { r, g, b, a: 255 }
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::WHITE
    }
}

#[derive(Debug, PartialEq)]
pub struct Mesh {
    pub name: String,
    pub vertex_count: u32,
}

#[derive(Debug, PartialEq)]
pub struct Material {
    pub name: String,
    pub diffuse: Color,
    pub alpha: f32,
}

#[derive(Debug, PartialEq)]
pub struct Texture {
    pub name: String,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone)]
pub struct MeshRenderer {
    pub mesh: Rc<Mesh>,
    pub material: Rc<Material>,
    enabled: bool,
}

impl MeshRenderer {
    pub fn new(mesh: Rc<Mesh>, material: Rc<Material>) -> Self {
        Self {
            mesh,
            material,
            enabled: true,
        }
    }
}

impl Component for MeshRenderer {
    component_boilerplate!("MeshRenderer");

    fn capabilities(&self) -> Capabilities {
        Capabilities::DRAWABLE
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    fn draw(&self, owner: ObjectId, transform: &Transform, sink: &mut dyn RenderSink) {
        sink.draw_mesh(owner, &self.mesh, &self.material, transform);
    }
}

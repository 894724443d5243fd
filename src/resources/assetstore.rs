//! Asset store resource.
//!
//! Meshes, materials and textures keyed by name. Asking twice for the same
//! name hands out the same `Rc`, so objects built from one level description
//! share their render data.

use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::components::renderer::{Color, Material, Mesh, Texture};

#[derive(Default)]
pub struct AssetStore {
    meshes: FxHashMap<String, Rc<Mesh>>,
    materials: FxHashMap<String, Rc<Material>>,
    textures: FxHashMap<String, Rc<Texture>>,
}

impl AssetStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the mesh called `name`, registering an empty one on first use.
    pub fn mesh(&mut self, name: &str) -> Rc<Mesh> {
        Rc::clone(self.meshes.entry(name.to_string()).or_insert_with(|| {
            Rc::new(Mesh {
                name: name.to_string(),
                vertex_count: 0,
            })
        }))
    }

    /// Get the material called `name`, registering a white opaque one on first use.
    pub fn material(&mut self, name: &str) -> Rc<Material> {
        Rc::clone(self.materials.entry(name.to_string()).or_insert_with(|| {
            Rc::new(Material {
                name: name.to_string(),
                diffuse: Color::WHITE,
                alpha: 1.0,
            })
        }))
    }

    /// Register a material, replacing any previous one of the same name.
    pub fn add_material(&mut self, material: Material) -> Rc<Material> {
        let material = Rc::new(material);
        self.materials
            .insert(material.name.clone(), Rc::clone(&material));
        material
    }

    /// Get the texture called `name`; the size is only used on first use.
    pub fn texture(&mut self, name: &str, width: u32, height: u32) -> Rc<Texture> {
        Rc::clone(self.textures.entry(name.to_string()).or_insert_with(|| {
            Rc::new(Texture {
                name: name.to_string(),
                width,
                height,
            })
        }))
    }

    /// Number of distinct assets of every kind.
    pub fn len(&self) -> usize {
        self.meshes.len() + self.materials.len() + self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

//! Generational object storage.
//!
//! Every [`Scene`](crate::systems::scene::Scene) keeps its game objects in an
//! [`ObjectArena`] and hands out [`ObjectId`] handles instead of references.
//! A handle stays valid until its object is removed; after that the slot's
//! generation is bumped so stale handles never match a reused slot. Handles
//! also carry the [`SceneId`] of the scene that issued them, so a handle from
//! one level can never address an object of another.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of the scene that owns an arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct SceneId(pub u32);

/// Stable handle to an object stored in an [`ObjectArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectId {
    scene: SceneId,
    index: u32,
    generation: u32,
}

impl ObjectId {
    pub(crate) fn new(scene: SceneId, index: u32, generation: u32) -> Self {
        Self {
            scene,
            index,
            generation,
        }
    }

    /// Scene whose arena issued this handle.
    pub fn scene(&self) -> SceneId {
        self.scene
    }

    /// Slot index inside the arena.
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Generation of the slot when the handle was issued.
    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}v{}", self.scene.0, self.index, self.generation)
    }
}

struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

/// Slot storage with generation-checked handles.
///
/// Freed slots are reused LIFO; the generation is incremented on removal so
/// handles to the previous occupant stop resolving.
pub struct ObjectArena<T> {
    scene: SceneId,
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    len: usize,
}

impl<T> ObjectArena<T> {
    pub fn new(scene: SceneId) -> Self {
        Self {
            scene,
            slots: Vec::new(),
            free: Vec::new(),
            len: 0,
        }
    }

    pub fn scene(&self) -> SceneId {
        self.scene
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Store `value` and return its handle.
    pub fn insert(&mut self, value: T) -> ObjectId {
        self.len += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.value = Some(value);
            ObjectId::new(self.scene, index, slot.generation)
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(Slot {
                generation: 0,
                value: Some(value),
            });
            ObjectId::new(self.scene, index, 0)
        }
    }

    /// Remove and return the object behind `id`.
    ///
    /// Returns `None` for stale or foreign handles, which makes repeated
    /// removal of the same handle a no-op.
    pub fn remove(&mut self, id: ObjectId) -> Option<T> {
        if !self.contains(id) {
            return None;
        }
        let slot = &mut self.slots[id.index as usize];
        let value = slot.value.take();
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        self.len -= 1;
        value
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        id.scene == self.scene
            && self
                .slots
                .get(id.index as usize)
                .is_some_and(|slot| slot.generation == id.generation && slot.value.is_some())
    }

    pub fn get(&self, id: ObjectId) -> Option<&T> {
        if !self.contains(id) {
            return None;
        }
        self.slots[id.index as usize].value.as_ref()
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut T> {
        if !self.contains(id) {
            return None;
        }
        self.slots[id.index as usize].value.as_mut()
    }

    /// Borrow `a` mutably and `b` immutably at the same time.
    ///
    /// Returns `None` if either handle is stale or both name the same slot.
    pub fn pair_mut(&mut self, a: ObjectId, b: ObjectId) -> Option<(&mut T, &T)> {
        if a.index == b.index || !self.contains(a) || !self.contains(b) {
            return None;
        }
        let (ia, ib) = (a.index as usize, b.index as usize);
        if ia < ib {
            let (low, high) = self.slots.split_at_mut(ib);
            Some((low[ia].value.as_mut()?, high[0].value.as_ref()?))
        } else {
            let (low, high) = self.slots.split_at_mut(ia);
            Some((high[0].value.as_mut()?, low[ib].value.as_ref()?))
        }
    }

    /// Iterate live objects in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (ObjectId, &T)> + '_ {
        let scene = self.scene;
        self.slots.iter().enumerate().filter_map(move |(index, slot)| {
            slot.value
                .as_ref()
                .map(|value| (ObjectId::new(scene, index as u32, slot.generation), value))
        })
    }
}

//! Scenes and the scene manager.
//!
//! A [`Scene`] owns the live objects of one level. While a scene is active it
//! holds a bus [`ScopeId`]; every subscription its components make on attach
//! lives in that scope and is closed when the scene is deactivated, so
//! reloading a level never stacks duplicate handlers.
//!
//! Structural changes requested through events (object removal, visibility)
//! are queued as [`SceneCommand`]s and applied by
//! [`SceneManager::apply_pending`] at the end of the frame, after every
//! update loop has finished iterating.

use std::cell::RefCell;
use std::rc::Rc;

use log::{debug, info, warn};
use rustc_hash::FxHashMap;

use crate::components::component::AttachContext;
use crate::components::gameobject::GameObject;
use crate::error::EngineError;
use crate::events::bus::{EventBus, HandlerResult, ScopeId, SubscriptionToken};
use crate::events::{Event, EventCategory, GameObjectEvent, UiEvent};
use crate::resources::arena::{ObjectArena, ObjectId, SceneId};
use crate::resources::input::InputState;
use crate::resources::worldtime::WorldTime;

pub struct Scene {
    id: SceneId,
    name: String,
    objects: ObjectArena<GameObject>,
    /// Insertion order of live objects.
    order: Vec<ObjectId>,
    scope: Option<ScopeId>,
}

impl Scene {
    /// Scenes are created through [`SceneManager::create_scene`], which hands
    /// out the ids.
    fn new(id: SceneId, name: String) -> Self {
        Self {
            id,
            name,
            objects: ObjectArena::new(id),
            order: Vec::new(),
            scope: None,
        }
    }

    pub fn id(&self) -> SceneId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn is_active(&self) -> bool {
        self.scope.is_some()
    }

    /// Add an object; it is attached immediately if the scene is active.
    pub fn add(&mut self, object: GameObject) -> ObjectId {
        let id = self.objects.insert(object);
        self.order.push(id);
        if let Some(scope) = self.scope
            && let Some(object) = self.objects.get_mut(id)
        {
            object.attach(&AttachContext { owner: id, scope });
        }
        id
    }

    /// Remove an object right away.
    ///
    /// Only call this outside update loops; gameplay code should publish
    /// `GameObject::Remove` instead.
    pub fn remove(&mut self, id: ObjectId) -> Option<GameObject> {
        let mut object = self.objects.remove(id)?;
        self.order.retain(|o| *o != id);
        if self.scope.is_some() {
            object.detach();
        }
        Some(object)
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.objects.contains(id)
    }

    pub fn get(&self, id: ObjectId) -> Option<&GameObject> {
        self.objects.get(id)
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut GameObject> {
        self.objects.get_mut(id)
    }

    pub(crate) fn pair_mut(
        &mut self,
        a: ObjectId,
        b: ObjectId,
    ) -> Option<(&mut GameObject, &GameObject)> {
        self.objects.pair_mut(a, b)
    }

    /// First object called `name`. Names are not unique.
    pub fn find_by_name(&self, name: &str) -> Option<ObjectId> {
        self.iter()
            .find(|(_, object)| object.name() == name)
            .map(|(id, _)| id)
    }

    pub fn find_all_by_name(&self, name: &str) -> Vec<ObjectId> {
        self.iter()
            .filter(|(_, object)| object.name() == name)
            .map(|(id, _)| id)
            .collect()
    }

    /// Live object handles in insertion order.
    pub fn ids(&self) -> &[ObjectId] {
        &self.order
    }

    /// Live objects in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (ObjectId, &GameObject)> + '_ {
        self.order
            .iter()
            .filter_map(|id| self.objects.get(*id).map(|object| (*id, object)))
    }

    /// Update either the world objects or the UI objects.
    pub fn update_objects(&mut self, ui: bool, input: &InputState, time: &WorldTime) {
        for id in &self.order {
            if let Some(object) = self.objects.get_mut(*id)
                && object.is_ui() == ui
            {
                object.update(*id, input, time);
            }
        }
    }

    pub(crate) fn activate(&mut self, bus: &EventBus) -> ScopeId {
        if let Some(scope) = self.scope {
            return scope;
        }
        let scope = bus.create_scope();
        self.scope = Some(scope);
        for id in &self.order {
            if let Some(object) = self.objects.get_mut(*id) {
                object.attach(&AttachContext { owner: *id, scope });
            }
        }
        scope
    }

    pub(crate) fn deactivate(&mut self, bus: &EventBus) {
        let Some(scope) = self.scope.take() else {
            return;
        };
        for id in &self.order {
            if let Some(object) = self.objects.get_mut(*id) {
                object.detach();
            }
        }
        bus.close_scope(scope);
    }
}

/// Structural change applied at the end of the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneCommand {
    Remove(ObjectId),
    SetEnabled(ObjectId, bool),
}

/// Shared queue of pending [`SceneCommand`]s.
#[derive(Debug, Clone, Default)]
pub struct CommandQueue(Rc<RefCell<Vec<SceneCommand>>>);

impl CommandQueue {
    pub fn push(&self, command: SceneCommand) {
        self.0.borrow_mut().push(command);
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    pub fn is_pending_removal(&self, id: ObjectId) -> bool {
        self.0
            .borrow()
            .iter()
            .any(|c| matches!(c, SceneCommand::Remove(target) if *target == id))
    }

    fn take(&self) -> Vec<SceneCommand> {
        std::mem::take(&mut *self.0.borrow_mut())
    }
}

/// Owns every loaded scene and switches the active one.
pub struct SceneManager {
    bus: Rc<EventBus>,
    scenes: FxHashMap<String, Scene>,
    active: Option<String>,
    queue: CommandQueue,
    tokens: [SubscriptionToken; 2],
    next_scene_id: u32,
}

impl SceneManager {
    pub fn new(bus: Rc<EventBus>) -> Self {
        let queue = CommandQueue::default();

        let removals = queue.clone();
        let remove_token = bus.subscribe(
            EventCategory::GameObject,
            move |event: &Event| -> HandlerResult {
                if let Event::GameObject(GameObjectEvent::Remove { target }) = event {
                    removals.push(SceneCommand::Remove(*target));
                }
                Ok(())
            },
        );

        let toggles = queue.clone();
        let visible_token = bus.subscribe(EventCategory::Ui, move |event: &Event| -> HandlerResult {
            if let Event::Ui(UiEvent::SetVisible { target, visible }) = event {
                toggles.push(SceneCommand::SetEnabled(*target, *visible));
            }
            Ok(())
        });

        Self {
            bus,
            scenes: FxHashMap::default(),
            active: None,
            queue,
            tokens: [remove_token, visible_token],
            next_scene_id: 1,
        }
    }

    pub fn bus(&self) -> &Rc<EventBus> {
        &self.bus
    }

    /// Start an empty scene with an id unique to this manager.
    ///
    /// The scene is not registered until it is passed to
    /// [`SceneManager::add_scene`].
    pub fn create_scene(&mut self, name: impl Into<String>) -> Scene {
        let id = SceneId(self.next_scene_id);
        self.next_scene_id += 1;
        Scene::new(id, name.into())
    }

    /// Register a scene, replacing any scene of the same name.
    ///
    /// Replacing the active scene deactivates the old one and activates the
    /// new one in its place.
    pub fn add_scene(&mut self, scene: Scene) -> SceneId {
        let id = scene.id();
        let name = scene.name().to_string();
        let replacing_active = self.active.as_deref() == Some(name.as_str());
        if let Some(mut old) = self.scenes.insert(name.clone(), scene)
            && old.is_active()
        {
            old.deactivate(&self.bus);
        }
        if replacing_active && let Some(scene) = self.scenes.get_mut(&name) {
            scene.activate(&self.bus);
        }
        id
    }

    pub fn scene_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.scenes.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn scene(&self, name: &str) -> Option<&Scene> {
        self.scenes.get(name)
    }

    pub fn scene_mut(&mut self, name: &str) -> Option<&mut Scene> {
        self.scenes.get_mut(name)
    }

    pub fn active_name(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn active(&self) -> Option<&Scene> {
        self.active.as_deref().and_then(|name| self.scenes.get(name))
    }

    pub fn active_mut(&mut self) -> Option<&mut Scene> {
        match self.active.as_deref() {
            Some(name) => self.scenes.get_mut(name),
            None => None,
        }
    }

    /// Make `name` the active scene.
    ///
    /// The previous scene is deactivated first, closing its subscription
    /// scope. Loading the active scene again reattaches it from scratch.
    /// Commands queued for the previous scene are dropped.
    pub fn load_scene(&mut self, name: &str) -> Result<SceneId, EngineError> {
        if !self.scenes.contains_key(name) {
            return Err(EngineError::UnknownScene(name.to_string()));
        }
        self.unload_active();

        let dropped = self.queue.take().len();
        if dropped > 0 {
            debug!("Dropped {} pending scene command(s) on load", dropped);
        }

        let scene = self
            .scenes
            .get_mut(name)
            .ok_or_else(|| EngineError::UnknownScene(name.to_string()))?;
        scene.activate(&self.bus);
        info!("Loaded scene '{}' ({} objects)", name, scene.len());
        self.active = Some(name.to_string());
        Ok(scene.id())
    }

    /// Deactivate the active scene, if any.
    pub fn unload_active(&mut self) {
        let Some(name) = self.active.take() else {
            return;
        };
        if let Some(scene) = self.scenes.get_mut(&name) {
            scene.deactivate(&self.bus);
            info!("Unloaded scene '{}'", name);
        }
    }

    pub fn queue(&self) -> &CommandQueue {
        &self.queue
    }

    pub fn request(&self, command: SceneCommand) {
        self.queue.push(command);
    }

    pub fn pending_commands(&self) -> usize {
        self.queue.len()
    }

    /// Apply every queued command. Returns how many changed something.
    ///
    /// Commands naming objects that no longer exist (already removed, or
    /// never part of a loaded scene) are ignored.
    pub fn apply_pending(&mut self) -> usize {
        let mut applied = 0;
        for command in self.queue.take() {
            let target = match command {
                SceneCommand::Remove(id) | SceneCommand::SetEnabled(id, _) => id,
            };
            let Some(scene) = self.scenes.values_mut().find(|s| s.id() == target.scene()) else {
                debug!("Ignoring {:?}: scene of {} is not loaded", command, target);
                continue;
            };
            match command {
                SceneCommand::Remove(id) => match scene.remove(id) {
                    Some(object) => {
                        debug!("Removed '{}' ({}) from '{}'", object.name(), id, scene.name());
                        applied += 1;
                    }
                    None => debug!("Ignoring removal of {}: already gone", id),
                },
                SceneCommand::SetEnabled(id, enabled) => match scene.get_mut(id) {
                    Some(object) => {
                        object.set_enabled(enabled);
                        applied += 1;
                    }
                    None => debug!("Ignoring visibility change of {}: not found", id),
                },
            }
        }
        applied
    }
}

impl Drop for SceneManager {
    fn drop(&mut self) {
        if let Some(name) = self.active.take()
            && let Some(scene) = self.scenes.get_mut(&name)
        {
            scene.deactivate(&self.bus);
        }
        for token in self.tokens {
            if !self.bus.unsubscribe(token) {
                warn!("Scene manager subscription {:?} was already gone", token);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::gameobject::GameObjectType;

    fn manager() -> SceneManager {
        SceneManager::new(Rc::new(EventBus::new()))
    }

    #[test]
    fn scene_ids_are_unique_per_manager() {
        let mut first = manager();
        let a = first.create_scene("a");
        let b = first.create_scene("a");
        assert_ne!(a.id(), b.id());

        // separate managers (separate games) do not share a counter
        let mut second = manager();
        assert_eq!(second.create_scene("a").id(), a.id());
    }

    #[test]
    fn iteration_follows_insertion_order() {
        let mut scene = manager().create_scene("order");
        let a = scene.add(GameObject::new("a", GameObjectType::Architecture));
        let b = scene.add(GameObject::new("b", GameObjectType::Architecture));
        let c = scene.add(GameObject::new("c", GameObjectType::Architecture));
        scene.remove(a);
        let d = scene.add(GameObject::new("d", GameObjectType::Architecture));

        // d reuses a's slot but still comes last
        let names: Vec<&str> = scene.iter().map(|(_, o)| o.name()).collect();
        assert_eq!(names, vec!["b", "c", "d"]);
        assert_eq!(scene.ids(), &[b, c, d]);
    }

    #[test]
    fn find_by_name_returns_first_match() {
        let mut scene = manager().create_scene("names");
        let first = scene.add(GameObject::new("cube", GameObjectType::Consumable));
        let second = scene.add(GameObject::new("cube", GameObjectType::Consumable));
        assert_eq!(scene.find_by_name("cube"), Some(first));
        assert_eq!(scene.find_all_by_name("cube"), vec![first, second]);
        assert_eq!(scene.find_by_name("missing"), None);
    }

    #[test]
    fn unknown_scene_is_an_error() {
        let mut scenes = manager();
        assert!(matches!(
            scenes.load_scene("nowhere"),
            Err(EngineError::UnknownScene(name)) if name == "nowhere"
        ));
    }

    #[test]
    fn dropping_the_manager_releases_its_handlers() {
        let bus = Rc::new(EventBus::new());
        let manager = SceneManager::new(Rc::clone(&bus));
        assert_eq!(bus.total_subscribers(), 2);
        drop(manager);
        assert_eq!(bus.total_subscribers(), 0);
    }
}

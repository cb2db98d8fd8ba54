//! Entities known to the world, as seen by the chatbox.
//!
//! The chatbox only ever reads from the world. [`EntityRegistry`] is an
//! in-process implementation for embedding hosts that do not bring their own.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Well-known identifier of the sound played when someone speaks.
pub const CHAT_AUDIO_NODE: &str = "chat_audio_node";

/// A participant as far as chat rendering is concerned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    pub nick: String,
    pub authenticated: bool,
}

impl Entity {
    pub fn new(nick: impl Into<String>) -> Self {
        Self {
            nick: nick.into(),
            authenticated: false,
        }
    }

    #[must_use]
    pub fn authenticated(mut self) -> Self {
        self.authenticated = true;
        self
    }
}

/// A playable sound clip.
pub trait Sound: Send + Sync + std::fmt::Debug {
    fn play(&self);
}

/// Read-only lookup into the world.
pub trait World: Send + Sync {
    /// Find an entity by id.
    fn find(&self, id: &str) -> Option<Entity>;

    /// Find a sound node by id.
    fn find_sound(&self, _id: &str) -> Option<Arc<dyn Sound>> {
        None
    }
}

/// Thread-safe registry of entities and sounds.
#[derive(Debug, Clone, Default)]
pub struct EntityRegistry {
    inner: Arc<EntityRegistryInner>,
}

#[derive(Debug, Default)]
struct EntityRegistryInner {
    entities: RwLock<HashMap<String, Entity>>,
    sounds: RwLock<HashMap<String, Arc<dyn Sound>>>,
}

impl EntityRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or replace an entity.
    pub fn insert(&self, id: impl Into<String>, entity: Entity) {
        let mut guard = self.inner.entities.write().unwrap();
        guard.insert(id.into(), entity);
    }

    /// Remove an entity.
    pub fn remove(&self, id: &str) -> Option<Entity> {
        let mut guard = self.inner.entities.write().unwrap();
        guard.remove(id)
    }

    /// Register a sound node under `id`.
    pub fn insert_sound(&self, id: impl Into<String>, sound: Arc<dyn Sound>) {
        let mut guard = self.inner.sounds.write().unwrap();
        guard.insert(id.into(), sound);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.entities.read().unwrap().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl World for EntityRegistry {
    fn find(&self, id: &str) -> Option<Entity> {
        self.inner.entities.read().unwrap().get(id).cloned()
    }

    fn find_sound(&self, id: &str) -> Option<Arc<dyn Sound>> {
        self.inner.sounds.read().unwrap().get(id).cloned()
    }
}

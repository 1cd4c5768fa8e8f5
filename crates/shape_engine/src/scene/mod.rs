//! Scene management
//!
//! A [`Scene`] owns every [`GameObject`], hands out collider ids and holds
//! the per-frame input queue. Objects are stored in a slot map so keys stay
//! valid while other objects come and go.
//!
//! Collision listeners never remove objects directly. They push keys onto a
//! [`DespawnQueue`] and the scene applies the removals after the collision
//! pass has finished.

mod frame_runner;
mod game_object;

pub use frame_runner::{FrameRunner, FrameStats, Game};
pub use game_object::GameObject;

use std::cell::RefCell;
use std::rc::Rc;

use log::{debug, trace};
use slotmap::SlotMap;

use crate::error::EngineResult;
use crate::events::InputQueue;
use crate::physics::{AreaCollider, ColliderIdAllocator, ColliderShape, CollisionEngine, CollisionReport};
use crate::render::{GraphicsBackend, ProgramHandle, ShaderBindings};

slotmap::new_key_type! {
    /// Stable handle to a [`GameObject`] in a [`Scene`]
    pub struct GameObjectKey;
}

/// Shared list of objects to remove once the collision pass is over
///
/// Clones share the same list, so a listener closure can keep its own
/// handle.
#[derive(Debug, Clone, Default)]
pub struct DespawnQueue {
    pending: Rc<RefCell<Vec<GameObjectKey>>>,
}

impl DespawnQueue {
    /// Request removal of `key`
    pub fn push(&self, key: GameObjectKey) {
        self.pending.borrow_mut().push(key);
    }

    /// Number of queued requests
    pub fn len(&self) -> usize {
        self.pending.borrow().len()
    }

    /// Whether nothing is queued
    pub fn is_empty(&self) -> bool {
        self.pending.borrow().is_empty()
    }

    fn take(&self) -> Vec<GameObjectKey> {
        std::mem::take(&mut *self.pending.borrow_mut())
    }
}

/// Container for everything in play
#[derive(Debug, Default)]
pub struct Scene {
    objects: SlotMap<GameObjectKey, GameObject>,
    collider_ids: ColliderIdAllocator,
    despawns: DespawnQueue,
    input: InputQueue,
}

impl Scene {
    /// Empty scene
    pub fn new() -> Self {
        Self::default()
    }

    /// New collider with an id unique within this scene
    pub fn create_collider(&mut self, shape: ColliderShape) -> AreaCollider {
        AreaCollider::new(shape, &mut self.collider_ids)
    }

    /// Add an object
    pub fn spawn(&mut self, object: GameObject) -> GameObjectKey {
        let name = object.name().to_string();
        let key = self.objects.insert(object);
        debug!("Spawned '{}' as {:?}", name, key);
        key
    }

    /// Remove an object immediately
    ///
    /// Other colliders forget any contact with the removed collider.
    pub fn despawn(&mut self, key: GameObjectKey) -> Option<GameObject> {
        let removed = self.objects.remove(key)?;
        if let Some(id) = removed.collider().map(AreaCollider::id) {
            for collider in self.objects.values_mut().filter_map(GameObject::collider_mut) {
                collider.remove_collision(id);
            }
        }
        debug!("Despawned '{}'", removed.name());
        Some(removed)
    }

    /// Handle for deferring removals, e.g. from a collision listener
    pub fn despawn_queue(&self) -> DespawnQueue {
        self.despawns.clone()
    }

    /// Remove everything queued through [`despawn_queue`](Self::despawn_queue)
    ///
    /// Keys already gone are ignored. Returns how many objects were removed.
    pub fn apply_despawns(&mut self) -> usize {
        self.despawns
            .take()
            .into_iter()
            .filter(|&key| self.despawn(key).is_some())
            .count()
    }

    /// Object by key
    pub fn get(&self, key: GameObjectKey) -> Option<&GameObject> {
        self.objects.get(key)
    }

    /// Object by key, mutably
    pub fn get_mut(&mut self, key: GameObjectKey) -> Option<&mut GameObject> {
        self.objects.get_mut(key)
    }

    /// Whether `key` is still live
    pub fn contains(&self, key: GameObjectKey) -> bool {
        self.objects.contains_key(key)
    }

    /// Live objects
    pub fn iter(&self) -> impl Iterator<Item = (GameObjectKey, &GameObject)> {
        self.objects.iter()
    }

    /// Number of live objects
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether the scene is empty
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Pending keyboard input
    pub fn input(&self) -> &InputQueue {
        &self.input
    }

    /// Pending keyboard input, mutably
    pub fn input_mut(&mut self) -> &mut InputQueue {
        &mut self.input
    }

    /// Run one collision pass over every object with a collider
    pub fn check_collisions(&mut self) -> EngineResult<CollisionReport> {
        let mut colliders: Vec<&mut AreaCollider> = self
            .objects
            .values_mut()
            .filter_map(GameObject::collider_mut)
            .collect();
        CollisionEngine::check_collisions(&mut colliders)
    }

    /// Move every object by its velocity over `delta_time`
    pub fn apply_movement(&mut self, delta_time: f32) -> EngineResult<()> {
        for object in self.objects.values_mut() {
            let velocity = object.velocity();
            if velocity != crate::foundation::math::Vec3::zeros() {
                object.translate(&(velocity * delta_time))?;
            }
        }
        Ok(())
    }

    /// Draw every shape; returns the number of draw calls issued
    pub fn render(
        &mut self,
        backend: &mut dyn GraphicsBackend,
        program: ProgramHandle,
        names: &ShaderBindings,
    ) -> EngineResult<usize> {
        let mut drawn = 0;
        for shape in self.objects.values_mut().filter_map(GameObject::shape_mut) {
            shape.render(backend, program, names)?;
            drawn += 1;
        }
        trace!("Rendered {} shapes", drawn);
        Ok(drawn)
    }
}

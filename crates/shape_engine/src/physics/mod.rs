//! Physics module for 2D overlap detection
//!
//! Provides area colliders and the per-frame collision pass. There is no
//! collision response; games react to the contact notifications.

pub mod collider;
pub mod collision_system;

pub use collider::{AreaCollider, ColliderId, ColliderIdAllocator, ColliderShape, CollisionCallback};
pub use collision_system::{CollisionEngine, CollisionPair, CollisionReport};

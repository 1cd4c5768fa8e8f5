//! Area colliders used for 2D overlap testing
//!
//! A collider is a small polygon (square or triangle) with its own geometry,
//! independent of any render shape. The game keeps it in lockstep with the
//! shape it belongs to.

use std::collections::HashSet;
use std::fmt;

use log::debug;

use crate::error::{EngineError, EngineResult};
use crate::foundation::math::Vec3;
use crate::geometry::primitives::{SQUARE_VERTICES, TRIANGLE_VERTICES};
use crate::geometry::{Transformable, TransformableEntity, VertexArity, VertexBuffer};

/// Canonical collider polygons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ColliderShape {
    /// Unit square
    Square = 1,
    /// Triangle inscribed in the unit square
    Triangle = 2,
}

impl ColliderShape {
    /// Local polygon for this shape
    pub fn polygon(self) -> VertexBuffer {
        let data: &[f32] = match self {
            Self::Square => &SQUARE_VERTICES,
            Self::Triangle => &TRIANGLE_VERTICES,
        };
        VertexBuffer::from_positions(data.chunks_exact(3).map(|v| Vec3::new(v[0], v[1], v[2])))
    }
}

impl TryFrom<u8> for ColliderShape {
    type Error = EngineError;

    fn try_from(value: u8) -> EngineResult<Self> {
        match value {
            1 => Ok(Self::Square),
            2 => Ok(Self::Triangle),
            other => Err(EngineError::InvalidArgument(format!(
                "Collider shape must be one of the provided shapes (1 = square, 2 = triangle), got {other}"
            ))),
        }
    }
}

/// Unique collider identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ColliderId(u64);

impl ColliderId {
    /// Raw id value
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ColliderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Issues collider ids
///
/// Ids start at 1, increase monotonically and are never reused, even after
/// the collider holding one is dropped.
#[derive(Debug)]
pub struct ColliderIdAllocator {
    next_id: u64,
}

impl ColliderIdAllocator {
    /// Create an allocator whose first id is 1
    pub fn new() -> Self {
        Self { next_id: 1 }
    }

    #[cfg(test)]
    fn starting_at(next_id: u64) -> Self {
        Self { next_id }
    }

    /// Issue the next id
    pub fn allocate(&mut self) -> ColliderId {
        let id = ColliderId(self.next_id);
        self.next_id += 1;
        id
    }
}

impl Default for ColliderIdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

/// Zero-argument listener invoked when a new contact begins
pub type CollisionCallback = Box<dyn FnMut()>;

/// Polygon collider with edge-triggered contact notification
pub struct AreaCollider {
    entity: TransformableEntity,
    shape: ColliderShape,
    id: ColliderId,
    callbacks: Vec<CollisionCallback>,
    active_collisions: HashSet<ColliderId>,
}

impl AreaCollider {
    /// Create a collider of `shape`, taking its id from `ids`
    pub fn new(shape: ColliderShape, ids: &mut ColliderIdAllocator) -> Self {
        let id = ids.allocate();
        debug!("Created {:?} collider {}", shape, id);
        Self {
            entity: TransformableEntity::from_buffer(shape.polygon()),
            shape,
            id,
            callbacks: Vec::new(),
            active_collisions: HashSet::new(),
        }
    }

    /// Create a collider from a raw shape value (1 = square, 2 = triangle)
    pub fn from_shape_value(value: u8, ids: &mut ColliderIdAllocator) -> EngineResult<Self> {
        Ok(Self::new(ColliderShape::try_from(value)?, ids))
    }

    /// Replace every registered listener with `callback`
    pub fn set_callback(&mut self, callback: impl FnMut() + 'static) {
        self.callbacks.clear();
        self.callbacks.push(Box::new(callback));
    }

    /// Register an additional listener
    pub fn add_callback(&mut self, callback: impl FnMut() + 'static) {
        self.callbacks.push(Box::new(callback));
    }

    /// Whether at least one listener is registered
    pub fn has_callback(&self) -> bool {
        !self.callbacks.is_empty()
    }

    /// Record contact with `other`, notifying listeners on a new contact
    ///
    /// Returns `Ok(true)` when the contact is new and listeners ran, and
    /// `Ok(false)` when `other` was already recorded. Fails with an
    /// illegal-state error when no listener is registered.
    pub fn collision(&mut self, other: ColliderId) -> EngineResult<bool> {
        if self.callbacks.is_empty() {
            return Err(EngineError::IllegalState(format!(
                "Collider {} needs a callback set with set_callback before collisions are reported",
                self.id
            )));
        }

        if !self.active_collisions.insert(other) {
            return Ok(false);
        }

        debug!("Collider {} began contact with {}", self.id, other);
        for callback in &mut self.callbacks {
            callback();
        }
        Ok(true)
    }

    /// Forget contact with `other`
    ///
    /// Returns whether a contact was recorded. Absent ids are ignored.
    pub fn remove_collision(&mut self, other: ColliderId) -> bool {
        let removed = self.active_collisions.remove(&other);
        if removed {
            debug!("Collider {} ended contact with {}", self.id, other);
        }
        removed
    }

    /// Approximate point containment
    ///
    /// Walks the global polygon and, per vertex, compares the x/y direction
    /// from the vertex to the origin with the direction from the vertex to
    /// `point` (non-negative counts as positive). An x mismatch counts once;
    /// otherwise a y mismatch counts once. Two mismatches mean outside. `z`
    /// is ignored.
    ///
    /// This is a heuristic, not an exact point-in-polygon test. Rotated or
    /// stretched polygons can be misclassified.
    pub fn within_collider(&self, point: &Vec3) -> bool {
        let origin = self.entity.origin();
        let mut mismatches = 0;

        for vertex in self.entity.global_vertices().positions() {
            let origin_diff = origin - vertex;
            let point_diff = point - vertex;

            if same_side(origin_diff.x, point_diff.x) {
                if !same_side(origin_diff.y, point_diff.y) {
                    mismatches += 1;
                }
            } else {
                mismatches += 1;
            }

            if mismatches >= 2 {
                return false;
            }
        }

        true
    }

    /// Collider id
    pub fn id(&self) -> ColliderId {
        self.id
    }

    /// Canonical shape this collider was built from
    pub fn shape(&self) -> ColliderShape {
        self.shape
    }

    /// Current global polygon
    pub fn vertices(&self) -> VertexBuffer {
        self.entity.global_vertices()
    }

    /// Items per vertex (always 3)
    pub fn vertex_arity(&self) -> VertexArity {
        self.entity.arity()
    }

    /// Ids of the colliders currently in contact
    pub fn active_collisions(&self) -> &HashSet<ColliderId> {
        &self.active_collisions
    }

    /// Whether contact with `other` is recorded
    pub fn is_colliding_with(&self, other: ColliderId) -> bool {
        self.active_collisions.contains(&other)
    }

    /// Whether any contact is recorded
    pub fn is_colliding(&self) -> bool {
        !self.active_collisions.is_empty()
    }
}

fn same_side(a: f32, b: f32) -> bool {
    (a >= 0.0) == (b >= 0.0)
}

impl Transformable for AreaCollider {
    fn entity(&self) -> &TransformableEntity {
        &self.entity
    }

    fn entity_mut(&mut self) -> &mut TransformableEntity {
        &mut self.entity
    }
}

impl fmt::Debug for AreaCollider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AreaCollider")
            .field("id", &self.id)
            .field("shape", &self.shape)
            .field("origin", &self.entity.origin())
            .field("callbacks", &self.callbacks.len())
            .field("active_collisions", &self.active_collisions)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::cell::Cell;
    use std::rc::Rc;

    fn counting_collider(ids: &mut ColliderIdAllocator) -> (AreaCollider, Rc<Cell<u32>>) {
        let mut collider = AreaCollider::new(ColliderShape::Square, ids);
        let count = Rc::new(Cell::new(0));
        let seen = Rc::clone(&count);
        collider.set_callback(move || seen.set(seen.get() + 1));
        (collider, count)
    }

    #[test]
    fn test_square_origin() {
        let mut ids = ColliderIdAllocator::new();
        let collider = AreaCollider::new(ColliderShape::Square, &mut ids);
        assert_relative_eq!(collider.origin(), Vec3::new(0.5, 0.5, 0.0), epsilon = 1e-6);
        assert_eq!(collider.vertex_arity(), VertexArity::Three);
        assert_eq!(collider.vertices().vertex_count(), 4);
    }

    #[test]
    fn test_triangle_shape() {
        let mut ids = ColliderIdAllocator::new();
        let collider = AreaCollider::new(ColliderShape::Triangle, &mut ids);
        assert_eq!(collider.vertices().vertex_count(), 3);
        assert_relative_eq!(collider.origin(), Vec3::new(0.5, 1.0 / 3.0, 0.0), epsilon = 1e-6);
    }

    #[test]
    fn test_invalid_shape_values() {
        let mut ids = ColliderIdAllocator::new();
        assert!(matches!(
            AreaCollider::from_shape_value(0, &mut ids),
            Err(EngineError::InvalidArgument(_))
        ));
        assert!(matches!(
            AreaCollider::from_shape_value(3, &mut ids),
            Err(EngineError::InvalidArgument(_))
        ));
        assert!(AreaCollider::from_shape_value(2, &mut ids).is_ok());
    }

    #[test]
    fn test_ids_strictly_increase() {
        let mut ids = ColliderIdAllocator::new();
        let a = AreaCollider::new(ColliderShape::Square, &mut ids);
        let b = AreaCollider::new(ColliderShape::Triangle, &mut ids);
        let c = AreaCollider::new(ColliderShape::Square, &mut ids);
        assert!(a.id() < b.id());
        assert!(b.id() < c.id());
        assert_eq!(a.id().value(), 1);
    }

    #[test]
    fn test_ids_not_reused_after_drop() {
        let mut ids = ColliderIdAllocator::new();
        let first = AreaCollider::new(ColliderShape::Square, &mut ids).id();
        let second = AreaCollider::new(ColliderShape::Square, &mut ids).id();
        assert_ne!(first, second);
    }

    #[test]
    fn test_ids_continue_past_u32_range() {
        let mut ids = ColliderIdAllocator::starting_at(u64::from(u32::MAX));
        let last_small = AreaCollider::new(ColliderShape::Square, &mut ids).id();
        let next = AreaCollider::new(ColliderShape::Square, &mut ids).id();
        assert_eq!(last_small.value(), u64::from(u32::MAX));
        assert_eq!(next.value(), u64::from(u32::MAX) + 1);
        assert!(last_small < next);
    }

    #[test]
    fn test_collision_requires_callback() {
        let mut ids = ColliderIdAllocator::new();
        let mut collider = AreaCollider::new(ColliderShape::Square, &mut ids);
        let other = ids.allocate();
        assert!(matches!(collider.collision(other), Err(EngineError::IllegalState(_))));
        assert!(!collider.is_colliding());
    }

    #[test]
    fn test_collision_is_edge_triggered() {
        let mut ids = ColliderIdAllocator::new();
        let (mut collider, count) = counting_collider(&mut ids);
        let other = ColliderId(5);

        assert!(collider.collision(other).unwrap());
        assert!(!collider.collision(other).unwrap());
        assert_eq!(count.get(), 1);

        assert!(collider.remove_collision(other));
        assert!(collider.collision(other).unwrap());
        assert_eq!(count.get(), 2);
    }

    #[test]
    fn test_remove_absent_collision_is_noop() {
        let mut ids = ColliderIdAllocator::new();
        let (mut collider, count) = counting_collider(&mut ids);
        collider.collision(ColliderId(7)).unwrap();

        assert!(!collider.remove_collision(ColliderId(5)));
        assert!(collider.is_colliding_with(ColliderId(7)));
        assert_eq!(collider.active_collisions().len(), 1);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_multiple_listeners() {
        let mut ids = ColliderIdAllocator::new();
        let (mut collider, first) = counting_collider(&mut ids);
        let second = Rc::new(Cell::new(0));
        let seen = Rc::clone(&second);
        collider.add_callback(move || seen.set(seen.get() + 1));

        collider.collision(ColliderId(9)).unwrap();
        assert_eq!(first.get(), 1);
        assert_eq!(second.get(), 1);

        // set_callback drops the extra listener
        let third = Rc::new(Cell::new(0));
        let seen = Rc::clone(&third);
        collider.set_callback(move || seen.set(seen.get() + 1));
        collider.collision(ColliderId(10)).unwrap();
        assert_eq!(second.get(), 1);
        assert_eq!(third.get(), 1);
    }

    #[test]
    fn test_within_collider_origin() {
        let mut ids = ColliderIdAllocator::new();
        let mut collider = AreaCollider::new(ColliderShape::Triangle, &mut ids);
        assert!(collider.within_collider(&collider.origin()));

        collider.scale(&Vec3::new(9.0, 4.0, 0.0)).unwrap();
        collider.rotate(30.0, &Vec3::new(0.0, 0.0, 1.0)).unwrap();
        collider.translate(&Vec3::new(-20.0, 7.0, 0.0)).unwrap();
        assert!(collider.within_collider(&collider.origin()));
    }

    #[test]
    fn test_within_collider_points() {
        let mut ids = ColliderIdAllocator::new();
        let mut collider = AreaCollider::new(ColliderShape::Square, &mut ids);
        collider.set_scale(Vec3::new(20.0, 20.0, 1.0)).unwrap();
        collider.set_translation(Vec3::new(40.0, 40.0, 0.0)).unwrap();

        assert!(collider.within_collider(&Vec3::new(45.0, 45.0, 0.0)));
        assert!(collider.within_collider(&Vec3::new(59.0, 41.0, 100.0)));
        assert!(!collider.within_collider(&Vec3::new(200.0, 50.0, 0.0)));
        assert!(!collider.within_collider(&Vec3::new(50.0, -10.0, 0.0)));
    }

    #[test]
    fn test_within_collider_counts_single_mismatch_as_inside() {
        // Right of the square: both right-hand corners flip in x
        let mut ids = ColliderIdAllocator::new();
        let collider = AreaCollider::new(ColliderShape::Square, &mut ids);
        assert!(!collider.within_collider(&Vec3::new(1.5, 0.5, 0.0)));

        // Above the square: both top corners flip in y
        assert!(!collider.within_collider(&Vec3::new(0.5, 1.5, 0.0)));

        // Exactly on a corner counts as the positive bucket
        assert!(collider.within_collider(&Vec3::new(0.0, 0.0, 0.0)));
    }

    #[test]
    fn test_local_transforms_move_collider() {
        let mut ids = ColliderIdAllocator::new();
        let mut collider = AreaCollider::new(ColliderShape::Square, &mut ids);
        collider.scale_local(&Vec3::new(10.0, 10.0, 1.0)).unwrap();
        collider.translate_local(&Vec3::new(5.0, 0.0, 0.0)).unwrap();
        assert_relative_eq!(collider.origin(), Vec3::new(10.0, 5.0, 0.0), epsilon = 1e-5);
        assert!(collider.within_collider(&Vec3::new(14.0, 9.0, 0.0)));
    }
}

//! Per-frame pairwise collision pass over area colliders
//!
//! Every ordered pair of colliders is tested in both directions with the
//! collider containment heuristic. Contact starts raise an edge-triggered
//! notification on both colliders; contacts that no longer overlap are
//! cleared so the next contact notifies again.
//!
//! There is no broad phase. Colliders are small fixed polygons and scenes are
//! small, so the pass is O(pairs x vertices).

use std::borrow::BorrowMut;
use std::collections::BTreeSet;

use log::trace;

use crate::error::EngineResult;
use crate::physics::collider::{AreaCollider, ColliderId};

/// Unordered pair of colliders, smaller id first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CollisionPair {
    /// Smaller id of the pair
    pub collider_a: ColliderId,
    /// Larger id of the pair
    pub collider_b: ColliderId,
}

impl CollisionPair {
    /// Create a new collision pair (always stores the smaller id first)
    pub fn new(a: ColliderId, b: ColliderId) -> Self {
        if a < b {
            Self { collider_a: a, collider_b: b }
        } else {
            Self { collider_a: b, collider_b: a }
        }
    }

    /// Whether `id` is one side of this pair
    pub fn involves(&self, id: ColliderId) -> bool {
        self.collider_a == id || self.collider_b == id
    }
}

/// Contact changes produced by one collision pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollisionReport {
    /// Pairs that started contact during the pass, sorted
    pub began: Vec<CollisionPair>,
    /// Pairs whose recorded contact was cleared during the pass, sorted
    pub ended: Vec<CollisionPair>,
}

impl CollisionReport {
    /// Whether the pass changed no contact state
    pub fn is_empty(&self) -> bool {
        self.began.is_empty() && self.ended.is_empty()
    }

    /// Ids of colliders that started contact with `id`
    pub fn began_with(&self, id: ColliderId) -> impl Iterator<Item = ColliderId> + '_ {
        partners(&self.began, id)
    }

    /// Ids of colliders whose contact with `id` ended
    pub fn ended_with(&self, id: ColliderId) -> impl Iterator<Item = ColliderId> + '_ {
        partners(&self.ended, id)
    }
}

fn partners(pairs: &[CollisionPair], id: ColliderId) -> impl Iterator<Item = ColliderId> + '_ {
    pairs.iter().filter(move |p| p.involves(id)).map(move |p| {
        if p.collider_a == id {
            p.collider_b
        } else {
            p.collider_a
        }
    })
}

/// Collision pass entry point
pub struct CollisionEngine;

impl CollisionEngine {
    /// Run one collision pass over `colliders`
    ///
    /// The slice is borrowed for the whole pass, so the set of colliders
    /// cannot change mid-scan. Anything that wants to remove colliders in
    /// response to a contact has to defer it until this returns.
    ///
    /// Fails with an illegal-state error if a contact involves a collider
    /// without a listener. State already recorded by earlier pairs in the
    /// pass is kept.
    pub fn check_collisions<C>(colliders: &mut [C]) -> EngineResult<CollisionReport>
    where
        C: BorrowMut<AreaCollider>,
    {
        let mut began = BTreeSet::new();
        let mut ended = BTreeSet::new();

        for i in 0..colliders.len() {
            for k in 0..colliders.len() {
                if i == k {
                    continue;
                }

                let id_i = colliders[i].borrow().id();
                let id_k = colliders[k].borrow().id();

                if Self::overlaps(colliders[i].borrow(), colliders[k].borrow()) {
                    let new_k = colliders[k].borrow_mut().collision(id_i)?;
                    let new_i = colliders[i].borrow_mut().collision(id_k)?;
                    if new_k || new_i {
                        trace!("Contact began between {} and {}", id_i, id_k);
                        began.insert(CollisionPair::new(id_i, id_k));
                    }
                } else {
                    let cleared_k = colliders[k].borrow_mut().remove_collision(id_i);
                    let cleared_i = colliders[i].borrow_mut().remove_collision(id_k);
                    if cleared_k || cleared_i {
                        trace!("Contact ended between {} and {}", id_i, id_k);
                        ended.insert(CollisionPair::new(id_i, id_k));
                    }
                }
            }
        }

        Ok(CollisionReport {
            began: began.into_iter().collect(),
            ended: ended.into_iter().collect(),
        })
    }

    /// Whether any vertex of `b` lies within `a`, or failing that any vertex
    /// of `a` lies within `b`
    ///
    /// The containment heuristic is not symmetric, so both directions are
    /// tried before concluding there is no contact.
    pub fn overlaps(a: &AreaCollider, b: &AreaCollider) -> bool {
        b.vertices().positions().any(|v| a.within_collider(&v))
            || a.vertices().positions().any(|v| b.within_collider(&v))
    }
}

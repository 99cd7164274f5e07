//! Body registry
//!
//! Owns every body in the simulation. The spatial index and the collision
//! system hold `BodyHandle`s into it; a handle whose body was despawned
//! resolves to `None` rather than to whatever reuses its slot.

use crate::foundation::collections::{BodyHandle, HandleMap};
use crate::foundation::rect::Rect;
use crate::physics::body::RigidBody;

/// Slot-map backed store of rigid bodies
#[derive(Debug, Clone, Default)]
pub struct BodyRegistry {
    bodies: HandleMap<RigidBody>,
}

impl BodyRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a body and return its handle
    pub fn spawn(&mut self, body: RigidBody) -> BodyHandle {
        self.bodies.insert(body)
    }

    /// Remove a body, returning it if the handle was live
    pub fn despawn(&mut self, handle: BodyHandle) -> Option<RigidBody> {
        self.bodies.remove(handle)
    }

    /// Look up a body
    pub fn get(&self, handle: BodyHandle) -> Option<&RigidBody> {
        self.bodies.get(handle)
    }

    /// Look up a body mutably
    pub fn get_mut(&mut self, handle: BodyHandle) -> Option<&mut RigidBody> {
        self.bodies.get_mut(handle)
    }

    /// True when the handle refers to a live body
    pub fn contains(&self, handle: BodyHandle) -> bool {
        self.bodies.contains_key(handle)
    }

    /// Number of live bodies
    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    /// True when no body is live
    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Iterate over live bodies in registry order
    pub fn iter(&self) -> impl Iterator<Item = (BodyHandle, &RigidBody)> {
        self.bodies.iter()
    }

    /// Iterate mutably over live bodies in registry order
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (BodyHandle, &mut RigidBody)> {
        self.bodies.iter_mut()
    }

    /// Current bounding box of every live body, in registry order
    pub fn bounds_snapshot(&self) -> Vec<(BodyHandle, Rect)> {
        self.bodies.iter().map(|(handle, body)| (handle, body.bounds())).collect()
    }
}

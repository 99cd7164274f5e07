//! Abstract spatial query interface for broad-phase collision detection
//!
//! The collision system talks to this trait only, so the quadtree can be
//! swapped for another partitioning scheme (or the brute-force reference)
//! without touching the narrow-phase.

use std::any::Any;

use slotmap::SecondaryMap;

use crate::core::config::QuadtreeConfig;
use crate::foundation::collections::BodyHandle;
use crate::foundation::rect::Rect;
use crate::spatial::pairs::CandidatePair;
use crate::spatial::quadtree::{Placement, Quadtree, RebuildReport, SpatialError};

/// Abstract interface for spatial partitioning used in broad-phase collision detection
pub trait SpatialQuery: Send + Sync {
    /// Insert a body with its bounding box
    fn insert(&mut self, body: BodyHandle, bounds: Rect) -> Result<Placement, SpatialError>;

    /// Remove a body; returns whether it was present
    fn remove(&mut self, body: BodyHandle) -> bool;

    /// Update a body's bounding box
    fn update(&mut self, body: BodyHandle, bounds: Rect) -> Result<Placement, SpatialError>;

    /// Replace the whole contents with `bodies`
    fn rebuild(&mut self, bodies: &[(BodyHandle, Rect)]) -> Result<RebuildReport, SpatialError>;

    /// Bodies whose box may overlap the given body's box, excluding itself
    fn query_nearby(&self, body: BodyHandle) -> Vec<BodyHandle>;

    /// Bodies whose box may overlap `region`
    fn query_region(&self, region: Rect) -> Vec<BodyHandle>;

    /// Unordered candidate pairs, each reported once
    fn candidate_pairs(&self) -> Vec<CandidatePair>;

    /// Stored bounding box of a body (if it exists)
    fn bounds_of(&self, body: BodyHandle) -> Option<Rect>;

    /// Clear all bodies from the spatial structure
    fn clear(&mut self);

    /// Get the number of bodies in the structure
    fn body_count(&self) -> usize;

    /// Downcast to Any for type-specific access (e.g., QuadtreeSpatialQuery)
    fn as_any(&self) -> &dyn Any;

    /// Downcast to Any for mutable type-specific access
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Quadtree-based implementation of SpatialQuery
#[derive(Debug, Clone)]
pub struct QuadtreeSpatialQuery {
    quadtree: Quadtree,
}

impl QuadtreeSpatialQuery {
    /// Wrap an existing quadtree
    pub fn new(quadtree: Quadtree) -> Self {
        Self { quadtree }
    }

    /// Build an empty quadtree over `world_bounds`
    pub fn with_world(world_bounds: Rect, config: QuadtreeConfig) -> Result<Self, SpatialError> {
        Ok(Self::new(Quadtree::new(world_bounds, config)?))
    }

    /// Get a reference to the underlying quadtree (for visualization, etc.)
    pub fn quadtree(&self) -> &Quadtree {
        &self.quadtree
    }

    /// Get a mutable reference to the underlying quadtree
    pub fn quadtree_mut(&mut self) -> &mut Quadtree {
        &mut self.quadtree
    }
}

impl SpatialQuery for QuadtreeSpatialQuery {
    fn insert(&mut self, body: BodyHandle, bounds: Rect) -> Result<Placement, SpatialError> {
        self.quadtree.insert(body, bounds)
    }

    fn remove(&mut self, body: BodyHandle) -> bool {
        self.quadtree.remove(body).is_some()
    }

    fn update(&mut self, body: BodyHandle, bounds: Rect) -> Result<Placement, SpatialError> {
        self.quadtree.update(body, bounds)
    }

    fn rebuild(&mut self, bodies: &[(BodyHandle, Rect)]) -> Result<RebuildReport, SpatialError> {
        self.quadtree.rebuild(bodies.iter().copied())
    }

    fn query_nearby(&self, body: BodyHandle) -> Vec<BodyHandle> {
        self.quadtree.query_neighbors(body)
    }

    fn query_region(&self, region: Rect) -> Vec<BodyHandle> {
        self.quadtree.query_region(region).collect()
    }

    fn candidate_pairs(&self) -> Vec<CandidatePair> {
        self.quadtree.collect_pairs()
    }

    fn bounds_of(&self, body: BodyHandle) -> Option<Rect> {
        self.quadtree.stored_bounds(body)
    }

    fn clear(&mut self) {
        self.quadtree.clear();
    }

    fn body_count(&self) -> usize {
        self.quadtree.len()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// All-pairs reference implementation of SpatialQuery
///
/// Proposes every pair of bodies. Useful as a ground truth when checking a
/// partitioning scheme and as a baseline when measuring one.
#[derive(Debug, Clone, Default)]
pub struct BruteForceSpatialQuery {
    bodies: SecondaryMap<BodyHandle, Rect>,
}

impl BruteForceSpatialQuery {
    /// Create an empty structure
    pub fn new() -> Self {
        Self::default()
    }
}

impl SpatialQuery for BruteForceSpatialQuery {
    fn insert(&mut self, body: BodyHandle, bounds: Rect) -> Result<Placement, SpatialError> {
        if !bounds.is_finite() {
            return Err(SpatialError::NonFiniteBounds(body, bounds));
        }
        self.bodies.insert(body, bounds.normalized());
        Ok(Placement::Contained)
    }

    fn remove(&mut self, body: BodyHandle) -> bool {
        self.bodies.remove(body).is_some()
    }

    fn update(&mut self, body: BodyHandle, bounds: Rect) -> Result<Placement, SpatialError> {
        self.insert(body, bounds)
    }

    fn rebuild(&mut self, bodies: &[(BodyHandle, Rect)]) -> Result<RebuildReport, SpatialError> {
        if let Some(&(body, bounds)) = bodies.iter().find(|(_, bounds)| !bounds.is_finite()) {
            return Err(SpatialError::NonFiniteBounds(body, bounds));
        }

        self.bodies.clear();
        for &(body, bounds) in bodies {
            self.insert(body, bounds)?;
        }
        Ok(RebuildReport {
            inserted: bodies.len(),
            clamped: 0,
        })
    }

    fn query_nearby(&self, body: BodyHandle) -> Vec<BodyHandle> {
        let Some(bounds) = self.bodies.get(body).copied() else {
            return Vec::new();
        };
        self.query_region(bounds)
            .into_iter()
            .filter(|&other| other != body)
            .collect()
    }

    fn query_region(&self, region: Rect) -> Vec<BodyHandle> {
        self.bodies
            .iter()
            .filter(|(_, bounds)| bounds.intersects(&region))
            .map(|(body, _)| body)
            .collect()
    }

    fn candidate_pairs(&self) -> Vec<CandidatePair> {
        let handles: Vec<BodyHandle> = self.bodies.keys().collect();
        let mut pairs = Vec::with_capacity(handles.len() * handles.len().saturating_sub(1) / 2);
        for (i, &a) in handles.iter().enumerate() {
            for &b in &handles[i + 1..] {
                pairs.push(CandidatePair::new(a, b));
            }
        }
        pairs
    }

    fn bounds_of(&self, body: BodyHandle) -> Option<Rect> {
        self.bodies.get(body).copied()
    }

    fn clear(&mut self) {
        self.bodies.clear();
    }

    fn body_count(&self) -> usize {
        self.bodies.len()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    fn world() -> Rect {
        Rect::new(-50.0, -50.0, 100.0, 100.0)
    }

    #[test]
    fn test_spatial_query_insert_remove() {
        let mut registry: SlotMap<BodyHandle, ()> = SlotMap::with_key();
        let body = registry.insert(());

        let mut spatial = QuadtreeSpatialQuery::with_world(world(), QuadtreeConfig::default()).unwrap();
        spatial.insert(body, Rect::new(0.0, 0.0, 5.0, 5.0)).unwrap();
        assert_eq!(spatial.body_count(), 1);
        assert_eq!(spatial.bounds_of(body), Some(Rect::new(0.0, 0.0, 5.0, 5.0)));

        assert!(spatial.remove(body));
        assert!(!spatial.remove(body));
        assert_eq!(spatial.body_count(), 0);
    }

    #[test]
    fn test_downcast_to_quadtree() {
        let spatial: Box<dyn SpatialQuery> =
            Box::new(QuadtreeSpatialQuery::with_world(world(), QuadtreeConfig::default()).unwrap());

        let quadtree = spatial
            .as_any()
            .downcast_ref::<QuadtreeSpatialQuery>()
            .map(QuadtreeSpatialQuery::quadtree);

        assert_eq!(quadtree.map(Quadtree::world_bounds), Some(world()));
        assert!(spatial.as_any().downcast_ref::<BruteForceSpatialQuery>().is_none());
    }

    #[test]
    fn test_brute_force_proposes_every_pair() {
        let mut registry: SlotMap<BodyHandle, ()> = SlotMap::with_key();
        let bodies: Vec<_> = (0..5)
            .map(|i| (registry.insert(()), Rect::new(i as f32 * 30.0, 0.0, 1.0, 1.0)))
            .collect();

        let mut spatial = BruteForceSpatialQuery::new();
        spatial.rebuild(&bodies).unwrap();

        assert_eq!(spatial.candidate_pairs().len(), 10);
        assert!(spatial.query_nearby(bodies[0].0).is_empty());
        assert_eq!(spatial.query_region(Rect::new(29.0, 0.0, 2.0, 2.0)), vec![bodies[1].0]);
    }

    #[test]
    fn test_brute_force_failed_rebuild_keeps_bodies() {
        let mut registry: SlotMap<BodyHandle, ()> = SlotMap::with_key();
        let a = registry.insert(());
        let b = registry.insert(());

        let mut spatial = BruteForceSpatialQuery::new();
        spatial.rebuild(&[(a, Rect::new(0.0, 0.0, 1.0, 1.0))]).unwrap();

        let result = spatial.rebuild(&[
            (a, Rect::new(5.0, 5.0, 1.0, 1.0)),
            (b, Rect::new(f32::INFINITY, 0.0, 1.0, 1.0)),
        ]);

        assert!(result.is_err());
        assert_eq!(spatial.body_count(), 1);
        assert_eq!(spatial.bounds_of(a), Some(Rect::new(0.0, 0.0, 1.0, 1.0)));
    }
}

//! Core collision detection system
//!
//! Collision detection runs in two phases. The broad-phase asks a
//! `SpatialQuery` for candidate pairs; the narrow-phase keeps the candidates
//! whose current boxes actually overlap. Contact resolution is left to the
//! caller.

use std::collections::HashSet;

use log::{debug, trace};

use crate::foundation::collections::BodyHandle;
use crate::physics::registry::BodyRegistry;
use crate::spatial::pairs::CandidatePair;
use crate::spatial::quadtree::{RebuildReport, SpatialError};
use crate::spatial::spatial_query::SpatialQuery;

/// Collision pair representing two bodies whose boxes overlap
pub type CollisionPair = CandidatePair;

/// How candidate pairs are gathered from the spatial structure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BroadPhaseMode {
    /// One global pair enumeration per step
    #[default]
    Pairs,
    /// One neighbour query per body, deduplicated
    PerBody,
}

/// Core collision detection system
pub struct PhysicsCollisionSystem {
    /// Spatial partitioning structure for broad-phase
    spatial_query: Box<dyn SpatialQuery>,

    /// How the broad-phase gathers candidates
    mode: BroadPhaseMode,

    /// Collision pairs from the current frame
    current_pairs: HashSet<CollisionPair>,

    /// Collision pairs from the previous frame
    previous_pairs: HashSet<CollisionPair>,

    /// Candidates proposed by the last broad-phase
    last_candidate_count: usize,
}

impl PhysicsCollisionSystem {
    /// Create a new collision system with the given spatial query implementation
    pub fn new(spatial_query: Box<dyn SpatialQuery>) -> Self {
        Self {
            spatial_query,
            mode: BroadPhaseMode::default(),
            current_pairs: HashSet::new(),
            previous_pairs: HashSet::new(),
            last_candidate_count: 0,
        }
    }

    /// Choose how the broad-phase gathers candidates
    pub fn with_mode(mut self, mode: BroadPhaseMode) -> Self {
        self.mode = mode;
        self
    }

    /// Broad-phase mode in use
    pub fn mode(&self) -> BroadPhaseMode {
        self.mode
    }

    /// Rebuild the spatial structure from the registry's current boxes
    ///
    /// Must run once per step after integration and before `detect_collisions`.
    pub fn rebuild(&mut self, registry: &BodyRegistry) -> Result<RebuildReport, SpatialError> {
        self.spatial_query.rebuild(&registry.bounds_snapshot())
    }

    /// Drop a body from the spatial structure (e.g. when it is despawned)
    pub fn remove_body(&mut self, body: BodyHandle) -> bool {
        self.spatial_query.remove(body)
    }

    /// Perform collision detection (broad-phase + narrow-phase)
    /// Returns collision pairs for this frame
    pub fn detect_collisions(&mut self, registry: &BodyRegistry) -> &HashSet<CollisionPair> {
        std::mem::swap(&mut self.current_pairs, &mut self.previous_pairs);
        self.current_pairs.clear();

        let candidates = self.broad_phase(registry);
        self.last_candidate_count = candidates.len();
        self.narrow_phase(registry, candidates);

        debug!(
            "Collision detection: {} candidates, {} contacts",
            self.last_candidate_count,
            self.current_pairs.len()
        );
        &self.current_pairs
    }

    /// Broad-phase: use the spatial query to find potential collision pairs
    fn broad_phase(&self, registry: &BodyRegistry) -> Vec<CandidatePair> {
        match self.mode {
            BroadPhaseMode::Pairs => self.spatial_query.candidate_pairs(),
            BroadPhaseMode::PerBody => {
                let mut potential_pairs = HashSet::new();
                for (body, _) in registry.iter() {
                    for nearby in self.spatial_query.query_nearby(body) {
                        potential_pairs.insert(CandidatePair::new(body, nearby));
                    }
                }
                potential_pairs.into_iter().collect()
            }
        }
    }

    /// Narrow-phase: exact box overlap on the bodies' current bounds
    fn narrow_phase(&mut self, registry: &BodyRegistry, candidates: Vec<CandidatePair>) {
        for pair in candidates {
            let (Some(a), Some(b)) = (registry.get(pair.a), registry.get(pair.b)) else {
                trace!("Skipping candidate {:?} with a despawned body", pair);
                continue;
            };

            if a.bounds().intersects(&b.bounds()) {
                self.current_pairs.insert(pair);
            }
        }
    }

    /// Get pairs that entered collision this frame
    pub fn collision_entered(&self) -> Vec<CollisionPair> {
        self.current_pairs
            .difference(&self.previous_pairs)
            .copied()
            .collect()
    }

    /// Get pairs that exited collision this frame
    pub fn collision_exited(&self) -> Vec<CollisionPair> {
        self.previous_pairs
            .difference(&self.current_pairs)
            .copied()
            .collect()
    }

    /// Get all current collision pairs
    pub fn current_collisions(&self) -> &HashSet<CollisionPair> {
        &self.current_pairs
    }

    /// Candidates proposed by the last broad-phase
    pub fn last_candidate_count(&self) -> usize {
        self.last_candidate_count
    }

    /// Query nearby bodies for a specific body
    pub fn query_nearby(&self, body: BodyHandle) -> Vec<BodyHandle> {
        self.spatial_query.query_nearby(body)
    }

    /// Get spatial query for direct access (e.g., for visualization)
    pub fn spatial_query(&self) -> &dyn SpatialQuery {
        self.spatial_query.as_ref()
    }

    /// Clear all collision data
    pub fn clear(&mut self) {
        self.spatial_query.clear();
        self.current_pairs.clear();
        self.previous_pairs.clear();
        self.last_candidate_count = 0;
    }
}

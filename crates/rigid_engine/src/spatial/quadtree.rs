//! Quadtree spatial partitioning structure
//!
//! Divides the 2D world into hierarchical quadrants for broad-phase collision
//! detection. A leaf splits into four children once it holds more than
//! `max_bodies_per_node` bodies. Bodies whose box fits entirely inside one
//! quadrant sink into that child; bodies that straddle a quadrant boundary stay
//! at the node that fully contains them, so every body is stored exactly once.

use log::{debug, trace, warn};
use slotmap::SecondaryMap;
use thiserror::Error;

use crate::core::config::QuadtreeConfig;
use crate::foundation::collections::BodyHandle;
use crate::foundation::rect::{Quadrant, Rect};
use crate::spatial::pairs::{self, CandidatePair};
use crate::spatial::region_query::RegionQuery;

/// Errors raised while building or filling a quadtree
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SpatialError {
    /// World bounds are not finite or have no area
    #[error("World bounds must be finite with positive size, got {0:?}")]
    InvalidWorldBounds(Rect),

    /// Leaf capacity of zero would split forever
    #[error("max_bodies_per_node must be at least 1")]
    ZeroCapacity,

    /// Body box contains NaN or infinite coordinates
    #[error("Body {0:?} has non-finite bounds {1:?}")]
    NonFiniteBounds(BodyHandle, Rect),
}

/// Body reference stored in the tree together with the box it was placed by
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadtreeEntry {
    /// Non-owning reference into the body registry
    pub handle: BodyHandle,
    /// Box used for placement, already clamped to the world
    pub bounds: Rect,
}

/// How an inserted box related to the world bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// The box was inside the world and stored unchanged
    Contained,
    /// The box reached outside the world and was clamped before storage
    Clamped,
}

/// Counters returned by `Quadtree::rebuild`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RebuildReport {
    /// Bodies inserted
    pub inserted: usize,
    /// Bodies whose box had to be clamped to the world
    pub clamped: usize,
}

/// Shape summary of a tree
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QuadtreeStats {
    /// Total nodes, root included
    pub node_count: usize,
    /// Nodes without children
    pub leaf_count: usize,
    /// Deepest node (root is 0)
    pub max_depth: u32,
    /// Bodies stored anywhere in the tree
    pub body_count: usize,
    /// Bodies stored at internal nodes
    pub straddler_count: usize,
}

/// Single node in the quadtree hierarchy
#[derive(Debug, Clone)]
pub struct QuadtreeNode {
    bounds: Rect,
    bodies: Vec<QuadtreeEntry>,
    children: Option<Box<[QuadtreeNode; 4]>>,
    depth: u32,
}

impl QuadtreeNode {
    /// Create a new leaf node
    pub fn new(bounds: Rect, depth: u32) -> Self {
        Self {
            bounds,
            bodies: Vec::new(),
            children: None,
            depth,
        }
    }

    /// World-space bounds of this node
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Bodies stored directly at this node
    pub fn bodies(&self) -> &[QuadtreeEntry] {
        &self.bodies
    }

    /// The four quadrant children, `None` for a leaf
    pub fn children(&self) -> Option<&[QuadtreeNode; 4]> {
        self.children.as_deref()
    }

    /// Child covering the given quadrant
    pub fn child(&self, quadrant: Quadrant) -> Option<&QuadtreeNode> {
        self.children().map(|children| &children[quadrant.index()])
    }

    /// Depth in the tree (0 = root)
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Check if this node is a leaf (has no children)
    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    /// Subdivide this leaf into four quadrant children
    ///
    /// Stored bodies are not moved; see `insert` for redistribution.
    pub fn split(&mut self) {
        if self.children.is_some() {
            return;
        }

        let [top_left, top_right, bottom_left, bottom_right] = self.bounds.quadrants();
        let depth = self.depth + 1;

        self.children = Some(Box::new([
            QuadtreeNode::new(top_left, depth),
            QuadtreeNode::new(top_right, depth),
            QuadtreeNode::new(bottom_left, depth),
            QuadtreeNode::new(bottom_right, depth),
        ]));
    }

    /// Insert an entry into this node or the child that fully contains it
    pub fn insert(&mut self, entry: QuadtreeEntry, config: &QuadtreeConfig) {
        if let Some(children) = self.children.as_mut() {
            match self.bounds.quadrant_of(&entry.bounds) {
                Some(quadrant) => children[quadrant.index()].insert(entry, config),
                None => self.bodies.push(entry),
            }
            return;
        }

        self.bodies.push(entry);

        if self.bodies.len() > config.max_bodies_per_node && self.depth < config.max_depth {
            trace!(
                "Splitting node at depth {} holding {} bodies: {:?}",
                self.depth,
                self.bodies.len(),
                self.bounds
            );
            self.split();
            self.redistribute(config);
        }
    }

    /// Move every local body that fits a single child down into it
    fn redistribute(&mut self, config: &QuadtreeConfig) {
        let Some(children) = self.children.as_mut() else {
            return;
        };

        for entry in std::mem::take(&mut self.bodies) {
            match self.bounds.quadrant_of(&entry.bounds) {
                Some(quadrant) => children[quadrant.index()].insert(entry, config),
                None => self.bodies.push(entry),
            }
        }
    }

    /// Remove an entry, following the placement path of `bounds`
    ///
    /// Internal nodes along the path collapse back into leaves once their
    /// subtree fits into a single leaf again.
    pub fn remove(
        &mut self,
        handle: BodyHandle,
        bounds: &Rect,
        config: &QuadtreeConfig,
    ) -> Option<QuadtreeEntry> {
        let removed = match self.bodies.iter().position(|e| e.handle == handle) {
            Some(index) => Some(self.bodies.remove(index)),
            None => {
                let quadrant = self.bounds.quadrant_of(bounds)?;
                self.children.as_mut()?[quadrant.index()].remove(handle, bounds, config)
            }
        };

        if removed.is_some() {
            self.try_collapse(config);
        }
        removed
    }

    /// Merge leaf children back into this node when they fit
    fn try_collapse(&mut self, config: &QuadtreeConfig) {
        let Some(children) = self.children.as_ref() else {
            return;
        };
        if children.iter().any(|child| !child.is_leaf()) {
            return;
        }

        let total = self.bodies.len() + children.iter().map(|child| child.bodies.len()).sum::<usize>();
        if total > config.max_bodies_per_node {
            return;
        }

        if let Some(children) = self.children.take() {
            for child in *children {
                self.bodies.extend(child.bodies);
            }
            trace!("Collapsed node at depth {} into a leaf with {} bodies", self.depth, total);
        }
    }

    /// Find an entry in this node or its children
    pub fn find(&self, handle: BodyHandle) -> Option<&QuadtreeEntry> {
        if let Some(entry) = self.bodies.iter().find(|e| e.handle == handle) {
            return Some(entry);
        }

        self.children
            .as_ref()?
            .iter()
            .find_map(|child| child.find(handle))
    }

    /// Get all leaf nodes (for visualization)
    pub fn get_all_leaves<'a>(&'a self, leaves: &mut Vec<&'a QuadtreeNode>) {
        match self.children.as_ref() {
            None => leaves.push(self),
            Some(children) => {
                for child in children.iter() {
                    child.get_all_leaves(leaves);
                }
            }
        }
    }

    /// Get all nodes at a specific depth (for visualization)
    pub fn get_nodes_at_depth<'a>(&'a self, target_depth: u32, nodes: &mut Vec<&'a QuadtreeNode>) {
        if self.depth == target_depth {
            nodes.push(self);
        } else if let Some(children) = self.children.as_ref() {
            for child in children.iter() {
                child.get_nodes_at_depth(target_depth, nodes);
            }
        }
    }

    /// Count total bodies in this node and all children
    pub fn count_bodies(&self) -> usize {
        let below: usize = self
            .children
            .as_ref()
            .map_or(0, |children| children.iter().map(QuadtreeNode::count_bodies).sum());
        self.bodies.len() + below
    }

    fn accumulate_stats(&self, stats: &mut QuadtreeStats) {
        stats.node_count += 1;
        stats.max_depth = stats.max_depth.max(self.depth);
        stats.body_count += self.bodies.len();

        match self.children.as_ref() {
            None => stats.leaf_count += 1,
            Some(children) => {
                stats.straddler_count += self.bodies.len();
                for child in children.iter() {
                    child.accumulate_stats(stats);
                }
            }
        }
    }
}

/// Broad-phase quadtree over a fixed world rectangle
///
/// Mutation (`insert`, `remove`, `rebuild`) takes `&mut self` and queries take
/// `&self`, so a query can never observe a half-built tree. Bodies are
/// referenced by handle only; the tree never owns them.
#[derive(Debug, Clone)]
pub struct Quadtree {
    /// Root node covering the entire world
    root: QuadtreeNode,

    /// Capacity policy
    config: QuadtreeConfig,

    /// Stored box per body, used to walk straight to an entry
    locations: SecondaryMap<BodyHandle, Rect>,
}

impl Quadtree {
    /// Create an empty quadtree with the given world bounds
    pub fn new(world_bounds: Rect, config: QuadtreeConfig) -> Result<Self, SpatialError> {
        if !world_bounds.is_finite() || world_bounds.width <= 0.0 || world_bounds.height <= 0.0 {
            return Err(SpatialError::InvalidWorldBounds(world_bounds));
        }
        if config.max_bodies_per_node == 0 {
            return Err(SpatialError::ZeroCapacity);
        }

        Ok(Self {
            root: QuadtreeNode::new(world_bounds, 0),
            config,
            locations: SecondaryMap::new(),
        })
    }

    /// World bounds fixed at construction
    pub fn world_bounds(&self) -> Rect {
        self.root.bounds
    }

    /// Capacity policy in use
    pub fn config(&self) -> &QuadtreeConfig {
        &self.config
    }

    /// Root node, for inspection and visualization
    pub fn root(&self) -> &QuadtreeNode {
        &self.root
    }

    /// Number of bodies in the tree
    pub fn len(&self) -> usize {
        self.locations.len()
    }

    /// True when no body is stored
    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    /// True when the body is stored in the tree
    pub fn contains(&self, handle: BodyHandle) -> bool {
        self.locations.contains_key(handle)
    }

    /// Box the body was stored with (after clamping)
    pub fn stored_bounds(&self, handle: BodyHandle) -> Option<Rect> {
        self.locations.get(handle).copied()
    }

    /// Insert a body with its current bounding box
    ///
    /// A box reaching outside the world is clamped to it and reported as
    /// `Placement::Clamped`; the body is never dropped. Inserting a handle that
    /// is already stored replaces its previous box.
    pub fn insert(&mut self, handle: BodyHandle, bounds: Rect) -> Result<Placement, SpatialError> {
        if !bounds.is_finite() {
            return Err(SpatialError::NonFiniteBounds(handle, bounds));
        }
        if self.locations.contains_key(handle) {
            self.remove(handle);
        }

        let bounds = bounds.normalized();
        let world = self.root.bounds;
        let (stored, placement) = if world.contains_rect(&bounds) {
            (bounds, Placement::Contained)
        } else {
            warn!(
                "Body {:?} box {:?} leaves world {:?}; clamping",
                handle, bounds, world
            );
            (bounds.clamp_to(&world), Placement::Clamped)
        };

        self.root.insert(QuadtreeEntry { handle, bounds: stored }, &self.config);
        self.locations.insert(handle, stored);
        Ok(placement)
    }

    /// Remove a body, returning the box it was stored with
    pub fn remove(&mut self, handle: BodyHandle) -> Option<Rect> {
        let bounds = self.locations.remove(handle)?;
        let removed = self.root.remove(handle, &bounds, &self.config);
        debug_assert!(removed.is_some(), "location map and tree disagree on {handle:?}");
        Some(bounds)
    }

    /// Move a body to a new box
    pub fn update(&mut self, handle: BodyHandle, bounds: Rect) -> Result<Placement, SpatialError> {
        self.insert(handle, bounds)
    }

    /// Drop every node and body, leaving a single empty leaf
    pub fn clear(&mut self) {
        self.root = QuadtreeNode::new(self.root.bounds, 0);
        self.locations.clear();
    }

    /// Discard the tree and insert every body in iteration order
    ///
    /// Every box is checked before the tree is touched, so a non-finite box
    /// leaves the previous tree in place.
    pub fn rebuild<I>(&mut self, bodies: I) -> Result<RebuildReport, SpatialError>
    where
        I: IntoIterator<Item = (BodyHandle, Rect)>,
    {
        let bodies: Vec<(BodyHandle, Rect)> = bodies.into_iter().collect();
        if let Some(&(handle, bounds)) = bodies.iter().find(|(_, bounds)| !bounds.is_finite()) {
            return Err(SpatialError::NonFiniteBounds(handle, bounds));
        }

        self.clear();

        let mut report = RebuildReport::default();
        for (handle, bounds) in bodies {
            if self.insert(handle, bounds)? == Placement::Clamped {
                report.clamped += 1;
            }
            report.inserted += 1;
        }

        debug!(
            "Rebuilt quadtree: {} bodies ({} clamped), {} leaves",
            report.inserted,
            report.clamped,
            self.leaves().len()
        );
        Ok(report)
    }

    /// Lazily iterate over bodies whose stored box intersects `region`
    pub fn query_region(&self, region: Rect) -> RegionQuery<'_> {
        RegionQuery::new(&self.root, region)
    }

    /// Bodies whose stored box intersects the given body's box, excluding itself
    ///
    /// Returns an empty list for a body that is not in the tree.
    pub fn query_neighbors(&self, handle: BodyHandle) -> Vec<BodyHandle> {
        let Some(bounds) = self.stored_bounds(handle) else {
            return Vec::new();
        };

        self.query_region(bounds)
            .filter(|&other| other != handle)
            .collect()
    }

    /// Every unordered candidate pair, each reported exactly once
    pub fn collect_pairs(&self) -> Vec<CandidatePair> {
        pairs::collect(&self.root)
    }

    /// Find a stored entry
    pub fn find(&self, handle: BodyHandle) -> Option<&QuadtreeEntry> {
        if !self.contains(handle) {
            return None;
        }
        self.root.find(handle)
    }

    /// Get all leaf nodes (for visualization)
    pub fn leaves(&self) -> Vec<&QuadtreeNode> {
        let mut leaves = Vec::new();
        self.root.get_all_leaves(&mut leaves);
        leaves
    }

    /// Get all nodes at a specific depth (for visualization)
    pub fn nodes_at_depth(&self, depth: u32) -> Vec<&QuadtreeNode> {
        let mut nodes = Vec::new();
        self.root.get_nodes_at_depth(depth, &mut nodes);
        nodes
    }

    /// Shape summary of the current tree
    pub fn stats(&self) -> QuadtreeStats {
        let mut stats = QuadtreeStats::default();
        self.root.accumulate_stats(&mut stats);
        stats
    }
}

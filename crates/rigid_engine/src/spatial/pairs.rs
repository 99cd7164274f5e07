//! Candidate pair enumeration
//!
//! Every pair is attributed to the lowest common ancestor of the two nodes
//! storing its bodies: a node pairs its own bodies with each other and with
//! every body stored above it on the path from the root. Walking the tree once
//! therefore reports each unordered pair exactly once without a dedupe set.

use crate::foundation::collections::BodyHandle;
use crate::spatial::quadtree::QuadtreeNode;

/// Unordered pair of bodies proposed for narrow-phase testing
///
/// The smaller handle is always stored first so equal pairs compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CandidatePair {
    /// Body with the smaller handle
    pub a: BodyHandle,
    /// Body with the larger handle
    pub b: BodyHandle,
}

impl CandidatePair {
    /// Create a pair, ordering the handles
    pub fn new(first: BodyHandle, second: BodyHandle) -> Self {
        if first <= second {
            Self { a: first, b: second }
        } else {
            Self { a: second, b: first }
        }
    }

    /// True when `handle` is one of the two bodies
    pub fn contains(&self, handle: BodyHandle) -> bool {
        self.a == handle || self.b == handle
    }
}

/// Collect all candidate pairs below `root`
pub(crate) fn collect(root: &QuadtreeNode) -> Vec<CandidatePair> {
    let mut pairs = Vec::new();
    let mut ancestors = Vec::new();
    collect_node(root, &mut ancestors, &mut pairs);
    pairs
}

fn collect_node(node: &QuadtreeNode, ancestors: &mut Vec<BodyHandle>, pairs: &mut Vec<CandidatePair>) {
    let bodies = node.bodies();

    for (i, entry) in bodies.iter().enumerate() {
        pairs.extend(ancestors.iter().map(|&above| CandidatePair::new(above, entry.handle)));
        pairs.extend(bodies[i + 1..].iter().map(|other| CandidatePair::new(entry.handle, other.handle)));
    }

    if let Some(children) = node.children() {
        let mark = ancestors.len();
        ancestors.extend(bodies.iter().map(|e| e.handle));
        for child in children.iter() {
            collect_node(child, ancestors, pairs);
        }
        ancestors.truncate(mark);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::QuadtreeConfig;
    use crate::foundation::rect::Rect;
    use crate::spatial::Quadtree;
    use slotmap::SlotMap;
    use std::collections::HashSet;

    #[test]
    fn test_pair_is_order_independent() {
        let mut registry: SlotMap<BodyHandle, ()> = SlotMap::with_key();
        let a = registry.insert(());
        let b = registry.insert(());

        assert_eq!(CandidatePair::new(a, b), CandidatePair::new(b, a));
        assert!(CandidatePair::new(b, a).contains(a));
    }

    #[test]
    fn test_straddler_pairs_with_every_descendant() {
        let mut registry: SlotMap<BodyHandle, ()> = SlotMap::with_key();
        let straddler = registry.insert(());
        let others: Vec<_> = (0..6).map(|_| registry.insert(())).collect();

        let mut quadtree = Quadtree::new(Rect::new(0.0, 0.0, 100.0, 100.0), QuadtreeConfig::default()).unwrap();
        quadtree.insert(straddler, Rect::new(49.0, 49.0, 2.0, 2.0)).unwrap();
        let corners = [(5.0, 5.0), (80.0, 5.0), (5.0, 80.0), (80.0, 80.0), (10.0, 10.0), (85.0, 85.0)];
        for (&id, (x, y)) in others.iter().zip(corners) {
            quadtree.insert(id, Rect::new(x, y, 2.0, 2.0)).unwrap();
        }
        assert!(!quadtree.root().is_leaf());

        let pairs = quadtree.collect_pairs();
        let unique: HashSet<_> = pairs.iter().copied().collect();
        assert_eq!(unique.len(), pairs.len());

        for &id in &others {
            assert!(unique.contains(&CandidatePair::new(straddler, id)));
        }
        // Bodies sunk into different quadrants are never paired with each other
        assert!(!unique.contains(&CandidatePair::new(others[0], others[1])));
        // Bodies sharing a quadrant are
        assert!(unique.contains(&CandidatePair::new(others[0], others[4])));
        assert!(unique.contains(&CandidatePair::new(others[3], others[5])));
    }
}

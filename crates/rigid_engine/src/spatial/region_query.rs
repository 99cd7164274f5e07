//! Lazy region query over a quadtree
//!
//! The iterator walks the tree depth-first with an explicit stack, descending
//! only into nodes whose bounds intersect the query region. Nothing is cached;
//! each call to `Quadtree::query_region` starts a fresh walk.

use std::slice;

use crate::foundation::collections::BodyHandle;
use crate::foundation::rect::Rect;
use crate::spatial::quadtree::{QuadtreeEntry, QuadtreeNode};

/// Iterator over bodies whose stored box intersects a region
///
/// Visits nodes in pre-order (parent first, then children top-left,
/// top-right, bottom-left, bottom-right), so results are deterministic for a
/// given tree.
#[derive(Debug, Clone)]
pub struct RegionQuery<'a> {
    region: Rect,
    pending: Vec<&'a QuadtreeNode>,
    current: slice::Iter<'a, QuadtreeEntry>,
}

impl<'a> RegionQuery<'a> {
    pub(crate) fn new(root: &'a QuadtreeNode, region: Rect) -> Self {
        let region = region.normalized();
        let mut pending = Vec::new();
        if region.is_finite() && root.bounds().intersects(&region) {
            pending.push(root);
        }

        Self {
            region,
            pending,
            current: [].iter(),
        }
    }

    /// Region being queried, with non-negative size
    pub fn region(&self) -> Rect {
        self.region
    }
}

impl Iterator for RegionQuery<'_> {
    type Item = BodyHandle;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let region = self.region;
            if let Some(entry) = self.current.by_ref().find(|e| e.bounds.intersects(&region)) {
                return Some(entry.handle);
            }

            let node = self.pending.pop()?;
            self.current = node.bodies().iter();

            if let Some(children) = node.children() {
                // Reverse so the top-left child is popped first
                for child in children.iter().rev() {
                    if child.bounds().intersects(&region) {
                        self.pending.push(child);
                    }
                }
            }
        }
    }
}

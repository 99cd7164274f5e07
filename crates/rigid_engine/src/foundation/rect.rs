//! Axis-aligned rectangle used for world bounds, node bounds and body boxes
//!
//! Coordinates follow screen conventions: `(x, y)` is the top-left corner and
//! `y` grows downward, so the "top" quadrants have the smaller `y` values.

use serde::{Deserialize, Serialize};

use crate::foundation::math::Vec2;

/// Quadrant of a rectangle, in the fixed order used by split, insert and query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quadrant {
    /// Smaller x, smaller y
    TopLeft = 0,
    /// Larger x, smaller y
    TopRight = 1,
    /// Smaller x, larger y
    BottomLeft = 2,
    /// Larger x, larger y
    BottomRight = 3,
}

impl Quadrant {
    /// All quadrants in child order
    pub const ALL: [Quadrant; 4] = [
        Quadrant::TopLeft,
        Quadrant::TopRight,
        Quadrant::BottomLeft,
        Quadrant::BottomRight,
    ];

    /// Index of this quadrant in a node's child array
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Axis-aligned rectangle (`x`, `y`, `width`, `height`)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge
    pub x: f32,
    /// Top edge
    pub y: f32,
    /// Extent along x
    pub width: f32,
    /// Extent along y
    pub height: f32,
}

impl Rect {
    /// Create a rectangle from its top-left corner and size
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Create a rectangle from two corners, in any order
    pub fn from_corners(a: Vec2, b: Vec2) -> Self {
        let left = a.x.min(b.x);
        let top = a.y.min(b.y);
        Self::new(left, top, a.x.max(b.x) - left, a.y.max(b.y) - top)
    }

    /// Create a rectangle centred on `center`
    pub fn from_center_size(center: Vec2, size: Vec2) -> Self {
        Self::from_corners(center - size * 0.5, center + size * 0.5)
    }

    /// Right edge
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Bottom edge
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Centre point
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width * 0.5, self.y + self.height * 0.5)
    }

    /// Area (zero for degenerate rectangles)
    pub fn area(&self) -> f32 {
        self.width * self.height
    }

    /// True when every coordinate is finite
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.width.is_finite() && self.height.is_finite()
    }

    /// Same rectangle with non-negative width and height
    pub fn normalized(&self) -> Self {
        Self::from_corners(
            Vec2::new(self.x, self.y),
            Vec2::new(self.right(), self.bottom()),
        )
    }

    /// Closed-interval overlap test; rectangles that share an edge intersect
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x <= other.right()
            && self.right() >= other.x
            && self.y <= other.bottom()
            && self.bottom() >= other.y
    }

    /// True when `other` lies entirely inside this rectangle (edges included)
    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.right() <= self.right()
            && other.y >= self.y
            && other.bottom() <= self.bottom()
    }

    /// Split into four quadrants at the midpoint, in `Quadrant::ALL` order
    ///
    /// The outer edges of the right and bottom quadrants are taken from the
    /// parent so the four children cover it without gaps.
    pub fn quadrants(&self) -> [Rect; 4] {
        let mid_x = self.x + self.width * 0.5;
        let mid_y = self.y + self.height * 0.5;
        let west = mid_x - self.x;
        let east = self.right() - mid_x;
        let north = mid_y - self.y;
        let south = self.bottom() - mid_y;

        [
            Rect::new(self.x, self.y, west, north),
            Rect::new(mid_x, self.y, east, north),
            Rect::new(self.x, mid_y, west, south),
            Rect::new(mid_x, mid_y, east, south),
        ]
    }

    /// Quadrant that fully contains `other`, if any
    ///
    /// A box touching either midline is a straddler and yields `None`.
    pub fn quadrant_of(&self, other: &Rect) -> Option<Quadrant> {
        if !self.contains_rect(other) {
            return None;
        }

        let mid_x = self.x + self.width * 0.5;
        let mid_y = self.y + self.height * 0.5;

        let west = other.right() < mid_x;
        let east = other.x > mid_x;
        let north = other.bottom() < mid_y;
        let south = other.y > mid_y;

        match (west, east, north, south) {
            (true, _, true, _) => Some(Quadrant::TopLeft),
            (_, true, true, _) => Some(Quadrant::TopRight),
            (true, _, _, true) => Some(Quadrant::BottomLeft),
            (_, true, _, true) => Some(Quadrant::BottomRight),
            _ => None,
        }
    }

    /// Clamp this rectangle into `bounds`
    ///
    /// A rectangle entirely outside collapses onto the nearest edge of
    /// `bounds` instead of disappearing.
    pub fn clamp_to(&self, bounds: &Rect) -> Rect {
        let left = self.x.clamp(bounds.x, bounds.right());
        let right = self.right().clamp(bounds.x, bounds.right());
        let top = self.y.clamp(bounds.y, bounds.bottom());
        let bottom = self.bottom().clamp(bounds.y, bounds.bottom());
        Rect::new(left, top, right - left, bottom - top)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_quadrants_partition_parent() {
        let parent = Rect::new(0.0, 0.0, 100.0, 100.0);
        let [tl, tr, bl, br] = parent.quadrants();

        assert_eq!(tl, Rect::new(0.0, 0.0, 50.0, 50.0));
        assert_eq!(tr, Rect::new(50.0, 0.0, 50.0, 50.0));
        assert_eq!(bl, Rect::new(0.0, 50.0, 50.0, 50.0));
        assert_eq!(br, Rect::new(50.0, 50.0, 50.0, 50.0));

        let total: f32 = parent.quadrants().iter().map(Rect::area).sum();
        assert_relative_eq!(total, parent.area());
    }

    #[test]
    fn test_quadrant_of_strict_midlines() {
        let node = Rect::new(0.0, 0.0, 100.0, 100.0);

        assert_eq!(node.quadrant_of(&Rect::new(1.0, 1.0, 1.0, 1.0)), Some(Quadrant::TopLeft));
        assert_eq!(node.quadrant_of(&Rect::new(60.0, 1.0, 1.0, 1.0)), Some(Quadrant::TopRight));
        assert_eq!(node.quadrant_of(&Rect::new(1.0, 60.0, 1.0, 1.0)), Some(Quadrant::BottomLeft));
        assert_eq!(node.quadrant_of(&Rect::new(60.0, 60.0, 1.0, 1.0)), Some(Quadrant::BottomRight));

        // Touching the vertical midline counts as straddling
        assert_eq!(node.quadrant_of(&Rect::new(40.0, 1.0, 10.0, 1.0)), None);
        assert_eq!(node.quadrant_of(&Rect::new(50.0, 1.0, 10.0, 1.0)), None);
        // Crossing both midlines
        assert_eq!(node.quadrant_of(&Rect::new(49.0, 49.0, 2.0, 2.0)), None);
        // Larger than the node
        assert_eq!(node.quadrant_of(&Rect::new(-10.0, -10.0, 200.0, 200.0)), None);
    }

    #[test]
    fn test_intersects_includes_touching_edges() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(a.intersects(&Rect::new(10.0, 0.0, 5.0, 5.0)));
        assert!(a.intersects(&Rect::new(5.0, 5.0, 1.0, 1.0)));
        assert!(!a.intersects(&Rect::new(10.5, 0.0, 5.0, 5.0)));
        assert!(!a.intersects(&Rect::new(0.0, -3.0, 5.0, 2.0)));
    }

    #[test]
    fn test_clamp_to_keeps_outside_boxes() {
        let world = Rect::new(0.0, 0.0, 100.0, 100.0);

        let partial = Rect::new(-5.0, 90.0, 10.0, 20.0).clamp_to(&world);
        assert_eq!(partial, Rect::new(0.0, 90.0, 5.0, 10.0));

        let outside = Rect::new(150.0, 20.0, 10.0, 10.0).clamp_to(&world);
        assert_eq!(outside, Rect::new(100.0, 20.0, 0.0, 10.0));
        assert!(world.contains_rect(&outside));
    }

    #[test]
    fn test_from_center_size() {
        let r = Rect::from_center_size(Vec2::new(10.0, 20.0), Vec2::new(4.0, 6.0));
        assert_relative_eq!(r.x, 8.0);
        assert_relative_eq!(r.y, 17.0);
        assert_relative_eq!(r.right(), 12.0);
        assert_relative_eq!(r.bottom(), 23.0);
        assert_eq!(r.center(), Vec2::new(10.0, 20.0));
    }

    #[test]
    fn test_normalized_flips_negative_size() {
        let r = Rect::new(10.0, 10.0, -4.0, -2.0).normalized();
        assert_eq!(r, Rect::new(6.0, 8.0, 4.0, 2.0));
    }
}

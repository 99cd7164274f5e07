//! Rigid body state
//!
//! Bodies are axis-aligned boxes described by their centre, size, velocity and
//! a per-axis mass. The broad-phase only ever sees `bounds()`.

use crate::foundation::math::{utils, Vec2};
use crate::foundation::rect::Rect;

/// Axis-aligned rigid body
#[derive(Debug, Clone, PartialEq)]
pub struct RigidBody {
    /// Centre of the box in world coordinates
    pub position: Vec2,

    /// Full width and height of the box
    pub size: Vec2,

    /// Current velocity in world units per second
    pub velocity: Vec2,

    /// Mass per axis, scaling the force applied on each axis
    pub mass: Vec2,
}

impl RigidBody {
    /// Create a body at rest
    pub fn new(position: Vec2, size: Vec2, mass: Vec2) -> Self {
        Self {
            position,
            size,
            velocity: Vec2::zeros(),
            mass,
        }
    }

    /// Set the initial velocity
    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    /// Half the size
    pub fn half_extents(&self) -> Vec2 {
        self.size * 0.5
    }

    /// Current axis-aligned bounding box
    pub fn bounds(&self) -> Rect {
        Rect::from_center_size(self.position, self.size)
    }

    /// Force produced by `acceleration` acting on this body's mass
    pub fn force(&self, acceleration: Vec2) -> Vec2 {
        utils::component_mul(self.mass, acceleration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_bounds_are_centred() {
        let body = RigidBody::new(Vec2::new(100.0, 50.0), Vec2::new(20.0, 10.0), Vec2::new(1.0, 1.0));
        let bounds = body.bounds();

        assert_relative_eq!(bounds.x, 90.0);
        assert_relative_eq!(bounds.y, 45.0);
        assert_relative_eq!(bounds.width, 20.0);
        assert_relative_eq!(bounds.height, 10.0);
    }

    #[test]
    fn test_force_scales_per_axis() {
        let body = RigidBody::new(Vec2::zeros(), Vec2::new(1.0, 1.0), Vec2::new(3.0, 5.0));
        assert_eq!(body.force(Vec2::new(0.0, 2.0)), Vec2::new(0.0, 10.0));
    }
}

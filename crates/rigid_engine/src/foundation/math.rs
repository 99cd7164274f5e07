//! Math utilities and types
//!
//! Provides the vector type used for body positions and velocities.

pub use nalgebra::Vector2;

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// Math utility functions
pub mod utils {
    /// Wrap a coordinate that left `[min, max]` onto the opposite edge
    ///
    /// Only a single crossing is handled; the coordinate jumps to the far edge
    /// rather than being taken modulo the range.
    pub fn wrap_edge(value: f32, min: f32, max: f32) -> f32 {
        if value < min {
            max
        } else if value > max {
            min
        } else {
            value
        }
    }

    /// Component-wise product of two vectors
    pub fn component_mul(a: super::Vec2, b: super::Vec2) -> super::Vec2 {
        a.component_mul(&b)
    }
}

#[cfg(test)]
mod tests {
    use super::utils::*;
    use super::Vec2;

    #[test]
    fn test_wrap_edge_jumps_to_opposite_side() {
        assert_eq!(wrap_edge(-0.5, 0.0, 800.0), 800.0);
        assert_eq!(wrap_edge(800.5, 0.0, 800.0), 0.0);
        assert_eq!(wrap_edge(400.0, 0.0, 800.0), 400.0);
    }

    #[test]
    fn test_component_mul() {
        let v = component_mul(Vec2::new(2.0, 3.0), Vec2::new(4.0, 0.5));
        assert_eq!(v, Vec2::new(8.0, 1.5));
    }
}

//! Motion integration
//!
//! Advances every body by one fixed step under the configured motion model and
//! keeps its box inside the world, so the broad-phase never has to clamp a
//! body that moved normally.

use log::trace;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::core::config::{MotionConfig, MotionModel};
use crate::foundation::math::{utils, Vec2};
use crate::foundation::rect::Rect;
use crate::physics::body::RigidBody;
use crate::physics::registry::BodyRegistry;

/// Explicit Euler integrator with world-boundary handling
#[derive(Debug, Clone)]
pub struct Integrator {
    config: MotionConfig,
    world: Rect,
    rng: StdRng,
}

impl Integrator {
    /// Create an integrator; `seed` drives the Brownian kicks
    pub fn new(config: MotionConfig, world: Rect, seed: u64) -> Self {
        Self {
            config,
            world,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Motion parameters in use
    pub fn config(&self) -> &MotionConfig {
        &self.config
    }

    /// Advance every body by `dt` seconds
    pub fn step(&mut self, registry: &mut BodyRegistry, dt: f32) {
        for (handle, body) in registry.iter_mut() {
            match self.config.model {
                MotionModel::Gravity => self.apply_gravity(body, dt),
                MotionModel::Brownian => self.apply_brownian(body, dt),
            }
            trace!("Body {:?} at {:?}", handle, body.position);
        }
    }

    fn apply_gravity(&self, body: &mut RigidBody, dt: f32) {
        let gravity = Vec2::new(0.0, self.config.gravity);
        body.velocity += gravity * dt;
        // Displacement comes from the applied force; velocity only tracks bounces
        body.position += body.force(gravity) * dt;

        let half = body.half_extents();
        let restitution = self.config.restitution;
        let (min, max) = world_extents(&self.world, half);

        if body.position.y >= max.y {
            body.position.y = max.y;
            body.velocity.y = -body.velocity.y * restitution;
        } else if body.position.y < min.y {
            body.position.y = min.y;
            body.velocity.y = -body.velocity.y * restitution;
        }

        if body.position.x < min.x {
            body.position.x = min.x;
            body.velocity.x = -body.velocity.x * restitution;
        } else if body.position.x > max.x {
            body.position.x = max.x;
            body.velocity.x = -body.velocity.x * restitution;
        }
    }

    fn apply_brownian(&mut self, body: &mut RigidBody, dt: f32) {
        let step = self.config.step_size;
        let kick = Vec2::new(
            self.rng.gen_range(-step..=step),
            self.rng.gen_range(-step..=step),
        );

        body.velocity = (body.velocity + kick) * self.config.viscosity;
        body.position += body.velocity * dt;

        let (min, max) = world_extents(&self.world, body.half_extents());
        body.position.x = utils::wrap_edge(body.position.x, min.x, max.x);
        body.position.y = utils::wrap_edge(body.position.y, min.y, max.y);
    }
}

/// Range of centre positions that keep a box with `half` extents in `world`
///
/// A body larger than the world is pinned to the world's centre on that axis.
pub(crate) fn world_extents(world: &Rect, half: Vec2) -> (Vec2, Vec2) {
    let center = world.center();
    let axis = |lo: f32, hi: f32, half: f32, mid: f32| {
        if hi - lo >= 2.0 * half {
            (lo + half, hi - half)
        } else {
            (mid, mid)
        }
    };

    let (min_x, max_x) = axis(world.x, world.right(), half.x, center.x);
    let (min_y, max_y) = axis(world.y, world.bottom(), half.y, center.y);
    (Vec2::new(min_x, min_y), Vec2::new(max_x, max_y))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn world() -> Rect {
        Rect::new(0.0, 0.0, 800.0, 600.0)
    }

    fn gravity_config() -> MotionConfig {
        MotionConfig {
            model: MotionModel::Gravity,
            ..MotionConfig::default()
        }
    }

    #[test]
    fn test_gravity_pulls_down() {
        let mut registry = BodyRegistry::new();
        let handle = registry.spawn(RigidBody::new(
            Vec2::new(400.0, 100.0),
            Vec2::new(20.0, 20.0),
            Vec2::new(1.0, 1.0),
        ));
        let mut integrator = Integrator::new(gravity_config(), world(), 1);

        integrator.step(&mut registry, 0.5);

        let body = registry.get(handle).unwrap();
        assert_relative_eq!(body.velocity.y, 1.0);
        // force (1.0 * 2.0) over half a second
        assert_relative_eq!(body.position.y, 101.0);
        assert_relative_eq!(body.position.x, 400.0);
    }

    #[test]
    fn test_floor_bounce_loses_energy() {
        let mut registry = BodyRegistry::new();
        let handle = registry.spawn(
            RigidBody::new(Vec2::new(400.0, 589.0), Vec2::new(20.0, 20.0), Vec2::new(1.0, 1.0))
                .with_velocity(Vec2::new(0.0, 10.0)),
        );
        let mut integrator = Integrator::new(gravity_config(), world(), 1);

        integrator.step(&mut registry, 1.0);

        let body = registry.get(handle).unwrap();
        assert_relative_eq!(body.position.y, 590.0);
        assert_relative_eq!(body.velocity.y, -12.0 * 0.8);
        assert!(world().contains_rect(&body.bounds()));
    }

    #[test]
    fn test_side_wall_reflects() {
        let mut registry = BodyRegistry::new();
        let handle = registry.spawn(
            RigidBody::new(Vec2::new(795.0, 300.0), Vec2::new(20.0, 20.0), Vec2::new(1.0, 1.0))
                .with_velocity(Vec2::new(10.0, 0.0)),
        );
        let mut integrator = Integrator::new(gravity_config(), world(), 1);

        integrator.step(&mut registry, 1.0);

        let body = registry.get(handle).unwrap();
        assert_relative_eq!(body.position.x, 790.0);
        assert_relative_eq!(body.velocity.x, -8.0);
    }

    #[test]
    fn test_heavier_body_falls_faster() {
        let mut registry = BodyRegistry::new();
        let light = registry.spawn(RigidBody::new(
            Vec2::new(100.0, 100.0),
            Vec2::new(10.0, 10.0),
            Vec2::new(1.0, 1.0),
        ));
        let heavy = registry.spawn(
            RigidBody::new(Vec2::new(300.0, 100.0), Vec2::new(10.0, 10.0), Vec2::new(1.0, 10.0))
                .with_velocity(Vec2::new(5.0, 0.0)),
        );
        let mut integrator = Integrator::new(gravity_config(), world(), 1);

        integrator.step(&mut registry, 0.25);

        assert_relative_eq!(registry.get(light).unwrap().position.y, 100.5);
        let heavy = registry.get(heavy).unwrap();
        assert_relative_eq!(heavy.position.y, 105.0);
        // velocity does not move the body under gravity
        assert_relative_eq!(heavy.position.x, 300.0);
    }

    #[test]
    fn test_brownian_wraps_and_stays_inside() {
        let config = MotionConfig {
            model: MotionModel::Brownian,
            ..MotionConfig::default()
        };
        let mut registry = BodyRegistry::new();
        let handle = registry.spawn(
            RigidBody::new(Vec2::new(3.0, 300.0), Vec2::new(4.0, 4.0), Vec2::new(1.0, 1.0))
                .with_velocity(Vec2::new(-100.0, 0.0)),
        );
        let mut integrator = Integrator::new(config, world(), 7);

        integrator.step(&mut registry, 1.0);

        let body = registry.get(handle).unwrap();
        assert_relative_eq!(body.position.x, 798.0);
        assert!(world().contains_rect(&body.bounds()));
    }

    #[test]
    fn test_brownian_is_reproducible_for_a_seed() {
        let config = MotionConfig {
            model: MotionModel::Brownian,
            ..MotionConfig::default()
        };
        let run = |seed| {
            let mut registry = BodyRegistry::new();
            let handle = registry.spawn(RigidBody::new(
                Vec2::new(400.0, 300.0),
                Vec2::new(4.0, 4.0),
                Vec2::new(1.0, 1.0),
            ));
            let mut integrator = Integrator::new(config.clone(), world(), seed);
            for _ in 0..10 {
                integrator.step(&mut registry, 1.0 / 60.0);
            }
            registry.get(handle).unwrap().position
        };

        assert_eq!(run(3), run(3));
    }

    #[test]
    fn test_oversized_body_is_pinned_to_centre() {
        let (min, max) = world_extents(&Rect::new(0.0, 0.0, 10.0, 10.0), Vec2::new(8.0, 2.0));
        assert_relative_eq!(min.x, 5.0);
        assert_relative_eq!(max.x, 5.0);
        assert_relative_eq!(min.y, 2.0);
        assert_relative_eq!(max.y, 8.0);
    }
}

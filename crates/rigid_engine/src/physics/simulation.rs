//! Simulation step driver
//!
//! Owns the body registry, the integrator and the collision system and runs
//! them in a fixed order every step: integrate, rebuild the broad-phase,
//! detect contacts.

use std::fmt;

use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;

use crate::config::ConfigError;
use crate::core::config::SimulationConfig;
use crate::foundation::collections::BodyHandle;
use crate::foundation::math::Vec2;
use crate::physics::body::RigidBody;
use crate::physics::collision_system::PhysicsCollisionSystem;
use crate::physics::integrator::{world_extents, Integrator};
use crate::physics::registry::BodyRegistry;
use crate::spatial::quadtree::SpatialError;
use crate::spatial::spatial_query::{QuadtreeSpatialQuery, SpatialQuery};

/// Simulation setup and step errors
#[derive(Error, Debug)]
pub enum SimulationError {
    /// Configuration rejected
    #[error("Invalid simulation configuration: {0}")]
    Config(#[from] ConfigError),

    /// Broad-phase construction or rebuild failed
    #[error("Broad-phase error: {0}")]
    Spatial(#[from] SpatialError),
}

/// Counters describing one simulation step
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepReport {
    /// Step number, starting at 1
    pub step: u64,
    /// Live bodies
    pub bodies: usize,
    /// Pairs proposed by the broad-phase
    pub candidate_pairs: usize,
    /// Pairs whose boxes overlap
    pub contacts: usize,
    /// Contacts that started this step
    pub entered: usize,
    /// Contacts that ended this step
    pub exited: usize,
    /// Boxes clamped to the world during the rebuild
    pub clamped: usize,
}

impl fmt::Display for StepReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "step {}: {} bodies, {} candidates, {} contacts (+{} / -{})",
            self.step, self.bodies, self.candidate_pairs, self.contacts, self.entered, self.exited
        )
    }
}

/// Rigid bodies moving in a bounded world with quadtree broad-phase
pub struct Simulation {
    config: SimulationConfig,
    registry: BodyRegistry,
    integrator: Integrator,
    collisions: PhysicsCollisionSystem,
    spawn_rng: StdRng,
    step_count: u64,
}

impl Simulation {
    /// Create an empty simulation backed by a quadtree
    pub fn new(config: SimulationConfig) -> Result<Self, SimulationError> {
        config.validate()?;
        let spatial =
            QuadtreeSpatialQuery::with_world(config.world.bounds(), config.quadtree.clone())?;
        Self::with_spatial_query(config, Box::new(spatial))
    }

    /// Create an empty simulation backed by any broad-phase structure
    pub fn with_spatial_query(
        config: SimulationConfig,
        spatial_query: Box<dyn SpatialQuery>,
    ) -> Result<Self, SimulationError> {
        config.validate()?;

        let integrator = Integrator::new(
            config.motion.clone(),
            config.world.bounds(),
            config.seed.wrapping_add(1),
        );

        Ok(Self {
            spawn_rng: StdRng::seed_from_u64(config.seed),
            registry: BodyRegistry::new(),
            integrator,
            collisions: PhysicsCollisionSystem::new(spatial_query),
            step_count: 0,
            config,
        })
    }

    /// Configuration in use
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Add a body
    pub fn spawn(&mut self, body: RigidBody) -> BodyHandle {
        self.registry.spawn(body)
    }

    /// Spawn `config.bodies.count` square bodies at random positions inside the world
    ///
    /// Edge lengths are rounded to whole units when the configured range allows it.
    pub fn spawn_random(&mut self) -> Vec<BodyHandle> {
        let spawn = self.config.bodies.clone();
        let world = self.config.world.bounds();

        let handles: Vec<BodyHandle> = (0..spawn.count)
            .map(|_| {
                let edge: f32 = self.spawn_rng.gen_range(spawn.min_size..=spawn.max_size);
                let edge = edge.round().clamp(spawn.min_size, spawn.max_size);
                let size = Vec2::new(edge, edge);
                let mass = Vec2::new(
                    self.spawn_rng.gen_range(spawn.min_mass..=spawn.max_mass),
                    self.spawn_rng.gen_range(spawn.min_mass..=spawn.max_mass),
                );

                let (min, max) = world_extents(&world, size * 0.5);
                let position = Vec2::new(
                    self.spawn_rng.gen_range(min.x..=max.x),
                    self.spawn_rng.gen_range(min.y..=max.y),
                );

                self.registry.spawn(RigidBody::new(position, size, mass))
            })
            .collect();

        info!("Spawned {} bodies in {:?}", handles.len(), world);
        handles
    }

    /// Remove a body from the registry and the broad-phase
    pub fn despawn(&mut self, handle: BodyHandle) -> Option<RigidBody> {
        let body = self.registry.despawn(handle)?;
        self.collisions.remove_body(handle);
        Some(body)
    }

    /// Advance one step using the configured timestep
    pub fn step_default(&mut self) -> Result<StepReport, SimulationError> {
        self.step(self.config.timestep)
    }

    /// Integrate, rebuild the broad-phase and detect contacts
    pub fn step(&mut self, dt: f32) -> Result<StepReport, SimulationError> {
        self.integrator.step(&mut self.registry, dt);
        let rebuild = self.collisions.rebuild(&self.registry)?;
        let contacts = self.collisions.detect_collisions(&self.registry).len();
        self.step_count += 1;

        let report = StepReport {
            step: self.step_count,
            bodies: self.registry.len(),
            candidate_pairs: self.collisions.last_candidate_count(),
            contacts,
            entered: self.collisions.collision_entered().len(),
            exited: self.collisions.collision_exited().len(),
            clamped: rebuild.clamped,
        };

        if let Some(spatial) = self
            .collisions
            .spatial_query()
            .as_any()
            .downcast_ref::<QuadtreeSpatialQuery>()
        {
            debug!("Quadtree after step {}: {:?}", self.step_count, spatial.quadtree().stats());
        }
        debug!("{}", report);

        Ok(report)
    }

    /// Steps taken so far
    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    /// Bodies in the simulation
    pub fn registry(&self) -> &BodyRegistry {
        &self.registry
    }

    /// Mutable access to the bodies
    pub fn registry_mut(&mut self) -> &mut BodyRegistry {
        &mut self.registry
    }

    /// Collision system with this step's contacts
    pub fn collision_system(&self) -> &PhysicsCollisionSystem {
        &self.collisions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::{MotionModel, QuadtreeConfig};
    use crate::spatial::spatial_query::BruteForceSpatialQuery;

    fn small_config() -> SimulationConfig {
        SimulationConfig::default().with_body_count(120).with_seed(11)
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = SimulationConfig::default();
        config.quadtree = QuadtreeConfig::default().with_max_bodies(0);

        let result = Simulation::new(config);
        assert!(matches!(result, Err(SimulationError::Config(_))));
    }

    #[test]
    fn test_non_finite_ranges_rejected_before_running() {
        let mut config = small_config().with_motion_model(MotionModel::Brownian);
        config.motion.step_size = f32::NAN;
        assert!(matches!(Simulation::new(config), Err(SimulationError::Config(_))));

        let mut config = small_config();
        config.bodies.min_size = f32::NAN;
        assert!(matches!(Simulation::new(config), Err(SimulationError::Config(_))));
    }

    #[test]
    fn test_spawn_random_stays_inside_world() {
        let mut simulation = Simulation::new(small_config()).unwrap();
        let handles = simulation.spawn_random();
        let world = simulation.config().world.bounds();

        assert_eq!(handles.len(), 120);
        for (_, body) in simulation.registry().iter() {
            assert!(world.contains_rect(&body.bounds()));
            assert!(body.size.x >= 20.0 && body.size.x <= 50.0);
            assert!(body.mass.x >= 1.0 && body.mass.y <= 100.0);
        }
    }

    #[test]
    fn test_step_reports_contacts() {
        let mut simulation = Simulation::new(small_config()).unwrap();
        simulation.spawn_random();

        for expected in 1..=5 {
            let report = simulation.step_default().unwrap();
            assert_eq!(report.step, expected);
            assert_eq!(report.bodies, 120);
            assert_eq!(report.clamped, 0);
            assert!(report.contacts <= report.candidate_pairs);
            assert_eq!(report.contacts, simulation.collision_system().current_collisions().len());
        }
    }

    #[test]
    fn test_quadtree_matches_brute_force() {
        for model in [MotionModel::Gravity, MotionModel::Brownian] {
            let config = small_config().with_motion_model(model);
            let mut quadtree = Simulation::new(config.clone()).unwrap();
            let mut reference =
                Simulation::with_spatial_query(config, Box::new(BruteForceSpatialQuery::new()))
                    .unwrap();
            quadtree.spawn_random();
            reference.spawn_random();

            for _ in 0..10 {
                let fast = quadtree.step_default().unwrap();
                let slow = reference.step_default().unwrap();

                assert_eq!(fast.contacts, slow.contacts);
                assert_eq!(
                    quadtree.collision_system().current_collisions(),
                    reference.collision_system().current_collisions()
                );
                assert!(fast.candidate_pairs <= slow.candidate_pairs);
            }
        }
    }

    #[test]
    fn test_despawn_removes_from_broad_phase() {
        let mut simulation = Simulation::new(small_config().with_body_count(10)).unwrap();
        let handles = simulation.spawn_random();
        simulation.step_default().unwrap();

        let removed = simulation.despawn(handles[3]);

        assert!(removed.is_some());
        assert!(simulation.despawn(handles[3]).is_none());
        assert_eq!(simulation.registry().len(), 9);
        assert_eq!(simulation.collision_system().spatial_query().body_count(), 9);
        assert_eq!(simulation.collision_system().spatial_query().bounds_of(handles[3]), None);
    }
}

//! # Simulation Configuration
//!
//! Serializable configuration for the broad-phase index, the world, body
//! spawning and motion. Every struct uses `#[serde(default)]`, so a config file
//! only needs to name the values it changes.
//!
//! ```toml
//! timestep = 0.016
//! steps = 300
//!
//! [world]
//! width = 800.0
//! height = 600.0
//!
//! [quadtree]
//! max_bodies_per_node = 4
//! ```

use serde::{Serialize, Deserialize};

use crate::config::{Config, ConfigError};
use crate::foundation::rect::Rect;

/// # Quadtree Configuration
///
/// Capacity policy for the broad-phase quadtree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuadtreeConfig {
    /// Maximum bodies stored in a leaf before it splits
    pub max_bodies_per_node: usize,

    /// Depth at which leaves stop splitting (root is depth 0)
    pub max_depth: u32,
}

impl QuadtreeConfig {
    /// Default leaf capacity
    pub const DEFAULT_MAX_BODIES: usize = 4;

    /// Default subdivision limit
    pub const DEFAULT_MAX_DEPTH: u32 = 8;

    /// Set the leaf capacity
    pub fn with_max_bodies(mut self, max_bodies: usize) -> Self {
        self.max_bodies_per_node = max_bodies;
        self
    }

    /// Set the subdivision limit
    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_bodies_per_node == 0 {
            return Err(ConfigError::Invalid(
                "max_bodies_per_node must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for QuadtreeConfig {
    fn default() -> Self {
        Self {
            max_bodies_per_node: Self::DEFAULT_MAX_BODIES,
            max_depth: Self::DEFAULT_MAX_DEPTH,
        }
    }
}

impl Config for QuadtreeConfig {}

/// # World Configuration
///
/// Fixed world rectangle; also the bounds of the quadtree root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Left edge
    pub x: f32,
    /// Top edge
    pub y: f32,
    /// World width
    pub width: f32,
    /// World height
    pub height: f32,
}

impl WorldConfig {
    /// World of the given size with its origin at (0, 0)
    pub fn new(width: f32, height: f32) -> Self {
        Self { x: 0.0, y: 0.0, width, height }
    }

    /// World bounds as a rectangle
    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let bounds = self.bounds();
        if !bounds.is_finite() || self.width <= 0.0 || self.height <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "world bounds must be finite with positive size, got {bounds:?}"
            )));
        }
        Ok(())
    }
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self::new(800.0, 600.0)
    }
}

/// Motion model applied by the integrator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MotionModel {
    /// Constant downward gravity with a bouncing floor and side walls
    Gravity,
    /// Random velocity kicks with viscous damping and wrap-around edges
    Brownian,
}

/// # Motion Configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    /// Which motion model drives the bodies
    pub model: MotionModel,

    /// Downward acceleration (gravity model)
    pub gravity: f32,

    /// Fraction of speed kept after bouncing off the floor or a wall
    pub restitution: f32,

    /// Half-width of the random velocity kick per axis (Brownian model)
    pub step_size: f32,

    /// Velocity damping factor applied every step (Brownian model)
    pub viscosity: f32,
}

impl MotionConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.gravity.is_finite() {
            return Err(ConfigError::Invalid(format!(
                "gravity must be finite, got {}",
                self.gravity
            )));
        }
        if !(0.0..=1.0).contains(&self.restitution) {
            return Err(ConfigError::Invalid(format!(
                "restitution must be within [0, 1], got {}",
                self.restitution
            )));
        }
        if !(0.0..=1.0).contains(&self.viscosity) {
            return Err(ConfigError::Invalid(format!(
                "viscosity must be within [0, 1], got {}",
                self.viscosity
            )));
        }
        // The kick range spans twice the step size
        if !(self.step_size >= 0.0 && (2.0 * self.step_size).is_finite()) {
            return Err(ConfigError::Invalid(format!(
                "step_size must be finite and not negative, got {}",
                self.step_size
            )));
        }
        Ok(())
    }
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            model: MotionModel::Gravity,
            gravity: 2.0,
            restitution: 0.8,
            step_size: 1.0,
            viscosity: 0.99,
        }
    }
}

/// # Body Spawn Configuration
///
/// Ranges for randomly spawned square bodies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BodySpawnConfig {
    /// Number of bodies to spawn
    pub count: usize,
    /// Smallest edge length
    pub min_size: f32,
    /// Largest edge length
    pub max_size: f32,
    /// Smallest per-axis mass
    pub min_mass: f32,
    /// Largest per-axis mass
    pub max_mass: f32,
}

impl BodySpawnConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let bounds = [self.min_size, self.max_size, self.min_mass, self.max_mass];
        if !bounds.iter().all(|value| value.is_finite()) {
            return Err(ConfigError::Invalid(format!(
                "size and mass ranges must be finite, got sizes [{}, {}] and masses [{}, {}]",
                self.min_size, self.max_size, self.min_mass, self.max_mass
            )));
        }
        if self.min_size < 0.0 || self.min_size > self.max_size {
            return Err(ConfigError::Invalid(format!(
                "size range [{}, {}] is empty or negative",
                self.min_size, self.max_size
            )));
        }
        if self.min_mass <= 0.0 || self.min_mass > self.max_mass {
            return Err(ConfigError::Invalid(format!(
                "mass range [{}, {}] is empty or not positive",
                self.min_mass, self.max_mass
            )));
        }
        Ok(())
    }
}

impl Default for BodySpawnConfig {
    fn default() -> Self {
        Self {
            count: 500,
            min_size: 20.0,
            max_size: 50.0,
            min_mass: 1.0,
            max_mass: 100.0,
        }
    }
}

/// # Simulation Configuration
///
/// Everything needed to set up and run a simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// World bounds
    pub world: WorldConfig,
    /// Broad-phase capacity policy
    pub quadtree: QuadtreeConfig,
    /// Motion model parameters
    pub motion: MotionConfig,
    /// Body spawning ranges
    pub bodies: BodySpawnConfig,
    /// Fixed step length in seconds
    pub timestep: f32,
    /// Number of steps the demo runs
    pub steps: u32,
    /// Seed for spawning and Brownian kicks
    pub seed: u64,
}

impl SimulationConfig {
    /// Set the world size
    pub fn with_world(mut self, width: f32, height: f32) -> Self {
        self.world = WorldConfig::new(width, height);
        self
    }

    /// Set the motion model
    pub fn with_motion_model(mut self, model: MotionModel) -> Self {
        self.motion.model = model;
        self
    }

    /// Set the number of bodies to spawn
    pub fn with_body_count(mut self, count: usize) -> Self {
        self.bodies.count = count;
        self
    }

    /// Set the random seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Validate every section
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.world.validate()?;
        self.quadtree.validate()?;
        self.motion.validate()?;
        self.bodies.validate()?;

        if !(self.timestep.is_finite() && self.timestep > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "timestep must be positive, got {}",
                self.timestep
            )));
        }
        Ok(())
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            world: WorldConfig::default(),
            quadtree: QuadtreeConfig::default(),
            motion: MotionConfig::default(),
            bodies: BodySpawnConfig::default(),
            timestep: 1.0 / 60.0,
            steps: 600,
            seed: 42,
        }
    }
}

impl Config for SimulationConfig {}

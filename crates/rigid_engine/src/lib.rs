//! # Rigid Engine
//!
//! 2D rigid-body simulation with a quadtree broad-phase for collision
//! detection.
//!
//! ## Features
//!
//! - **Quadtree Broad-Phase**: Straddler-aware region quadtree with unique pair enumeration
//! - **Pluggable Spatial Queries**: Collision system written against the `SpatialQuery` trait
//! - **Motion Models**: Gravity with bouncing walls, or Brownian motion with wrap-around
//! - **Serializable Configuration**: TOML and RON config files
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use rigid_engine::prelude::*;
//!
//! fn main() -> Result<(), SimulationError> {
//!     let config = SimulationConfig::default().with_body_count(200);
//!     let mut simulation = Simulation::new(config)?;
//!     simulation.spawn_random();
//!
//!     for _ in 0..60 {
//!         let report = simulation.step(1.0 / 60.0)?;
//!         println!("{report}");
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::cast_precision_loss)]

pub mod config;
pub mod core;
pub mod foundation;
pub mod physics;
pub mod spatial;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        config::{Config, ConfigError},
        core::config::{
            BodySpawnConfig, MotionConfig, MotionModel, QuadtreeConfig, SimulationConfig,
            WorldConfig,
        },
        foundation::{
            collections::BodyHandle,
            math::Vec2,
            rect::{Quadrant, Rect},
        },
        physics::{
            BodyRegistry, BroadPhaseMode, PhysicsCollisionSystem, RigidBody, Simulation,
            SimulationError, StepReport,
        },
        spatial::{
            BruteForceSpatialQuery, CandidatePair, Placement, Quadtree, QuadtreeSpatialQuery,
            SpatialError, SpatialQuery,
        },
    };
}

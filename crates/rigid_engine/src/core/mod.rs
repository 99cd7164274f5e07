//! # Core Engine Module
//!
//! Shared configuration types used by the spatial index, the physics step and
//! the demo application.

pub mod config;

pub use config::{
    BodySpawnConfig,
    MotionConfig,
    MotionModel,
    QuadtreeConfig,
    SimulationConfig,
    WorldConfig,
};

//! Physics module for rigid-body motion and collision detection
//!
//! Bodies live in a `BodyRegistry`; the `Integrator` moves them, and the
//! `PhysicsCollisionSystem` finds overlapping pairs through a quadtree
//! broad-phase. `Simulation` drives all three.

pub mod body;
pub mod collision_system;
pub mod integrator;
pub mod registry;
pub mod simulation;

pub use body::RigidBody;
pub use collision_system::{BroadPhaseMode, CollisionPair, PhysicsCollisionSystem};
pub use integrator::Integrator;
pub use registry::BodyRegistry;
pub use simulation::{Simulation, SimulationError, StepReport};

//! Spatial partitioning data structures
//!
//! Provides the quadtree broad-phase index for 2D collision detection and the
//! `SpatialQuery` abstraction the collision system is written against.

pub mod pairs;
pub mod quadtree;
pub mod region_query;
pub mod spatial_query;

pub use pairs::CandidatePair;
pub use quadtree::{
    Placement, Quadtree, QuadtreeEntry, QuadtreeNode, QuadtreeStats, RebuildReport, SpatialError,
};
pub use region_query::RegionQuery;
pub use spatial_query::{BruteForceSpatialQuery, QuadtreeSpatialQuery, SpatialQuery};

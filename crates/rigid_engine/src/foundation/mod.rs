//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the engine:
//! - Math types and the axis-aligned `Rect`
//! - Handle collections for stable body references
//! - Logging utilities

pub mod math;
pub mod rect;
pub mod collections;
pub mod logging;

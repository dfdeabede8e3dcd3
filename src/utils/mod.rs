//! # Utilities Module
//!
//! Graph traversal and scoring helpers shared across the crate.

pub mod math;
pub mod pathfinding;

pub use self::math::*;
pub use self::pathfinding::*;

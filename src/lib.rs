//! # Delve
//!
//! Procedural dungeon layouts with structural validation and quality scoring.
//!
//! ## Architecture Overview
//!
//! A dungeon is a bounded 2-D map holding non-overlapping rectangular regions
//! (spawn, combat, treasure, boss, safe) joined into a single reachable graph.
//! The crate is organised around a one-way pipeline:
//!
//! - **Generation**: region placement, role assignment, spanning-tree
//!   connectivity, an optional shortcut layer, difficulty progression and
//!   corridor synthesis
//! - **Dungeon**: the immutable `Map` snapshot and its persistence format
//! - **Analysis**: structural validation and weighted quality scoring
//! - **Utilities**: breadth-first path finding and cycle detection shared by
//!   every consumer of a finished map
//!
//! ```
//! use delve::{generate, GenerationConfig, QualityAnalyzer};
//!
//! let generated = generate(&GenerationConfig::for_testing(42)).unwrap();
//! let report = QualityAnalyzer::new().analyze(&generated.map);
//! assert!(report.overall >= 0.0 && report.overall <= 100.0);
//! ```

pub mod analysis;
pub mod dungeon;
pub mod generation;
pub mod utils;

// Core module re-exports
pub use analysis::*;
pub use dungeon::*;
pub use generation::*;
pub use utils::{PathFinder, RegionGraph};

/// Core error type for the Delve crate.
#[derive(thiserror::Error, Debug)]
pub enum DelveError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Generation config is outside the documented bounds
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// Placement ran out of attempts before reaching the requested count
    #[error("Placement exhausted: placed {placed} of {requested} regions")]
    PlacementExhausted { requested: usize, placed: usize },

    /// A connection references a missing region or loops onto itself
    #[error("Graph integrity violated: {0}")]
    GraphIntegrity(String),

    /// Generation failed
    #[error("Generation failed: {0}")]
    GenerationFailed(String),
}

/// Result type used throughout the Delve codebase.
pub type DelveResult<T> = Result<T, DelveError>;

/// Version information for the crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Structural limits and weights.
pub mod config {
    /// Smallest allowed map edge
    pub const MIN_MAP_SIZE: u32 = 800;
    /// Largest allowed map edge
    pub const MAX_MAP_SIZE: u32 = 2000;

    /// Smallest allowed region edge
    pub const MIN_REGION_SIZE: u32 = 100;
    /// Largest allowed region edge
    pub const MAX_REGION_SIZE: u32 = 500;

    pub const MIN_ROOM_COUNT: usize = 3;
    pub const MAX_ROOM_COUNT: usize = 10;

    pub const MIN_DIFFICULTY: u32 = 1;
    pub const MAX_DIFFICULTY: u32 = 10;

    pub const MIN_LEVEL: u32 = 1;
    pub const MAX_LEVEL: u32 = 100;

    /// Smallest allowed gap between two region boundaries
    pub const MIN_REGION_SPACING: f64 = 50.0;
    /// Largest allowed gap between two region boundaries
    pub const MAX_REGION_SPACING: f64 = 200.0;

    pub const MIN_DENSITY: f64 = 0.1;
    pub const MAX_DENSITY: f64 = 0.9;

    pub const MIN_CONNECTIVITY: f64 = 0.1;
    pub const MAX_CONNECTIVITY: f64 = 1.0;

    pub const MIN_COMPLEXITY: f64 = 2.0;
    pub const MAX_COMPLEXITY: f64 = 30.0;

    pub const COMPLEXITY_REGION_WEIGHT: f64 = 0.4;
    pub const COMPLEXITY_CONNECTION_WEIGHT: f64 = 0.3;
    pub const COMPLEXITY_DIFFICULTY_WEIGHT: f64 = 0.2;
    pub const COMPLEXITY_LEVEL_WEIGHT: f64 = 0.1;

    /// Placement attempts granted per requested region
    pub const PLACEMENT_ATTEMPTS_PER_REGION: usize = 3;
}

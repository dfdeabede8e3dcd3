//! # Generation Module
//!
//! Procedural layout generation for dungeon maps.
//!
//! The pipeline runs in a fixed order and every stage is deterministic for a
//! given seed:
//!
//! 1. [`RegionPlacer`] samples non-overlapping rectangles
//! 2. [`RegionRoleAssigner`] tags them with gameplay roles
//! 3. [`ConnectivityBuilder`] links them with a spanning tree, and
//!    [`ShortcutLayer`] optionally adds secret passages and teleporters
//! 4. [`DifficultyProgression`] raises difficulty with depth from the spawn
//! 5. [`CorridorSynthesizer`] derives presentation corridors
//!
//! The finished map is validated before it is handed out.

pub mod connectivity;
pub mod corridors;
pub mod placement;
pub mod progression;
pub mod roles;
pub mod search;

pub use connectivity::*;
pub use corridors::*;
pub use placement::*;
pub use progression::*;
pub use roles::*;
pub use search::*;

use crate::{
    config, DelveError, DelveResult, GraphValidator, Map, MapHeader, MapKind, Size,
    ValidationReport,
};
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Configuration for procedural generation.
///
/// Sizes are in map units. Every field is checked by [`validate`] before
/// generation starts.
///
/// [`validate`]: GenerationConfig::validate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Identifier given to the generated map
    pub map_id: Uuid,
    #[serde(default)]
    pub kind: MapKind,
    /// Random seed for reproducible generation
    pub seed: u64,
    pub width: u32,
    pub height: u32,
    /// Number of regions to place
    pub room_count: usize,
    /// Minimum region edge
    pub min_room_size: u32,
    /// Maximum region edge
    pub max_room_size: u32,
    pub difficulty: u32,
    pub level: u32,
    /// Shortcuts added per region by the optional layer (0.0 to 1.0)
    pub extra_connection_chance: f64,
    /// Share of shortcuts that become teleporters (0.0 to 1.0)
    pub teleport_chance: f64,
}

impl GenerationConfig {
    /// Creates a default generation configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::GenerationConfig;
    ///
    /// let config = GenerationConfig::default();
    /// assert!(config.min_room_size >= 100);
    /// assert!(config.max_room_size >= config.min_room_size);
    /// assert!(config.validate().is_ok());
    /// ```
    pub fn new(seed: u64) -> Self {
        Self {
            map_id: Uuid::new_v4(),
            kind: MapKind::Dungeon,
            seed,
            width: 1200,
            height: 1200,
            room_count: 8,
            min_room_size: 100,
            max_room_size: 220,
            difficulty: 3,
            level: 1,
            extra_connection_chance: 0.15,
            teleport_chance: 0.3,
        }
    }

    /// Creates a configuration for testing with small maps and no shortcuts.
    pub fn for_testing(seed: u64) -> Self {
        Self {
            map_id: Uuid::new_v4(),
            kind: MapKind::Dungeon,
            seed,
            width: 800,
            height: 800,
            room_count: 5,
            min_room_size: 100,
            max_room_size: 200,
            difficulty: 1,
            level: 1,
            extra_connection_chance: 0.0,
            teleport_chance: 0.0,
        }
    }

    /// Creates a configuration for large, dense and hard maps.
    pub fn for_detailed_generation(seed: u64) -> Self {
        Self {
            map_id: Uuid::new_v4(),
            kind: MapKind::Dungeon,
            seed,
            width: 1600,
            height: 1600,
            room_count: 10,
            min_room_size: 120,
            max_room_size: 300,
            difficulty: 6,
            level: 25,
            extra_connection_chance: 0.25,
            teleport_chance: 0.4,
        }
    }

    /// Same config with another seed.
    pub fn with_seed(&self, seed: u64) -> Self {
        Self {
            seed,
            ..self.clone()
        }
    }

    /// Checks every field against the structural limits.
    pub fn validate(&self) -> DelveResult<()> {
        let in_map_range =
            |value: u32| (config::MIN_MAP_SIZE..=config::MAX_MAP_SIZE).contains(&value);
        if !in_map_range(self.width) || !in_map_range(self.height) {
            return Err(DelveError::Configuration(format!(
                "map size {}x{} outside [{}, {}]",
                self.width,
                self.height,
                config::MIN_MAP_SIZE,
                config::MAX_MAP_SIZE
            )));
        }

        if !(config::MIN_ROOM_COUNT..=config::MAX_ROOM_COUNT).contains(&self.room_count) {
            return Err(DelveError::Configuration(format!(
                "room count {} outside [{}, {}]",
                self.room_count,
                config::MIN_ROOM_COUNT,
                config::MAX_ROOM_COUNT
            )));
        }

        if self.min_room_size < config::MIN_REGION_SIZE
            || self.max_room_size > config::MAX_REGION_SIZE
        {
            return Err(DelveError::Configuration(format!(
                "room sizes {}..={} outside [{}, {}]",
                self.min_room_size,
                self.max_room_size,
                config::MIN_REGION_SIZE,
                config::MAX_REGION_SIZE
            )));
        }

        if self.min_room_size > self.max_room_size {
            return Err(DelveError::Configuration(format!(
                "min room size {} exceeds max room size {}",
                self.min_room_size, self.max_room_size
            )));
        }

        if self.max_room_size > self.width.min(self.height) {
            return Err(DelveError::Configuration(format!(
                "max room size {} does not fit a {}x{} map",
                self.max_room_size, self.width, self.height
            )));
        }

        if !(config::MIN_DIFFICULTY..=config::MAX_DIFFICULTY).contains(&self.difficulty) {
            return Err(DelveError::Configuration(format!(
                "difficulty {} outside [{}, {}]",
                self.difficulty,
                config::MIN_DIFFICULTY,
                config::MAX_DIFFICULTY
            )));
        }

        if !(config::MIN_LEVEL..=config::MAX_LEVEL).contains(&self.level) {
            return Err(DelveError::Configuration(format!(
                "level {} outside [{}, {}]",
                self.level,
                config::MIN_LEVEL,
                config::MAX_LEVEL
            )));
        }

        for (name, chance) in [
            ("extra connection chance", self.extra_connection_chance),
            ("teleport chance", self.teleport_chance),
        ] {
            if !(0.0..=1.0).contains(&chance) {
                return Err(DelveError::Configuration(format!(
                    "{} {} outside [0, 1]",
                    name, chance
                )));
            }
        }

        Ok(())
    }

    /// Header for the map built from this config.
    pub fn header(&self) -> MapHeader {
        MapHeader {
            id: self.map_id,
            kind: self.kind,
            name: format!("{:?} depth {} (seed {})", self.kind, self.level, self.seed),
            size: Size::new(self.width, self.height),
            level: self.level,
            difficulty: self.difficulty,
        }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self::new(42)
    }
}

/// Trait for procedural generators.
pub trait Generator<T> {
    /// Generates content using the provided configuration and random number generator.
    fn generate(&self, config: &GenerationConfig, rng: &mut StdRng) -> DelveResult<T>;

    /// Gets the generator type name for logging and debugging.
    fn generator_type(&self) -> &'static str;
}

/// Creates a seeded random number generator from the config.
pub fn create_rng(config: &GenerationConfig) -> StdRng {
    StdRng::seed_from_u64(config.seed)
}

/// Non-fatal problems met while generating.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerationWarning {
    #[error("placement exhausted: placed {placed} of {requested} regions")]
    PlacementExhausted { requested: usize, placed: usize },
}

impl From<GenerationWarning> for DelveError {
    fn from(warning: GenerationWarning) -> Self {
        match warning {
            GenerationWarning::PlacementExhausted { requested, placed } => {
                DelveError::PlacementExhausted { requested, placed }
            }
        }
    }
}

/// A map together with its validation report and any warnings.
#[derive(Debug, Clone)]
pub struct GeneratedMap {
    pub map: Map,
    pub validation: ValidationReport,
    pub warnings: Vec<GenerationWarning>,
    /// Seed the map was built from
    pub seed: u64,
}

impl GeneratedMap {
    /// True when validation found no error-severity violations.
    pub fn is_acceptable(&self) -> bool {
        self.validation.is_acceptable()
    }
}

impl fmt::Display for GeneratedMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} regions, {} connections, {} errors, {} warnings)",
            self.map.name(),
            self.map.regions().len(),
            self.map.connections().len(),
            self.validation.errors().count(),
            self.validation.warnings().count() + self.warnings.len()
        )
    }
}

/// Full generation pipeline producing validated maps.
#[derive(Debug, Clone, Default)]
pub struct DungeonGenerator {
    placer: RegionPlacer,
    assigner: RegionRoleAssigner,
    connector: ConnectivityBuilder,
    progression: DifficultyProgression,
    corridors: CorridorSynthesizer,
    validator: GraphValidator,
}

impl DungeonGenerator {
    /// Creates a generator with default stages.
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses a custom validator for the final check.
    pub fn with_validator(mut self, validator: GraphValidator) -> Self {
        self.validator = validator;
        self
    }

    fn build(&self, config: &GenerationConfig, rng: &mut StdRng) -> DelveResult<GeneratedMap> {
        config.validate()?;
        let mut warnings = Vec::new();

        let placement = self.placer.place(&PlacementConfig::from(config), rng);
        if placement.is_exhausted() {
            let warning = GenerationWarning::PlacementExhausted {
                requested: placement.requested,
                placed: placement.rects.len(),
            };
            warn!("{}", warning);
            warnings.push(warning);
        }

        let mut regions = self.assigner.assign(placement.rects, config.difficulty, config.level);
        let mut connections = self.connector.connect(&regions);
        ShortcutLayer::from(config).apply(&regions, &mut connections, rng);
        self.progression.apply(&mut regions, &mut connections, config.difficulty);

        let corridors = self.corridors.synthesize(&connections, &regions)?;
        debug!("Synthesized {} corridors", corridors.len());

        let map = Map::new(config.header(), regions, connections).with_corridors(corridors);
        let validation = self.validator.validate(&map);

        debug_assert!(
            validation.integrity_violations().next().is_none(),
            "generated map broke graph integrity: {}",
            validation
        );

        info!(
            "Generated '{}' with {} regions and {} connections ({} errors, {} warnings)",
            map.name(),
            map.regions().len(),
            map.connections().len(),
            validation.errors().count(),
            validation.warnings().count()
        );

        Ok(GeneratedMap {
            map,
            validation,
            warnings,
            seed: config.seed,
        })
    }
}

impl Generator<GeneratedMap> for DungeonGenerator {
    fn generate(&self, config: &GenerationConfig, rng: &mut StdRng) -> DelveResult<GeneratedMap> {
        self.build(config, rng)
    }

    fn generator_type(&self) -> &'static str {
        "DungeonGenerator"
    }
}

/// Generates a map from a config using its own seed.
///
/// # Examples
///
/// ```
/// use delve::{generate, GenerationConfig};
///
/// let config = GenerationConfig::for_testing(42);
/// let first = generate(&config).unwrap();
/// let second = generate(&config).unwrap();
/// assert_eq!(first.map.regions(), second.map.regions());
/// ```
pub fn generate(config: &GenerationConfig) -> DelveResult<GeneratedMap> {
    let mut rng = create_rng(config);
    DungeonGenerator::new().generate(config, &mut rng)
}

//! # Structural Validation
//!
//! Checks a finished map against every structural rule and reports all
//! problems at once. Validation never fails; it always returns a report.

use crate::{config, ConnectionId, Map, PathFinder, RegionGraph, RegionId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// How serious a violation is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    Warning,
    Error,
}

/// The rule a violation belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValidationCheck {
    MapSize,
    RegionCount,
    DifficultyAndLevel,
    RegionGeometry,
    ConnectionIntegrity,
    Overlap,
    Spacing,
    IncidentConnections,
    Reachability,
    StructuralMetrics,
    Roles,
}

/// One broken rule.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Violation {
    #[error("map size {width}x{height} outside [{min}, {max}]")]
    MapSizeOutOfRange {
        width: u32,
        height: u32,
        min: u32,
        max: u32,
    },

    #[error("region count {count} outside [{min}, {max}]")]
    RegionCountOutOfRange {
        count: usize,
        min: usize,
        max: usize,
    },

    #[error("map difficulty {value} outside [{min}, {max}]")]
    DifficultyOutOfRange { value: u32, min: u32, max: u32 },

    #[error("map level {value} outside [{min}, {max}]")]
    LevelOutOfRange { value: u32, min: u32, max: u32 },

    #[error("region {region} is {width}x{height}, outside [{min}, {max}]")]
    RegionSizeOutOfRange {
        region: RegionId,
        width: u32,
        height: u32,
        min: u32,
        max: u32,
    },

    #[error("region {region} extends outside the map")]
    RegionOutOfBounds { region: RegionId },

    #[error("region id {region} is used more than once")]
    DuplicateRegionId { region: RegionId },

    #[error("connection {connection} references missing region {region}")]
    DanglingConnection {
        connection: ConnectionId,
        region: RegionId,
    },

    #[error("connection {connection} links {region} to itself")]
    SelfLoop {
        connection: ConnectionId,
        region: RegionId,
    },

    #[error("connection id {connection} is used more than once")]
    DuplicateConnectionId { connection: ConnectionId },

    #[error("connection {connection} repeats the pair {first}-{second}")]
    DuplicateConnectionPair {
        connection: ConnectionId,
        first: RegionId,
        second: RegionId,
    },

    #[error("regions {first} and {second} overlap")]
    RegionOverlap { first: RegionId, second: RegionId },

    #[error("regions {first} and {second} are {spacing:.1} apart, outside [{min}, {max}]")]
    SpacingOutOfRange {
        first: RegionId,
        second: RegionId,
        spacing: f64,
        min: f64,
        max: f64,
    },

    #[error("region {region} has no connections")]
    IsolatedRegion { region: RegionId },

    #[error("region {region} is unreachable from {origin}")]
    UnreachableRegion { region: RegionId, origin: RegionId },

    #[error("density {value:.3} outside [{min}, {max}]")]
    DensityOutOfRange { value: f64, min: f64, max: f64 },

    #[error("connectivity ratio {value:.3} outside [{min}, {max}]")]
    ConnectivityOutOfRange { value: f64, min: f64, max: f64 },

    #[error("complexity score {value:.2} outside [{min}, {max}]")]
    ComplexityOutOfRange { value: f64, min: f64, max: f64 },

    #[error("expected exactly one spawn region, found {count}")]
    SpawnCount { count: usize },

    #[error("map has no boss region")]
    MissingBoss,
}

impl Violation {
    /// Rule this violation belongs to.
    pub fn check(&self) -> ValidationCheck {
        use Violation::*;
        match self {
            MapSizeOutOfRange { .. } => ValidationCheck::MapSize,
            RegionCountOutOfRange { .. } => ValidationCheck::RegionCount,
            DifficultyOutOfRange { .. } | LevelOutOfRange { .. } => {
                ValidationCheck::DifficultyAndLevel
            }
            RegionSizeOutOfRange { .. } | RegionOutOfBounds { .. } | DuplicateRegionId { .. } => {
                ValidationCheck::RegionGeometry
            }
            DanglingConnection { .. }
            | SelfLoop { .. }
            | DuplicateConnectionId { .. }
            | DuplicateConnectionPair { .. } => ValidationCheck::ConnectionIntegrity,
            RegionOverlap { .. } => ValidationCheck::Overlap,
            SpacingOutOfRange { .. } => ValidationCheck::Spacing,
            IsolatedRegion { .. } => ValidationCheck::IncidentConnections,
            UnreachableRegion { .. } => ValidationCheck::Reachability,
            DensityOutOfRange { .. }
            | ConnectivityOutOfRange { .. }
            | ComplexityOutOfRange { .. } => ValidationCheck::StructuralMetrics,
            SpawnCount { .. } | MissingBoss => ValidationCheck::Roles,
        }
    }

    /// Spacing problems are warnings; everything else is an error.
    pub fn severity(&self) -> Severity {
        match self.check() {
            ValidationCheck::Spacing => Severity::Warning,
            _ => Severity::Error,
        }
    }

    /// Whether the violation means the graph references something that
    /// is not there.
    pub fn is_integrity(&self) -> bool {
        matches!(
            self,
            Violation::DanglingConnection { .. } | Violation::SelfLoop { .. }
        )
    }

    /// Regions named by this violation.
    pub fn region_ids(&self) -> Vec<RegionId> {
        use Violation::*;
        match self {
            RegionSizeOutOfRange { region, .. }
            | RegionOutOfBounds { region }
            | DuplicateRegionId { region }
            | DanglingConnection { region, .. }
            | SelfLoop { region, .. }
            | IsolatedRegion { region }
            | UnreachableRegion { region, .. } => vec![*region],
            DuplicateConnectionPair { first, second, .. }
            | RegionOverlap { first, second }
            | SpacingOutOfRange { first, second, .. } => vec![*first, *second],
            _ => Vec::new(),
        }
    }
}

/// Which region pairs the spacing rule applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SpacingScope {
    /// Every pair of regions
    #[default]
    AllPairs,
    /// Only pairs joined by a connection
    ConnectedPairs,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ValidatorOptions {
    pub spacing_scope: SpacingScope,
}

/// Every violation found in one map.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationReport {
    pub violations: Vec<Violation>,
}

impl ValidationReport {
    /// No error-severity violations.
    pub fn is_acceptable(&self) -> bool {
        self.errors().next().is_none()
    }

    /// No violations of any severity.
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn errors(&self) -> impl Iterator<Item = &Violation> + '_ {
        self.violations.iter().filter(|v| v.severity() == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Violation> + '_ {
        self.violations.iter().filter(|v| v.severity() == Severity::Warning)
    }

    pub fn integrity_violations(&self) -> impl Iterator<Item = &Violation> + '_ {
        self.violations.iter().filter(|v| v.is_integrity())
    }

    /// Violations belonging to one rule.
    pub fn for_check(&self, check: ValidationCheck) -> impl Iterator<Item = &Violation> + '_ {
        self.violations.iter().filter(move |v| v.check() == check)
    }

    pub fn has(&self, check: ValidationCheck) -> bool {
        self.for_check(check).next().is_some()
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.violations.is_empty() {
            return write!(f, "no violations");
        }
        for (index, violation) in self.violations.iter().enumerate() {
            if index > 0 {
                writeln!(f)?;
            }
            write!(f, "[{:?}] {}", violation.severity(), violation)?;
        }
        Ok(())
    }
}

/// Runs the structural checks on a map.
#[derive(Debug, Clone, Default)]
pub struct GraphValidator {
    options: ValidatorOptions,
}

impl GraphValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ValidatorOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> ValidatorOptions {
        self.options
    }

    /// Validates a map and returns every violation found.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::{generate, GenerationConfig, GraphValidator};
    ///
    /// let generated = generate(&GenerationConfig::for_testing(1)).unwrap();
    /// let report = GraphValidator::new().validate(&generated.map);
    /// assert!(report.integrity_violations().next().is_none());
    /// ```
    pub fn validate(&self, map: &Map) -> ValidationReport {
        let mut violations = Vec::new();

        self.check_map_size(map, &mut violations);
        self.check_region_count(map, &mut violations);
        self.check_difficulty_and_level(map, &mut violations);
        self.check_region_geometry(map, &mut violations);
        self.check_connection_integrity(map, &mut violations);
        self.check_overlap(map, &mut violations);
        self.check_spacing(map, &mut violations);
        self.check_incident_connections(map, &mut violations);
        self.check_reachability(map, &mut violations);
        self.check_structural_metrics(map, &mut violations);
        self.check_roles(map, &mut violations);

        ValidationReport { violations }
    }

    fn check_map_size(&self, map: &Map, out: &mut Vec<Violation>) {
        let size = map.size();
        let range = config::MIN_MAP_SIZE..=config::MAX_MAP_SIZE;
        if !range.contains(&size.width) || !range.contains(&size.height) {
            out.push(Violation::MapSizeOutOfRange {
                width: size.width,
                height: size.height,
                min: config::MIN_MAP_SIZE,
                max: config::MAX_MAP_SIZE,
            });
        }
    }

    fn check_region_count(&self, map: &Map, out: &mut Vec<Violation>) {
        let count = map.regions().len();
        if !(config::MIN_ROOM_COUNT..=config::MAX_ROOM_COUNT).contains(&count) {
            out.push(Violation::RegionCountOutOfRange {
                count,
                min: config::MIN_ROOM_COUNT,
                max: config::MAX_ROOM_COUNT,
            });
        }
    }

    fn check_difficulty_and_level(&self, map: &Map, out: &mut Vec<Violation>) {
        if !(config::MIN_DIFFICULTY..=config::MAX_DIFFICULTY).contains(&map.difficulty()) {
            out.push(Violation::DifficultyOutOfRange {
                value: map.difficulty(),
                min: config::MIN_DIFFICULTY,
                max: config::MAX_DIFFICULTY,
            });
        }
        if !(config::MIN_LEVEL..=config::MAX_LEVEL).contains(&map.level()) {
            out.push(Violation::LevelOutOfRange {
                value: map.level(),
                min: config::MIN_LEVEL,
                max: config::MAX_LEVEL,
            });
        }
    }

    fn check_region_geometry(&self, map: &Map, out: &mut Vec<Violation>) {
        let bounds = map.bounds();
        let sizes = config::MIN_REGION_SIZE..=config::MAX_REGION_SIZE;
        let mut seen = HashSet::new();

        for region in map.regions() {
            let rect = region.rect;
            if !sizes.contains(&rect.width) || !sizes.contains(&rect.height) {
                out.push(Violation::RegionSizeOutOfRange {
                    region: region.id,
                    width: rect.width,
                    height: rect.height,
                    min: config::MIN_REGION_SIZE,
                    max: config::MAX_REGION_SIZE,
                });
            }
            if !bounds.contains_rect(&rect) {
                out.push(Violation::RegionOutOfBounds { region: region.id });
            }
            if !seen.insert(region.id) {
                out.push(Violation::DuplicateRegionId { region: region.id });
            }
        }
    }

    fn check_connection_integrity(&self, map: &Map, out: &mut Vec<Violation>) {
        let mut ids = HashSet::new();
        let mut pairs = HashSet::new();

        for conn in map.connections() {
            if !ids.insert(conn.id) {
                out.push(Violation::DuplicateConnectionId {
                    connection: conn.id,
                });
            }

            for endpoint in [conn.source, conn.target] {
                if !map.contains_region(endpoint) {
                    out.push(Violation::DanglingConnection {
                        connection: conn.id,
                        region: endpoint,
                    });
                }
            }

            if conn.is_self_loop() {
                out.push(Violation::SelfLoop {
                    connection: conn.id,
                    region: conn.source,
                });
            } else if !pairs.insert(conn.endpoint_key()) {
                let (first, second) = conn.endpoint_key();
                out.push(Violation::DuplicateConnectionPair {
                    connection: conn.id,
                    first,
                    second,
                });
            }
        }
    }

    fn check_overlap(&self, map: &Map, out: &mut Vec<Violation>) {
        let regions = map.regions();
        for (i, a) in regions.iter().enumerate() {
            for b in &regions[i + 1..] {
                if a.overlaps(b) {
                    out.push(Violation::RegionOverlap {
                        first: a.id,
                        second: b.id,
                    });
                }
            }
        }
    }

    fn check_spacing(&self, map: &Map, out: &mut Vec<Violation>) {
        let allowed = config::MIN_REGION_SPACING..=config::MAX_REGION_SPACING;
        let connected: HashSet<_> = map.connections().iter().map(|c| c.endpoint_key()).collect();
        let regions = map.regions();

        for (i, a) in regions.iter().enumerate() {
            for b in &regions[i + 1..] {
                if self.options.spacing_scope == SpacingScope::ConnectedPairs {
                    let key = if a.id <= b.id {
                        (a.id, b.id)
                    } else {
                        (b.id, a.id)
                    };
                    if !connected.contains(&key) {
                        continue;
                    }
                }

                let spacing = a.rect.gap_to(&b.rect);
                if !allowed.contains(&spacing) {
                    out.push(Violation::SpacingOutOfRange {
                        first: a.id,
                        second: b.id,
                        spacing,
                        min: config::MIN_REGION_SPACING,
                        max: config::MAX_REGION_SPACING,
                    });
                }
            }
        }
    }

    fn check_incident_connections(&self, map: &Map, out: &mut Vec<Violation>) {
        let linked: HashSet<RegionId> = map
            .connections()
            .iter()
            .filter(|c| !c.is_self_loop())
            .flat_map(|c| [c.source, c.target])
            .collect();

        for region in map.regions() {
            if !linked.contains(&region.id) {
                out.push(Violation::IsolatedRegion { region: region.id });
            }
        }
    }

    fn check_reachability(&self, map: &Map, out: &mut Vec<Violation>) {
        let origin = match map.spawn_region().or_else(|| map.regions().first()) {
            Some(region) => region.id,
            None => return,
        };

        let graph = RegionGraph::from_map(map);
        let reachable = PathFinder::new().reachable_from(&graph, origin);

        for region in map.regions() {
            if !reachable.contains(&region.id) {
                out.push(Violation::UnreachableRegion {
                    region: region.id,
                    origin,
                });
            }
        }
    }

    fn check_structural_metrics(&self, map: &Map, out: &mut Vec<Violation>) {
        let density = map.density();
        if !(config::MIN_DENSITY..=config::MAX_DENSITY).contains(&density) {
            out.push(Violation::DensityOutOfRange {
                value: density,
                min: config::MIN_DENSITY,
                max: config::MAX_DENSITY,
            });
        }

        let connectivity = map.connectivity_ratio();
        if !(config::MIN_CONNECTIVITY..=config::MAX_CONNECTIVITY).contains(&connectivity) {
            out.push(Violation::ConnectivityOutOfRange {
                value: connectivity,
                min: config::MIN_CONNECTIVITY,
                max: config::MAX_CONNECTIVITY,
            });
        }

        let complexity = map.complexity_score();
        if !(config::MIN_COMPLEXITY..=config::MAX_COMPLEXITY).contains(&complexity) {
            out.push(Violation::ComplexityOutOfRange {
                value: complexity,
                min: config::MIN_COMPLEXITY,
                max: config::MAX_COMPLEXITY,
            });
        }
    }

    fn check_roles(&self, map: &Map, out: &mut Vec<Violation>) {
        let spawns = map.regions().iter().filter(|r| r.is_spawn()).count();
        if spawns != 1 {
            out.push(Violation::SpawnCount { count: spawns });
        }
        if map.boss_regions().is_empty() {
            out.push(Violation::MissingBoss);
        }
    }
}

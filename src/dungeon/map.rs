//! # Map
//!
//! The immutable snapshot handed out by the generation pipeline.
//!
//! A `Map` owns flat collections of regions and connections and an index
//! from region id to slot. Once built it exposes read accessors only;
//! per-playthrough state such as visited or cleared flags is tracked by
//! whoever consumes the map.

use super::{Connection, ConnectionId, Corridor, Position, Rect, Region, RegionId, RoleKind, Size};
use crate::{config, DelveError};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;
use uuid::Uuid;

/// Overall flavour of a generated map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MapKind {
    Dungeon,
    Cave,
    Tower,
}

impl Default for MapKind {
    fn default() -> Self {
        MapKind::Dungeon
    }
}

impl FromStr for MapKind {
    type Err = DelveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dungeon" => Ok(MapKind::Dungeon),
            "cave" => Ok(MapKind::Cave),
            "tower" => Ok(MapKind::Tower),
            other => Err(DelveError::Configuration(format!(
                "unknown map kind '{}', expected dungeon, cave or tower",
                other
            ))),
        }
    }
}

/// Identity and global parameters of a map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapHeader {
    pub id: Uuid,
    pub kind: MapKind,
    pub name: String,
    pub size: Size,
    pub level: u32,
    pub difficulty: u32,
}

/// A finished dungeon layout.
#[derive(Debug, Clone, PartialEq)]
pub struct Map {
    header: MapHeader,
    regions: Vec<Region>,
    connections: Vec<Connection>,
    corridors: Vec<Corridor>,
    region_index: HashMap<RegionId, usize>,
}

/// Summary numbers for a map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapStatistics {
    pub region_count: usize,
    pub connection_count: usize,
    pub role_counts: BTreeMap<RoleKind, usize>,
    pub total_region_area: u64,
    pub density: f64,
    pub connectivity_ratio: f64,
    pub complexity: f64,
    pub total_corridor_length: f64,
}

impl Map {
    /// Assembles a map from its parts. No invariants are checked here;
    /// run the validator for that.
    pub fn new(header: MapHeader, regions: Vec<Region>, connections: Vec<Connection>) -> Self {
        let mut region_index = HashMap::with_capacity(regions.len());
        for (slot, region) in regions.iter().enumerate() {
            region_index.entry(region.id).or_insert(slot);
        }

        Self {
            header,
            regions,
            connections,
            corridors: Vec::new(),
            region_index,
        }
    }

    /// Attaches derived corridor geometry.
    pub fn with_corridors(mut self, corridors: Vec<Corridor>) -> Self {
        self.corridors = corridors;
        self
    }

    pub fn header(&self) -> &MapHeader {
        &self.header
    }

    pub fn id(&self) -> Uuid {
        self.header.id
    }

    pub fn name(&self) -> &str {
        &self.header.name
    }

    pub fn size(&self) -> Size {
        self.header.size
    }

    pub fn level(&self) -> u32 {
        self.header.level
    }

    pub fn difficulty(&self) -> u32 {
        self.header.difficulty
    }

    /// The map rectangle anchored at the origin.
    pub fn bounds(&self) -> Rect {
        Rect::from_parts(Position::origin(), self.header.size)
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    pub fn corridors(&self) -> &[Corridor] {
        &self.corridors
    }

    pub fn region(&self, id: RegionId) -> Option<&Region> {
        self.region_index.get(&id).map(|&slot| &self.regions[slot])
    }

    pub fn contains_region(&self, id: RegionId) -> bool {
        self.region_index.contains_key(&id)
    }

    pub fn connection(&self, id: ConnectionId) -> Option<&Connection> {
        self.connections.iter().find(|conn| conn.id == id)
    }

    /// The first region with the Spawn role.
    pub fn spawn_region(&self) -> Option<&Region> {
        self.regions.iter().find(|region| region.is_spawn())
    }

    pub fn boss_regions(&self) -> Vec<&Region> {
        self.regions_with_role(RoleKind::Boss)
    }

    pub fn regions_with_role(&self, kind: RoleKind) -> Vec<&Region> {
        self.regions
            .iter()
            .filter(|region| region.kind() == kind)
            .collect()
    }

    /// Finds the region covering a point, if any.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::{generate, GenerationConfig};
    ///
    /// let generated = generate(&GenerationConfig::for_testing(7)).unwrap();
    /// let map = &generated.map;
    /// let spawn = map.spawn_region().unwrap();
    /// let inside = spawn.rect.position();
    /// assert_eq!(map.region_containing(inside).map(|r| r.id), Some(spawn.id));
    /// ```
    pub fn region_containing(&self, pos: Position) -> Option<&Region> {
        self.regions.iter().find(|region| region.contains(pos))
    }

    /// Connections touching the given region, in enumeration order.
    pub fn connections_of(&self, id: RegionId) -> impl Iterator<Item = &Connection> + '_ {
        self.connections.iter().filter(move |conn| conn.involves(id))
    }

    /// Regions one connection away from `id`, in connection enumeration order.
    pub fn connected_regions(&self, id: RegionId) -> Vec<RegionId> {
        let mut neighbors = Vec::new();
        for conn in self.connections_of(id) {
            if let Some(other) = conn.other_end(id) {
                if other != id && !neighbors.contains(&other) {
                    neighbors.push(other);
                }
            }
        }
        neighbors
    }

    /// Number of connections incident to a region.
    pub fn degree(&self, id: RegionId) -> usize {
        self.connections_of(id).count()
    }

    pub fn total_region_area(&self) -> u64 {
        self.regions.iter().map(Region::area).sum()
    }

    /// Ratio of total region area to map area.
    pub fn density(&self) -> f64 {
        let map_area = self.header.size.area();
        if map_area == 0 {
            return 0.0;
        }
        self.total_region_area() as f64 / map_area as f64
    }

    /// Connections divided by the number of possible region pairs.
    ///
    /// Zero when fewer than two regions exist.
    pub fn connectivity_ratio(&self) -> f64 {
        let n = self.regions.len();
        if n < 2 {
            return 0.0;
        }
        let possible_pairs = (n * (n - 1) / 2) as f64;
        self.connections.len() as f64 / possible_pairs
    }

    /// Weighted structural-load indicator.
    pub fn complexity_score(&self) -> f64 {
        self.regions.len() as f64 * config::COMPLEXITY_REGION_WEIGHT
            + self.connections.len() as f64 * config::COMPLEXITY_CONNECTION_WEIGHT
            + self.header.difficulty as f64 * config::COMPLEXITY_DIFFICULTY_WEIGHT
            + self.header.level as f64 * config::COMPLEXITY_LEVEL_WEIGHT
    }

    pub fn statistics(&self) -> MapStatistics {
        let mut role_counts = BTreeMap::new();
        for region in &self.regions {
            *role_counts.entry(region.kind()).or_insert(0) += 1;
        }

        MapStatistics {
            region_count: self.regions.len(),
            connection_count: self.connections.len(),
            role_counts,
            total_region_area: self.total_region_area(),
            density: self.density(),
            connectivity_ratio: self.connectivity_ratio(),
            complexity: self.complexity_score(),
            total_corridor_length: self.corridors.iter().map(Corridor::length).sum(),
        }
    }
}

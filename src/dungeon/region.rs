//! # Regions
//!
//! Rectangular, role-tagged areas of a map.
//!
//! Each role carries only the fields that mean something for it. Anything
//! truly dynamic goes into the narrowly-typed extension table.

use super::{Position, Rect, RegionId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Scalar or blob stored in a region or connection extension table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum PropertyValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Blob(Vec<u8>),
}

/// Extension metadata keyed by name. Ordered so that serialization is stable.
pub type ExtensionTable = BTreeMap<String, PropertyValue>;

/// Field-less discriminant of [`RegionRole`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RoleKind {
    Spawn,
    Combat,
    Treasure,
    Boss,
    Safe,
}

impl RoleKind {
    /// All role kinds, in declaration order.
    pub const ALL: [RoleKind; 5] = [
        RoleKind::Spawn,
        RoleKind::Combat,
        RoleKind::Treasure,
        RoleKind::Boss,
        RoleKind::Safe,
    ];

    /// Human-readable label used for region names.
    pub fn label(self) -> &'static str {
        match self {
            RoleKind::Spawn => "Entrance Hall",
            RoleKind::Combat => "Battle Chamber",
            RoleKind::Treasure => "Treasure Vault",
            RoleKind::Boss => "Boss Lair",
            RoleKind::Safe => "Sanctuary",
        }
    }
}

impl fmt::Display for RoleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RoleKind::Spawn => "spawn",
            RoleKind::Combat => "combat",
            RoleKind::Treasure => "treasure",
            RoleKind::Boss => "boss",
            RoleKind::Safe => "safe",
        };
        f.write_str(name)
    }
}

/// Where the player enters the map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpawnDetails {
    /// Radius around the entry point kept free of enemies
    pub safe_radius: u32,
}

/// A room holding a regular encounter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CombatDetails {
    pub enemy_count: u32,
    /// Whether an elite enemy leads the encounter
    pub elite: bool,
}

/// Loot quality tiers for treasure rooms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LootRarity {
    Common,
    Rare,
    Epic,
    Legendary,
}

impl LootRarity {
    /// Picks a rarity tier from a 1-10 difficulty.
    pub fn for_difficulty(difficulty: u32) -> Self {
        match difficulty {
            0..=3 => LootRarity::Common,
            4..=6 => LootRarity::Rare,
            7..=8 => LootRarity::Epic,
            _ => LootRarity::Legendary,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreasureDetails {
    pub chest_count: u32,
    pub rarity: LootRarity,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BossDetails {
    pub title: String,
    /// Number of fight phases
    pub phases: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SafeDetails {
    pub restores_health: bool,
    pub has_merchant: bool,
}

/// Role of a region together with the data only that role needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegionRole {
    Spawn(SpawnDetails),
    Combat(CombatDetails),
    Treasure(TreasureDetails),
    Boss(BossDetails),
    Safe(SafeDetails),
}

impl RegionRole {
    /// Builds the default payload for a role at the given difficulty and level.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::{RegionRole, RoleKind};
    ///
    /// let role = RegionRole::for_kind(RoleKind::Combat, 4, 10);
    /// assert_eq!(role.kind(), RoleKind::Combat);
    /// ```
    pub fn for_kind(kind: RoleKind, difficulty: u32, level: u32) -> Self {
        match kind {
            RoleKind::Spawn => RegionRole::Spawn(SpawnDetails { safe_radius: 50 }),
            RoleKind::Combat => RegionRole::Combat(CombatDetails {
                enemy_count: 2 + difficulty / 2,
                elite: difficulty >= 7,
            }),
            RoleKind::Treasure => RegionRole::Treasure(TreasureDetails {
                chest_count: 1 + level / 25,
                rarity: LootRarity::for_difficulty(difficulty),
            }),
            RoleKind::Boss => RegionRole::Boss(BossDetails {
                title: format!("Warden of Depth {}", level),
                phases: if difficulty >= 8 {
                    3
                } else if difficulty >= 4 {
                    2
                } else {
                    1
                },
            }),
            RoleKind::Safe => RegionRole::Safe(SafeDetails {
                restores_health: true,
                has_merchant: level >= 10,
            }),
        }
    }

    pub fn kind(&self) -> RoleKind {
        match self {
            RegionRole::Spawn(_) => RoleKind::Spawn,
            RegionRole::Combat(_) => RoleKind::Combat,
            RegionRole::Treasure(_) => RoleKind::Treasure,
            RegionRole::Boss(_) => RoleKind::Boss,
            RegionRole::Safe(_) => RoleKind::Safe,
        }
    }
}

/// A rectangular, role-tagged area of the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    /// Unique identifier within the owning map
    pub id: RegionId,
    pub name: String,
    /// Placement and extent of the region
    pub rect: Rect,
    pub role: RegionRole,
    pub difficulty: u32,
    pub level: u32,
    /// Dynamic metadata not covered by the role payload
    pub extensions: ExtensionTable,
}

impl Region {
    /// Creates a region named after its role.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::{Rect, Region, RegionId, RegionRole, RoleKind};
    ///
    /// let role = RegionRole::for_kind(RoleKind::Spawn, 1, 1);
    /// let region = Region::new(RegionId(1), Rect::new(0, 0, 100, 100), role, 1, 1);
    /// assert_eq!(region.name, "Entrance Hall 1");
    /// assert_eq!(region.kind(), RoleKind::Spawn);
    /// ```
    pub fn new(id: RegionId, rect: Rect, role: RegionRole, difficulty: u32, level: u32) -> Self {
        Self {
            id,
            name: format!("{} {}", role.kind().label(), id.0),
            rect,
            role,
            difficulty,
            level,
            extensions: ExtensionTable::new(),
        }
    }

    pub fn kind(&self) -> RoleKind {
        self.role.kind()
    }

    pub fn is_spawn(&self) -> bool {
        self.kind() == RoleKind::Spawn
    }

    pub fn is_boss(&self) -> bool {
        self.kind() == RoleKind::Boss
    }

    pub fn area(&self) -> u64 {
        self.rect.area()
    }

    pub fn centroid(&self) -> (f64, f64) {
        self.rect.centroid()
    }

    pub fn contains(&self, pos: Position) -> bool {
        self.rect.contains_point(pos)
    }

    pub fn overlaps(&self, other: &Region) -> bool {
        self.rect.intersects(&other.rect)
    }

    /// Euclidean distance between the two region centroids.
    pub fn centroid_distance(&self, other: &Region) -> f64 {
        let (ax, ay) = self.centroid();
        let (bx, by) = other.centroid();
        ((ax - bx).powi(2) + (ay - by).powi(2)).sqrt()
    }

    /// Replaces the role, renaming the region to match.
    pub fn set_role(&mut self, role: RegionRole) {
        self.name = format!("{} {}", role.kind().label(), self.id.0);
        self.role = role;
    }

    /// Sets an extension value for this region.
    pub fn set_extension(&mut self, key: impl Into<String>, value: PropertyValue) {
        self.extensions.insert(key.into(), value);
    }

    /// Gets an extension value by key.
    pub fn extension(&self, key: &str) -> Option<&PropertyValue> {
        self.extensions.get(key)
    }
}

//! # Persistence
//!
//! Plain-tree form of a map for save files and external tools.
//!
//! The tree mirrors what the persistence collaborator expects:
//! `{id, type, name, level, difficulty, size, regions, connections}` where
//! every region and connection keeps its role-specific fields, difficulty
//! and extension table inside a `properties` object. Corridors are derived
//! data and are rebuilt on load.

use super::{
    Connection, ConnectionId, ConnectionKind, ExtensionTable, Map, MapHeader, MapKind, Position,
    Rect, Region, RegionId, RegionRole, RoleKind, Size,
};
use crate::generation::CorridorSynthesizer;
use crate::DelveResult;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use uuid::Uuid;

/// Property object attached to regions and connections.
pub type PropertyObject = serde_json::Map<String, Value>;

const DIFFICULTY_KEY: &str = "difficulty";
const LEVEL_KEY: &str = "level";
const EXTENSIONS_KEY: &str = "extensions";

/// Serialized map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapRecord {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: MapKind,
    pub name: String,
    pub level: u32,
    pub difficulty: u32,
    pub size: Size,
    pub regions: Vec<RegionRecord>,
    pub connections: Vec<ConnectionRecord>,
}

/// Serialized region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionRecord {
    pub id: RegionId,
    #[serde(rename = "type")]
    pub kind: RoleKind,
    pub name: String,
    pub position: Position,
    pub size: Size,
    #[serde(default)]
    pub properties: PropertyObject,
}

/// Serialized connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionRecord {
    pub id: ConnectionId,
    #[serde(rename = "type")]
    pub kind: ConnectionKind,
    pub source_region_id: RegionId,
    pub target_region_id: RegionId,
    #[serde(default)]
    pub properties: PropertyObject,
}

impl Map {
    /// Converts the map into its serializable tree.
    pub fn to_record(&self) -> DelveResult<MapRecord> {
        let regions = self
            .regions()
            .iter()
            .map(RegionRecord::from_region)
            .collect::<DelveResult<Vec<_>>>()?;
        let connections = self
            .connections()
            .iter()
            .map(ConnectionRecord::from_connection)
            .collect::<DelveResult<Vec<_>>>()?;

        let header = self.header();
        Ok(MapRecord {
            id: header.id,
            kind: header.kind,
            name: header.name.clone(),
            level: header.level,
            difficulty: header.difficulty,
            size: header.size,
            regions,
            connections,
        })
    }

    /// Rebuilds a map from its serialized tree.
    ///
    /// Corridor geometry is synthesized again. A connection that points at a
    /// missing region leaves the corridor list empty; the validator reports
    /// the broken connection itself.
    pub fn from_record(record: MapRecord) -> DelveResult<Map> {
        let header = MapHeader {
            id: record.id,
            kind: record.kind,
            name: record.name,
            size: record.size,
            level: record.level,
            difficulty: record.difficulty,
        };

        let regions = record
            .regions
            .into_iter()
            .map(|region| region.into_region(header.difficulty, header.level))
            .collect::<DelveResult<Vec<_>>>()?;
        let connections = record
            .connections
            .into_iter()
            .map(ConnectionRecord::into_connection)
            .collect::<DelveResult<Vec<_>>>()?;

        let corridors = match CorridorSynthesizer::new().synthesize(&connections, &regions) {
            Ok(corridors) => corridors,
            Err(e) => {
                warn!("Loaded map {} has no corridor geometry: {}", header.id, e);
                Vec::new()
            }
        };

        debug!(
            "Loaded map {} with {} regions and {} connections",
            header.id,
            regions.len(),
            connections.len()
        );

        let map = Map::new(header, regions, connections);
        Ok(map.with_corridors(corridors))
    }
}

impl RegionRecord {
    pub fn from_region(region: &Region) -> DelveResult<Self> {
        let mut properties = role_properties(&region.role)?;
        properties.insert(DIFFICULTY_KEY.to_string(), Value::from(region.difficulty));
        properties.insert(LEVEL_KEY.to_string(), Value::from(region.level));
        if !region.extensions.is_empty() {
            properties.insert(
                EXTENSIONS_KEY.to_string(),
                serde_json::to_value(&region.extensions)?,
            );
        }

        Ok(Self {
            id: region.id,
            kind: region.kind(),
            name: region.name.clone(),
            position: region.rect.position(),
            size: region.rect.size(),
            properties,
        })
    }

    /// Converts back into a region, falling back to the map's difficulty and
    /// level when the record does not carry its own.
    pub fn into_region(self, map_difficulty: u32, map_level: u32) -> DelveResult<Region> {
        let role = role_from_properties(self.kind, &self.properties)?;
        let difficulty = read_u32(&self.properties, DIFFICULTY_KEY).unwrap_or(map_difficulty);
        let level = read_u32(&self.properties, LEVEL_KEY).unwrap_or(map_level);
        let extensions = read_extensions(&self.properties)?;

        Ok(Region {
            id: self.id,
            name: self.name,
            rect: Rect::from_parts(self.position, self.size),
            role,
            difficulty,
            level,
            extensions,
        })
    }
}

impl ConnectionRecord {
    pub fn from_connection(connection: &Connection) -> DelveResult<Self> {
        let mut properties = PropertyObject::new();
        properties.insert(
            DIFFICULTY_KEY.to_string(),
            Value::from(connection.difficulty),
        );
        if !connection.extensions.is_empty() {
            properties.insert(
                EXTENSIONS_KEY.to_string(),
                serde_json::to_value(&connection.extensions)?,
            );
        }

        Ok(Self {
            id: connection.id,
            kind: connection.kind,
            source_region_id: connection.source,
            target_region_id: connection.target,
            properties,
        })
    }

    pub fn into_connection(self) -> DelveResult<Connection> {
        let extensions = read_extensions(&self.properties)?;
        Ok(Connection {
            id: self.id,
            kind: self.kind,
            source: self.source_region_id,
            target: self.target_region_id,
            difficulty: read_u32(&self.properties, DIFFICULTY_KEY).unwrap_or(1),
            extensions,
        })
    }
}

fn role_properties(role: &RegionRole) -> DelveResult<PropertyObject> {
    let value = match role {
        RegionRole::Spawn(details) => serde_json::to_value(details)?,
        RegionRole::Combat(details) => serde_json::to_value(details)?,
        RegionRole::Treasure(details) => serde_json::to_value(details)?,
        RegionRole::Boss(details) => serde_json::to_value(details)?,
        RegionRole::Safe(details) => serde_json::to_value(details)?,
    };

    match value {
        Value::Object(object) => Ok(object),
        _ => Ok(PropertyObject::new()),
    }
}

fn role_from_properties(kind: RoleKind, properties: &PropertyObject) -> DelveResult<RegionRole> {
    let value = Value::Object(properties.clone());
    let role = match kind {
        RoleKind::Spawn => RegionRole::Spawn(serde_json::from_value(value)?),
        RoleKind::Combat => RegionRole::Combat(serde_json::from_value(value)?),
        RoleKind::Treasure => RegionRole::Treasure(serde_json::from_value(value)?),
        RoleKind::Boss => RegionRole::Boss(serde_json::from_value(value)?),
        RoleKind::Safe => RegionRole::Safe(serde_json::from_value(value)?),
    };
    Ok(role)
}

fn read_u32(properties: &PropertyObject, key: &str) -> Option<u32> {
    properties
        .get(key)
        .and_then(Value::as_u64)
        .and_then(|value| u32::try_from(value).ok())
}

fn read_extensions(properties: &PropertyObject) -> DelveResult<ExtensionTable> {
    match properties.get(EXTENSIONS_KEY) {
        Some(value) => Ok(serde_json::from_value(value.clone())?),
        None => Ok(ExtensionTable::new()),
    }
}

/// Serializes a map to pretty-printed JSON.
pub fn to_json(map: &Map) -> DelveResult<String> {
    Ok(serde_json::to_string_pretty(&map.to_record()?)?)
}

/// Deserializes a map from JSON.
pub fn from_json(json: &str) -> DelveResult<Map> {
    let record: MapRecord = serde_json::from_str(json)?;
    Map::from_record(record)
}

/// Writes a map to a JSON file.
pub fn save_to_path(map: &Map, path: impl AsRef<Path>) -> DelveResult<()> {
    std::fs::write(path, to_json(map)?)?;
    Ok(())
}

/// Reads a map from a JSON file.
pub fn load_from_path(path: impl AsRef<Path>) -> DelveResult<Map> {
    let json = std::fs::read_to_string(path)?;
    from_json(&json)
}

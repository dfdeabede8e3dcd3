//! # Connections
//!
//! Edges of the region graph. A connection names its endpoints by id and
//! never holds a reference to the region records themselves.

use super::{ConnectionId, ExtensionTable, Position, PropertyValue, RegionId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Gameplay semantics of a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConnectionKind {
    /// Ordinary passage
    Normal,
    /// Gate leading into a boss region
    Boss,
    /// Hidden shortcut passage
    Secret,
    /// Teleporter link with no physical corridor
    Teleport,
}

impl ConnectionKind {
    /// Whether this connection belongs to the optional shortcut layer.
    pub fn is_shortcut(self) -> bool {
        matches!(self, ConnectionKind::Secret | ConnectionKind::Teleport)
    }
}

impl fmt::Display for ConnectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConnectionKind::Normal => "normal",
            ConnectionKind::Boss => "boss",
            ConnectionKind::Secret => "secret",
            ConnectionKind::Teleport => "teleport",
        };
        f.write_str(name)
    }
}

/// An undirected edge between two regions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    pub id: ConnectionId,
    pub kind: ConnectionKind,
    pub source: RegionId,
    pub target: RegionId,
    /// Difficulty weight of traversing this connection
    pub difficulty: u32,
    pub extensions: ExtensionTable,
}

impl Connection {
    /// Creates a new connection with difficulty weight 1.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::{Connection, ConnectionId, ConnectionKind, RegionId};
    ///
    /// let conn = Connection::new(
    ///     ConnectionId(0),
    ///     ConnectionKind::Normal,
    ///     RegionId(1),
    ///     RegionId(2),
    /// );
    /// assert!(conn.involves(RegionId(2)));
    /// assert_eq!(conn.other_end(RegionId(1)), Some(RegionId(2)));
    /// ```
    pub fn new(id: ConnectionId, kind: ConnectionKind, source: RegionId, target: RegionId) -> Self {
        Self {
            id,
            kind,
            source,
            target,
            difficulty: 1,
            extensions: ExtensionTable::new(),
        }
    }

    /// Checks whether the given region is one of the endpoints.
    pub fn involves(&self, region: RegionId) -> bool {
        self.source == region || self.target == region
    }

    /// Returns the endpoint opposite to `region`, if `region` is an endpoint.
    pub fn other_end(&self, region: RegionId) -> Option<RegionId> {
        if self.source == region {
            Some(self.target)
        } else if self.target == region {
            Some(self.source)
        } else {
            None
        }
    }

    /// Unordered endpoint pair, smallest id first.
    pub fn endpoint_key(&self) -> (RegionId, RegionId) {
        if self.source <= self.target {
            (self.source, self.target)
        } else {
            (self.target, self.source)
        }
    }

    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }

    pub fn set_extension(&mut self, key: impl Into<String>, value: PropertyValue) {
        self.extensions.insert(key.into(), value);
    }
}

/// Presentation-only polyline derived from a connection.
///
/// Corridors never feed back into the region graph; they exist for the
/// renderer and for layout scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Corridor {
    pub connection_id: ConnectionId,
    pub kind: ConnectionKind,
    /// Polyline vertices from the source boundary to the target boundary
    pub points: Vec<Position>,
}

impl Corridor {
    /// Total length of the polyline.
    pub fn length(&self) -> f64 {
        self.points
            .windows(2)
            .map(|pair| pair[0].euclidean_distance(pair[1]))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_key_is_unordered() {
        let a = Connection::new(
            ConnectionId(0),
            ConnectionKind::Normal,
            RegionId(5),
            RegionId(2),
        );
        let b = Connection::new(
            ConnectionId(1),
            ConnectionKind::Secret,
            RegionId(2),
            RegionId(5),
        );
        assert_eq!(a.endpoint_key(), b.endpoint_key());
        assert_eq!(a.endpoint_key(), (RegionId(2), RegionId(5)));
    }

    #[test]
    fn test_other_end() {
        let conn = Connection::new(
            ConnectionId(0),
            ConnectionKind::Boss,
            RegionId(1),
            RegionId(3),
        );
        assert_eq!(conn.other_end(RegionId(1)), Some(RegionId(3)));
        assert_eq!(conn.other_end(RegionId(3)), Some(RegionId(1)));
        assert_eq!(conn.other_end(RegionId(2)), None);
        assert!(!conn.is_self_loop());
    }

    #[test]
    fn test_self_loop_detection() {
        let conn = Connection::new(
            ConnectionId(0),
            ConnectionKind::Normal,
            RegionId(4),
            RegionId(4),
        );
        assert!(conn.is_self_loop());
    }

    #[test]
    fn test_corridor_length() {
        let corridor = Corridor {
            connection_id: ConnectionId(0),
            kind: ConnectionKind::Normal,
            points: vec![
                Position::new(0, 0),
                Position::new(30, 0),
                Position::new(30, 40),
            ],
        };
        assert_eq!(corridor.length(), 70.0);
    }

    #[test]
    fn test_shortcut_kinds() {
        assert!(ConnectionKind::Secret.is_shortcut());
        assert!(ConnectionKind::Teleport.is_shortcut());
        assert!(!ConnectionKind::Normal.is_shortcut());
        assert!(!ConnectionKind::Boss.is_shortcut());
    }
}

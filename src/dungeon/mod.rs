//! # Dungeon Module
//!
//! The immutable data model produced by the generation pipeline.
//!
//! This module contains the building blocks every other subsystem reads:
//! - Geometry primitives (positions, sizes, rectangles, sides)
//! - Regions and their role-specific payloads
//! - Connections between regions
//! - The `Map` snapshot and its persistence format
//!
//! Regions and connections live in flat collections owned by the `Map`.
//! Connections refer to regions by id only.

pub mod connection;
pub mod map;
pub mod persistence;
pub mod region;

pub use connection::*;
pub use map::*;
pub use persistence::*;
pub use region::*;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Represents a 2D coordinate on the map.
///
/// # Examples
///
/// ```
/// use delve::Position;
///
/// let pos = Position::new(10, 5);
/// assert_eq!(pos.x, 10);
/// assert_eq!(pos.y, 5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    /// Creates a new position with the given coordinates.
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Returns the origin position (0, 0).
    pub fn origin() -> Self {
        Self::new(0, 0)
    }

    /// Calculates the Euclidean distance to another position.
    pub fn euclidean_distance(self, other: Position) -> f64 {
        let dx = self.x as f64 - other.x as f64;
        let dy = self.y as f64 - other.y as f64;
        (dx * dx + dy * dy).sqrt()
    }

    /// Builds a position from wide coordinates, saturating at the `i32` range.
    pub fn saturating(x: i64, y: i64) -> Self {
        let clamp = |v: i64| v.clamp(i32::MIN as i64, i32::MAX as i64) as i32;
        Self::new(clamp(x), clamp(y))
    }
}

/// Width and height of a map or region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    /// Creates a new size.
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Gets the area covered by this size.
    pub fn area(self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Length of the diagonal.
    pub fn diagonal(self) -> f64 {
        let w = self.width as f64;
        let h = self.height as f64;
        (w * w + h * h).sqrt()
    }
}

/// Axis-aligned rectangle described by its top-left corner and size.
///
/// The rectangle covers the half-open ranges `[x, x + width)` and
/// `[y, y + height)`, so two rectangles that merely share an edge do not
/// overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    /// Creates a new rectangle.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::Rect;
    ///
    /// let rect = Rect::new(5, 5, 10, 8);
    /// assert_eq!(rect.area(), 80);
    /// assert_eq!(rect.right(), 15);
    /// ```
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Builds a rectangle from a position and a size.
    pub fn from_parts(position: Position, size: Size) -> Self {
        Self::new(position.x, position.y, size.width, size.height)
    }

    pub fn position(&self) -> Position {
        Position::new(self.x, self.y)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Exclusive right edge.
    ///
    /// Edges are `i64` so a region at the far end of the coordinate range
    /// still has a right edge past its left one.
    pub fn right(&self) -> i64 {
        self.x as i64 + self.width as i64
    }

    /// Exclusive bottom edge.
    pub fn bottom(&self) -> i64 {
        self.y as i64 + self.height as i64
    }

    pub fn area(&self) -> u64 {
        self.size().area()
    }

    /// Gets the exact geometric center of the rectangle.
    pub fn centroid(&self) -> (f64, f64) {
        (
            self.x as f64 + self.width as f64 / 2.0,
            self.y as f64 + self.height as f64 / 2.0,
        )
    }

    /// Twice the centroid, which keeps centroids on the integer grid.
    pub fn doubled_centroid(&self) -> (i64, i64) {
        (
            2 * self.x as i64 + self.width as i64,
            2 * self.y as i64 + self.height as i64,
        )
    }

    /// Checks if a position lies inside this rectangle.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::{Position, Rect};
    ///
    /// let rect = Rect::new(5, 5, 10, 8);
    /// assert!(rect.contains_point(Position::new(7, 7)));
    /// assert!(!rect.contains_point(Position::new(15, 7)));
    /// ```
    pub fn contains_point(&self, pos: Position) -> bool {
        pos.x >= self.x
            && pos.y >= self.y
            && (pos.x as i64) < self.right()
            && (pos.y as i64) < self.bottom()
    }

    /// Checks if another rectangle lies entirely inside this one.
    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Checks if this rectangle overlaps with another one.
    pub fn intersects(&self, other: &Rect) -> bool {
        !(self.x as i64 >= other.right()
            || other.x as i64 >= self.right()
            || self.y as i64 >= other.bottom()
            || other.y as i64 >= self.bottom())
    }

    /// Euclidean distance between the two boundaries.
    ///
    /// Zero when the rectangles touch or overlap.
    pub fn gap_to(&self, other: &Rect) -> f64 {
        let dx = (other.x as i64 - self.right())
            .max(self.x as i64 - other.right())
            .max(0) as f64;
        let dy = (other.y as i64 - self.bottom())
            .max(self.y as i64 - other.bottom())
            .max(0) as f64;
        (dx * dx + dy * dy).sqrt()
    }

    /// Grid cell at the middle of the rectangle.
    pub fn center(&self) -> Position {
        Position::saturating(
            self.x as i64 + self.width as i64 / 2,
            self.y as i64 + self.height as i64 / 2,
        )
    }

    /// Midpoint of the given side, on the boundary.
    ///
    /// Points past the `i32` range saturate.
    pub fn side_midpoint(&self, side: Side) -> Position {
        let mid_x = self.x as i64 + self.width as i64 / 2;
        let mid_y = self.y as i64 + self.height as i64 / 2;
        match side {
            Side::North => Position::saturating(mid_x, self.y as i64),
            Side::South => Position::saturating(mid_x, self.bottom()),
            Side::West => Position::saturating(self.x as i64, mid_y),
            Side::East => Position::saturating(self.right(), mid_y),
        }
    }
}

/// The four sides of a rectangle, used to pick corridor exits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    North,
    South,
    East,
    West,
}

impl Side {
    /// Returns the side facing this one.
    pub fn opposite(self) -> Side {
        match self {
            Side::North => Side::South,
            Side::South => Side::North,
            Side::East => Side::West,
            Side::West => Side::East,
        }
    }

    /// Picks the side of a rectangle that faces along the given delta.
    ///
    /// Horizontal exits win ties.
    pub fn facing(dx: f64, dy: f64) -> Side {
        if dx.abs() >= dy.abs() {
            if dx >= 0.0 {
                Side::East
            } else {
                Side::West
            }
        } else if dy >= 0.0 {
            Side::South
        } else {
            Side::North
        }
    }
}

/// Unique identifier for a region within a map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegionId(pub u32);

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R{}", self.0)
    }
}

/// Unique identifier for a connection within a map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(pub u32);

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "C{}", self.0)
    }
}

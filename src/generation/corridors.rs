//! # Corridor Synthesis
//!
//! Derives presentation polylines from connections. Corridors are computed
//! after the graph is final and never change it.

use crate::{
    Connection, ConnectionKind, Corridor, DelveError, DelveResult, Position, Region, RegionId,
    Side,
};
use std::collections::HashMap;

/// Builds one corridor per connection.
#[derive(Debug, Clone, Copy, Default)]
pub struct CorridorSynthesizer;

impl CorridorSynthesizer {
    pub fn new() -> Self {
        Self
    }

    /// Synthesizes corridors for every connection, in connection order.
    ///
    /// Fails with [`DelveError::GraphIntegrity`] when a connection names a
    /// missing region or loops onto a single region.
    pub fn synthesize(
        &self,
        connections: &[Connection],
        regions: &[Region],
    ) -> DelveResult<Vec<Corridor>> {
        let lookup: HashMap<RegionId, &Region> = regions.iter().map(|r| (r.id, r)).collect();

        connections
            .iter()
            .map(|conn| {
                if conn.is_self_loop() {
                    return Err(DelveError::GraphIntegrity(format!(
                        "connection {} links {} to itself",
                        conn.id, conn.source
                    )));
                }
                let source = Self::endpoint(&lookup, conn, conn.source)?;
                let target = Self::endpoint(&lookup, conn, conn.target)?;

                Ok(Corridor {
                    connection_id: conn.id,
                    kind: conn.kind,
                    points: self.route(conn.kind, source, target),
                })
            })
            .collect()
    }

    /// Polyline between two regions.
    ///
    /// Teleporters are a straight link between centres. Everything else
    /// leaves the source through the side facing the target, enters the
    /// target through the opposite side and bends at most once.
    pub fn route(&self, kind: ConnectionKind, source: &Region, target: &Region) -> Vec<Position> {
        if kind == ConnectionKind::Teleport {
            return vec![source.rect.center(), target.rect.center()];
        }

        let exit = Self::exit_side(source, target);
        let start = source.rect.side_midpoint(exit);
        let end = target.rect.side_midpoint(exit.opposite());

        if start.x == end.x || start.y == end.y {
            return vec![start, end];
        }

        let corner = match exit {
            Side::East | Side::West => Position::new(end.x, start.y),
            Side::North | Side::South => Position::new(start.x, end.y),
        };
        vec![start, corner, end]
    }

    /// Side of `source` the corridor leaves through.
    ///
    /// Follows the wider gap between the two boundaries, so the bend always
    /// lies beyond the source edge. Horizontal gaps win ties. Overlapping
    /// rectangles fall back to the centroid direction.
    pub fn exit_side(source: &Region, target: &Region) -> Side {
        let horizontal = Self::separation(
            (source.rect.x as i64, source.rect.right()),
            (target.rect.x as i64, target.rect.right()),
            Side::East,
        );
        let vertical = Self::separation(
            (source.rect.y as i64, source.rect.bottom()),
            (target.rect.y as i64, target.rect.bottom()),
            Side::South,
        );

        match (horizontal, vertical) {
            (Some((h_gap, h_side)), Some((v_gap, v_side))) => {
                if h_gap >= v_gap {
                    h_side
                } else {
                    v_side
                }
            }
            (Some((_, side)), None) | (None, Some((_, side))) => side,
            (None, None) => {
                let (sx, sy) = source.centroid();
                let (tx, ty) = target.centroid();
                Side::facing(tx - sx, ty - sy)
            }
        }
    }

    /// Gap between two spans on one axis and the side it opens towards.
    ///
    /// `forward` is the side used when the target lies after the source.
    fn separation(source: (i64, i64), target: (i64, i64), forward: Side) -> Option<(i64, Side)> {
        if target.0 >= source.1 {
            Some((target.0 - source.1, forward))
        } else if source.0 >= target.1 {
            Some((source.0 - target.1, forward.opposite()))
        } else {
            None
        }
    }

    fn endpoint<'a>(
        lookup: &HashMap<RegionId, &'a Region>,
        conn: &Connection,
        id: RegionId,
    ) -> DelveResult<&'a Region> {
        lookup.get(&id).copied().ok_or_else(|| {
            DelveError::GraphIntegrity(format!(
                "connection {} references missing region {}",
                conn.id, id
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ConnectionId, Rect, RegionRole, RoleKind};

    fn region(id: u32, rect: Rect) -> Region {
        Region::new(
            RegionId(id),
            rect,
            RegionRole::for_kind(RoleKind::Combat, 1, 1),
            1,
            1,
        )
    }

    fn conn(id: u32, kind: ConnectionKind, a: u32, b: u32) -> Connection {
        Connection::new(ConnectionId(id), kind, RegionId(a), RegionId(b))
    }

    #[test]
    fn test_aligned_regions_get_straight_corridor() {
        let regions = vec![
            region(1, Rect::new(0, 0, 100, 100)),
            region(2, Rect::new(300, 0, 100, 100)),
        ];
        let corridors = CorridorSynthesizer::new()
            .synthesize(&[conn(0, ConnectionKind::Normal, 1, 2)], &regions)
            .unwrap();

        assert_eq!(corridors.len(), 1);
        assert_eq!(
            corridors[0].points,
            vec![Position::new(100, 50), Position::new(300, 50)]
        );
        assert_eq!(corridors[0].length(), 200.0);
    }

    #[test]
    fn test_offset_regions_get_l_shape() {
        let regions = vec![
            region(1, Rect::new(0, 0, 100, 100)),
            region(2, Rect::new(400, 200, 100, 100)),
        ];
        let corridors = CorridorSynthesizer::new()
            .synthesize(&[conn(0, ConnectionKind::Normal, 1, 2)], &regions)
            .unwrap();

        let points = &corridors[0].points;
        assert_eq!(points.len(), 3);
        assert_eq!(points[0], Position::new(100, 50));
        assert_eq!(points[1], Position::new(400, 50));
        assert_eq!(points[2], Position::new(400, 250));
    }

    #[test]
    fn test_vertical_exit() {
        let regions = vec![
            region(1, Rect::new(0, 0, 100, 100)),
            region(2, Rect::new(0, 400, 100, 100)),
        ];
        let corridors = CorridorSynthesizer::new()
            .synthesize(&[conn(0, ConnectionKind::Boss, 1, 2)], &regions)
            .unwrap();

        assert_eq!(
            corridors[0].points,
            vec![Position::new(50, 100), Position::new(50, 400)]
        );
        assert_eq!(corridors[0].kind, ConnectionKind::Boss);
    }

    #[test]
    fn test_teleport_links_centres() {
        let regions = vec![
            region(1, Rect::new(0, 0, 100, 100)),
            region(2, Rect::new(600, 600, 100, 100)),
        ];
        let corridors = CorridorSynthesizer::new()
            .synthesize(&[conn(4, ConnectionKind::Teleport, 1, 2)], &regions)
            .unwrap();

        assert_eq!(corridors[0].connection_id, ConnectionId(4));
        assert_eq!(
            corridors[0].points,
            vec![Position::new(50, 50), Position::new(650, 650)]
        );
    }

    #[test]
    fn test_missing_endpoint_is_integrity_error() {
        let regions = vec![region(1, Rect::new(0, 0, 100, 100))];
        let result = CorridorSynthesizer::new()
            .synthesize(&[conn(0, ConnectionKind::Normal, 1, 7)], &regions);

        match result {
            Err(DelveError::GraphIntegrity(message)) => assert!(message.contains("R7")),
            other => panic!("expected integrity error, got {:?}", other),
        }
    }

    #[test]
    fn test_self_loop_is_integrity_error() {
        let regions = vec![region(1, Rect::new(0, 0, 100, 100))];
        let result = CorridorSynthesizer::new()
            .synthesize(&[conn(0, ConnectionKind::Normal, 1, 1)], &regions);
        assert!(matches!(result, Err(DelveError::GraphIntegrity(_))));
    }

    #[test]
    fn test_bend_stays_outside_source() {
        let source = region(1, Rect::new(0, 0, 200, 100));
        let target = region(2, Rect::new(150, 100, 100, 100));
        let points = CorridorSynthesizer::new().route(ConnectionKind::Normal, &source, &target);

        assert_eq!(
            CorridorSynthesizer::exit_side(&source, &target),
            Side::South
        );
        assert_eq!(
            points,
            vec![Position::new(100, 100), Position::new(200, 100)]
        );
        for point in &points {
            assert!(!source.contains(*point));
        }
    }

    #[test]
    fn test_wider_gap_picks_exit() {
        let source = region(1, Rect::new(0, 0, 100, 100));
        let below = region(2, Rect::new(150, 400, 100, 100));
        let beside = region(3, Rect::new(500, 150, 100, 100));
        let above_left = region(4, Rect::new(-400, -150, 100, 100));

        assert_eq!(CorridorSynthesizer::exit_side(&source, &below), Side::South);
        assert_eq!(CorridorSynthesizer::exit_side(&source, &beside), Side::East);
        assert_eq!(
            CorridorSynthesizer::exit_side(&source, &above_left),
            Side::West
        );

        let points = CorridorSynthesizer::new().route(ConnectionKind::Normal, &source, &below);
        assert_eq!(
            points,
            vec![Position::new(50, 100), Position::new(50, 400), Position::new(200, 400)]
        );
        assert!(!source.contains(points[1]));
    }

    #[test]
    fn test_far_regions_route_without_overflow() {
        let regions = vec![
            region(1, Rect::new(0, 0, 100, 100)),
            region(2, Rect::new(2_147_483_600, 0, 150, 150)),
        ];
        let corridors = CorridorSynthesizer::new()
            .synthesize(&[conn(0, ConnectionKind::Teleport, 1, 2)], &regions)
            .unwrap();
        assert_eq!(corridors[0].points[1], Position::new(i32::MAX, 75));

        let corridors = CorridorSynthesizer::new()
            .synthesize(&[conn(0, ConnectionKind::Normal, 1, 2)], &regions)
            .unwrap();
        assert_eq!(corridors[0].points[0], Position::new(100, 50));
    }
}

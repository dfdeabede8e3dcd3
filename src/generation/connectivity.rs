//! # Connectivity
//!
//! Links regions into a single graph. The base layer is a minimum spanning
//! tree over centroid distances; an optional shortcut layer adds secret
//! passages and teleporters on top of it.

use super::GenerationConfig;
use crate::{Connection, ConnectionId, ConnectionKind, Region};
use ::pathfinding::undirected::kruskal::kruskal_indices;
use log::{debug, info};
use rand::Rng;
use std::collections::HashSet;

/// Edge weight used for the spanning tree.
///
/// Squared distance between doubled centroids, then the region slots, so
/// that equal distances always resolve the same way.
type EdgeWeight = (i64, usize, usize);

/// Builds the spanning-tree layer of connections.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConnectivityBuilder;

impl ConnectivityBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Connects every region with exactly `n - 1` connections.
    ///
    /// Connections touching a boss region are boss gates; all others are
    /// normal passages. Fewer than two regions produce no connections.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::{ConnectivityBuilder, RegionRoleAssigner, Rect};
    ///
    /// let rects = vec![
    ///     Rect::new(0, 0, 100, 100),
    ///     Rect::new(200, 0, 100, 100),
    ///     Rect::new(0, 200, 100, 100),
    /// ];
    /// let regions = RegionRoleAssigner::new().assign(rects, 1, 1);
    /// let connections = ConnectivityBuilder::new().connect(&regions);
    /// assert_eq!(connections.len(), 2);
    /// ```
    pub fn connect(&self, regions: &[Region]) -> Vec<Connection> {
        if regions.len() < 2 {
            return Vec::new();
        }

        let edges = Self::candidate_edges(regions);
        let connections: Vec<Connection> = kruskal_indices(regions.len(), &edges)
            .enumerate()
            .map(|(index, (a, b, _))| {
                let (source, target) = (&regions[a], &regions[b]);
                let kind = if source.is_boss() || target.is_boss() {
                    ConnectionKind::Boss
                } else {
                    ConnectionKind::Normal
                };
                Connection::new(ConnectionId(index as u32), kind, source.id, target.id)
            })
            .collect();

        debug!(
            "Spanning tree links {} regions with {} connections",
            regions.len(),
            connections.len()
        );
        connections
    }

    /// Every region pair with its weight.
    fn candidate_edges(regions: &[Region]) -> Vec<(usize, usize, EdgeWeight)> {
        let mut edges = Vec::with_capacity(regions.len() * (regions.len() - 1) / 2);
        for (i, a) in regions.iter().enumerate() {
            let (ax, ay) = a.rect.doubled_centroid();
            for (j, b) in regions.iter().enumerate().skip(i + 1) {
                let (bx, by) = b.rect.doubled_centroid();
                let squared = (ax - bx).pow(2) + (ay - by).pow(2);
                edges.push((i, j, (squared, i, j)));
            }
        }
        edges
    }
}

/// Optional layer of secret passages and teleporters.
///
/// Shortcuts never replace tree edges, never loop onto one region and
/// never repeat an existing pair. Boss regions are left out so the boss
/// gate stays the only way in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShortcutLayer {
    /// Shortcuts added per region, rounded down
    pub extra_connection_chance: f64,
    /// Share of shortcuts that become teleporters
    pub teleport_chance: f64,
}

impl From<&GenerationConfig> for ShortcutLayer {
    fn from(config: &GenerationConfig) -> Self {
        Self {
            extra_connection_chance: config.extra_connection_chance,
            teleport_chance: config.teleport_chance,
        }
    }
}

impl ShortcutLayer {
    /// How many candidates are considered when picking each shortcut.
    const PICK_WINDOW: usize = 4;

    /// A layer that never adds anything.
    pub fn disabled() -> Self {
        Self {
            extra_connection_chance: 0.0,
            teleport_chance: 0.0,
        }
    }

    /// Number of shortcuts requested for `region_count` regions.
    pub fn target_count(&self, region_count: usize) -> usize {
        (region_count as f64 * self.extra_connection_chance.clamp(0.0, 1.0)).floor() as usize
    }

    /// Appends shortcuts to `connections` and returns how many were added.
    ///
    /// Secret passages favour nearby pairs, teleporters favour distant ones.
    pub fn apply<R: Rng + ?Sized>(
        &self,
        regions: &[Region],
        connections: &mut Vec<Connection>,
        rng: &mut R,
    ) -> usize {
        let target = self.target_count(regions.len());
        if target == 0 {
            return 0;
        }

        let existing: HashSet<_> = connections.iter().map(Connection::endpoint_key).collect();
        let mut candidates: Vec<(f64, usize, usize)> = Vec::new();
        for (i, a) in regions.iter().enumerate() {
            for (j, b) in regions.iter().enumerate().skip(i + 1) {
                if a.id == b.id || a.is_boss() || b.is_boss() {
                    continue;
                }
                let key = if a.id <= b.id {
                    (a.id, b.id)
                } else {
                    (b.id, a.id)
                };
                if !existing.contains(&key) {
                    candidates.push((a.centroid_distance(b), i, j));
                }
            }
        }
        candidates.sort_by(|x, y| {
            x.0.total_cmp(&y.0)
                .then(x.1.cmp(&y.1))
                .then(x.2.cmp(&y.2))
        });

        let mut next_id = connections.iter().map(|c| c.id.0 + 1).max().unwrap_or(0);
        let mut added = 0;

        while added < target && !candidates.is_empty() {
            let teleport = rng.gen_bool(self.teleport_chance.clamp(0.0, 1.0));
            let window = candidates.len().min(Self::PICK_WINDOW);
            let offset = rng.gen_range(0..window);
            let slot = if teleport {
                candidates.len() - 1 - offset
            } else {
                offset
            };
            let (_, i, j) = candidates.remove(slot);

            let kind = if teleport {
                ConnectionKind::Teleport
            } else {
                ConnectionKind::Secret
            };
            connections.push(Connection::new(
                ConnectionId(next_id),
                kind,
                regions[i].id,
                regions[j].id,
            ));
            debug!(
                "Added {} shortcut {} - {}",
                kind, regions[i].id, regions[j].id
            );

            next_id += 1;
            added += 1;
        }

        if added > 0 {
            info!(
                "Shortcut layer added {} of {} requested links",
                added, target
            );
        }
        added
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{PathFinder, Rect, RegionGraph, RegionId, RegionRoleAssigner};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn grid_regions(count: usize) -> Vec<Region> {
        let rects = (0..count)
            .map(|i| Rect::new((i % 4) as i32 * 200, (i / 4) as i32 * 200, 100, 100))
            .collect();
        RegionRoleAssigner::new().assign(rects, 1, 1)
    }

    fn graph(regions: &[Region], connections: &[Connection]) -> RegionGraph {
        let edges: Vec<_> = connections.iter().map(|c| (c.source, c.target)).collect();
        RegionGraph::from_edges(regions.iter().map(|r| r.id), &edges)
    }

    #[test]
    fn test_tree_has_n_minus_one_edges_and_connects_everything() {
        for count in 2..=10 {
            let regions = grid_regions(count);
            let connections = ConnectivityBuilder::new().connect(&regions);

            assert_eq!(connections.len(), count - 1);
            assert!(
                PathFinder::new().is_connected(&graph(&regions, &connections))
            );
            assert!(connections.iter().all(|c| !c.is_self_loop()));
        }
    }

    #[test]
    fn test_degenerate_inputs() {
        let builder = ConnectivityBuilder::new();
        assert!(builder.connect(&[]).is_empty());
        assert!(builder.connect(&grid_regions(1)).is_empty());
    }

    #[test]
    fn test_tree_prefers_nearest_pairs() {
        let rects = vec![
            Rect::new(0, 0, 100, 100),
            Rect::new(150, 0, 100, 100),
            Rect::new(700, 0, 100, 100),
        ];
        let regions = RegionRoleAssigner::new().assign(rects, 1, 1);
        let connections = ConnectivityBuilder::new().connect(&regions);

        let keys: Vec<_> = connections.iter().map(Connection::endpoint_key).collect();
        assert_eq!(
            keys,
            vec![(RegionId(1), RegionId(2)), (RegionId(2), RegionId(3))]
        );
    }

    #[test]
    fn test_boss_edges_marked() {
        let regions = grid_regions(5);
        let connections = ConnectivityBuilder::new().connect(&regions);
        let boss = regions.iter().find(|r| r.is_boss()).unwrap().id;

        for conn in &connections {
            let expected = if conn.involves(boss) {
                ConnectionKind::Boss
            } else {
                ConnectionKind::Normal
            };
            assert_eq!(conn.kind, expected);
        }
    }

    #[test]
    fn test_tree_is_deterministic() {
        let regions = grid_regions(8);
        let first = ConnectivityBuilder::new().connect(&regions);
        let second = ConnectivityBuilder::new().connect(&regions);
        assert_eq!(first, second);
    }

    #[test]
    fn test_disabled_layer_adds_nothing() {
        let regions = grid_regions(8);
        let mut connections = ConnectivityBuilder::new().connect(&regions);
        let before = connections.clone();

        let mut rng = StdRng::seed_from_u64(1);
        let added = ShortcutLayer::disabled().apply(&regions, &mut connections, &mut rng);
        assert_eq!(added, 0);
        assert_eq!(connections, before);
    }

    #[test]
    fn test_shortcuts_keep_tree_and_avoid_duplicates() {
        let regions = grid_regions(10);
        let tree = ConnectivityBuilder::new().connect(&regions);
        let layer = ShortcutLayer {
            extra_connection_chance: 0.3,
            teleport_chance: 0.5,
        };

        for seed in 0..10 {
            let mut connections = tree.clone();
            let added = layer.apply(&regions, &mut connections, &mut StdRng::seed_from_u64(seed));

            assert_eq!(added, 3);
            assert_eq!(&connections[..tree.len()], &tree[..]);

            let keys: HashSet<_> = connections.iter().map(Connection::endpoint_key).collect();
            assert_eq!(keys.len(), connections.len());

            let ids: HashSet<_> = connections.iter().map(|c| c.id).collect();
            assert_eq!(ids.len(), connections.len());

            for shortcut in &connections[tree.len()..] {
                assert!(shortcut.kind.is_shortcut());
                assert!(!shortcut.is_self_loop());
                let touches_boss = regions
                    .iter()
                    .any(|r| r.is_boss() && shortcut.involves(r.id));
                assert!(!touches_boss);
            }
        }
    }

    #[test]
    fn test_teleport_share() {
        let regions = grid_regions(10);
        let mut connections = ConnectivityBuilder::new().connect(&regions);
        let layer = ShortcutLayer {
            extra_connection_chance: 0.2,
            teleport_chance: 1.0,
        };

        layer.apply(&regions, &mut connections, &mut StdRng::seed_from_u64(3));
        let teleports = connections
            .iter()
            .filter(|c| c.kind == ConnectionKind::Teleport)
            .count();
        assert_eq!(teleports, 2);
    }

    #[test]
    fn test_target_count_rounds_down() {
        let layer = ShortcutLayer {
            extra_connection_chance: 0.15,
            teleport_chance: 0.0,
        };
        assert_eq!(layer.target_count(8), 1);
        assert_eq!(layer.target_count(6), 0);
    }
}

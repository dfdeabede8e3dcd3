//! # Difficulty Progression
//!
//! Raises region difficulty with graph depth from the spawn so that the
//! way to the boss gets harder as it goes.

use crate::{config, Connection, PathFinder, Region, RegionGraph, RegionRole};
use log::debug;
use std::collections::HashMap;

/// Assigns per-region and per-connection difficulty.
#[derive(Debug, Clone, Copy, Default)]
pub struct DifficultyProgression;

impl DifficultyProgression {
    pub fn new() -> Self {
        Self
    }

    /// Difficulty of a region at `depth` hops from the spawn.
    pub fn region_difficulty(base: u32, depth: usize, is_boss: bool) -> u32 {
        let raised = base as usize + depth + usize::from(is_boss);
        raised.clamp(
            config::MIN_DIFFICULTY as usize,
            config::MAX_DIFFICULTY as usize,
        ) as u32
    }

    /// Updates difficulties in place.
    ///
    /// Region payloads are rebuilt for the new difficulty. A connection
    /// takes the harder of its two endpoints. Regions the spawn cannot
    /// reach keep the base difficulty.
    pub fn apply(&self, regions: &mut [Region], connections: &mut [Connection], base: u32) {
        let spawn = match regions.iter().find(|r| r.is_spawn()) {
            Some(spawn) => spawn.id,
            None => return,
        };

        let edges: Vec<_> = connections.iter().map(|c| (c.source, c.target)).collect();
        let graph = RegionGraph::from_edges(regions.iter().map(|r| r.id), &edges);
        let depths = PathFinder::new().distances_from(&graph, spawn);

        for region in regions.iter_mut() {
            let difficulty = match depths.get(&region.id) {
                Some(&depth) => Self::region_difficulty(base, depth, region.is_boss()),
                None => Self::region_difficulty(base, 0, false),
            };
            if difficulty != region.difficulty {
                region.difficulty = difficulty;
                region.set_role(
                    RegionRole::for_kind(region.kind(), difficulty, region.level),
                );
            }
        }

        let by_id: HashMap<_, _> = regions.iter().map(|r| (r.id, r.difficulty)).collect();
        for conn in connections.iter_mut() {
            let source = by_id.get(&conn.source).copied().unwrap_or(base);
            let target = by_id.get(&conn.target).copied().unwrap_or(base);
            conn.difficulty = source.max(target);
        }

        debug!(
            "Difficulty progression from {} spans {:?}",
            spawn,
            regions.iter().map(|r| r.difficulty).max()
        );
    }
}

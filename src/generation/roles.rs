//! # Role Assignment
//!
//! Turns placed rectangles into regions with gameplay roles.
//!
//! Roles follow placement order: the first region is the spawn, the last is
//! the boss, the middle one (`n / 2`) holds treasure and everything else is
//! combat. When rules collide, spawn beats boss and boss beats treasure, so
//! two regions become spawn and boss while a single region is only a spawn.
//!
//! A region may arrive with its role already chosen. That role is kept, and
//! a preset spawn anywhere takes over from the first-region spawn rule.

use crate::{Rect, Region, RegionId, RegionRole, RoleKind};
use log::debug;

/// Assigns roles to freshly placed regions.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegionRoleAssigner;

impl RegionRoleAssigner {
    pub fn new() -> Self {
        Self
    }

    /// Role for the region at `index` out of `count`.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::{RegionRoleAssigner, RoleKind};
    ///
    /// assert_eq!(RegionRoleAssigner::role_for_index(0, 5), RoleKind::Spawn);
    /// assert_eq!(RegionRoleAssigner::role_for_index(2, 5), RoleKind::Treasure);
    /// assert_eq!(RegionRoleAssigner::role_for_index(4, 5), RoleKind::Boss);
    /// ```
    pub fn role_for_index(index: usize, count: usize) -> RoleKind {
        if index == 0 {
            RoleKind::Spawn
        } else if index + 1 == count {
            RoleKind::Boss
        } else if index == count / 2 {
            RoleKind::Treasure
        } else {
            RoleKind::Combat
        }
    }

    /// Builds one region per rectangle, ids starting at 1.
    ///
    /// Every region starts at the map's difficulty and level; difficulty is
    /// refined later by the progression pass.
    pub fn assign(&self, rects: Vec<Rect>, difficulty: u32, level: u32) -> Vec<Region> {
        let slots = rects.into_iter().map(|rect| (rect, None)).collect();
        self.assign_preset(slots, difficulty, level)
    }

    /// Like [`assign`](Self::assign), but slots tagged with a role keep it.
    ///
    /// When some slot is preset to spawn, the first region no longer
    /// becomes the spawn and falls back to combat.
    pub fn assign_preset(
        &self,
        slots: Vec<(Rect, Option<RoleKind>)>,
        difficulty: u32,
        level: u32,
    ) -> Vec<Region> {
        let count = slots.len();
        let spawn_preset = slots
            .iter()
            .any(|(_, preset)| *preset == Some(RoleKind::Spawn));

        slots
            .into_iter()
            .enumerate()
            .map(|(index, (rect, preset))| {
                let kind = match preset {
                    Some(kind) => kind,
                    None if index == 0 && spawn_preset => RoleKind::Combat,
                    None => Self::role_for_index(index, count),
                };
                let id = RegionId(index as u32 + 1);
                debug!(
                    "Region {} assigned role {}{}",
                    id,
                    kind,
                    if preset.is_some() { " (preset)" } else { "" }
                );
                Region::new(
                    id,
                    rect,
                    RegionRole::for_kind(kind, difficulty, level),
                    difficulty,
                    level,
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rects(count: usize) -> Vec<Rect> {
        (0..count)
            .map(|i| Rect::new(i as i32 * 150, 0, 100, 100))
            .collect()
    }

    fn kinds(regions: &[Region]) -> Vec<RoleKind> {
        regions.iter().map(Region::kind).collect()
    }

    #[test]
    fn test_five_regions() {
        let regions = RegionRoleAssigner::new().assign(rects(5), 2, 1);
        assert_eq!(
            kinds(&regions),
            vec![
                RoleKind::Spawn,
                RoleKind::Combat,
                RoleKind::Treasure,
                RoleKind::Combat,
                RoleKind::Boss
            ]
        );
        assert_eq!(regions[0].id, RegionId(1));
        assert_eq!(regions[4].id, RegionId(5));
        assert!(regions.iter().all(|r| r.difficulty == 2 && r.level == 1));
    }

    #[test]
    fn test_three_regions() {
        let regions = RegionRoleAssigner::new().assign(rects(3), 1, 1);
        assert_eq!(
            kinds(&regions),
            vec![RoleKind::Spawn, RoleKind::Treasure, RoleKind::Boss]
        );
    }

    #[test]
    fn test_small_counts() {
        let assigner = RegionRoleAssigner::new();

        assert!(assigner.assign(Vec::new(), 1, 1).is_empty());
        assert_eq!(
            kinds(&assigner.assign(rects(1), 1, 1)),
            vec![RoleKind::Spawn]
        );
        assert_eq!(
            kinds(&assigner.assign(rects(2), 1, 1)),
            vec![RoleKind::Spawn, RoleKind::Boss]
        );
    }

    #[test]
    fn test_exactly_one_spawn_and_boss_for_every_count() {
        for count in 2..=10 {
            let regions = RegionRoleAssigner::new().assign(rects(count), 3, 5);
            let spawns = regions.iter().filter(|r| r.is_spawn()).count();
            let bosses = regions.iter().filter(|r| r.is_boss()).count();
            assert_eq!(spawns, 1, "count {}", count);
            assert_eq!(bosses, 1, "count {}", count);
        }
    }

    #[test]
    fn test_preset_roles_are_kept() {
        let mut slots: Vec<_> = rects(5).into_iter().map(|rect| (rect, None)).collect();
        slots[1].1 = Some(RoleKind::Safe);
        slots[3].1 = Some(RoleKind::Spawn);

        let regions = RegionRoleAssigner::new().assign_preset(slots, 1, 1);
        assert_eq!(
            kinds(&regions),
            vec![
                RoleKind::Combat,
                RoleKind::Safe,
                RoleKind::Treasure,
                RoleKind::Spawn,
                RoleKind::Boss
            ]
        );
        assert_eq!(regions.iter().filter(|r| r.is_spawn()).count(), 1);
    }

    #[test]
    fn test_preset_first_spawn_matches_plain_assignment() {
        let mut slots: Vec<_> = rects(4).into_iter().map(|rect| (rect, None)).collect();
        slots[0].1 = Some(RoleKind::Spawn);

        let assigner = RegionRoleAssigner::new();
        assert_eq!(
            kinds(&assigner.assign_preset(slots, 1, 1)),
            kinds(&assigner.assign(rects(4), 1, 1))
        );
    }

    #[test]
    fn test_regions_named_after_role() {
        let regions = RegionRoleAssigner::new().assign(rects(3), 1, 1);
        assert_eq!(regions[0].name, "Entrance Hall 1");
        assert_eq!(regions[2].name, "Boss Lair 3");
    }
}

//! # Region Placement
//!
//! Rejection sampling of non-overlapping rectangles inside the map bounds.

use super::GenerationConfig;
use crate::{config, Rect};
use log::{debug, warn};
use rand::Rng;

/// Inputs to the placer, a subset of the generation config.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacementConfig {
    pub width: u32,
    pub height: u32,
    pub target_count: usize,
    pub min_size: u32,
    pub max_size: u32,
}

impl From<&GenerationConfig> for PlacementConfig {
    fn from(config: &GenerationConfig) -> Self {
        Self {
            width: config.width,
            height: config.height,
            target_count: config.room_count,
            min_size: config.min_room_size,
            max_size: config.max_room_size,
        }
    }
}

impl PlacementConfig {
    /// The map rectangle anchored at the origin.
    pub fn bounds(&self) -> Rect {
        Rect::new(0, 0, self.width, self.height)
    }

    /// Whether any rectangle of the configured size can be sampled at all.
    fn is_samplable(&self) -> bool {
        self.min_size > 0
            && self.min_size <= self.max_size
            && self.min_size <= self.width
            && self.min_size <= self.height
    }
}

/// Result of a placement run.
///
/// Callers must not assume `rects.len() == requested`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    /// Accepted rectangles, in acceptance order
    pub rects: Vec<Rect>,
    /// Number of regions asked for
    pub requested: usize,
    /// Candidates drawn, accepted or not
    pub attempts: usize,
}

impl Placement {
    /// True when the retry budget ran out before reaching the target.
    pub fn is_exhausted(&self) -> bool {
        self.rects.len() < self.requested
    }
}

/// Places regions by repeatedly sampling rectangles and keeping the ones
/// that fit.
#[derive(Debug, Clone)]
pub struct RegionPlacer {
    /// Attempts granted per requested region
    pub attempts_per_region: usize,
}

impl RegionPlacer {
    /// Creates a placer with the default retry budget.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::{PlacementConfig, RegionPlacer};
    /// use rand::{rngs::StdRng, SeedableRng};
    ///
    /// let config = PlacementConfig {
    ///     width: 800,
    ///     height: 800,
    ///     target_count: 4,
    ///     min_size: 100,
    ///     max_size: 200,
    /// };
    /// let placement = RegionPlacer::new().place(&config, &mut StdRng::seed_from_u64(1));
    /// assert!(placement.rects.len() <= 4);
    /// ```
    pub fn new() -> Self {
        Self {
            attempts_per_region: config::PLACEMENT_ATTEMPTS_PER_REGION,
        }
    }

    /// Places up to `target_count` regions using random candidates.
    pub fn place<R: Rng + ?Sized>(&self, config: &PlacementConfig, rng: &mut R) -> Placement {
        if !config.is_samplable() {
            warn!(
                "Cannot sample regions of size {}..={} inside {}x{}",
                config.min_size, config.max_size, config.width, config.height
            );
            return Placement {
                rects: Vec::new(),
                requested: config.target_count,
                attempts: 0,
            };
        }

        self.place_from(config, |cfg| Self::sample_candidate(cfg, rng))
    }

    /// Places regions drawing candidates from `next_candidate`.
    ///
    /// The budget is `target_count * attempts_per_region` candidates.
    pub fn place_from(
        &self,
        config: &PlacementConfig,
        mut next_candidate: impl FnMut(&PlacementConfig) -> Rect,
    ) -> Placement {
        let budget = config.target_count * self.attempts_per_region;
        let mut rects: Vec<Rect> = Vec::with_capacity(config.target_count);
        let mut attempts = 0;

        while rects.len() < config.target_count && attempts < budget {
            attempts += 1;
            let candidate = next_candidate(config);

            if self.accepts(config, &candidate, &rects) {
                rects.push(candidate);
            } else {
                debug!("Rejected candidate {:?} on attempt {}", candidate, attempts);
            }
        }

        let placement = Placement {
            rects,
            requested: config.target_count,
            attempts,
        };

        if placement.is_exhausted() {
            warn!(
                "Placement exhausted after {} attempts: placed {} of {} regions",
                attempts,
                placement.rects.len(),
                config.target_count
            );
        } else {
            debug!(
                "Placed {} regions in {} attempts",
                placement.rects.len(),
                attempts
            );
        }

        placement
    }

    /// Checks a candidate against the size limits, the bounds and every
    /// rectangle accepted so far.
    pub fn accepts(&self, config: &PlacementConfig, candidate: &Rect, accepted: &[Rect]) -> bool {
        let size_ok = (config.min_size..=config.max_size).contains(&candidate.width)
            && (config.min_size..=config.max_size).contains(&candidate.height);

        size_ok
            && config.bounds().contains_rect(candidate)
            && !accepted.iter().any(|existing| existing.intersects(candidate))
    }

    /// Draws a random rectangle that fits inside the bounds.
    fn sample_candidate<R: Rng + ?Sized>(config: &PlacementConfig, rng: &mut R) -> Rect {
        let max_width = config.max_size.min(config.width);
        let max_height = config.max_size.min(config.height);
        let width = rng.gen_range(config.min_size..=max_width);
        let height = rng.gen_range(config.min_size..=max_height);

        let x = rng.gen_range(0..=(config.width - width)) as i32;
        let y = rng.gen_range(0..=(config.height - height)) as i32;

        Rect::new(x, y, width, height)
    }
}

impl Default for RegionPlacer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn small_config(target_count: usize) -> PlacementConfig {
        PlacementConfig {
            width: 800,
            height: 800,
            target_count,
            min_size: 100,
            max_size: 200,
        }
    }

    #[test]
    fn test_placed_regions_never_overlap() {
        let placer = RegionPlacer::new();
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let placement = placer.place(&small_config(8), &mut rng);

            for (i, a) in placement.rects.iter().enumerate() {
                for b in &placement.rects[i + 1..] {
                    assert!(!a.intersects(b), "seed {}: {:?} overlaps {:?}", seed, a, b);
                }
            }
        }
    }

    #[test]
    fn test_placed_regions_respect_bounds_and_sizes() {
        let config = small_config(6);
        let mut rng = StdRng::seed_from_u64(99);
        let placement = RegionPlacer::new().place(&config, &mut rng);

        for rect in &placement.rects {
            assert!(config.bounds().contains_rect(rect));
            assert!((100..=200).contains(&rect.width));
            assert!((100..=200).contains(&rect.height));
        }
        assert!(placement.attempts <= 18);
    }

    #[test]
    fn test_identical_candidate_is_rejected_and_replaced() {
        let duplicate = Rect::new(100, 100, 150, 150);
        let replacement = Rect::new(400, 400, 150, 150);
        let mut script = vec![duplicate, duplicate, replacement].into_iter();

        let placement = RegionPlacer::new().place_from(&small_config(2), |_| {
            script.next().unwrap_or(replacement)
        });

        assert_eq!(placement.rects, vec![duplicate, replacement]);
        assert_eq!(placement.attempts, 3);
        assert!(!placement.is_exhausted());
    }

    #[test]
    fn test_budget_exhaustion_returns_fewer_regions() {
        let blocker = Rect::new(0, 0, 200, 200);

        // Every candidate collides with the first one.
        let placement = RegionPlacer::new().place_from(&small_config(4), |_| blocker);

        assert_eq!(placement.rects.len(), 1);
        assert_eq!(placement.attempts, 12);
        assert!(placement.is_exhausted());
    }

    #[test]
    fn test_out_of_range_candidates_rejected() {
        let placer = RegionPlacer::new();
        let config = small_config(1);

        assert!(!placer.accepts(&config, &Rect::new(0, 0, 99, 150), &[]));
        assert!(!placer.accepts(&config, &Rect::new(0, 0, 150, 201), &[]));
        assert!(
            !placer.accepts(&config, &Rect::new(700, 700, 150, 150), &[])
        );
        assert!(placer.accepts(&config, &Rect::new(650, 650, 150, 150), &[]));
    }

    #[test]
    fn test_unsamplable_config_places_nothing() {
        let mut config = small_config(3);
        config.min_size = 300;
        config.max_size = 200;

        let placement = RegionPlacer::new().place(&config, &mut StdRng::seed_from_u64(1));
        assert!(placement.rects.is_empty());
        assert!(placement.is_exhausted());
    }

    #[test]
    fn test_placement_is_deterministic_per_seed() {
        let placer = RegionPlacer::new();
        let first = placer.place(&small_config(5), &mut StdRng::seed_from_u64(42));
        let second = placer.place(&small_config(5), &mut StdRng::seed_from_u64(42));
        assert_eq!(first, second);
    }
}

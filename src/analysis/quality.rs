//! # Quality Analysis
//!
//! Scores a finished map on a 0-100 scale. Raw metrics are turned into
//! sub-scores through fixed threshold tables, sub-scores are combined into
//! four categories (gameplay, balance, performance, layout), and the
//! categories are combined into one overall score. Each threshold that is
//! missed produces a suggestion naming the regions or connections involved.

use crate::utils::{clamp_score, percentage, threshold_score, weighted_sum};
use crate::{config, ConnectionId, Map, PathFinder, RegionGraph, RegionId, RoleKind};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Fewer incident connections than this is under-connected.
const MIN_BALANCED_DEGREE: usize = 2;
/// More incident connections than this is over-connected.
const MAX_BALANCED_DEGREE: usize = 4;
/// A quadrant deviates when it is further than this share from the mean.
const QUADRANT_TOLERANCE: f64 = 0.5;
/// Corridors longer than this share of the map diagonal are long.
const LONG_CORRIDOR_RATIO: f64 = 0.4;

/// Score for the spawn-to-boss path length in edges; `None` means no path.
///
/// # Examples
///
/// ```
/// use delve::path_length_score;
///
/// assert_eq!(path_length_score(Some(5)), 100.0);
/// assert_eq!(path_length_score(Some(12)), 60.0);
/// assert_eq!(path_length_score(None), 0.0);
/// ```
pub fn path_length_score(length: Option<usize>) -> f64 {
    match length {
        Some(length) => threshold_score(
            length as f64,
            &[(5.0, 100.0), (8.0, 80.0), (12.0, 60.0), (15.0, 40.0)],
            20.0,
        ),
        None => 0.0,
    }
}

/// Score for the number of distinct roles present.
pub fn role_variety_score(distinct_roles: usize) -> f64 {
    match distinct_roles {
        0 => 0.0,
        1 => 20.0,
        2 => 40.0,
        3 => 60.0,
        4 => 80.0,
        _ => 100.0,
    }
}

/// Share of regions whose degree lies in the balanced band.
pub fn degree_balance_score(balanced: usize, region_count: usize) -> f64 {
    percentage(balanced, region_count)
}

/// Loses a quarter for every deviating quadrant.
pub fn quadrant_balance_score(deviating: usize) -> f64 {
    clamp_score(100.0 - 25.0 * deviating as f64)
}

/// Share of non-decreasing difficulty steps along the critical path.
pub fn progression_score(non_decreasing: usize, steps: usize) -> f64 {
    percentage(non_decreasing, steps)
}

pub fn density_score(density: f64) -> f64 {
    if (0.3..=0.6).contains(&density) {
        100.0
    } else if (0.2..=0.7).contains(&density) {
        75.0
    } else if (config::MIN_DENSITY..=config::MAX_DENSITY).contains(&density) {
        50.0
    } else {
        20.0
    }
}

pub fn complexity_score(complexity: f64) -> f64 {
    threshold_score(
        complexity,
        &[(10.0, 100.0), (20.0, 80.0), (25.0, 60.0)],
        40.0,
    )
}

/// Full marks while there are at most two connections per region.
pub fn connection_economy_score(connections: usize, regions: usize) -> f64 {
    if connections <= 2 * regions {
        100.0
    } else {
        60.0
    }
}

/// Score for mean corridor length as a share of the map diagonal.
pub fn corridor_efficiency_score(ratio: f64) -> f64 {
    threshold_score(ratio, &[(0.25, 100.0), (0.4, 80.0), (0.6, 60.0)], 40.0)
}

/// One or two loops reward exploration; none is dull and many is a maze.
pub fn loop_score(cycles: usize) -> f64 {
    match cycles {
        0 => 70.0,
        1 | 2 => 100.0,
        _ => 50.0,
    }
}

/// Per-criterion and per-category weights.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QualityWeights {
    pub path_length: f64,
    pub progression: f64,
    pub role_variety: f64,
    pub degree_balance: f64,
    pub quadrant_balance: f64,
    pub complexity: f64,
    pub connection_economy: f64,
    pub density: f64,
    pub corridor_efficiency: f64,
    pub loops: f64,
    pub gameplay: f64,
    pub balance: f64,
    pub performance: f64,
    pub layout: f64,
}

impl Default for QualityWeights {
    fn default() -> Self {
        Self {
            path_length: 0.4,
            progression: 0.35,
            role_variety: 0.25,
            degree_balance: 0.5,
            quadrant_balance: 0.5,
            complexity: 0.5,
            connection_economy: 0.5,
            density: 0.5,
            corridor_efficiency: 0.3,
            loops: 0.2,
            gameplay: 0.4,
            balance: 0.3,
            performance: 0.2,
            layout: 0.1,
        }
    }
}

impl QualityWeights {
    /// Combines sub-scores into the four categories.
    pub fn categories(&self, sub: &SubScores) -> CategoryScores {
        CategoryScores {
            gameplay: weighted_sum(&[
                (sub.path_length, self.path_length),
                (sub.difficulty_progression, self.progression),
                (sub.role_variety, self.role_variety),
            ]),
            balance: weighted_sum(&[
                (sub.degree_balance, self.degree_balance),
                (sub.quadrant_balance, self.quadrant_balance),
            ]),
            performance: weighted_sum(&[
                (sub.complexity, self.complexity),
                (sub.connection_economy, self.connection_economy),
            ]),
            layout: weighted_sum(&[
                (sub.density, self.density),
                (sub.corridor_efficiency, self.corridor_efficiency),
                (sub.loops, self.loops),
            ]),
        }
    }

    /// Combines the categories into the overall score.
    pub fn overall(&self, categories: &CategoryScores) -> f64 {
        clamp_score(weighted_sum(&[
            (categories.gameplay, self.gameplay),
            (categories.balance, self.balance),
            (categories.performance, self.performance),
            (categories.layout, self.layout),
        ]))
    }
}

/// Raw measurements the scores are derived from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityMetrics {
    /// Shortest spawn-to-boss route, both ends included
    pub critical_path: Option<Vec<RegionId>>,
    pub distinct_roles: usize,
    pub under_connected: Vec<RegionId>,
    pub over_connected: Vec<RegionId>,
    /// Region counts per quadrant: north-west, north-east, south-west, south-east
    pub quadrant_counts: [usize; 4],
    pub deviating_quadrants: usize,
    pub progression_steps: usize,
    pub non_decreasing_steps: usize,
    /// Regions on the critical path that are easier than their predecessor
    pub difficulty_regressions: Vec<RegionId>,
    pub region_count: usize,
    pub connection_count: usize,
    pub density: f64,
    pub complexity: f64,
    /// Mean corridor length divided by the map diagonal
    pub corridor_ratio: f64,
    pub long_corridors: Vec<ConnectionId>,
    pub cycle_count: usize,
}

impl QualityMetrics {
    /// Critical path length in edges.
    pub fn path_length(&self) -> Option<usize> {
        self.critical_path
            .as_ref()
            .map(|path| path.len().saturating_sub(1))
    }

    pub fn balanced_regions(&self) -> usize {
        self.region_count - self.under_connected.len() - self.over_connected.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SubScores {
    pub path_length: f64,
    pub role_variety: f64,
    pub degree_balance: f64,
    pub quadrant_balance: f64,
    pub difficulty_progression: f64,
    pub density: f64,
    pub complexity: f64,
    pub connection_economy: f64,
    pub corridor_efficiency: f64,
    pub loops: f64,
}

impl SubScores {
    pub fn from_metrics(metrics: &QualityMetrics) -> Self {
        Self {
            path_length: path_length_score(metrics.path_length()),
            role_variety: role_variety_score(metrics.distinct_roles),
            degree_balance: degree_balance_score(metrics.balanced_regions(), metrics.region_count),
            quadrant_balance: quadrant_balance_score(metrics.deviating_quadrants),
            difficulty_progression: progression_score(
                metrics.non_decreasing_steps,
                metrics.progression_steps,
            ),
            density: density_score(metrics.density),
            complexity: complexity_score(metrics.complexity),
            connection_economy: connection_economy_score(
                metrics.connection_count,
                metrics.region_count,
            ),
            corridor_efficiency: corridor_efficiency_score(metrics.corridor_ratio),
            loops: loop_score(metrics.cycle_count),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CategoryScores {
    pub gameplay: f64,
    pub balance: f64,
    pub performance: f64,
    pub layout: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SuggestionKind {
    ConnectBoss,
    ShortenCriticalPath,
    SmoothDifficulty,
    AddRoleVariety,
    AddConnections,
    ReduceConnections,
    RebalanceLayout,
    AdjustDensity,
    SimplifyStructure,
    ShortenCorridors,
    AddLoops,
    ReduceLoops,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

/// An actionable improvement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub kind: SuggestionKind,
    pub priority: Priority,
    pub message: String,
    pub region_ids: Vec<RegionId>,
    pub connection_ids: Vec<ConnectionId>,
}

impl Suggestion {
    fn new(kind: SuggestionKind, priority: Priority, message: impl Into<String>) -> Self {
        Self {
            kind,
            priority,
            message: message.into(),
            region_ids: Vec::new(),
            connection_ids: Vec::new(),
        }
    }

    fn regions(mut self, ids: impl IntoIterator<Item = RegionId>) -> Self {
        self.region_ids.extend(ids);
        self
    }

    fn connections(mut self, ids: impl IntoIterator<Item = ConnectionId>) -> Self {
        self.connection_ids.extend(ids);
        self
    }
}

/// Everything the analyzer found about one map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    pub metrics: QualityMetrics,
    pub sub_scores: SubScores,
    pub categories: CategoryScores,
    pub overall: f64,
    /// Highest priority first
    pub suggestions: Vec<Suggestion>,
}

impl QualityReport {
    /// Letter grade for the overall score.
    pub fn grade(&self) -> char {
        match self.overall {
            s if s >= 90.0 => 'S',
            s if s >= 80.0 => 'A',
            s if s >= 70.0 => 'B',
            s if s >= 60.0 => 'C',
            _ => 'D',
        }
    }
}

impl fmt::Display for QualityReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "overall {:.1} ({})", self.overall, self.grade())?;
        write!(
            f,
            "gameplay {:.1}, balance {:.1}, performance {:.1}, layout {:.1}",
            self.categories.gameplay,
            self.categories.balance,
            self.categories.performance,
            self.categories.layout
        )?;
        for suggestion in &self.suggestions {
            write!(f, "\n  [{:?}] {}", suggestion.priority, suggestion.message)?;
        }
        Ok(())
    }
}

/// Read-only quality pass over a finished map.
#[derive(Debug, Clone, Default)]
pub struct QualityAnalyzer {
    weights: QualityWeights,
}

impl QualityAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_weights(weights: QualityWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &QualityWeights {
        &self.weights
    }

    /// Measures, scores and critiques a map.
    pub fn analyze(&self, map: &Map) -> QualityReport {
        let metrics = self.measure(map);
        let sub_scores = SubScores::from_metrics(&metrics);
        let categories = self.weights.categories(&sub_scores);
        let overall = self.weights.overall(&categories);
        let suggestions = self.suggest(&metrics, &sub_scores);

        debug!(
            "Quality of '{}': {:.1} with {} suggestions",
            map.name(),
            overall,
            suggestions.len()
        );

        QualityReport {
            metrics,
            sub_scores,
            categories,
            overall,
            suggestions,
        }
    }

    /// Collects the raw metrics for a map.
    pub fn measure(&self, map: &Map) -> QualityMetrics {
        let graph = RegionGraph::from_map(map);
        let finder = PathFinder::new();

        let critical_path = Self::critical_path(map, &graph, &finder);

        let distinct_roles = map
            .regions()
            .iter()
            .map(|r| r.kind())
            .collect::<BTreeSet<RoleKind>>()
            .len();

        let mut under_connected = Vec::new();
        let mut over_connected = Vec::new();
        for region in map.regions() {
            let degree = graph.neighbors(region.id).len();
            if degree < MIN_BALANCED_DEGREE {
                under_connected.push(region.id);
            } else if degree > MAX_BALANCED_DEGREE {
                over_connected.push(region.id);
            }
        }

        let quadrant_counts = Self::quadrant_counts(map);
        let mean = map.regions().len() as f64 / 4.0;
        let deviating_quadrants = quadrant_counts
            .iter()
            .filter(|&&count| (count as f64 - mean).abs() > QUADRANT_TOLERANCE * mean)
            .count();

        let mut progression_steps = 0;
        let mut non_decreasing_steps = 0;
        let mut difficulty_regressions = Vec::new();
        if let Some(path) = &critical_path {
            for pair in path.windows(2) {
                let before = map.region(pair[0]).map(|r| r.difficulty).unwrap_or(0);
                let after = map.region(pair[1]).map(|r| r.difficulty).unwrap_or(0);
                progression_steps += 1;
                if after >= before {
                    non_decreasing_steps += 1;
                } else {
                    difficulty_regressions.push(pair[1]);
                }
            }
        }

        let diagonal = map.size().diagonal();
        let corridors = map.corridors();
        let corridor_ratio = if corridors.is_empty() || diagonal == 0.0 {
            0.0
        } else {
            let total: f64 = corridors.iter().map(|c| c.length()).sum();
            total / corridors.len() as f64 / diagonal
        };
        let long_corridors = corridors
            .iter()
            .filter(|c| c.length() > LONG_CORRIDOR_RATIO * diagonal)
            .map(|c| c.connection_id)
            .collect();

        QualityMetrics {
            critical_path,
            distinct_roles,
            under_connected,
            over_connected,
            quadrant_counts,
            deviating_quadrants,
            progression_steps,
            non_decreasing_steps,
            difficulty_regressions,
            region_count: map.regions().len(),
            connection_count: map.connections().len(),
            density: map.density(),
            complexity: map.complexity_score(),
            corridor_ratio,
            long_corridors,
            cycle_count: finder.find_cycles(&graph).len(),
        }
    }

    /// Shortest path from the spawn to the nearest boss.
    fn critical_path(map: &Map, graph: &RegionGraph, finder: &PathFinder) -> Option<Vec<RegionId>> {
        let spawn = map.spawn_region()?.id;
        map.boss_regions()
            .iter()
            .filter_map(|boss| finder.shortest_path(graph, spawn, boss.id))
            .min_by_key(|path| path.len())
    }

    fn quadrant_counts(map: &Map) -> [usize; 4] {
        let size = map.size();
        let (mid_x, mid_y) = (size.width as f64 / 2.0, size.height as f64 / 2.0);
        let mut counts = [0; 4];

        for region in map.regions() {
            let (x, y) = region.centroid();
            let east = usize::from(x >= mid_x);
            let south = usize::from(y >= mid_y);
            counts[south * 2 + east] += 1;
        }
        counts
    }

    fn suggest(&self, metrics: &QualityMetrics, sub: &SubScores) -> Vec<Suggestion> {
        let mut suggestions = Vec::new();

        match (&metrics.critical_path, metrics.path_length()) {
            (None, _) => suggestions.push(Suggestion::new(
                SuggestionKind::ConnectBoss,
                Priority::Critical,
                "no route leads from the spawn to a boss",
            )),
            (Some(path), Some(length)) if sub.path_length < 60.0 => suggestions.push(
                Suggestion::new(
                    SuggestionKind::ShortenCriticalPath,
                    Priority::High,
                    format!("critical path is {} connections long", length),
                )
                .regions(path.iter().copied()),
            ),
            _ => {}
        }

        if !metrics.difficulty_regressions.is_empty() {
            suggestions.push(
                Suggestion::new(
                    SuggestionKind::SmoothDifficulty,
                    Priority::High,
                    format!(
                        "difficulty drops {} times on the way to the boss",
                        metrics.difficulty_regressions.len()
                    ),
                )
                .regions(metrics.difficulty_regressions.iter().copied()),
            );
        }

        if sub.role_variety < 60.0 {
            suggestions.push(Suggestion::new(
                SuggestionKind::AddRoleVariety,
                Priority::Low,
                format!("only {} region roles are used", metrics.distinct_roles),
            ));
        }

        if !metrics.under_connected.is_empty() {
            suggestions.push(
                Suggestion::new(
                    SuggestionKind::AddConnections,
                    Priority::Medium,
                    format!("{} regions are dead ends", metrics.under_connected.len()),
                )
                .regions(metrics.under_connected.iter().copied()),
            );
        }

        if !metrics.over_connected.is_empty() {
            suggestions.push(
                Suggestion::new(
                    SuggestionKind::ReduceConnections,
                    Priority::Medium,
                    format!(
                        "{} regions have more than {} connections",
                        metrics.over_connected.len(),
                        MAX_BALANCED_DEGREE
                    ),
                )
                .regions(metrics.over_connected.iter().copied()),
            );
        }

        if metrics.deviating_quadrants > 0 {
            suggestions.push(Suggestion::new(
                SuggestionKind::RebalanceLayout,
                Priority::Low,
                format!(
                    "{} map quadrants are unevenly filled",
                    metrics.deviating_quadrants
                ),
            ));
        }

        if sub.density < 75.0 {
            suggestions.push(Suggestion::new(
                SuggestionKind::AdjustDensity,
                Priority::Medium,
                format!(
                    "region density {:.2} is outside the comfortable band",
                    metrics.density
                ),
            ));
        }

        if sub.complexity < 80.0 {
            suggestions.push(Suggestion::new(
                SuggestionKind::SimplifyStructure,
                Priority::Low,
                format!("complexity score {:.1} is high", metrics.complexity),
            ));
        }

        if sub.corridor_efficiency < 60.0 || !metrics.long_corridors.is_empty() {
            suggestions.push(
                Suggestion::new(
                    SuggestionKind::ShortenCorridors,
                    Priority::Low,
                    format!("{} corridors are long", metrics.long_corridors.len()),
                )
                .connections(metrics.long_corridors.iter().copied()),
            );
        }

        if metrics.cycle_count > 2 {
            suggestions.push(Suggestion::new(
                SuggestionKind::ReduceLoops,
                Priority::Low,
                format!("{} loops make the layout maze-like", metrics.cycle_count),
            ));
        } else if metrics.cycle_count == 0 && metrics.region_count > 3 {
            suggestions.push(Suggestion::new(
                SuggestionKind::AddLoops,
                Priority::Low,
                "a shortcut loop would make exploration less linear",
            ));
        }

        suggestions.sort_by(|a, b| b.priority.cmp(&a.priority));
        suggestions
    }
}

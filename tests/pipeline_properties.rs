//! Property tests over the generation pipeline and graph utilities

use delve::{
    generate, path_length_score, GenerationConfig, PathFinder, PlacementConfig, QualityWeights,
    RegionGraph, RegionId, RegionPlacer, SubScores, Violation,
};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn config_strategy() -> impl Strategy<Value = GenerationConfig> {
    (
        any::<u64>(),
        800u32..=2000,
        800u32..=2000,
        3usize..=10,
        100u32..=200,
        0u32..=150,
        1u32..=10,
        1u32..=100,
        0.0f64..=0.5,
    )
        .prop_map(
            |(seed, width, height, room_count, min_room_size, extra, difficulty, level, chance)| {
                GenerationConfig {
                    width,
                    height,
                    room_count,
                    min_room_size,
                    max_room_size: min_room_size + extra,
                    difficulty,
                    level,
                    extra_connection_chance: chance,
                    ..GenerationConfig::for_testing(seed)
                }
            },
        )
}

/// Hop distances by repeated relaxation over the edge list.
fn brute_force_distance(nodes: u32, edges: &[(u32, u32)], start: u32, goal: u32) -> Option<usize> {
    let mut distance: Vec<Option<usize>> = vec![None; nodes as usize];
    distance[start as usize] = Some(0);

    for _ in 0..nodes {
        for &(a, b) in edges {
            if a == b {
                continue;
            }
            for (from, to) in [(a, b), (b, a)] {
                if let Some(d) = distance[from as usize] {
                    let candidate = d + 1;
                    if distance[to as usize].map_or(true, |current| candidate < current) {
                        distance[to as usize] = Some(candidate);
                    }
                }
            }
        }
    }
    distance[goal as usize]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn placed_regions_never_overlap(
        seed in any::<u64>(),
        target in 3usize..=10,
        min in 100u32..=200,
    ) {
        let config = PlacementConfig {
            width: 1000,
            height: 1000,
            target_count: target,
            min_size: min,
            max_size: min + 100,
        };
        let placement = RegionPlacer::new().place(&config, &mut StdRng::seed_from_u64(seed));

        prop_assert!(placement.rects.len() <= target);
        prop_assert!(placement.attempts <= target * 3);
        for (i, a) in placement.rects.iter().enumerate() {
            prop_assert!(config.bounds().contains_rect(a));
            for b in &placement.rects[i + 1..] {
                prop_assert!(!a.intersects(b));
            }
        }
    }

    #[test]
    fn generated_maps_satisfy_structural_guarantees(config in config_strategy()) {
        let generated = generate(&config).unwrap();
        let map = &generated.map;
        let n = map.regions().len();

        if n >= 3 {
            prop_assert_eq!(map.regions().iter().filter(|r| r.is_spawn()).count(), 1);
            prop_assert!(!map.boss_regions().is_empty());
        }

        if n >= 2 {
            let disconnected = generated.validation.violations.iter().any(|v| {
                matches!(
                    v,
                    Violation::IsolatedRegion { .. } | Violation::UnreachableRegion { .. }
                )
            });
            prop_assert!(!disconnected, "{}", generated.validation);
        }

        prop_assert!(generated.validation.integrity_violations().next().is_none());
        let overlapping = generated
            .validation
            .violations
            .iter()
            .any(|v| matches!(v, Violation::RegionOverlap { .. }));
        prop_assert!(!overlapping, "{}", generated.validation);
        prop_assert_eq!(map.corridors().len(), map.connections().len());
    }

    #[test]
    fn shortest_path_matches_brute_force(
        nodes in 1u32..=20,
        raw_edges in prop::collection::vec((0u32..20, 0u32..20), 0..40),
        start in 0u32..20,
        goal in 0u32..20,
    ) {
        let edges: Vec<(u32, u32)> = raw_edges
            .into_iter()
            .map(|(a, b)| (a % nodes, b % nodes))
            .collect();
        let (start, goal) = (start % nodes, goal % nodes);

        let id_edges: Vec<_> = edges.iter().map(|&(a, b)| (RegionId(a), RegionId(b))).collect();
        let graph = RegionGraph::from_edges((0..nodes).map(RegionId), &id_edges);
        let path = PathFinder::new().shortest_path(&graph, RegionId(start), RegionId(goal));

        let expected = brute_force_distance(nodes, &edges, start, goal);
        prop_assert_eq!(path.as_ref().map(|p| p.len() - 1), expected);

        if let Some(path) = path {
            prop_assert_eq!(path.first(), Some(&RegionId(start)));
            prop_assert_eq!(path.last(), Some(&RegionId(goal)));
            for step in path.windows(2) {
                prop_assert!(graph.neighbors(step[0]).contains(&step[1]));
            }
        }
    }

    #[test]
    fn shorter_paths_never_score_lower(
        shorter in 0usize..30,
        extra in 0usize..30,
        other in 0.0f64..=100.0,
    ) {
        let longer = shorter + extra;
        prop_assert!(
            path_length_score(Some(shorter)) >= path_length_score(Some(longer))
        );

        let weights = QualityWeights::default();
        let base = SubScores {
            role_variety: other,
            difficulty_progression: other,
            ..SubScores::default()
        };
        let short_scores = SubScores {
            path_length: path_length_score(Some(shorter)),
            ..base
        };
        let long_scores = SubScores {
            path_length: path_length_score(Some(longer)),
            ..base
        };

        let short_gameplay = weights.categories(&short_scores).gameplay;
        let long_gameplay = weights.categories(&long_scores).gameplay;
        prop_assert!(short_gameplay >= long_gameplay);
    }
}

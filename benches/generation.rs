//! Benchmarks for the generation pipeline and the analysis passes

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use delve::{generate, CandidateSearch, GenerationConfig, GraphValidator, QualityAnalyzer};

fn bench_generation(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate");
    for rooms in [3usize, 6, 10] {
        let config = GenerationConfig {
            room_count: rooms,
            ..GenerationConfig::for_detailed_generation(42)
        };
        group.bench_with_input(BenchmarkId::from_parameter(rooms), &config, |b, config| {
            b.iter(|| generate(black_box(config)))
        });
    }
    group.finish();

    let config = GenerationConfig::for_testing(42);
    c.bench_function("candidate_search_10", |b| {
        b.iter(|| CandidateSearch::new(10).search(black_box(&config)))
    });
}

fn bench_analysis(c: &mut Criterion) {
    let map = match generate(&GenerationConfig::for_detailed_generation(7)) {
        Ok(generated) => generated.map,
        Err(e) => panic!("benchmark map failed to generate: {}", e),
    };

    let validator = GraphValidator::new();
    c.bench_function("validate", |b| b.iter(|| validator.validate(black_box(&map))));

    let analyzer = QualityAnalyzer::new();
    c.bench_function("analyze", |b| b.iter(|| analyzer.analyze(black_box(&map))));
}

criterion_group!(benches, bench_generation, bench_analysis);
criterion_main!(benches);

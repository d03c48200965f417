//! Benchmarks for selection latency with varying backend counts.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::sync::Arc;
use switchyard::learning::Outcome;
use switchyard::registry::{Backend, Capabilities, Registry};
use switchyard::routing::{ContentDescriptor, Router, RoutingStrategy, ScoringWeights};

const PATTERNS: [&str; 4] = ["*/*", "video/*", "video/mp4", "image/*"];

fn create_backend(id: usize) -> Backend {
    let pattern = PATTERNS[id % PATTERNS.len()];
    let caps = Capabilities::new(vec![pattern.to_string()], (id % 5) as u32).unwrap();
    Backend::new(format!("backend-{:03}", id), caps)
}

/// Registry where each backend already has some history.
fn create_registry(backend_count: usize) -> Arc<Registry> {
    let registry = Arc::new(Registry::new());
    for i in 0..backend_count {
        registry.add_backend(create_backend(i)).unwrap();
        let id = format!("backend-{:03}", i);
        for n in 0..20 {
            let outcome = Outcome::new(&id, (n + i) % 4 != 0, "video/mp4", 20 + (i * 5) as u64);
            registry.record_outcome(&id, &outcome).unwrap();
        }
    }
    registry
}

fn bench_select_by_backend_count(c: &mut Criterion) {
    let mut group = c.benchmark_group("select_hybrid");
    let content = ContentDescriptor::new("video/mp4", 1 << 20);

    for count in [1, 5, 10, 25, 50, 100] {
        let router = Router::new(
            create_registry(count),
            RoutingStrategy::Hybrid,
            ScoringWeights::default(),
        );
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, _| {
            b.iter(|| {
                router
                    .select(black_box(&content), RoutingStrategy::Hybrid, Some("bench"))
                    .unwrap()
            })
        });
    }

    group.finish();
}

fn bench_select_by_strategy(c: &mut Criterion) {
    let mut group = c.benchmark_group("select_strategy");
    let content = ContentDescriptor::new("video/mp4", 1 << 20);
    let router = Router::new(
        create_registry(25),
        RoutingStrategy::Hybrid,
        ScoringWeights::default(),
    );

    for strategy in RoutingStrategy::ALL {
        group.bench_with_input(
            BenchmarkId::from_parameter(strategy.as_str()),
            &strategy,
            |b, &strategy| {
                b.iter(|| {
                    router
                        .select(black_box(&content), strategy, Some("bench"))
                        .unwrap()
                })
            },
        );
    }

    group.finish();
}

fn bench_record_outcome(c: &mut Criterion) {
    let registry = create_registry(10);
    let outcome = Outcome::new("backend-003", true, "video/mp4", 42);

    c.bench_function("record_outcome", |b| {
        b.iter(|| {
            registry
                .record_outcome(black_box("backend-003"), black_box(&outcome))
                .unwrap()
        })
    });
}

criterion_group!(
    benches,
    bench_select_by_backend_count,
    bench_select_by_strategy,
    bench_record_outcome
);
criterion_main!(benches);

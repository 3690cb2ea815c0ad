//! Benchmarks for settle passes.
//!
//! Run with: cargo bench -p htree-pool

use criterion::{BatchSize, BenchmarkId, Criterion, criterion_group, criterion_main};
use htree_core::{BranchingFactor, NodeId};
use htree_pool::{Engine, EngineConfig, ViewportSimulator};
use std::hint::black_box;

/// Engine that has already settled once at every step down `path`.
fn warmed(branching: BranchingFactor, max_pool_size: usize, path: &[u32]) -> (Engine, ViewportSimulator) {
    let config = EngineConfig::default()
        .with_branching_factor(branching)
        .with_max_pool_size(max_pool_size);
    let mut engine = Engine::new(config).unwrap();
    let mut view = ViewportSimulator::new(branching);
    engine.handle_settle(&mut view).unwrap();
    for depth in 1..=path.len() {
        view.focus_on(&NodeId::from_digits(&path[..depth]));
        engine.handle_settle(&mut view).unwrap();
    }
    engine.drain_changes();
    (engine, view)
}

fn bench_steady_settle(c: &mut Criterion) {
    let mut group = c.benchmark_group("pool/settle_steady");

    for (b, max) in [(2u64, 500usize), (5, 500), (13, 2000)] {
        let branching = BranchingFactor::new(b).unwrap();
        let path: Vec<u32> = (0..6).map(|i| (i * 3 + 1) % branching.get()).collect();
        let (mut engine, mut view) = warmed(branching, max, &path);

        group.bench_function(BenchmarkId::new("b", b), |bench| {
            bench.iter(|| {
                let report = engine.handle_settle(&mut view).unwrap();
                engine.drain_changes();
                black_box(report)
            });
        });
    }

    group.finish();
}

fn bench_zoom_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("pool/settle_zoom_step");
    let branching = BranchingFactor::new(3).unwrap();
    let path: Vec<u32> = (0..12).map(|i| i % 3).collect();

    group.bench_function("b3_d12", |bench| {
        bench.iter_batched(
            || warmed(branching, 200, &path[..11]),
            |(mut engine, mut view)| {
                view.focus_on(&NodeId::from_digits(&path));
                black_box(engine.handle_settle(&mut view).unwrap())
            },
            BatchSize::SmallInput,
        );
    });

    group.finish();
}

criterion_group!(benches, bench_steady_settle, bench_zoom_step);
criterion_main!(benches);

//! Benchmarks for lazy reconstruction and scheduler runs.
//!
//! Run with: cargo bench --package hunger-core

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use hunger_core::resource::{reconstruct, ResourceKind, ResourceState};
use hunger_core::{EngineConfig, GateMode, ManualClock, NullSink, ResourceSystem};

fn populated(count: usize, gate: GateMode) -> (Arc<ManualClock>, ResourceSystem<Arc<ManualClock>>) {
    let mut config = EngineConfig::default();
    config.thirst.enabled = true;
    config.scheduler.gate = gate;
    config.scheduler.interval_ms = Some(1_000);
    let clock = Arc::new(ManualClock::new(0));
    let mut system = ResourceSystem::new(Arc::clone(&clock), config);
    if gate == GateMode::Global {
        system.spawn_world_driver();
    }
    for _ in 0..count {
        system.spawn_character().expect("fresh characters cannot regress");
    }
    (clock, system)
}

fn bench_reconstruct(c: &mut Criterion) {
    let state = ResourceState::new(ResourceKind::Hunger, 100.0, 0.01, 0);
    c.bench_function("reconstruct", |b| {
        b.iter(|| reconstruct(black_box(&state), black_box(123_456)));
    });
}

fn bench_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("scheduler_tick");

    for gate in [GateMode::PerEntity, GateMode::Global] {
        for count in [100, 1_000, 10_000] {
            let (clock, mut system) = populated(count, gate);
            group.bench_with_input(
                BenchmarkId::new(format!("{gate:?}"), count),
                &count,
                |b, _| {
                    b.iter(|| {
                        clock.advance(1_000);
                        black_box(system.tick(&NullSink).expect("clock only moves forward"))
                    });
                },
            );
        }
    }

    group.finish();
}

criterion_group!(benches, bench_reconstruct, bench_tick);
criterion_main!(benches);

//! Step throughput of each engine.
//!
//! Covers grid sizes on both sides of the native engine's parallel
//! threshold.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use parawave::prelude::*;

const GRID_SIZES: [usize; 3] = [64, 256, 512];

fn configured(backend: Backend, grid_size: usize) -> Simulation {
    let mut sim = Simulation::with_backend(backend).expect("backend available");
    sim.configure(grid_size, 0.6, 343.0).expect("valid configuration");
    sim
}

/// Benchmark a single `step()` per backend and grid size
fn bench_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine/step");

    for backend in availability::available_backends() {
        for grid_size in GRID_SIZES {
            group.throughput(Throughput::Elements((grid_size * grid_size) as u64));
            group.bench_with_input(
                BenchmarkId::new(backend.as_str(), grid_size),
                &grid_size,
                |b, &grid_size| {
                    let mut sim = configured(backend, grid_size);
                    b.iter(|| {
                        sim.step().expect("step");
                        black_box(sim.clock());
                    });
                },
            );
        }
    }

    group.finish();
}

/// Benchmark a recorded run, including snapshot copies
fn bench_recorded_run(c: &mut Criterion) {
    let mut group = c.benchmark_group("recorder/run");
    group.sample_size(20);

    for backend in availability::available_backends() {
        group.bench_function(BenchmarkId::new(backend.as_str(), 128), |b| {
            let mut sim = configured(backend, 128);
            b.iter(|| {
                sim.reset().expect("reset");
                let result = sim.run(100, 10).expect("run");
                black_box(result.metadata.final_time);
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_step, bench_recorded_run);
criterion_main!(benches);

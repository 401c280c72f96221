//! Graphlet orbit counting benchmarks.
//!
//! Measures per-node orbit counting on perturbed street grids for both
//! graphlet sizes, and the parallel population stage over several grids.
#![expect(
    missing_docs,
    reason = "Criterion macros generate items without doc comments"
)]

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use streetprint_benches::{
    error::BenchSetupError,
    params::CountBenchParams,
    street::{StreetGrid, StreetGridConfig},
};
use streetprint_core::{
    CancellationToken, CountOutcome, GraphletSize, InMemoryStore, ProfilerBuilder, count_orbits,
};

const SEED: u64 = 42;

/// Grid sides to benchmark.
const SIDES: &[usize] = &[10, 20, 40];

fn perturbed(side: usize, seed: u64) -> Result<StreetGrid, BenchSetupError> {
    Ok(StreetGrid::generate(&StreetGridConfig {
        removal: 0.1,
        shortcuts: 0.15,
        seed,
        ..StreetGridConfig::lattice(side, side)
    })?)
}

fn count_orbits_impl(c: &mut Criterion) -> Result<(), BenchSetupError> {
    let mut group = c.benchmark_group("count_orbits");
    group.sample_size(20);

    for size in [GraphletSize::Four, GraphletSize::Five] {
        for &side in SIDES {
            let grid = perturbed(side, SEED)?;
            let params = CountBenchParams {
                width: side,
                height: side,
                size,
            };
            group.bench_with_input(BenchmarkId::from_parameter(params), &grid, |b, input| {
                b.iter(|| count_orbits(input.graph(), size));
            });
        }
    }

    group.finish();
    Ok(())
}

fn count_population_impl(c: &mut Criterion) -> Result<(), BenchSetupError> {
    let mut group = c.benchmark_group("count_population");
    group.sample_size(10);

    let profiler = ProfilerBuilder::new().build()?;
    let grids = (0..8)
        .map(|seed| perturbed(20, seed))
        .collect::<Result<Vec<_>, _>>()?;
    group.bench_function("8x20x20", |b| {
        b.iter(|| {
            // A fresh store per iteration so every unit is recounted.
            let store = InMemoryStore::<CountOutcome>::new();
            profiler.count_population(&grids, &store, &CancellationToken::new())
        });
    });

    group.finish();
    Ok(())
}

fn orbit_counting(c: &mut Criterion) {
    if let Err(err) = count_orbits_impl(c) {
        panic!("count_orbits benchmark setup failed: {err}");
    }
    if let Err(err) = count_population_impl(c) {
        panic!("count_population benchmark setup failed: {err}");
    }
}

criterion_group!(benches, orbit_counting);
criterion_main!(benches);

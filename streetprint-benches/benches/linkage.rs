//! Hierarchical clustering benchmarks.
//!
//! Builds orbit-signature distances once per grid, then measures merge tree
//! construction for each linkage method and the region clustering stage.
#![expect(
    missing_docs,
    reason = "Criterion macros generate items without doc comments"
)]

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use streetprint_benches::{
    error::BenchSetupError,
    params::LinkageBenchParams,
    street::{StreetGrid, StreetGridConfig},
};
use streetprint_core::{
    CancellationToken, ClusterInput, GcmOutcome, GraphletSize, HierarchicalClustering,
    InMemoryStore, LinkageMethod, OrbitWeights, ProfilerBuilder, count_orbits,
    pairwise_orbit_distances,
};

const SEED: u64 = 7;

/// Grid sides to benchmark; entities are `side²` nodes.
const SIDES: &[usize] = &[10, 20, 30];

fn grid(side: usize) -> Result<StreetGrid, BenchSetupError> {
    Ok(StreetGrid::generate(&StreetGridConfig {
        removal: 0.1,
        shortcuts: 0.2,
        seed: SEED,
        ..StreetGridConfig::lattice(side, side)
    })?)
}

fn node_linkage_impl(c: &mut Criterion) -> Result<(), BenchSetupError> {
    let mut group = c.benchmark_group("node_linkage");
    group.sample_size(10);

    let weights = OrbitWeights::for_size(GraphletSize::Four, true);
    for &side in SIDES {
        let grid = grid(side)?;
        let counts = count_orbits(grid.graph(), GraphletSize::Four);
        let distances = pairwise_orbit_distances(&counts, &weights)?;
        for method in [
            LinkageMethod::Single,
            LinkageMethod::Complete,
            LinkageMethod::Average,
            LinkageMethod::Weighted,
        ] {
            let engine =
                HierarchicalClustering::new(ClusterInput::Condensed(distances.clone()), method)?;
            let params = LinkageBenchParams {
                entities: side * side,
                method,
            };
            group.bench_with_input(BenchmarkId::from_parameter(params), &engine, |b, input| {
                b.iter(|| input.build_linkage());
            });
        }
    }

    group.finish();
    Ok(())
}

fn region_clustering_impl(c: &mut Criterion) -> Result<(), BenchSetupError> {
    let mut group = c.benchmark_group("region_clustering");
    group.sample_size(10);

    let profiler = ProfilerBuilder::new().build()?;
    let grid = grid(60)?;
    let counts = profiler.count(grid.graph());
    for block in [6, 10] {
        let districts = grid.districts(block);
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("districts={}", districts.len())),
            &districts,
            |b, membership| {
                b.iter(|| {
                    let store = InMemoryStore::<GcmOutcome>::new();
                    profiler
                        .region_gcms(&counts, membership, &store, &CancellationToken::new())
                        .and_then(|gcms| profiler.cluster_regions(&gcms))
                });
            },
        );
    }

    group.finish();
    Ok(())
}

fn linkage(c: &mut Criterion) {
    if let Err(err) = node_linkage_impl(c) {
        panic!("node_linkage benchmark setup failed: {err}");
    }
    if let Err(err) = region_clustering_impl(c) {
        panic!("region_clustering benchmark setup failed: {err}");
    }
}

criterion_group!(benches, linkage);
criterion_main!(benches);

//! Unit tests for the profiling pipeline stages.
#![expect(clippy::expect_used, reason = "tests require contextual panics")]

use std::{num::NonZeroUsize, sync::Arc};

use rstest::{fixture, rstest};

use super::{CountOutcome, GcmOutcome, Profiler};
use crate::{
    ProfilerBuilder,
    error::{ErrorCode, GraphSourceErrorCode, StreetprintError},
    graph::Graph,
    hierarchy::{FlatCriterion, LinkageMethod},
    orbit::OrbitCountMatrix,
    outcome::{CancellationToken, SkipReason, UnitOutcome},
    region::RegionMembership,
    result::{ClusterId, ClusterLabel},
    store::{InMemoryStore, ResultStore},
    test_utils::CountingSource,
};

#[fixture]
fn profiler() -> Profiler {
    ProfilerBuilder::new()
        .with_node_methods([LinkageMethod::Single, LinkageMethod::Average])
        .with_criterion(FlatCriterion::MaxClusters(
            NonZeroUsize::new(2).expect("non-zero"),
        ))
        .build()
        .expect("valid configuration")
}

fn sources() -> Vec<CountingSource> {
    vec![
        CountingSource::new("path", 4, vec![(0, 1), (1, 2), (2, 3)]),
        CountingSource::new("looped", 2, vec![(0, 0)]),
        CountingSource::new("triangle", 3, vec![(0, 1), (1, 2), (0, 2)]),
    ]
}

#[rstest]
fn population_records_failures_and_keeps_going(profiler: Profiler) {
    let store = InMemoryStore::<CountOutcome>::new();
    let sources = sources();
    let results = profiler
        .count_population(&sources, &store, &CancellationToken::new())
        .expect("batch completes");

    let statuses: Vec<(&str, &str)> = results
        .iter()
        .map(|result| (result.unit.as_ref(), result.outcome.status()))
        .collect();
    assert_eq!(
        statuses,
        [
            ("path", "computed"),
            ("looped", "failed"),
            ("triangle", "computed")
        ]
    );
    let failure = results[1].outcome.failure().expect("looped source fails");
    assert_eq!(failure.code(), ErrorCode::GraphSourceFailure);
    assert_eq!(
        failure.error().graph_source_code(),
        Some(GraphSourceErrorCode::Malformed)
    );
    let triangle = results[2].outcome.computed().expect("triangle counted");
    assert_eq!(triangle.column(3).collect::<Vec<_>>(), [1, 1, 1]);
}

#[rstest]
fn stored_units_are_not_recomputed(profiler: Profiler) {
    let store = InMemoryStore::<CountOutcome>::new();
    let sources = sources();
    let token = CancellationToken::new();
    let first = profiler
        .count_population(&sources, &store, &token)
        .expect("first run");
    let second = profiler
        .count_population(&sources, &store, &token)
        .expect("second run");

    assert_eq!(first, second);
    let loads: Vec<usize> = sources.iter().map(CountingSource::loads).collect();
    // The malformed source is retried; its failure is never stored.
    assert_eq!(loads, [1, 2, 1]);
    assert_eq!(store.len(), 2);
    assert!(!store.contains("looped"));
}

#[rstest]
fn failed_units_are_retried_on_the_next_run(profiler: Profiler) {
    let store = InMemoryStore::<CountOutcome>::new();
    let sources = vec![
        CountingSource::new("flaky", 3, vec![(0, 1), (1, 2)]).failing_first(1),
        CountingSource::new("steady", 2, vec![(0, 1)]),
    ];
    let token = CancellationToken::new();

    let first = profiler
        .count_population(&sources, &store, &token)
        .expect("first run");
    let failure = first[0].outcome.failure().expect("first load fails");
    assert_eq!(
        failure.error().graph_source_code(),
        Some(GraphSourceErrorCode::Unreadable)
    );
    assert_eq!(store.len(), 1);

    let second = profiler
        .count_population(&sources, &store, &token)
        .expect("second run");
    let counts = second[0].outcome.computed().expect("second load succeeds");
    assert_eq!(counts.column(0).collect::<Vec<_>>(), [1, 2, 1]);
    assert_eq!(second[1], first[1]);
    assert_eq!(sources[0].loads(), 2);
    assert_eq!(sources[1].loads(), 1);
    assert_eq!(store.len(), 2);
}

#[rstest]
fn cancelled_batches_leave_units_absent(profiler: Profiler) {
    let store = InMemoryStore::<CountOutcome>::new();
    let token = CancellationToken::new();
    token.cancel();
    let err = profiler
        .count_population(&sources(), &store, &token)
        .expect_err("cancelled before start");
    assert_eq!(
        err,
        StreetprintError::Cancelled {
            unit: Arc::from("path")
        }
    );
    assert!(store.is_empty());
}

#[rstest]
fn duplicate_unit_names_are_rejected(profiler: Profiler) {
    let store = InMemoryStore::<CountOutcome>::new();
    let sources = vec![
        CountingSource::new("same", 2, vec![(0, 1)]),
        CountingSource::new("same", 2, vec![(0, 1)]),
    ];
    let err = profiler
        .count_population(&sources, &store, &CancellationToken::new())
        .expect_err("duplicate names");
    assert!(matches!(err, StreetprintError::InvalidParameter { name: "unit", .. }));
    assert!(sources.iter().all(|source| source.loads() == 0));
}

#[rstest]
fn node_profiles_are_reproducible(profiler: Profiler) {
    let graph = Graph::from_edges(4, &[(0, 1), (1, 2), (2, 3)]).expect("path graph");
    let first = profiler.node_profile(&graph).expect("profile");
    let second = profiler.node_profile(&graph).expect("profile");
    assert_eq!(first, second);

    assert_eq!(first.counts().column(0).collect::<Vec<_>>(), [1, 2, 2, 1]);
    assert_eq!(first.linkages().len(), 2);
    let assigned: Vec<usize> = first.assignments()[0]
        .labels()
        .iter()
        .filter_map(|label| label.cluster().map(ClusterId::get))
        .collect();
    // Ends share one signature and middles another.
    assert_eq!(assigned[0], assigned[3]);
    assert_eq!(assigned[1], assigned[2]);
    assert_ne!(assigned[0], assigned[1]);
}

#[rstest]
fn single_node_graphs_cannot_be_profiled(profiler: Profiler) {
    let graph = Graph::from_edges(1, &[]).expect("single node");
    let err = profiler.node_profile(&graph).expect_err("one node");
    assert!(matches!(err, StreetprintError::EmptyInput { .. }));
}

/// Rows 0..5 rise in every column, rows 5..10 alternate direction by column
/// and rows 10..13 are all ones.
fn region_counts() -> OrbitCountMatrix {
    let mut rows = Vec::new();
    for i in 0..5_u64 {
        rows.push((0..15_u64).map(|c| i * (c + 1) + c).collect());
    }
    for i in 0..5_u64 {
        rows.push(
            (0..15_u64)
                .map(|c| if c % 2 == 0 { i } else { 10 - i })
                .collect(),
        );
    }
    for _ in 0..3 {
        rows.push(vec![1; 15]);
    }
    OrbitCountMatrix::from_rows(15, rows).expect("rectangular rows")
}

fn regions() -> RegionMembership {
    let mut regions = RegionMembership::new();
    for node in 0..5 {
        regions.insert("rising", node);
    }
    for node in 5..10 {
        regions.insert("alternating", node);
    }
    for node in 0..5 {
        regions.insert("rising-again", node);
    }
    for node in 10..13 {
        regions.insert("flat", node);
    }
    regions.declare("empty");
    regions.insert("broken", 99);
    regions
}

#[rstest]
fn region_outcomes_cover_every_state(profiler: Profiler) {
    let store = InMemoryStore::<GcmOutcome>::new();
    let results = profiler
        .region_gcms(&region_counts(), &regions(), &store, &CancellationToken::new())
        .expect("batch completes");

    let by_unit = |unit: &str| {
        results
            .iter()
            .find(|result| result.unit.as_ref() == unit)
            .map(|result| &result.outcome)
            .expect("unit present")
    };
    let rising = by_unit("rising").computed().expect("computed");
    assert!(rising.is_valid());
    assert_eq!(rising.population(), 5);
    let flat = by_unit("flat").computed().expect("computed even if invalid");
    assert!(!flat.is_valid());
    assert_eq!(
        by_unit("empty"),
        &UnitOutcome::Skipped(SkipReason::EmptyRegion)
    );
    assert_eq!(
        by_unit("broken").failure().map(|failure| failure.code()),
        Some(ErrorCode::InvalidParameter)
    );
    assert_eq!(store.len(), 5);
    assert!(store.get("rising").is_some());
    assert!(store.contains("empty"));
    assert!(!store.contains("broken"));
}

#[rstest]
fn region_clusters_leave_unusable_regions_unassigned(profiler: Profiler) {
    let store = InMemoryStore::<GcmOutcome>::new();
    let gcms = profiler
        .region_gcms(&region_counts(), &regions(), &store, &CancellationToken::new())
        .expect("batch completes");
    let clusters = profiler.cluster_regions(&gcms).expect("three usable regions");

    let assigned = |id| Some(ClusterLabel::Assigned(ClusterId::new(id)));
    assert_eq!(clusters.label_of("rising"), assigned(0));
    assert_eq!(clusters.label_of("rising-again"), assigned(0));
    assert_eq!(clusters.label_of("alternating"), assigned(1));
    for unit in ["flat", "empty", "broken"] {
        assert_eq!(clusters.label_of(unit), Some(ClusterLabel::Unassigned));
    }
    assert_eq!(clusters.label_of("unknown"), None);
    assert_eq!(clusters.linkage().entities(), 3);
    assert_eq!(clusters.assignment().unassigned(), 3);
}

#[rstest]
fn region_clustering_needs_two_usable_regions(profiler: Profiler) {
    let mut regions = RegionMembership::new();
    for node in 0..5 {
        regions.insert("only", node);
    }
    regions.declare("empty");
    let store = InMemoryStore::<GcmOutcome>::new();
    let gcms = profiler
        .region_gcms(&region_counts(), &regions, &store, &CancellationToken::new())
        .expect("batch completes");
    let err = profiler.cluster_regions(&gcms).expect_err("one usable region");
    assert!(matches!(err, StreetprintError::EmptyInput { required: 2, .. }));
}

//! Unit tests for linkage construction and flat cluster extraction.
#![expect(clippy::expect_used, reason = "tests require contextual panics")]

use std::num::NonZeroUsize;

use proptest::prelude::*;
use rstest::rstest;

use crate::{
    distance::{FeatureMetric, pairwise_feature_distances, pairwise_orbit_distances},
    error::{MetricFamily, StreetprintError},
    orbit::OrbitCountMatrix,
    result::{ClusterAssignment, ClusterId, ClusterLabel},
    test_utils::suite_proptest_config,
};

use super::{
    ClusterInput, FlatCriterion, HierarchicalClustering, LinkageMethod, Merge, build_linkages,
};

fn points(values: &[f64]) -> ClusterInput {
    ClusterInput::Features {
        rows: values.iter().map(|&value| vec![value]).collect(),
        metric: FeatureMetric::Euclidean,
    }
}

fn engine(values: &[f64], method: LinkageMethod) -> HierarchicalClustering {
    HierarchicalClustering::new(points(values), method).expect("valid one-dimensional input")
}

fn max_clusters(count: usize) -> FlatCriterion {
    FlatCriterion::MaxClusters(NonZeroUsize::new(count).expect("non-zero cluster count"))
}

fn dense(assignment: &ClusterAssignment) -> Vec<usize> {
    assignment
        .labels()
        .iter()
        .map(|label| label.cluster().map_or(usize::MAX, ClusterId::get))
        .collect()
}

#[test]
fn single_linkage_matches_the_reference_tree() {
    let linkage = engine(&[0.0, 1.0, 3.0, 7.0], LinkageMethod::Single).build_linkage();
    assert_eq!(
        linkage.merges(),
        &[
            Merge { left: 0, right: 1, distance: 1.0, size: 2 },
            Merge { left: 2, right: 4, distance: 2.0, size: 3 },
            Merge { left: 3, right: 5, distance: 4.0, size: 4 },
        ]
    );
    assert_eq!(linkage.method(), LinkageMethod::Single);
    assert_eq!(linkage.entities(), 4);
}

#[rstest]
#[case(LinkageMethod::Complete, [1.0, 3.0, 7.0])]
#[case(LinkageMethod::Average, [1.0, 2.5, 17.0 / 3.0])]
#[case(LinkageMethod::Weighted, [1.0, 2.5, 5.25])]
#[case(LinkageMethod::Ward, [1.0, (25.0_f64 / 3.0).sqrt(), 1.5_f64.sqrt() * 17.0 / 3.0])]
fn update_rules_produce_expected_heights(
    #[case] method: LinkageMethod,
    #[case] expected: [f64; 3],
) {
    let heights: Vec<f64> = engine(&[0.0, 1.0, 3.0, 7.0], method)
        .build_linkage()
        .heights()
        .collect();
    assert_eq!(heights.len(), 3);
    for (height, want) in heights.iter().zip(expected) {
        assert!((height - want).abs() < 1e-9, "{method}: {height} != {want}");
    }
}

#[test]
fn ward_on_orbit_distances_is_rejected() {
    let matrix =
        OrbitCountMatrix::from_rows(2, vec![vec![1, 0], vec![2, 1], vec![0, 3]]).expect("rows");
    let weights = crate::distance::OrbitWeights::from_values(vec![0.5, 0.5]).expect("weights");
    let distances = pairwise_orbit_distances(&matrix, &weights).expect("three rows");

    let err = HierarchicalClustering::new(ClusterInput::Condensed(distances), LinkageMethod::Ward)
        .expect_err("orbit distances are not Euclidean");
    assert_eq!(
        err,
        StreetprintError::InvalidMetric {
            method: LinkageMethod::Ward,
            metric: MetricFamily::OrbitSignature,
        }
    );
}

#[rstest]
#[case(FeatureMetric::Cityblock)]
#[case(FeatureMetric::Cosine)]
#[case(FeatureMetric::SquaredEuclidean)]
fn ward_requires_euclidean_features(#[case] metric: FeatureMetric) {
    let input = ClusterInput::Features {
        rows: vec![vec![1.0, 2.0], vec![2.0, 1.0], vec![3.0, 3.0]],
        metric,
    };
    let err = HierarchicalClustering::new(input, LinkageMethod::Ward)
        .expect_err("non-Euclidean features");
    assert!(matches!(err, StreetprintError::InvalidMetric { .. }));
}

#[test]
fn metric_check_precedes_data_validation() {
    let input = ClusterInput::Features {
        rows: vec![vec![f64::NAN]],
        metric: FeatureMetric::Chebyshev,
    };
    let err = HierarchicalClustering::new(input, LinkageMethod::Ward).expect_err("ward");
    assert!(matches!(err, StreetprintError::InvalidMetric { .. }));
}

#[rstest]
#[case(vec![])]
#[case(vec![vec![1.0]])]
fn fewer_than_two_entities_are_rejected(#[case] rows: Vec<Vec<f64>>) {
    let input = ClusterInput::Features {
        rows,
        metric: FeatureMetric::Euclidean,
    };
    let err = HierarchicalClustering::new(input, LinkageMethod::Single).expect_err("too small");
    assert!(matches!(err, StreetprintError::EmptyInput { required: 2, .. }));
}

#[test]
fn non_finite_features_are_rejected() {
    let input = ClusterInput::Features {
        rows: vec![vec![0.0], vec![f64::INFINITY]],
        metric: FeatureMetric::Euclidean,
    };
    let err = HierarchicalClustering::new(input, LinkageMethod::Average).expect_err("infinite");
    assert!(matches!(err, StreetprintError::DegenerateInput { .. }));
}

#[rstest]
#[case(2.0, vec![0, 0, 0, 1])]
#[case(0.5, vec![0, 1, 2, 3])]
#[case(1.0, vec![0, 0, 1, 2])]
#[case(10.0, vec![0, 0, 0, 0])]
fn distance_cut_applies_merges_up_to_the_threshold(
    #[case] height: f64,
    #[case] expected: Vec<usize>,
) {
    let flat = engine(&[0.0, 1.0, 3.0, 7.0], LinkageMethod::Single)
        .flat_clusters(FlatCriterion::Distance(height))
        .expect("finite threshold");
    assert_eq!(dense(&flat), expected);
}

#[test]
fn labels_follow_first_appearance() {
    let flat = engine(&[7.0, 0.0, 1.0, 3.0], LinkageMethod::Single)
        .flat_clusters(FlatCriterion::Distance(2.0))
        .expect("finite threshold");
    assert_eq!(dense(&flat), vec![0, 1, 1, 1]);
}

#[rstest]
#[case(f64::NAN)]
#[case(f64::INFINITY)]
fn non_finite_thresholds_are_rejected(#[case] height: f64) {
    let err = engine(&[0.0, 1.0], LinkageMethod::Single)
        .flat_clusters(FlatCriterion::Distance(height))
        .expect_err("non-finite threshold");
    assert!(matches!(
        err,
        StreetprintError::InvalidParameter { name: "distance_threshold", .. }
    ));
}

#[rstest]
#[case(1, vec![0, 0, 0, 0])]
#[case(2, vec![0, 0, 0, 1])]
#[case(3, vec![0, 0, 1, 2])]
#[case(4, vec![0, 1, 2, 3])]
#[case(9, vec![0, 1, 2, 3])]
fn max_clusters_cuts_to_the_requested_count(#[case] count: usize, #[case] expected: Vec<usize>) {
    let flat = engine(&[0.0, 1.0, 3.0, 7.0], LinkageMethod::Single)
        .flat_clusters(max_clusters(count))
        .expect("valid criterion");
    assert_eq!(dense(&flat), expected);
}

#[test]
fn tied_heights_fall_back_to_fewer_clusters() {
    // Every merge happens at height 1, so two clusters cannot be isolated.
    let flat = engine(&[0.0, 1.0, 2.0, 3.0], LinkageMethod::Single)
        .flat_clusters(max_clusters(2))
        .expect("valid criterion");
    assert_eq!(flat.cluster_count(), 1);
}

#[test]
fn build_linkages_preserves_method_order() {
    let rows = vec![vec![0.0, 0.0], vec![1.0, 0.0], vec![0.0, 4.0], vec![5.0, 5.0]];
    let distances =
        pairwise_feature_distances(&rows, FeatureMetric::Euclidean).expect("valid rows");
    let methods = [
        LinkageMethod::Ward,
        LinkageMethod::Single,
        LinkageMethod::Complete,
    ];
    let linkages = build_linkages(&distances, &methods).expect("Euclidean input");
    let produced: Vec<LinkageMethod> = linkages.iter().map(super::Linkage::method).collect();
    assert_eq!(produced, methods);

    let single = HierarchicalClustering::new(ClusterInput::Condensed(distances), methods[1])
        .expect("valid input")
        .build_linkage();
    assert_eq!(linkages[1], single);
}

#[test]
fn build_linkages_rejects_ward_on_precomputed_input() {
    let distances = crate::distance::CondensedDistances::new(
        3,
        vec![1.0, 2.0, 3.0],
        MetricFamily::Precomputed,
    )
    .expect("valid values");
    let err = build_linkages(&distances, &[LinkageMethod::Single, LinkageMethod::Ward])
        .expect_err("ward needs Euclidean input");
    assert!(matches!(
        err,
        StreetprintError::InvalidMetric { method: LinkageMethod::Ward, .. }
    ));
}

#[test]
fn unassigned_entities_survive_clustering() {
    let flat = engine(&[0.0, 0.2, 9.0], LinkageMethod::Average)
        .flat_clusters(max_clusters(2))
        .expect("valid criterion");
    let spread = flat
        .reinsert_excluded(&[true, false, true, true])
        .expect("three included entities")
        .relabel_by_size();
    assert_eq!(
        spread.labels(),
        &[
            ClusterLabel::Assigned(ClusterId::new(0)),
            ClusterLabel::Unassigned,
            ClusterLabel::Assigned(ClusterId::new(0)),
            ClusterLabel::Assigned(ClusterId::new(1)),
        ]
    );
}

fn feature_rows() -> impl Strategy<Value = Vec<Vec<f64>>> {
    (2_usize..12, 1_usize..4).prop_flat_map(|(entities, width)| {
        prop::collection::vec(prop::collection::vec(-10.0_f64..10.0, width), entities)
    })
}

proptest! {
    #![proptest_config(suite_proptest_config(64))]

    #[test]
    fn merge_trees_are_well_formed(rows in feature_rows()) {
        let n = rows.len();
        let distances = pairwise_feature_distances(&rows, FeatureMetric::Euclidean)
            .expect("generated rows are valid");
        let linkages = build_linkages(&distances, &LinkageMethod::ALL).expect("Euclidean");
        for linkage in linkages {
            let merges = linkage.merges();
            prop_assert_eq!(merges.len(), n - 1);
            prop_assert!(merges.windows(2).all(|pair| pair[0].distance <= pair[1].distance));
            let mut used = vec![false; 2 * n - 1];
            for (step, merge) in merges.iter().enumerate() {
                prop_assert!(merge.left < merge.right);
                prop_assert!(merge.right < n + step);
                prop_assert!(!used[merge.left] && !used[merge.right]);
                used[merge.left] = true;
                used[merge.right] = true;
            }
            prop_assert_eq!(merges[n - 2].size, n);
        }
    }

    #[test]
    fn extreme_cluster_counts_are_exact(rows in feature_rows()) {
        let n = rows.len();
        let input = ClusterInput::Features { rows, metric: FeatureMetric::Euclidean };
        let engine = HierarchicalClustering::new(input, LinkageMethod::Average)
            .expect("generated rows are valid");
        let linkage = engine.build_linkage();

        let one = linkage.flat_clusters(max_clusters(1)).expect("one cluster");
        prop_assert_eq!(one.cluster_count(), 1);

        let all = linkage.flat_clusters(max_clusters(n)).expect("singletons");
        prop_assert_eq!(dense(&all), (0..n).collect::<Vec<_>>());
    }

    #[test]
    fn linkage_is_deterministic(rows in feature_rows()) {
        let input = ClusterInput::Features { rows, metric: FeatureMetric::Euclidean };
        let engine = HierarchicalClustering::new(input, LinkageMethod::Ward)
            .expect("generated rows are valid");
        prop_assert_eq!(engine.build_linkage(), engine.build_linkage());
    }
}

//! Streetprint core library.
//!
//! Structural fingerprints for the nodes and regions of street networks:
//! graphlet orbit counts, a weighted orbit distance, graphlet correlation
//! matrices and hierarchical clustering over both.
#![cfg_attr(docsrs, feature(doc_cfg))]

mod builder;
mod distance;
mod error;
mod gcm;
mod graph;
mod hierarchy;
mod orbit;
mod outcome;
mod profiler;
mod region;
mod result;
mod source;
mod store;

#[cfg(test)]
mod test_utils;

pub use crate::{
    builder::ProfilerBuilder,
    distance::{
        CondensedDistances, FeatureMetric, OrbitWeights, condensed_index, condensed_len,
        orbit_distance, pairwise_feature_distances, pairwise_orbit_distances,
    },
    error::{
        ErrorCode, GraphDefect, GraphSourceError, GraphSourceErrorCode, MetricFamily, Result,
        StreetprintError,
    },
    gcm::{
        GCM_DIMENSION, GCM_ORBITS, GCM_SOURCE_ORBITS, GCM_UPPER_LEN, GcmVectorisation,
        GraphletCorrelationMatrix, average_ranks, build_gcm,
    },
    graph::Graph,
    hierarchy::{
        ClusterInput, FlatCriterion, HierarchicalClustering, Linkage, LinkageMethod, Merge,
        build_linkages,
    },
    orbit::{
        GraphletSize, OrbitCountMatrix, OrbitDescriptor, REDUNDANT_ORBITS, count_orbits,
        describe_orbit, orbit_influence,
    },
    outcome::{CancellationToken, SkipReason, UnitFailure, UnitOutcome, UnitResult},
    profiler::{CountOutcome, GcmOutcome, NodeProfile, Profiler, RegionClusters},
    region::RegionMembership,
    result::{ClusterAssignment, ClusterId, ClusterLabel, NonContiguousClusterIds},
    source::GraphSource,
    store::{InMemoryStore, ResultStore},
};

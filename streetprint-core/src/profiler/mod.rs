//! Structural profiling pipeline.
//!
//! Provides the [`Profiler`] entry point that chains orbit counting, orbit
//! distances, correlation matrices and hierarchical clustering. Batch stages
//! run units in parallel and honour a [`CancellationToken`] between units.
//! Each unit yields one [`UnitOutcome`]; successful ones are kept in a
//! [`ResultStore`].

use std::{collections::HashSet, sync::Arc};

use rayon::prelude::*;
use tracing::{info, instrument, warn};

use crate::{
    distance::{CondensedDistances, FeatureMetric, OrbitWeights, pairwise_orbit_distances},
    error::{Result, StreetprintError},
    gcm::{GcmVectorisation, GraphletCorrelationMatrix, build_gcm},
    graph::Graph,
    hierarchy::{
        ClusterInput, FlatCriterion, HierarchicalClustering, Linkage, LinkageMethod,
        build_linkages,
    },
    orbit::{GraphletSize, OrbitCountMatrix, count_orbits},
    outcome::{CancellationToken, SkipReason, UnitFailure, UnitOutcome, UnitResult},
    region::RegionMembership,
    result::{ClusterAssignment, ClusterLabel},
    source::GraphSource,
    store::ResultStore,
};

/// Orbit counts of one graph, as stored by [`Profiler::count_population`].
pub type CountOutcome = UnitOutcome<Arc<OrbitCountMatrix>>;

/// Correlation matrix of one region, as stored by [`Profiler::region_gcms`].
pub type GcmOutcome = UnitOutcome<Arc<GraphletCorrelationMatrix>>;

/// Runs the profiling stages with one validated configuration.
///
/// Construct instances with [`crate::ProfilerBuilder`].
///
/// # Examples
/// ```
/// use std::num::NonZeroUsize;
/// use streetprint_core::{FlatCriterion, Graph, LinkageMethod, ProfilerBuilder};
///
/// let profiler = ProfilerBuilder::new()
///     .with_node_methods([LinkageMethod::Single])
///     .with_criterion(FlatCriterion::MaxClusters(NonZeroUsize::new(2).expect("non-zero")))
///     .build()?;
/// let path = Graph::from_edges(4, &[(0, 1), (1, 2), (2, 3)])?;
/// let profile = profiler.node_profile(&path)?;
/// assert_eq!(profile.distances().values().len(), 6);
/// assert_eq!(profile.assignments()[0].cluster_count(), 2);
/// # Ok::<(), streetprint_core::StreetprintError>(())
/// ```
#[derive(Clone, Debug)]
pub struct Profiler {
    graphlet_size: GraphletSize,
    weights: OrbitWeights,
    node_methods: Vec<LinkageMethod>,
    gcm_metric: FeatureMetric,
    gcm_method: LinkageMethod,
    gcm_vectorisation: GcmVectorisation,
    criterion: FlatCriterion,
}

/// Node-level profile of one graph.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeProfile {
    counts: OrbitCountMatrix,
    distances: CondensedDistances,
    linkages: Vec<Linkage>,
    assignments: Vec<ClusterAssignment>,
}

impl NodeProfile {
    /// Orbit counts, one row per node.
    #[must_use]
    #[rustfmt::skip]
    pub fn counts(&self) -> &OrbitCountMatrix { &self.counts }

    /// Orbit distances between every node pair.
    #[must_use]
    #[rustfmt::skip]
    pub fn distances(&self) -> &CondensedDistances { &self.distances }

    /// One merge tree per configured node method, in configuration order.
    #[must_use]
    #[rustfmt::skip]
    pub fn linkages(&self) -> &[Linkage] { &self.linkages }

    /// Size-ordered flat clusters, parallel to [`Self::linkages`].
    #[must_use]
    #[rustfmt::skip]
    pub fn assignments(&self) -> &[ClusterAssignment] { &self.assignments }
}

/// Flat clustering of regions by their correlation matrices.
#[derive(Clone, Debug, PartialEq)]
pub struct RegionClusters {
    units: Vec<Arc<str>>,
    linkage: Linkage,
    assignment: ClusterAssignment,
}

impl RegionClusters {
    /// Region ids in the order of [`ClusterAssignment::labels`].
    #[must_use]
    #[rustfmt::skip]
    pub fn units(&self) -> &[Arc<str>] { &self.units }

    /// Merge tree over the clustered regions only.
    #[must_use]
    #[rustfmt::skip]
    pub fn linkage(&self) -> &Linkage { &self.linkage }

    /// Labels for every region; excluded regions are unassigned.
    #[must_use]
    #[rustfmt::skip]
    pub fn assignment(&self) -> &ClusterAssignment { &self.assignment }

    /// Label of `unit`, if it took part in the stage.
    #[must_use]
    pub fn label_of(&self, unit: &str) -> Option<ClusterLabel> {
        self.units
            .iter()
            .position(|candidate| candidate.as_ref() == unit)
            .and_then(|index| self.assignment.labels().get(index).copied())
    }
}

impl Profiler {
    pub(crate) const fn new(
        graphlet_size: GraphletSize,
        weights: OrbitWeights,
        node_methods: Vec<LinkageMethod>,
        gcm_metric: FeatureMetric,
        gcm_method: LinkageMethod,
        gcm_vectorisation: GcmVectorisation,
        criterion: FlatCriterion,
    ) -> Self {
        Self {
            graphlet_size,
            weights,
            node_methods,
            gcm_metric,
            gcm_method,
            gcm_vectorisation,
            criterion,
        }
    }

    /// Largest graphlet counted.
    #[must_use]
    #[rustfmt::skip]
    pub const fn graphlet_size(&self) -> GraphletSize { self.graphlet_size }

    /// Orbit weights used by node distances.
    #[must_use]
    #[rustfmt::skip]
    pub fn weights(&self) -> &OrbitWeights { &self.weights }

    /// Linkage methods for node trees.
    #[must_use]
    #[rustfmt::skip]
    pub fn node_methods(&self) -> &[LinkageMethod] { &self.node_methods }

    /// Metric between vectorised correlation matrices.
    #[must_use]
    #[rustfmt::skip]
    pub const fn gcm_metric(&self) -> FeatureMetric { self.gcm_metric }

    /// Linkage method for region clustering.
    #[must_use]
    #[rustfmt::skip]
    pub const fn gcm_method(&self) -> LinkageMethod { self.gcm_method }

    /// How correlation matrices are flattened for clustering.
    #[must_use]
    #[rustfmt::skip]
    pub const fn gcm_vectorisation(&self) -> GcmVectorisation { self.gcm_vectorisation }

    /// Criterion cutting every tree.
    #[must_use]
    #[rustfmt::skip]
    pub const fn criterion(&self) -> FlatCriterion { self.criterion }

    /// Counts the orbits of `graph` with the configured graphlet size.
    #[must_use]
    pub fn count(&self, graph: &Graph) -> OrbitCountMatrix {
        count_orbits(graph, self.graphlet_size)
    }

    /// Loads and counts every source of a population.
    ///
    /// Units are keyed by [`GraphSource::name`]. Sources already present in
    /// `store` are not reloaded. A source that fails to load is reported as
    /// [`UnitOutcome::Failed`] and the batch continues; the failure is not
    /// stored, so the next run loads the source again.
    ///
    /// # Errors
    /// - [`StreetprintError::InvalidParameter`] when two sources share a
    ///   name.
    /// - [`StreetprintError::Cancelled`] when `cancel` fired before every
    ///   unit ran; finished units remain in `store`.
    #[instrument(name = "profiler.count_population", err, skip_all, fields(units = sources.len()))]
    pub fn count_population<S, R>(
        &self,
        sources: &[S],
        store: &R,
        cancel: &CancellationToken,
    ) -> Result<Vec<UnitResult<Arc<OrbitCountMatrix>>>>
    where
        S: GraphSource + Sync,
        R: ResultStore<CountOutcome>,
    {
        let units: Vec<(Arc<str>, &S)> = sources
            .iter()
            .map(|source| (Arc::from(source.name()), source))
            .collect();
        let size = self.graphlet_size;
        let results = run_batch(&units, store, cancel, |name, source| {
            match source.load_graph() {
                Ok(graph) => UnitOutcome::Computed(Arc::new(count_orbits(&graph, size))),
                Err(error) => {
                    warn!(unit = %name, code = %error.code(), %error, "graph source failed");
                    UnitOutcome::Failed(UnitFailure::new(StreetprintError::GraphSource {
                        source_name: Arc::clone(name),
                        error,
                    }))
                }
            }
        })?;
        log_summary("count_population", &results);
        Ok(results)
    }

    /// Counts orbits of `graph`, then builds node distances, one merge tree
    /// per node method and the matching size-ordered flat clusters.
    ///
    /// # Errors
    /// Returns [`StreetprintError::EmptyInput`] when the graph has fewer than
    /// two nodes.
    #[instrument(
        name = "profiler.node_profile",
        err,
        skip(self, graph),
        fields(nodes = graph.node_count(), size = %self.graphlet_size),
    )]
    pub fn node_profile(&self, graph: &Graph) -> Result<NodeProfile> {
        self.profile_counts(self.count(graph))
    }

    /// Builds the node profile from precomputed orbit counts.
    ///
    /// # Errors
    /// - [`StreetprintError::EmptyInput`] for fewer than two rows.
    /// - [`StreetprintError::DimensionMismatch`] when the count width does
    ///   not match the configured graphlet size.
    pub fn profile_counts(&self, counts: OrbitCountMatrix) -> Result<NodeProfile> {
        let distances = pairwise_orbit_distances(&counts, &self.weights)?;
        let linkages = build_linkages(&distances, &self.node_methods)?;
        let assignments = linkages
            .iter()
            .map(|linkage| {
                linkage
                    .flat_clusters(self.criterion)
                    .map(|flat| flat.relabel_by_size())
            })
            .collect::<Result<Vec<_>>>()?;
        info!(
            nodes = counts.rows(),
            trees = linkages.len(),
            "node profile built"
        );
        Ok(NodeProfile {
            counts,
            distances,
            linkages,
            assignments,
        })
    }

    /// Builds one correlation matrix per region from the orbit counts of the
    /// region's nodes.
    ///
    /// Regions without nodes are [`UnitOutcome::Skipped`]; regions naming
    /// nodes without counts are [`UnitOutcome::Failed`]. A matrix with
    /// non-finite entries is still computed and reports
    /// [`GraphletCorrelationMatrix::is_valid`] as `false`.
    ///
    /// # Errors
    /// Returns [`StreetprintError::Cancelled`] when `cancel` fired before
    /// every region ran.
    #[instrument(
        name = "profiler.region_gcms",
        err,
        skip_all,
        fields(regions = regions.len(), nodes = counts.rows()),
    )]
    pub fn region_gcms<R>(
        &self,
        counts: &OrbitCountMatrix,
        regions: &RegionMembership,
        store: &R,
        cancel: &CancellationToken,
    ) -> Result<Vec<UnitResult<Arc<GraphletCorrelationMatrix>>>>
    where
        R: ResultStore<GcmOutcome>,
    {
        let units: Vec<(Arc<str>, &[usize])> = regions
            .iter()
            .map(|(name, nodes)| (Arc::clone(name), nodes))
            .collect();
        let results = run_batch(&units, store, cancel, |name, nodes| {
            if nodes.is_empty() {
                return UnitOutcome::Skipped(SkipReason::EmptyRegion);
            }
            match counts.select_rows(nodes).and_then(|rows| build_gcm(&rows)) {
                Ok(Some(gcm)) => UnitOutcome::Computed(Arc::new(gcm)),
                Ok(None) => UnitOutcome::Skipped(SkipReason::EmptyRegion),
                Err(error) => {
                    warn!(unit = %name, code = %error.code(), %error, "region failed");
                    UnitOutcome::Failed(error.into())
                }
            }
        })?;
        log_summary("region_gcms", &results);
        Ok(results)
    }

    /// Clusters regions by their vectorised correlation matrices.
    ///
    /// Only computed, valid matrices take part; every other region is
    /// reported as [`ClusterLabel::Unassigned`]. Cluster ids are ordered by
    /// size.
    ///
    /// # Errors
    /// - [`StreetprintError::EmptyInput`] when fewer than two regions can be
    ///   clustered.
    /// - [`StreetprintError::DegenerateInput`] when the configured metric
    ///   cannot compare the vectors (for example a zero vector under cosine
    ///   distance).
    #[instrument(
        name = "profiler.cluster_regions",
        err,
        skip_all,
        fields(regions = gcms.len(), method = %self.gcm_method),
    )]
    pub fn cluster_regions(
        &self,
        gcms: &[UnitResult<Arc<GraphletCorrelationMatrix>>],
    ) -> Result<RegionClusters> {
        let usable = |result: &UnitResult<Arc<GraphletCorrelationMatrix>>| {
            result
                .outcome
                .computed()
                .filter(|gcm| gcm.is_valid())
                .map(|gcm| gcm.vectorise(self.gcm_vectorisation))
        };
        let included: Vec<bool> = gcms.iter().map(|result| usable(result).is_some()).collect();
        let rows: Vec<Vec<f64>> = gcms.iter().filter_map(usable).collect();
        let excluded = gcms.len() - rows.len();
        if excluded > 0 {
            info!(excluded, "regions without a valid matrix are left unassigned");
        }

        let engine = HierarchicalClustering::new(
            ClusterInput::Features {
                rows,
                metric: self.gcm_metric,
            },
            self.gcm_method,
        )?;
        let linkage = engine.build_linkage();
        let assignment = linkage
            .flat_clusters(self.criterion)?
            .reinsert_excluded(&included)?
            .relabel_by_size();
        Ok(RegionClusters {
            units: gcms.iter().map(|result| Arc::clone(&result.unit)).collect(),
            linkage,
            assignment,
        })
    }
}

/// Runs `compute` for every unit not yet in `store`, in parallel.
///
/// Computed and skipped outcomes are stored; failures are returned without
/// being stored.
fn run_batch<U, T, R, F>(
    units: &[(Arc<str>, U)],
    store: &R,
    cancel: &CancellationToken,
    compute: F,
) -> Result<Vec<UnitResult<T>>>
where
    U: Sync,
    T: Clone + Send,
    R: ResultStore<UnitOutcome<T>>,
    F: Fn(&Arc<str>, &U) -> UnitOutcome<T> + Sync,
{
    let mut seen = HashSet::with_capacity(units.len());
    if let Some((name, _)) = units.iter().find(|(name, _)| !seen.insert(Arc::clone(name))) {
        return Err(StreetprintError::InvalidParameter {
            name: "unit",
            value: Arc::clone(name),
            reason: "unit names must be unique within a batch",
        });
    }

    let finished: Vec<Option<UnitResult<T>>> = units
        .par_iter()
        .map(|(name, unit)| {
            if cancel.is_cancelled() {
                return None;
            }
            let outcome = store.get(name).unwrap_or_else(|| {
                let fresh = compute(name, unit);
                if fresh.is_failed() {
                    fresh
                } else {
                    store.put(name, fresh)
                }
            });
            Some(UnitResult {
                unit: Arc::clone(name),
                outcome,
            })
        })
        .collect();

    if let Some((name, _)) = units
        .iter()
        .zip(&finished)
        .find_map(|(unit, result)| result.is_none().then_some(unit))
    {
        let remaining = finished.iter().filter(|result| result.is_none()).count();
        warn!(remaining, "batch cancelled");
        return Err(StreetprintError::Cancelled {
            unit: Arc::clone(name),
        });
    }
    Ok(finished.into_iter().flatten().collect())
}

fn log_summary<T>(stage: &'static str, results: &[UnitResult<T>]) {
    let mut computed = 0_usize;
    let mut failed = 0_usize;
    let mut skipped = 0_usize;
    for result in results {
        match result.outcome {
            UnitOutcome::Computed(_) => computed += 1,
            UnitOutcome::Failed(_) => failed += 1,
            UnitOutcome::Skipped(_) => skipped += 1,
        }
    }
    info!(stage, computed, failed, skipped, "batch finished");
}

#[cfg(test)]
mod tests;

//! Agglomerative hierarchical clustering.
//!
//! The engine validates its input and method up front, builds a merge tree
//! with the nearest-neighbour chain and cuts it into flat clusters:
//!
//! - [`HierarchicalClustering::new`] checks the metric requirements of the
//!   method and the shape and finiteness of the data.
//! - [`HierarchicalClustering::build_linkage`] agglomerates with the
//!   Lance–Williams update of the chosen [`LinkageMethod`] and returns merges
//!   in non-decreasing height order, named `n..2n−1`.
//! - [`Linkage::flat_clusters`] cuts the tree by cluster count or height.
//!
//! Several methods over one input can run concurrently with
//! [`build_linkages`].

mod flat;
mod nn_chain;
mod union_find;

use std::fmt;

use rayon::prelude::*;
use tracing::{debug, info, instrument};

use crate::{
    distance::{CondensedDistances, FeatureMetric, pairwise_feature_distances},
    error::{MetricFamily, Result, StreetprintError},
    result::ClusterAssignment,
};

pub use self::flat::FlatCriterion;

use self::nn_chain::{label_merges, nn_chain};

/// Agglomeration rule deciding the distance between merged clusters.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum LinkageMethod {
    /// Minimum pairwise distance.
    Single,
    /// Maximum pairwise distance.
    Complete,
    /// Unweighted mean pairwise distance (UPGMA).
    Average,
    /// Mean of the two merged clusters' distances (WPGMA).
    Weighted,
    /// Minimum increase of within-cluster variance; requires Euclidean input.
    Ward,
}

impl LinkageMethod {
    /// Every method, in declaration order.
    pub const ALL: [Self; 5] = [
        Self::Single,
        Self::Complete,
        Self::Average,
        Self::Weighted,
        Self::Ward,
    ];

    /// Returns `true` when the method is only defined for Euclidean inputs.
    #[must_use]
    pub const fn requires_euclidean(self) -> bool {
        matches!(self, Self::Ward)
    }

    /// Distance from cluster `i` to the union of `x` and `y`.
    #[expect(
        clippy::cast_precision_loss,
        clippy::float_arithmetic,
        reason = "Lance-Williams updates are weighted sums of cluster sizes and distances"
    )]
    pub(crate) fn lance_williams(
        self,
        d_ix: f64,
        d_iy: f64,
        d_xy: f64,
        size_x: usize,
        size_y: usize,
        size_i: usize,
    ) -> f64 {
        match self {
            Self::Single => d_ix.min(d_iy),
            Self::Complete => d_ix.max(d_iy),
            Self::Average => {
                let (nx, ny) = (size_x as f64, size_y as f64);
                (nx * d_ix + ny * d_iy) / (nx + ny)
            }
            Self::Weighted => 0.5 * (d_ix + d_iy),
            Self::Ward => {
                let (nx, ny, ni) = (size_x as f64, size_y as f64, size_i as f64);
                let total = nx + ny + ni;
                let squared = ((ni + nx) * d_ix * d_ix + (ni + ny) * d_iy * d_iy
                    - ni * d_xy * d_xy)
                    / total;
                squared.max(0.0).sqrt()
            }
        }
    }
}

impl fmt::Display for LinkageMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Single => "single",
            Self::Complete => "complete",
            Self::Average => "average",
            Self::Weighted => "weighted",
            Self::Ward => "ward",
        })
    }
}

/// One agglomeration step.
///
/// Ids below the entity count name entities; id `n + k` names the cluster
/// formed by merge `k`.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Merge {
    /// Smaller child id.
    pub left: usize,
    /// Larger child id.
    pub right: usize,
    /// Merge height.
    pub distance: f64,
    /// Number of entities in the merged cluster.
    pub size: usize,
}

/// A complete merge tree over `entities` entities.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Linkage {
    entities: usize,
    method: LinkageMethod,
    merges: Vec<Merge>,
}

impl Linkage {
    /// Number of clustered entities.
    #[must_use]
    #[rustfmt::skip]
    pub const fn entities(&self) -> usize { self.entities }

    /// Method that produced the tree.
    #[must_use]
    #[rustfmt::skip]
    pub const fn method(&self) -> LinkageMethod { self.method }

    /// The `n − 1` merges in non-decreasing height order.
    #[must_use]
    #[rustfmt::skip]
    pub fn merges(&self) -> &[Merge] { &self.merges }

    /// Merge heights in order.
    pub fn heights(&self) -> impl Iterator<Item = f64> + '_ {
        self.merges.iter().map(|merge| merge.distance)
    }
}

/// Data accepted by the cluster engine.
#[derive(Clone, Debug, PartialEq)]
pub enum ClusterInput {
    /// Precomputed condensed distances.
    Condensed(CondensedDistances),
    /// Real-valued feature rows compared with `metric`.
    Features {
        /// One row per entity.
        rows: Vec<Vec<f64>>,
        /// Metric used to derive pairwise distances.
        metric: FeatureMetric,
    },
}

impl ClusterInput {
    const fn metric_family(&self) -> MetricFamily {
        match self {
            Self::Condensed(distances) => distances.metric(),
            Self::Features { metric, .. } => MetricFamily::Feature(*metric),
        }
    }
}

/// A validated clustering configuration over one input.
///
/// # Examples
/// ```
/// use std::num::NonZeroUsize;
/// use streetprint_core::{
///     ClusterInput, FeatureMetric, FlatCriterion, HierarchicalClustering, LinkageMethod,
/// };
///
/// let rows = vec![vec![0.0], vec![0.1], vec![5.0], vec![5.2]];
/// let engine = HierarchicalClustering::new(
///     ClusterInput::Features { rows, metric: FeatureMetric::Euclidean },
///     LinkageMethod::Ward,
/// )?;
/// let linkage = engine.build_linkage();
/// assert_eq!(linkage.merges().len(), 3);
///
/// let two = NonZeroUsize::new(2).expect("non-zero");
/// let flat = linkage.flat_clusters(FlatCriterion::MaxClusters(two))?;
/// assert_eq!(flat.cluster_count(), 2);
/// # Ok::<(), streetprint_core::StreetprintError>(())
/// ```
#[derive(Clone, Debug)]
pub struct HierarchicalClustering {
    distances: CondensedDistances,
    method: LinkageMethod,
}

impl HierarchicalClustering {
    /// Validates `input` for `method` and prepares its distances.
    ///
    /// # Errors
    /// - [`StreetprintError::InvalidMetric`] when `method` needs Euclidean
    ///   distances and the input is not Euclidean.
    /// - [`StreetprintError::EmptyInput`] for fewer than two entities.
    /// - [`StreetprintError::DimensionMismatch`] for ragged feature rows.
    /// - [`StreetprintError::DegenerateInput`] for non-finite values.
    /// - [`StreetprintError::InvalidParameter`] for an invalid metric
    ///   parameter.
    #[instrument(name = "hierarchy.new", err, skip(input), fields(method = %method))]
    pub fn new(input: ClusterInput, method: LinkageMethod) -> Result<Self> {
        let family = input.metric_family();
        if method.requires_euclidean() && !family.is_euclidean() {
            return Err(StreetprintError::InvalidMetric {
                method,
                metric: family,
            });
        }
        let distances = match input {
            ClusterInput::Condensed(distances) => distances,
            ClusterInput::Features { rows, metric } => pairwise_feature_distances(&rows, metric)?,
        };
        Ok(Self { distances, method })
    }

    /// Validated distances.
    #[must_use]
    #[rustfmt::skip]
    pub fn distances(&self) -> &CondensedDistances { &self.distances }

    /// Configured method.
    #[must_use]
    #[rustfmt::skip]
    pub const fn method(&self) -> LinkageMethod { self.method }

    /// Builds the merge tree.
    #[must_use]
    pub fn build_linkage(&self) -> Linkage {
        linkage_for(&self.distances, self.method)
    }

    /// Builds the merge tree and cuts it with `criterion`.
    ///
    /// # Errors
    /// Returns [`StreetprintError::InvalidParameter`] for a non-finite
    /// distance threshold.
    pub fn flat_clusters(&self, criterion: FlatCriterion) -> Result<ClusterAssignment> {
        self.build_linkage().flat_clusters(criterion)
    }
}

#[instrument(
    name = "hierarchy.linkage",
    skip(distances),
    fields(entities = distances.entities(), method = %method),
)]
fn linkage_for(distances: &CondensedDistances, method: LinkageMethod) -> Linkage {
    let n = distances.entities();
    let merges = label_merges(n, nn_chain(distances, method));
    debug!(merges = merges.len(), "merge tree built");
    Linkage {
        entities: n,
        method,
        merges,
    }
}

/// Builds one merge tree per method over the same distances, in parallel.
///
/// Results are returned in the order of `methods`.
///
/// # Errors
/// Returns [`StreetprintError::InvalidMetric`] when any method needs
/// Euclidean distances the input does not provide; no tree is built in that
/// case.
#[instrument(
    name = "hierarchy.linkages",
    err,
    skip(distances, methods),
    fields(entities = distances.entities(), methods = methods.len()),
)]
pub fn build_linkages(
    distances: &CondensedDistances,
    methods: &[LinkageMethod],
) -> Result<Vec<Linkage>> {
    let metric = distances.metric();
    if let Some(&method) = methods
        .iter()
        .find(|method| method.requires_euclidean() && !metric.is_euclidean())
    {
        return Err(StreetprintError::InvalidMetric { method, metric });
    }
    let linkages: Vec<Linkage> = methods
        .par_iter()
        .map(|&method| linkage_for(distances, method))
        .collect();
    info!(count = linkages.len(), "linkages built");
    Ok(linkages)
}

#[cfg(test)]
mod tests;

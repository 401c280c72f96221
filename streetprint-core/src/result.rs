//! Flat cluster assignments.
//!
//! Provides the per-entity label type, validation of the contiguous
//! identifier constraint and the size-ordered relabelling applied before
//! results are reported.

use std::{cmp::Reverse, collections::BTreeSet, fmt};

use thiserror::Error;

use crate::error::{Result, StreetprintError};

/// Identifier assigned to a cluster.
///
/// # Examples
/// ```
/// use streetprint_core::ClusterId;
///
/// let id = ClusterId::new(4);
/// assert_eq!(id.get(), 4);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ClusterId(usize);

impl ClusterId {
    /// Creates a new cluster identifier.
    #[rustfmt::skip]
    #[must_use]
    pub const fn new(id: usize) -> Self { Self(id) }

    /// Returns the underlying numeric identifier.
    #[rustfmt::skip]
    #[must_use]
    pub const fn get(self) -> usize { self.0 }
}

impl fmt::Display for ClusterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Cluster membership of one entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ClusterLabel {
    /// The entity belongs to the given cluster.
    Assigned(ClusterId),
    /// The entity was excluded from clustering (for example an invalid
    /// correlation matrix or an empty region).
    Unassigned,
}

impl ClusterLabel {
    /// Returns the cluster id, if any.
    #[must_use]
    pub const fn cluster(self) -> Option<ClusterId> {
        match self {
            Self::Assigned(id) => Some(id),
            Self::Unassigned => None,
        }
    }
}

/// Error returned when cluster identifiers are not contiguous starting at zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum NonContiguousClusterIds {
    /// Some entity is assigned but no entity uses cluster `0`.
    #[error("cluster identifiers must include 0")]
    MissingZero,
    /// The assignments skip identifiers.
    #[error("cluster identifiers must be contiguous without gaps")]
    Gap,
}

/// Labels for every entity with cluster ids `0..cluster_count`.
///
/// # Examples
/// ```
/// use streetprint_core::{ClusterAssignment, ClusterId, ClusterLabel};
///
/// let assignment = ClusterAssignment::from_dense(&[1, 0, 1, 1]);
/// let ordered = assignment.relabel_by_size();
/// assert_eq!(ordered.labels()[0], ClusterLabel::Assigned(ClusterId::new(0)));
/// assert_eq!(ordered.labels()[1], ClusterLabel::Assigned(ClusterId::new(1)));
/// assert_eq!(ordered.cluster_sizes(), [3, 1]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClusterAssignment {
    labels: Vec<ClusterLabel>,
    cluster_count: usize,
}

impl ClusterAssignment {
    /// Builds an assignment from dense cluster numbers, one per entity.
    ///
    /// Numbers need not be contiguous; they are compacted preserving their
    /// relative order.
    #[must_use]
    pub fn from_dense(clusters: &[usize]) -> Self {
        let distinct: BTreeSet<usize> = clusters.iter().copied().collect();
        let rank = |value: usize| distinct.range(..value).count();
        Self {
            labels: clusters
                .iter()
                .map(|&value| ClusterLabel::Assigned(ClusterId::new(rank(value))))
                .collect(),
            cluster_count: distinct.len(),
        }
    }

    /// Attempts to build an assignment from explicit labels.
    ///
    /// Unassigned entities are allowed anywhere; assigned ids must cover
    /// `0..k` without gaps. An input with no assigned entity has
    /// `cluster_count == 0`.
    ///
    /// # Errors
    /// Returns [`NonContiguousClusterIds::MissingZero`] when cluster `0` is
    /// absent and [`NonContiguousClusterIds::Gap`] when identifiers skip
    /// values.
    pub fn try_from_labels(
        labels: Vec<ClusterLabel>,
    ) -> core::result::Result<Self, NonContiguousClusterIds> {
        let seen: BTreeSet<usize> = labels
            .iter()
            .filter_map(|label| label.cluster())
            .map(ClusterId::get)
            .collect();
        let Some(&max) = seen.last() else {
            return Ok(Self {
                labels,
                cluster_count: 0,
            });
        };
        if !seen.contains(&0) {
            return Err(NonContiguousClusterIds::MissingZero);
        }
        if max + 1 != seen.len() {
            return Err(NonContiguousClusterIds::Gap);
        }
        Ok(Self {
            labels,
            cluster_count: seen.len(),
        })
    }

    /// Labels in entity order.
    #[must_use]
    #[rustfmt::skip]
    pub fn labels(&self) -> &[ClusterLabel] { &self.labels }

    /// Number of distinct clusters.
    #[must_use]
    #[rustfmt::skip]
    pub const fn cluster_count(&self) -> usize { self.cluster_count }

    /// Number of entities, assigned or not.
    #[must_use]
    #[rustfmt::skip]
    pub fn len(&self) -> usize { self.labels.len() }

    /// Returns `true` when there are no entities.
    #[must_use]
    #[rustfmt::skip]
    pub fn is_empty(&self) -> bool { self.labels.is_empty() }

    /// Number of unassigned entities.
    #[must_use]
    pub fn unassigned(&self) -> usize {
        self.labels
            .iter()
            .filter(|label| matches!(label, ClusterLabel::Unassigned))
            .count()
    }

    /// Member count of each cluster, indexed by cluster id.
    #[must_use]
    #[expect(
        clippy::indexing_slicing,
        reason = "assigned ids are below cluster_count by construction"
    )]
    pub fn cluster_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0; self.cluster_count];
        for id in self.labels.iter().filter_map(|label| label.cluster()) {
            sizes[id.get()] += 1;
        }
        sizes
    }

    /// Renumbers clusters so that `0` is the largest, `1` the next largest,
    /// and so on. Equal sizes keep their original relative order.
    /// Unassigned entities stay unassigned.
    #[must_use]
    #[expect(
        clippy::indexing_slicing,
        reason = "assigned ids are below cluster_count by construction"
    )]
    pub fn relabel_by_size(&self) -> Self {
        let sizes = self.cluster_sizes();
        let mut order: Vec<usize> = (0..self.cluster_count).collect();
        order.sort_by_key(|&id| (Reverse(sizes[id]), id));

        let mut renamed = vec![0; self.cluster_count];
        for (new_id, &old_id) in order.iter().enumerate() {
            renamed[old_id] = new_id;
        }
        Self {
            labels: self
                .labels
                .iter()
                .map(|label| match label {
                    ClusterLabel::Assigned(id) => {
                        ClusterLabel::Assigned(ClusterId::new(renamed[id.get()]))
                    }
                    ClusterLabel::Unassigned => ClusterLabel::Unassigned,
                })
                .collect(),
            cluster_count: self.cluster_count,
        }
    }

    /// Spreads this assignment over a larger entity set: entity `i` of the
    /// result takes the next label of `self` when `included[i]` is `true` and
    /// is [`ClusterLabel::Unassigned`] otherwise.
    ///
    /// # Errors
    /// Returns [`StreetprintError::DimensionMismatch`] when the number of
    /// included entities differs from [`Self::len`].
    pub fn reinsert_excluded(&self, included: &[bool]) -> Result<Self> {
        let kept = included.iter().filter(|&&flag| flag).count();
        if kept != self.labels.len() {
            return Err(StreetprintError::DimensionMismatch {
                row: 0,
                expected: self.labels.len(),
                actual: kept,
            });
        }
        let mut source = self.labels.iter().copied();
        let labels = included
            .iter()
            .map(|&flag| {
                if flag {
                    source.next().unwrap_or(ClusterLabel::Unassigned)
                } else {
                    ClusterLabel::Unassigned
                }
            })
            .collect();
        Ok(Self {
            labels,
            cluster_count: self.cluster_count,
        })
    }
}

//! Cutting merge trees into flat clusters.

use std::num::NonZeroUsize;

use tracing::warn;

use super::{Linkage, Merge, union_find::DisjointSet};
use crate::{
    error::{Result, StreetprintError},
    result::ClusterAssignment,
};

/// Rule for cutting a merge tree.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FlatCriterion {
    /// Cut at the lowest height leaving at most this many clusters.
    MaxClusters(NonZeroUsize),
    /// Apply every merge whose height is at most this value.
    Distance(f64),
}

impl Linkage {
    /// Cuts the tree with `criterion`.
    ///
    /// `MaxClusters(t)` applies the fewest merges that leave at most `t`
    /// clusters without splitting merges of equal height, so exactly `t`
    /// clusters result unless tied heights make that count unreachable.
    /// `Distance(h)` applies all merges of height `≤ h`. Cluster ids are
    /// numbered from `0` in order of first appearance over entity index.
    ///
    /// # Errors
    /// Returns [`StreetprintError::InvalidParameter`] for a non-finite
    /// distance threshold.
    #[expect(
        clippy::indexing_slicing,
        reason = "partition_point and merges_for_count never exceed the merge count"
    )]
    pub fn flat_clusters(&self, criterion: FlatCriterion) -> Result<ClusterAssignment> {
        let applied = match criterion {
            FlatCriterion::MaxClusters(limit) => self.merges_for_count(limit),
            FlatCriterion::Distance(height) => {
                if !height.is_finite() {
                    return Err(StreetprintError::InvalidParameter {
                        name: "distance_threshold",
                        value: height.to_string().into(),
                        reason: "must be finite",
                    });
                }
                self.merges.partition_point(|merge| merge.distance <= height)
            }
        };
        Ok(cut(self.entities, &self.merges[..applied]))
    }

    #[expect(
        clippy::indexing_slicing,
        reason = "k - 1 and k are checked against 0 and the merge count first"
    )]
    fn merges_for_count(&self, limit: NonZeroUsize) -> usize {
        let total = self.merges.len();
        let wanted = self.entities.saturating_sub(limit.get()).min(total);
        // A cut after `k` merges is only realisable by a height threshold when
        // it does not separate merges of equal height.
        let applied = (wanted..=total)
            .find(|&k| {
                k == 0 || k == total || self.merges[k - 1].distance < self.merges[k].distance
            })
            .unwrap_or(total);
        if applied != wanted {
            warn!(
                requested = limit.get(),
                produced = self.entities - applied,
                "tied merge heights prevent the requested cluster count"
            );
        }
        applied
    }
}

#[expect(
    clippy::indexing_slicing,
    reason = "merge children and union-find roots are ids below the grown member table"
)]
fn cut(entities: usize, merges: &[Merge]) -> ClusterAssignment {
    let mut components = DisjointSet::new(entities);
    // Any entity of a merged cluster can stand for it in the union-find.
    let mut member_of: Vec<usize> = (0..entities).collect();
    for merge in merges {
        let (left, right) = (member_of[merge.left], member_of[merge.right]);
        components.merge(left, right, member_of.len());
        member_of.push(left);
    }

    let mut first_seen: Vec<Option<usize>> = vec![None; entities];
    let mut next = 0;
    let dense: Vec<usize> = (0..entities)
        .map(|entity| {
            let root = components.find(entity);
            *first_seen[root].get_or_insert_with(|| {
                next += 1;
                next - 1
            })
        })
        .collect();
    ClusterAssignment::from_dense(&dense)
}

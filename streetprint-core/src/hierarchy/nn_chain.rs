//! Nearest-neighbour-chain agglomeration.
//!
//! Follows chains of nearest neighbours until two clusters are mutual
//! nearest neighbours, merges them and updates distances with the
//! Lance–Williams formula of the chosen method. Clusters live in entity
//! slots: merging `x < y` empties slot `x` and stores the union in `y`.

use super::{LinkageMethod, Merge, union_find::DisjointSet};
use crate::distance::{CondensedDistances, condensed_index};

/// A merge between two entity slots, before dendrogram ids are assigned.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(super) struct SlotMerge {
    pub(super) x: usize,
    pub(super) y: usize,
    pub(super) distance: f64,
}

const fn pair(n: usize, a: usize, b: usize) -> usize {
    if a < b {
        condensed_index(n, a, b)
    } else {
        condensed_index(n, b, a)
    }
}

/// Runs the chain algorithm and returns the merges in discovery order.
#[expect(
    clippy::indexing_slicing,
    reason = "slots and condensed positions are bounded by the entity count"
)]
pub(super) fn nn_chain(distances: &CondensedDistances, method: LinkageMethod) -> Vec<SlotMerge> {
    let n = distances.entities();
    let mut working = distances.values().to_vec();
    let mut size = vec![1_usize; n];
    let mut chain: Vec<usize> = Vec::with_capacity(n);
    let mut merges = Vec::with_capacity(n.saturating_sub(1));

    for _ in 1..n {
        if chain.is_empty() {
            let Some(first) = size.iter().position(|&members| members > 0) else {
                break;
            };
            chain.push(first);
        }

        let (first, second, distance) = loop {
            let Some(&x) = chain.last() else {
                return merges;
            };
            let previous = chain.len().checked_sub(2).map(|index| chain[index]);
            // Ties keep the chain predecessor.
            let mut nearest = previous.map(|p| (p, working[pair(n, x, p)]));
            for (candidate, &members) in size.iter().enumerate() {
                if members == 0 || candidate == x {
                    continue;
                }
                let d = working[pair(n, x, candidate)];
                if nearest.is_none_or(|(_, best)| d < best) {
                    nearest = Some((candidate, d));
                }
            }
            let Some((y, d)) = nearest else {
                return merges;
            };
            if previous == Some(y) {
                break (x, y, d);
            }
            chain.push(y);
        };
        chain.truncate(chain.len() - 2);

        let (x, y) = if first < second {
            (first, second)
        } else {
            (second, first)
        };
        let (nx, ny) = (size[x], size[y]);
        merges.push(SlotMerge { x, y, distance });
        size[x] = 0;
        size[y] = nx + ny;

        for (other, &members) in size.iter().enumerate() {
            if members == 0 || other == y {
                continue;
            }
            let to_x = working[pair(n, other, x)];
            let to_y = working[pair(n, other, y)];
            working[pair(n, other, y)] =
                method.lance_williams(to_x, to_y, distance, nx, ny, members);
        }
    }
    merges
}

/// Orders slot merges by height (stable on ties) and names the merged
/// clusters `n, n + 1, …` with the smaller child id first.
pub(super) fn label_merges(n: usize, mut slots: Vec<SlotMerge>) -> Vec<Merge> {
    slots.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    let mut components = DisjointSet::new(n);
    slots
        .into_iter()
        .enumerate()
        .map(|(step, slot)| {
            let a = components.cluster_of(slot.x);
            let b = components.cluster_of(slot.y);
            let size = components.merge(slot.x, slot.y, n + step);
            Merge {
                left: a.min(b),
                right: a.max(b),
                distance: slot.distance,
                size,
            }
        })
        .collect()
}

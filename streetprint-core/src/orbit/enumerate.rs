//! Per-node orbit counting.
//!
//! Orbits of the edge and the two three-node graphlets come from closed
//! forms. Larger graphlets are enumerated with exclusive subgraph extension:
//! every connected node set is grown from its smallest member, extending only
//! through exclusive neighbours with larger ids, so each set is visited once.

use super::catalog::{Catalog, MAX_NODES, pair_bit};
use crate::graph::Graph;

/// Smallest subgraph size handled by enumeration rather than closed forms.
const FIRST_ENUMERATED: usize = 4;

/// Writes orbits 0 to 3 for every node into the row-major `counts`.
#[expect(
    clippy::indexing_slicing,
    clippy::integer_division,
    reason = "counts holds node_count rows of width columns; d·(d−1) is even"
)]
pub(super) fn count_small_orbits(graph: &Graph, counts: &mut [u64], width: usize) {
    for node in 0..graph.node_count() {
        let neighbours = graph.neighbours(node);
        let degree = as_count(neighbours.len());
        let triangles = triangles_through(graph, node);
        let walks: u64 = neighbours
            .iter()
            .map(|&other| as_count(graph.degree(other)) - 1)
            .sum();

        let row = &mut counts[node * width..(node + 1) * width];
        row[0] = degree;
        row[1] = walks - 2 * triangles;
        row[2] = degree * degree.saturating_sub(1) / 2 - triangles;
        row[3] = triangles;
    }
}

/// Number of edges among the neighbours of `node`.
#[expect(
    clippy::integer_division,
    reason = "every neighbour edge is seen from both ends"
)]
fn triangles_through(graph: &Graph, node: usize) -> u64 {
    let neighbours = graph.neighbours(node);
    let shared: u64 = neighbours
        .iter()
        .map(|&other| sorted_intersection(neighbours, graph.neighbours(other)))
        .sum();
    shared / 2
}

#[expect(clippy::indexing_slicing, reason = "cursors are bounded by the loop guard")]
fn sorted_intersection(left: &[usize], right: &[usize]) -> u64 {
    let (mut i, mut j, mut shared) = (0, 0, 0);
    while i < left.len() && j < right.len() {
        match left[i].cmp(&right[j]) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                shared += 1;
                i += 1;
                j += 1;
            }
        }
    }
    shared
}

fn as_count(value: usize) -> u64 {
    u64::try_from(value).unwrap_or(u64::MAX)
}

/// Enumerates connected induced subgraphs of four up to `max_nodes` nodes
/// and adds each member's orbit to its row.
pub(super) struct SubgraphWalker<'a> {
    graph: &'a Graph,
    catalog: &'a Catalog,
    counts: &'a mut [u64],
    width: usize,
    max_nodes: usize,
    members: [usize; MAX_NODES],
    len: usize,
}

#[expect(
    clippy::indexing_slicing,
    reason = "len never exceeds max_nodes and members are nodes of graph"
)]
impl<'a> SubgraphWalker<'a> {
    pub(super) fn new(
        graph: &'a Graph,
        catalog: &'a Catalog,
        counts: &'a mut [u64],
        width: usize,
        max_nodes: usize,
    ) -> Self {
        Self {
            graph,
            catalog,
            counts,
            width,
            max_nodes: max_nodes.min(MAX_NODES),
            members: [0; MAX_NODES],
            len: 0,
        }
    }

    /// Visits every qualifying subgraph once and returns how many were seen.
    pub(super) fn run(mut self) -> u64 {
        let mut visited = 0;
        for root in 0..self.graph.node_count() {
            self.members[0] = root;
            self.len = 1;
            let extension: Vec<usize> = self
                .graph
                .neighbours(root)
                .iter()
                .copied()
                .filter(|&other| other > root)
                .collect();
            visited += self.extend(root, extension);
        }
        visited
    }

    fn extend(&mut self, root: usize, mut extension: Vec<usize>) -> u64 {
        let mut visited = 0;
        if self.len >= FIRST_ENUMERATED {
            self.record();
            visited += 1;
        }
        if self.len == self.max_nodes {
            return visited;
        }

        while let Some(next) = extension.pop() {
            let mut grown = extension.clone();
            for &candidate in self.graph.neighbours(next) {
                if candidate > root && !self.touches_members(candidate) {
                    grown.push(candidate);
                }
            }
            self.members[self.len] = next;
            self.len += 1;
            visited += self.extend(root, grown);
            self.len -= 1;
        }
        visited
    }

    /// Whether `candidate` is a member or adjacent to one.
    fn touches_members(&self, candidate: usize) -> bool {
        self.members[..self.len]
            .iter()
            .any(|&member| member == candidate || self.graph.has_edge(member, candidate))
    }

    fn record(&mut self) {
        let members = &self.members[..self.len];
        let mut mask = 0_u16;
        for b in 1..members.len() {
            for a in 0..b {
                if self.graph.has_edge(members[a], members[b]) {
                    mask |= 1 << pair_bit(a, b);
                }
            }
        }
        let Some(orbits) = self.catalog.orbits(self.len, mask) else {
            debug_assert!(false, "enumerated subgraph must be connected");
            return;
        };
        for (&node, &orbit) in members.iter().zip(orbits) {
            self.counts[node * self.width + usize::from(orbit)] += 1;
        }
    }
}

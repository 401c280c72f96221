//! Simple undirected graphs consumed by the orbit counter.
//!
//! Nodes are dense identifiers `0..node_count`. Construction validates the
//! simple-graph contract once so counting routines can rely on sorted,
//! duplicate-free adjacency lists.

use std::collections::HashSet;

use crate::error::{GraphDefect, Result, StreetprintError};

/// Immutable simple undirected graph with sorted adjacency lists.
///
/// # Examples
/// ```
/// use streetprint_core::Graph;
///
/// let path = Graph::from_edges(4, &[(0, 1), (1, 2), (2, 3)])?;
/// assert_eq!(path.degree(1), 2);
/// assert!(path.has_edge(2, 1));
/// assert_eq!(path.edge_count(), 3);
/// # Ok::<(), streetprint_core::StreetprintError>(())
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Graph {
    adjacency: Vec<Vec<usize>>,
    edge_count: usize,
}

impl Graph {
    /// Builds a graph from an edge list over `node_count` nodes.
    ///
    /// Nodes that appear in no edge are kept as isolated nodes.
    ///
    /// # Errors
    /// Returns [`StreetprintError::InvalidGraph`] when an edge is a self-loop,
    /// references a node outside `0..node_count`, or repeats an unordered pair
    /// (including the reversed orientation of an earlier edge).
    #[expect(
        clippy::indexing_slicing,
        reason = "endpoints are range-checked before adjacency is touched"
    )]
    pub fn from_edges(node_count: usize, edges: &[(usize, usize)]) -> Result<Self> {
        let mut adjacency = vec![Vec::new(); node_count];
        let mut seen = HashSet::with_capacity(edges.len());

        for &(u, v) in edges {
            for node in [u, v] {
                if node >= node_count {
                    return Err(invalid(GraphDefect::NodeOutOfRange { node, node_count }));
                }
            }
            if u == v {
                return Err(invalid(GraphDefect::SelfLoop { node: u }));
            }
            let (left, right) = if u < v { (u, v) } else { (v, u) };
            if !seen.insert((left, right)) {
                return Err(invalid(GraphDefect::DuplicateEdge { left, right }));
            }
            adjacency[u].push(v);
            adjacency[v].push(u);
        }

        for neighbours in &mut adjacency {
            neighbours.sort_unstable();
        }

        Ok(Self {
            adjacency,
            edge_count: edges.len(),
        })
    }

    /// Returns the number of nodes.
    #[must_use]
    #[rustfmt::skip]
    pub fn node_count(&self) -> usize { self.adjacency.len() }

    /// Returns the number of undirected edges.
    #[must_use]
    #[rustfmt::skip]
    pub const fn edge_count(&self) -> usize { self.edge_count }

    /// Returns the sorted neighbours of `node`.
    ///
    /// # Panics
    /// Panics when `node >= self.node_count()`.
    #[must_use]
    #[expect(clippy::indexing_slicing, reason = "documented panic on unknown nodes")]
    pub fn neighbours(&self, node: usize) -> &[usize] {
        &self.adjacency[node]
    }

    /// Returns the degree of `node`.
    ///
    /// # Panics
    /// Panics when `node >= self.node_count()`.
    #[must_use]
    #[expect(clippy::indexing_slicing, reason = "documented panic on unknown nodes")]
    pub fn degree(&self, node: usize) -> usize {
        self.adjacency[node].len()
    }

    /// Returns `true` when `u` and `v` are adjacent.
    #[must_use]
    pub fn has_edge(&self, u: usize, v: usize) -> bool {
        self.adjacency
            .get(u)
            .is_some_and(|neighbours| neighbours.binary_search(&v).is_ok())
    }

    /// Returns the maximum degree, or `0` for an edgeless graph.
    #[must_use]
    pub fn max_degree(&self) -> usize {
        self.adjacency.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Iterates over every edge once as `(smaller, larger)`.
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.adjacency.iter().enumerate().flat_map(|(u, neighbours)| {
            neighbours
                .iter()
                .copied()
                .filter(move |&v| u < v)
                .map(move |v| (u, v))
        })
    }

    /// Returns a copy of the graph with node `v` renamed to `permutation[v]`.
    ///
    /// # Errors
    /// Returns [`StreetprintError::InvalidParameter`] when `permutation` is not
    /// a permutation of `0..node_count`.
    #[expect(
        clippy::indexing_slicing,
        reason = "targets are range-checked and edges come from this graph"
    )]
    pub fn relabelled(&self, permutation: &[usize]) -> Result<Self> {
        let node_count = self.node_count();
        let mut hit = vec![false; node_count];
        let valid = permutation.len() == node_count
            && permutation
                .iter()
                .all(|&target| target < node_count && !std::mem::replace(&mut hit[target], true));
        if !valid {
            return Err(StreetprintError::InvalidParameter {
                name: "permutation",
                value: format!("{permutation:?}").into(),
                reason: "must be a permutation of 0..node_count",
            });
        }
        let edges: Vec<_> = self
            .edges()
            .map(|(u, v)| (permutation[u], permutation[v]))
            .collect();
        Self::from_edges(node_count, &edges)
    }
}

const fn invalid(defect: GraphDefect) -> StreetprintError {
    StreetprintError::InvalidGraph { defect }
}

#[cfg(test)]
mod tests {
    #![expect(clippy::expect_used, reason = "tests require contextual panics")]

    use super::*;

    use rstest::rstest;

    #[rstest]
    #[case(&[(0, 0)], GraphDefect::SelfLoop { node: 0 })]
    #[case(&[(0, 1), (0, 1)], GraphDefect::DuplicateEdge { left: 0, right: 1 })]
    #[case(&[(0, 2), (2, 0)], GraphDefect::DuplicateEdge { left: 0, right: 2 })]
    #[case(&[(0, 3)], GraphDefect::NodeOutOfRange { node: 3, node_count: 3 })]
    fn rejects_non_simple_graphs(#[case] edges: &[(usize, usize)], #[case] expected: GraphDefect) {
        let err = Graph::from_edges(3, edges).expect_err("graph must be rejected");
        assert_eq!(err, StreetprintError::InvalidGraph { defect: expected });
    }

    #[test]
    fn keeps_isolated_nodes() {
        let graph = Graph::from_edges(5, &[(0, 1)]).expect("valid graph");
        assert_eq!(graph.node_count(), 5);
        assert_eq!(graph.degree(4), 0);
        assert_eq!(graph.max_degree(), 1);
    }

    #[test]
    fn edges_are_reported_once_in_canonical_order() {
        let graph = Graph::from_edges(4, &[(3, 1), (0, 2), (2, 1)]).expect("valid graph");
        let edges: Vec<_> = graph.edges().collect();
        assert_eq!(edges, vec![(0, 2), (1, 2), (1, 3)]);
        assert_eq!(graph.neighbours(1), &[2, 3]);
    }

    #[test]
    fn relabelled_moves_edges() {
        let graph = Graph::from_edges(3, &[(0, 1)]).expect("valid graph");
        let moved = graph.relabelled(&[2, 0, 1]).expect("valid permutation");
        assert!(moved.has_edge(2, 0));
        assert!(!moved.has_edge(0, 1));
    }

    #[test]
    fn relabelled_rejects_repeated_targets() {
        let graph = Graph::from_edges(3, &[(0, 1)]).expect("valid graph");
        let err = graph
            .relabelled(&[0, 0, 1])
            .expect_err("repeated targets are invalid");
        assert!(matches!(err, StreetprintError::InvalidParameter { .. }));
    }
}

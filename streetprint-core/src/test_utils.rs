//! Shared test utilities for `streetprint-core`.

use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use proptest::test_runner::Config as ProptestConfig;
use rand::{Rng, rngs::SmallRng};

use crate::{
    error::GraphSourceError,
    graph::Graph,
    orbit::{GraphletSize, OrbitCountMatrix},
    source::GraphSource,
};

/// Builds the proptest configuration shared by property suites.
///
/// `STREETPRINT_PBT_CASES` overrides `default_cases`.
#[must_use]
pub(crate) fn suite_proptest_config(default_cases: u32) -> ProptestConfig {
    let cases = std::env::var("STREETPRINT_PBT_CASES")
        .ok()
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(default_cases);
    ProptestConfig {
        cases,
        ..ProptestConfig::default()
    }
}

/// Samples an Erdős–Rényi graph with edge probability `density`.
pub(crate) fn random_graph(rng: &mut SmallRng, nodes: usize, density: f64) -> Graph {
    let mut edges = Vec::new();
    for u in 0..nodes {
        for v in (u + 1)..nodes {
            if rng.gen_bool(density) {
                edges.push((u, v));
            }
        }
    }
    match Graph::from_edges(nodes, &edges) {
        Ok(graph) => graph,
        Err(err) => panic!("generated edges are simple: {err}"),
    }
}

/// Counts orbits by testing every node subset of two up to `size` nodes.
pub(crate) fn brute_force_orbits(graph: &Graph, size: GraphletSize) -> OrbitCountMatrix {
    let catalog = crate::orbit::catalog::catalog();
    let width = size.orbit_count();
    let mut counts = vec![vec![0_u64; width]; graph.node_count()];
    let mut members = Vec::with_capacity(size.nodes());
    visit_subsets(graph.node_count(), size.nodes(), 0, &mut members, &mut |subset| {
        if subset.len() < 2 {
            return;
        }
        let mut mask = 0_u16;
        for b in 1..subset.len() {
            for a in 0..b {
                if graph.has_edge(subset[a], subset[b]) {
                    mask |= 1 << (b * (b - 1) / 2 + a);
                }
            }
        }
        if let Some(orbits) = catalog.orbits(subset.len(), mask) {
            for (&node, &orbit) in subset.iter().zip(orbits) {
                counts[node][usize::from(orbit)] += 1;
            }
        }
    });
    match OrbitCountMatrix::from_rows(width, counts) {
        Ok(matrix) => matrix,
        Err(err) => panic!("brute-force rows share a width: {err}"),
    }
}

fn visit_subsets(
    nodes: usize,
    max: usize,
    start: usize,
    members: &mut Vec<usize>,
    visit: &mut impl FnMut(&[usize]),
) {
    visit(members);
    if members.len() == max {
        return;
    }
    for next in start..nodes {
        members.push(next);
        visit_subsets(nodes, max, next + 1, members, visit);
        members.pop();
    }
}

/// [`GraphSource`] that records how often it was loaded.
#[derive(Clone, Debug)]
pub(crate) struct CountingSource {
    name: String,
    node_count: usize,
    edges: Vec<(usize, usize)>,
    loads: Arc<AtomicUsize>,
    outages: Arc<AtomicUsize>,
}

impl CountingSource {
    pub(crate) fn new(name: &str, node_count: usize, edges: Vec<(usize, usize)>) -> Self {
        Self {
            name: name.to_owned(),
            node_count,
            edges,
            loads: Arc::new(AtomicUsize::new(0)),
            outages: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Makes the first `outages` loads fail as unreadable.
    pub(crate) fn failing_first(self, outages: usize) -> Self {
        self.outages.store(outages, Ordering::Relaxed);
        self
    }

    pub(crate) fn loads(&self) -> usize {
        self.loads.load(Ordering::Relaxed)
    }
}

impl GraphSource for CountingSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn load_graph(&self) -> Result<Graph, GraphSourceError> {
        self.loads.fetch_add(1, Ordering::Relaxed);
        let down = self
            .outages
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |left| left.checked_sub(1))
            .is_ok();
        if down {
            return Err(GraphSourceError::Unreadable {
                message: "source temporarily unavailable".into(),
            });
        }
        Graph::from_edges(self.node_count, &self.edges).map_err(|err| {
            GraphSourceError::Malformed {
                line: 0,
                message: err.to_string().into(),
            }
        })
    }
}

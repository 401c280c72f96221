//! Graphlet orbit counting.
//!
//! # Orbit ordering
//!
//! Every table in this crate indexes orbits the same way. Orbits `0..15`
//! follow the established numbering for graphlets of up to four nodes:
//!
//! | orbit | graphlet | position |
//! |---|---|---|
//! | 0 | edge | either end |
//! | 1, 2 | three-node path | end, middle |
//! | 3 | triangle | any |
//! | 4, 5 | four-node path | end, middle |
//! | 6, 7 | claw | leaf, centre |
//! | 8 | four-cycle | any |
//! | 9, 10, 11 | paw | pendant, triangle, centre |
//! | 12, 13 | diamond | degree 2, degree 3 |
//! | 14 | four-clique | any |
//!
//! Orbits `15..73` cover the 21 connected five-node graphlets `G9..G29` in
//! the standard graphlet-degree-vector layout, so five-node matrices are
//! column-compatible with other orbit counters:
//!
//! | orbits | graphlet | orbits | graphlet |
//! |---|---|---|---|
//! | 15–17 | path | 45–48 | diamond with pendant at a degree-2 node |
//! | 18–21 | fork | 49, 50 | complete bipartite 2 × 3 |
//! | 22, 23 | star | 51–53 | house |
//! | 24–26 | bull | 54, 55 | three triangles on one edge |
//! | 27–30 | triangle with a two-edge tail | 56–58 | four-clique with pendant |
//! | 31–33 | triangle with two pendants at one node | 59–61 | gem |
//! | 34 | five-cycle | 62–64 | complete bipartite 2 × 3 plus one edge |
//! | 35–38 | four-cycle with pendant | 65–67 | clique without a two-edge path |
//! | 39–42 | diamond with pendant at a degree-3 node | 68, 69 | wheel |
//! | 43, 44 | bowtie | 70, 71 | clique without one edge |
//! | | | 72 | five-clique |

pub(crate) mod catalog;
mod enumerate;
mod matrix;

use std::fmt;

use tracing::{debug, instrument};

use crate::{
    error::{Result, StreetprintError},
    graph::Graph,
};

pub use self::matrix::OrbitCountMatrix;

use self::{
    catalog::catalog,
    enumerate::{SubgraphWalker, count_small_orbits},
};

/// Orbits whose counts are determined by other orbits and are dropped when
/// building correlation matrices.
pub const REDUNDANT_ORBITS: [usize; 4] = [3, 12, 13, 14];

/// Largest graphlet considered during counting.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GraphletSize {
    /// Graphlets of two to four nodes; 15 orbits.
    #[default]
    Four,
    /// Graphlets of two to five nodes; 73 orbits.
    Five,
}

impl GraphletSize {
    /// Number of nodes in the largest graphlet.
    #[must_use]
    pub const fn nodes(self) -> usize {
        match self {
            Self::Four => 4,
            Self::Five => 5,
        }
    }

    /// Number of orbit columns produced for this size.
    #[must_use]
    pub const fn orbit_count(self) -> usize {
        match self {
            Self::Four => 15,
            Self::Five => 73,
        }
    }
}

impl TryFrom<u8> for GraphletSize {
    type Error = StreetprintError;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            4 => Ok(Self::Four),
            5 => Ok(Self::Five),
            other => Err(StreetprintError::InvalidParameter {
                name: "graphlet_size",
                value: other.to_string().into(),
                reason: "must be 4 or 5",
            }),
        }
    }
}

impl fmt::Display for GraphletSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.nodes())
    }
}

/// Describes the graphlet and influence of one orbit.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct OrbitDescriptor {
    /// Orbit id.
    pub orbit: usize,
    /// Number of nodes in the owning graphlet.
    pub nodes: usize,
    /// Number of edges in the owning graphlet.
    pub edges: u32,
    /// Degree of a node in this orbit within its graphlet.
    pub degree: u32,
    /// Number of distinct orbits this orbit's node can occupy in the
    /// connected subgraphs of its graphlet.
    pub influence: u32,
}

/// Describes `orbit`, or returns `None` when it is not below 73.
#[must_use]
pub fn describe_orbit(orbit: usize) -> Option<OrbitDescriptor> {
    let catalog = catalog();
    let graphlet = catalog.graphlet_of(orbit)?;
    let position = graphlet
        .orbits
        .iter()
        .take(graphlet.nodes)
        .position(|&o| usize::from(o) == orbit)?;
    let degree = (0..graphlet.nodes)
        .filter(|&other| {
            other != position && {
                let (low, high) = (position.min(other), position.max(other));
                graphlet.mask & (1 << catalog::pair_bit(low, high)) != 0
            }
        })
        .count();
    Some(OrbitDescriptor {
        orbit,
        nodes: graphlet.nodes,
        edges: graphlet.edges,
        degree: u32::try_from(degree).ok()?,
        influence: catalog.influence(orbit)?,
    })
}

/// Returns the influence table for the orbits of `size`.
#[must_use]
pub fn orbit_influence(size: GraphletSize) -> Vec<u32> {
    let catalog = catalog();
    (0..size.orbit_count())
        .filter_map(|orbit| catalog.influence(orbit))
        .collect()
}

/// Counts, for every node, the orbits it occupies in graphlets of up to
/// `size` nodes.
///
/// The result has one row per node and [`GraphletSize::orbit_count`]
/// columns. Isolated nodes get all-zero rows.
///
/// # Examples
/// ```
/// use streetprint_core::{Graph, GraphletSize, count_orbits};
///
/// let path = Graph::from_edges(4, &[(0, 1), (1, 2), (2, 3)])?;
/// let counts = count_orbits(&path, GraphletSize::Four);
/// let degrees: Vec<u64> = counts.column(0).collect();
/// assert_eq!(degrees, [1, 2, 2, 1]);
/// assert_eq!(counts.row(0)[4], 1);
/// # Ok::<(), streetprint_core::StreetprintError>(())
/// ```
#[instrument(
    name = "orbit.count",
    skip(graph),
    fields(nodes = graph.node_count(), edges = graph.edge_count(), size = %size),
)]
#[must_use]
pub fn count_orbits(graph: &Graph, size: GraphletSize) -> OrbitCountMatrix {
    let width = size.orbit_count();
    let mut matrix = OrbitCountMatrix::zeroed(graph.node_count(), width);
    let counts = matrix.as_mut_slice();
    count_small_orbits(graph, counts, width);
    let subgraphs = SubgraphWalker::new(graph, catalog(), counts, width, size.nodes()).run();
    debug!(subgraphs, "orbit counting finished");
    matrix
}

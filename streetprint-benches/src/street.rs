//! Seeded synthetic street grids.
//!
//! A grid of `width × height` intersections joined to their horizontal and
//! vertical neighbours. Perturbation removes some street segments and adds
//! diagonal shortcuts, which introduce the triangles absent from a pure
//! lattice.

use rand::{Rng, SeedableRng, rngs::SmallRng};
use streetprint_core::{Graph, GraphSource, GraphSourceError, RegionMembership, StreetprintError};
use thiserror::Error;

/// Configuration for [`StreetGrid::generate`].
#[derive(Clone, Debug, PartialEq)]
pub struct StreetGridConfig {
    /// Intersections per row.
    pub width: usize,
    /// Intersections per column.
    pub height: usize,
    /// Probability of dropping each lattice segment.
    pub removal: f64,
    /// Probability of adding a diagonal across each block.
    pub shortcuts: f64,
    /// Seed of the perturbation.
    pub seed: u64,
}

impl StreetGridConfig {
    /// An unperturbed grid.
    #[must_use]
    pub const fn lattice(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            removal: 0.0,
            shortcuts: 0.0,
            seed: 0,
        }
    }
}

/// Errors raised by the grid generator.
#[derive(Debug, Error)]
pub enum SyntheticError {
    /// A dimension was zero.
    #[error("{parameter} must be positive")]
    ZeroDimension {
        /// Name of the offending dimension.
        parameter: &'static str,
    },
    /// A probability was outside `[0, 1]`.
    #[error("{parameter} must be a probability in [0, 1], got {value}")]
    InvalidProbability {
        /// Name of the offending parameter.
        parameter: &'static str,
        /// Rejected value.
        value: f64,
    },
    /// The generated edges were rejected by the graph model.
    #[error(transparent)]
    Graph(#[from] StreetprintError),
}

/// A generated street grid; node `y * width + x` sits at `(x, y)`.
#[derive(Clone, Debug)]
pub struct StreetGrid {
    name: String,
    width: usize,
    height: usize,
    graph: Graph,
}

impl StreetGrid {
    /// Generates a grid from `config`.
    ///
    /// # Errors
    /// Returns [`SyntheticError`] for zero dimensions or probabilities
    /// outside `[0, 1]`.
    pub fn generate(config: &StreetGridConfig) -> Result<Self, SyntheticError> {
        validate(config)?;
        let StreetGridConfig {
            width,
            height,
            removal,
            shortcuts,
            seed,
        } = *config;
        let mut rng = SmallRng::seed_from_u64(seed);
        let mut edges = Vec::new();
        for y in 0..height {
            for x in 0..width {
                let node = y * width + x;
                if x + 1 < width && !rng.gen_bool(removal) {
                    edges.push((node, node + 1));
                }
                if y + 1 < height && !rng.gen_bool(removal) {
                    edges.push((node, node + width));
                }
                if x + 1 < width && y + 1 < height && rng.gen_bool(shortcuts) {
                    edges.push((node, node + width + 1));
                }
            }
        }
        let graph = Graph::from_edges(width * height, &edges)?;
        Ok(Self {
            name: format!("grid-{width}x{height}-{seed}"),
            width,
            height,
            graph,
        })
    }

    /// The generated graph.
    #[must_use]
    #[rustfmt::skip]
    pub fn graph(&self) -> &Graph { &self.graph }

    /// Tiles the grid into square districts of `block` intersections per
    /// side, named `d{column}-{row}`.
    #[must_use]
    #[expect(
        clippy::integer_division,
        reason = "district coordinates are floor divisions of grid coordinates"
    )]
    pub fn districts(&self, block: usize) -> RegionMembership {
        let side = block.max(1);
        let mut regions = RegionMembership::new();
        for y in 0..self.height {
            for x in 0..self.width {
                let name = format!("d{}-{}", x / side, y / side);
                regions.insert(&name, y * self.width + x);
            }
        }
        regions
    }
}

impl GraphSource for StreetGrid {
    fn name(&self) -> &str {
        &self.name
    }

    fn load_graph(&self) -> Result<Graph, GraphSourceError> {
        Ok(self.graph.clone())
    }
}

fn validate(config: &StreetGridConfig) -> Result<(), SyntheticError> {
    if config.width == 0 {
        return Err(SyntheticError::ZeroDimension { parameter: "width" });
    }
    if config.height == 0 {
        return Err(SyntheticError::ZeroDimension { parameter: "height" });
    }
    for (parameter, value) in [("removal", config.removal), ("shortcuts", config.shortcuts)] {
        if !(0.0..=1.0).contains(&value) {
            return Err(SyntheticError::InvalidProbability { parameter, value });
        }
    }
    Ok(())
}

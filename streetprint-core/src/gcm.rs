//! Graphlet correlation matrices.
//!
//! A population's orbit counts are summarised by the Spearman correlation of
//! every pair of non-redundant orbits. One synthetic all-ones observation is
//! appended before ranking so that columns of zeros still vary.

use tracing::{debug, instrument};

use crate::{
    error::{Result, StreetprintError},
    orbit::{OrbitCountMatrix, REDUNDANT_ORBITS},
};

/// Number of orbit columns read from each row.
pub const GCM_SOURCE_ORBITS: usize = 15;

/// Side length of a graphlet correlation matrix.
pub const GCM_DIMENSION: usize = GCM_SOURCE_ORBITS - REDUNDANT_ORBITS.len();

/// Number of strictly upper-triangular entries.
#[expect(clippy::integer_division, reason = "d·(d−1) is always even")]
pub const GCM_UPPER_LEN: usize = GCM_DIMENSION * (GCM_DIMENSION - 1) / 2;

/// Orbits kept in the matrix, in row order.
pub const GCM_ORBITS: [usize; GCM_DIMENSION] = [0, 1, 2, 4, 5, 6, 7, 8, 9, 10, 11];

/// How a correlation matrix is flattened into a feature row.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GcmVectorisation {
    /// The 55 strictly upper-triangular entries.
    #[default]
    UpperTriangle,
    /// All 121 entries in row-major order.
    Full,
}

/// Spearman correlation matrix over [`GCM_ORBITS`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GraphletCorrelationMatrix {
    values: [[f64; GCM_DIMENSION]; GCM_DIMENSION],
    population: usize,
    valid: bool,
}

impl GraphletCorrelationMatrix {
    /// Correlation between kept orbits `i` and `j` (indices into
    /// [`GCM_ORBITS`]).
    ///
    /// # Panics
    /// Panics when an index is not below [`GCM_DIMENSION`].
    #[must_use]
    #[expect(clippy::indexing_slicing, reason = "documented panic on out-of-range orbits")]
    pub const fn get(&self, i: usize, j: usize) -> f64 {
        self.values[i][j]
    }

    /// The rows of the matrix.
    #[must_use]
    #[rustfmt::skip]
    pub const fn rows(&self) -> &[[f64; GCM_DIMENSION]; GCM_DIMENSION] { &self.values }

    /// Number of observed nodes, excluding the synthetic observation.
    #[must_use]
    #[rustfmt::skip]
    pub const fn population(&self) -> usize { self.population }

    /// `true` when every entry is finite.
    #[must_use]
    #[rustfmt::skip]
    pub const fn is_valid(&self) -> bool { self.valid }

    /// The strictly upper-triangular entries, row by row.
    #[must_use]
    pub fn upper_triangle(&self) -> Vec<f64> {
        let mut out = Vec::with_capacity(GCM_UPPER_LEN);
        for (i, row) in self.values.iter().enumerate() {
            out.extend(row.iter().skip(i + 1));
        }
        out
    }

    /// Flattens the matrix with `mode`.
    #[must_use]
    pub fn vectorise(&self, mode: GcmVectorisation) -> Vec<f64> {
        match mode {
            GcmVectorisation::UpperTriangle => self.upper_triangle(),
            GcmVectorisation::Full => self.values.iter().flatten().copied().collect(),
        }
    }
}

/// Builds the correlation matrix of a node population.
///
/// Returns `Ok(None)` for an empty population. Constant rank columns yield
/// non-finite correlations; such matrices are still returned, flagged by
/// [`GraphletCorrelationMatrix::is_valid`].
///
/// # Errors
/// Returns [`StreetprintError::DimensionMismatch`] when rows have fewer than
/// [`GCM_SOURCE_ORBITS`] columns.
///
/// # Examples
/// ```
/// use streetprint_core::{Graph, GraphletSize, build_gcm, count_orbits};
///
/// let graph = Graph::from_edges(5, &[(0, 1), (1, 2), (2, 3), (3, 0), (0, 2), (3, 4)])?;
/// let counts = count_orbits(&graph, GraphletSize::Four);
/// let gcm = build_gcm(&counts)?.expect("population is not empty");
/// assert_eq!(gcm.upper_triangle().len(), 55);
/// assert_eq!(gcm.population(), 5);
/// # Ok::<(), streetprint_core::StreetprintError>(())
/// ```
#[expect(
    clippy::indexing_slicing,
    reason = "i and j range over GCM_DIMENSION, the length of ranks and values"
)]
#[instrument(name = "gcm.build", err, skip(population), fields(rows = population.rows()))]
pub fn build_gcm(population: &OrbitCountMatrix) -> Result<Option<GraphletCorrelationMatrix>> {
    if population.width() < GCM_SOURCE_ORBITS {
        return Err(StreetprintError::DimensionMismatch {
            row: 0,
            expected: GCM_SOURCE_ORBITS,
            actual: population.width(),
        });
    }
    if population.is_empty() {
        return Ok(None);
    }

    let ranks: Vec<Vec<f64>> = GCM_ORBITS
        .iter()
        .map(|&orbit| {
            let mut column: Vec<u64> = population.column(orbit).collect();
            column.push(1);
            average_ranks(&column)
        })
        .collect();

    let mut values = [[0.0; GCM_DIMENSION]; GCM_DIMENSION];
    for i in 0..GCM_DIMENSION {
        for j in i..GCM_DIMENSION {
            let r = pearson(&ranks[i], &ranks[j]).clamp(-1.0, 1.0);
            values[i][j] = r;
            values[j][i] = r;
        }
    }
    let valid = values.iter().flatten().all(|r| r.is_finite());
    if !valid {
        debug!(rows = population.rows(), "correlation matrix has non-finite entries");
    }

    Ok(Some(GraphletCorrelationMatrix {
        values,
        population: population.rows(),
        valid,
    }))
}

/// One-based ranks with ties sharing the average of their positions.
///
/// # Examples
/// ```
/// use streetprint_core::average_ranks;
///
/// assert_eq!(average_ranks(&[10, 20, 10, 5]), [2.5, 4.0, 2.5, 1.0]);
/// ```
#[must_use]
#[expect(
    clippy::cast_precision_loss,
    clippy::float_arithmetic,
    clippy::indexing_slicing,
    reason = "ranks are averaged positions of an index permutation of values"
)]
pub fn average_ranks(values: &[u64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by_key(|&index| values[index]);

    let mut ranks = vec![0.0; values.len()];
    let mut start = 0;
    while start < order.len() {
        let value = values[order[start]];
        let end = order[start..]
            .iter()
            .position(|&index| values[index] != value)
            .map_or(order.len(), |offset| start + offset);
        // Positions start..end share the mean of ranks start+1..=end.
        let rank = (start + end + 1) as f64 / 2.0;
        for &index in &order[start..end] {
            ranks[index] = rank;
        }
        start = end;
    }
    ranks
}

#[expect(
    clippy::cast_precision_loss,
    clippy::float_arithmetic,
    reason = "Pearson correlation is defined over real-valued ranks"
)]
fn pearson(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len() as f64;
    let mean_x = x.iter().sum::<f64>() / n;
    let mean_y = y.iter().sum::<f64>() / n;
    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for (a, b) in x.iter().zip(y) {
        let (dx, dy) = (a - mean_x, b - mean_y);
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }
    cov / (var_x.sqrt() * var_y.sqrt())
}

//! Condensed pairwise distance matrices and their parallel builders.

use rayon::prelude::*;
use tracing::{debug, instrument};

use super::{
    feature::{FeatureMetric, ensure_finite, ensure_nonzero},
    orbit::{OrbitWeights, validate_weights, weighted_log_distance},
};
use crate::{
    error::{MetricFamily, Result, StreetprintError},
    orbit::OrbitCountMatrix,
};

/// Upper triangle of a symmetric distance matrix, stored row by row.
///
/// Entry `(i, j)` with `i < j` lives at [`condensed_index`]`(n, i, j)`. The
/// matrix remembers the [`MetricFamily`] that produced it so linkage methods
/// with metric requirements can be validated.
///
/// # Examples
/// ```
/// use streetprint_core::{CondensedDistances, MetricFamily};
///
/// let distances = CondensedDistances::new(3, vec![1.0, 2.0, 3.0], MetricFamily::Precomputed)?;
/// assert_eq!(distances.get(2, 1), 3.0);
/// assert_eq!(distances.get(1, 1), 0.0);
/// # Ok::<(), streetprint_core::StreetprintError>(())
/// ```
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CondensedDistances {
    entities: usize,
    values: Vec<f64>,
    metric: MetricFamily,
}

/// Position of pair `(i, j)`, `i < j`, in a condensed matrix over `n` entities.
#[must_use]
#[expect(
    clippy::integer_division,
    reason = "i·(i+1) is always even"
)]
pub const fn condensed_index(n: usize, i: usize, j: usize) -> usize {
    n * i - i * (i + 1) / 2 + j - i - 1
}

/// Number of pairs among `n` entities.
#[must_use]
#[expect(
    clippy::integer_division,
    reason = "n·(n−1) is always even"
)]
pub const fn condensed_len(n: usize) -> usize {
    n * n.saturating_sub(1) / 2
}

impl CondensedDistances {
    /// Wraps precomputed condensed distances.
    ///
    /// # Errors
    /// - [`StreetprintError::EmptyInput`] for fewer than two entities.
    /// - [`StreetprintError::DimensionMismatch`] when `values` does not hold
    ///   `n·(n−1)/2` entries.
    /// - [`StreetprintError::DegenerateInput`] for a negative or non-finite
    ///   distance.
    pub fn new(entities: usize, values: Vec<f64>, metric: MetricFamily) -> Result<Self> {
        ensure_entities(entities)?;
        let expected = condensed_len(entities);
        if values.len() != expected {
            return Err(StreetprintError::DimensionMismatch {
                row: 0,
                expected,
                actual: values.len(),
            });
        }
        if let Some((index, &value)) = values
            .iter()
            .enumerate()
            .find(|&(_, d)| !d.is_finite() || *d < 0.0)
        {
            return Err(StreetprintError::DegenerateInput {
                context: "condensed distances",
                index,
                value,
            });
        }
        Ok(Self {
            entities,
            values,
            metric,
        })
    }

    /// Number of entities.
    #[must_use]
    #[rustfmt::skip]
    pub const fn entities(&self) -> usize { self.entities }

    /// The condensed values.
    #[must_use]
    #[rustfmt::skip]
    pub fn values(&self) -> &[f64] { &self.values }

    /// Metric family that produced the values.
    #[must_use]
    #[rustfmt::skip]
    pub const fn metric(&self) -> MetricFamily { self.metric }

    /// Distance between entities `i` and `j`; zero on the diagonal.
    ///
    /// # Panics
    /// Panics when either index is not below [`Self::entities`].
    #[must_use]
    #[expect(
        clippy::indexing_slicing,
        reason = "both indices are asserted below the entity count"
    )]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        assert!(
            i < self.entities && j < self.entities,
            "pair ({i}, {j}) outside {} entities",
            self.entities
        );
        match i.cmp(&j) {
            std::cmp::Ordering::Equal => 0.0,
            std::cmp::Ordering::Less => self.values[condensed_index(self.entities, i, j)],
            std::cmp::Ordering::Greater => self.values[condensed_index(self.entities, j, i)],
        }
    }

    /// Expands to a dense `n×n` matrix.
    #[must_use]
    pub fn to_square(&self) -> Vec<Vec<f64>> {
        (0..self.entities)
            .map(|i| (0..self.entities).map(|j| self.get(i, j)).collect())
            .collect()
    }
}

fn ensure_entities(entities: usize) -> Result<()> {
    if entities < 2 {
        return Err(StreetprintError::EmptyInput {
            what: "entity set",
            required: 2,
            actual: entities,
        });
    }
    Ok(())
}

/// Computes orbit distances between every pair of rows.
///
/// Rows are processed in parallel; each row's distances are gathered by index
/// so the result matches a sequential pass exactly.
///
/// # Errors
/// - [`StreetprintError::EmptyInput`] for fewer than two rows.
/// - [`StreetprintError::DimensionMismatch`] when the weight count differs
///   from the matrix width.
/// - [`StreetprintError::DegenerateInput`] for an unusable weight.
///
/// # Examples
/// ```
/// use streetprint_core::{
///     Graph, GraphletSize, OrbitWeights, count_orbits, pairwise_orbit_distances,
/// };
///
/// let path = Graph::from_edges(4, &[(0, 1), (1, 2), (2, 3)])?;
/// let counts = count_orbits(&path, GraphletSize::Four);
/// let weights = OrbitWeights::for_size(GraphletSize::Four, true);
/// let distances = pairwise_orbit_distances(&counts, &weights)?;
/// assert_eq!(distances.values().len(), 6);
/// assert_eq!(distances.get(0, 3), 0.0);
/// # Ok::<(), streetprint_core::StreetprintError>(())
/// ```
#[instrument(
    name = "distance.pairwise_orbits",
    err,
    skip(matrix, weights),
    fields(rows = matrix.rows(), width = matrix.width()),
)]
pub fn pairwise_orbit_distances(
    matrix: &OrbitCountMatrix,
    weights: &OrbitWeights,
) -> Result<CondensedDistances> {
    let n = matrix.rows();
    ensure_entities(n)?;
    if weights.len() != matrix.width() {
        return Err(StreetprintError::DimensionMismatch {
            row: 0,
            expected: matrix.width(),
            actual: weights.len(),
        });
    }
    let weight_values = weights.as_slice();
    validate_weights(weight_values)?;

    let rows: Vec<Vec<f64>> = (0..n - 1)
        .into_par_iter()
        .map(|i| {
            let left = matrix.row(i);
            ((i + 1)..n)
                .map(|j| weighted_log_distance(left, matrix.row(j), weight_values))
                .collect()
        })
        .collect();
    let values: Vec<f64> = rows.into_iter().flatten().collect();
    debug!(pairs = values.len(), "orbit distances computed");

    Ok(CondensedDistances {
        entities: n,
        values,
        metric: MetricFamily::OrbitSignature,
    })
}

/// Computes `metric` distances between every pair of feature rows.
///
/// # Errors
/// - [`StreetprintError::EmptyInput`] for fewer than two rows or empty rows.
/// - [`StreetprintError::DimensionMismatch`] for ragged rows.
/// - [`StreetprintError::DegenerateInput`] for non-finite values, or zero rows
///   under cosine distance.
/// - [`StreetprintError::InvalidParameter`] for an invalid Minkowski order.
#[instrument(
    name = "distance.pairwise_features",
    err,
    skip(rows),
    fields(rows = rows.len(), metric = %metric),
)]
pub fn pairwise_feature_distances(
    rows: &[Vec<f64>],
    metric: FeatureMetric,
) -> Result<CondensedDistances> {
    validate_feature_rows(rows, metric)?;
    let n = rows.len();
    let condensed: Vec<Vec<f64>> = rows
        .par_iter()
        .enumerate()
        .map(|(i, left)| {
            rows.iter()
                .skip(i + 1)
                .map(|right| metric.evaluate(left, right))
                .collect()
        })
        .collect();

    Ok(CondensedDistances {
        entities: n,
        values: condensed.into_iter().flatten().collect(),
        metric: MetricFamily::Feature(metric),
    })
}

/// Validates a feature matrix in row order so the first defect is reported.
fn validate_feature_rows(rows: &[Vec<f64>], metric: FeatureMetric) -> Result<()> {
    metric.validate()?;
    ensure_entities(rows.len())?;
    let width = rows.first().map_or(0, Vec::len);
    if width == 0 {
        return Err(StreetprintError::EmptyInput {
            what: "feature row",
            required: 1,
            actual: 0,
        });
    }
    for (index, row) in rows.iter().enumerate() {
        if row.len() != width {
            return Err(StreetprintError::DimensionMismatch {
                row: index,
                expected: width,
                actual: row.len(),
            });
        }
        ensure_finite(row, index)?;
        if metric == FeatureMetric::Cosine {
            ensure_nonzero(row, index)?;
        }
    }
    Ok(())
}

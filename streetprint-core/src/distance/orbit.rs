//! Weighted, log-scaled distance between orbit-count vectors.

use crate::{
    error::{Result, StreetprintError},
    orbit::{GraphletSize, orbit_influence},
};

/// Per-orbit weights `w_i = 1 − ln(o_i) / ln(N)` derived from an influence
/// table `o` of `N` orbits.
///
/// Orbits whose counts are implied by many smaller orbits carry less weight;
/// the largest clique orbit gets weight zero.
///
/// # Examples
/// ```
/// use streetprint_core::{GraphletSize, OrbitWeights};
///
/// let raw = OrbitWeights::for_size(GraphletSize::Four, false);
/// assert_eq!(raw.as_slice()[0], 1.0);
/// assert_eq!(raw.as_slice()[14], 0.0);
///
/// let normalised = OrbitWeights::for_size(GraphletSize::Four, true);
/// let total: f64 = normalised.as_slice().iter().sum();
/// assert!((total - 1.0).abs() < 1e-12);
/// ```
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OrbitWeights {
    values: Vec<f64>,
}

impl OrbitWeights {
    /// Weights for the catalog's influence table of `size`.
    #[must_use]
    pub fn for_size(size: GraphletSize, normalise: bool) -> Self {
        let influence = orbit_influence(size);
        let values = weights_from_influence(&influence);
        let weights = Self { values };
        if normalise { weights.normalised() } else { weights }
    }

    /// Weights for a caller-supplied influence table.
    ///
    /// # Errors
    /// Returns [`StreetprintError::EmptyInput`] for fewer than two entries and
    /// [`StreetprintError::DegenerateInput`] when an entry is zero or exceeds
    /// the table length (which would make a weight negative).
    pub fn from_influence(influence: &[u32], normalise: bool) -> Result<Self> {
        if influence.len() < 2 {
            return Err(StreetprintError::EmptyInput {
                what: "influence table",
                required: 2,
                actual: influence.len(),
            });
        }
        let limit = u32::try_from(influence.len()).unwrap_or(u32::MAX);
        if let Some((index, &value)) = influence
            .iter()
            .enumerate()
            .find(|&(_, &value)| value == 0 || value > limit)
        {
            return Err(StreetprintError::DegenerateInput {
                context: "influence table",
                index,
                value: f64::from(value),
            });
        }
        let weights = Self {
            values: weights_from_influence(influence),
        };
        Ok(if normalise { weights.normalised() } else { weights })
    }

    /// Wraps explicit weights.
    ///
    /// # Errors
    /// Returns [`StreetprintError::EmptyInput`] for an empty vector and
    /// [`StreetprintError::DegenerateInput`] for a negative or non-finite
    /// entry.
    pub fn from_values(values: Vec<f64>) -> Result<Self> {
        validate_weights(&values)?;
        Ok(Self { values })
    }

    /// Returns a copy scaled to unit L1 norm. All-zero weights are returned
    /// unchanged.
    #[must_use]
    #[expect(clippy::float_arithmetic, reason = "L1 normalisation divides by the sum")]
    pub fn normalised(&self) -> Self {
        let total: f64 = self.values.iter().sum();
        if total <= 0.0 {
            return self.clone();
        }
        Self {
            values: self.values.iter().map(|w| w / total).collect(),
        }
    }

    /// Number of weights.
    #[must_use]
    #[rustfmt::skip]
    pub fn len(&self) -> usize { self.values.len() }

    /// Returns `true` when there are no weights.
    #[must_use]
    #[rustfmt::skip]
    pub fn is_empty(&self) -> bool { self.values.is_empty() }

    /// The weights in orbit order.
    #[must_use]
    #[rustfmt::skip]
    pub fn as_slice(&self) -> &[f64] { &self.values }
}

#[expect(clippy::float_arithmetic, reason = "weights are a logarithmic ratio")]
fn weights_from_influence(influence: &[u32]) -> Vec<f64> {
    let scale = f64::from(u32::try_from(influence.len()).unwrap_or(u32::MAX)).ln();
    influence
        .iter()
        .map(|&value| (1.0 - f64::from(value).ln() / scale).max(0.0))
        .collect()
}

pub(crate) fn validate_weights(weights: &[f64]) -> Result<()> {
    if weights.is_empty() {
        return Err(StreetprintError::EmptyInput {
            what: "weight vector",
            required: 1,
            actual: 0,
        });
    }
    if let Some((index, &value)) = weights
        .iter()
        .enumerate()
        .find(|&(_, &w)| !w.is_finite() || w < 0.0)
    {
        return Err(StreetprintError::DegenerateInput {
            context: "orbit weights",
            index,
            value,
        });
    }
    Ok(())
}

/// Weighted log-scaled distance between two orbit-count vectors.
///
/// Each coordinate is scaled as `ln(x + 1) / ln(max(u_i, v_i) + 2)` before
/// taking the weighted absolute difference, so the result is finite and
/// non-negative for any counts, including all-zero vectors.
///
/// # Errors
/// - [`StreetprintError::EmptyInput`] when the vectors are empty.
/// - [`StreetprintError::DimensionMismatch`] when `u`, `v` and `weights`
///   differ in length (`row` 1 for `v`, 2 for `weights`).
/// - [`StreetprintError::DegenerateInput`] for a negative or non-finite weight.
///
/// # Examples
/// ```
/// use streetprint_core::orbit_distance;
///
/// let d = orbit_distance(&[1, 0], &[0, 0], &[1.0, 1.0])?;
/// assert!((d - 2_f64.ln() / 3_f64.ln()).abs() < 1e-12);
/// assert_eq!(orbit_distance(&[3, 4], &[3, 4], &[1.0, 1.0])?, 0.0);
/// # Ok::<(), streetprint_core::StreetprintError>(())
/// ```
pub fn orbit_distance(u: &[u64], v: &[u64], weights: &[f64]) -> Result<f64> {
    if u.is_empty() {
        return Err(StreetprintError::EmptyInput {
            what: "orbit vector",
            required: 1,
            actual: 0,
        });
    }
    if v.len() != u.len() {
        return Err(StreetprintError::DimensionMismatch {
            row: 1,
            expected: u.len(),
            actual: v.len(),
        });
    }
    if weights.len() != u.len() {
        return Err(StreetprintError::DimensionMismatch {
            row: 2,
            expected: u.len(),
            actual: weights.len(),
        });
    }
    validate_weights(weights)?;
    Ok(weighted_log_distance(u, v, weights))
}

/// Distance kernel without validation; callers check lengths and weights.
#[expect(
    clippy::cast_precision_loss,
    clippy::float_arithmetic,
    reason = "orbit counts beyond 2^53 only lose precision inside a logarithm"
)]
pub(crate) fn weighted_log_distance(u: &[u64], v: &[u64], weights: &[f64]) -> f64 {
    u.iter()
        .zip(v)
        .zip(weights)
        .map(|((&a, &b), &w)| {
            if a == b {
                return 0.0;
            }
            let (x, y) = (a as f64, b as f64);
            let denom = (x.max(y) + 2.0).ln();
            w * (x.ln_1p() - y.ln_1p()).abs() / denom
        })
        .sum()
}

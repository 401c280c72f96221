//! Distances between real-valued feature rows.

use std::fmt;

use crate::error::{Result, StreetprintError};

/// Metric applied to real-valued feature rows.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FeatureMetric {
    /// Square root of the summed squared differences.
    #[default]
    Euclidean,
    /// Summed squared differences.
    SquaredEuclidean,
    /// Summed absolute differences.
    Cityblock,
    /// Largest absolute difference.
    Chebyshev,
    /// One minus the cosine of the angle between the rows.
    Cosine,
    /// `p`-norm of the differences, `p ≥ 1`.
    Minkowski {
        /// Norm order.
        p: f64,
    },
}

impl FeatureMetric {
    /// Checks metric parameters.
    ///
    /// # Errors
    /// Returns [`StreetprintError::InvalidParameter`] when a Minkowski order is
    /// below one or not finite.
    pub fn validate(self) -> Result<()> {
        match self {
            Self::Minkowski { p } if !p.is_finite() || p < 1.0 => {
                Err(StreetprintError::InvalidParameter {
                    name: "minkowski_p",
                    value: p.to_string().into(),
                    reason: "must be finite and at least 1",
                })
            }
            _ => Ok(()),
        }
    }

    /// Distance between two rows of equal length and finite values.
    ///
    /// # Errors
    /// - [`StreetprintError::InvalidParameter`] for an invalid Minkowski order.
    /// - [`StreetprintError::EmptyInput`] when the rows are empty.
    /// - [`StreetprintError::DimensionMismatch`] when the lengths differ.
    /// - [`StreetprintError::DegenerateInput`] for non-finite values, or a
    ///   zero row under [`FeatureMetric::Cosine`].
    ///
    /// # Examples
    /// ```
    /// use streetprint_core::FeatureMetric;
    ///
    /// let a = [0.0, 3.0];
    /// let b = [4.0, 0.0];
    /// assert_eq!(FeatureMetric::Euclidean.distance(&a, &b)?, 5.0);
    /// assert_eq!(FeatureMetric::Cityblock.distance(&a, &b)?, 7.0);
    /// assert_eq!(FeatureMetric::Chebyshev.distance(&a, &b)?, 4.0);
    /// # Ok::<(), streetprint_core::StreetprintError>(())
    /// ```
    pub fn distance(self, left: &[f64], right: &[f64]) -> Result<f64> {
        self.validate()?;
        if left.is_empty() {
            return Err(StreetprintError::EmptyInput {
                what: "feature row",
                required: 1,
                actual: 0,
            });
        }
        if left.len() != right.len() {
            return Err(StreetprintError::DimensionMismatch {
                row: 1,
                expected: left.len(),
                actual: right.len(),
            });
        }
        ensure_finite(left, 0)?;
        ensure_finite(right, 1)?;
        if self == Self::Cosine {
            ensure_nonzero(left, 0)?;
            ensure_nonzero(right, 1)?;
        }
        Ok(self.evaluate(left, right))
    }

    /// Distance kernel without validation.
    #[expect(
        clippy::float_arithmetic,
        reason = "distance kernels are defined over real-valued rows"
    )]
    pub(crate) fn evaluate(self, left: &[f64], right: &[f64]) -> f64 {
        let diffs = left.iter().zip(right).map(|(a, b)| (a - b).abs());
        match self {
            Self::Euclidean => diffs.map(|d| d * d).sum::<f64>().sqrt(),
            Self::SquaredEuclidean => diffs.map(|d| d * d).sum(),
            Self::Cityblock => diffs.sum(),
            Self::Chebyshev => diffs.fold(0.0, f64::max),
            Self::Minkowski { p } => diffs.map(|d| d.powf(p)).sum::<f64>().powf(p.recip()),
            Self::Cosine => {
                let (mut dot, mut left_sq, mut right_sq) = (0.0, 0.0, 0.0);
                for (a, b) in left.iter().zip(right) {
                    dot += a * b;
                    left_sq += a * a;
                    right_sq += b * b;
                }
                (1.0 - dot / (left_sq.sqrt() * right_sq.sqrt())).max(0.0)
            }
        }
    }
}

impl fmt::Display for FeatureMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Euclidean => f.write_str("euclidean"),
            Self::SquaredEuclidean => f.write_str("sqeuclidean"),
            Self::Cityblock => f.write_str("cityblock"),
            Self::Chebyshev => f.write_str("chebyshev"),
            Self::Cosine => f.write_str("cosine"),
            Self::Minkowski { p } => write!(f, "minkowski(p={p})"),
        }
    }
}

/// Rejects a row holding a non-finite value; `index` is the row position.
pub(crate) fn ensure_finite(row: &[f64], index: usize) -> Result<()> {
    row.iter().find(|value| !value.is_finite()).map_or(Ok(()), |&value| {
        Err(StreetprintError::DegenerateInput {
            context: "feature row with a non-finite value",
            index,
            value,
        })
    })
}

pub(crate) fn ensure_nonzero(row: &[f64], index: usize) -> Result<()> {
    if row.iter().all(|&value| value == 0.0) {
        return Err(StreetprintError::DegenerateInput {
            context: "cosine distance of a zero row",
            index,
            value: 0.0,
        });
    }
    Ok(())
}

//! Row-major storage for per-node orbit counts.

use crate::error::{Result, StreetprintError};

/// Orbit counts with one row per node, in node id order.
///
/// # Examples
/// ```
/// use streetprint_core::OrbitCountMatrix;
///
/// let matrix = OrbitCountMatrix::from_rows(2, vec![vec![1, 0], vec![2, 1], vec![1, 0]])?;
/// let hubs = matrix.restrict(|node| node == 1);
/// assert_eq!(hubs.rows(), 1);
/// assert_eq!(hubs.row(0), &[2, 1]);
/// # Ok::<(), streetprint_core::StreetprintError>(())
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OrbitCountMatrix {
    width: usize,
    counts: Vec<u64>,
}

impl OrbitCountMatrix {
    pub(crate) fn zeroed(rows: usize, width: usize) -> Self {
        Self {
            width,
            counts: vec![0; rows * width],
        }
    }

    /// Builds a matrix from explicit rows of `width` counts each.
    ///
    /// # Errors
    /// Returns [`StreetprintError::EmptyInput`] when `width` is zero and
    /// [`StreetprintError::DimensionMismatch`] when a row has a different
    /// length.
    pub fn from_rows(width: usize, rows: Vec<Vec<u64>>) -> Result<Self> {
        if width == 0 {
            return Err(StreetprintError::EmptyInput {
                what: "orbit row",
                required: 1,
                actual: 0,
            });
        }
        let mut counts = Vec::with_capacity(rows.len() * width);
        for (row, values) in rows.into_iter().enumerate() {
            if values.len() != width {
                return Err(StreetprintError::DimensionMismatch {
                    row,
                    expected: width,
                    actual: values.len(),
                });
            }
            counts.extend(values);
        }
        Ok(Self { width, counts })
    }

    /// Number of rows.
    #[must_use]
    pub fn rows(&self) -> usize {
        self.counts.len().checked_div(self.width).unwrap_or(0)
    }

    /// Number of orbit columns.
    #[must_use]
    #[rustfmt::skip]
    pub const fn width(&self) -> usize { self.width }

    /// Returns `true` when the matrix has no rows.
    #[must_use]
    #[rustfmt::skip]
    pub fn is_empty(&self) -> bool { self.counts.is_empty() }

    /// Returns the counts of row `index`.
    ///
    /// # Panics
    /// Panics when `index >= self.rows()`.
    #[must_use]
    #[expect(clippy::indexing_slicing, reason = "documented panic on out-of-range rows")]
    pub fn row(&self, index: usize) -> &[u64] {
        &self.counts[index * self.width..(index + 1) * self.width]
    }

    /// Returns row `index`, or `None` when it is out of range.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&[u64]> {
        let start = index.checked_mul(self.width)?;
        self.counts.get(start..start + self.width)
    }

    /// Iterates over rows in order.
    pub fn iter_rows(&self) -> impl ExactSizeIterator<Item = &[u64]> + '_ {
        self.counts.chunks_exact(self.width.max(1))
    }

    /// Iterates over column `orbit` from top to bottom.
    pub fn column(&self, orbit: usize) -> impl Iterator<Item = u64> + '_ {
        self.iter_rows().filter_map(move |row| row.get(orbit).copied())
    }

    /// The flat row-major counts.
    #[must_use]
    #[rustfmt::skip]
    pub fn as_slice(&self) -> &[u64] { &self.counts }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [u64] {
        &mut self.counts
    }

    /// Keeps the rows whose node id satisfies `member`, preserving order.
    #[must_use]
    pub fn restrict(&self, member: impl Fn(usize) -> bool) -> Self {
        let counts = self
            .iter_rows()
            .enumerate()
            .filter(|&(node, _)| member(node))
            .flat_map(|(_, row)| row.iter().copied())
            .collect();
        Self {
            width: self.width,
            counts,
        }
    }

    /// Collects the rows of `nodes`, in the given order.
    ///
    /// # Errors
    /// Returns [`StreetprintError::InvalidParameter`] when a node id has no
    /// row.
    pub fn select_rows(&self, nodes: &[usize]) -> Result<Self> {
        let mut counts = Vec::with_capacity(nodes.len() * self.width);
        for &node in nodes {
            let row = self
                .get(node)
                .ok_or_else(|| StreetprintError::InvalidParameter {
                    name: "node",
                    value: node.to_string().into(),
                    reason: "no orbit row exists for this node",
                })?;
            counts.extend_from_slice(row);
        }
        Ok(Self {
            width: self.width,
            counts,
        })
    }
}

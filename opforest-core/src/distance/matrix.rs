//! Precomputed distance tables addressed by original dataset position.

use super::types::{DistanceError, Result};

/// Abstraction over a table of pairwise distances indexed by each node's
/// original dataset position.
///
/// # Examples
/// ```
/// use opforest_core::{DistanceError, PrecomputedDistances};
///
/// struct Line(Vec<f32>);
///
/// impl PrecomputedDistances for Line {
///     fn len(&self) -> usize { self.0.len() }
///     fn name(&self) -> &str { "line" }
///     fn distance(&self, i: usize, j: usize) -> Result<f32, DistanceError> {
///         let len = self.0.len();
///         let a = self.0.get(i).ok_or(DistanceError::OutOfBounds { index: i, len })?;
///         let b = self.0.get(j).ok_or(DistanceError::OutOfBounds { index: j, len })?;
///         Ok((a - b).abs())
///     }
/// }
///
/// let table = Line(vec![1.0, 2.0, 4.0]);
/// assert_eq!(table.len(), 3);
/// assert_eq!(table.distance(0, 2)?, 3.0);
/// assert_eq!(table.batch_distances(0, &[1, 2])?, [1.0, 3.0]);
/// # Ok::<(), DistanceError>(())
/// ```
pub trait PrecomputedDistances: Sync {
    /// Returns the number of positions covered by the table.
    fn len(&self) -> usize;

    /// Returns whether the table covers no positions.
    #[must_use]
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns a human-readable name.
    fn name(&self) -> &str;

    /// Looks up the distance between two original positions.
    ///
    /// # Errors
    /// Implementations must return [`DistanceError::OutOfBounds`] for
    /// positions outside the table.
    fn distance(&self, i: usize, j: usize) -> Result<f32>;

    /// Looks up the distances from `query` to every entry in `candidates`.
    ///
    /// # Errors
    /// Returns the first [`DistanceError`] surfaced by [`Self::distance`].
    fn batch_distances(&self, query: usize, candidates: &[usize]) -> Result<Vec<f32>> {
        candidates
            .iter()
            .map(|&candidate| self.distance(query, candidate))
            .collect()
    }
}

/// Dense row-major `size × size` distance table.
///
/// # Examples
/// ```
/// use opforest_core::{DistanceMatrix, PrecomputedDistances};
///
/// let matrix = DistanceMatrix::from_rows(vec![
///     vec![0.0, 2.0],
///     vec![2.0, 0.0],
/// ])
/// .expect("rows form a square table");
/// assert_eq!(matrix.distance(1, 0).expect("in bounds"), 2.0);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct DistanceMatrix {
    size: usize,
    values: Vec<f32>,
}

impl DistanceMatrix {
    /// Wraps a flat row-major buffer holding `size * size` distances.
    ///
    /// # Errors
    /// Returns [`DistanceError::InvalidShape`] when `values` does not hold
    /// exactly `size * size` entries.
    pub fn new(size: usize, values: Vec<f32>) -> Result<Self> {
        let expected = size.checked_mul(size).ok_or(DistanceError::InvalidShape {
            size,
            expected: usize::MAX,
            actual: values.len(),
        })?;
        if values.len() != expected {
            return Err(DistanceError::InvalidShape {
                size,
                expected,
                actual: values.len(),
            });
        }
        Ok(Self { size, values })
    }

    /// Builds a table from nested rows.
    ///
    /// # Errors
    /// Returns [`DistanceError::InvalidShape`] when any row length differs
    /// from the number of rows.
    pub fn from_rows(rows: Vec<Vec<f32>>) -> Result<Self> {
        let size = rows.len();
        if let Some(row) = rows.iter().find(|row| row.len() != size) {
            return Err(DistanceError::InvalidShape {
                size,
                expected: size,
                actual: row.len(),
            });
        }
        Self::new(size, rows.into_iter().flatten().collect())
    }

    /// Returns the flat row-major view of the table.
    #[must_use]
    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }

    fn check(&self, index: usize) -> Result<()> {
        if index < self.size {
            Ok(())
        } else {
            Err(DistanceError::OutOfBounds {
                index,
                len: self.size,
            })
        }
    }
}

impl PrecomputedDistances for DistanceMatrix {
    fn len(&self) -> usize {
        self.size
    }

    fn name(&self) -> &str {
        "dense-matrix"
    }

    fn distance(&self, i: usize, j: usize) -> Result<f32> {
        self.check(i)?;
        self.check(j)?;
        let len = self.size;
        self.values
            .get(i * self.size + j)
            .copied()
            .ok_or(DistanceError::OutOfBounds { index: j, len })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn new_rejects_non_square_buffers() {
        let err = DistanceMatrix::new(2, vec![0.0; 3]).expect_err("3 values cannot be 2x2");
        assert_eq!(
            err,
            DistanceError::InvalidShape {
                size: 2,
                expected: 4,
                actual: 3
            }
        );
    }

    #[test]
    fn from_rows_rejects_ragged_rows() {
        let err = DistanceMatrix::from_rows(vec![vec![0.0, 1.0], vec![1.0]])
            .expect_err("ragged rows must fail");
        assert!(matches!(err, DistanceError::InvalidShape { actual: 1, .. }));
    }

    #[rstest]
    #[case(2, 0)]
    #[case(0, 5)]
    fn lookup_rejects_out_of_range_positions(#[case] i: usize, #[case] j: usize) {
        let matrix = DistanceMatrix::new(2, vec![0.0, 1.0, 1.0, 0.0]).expect("square");
        let err = matrix.distance(i, j).expect_err("position must be rejected");
        assert!(matches!(err, DistanceError::OutOfBounds { len: 2, .. }));
    }

    #[test]
    fn batch_distances_reads_a_row() {
        let matrix = DistanceMatrix::from_rows(vec![
            vec![0.0, 1.0, 5.0],
            vec![1.0, 0.0, 2.0],
            vec![5.0, 2.0, 0.0],
        ])
        .expect("square");
        assert_eq!(
            matrix.batch_distances(2, &[0, 1]).expect("in bounds"),
            vec![5.0, 2.0]
        );
    }
}

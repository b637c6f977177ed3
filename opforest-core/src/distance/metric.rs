//! Feature-space metrics evaluated on live feature vectors.

use super::types::{Result, validated_pair};

/// Distance function over two feature vectors of equal dimension.
///
/// The density estimator calls this for every arc when the subgraph is not
/// configured to use a precomputed distance table. Implementations must
/// return non-negative, finite distances.
///
/// # Examples
/// ```
/// use opforest_core::{DistanceError, FeatureMetric};
///
/// struct Manhattan;
///
/// impl FeatureMetric for Manhattan {
///     fn name(&self) -> &str { "manhattan" }
///     fn distance(&self, left: &[f32], right: &[f32]) -> Result<f32, DistanceError> {
///         Ok(left.iter().zip(right).map(|(l, r)| (l - r).abs()).sum())
///     }
/// }
///
/// assert_eq!(Manhattan.distance(&[0.0, 1.0], &[2.0, 4.0])?, 5.0);
/// # Ok::<(), DistanceError>(())
/// ```
pub trait FeatureMetric: Sync {
    /// Returns a human-readable name used in diagnostics.
    fn name(&self) -> &str;

    /// Computes the distance between two feature vectors.
    ///
    /// # Errors
    /// Returns a [`crate::DistanceError`] when the vectors cannot be compared.
    fn distance(&self, left: &[f32], right: &[f32]) -> Result<f32>;
}

/// The Euclidean (L2) metric.
///
/// # Examples
/// ```
/// use opforest_core::{DistanceError, Euclidean, FeatureMetric};
///
/// let distance = Euclidean.distance(&[1.0, 2.0, 3.0], &[4.0, 6.0, 8.0])?;
/// assert!((distance - 7.071_068).abs() < 1e-6);
/// # Ok::<(), DistanceError>(())
/// ```
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Euclidean;

impl FeatureMetric for Euclidean {
    fn name(&self) -> &str {
        "euclidean"
    }

    fn distance(&self, left: &[f32], right: &[f32]) -> Result<f32> {
        Ok(squared_sum(left, right)?.sqrt() as f32)
    }
}

/// Squared Euclidean distance, the classic arc weight for optimum-path
/// forests. Skips the square root, so it is not a true metric.
///
/// # Examples
/// ```
/// use opforest_core::{DistanceError, FeatureMetric, SquaredEuclidean};
///
/// assert_eq!(SquaredEuclidean.distance(&[1.0, 2.0], &[4.0, 6.0])?, 25.0);
/// # Ok::<(), DistanceError>(())
/// ```
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct SquaredEuclidean;

impl FeatureMetric for SquaredEuclidean {
    fn name(&self) -> &str {
        "squared-euclidean"
    }

    fn distance(&self, left: &[f32], right: &[f32]) -> Result<f32> {
        Ok(squared_sum(left, right)? as f32)
    }
}

fn squared_sum(left: &[f32], right: &[f32]) -> Result<f64> {
    let (left, right) = validated_pair(left, right)?;
    Ok(left
        .iter()
        .zip(right.iter())
        .map(|(&l, &r)| {
            let diff = f64::from(l) - f64::from(r);
            diff * diff
        })
        .sum())
}

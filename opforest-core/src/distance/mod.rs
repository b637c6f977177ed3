//! Distance collaborators consumed by the density estimator.
//!
//! Arc weights come either from a [`FeatureMetric`] evaluated on two feature
//! vectors or from a [`PrecomputedDistances`] table addressed by original
//! dataset position. [`DistanceSource`] selects between the two per call.

mod matrix;
mod metric;
mod source;
mod types;

pub use self::matrix::{DistanceMatrix, PrecomputedDistances};
pub use self::metric::{Euclidean, FeatureMetric, SquaredEuclidean};
pub use self::source::DistanceSource;
pub use self::types::{DistanceError, DistanceErrorCode, Result, Vector, VectorKind};

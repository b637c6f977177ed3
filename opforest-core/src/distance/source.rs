//! Selection between live feature metrics and precomputed tables.

use std::fmt;

use super::{FeatureMetric, PrecomputedDistances};

/// Where the density estimator obtains arc distances from.
///
/// `Features` evaluates a [`FeatureMetric`] on the two nodes' feature
/// vectors. `Precomputed` looks the pair up in a table indexed by each node's
/// original dataset position.
#[derive(Clone, Copy)]
pub enum DistanceSource<'a> {
    /// Evaluate the metric on live feature vectors.
    Features(&'a dyn FeatureMetric),
    /// Look distances up by original dataset position.
    Precomputed(&'a dyn PrecomputedDistances),
}

impl DistanceSource<'_> {
    /// Returns the name of the underlying collaborator.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Features(metric) => metric.name(),
            Self::Precomputed(table) => table.name(),
        }
    }

    /// Returns `true` when distances come from a precomputed table.
    #[must_use]
    pub const fn is_precomputed(&self) -> bool {
        matches!(self, Self::Precomputed(_))
    }
}

impl fmt::Debug for DistanceSource<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Features(metric) => f.debug_tuple("Features").field(&metric.name()).finish(),
            Self::Precomputed(table) => f
                .debug_struct("Precomputed")
                .field("name", &table.name())
                .field("len", &table.len())
                .finish(),
        }
    }
}

//! Z-score feature standardisation.

use tracing::{instrument, warn};

use crate::{
    Result,
    error::{SubgraphError, try_vec_with_capacity},
};

use super::Subgraph;

/// Per-dimension mean and standard deviation fitted on a subgraph.
///
/// A dimension whose population standard deviation is exactly zero stores
/// `1.0`, so the transform only centres it.
///
/// # Examples
/// ```
/// use opforest_core::Subgraph;
///
/// let mut train = Subgraph::from_samples(1, vec![(vec![1.0], 1), (vec![3.0], 1)])?;
/// let mut test = Subgraph::from_samples(1, vec![(vec![5.0], 1)])?;
///
/// let stats = train.normalize_features()?;
/// assert_eq!(stats.means(), [2.0]);
/// assert_eq!(stats.stds(), [1.0]);
///
/// stats.apply(&mut test)?;
/// assert_eq!(test.node(0)?.features(), Some(&[3.0][..]));
/// # Ok::<(), opforest_core::SubgraphError>(())
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FeatureStatistics {
    means: Vec<f32>,
    stds: Vec<f32>,
}

impl FeatureStatistics {
    /// Per-dimension means.
    #[must_use]
    pub fn means(&self) -> &[f32] {
        &self.means
    }

    /// Per-dimension population standard deviations, with zero replaced by
    /// one.
    #[must_use]
    pub fn stds(&self) -> &[f32] {
        &self.stds
    }

    /// Number of dimensions covered; zero when fitted on an empty subgraph.
    #[must_use]
    pub fn dimensions(&self) -> usize {
        self.means.len()
    }

    /// Standardises `graph` with these statistics.
    ///
    /// # Errors
    /// Returns [`SubgraphError::FeatureCountMismatch`] when `graph.feat_n()`
    /// differs from [`Self::dimensions`], and
    /// [`SubgraphError::MissingFeatures`] or
    /// [`SubgraphError::FeatureLengthMismatch`] for malformed nodes. The
    /// subgraph is unchanged on error.
    pub fn apply(&self, graph: &mut Subgraph) -> Result<()> {
        if graph.feat_n() != self.dimensions() {
            return Err(SubgraphError::FeatureCountMismatch {
                left: self.dimensions(),
                right: graph.feat_n(),
            });
        }
        graph.validate_features()?;
        for node in graph.nodes_mut() {
            if let Some(features) = node.features_mut() {
                for ((value, mean), std) in features.iter_mut().zip(&self.means).zip(&self.stds) {
                    *value = (*value - mean) / std;
                }
            }
        }
        Ok(())
    }
}

impl Subgraph {
    /// Standardises every feature dimension to zero mean and unit population
    /// standard deviation, returning the fitted statistics.
    ///
    /// Constant dimensions are centred but not scaled. An empty subgraph is
    /// left as is and yields empty statistics.
    ///
    /// # Errors
    /// Returns [`SubgraphError::MissingFeatures`] or
    /// [`SubgraphError::FeatureLengthMismatch`] before any value is modified,
    /// and [`SubgraphError::OutOfMemory`] when the statistics cannot be
    /// allocated.
    #[instrument(
        name = "subgraph.normalize_features",
        err,
        skip(self),
        fields(nodes = self.node_count(), features = self.feat_n()),
    )]
    pub fn normalize_features(&mut self) -> Result<FeatureStatistics> {
        self.validate_features()?;
        if self.is_empty() {
            return Ok(FeatureStatistics::default());
        }
        let stats = self.fit_statistics()?;
        stats.apply(self)?;
        Ok(stats)
    }

    fn fit_statistics(&self) -> Result<FeatureStatistics> {
        let count = self.node_count() as f64;
        let mut sums = try_vec_with_capacity(self.feat_n())?;
        sums.resize(self.feat_n(), 0.0_f64);
        for features in self.nodes().iter().filter_map(crate::Node::features) {
            for (sum, value) in sums.iter_mut().zip(features) {
                *sum += f64::from(*value);
            }
        }
        let means: Vec<f64> = sums.iter().map(|sum| sum / count).collect();

        let mut squares = try_vec_with_capacity(self.feat_n())?;
        squares.resize(self.feat_n(), 0.0_f64);
        for features in self.nodes().iter().filter_map(crate::Node::features) {
            for ((square, value), mean) in squares.iter_mut().zip(features).zip(&means) {
                let delta = f64::from(*value) - mean;
                *square += delta * delta;
            }
        }

        let mut stats = FeatureStatistics {
            means: try_vec_with_capacity(self.feat_n())?,
            stds: try_vec_with_capacity(self.feat_n())?,
        };
        for (dimension, (mean, square)) in means.iter().zip(&squares).enumerate() {
            let std = (square / count).sqrt() as f32;
            let std = if std == 0.0 {
                warn!(dimension, "feature is constant; centring without scaling");
                1.0
            } else {
                std
            };
            stats.means.push(*mean as f32);
            stats.stds.push(std);
        }
        Ok(stats)
    }
}

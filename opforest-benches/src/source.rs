//! Seeded synthetic labelled datasets for benchmarking.
//!
//! Samples are drawn from one isotropic Gaussian blob per class, with blob
//! centroids spaced evenly on a circle in the first two dimensions.

use std::f32::consts::PI;

use opforest_core::{DistanceMatrix, FeatureMetric, Subgraph, SubgraphError};
use rand::{Rng, SeedableRng, rngs::SmallRng};

/// Errors raised while generating synthetic datasets.
#[derive(Debug, thiserror::Error)]
pub enum SyntheticError {
    /// The dataset would contain no samples.
    #[error("point_count must be greater than zero")]
    ZeroPoints,
    /// Samples would have no features.
    #[error("dimensions must be greater than zero")]
    ZeroDimensions,
    /// No classes were requested.
    #[error("class_count must be greater than zero")]
    ZeroClasses,
    /// More classes than samples were requested.
    #[error("class_count ({class_count}) exceeds point_count ({point_count})")]
    ClassCountExceedsPointCount {
        /// Requested number of classes.
        class_count: usize,
        /// Requested number of samples.
        point_count: usize,
    },
    /// A floating-point parameter was non-finite or non-positive.
    #[error("{parameter} must be finite and positive")]
    InvalidFloatParameter {
        /// Name of the rejected parameter.
        parameter: &'static str,
    },
    /// Building or linking the subgraph failed.
    #[error(transparent)]
    Subgraph(#[from] SubgraphError),
    /// Distance evaluation failed while linking neighbours.
    #[error(transparent)]
    Distance(#[from] opforest_core::DistanceError),
}

/// Configuration for labelled Gaussian blobs.
#[derive(Clone, Debug)]
pub struct LabelledBlobConfig {
    /// Number of samples to generate.
    pub point_count: usize,
    /// Dimensionality of each sample.
    pub dimensions: usize,
    /// Number of classes; labels run from `1` to `class_count`.
    pub class_count: usize,
    /// Radius of the circle the centroids sit on.
    pub separation: f32,
    /// Standard deviation of every blob along every axis.
    pub spread: f32,
    /// RNG seed for reproducibility.
    pub seed: u64,
}

impl LabelledBlobConfig {
    fn validate(&self) -> Result<(), SyntheticError> {
        if self.point_count == 0 {
            return Err(SyntheticError::ZeroPoints);
        }
        if self.dimensions == 0 {
            return Err(SyntheticError::ZeroDimensions);
        }
        if self.class_count == 0 {
            return Err(SyntheticError::ZeroClasses);
        }
        if self.class_count > self.point_count {
            return Err(SyntheticError::ClassCountExceedsPointCount {
                class_count: self.class_count,
                point_count: self.point_count,
            });
        }
        for (parameter, value) in [("separation", self.separation), ("spread", self.spread)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(SyntheticError::InvalidFloatParameter { parameter });
            }
        }
        Ok(())
    }
}

/// Generates a labelled subgraph with classes assigned round-robin.
///
/// # Errors
/// Returns [`SyntheticError`] when the configuration is invalid.
///
/// # Examples
/// ```
/// use opforest_benches::source::{LabelledBlobConfig, generate_labelled_blobs};
///
/// let graph = generate_labelled_blobs(&LabelledBlobConfig {
///     point_count: 12,
///     dimensions: 3,
///     class_count: 3,
///     separation: 10.0,
///     spread: 1.0,
///     seed: 7,
/// })?;
/// assert_eq!(graph.node_count(), 12);
/// assert_eq!(graph.label_n(), 3);
/// # Ok::<(), opforest_benches::source::SyntheticError>(())
/// ```
pub fn generate_labelled_blobs(config: &LabelledBlobConfig) -> Result<Subgraph, SyntheticError> {
    config.validate()?;
    let centroids = blob_centroids(config);
    let mut rng = SmallRng::seed_from_u64(config.seed);
    let mut samples = Vec::with_capacity(config.point_count);
    for (label, centroid) in (1..=config.class_count)
        .zip(centroids.iter())
        .cycle()
        .take(config.point_count)
    {
        let mut features = Vec::with_capacity(config.dimensions);
        for centre in centroid {
            features.push(offset_sample(*centre, config.spread, &mut rng));
        }
        samples.push((features, label));
    }
    Ok(Subgraph::from_samples(config.dimensions, samples)?)
}

#[expect(
    clippy::cast_precision_loss,
    reason = "centroid angles derive from small class indices"
)]
#[expect(
    clippy::float_arithmetic,
    reason = "centroid placement uses trigonometric expressions"
)]
fn blob_centroids(config: &LabelledBlobConfig) -> Vec<Vec<f32>> {
    (0..config.class_count)
        .map(|class| {
            let angle = (class as f32 / config.class_count as f32) * (2.0 * PI);
            let mut centroid = vec![0.0_f32; config.dimensions];
            if let Some(value) = centroid.get_mut(0) {
                *value = config.separation * angle.cos();
            }
            if let Some(value) = centroid.get_mut(1) {
                *value = config.separation * angle.sin();
            }
            centroid
        })
        .collect()
}

#[expect(
    clippy::float_arithmetic,
    reason = "Box-Muller transform requires floating-point arithmetic"
)]
fn offset_sample(centre: f32, spread: f32, rng: &mut SmallRng) -> f32 {
    let u1 = rng.gen_range(f32::EPSILON..1.0_f32);
    let u2 = rng.gen_range(0.0_f32..1.0_f32);
    let normal = (-2.0_f32 * u1.ln()).sqrt() * (2.0_f32 * PI * u2).cos();
    centre + normal * spread
}

/// Links every node to its `k` nearest neighbours under `metric`.
///
/// Existing adjacency is replaced. Uses a brute-force scan, so setup cost is
/// quadratic in the node count.
///
/// # Errors
/// Returns [`SyntheticError::Distance`] when the metric fails and
/// [`SyntheticError::Subgraph`] when a node lacks features.
pub fn connect_k_nearest(
    graph: &mut Subgraph,
    k: usize,
    metric: &dyn FeatureMetric,
) -> Result<(), SyntheticError> {
    let mut features = Vec::with_capacity(graph.node_count());
    for (index, node) in graph.nodes().iter().enumerate() {
        let values = node
            .features()
            .ok_or(SubgraphError::MissingFeatures { node: index })?;
        features.push(values.to_vec());
    }

    for (index, query) in features.iter().enumerate() {
        let mut candidates = Vec::with_capacity(features.len().saturating_sub(1));
        for (other, values) in features.iter().enumerate() {
            if other != index {
                candidates.push((metric.distance(query, values)?, other));
            }
        }
        candidates.sort_by(|left, right| left.0.total_cmp(&right.0));
        let adjacency = graph.node_mut(index)?.adjacency_mut();
        adjacency.clear();
        for (_, neighbour) in candidates.into_iter().take(k) {
            adjacency.insert(neighbour);
        }
    }
    Ok(())
}

/// Tabulates `metric` between every pair of nodes, indexed by position.
///
/// Node positions must cover `0..graph.node_count()`, as they do for
/// [`generate_labelled_blobs`].
///
/// # Errors
/// Returns [`SyntheticError::Subgraph`] when a node lacks features or its
/// position falls outside the table, and [`SyntheticError::Distance`] when
/// the metric fails.
pub fn pairwise_distances(
    graph: &Subgraph,
    metric: &dyn FeatureMetric,
) -> Result<DistanceMatrix, SyntheticError> {
    let size = graph.node_count();
    let mut values = vec![0.0_f32; size.saturating_mul(size)];
    for (row, left) in graph.nodes().iter().enumerate() {
        let a = left
            .features()
            .ok_or(SubgraphError::MissingFeatures { node: row })?;
        let row_start = in_table(left.position(), size)?.saturating_mul(size);
        for (column, right) in graph.nodes().iter().enumerate() {
            let b = right
                .features()
                .ok_or(SubgraphError::MissingFeatures { node: column })?;
            let index = row_start.saturating_add(in_table(right.position(), size)?);
            let slot = values.get_mut(index).ok_or(SubgraphError::NodeOutOfBounds {
                node: index,
                node_count: size,
            })?;
            *slot = metric.distance(a, b)?;
        }
    }
    Ok(DistanceMatrix::new(size, values)?)
}

const fn in_table(position: usize, size: usize) -> Result<usize, SyntheticError> {
    if position < size {
        Ok(position)
    } else {
        Err(SyntheticError::Subgraph(SubgraphError::NodeOutOfBounds {
            node: position,
            node_count: size,
        }))
    }
}

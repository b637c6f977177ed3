//! Kernel density estimation seeding each node's initial path cost.

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::{instrument, warn};

use crate::{DistanceSource, Result, error::SubgraphError};

use super::{DENS_MAX, Subgraph};

/// Summary of a density evaluation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DensityBounds {
    /// Kernel bandwidth `k = 2 * df / 9`.
    pub bandwidth: f32,
    /// Smallest raw density.
    pub min: f32,
    /// Largest raw density.
    pub max: f32,
    degenerate: bool,
}

impl DensityBounds {
    /// Returns `true` when every node had the same raw density, in which case
    /// all nodes were assigned [`DENS_MAX`].
    ///
    /// Raw densities are compared before narrowing to `f32`, so `min` and
    /// `max` may be equal while this returns `false`.
    #[must_use]
    pub const fn is_degenerate(&self) -> bool {
        self.degenerate
    }
}

impl Subgraph {
    /// Estimates each node's local density from its adjacency.
    ///
    /// With bandwidth `k = 2 * df / 9`, the raw density of node `i` is
    /// `sum(exp(-d(i, j) / k)) / (|adj(i)| + 1)` over its neighbours `j`.
    /// Raw values are rescaled linearly onto `[1, DENS_MAX]` and each node's
    /// path value is seeded with `density - 1`. When all raw values coincide
    /// every node receives `DENS_MAX`.
    ///
    /// All raw values are computed before any node is written, so on error
    /// the subgraph is left untouched.
    ///
    /// # Errors
    /// Returns [`SubgraphError::InvalidDiffusionFactor`] unless `df` is finite
    /// and positive, [`SubgraphError::NeighbourOutOfBounds`] for a dangling
    /// adjacency entry, [`SubgraphError::MissingFeatures`] when a metric
    /// source meets a node without features,
    /// [`SubgraphError::InvalidDistance`] for negative or non-finite
    /// distances, and [`SubgraphError::Distance`] when the source fails.
    ///
    /// # Examples
    /// ```
    /// use opforest_core::{DENS_MAX, DistanceSource, SquaredEuclidean, Subgraph};
    ///
    /// let mut graph = Subgraph::from_samples(1, vec![
    ///     (vec![0.0], 1),
    ///     (vec![1.0], 1),
    ///     (vec![5.0], 1),
    /// ])?;
    /// for (node, neighbour) in [(0, 1), (1, 0), (2, 1)] {
    ///     graph.node_mut(node)?.adjacency_mut().insert(neighbour);
    /// }
    /// graph.set_diffusion_factor(9.0);
    ///
    /// let bounds = graph.evaluate_density(DistanceSource::Features(&SquaredEuclidean))?;
    /// assert_eq!(bounds.bandwidth, 2.0);
    /// assert_eq!(graph.node(0)?.density(), DENS_MAX);
    /// assert_eq!(graph.node(2)?.density(), 1.0);
    /// # Ok::<(), opforest_core::SubgraphError>(())
    /// ```
    #[instrument(
        name = "subgraph.evaluate_density",
        err,
        skip(self, source),
        fields(nodes = self.node_count(), df = self.diffusion_factor, source = source.name()),
    )]
    pub fn evaluate_density(&mut self, source: DistanceSource<'_>) -> Result<DensityBounds> {
        let df = self.diffusion_factor;
        if !(df.is_finite() && df > 0.0) {
            return Err(SubgraphError::InvalidDiffusionFactor { df });
        }
        let bandwidth = 2.0 * df / 9.0;

        let raw = self.raw_densities(source, f64::from(bandwidth))?;
        self.bandwidth = bandwidth;
        let Some((min, max)) = bounds_of(&raw) else {
            return Ok(DensityBounds {
                bandwidth,
                min: 0.0,
                max: 0.0,
                degenerate: false,
            });
        };
        self.density_min = min as f32;
        self.density_max = max as f32;

        let degenerate = min == max;
        if degenerate {
            if self.node_count() > 1 {
                warn!(
                    nodes = self.node_count(),
                    raw = min,
                    "all nodes share one raw density; assigning the maximum"
                );
            }
            for node in &mut self.nodes {
                node.set_density_and_path(DENS_MAX);
            }
        } else {
            // Ratio first: a subnormal range would overflow `999 / range`.
            let range = max - min;
            let span = f64::from(DENS_MAX - 1.0);
            for (node, value) in self.nodes.iter_mut().zip(&raw) {
                node.set_density_and_path(((value - min) / range * span + 1.0) as f32);
            }
        }

        Ok(DensityBounds {
            bandwidth,
            min: self.density_min,
            max: self.density_max,
            degenerate,
        })
    }

    #[cfg(not(feature = "parallel"))]
    fn raw_densities(&self, source: DistanceSource<'_>, bandwidth: f64) -> Result<Vec<f64>> {
        let mut raw = crate::error::try_vec_with_capacity(self.node_count())?;
        for index in 0..self.node_count() {
            raw.push(self.raw_density(index, source, bandwidth)?);
        }
        Ok(raw)
    }

    #[cfg(feature = "parallel")]
    fn raw_densities(&self, source: DistanceSource<'_>, bandwidth: f64) -> Result<Vec<f64>> {
        (0..self.node_count())
            .into_par_iter()
            .map(|index| self.raw_density(index, source, bandwidth))
            .collect()
    }

    fn raw_density(&self, index: usize, source: DistanceSource<'_>, bandwidth: f64) -> Result<f64> {
        let node = self.node(index)?;
        let mut sum = 0.0_f64;
        for neighbour in node.adjacency().iter() {
            let distance = self.arc_distance(index, neighbour, source)?;
            sum += (-f64::from(distance) / bandwidth).exp();
        }
        Ok(sum / (node.adjacency().len() + 1) as f64)
    }

    fn arc_distance(&self, left: usize, right: usize, source: DistanceSource<'_>) -> Result<f32> {
        let node_count = self.node_count();
        let from = self.node(left)?;
        let to = self
            .nodes
            .get(right)
            .ok_or(SubgraphError::NeighbourOutOfBounds {
                node: left,
                neighbour: right,
                node_count,
            })?;
        let value = match source {
            DistanceSource::Features(metric) => {
                let a = from
                    .features()
                    .ok_or(SubgraphError::MissingFeatures { node: left })?;
                let b = to
                    .features()
                    .ok_or(SubgraphError::MissingFeatures { node: right })?;
                metric.distance(a, b)?
            }
            DistanceSource::Precomputed(table) => table.distance(from.position(), to.position())?,
        };
        if !value.is_finite() || value < 0.0 {
            return Err(SubgraphError::InvalidDistance { left, right, value });
        }
        Ok(value)
    }
}

fn bounds_of(raw: &[f64]) -> Option<(f64, f64)> {
    raw.iter().fold(None, |acc, &value| match acc {
        None => Some((value, value)),
        Some((min, max)) => Some((min.min(value), max.max(value))),
    })
}

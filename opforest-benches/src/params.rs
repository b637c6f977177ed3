//! Benchmark parameter types.

use std::fmt;

/// Parameters for a partitioning benchmark run.
#[derive(Clone, Debug)]
pub struct PartitionBenchParams {
    /// Number of samples in the dataset.
    pub point_count: usize,
    /// Number of classes the samples are spread over.
    pub class_count: usize,
}

impl fmt::Display for PartitionBenchParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n={},classes={}", self.point_count, self.class_count)
    }
}

/// Parameters for a density evaluation benchmark run.
#[derive(Clone, Debug)]
pub struct DensityBenchParams {
    /// Number of samples in the dataset.
    pub point_count: usize,
    /// Neighbours linked from every node.
    pub neighbours: usize,
}

impl fmt::Display for DensityBenchParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n={},k={}", self.point_count, self.neighbours)
    }
}

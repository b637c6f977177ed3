//! Benchmark setup error type.
//!
//! Lets setup functions propagate failures with `?` instead of using
//! `.expect()`.

use crate::source::SyntheticError;
use opforest_core::SubgraphError;

/// Errors that may occur during benchmark setup.
#[derive(Debug, thiserror::Error)]
pub enum BenchSetupError {
    /// Synthetic data generation failed.
    #[error("synthetic dataset generation failed: {0}")]
    Synthetic(#[from] SyntheticError),
    /// A subgraph operation failed while preparing inputs.
    #[error("subgraph operation failed: {0}")]
    Subgraph(#[from] SubgraphError),
}

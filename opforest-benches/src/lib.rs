//! Benchmark support crate for opforest.
//!
//! Provides seeded synthetic labelled datasets and parameter types used by
//! the Criterion benchmarks for partitioning, density estimation and feature
//! normalisation.

pub mod error;
pub mod params;
pub mod source;

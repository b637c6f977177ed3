//! Shared test utilities used across opforest crates.

pub mod ci;
pub mod tracing;

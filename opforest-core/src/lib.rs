//! Opforest core library.
//!
//! Stores labelled samples as nodes of a [`Subgraph`] and provides the
//! preprocessing a classifier pipeline runs before optimum-path forest
//! construction: stratified partitioning with [`Partitioner`], z-score
//! standardisation, and kernel density estimation.
#![cfg_attr(docsrs, feature(doc_cfg))]

mod distance;
mod error;
mod node;
mod subgraph;

#[cfg(test)]
mod test_utils;

pub use crate::{
    distance::{
        DistanceError, DistanceErrorCode, DistanceMatrix, DistanceSource, Euclidean,
        FeatureMetric, PrecomputedDistances, SquaredEuclidean, Vector, VectorKind,
    },
    error::{Result, SubgraphError, SubgraphErrorCode},
    node::{Adjacency, Node},
    subgraph::{
        DENS_MAX, Subgraph, density::DensityBounds, normalize::FeatureStatistics,
        partition::Partitioner,
    },
};

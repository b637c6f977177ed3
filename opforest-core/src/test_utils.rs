//! Shared test utilities for `opforest-core`.

use opforest_test_support::ci::property_test_profile::ProptestRunProfile;
use proptest::test_runner::Config as ProptestConfig;
use test_strategy::Arbitrary;

use crate::{FeatureMetric, SquaredEuclidean, Subgraph};

/// Builds a standard proptest configuration from the shared CI profile.
///
/// This keeps property suites aligned on the same `PROGTEST_CASES` and
/// `OPFOREST_PBT_FORK` interpretation.
#[must_use]
pub(crate) fn suite_proptest_config(default_cases: u32) -> ProptestConfig {
    let profile = ProptestRunProfile::load(default_cases, false);
    ProptestConfig {
        cases: profile.cases(),
        fork: profile.fork(),
        ..ProptestConfig::default()
    }
}

/// How samples are distributed across classes in generated fixtures.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Arbitrary)]
pub(crate) enum ClassShape {
    /// Every class holds the same number of samples.
    #[weight(3)]
    Balanced,
    /// Class sizes grow by two samples per label.
    #[weight(2)]
    Skewed,
    /// The first class holds four times as many samples as the others.
    #[weight(1)]
    Dominant,
}

impl ClassShape {
    /// Returns the size of each of `classes` classes, none smaller than
    /// `base`.
    pub(crate) fn class_sizes(self, classes: usize, base: usize) -> Vec<usize> {
        (0..classes)
            .map(|class| match self {
                Self::Balanced => base,
                Self::Skewed => base + 2 * class,
                Self::Dominant if class == 0 => 4 * base,
                Self::Dominant => base,
            })
            .collect()
    }
}

/// Builds a two-dimensional subgraph where label `c` holds `sizes[c - 1]`
/// samples.
///
/// Labels are interleaved so no class occupies a contiguous run of indices.
/// The first feature is the sample's position and the second its label.
pub(crate) fn labelled_graph(sizes: &[usize]) -> Subgraph {
    let rounds = sizes.iter().copied().max().unwrap_or(0);
    let mut samples = Vec::new();
    for round in 0..rounds {
        for (class, &size) in sizes.iter().enumerate() {
            if round < size {
                let label = class + 1;
                let position = samples.len();
                samples.push((vec![position as f32, label as f32], label));
            }
        }
    }
    Subgraph::from_samples(2, samples).expect("fixture samples share one width")
}

/// Builds a subgraph from `rows` and links each node to its `k` nearest
/// neighbours under squared Euclidean distance. Every sample has label 1.
pub(crate) fn knn_graph(rows: &[Vec<f32>], k: usize) -> Subgraph {
    let feat_n = rows.first().map_or(0, Vec::len);
    let mut graph = Subgraph::from_samples(feat_n, rows.iter().cloned().map(|row| (row, 1)))
        .expect("fixture rows share one width");
    for (index, query) in rows.iter().enumerate() {
        let mut others: Vec<(f32, usize)> = rows
            .iter()
            .enumerate()
            .filter(|&(other, _)| other != index)
            .map(|(other, row)| {
                let distance = SquaredEuclidean
                    .distance(query, row)
                    .expect("fixture rows are finite");
                (distance, other)
            })
            .collect();
        others.sort_by(|left, right| left.0.total_cmp(&right.0));
        let adjacency = graph
            .node_mut(index)
            .expect("index in range")
            .adjacency_mut();
        for (_, neighbour) in others.into_iter().take(k) {
            adjacency.insert(neighbour);
        }
    }
    graph
}

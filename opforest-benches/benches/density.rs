//! Density estimation and feature normalisation benchmarks.
//!
//! Graphs are linked with a brute-force kNN and the precomputed distance
//! table is filled during setup, so only `evaluate_density` and
//! `normalize_features` are timed.
#![expect(
    missing_docs,
    reason = "Criterion macros generate items without doc comments"
)]
use criterion::{BatchSize, BenchmarkId, Criterion, criterion_group, criterion_main};

use opforest_benches::{
    error::BenchSetupError,
    params::DensityBenchParams,
    source::{LabelledBlobConfig, connect_k_nearest, generate_labelled_blobs, pairwise_distances},
};
use opforest_core::{DistanceSource, SquaredEuclidean};

/// Seed used for all synthetic data generation in this benchmark.
const SEED: u64 = 7;

/// Vector dimensionality for all benchmark datasets.
const DIMENSIONS: usize = 16;

/// Dataset sizes to benchmark.
const POINT_COUNTS: &[usize] = &[500, 2_000];

/// Neighbours linked from each node.
const NEIGHBOURS: usize = 10;

fn density_impl(c: &mut Criterion) -> Result<(), BenchSetupError> {
    let mut group = c.benchmark_group("density");
    group.sample_size(20);

    for &point_count in POINT_COUNTS {
        let mut graph = generate_labelled_blobs(&LabelledBlobConfig {
            point_count,
            dimensions: DIMENSIONS,
            class_count: 4,
            separation: 10.0,
            spread: 1.0,
            seed: SEED,
        })?;
        connect_k_nearest(&mut graph, NEIGHBOURS, &SquaredEuclidean)?;
        graph.set_diffusion_factor(8.0);
        let params = DensityBenchParams {
            point_count,
            neighbours: NEIGHBOURS,
        };

        group.bench_with_input(
            BenchmarkId::new("evaluate_density", &params),
            &graph,
            |b, input| {
                b.iter_batched_ref(
                    || input.clone(),
                    |copy| copy.evaluate_density(DistanceSource::Features(&SquaredEuclidean)),
                    BatchSize::LargeInput,
                );
            },
        );
        let table = pairwise_distances(&graph, &SquaredEuclidean)?;
        group.bench_with_input(
            BenchmarkId::new("evaluate_density_precomputed", &params),
            &graph,
            |b, input| {
                b.iter_batched_ref(
                    || input.clone(),
                    |copy| copy.evaluate_density(DistanceSource::Precomputed(&table)),
                    BatchSize::LargeInput,
                );
            },
        );
        group.bench_with_input(
            BenchmarkId::new("normalize_features", &params),
            &graph,
            |b, input| {
                b.iter_batched_ref(
                    || input.clone(),
                    opforest_core::Subgraph::normalize_features,
                    BatchSize::LargeInput,
                );
            },
        );
    }

    group.finish();
    Ok(())
}

fn density(c: &mut Criterion) {
    if let Err(err) = density_impl(c) {
        panic!("density benchmark setup failed: {err}");
    }
}

criterion_group!(benches, density);
criterion_main!(benches);

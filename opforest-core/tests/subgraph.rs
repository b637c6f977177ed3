//! Subgraph lifecycle and normalisation over the public API.

mod common;

use common::{connect_nearest, two_class_twenty};
use opforest_core::{Partitioner, Subgraph, SubgraphErrorCode};
use opforest_test_support::tracing::RecordingLayer;
use tracing::Level;

#[test]
fn merged_folds_rebuild_the_dataset() {
    let graph = two_class_twenty();
    let folds = Partitioner::from_seed(31).k_fold(&graph, 4).expect("valid folds");

    let mut merged = folds[0].clone();
    for fold in &folds[1..] {
        merged = Subgraph::merge(&merged, fold).expect("folds share dimensionality");
    }

    assert_eq!(merged.node_count(), graph.node_count());
    assert_eq!(merged.label_counts().expect("labels"), graph.label_counts().expect("labels"));
    let mut positions: Vec<usize> = merged.nodes().iter().map(|node| node.position()).collect();
    positions.sort_unstable();
    assert_eq!(positions, (0..20).collect::<Vec<_>>());
}

#[test]
fn merge_keeps_right_arcs_pointing_at_the_same_samples() {
    let mut left = two_class_twenty();
    let mut right = two_class_twenty();
    connect_nearest(&mut left, 2);
    connect_nearest(&mut right, 2);

    let merged = Subgraph::merge(&left, &right).expect("same dimensionality");
    let offset = left.node_count();
    for (index, node) in right.nodes().iter().enumerate() {
        let copy = merged.node(index + offset).expect("merged node");
        for (original, shifted) in node.adjacency().iter().zip(copy.adjacency().iter()) {
            let expected = right.node(original).expect("neighbour").features();
            let actual = merged.node(shifted).expect("neighbour").features();
            assert_eq!(expected, actual);
        }
    }
}

#[test]
fn training_loop_swaps_and_resets() {
    let graph = two_class_twenty();
    let (mut train, mut eval) = Partitioner::from_seed(4).split(&graph, 0.5).expect("valid split");
    connect_nearest(&mut train, 2);

    let outgoing = train.node(0).expect("node").position();
    let incoming = eval.node(0).expect("node").position();
    Subgraph::swap_nodes(&mut train, 0, &mut eval, 0).expect("valid indices");
    assert_eq!(train.node(0).expect("node").position(), incoming);
    assert_eq!(eval.node(0).expect("node").position(), outgoing);

    train.reset();
    assert!(train.nodes().iter().all(|node| node.adjacency().is_empty()));
}

#[test]
fn normalisation_fitted_on_train_applies_to_test() {
    let graph = two_class_twenty();
    let (mut train, mut test) = Partitioner::from_seed(8).split(&graph, 0.5).expect("valid split");
    let original = test.clone();

    let stats = train.normalize_features().expect("well-formed features");
    stats.apply(&mut test).expect("same dimensionality");

    for (scaled, raw) in test.nodes().iter().zip(original.nodes()) {
        let value = raw.features().expect("features")[0];
        let expected = (value - stats.means()[0]) / stats.stds()[0];
        assert_eq!(scaled.features().expect("features")[0], expected);
    }
}

#[test]
fn constant_feature_emits_warning() {
    let mut graph = Subgraph::from_samples(2, (0..4).map(|i| (vec![1.0, i as f32], 1)))
        .expect("valid samples");
    let (result, layer) = RecordingLayer::capture(|| graph.normalize_features());
    let stats = result.expect("well-formed features");

    assert_eq!(stats.stds()[0], 1.0);
    let warnings = layer.events_at(Level::WARN);
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].field("dimension"), Some("0"));
}

#[test]
fn merge_failure_is_a_precondition_violation() {
    let left = two_class_twenty();
    let right = Subgraph::from_samples(2, vec![(vec![0.0, 0.0], 1)]).expect("valid");
    let err = Subgraph::merge(&left, &right).expect_err("dimensionality differs");
    assert!(err.is_precondition_violation());
    assert_eq!(err.code().as_str(), "SUBGRAPH_FEATURE_COUNT_MISMATCH");
    assert_eq!(err.code(), SubgraphErrorCode::FeatureCountMismatch);
}

use opforest_core::{DistanceError, DistanceErrorCode, SubgraphError, SubgraphErrorCode, VectorKind};
use rstest::rstest;

#[rstest]
#[case(DistanceError::ZeroLength, DistanceErrorCode::ZeroLength)]
#[case(
    DistanceError::DimensionMismatch { left: 1, right: 2 },
    DistanceErrorCode::DimensionMismatch,
)]
#[case(
    DistanceError::NonFinite { which: VectorKind::Left, index: 0, value: f32::NAN },
    DistanceErrorCode::NonFinite,
)]
#[case(DistanceError::OutOfBounds { index: 3, len: 2 }, DistanceErrorCode::OutOfBounds)]
#[case(
    DistanceError::InvalidShape { size: 2, expected: 4, actual: 3 },
    DistanceErrorCode::InvalidShape,
)]
fn returns_expected_distance_code(
    #[case] error: DistanceError,
    #[case] expected: DistanceErrorCode,
) {
    assert_eq!(error.code(), expected);
    assert!(expected.as_str().starts_with("DISTANCE_"));
}

#[rstest]
#[case(SubgraphError::OutOfMemory { requested: 8 }, "SUBGRAPH_OUT_OF_MEMORY", false)]
#[case(
    SubgraphError::FeatureCountMismatch { left: 1, right: 2 },
    "SUBGRAPH_FEATURE_COUNT_MISMATCH",
    true,
)]
#[case(
    SubgraphError::FeatureLengthMismatch { node: 0, expected: 2, actual: 1 },
    "SUBGRAPH_FEATURE_LENGTH_MISMATCH",
    true,
)]
#[case(SubgraphError::MissingFeatures { node: 0 }, "SUBGRAPH_MISSING_FEATURES", true)]
#[case(
    SubgraphError::NodeOutOfBounds { node: 4, node_count: 2 },
    "SUBGRAPH_NODE_OUT_OF_BOUNDS",
    true,
)]
#[case(
    SubgraphError::NeighbourOutOfBounds { node: 0, neighbour: 9, node_count: 2 },
    "SUBGRAPH_NEIGHBOUR_OUT_OF_BOUNDS",
    true,
)]
#[case(
    SubgraphError::LabelOutOfRange { node: 0, label: 3, label_n: 2 },
    "SUBGRAPH_LABEL_OUT_OF_RANGE",
    true,
)]
#[case(SubgraphError::InvalidPercentage { perc: 2.0 }, "SUBGRAPH_INVALID_PERCENTAGE", false)]
#[case(SubgraphError::InvalidFoldCount { folds: 0 }, "SUBGRAPH_INVALID_FOLD_COUNT", false)]
#[case(
    SubgraphError::InsufficientSamples { label: 1, available: 2, folds: 3 },
    "SUBGRAPH_INSUFFICIENT_SAMPLES",
    false,
)]
#[case(
    SubgraphError::InvalidDiffusionFactor { df: 0.0 },
    "SUBGRAPH_INVALID_DIFFUSION_FACTOR",
    false,
)]
#[case(
    SubgraphError::InvalidDistance { left: 0, right: 1, value: -1.0 },
    "SUBGRAPH_INVALID_DISTANCE",
    false,
)]
#[case(
    SubgraphError::Distance(DistanceError::ZeroLength),
    "SUBGRAPH_DISTANCE_FAILURE",
    false,
)]
fn returns_expected_subgraph_code(
    #[case] error: SubgraphError,
    #[case] code: &str,
    #[case] precondition: bool,
) {
    assert_eq!(error.code().as_str(), code);
    assert_eq!(error.code().to_string(), code);
    assert_eq!(error.is_precondition_violation(), precondition);
}

#[test]
fn distance_failures_expose_inner_code() {
    let error = SubgraphError::from(DistanceError::OutOfBounds { index: 5, len: 2 });
    assert_eq!(error.code(), SubgraphErrorCode::DistanceFailure);
    assert_eq!(error.distance_code(), Some(DistanceErrorCode::OutOfBounds));
    assert_eq!(
        error.to_string(),
        "distance computation failed: position 5 is out of bounds for 2 entries"
    );
    assert_eq!(SubgraphError::MissingFeatures { node: 1 }.distance_code(), None);
}

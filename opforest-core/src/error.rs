//! Error types for the opforest core library.
//!
//! Defines the error enum exposed by the public API, stable machine-readable
//! codes for every variant, and a convenient result alias.

use std::fmt;

use thiserror::Error;

use crate::distance::{DistanceError, DistanceErrorCode};

macro_rules! define_error_codes {
    (
        $(#[$enum_meta:meta])*
        enum $CodeTy:ident for $ErrTy:ident {
            $(
                $(#[$variant_meta:meta])*
                $CodeVariant:ident => $ErrVariant:ident $( { $($pattern:tt)* } )? $( ( $($tuple:tt)* ) )? => $code:expr
            ),+ $(,)?
        }
    ) => {
        $(#[$enum_meta])*
        #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
        #[non_exhaustive]
        pub enum $CodeTy {
            $(
                $(#[$variant_meta])*
                $CodeVariant,
            )+
        }

        impl $CodeTy {
            /// Return the stable machine-readable representation of this error code.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$CodeVariant => $code,)+
                }
            }
        }

        impl fmt::Display for $CodeTy {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl $ErrTy {
            #[doc = concat!(
                "Retrieve the stable [`",
                stringify!($CodeTy),
                "`] for this error."
            )]
            #[must_use]
            pub const fn code(&self) -> $CodeTy {
                match self {
                    $(Self::$ErrVariant $( { $($pattern)* } )? $( ( $($tuple)* ) )? => $CodeTy::$CodeVariant,)+
                }
            }
        }
    };
}

pub(crate) use define_error_codes;

/// Error type produced by [`crate::Subgraph`] operations.
#[non_exhaustive]
#[derive(Clone, Debug, Error, PartialEq)]
pub enum SubgraphError {
    /// Allocating storage for the requested number of elements failed.
    #[error("failed to allocate storage for {requested} elements")]
    OutOfMemory {
        /// Number of elements the allocation was sized for.
        requested: usize,
    },
    /// Two subgraphs with different feature dimensionality were combined.
    #[error("feature count mismatch: left={left}, right={right}")]
    FeatureCountMismatch {
        /// Feature count of the left-hand subgraph.
        left: usize,
        /// Feature count of the right-hand subgraph.
        right: usize,
    },
    /// A node's feature vector does not match the subgraph's `feat_n`.
    #[error("node {node} has {actual} features but the subgraph expects {expected}")]
    FeatureLengthMismatch {
        /// Index of the offending node.
        node: usize,
        /// Feature count configured on the subgraph.
        expected: usize,
        /// Length of the node's feature vector.
        actual: usize,
    },
    /// A node has no feature vector where one is required.
    #[error("node {node} has no feature vector")]
    MissingFeatures {
        /// Index of the node lacking features.
        node: usize,
    },
    /// A node index was outside the subgraph.
    #[error("node {node} is out of bounds for a subgraph of {node_count} nodes")]
    NodeOutOfBounds {
        /// The requested node index.
        node: usize,
        /// Number of nodes in the subgraph.
        node_count: usize,
    },
    /// An adjacency entry referenced a node outside the subgraph.
    #[error("node {node} lists neighbour {neighbour} but the subgraph has {node_count} nodes")]
    NeighbourOutOfBounds {
        /// Node owning the adjacency set.
        node: usize,
        /// The out-of-range neighbour index.
        neighbour: usize,
        /// Number of nodes in the subgraph.
        node_count: usize,
    },
    /// A node's true label exceeds the subgraph's `label_n`.
    #[error("node {node} has label {label} but label_n is {label_n}")]
    LabelOutOfRange {
        /// Index of the offending node.
        node: usize,
        /// Label carried by the node.
        label: usize,
        /// Largest label the subgraph declares.
        label_n: usize,
    },
    /// The split percentage was not a finite value in `(0, 1]`.
    #[error("split percentage must lie in (0, 1] (got {perc})")]
    InvalidPercentage {
        /// The rejected percentage.
        perc: f32,
    },
    /// Zero folds were requested.
    #[error("fold count must be at least 1 (got {folds})")]
    InvalidFoldCount {
        /// The rejected fold count.
        folds: usize,
    },
    /// A label has fewer samples than the requested number of folds.
    #[error("label {label} has {available} samples, fewer than the {folds} requested folds")]
    InsufficientSamples {
        /// Label lacking samples.
        label: usize,
        /// Number of samples carrying the label.
        available: usize,
        /// Requested fold count.
        folds: usize,
    },
    /// The diffusion factor was zero, negative, or non-finite.
    #[error("diffusion factor must be finite and positive (got {df})")]
    InvalidDiffusionFactor {
        /// The rejected diffusion factor.
        df: f32,
    },
    /// A distance collaborator returned a negative or non-finite distance.
    #[error("distance between nodes {left} and {right} is invalid: {value}")]
    InvalidDistance {
        /// Left node index.
        left: usize,
        /// Right node index.
        right: usize,
        /// The rejected distance.
        value: f32,
    },
    /// A distance collaborator failed.
    #[error("distance computation failed: {0}")]
    Distance(#[from] DistanceError),
}

define_error_codes! {
    /// Stable codes describing [`SubgraphError`] variants.
    enum SubgraphErrorCode for SubgraphError {
        /// Allocating storage failed.
        OutOfMemory => OutOfMemory { .. } => "SUBGRAPH_OUT_OF_MEMORY",
        /// Combined subgraphs disagree on feature dimensionality.
        FeatureCountMismatch => FeatureCountMismatch { .. } => "SUBGRAPH_FEATURE_COUNT_MISMATCH",
        /// A feature vector has the wrong length.
        FeatureLengthMismatch => FeatureLengthMismatch { .. } => "SUBGRAPH_FEATURE_LENGTH_MISMATCH",
        /// A node has no feature vector.
        MissingFeatures => MissingFeatures { .. } => "SUBGRAPH_MISSING_FEATURES",
        /// A node index was outside the subgraph.
        NodeOutOfBounds => NodeOutOfBounds { .. } => "SUBGRAPH_NODE_OUT_OF_BOUNDS",
        /// An adjacency entry was outside the subgraph.
        NeighbourOutOfBounds => NeighbourOutOfBounds { .. } => "SUBGRAPH_NEIGHBOUR_OUT_OF_BOUNDS",
        /// A label exceeded `label_n`.
        LabelOutOfRange => LabelOutOfRange { .. } => "SUBGRAPH_LABEL_OUT_OF_RANGE",
        /// The split percentage was invalid.
        InvalidPercentage => InvalidPercentage { .. } => "SUBGRAPH_INVALID_PERCENTAGE",
        /// The fold count was invalid.
        InvalidFoldCount => InvalidFoldCount { .. } => "SUBGRAPH_INVALID_FOLD_COUNT",
        /// A label cannot populate every fold.
        InsufficientSamples => InsufficientSamples { .. } => "SUBGRAPH_INSUFFICIENT_SAMPLES",
        /// The diffusion factor was invalid.
        InvalidDiffusionFactor => InvalidDiffusionFactor { .. } => "SUBGRAPH_INVALID_DIFFUSION_FACTOR",
        /// A distance collaborator returned an unusable value.
        InvalidDistance => InvalidDistance { .. } => "SUBGRAPH_INVALID_DISTANCE",
        /// A distance collaborator failed.
        DistanceFailure => Distance(..) => "SUBGRAPH_DISTANCE_FAILURE",
    }
}

impl SubgraphError {
    /// Retrieve the inner [`DistanceErrorCode`] when the error originated in
    /// a distance collaborator.
    #[must_use]
    pub const fn distance_code(&self) -> Option<DistanceErrorCode> {
        match self {
            Self::Distance(error) => Some(error.code()),
            _ => None,
        }
    }

    /// Returns `true` when the error reports a broken caller contract rather
    /// than a resource failure.
    ///
    /// Mismatched feature dimensionality is the canonical precondition
    /// violation; the other structural mismatches fall in the same class.
    #[must_use]
    pub const fn is_precondition_violation(&self) -> bool {
        matches!(
            self,
            Self::FeatureCountMismatch { .. }
                | Self::FeatureLengthMismatch { .. }
                | Self::MissingFeatures { .. }
                | Self::NodeOutOfBounds { .. }
                | Self::NeighbourOutOfBounds { .. }
                | Self::LabelOutOfRange { .. }
        )
    }
}

/// Convenient alias for results returned by the core API.
pub type Result<T> = core::result::Result<T, SubgraphError>;

/// Reserves exactly `len` slots in a fresh vector, surfacing allocation
/// failure as [`SubgraphError::OutOfMemory`].
pub(crate) fn try_vec_with_capacity<T>(len: usize) -> Result<Vec<T>> {
    let mut values = Vec::new();
    values
        .try_reserve_exact(len)
        .map_err(|_| SubgraphError::OutOfMemory { requested: len })?;
    Ok(values)
}

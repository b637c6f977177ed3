//! The subgraph container: a dataset stored as an arena of nodes.
//!
//! A [`Subgraph`] exclusively owns its node array. Neighbour, predecessor and
//! root references are indices into that array, so every operation that
//! builds a new subgraph from existing nodes (copy, merge, partitioning)
//! produces independently allocated storage and never aliases its inputs.
//!
//! The operating subsystems live in sibling modules as further `impl` blocks:
//!
//! - `partition` hosts the stratified split and k-fold generator.
//! - `density` hosts kernel density evaluation.
//! - `normalize` hosts z-score feature standardisation.

pub(crate) mod density;
pub(crate) mod normalize;
pub(crate) mod partition;

use tracing::{debug, instrument};

use crate::{
    Result,
    error::{SubgraphError, try_vec_with_capacity},
    node::Node,
};

/// Upper bound of the normalised density scale.
pub const DENS_MAX: f32 = 1000.0;

/// Labelled samples and the graph-wide parameters shared by them.
///
/// # Examples
/// ```
/// use opforest_core::Subgraph;
///
/// let graph = Subgraph::from_samples(2, vec![
///     (vec![0.0, 1.0], 1),
///     (vec![1.0, 0.0], 2),
/// ])?;
/// assert_eq!(graph.node_count(), 2);
/// assert_eq!(graph.label_n(), 2);
/// assert_eq!(graph.node(1)?.position(), 1);
/// # Ok::<(), opforest_core::SubgraphError>(())
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Subgraph {
    nodes: Vec<Node>,
    ordered_nodes: Vec<usize>,
    feat_n: usize,
    label_n: usize,
    density_min: f32,
    density_max: f32,
    bandwidth: f32,
    diffusion_factor: f32,
    k_best: usize,
}

impl Subgraph {
    /// Allocates `node_count` blank nodes without feature storage.
    ///
    /// # Errors
    /// Returns [`SubgraphError::OutOfMemory`] when the node or ordering
    /// arrays cannot be allocated.
    ///
    /// # Examples
    /// ```
    /// use opforest_core::Subgraph;
    ///
    /// let graph = Subgraph::new(3)?;
    /// assert_eq!(graph.node_count(), 3);
    /// assert!(graph.nodes().iter().all(|node| node.features().is_none()));
    /// # Ok::<(), opforest_core::SubgraphError>(())
    /// ```
    pub fn new(node_count: usize) -> Result<Self> {
        let mut nodes = try_vec_with_capacity(node_count)?;
        nodes.resize_with(node_count, Node::new);
        let mut ordered_nodes = try_vec_with_capacity(node_count)?;
        ordered_nodes.resize(node_count, 0);
        Ok(Self::from_parts(nodes, ordered_nodes, 0, 0))
    }

    /// Builds a populated subgraph from `(features, label)` pairs.
    ///
    /// Each node's original position is its index in `samples` and `label_n`
    /// becomes the largest label seen.
    ///
    /// # Errors
    /// Returns [`SubgraphError::FeatureLengthMismatch`] when a feature vector
    /// does not hold `feat_n` values and [`SubgraphError::OutOfMemory`] when
    /// allocation fails.
    pub fn from_samples<I>(feat_n: usize, samples: I) -> Result<Self>
    where
        I: IntoIterator<Item = (Vec<f32>, usize)>,
    {
        let samples = samples.into_iter();
        let mut nodes = try_vec_with_capacity(samples.size_hint().0)?;
        let mut label_n = 0;
        for (position, (features, label)) in samples.enumerate() {
            if features.len() != feat_n {
                return Err(SubgraphError::FeatureLengthMismatch {
                    node: position,
                    expected: feat_n,
                    actual: features.len(),
                });
            }
            let mut node = Node::new();
            node.replace_features(features);
            node.set_true_label(label);
            node.set_position(position);
            label_n = label_n.max(label);
            nodes.push(node);
        }
        let mut ordered_nodes = try_vec_with_capacity(nodes.len())?;
        ordered_nodes.resize(nodes.len(), 0);
        Ok(Self::from_parts(nodes, ordered_nodes, feat_n, label_n))
    }

    const fn from_parts(
        nodes: Vec<Node>,
        ordered_nodes: Vec<usize>,
        feat_n: usize,
        label_n: usize,
    ) -> Self {
        Self {
            nodes,
            ordered_nodes,
            feat_n,
            label_n,
            density_min: 0.0,
            density_max: 0.0,
            bandwidth: 0.0,
            diffusion_factor: 0.0,
            k_best: 0,
        }
    }

    /// Builds a child subgraph holding partition copies of `indices`.
    pub(crate) fn partition_of(&self, indices: &[usize]) -> Result<Self> {
        let mut nodes = try_vec_with_capacity(indices.len())?;
        for &index in indices {
            nodes.push(Node::sample_of(self.node(index)?)?);
        }
        let mut ordered_nodes = try_vec_with_capacity(indices.len())?;
        ordered_nodes.resize(indices.len(), 0);
        Ok(Self::from_parts(
            nodes,
            ordered_nodes,
            self.feat_n,
            self.label_n,
        ))
    }

    /// Deep copy that reports allocation failure instead of aborting.
    ///
    /// Every node is copied with its feature vector and a clone of its
    /// adjacency set, together with all graph-wide scalars and the ordering
    /// array.
    ///
    /// # Errors
    /// Returns [`SubgraphError::OutOfMemory`] when any allocation fails.
    pub fn try_clone(&self) -> Result<Self> {
        let mut nodes = try_vec_with_capacity(self.nodes.len())?;
        for node in &self.nodes {
            nodes.push(node.try_clone()?);
        }
        let mut ordered_nodes = try_vec_with_capacity(self.ordered_nodes.len())?;
        ordered_nodes.extend_from_slice(&self.ordered_nodes);
        Ok(Self {
            nodes,
            ordered_nodes,
            feat_n: self.feat_n,
            label_n: self.label_n,
            density_min: self.density_min,
            density_max: self.density_max,
            bandwidth: self.bandwidth,
            diffusion_factor: self.diffusion_factor,
            k_best: self.k_best,
        })
    }

    /// Concatenates `left` and `right` into a new subgraph.
    ///
    /// `left`'s nodes come first. Adjacency, predecessor and root indices of
    /// nodes taken from `right` are shifted by `left.node_count()` so they
    /// keep referring to the same samples. The result takes `left`'s feature
    /// count and the larger of the two label counts; other scalars start
    /// from their defaults.
    ///
    /// # Errors
    /// Returns [`SubgraphError::FeatureCountMismatch`] when the operands
    /// disagree on `feat_n`, [`SubgraphError::NeighbourOutOfBounds`] or
    /// [`SubgraphError::NodeOutOfBounds`] when a node of `right` links past
    /// `right.node_count()`, and [`SubgraphError::OutOfMemory`] when
    /// allocation fails.
    ///
    /// # Examples
    /// ```
    /// use opforest_core::Subgraph;
    ///
    /// let left = Subgraph::from_samples(1, vec![(vec![0.0], 1)])?;
    /// let right = Subgraph::from_samples(1, vec![(vec![1.0], 3), (vec![2.0], 2)])?;
    /// let merged = Subgraph::merge(&left, &right)?;
    /// assert_eq!(merged.node_count(), 3);
    /// assert_eq!(merged.label_n(), 3);
    /// # Ok::<(), opforest_core::SubgraphError>(())
    /// ```
    #[instrument(
        name = "subgraph.merge",
        err,
        skip(left, right),
        fields(left_nodes = left.node_count(), right_nodes = right.node_count()),
    )]
    pub fn merge(left: &Self, right: &Self) -> Result<Self> {
        if left.feat_n != right.feat_n {
            return Err(SubgraphError::FeatureCountMismatch {
                left: left.feat_n,
                right: right.feat_n,
            });
        }

        let offset = left.node_count();
        let total = offset
            .checked_add(right.node_count())
            .ok_or(SubgraphError::OutOfMemory {
                requested: usize::MAX,
            })?;
        let mut nodes = try_vec_with_capacity(total)?;
        for node in &left.nodes {
            nodes.push(node.try_clone()?);
        }
        for (index, node) in right.nodes.iter().enumerate() {
            let mut copy = node.try_clone()?;
            copy.offset_indices(index, offset, right.node_count())?;
            nodes.push(copy);
        }
        let mut ordered_nodes = try_vec_with_capacity(total)?;
        ordered_nodes.resize(total, 0);

        Ok(Self::from_parts(
            nodes,
            ordered_nodes,
            left.feat_n,
            left.label_n.max(right.label_n),
        ))
    }

    /// Prepares the subgraph for another run of the forest algorithm.
    ///
    /// Every predecessor becomes `None`, every adjacency set is cleared and
    /// plateau counts drop to zero.
    pub fn reset(&mut self) {
        for node in &mut self.nodes {
            node.clear_arcs();
        }
        debug!(nodes = self.nodes.len(), "subgraph reset");
    }

    /// Exchanges node `i` of `left` with node `j` of `right`.
    ///
    /// Both moved nodes lose their adjacency and predecessor because those
    /// indices are local to the subgraph they came from.
    ///
    /// # Errors
    /// Returns [`SubgraphError::FeatureCountMismatch`] when the subgraphs
    /// disagree on `feat_n`, or [`SubgraphError::NodeOutOfBounds`] when
    /// either index is invalid. Nothing is swapped on error.
    pub fn swap_nodes(left: &mut Self, i: usize, right: &mut Self, j: usize) -> Result<()> {
        if left.feat_n != right.feat_n {
            return Err(SubgraphError::FeatureCountMismatch {
                left: left.feat_n,
                right: right.feat_n,
            });
        }
        let left_node = left.node_mut(i)?;
        let right_node = right.node_mut(j)?;
        std::mem::swap(left_node, right_node);
        left_node.clear_arcs();
        right_node.clear_arcs();
        Ok(())
    }

    /// Swaps two nodes of this subgraph in place, keeping their state.
    ///
    /// # Errors
    /// Returns [`SubgraphError::NodeOutOfBounds`] when either index is
    /// invalid.
    pub fn swap_within(&mut self, i: usize, j: usize) -> Result<()> {
        self.check_index(i)?;
        self.check_index(j)?;
        self.nodes.swap(i, j);
        Ok(())
    }

    /// Number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Returns whether the subgraph holds no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Read-only view of the node array.
    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Mutable view of the node array for collaborators such as graph
    /// builders.
    pub fn nodes_mut(&mut self) -> &mut [Node] {
        &mut self.nodes
    }

    /// Returns node `index`.
    ///
    /// # Errors
    /// Returns [`SubgraphError::NodeOutOfBounds`] for an invalid index.
    pub fn node(&self, index: usize) -> Result<&Node> {
        self.nodes.get(index).ok_or(SubgraphError::NodeOutOfBounds {
            node: index,
            node_count: self.nodes.len(),
        })
    }

    /// Returns node `index` mutably.
    ///
    /// # Errors
    /// Returns [`SubgraphError::NodeOutOfBounds`] for an invalid index.
    pub fn node_mut(&mut self, index: usize) -> Result<&mut Node> {
        let node_count = self.nodes.len();
        self.nodes
            .get_mut(index)
            .ok_or(SubgraphError::NodeOutOfBounds {
                node: index,
                node_count,
            })
    }

    fn check_index(&self, index: usize) -> Result<()> {
        self.node(index).map(|_| ())
    }

    /// Stores `features` on node `index`, returning the previous vector.
    ///
    /// # Errors
    /// Returns [`SubgraphError::NodeOutOfBounds`] for an invalid index and
    /// [`SubgraphError::FeatureLengthMismatch`] when the vector does not hold
    /// `feat_n` values.
    pub fn set_features(&mut self, index: usize, features: Vec<f32>) -> Result<Option<Vec<f32>>> {
        if features.len() != self.feat_n {
            return Err(SubgraphError::FeatureLengthMismatch {
                node: index,
                expected: self.feat_n,
                actual: features.len(),
            });
        }
        Ok(self.node_mut(index)?.replace_features(features))
    }

    /// Feature dimensionality shared by every node.
    #[must_use]
    pub fn feat_n(&self) -> usize {
        self.feat_n
    }

    /// Sets the feature dimensionality.
    ///
    /// # Errors
    /// Returns [`SubgraphError::FeatureLengthMismatch`] when an already
    /// populated feature vector has a different length.
    pub fn set_feat_n(&mut self, feat_n: usize) -> Result<()> {
        if let Some((node, actual)) = self
            .nodes
            .iter()
            .enumerate()
            .filter_map(|(index, node)| node.features().map(|features| (index, features.len())))
            .find(|&(_, len)| len != feat_n)
        {
            return Err(SubgraphError::FeatureLengthMismatch {
                node,
                expected: feat_n,
                actual,
            });
        }
        self.feat_n = feat_n;
        Ok(())
    }

    /// Largest class label; labels run from `1` to `label_n`.
    #[must_use]
    pub fn label_n(&self) -> usize {
        self.label_n
    }

    /// Sets the largest class label.
    pub fn set_label_n(&mut self, label_n: usize) {
        self.label_n = label_n;
    }

    /// Smallest raw density seen by the last evaluation.
    #[must_use]
    pub fn density_min(&self) -> f32 {
        self.density_min
    }

    /// Largest raw density seen by the last evaluation.
    #[must_use]
    pub fn density_max(&self) -> f32 {
        self.density_max
    }

    /// Kernel bandwidth `k` derived by the last density evaluation.
    #[must_use]
    pub fn bandwidth(&self) -> f32 {
        self.bandwidth
    }

    /// Diffusion factor `df` used to derive the kernel bandwidth.
    #[must_use]
    pub fn diffusion_factor(&self) -> f32 {
        self.diffusion_factor
    }

    /// Sets the diffusion factor. It is validated when densities are
    /// evaluated.
    pub fn set_diffusion_factor(&mut self, df: f32) {
        self.diffusion_factor = df;
    }

    /// Neighbourhood size chosen by the forest algorithm.
    #[must_use]
    pub fn k_best(&self) -> usize {
        self.k_best
    }

    /// Records the neighbourhood size chosen by the forest algorithm.
    pub fn set_k_best(&mut self, k_best: usize) {
        self.k_best = k_best;
    }

    /// Node indices in the order the forest algorithm processed them.
    #[must_use]
    pub fn ordered_nodes(&self) -> &[usize] {
        &self.ordered_nodes
    }

    /// Mutable ordering array for the forest algorithm.
    pub fn ordered_nodes_mut(&mut self) -> &mut [usize] {
        &mut self.ordered_nodes
    }

    /// Tallies true labels into a vector indexed `0..=label_n`.
    ///
    /// # Errors
    /// Returns [`SubgraphError::LabelOutOfRange`] when a node's label exceeds
    /// `label_n`.
    ///
    /// # Examples
    /// ```
    /// use opforest_core::Subgraph;
    ///
    /// let graph = Subgraph::from_samples(1, vec![
    ///     (vec![0.0], 1),
    ///     (vec![1.0], 2),
    ///     (vec![2.0], 2),
    /// ])?;
    /// assert_eq!(graph.label_counts()?, [0, 1, 2]);
    /// # Ok::<(), opforest_core::SubgraphError>(())
    /// ```
    pub fn label_counts(&self) -> Result<Vec<usize>> {
        let mut counts = try_vec_with_capacity(self.label_n.saturating_add(1))?;
        counts.resize(self.label_n.saturating_add(1), 0);
        for (index, node) in self.nodes.iter().enumerate() {
            let label = node.true_label();
            let slot = counts
                .get_mut(label)
                .ok_or(SubgraphError::LabelOutOfRange {
                    node: index,
                    label,
                    label_n: self.label_n,
                })?;
            *slot += 1;
        }
        Ok(counts)
    }

    /// Ensures every node carries a feature vector of length `feat_n`.
    pub(crate) fn validate_features(&self) -> Result<()> {
        for (index, node) in self.nodes.iter().enumerate() {
            let features = node
                .features()
                .ok_or(SubgraphError::MissingFeatures { node: index })?;
            if features.len() != self.feat_n {
                return Err(SubgraphError::FeatureLengthMismatch {
                    node: index,
                    expected: self.feat_n,
                    actual: features.len(),
                });
            }
        }
        Ok(())
    }
}

//! Per-sample node storage.
//!
//! A [`Node`] owns its feature vector and its [`Adjacency`] outright, so
//! cloning a node never aliases the source's storage. Neighbours are plain
//! indices into the owning subgraph's node array.

use crate::error::{Result, SubgraphError, try_vec_with_capacity};

/// Insertion-ordered set of neighbour indices.
///
/// Indices are local to the subgraph that owns the node. Inserting an index
/// that is already present is a no-op.
///
/// # Examples
/// ```
/// use opforest_core::Adjacency;
///
/// let mut adjacency = Adjacency::new();
/// assert!(adjacency.insert(3));
/// assert!(adjacency.insert(1));
/// assert!(!adjacency.insert(3));
/// assert_eq!(adjacency.iter().collect::<Vec<_>>(), [3, 1]);
/// ```
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Adjacency {
    neighbours: Vec<usize>,
}

impl Adjacency {
    /// Creates an empty adjacency set.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            neighbours: Vec::new(),
        }
    }

    /// Adds `neighbour`, returning `false` when it was already present.
    pub fn insert(&mut self, neighbour: usize) -> bool {
        if self.neighbours.contains(&neighbour) {
            return false;
        }
        self.neighbours.push(neighbour);
        true
    }

    /// Removes `neighbour`, returning whether it was present.
    pub fn remove(&mut self, neighbour: usize) -> bool {
        match self.neighbours.iter().position(|&n| n == neighbour) {
            Some(index) => {
                self.neighbours.remove(index);
                true
            }
            None => false,
        }
    }

    /// Returns whether `neighbour` is in the set.
    #[must_use]
    pub fn contains(&self, neighbour: usize) -> bool {
        self.neighbours.contains(&neighbour)
    }

    /// Number of neighbours.
    #[must_use]
    pub fn len(&self) -> usize {
        self.neighbours.len()
    }

    /// Returns whether the set holds no neighbours.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.neighbours.is_empty()
    }

    /// Iterates over neighbours in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.neighbours.iter().copied()
    }

    /// Drops every neighbour.
    pub fn clear(&mut self) {
        self.neighbours.clear();
    }

    pub(crate) fn try_clone(&self) -> Result<Self> {
        Ok(Self {
            neighbours: try_copy(&self.neighbours)?,
        })
    }

    /// Returns the first neighbour at or beyond `node_count`.
    pub(crate) fn first_out_of_bounds(&self, node_count: usize) -> Option<usize> {
        self.iter().find(|&neighbour| neighbour >= node_count)
    }

    /// Shifts every neighbour index by `offset`.
    ///
    /// Callers check the indices with [`Self::first_out_of_bounds`] first.
    fn offset_by(&mut self, offset: usize) {
        for neighbour in &mut self.neighbours {
            *neighbour = neighbour.saturating_add(offset);
        }
    }
}

impl FromIterator<usize> for Adjacency {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        let mut adjacency = Self::new();
        for neighbour in iter {
            adjacency.insert(neighbour);
        }
        adjacency
    }
}

/// One labelled sample together with its classifier state.
///
/// The density fields are written by
/// [`Subgraph::evaluate_density`](crate::Subgraph::evaluate_density). The
/// predecessor, root, predicted label, relevance, radius and plateau count
/// belong to the downstream optimum-path forest algorithm and are exposed
/// through setters for it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Node {
    features: Option<Vec<f32>>,
    adjacency: Adjacency,
    density: f32,
    path_value: f32,
    predecessor: Option<usize>,
    root: usize,
    true_label: usize,
    predicted_label: usize,
    position: usize,
    relevant: bool,
    radius: f32,
    plateau_adjacency_count: usize,
}

impl Node {
    /// Creates a node without features, labels or adjacency.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Copies the fields a partition carries over: position, features and
    /// the true label. Everything else starts from its default.
    pub(crate) fn sample_of(source: &Self) -> Result<Self> {
        let features = match &source.features {
            Some(values) => Some(try_copy(values)?),
            None => None,
        };
        Ok(Self {
            features,
            true_label: source.true_label,
            position: source.position,
            ..Self::default()
        })
    }

    /// Deep copy that reports allocation failure instead of aborting.
    pub(crate) fn try_clone(&self) -> Result<Self> {
        let features = match &self.features {
            Some(values) => Some(try_copy(values)?),
            None => None,
        };
        Ok(Self {
            features,
            adjacency: self.adjacency.try_clone()?,
            density: self.density,
            path_value: self.path_value,
            predecessor: self.predecessor,
            root: self.root,
            true_label: self.true_label,
            predicted_label: self.predicted_label,
            position: self.position,
            relevant: self.relevant,
            radius: self.radius,
            plateau_adjacency_count: self.plateau_adjacency_count,
        })
    }

    /// Returns the feature vector, if populated.
    #[must_use]
    pub fn features(&self) -> Option<&[f32]> {
        self.features.as_deref()
    }

    /// Returns a mutable view of the feature vector, if populated.
    pub fn features_mut(&mut self) -> Option<&mut [f32]> {
        self.features.as_deref_mut()
    }

    pub(crate) fn replace_features(&mut self, features: Vec<f32>) -> Option<Vec<f32>> {
        self.features.replace(features)
    }

    /// Returns the neighbour set.
    #[must_use]
    pub fn adjacency(&self) -> &Adjacency {
        &self.adjacency
    }

    /// Returns the neighbour set for the graph builder to populate.
    pub fn adjacency_mut(&mut self) -> &mut Adjacency {
        &mut self.adjacency
    }

    /// Normalised density in `[1, DENS_MAX]` after evaluation.
    #[must_use]
    pub fn density(&self) -> f32 {
        self.density
    }

    /// Overrides the stored density.
    pub fn set_density(&mut self, density: f32) {
        self.density = density;
    }

    /// Current path cost; seeded as `density - 1` by density evaluation.
    #[must_use]
    pub fn path_value(&self) -> f32 {
        self.path_value
    }

    /// Overrides the path cost.
    pub fn set_path_value(&mut self, path_value: f32) {
        self.path_value = path_value;
    }

    /// Predecessor in the optimum-path forest; `None` marks a root or an
    /// unprocessed node.
    #[must_use]
    pub fn predecessor(&self) -> Option<usize> {
        self.predecessor
    }

    /// Sets the predecessor.
    pub fn set_predecessor(&mut self, predecessor: Option<usize>) {
        self.predecessor = predecessor;
    }

    /// Index of the node's tree root.
    #[must_use]
    pub fn root(&self) -> usize {
        self.root
    }

    /// Sets the tree root.
    pub fn set_root(&mut self, root: usize) {
        self.root = root;
    }

    /// Ground-truth class label.
    #[must_use]
    pub fn true_label(&self) -> usize {
        self.true_label
    }

    /// Sets the ground-truth class label.
    pub fn set_true_label(&mut self, label: usize) {
        self.true_label = label;
    }

    /// Label assigned by the classifier.
    #[must_use]
    pub fn predicted_label(&self) -> usize {
        self.predicted_label
    }

    /// Sets the classifier-assigned label.
    pub fn set_predicted_label(&mut self, label: usize) {
        self.predicted_label = label;
    }

    /// Position of the sample in the caller's original dataset.
    #[must_use]
    pub fn position(&self) -> usize {
        self.position
    }

    /// Sets the original dataset position.
    pub fn set_position(&mut self, position: usize) {
        self.position = position;
    }

    /// Whether a later stage flagged the node as relevant.
    #[must_use]
    pub fn is_relevant(&self) -> bool {
        self.relevant
    }

    /// Flags or unflags the node as relevant.
    pub fn set_relevant(&mut self, relevant: bool) {
        self.relevant = relevant;
    }

    /// Neighbourhood radius recorded by a later stage.
    #[must_use]
    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Sets the neighbourhood radius.
    pub fn set_radius(&mut self, radius: f32) {
        self.radius = radius;
    }

    /// Number of adjacent nodes sharing this node's density plateau.
    #[must_use]
    pub fn plateau_adjacency_count(&self) -> usize {
        self.plateau_adjacency_count
    }

    /// Sets the plateau adjacency count.
    pub fn set_plateau_adjacency_count(&mut self, count: usize) {
        self.plateau_adjacency_count = count;
    }

    pub(crate) fn set_density_and_path(&mut self, density: f32) {
        self.density = density;
        self.path_value = density - 1.0;
    }

    /// Clears state derived from adjacency: predecessor, arcs and plateau
    /// count.
    pub(crate) fn clear_arcs(&mut self) {
        self.predecessor = None;
        self.adjacency.clear();
        self.plateau_adjacency_count = 0;
    }

    /// Moves node `index` of a `node_count`-node subgraph to `index + offset`
    /// by shifting every stored node index by `offset`.
    ///
    /// Neighbours, predecessor and root must lie below `node_count`, and
    /// `offset + node_count` must not overflow. The node is left untouched
    /// when a check fails.
    pub(crate) fn offset_indices(
        &mut self,
        index: usize,
        offset: usize,
        node_count: usize,
    ) -> Result<()> {
        if let Some(neighbour) = self.adjacency.first_out_of_bounds(node_count) {
            return Err(SubgraphError::NeighbourOutOfBounds {
                node: index,
                neighbour,
                node_count,
            });
        }
        for linked in self.predecessor.into_iter().chain([self.root]) {
            if linked >= node_count {
                return Err(SubgraphError::NodeOutOfBounds {
                    node: linked,
                    node_count,
                });
            }
        }
        self.adjacency.offset_by(offset);
        self.root = self.root.saturating_add(offset);
        self.predecessor = self
            .predecessor
            .map(|predecessor| predecessor.saturating_add(offset));
        Ok(())
    }
}

fn try_copy<T: Copy>(values: &[T]) -> Result<Vec<T>> {
    let mut copy = try_vec_with_capacity(values.len())?;
    copy.extend_from_slice(values);
    Ok(copy)
}

#![allow(dead_code, reason = "each integration test binary uses a different subset")]

use opforest_core::{DistanceError, PrecomputedDistances, Subgraph};

/// Twenty one-dimensional samples split evenly between labels 1 and 2.
///
/// Label 1 sits near the origin and label 2 near ten, alternating by index.
#[must_use]
pub fn two_class_twenty() -> Subgraph {
    let samples = (0..20_u8).map(|i| {
        let label = 1 + usize::from(i % 2);
        let offset = if label == 1 { 0.0 } else { 10.0 };
        (vec![offset + f32::from(i) / 20.0], label)
    });
    Subgraph::from_samples(1, samples).expect("fixture samples share one width")
}

/// Connects every node to its `k` nearest neighbours on the line.
pub fn connect_nearest(graph: &mut Subgraph, k: usize) {
    let points: Vec<f32> = graph
        .nodes()
        .iter()
        .map(|node| node.features().expect("fixture features")[0])
        .collect();
    for (index, &point) in points.iter().enumerate() {
        let mut others: Vec<usize> = (0..points.len()).filter(|&j| j != index).collect();
        others.sort_by(|&a, &b| (points[a] - point).abs().total_cmp(&(points[b] - point).abs()));
        let node = graph.node_mut(index).expect("index in range");
        for neighbour in others.into_iter().take(k) {
            node.adjacency_mut().insert(neighbour);
        }
    }
}

/// Precomputed table that reports the absolute difference of positions.
pub struct PositionGap {
    pub len: usize,
}

impl PrecomputedDistances for PositionGap {
    fn len(&self) -> usize {
        self.len
    }

    fn name(&self) -> &str {
        "position-gap"
    }

    fn distance(&self, i: usize, j: usize) -> Result<f32, DistanceError> {
        for index in [i, j] {
            if index >= self.len {
                return Err(DistanceError::OutOfBounds {
                    index,
                    len: self.len,
                });
            }
        }
        Ok(i.abs_diff(j) as f32)
    }
}

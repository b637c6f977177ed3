//! Stratified dataset partitioning.
//!
//! Both entry points preserve class proportions by drawing nodes uniformly
//! at random against a per-label quota. Consumed nodes are tracked in a mask
//! local to each call, so the source subgraph is only ever borrowed
//! immutably.

use rand::{Rng, SeedableRng, rngs::SmallRng};
use tracing::{debug, instrument};

use crate::{
    Result,
    error::{SubgraphError, try_vec_with_capacity},
};

use super::Subgraph;

/// Draws stratified partitions of a [`Subgraph`].
///
/// The partitioner owns its random number generator and is seeded exactly
/// once, so two partitioners built from the same seed produce identical
/// partitions of identical inputs.
///
/// # Examples
/// ```
/// use opforest_core::{Partitioner, Subgraph};
///
/// let samples = (0..20).map(|i| (vec![i as f32], 1 + i % 2));
/// let graph = Subgraph::from_samples(1, samples)?;
///
/// let mut partitioner = Partitioner::from_seed(7);
/// let (train, test) = partitioner.split(&graph, 0.5)?;
/// assert_eq!(train.node_count(), 10);
/// assert_eq!(test.node_count(), 10);
///
/// let folds = partitioner.k_fold(&graph, 5)?;
/// assert!(folds.iter().all(|fold| fold.node_count() == 4));
/// # Ok::<(), opforest_core::SubgraphError>(())
/// ```
#[derive(Clone, Debug)]
pub struct Partitioner {
    rng: SmallRng,
}

/// Counters accumulated while drawing nodes at random.
#[derive(Clone, Copy, Debug, Default)]
struct DrawStats {
    draws: u64,
    rejected: u64,
}

impl DrawStats {
    fn absorb(&mut self, other: Self) {
        self.draws += other.draws;
        self.rejected += other.rejected;
    }

    fn report(self, operation: &'static str) {
        debug!(
            operation,
            draws = self.draws,
            rejected = self.rejected,
            "partition draws complete"
        );
        self.record_metrics();
    }

    #[cfg(feature = "metrics")]
    fn record_metrics(self) {
        metrics::counter!("opforest_partition_draws_total").increment(self.draws);
        metrics::counter!("opforest_partition_rejected_draws_total").increment(self.rejected);
    }

    #[cfg(not(feature = "metrics"))]
    fn record_metrics(self) {}
}

impl Partitioner {
    /// Creates a partitioner whose draws are fully determined by `seed`.
    #[must_use]
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Creates a partitioner seeded from operating system entropy.
    #[must_use]
    pub fn from_entropy() -> Self {
        Self {
            rng: SmallRng::from_entropy(),
        }
    }

    /// Splits `graph` into two subgraphs, the first holding roughly `perc` of
    /// every class.
    ///
    /// For each label present the first partition receives
    /// `max(1, floor(perc * count))` nodes, chosen uniformly at random and
    /// stored in draw order. Every remaining node goes to the second
    /// partition in original order. Output nodes carry only position,
    /// features and true label.
    ///
    /// # Errors
    /// Returns [`SubgraphError::InvalidPercentage`] unless `perc` is finite
    /// and in `(0, 1]`, [`SubgraphError::MissingFeatures`] or
    /// [`SubgraphError::FeatureLengthMismatch`] for malformed nodes,
    /// [`SubgraphError::LabelOutOfRange`] when a label exceeds `label_n`,
    /// and [`SubgraphError::OutOfMemory`] when allocation fails.
    #[instrument(
        name = "partition.split",
        err,
        skip(self, graph),
        fields(nodes = graph.node_count(), labels = graph.label_n()),
    )]
    pub fn split(&mut self, graph: &Subgraph, perc: f32) -> Result<(Subgraph, Subgraph)> {
        if !(perc.is_finite() && perc > 0.0 && perc <= 1.0) {
            return Err(SubgraphError::InvalidPercentage { perc });
        }
        let counts = validated_label_counts(graph)?;
        let mut quotas = try_vec_with_capacity(counts.len())?;
        quotas.extend(counts.iter().map(|&count| split_quota(count, perc)));

        let mut consumed = consumed_mask(graph.node_count())?;
        let (first, stats) = self.draw(graph, &mut quotas, &mut consumed)?;
        let rest = unconsumed(&consumed)?;
        stats.report("split");

        Ok((graph.partition_of(&first)?, graph.partition_of(&rest)?))
    }

    /// Partitions `graph` into `folds` stratified subgraphs for
    /// cross-validation.
    ///
    /// Each label contributes `quota = max(1, floor(count / folds))` nodes to
    /// every fold. The first `folds - 1` folds are drawn at random without
    /// replacement; the last fold takes every node left over, which is
    /// `quota + (count - folds * quota)` per label, in ascending index order.
    /// The folds are disjoint and together hold every node of `graph`.
    ///
    /// # Errors
    /// Returns [`SubgraphError::InvalidFoldCount`] when `folds` is zero,
    /// [`SubgraphError::InsufficientSamples`] when a present label has fewer
    /// than `folds` nodes, and the validation and allocation errors described
    /// on [`Partitioner::split`].
    #[instrument(
        name = "partition.k_fold",
        err,
        skip(self, graph),
        fields(nodes = graph.node_count(), labels = graph.label_n()),
    )]
    pub fn k_fold(&mut self, graph: &Subgraph, folds: usize) -> Result<Vec<Subgraph>> {
        if folds == 0 {
            return Err(SubgraphError::InvalidFoldCount { folds });
        }
        let counts = validated_label_counts(graph)?;
        if let Some((label, &available)) = counts
            .iter()
            .enumerate()
            .find(|&(_, &count)| count > 0 && count < folds)
        {
            return Err(SubgraphError::InsufficientSamples {
                label,
                available,
                folds,
            });
        }

        let mut per_fold = try_vec_with_capacity(counts.len())?;
        per_fold.extend(counts.iter().map(|&count| fold_quota(count, folds)));

        let mut consumed = consumed_mask(graph.node_count())?;
        let mut out = try_vec_with_capacity(folds)?;
        let mut stats = DrawStats::default();
        for _ in 1..folds {
            let mut quotas = per_fold.clone();
            let (indices, fold_stats) = self.draw(graph, &mut quotas, &mut consumed)?;
            stats.absorb(fold_stats);
            out.push(graph.partition_of(&indices)?);
        }
        out.push(graph.partition_of(&unconsumed(&consumed)?)?);
        stats.report("k_fold");

        Ok(out)
    }

    /// Draws unconsumed nodes uniformly at random until every label quota is
    /// exhausted, returning the accepted indices in draw order.
    fn draw(
        &mut self,
        graph: &Subgraph,
        quotas: &mut [usize],
        consumed: &mut [bool],
    ) -> Result<(Vec<usize>, DrawStats)> {
        let target: usize = quotas.iter().sum();
        let mut picked = try_vec_with_capacity(target)?;
        let mut stats = DrawStats::default();
        let nodes = graph.nodes();
        while picked.len() < target {
            let index = self.rng.gen_range(0..nodes.len());
            stats.draws += 1;
            let label = nodes.get(index).map(crate::Node::true_label);
            let slot = consumed.get_mut(index);
            let quota = label.and_then(|label| quotas.get_mut(label));
            match (slot, quota) {
                (Some(slot), Some(quota)) if !*slot && *quota > 0 => {
                    *slot = true;
                    *quota -= 1;
                    picked.push(index);
                }
                _ => stats.rejected += 1,
            }
        }
        Ok((picked, stats))
    }
}

fn validated_label_counts(graph: &Subgraph) -> Result<Vec<usize>> {
    graph.validate_features()?;
    graph.label_counts()
}

fn split_quota(count: usize, perc: f32) -> usize {
    if count == 0 {
        return 0;
    }
    // `perc` lies in (0, 1], so the floor never exceeds `count`.
    ((perc * count as f32).floor() as usize).clamp(1, count)
}

fn fold_quota(count: usize, folds: usize) -> usize {
    if count == 0 { 0 } else { (count / folds).max(1) }
}

fn consumed_mask(len: usize) -> Result<Vec<bool>> {
    let mut mask = try_vec_with_capacity(len)?;
    mask.resize(len, false);
    Ok(mask)
}

fn unconsumed(consumed: &[bool]) -> Result<Vec<usize>> {
    let remaining = consumed.iter().filter(|&&taken| !taken).count();
    let mut indices = try_vec_with_capacity(remaining)?;
    indices.extend(
        consumed
            .iter()
            .enumerate()
            .filter_map(|(index, &taken)| (!taken).then_some(index)),
    );
    Ok(indices)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use proptest::prelude::*;
    use rstest::rstest;

    use super::*;
    use crate::test_utils::{ClassShape, labelled_graph, suite_proptest_config};

    fn positions(graph: &Subgraph) -> Vec<usize> {
        graph.nodes().iter().map(crate::Node::position).collect()
    }

    fn per_label(graph: &Subgraph) -> BTreeMap<usize, usize> {
        let mut tally = BTreeMap::new();
        for node in graph.nodes() {
            *tally.entry(node.true_label()).or_default() += 1;
        }
        tally
    }

    #[rstest]
    #[case(10, 0.5, 5)]
    #[case(10, 0.25, 2)]
    #[case(3, 0.1, 1)]
    #[case(7, 1.0, 7)]
    fn split_quota_floors_with_a_floor_of_one(
        #[case] count: usize,
        #[case] perc: f32,
        #[case] expected: usize,
    ) {
        assert_eq!(split_quota(count, perc), expected);
    }

    #[rstest]
    #[case(10, 5, 2)]
    #[case(11, 5, 2)]
    #[case(4, 4, 1)]
    #[case(0, 3, 0)]
    fn fold_quota_divides_per_label(
        #[case] count: usize,
        #[case] folds: usize,
        #[case] expected: usize,
    ) {
        assert_eq!(fold_quota(count, folds), expected);
    }

    #[test]
    fn unconsumed_lists_remaining_indices_in_order() {
        let indices = unconsumed(&[true, false, false, true, false]).expect("tiny mask");
        assert_eq!(indices, [1, 2, 4]);
    }

    #[test]
    fn split_of_empty_graph_yields_two_empty_graphs() {
        let graph = Subgraph::new(0).expect("empty graph");
        let (first, second) = Partitioner::from_seed(1)
            .split(&graph, 0.5)
            .expect("empty split succeeds");
        assert!(first.is_empty());
        assert!(second.is_empty());
    }

    #[test]
    fn k_fold_rejects_labels_smaller_than_fold_count() {
        let graph = labelled_graph(&[6, 2]);
        let err = Partitioner::from_seed(3)
            .k_fold(&graph, 3)
            .expect_err("label 2 cannot fill three folds");
        assert_eq!(
            err,
            SubgraphError::InsufficientSamples {
                label: 2,
                available: 2,
                folds: 3,
            }
        );
    }

    #[test]
    fn last_fold_collects_remainders_in_ascending_order() {
        let graph = labelled_graph(&[7, 5]);
        let folds = Partitioner::from_seed(11)
            .k_fold(&graph, 2)
            .expect("both labels can fill two folds");
        let last = folds.last().expect("two folds");
        let order = positions(last);
        assert!(order.windows(2).all(|pair| pair[0] < pair[1]));
        assert_eq!(per_label(last), BTreeMap::from([(1, 4), (2, 3)]));
    }

    proptest! {
        #![proptest_config(suite_proptest_config(64))]

        #[test]
        fn split_partitions_every_node_once(
            shape in any::<ClassShape>(),
            classes in 1_usize..5,
            base in 1_usize..12,
            perc in 0.05_f32..=1.0,
            seed in any::<u64>(),
        ) {
            let sizes = shape.class_sizes(classes, base);
            let graph = labelled_graph(&sizes);
            let (first, second) = Partitioner::from_seed(seed)
                .split(&graph, perc)
                .expect("valid split");

            let mut seen = positions(&first);
            seen.extend(positions(&second));
            seen.sort_unstable();
            prop_assert_eq!(seen, (0..graph.node_count()).collect::<Vec<_>>());

            let first_counts = per_label(&first);
            for (class, &size) in sizes.iter().enumerate() {
                let expected = split_quota(size, perc);
                prop_assert_eq!(first_counts.get(&(class + 1)).copied().unwrap_or(0), expected);
            }
            prop_assert_eq!(first.label_n(), graph.label_n());
            prop_assert_eq!(second.feat_n(), graph.feat_n());
        }

        #[test]
        fn k_fold_is_a_stratified_cover(
            shape in any::<ClassShape>(),
            classes in 1_usize..4,
            folds in 1_usize..6,
            extra in 0_usize..8,
            seed in any::<u64>(),
        ) {
            let sizes = shape.class_sizes(classes, folds + extra);
            let graph = labelled_graph(&sizes);
            let out = Partitioner::from_seed(seed)
                .k_fold(&graph, folds)
                .expect("every label fills every fold");
            prop_assert_eq!(out.len(), folds);

            let mut seen: Vec<usize> = out.iter().flat_map(positions).collect();
            seen.sort_unstable();
            prop_assert_eq!(seen, (0..graph.node_count()).collect::<Vec<_>>());

            for fold in out.iter().take(folds - 1) {
                let counts = per_label(fold);
                for (class, &size) in sizes.iter().enumerate() {
                    prop_assert_eq!(
                        counts.get(&(class + 1)).copied().unwrap_or(0),
                        fold_quota(size, folds)
                    );
                }
            }
        }

        #[test]
        fn equal_seeds_draw_equal_partitions(seed in any::<u64>()) {
            let graph = labelled_graph(&[9, 6, 4]);
            let left = Partitioner::from_seed(seed).split(&graph, 0.3).expect("valid split");
            let right = Partitioner::from_seed(seed).split(&graph, 0.3).expect("valid split");
            prop_assert_eq!(positions(&left.0), positions(&right.0));
            prop_assert_eq!(positions(&left.1), positions(&right.1));
        }
    }
}

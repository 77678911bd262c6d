//! Seed classification and cluster-id propagation.
//!
//! Runs in two passes over the completed follower graph. Classification
//! promotes qualifying points to seeds (detaching their follower link) and
//! tags isolated low-density points as outliers. Propagation then resolves
//! every remaining point's chain: chains ending at a seed inherit its
//! cluster id, chains ending at an outlier keep the sentinel.

use crate::{
    ClusterLabel,
    error::TesseraError,
    followers::FollowerGraph,
};

/// Role assigned to each point by the classification pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PointRole {
    /// Local density maximum above the threshold; roots a cluster.
    Seed,
    /// Isolated low-density point; keeps the sentinel label.
    Outlier,
    /// Inherits the label at the end of its follower chain.
    Follower,
}

/// Output of the classification pass.
#[derive(Debug, Clone)]
pub(crate) struct Classification {
    roles: Vec<PointRole>,
    /// Cluster id per point; populated for seeds only.
    seed_ids: Vec<Option<u32>>,
    seed_count: usize,
}

impl Classification {
    #[must_use]
    pub(crate) fn seed_count(&self) -> usize {
        self.seed_count
    }

    #[must_use]
    pub(crate) fn role(&self, index: usize) -> PointRole {
        self.roles[index]
    }
}

/// Classifies every point as seed, outlier, or follower.
///
/// A point is promoted to seed when its density reaches the threshold and
/// its follower link is longer than the seed promotion distance (a missing
/// link counts as infinitely long). Seeds take fresh cluster ids in
/// ascending point order, which keeps reruns identical; canonicalization
/// absorbs the numbering when comparing across runs.
pub(crate) fn classify(
    graph: &mut FollowerGraph,
    density: &[f32],
    density_threshold: f32,
    seed_distance: f32,
) -> Classification {
    let n_points = graph.len();
    let mut roles = Vec::with_capacity(n_points);
    let mut seed_ids = vec![None; n_points];
    let mut seed_count = 0u32;

    for index in 0..n_points {
        let link = graph.link(index);
        let is_seed = density[index] >= density_threshold && link.distance > seed_distance;
        if is_seed {
            graph.detach(index);
            roles.push(PointRole::Seed);
            seed_ids[index] = Some(seed_count);
            seed_count += 1;
        } else if link.target.is_none() {
            roles.push(PointRole::Outlier);
        } else {
            roles.push(PointRole::Follower);
        }
    }

    Classification {
        roles,
        seed_ids,
        seed_count: seed_count as usize,
    }
}

/// Resolves one point's chain to its terminal label.
///
/// Follower edges ascend in `(density, index)` order so chains cannot
/// revisit a point; a chain longer than the point count is therefore a
/// logic defect and aborts the run.
fn resolve_chain(
    index: usize,
    graph: &FollowerGraph,
    classification: &Classification,
) -> Result<ClusterLabel, TesseraError> {
    let limit = graph.len();
    let mut current = index;
    let mut steps = 0usize;

    while let Some(target) = graph.link(current).target {
        current = target as usize;
        steps += 1;
        if steps > limit {
            return Err(TesseraError::FollowerCycle {
                point: index,
                limit,
            });
        }
    }

    Ok(match classification.seed_ids[current] {
        Some(id) => ClusterLabel::Cluster(id),
        None => ClusterLabel::Outlier,
    })
}

/// Propagates labels on the calling thread.
pub(crate) fn propagate_serial(
    graph: &FollowerGraph,
    classification: &Classification,
) -> Result<Vec<ClusterLabel>, TesseraError> {
    (0..graph.len())
        .map(|index| resolve_chain(index, graph, classification))
        .collect()
}

/// Propagates labels across the rayon pool.
///
/// The graph and classification are read-only by this point, so per-point
/// resolution needs no synchronization.
#[cfg(feature = "cpu")]
pub(crate) fn propagate_parallel(
    graph: &FollowerGraph,
    classification: &Classification,
) -> Result<Vec<ClusterLabel>, TesseraError> {
    use rayon::prelude::*;

    (0..graph.len())
        .into_par_iter()
        .map(|index| resolve_chain(index, graph, classification))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::followers::{FollowerGraph, FollowerLink};

    fn link(target: Option<u32>, distance: f32) -> FollowerLink {
        FollowerLink { target, distance }
    }

    fn graph(links: Vec<FollowerLink>) -> FollowerGraph {
        FollowerGraph::new(links)
    }

    #[test]
    fn dense_local_maxima_become_seeds() {
        let mut graph = graph(vec![
            link(None, f32::INFINITY),
            link(Some(0), 1.0),
        ]);
        let classification = classify(&mut graph, &[5.0, 3.0], 2.0, 2.0);

        assert_eq!(classification.role(0), PointRole::Seed);
        assert_eq!(classification.role(1), PointRole::Follower);
        assert_eq!(classification.seed_count(), 1);
    }

    #[test]
    fn sparse_isolated_points_become_outliers() {
        let mut graph = graph(vec![link(None, f32::INFINITY)]);
        let classification = classify(&mut graph, &[0.5], 2.0, 2.0);
        assert_eq!(classification.role(0), PointRole::Outlier);
        assert_eq!(classification.seed_count(), 0);
    }

    #[test]
    fn distant_links_promote_dense_points_to_seeds() {
        // Point 1 has a follower target, but it is farther than the seed
        // promotion distance, so the point roots its own cluster.
        let mut graph = graph(vec![
            link(None, f32::INFINITY),
            link(Some(0), 10.0),
        ]);
        let classification = classify(&mut graph, &[5.0, 4.0], 2.0, 3.0);

        assert_eq!(classification.role(1), PointRole::Seed);
        assert_eq!(graph.link(1).target, None, "seed link must be detached");
        assert_eq!(classification.seed_count(), 2);
    }

    #[test]
    fn chains_inherit_the_terminal_seed_label() {
        let mut graph = graph(vec![
            link(None, f32::INFINITY),
            link(Some(0), 1.0),
            link(Some(1), 1.0),
        ]);
        let classification = classify(&mut graph, &[5.0, 4.0, 3.0], 2.0, 2.0);
        let labels =
            propagate_serial(&graph, &classification).expect("propagation must succeed");

        assert_eq!(
            labels,
            vec![
                ClusterLabel::Cluster(0),
                ClusterLabel::Cluster(0),
                ClusterLabel::Cluster(0),
            ]
        );
    }

    #[test]
    fn chains_ending_at_an_outlier_keep_the_sentinel() {
        // Point 0 is a low-density local maximum: an outlier. Point 1
        // follows it, so its chain never reaches a seed.
        let mut graph = graph(vec![
            link(None, f32::INFINITY),
            link(Some(0), 1.0),
        ]);
        let classification = classify(&mut graph, &[1.0, 0.5], 2.0, 2.0);
        let labels =
            propagate_serial(&graph, &classification).expect("propagation must succeed");

        assert_eq!(labels, vec![ClusterLabel::Outlier, ClusterLabel::Outlier]);
    }

    #[test]
    fn seed_ids_follow_ascending_point_order() {
        let mut graph = graph(vec![
            link(None, f32::INFINITY),
            link(None, f32::INFINITY),
            link(Some(0), 1.0),
        ]);
        let classification = classify(&mut graph, &[5.0, 6.0, 3.0], 2.0, 2.0);
        let labels =
            propagate_serial(&graph, &classification).expect("propagation must succeed");

        assert_eq!(
            labels,
            vec![
                ClusterLabel::Cluster(0),
                ClusterLabel::Cluster(1),
                ClusterLabel::Cluster(0),
            ]
        );
    }

    #[test]
    fn cyclic_links_are_rejected() {
        // Hand-built defective graph: 0 -> 1 -> 0. Cannot arise from the
        // follower builder, which is exactly why it must abort loudly.
        let mut graph = graph(vec![link(Some(1), 1.0), link(Some(0), 1.0)]);
        let classification = classify(&mut graph, &[1.0, 1.0], 5.0, 5.0);
        let err = propagate_serial(&graph, &classification)
            .expect_err("a cycle must be rejected");
        assert!(matches!(err, TesseraError::FollowerCycle { .. }));
    }
}

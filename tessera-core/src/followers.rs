//! Follower graph construction.
//!
//! Every point links to its nearest neighbour of higher density within the
//! follower search radius, or to nothing when it is a local density maximum
//! or isolated. Density ties qualify only toward the higher point index, so
//! edges always ascend in `(density, index)` order and the relation forms a
//! forest.

use crate::{PointCloud, metric, tiles::Tiles};

/// One point's link toward higher density.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct FollowerLink {
    /// Nearest higher-density neighbour, or `None` for local maxima and
    /// isolated points.
    pub(crate) target: Option<u32>,
    /// Distance to the target; infinity when there is none.
    pub(crate) distance: f32,
}

impl FollowerLink {
    const NONE: Self = Self {
        target: None,
        distance: f32::INFINITY,
    };
}

/// The density-ascending forest over all points.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct FollowerGraph {
    links: Vec<FollowerLink>,
}

impl FollowerGraph {
    pub(crate) fn new(links: Vec<FollowerLink>) -> Self {
        Self { links }
    }

    #[must_use]
    pub(crate) fn link(&self, index: usize) -> FollowerLink {
        self.links[index]
    }

    #[must_use]
    pub(crate) fn len(&self) -> usize {
        self.links.len()
    }

    /// Clears the link of a point promoted to seed.
    pub(crate) fn detach(&mut self, index: usize) {
        self.links[index] = FollowerLink::NONE;
    }
}

/// Finds the follower link for a single point.
///
/// A neighbour qualifies when its density is strictly higher, or equal with
/// positive density and a higher point index. Among qualifiers the link
/// minimises `(distance, index)`, which makes the choice independent of
/// enumeration order.
fn follower_at(
    index: usize,
    cloud: &PointCloud,
    tiles: &Tiles,
    density: &[f32],
    follower_distance: f32,
) -> FollowerLink {
    let point = cloud.point(index);
    let periodic = tiles.grid().periodic();
    let rho = density[index];

    let mut best = FollowerLink::NONE;
    for bin in tiles.grid().search_bins(point, follower_distance) {
        for &neighbour in tiles.points_in(bin) {
            let candidate = neighbour as usize;
            let rho_other = density[candidate];
            let qualifies = rho_other > rho
                || (rho_other == rho && rho_other > 0.0 && candidate > index);
            if !qualifies {
                continue;
            }

            let separation = metric::distance(point, cloud.point(candidate), periodic);
            if separation > follower_distance {
                continue;
            }

            let closer = separation < best.distance
                || (separation == best.distance
                    && best.target.is_some_and(|current| neighbour < current));
            if closer {
                best = FollowerLink {
                    target: Some(neighbour),
                    distance: separation,
                };
            }
        }
    }
    best
}

/// Builds the follower graph on the calling thread.
pub(crate) fn build_serial(
    cloud: &PointCloud,
    tiles: &Tiles,
    density: &[f32],
    follower_distance: f32,
) -> FollowerGraph {
    let links = (0..cloud.len())
        .map(|index| follower_at(index, cloud, tiles, density, follower_distance))
        .collect();
    FollowerGraph::new(links)
}

/// Builds the follower graph across the rayon pool.
#[cfg(feature = "cpu")]
pub(crate) fn build_parallel(
    cloud: &PointCloud,
    tiles: &Tiles,
    density: &[f32],
    follower_distance: f32,
) -> FollowerGraph {
    use rayon::prelude::*;

    let links = (0..cloud.len())
        .into_par_iter()
        .map(|index| follower_at(index, cloud, tiles, density, follower_distance))
        .collect();
    FollowerGraph::new(links)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tiles::TileGrid;
    use std::num::NonZeroUsize;

    fn line_cloud(xs: &[f32]) -> PointCloud {
        let dims = NonZeroUsize::new(1).expect("non-zero");
        PointCloud::try_from_flat("line", dims, xs.to_vec(), None).expect("fixture cloud is valid")
    }

    fn tiles_for(cloud: &PointCloud) -> Tiles {
        let grid = TileGrid::from_cloud(cloud, 2, vec![None]);
        Tiles::build_serial(cloud, grid)
    }

    #[test]
    fn points_link_to_the_nearest_higher_density_neighbour() {
        let cloud = line_cloud(&[0.0, 1.0, 2.0]);
        let tiles = tiles_for(&cloud);
        let density = [1.0, 2.0, 3.0];
        let graph = build_serial(&cloud, &tiles, &density, 5.0);

        assert_eq!(graph.link(0).target, Some(1));
        assert_eq!(graph.link(1).target, Some(2));
        assert_eq!(graph.link(2).target, None);
        assert!(graph.link(2).distance.is_infinite());
    }

    #[test]
    fn density_ties_link_toward_the_higher_index() {
        let cloud = line_cloud(&[0.0, 1.0]);
        let tiles = tiles_for(&cloud);
        let density = [2.0, 2.0];
        let graph = build_serial(&cloud, &tiles, &density, 5.0);

        // Equal densities: the lower index follows the higher, never both.
        assert_eq!(graph.link(0).target, Some(1));
        assert_eq!(graph.link(1).target, None);
    }

    #[test]
    fn zero_density_ties_never_link() {
        let cloud = line_cloud(&[0.0, 1.0]);
        let tiles = tiles_for(&cloud);
        let density = [0.0, 0.0];
        let graph = build_serial(&cloud, &tiles, &density, 5.0);
        assert_eq!(graph.link(0).target, None);
        assert_eq!(graph.link(1).target, None);
    }

    #[test]
    fn neighbours_beyond_the_search_radius_are_ignored() {
        let cloud = line_cloud(&[0.0, 10.0]);
        let tiles = tiles_for(&cloud);
        let density = [1.0, 5.0];
        let graph = build_serial(&cloud, &tiles, &density, 2.0);
        assert_eq!(graph.link(0).target, None);
    }

    #[test]
    fn equidistant_candidates_resolve_to_the_lower_index() {
        // Point 1 sits exactly between two denser neighbours.
        let cloud = line_cloud(&[0.0, 1.0, 2.0]);
        let tiles = tiles_for(&cloud);
        let density = [5.0, 1.0, 5.0];
        let graph = build_serial(&cloud, &tiles, &density, 5.0);
        assert_eq!(graph.link(1).target, Some(0));
    }

    #[test]
    fn edges_ascend_in_density_and_index() {
        let xs: Vec<f32> = (0..50).map(|i| (i as f32 * 0.9).cos() * 20.0).collect();
        let cloud = line_cloud(&xs);
        let tiles = tiles_for(&cloud);
        let density: Vec<f32> = (0..50).map(|i| ((i * 7) % 13) as f32).collect();
        let graph = build_serial(&cloud, &tiles, &density, 10.0);

        for index in 0..graph.len() {
            if let Some(target) = graph.link(index).target {
                let target = target as usize;
                let ascends = density[target] > density[index]
                    || (density[target] == density[index] && target > index);
                assert!(ascends, "edge {index} -> {target} does not ascend");
            }
        }
    }

    #[cfg(feature = "cpu")]
    #[test]
    fn parallel_graph_matches_serial_graph() {
        let xs: Vec<f32> = (0..200).map(|i| (i as f32 * 0.11).sin() * 40.0).collect();
        let cloud = line_cloud(&xs);
        let tiles = tiles_for(&cloud);
        let density: Vec<f32> = (0..200).map(|i| ((i * 31) % 17) as f32 + 0.5).collect();
        let serial = build_serial(&cloud, &tiles, &density, 8.0);
        let parallel = build_parallel(&cloud, &tiles, &density, 8.0);
        assert_eq!(serial, parallel);
    }
}

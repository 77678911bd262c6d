//! Uniform tile grid bounding neighbour searches.
//!
//! Points are binned into an N-dimensional grid sized from the run's
//! coordinate extremes so that tiles hold `points_per_tile` points on
//! average. Later stages enumerate only the tiles overlapping a search
//! radius instead of scanning the whole cloud.
//!
//! The grid is built once per run and is read-only afterwards. The serial
//! and parallel builds produce byte-identical structures: bins always list
//! their points in ascending input order.

use crate::{PointCloud, metric::PeriodicSpan};

/// Grid geometry: extents, tile sizes, and bin arithmetic.
#[derive(Debug, Clone)]
pub(crate) struct TileGrid {
    dimensions: usize,
    n_per_dim: usize,
    mins: Vec<f32>,
    tile_sizes: Vec<f32>,
    periodic: Vec<Option<PeriodicSpan>>,
}

impl TileGrid {
    /// Derives the grid for `cloud`.
    ///
    /// The tile count targets an average occupancy of `points_per_tile`:
    /// `n_per_dim = ceil(ceil(n / points_per_tile)^(1/dims))`, so the total
    /// grid is `n_per_dim^dims` tiles. Dimensions whose coordinates are all
    /// equal collapse to a single bin.
    pub(crate) fn from_cloud(
        cloud: &PointCloud,
        points_per_tile: usize,
        periodic: Vec<Option<PeriodicSpan>>,
    ) -> Self {
        let dimensions = cloud.dimensions().get();
        let n_points = cloud.len();

        let n_tiles = n_points.div_ceil(points_per_tile).max(1);
        let n_per_dim = ((n_tiles as f64).powf(1.0 / dimensions as f64)).ceil() as usize;
        let n_per_dim = n_per_dim.max(1);

        let mut mins = vec![f32::INFINITY; dimensions];
        let mut maxs = vec![f32::NEG_INFINITY; dimensions];
        for index in 0..n_points {
            for (dim, &value) in cloud.point(index).iter().enumerate() {
                mins[dim] = mins[dim].min(value);
                maxs[dim] = maxs[dim].max(value);
            }
        }

        let tile_sizes = mins
            .iter()
            .zip(&maxs)
            .map(|(&min, &max)| (max - min) / n_per_dim as f32)
            .collect();

        Self {
            dimensions,
            n_per_dim,
            mins,
            tile_sizes,
            periodic,
        }
    }

    /// Returns the total number of tiles in the grid.
    #[must_use]
    pub(crate) fn tile_count(&self) -> usize {
        self.n_per_dim.pow(self.dimensions as u32)
    }

    /// Returns the periodic spans the grid was built with, one per dimension.
    #[must_use]
    pub(crate) fn periodic(&self) -> &[Option<PeriodicSpan>] {
        &self.periodic
    }

    /// Maps one coordinate to its bin along `dim`.
    ///
    /// Floor division keeps boundary points on the lower tile; the clamp
    /// folds the maximum coordinate into the last bin so no point escapes
    /// the grid.
    fn bin_along(&self, dim: usize, value: f32) -> usize {
        let size = self.tile_sizes[dim];
        if size <= 0.0 {
            return 0;
        }
        let raw = ((value - self.mins[dim]) / size).floor();
        (raw.max(0.0) as usize).min(self.n_per_dim - 1)
    }

    /// Maps a coordinate row to its global (row-major) bin index.
    pub(crate) fn bin_of(&self, point: &[f32]) -> usize {
        let mut index = 0usize;
        for (dim, &value) in point.iter().enumerate() {
            index = index * self.n_per_dim + self.bin_along(dim, value);
        }
        index
    }

    /// Lists the bins along `dim` overlapping `[center - radius, center + radius]`.
    ///
    /// Non-periodic dimensions clamp the range to the grid; periodic
    /// dimensions wrap bin indices around it. The result is sorted and
    /// deduplicated so enumeration order is deterministic.
    fn bins_along(&self, dim: usize, center: f32, radius: f32) -> Vec<usize> {
        let size = self.tile_sizes[dim];
        if size <= 0.0 {
            return vec![0];
        }

        let lo = ((center - radius - self.mins[dim]) / size).floor() as i64;
        let hi = ((center + radius - self.mins[dim]) / size).floor() as i64;
        let last = self.n_per_dim as i64 - 1;

        let mut bins: Vec<usize> = if self.periodic[dim].is_some() {
            (lo..=hi)
                .map(|bin| bin.rem_euclid(self.n_per_dim as i64) as usize)
                .collect()
        } else {
            (lo.max(0)..=hi.min(last)).map(|bin| bin as usize).collect()
        };
        bins.sort_unstable();
        bins.dedup();
        bins
    }

    /// Enumerates the global bin indices of every tile overlapping the
    /// search box around `center`, in ascending index order.
    pub(crate) fn search_bins(&self, center: &[f32], radius: f32) -> Vec<usize> {
        let per_dim: Vec<Vec<usize>> = (0..self.dimensions)
            .map(|dim| self.bins_along(dim, center[dim], radius))
            .collect();
        if per_dim.iter().any(Vec::is_empty) {
            // The box lies entirely outside the grid along some dimension.
            return Vec::new();
        }

        let mut result = Vec::with_capacity(per_dim.iter().map(Vec::len).product());
        let mut cursor = vec![0usize; self.dimensions];
        loop {
            let mut index = 0usize;
            for (dim, bins) in per_dim.iter().enumerate() {
                index = index * self.n_per_dim + bins[cursor[dim]];
            }
            result.push(index);

            // Odometer advance over the per-dimension bin lists.
            let mut dim = self.dimensions;
            loop {
                if dim == 0 {
                    result.sort_unstable();
                    return result;
                }
                dim -= 1;
                cursor[dim] += 1;
                if cursor[dim] < per_dim[dim].len() {
                    break;
                }
                cursor[dim] = 0;
            }
        }
    }
}

/// The built spatial index: grid geometry plus per-tile point lists.
#[derive(Debug, Clone)]
pub(crate) struct Tiles {
    grid: TileGrid,
    bins: Vec<Vec<u32>>,
}

impl Tiles {
    /// Returns the grid geometry.
    #[must_use]
    pub(crate) fn grid(&self) -> &TileGrid {
        &self.grid
    }

    /// Returns the point indices stored in `bin`.
    #[must_use]
    pub(crate) fn points_in(&self, bin: usize) -> &[u32] {
        &self.bins[bin]
    }

    /// Fills the grid by scanning points in input order.
    pub(crate) fn build_serial(cloud: &PointCloud, grid: TileGrid) -> Self {
        let mut bins = vec![Vec::new(); grid.tile_count()];
        for index in 0..cloud.len() {
            bins[grid.bin_of(cloud.point(index))].push(index as u32);
        }
        Self { grid, bins }
    }

    /// Fills the grid with synchronized parallel insertion.
    ///
    /// Each bin is re-sorted by point index afterwards so the structure is
    /// identical to [`Self::build_serial`] output.
    #[cfg(feature = "cpu")]
    pub(crate) fn build_parallel(cloud: &PointCloud, grid: TileGrid) -> Self {
        use dashmap::DashMap;
        use rayon::prelude::*;

        let filled: DashMap<usize, Vec<u32>> = DashMap::new();
        (0..cloud.len()).into_par_iter().for_each(|index| {
            filled
                .entry(grid.bin_of(cloud.point(index)))
                .or_default()
                .push(index as u32);
        });

        let mut bins = vec![Vec::new(); grid.tile_count()];
        for (bin, mut points) in filled {
            points.sort_unstable();
            bins[bin] = points;
        }
        Self { grid, bins }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::num::NonZeroUsize;

    fn cloud(rows: &[[f32; 2]]) -> PointCloud {
        let dims = NonZeroUsize::new(2).expect("non-zero");
        let flat = rows.iter().flatten().copied().collect();
        PointCloud::try_from_flat("tiles", dims, flat, None).expect("fixture cloud is valid")
    }

    fn grid_for(cloud: &PointCloud, points_per_tile: usize) -> TileGrid {
        TileGrid::from_cloud(cloud, points_per_tile, vec![None, None])
    }

    #[test]
    fn every_point_lands_in_exactly_one_bin() {
        let cloud = cloud(&[[0.0, 0.0], [1.0, 1.0], [9.0, 9.0], [10.0, 10.0]]);
        let tiles = Tiles::build_serial(&cloud, grid_for(&cloud, 1));
        let total: usize = (0..tiles.grid().tile_count())
            .map(|bin| tiles.points_in(bin).len())
            .sum();
        assert_eq!(total, cloud.len());
    }

    #[test]
    fn extreme_coordinates_stay_inside_the_grid() {
        let cloud = cloud(&[[0.0, 0.0], [10.0, 10.0]]);
        let grid = grid_for(&cloud, 1);
        let count = grid.tile_count();
        assert!(grid.bin_of(&[10.0, 10.0]) < count);
        assert!(grid.bin_of(&[0.0, 0.0]) < count);
    }

    #[test]
    fn degenerate_dimension_collapses_to_one_bin() {
        let cloud = cloud(&[[0.0, 5.0], [1.0, 5.0], [2.0, 5.0]]);
        let grid = grid_for(&cloud, 1);
        let tiles = Tiles::build_serial(&cloud, grid);
        let occupied = (0..tiles.grid().tile_count())
            .filter(|&bin| !tiles.points_in(bin).is_empty())
            .count();
        assert!(occupied >= 1);
        let total: usize = (0..tiles.grid().tile_count())
            .map(|bin| tiles.points_in(bin).len())
            .sum();
        assert_eq!(total, 3);
    }

    #[test]
    fn search_bins_cover_the_home_bin() {
        let cloud = cloud(&[[0.0, 0.0], [3.0, 3.0], [6.0, 6.0], [9.0, 9.0]]);
        let grid = grid_for(&cloud, 1);
        for index in 0..cloud.len() {
            let point = cloud.point(index);
            let home = grid.bin_of(point);
            let bins = grid.search_bins(point, 1.0);
            assert!(bins.contains(&home), "home bin missing for point {index}");
        }
    }

    #[test]
    fn search_bins_are_sorted_and_unique() {
        let cloud = cloud(&[[0.0, 0.0], [2.0, 2.0], [4.0, 4.0], [8.0, 8.0]]);
        let grid = grid_for(&cloud, 1);
        let bins = grid.search_bins(&[4.0, 4.0], 5.0);
        let mut sorted = bins.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(bins, sorted);
    }

    #[test]
    fn periodic_search_wraps_around_the_grid() {
        let dims = NonZeroUsize::new(1).expect("non-zero");
        let cloud = PointCloud::try_from_flat(
            "ring",
            dims,
            vec![0.5, 2.5, 4.5, 6.5, 8.5, 9.5],
            None,
        )
        .expect("fixture cloud is valid");
        let span = PeriodicSpan::new(0.0, 10.0);
        let grid = TileGrid::from_cloud(&cloud, 1, vec![Some(span)]);
        let first = grid.bin_of(&[0.5]);
        // A search just below the upper bound must wrap into the first bin.
        let bins = grid.search_bins(&[9.5], 1.5);
        assert!(bins.contains(&first));
    }

    #[cfg(feature = "cpu")]
    #[test]
    fn parallel_build_matches_serial_build() {
        let rows: Vec<[f32; 2]> = (0..64)
            .map(|i| [(i % 8) as f32 * 1.5, (i / 8) as f32 * 1.5])
            .collect();
        let cloud = cloud(&rows);
        let serial = Tiles::build_serial(&cloud, grid_for(&cloud, 4));
        let parallel = Tiles::build_parallel(&cloud, grid_for(&cloud, 4));
        for bin in 0..serial.grid().tile_count() {
            assert_eq!(serial.points_in(bin), parallel.points_in(bin), "bin {bin}");
        }
    }
}

//! Local density estimation.
//!
//! Each point's density is the kernel-weighted sum of the weights of its
//! neighbours within the critical radius, searched only through the tiles
//! overlapping that radius. The self-pair contributes weight one.
//!
//! Both drivers visit bins in ascending grid order and points in stored bin
//! order. The floating-point summation order, and therefore the result, is
//! bitwise identical across backends and reruns.

use crate::{DensityKernel, PointCloud, metric, tiles::Tiles};

/// Computes the density of a single point.
fn density_at(
    index: usize,
    cloud: &PointCloud,
    tiles: &Tiles,
    kernel: &DensityKernel,
    critical_distance: f32,
) -> f32 {
    let point = cloud.point(index);
    let periodic = tiles.grid().periodic();
    let mut rho = 0.0f32;
    for bin in tiles.grid().search_bins(point, critical_distance) {
        for &neighbour in tiles.points_in(bin) {
            let neighbour = neighbour as usize;
            let separation = metric::distance(point, cloud.point(neighbour), periodic);
            if separation <= critical_distance {
                rho += kernel.weigh(separation, index == neighbour)
                    * cloud.point_weight(neighbour);
            }
        }
    }
    rho
}

/// Computes every point's density on the calling thread.
pub(crate) fn compute_serial(
    cloud: &PointCloud,
    tiles: &Tiles,
    kernel: &DensityKernel,
    critical_distance: f32,
) -> Vec<f32> {
    (0..cloud.len())
        .map(|index| density_at(index, cloud, tiles, kernel, critical_distance))
        .collect()
}

/// Computes every point's density across the rayon pool.
#[cfg(feature = "cpu")]
pub(crate) fn compute_parallel(
    cloud: &PointCloud,
    tiles: &Tiles,
    kernel: &DensityKernel,
    critical_distance: f32,
) -> Vec<f32> {
    use rayon::prelude::*;

    (0..cloud.len())
        .into_par_iter()
        .map(|index| density_at(index, cloud, tiles, kernel, critical_distance))
        .collect()
}

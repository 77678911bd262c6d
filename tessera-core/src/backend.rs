//! Execution backends for the clustering pipeline.
//!
//! Spells out one capability interface (index, estimate density, build
//! followers, assign clusters) with one implementation per execution
//! schedule. Backends may only change how the work is scheduled, never the
//! follower graph or the labels it produces; the serial and parallel
//! implementations call the same per-point routines.
//!
//! The set of usable strategies is a static capability table derived from
//! compile-time features, not runtime reflection.

use crate::{
    ClusterLabel, DensityKernel, PointCloud,
    assign::{self, Classification},
    density,
    error::TesseraError,
    followers::{self, FollowerGraph},
    tiles::{TileGrid, Tiles},
};

/// Indicates how [`crate::Tessera`] selects a compute backend when
/// [`crate::Tessera::run`] is invoked.
///
/// `Auto` resolves deterministically: the parallel CPU backend when the
/// `cpu` feature is compiled in, the serial backend otherwise. GPU execution
/// is an enumerated strategy with no device backend in this build, so
/// requesting it fails with a backend-selection error that callers can
/// catch to fall back to a CPU strategy.
///
/// # Examples
/// ```
/// use tessera_core::ExecutionStrategy;
///
/// let strategy = ExecutionStrategy::Auto;
/// assert!(matches!(strategy, ExecutionStrategy::Auto));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionStrategy {
    /// Allow the library to select an appropriate backend automatically.
    Auto,
    /// Run every stage on the calling thread.
    Serial,
    /// Run the per-point stages across a rayon thread pool.
    Parallel,
    /// Prefer a GPU implementation if one is available.
    GpuPreferred,
}

/// Returns the strategies satisfiable in this build.
///
/// # Examples
/// ```
/// use tessera_core::{ExecutionStrategy, available_strategies};
///
/// assert!(available_strategies().contains(&ExecutionStrategy::Serial));
/// ```
#[must_use]
pub fn available_strategies() -> &'static [ExecutionStrategy] {
    #[cfg(feature = "cpu")]
    {
        &[
            ExecutionStrategy::Auto,
            ExecutionStrategy::Serial,
            ExecutionStrategy::Parallel,
        ]
    }
    #[cfg(not(feature = "cpu"))]
    {
        &[ExecutionStrategy::Auto, ExecutionStrategy::Serial]
    }
}

/// The capability set every execution backend provides.
///
/// Stage order is fixed by the pipeline driver; implementations schedule
/// the work within each stage.
pub(crate) trait ExecutionBackend {
    /// Partitions the cloud into the tile grid.
    fn index(&self, cloud: &PointCloud, grid: TileGrid) -> Tiles;

    /// Computes every point's local density.
    fn estimate_density(
        &self,
        cloud: &PointCloud,
        tiles: &Tiles,
        kernel: &DensityKernel,
        critical_distance: f32,
    ) -> Vec<f32>;

    /// Builds the density-ascending follower graph.
    fn build_followers(
        &self,
        cloud: &PointCloud,
        tiles: &Tiles,
        density: &[f32],
        follower_distance: f32,
    ) -> FollowerGraph;

    /// Propagates cluster ids along the follower forest.
    fn assign_clusters(
        &self,
        graph: &FollowerGraph,
        classification: &Classification,
    ) -> Result<Vec<ClusterLabel>, TesseraError>;
}

/// Single-threaded execution of every stage.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct SerialBackend;

impl ExecutionBackend for SerialBackend {
    fn index(&self, cloud: &PointCloud, grid: TileGrid) -> Tiles {
        Tiles::build_serial(cloud, grid)
    }

    fn estimate_density(
        &self,
        cloud: &PointCloud,
        tiles: &Tiles,
        kernel: &DensityKernel,
        critical_distance: f32,
    ) -> Vec<f32> {
        density::compute_serial(cloud, tiles, kernel, critical_distance)
    }

    fn build_followers(
        &self,
        cloud: &PointCloud,
        tiles: &Tiles,
        density: &[f32],
        follower_distance: f32,
    ) -> FollowerGraph {
        followers::build_serial(cloud, tiles, density, follower_distance)
    }

    fn assign_clusters(
        &self,
        graph: &FollowerGraph,
        classification: &Classification,
    ) -> Result<Vec<ClusterLabel>, TesseraError> {
        assign::propagate_serial(graph, classification)
    }
}

/// Rayon-parallel execution of the per-point stages.
#[cfg(feature = "cpu")]
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct ParallelBackend;

#[cfg(feature = "cpu")]
impl ExecutionBackend for ParallelBackend {
    fn index(&self, cloud: &PointCloud, grid: TileGrid) -> Tiles {
        Tiles::build_parallel(cloud, grid)
    }

    fn estimate_density(
        &self,
        cloud: &PointCloud,
        tiles: &Tiles,
        kernel: &DensityKernel,
        critical_distance: f32,
    ) -> Vec<f32> {
        density::compute_parallel(cloud, tiles, kernel, critical_distance)
    }

    fn build_followers(
        &self,
        cloud: &PointCloud,
        tiles: &Tiles,
        density: &[f32],
        follower_distance: f32,
    ) -> FollowerGraph {
        followers::build_parallel(cloud, tiles, density, follower_distance)
    }

    fn assign_clusters(
        &self,
        graph: &FollowerGraph,
        classification: &Classification,
    ) -> Result<Vec<ClusterLabel>, TesseraError> {
        assign::propagate_parallel(graph, classification)
    }
}

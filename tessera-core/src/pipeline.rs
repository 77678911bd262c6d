//! Stage orchestration for one clustering run.
//!
//! Drives the four backend capabilities in their fixed order (index,
//! density, followers, assignment) with a hard barrier between stages:
//! each stage's output is fully materialised before the next begins.
//! Classification sits between the follower and assignment stages; it is a
//! cheap sequential pass over the finished graph.

use tracing::{debug, instrument};

use crate::{
    DensityKernel, PointCloud,
    assign,
    backend::ExecutionBackend,
    error::Result,
    metric::PeriodicSpan,
    result::ClusteringResult,
    tiles::TileGrid,
};

/// Validated parameters for one run, with the periodic spans already
/// normalised to one entry per cloud dimension.
#[derive(Debug, Clone)]
pub(crate) struct PipelineParams {
    pub(crate) critical_distance: f32,
    pub(crate) density_threshold: f32,
    pub(crate) follower_distance: f32,
    pub(crate) seed_distance: f32,
    pub(crate) points_per_tile: usize,
    pub(crate) kernel: DensityKernel,
    pub(crate) periodic: Vec<Option<PeriodicSpan>>,
}

/// Executes the full pipeline on `backend`.
#[instrument(
    name = "core.pipeline",
    err,
    skip(backend, cloud, params),
    fields(
        points = cloud.len(),
        dimensions = cloud.dimensions().get(),
        critical_distance = params.critical_distance,
        density_threshold = params.density_threshold,
    ),
)]
pub(crate) fn run_pipeline<B: ExecutionBackend>(
    backend: &B,
    cloud: &PointCloud,
    params: &PipelineParams,
) -> Result<ClusteringResult> {
    let grid = TileGrid::from_cloud(cloud, params.points_per_tile, params.periodic.clone());
    let tiles = backend.index(cloud, grid);
    debug!(tiles = tiles.grid().tile_count(), "spatial index built");

    let density =
        backend.estimate_density(cloud, &tiles, &params.kernel, params.critical_distance);
    debug!("local densities estimated");

    let mut graph = backend.build_followers(cloud, &tiles, &density, params.follower_distance);
    debug!("follower graph built");

    let classification = assign::classify(
        &mut graph,
        &density,
        params.density_threshold,
        params.seed_distance,
    );
    debug!(seeds = classification.seed_count(), "points classified");

    let labels = backend.assign_clusters(&graph, &classification)?;
    let result = ClusteringResult::from_labels(labels);
    debug!(
        clusters = result.cluster_count(),
        outliers = result.outlier_count(),
        "labels assigned"
    );
    Ok(result)
}

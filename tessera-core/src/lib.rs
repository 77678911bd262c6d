//! Tessera core library.
//!
//! Tile-accelerated density-peak clustering: points are binned into a
//! uniform grid, local densities are estimated over bounded neighbour
//! searches, each point links to its nearest higher-density neighbour, and
//! cluster ids propagate from the density peaks down the resulting forest.
//! Serial and parallel CPU backends produce identical follower graphs and
//! labels; see [`ExecutionStrategy`] for how a backend is selected.

mod assign;
mod backend;
mod builder;
mod density;
mod error;
mod followers;
mod kernel;
mod metric;
mod pipeline;
mod pointcloud;
mod quality;
mod result;
mod tessera;
mod tiles;

pub use crate::{
    backend::{ExecutionStrategy, available_strategies},
    builder::TesseraBuilder,
    error::{PointCloudError, PointCloudErrorCode, Result, TesseraError, TesseraErrorCode},
    kernel::DensityKernel,
    metric::PeriodicSpan,
    pointcloud::PointCloud,
    quality::{QualityError, silhouette_score},
    result::{ClusterLabel, ClusteringResult, NonContiguousClusterLabels},
    tessera::Tessera,
};

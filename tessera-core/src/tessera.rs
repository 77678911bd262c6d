//! Core clustering orchestration for the tessera library.
//!
//! Provides the [`Tessera`] runtime entry point and the backend dispatch
//! that routes a run onto the selected execution strategy.

use std::sync::Arc;

use tracing::{instrument, warn};

use crate::{
    DensityKernel, PointCloud, Result,
    backend::{ExecutionStrategy, SerialBackend},
    error::TesseraError,
    metric::PeriodicSpan,
    pipeline::{self, PipelineParams},
    result::ClusteringResult,
};

/// Entry point for running the clustering pipeline.
///
/// # Examples
/// ```
/// use std::num::NonZeroUsize;
/// use tessera_core::{PointCloud, TesseraBuilder};
///
/// let dims = NonZeroUsize::new(1).expect("non-zero");
/// let cloud = PointCloud::try_from_flat(
///     "demo",
///     dims,
///     vec![0.0, 0.5, 1.0, 40.0, 40.5, 41.0],
///     None,
/// )?;
/// let tessera = TesseraBuilder::new(2.0, 1.5).build()?;
/// let result = tessera.run(&cloud)?;
/// assert_eq!(result.labels().len(), 6);
/// assert_eq!(result.cluster_count(), 2);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone)]
pub struct Tessera {
    critical_distance: f32,
    density_threshold: f32,
    follower_distance: f32,
    seed_distance: f32,
    points_per_tile: usize,
    kernel: DensityKernel,
    periodic_spans: Vec<Option<PeriodicSpan>>,
    execution_strategy: ExecutionStrategy,
}

impl Tessera {
    #[expect(
        clippy::too_many_arguments,
        reason = "crate-internal constructor mirroring the validated builder fields"
    )]
    pub(crate) fn new(
        critical_distance: f32,
        density_threshold: f32,
        follower_distance: f32,
        seed_distance: f32,
        points_per_tile: usize,
        kernel: DensityKernel,
        periodic_spans: Vec<Option<PeriodicSpan>>,
        execution_strategy: ExecutionStrategy,
    ) -> Self {
        Self {
            critical_distance,
            density_threshold,
            follower_distance,
            seed_distance,
            points_per_tile,
            kernel,
            periodic_spans,
            execution_strategy,
        }
    }

    /// Returns the critical density radius configured for this instance.
    #[must_use]
    pub fn critical_distance(&self) -> f32 {
        self.critical_distance
    }

    /// Returns the density threshold a seed must reach.
    #[must_use]
    pub fn density_threshold(&self) -> f32 {
        self.density_threshold
    }

    /// Returns the follower search radius.
    #[must_use]
    pub fn follower_distance(&self) -> f32 {
        self.follower_distance
    }

    /// Returns the seed promotion distance.
    #[must_use]
    pub fn seed_distance(&self) -> f32 {
        self.seed_distance
    }

    /// Returns the average tile occupancy used to size the spatial grid.
    #[must_use]
    pub fn points_per_tile(&self) -> usize {
        self.points_per_tile
    }

    /// Returns the density kernel in effect.
    #[must_use]
    pub fn kernel(&self) -> DensityKernel {
        self.kernel
    }

    /// Returns the execution strategy that will be used when running.
    ///
    /// # Examples
    /// ```
    /// use tessera_core::{ExecutionStrategy, TesseraBuilder};
    ///
    /// let tessera = TesseraBuilder::new(1.0, 1.0)
    ///     .with_execution_strategy(ExecutionStrategy::Serial)
    ///     .build()
    ///     .expect("builder must apply execution strategy");
    /// assert_eq!(tessera.execution_strategy(), ExecutionStrategy::Serial);
    /// ```
    #[must_use]
    pub fn execution_strategy(&self) -> ExecutionStrategy {
        self.execution_strategy
    }

    /// Executes the clustering pipeline against the provided [`PointCloud`].
    ///
    /// The returned result carries one label per input point in input order.
    ///
    /// # Errors
    /// Returns [`TesseraError::EmptyCloud`] when the cloud has no points,
    /// [`TesseraError::PeriodicSpanDimensions`] when periodic spans were
    /// declared for more dimensions than the cloud has, and
    /// [`TesseraError::BackendUnavailable`] when the requested strategy is
    /// not compiled into the current build.
    #[instrument(
        name = "core.run",
        err,
        skip(self, cloud),
        fields(
            cloud = %cloud.name(),
            points = cloud.len(),
            strategy = ?self.execution_strategy,
        ),
    )]
    pub fn run(&self, cloud: &PointCloud) -> Result<ClusteringResult> {
        if cloud.is_empty() {
            warn!(cloud = cloud.name(), "point cloud is empty, returning error");
            return Err(TesseraError::EmptyCloud {
                cloud: Arc::from(cloud.name()),
            });
        }

        let dimensions = cloud.dimensions().get();
        if self.periodic_spans.len() > dimensions {
            return Err(TesseraError::PeriodicSpanDimensions {
                cloud: Arc::from(cloud.name()),
                spans: self.periodic_spans.len(),
                dimensions,
            });
        }

        let params = self.pipeline_params(dimensions);
        match self.execution_strategy {
            #[cfg(feature = "cpu")]
            ExecutionStrategy::Auto | ExecutionStrategy::Parallel => {
                pipeline::run_pipeline(&crate::backend::ParallelBackend, cloud, &params)
            }
            #[cfg(not(feature = "cpu"))]
            ExecutionStrategy::Auto => pipeline::run_pipeline(&SerialBackend, cloud, &params),
            #[cfg(not(feature = "cpu"))]
            ExecutionStrategy::Parallel => Err(TesseraError::BackendUnavailable {
                requested: ExecutionStrategy::Parallel,
            }),
            ExecutionStrategy::Serial => {
                pipeline::run_pipeline(&SerialBackend, cloud, &params)
            }
            // No device backend ships in this build; the capability table
            // never lists GPU execution, so requesting it fails fast instead
            // of silently running a CPU schedule.
            ExecutionStrategy::GpuPreferred => Err(TesseraError::BackendUnavailable {
                requested: ExecutionStrategy::GpuPreferred,
            }),
        }
    }

    fn pipeline_params(&self, dimensions: usize) -> PipelineParams {
        let mut periodic = self.periodic_spans.clone();
        periodic.resize(dimensions, None);
        PipelineParams {
            critical_distance: self.critical_distance,
            density_threshold: self.density_threshold,
            follower_distance: self.follower_distance,
            seed_distance: self.seed_distance,
            points_per_tile: self.points_per_tile,
            kernel: self.kernel,
            periodic,
        }
    }
}

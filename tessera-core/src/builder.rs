//! Builder utilities for configuring tessera runs.
//!
//! Exposes the clustering parameter surface and the validation performed
//! before constructing [`Tessera`] instances.

use crate::{
    DensityKernel, Result,
    backend::ExecutionStrategy,
    error::TesseraError,
    metric::PeriodicSpan,
    tessera::Tessera,
};

const DEFAULT_POINTS_PER_TILE: usize = 128;

/// Configures and constructs [`Tessera`] instances.
///
/// The two mandatory parameters are the critical density radius and the
/// density threshold; the follower search radius and seed promotion distance
/// default to the critical radius, matching the conventional parameter
/// coupling for this algorithm family.
///
/// # Examples
/// ```
/// use tessera_core::{ExecutionStrategy, TesseraBuilder};
///
/// let tessera = TesseraBuilder::new(20.0, 10.0)
///     .with_follower_distance(20.0)
///     .with_execution_strategy(ExecutionStrategy::Serial)
///     .build()
///     .expect("builder configuration is valid");
/// assert_eq!(tessera.critical_distance(), 20.0);
/// assert_eq!(tessera.follower_distance(), 20.0);
/// ```
#[derive(Debug, Clone)]
pub struct TesseraBuilder {
    critical_distance: f32,
    density_threshold: f32,
    follower_distance: Option<f32>,
    seed_distance: Option<f32>,
    points_per_tile: usize,
    kernel: DensityKernel,
    periodic_spans: Vec<Option<PeriodicSpan>>,
    execution_strategy: ExecutionStrategy,
}

impl TesseraBuilder {
    /// Creates a builder for the given critical radius and density threshold.
    ///
    /// # Examples
    /// ```
    /// use tessera_core::{ExecutionStrategy, TesseraBuilder};
    ///
    /// let builder = TesseraBuilder::new(5.0, 2.5);
    /// assert_eq!(builder.points_per_tile(), 128);
    /// assert_eq!(builder.execution_strategy(), ExecutionStrategy::Auto);
    /// ```
    #[must_use]
    pub fn new(critical_distance: f32, density_threshold: f32) -> Self {
        Self {
            critical_distance,
            density_threshold,
            follower_distance: None,
            seed_distance: None,
            points_per_tile: DEFAULT_POINTS_PER_TILE,
            kernel: DensityKernel::default(),
            periodic_spans: Vec::new(),
            execution_strategy: ExecutionStrategy::Auto,
        }
    }

    /// Overrides the follower search radius (defaults to the critical radius).
    #[must_use]
    pub fn with_follower_distance(mut self, distance: f32) -> Self {
        self.follower_distance = Some(distance);
        self
    }

    /// Overrides the seed promotion distance (defaults to the critical radius).
    #[must_use]
    pub fn with_seed_distance(mut self, distance: f32) -> Self {
        self.seed_distance = Some(distance);
        self
    }

    /// Overrides the average tile occupancy used to size the spatial grid.
    #[must_use]
    pub fn with_points_per_tile(mut self, points: usize) -> Self {
        self.points_per_tile = points;
        self
    }

    /// Returns the configured tile occupancy target.
    #[must_use]
    pub fn points_per_tile(&self) -> usize {
        self.points_per_tile
    }

    /// Overrides the density kernel (defaults to the flat kernel at 0.5).
    #[must_use]
    pub fn with_kernel(mut self, kernel: DensityKernel) -> Self {
        self.kernel = kernel;
        self
    }

    /// Declares which dimensions wrap, one entry per dimension from the
    /// first; dimensions beyond the slice are non-periodic.
    ///
    /// # Examples
    /// ```
    /// use tessera_core::{PeriodicSpan, TesseraBuilder};
    ///
    /// let builder = TesseraBuilder::new(1.0, 2.0)
    ///     .with_periodic_spans(vec![Some(PeriodicSpan::new(0.0, 360.0)), None]);
    /// assert!(builder.build().is_ok());
    /// ```
    #[must_use]
    pub fn with_periodic_spans(mut self, spans: Vec<Option<PeriodicSpan>>) -> Self {
        self.periodic_spans = spans;
        self
    }

    /// Sets the execution strategy to use when running the algorithm.
    #[must_use]
    pub fn with_execution_strategy(mut self, strategy: ExecutionStrategy) -> Self {
        self.execution_strategy = strategy;
        self
    }

    /// Returns the currently configured execution strategy.
    #[must_use]
    pub fn execution_strategy(&self) -> ExecutionStrategy {
        self.execution_strategy
    }

    /// Validates the configuration and constructs a [`Tessera`] instance.
    ///
    /// # Errors
    /// Returns the parameter-specific [`TesseraError`] variant for the first
    /// violated constraint: positive radii and tile occupancy, non-negative
    /// density threshold, valid kernel parameters, and well-formed periodic
    /// spans.
    ///
    /// # Examples
    /// ```
    /// use tessera_core::{TesseraBuilder, TesseraError};
    ///
    /// let err = TesseraBuilder::new(0.0, 1.0).build().expect_err("zero radius");
    /// assert!(matches!(err, TesseraError::InvalidCriticalDistance { .. }));
    /// ```
    pub fn build(self) -> Result<Tessera> {
        if self.critical_distance <= 0.0 || !self.critical_distance.is_finite() {
            return Err(TesseraError::InvalidCriticalDistance {
                got: self.critical_distance,
            });
        }
        if self.density_threshold < 0.0 || !self.density_threshold.is_finite() {
            return Err(TesseraError::InvalidDensityThreshold {
                got: self.density_threshold,
            });
        }

        let follower_distance = self.follower_distance.unwrap_or(self.critical_distance);
        if follower_distance <= 0.0 || !follower_distance.is_finite() {
            return Err(TesseraError::InvalidFollowerDistance {
                got: follower_distance,
            });
        }

        let seed_distance = self.seed_distance.unwrap_or(self.critical_distance);
        if seed_distance <= 0.0 || !seed_distance.is_finite() {
            return Err(TesseraError::InvalidSeedDistance { got: seed_distance });
        }

        if self.points_per_tile == 0 {
            return Err(TesseraError::InvalidPointsPerTile {
                got: self.points_per_tile,
            });
        }

        self.kernel
            .validate()
            .map_err(|reason| TesseraError::InvalidKernel { reason })?;

        for (dim, span) in self.periodic_spans.iter().enumerate() {
            if let Some(span) = span {
                if !span.is_valid() {
                    return Err(TesseraError::InvalidPeriodicSpan {
                        dim,
                        low: span.low(),
                        high: span.high(),
                    });
                }
            }
        }

        Ok(Tessera::new(
            self.critical_distance,
            self.density_threshold,
            follower_distance,
            seed_distance,
            self.points_per_tile,
            self.kernel,
            self.periodic_spans,
            self.execution_strategy,
        ))
    }
}

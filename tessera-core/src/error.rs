//! Error types for the tessera core library.
//!
//! Defines error enums exposed by the public API and a convenient result alias.

use std::{fmt, sync::Arc};

use thiserror::Error;

use crate::backend::ExecutionStrategy;

macro_rules! define_error_codes {
    (
        $(#[$enum_meta:meta])*
        enum $CodeTy:ident for $ErrTy:ident {
            $(
                $(#[$variant_meta:meta])*
                $CodeVariant:ident => $ErrVariant:ident $( { $($pattern:tt)* } )? => $code:expr
            ),+ $(,)?
        }
    ) => {
        $(#[$enum_meta])*
        #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
        #[non_exhaustive]
        pub enum $CodeTy {
            $(
                $(#[$variant_meta])*
                $CodeVariant,
            )+
        }

        impl $CodeTy {
            /// Return the stable machine-readable representation of this error code.
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$CodeVariant => $code,)+
                }
            }
        }

        impl fmt::Display for $CodeTy {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl $ErrTy {
            #[doc = concat!(
                "Retrieve the stable [`",
                stringify!($CodeTy),
                "`] for this error."
            )]
            pub const fn code(&self) -> $CodeTy {
                match self {
                    $(Self::$ErrVariant $( { $($pattern)* } )? => $CodeTy::$CodeVariant,)+
                }
            }
        }
    };
}

/// An error produced while constructing or validating a [`crate::PointCloud`].
#[non_exhaustive]
#[derive(Clone, Debug, Error, PartialEq)]
pub enum PointCloudError {
    /// The flat coordinate buffer is not a whole number of rows.
    #[error("coordinate buffer of {values} values is not a multiple of {dimensions} dimensions")]
    RaggedRows {
        /// Total number of coordinate values supplied.
        values: usize,
        /// Configured dimensionality.
        dimensions: usize,
    },
    /// A row carried a coordinate count different from the configured dimensionality.
    #[error("row {row} has {got} coordinates but the cloud is {expected}-dimensional")]
    DimensionMismatch {
        /// Row that triggered the mismatch.
        row: usize,
        /// Expected dimensionality.
        expected: usize,
        /// Dimensionality actually supplied.
        got: usize,
    },
    /// A coordinate was NaN or infinite.
    #[error("coordinate {dim} of point {row} is not finite")]
    NonFiniteCoordinate {
        /// Row containing the offending value.
        row: usize,
        /// Dimension index of the offending value.
        dim: usize,
    },
    /// A point weight was NaN, infinite, or negative.
    #[error("weight of point {row} must be finite and non-negative")]
    InvalidWeight {
        /// Row containing the offending weight.
        row: usize,
    },
    /// The weight buffer length did not match the number of points.
    #[error("got {weights} weights for {points} points")]
    WeightCountMismatch {
        /// Number of weights supplied.
        weights: usize,
        /// Number of points in the cloud.
        points: usize,
    },
    /// Requested point index was outside the cloud's bounds.
    #[error("point index {index} is out of bounds")]
    OutOfBounds {
        /// The requested row that exceeded the cloud bounds.
        index: usize,
    },
}

define_error_codes! {
    /// Stable codes describing [`PointCloudError`] variants.
    enum PointCloudErrorCode for PointCloudError {
        /// The flat coordinate buffer is not a whole number of rows.
        RaggedRows => RaggedRows { .. } => "POINT_CLOUD_RAGGED_ROWS",
        /// A row carried a coordinate count different from the configured dimensionality.
        DimensionMismatch => DimensionMismatch { .. } => "POINT_CLOUD_DIMENSION_MISMATCH",
        /// A coordinate was NaN or infinite.
        NonFiniteCoordinate => NonFiniteCoordinate { .. } => "POINT_CLOUD_NON_FINITE_COORDINATE",
        /// A point weight was NaN, infinite, or negative.
        InvalidWeight => InvalidWeight { .. } => "POINT_CLOUD_INVALID_WEIGHT",
        /// The weight buffer length did not match the number of points.
        WeightCountMismatch => WeightCountMismatch { .. } => "POINT_CLOUD_WEIGHT_COUNT_MISMATCH",
        /// Requested point index was outside the cloud's bounds.
        OutOfBounds => OutOfBounds { .. } => "POINT_CLOUD_OUT_OF_BOUNDS",
    }
}

/// Error type produced when constructing or running [`crate::Tessera`].
#[non_exhaustive]
#[derive(Clone, Debug, Error, PartialEq)]
pub enum TesseraError {
    /// The critical density radius must be strictly positive.
    #[error("critical_distance must be positive (got {got})")]
    InvalidCriticalDistance {
        /// The invalid radius supplied by the caller.
        got: f32,
    },
    /// The density threshold must be non-negative.
    #[error("density_threshold must be non-negative (got {got})")]
    InvalidDensityThreshold {
        /// The invalid threshold supplied by the caller.
        got: f32,
    },
    /// The follower search radius must be strictly positive.
    #[error("follower_distance must be positive (got {got})")]
    InvalidFollowerDistance {
        /// The invalid radius supplied by the caller.
        got: f32,
    },
    /// The seed promotion distance must be strictly positive.
    #[error("seed_distance must be positive (got {got})")]
    InvalidSeedDistance {
        /// The invalid distance supplied by the caller.
        got: f32,
    },
    /// The tile occupancy target must be at least one point.
    #[error("points_per_tile must be at least 1 (got {got})")]
    InvalidPointsPerTile {
        /// The invalid occupancy supplied by the caller.
        got: usize,
    },
    /// A periodic span was empty, inverted, or non-finite.
    #[error("periodic span for dimension {dim} is invalid (low {low}, high {high})")]
    InvalidPeriodicSpan {
        /// Dimension the span was declared for.
        dim: usize,
        /// Lower bound of the span.
        low: f32,
        /// Upper bound of the span.
        high: f32,
    },
    /// A kernel parameter was out of range.
    #[error("density kernel is invalid: {reason}")]
    InvalidKernel {
        /// Description of the parameter violation.
        reason: &'static str,
    },
    /// The supplied [`crate::PointCloud`] contained no points.
    #[error("point cloud `{cloud}` contains no points")]
    EmptyCloud {
        /// Identifier for the empty cloud.
        cloud: Arc<str>,
    },
    /// Periodic spans were declared for more dimensions than the cloud has.
    #[error("periodic spans cover {spans} dimensions but cloud `{cloud}` has {dimensions}")]
    PeriodicSpanDimensions {
        /// Identifier for the cloud being clustered.
        cloud: Arc<str>,
        /// Number of spans declared on the builder.
        spans: usize,
        /// Dimensionality of the cloud.
        dimensions: usize,
    },
    /// The requested execution strategy is unavailable in the current build.
    #[error("the requested execution strategy {requested:?} is not available in this build")]
    BackendUnavailable {
        /// Strategy that could not be satisfied by the current build.
        requested: ExecutionStrategy,
    },
    /// A [`crate::PointCloud`] was rejected while running the algorithm.
    #[error("point cloud `{cloud}` failed: {error}")]
    PointCloud {
        /// Identifier for the cloud that produced the error.
        cloud: Arc<str>,
        #[source]
        /// Underlying point cloud error bubbled up by the algorithm.
        error: PointCloudError,
    },
    /// A follower chain failed to terminate, indicating a cycle.
    ///
    /// Follower edges always point toward strictly greater `(density, index)`
    /// pairs, so this is a logic defect rather than an input error.
    #[error("follower chain starting at point {point} did not terminate within {limit} steps")]
    FollowerCycle {
        /// Point whose chain exceeded the resolution limit.
        point: usize,
        /// Maximum number of steps permitted (the point count).
        limit: usize,
    },
}

define_error_codes! {
    /// Stable codes describing [`TesseraError`] variants.
    enum TesseraErrorCode for TesseraError {
        /// The critical density radius must be strictly positive.
        InvalidCriticalDistance => InvalidCriticalDistance { .. } => "TESSERA_INVALID_CRITICAL_DISTANCE",
        /// The density threshold must be non-negative.
        InvalidDensityThreshold => InvalidDensityThreshold { .. } => "TESSERA_INVALID_DENSITY_THRESHOLD",
        /// The follower search radius must be strictly positive.
        InvalidFollowerDistance => InvalidFollowerDistance { .. } => "TESSERA_INVALID_FOLLOWER_DISTANCE",
        /// The seed promotion distance must be strictly positive.
        InvalidSeedDistance => InvalidSeedDistance { .. } => "TESSERA_INVALID_SEED_DISTANCE",
        /// The tile occupancy target must be at least one point.
        InvalidPointsPerTile => InvalidPointsPerTile { .. } => "TESSERA_INVALID_POINTS_PER_TILE",
        /// A periodic span was empty, inverted, or non-finite.
        InvalidPeriodicSpan => InvalidPeriodicSpan { .. } => "TESSERA_INVALID_PERIODIC_SPAN",
        /// A kernel parameter was out of range.
        InvalidKernel => InvalidKernel { .. } => "TESSERA_INVALID_KERNEL",
        /// The supplied point cloud contained no points.
        EmptyCloud => EmptyCloud { .. } => "TESSERA_EMPTY_CLOUD",
        /// Periodic spans were declared for more dimensions than the cloud has.
        PeriodicSpanDimensions => PeriodicSpanDimensions { .. } => "TESSERA_PERIODIC_SPAN_DIMENSIONS",
        /// The requested execution strategy is unavailable in the current build.
        BackendUnavailable => BackendUnavailable { .. } => "TESSERA_BACKEND_UNAVAILABLE",
        /// A point cloud was rejected while running the algorithm.
        PointCloudFailure => PointCloud { .. } => "TESSERA_POINT_CLOUD_FAILURE",
        /// A follower chain failed to terminate, indicating a cycle.
        FollowerCycle => FollowerCycle { .. } => "TESSERA_FOLLOWER_CYCLE",
    }
}

impl TesseraError {
    /// Retrieve the inner [`PointCloudErrorCode`] when the error originated in a [`crate::PointCloud`].
    pub const fn point_cloud_code(&self) -> Option<PointCloudErrorCode> {
        match self {
            Self::PointCloud { error, .. } => Some(error.code()),
            _ => None,
        }
    }
}

/// Convenient alias for results returned by the core API.
pub type Result<T> = core::result::Result<T, TesseraError>;

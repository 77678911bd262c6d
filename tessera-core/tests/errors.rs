//! Stability tests for machine-readable error codes.

use std::num::NonZeroUsize;
use std::sync::Arc;

use tessera_core::{PointCloud, PointCloudError, TesseraError};

#[test]
fn point_cloud_error_codes_are_stable() {
    let dims = NonZeroUsize::new(2).expect("non-zero");
    let err = PointCloud::try_from_flat("bad", dims, vec![1.0], None)
        .expect_err("ragged buffer must fail");
    assert_eq!(err.code().as_str(), "POINT_CLOUD_RAGGED_ROWS");

    let err = PointCloud::try_from_flat("bad", dims, vec![1.0, f32::INFINITY], None)
        .expect_err("infinite coordinate must fail");
    assert_eq!(err.code().as_str(), "POINT_CLOUD_NON_FINITE_COORDINATE");
}

#[test]
fn tessera_errors_expose_the_inner_point_cloud_code() {
    let err = TesseraError::PointCloud {
        cloud: Arc::from("inner"),
        error: PointCloudError::OutOfBounds { index: 9 },
    };
    assert_eq!(err.code().as_str(), "TESSERA_POINT_CLOUD_FAILURE");
    let inner = err
        .point_cloud_code()
        .expect("wrapped error must expose its code");
    assert_eq!(inner.as_str(), "POINT_CLOUD_OUT_OF_BOUNDS");
}

#[test]
fn non_wrapping_errors_expose_no_inner_code() {
    let err = TesseraError::FollowerCycle { point: 3, limit: 10 };
    assert_eq!(err.code().as_str(), "TESSERA_FOLLOWER_CYCLE");
    assert!(err.point_cloud_code().is_none());
}

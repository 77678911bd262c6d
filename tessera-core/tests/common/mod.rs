//! Shared fixtures for tessera-core integration tests.

use std::num::NonZeroUsize;

use tessera_core::PointCloud;
use tessera_test_support::datasets::Dataset;

/// Builds a named [`PointCloud`] from a generated dataset.
///
/// # Panics
/// Panics when the dataset is malformed; fixtures are deterministic so this
/// only fires on a broken test.
#[must_use]
pub fn cloud_from_dataset(name: &str, dataset: &Dataset) -> PointCloud {
    let dimensions =
        NonZeroUsize::new(dataset.dimensions).expect("datasets have positive dimensionality");
    PointCloud::try_from_flat(name, dimensions, dataset.coords.clone(), None)
        .expect("generated datasets are finite and rectangular")
}

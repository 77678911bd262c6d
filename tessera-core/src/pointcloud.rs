//! Input point storage for the tessera core runtime.
//!
//! A [`PointCloud`] owns the coordinates and per-point weights for one
//! clustering run. Validation happens entirely at construction so the
//! pipeline stages can assume finite, rectangular data.

use std::num::NonZeroUsize;

use crate::error::PointCloudError;

/// An ordered, immutable collection of N-dimensional weighted points.
///
/// Insertion order is the input row order and is preserved through to the
/// output label array.
///
/// # Examples
/// ```
/// use std::num::NonZeroUsize;
/// use tessera_core::PointCloud;
///
/// let dims = NonZeroUsize::new(2).expect("non-zero");
/// let cloud = PointCloud::try_from_flat("demo", dims, vec![0.0, 0.0, 3.0, 4.0], None)?;
/// assert_eq!(cloud.len(), 2);
/// assert_eq!(cloud.coordinates(1)?, &[3.0, 4.0]);
/// assert_eq!(cloud.weight(0)?, 1.0);
/// # Ok::<(), tessera_core::PointCloudError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct PointCloud {
    name: String,
    dimensions: NonZeroUsize,
    coords: Vec<f32>,
    weights: Vec<f32>,
}

impl PointCloud {
    /// Builds a cloud from a row-major coordinate buffer.
    ///
    /// `coords` holds `dimensions` values per point, row after row. When
    /// `weights` is `None` every point gets weight `1.0`.
    ///
    /// # Errors
    /// Returns [`PointCloudError::RaggedRows`] when the buffer length is not
    /// a multiple of `dimensions`, [`PointCloudError::NonFiniteCoordinate`]
    /// for NaN or infinite coordinates,
    /// [`PointCloudError::WeightCountMismatch`] when the weight buffer length
    /// disagrees with the point count, and [`PointCloudError::InvalidWeight`]
    /// for non-finite or negative weights.
    pub fn try_from_flat(
        name: impl Into<String>,
        dimensions: NonZeroUsize,
        coords: Vec<f32>,
        weights: Option<Vec<f32>>,
    ) -> Result<Self, PointCloudError> {
        let dims = dimensions.get();
        if coords.len() % dims != 0 {
            return Err(PointCloudError::RaggedRows {
                values: coords.len(),
                dimensions: dims,
            });
        }
        let points = coords.len() / dims;

        for (pos, value) in coords.iter().enumerate() {
            if !value.is_finite() {
                return Err(PointCloudError::NonFiniteCoordinate {
                    row: pos / dims,
                    dim: pos % dims,
                });
            }
        }

        let weights = match weights {
            Some(weights) => {
                if weights.len() != points {
                    return Err(PointCloudError::WeightCountMismatch {
                        weights: weights.len(),
                        points,
                    });
                }
                for (row, weight) in weights.iter().enumerate() {
                    if !weight.is_finite() || *weight < 0.0 {
                        return Err(PointCloudError::InvalidWeight { row });
                    }
                }
                weights
            }
            None => vec![1.0; points],
        };

        Ok(Self {
            name: name.into(),
            dimensions,
            coords,
            weights,
        })
    }

    /// Builds a cloud from per-point coordinate rows.
    ///
    /// # Errors
    /// Returns [`PointCloudError::DimensionMismatch`] when a row's length
    /// disagrees with `dimensions`, plus the validation errors of
    /// [`Self::try_from_flat`].
    ///
    /// # Examples
    /// ```
    /// use std::num::NonZeroUsize;
    /// use tessera_core::PointCloud;
    ///
    /// let dims = NonZeroUsize::new(3).expect("non-zero");
    /// let cloud = PointCloud::try_from_rows("demo", dims, &[
    ///     vec![0.0, 0.0, 0.0],
    ///     vec![1.0, 2.0, 3.0],
    /// ])?;
    /// assert_eq!(cloud.len(), 2);
    /// # Ok::<(), tessera_core::PointCloudError>(())
    /// ```
    pub fn try_from_rows(
        name: impl Into<String>,
        dimensions: NonZeroUsize,
        rows: &[Vec<f32>],
    ) -> Result<Self, PointCloudError> {
        let dims = dimensions.get();
        let mut coords = Vec::with_capacity(rows.len() * dims);
        for (row, values) in rows.iter().enumerate() {
            if values.len() != dims {
                return Err(PointCloudError::DimensionMismatch {
                    row,
                    expected: dims,
                    got: values.len(),
                });
            }
            coords.extend_from_slice(values);
        }
        Self::try_from_flat(name, dimensions, coords, None)
    }

    /// Returns the number of points in the cloud.
    #[must_use]
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    /// Returns whether the cloud contains no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Returns the dimensionality of every point.
    #[must_use]
    pub const fn dimensions(&self) -> NonZeroUsize {
        self.dimensions
    }

    /// Returns a human-readable name identifying this cloud in diagnostics.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the coordinates of point `index`.
    ///
    /// # Errors
    /// Returns [`PointCloudError::OutOfBounds`] when `index` exceeds the
    /// point count.
    pub fn coordinates(&self, index: usize) -> Result<&[f32], PointCloudError> {
        if index >= self.len() {
            return Err(PointCloudError::OutOfBounds { index });
        }
        let dims = self.dimensions.get();
        Ok(&self.coords[index * dims..(index + 1) * dims])
    }

    /// Returns the weight of point `index`.
    ///
    /// # Errors
    /// Returns [`PointCloudError::OutOfBounds`] when `index` exceeds the
    /// point count.
    pub fn weight(&self, index: usize) -> Result<f32, PointCloudError> {
        self.weights
            .get(index)
            .copied()
            .ok_or(PointCloudError::OutOfBounds { index })
    }

    /// Returns the coordinates of point `index` without a bounds check.
    ///
    /// Pipeline stages iterate `0..len()` and have already validated their
    /// indices.
    #[must_use]
    pub(crate) fn point(&self, index: usize) -> &[f32] {
        let dims = self.dimensions.get();
        &self.coords[index * dims..(index + 1) * dims]
    }

    /// Returns the weight of point `index` without a bounds check.
    #[must_use]
    pub(crate) fn point_weight(&self, index: usize) -> f32 {
        self.weights[index]
    }

    /// Returns the full row-major coordinate buffer.
    #[must_use]
    pub fn coords(&self) -> &[f32] {
        &self.coords
    }

    /// Returns the per-point weight buffer.
    #[must_use]
    pub fn weights(&self) -> &[f32] {
        &self.weights
    }
}

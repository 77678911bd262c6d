//! CSV ingestion into validated point clouds.

use std::{fs::File, io::Read, num::NonZeroUsize, path::Path};

use tessera_core::PointCloud;

use crate::errors::CsvProviderError;

/// Point cloud provider backed by a CSV coordinate table.
///
/// Each data row carries the point's coordinates in column order; a row may
/// append one extra column holding the point's weight. Rows without the
/// weight column default to weight `1.0`.
///
/// # Examples
/// ```
/// use std::num::NonZeroUsize;
/// use tessera_providers_csv::CsvPointsProvider;
///
/// let table = "x0,x1,weight\n0.0,0.0,1.0\n3.0,4.0,2.0\n";
/// let dims = NonZeroUsize::new(2).expect("non-zero");
/// let provider = CsvPointsProvider::try_from_reader("demo", table.as_bytes(), dims)?;
/// assert_eq!(provider.cloud().len(), 2);
/// assert_eq!(provider.cloud().weights(), &[1.0, 2.0]);
/// # Ok::<(), tessera_providers_csv::CsvProviderError>(())
/// ```
#[derive(Debug, Clone)]
pub struct CsvPointsProvider {
    name: String,
    cloud: PointCloud,
}

impl CsvPointsProvider {
    /// Loads a point table from a CSV file on disk.
    ///
    /// # Errors
    /// Returns [`CsvProviderError::Io`] when the file cannot be opened, plus
    /// the parse and validation errors of [`Self::try_from_reader`].
    pub fn try_from_path(
        name: impl Into<String>,
        path: impl AsRef<Path>,
        dimensions: NonZeroUsize,
    ) -> Result<Self, CsvProviderError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| CsvProviderError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::try_from_reader(name, file, dimensions)
    }

    /// Loads a point table from any reader producing CSV text.
    ///
    /// The first row is treated as a header and discarded.
    ///
    /// # Errors
    /// Returns [`CsvProviderError::RowWidth`] when a row does not hold
    /// `dimensions` or `dimensions + 1` columns,
    /// [`CsvProviderError::NonNumericField`] for unparseable fields, and
    /// [`CsvProviderError::Cloud`] when the parsed values fail point-cloud
    /// validation.
    pub fn try_from_reader<R: Read>(
        name: impl Into<String>,
        reader: R,
        dimensions: NonZeroUsize,
    ) -> Result<Self, CsvProviderError> {
        let dims = dimensions.get();
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut coords = Vec::new();
        let mut weights = Vec::new();
        for (row, record) in csv_reader.records().enumerate() {
            let record = record?;
            if record.len() != dims && record.len() != dims + 1 {
                return Err(CsvProviderError::RowWidth {
                    row,
                    dimensions: dims,
                    got: record.len(),
                });
            }

            for (column, field) in record.iter().take(dims).enumerate() {
                coords.push(parse_field(field, row, column)?);
            }
            weights.push(match record.get(dims) {
                Some(field) => parse_field(field, row, dims)?,
                None => 1.0,
            });
        }

        let name = name.into();
        let cloud = PointCloud::try_from_flat(name.clone(), dimensions, coords, Some(weights))?;
        Ok(Self { name, cloud })
    }

    /// Returns the provider's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the parsed point cloud.
    #[must_use]
    pub fn cloud(&self) -> &PointCloud {
        &self.cloud
    }

    /// Consumes the provider, yielding the parsed point cloud.
    #[must_use]
    pub fn into_cloud(self) -> PointCloud {
        self.cloud
    }
}

fn parse_field(field: &str, row: usize, column: usize) -> Result<f32, CsvProviderError> {
    field
        .parse::<f32>()
        .map_err(|_| CsvProviderError::NonNumericField {
            row,
            column,
            value: field.to_owned(),
        })
}

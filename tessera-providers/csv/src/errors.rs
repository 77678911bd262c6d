//! Error types for CSV ingestion and export.

use std::path::PathBuf;

use thiserror::Error;

use tessera_core::PointCloudError;

/// Errors surfaced while reading or writing CSV point tables.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum CsvProviderError {
    /// The file could not be opened or read.
    #[error("failed to open `{path}`: {source}")]
    Io {
        /// Path that triggered the failure.
        path: PathBuf,
        /// Underlying operating system error.
        #[source]
        source: std::io::Error,
    },
    /// The CSV structure itself was malformed.
    #[error(transparent)]
    Malformed(#[from] csv::Error),
    /// A field could not be parsed as a number.
    #[error("row {row}, column {column}: `{value}` is not a number")]
    NonNumericField {
        /// Data row (0-based, header excluded) containing the field.
        row: usize,
        /// Column index of the field.
        column: usize,
        /// Raw field content.
        value: String,
    },
    /// A row carried the wrong number of columns for the configured
    /// dimensionality.
    #[error("row {row} has {got} columns; expected {dimensions} coordinates with an optional weight")]
    RowWidth {
        /// Data row (0-based, header excluded) with the wrong width.
        row: usize,
        /// Configured dimensionality.
        dimensions: usize,
        /// Number of columns actually present.
        got: usize,
    },
    /// The parsed table failed point-cloud validation.
    #[error(transparent)]
    Cloud(#[from] PointCloudError),
    /// The label array did not align with the cloud being exported.
    #[error("cannot export {labels} labels for {points} points")]
    LabelLengthMismatch {
        /// Number of points in the cloud.
        points: usize,
        /// Number of labels supplied.
        labels: usize,
    },
}

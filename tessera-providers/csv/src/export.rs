//! Clustered table export.

use std::io::Write;

use tessera_core::{ClusterLabel, PointCloud};

use crate::errors::CsvProviderError;

/// Writes a clustered point table: the coordinate columns, the weight, and
/// the assigned label (outliers as `-1`).
///
/// The column layout mirrors what [`crate::CsvPointsProvider`] reads, with
/// one `cluster_id` column appended, so exported tables round-trip as input
/// for downstream scoring tools.
///
/// # Errors
/// Returns [`CsvProviderError::LabelLengthMismatch`] when `labels` does not
/// align with `cloud`, and [`CsvProviderError::Malformed`] when the
/// underlying writer fails.
///
/// # Examples
/// ```
/// use std::num::NonZeroUsize;
/// use tessera_core::{ClusterLabel, PointCloud};
/// use tessera_providers_csv::write_clustered_csv;
///
/// let dims = NonZeroUsize::new(2).expect("non-zero");
/// let cloud = PointCloud::try_from_flat("demo", dims, vec![1.0, 2.0], None)?;
/// let mut buffer = Vec::new();
/// write_clustered_csv(&mut buffer, &cloud, &[ClusterLabel::Cluster(0)])?;
/// let text = String::from_utf8(buffer).expect("CSV output is UTF-8");
/// assert_eq!(text, "x0,x1,weight,cluster_id\n1,2,1,0\n");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn write_clustered_csv<W: Write>(
    writer: W,
    cloud: &PointCloud,
    labels: &[ClusterLabel],
) -> Result<(), CsvProviderError> {
    if labels.len() != cloud.len() {
        return Err(CsvProviderError::LabelLengthMismatch {
            points: cloud.len(),
            labels: labels.len(),
        });
    }

    let dims = cloud.dimensions().get();
    let mut csv_writer = csv::Writer::from_writer(writer);

    let mut header: Vec<String> = (0..dims).map(|dim| format!("x{dim}")).collect();
    header.push("weight".to_owned());
    header.push("cluster_id".to_owned());
    csv_writer.write_record(&header)?;

    for (index, label) in labels.iter().enumerate() {
        let mut record: Vec<String> = cloud
            .coordinates(index)?
            .iter()
            .map(ToString::to_string)
            .collect();
        record.push(cloud.weight(index)?.to_string());
        record.push(label.as_i64().to_string());
        csv_writer.write_record(&record)?;
    }
    csv_writer.flush().map_err(csv::Error::from)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::num::NonZeroUsize;

    fn cloud() -> PointCloud {
        let dims = NonZeroUsize::new(2).expect("non-zero");
        PointCloud::try_from_flat("export", dims, vec![0.0, 1.0, 2.0, 3.0], None)
            .expect("fixture cloud is valid")
    }

    #[test]
    fn writes_labels_with_the_outlier_sentinel() {
        let mut buffer = Vec::new();
        write_clustered_csv(
            &mut buffer,
            &cloud(),
            &[ClusterLabel::Cluster(0), ClusterLabel::Outlier],
        )
        .expect("export must succeed");

        let text = String::from_utf8(buffer).expect("CSV output is UTF-8");
        assert_eq!(text, "x0,x1,weight,cluster_id\n0,1,1,0\n2,3,1,-1\n");
    }

    #[test]
    fn rejects_misaligned_labels() {
        let mut buffer = Vec::new();
        let err = write_clustered_csv(&mut buffer, &cloud(), &[ClusterLabel::Cluster(0)])
            .expect_err("one label for two points must fail");
        assert!(matches!(
            err,
            CsvProviderError::LabelLengthMismatch {
                points: 2,
                labels: 1
            }
        ));
    }
}

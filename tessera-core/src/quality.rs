//! Clustering-quality metric helpers shared across crates and tests.
//!
//! Provides silhouette scoring for labelled point clouds. A poor score is
//! diagnostic information for the caller, typically a parameter-selection
//! warning. It is never a core error.

use crate::{ClusterLabel, PointCloud};

/// Errors raised while computing clustering-quality metrics.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum QualityError {
    /// Labels and points had different lengths.
    #[error("label length mismatch: points={points}, labels={labels}")]
    LabelLengthMismatch {
        /// Number of points in the cloud.
        points: usize,
        /// Number of labels supplied.
        labels: usize,
    },
    /// Fewer than two clusters were present after excluding outliers.
    #[error("silhouette requires at least two clusters (got {clusters})")]
    TooFewClusters {
        /// Number of distinct clusters found.
        clusters: usize,
    },
}

/// Computes the mean silhouette coefficient over all clustered points.
///
/// Outliers are excluded. Points in singleton clusters score zero by
/// convention. Distances are plain Euclidean over the input coordinates,
/// matching what downstream scoring tools compute on the exported table.
///
/// # Errors
/// Returns [`QualityError::LabelLengthMismatch`] when the label array does
/// not align with the cloud, and [`QualityError::TooFewClusters`] when
/// fewer than two clusters remain after excluding outliers.
///
/// # Examples
/// ```
/// use std::num::NonZeroUsize;
/// use tessera_core::{ClusterLabel, PointCloud, silhouette_score};
///
/// let dims = NonZeroUsize::new(1).expect("non-zero");
/// let cloud = PointCloud::try_from_flat(
///     "demo",
///     dims,
///     vec![0.0, 1.0, 100.0, 101.0],
///     None,
/// )?;
/// let labels = vec![
///     ClusterLabel::Cluster(0),
///     ClusterLabel::Cluster(0),
///     ClusterLabel::Cluster(1),
///     ClusterLabel::Cluster(1),
/// ];
/// let score = silhouette_score(&cloud, &labels)?;
/// assert!(score > 0.9);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[expect(
    clippy::cast_precision_loss,
    reason = "silhouette averages require floating-point arithmetic"
)]
pub fn silhouette_score(
    cloud: &PointCloud,
    labels: &[ClusterLabel],
) -> Result<f64, QualityError> {
    if labels.len() != cloud.len() {
        return Err(QualityError::LabelLengthMismatch {
            points: cloud.len(),
            labels: labels.len(),
        });
    }

    let clustered: Vec<(usize, u32)> = labels
        .iter()
        .enumerate()
        .filter_map(|(index, label)| label.id().map(|id| (index, id)))
        .collect();

    let cluster_count = clustered
        .iter()
        .map(|&(_, id)| id as usize + 1)
        .max()
        .unwrap_or(0);
    if cluster_count < 2 {
        return Err(QualityError::TooFewClusters {
            clusters: cluster_count,
        });
    }

    let mut sizes = vec![0usize; cluster_count];
    for &(_, id) in &clustered {
        sizes[id as usize] += 1;
    }

    let mut total = 0.0f64;
    for &(index, own) in &clustered {
        let own = own as usize;
        if sizes[own] < 2 {
            continue;
        }

        // Mean distance to every cluster, own included.
        let mut sums = vec![0.0f64; cluster_count];
        for &(other_index, other_id) in &clustered {
            if other_index == index {
                continue;
            }
            sums[other_id as usize] +=
                f64::from(euclidean(cloud.point(index), cloud.point(other_index)));
        }

        let cohesion = sums[own] / (sizes[own] - 1) as f64;
        let separation = sums
            .iter()
            .enumerate()
            .filter(|&(id, _)| id != own && sizes[id] > 0)
            .map(|(id, sum)| sum / sizes[id] as f64)
            .fold(f64::INFINITY, f64::min);

        let denominator = cohesion.max(separation);
        if denominator > 0.0 {
            total += (separation - cohesion) / denominator;
        }
    }

    Ok(total / clustered.len() as f64)
}

fn euclidean(a: &[f32], b: &[f32]) -> f32 {
    let mut sum = 0.0f64;
    for (&x, &y) in a.iter().zip(b.iter()) {
        let diff = f64::from(x) - f64::from(y);
        sum += diff * diff;
    }
    sum.sqrt() as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::num::NonZeroUsize;

    fn cloud(xs: &[f32]) -> PointCloud {
        let dims = NonZeroUsize::new(1).expect("non-zero");
        PointCloud::try_from_flat("quality", dims, xs.to_vec(), None)
            .expect("fixture cloud is valid")
    }

    #[test]
    fn well_separated_clusters_score_near_one() {
        let cloud = cloud(&[0.0, 0.5, 1.0, 100.0, 100.5, 101.0]);
        let labels = vec![
            ClusterLabel::Cluster(0),
            ClusterLabel::Cluster(0),
            ClusterLabel::Cluster(0),
            ClusterLabel::Cluster(1),
            ClusterLabel::Cluster(1),
            ClusterLabel::Cluster(1),
        ];
        let score = silhouette_score(&cloud, &labels).expect("score must compute");
        assert!(score > 0.95, "expected near-perfect separation, got {score}");
    }

    #[test]
    fn interleaved_clusters_score_poorly() {
        let cloud = cloud(&[0.0, 1.0, 2.0, 3.0]);
        let labels = vec![
            ClusterLabel::Cluster(0),
            ClusterLabel::Cluster(1),
            ClusterLabel::Cluster(0),
            ClusterLabel::Cluster(1),
        ];
        let score = silhouette_score(&cloud, &labels).expect("score must compute");
        assert!(score < 0.2, "interleaving should score low, got {score}");
    }

    #[test]
    fn outliers_are_excluded() {
        let cloud = cloud(&[0.0, 0.5, 100.0, 100.5, 5000.0]);
        let labels = vec![
            ClusterLabel::Cluster(0),
            ClusterLabel::Cluster(0),
            ClusterLabel::Cluster(1),
            ClusterLabel::Cluster(1),
            ClusterLabel::Outlier,
        ];
        let score = silhouette_score(&cloud, &labels).expect("score must compute");
        assert!(score > 0.9);
    }

    #[test]
    fn single_cluster_is_rejected() {
        let cloud = cloud(&[0.0, 1.0]);
        let labels = vec![ClusterLabel::Cluster(0), ClusterLabel::Cluster(0)];
        let err = silhouette_score(&cloud, &labels).expect_err("one cluster must fail");
        assert_eq!(err, QualityError::TooFewClusters { clusters: 1 });
    }

    #[test]
    fn mismatched_lengths_are_rejected() {
        let cloud = cloud(&[0.0, 1.0]);
        let err = silhouette_score(&cloud, &[ClusterLabel::Cluster(0)])
            .expect_err("length mismatch must fail");
        assert_eq!(
            err,
            QualityError::LabelLengthMismatch {
                points: 2,
                labels: 1
            }
        );
    }
}

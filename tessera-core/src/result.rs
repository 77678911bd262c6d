//! Result types for clustering operations.
//!
//! Provides the per-point label representation, the clustering result
//! container, label validation, and the canonicalization utility used to
//! compare runs across backends.

use thiserror::Error;

/// Label assigned to a single point.
///
/// Points absorbed into a cluster carry that cluster's identifier; isolated
/// low-density points carry the outlier sentinel.
///
/// # Examples
/// ```
/// use tessera_core::ClusterLabel;
///
/// let label = ClusterLabel::Cluster(3);
/// assert_eq!(label.id(), Some(3));
/// assert_eq!(label.as_i64(), 3);
/// assert_eq!(ClusterLabel::Outlier.as_i64(), -1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ClusterLabel {
    /// The point is isolated with low density and belongs to no cluster.
    Outlier,
    /// The point belongs to the cluster with the given identifier.
    Cluster(u32),
}

impl ClusterLabel {
    /// Returns the cluster identifier, or `None` for outliers.
    #[must_use]
    pub const fn id(self) -> Option<u32> {
        match self {
            Self::Outlier => None,
            Self::Cluster(id) => Some(id),
        }
    }

    /// Returns whether this label is the outlier sentinel.
    ///
    /// # Examples
    /// ```
    /// use tessera_core::ClusterLabel;
    ///
    /// assert!(ClusterLabel::Outlier.is_outlier());
    /// assert!(!ClusterLabel::Cluster(0).is_outlier());
    /// ```
    #[must_use]
    pub const fn is_outlier(self) -> bool {
        matches!(self, Self::Outlier)
    }

    /// Returns the signed integer form used on wire formats: cluster ids map
    /// to themselves and outliers map to `-1`.
    #[must_use]
    pub const fn as_i64(self) -> i64 {
        match self {
            Self::Outlier => -1,
            Self::Cluster(id) => id as i64,
        }
    }
}

/// Error returned when cluster identifiers are not contiguous starting at zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum NonContiguousClusterLabels {
    /// At least one cluster label exists but cluster `0` is absent.
    #[error("cluster identifiers must include 0")]
    MissingZero,
    /// The labels skip identifiers.
    #[error("cluster identifiers must be contiguous without gaps")]
    Gap,
}

/// Represents the output of a [`crate::Tessera::run`] invocation.
///
/// One label per input point, in input order, plus the number of distinct
/// clusters. Outliers do not count toward `cluster_count`.
///
/// # Examples
/// ```
/// use tessera_core::{ClusterLabel, ClusteringResult};
///
/// let result = ClusteringResult::try_from_labels(vec![
///     ClusterLabel::Cluster(0),
///     ClusterLabel::Outlier,
///     ClusterLabel::Cluster(1),
/// ])?;
/// assert_eq!(result.labels().len(), 3);
/// assert_eq!(result.cluster_count(), 2);
/// assert_eq!(result.outlier_count(), 1);
/// # Ok::<(), tessera_core::NonContiguousClusterLabels>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusteringResult {
    labels: Vec<ClusterLabel>,
    cluster_count: usize,
}

impl ClusteringResult {
    /// Builds a result from per-point labels.
    ///
    /// Cluster identifiers must start at zero and be contiguous; the outlier
    /// sentinel is always permitted. Use [`Self::try_from_labels`] to handle
    /// arbitrary identifiers.
    ///
    /// # Panics
    /// Panics when cluster identifiers are not contiguous from zero.
    #[must_use]
    pub fn from_labels(labels: Vec<ClusterLabel>) -> Self {
        Self::try_from_labels(labels)
            .expect("cluster identifiers must start at zero and be contiguous")
    }

    /// Attempts to build a result from per-point labels.
    ///
    /// Cluster identifiers must be contiguous starting at zero; the outlier
    /// sentinel is always permitted. An empty label vector is accepted and
    /// yields `cluster_count == 0`.
    ///
    /// # Errors
    /// Returns [`NonContiguousClusterLabels::MissingZero`] when clusters exist
    /// but id `0` is absent, and [`NonContiguousClusterLabels::Gap`] when ids
    /// skip values.
    pub fn try_from_labels(
        labels: Vec<ClusterLabel>,
    ) -> core::result::Result<Self, NonContiguousClusterLabels> {
        let Some(max_id) = labels.iter().filter_map(|label| label.id()).max() else {
            return Ok(Self {
                labels,
                cluster_count: 0,
            });
        };

        let expected = max_id as usize + 1;
        let mut seen = vec![false; expected];
        for id in labels.iter().filter_map(|label| label.id()) {
            seen[id as usize] = true;
        }

        if !seen[0] {
            return Err(NonContiguousClusterLabels::MissingZero);
        }
        if seen.iter().any(|present| !present) {
            return Err(NonContiguousClusterLabels::Gap);
        }

        Ok(Self {
            labels,
            cluster_count: expected,
        })
    }

    /// Returns the labels in input point order.
    #[must_use]
    pub fn labels(&self) -> &[ClusterLabel] {
        &self.labels
    }

    /// Counts how many distinct clusters exist within the labels.
    #[must_use]
    pub fn cluster_count(&self) -> usize {
        self.cluster_count
    }

    /// Counts how many points carry the outlier sentinel.
    ///
    /// # Examples
    /// ```
    /// use tessera_core::{ClusterLabel, ClusteringResult};
    ///
    /// let result = ClusteringResult::try_from_labels(vec![ClusterLabel::Outlier])?;
    /// assert_eq!(result.outlier_count(), 1);
    /// # Ok::<(), tessera_core::NonContiguousClusterLabels>(())
    /// ```
    #[must_use]
    pub fn outlier_count(&self) -> usize {
        self.labels
            .iter()
            .filter(|label| label.is_outlier())
            .count()
    }

    /// Returns the canonical form of this result.
    ///
    /// Two runs that partition the points identically but number the clusters
    /// differently map to the same canonical result: cluster ids are
    /// renumbered by order of first occurrence and the outlier sentinel is
    /// left fixed. This is the normalization the backend-equivalence tests
    /// compare under.
    ///
    /// # Examples
    /// ```
    /// use tessera_core::{ClusterLabel, ClusteringResult};
    ///
    /// let permuted = ClusteringResult::try_from_labels(vec![
    ///     ClusterLabel::Cluster(1),
    ///     ClusterLabel::Cluster(0),
    ///     ClusterLabel::Cluster(1),
    /// ])?;
    /// let canonical = permuted.canonicalized();
    /// let ids: Vec<i64> = canonical.labels().iter().map(|l| l.as_i64()).collect();
    /// assert_eq!(ids, vec![0, 1, 0]);
    /// # Ok::<(), tessera_core::NonContiguousClusterLabels>(())
    /// ```
    #[must_use]
    pub fn canonicalized(&self) -> Self {
        let mut remap = vec![None::<u32>; self.cluster_count];
        let mut next = 0u32;
        let labels = self
            .labels
            .iter()
            .map(|label| match label {
                ClusterLabel::Outlier => ClusterLabel::Outlier,
                ClusterLabel::Cluster(id) => {
                    let slot = &mut remap[*id as usize];
                    let canonical = *slot.get_or_insert_with(|| {
                        let assigned = next;
                        next += 1;
                        assigned
                    });
                    ClusterLabel::Cluster(canonical)
                }
            })
            .collect();

        Self {
            labels,
            cluster_count: self.cluster_count,
        }
    }
}

//! Folder-level progress aggregation.

use serde::{Deserialize, Serialize};

use crate::model::{ClassificationState, Document, TransformState};

/// Absolute document counts for one folder.
///
/// The six stage buckets partition the document set; `transform_done` is the
/// sum of the four classification buckets. Rates are left to the caller.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ProgressSnapshot {
    /// Number of documents in the folder.
    pub total: u64,
    /// Documents waiting for extraction.
    pub transform_waiting: u64,
    /// Documents being extracted.
    pub transform_pending: u64,
    /// Documents whose text has been extracted.
    pub transform_done: u64,
    /// Extracted documents waiting for a classification request.
    pub classification_waiting: u64,
    /// Extracted documents queued for or undergoing classification.
    pub classification_pending: u64,
    /// Classified documents.
    pub classification_done: u64,
    /// Documents the classifier failed on.
    #[serde(default)]
    pub classification_failed: u64,
}

impl ProgressSnapshot {
    /// `total = 0` means there is nothing to report, not 0%.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Fraction of the folder represented by `count`, if there is anything to report.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn ratio(&self, count: u64) -> Option<f64> {
        if self.is_empty() {
            None
        } else {
            Some(count as f64 / self.total as f64)
        }
    }

    /// No document is queued for or undergoing classification.
    #[must_use]
    pub const fn classification_settled(&self) -> bool {
        self.classification_pending == 0
    }

    /// Every document has left the extraction stage.
    #[must_use]
    pub const fn extraction_settled(&self) -> bool {
        self.transform_waiting == 0 && self.transform_pending == 0
    }

    /// Sum of the partitioning buckets; equals `total` for aggregated snapshots.
    #[must_use]
    pub const fn bucket_sum(&self) -> u64 {
        self.transform_waiting
            + self.transform_pending
            + self.classification_waiting
            + self.classification_pending
            + self.classification_done
            + self.classification_failed
    }
}

/// Count documents into progress buckets in a single pass.
///
/// Documents that have not finished extraction carry no classification opinion
/// and are counted only in the transform buckets.
#[must_use]
pub fn aggregate<'a, I>(documents: I) -> ProgressSnapshot
where
    I: IntoIterator<Item = &'a Document>,
{
    documents
        .into_iter()
        .fold(ProgressSnapshot::default(), |mut snapshot, doc| {
            snapshot.total += 1;
            match doc.transform() {
                TransformState::Pending => snapshot.transform_waiting += 1,
                TransformState::InProgress => snapshot.transform_pending += 1,
                TransformState::Done => {
                    snapshot.transform_done += 1;
                    match doc.classification() {
                        ClassificationState::Pending => snapshot.classification_waiting += 1,
                        ClassificationState::InProgress => snapshot.classification_pending += 1,
                        ClassificationState::Done => snapshot.classification_done += 1,
                        ClassificationState::Failed => snapshot.classification_failed += 1,
                    }
                }
            }
            snapshot
        })
}

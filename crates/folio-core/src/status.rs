//! User-facing status derivation.
//!
//! Precedence is fixed: archives expose only their expansion state, then an
//! unsupported type wins over any stage, then the transform stage, then the
//! classification stage.

use serde::Serialize;

use crate::model::{ClassificationState, Document, TransformState};

/// Status token shown next to a document.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum StatusLabel {
    /// File type the pipeline cannot process.
    Unsupported,
    /// Waiting for text extraction.
    Waiting,
    /// Text extraction in progress.
    Extracting,
    /// Extracted, waiting for a classification request.
    ClassifyWaiting,
    /// Classification queued or running.
    Classifying,
    /// Classification failed; eligible for retry.
    ClassifyFailed,
    /// Classified into a category (never listed as unclassified).
    Classified,
    /// Archive that has not been decompressed yet.
    NotExpanded,
    /// Archive that has been decompressed.
    Expanded,
}

impl StatusLabel {
    /// Stable machine token.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unsupported => "unsupported",
            Self::Waiting => "waiting",
            Self::Extracting => "extracting",
            Self::ClassifyWaiting => "classify_waiting",
            Self::Classifying => "classifying",
            Self::ClassifyFailed => "classify_failed",
            Self::Classified => "classified",
            Self::NotExpanded => "not_expanded",
            Self::Expanded => "expanded",
        }
    }

    /// Whether the label marks an in-flight pipeline step.
    #[must_use]
    pub const fn is_busy(self) -> bool {
        matches!(self, Self::Extracting | Self::Classifying)
    }
}

/// Derive the status label for a document.
#[must_use]
pub const fn derive_label(doc: &Document) -> StatusLabel {
    if doc.file_type().is_archive() {
        return if doc.is_expanded() {
            StatusLabel::Expanded
        } else {
            StatusLabel::NotExpanded
        };
    }
    if !doc.file_type().is_supported() {
        return StatusLabel::Unsupported;
    }
    match doc.transform() {
        TransformState::Pending => StatusLabel::Waiting,
        TransformState::InProgress => StatusLabel::Extracting,
        TransformState::Done => match doc.classification() {
            ClassificationState::Pending => StatusLabel::ClassifyWaiting,
            ClassificationState::InProgress => StatusLabel::Classifying,
            ClassificationState::Failed => StatusLabel::ClassifyFailed,
            ClassificationState::Done => StatusLabel::Classified,
        },
    }
}

//! Core document domain types.
//!
//! # Design
//! - Each pipeline stage is its own enum; numeric codes only exist on the wire.
//! - `Document::new` is the single constructor so contract-violating
//!   combinations never reach the status derivation.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identifier assigned to a document by the backend.
pub type FileId = i64;
/// Identifier assigned to a folder by the backend.
pub type FolderId = i64;
/// Identifier of the user owning folders.
pub type UserId = i64;

/// Errors raised while building domain values from untrusted input.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ModelError {
    /// A stage code outside the known range was received.
    #[error("unknown {stage} stage code {code}")]
    UnknownStageCode {
        /// Stage the code belongs to (`transform` or `classification`).
        stage: &'static str,
        /// Offending code.
        code: i64,
    },
    /// A non-archive document reported classification success without a category.
    #[error("document {id} is classified but has no category")]
    ClassifiedWithoutCategory {
        /// Offending document identifier.
        id: FileId,
    },
}

/// Text-extraction stage of a document.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TransformState {
    /// Uploaded and waiting for the extraction worker.
    Pending,
    /// Extraction is running.
    InProgress,
    /// Text has been extracted.
    Done,
}

impl TransformState {
    /// Decode the backend's numeric stage code.
    ///
    /// # Errors
    /// Returns [`ModelError::UnknownStageCode`] for codes outside `0..=2`.
    pub const fn from_code(code: i64) -> Result<Self, ModelError> {
        match code {
            0 => Ok(Self::Pending),
            1 => Ok(Self::InProgress),
            2 => Ok(Self::Done),
            _ => Err(ModelError::UnknownStageCode {
                stage: "transform",
                code,
            }),
        }
    }

    /// Numeric code used on the wire.
    #[must_use]
    pub const fn code(self) -> i64 {
        match self {
            Self::Pending => 0,
            Self::InProgress => 1,
            Self::Done => 2,
        }
    }
}

/// AI classification stage of a document.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ClassificationState {
    /// Waiting for a classification request.
    Pending,
    /// Queued or running in the classification worker.
    InProgress,
    /// Classified into a category.
    Done,
    /// The worker gave up on this document.
    Failed,
}

impl ClassificationState {
    /// Decode the backend's numeric stage code.
    ///
    /// # Errors
    /// Returns [`ModelError::UnknownStageCode`] for codes outside `0..=3`.
    pub const fn from_code(code: i64) -> Result<Self, ModelError> {
        match code {
            0 => Ok(Self::Pending),
            1 => Ok(Self::InProgress),
            2 => Ok(Self::Done),
            3 => Ok(Self::Failed),
            _ => Err(ModelError::UnknownStageCode {
                stage: "classification",
                code,
            }),
        }
    }

    /// Numeric code used on the wire.
    #[must_use]
    pub const fn code(self) -> i64 {
        match self {
            Self::Pending => 0,
            Self::InProgress => 1,
            Self::Done => 2,
            Self::Failed => 3,
        }
    }
}

/// Document format, derived from the extension or the server's `file_type`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum FileType {
    /// Portable document format.
    Pdf,
    /// Legacy Word document.
    Doc,
    /// Word document.
    Docx,
    /// Hangul word processor document.
    Hwp,
    /// Hangul OOXML document.
    Hwpx,
    /// Plain text.
    Txt,
    /// Legacy PowerPoint deck.
    Ppt,
    /// PowerPoint deck.
    Pptx,
    /// Legacy Excel workbook.
    Xls,
    /// Excel workbook.
    Xlsx,
    /// ZIP archive awaiting (or done with) decompression.
    Zip,
    /// Anything the pipeline cannot process.
    Other(String),
}

impl FileType {
    /// Parse a bare extension or type token (case-insensitive, leading dot allowed).
    #[must_use]
    pub fn from_extension(raw: &str) -> Self {
        let ext = raw.trim().trim_start_matches('.').to_ascii_lowercase();
        match ext.as_str() {
            "pdf" => Self::Pdf,
            "doc" => Self::Doc,
            "docx" => Self::Docx,
            "hwp" => Self::Hwp,
            "hwpx" => Self::Hwpx,
            "txt" => Self::Txt,
            "ppt" => Self::Ppt,
            "pptx" => Self::Pptx,
            "xls" => Self::Xls,
            "xlsx" => Self::Xlsx,
            "zip" => Self::Zip,
            _ => Self::Other(ext),
        }
    }

    /// Infer the type from a file name's extension.
    #[must_use]
    pub fn from_file_name(name: &str) -> Self {
        name.rsplit_once('.')
            .map_or_else(|| Self::Other(String::new()), |(_, ext)| Self::from_extension(ext))
    }

    /// Whether the extraction pipeline accepts this type.
    #[must_use]
    pub const fn is_supported(&self) -> bool {
        !matches!(self, Self::Other(_))
    }

    /// Whether this is an archive that can be expanded.
    #[must_use]
    pub const fn is_archive(&self) -> bool {
        matches!(self, Self::Zip)
    }

    /// Lowercase extension token.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Pdf => "pdf",
            Self::Doc => "doc",
            Self::Docx => "docx",
            Self::Hwp => "hwp",
            Self::Hwpx => "hwpx",
            Self::Txt => "txt",
            Self::Ppt => "ppt",
            Self::Pptx => "pptx",
            Self::Xls => "xls",
            Self::Xlsx => "xlsx",
            Self::Zip => "zip",
            Self::Other(ext) => ext.as_str(),
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// A single uploaded document and its processing state.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Document {
    id: FileId,
    name: String,
    file_type: FileType,
    transform: TransformState,
    classification: ClassificationState,
    category: Option<String>,
    expanded: bool,
}

impl Document {
    /// Build a document, rejecting state combinations the pipeline never produces.
    ///
    /// `expanded` is only meaningful for archives and is forced to `false`
    /// otherwise.
    ///
    /// # Errors
    /// Returns [`ModelError::ClassifiedWithoutCategory`] when a non-archive
    /// document reports `ClassificationState::Done` without a category.
    pub fn new(
        id: FileId,
        name: impl Into<String>,
        file_type: FileType,
        transform: TransformState,
        classification: ClassificationState,
        category: Option<String>,
        expanded: bool,
    ) -> Result<Self, ModelError> {
        let category = category.filter(|value| !value.trim().is_empty());
        if !file_type.is_archive()
            && classification == ClassificationState::Done
            && category.is_none()
        {
            return Err(ModelError::ClassifiedWithoutCategory { id });
        }
        let expanded = expanded && file_type.is_archive();
        Ok(Self {
            id,
            name: name.into(),
            file_type,
            transform,
            classification,
            category,
            expanded,
        })
    }

    /// Freshly uploaded document (`Pending/Pending`, no category).
    #[must_use]
    pub fn uploaded(id: FileId, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id,
            file_type: FileType::from_file_name(&name),
            name,
            transform: TransformState::Pending,
            classification: ClassificationState::Pending,
            category: None,
            expanded: false,
        }
    }

    /// Backend identifier.
    #[must_use]
    pub const fn id(&self) -> FileId {
        self.id
    }

    /// Display name (original file name).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Document format.
    #[must_use]
    pub const fn file_type(&self) -> &FileType {
        &self.file_type
    }

    /// Extraction stage.
    #[must_use]
    pub const fn transform(&self) -> TransformState {
        self.transform
    }

    /// Classification stage.
    #[must_use]
    pub const fn classification(&self) -> ClassificationState {
        self.classification
    }

    /// Assigned category, if any.
    #[must_use]
    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    /// Whether an archive has already been decompressed.
    #[must_use]
    pub const fn is_expanded(&self) -> bool {
        self.expanded
    }

    /// Member of the folder's unclassified set.
    #[must_use]
    pub const fn is_unclassified(&self) -> bool {
        self.category.is_none()
    }

    /// Counted in the folder's failed set.
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self.classification, ClassificationState::Failed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_codes_round_trip_and_reject_unknown() {
        for state in [
            TransformState::Pending,
            TransformState::InProgress,
            TransformState::Done,
        ] {
            assert_eq!(TransformState::from_code(state.code()), Ok(state));
        }
        assert_eq!(
            ClassificationState::from_code(3),
            Ok(ClassificationState::Failed)
        );
        assert_eq!(
            TransformState::from_code(7),
            Err(ModelError::UnknownStageCode {
                stage: "transform",
                code: 7
            })
        );
        assert!(ClassificationState::from_code(-1).is_err());
    }

    #[test]
    fn file_type_from_name_is_case_insensitive() {
        assert_eq!(FileType::from_file_name("Report.PDF"), FileType::Pdf);
        assert_eq!(FileType::from_file_name("한글파일1.hwp"), FileType::Hwp);
        assert_eq!(FileType::from_file_name("bundle.zip"), FileType::Zip);
        assert_eq!(
            FileType::from_file_name("starcraft.exe"),
            FileType::Other("exe".to_string())
        );
        assert!(!FileType::from_file_name("README").is_supported());
        assert!(FileType::from_extension(".DOCX").is_supported());
    }

    #[test]
    fn classified_document_requires_category() {
        let err = Document::new(
            9,
            "a.pdf",
            FileType::Pdf,
            TransformState::Done,
            ClassificationState::Done,
            None,
            false,
        )
        .expect_err("missing category must be rejected");
        assert_eq!(err, ModelError::ClassifiedWithoutCategory { id: 9 });

        let blank = Document::new(
            9,
            "a.pdf",
            FileType::Pdf,
            TransformState::Done,
            ClassificationState::Done,
            Some("  ".into()),
            false,
        );
        assert!(blank.is_err());
    }

    #[test]
    fn archive_may_be_done_without_category() {
        let doc = Document::new(
            3,
            "bundle.zip",
            FileType::Zip,
            TransformState::Done,
            ClassificationState::Done,
            None,
            true,
        )
        .expect("archives are exempt");
        assert!(doc.is_expanded());
        assert!(doc.is_unclassified());
    }

    #[test]
    fn expanded_flag_is_ignored_for_non_archives() {
        let doc = Document::new(
            4,
            "memo.txt",
            FileType::Txt,
            TransformState::Pending,
            ClassificationState::Pending,
            None,
            true,
        )
        .expect("valid document");
        assert!(!doc.is_expanded());
    }

    #[test]
    fn uploaded_document_starts_pending() {
        let doc = Document::uploaded(1, "notes.docx");
        assert_eq!(doc.transform(), TransformState::Pending);
        assert_eq!(doc.classification(), ClassificationState::Pending);
        assert_eq!(doc.file_type(), &FileType::Docx);
        assert!(doc.is_unclassified());
        assert!(!doc.is_failed());
    }
}

//! Per-file verification reports.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::record::{ComparisonResult, StructuredRecord};
use crate::extract::DocumentKind;

/// Everything learned about one uploaded file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileReport {
    /// Original filename of the upload.
    pub filename: String,

    /// Format selected from the filename extension.
    pub kind: DocumentKind,

    /// When processing finished.
    pub processed_at: DateTime<Utc>,

    /// Wall-clock processing time in milliseconds.
    pub processing_time_ms: u64,

    /// Text returned by the extraction backend.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extracted_text: Option<String>,

    /// Extraction failure message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extraction_error: Option<String>,

    /// Parsed fields (absent when extraction failed).
    pub structured_data: Option<StructuredRecord>,

    /// How far the comparison got.
    pub comparison: ComparisonStage,
}

/// Comparison stage of a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum ComparisonStage {
    /// Extraction failed, nothing was parsed.
    Skipped,

    /// The identifier field was not found in the parsed text.
    IdentifierMissing {
        /// Message shown to the user.
        error: String,
    },

    /// The comparator ran (possibly against a missing reference record).
    Completed(ComparisonResult),
}

/// Coarse outcome of a report, used for summaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    /// All reference fields matched.
    Verified,
    /// Compared with at least one mismatch.
    Mismatch,
    /// Identifier parsed but no reference record exists.
    NotFound,
    /// No identifier in the parsed text.
    IdentifierMissing,
    /// No text could be extracted.
    ExtractionFailed,
}

impl ReportStatus {
    /// Stable lower-case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Verified => "verified",
            Self::Mismatch => "mismatch",
            Self::NotFound => "not_found",
            Self::IdentifierMissing => "identifier_missing",
            Self::ExtractionFailed => "extraction_failed",
        }
    }
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FileReport {
    /// Report for a file that never reached a text backend.
    pub fn failed(filename: impl Into<String>, error: impl ToString) -> Self {
        let filename = filename.into();
        Self {
            kind: DocumentKind::from_filename(&filename),
            filename,
            processed_at: Utc::now(),
            processing_time_ms: 0,
            extracted_text: None,
            extraction_error: Some(error.to_string()),
            structured_data: None,
            comparison: ComparisonStage::Skipped,
        }
    }

    /// Accuracy of a completed comparison that found its reference record.
    pub fn accuracy(&self) -> Option<f64> {
        match &self.comparison {
            ComparisonStage::Completed(result) if result.error.is_none() => Some(result.accuracy),
            _ => None,
        }
    }

    /// The comparison result, if the comparator ran.
    pub fn comparison_result(&self) -> Option<&ComparisonResult> {
        match &self.comparison {
            ComparisonStage::Completed(result) => Some(result),
            _ => None,
        }
    }

    /// Error message from the comparison stage.
    pub fn comparison_error(&self) -> Option<&str> {
        match &self.comparison {
            ComparisonStage::Skipped => None,
            ComparisonStage::IdentifierMissing { error } => Some(error),
            ComparisonStage::Completed(result) => result.error.as_deref(),
        }
    }

    /// First error of any stage.
    pub fn error(&self) -> Option<&str> {
        self.extraction_error
            .as_deref()
            .or_else(|| self.comparison_error())
    }

    /// Identifier value parsed from the document.
    pub fn identifier<'a>(&'a self, identifier_field: &str) -> Option<&'a str> {
        self.structured_data
            .as_ref()
            .and_then(|record| record.value(identifier_field))
    }

    /// Coarse outcome.
    pub fn status(&self) -> ReportStatus {
        match &self.comparison {
            ComparisonStage::Skipped => ReportStatus::ExtractionFailed,
            ComparisonStage::IdentifierMissing { .. } => ReportStatus::IdentifierMissing,
            ComparisonStage::Completed(result) if result.error.is_some() => ReportStatus::NotFound,
            ComparisonStage::Completed(result) if result.is_exact_match() => ReportStatus::Verified,
            ComparisonStage::Completed(_) => ReportStatus::Mismatch,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::field_map::FieldMap;
    use crate::models::record::FieldMismatch;

    fn report(comparison: ComparisonStage) -> FileReport {
        FileReport {
            filename: "scan.png".to_string(),
            kind: DocumentKind::Image,
            processed_at: Utc::now(),
            processing_time_ms: 12,
            extracted_text: Some("Sr no.: S001".to_string()),
            extraction_error: None,
            structured_data: Some(
                [("Sr no.", Some("S001".to_string()))].into_iter().collect(),
            ),
            comparison,
        }
    }

    #[test]
    fn test_status_from_stage() {
        let exact = ComparisonResult {
            accuracy: 100.0,
            mismatches: FieldMap::new(),
            error: None,
        };
        assert_eq!(report(ComparisonStage::Completed(exact)).status(), ReportStatus::Verified);

        let mut mismatches = FieldMap::new();
        mismatches.insert(
            "City",
            FieldMismatch {
                expected: "Nagpur".to_string(),
                actual: Some("Pune".to_string()),
            },
        );
        let partial = ComparisonResult {
            accuracy: 50.0,
            mismatches,
            error: None,
        };
        let partial = report(ComparisonStage::Completed(partial));
        assert_eq!(partial.status(), ReportStatus::Mismatch);
        assert_eq!(partial.accuracy(), Some(50.0));
        assert_eq!(partial.identifier("Sr no."), Some("S001"));

        let missing = report(ComparisonStage::Completed(ComparisonResult::not_found("Sr no.")));
        assert_eq!(missing.status(), ReportStatus::NotFound);
        assert_eq!(missing.accuracy(), None);
        assert_eq!(missing.error(), Some("Sr no. not found in database."));

        assert_eq!(report(ComparisonStage::Skipped).status(), ReportStatus::ExtractionFailed);
    }

    #[test]
    fn test_failed_report() {
        let failed = FileReport::failed("scan.bmp", "permission denied");
        assert_eq!(failed.kind, DocumentKind::Image);
        assert_eq!(failed.status(), ReportStatus::ExtractionFailed);
        assert_eq!(failed.error(), Some("permission denied"));
        assert_eq!(failed.identifier("Sr no."), None);
    }

    #[test]
    fn test_stage_serializes_with_tag() {
        let stage = ComparisonStage::IdentifierMissing {
            error: "Sr no. not found in extracted data, cannot compare.".to_string(),
        };
        let json = serde_json::to_value(&stage).unwrap();
        assert_eq!(json["stage"], "identifier_missing");

        let completed = ComparisonStage::Completed(ComparisonResult::not_found("Sr no."));
        let json = serde_json::to_value(&completed).unwrap();
        assert_eq!(json["stage"], "completed");
        assert_eq!(json["accuracy"], 0.0);
        assert_eq!(json["error"], "Sr no. not found in database.");
    }
}

//! Parsed records, reference records and comparison results.

use serde::{Deserialize, Serialize};

use super::field_map::FieldMap;

/// Values parsed from a document, one entry per schema field.
///
/// A field that was not found is `None`; a field whose label was present with
/// nothing after the colon is `Some("")`.
pub type StructuredRecord = FieldMap<Option<String>>;

/// Trusted expected values for one identifier.
pub type ReferenceRecord = FieldMap<String>;

/// Expected versus actual value for a field that failed to match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldMismatch {
    /// Value from the reference record.
    pub expected: String,

    /// Value parsed from the document (`None` if the field was not found).
    pub actual: Option<String>,
}

/// Outcome of comparing a parsed record with its reference record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    /// Percentage of reference fields that matched exactly (0 - 100).
    pub accuracy: f64,

    /// Every reference field that did not match.
    pub mismatches: FieldMap<FieldMismatch>,

    /// Set when no comparison was possible.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ComparisonResult {
    /// Result for an identifier with no reference record.
    pub fn not_found(identifier_field: &str) -> Self {
        Self {
            accuracy: 0.0,
            mismatches: FieldMap::new(),
            error: Some(format!("{identifier_field} not found in database.")),
        }
    }

    /// Whether every reference field matched.
    pub fn is_exact_match(&self) -> bool {
        self.error.is_none() && self.accuracy >= 100.0
    }
}

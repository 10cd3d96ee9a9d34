//! Scoring parsed records against reference records.

use tracing::debug;

use crate::models::config::FieldSchema;
use crate::models::field_map::FieldMap;
use crate::models::record::{ComparisonResult, FieldMismatch, ReferenceRecord, StructuredRecord};

/// Compares parsed records with reference records.
#[derive(Debug, Clone)]
pub struct Comparator {
    identifier: String,
}

impl Comparator {
    /// Create a comparator for records keyed by `identifier`.
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
        }
    }

    /// Create a comparator for the schema's identifier field.
    pub fn from_schema(schema: &FieldSchema) -> Self {
        Self::new(schema.identifier.clone())
    }

    /// The identifier field.
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Message for a parsed record that has no identifier value.
    pub fn missing_identifier_message(&self) -> String {
        format!(
            "{} not found in extracted data, cannot compare.",
            self.identifier
        )
    }

    /// Score `record` against `reference`.
    ///
    /// The reference record's keys define which fields are compared; extra
    /// parsed fields are ignored. A missing reference gives 0 % with an error,
    /// an empty one gives 0 % without.
    pub fn compare(
        &self,
        record: &StructuredRecord,
        reference: Option<&ReferenceRecord>,
    ) -> ComparisonResult {
        let Some(reference) = reference else {
            return ComparisonResult::not_found(&self.identifier);
        };

        let mut matched = 0usize;
        let mut mismatches = FieldMap::new();

        for (field, expected) in reference.iter() {
            let actual = record.value(field);
            if actual == Some(expected.as_str()) {
                matched += 1;
            } else {
                mismatches.insert(
                    field,
                    FieldMismatch {
                        expected: expected.clone(),
                        actual: actual.map(str::to_string),
                    },
                );
            }
        }

        let total = reference.len();
        let accuracy = if total > 0 {
            matched as f64 / total as f64 * 100.0
        } else {
            0.0
        };

        debug!(
            "Matched {}/{} reference fields ({:.2}%)",
            matched, total, accuracy
        );

        ComparisonResult {
            accuracy,
            mismatches,
            error: None,
        }
    }
}

impl Default for Comparator {
    fn default() -> Self {
        Self::from_schema(&FieldSchema::default())
    }
}

/// Compare with the default `Sr no.` identifier.
pub fn compare(record: &StructuredRecord, reference: Option<&ReferenceRecord>) -> ComparisonResult {
    Comparator::default().compare(record, reference)
}

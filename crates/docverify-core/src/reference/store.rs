//! In-memory reference store.

use std::collections::HashMap;
use std::path::Path;

use tracing::debug;

use super::ReferenceLookup;
use crate::error::ReferenceError;
use crate::models::field_map::FieldMap;
use crate::models::record::ReferenceRecord;

const SAMPLE_REFERENCE: &str = include_str!("../../data/sample_reference.json");

/// Read-only reference records keyed by identifier.
#[derive(Debug, Clone, Default)]
pub struct ReferenceStore {
    records: HashMap<String, ReferenceRecord>,
}

impl ReferenceStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from `(identifier, record)` pairs.
    pub fn from_records(records: impl IntoIterator<Item = (String, ReferenceRecord)>) -> Self {
        Self {
            records: records.into_iter().collect(),
        }
    }

    /// The bundled sample records (S001 - S010).
    pub fn builtin() -> Result<Self, ReferenceError> {
        Self::from_json_str(SAMPLE_REFERENCE)
    }

    /// Load records from a JSON object of `{ "<id>": { "<field>": "<value>" } }`.
    pub fn from_file(path: &Path) -> Result<Self, ReferenceError> {
        let content = std::fs::read_to_string(path)?;
        let store = Self::from_json_str(&content)?;
        debug!("Loaded {} reference records from {}", store.len(), path.display());
        Ok(store)
    }

    /// Parse records from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, ReferenceError> {
        let records: FieldMap<ReferenceRecord> = serde_json::from_str(json)?;
        Ok(Self::from_records(records))
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the store has no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All identifiers, sorted.
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.records.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// Identifiers whose record carries a different value in `identifier_field`.
    pub fn inconsistent_ids(&self, identifier_field: &str) -> Vec<&str> {
        let mut ids: Vec<&str> = self
            .records
            .iter()
            .filter(|(id, record)| {
                record
                    .get(identifier_field)
                    .is_some_and(|value| value != *id)
            })
            .map(|(id, _)| id.as_str())
            .collect();
        ids.sort_unstable();
        ids
    }
}

impl ReferenceLookup for ReferenceStore {
    fn lookup(&self, identifier: &str) -> Option<&ReferenceRecord> {
        self.records.get(identifier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_builtin_records() {
        let store = ReferenceStore::builtin().unwrap();
        assert_eq!(store.len(), 10);
        assert_eq!(store.ids().first(), Some(&"S001"));
        assert_eq!(store.ids().last(), Some(&"S010"));
        assert!(store.inconsistent_ids("Sr no.").is_empty());

        let record = store.lookup("S008").unwrap();
        assert_eq!(record.get("City").map(String::as_str), Some("São Paulo"));
        assert_eq!(
            record.keys().collect::<Vec<_>>(),
            vec!["Sr no.", "Name", "City", "Age", "Country", "Address"]
        );
    }

    #[test]
    fn test_lookup_is_exact() {
        let store = ReferenceStore::builtin().unwrap();
        assert!(store.lookup("S001").is_some());
        assert!(store.lookup("s001").is_none());
        assert!(store.lookup(" S001").is_none());
        assert!(store.lookup("S011").is_none());
    }

    #[test]
    fn test_from_json_reports_inconsistent_ids() {
        let store = ReferenceStore::from_json_str(
            r#"{"A1": {"Sr no.": "A1", "Name": "x"}, "A2": {"Sr no.": "B7"}, "A3": {"Name": "y"}}"#,
        )
        .unwrap();
        assert_eq!(store.len(), 3);
        assert_eq!(store.inconsistent_ids("Sr no."), vec!["A2"]);
    }

    #[test]
    fn test_rejects_non_string_values() {
        let err = ReferenceStore::from_json_str(r#"{"A1": {"Age": 23}}"#).unwrap_err();
        assert!(matches!(err, ReferenceError::Parse(_)));
    }

    #[test]
    fn test_from_file_missing() {
        let err = ReferenceStore::from_file(Path::new("/nonexistent/reference.json")).unwrap_err();
        assert!(matches!(err, ReferenceError::Io(_)));
    }
}

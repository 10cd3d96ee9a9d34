//! Line-oriented `Label: value` field parser.

use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use crate::error::ConfigError;
use crate::models::config::FieldSchema;
use crate::models::record::StructuredRecord;

lazy_static! {
    static ref DEFAULT_PARSER: FieldParser =
        FieldParser::new(&FieldSchema::default()).expect("default field schema is valid");
}

/// Parses labeled fields out of free text.
///
/// A line matches a field when, after trimming, it starts with the label
/// (any case), optionally followed by whitespace, then a colon. The value is
/// the rest of the line, trimmed. The first matching line wins and every
/// field scans the text from the top.
#[derive(Debug, Clone)]
pub struct FieldParser {
    fields: Vec<LabelPattern>,
}

#[derive(Debug, Clone)]
struct LabelPattern {
    label: String,
    pattern: Regex,
}

impl LabelPattern {
    fn new(label: &str) -> Result<Self, ConfigError> {
        let pattern = Regex::new(&format!(r"(?i)^{}\s*:(.*)$", regex::escape(label)))
            .map_err(|e| ConfigError::InvalidSchema(format!("label {label:?}: {e}")))?;

        Ok(Self {
            label: label.to_string(),
            pattern,
        })
    }

    fn find(&self, lines: &[&str]) -> Option<String> {
        lines.iter().find_map(|line| {
            self.pattern
                .captures(line)
                .map(|caps| caps[1].trim().to_string())
        })
    }
}

impl FieldParser {
    /// Build a parser for the schema's labels, in schema order.
    pub fn new(schema: &FieldSchema) -> Result<Self, ConfigError> {
        schema.validate()?;

        let fields = schema
            .labels
            .iter()
            .map(|label| LabelPattern::new(label))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { fields })
    }

    /// Field labels in parsing order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.label.as_str())
    }

    /// Parse every field; the record always holds exactly the schema's labels.
    pub fn parse(&self, text: &str) -> StructuredRecord {
        let lines: Vec<&str> = text.split('\n').map(str::trim).collect();

        let record: StructuredRecord = self
            .fields
            .iter()
            .map(|field| (field.label.clone(), field.find(&lines)))
            .collect();

        debug!(
            "Parsed {}/{} fields from {} lines",
            record.iter().filter(|(_, v)| v.is_some()).count(),
            record.len(),
            lines.len()
        );

        record
    }
}

/// Parse text with the default six-field schema.
pub fn parse_fields(text: &str) -> StructuredRecord {
    DEFAULT_PARSER.parse(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = "Sr no.: S001\nName: Hemanshu Kasar\nCity: Pune\nAge: 23\nCountry: India\nAddress: 7, gurudeo nagar";

    #[test]
    fn test_parse_all_fields() {
        let record = parse_fields(SAMPLE);

        assert_eq!(
            record.keys().collect::<Vec<_>>(),
            vec!["Sr no.", "Name", "City", "Age", "Country", "Address"]
        );
        assert_eq!(record.value("Sr no."), Some("S001"));
        assert_eq!(record.value("Name"), Some("Hemanshu Kasar"));
        assert_eq!(record.value("City"), Some("Pune"));
        assert_eq!(record.value("Age"), Some("23"));
        assert_eq!(record.value("Country"), Some("India"));
        assert_eq!(record.value("Address"), Some("7, gurudeo nagar"));
    }

    #[test]
    fn test_name_line_anywhere_in_text() {
        let text = "Application form\n\nsome preamble\nName: Alice\ntrailer";
        assert_eq!(parse_fields(text).value("Name"), Some("Alice"));
    }

    #[test]
    fn test_missing_fields_are_absent() {
        let record = parse_fields("Name: Alice\nNotes: none");

        assert_eq!(record.len(), 6);
        assert_eq!(record.get("City"), Some(&None));
        assert_eq!(record.get("Sr no."), Some(&None));
        assert!(!record.contains_key("Notes"));
    }

    #[test]
    fn test_labels_are_case_insensitive() {
        assert_eq!(parse_fields("NAME: Bob").value("Name"), Some("Bob"));
        assert_eq!(parse_fields("name: Bob").value("Name"), Some("Bob"));
        assert_eq!(parse_fields("SR NO.: s9").value("Sr no."), Some("s9"));
    }

    #[test]
    fn test_whitespace_around_colon() {
        let record = parse_fields("   Name   :   Alice   \r\nCity:Pune\n\tAge :23");
        assert_eq!(record.value("Name"), Some("Alice"));
        assert_eq!(record.value("City"), Some("Pune"));
        assert_eq!(record.value("Age"), Some("23"));
    }

    #[test]
    fn test_first_match_wins() {
        let record = parse_fields("Sr no.: S001\nName: A\nSr no.: S002");
        assert_eq!(record.value("Sr no."), Some("S001"));
    }

    #[test]
    fn test_empty_value_is_present() {
        let record = parse_fields("Name:\nCity:   ");
        assert_eq!(record.get("Name"), Some(&Some(String::new())));
        assert_eq!(record.get("City"), Some(&Some(String::new())));
        assert_eq!(record.get("Age"), Some(&None));
    }

    #[test]
    fn test_label_without_colon_does_not_match() {
        let record = parse_fields("Name Alice\nCity - Pune\nNamed: x");
        assert_eq!(record.get("Name"), Some(&None));
        assert_eq!(record.get("City"), Some(&None));
    }

    #[test]
    fn test_label_must_start_the_line() {
        let record = parse_fields("Full Name: Alice\nHome City: Pune");
        assert_eq!(record.get("Name"), Some(&None));
        assert_eq!(record.get("City"), Some(&None));
    }

    #[test]
    fn test_value_keeps_later_colons() {
        let record = parse_fields("Address: Flat 2: Block B, Rue: 5");
        assert_eq!(record.value("Address"), Some("Flat 2: Block B, Rue: 5"));
    }

    #[test]
    fn test_label_dot_is_literal() {
        // "Sr no." must not match "Sr noX"
        let record = parse_fields("Sr noX: S001");
        assert_eq!(record.get("Sr no."), Some(&None));
    }

    #[test]
    fn test_fields_scan_independently() {
        // Address appears before Sr no.; each field still finds its own line.
        let record = parse_fields("Address: 123 Main St\nName: John Doe\nSr no.: S002");
        assert_eq!(record.value("Sr no."), Some("S002"));
        assert_eq!(record.value("Address"), Some("123 Main St"));
        assert_eq!(record.value("Name"), Some("John Doe"));
    }

    #[test]
    fn test_parse_is_idempotent() {
        assert_eq!(parse_fields(SAMPLE), parse_fields(SAMPLE));
    }

    #[test]
    fn test_custom_schema() {
        let schema = FieldSchema {
            labels: vec!["Policy #".to_string(), "Holder".to_string()],
            identifier: "Policy #".to_string(),
        };
        let parser = FieldParser::new(&schema).unwrap();
        let record = parser.parse("holder: Jane\npolicy # : P-77\nName: ignored");

        assert_eq!(record.keys().collect::<Vec<_>>(), vec!["Policy #", "Holder"]);
        assert_eq!(record.value("Policy #"), Some("P-77"));
        assert_eq!(record.value("Holder"), Some("Jane"));
    }

    #[test]
    fn test_invalid_schema_rejected() {
        let schema = FieldSchema {
            labels: vec!["Name".to_string(), " ".to_string()],
            identifier: "Name".to_string(),
        };
        assert!(FieldParser::new(&schema).is_err());
    }
}

//! Data models for records, reports and configuration.

pub mod config;
pub mod field_map;
pub mod record;
pub mod report;

pub use config::{BatchConfig, FieldSchema, OcrConfig, ReferenceConfig, VerifyConfig};
pub use field_map::FieldMap;
pub use record::{ComparisonResult, FieldMismatch, ReferenceRecord, StructuredRecord};
pub use report::{ComparisonStage, FileReport, ReportStatus};

//! Core library for verifying uploaded documents against reference records.
//!
//! This crate provides:
//! - Text extraction from images (OCR.space), PDFs and DOCX files
//! - Label-based field parsing of the extracted text
//! - Identifier-keyed reference records
//! - Field-by-field comparison with an accuracy score
//! - A verifier that runs the whole pipeline per file or per batch

pub mod compare;
pub mod error;
pub mod extract;
pub mod fields;
pub mod models;
pub mod reference;
pub mod verifier;

pub use compare::{Comparator, compare};
pub use error::{
    ConfigError, DocxError, ExtractionError, OcrError, PdfError, ReferenceError, Result,
    VerifyError,
};
pub use extract::{DocumentKind, OcrBackend, OcrSpaceClient, TextExtractor};
pub use fields::{FieldParser, parse_fields};
pub use models::{
    ComparisonResult, ComparisonStage, FieldMap, FieldMismatch, FieldSchema, FileReport,
    ReferenceRecord, ReportStatus, StructuredRecord, VerifyConfig,
};
pub use reference::{ReferenceLookup, ReferenceStore};
pub use verifier::{Upload, Verifier};

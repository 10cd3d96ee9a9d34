//! Per-file verification: extract, parse, look up, compare.

use std::io;
use std::path::Path;
use std::time::Instant;

use chrono::Utc;
use futures_util::stream::{self, Stream, StreamExt};
use tracing::{debug, info, warn};

use crate::compare::Comparator;
use crate::error::ConfigError;
use crate::extract::{DocumentKind, OcrBackend, TextExtractor};
use crate::fields::FieldParser;
use crate::models::config::FieldSchema;
use crate::models::record::StructuredRecord;
use crate::models::report::{ComparisonStage, FileReport};
use crate::reference::ReferenceLookup;

/// An uploaded file held in memory.
#[derive(Debug, Clone)]
pub struct Upload {
    /// Name the file was uploaded under; its extension selects the backend.
    pub filename: String,
    /// File contents.
    pub data: Vec<u8>,
}

impl Upload {
    /// Create an upload from a name and contents.
    pub fn new(filename: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            data,
        }
    }

    /// Read a file from disk, named after its final path component.
    pub fn from_path(path: &Path) -> io::Result<Self> {
        let data = std::fs::read(path)?;
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self { filename, data })
    }
}

/// Runs the verification pipeline for uploaded files.
///
/// Holds no per-file state, so files can be verified concurrently through a
/// shared reference.
pub struct Verifier<O, R> {
    extractor: TextExtractor<O>,
    parser: FieldParser,
    comparator: Comparator,
    references: R,
}

impl<O: OcrBackend, R: ReferenceLookup> Verifier<O, R> {
    /// Create a verifier for the given schema.
    pub fn new(ocr: O, references: R, schema: &FieldSchema) -> Result<Self, ConfigError> {
        Ok(Self {
            extractor: TextExtractor::new(ocr),
            parser: FieldParser::new(schema)?,
            comparator: Comparator::from_schema(schema),
            references,
        })
    }

    /// The field parser.
    pub fn parser(&self) -> &FieldParser {
        &self.parser
    }

    /// The comparator.
    pub fn comparator(&self) -> &Comparator {
        &self.comparator
    }

    /// The reference data.
    pub fn references(&self) -> &R {
        &self.references
    }

    /// Verify one upload. Every failure is recorded in the report.
    pub async fn verify(&self, upload: &Upload) -> FileReport {
        if upload.filename.is_empty() {
            return FileReport::failed("", "No selected file");
        }

        let start = Instant::now();
        let filename = upload.filename.as_str();
        let kind = DocumentKind::from_filename(filename);

        let (extracted_text, extraction_error, structured_data, comparison) =
            match self.extractor.extract(&upload.data, filename).await {
                Ok(text) => {
                    let record = self.parser.parse(&text);
                    let comparison = self.compare_record(&record);
                    (Some(text), None, Some(record), comparison)
                }
                Err(e) => {
                    warn!("Extraction failed for {}: {}", filename, e);
                    (None, Some(e.to_string()), None, ComparisonStage::Skipped)
                }
            };

        let report = FileReport {
            filename: filename.to_string(),
            kind,
            processed_at: Utc::now(),
            processing_time_ms: start.elapsed().as_millis() as u64,
            extracted_text,
            extraction_error,
            structured_data,
            comparison,
        };

        info!(
            "Verified {}: {} in {}ms",
            report.filename,
            report.status(),
            report.processing_time_ms
        );
        report
    }

    /// Verify uploads with at most `concurrency` in flight, yielding reports
    /// in input order.
    pub fn verify_stream<'a>(
        &'a self,
        uploads: &'a [Upload],
        concurrency: usize,
    ) -> impl Stream<Item = FileReport> + 'a {
        stream::iter(uploads)
            .map(move |upload| self.verify(upload))
            .buffered(concurrency.max(1))
    }

    /// Verify a batch of uploads; one file's failure never affects another.
    pub async fn verify_batch(&self, uploads: &[Upload], concurrency: usize) -> Vec<FileReport> {
        self.verify_stream(uploads, concurrency).collect().await
    }

    fn compare_record(&self, record: &StructuredRecord) -> ComparisonStage {
        let identifier_field = self.comparator.identifier();

        match record.value(identifier_field) {
            Some(identifier) if !identifier.is_empty() => {
                let reference = self.references.lookup(identifier);
                debug!(
                    "{} {:?} reference record {}",
                    identifier_field,
                    identifier,
                    if reference.is_some() { "found" } else { "not found" }
                );
                ComparisonStage::Completed(self.comparator.compare(record, reference))
            }
            _ => ComparisonStage::IdentifierMissing {
                error: self.comparator.missing_identifier_message(),
            },
        }
    }
}

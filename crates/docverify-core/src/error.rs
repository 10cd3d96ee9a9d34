//! Error types for the docverify-core library.

use thiserror::Error;

/// Main error type for the docverify library.
#[derive(Error, Debug)]
pub enum VerifyError {
    /// Text extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Reference data error.
    #[error("reference data error: {0}")]
    Reference(#[from] ReferenceError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Why a document produced no usable text.
///
/// The messages keep the wording users of the upload form already know, so
/// reports read the same whichever backend failed.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// The filename extension is not one of the known formats.
    #[error("Unsupported file format.")]
    UnsupportedFormat {
        /// Lower-cased extension, empty when the filename had none.
        extension: String,
    },

    /// PDF text extraction failed.
    #[error("Error extracting text from PDF: {0}")]
    Pdf(#[from] PdfError),

    /// DOCX text extraction failed.
    #[error("Error extracting text from DOCX: {0}")]
    Docx(#[from] DocxError),

    /// OCR backend failed.
    #[error(transparent)]
    Ocr(#[from] OcrError),

    /// The backend succeeded but returned only whitespace.
    #[error("Error: no text could be extracted from the document.")]
    EmptyText,
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,
}

/// Errors related to DOCX processing.
#[derive(Error, Debug)]
pub enum DocxError {
    /// The file is not a readable ZIP archive.
    #[error("invalid archive: {0}")]
    Archive(String),

    /// The archive has no `word/document.xml` part.
    #[error("missing word/document.xml")]
    MissingDocument,

    /// The document part is not well-formed XML.
    #[error("malformed document XML: {0}")]
    Xml(String),
}

/// Errors related to the OCR backend.
#[derive(Error, Debug)]
pub enum OcrError {
    /// The HTTP request could not be completed.
    #[error("Error connecting to OCR Space API: {0}")]
    Connection(String),

    /// The API processed the request and reported a failure.
    #[error("OCR Space API Error: {0}")]
    Api(String),

    /// The API answered but found no text.
    #[error("Error during OCR processing: no text found in image")]
    NoText,

    /// The image could not be decoded or re-encoded for upload.
    #[error("Error during OCR processing: invalid image: {0}")]
    InvalidImage(String),

    /// The API response could not be decoded.
    #[error("Error during OCR processing: {0}")]
    Response(String),
}

impl From<reqwest::Error> for OcrError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            OcrError::Response(err.to_string())
        } else {
            OcrError::Connection(err.to_string())
        }
    }
}

/// Errors related to configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read or write the configuration file.
    #[error("failed to access config file: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration file is not valid JSON for this schema.
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    /// The field schema cannot be used for parsing.
    #[error("invalid field schema: {0}")]
    InvalidSchema(String),
}

/// Errors related to loading reference records.
#[derive(Error, Debug)]
pub enum ReferenceError {
    /// Failed to read the reference file.
    #[error("failed to read reference file: {0}")]
    Io(#[from] std::io::Error),

    /// The reference file is not a JSON object of records.
    #[error("failed to parse reference data: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Result type for the docverify library.
pub type Result<T> = std::result::Result<T, VerifyError>;

//! Text extraction from uploaded documents.
//!
//! The backend is chosen from the filename extension:
//! - images go to an [`OcrBackend`]
//! - PDFs go through embedded text extraction
//! - DOCX files are read paragraph by paragraph

mod docx;
mod ocr;
mod pdf;

pub use docx::DocxTextExtractor;
pub use ocr::{ErrorMessage, OcrBackend, OcrSpaceClient, OcrSpaceResponse, ParsedResult};
pub use pdf::{PdfDocument, PdfTextExtractor};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ExtractionError;

/// Image extensions sent to the OCR backend.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "gif", "tiff"];

/// Document format, selected from the filename extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    /// Raster image, read with OCR.
    Image,
    /// PDF with embedded text.
    Pdf,
    /// Word document.
    Docx,
    /// Anything else.
    Unsupported,
}

impl DocumentKind {
    /// Classify a lower-cased extension.
    pub fn from_extension(extension: &str) -> Self {
        match extension {
            "pdf" => Self::Pdf,
            "docx" => Self::Docx,
            ext if IMAGE_EXTENSIONS.contains(&ext) => Self::Image,
            _ => Self::Unsupported,
        }
    }

    /// Classify a filename by its extension, ignoring case.
    pub fn from_filename(filename: &str) -> Self {
        Self::from_extension(&extension_of(filename))
    }

    /// Stable lower-case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Pdf => "pdf",
            Self::Docx => "docx",
            Self::Unsupported => "unsupported",
        }
    }
}

/// Lower-cased text after the last `.` of a filename, or an empty string.
pub fn extension_of(filename: &str) -> String {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .unwrap_or_default()
}

/// Trait for synchronous document-to-text backends.
pub trait DocumentTextExtractor {
    /// Extract the document's text.
    fn extract_text(&self, data: &[u8]) -> Result<String, ExtractionError>;
}

/// Dispatches documents to the matching text backend.
pub struct TextExtractor<O> {
    ocr: O,
    pdf: PdfTextExtractor,
    docx: DocxTextExtractor,
}

impl<O: OcrBackend> TextExtractor<O> {
    /// Create an extractor that sends images to `ocr`.
    pub fn new(ocr: O) -> Self {
        Self {
            ocr,
            pdf: PdfTextExtractor,
            docx: DocxTextExtractor,
        }
    }

    /// The OCR backend.
    pub fn ocr(&self) -> &O {
        &self.ocr
    }

    /// Extract trimmed text from a document.
    ///
    /// Never retries; a failed backend call is returned as is. Output that is
    /// empty after trimming is reported as [`ExtractionError::EmptyText`].
    pub async fn extract(&self, data: &[u8], filename: &str) -> Result<String, ExtractionError> {
        let extension = extension_of(filename);
        let kind = DocumentKind::from_extension(&extension);
        debug!("Extracting {} ({} bytes) as {:?}", filename, data.len(), kind);

        let text = match kind {
            DocumentKind::Image => self.ocr.recognize(data, filename).await?,
            DocumentKind::Pdf => self.pdf.extract_text(data)?,
            DocumentKind::Docx => self.docx.extract_text(data)?,
            DocumentKind::Unsupported => {
                return Err(ExtractionError::UnsupportedFormat { extension });
            }
        };

        let text = text.trim();
        if text.is_empty() {
            return Err(ExtractionError::EmptyText);
        }

        debug!("Extracted {} characters from {}", text.len(), filename);
        Ok(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OcrError;
    use pretty_assertions::assert_eq;
    use std::future::Future;

    struct FixedOcr(&'static str);

    impl OcrBackend for FixedOcr {
        fn recognize(
            &self,
            _image: &[u8],
            _filename: &str,
        ) -> impl Future<Output = Result<String, OcrError>> {
            let text = self.0.to_string();
            async move { Ok(text) }
        }
    }

    #[test]
    fn test_document_kind_from_filename() {
        assert_eq!(DocumentKind::from_filename("scan.PNG"), DocumentKind::Image);
        assert_eq!(DocumentKind::from_filename("photo.jpeg"), DocumentKind::Image);
        assert_eq!(DocumentKind::from_filename("page.Tiff"), DocumentKind::Image);
        assert_eq!(DocumentKind::from_filename("form.pdf"), DocumentKind::Pdf);
        assert_eq!(DocumentKind::from_filename("my.form.DOCX"), DocumentKind::Docx);
        assert_eq!(DocumentKind::from_filename("notes.txt"), DocumentKind::Unsupported);
        assert_eq!(DocumentKind::from_filename("README"), DocumentKind::Unsupported);
        assert_eq!(DocumentKind::from_filename("legacy.doc"), DocumentKind::Unsupported);
    }

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of("a.b.PDF"), "pdf");
        assert_eq!(extension_of("noext"), "");
        assert_eq!(extension_of("trailing."), "");
    }

    #[tokio::test]
    async fn test_unsupported_format_message() {
        let extractor = TextExtractor::new(FixedOcr("unused"));
        let err = extractor.extract(b"hello", "notes.txt").await.unwrap_err();
        assert_eq!(err.to_string(), "Unsupported file format.");
        assert!(matches!(
            err,
            ExtractionError::UnsupportedFormat { ref extension } if extension == "txt"
        ));
    }

    #[tokio::test]
    async fn test_image_text_is_trimmed() {
        let extractor = TextExtractor::new(FixedOcr("  \nName: Alice\n  "));
        let text = extractor.extract(b"\x89PNG", "scan.png").await.unwrap();
        assert_eq!(text, "Name: Alice");
    }

    #[tokio::test]
    async fn test_blank_text_is_an_error() {
        let extractor = TextExtractor::new(FixedOcr(" \r\n "));
        let err = extractor.extract(b"\x89PNG", "scan.png").await.unwrap_err();
        assert!(matches!(err, ExtractionError::EmptyText));
    }

    #[tokio::test]
    async fn test_malformed_pdf_is_an_error() {
        let extractor = TextExtractor::new(FixedOcr("unused"));
        let err = extractor.extract(b"not a pdf", "form.pdf").await.unwrap_err();
        assert!(matches!(err, ExtractionError::Pdf(_)));
        assert!(err.to_string().starts_with("Error extracting text from PDF: "));
    }
}

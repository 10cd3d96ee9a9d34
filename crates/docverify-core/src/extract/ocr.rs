//! OCR backend trait and the OCR.space HTTP client.

use std::borrow::Cow;
use std::future::Future;
use std::io::Cursor;
use std::sync::OnceLock;
use std::time::Duration;

use image::{DynamicImage, GenericImageView, ImageFormat, imageops::FilterType};
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use tracing::{debug, warn};

use super::extension_of;
use crate::error::OcrError;
use crate::models::config::{OcrConfig, resolve_api_key};

/// Trait for services that read text from images.
pub trait OcrBackend {
    /// Recognize the text in an encoded image.
    ///
    /// `filename` is the upload's name; backends may use its extension to
    /// tell the image format.
    fn recognize(
        &self,
        image: &[u8],
        filename: &str,
    ) -> impl Future<Output = Result<String, OcrError>>;
}

/// Client for the OCR.space `parse/image` endpoint.
pub struct OcrSpaceClient {
    client: reqwest::Client,
    api_url: String,
    configured_key: Option<String>,
    api_key: OnceLock<String>,
    language: String,
    max_upload_bytes: usize,
    max_image_dimension: u32,
}

impl OcrSpaceClient {
    /// Create a client from configuration.
    pub fn new(config: &OcrConfig) -> Result<Self, OcrError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("docverify/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            configured_key: config.api_key.clone(),
            api_key: OnceLock::new(),
            language: config.language.clone(),
            max_upload_bytes: config.max_upload_bytes,
            max_image_dimension: config.max_image_dimension,
        })
    }

    /// Endpoint this client posts to.
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// API key, resolved on the first upload.
    fn api_key(&self) -> &str {
        self.api_key
            .get_or_init(|| resolve_api_key(self.configured_key.as_deref()))
    }
}

impl OcrBackend for OcrSpaceClient {
    async fn recognize(&self, image: &[u8], filename: &str) -> Result<String, OcrError> {
        let (bytes, upload_name) = prepare_upload(
            image,
            filename,
            self.max_upload_bytes,
            self.max_image_dimension,
        )?;

        let part = Part::bytes(bytes.into_owned())
            .file_name(upload_name.clone())
            .mime_str(mime_type(&upload_name))?;

        let form = Form::new()
            .text("apikey", self.api_key().to_string())
            .text("language", self.language.clone())
            .part("file", part);

        debug!("Posting {} to {}", upload_name, self.api_url);

        let response = self
            .client
            .post(&self.api_url)
            .multipart(form)
            .send()
            .await?
            .error_for_status()?;

        let body: OcrSpaceResponse = response.json().await?;
        body.into_text()
    }
}

/// Shrink an image that exceeds the upload limit.
///
/// Small images are passed through untouched. Larger ones are decoded,
/// fitted within `max_dimension` and re-encoded as JPEG.
fn prepare_upload<'a>(
    image: &'a [u8],
    filename: &str,
    max_bytes: usize,
    max_dimension: u32,
) -> Result<(Cow<'a, [u8]>, String), OcrError> {
    if image.len() <= max_bytes {
        return Ok((Cow::Borrowed(image), filename.to_string()));
    }

    let decoded =
        image::load_from_memory(image).map_err(|e| OcrError::InvalidImage(e.to_string()))?;
    let (width, height) = decoded.dimensions();

    let resized = if width.max(height) > max_dimension {
        decoded.resize(max_dimension, max_dimension, FilterType::Lanczos3)
    } else {
        decoded
    };

    // JPEG has no alpha channel
    let rgb = DynamicImage::ImageRgb8(resized.to_rgb8());
    let mut encoded = Vec::new();
    rgb.write_to(&mut Cursor::new(&mut encoded), ImageFormat::Jpeg)
        .map_err(|e| OcrError::InvalidImage(e.to_string()))?;

    debug!(
        "Downscaled {} from {}x{} ({} bytes) to {}x{} ({} bytes)",
        filename,
        width,
        height,
        image.len(),
        rgb.width(),
        rgb.height(),
        encoded.len()
    );
    if encoded.len() > max_bytes {
        warn!(
            "{} is still {} bytes after downscaling, the OCR service may reject it",
            filename,
            encoded.len()
        );
    }

    let stem = filename
        .rsplit_once('.')
        .map(|(stem, _)| stem)
        .unwrap_or(filename);
    Ok((Cow::Owned(encoded), format!("{stem}.jpg")))
}

fn mime_type(filename: &str) -> &'static str {
    match extension_of(filename).as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "bmp" => "image/bmp",
        "gif" => "image/gif",
        "tiff" => "image/tiff",
        _ => "application/octet-stream",
    }
}

/// OCR.space JSON response.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OcrSpaceResponse {
    /// One entry per page/image.
    #[serde(default)]
    pub parsed_results: Option<Vec<ParsedResult>>,

    /// Whether the request as a whole failed.
    #[serde(default)]
    pub is_errored_on_processing: bool,

    /// Failure description.
    #[serde(default)]
    pub error_message: Option<ErrorMessage>,
}

/// Text recognized on one page.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ParsedResult {
    /// Recognized text, lines separated by `\r\n`.
    #[serde(default)]
    pub parsed_text: String,

    /// Page-level failure description.
    #[serde(default)]
    pub error_message: Option<ErrorMessage>,
}

/// OCR.space reports errors either as a string or a list of strings.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ErrorMessage {
    /// Single message.
    One(String),
    /// Several messages.
    Many(Vec<String>),
}

impl ErrorMessage {
    /// All messages joined with `"; "`.
    pub fn joined(&self) -> String {
        match self {
            Self::One(message) => message.trim().to_string(),
            Self::Many(messages) => messages
                .iter()
                .map(|m| m.trim())
                .filter(|m| !m.is_empty())
                .collect::<Vec<_>>()
                .join("; "),
        }
    }
}

impl OcrSpaceResponse {
    /// Turn the response into recognized text or an error.
    pub fn into_text(self) -> Result<String, OcrError> {
        if self.is_errored_on_processing {
            let message = self
                .error_message
                .map(|m| m.joined())
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| "Unknown error from OCR Space API.".to_string());
            return Err(OcrError::Api(message));
        }

        let pages: Vec<String> = self
            .parsed_results
            .unwrap_or_default()
            .into_iter()
            .map(|result| result.parsed_text.replace("\r\n", "\n"))
            .filter(|text| !text.trim().is_empty())
            .collect();

        if pages.is_empty() {
            return Err(OcrError::NoText);
        }

        Ok(pages.join("\n").trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgba};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_api_key_resolved_on_first_use() {
        let config = OcrConfig {
            api_key: Some("configured-key".to_string()),
            ..OcrConfig::default()
        };
        let client = OcrSpaceClient::new(&config).unwrap();
        assert!(client.api_key.get().is_none());

        let key = client.api_key().to_string();
        assert!(!key.is_empty());
        assert_eq!(client.api_key.get().map(String::as_str), Some(key.as_str()));
    }

    #[test]
    fn test_successful_response() {
        let json = r#"{
            "ParsedResults": [{
                "TextOverlay": {"Lines": [], "HasOverlay": false, "Message": ""},
                "FileParseExitCode": 1,
                "ParsedText": "Sr no.: S002\r\nName: John Doe\r\n",
                "ErrorMessage": "",
                "ErrorDetails": ""
            }],
            "OCRExitCode": 1,
            "IsErroredOnProcessing": false,
            "ProcessingTimeInMilliseconds": "343"
        }"#;
        let response: OcrSpaceResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.into_text().unwrap(), "Sr no.: S002\nName: John Doe");
    }

    #[test]
    fn test_error_message_list() {
        let json = r#"{
            "OCRExitCode": 99,
            "IsErroredOnProcessing": true,
            "ErrorMessage": ["Unable to recognize the file type", "E216:Unable to detect the file extension"]
        }"#;
        let response: OcrSpaceResponse = serde_json::from_str(json).unwrap();
        let err = response.into_text().unwrap_err();
        assert_eq!(
            err.to_string(),
            "OCR Space API Error: Unable to recognize the file type; E216:Unable to detect the file extension"
        );
    }

    #[test]
    fn test_error_without_message() {
        let json = r#"{"IsErroredOnProcessing": true, "ErrorMessage": null}"#;
        let response: OcrSpaceResponse = serde_json::from_str(json).unwrap();
        let err = response.into_text().unwrap_err();
        assert_eq!(
            err.to_string(),
            "OCR Space API Error: Unknown error from OCR Space API."
        );
    }

    #[test]
    fn test_no_parsed_results() {
        let response: OcrSpaceResponse =
            serde_json::from_str(r#"{"IsErroredOnProcessing": false}"#).unwrap();
        assert!(matches!(response.into_text(), Err(OcrError::NoText)));

        let response: OcrSpaceResponse = serde_json::from_str(
            r#"{"IsErroredOnProcessing": false, "ParsedResults": [{"ParsedText": " \r\n"}]}"#,
        )
        .unwrap();
        assert!(matches!(response.into_text(), Err(OcrError::NoText)));
    }

    fn encoded_png(width: u32, height: u32) -> Vec<u8> {
        let buffer = ImageBuffer::from_fn(width, height, |x, y| {
            Rgba([(x * 7 % 256) as u8, (y * 13 % 256) as u8, ((x ^ y) % 256) as u8, 200])
        });
        let mut data = Vec::new();
        DynamicImage::ImageRgba8(buffer)
            .write_to(&mut Cursor::new(&mut data), ImageFormat::Png)
            .unwrap();
        data
    }

    #[test]
    fn test_small_image_passes_through() {
        let png = encoded_png(8, 8);
        let (bytes, name) = prepare_upload(&png, "scan.png", png.len(), 2048).unwrap();
        assert!(matches!(bytes, Cow::Borrowed(_)));
        assert_eq!(name, "scan.png");
    }

    #[test]
    fn test_large_image_is_downscaled() {
        let png = encoded_png(400, 200);
        let (bytes, name) = prepare_upload(&png, "scan.final.png", 16, 100).unwrap();
        assert_eq!(name, "scan.final.jpg");

        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!(decoded.dimensions(), (100, 50));
    }

    #[test]
    fn test_undecodable_large_image() {
        let err = prepare_upload(b"not an image at all", "scan.png", 4, 100).unwrap_err();
        assert!(matches!(err, OcrError::InvalidImage(_)));
    }

    #[test]
    fn test_mime_type() {
        assert_eq!(mime_type("a.JPG"), "image/jpeg");
        assert_eq!(mime_type("a.tiff"), "image/tiff");
        assert_eq!(mime_type("a"), "application/octet-stream");
    }
}

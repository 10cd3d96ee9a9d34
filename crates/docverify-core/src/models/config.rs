//! Configuration structures for the verification pipeline.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::error::ConfigError;

/// Environment variable that overrides `ocr.api_key`.
pub const OCR_API_KEY_ENV: &str = "OCR_SPACE_API_KEY";

/// Public OCR.space key for evaluation use, heavily rate limited.
pub const OCR_DEMO_API_KEY: &str = "helloworld";

/// Main configuration for the docverify pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VerifyConfig {
    /// Field labels to parse and the identifier field.
    pub fields: FieldSchema,

    /// OCR backend configuration.
    pub ocr: OcrConfig,

    /// Reference data configuration.
    pub reference: ReferenceConfig,

    /// Batch processing configuration.
    pub batch: BatchConfig,
}

/// Ordered field labels and the identifier used for reference lookups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldSchema {
    /// Field labels in parsing priority order.
    pub labels: Vec<String>,

    /// Label whose value keys the reference store.
    pub identifier: String,
}

impl Default for FieldSchema {
    fn default() -> Self {
        Self {
            labels: ["Sr no.", "Name", "City", "Age", "Country", "Address"]
                .into_iter()
                .map(String::from)
                .collect(),
            identifier: "Sr no.".to_string(),
        }
    }
}

impl FieldSchema {
    /// Check that the schema can drive the parser.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.labels.is_empty() {
            return Err(ConfigError::InvalidSchema("no field labels".to_string()));
        }

        let mut seen = HashSet::new();
        for label in &self.labels {
            if label.trim().is_empty() {
                return Err(ConfigError::InvalidSchema("empty field label".to_string()));
            }
            // Labels match case-insensitively, so "Name" and "NAME" would collide.
            if !seen.insert(label.to_lowercase()) {
                return Err(ConfigError::InvalidSchema(format!(
                    "duplicate field label: {label}"
                )));
            }
        }

        if !self.labels.contains(&self.identifier) {
            return Err(ConfigError::InvalidSchema(format!(
                "identifier {:?} is not one of the field labels",
                self.identifier
            )));
        }

        Ok(())
    }
}

/// OCR.space backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Endpoint for image uploads.
    pub api_url: String,

    /// API key (overridden by `OCR_SPACE_API_KEY`).
    pub api_key: Option<String>,

    /// OCR language code.
    pub language: String,

    /// Request timeout in seconds.
    pub timeout_secs: u64,

    /// Images above this size are downscaled before upload.
    pub max_upload_bytes: usize,

    /// Longest side, in pixels, of a downscaled image.
    pub max_image_dimension: u32,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.ocr.space/parse/image".to_string(),
            api_key: None,
            language: "eng".to_string(),
            timeout_secs: 120,
            max_upload_bytes: 1024 * 1024, // Free tier upload limit
            max_image_dimension: 2048,
        }
    }
}

/// Pick the OCR.space key: environment first, then `configured`, then the
/// demo key with a warning.
pub fn resolve_api_key(configured: Option<&str>) -> String {
    if let Ok(key) = std::env::var(OCR_API_KEY_ENV) {
        if !key.trim().is_empty() {
            return key;
        }
    }

    match configured {
        Some(key) if !key.trim().is_empty() => key.to_string(),
        _ => {
            warn!(
                "No OCR.space API key configured, using the public demo key. \
                 Set {} for production use.",
                OCR_API_KEY_ENV
            );
            OCR_DEMO_API_KEY.to_string()
        }
    }
}

/// Reference data configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferenceConfig {
    /// JSON file of reference records (built-in sample data when unset).
    pub path: Option<PathBuf>,
}

/// Batch processing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Files processed concurrently.
    pub jobs: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self { jobs: 4 }
    }
}

impl VerifyConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.fields.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

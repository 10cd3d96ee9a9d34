//! CLI subcommands and the setup they share.

pub mod batch;
pub mod config;
pub mod parse;
pub mod reference;
pub mod verify;

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use docverify_core::extract::OcrSpaceClient;
use docverify_core::models::config::VerifyConfig;
use docverify_core::reference::ReferenceStore;
use docverify_core::verifier::Verifier;

/// Verifier wired to OCR.space and an in-memory reference store.
pub type CliVerifier = Verifier<OcrSpaceClient, ReferenceStore>;

/// `<config dir>/docverify/config.json`.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("docverify")
        .join("config.json")
}

/// The `--config` path if given, otherwise the default location.
pub fn config_file_path(config_path: Option<&str>) -> PathBuf {
    config_path
        .map(PathBuf::from)
        .unwrap_or_else(default_config_path)
}

/// Load configuration.
///
/// An explicit path must exist. The default path is optional and falls back
/// to built-in defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<VerifyConfig> {
    if let Some(path) = config_path {
        return Ok(VerifyConfig::from_file(Path::new(path))?);
    }

    let path = default_config_path();
    if path.exists() {
        debug!("Loading config from {}", path.display());
        Ok(VerifyConfig::from_file(&path)?)
    } else {
        Ok(VerifyConfig::default())
    }
}

/// Load the reference store from `--reference`, the config, or the sample data.
pub fn load_references(
    config: &VerifyConfig,
    reference_path: Option<&Path>,
) -> anyhow::Result<ReferenceStore> {
    let store = match reference_path.or(config.reference.path.as_deref()) {
        Some(path) => ReferenceStore::from_file(path).map_err(|e| {
            anyhow::anyhow!("Failed to load reference data from {}: {}", path.display(), e)
        })?,
        None => {
            debug!("Using built-in sample reference data");
            ReferenceStore::builtin()?
        }
    };

    let inconsistent = store.inconsistent_ids(&config.fields.identifier);
    if !inconsistent.is_empty() {
        warn!(
            "Reference records whose {:?} value differs from their key: {}",
            config.fields.identifier,
            inconsistent.join(", ")
        );
    }

    Ok(store)
}

/// Build a verifier from configuration.
pub fn build_verifier(
    config: &VerifyConfig,
    reference_path: Option<&Path>,
) -> anyhow::Result<CliVerifier> {
    let references = load_references(config, reference_path)?;
    let ocr = OcrSpaceClient::new(&config.ocr)
        .map_err(|e| anyhow::anyhow!("Failed to create OCR client: {}", e))?;
    debug!("OCR endpoint: {}", ocr.api_url());

    Ok(Verifier::new(ocr, references, &config.fields)?)
}

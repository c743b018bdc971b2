use std::sync::Arc;

use async_trait::async_trait;
use basinq_core::{AppConfig, ExtractionMode};
use serde_json::Value;

use crate::client::{OpenAiVisionClient, VisionClientOptions};
use crate::error::VisionError;

const MOCK_STRUCTURES: &str = include_str!("../fixtures/mock_structures.json");

/// Media type assumed when the caller does not name one.
pub const DEFAULT_MEDIA_TYPE: &str = "image/jpeg";

/// A base64-encoded plan sheet image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanImage {
    pub base64: String,
    pub media_type: String,
}

impl PlanImage {
    #[must_use]
    pub fn new(base64: impl Into<String>, media_type: Option<&str>) -> Self {
        Self {
            base64: base64.into(),
            media_type: media_type
                .map(str::trim)
                .filter(|m| !m.is_empty())
                .unwrap_or(DEFAULT_MEDIA_TYPE)
                .to_owned(),
        }
    }

    /// `data:` URL for the image. Input that is already a data URL is passed
    /// through unchanged.
    #[must_use]
    pub fn data_url(&self) -> String {
        if self.base64.starts_with("data:") {
            self.base64.clone()
        } else {
            format!("data:{};base64,{}", self.media_type, self.base64)
        }
    }
}

/// Source of raw structure rows for the enrichment engine.
#[async_trait]
pub trait StructureExtractor: Send + Sync {
    /// Read structure rows from `image`. Rows are returned untyped; shaping
    /// and validation happen in the engine.
    async fn extract(&self, image: Option<&PlanImage>) -> Result<Vec<Value>, VisionError>;

    fn mode(&self) -> ExtractionMode;
}

#[async_trait]
impl StructureExtractor for OpenAiVisionClient {
    async fn extract(&self, image: Option<&PlanImage>) -> Result<Vec<Value>, VisionError> {
        let image = image.ok_or(VisionError::MissingImage)?;
        self.extract_structures(image).await
    }

    fn mode(&self) -> ExtractionMode {
        ExtractionMode::Live
    }
}

/// Returns the same canned take-off for every call, with or without an image.
#[derive(Debug, Clone)]
pub struct FixtureExtractor {
    records: Vec<Value>,
}

impl FixtureExtractor {
    /// The four-structure sample take-off shipped with the crate.
    ///
    /// # Errors
    ///
    /// Returns [`VisionError::Deserialize`] only if the embedded fixture is corrupt.
    pub fn builtin() -> Result<Self, VisionError> {
        let records =
            serde_json::from_str(MOCK_STRUCTURES).map_err(|source| VisionError::Deserialize {
                context: "mock structure fixture".to_owned(),
                source,
            })?;
        Ok(Self { records })
    }

    #[must_use]
    pub fn with_records(records: Vec<Value>) -> Self {
        Self { records }
    }
}

#[async_trait]
impl StructureExtractor for FixtureExtractor {
    async fn extract(&self, _image: Option<&PlanImage>) -> Result<Vec<Value>, VisionError> {
        tracing::info!(count = self.records.len(), "using mock structure fixture");
        Ok(self.records.clone())
    }

    fn mode(&self) -> ExtractionMode {
        ExtractionMode::Mock
    }
}

/// Build the extractor selected by `config.extraction_mode`.
///
/// # Errors
///
/// Returns [`VisionError::MissingApiKey`] in live mode without a key, or
/// [`VisionError::Http`] if the HTTP client cannot be constructed.
pub fn build_extractor(config: &AppConfig) -> Result<Arc<dyn StructureExtractor>, VisionError> {
    match config.extraction_mode {
        ExtractionMode::Mock => Ok(Arc::new(FixtureExtractor::builtin()?)),
        ExtractionMode::Live => {
            let api_key = config
                .openai_api_key
                .as_deref()
                .ok_or(VisionError::MissingApiKey)?;
            let client = OpenAiVisionClient::with_base_url(
                api_key,
                &config.vision_base_url,
                VisionClientOptions::from_config(config),
            )?;
            Ok(Arc::new(client))
        }
    }
}

use std::net::SocketAddr;
use std::path::PathBuf;

use serde::Serialize;

use crate::enrich::{EnrichOptions, NonPositiveHeightPolicy};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Where structure records come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionMode {
    /// Call the vision model with the uploaded plan image.
    Live,
    /// Return the canned fixture records; no network access.
    Mock,
}

impl std::fmt::Display for ExtractionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExtractionMode::Live => write!(f, "live"),
            ExtractionMode::Mock => write!(f, "mock"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    /// Catalog YAML override. `None` selects the built-in catalog.
    pub catalog_path: Option<PathBuf>,
    pub extraction_mode: ExtractionMode,
    pub openai_api_key: Option<String>,
    pub vision_base_url: String,
    pub vision_model: String,
    pub vision_max_tokens: u32,
    pub vision_timeout_secs: u64,
    pub vision_max_retries: u32,
    pub vision_backoff_base_ms: u64,
    pub non_positive_height: NonPositiveHeightPolicy,
    pub max_upload_bytes: usize,
    /// Bearer tokens accepted by the HTTP API.
    pub api_keys: Vec<String>,
}

impl AppConfig {
    #[must_use]
    pub fn enrich_options(&self) -> EnrichOptions {
        EnrichOptions {
            non_positive_height: self.non_positive_height,
        }
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("catalog_path", &self.catalog_path)
            .field("extraction_mode", &self.extraction_mode)
            .field(
                "openai_api_key",
                &self.openai_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("vision_base_url", &self.vision_base_url)
            .field("vision_model", &self.vision_model)
            .field("vision_max_tokens", &self.vision_max_tokens)
            .field("vision_timeout_secs", &self.vision_timeout_secs)
            .field("vision_max_retries", &self.vision_max_retries)
            .field("vision_backoff_base_ms", &self.vision_backoff_base_ms)
            .field("non_positive_height", &self.non_positive_height)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .field("api_keys", &format!("[{} redacted]", self.api_keys.len()))
            .finish()
    }
}

use std::time::Duration;

use basinq_core::AppConfig;
use reqwest::Client;
use serde_json::Value;

use crate::error::VisionError;
use crate::extractor::PlanImage;
use crate::parse::extract_structures;
use crate::prompt::{EXTRACTION_PROMPT, SYSTEM_PROMPT};
use crate::retry::retry_with_backoff;
use crate::types::{
    ChatCompletionRequest, ChatCompletionResponse, ChatMessage, ContentPart, ImageUrl,
    MessageContent,
};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";

/// Upstream error bodies are truncated to this many bytes in errors and logs.
const MAX_ERROR_BODY_BYTES: usize = 512;

/// Tuning knobs for [`OpenAiVisionClient`].
#[derive(Debug, Clone)]
pub struct VisionClientOptions {
    pub model: String,
    pub max_tokens: u32,
    pub timeout_secs: u64,
    /// Additional attempts after the first failure on transient errors.
    pub max_retries: u32,
    /// Base delay for exponential back-off: `backoff_base_ms * 2^(n-1)`.
    pub backoff_base_ms: u64,
}

impl Default for VisionClientOptions {
    fn default() -> Self {
        Self {
            model: "gpt-4o".to_string(),
            max_tokens: 1500,
            timeout_secs: 60,
            max_retries: 2,
            backoff_base_ms: 1000,
        }
    }
}

impl VisionClientOptions {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            model: config.vision_model.clone(),
            max_tokens: config.vision_max_tokens,
            timeout_secs: config.vision_timeout_secs,
            max_retries: config.vision_max_retries,
            backoff_base_ms: config.vision_backoff_base_ms,
        }
    }
}

/// Client for an OpenAI-compatible chat completions endpoint with image input.
///
/// Sends one plan image per call and returns the structure rows the model
/// read from it, still untyped. Transient failures (429, 5xx, network) are
/// retried with jittered exponential back-off.
pub struct OpenAiVisionClient {
    client: Client,
    api_key: String,
    endpoint: String,
    options: VisionClientOptions,
}

impl std::fmt::Debug for OpenAiVisionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiVisionClient")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"[redacted]")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl OpenAiVisionClient {
    /// Creates a client against the public API.
    ///
    /// # Errors
    ///
    /// Returns [`VisionError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(api_key: &str, options: VisionClientOptions) -> Result<Self, VisionError> {
        Self::with_base_url(api_key, DEFAULT_BASE_URL, options)
    }

    /// Creates a client against `base_url`, e.g. a proxy or a test server.
    ///
    /// # Errors
    ///
    /// Returns [`VisionError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn with_base_url(
        api_key: &str,
        base_url: &str,
        options: VisionClientOptions,
    ) -> Result<Self, VisionError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(options.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(concat!("basinq/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            endpoint: format!("{}/v1/chat/completions", base_url.trim_end_matches('/')),
            options,
        })
    }

    /// Ask the model to read the structure table in `image`.
    ///
    /// # Errors
    ///
    /// - [`VisionError::RateLimited`] on HTTP 429 after all retries.
    /// - [`VisionError::UnexpectedStatus`] on any other non-2xx status.
    /// - [`VisionError::Http`] on network failure after all retries.
    /// - [`VisionError::Deserialize`] if the envelope is not a chat completion.
    /// - [`VisionError::EmptyResponse`] / [`VisionError::MalformedResponse`]
    ///   if the model's reply holds no structure list.
    pub async fn extract_structures(&self, image: &PlanImage) -> Result<Vec<Value>, VisionError> {
        let data_url = image.data_url();
        let request = ChatCompletionRequest {
            model: &self.options.model,
            max_tokens: self.options.max_tokens,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: MessageContent::Text(SYSTEM_PROMPT),
                },
                ChatMessage {
                    role: "user",
                    content: MessageContent::Parts(vec![
                        ContentPart::ImageUrl {
                            image_url: ImageUrl { url: data_url },
                        },
                        ContentPart::Text {
                            text: EXTRACTION_PROMPT,
                        },
                    ]),
                },
            ],
        };

        let request = &request;
        let content = retry_with_backoff(
            self.options.max_retries,
            self.options.backoff_base_ms,
            || self.send(request),
        )
        .await?;

        tracing::debug!(reply_len = content.len(), "vision model replied");
        let structures = extract_structures(&content)?;
        tracing::info!(
            model = %self.options.model,
            count = structures.len(),
            "extracted structure rows from plan image"
        );
        Ok(structures)
    }

    async fn send(&self, request: &ChatCompletionRequest<'_>) -> Result<String, VisionError> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await?;
        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(60);
            return Err(VisionError::RateLimited { retry_after_secs });
        }

        if !status.is_success() {
            let mut body = response.text().await.unwrap_or_default();
            truncate_on_char_boundary(&mut body, MAX_ERROR_BODY_BYTES);
            return Err(VisionError::UnexpectedStatus {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        let envelope: ChatCompletionResponse =
            serde_json::from_slice(&bytes).map_err(|source| VisionError::Deserialize {
                context: "chat completion response".to_owned(),
                source,
            })?;

        envelope
            .into_first_content()
            .filter(|content| !content.trim().is_empty())
            .ok_or(VisionError::EmptyResponse)
    }
}

fn truncate_on_char_boundary(text: &mut String, max_bytes: usize) {
    if text.len() <= max_bytes {
        return;
    }
    let mut end = max_bytes;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    text.truncate(end);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_base_url_without_double_slash() {
        let client = OpenAiVisionClient::with_base_url(
            "sk-test",
            "http://localhost:9000/",
            VisionClientOptions::default(),
        )
        .unwrap();
        assert_eq!(client.endpoint, "http://localhost:9000/v1/chat/completions");
    }

    #[test]
    fn debug_output_hides_api_key() {
        let client = OpenAiVisionClient::new("sk-secret", VisionClientOptions::default()).unwrap();
        let rendered = format!("{client:?}");
        assert!(!rendered.contains("sk-secret"));
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        let mut text = "ab\u{e9}cd".to_string();
        truncate_on_char_boundary(&mut text, 3);
        assert_eq!(text, "ab");
    }
}

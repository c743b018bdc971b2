use thiserror::Error;

#[derive(Debug, Error)]
pub enum VisionError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("a plan image is required for live extraction")]
    MissingImage,

    #[error("no vision API key configured")]
    MissingApiKey,

    #[error("rate limited by vision API (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("unexpected HTTP status {status} from vision API: {body}")]
    UnexpectedStatus { status: u16, body: String },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("vision model returned no content")]
    EmptyResponse,

    #[error("vision model reply is not a structure list: {reason}")]
    MalformedResponse { reason: String },
}

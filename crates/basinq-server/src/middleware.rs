use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use axum::{
    extract::{Request, State},
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, StatusCode,
    },
    middleware::Next,
    response::{IntoResponse, Response},
};
use basinq_core::{AppConfig, Environment};
use subtle::ConstantTimeEq;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::api::ApiError;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Newtype wrapping a request ID string, stored as a request extension.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// API key auth settings used by middleware.
#[derive(Clone)]
pub struct AuthState {
    api_keys: Arc<Vec<String>>,
    pub enabled: bool,
}

impl std::fmt::Debug for AuthState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthState")
            .field("api_keys", &format!("[{} redacted]", self.api_keys.len()))
            .field("enabled", &self.enabled)
            .finish()
    }
}

impl AuthState {
    /// Builds auth config from `BASINQ_API_KEYS` as parsed into `config`.
    ///
    /// # Errors
    ///
    /// Fails outside development when no keys are configured.
    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        Self::from_keys(
            config.api_keys.clone(),
            matches!(config.env, Environment::Development),
        )
    }

    /// In development, an empty key list disables auth for local iteration.
    /// In other environments it fails startup.
    ///
    /// # Errors
    ///
    /// Fails when `keys` is empty and `is_development` is false.
    pub fn from_keys(keys: Vec<String>, is_development: bool) -> anyhow::Result<Self> {
        let keys: Vec<String> = keys
            .into_iter()
            .map(|k| k.trim().to_owned())
            .filter(|k| !k.is_empty())
            .collect();

        if keys.is_empty() {
            if is_development {
                tracing::warn!(
                    "BASINQ_API_KEYS not set; bearer auth disabled in development environment"
                );
                return Ok(Self {
                    api_keys: Arc::new(Vec::new()),
                    enabled: false,
                });
            }

            anyhow::bail!(
                "BASINQ_API_KEYS is required outside development; provide comma-separated bearer tokens"
            );
        }

        Ok(Self {
            api_keys: Arc::new(keys),
            enabled: true,
        })
    }

    /// Constant-time comparison against every configured key.
    fn allows(&self, token: &str) -> bool {
        self.api_keys.iter().fold(false, |matched, key| {
            matched | bool::from(key.as_bytes().ct_eq(token.as_bytes()))
        })
    }
}

/// Shared fixed-window request budget for the protected routes.
#[derive(Debug, Clone)]
pub struct RateLimitState {
    max_requests: usize,
    window: Duration,
    budget: Arc<Mutex<(Instant, usize)>>,
}

impl RateLimitState {
    #[must_use]
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            budget: Arc::new(Mutex::new((Instant::now(), 0))),
        }
    }

    /// Takes one request from the current window. `false` once it is spent.
    async fn try_acquire(&self) -> bool {
        let mut budget = self.budget.lock().await;
        let (opened_at, used) = &mut *budget;
        if opened_at.elapsed() >= self.window {
            *opened_at = Instant::now();
            *used = 0;
        }
        if *used >= self.max_requests {
            return false;
        }
        *used += 1;
        true
    }
}

fn current_request_id(req: &Request) -> String {
    req.extensions()
        .get::<RequestId>()
        .map(|id| id.0.clone())
        .unwrap_or_default()
}

/// Tags every request with an id: the caller's `x-request-id` when present,
/// otherwise a fresh `UUIDv4`. Handlers read it as [`RequestId`]; the
/// response echoes it back.
pub async fn request_id(mut req: Request, next: Next) -> Response {
    let id = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map_or_else(|| Uuid::new_v4().to_string(), str::to_owned);
    req.extensions_mut().insert(RequestId(id.clone()));

    let mut res = next.run(req).await;
    if let Ok(value) = HeaderValue::from_str(&id) {
        res.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    res
}

/// Rejects protected requests without a configured bearer token.
pub async fn require_bearer_auth(
    State(auth): State<AuthState>,
    req: Request,
    next: Next,
) -> Response {
    if !auth.enabled {
        return next.run(req).await;
    }
    if extract_bearer_token(req.headers().get(AUTHORIZATION)).is_some_and(|t| auth.allows(t)) {
        return next.run(req).await;
    }
    ApiError::new(
        current_request_id(&req),
        "unauthorized",
        "missing or invalid bearer token",
    )
    .into_response()
}

pub async fn enforce_rate_limit(
    State(rate_limit): State<RateLimitState>,
    req: Request,
    next: Next,
) -> Response {
    if rate_limit.try_acquire().await {
        return next.run(req).await;
    }
    tracing::warn!(path = %req.uri().path(), "rate limit exceeded");
    ApiError::new(
        current_request_id(&req),
        "rate_limited",
        "rate limit exceeded",
    )
    .into_response()
}

/// Rewrites the body-limit layer's plain-text 413 into the API error envelope.
///
/// Rejections the JSON extractor already produced pass through untouched.
pub async fn payload_too_large_envelope(
    State(max_body_bytes): State<usize>,
    req: Request,
    next: Next,
) -> Response {
    let req_id = current_request_id(&req);
    let res = next.run(req).await;
    if res.status() != StatusCode::PAYLOAD_TOO_LARGE || is_json(&res) {
        return res;
    }
    ApiError::new(
        req_id,
        "payload_too_large",
        format!("request body exceeds {max_body_bytes} bytes"),
    )
    .into_response()
}

fn is_json(res: &Response) -> bool {
    res.headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/json"))
}

fn extract_bearer_token(value: Option<&HeaderValue>) -> Option<&str> {
    value
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_bearer_token_accepts_valid_header() {
        let header = HeaderValue::from_static("Bearer test-token");
        assert_eq!(extract_bearer_token(Some(&header)), Some("test-token"));
    }

    #[test]
    fn extract_bearer_token_rejects_non_bearer_header() {
        let header = HeaderValue::from_static("Basic abc123");
        assert_eq!(extract_bearer_token(Some(&header)), None);
    }

    #[test]
    fn extract_bearer_token_rejects_blank_token() {
        let header = HeaderValue::from_static("Bearer   ");
        assert_eq!(extract_bearer_token(Some(&header)), None);
    }

    #[test]
    fn auth_state_disables_when_no_keys_in_dev() {
        let state = AuthState::from_keys(vec![], true).expect("dev should allow missing keys");
        assert!(!state.enabled);
    }

    #[test]
    fn auth_state_requires_keys_outside_dev() {
        assert!(AuthState::from_keys(vec![" ".to_string()], false).is_err());
    }

    #[test]
    fn auth_state_matches_exact_key_only() {
        let state =
            AuthState::from_keys(vec!["alpha".to_string(), "beta".to_string()], false).unwrap();
        assert!(state.enabled);
        assert!(state.allows("alpha"));
        assert!(state.allows("beta"));
        assert!(!state.allows("alph"));
        assert!(!state.allows("alphabet"));
    }

    #[tokio::test]
    async fn rate_limit_budget_is_spent_then_refused() {
        let limiter = RateLimitState::new(2, Duration::from_secs(60));
        assert!(limiter.try_acquire().await);
        assert!(limiter.try_acquire().await);
        assert!(!limiter.try_acquire().await);
    }

    #[tokio::test]
    async fn rate_limit_budget_refills_after_window() {
        let limiter = RateLimitState::new(1, Duration::ZERO);
        assert!(limiter.try_acquire().await);
        assert!(limiter.try_acquire().await);
    }

    #[test]
    fn auth_state_debug_hides_keys() {
        let state = AuthState::from_keys(vec!["top-secret".to_string()], false).unwrap();
        assert!(!format!("{state:?}").contains("top-secret"));
    }
}

//! Retry with exponential back-off and jitter for the vision client.
//!
//! Only transient failures are retried: network errors, HTTP 429 and 5xx.
//! A reply the model got wrong is returned as-is; asking again costs tokens
//! and rarely fixes it.

use std::future::Future;
use std::time::Duration;

use crate::error::VisionError;

const MAX_DELAY_MS: u64 = 60_000;

/// Returns `true` for errors worth retrying after a back-off delay.
pub(crate) fn is_retriable(err: &VisionError) -> bool {
    match err {
        VisionError::Http(e) => {
            e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
        }
        VisionError::RateLimited { .. } => true,
        VisionError::UnexpectedStatus { status, .. } => *status >= 500,
        VisionError::MissingImage
        | VisionError::MissingApiKey
        | VisionError::Deserialize { .. }
        | VisionError::EmptyResponse
        | VisionError::MalformedResponse { .. } => false,
    }
}

/// Runs `operation` with up to `max_retries` additional attempts on transient errors.
///
/// The wait before retry `n` is `backoff_base_ms * 2^(n-1)` with ±25 % jitter,
/// capped at 60 s. A 429 carrying `Retry-After` waits at least that long.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, VisionError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, VisionError>>,
{
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= max_retries {
                    return Err(err);
                }
                attempt += 1;
                let delay = retry_delay(attempt, backoff_base_ms, &err, rand::random::<f64>());
                tracing::warn!(
                    attempt,
                    max_retries,
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(MAX_DELAY_MS),
                    error = %err,
                    "transient vision API error, retrying after back-off"
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}

/// Delay before retry `attempt` (1-based). `jitter` is a sample in `[0, 1)`.
fn retry_delay(attempt: u32, backoff_base_ms: u64, err: &VisionError, jitter: f64) -> Duration {
    let computed = backoff_base_ms.saturating_mul(1u64 << attempt.saturating_sub(1).min(10));
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    let jittered = (computed.min(MAX_DELAY_MS) as f64 * (jitter * 0.5 + 0.75)) as u64;

    let floor_ms = match err {
        VisionError::RateLimited { retry_after_secs } => retry_after_secs.saturating_mul(1000),
        _ => 0,
    };
    Duration::from_millis(jittered.max(floor_ms).min(MAX_DELAY_MS))
}

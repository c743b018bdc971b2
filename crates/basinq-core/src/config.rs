use crate::app_config::{AppConfig, Environment, ExtractionMode};
use crate::enrich::NonPositiveHeightPolicy;
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so tests can drive it from a
/// `HashMap`.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let or_default =
        |var: &str, default: &str| -> String { optional(var).unwrap_or_else(|| default.to_string()) };

    let env = parse_environment(&or_default("BASINQ_ENV", "development"))?;

    let bind_addr: SocketAddr = parse_as(
        "BASINQ_BIND_ADDR",
        &or_default("BASINQ_BIND_ADDR", "0.0.0.0:3000"),
    )?;
    let log_level = or_default("BASINQ_LOG_LEVEL", "info");
    let catalog_path = optional("BASINQ_CATALOG_PATH").map(PathBuf::from);

    let extraction_mode = parse_extraction_mode(&or_default("BASINQ_EXTRACTION_MODE", "live"))?;
    let openai_api_key = optional("OPENAI_API_KEY");
    if extraction_mode == ExtractionMode::Live && openai_api_key.is_none() {
        return Err(ConfigError::MissingEnvVar("OPENAI_API_KEY".to_string()));
    }

    let vision_base_url = or_default("BASINQ_VISION_BASE_URL", "https://api.openai.com")
        .trim_end_matches('/')
        .to_string();
    let vision_model = or_default("BASINQ_VISION_MODEL", "gpt-4o");
    let vision_max_tokens: u32 = parse_as(
        "BASINQ_VISION_MAX_TOKENS",
        &or_default("BASINQ_VISION_MAX_TOKENS", "1500"),
    )?;
    let vision_timeout_secs: u64 = parse_as(
        "BASINQ_VISION_TIMEOUT_SECS",
        &or_default("BASINQ_VISION_TIMEOUT_SECS", "60"),
    )?;
    let vision_max_retries: u32 = parse_as(
        "BASINQ_VISION_MAX_RETRIES",
        &or_default("BASINQ_VISION_MAX_RETRIES", "2"),
    )?;
    let vision_backoff_base_ms: u64 = parse_as(
        "BASINQ_VISION_BACKOFF_BASE_MS",
        &or_default("BASINQ_VISION_BACKOFF_BASE_MS", "1000"),
    )?;

    let non_positive_height =
        parse_height_policy(&or_default("BASINQ_NON_POSITIVE_HEIGHT", "reject"))?;
    let max_upload_bytes: usize = parse_as(
        "BASINQ_MAX_UPLOAD_BYTES",
        &or_default("BASINQ_MAX_UPLOAD_BYTES", "10485760"),
    )?;
    if max_upload_bytes == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "BASINQ_MAX_UPLOAD_BYTES".to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }

    let api_keys = optional("BASINQ_API_KEYS")
        .map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(ToOwned::to_owned)
                .collect()
        })
        .unwrap_or_default();

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        catalog_path,
        extraction_mode,
        openai_api_key,
        vision_base_url,
        vision_model,
        vision_max_tokens,
        vision_timeout_secs,
        vision_max_retries,
        vision_backoff_base_ms,
        non_positive_height,
        max_upload_bytes,
        api_keys,
    })
}

fn parse_as<T>(var: &str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse::<T>().map_err(|e| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason: e.to_string(),
    })
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` for unrecognized values.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "BASINQ_ENV".to_string(),
            reason: format!("unknown environment '{other}'; expected development, test, or production"),
        }),
    }
}

fn parse_extraction_mode(s: &str) -> Result<ExtractionMode, ConfigError> {
    match s.to_ascii_lowercase().as_str() {
        "live" => Ok(ExtractionMode::Live),
        "mock" => Ok(ExtractionMode::Mock),
        other => Err(ConfigError::InvalidEnvVar {
            var: "BASINQ_EXTRACTION_MODE".to_string(),
            reason: format!("unknown mode '{other}'; expected live or mock"),
        }),
    }
}

fn parse_height_policy(s: &str) -> Result<NonPositiveHeightPolicy, ConfigError> {
    match s.to_ascii_lowercase().as_str() {
        "reject" => Ok(NonPositiveHeightPolicy::Reject),
        "flag" => Ok(NonPositiveHeightPolicy::Flag),
        other => Err(ConfigError::InvalidEnvVar {
            var: "BASINQ_NON_POSITIVE_HEIGHT".to_string(),
            reason: format!("unknown policy '{other}'; expected reject or flag"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

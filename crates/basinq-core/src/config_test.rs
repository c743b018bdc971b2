use std::collections::HashMap;
use std::env::VarError;
use std::path::PathBuf;

use super::*;

fn lookup_from_map<'a>(
    map: &'a HashMap<&'a str, &'a str>,
) -> impl Fn(&str) -> Result<String, VarError> + 'a {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

/// Returns a map with all required env vars populated with valid defaults.
fn full_env<'a>() -> HashMap<&'a str, &'a str> {
    let mut m = HashMap::new();
    m.insert("OPENAI_API_KEY", "sk-test");
    m
}

#[test]
fn parse_environment_development() {
    assert_eq!(
        parse_environment("development").unwrap(),
        Environment::Development
    );
}

#[test]
fn parse_environment_test() {
    assert_eq!(parse_environment("test").unwrap(), Environment::Test);
}

#[test]
fn parse_environment_production() {
    assert_eq!(
        parse_environment("production").unwrap(),
        Environment::Production
    );
}

#[test]
fn parse_environment_unknown_fails() {
    let err = parse_environment("unknown").unwrap_err();
    assert!(matches!(err, ConfigError::InvalidEnvVar { ref var, .. } if var == "BASINQ_ENV"));
}

#[test]
fn build_app_config_succeeds_with_defaults() {
    let map = full_env();
    let result = build_app_config(lookup_from_map(&map));
    assert!(result.is_ok(), "expected Ok, got: {result:?}");
    let cfg = result.unwrap();
    assert_eq!(cfg.env, Environment::Development);
    assert_eq!(cfg.bind_addr.to_string(), "0.0.0.0:3000");
    assert_eq!(cfg.log_level, "info");
    assert_eq!(cfg.catalog_path, None);
    assert_eq!(cfg.extraction_mode, ExtractionMode::Live);
    assert_eq!(cfg.openai_api_key.as_deref(), Some("sk-test"));
    assert_eq!(cfg.vision_base_url, "https://api.openai.com");
    assert_eq!(cfg.vision_model, "gpt-4o");
    assert_eq!(cfg.vision_max_tokens, 1500);
    assert_eq!(cfg.vision_timeout_secs, 60);
    assert_eq!(cfg.vision_max_retries, 2);
    assert_eq!(cfg.vision_backoff_base_ms, 1000);
    assert_eq!(cfg.non_positive_height, NonPositiveHeightPolicy::Reject);
    assert_eq!(cfg.max_upload_bytes, 10_485_760);
    assert!(cfg.api_keys.is_empty());
}

#[test]
fn build_app_config_live_mode_requires_openai_key() {
    let map: HashMap<&str, &str> = HashMap::new();
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::MissingEnvVar(ref v)) if v == "OPENAI_API_KEY"),
        "expected MissingEnvVar(OPENAI_API_KEY), got: {result:?}"
    );
}

#[test]
fn build_app_config_blank_openai_key_counts_as_missing() {
    let mut map = HashMap::new();
    map.insert("OPENAI_API_KEY", "   ");
    let result = build_app_config(lookup_from_map(&map));
    assert!(matches!(result, Err(ConfigError::MissingEnvVar(_))));
}

#[test]
fn build_app_config_mock_mode_needs_no_key() {
    let mut map = HashMap::new();
    map.insert("BASINQ_EXTRACTION_MODE", "mock");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.extraction_mode, ExtractionMode::Mock);
    assert!(cfg.openai_api_key.is_none());
}

#[test]
fn build_app_config_rejects_unknown_extraction_mode() {
    let mut map = full_env();
    map.insert("BASINQ_EXTRACTION_MODE", "replay");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "BASINQ_EXTRACTION_MODE"),
        "expected InvalidEnvVar(BASINQ_EXTRACTION_MODE), got: {result:?}"
    );
}

#[test]
fn build_app_config_fails_with_invalid_bind_addr() {
    let mut map = full_env();
    map.insert("BASINQ_BIND_ADDR", "not-a-socket-addr");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "BASINQ_BIND_ADDR"),
        "expected InvalidEnvVar(BASINQ_BIND_ADDR), got: {result:?}"
    );
}

#[test]
fn build_app_config_reads_catalog_path() {
    let mut map = full_env();
    map.insert("BASINQ_CATALOG_PATH", "/etc/basinq/catalog.yaml");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(
        cfg.catalog_path,
        Some(PathBuf::from("/etc/basinq/catalog.yaml"))
    );
}

#[test]
fn build_app_config_trims_trailing_slash_from_base_url() {
    let mut map = full_env();
    map.insert("BASINQ_VISION_BASE_URL", "http://127.0.0.1:9999/");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.vision_base_url, "http://127.0.0.1:9999");
}

#[test]
fn build_app_config_vision_overrides() {
    let mut map = full_env();
    map.insert("BASINQ_VISION_MODEL", "gpt-4o-mini");
    map.insert("BASINQ_VISION_MAX_TOKENS", "4000");
    map.insert("BASINQ_VISION_TIMEOUT_SECS", "15");
    map.insert("BASINQ_VISION_MAX_RETRIES", "0");
    map.insert("BASINQ_VISION_BACKOFF_BASE_MS", "5");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.vision_model, "gpt-4o-mini");
    assert_eq!(cfg.vision_max_tokens, 4000);
    assert_eq!(cfg.vision_timeout_secs, 15);
    assert_eq!(cfg.vision_max_retries, 0);
    assert_eq!(cfg.vision_backoff_base_ms, 5);
}

#[test]
fn build_app_config_vision_timeout_invalid() {
    let mut map = full_env();
    map.insert("BASINQ_VISION_TIMEOUT_SECS", "not-a-number");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "BASINQ_VISION_TIMEOUT_SECS"),
        "expected InvalidEnvVar(BASINQ_VISION_TIMEOUT_SECS), got: {result:?}"
    );
}

#[test]
fn build_app_config_height_policy_flag() {
    let mut map = full_env();
    map.insert("BASINQ_NON_POSITIVE_HEIGHT", "flag");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.non_positive_height, NonPositiveHeightPolicy::Flag);
    assert_eq!(
        cfg.enrich_options().non_positive_height,
        NonPositiveHeightPolicy::Flag
    );
}

#[test]
fn build_app_config_height_policy_invalid() {
    let mut map = full_env();
    map.insert("BASINQ_NON_POSITIVE_HEIGHT", "clamp");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "BASINQ_NON_POSITIVE_HEIGHT"),
        "expected InvalidEnvVar(BASINQ_NON_POSITIVE_HEIGHT), got: {result:?}"
    );
}

#[test]
fn build_app_config_rejects_zero_upload_limit() {
    let mut map = full_env();
    map.insert("BASINQ_MAX_UPLOAD_BYTES", "0");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "BASINQ_MAX_UPLOAD_BYTES"),
        "expected InvalidEnvVar(BASINQ_MAX_UPLOAD_BYTES), got: {result:?}"
    );
}

#[test]
fn build_app_config_splits_api_keys() {
    let mut map = full_env();
    map.insert("BASINQ_API_KEYS", "alpha, beta,,gamma ");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.api_keys, vec!["alpha", "beta", "gamma"]);
}

#[test]
fn debug_output_redacts_secrets() {
    let mut map = full_env();
    map.insert("BASINQ_API_KEYS", "super-secret-token");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    let rendered = format!("{cfg:?}");
    assert!(!rendered.contains("sk-test"));
    assert!(!rendered.contains("super-secret-token"));
    assert!(rendered.contains("[redacted]"));
}

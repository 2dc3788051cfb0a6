//! Config defaults: fills every unset field so the written config is explicit.

use crate::schema::{BackendConfig, LoggingConfig, TrackscanConfig};

/// Backend assumed when none is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Health check bound (seconds).
pub const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 5;

/// Submission round-trip bound (seconds).
pub const DEFAULT_SUBMIT_TIMEOUT_SECS: u64 = 60;

pub const DEFAULT_DEMO_FALLBACK: bool = true;

pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Apply all defaults to a freshly loaded config.
pub fn apply_all_defaults(config: TrackscanConfig) -> TrackscanConfig {
    let config = apply_backend_defaults(config);
    apply_logging_defaults(config)
}

fn apply_backend_defaults(mut config: TrackscanConfig) -> TrackscanConfig {
    let backend = config.backend.get_or_insert_with(BackendConfig::default);
    backend
        .base_url
        .get_or_insert_with(|| DEFAULT_BASE_URL.to_string());
    backend
        .probe_timeout_secs
        .get_or_insert(DEFAULT_PROBE_TIMEOUT_SECS);
    backend
        .submit_timeout_secs
        .get_or_insert(DEFAULT_SUBMIT_TIMEOUT_SECS);
    backend.demo_fallback.get_or_insert(DEFAULT_DEMO_FALLBACK);
    config
}

fn apply_logging_defaults(mut config: TrackscanConfig) -> TrackscanConfig {
    let logging = config.logging.get_or_insert_with(LoggingConfig::default);
    logging
        .level
        .get_or_insert_with(|| DEFAULT_LOG_LEVEL.to_string());
    logging.json.get_or_insert(false);
    config
}

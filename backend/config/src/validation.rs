//! Config validation: field checks with user-friendly messages.

use crate::schema::TrackscanConfig;
use thiserror::Error;

/// Probe timeouts above this many seconds earn a warning.
const PROBE_TIMEOUT_WARN_SECS: u64 = 30;

const KNOWN_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error", "off"];

/// A config validation error with field path and message.
#[derive(Debug, Error)]
#[error("Config validation error at '{path}': {message}")]
pub struct ConfigValidationError {
    pub path: String,
    pub message: String,
}

/// A collection of validation errors found in one pass.
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }

    fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }
}

/// Validate the config and return a report of all errors and warnings.
pub fn validate(config: &TrackscanConfig) -> ValidationReport {
    let mut report = ValidationReport::default();
    validate_backend(config, &mut report);
    validate_logging(config, &mut report);
    report
}

fn validate_backend(config: &TrackscanConfig, report: &mut ValidationReport) {
    let Some(backend) = &config.backend else { return };

    if let Some(url) = &backend.base_url {
        let url = url.trim();
        if url.is_empty() {
            report.error("backend.baseUrl", "Base URL cannot be empty");
        } else if !(url.starts_with("http://") || url.starts_with("https://")) {
            report.error(
                "backend.baseUrl",
                format!("Base URL must start with http:// or https:// (got '{url}')"),
            );
        } else if url.ends_with("/api/ocr") || url.ends_with("/api/health") {
            report.warn(
                "backend.baseUrl",
                "Base URL should not include the endpoint path; it is appended automatically",
            );
        }
    }

    match backend.probe_timeout_secs {
        Some(0) => report.error("backend.probeTimeoutSecs", "probeTimeoutSecs must be > 0"),
        Some(secs) if secs > PROBE_TIMEOUT_WARN_SECS => report.warn(
            "backend.probeTimeoutSecs",
            format!("A {secs}s probe timeout makes connection checks slow"),
        ),
        _ => {}
    }

    if backend.submit_timeout_secs == Some(0) {
        report.error("backend.submitTimeoutSecs", "submitTimeoutSecs must be > 0");
    }
}

fn validate_logging(config: &TrackscanConfig, report: &mut ValidationReport) {
    let Some(logging) = &config.logging else { return };
    if let Some(level) = &logging.level {
        // Full filter directives (e.g. "trackscan_client=debug") are accepted as-is.
        if !level.contains('=') && !KNOWN_LEVELS.contains(&level.to_lowercase().as_str()) {
            report.warn("logging.level", format!("Unknown log level '{level}'"));
        }
    }
}

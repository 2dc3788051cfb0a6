//! trackscan configuration schema.
//!
//! Every field is optional on disk; [`crate::defaults`] fills the gaps and the
//! accessors below fall back to the same constants.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::defaults::{
    DEFAULT_BASE_URL, DEFAULT_DEMO_FALLBACK, DEFAULT_LOG_LEVEL, DEFAULT_PROBE_TIMEOUT_SECS,
    DEFAULT_SUBMIT_TIMEOUT_SECS,
};

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TrackscanConfig {
    /// OCR backend connection
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend: Option<BackendConfig>,

    /// Logging configuration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BackendConfig {
    /// e.g. `http://localhost:8000`; `/api/ocr` and `/api/health` are appended.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probe_timeout_secs: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submit_timeout_secs: Option<u64>,

    /// Serve simulated results when the backend is unreachable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub demo_fallback: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LoggingConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,

    /// Directory for rolling NDJSON log files.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json: Option<bool>,
}

impl TrackscanConfig {
    pub fn base_url(&self) -> &str {
        self.backend
            .as_ref()
            .and_then(|b| b.base_url.as_deref())
            .unwrap_or(DEFAULT_BASE_URL)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(
            self.backend
                .as_ref()
                .and_then(|b| b.probe_timeout_secs)
                .unwrap_or(DEFAULT_PROBE_TIMEOUT_SECS),
        )
    }

    pub fn submit_timeout(&self) -> Duration {
        Duration::from_secs(
            self.backend
                .as_ref()
                .and_then(|b| b.submit_timeout_secs)
                .unwrap_or(DEFAULT_SUBMIT_TIMEOUT_SECS),
        )
    }

    pub fn demo_fallback(&self) -> bool {
        self.backend
            .as_ref()
            .and_then(|b| b.demo_fallback)
            .unwrap_or(DEFAULT_DEMO_FALLBACK)
    }

    pub fn log_level(&self) -> &str {
        self.logging
            .as_ref()
            .and_then(|l| l.level.as_deref())
            .unwrap_or(DEFAULT_LOG_LEVEL)
    }

    pub fn log_dir(&self) -> Option<PathBuf> {
        self.logging
            .as_ref()
            .and_then(|l| l.dir.as_ref())
            .map(PathBuf::from)
    }

    pub fn log_json(&self) -> bool {
        self.logging.as_ref().and_then(|l| l.json).unwrap_or(false)
    }

    /// Replace the backend base URL, keeping other backend settings.
    pub fn set_base_url(&mut self, url: impl Into<String>) {
        self.backend
            .get_or_insert_with(BackendConfig::default)
            .base_url = Some(url.into());
    }
}

//! Connectivity probe: one bounded health check, reported as a boolean.

use std::time::Duration;

use tracing::debug;

use crate::transport::{HttpBackend, OcrBackend, DEFAULT_PROBE_TIMEOUT};

/// Check whether the backend at `base_url` answers its health endpoint.
///
/// Never fails: timeouts, refused connections, non-2xx and malformed URLs are all `false`.
pub async fn probe(base_url: &str) -> bool {
    probe_with_timeout(base_url, DEFAULT_PROBE_TIMEOUT).await
}

pub async fn probe_with_timeout(base_url: &str, timeout: Duration) -> bool {
    let backend = HttpBackend::new(base_url).with_probe_timeout(timeout);
    probe_backend(&backend, timeout).await
}

/// Probe any backend, abandoning the attempt after `timeout`.
pub async fn probe_backend(backend: &dyn OcrBackend, timeout: Duration) -> bool {
    match tokio::time::timeout(timeout, backend.health()).await {
        Ok(Ok(())) => {
            debug!(backend = %trackscan_logging::redact_sensitive_data(backend.base_url()), "Backend reachable");
            true
        }
        Ok(Err(e)) => {
            debug!(error = %e, "Health probe failed");
            false
        }
        Err(_) => {
            debug!(timeout_ms = timeout.as_millis() as u64, "Health probe timed out");
            false
        }
    }
}

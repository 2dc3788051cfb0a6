//! HTTP transport to the OCR backend.
//!
//! Every failure is classified here into a [`TransportError`] variant, so the
//! controller can decide on the simulated fallback without looking at message text.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use tracing::{debug, warn};

use trackscan_core::{SubmissionResult, TransportError};

/// Health check path, relative to the base URL.
pub const HEALTH_PATH: &str = "/api/health";

/// Ingest path, relative to the base URL.
pub const OCR_PATH: &str = "/api/ocr";

/// Multipart field carrying the image bytes.
pub const IMAGE_FIELD: &str = "image";

/// Hard bound on a health check.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Bound on a whole submission round trip.
pub const DEFAULT_SUBMIT_TIMEOUT: Duration = Duration::from_secs(60);

/// Bound on establishing the TCP/TLS connection.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// A file to submit, sent whole in one request.
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let mime_type = guess_mime_type(&file_name).to_string();
        Self {
            file_name,
            mime_type,
            bytes,
        }
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = mime_type.into();
        self
    }

    /// Read a file from disk; the file name becomes the simulator seed.
    pub async fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self::new(file_name, bytes))
    }

    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with("image/")
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    fn to_part(&self) -> Part {
        let part = Part::bytes(self.bytes.clone()).file_name(self.file_name.clone());
        match part.mime_str(&self.mime_type) {
            Ok(part) => part,
            Err(e) => {
                warn!(mime = %self.mime_type, error = %e, "Invalid MIME type; sending upload untyped");
                Part::bytes(self.bytes.clone()).file_name(self.file_name.clone())
            }
        }
    }
}

/// Guess a MIME type from a file extension.
pub fn guess_mime_type(file_name: &str) -> &'static str {
    let lower = file_name.to_lowercase();
    let ext = lower.rsplit_once('.').map(|(_, e)| e).unwrap_or("");
    match ext {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        "pdf" => "application/pdf",
        _ => "application/octet-stream",
    }
}

/// The remote OCR service as seen by the controller.
#[async_trait]
pub trait OcrBackend: Send + Sync {
    /// Base URL used for logging.
    fn base_url(&self) -> &str;

    /// One health check; `Ok` means the backend answered 2xx.
    async fn health(&self) -> Result<(), TransportError>;

    /// Submit one image and parse the answer.
    async fn recognize(&self, upload: &Upload) -> Result<SubmissionResult, TransportError>;
}

/// [`OcrBackend`] over HTTP with `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
    probe_timeout: Duration,
    submit_timeout: Duration,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .unwrap_or_else(|e| {
                warn!(error = %e, "Falling back to default HTTP client");
                Client::new()
            });
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            submit_timeout: DEFAULT_SUBMIT_TIMEOUT,
        }
    }

    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    pub fn with_submit_timeout(mut self, timeout: Duration) -> Self {
        self.submit_timeout = timeout;
        self
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl OcrBackend for HttpBackend {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn health(&self) -> Result<(), TransportError> {
        let resp = self
            .client
            .get(self.endpoint(HEALTH_PATH))
            .timeout(self.probe_timeout)
            .send()
            .await
            .map_err(|e| classify(e, self.probe_timeout))?;

        let status = resp.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(TransportError::Application {
                status: status.as_u16(),
                body: String::new(),
            })
        }
    }

    async fn recognize(&self, upload: &Upload) -> Result<SubmissionResult, TransportError> {
        let url = self.endpoint(OCR_PATH);
        debug!(url = %url, file = %upload.file_name, bytes = upload.len(), "Sending image to OCR backend");

        let form = Form::new().part(IMAGE_FIELD, upload.to_part());
        let resp = self
            .client
            .post(&url)
            .multipart(form)
            .timeout(self.submit_timeout)
            .send()
            .await
            .map_err(|e| classify(e, self.submit_timeout))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(TransportError::Application {
                status: status.as_u16(),
                body,
            });
        }

        let body = resp
            .bytes()
            .await
            .map_err(|e| classify(e, self.submit_timeout))?;
        serde_json::from_slice(&body).map_err(|e| TransportError::MalformedResponse(e.to_string()))
    }
}

/// Map a `reqwest` failure onto the transport taxonomy.
///
/// Connect errors are checked before timeouts: a connect timeout is still an unreachable backend.
/// Only failures to get a request to the backend count as unreachable. Redirect, status and body
/// errors mean the backend answered, so they are malformed responses.
fn classify(err: reqwest::Error, bound: Duration) -> TransportError {
    if err.is_connect() || err.is_builder() {
        TransportError::Unreachable(err.to_string())
    } else if err.is_timeout() {
        TransportError::TimedOut(bound)
    } else if err.is_request() {
        TransportError::Unreachable(err.to_string())
    } else {
        TransportError::MalformedResponse(err.to_string())
    }
}

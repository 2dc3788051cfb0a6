//! Submission controller: one image in, one published outcome out.
//!
//! Lifecycle: `idle -> processing -> {completed | failed}`. State lives in a
//! `watch` channel; every transition replaces the whole snapshot at once.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use trackscan_core::{ControllerSnapshot, SubmissionResult, SubmitError, TransportError};
use trackscan_logging::{redact_sensitive_data, SubmissionEvent, SubmissionEventLogger};

use crate::probe::probe_backend;
use crate::simulator::ResultSimulator;
use crate::transport::{HttpBackend, OcrBackend, Upload, DEFAULT_PROBE_TIMEOUT};

/// Error recorded when a submission future is dropped before finishing.
pub const CANCELLED_MESSAGE: &str = "submission cancelled";

pub struct SubmissionController {
    backend: Arc<dyn OcrBackend>,
    simulator: ResultSimulator,
    demo_fallback: bool,
    probe_timeout: Duration,
    state: watch::Sender<ControllerSnapshot>,
}

impl SubmissionController {
    pub fn new(backend: Arc<dyn OcrBackend>) -> Self {
        let (state, _) = watch::channel(ControllerSnapshot::idle());
        Self {
            backend,
            simulator: ResultSimulator::new(),
            demo_fallback: true,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            state,
        }
    }

    /// Controller talking HTTP to `base_url` with default timeouts.
    pub fn http(base_url: impl Into<String>) -> Self {
        Self::new(Arc::new(HttpBackend::new(base_url)))
    }

    pub fn with_simulator(mut self, simulator: ResultSimulator) -> Self {
        self.simulator = simulator;
        self
    }

    /// When disabled, an unreachable backend is reported as a failure.
    pub fn with_demo_fallback(mut self, enabled: bool) -> Self {
        self.demo_fallback = enabled;
        self
    }

    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    pub fn snapshot(&self) -> ControllerSnapshot {
        self.state.borrow().clone()
    }

    pub fn is_processing(&self) -> bool {
        self.state.borrow().is_processing
    }

    pub fn result(&self) -> Option<SubmissionResult> {
        self.state.borrow().result.clone()
    }

    pub fn error(&self) -> Option<String> {
        self.state.borrow().error.clone()
    }

    /// Receive every published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<ControllerSnapshot> {
        self.state.subscribe()
    }

    /// Probe the controller's backend. Does not touch lifecycle state.
    pub async fn probe(&self) -> bool {
        probe_backend(self.backend.as_ref(), self.probe_timeout).await
    }

    /// Clear result and error. An in-flight submission keeps `is_processing`.
    pub fn reset(&self) {
        self.state.send_if_modified(|s| {
            let changed = s.result.is_some() || s.error.is_some() || s.simulated;
            s.result = None;
            s.error = None;
            s.simulated = false;
            changed
        });
    }

    /// Submit one image.
    ///
    /// An unreachable backend yields a simulated result (with the demo-mode
    /// notice as the error) unless demo fallback is disabled.
    #[instrument(skip(self, upload), fields(file = %upload.file_name))]
    pub async fn submit(&self, upload: Upload) -> Result<SubmissionResult, SubmitError> {
        let submission_id = Uuid::new_v4();

        let started = self.state.send_if_modified(|s| {
            if s.is_processing {
                false
            } else {
                *s = ControllerSnapshot::processing();
                true
            }
        });
        if !started {
            warn!(%submission_id, "Submission rejected; another one is in flight");
            SubmissionEventLogger::log_event(submission_id, SubmissionEvent::Rejected);
            return Err(SubmitError::AlreadyInProgress);
        }

        let guard = ProcessingGuard::new(&self.state);
        SubmissionEventLogger::log_event(
            submission_id,
            SubmissionEvent::Started {
                file_name: upload.file_name.clone(),
                bytes: upload.len(),
                backend: redact_sensitive_data(self.backend.base_url()),
            },
        );

        let (snapshot, outcome) = match self.backend.recognize(&upload).await {
            Ok(result) => {
                info!(%submission_id, success = result.success, "Submission completed");
                SubmissionEventLogger::log_event(
                    submission_id,
                    SubmissionEvent::Completed {
                        success: result.success,
                        pattern: result.target_match.as_ref().map(|m| m.pattern_found.clone()),
                        detections: result.detections.len(),
                    },
                );
                (ControllerSnapshot::completed(result.clone()), Ok(result))
            }
            Err(TransportError::Unreachable(reason)) if self.demo_fallback => {
                warn!(%submission_id, "Backend unreachable; serving simulated results");
                let result = self.simulator.generate(&upload.file_name);
                SubmissionEventLogger::log_event(
                    submission_id,
                    SubmissionEvent::Simulated {
                        reason,
                        pattern: result.target_match.as_ref().map(|m| m.pattern_found.clone()),
                    },
                );
                (ControllerSnapshot::simulated(result.clone()), Ok(result))
            }
            Err(err) => {
                warn!(%submission_id, error = %err, "Submission failed");
                SubmissionEventLogger::log_event(
                    submission_id,
                    SubmissionEvent::Failed {
                        error: err.to_string(),
                    },
                );
                (ControllerSnapshot::failed(err.to_string()), Err(err.into()))
            }
        };

        guard.finish(snapshot);
        outcome
    }
}

/// Leaves `processing` even if the submit future is dropped mid-flight.
struct ProcessingGuard<'a> {
    state: &'a watch::Sender<ControllerSnapshot>,
    finished: bool,
}

impl<'a> ProcessingGuard<'a> {
    fn new(state: &'a watch::Sender<ControllerSnapshot>) -> Self {
        Self {
            state,
            finished: false,
        }
    }

    fn finish(mut self, snapshot: ControllerSnapshot) {
        self.state.send_replace(snapshot);
        self.finished = true;
    }
}

impl Drop for ProcessingGuard<'_> {
    fn drop(&mut self) {
        if !self.finished {
            self.state
                .send_replace(ControllerSnapshot::failed(CANCELLED_MESSAGE));
        }
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use axum::http::StatusCode;
    use axum::response::Redirect;
    use axum::routing::{any, get, post};
    use axum::{Json, Router};
    use serde_json::json;
    use tokio::sync::Notify;

    use super::*;
    use crate::simulator::{PREPROCESSING_STEPS, SCORE_RANGE};
    use crate::test_support::{sample_body, spawn_backend, unreachable_url};
    use crate::transport::{HEALTH_PATH, OCR_PATH};
    use trackscan_core::{LifecycleState, DEMO_MODE_NOTICE};

    fn jpeg() -> Upload {
        Upload::new("label.jpg", vec![0xD8; 10 * 1024])
    }

    /// Answers only once `gate` is notified.
    struct GatedBackend {
        gate: Arc<Notify>,
        answer: Result<SubmissionResult, TransportError>,
    }

    #[async_trait]
    impl OcrBackend for GatedBackend {
        fn base_url(&self) -> &str {
            "gated://test"
        }

        async fn health(&self) -> Result<(), TransportError> {
            Ok(())
        }

        async fn recognize(&self, _upload: &Upload) -> Result<SubmissionResult, TransportError> {
            self.gate.notified().await;
            self.answer.clone()
        }
    }

    fn gated(answer: Result<SubmissionResult, TransportError>) -> (Arc<SubmissionController>, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        let backend = GatedBackend {
            gate: gate.clone(),
            answer,
        };
        (Arc::new(SubmissionController::new(Arc::new(backend))), gate)
    }

    #[tokio::test]
    async fn test_success_stores_parsed_body() {
        let app = Router::new().route(OCR_PATH, post(|| async { Json(sample_body()) }));
        let controller = SubmissionController::http(spawn_backend(app).await);

        let returned = controller.submit(jpeg()).await.unwrap();
        let expected: SubmissionResult = serde_json::from_value(sample_body()).unwrap();

        let snap = controller.snapshot();
        assert_eq!(returned, expected);
        assert_eq!(snap.result, Some(expected));
        assert!(snap.error.is_none());
        assert!(!snap.is_processing);
        assert!(!snap.simulated);
        assert_eq!(
            controller.result().unwrap().target_match.unwrap().pattern_found,
            "163233702292313922_1_lWV"
        );
    }

    #[tokio::test]
    async fn test_unreachable_backend_serves_simulation() {
        let controller = SubmissionController::http(unreachable_url());

        let returned = controller.submit(jpeg()).await.unwrap();
        let snap = controller.snapshot();

        assert_eq!(snap.result.as_ref(), Some(&returned));
        assert!(returned.success);
        assert_eq!(returned.preprocessing_steps.len(), PREPROCESSING_STEPS.len());
        let score = returned.target_match.as_ref().unwrap().score;
        assert!(SCORE_RANGE.contains(&score));

        let error = snap.error.unwrap();
        assert_eq!(error, DEMO_MODE_NOTICE);
        assert!(error.contains("Demo mode") && error.contains("simulated"));
        assert!(!error.contains("refused"));
        assert!(snap.simulated);
        assert_eq!(controller.snapshot().state(), LifecycleState::Completed);
    }

    #[tokio::test]
    async fn test_server_error_has_no_fallback() {
        let app = Router::new().route(
            OCR_PATH,
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"detail": "OOM"}))) }),
        );
        let controller = SubmissionController::http(spawn_backend(app).await);

        let err = controller.submit(jpeg()).await.unwrap_err();
        assert!(matches!(
            err,
            SubmitError::Transport(TransportError::Application { status: 500, .. })
        ));

        let snap = controller.snapshot();
        assert!(snap.result.is_none());
        assert!(snap.error.unwrap().contains("500"));
        assert!(!snap.simulated);
        assert_eq!(controller.snapshot().state(), LifecycleState::Failed);
    }

    #[tokio::test]
    async fn test_malformed_body_has_no_fallback() {
        let app = Router::new().route(OCR_PATH, post(|| async { Json(json!({"detail": "OOM"})) }));
        let controller = SubmissionController::http(spawn_backend(app).await);

        let err = controller.submit(jpeg()).await.unwrap_err();
        assert!(matches!(
            err,
            SubmitError::Transport(TransportError::MalformedResponse(_))
        ));
        assert!(controller.result().is_none());
        assert!(controller.error().unwrap().starts_with("malformed response body"));
    }

    #[tokio::test]
    async fn test_redirecting_backend_has_no_fallback() {
        let app = Router::new().route(OCR_PATH, any(|| async { Redirect::to(OCR_PATH) }));
        let controller = SubmissionController::http(spawn_backend(app).await);

        let err = controller.submit(jpeg()).await.unwrap_err();
        assert!(matches!(
            err,
            SubmitError::Transport(TransportError::MalformedResponse(_))
        ));
        let snapshot = controller.snapshot();
        assert!(!snapshot.simulated);
        assert!(snapshot.result.is_none());
        assert_ne!(snapshot.error.as_deref(), Some(DEMO_MODE_NOTICE));
    }

    #[tokio::test]
    async fn test_backend_reported_failure_is_completed_with_error() {
        let app = Router::new().route(
            OCR_PATH,
            post(|| async {
                Json(json!({
                    "success": false,
                    "target_match": null,
                    "ocr_results": [],
                    "full_text": "",
                    "preprocessing_steps": ["grayscale"],
                    "error": "No tracking pattern found"
                }))
            }),
        );
        let controller = SubmissionController::http(spawn_backend(app).await);

        let result = controller.submit(jpeg()).await.unwrap();
        assert!(!result.success);
        let snap = controller.snapshot();
        assert_eq!(snap.state(), LifecycleState::Completed);
        assert_eq!(snap.error.as_deref(), Some("No tracking pattern found"));
    }

    #[tokio::test]
    async fn test_demo_fallback_can_be_disabled() {
        let controller = SubmissionController::http(unreachable_url()).with_demo_fallback(false);

        let err = controller.submit(jpeg()).await.unwrap_err();
        assert!(matches!(err, SubmitError::Transport(TransportError::Unreachable(_))));
        assert!(controller.result().is_none());
        assert!(!controller.snapshot().simulated);
    }

    #[tokio::test]
    async fn test_timeout_is_not_simulated() {
        let app = Router::new().route(
            OCR_PATH,
            post(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Json(sample_body())
            }),
        );
        let backend = HttpBackend::new(spawn_backend(app).await)
            .with_submit_timeout(Duration::from_millis(200));
        let controller = SubmissionController::new(Arc::new(backend));

        let err = controller.submit(jpeg()).await.unwrap_err();
        assert!(matches!(err, SubmitError::Transport(TransportError::TimedOut(_))));
        assert!(controller.result().is_none());
        assert!(controller.error().unwrap().contains("timed out"));
    }

    #[tokio::test]
    async fn test_processing_flag_spans_the_request() {
        let expected: SubmissionResult = serde_json::from_value(sample_body()).unwrap();
        let (controller, gate) = gated(Ok(expected.clone()));
        assert!(!controller.is_processing());

        let mut rx = controller.subscribe();
        let task = {
            let controller = controller.clone();
            tokio::spawn(async move { controller.submit(jpeg()).await })
        };

        rx.wait_for(|s| s.is_processing).await.unwrap();
        let mid = controller.snapshot();
        assert!(mid.result.is_none() && mid.error.is_none());

        gate.notify_one();
        let returned = task.await.unwrap().unwrap();
        assert_eq!(returned, expected);
        assert!(!controller.is_processing());
    }

    #[tokio::test]
    async fn test_second_submission_is_rejected_while_in_flight() {
        let (controller, gate) = gated(Err(TransportError::Unreachable("offline".into())));
        let mut rx = controller.subscribe();

        let task = {
            let controller = controller.clone();
            tokio::spawn(async move { controller.submit(jpeg()).await })
        };
        rx.wait_for(|s| s.is_processing).await.unwrap();

        let second = controller.submit(Upload::new("other.png", vec![1])).await;
        assert_eq!(second.unwrap_err(), SubmitError::AlreadyInProgress);
        assert!(controller.is_processing());

        gate.notify_one();
        assert!(task.await.unwrap().is_ok());
        assert!(controller.snapshot().simulated);
    }

    #[tokio::test]
    async fn test_new_submission_clears_previous_outcome() {
        let (controller, gate) = gated(Err(TransportError::Application {
            status: 502,
            body: String::new(),
        }));
        gate.notify_one();
        assert!(controller.submit(jpeg()).await.is_err());
        assert!(controller.error().unwrap().contains("502"));

        let mut rx = controller.subscribe();
        let task = {
            let controller = controller.clone();
            tokio::spawn(async move { controller.submit(jpeg()).await })
        };
        rx.wait_for(|s| s.is_processing).await.unwrap();
        let mid = controller.snapshot();
        assert!(mid.error.is_none());
        assert!(mid.result.is_none());

        gate.notify_one();
        assert!(task.await.unwrap().is_err());
        assert!(!controller.is_processing());
    }

    #[tokio::test]
    async fn test_cancelled_submission_leaves_processing() {
        let (controller, _gate) = gated(Ok(serde_json::from_value(sample_body()).unwrap()));
        let mut rx = controller.subscribe();

        let task = {
            let controller = controller.clone();
            tokio::spawn(async move { controller.submit(jpeg()).await })
        };
        rx.wait_for(|s| s.is_processing).await.unwrap();
        task.abort();
        let _ = task.await;

        let snap = controller.snapshot();
        assert!(!snap.is_processing);
        assert_eq!(snap.error.as_deref(), Some(CANCELLED_MESSAGE));
        assert!(snap.result.is_none());
    }

    #[tokio::test]
    async fn test_reset_returns_to_idle_from_any_terminal_state() {
        let controller = SubmissionController::http(unreachable_url());
        controller.reset();
        assert_eq!(controller.snapshot(), ControllerSnapshot::idle());

        controller.submit(jpeg()).await.unwrap();
        assert_eq!(controller.snapshot().state(), LifecycleState::Completed);
        controller.reset();
        assert_eq!(controller.snapshot(), ControllerSnapshot::idle());

        let controller = controller.with_demo_fallback(false);
        assert!(controller.submit(jpeg()).await.is_err());
        controller.reset();
        controller.reset();
        assert_eq!(controller.snapshot(), ControllerSnapshot::idle());
    }

    #[tokio::test]
    async fn test_injected_simulator_gives_exact_result() {
        let controller = SubmissionController::http(unreachable_url())
            .with_simulator(ResultSimulator::seeded(11));
        let expected = ResultSimulator::seeded(11).generate("label.jpg");

        assert_eq!(controller.submit(jpeg()).await.unwrap(), expected);
    }

    #[tokio::test]
    async fn test_probe_uses_backend_and_keeps_state() {
        let app = Router::new().route(HEALTH_PATH, get(|| async { "OK" }));
        let controller = SubmissionController::http(spawn_backend(app).await);
        assert!(controller.probe().await);
        assert_eq!(controller.snapshot(), ControllerSnapshot::idle());

        let offline = SubmissionController::http(unreachable_url());
        assert!(!offline.probe().await);
    }
}

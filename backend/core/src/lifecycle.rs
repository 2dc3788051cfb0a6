use serde::Serialize;

use crate::model::SubmissionResult;

/// Advisory shown instead of an error when results were simulated.
pub const DEMO_MODE_NOTICE: &str = "Demo mode: Using simulated results (backend not connected)";

/// Lifecycle of a single submission attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    Idle,
    Processing,
    /// Carries a result; `success` may be true or false.
    Completed,
    /// Transport or protocol failure; no result.
    Failed,
}

/// Everything the presentation layer may read from a controller.
///
/// Published as a whole, so `is_processing`, `result` and `error` always change together.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ControllerSnapshot {
    pub is_processing: bool,
    pub result: Option<SubmissionResult>,
    pub error: Option<String>,
    /// True when `result` came from the simulator rather than the backend.
    pub simulated: bool,
}

impl ControllerSnapshot {
    pub fn idle() -> Self {
        Self::default()
    }

    pub fn processing() -> Self {
        Self {
            is_processing: true,
            ..Self::default()
        }
    }

    pub fn completed(result: SubmissionResult) -> Self {
        let error = result.backend_error().map(str::to_string);
        Self {
            is_processing: false,
            result: Some(result),
            error,
            simulated: false,
        }
    }

    pub fn simulated(result: SubmissionResult) -> Self {
        Self {
            is_processing: false,
            result: Some(result),
            error: Some(DEMO_MODE_NOTICE.to_string()),
            simulated: true,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            is_processing: false,
            result: None,
            error: Some(error.into()),
            simulated: false,
        }
    }

    pub fn state(&self) -> LifecycleState {
        if self.is_processing {
            LifecycleState::Processing
        } else if self.result.is_some() {
            LifecycleState::Completed
        } else if self.error.is_some() {
            LifecycleState::Failed
        } else {
            LifecycleState::Idle
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(success: bool, error: Option<&str>) -> SubmissionResult {
        SubmissionResult {
            success,
            target_match: None,
            detections: vec![],
            full_text: String::new(),
            preprocessing_steps: vec![],
            error: error.map(Into::into),
        }
    }

    #[test]
    fn test_state_derivation() {
        assert_eq!(ControllerSnapshot::idle().state(), LifecycleState::Idle);
        assert_eq!(ControllerSnapshot::processing().state(), LifecycleState::Processing);
        assert_eq!(
            ControllerSnapshot::completed(result(true, None)).state(),
            LifecycleState::Completed
        );
        assert_eq!(ControllerSnapshot::failed("Server error: 500").state(), LifecycleState::Failed);
    }

    #[test]
    fn test_backend_reported_failure_surfaces_error() {
        let snap = ControllerSnapshot::completed(result(false, Some("no pattern")));
        assert_eq!(snap.state(), LifecycleState::Completed);
        assert_eq!(snap.error.as_deref(), Some("no pattern"));
    }

    #[test]
    fn test_successful_result_has_no_error() {
        let snap = ControllerSnapshot::completed(result(true, Some("ignored")));
        assert!(snap.error.is_none());
    }

    #[test]
    fn test_simulated_snapshot_carries_notice() {
        let snap = ControllerSnapshot::simulated(result(true, None));
        assert!(snap.simulated);
        assert!(snap.error.unwrap().contains("simulated"));
    }
}

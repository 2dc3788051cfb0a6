//! Submission Event Logger
//!
//! One structured record per lifecycle transition of a submission.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::redact::redact_sensitive_data;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SubmissionEvent {
    Started {
        file_name: String,
        bytes: usize,
        backend: String,
    },
    Completed {
        success: bool,
        pattern: Option<String>,
        detections: usize,
    },
    /// Backend unreachable; simulated results served instead.
    Simulated {
        reason: String,
        pattern: Option<String>,
    },
    Failed {
        error: String,
    },
    /// Refused because another submission was in flight.
    Rejected,
}

#[derive(Debug, Serialize)]
pub struct SubmissionLogEntry {
    pub submission_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub event: SubmissionEvent,
}

impl SubmissionLogEntry {
    pub fn new(submission_id: Uuid, mut event: SubmissionEvent) -> Self {
        match &mut event {
            SubmissionEvent::Started { backend, .. } => {
                *backend = redact_sensitive_data(backend);
            }
            SubmissionEvent::Simulated { reason, .. } => {
                *reason = redact_sensitive_data(reason);
            }
            SubmissionEvent::Failed { error } => {
                *error = redact_sensitive_data(error);
            }
            SubmissionEvent::Completed { .. } | SubmissionEvent::Rejected => {}
        }
        Self {
            submission_id,
            timestamp: Utc::now(),
            event,
        }
    }
}

pub struct SubmissionEventLogger;

impl SubmissionEventLogger {
    /// Emit a redacted submission event under the `submission_events` target.
    pub fn log_event(submission_id: Uuid, event: SubmissionEvent) {
        let entry = SubmissionLogEntry::new(submission_id, event);
        let json = serde_json::to_string(&entry).unwrap_or_default();
        info!(target: "submission_events", submission_id = %entry.submission_id, event = %json, "Submission event");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_redacts_backend_and_errors() {
        let entry = SubmissionLogEntry::new(
            Uuid::new_v4(),
            SubmissionEvent::Started {
                file_name: "label.jpg".into(),
                bytes: 10,
                backend: "http://user:pw@ocr:8000".into(),
            },
        );
        assert_eq!(
            entry.event,
            SubmissionEvent::Started {
                file_name: "label.jpg".into(),
                bytes: 10,
                backend: "http://[REDACTED]@ocr:8000".into(),
            }
        );

        let entry = SubmissionLogEntry::new(
            Uuid::new_v4(),
            SubmissionEvent::Failed {
                error: "error sending request for url (http://a:b@host/api/ocr)".into(),
            },
        );
        let SubmissionEvent::Failed { error } = entry.event else {
            panic!("event kind changed");
        };
        assert!(!error.contains("a:b"));
    }

    #[test]
    fn test_event_serialization_is_tagged() {
        let entry = SubmissionLogEntry::new(Uuid::nil(), SubmissionEvent::Rejected);
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["event"]["type"], "rejected");
        assert_eq!(value["submission_id"], "00000000-0000-0000-0000-000000000000");
    }
}

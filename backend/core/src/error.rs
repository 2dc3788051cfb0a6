use std::time::Duration;

use thiserror::Error;

/// Failure classes of one exchange with the OCR backend.
///
/// Assigned by the transport; only [`TransportError::Unreachable`] triggers demo mode.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TransportError {
    /// The request could not be dispatched or answered (refused, DNS, offline, bad URL).
    #[error("backend unreachable: {0}")]
    Unreachable(String),

    /// The backend answered with a non-success status.
    #[error("Server error: {status}")]
    Application { status: u16, body: String },

    /// The backend answered, but not with a submission result (bad body, redirect loop).
    #[error("malformed response body: {0}")]
    MalformedResponse(String),

    /// The request was dispatched but no answer arrived within the bound.
    #[error("request timed out after {}s", .0.as_secs_f64())]
    TimedOut(Duration),
}

impl TransportError {
    pub fn is_unreachable(&self) -> bool {
        matches!(self, TransportError::Unreachable(_))
    }

    /// HTTP status for application-level failures.
    pub fn status(&self) -> Option<u16> {
        match self {
            TransportError::Application { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Errors returned by a submission attempt.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SubmitError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("a submission is already in progress")]
    AlreadyInProgress,
}

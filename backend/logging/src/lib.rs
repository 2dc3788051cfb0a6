//! Structured logging for trackscan.
//!
//! Subscriber setup, credential redaction, and per-submission event records.

pub mod event_logger;
pub mod logger;
pub mod redact;

pub use event_logger::{SubmissionEvent, SubmissionEventLogger, SubmissionLogEntry};
pub use logger::{init_logger, LoggerOptions};
pub use redact::redact_sensitive_data;

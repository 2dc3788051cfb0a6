//! `trackscan-client`: talks to the OCR backend.
//!
//! - [`SubmissionController`]: submission lifecycle, failure classification, demo fallback
//! - [`probe()`]: bounded health check
//! - [`simulator`]: synthetic results for when the backend is unreachable
//! - [`transport`]: multipart upload over `reqwest`

pub mod controller;
pub mod probe;
pub mod simulator;
pub mod transport;

#[cfg(test)]
mod test_support;

pub use controller::SubmissionController;
pub use probe::{probe, probe_backend, probe_with_timeout};
pub use simulator::{simulate, simulate_with, ResultSimulator};
pub use transport::{HttpBackend, OcrBackend, Upload};

//! `trackscan-core`: shared types for the trackscan OCR client.
//!
//! The response model is produced either by the remote OCR backend or by the
//! offline simulator, and is what every front end renders.

pub mod error;
pub mod lifecycle;
pub mod model;

pub use error::{SubmitError, TransportError};
pub use lifecycle::{ControllerSnapshot, LifecycleState, DEMO_MODE_NOTICE};
pub use model::{Detection, SubmissionResult, TargetMatch};

//! Error types for the insurascan library.
//!
//! Only *fatal* conditions surface as [`ScanError`]: the run cannot produce a
//! result and the document is force-marked `failed`. Two conditions that look
//! like failures are deliberately NOT here:
//!
//! * an unscannable format (PDF) detected by the classifier, and
//! * model output that is not valid JSON.
//!
//! Both are expected, recoverable states of the world. The pipeline absorbs
//! them into a `needs_review` outcome and still answers the caller with a
//! success envelope carrying `requiresManualReview = true`.
//!
//! Collaborators keep their own error types close to their seams:
//! [`crate::store::StoreError`] and [`crate::pipeline::vision::VisionError`].
//! The orchestrator maps those into this taxonomy at each stage boundary.

use thiserror::Error;

use crate::status::ScanStatus;

/// All fatal errors returned by the scan pipeline.
#[derive(Debug, Error)]
pub enum ScanError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// The trigger request was missing a required field.
    ///
    /// Rejected before any read or write; the document row is untouched.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    // ── Lifecycle errors ──────────────────────────────────────────────────
    /// A status move the state machine does not allow.
    ///
    /// Terminal states admit no further transitions; see
    /// [`ScanStatus::can_transition_to`].
    #[error("Invalid status transition from '{from}' to '{to}'")]
    InvalidTransition { from: ScanStatus, to: ScanStatus },

    // ── Collaborator errors ───────────────────────────────────────────────
    /// The document row or its stored bytes could not be read.
    #[error("Content unavailable for document '{id}': {reason}")]
    ContentUnavailable { id: String, reason: String },

    /// The vision provider answered with a non-success status, a transport
    /// fault, or an empty completion.
    #[error("Vision service call failed: {message}")]
    ExternalService {
        /// Upstream HTTP status, when the provider answered at all.
        status: Option<u16>,
        message: String,
    },

    /// A terminal write to the content store failed.
    #[error("Failed to persist scan result for document '{id}': {reason}")]
    Persistence { id: String, reason: String },
}

impl ScanError {
    /// HTTP status the service layer answers with for this error.
    ///
    /// Input validation maps to 400, a refused transition to 409, every
    /// collaborator fault to 500.
    pub fn http_status(&self) -> u16 {
        match self {
            ScanError::InvalidRequest(_) => 400,
            ScanError::InvalidTransition { .. } => 409,
            ScanError::ContentUnavailable { .. }
            | ScanError::ExternalService { .. }
            | ScanError::Persistence { .. } => 500,
        }
    }
}

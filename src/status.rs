//! Document lifecycle status and its transition rules.
//!
//! Lifecycle is a closed set of five named states rather than a free-form
//! string, so call sites cannot invent spellings. `needs_review` is the one
//! canonical manual-review state; the legacy spelling
//! `pending_manual_review` is still accepted when reading rows written
//! before the rename, and is never written back.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle state of a document under scan.
///
/// Serialized snake_case, matching the `ai_scan_status` column values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanStatus {
    /// Uploaded, not yet picked up by a scan run.
    Received,
    /// A scan run is in flight.
    Processing,
    /// Extraction and scoring finished.
    Completed,
    /// Automated analysis was inconclusive or inapplicable; a human must
    /// verify the insurance details.
    #[serde(alias = "pending_manual_review")]
    NeedsReview,
    /// The run hit a fatal fault; the message is recorded in
    /// `ai_scan_errors`.
    Failed,
}

impl ScanStatus {
    /// Wire spelling of this status.
    pub fn as_str(self) -> &'static str {
        match self {
            ScanStatus::Received => "received",
            ScanStatus::Processing => "processing",
            ScanStatus::Completed => "completed",
            ScanStatus::NeedsReview => "needs_review",
            ScanStatus::Failed => "failed",
        }
    }

    /// Whether this status admits no further transitions.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            ScanStatus::Completed | ScanStatus::NeedsReview | ScanStatus::Failed
        )
    }

    /// Transition table for the document lifecycle.
    ///
    /// Progress is monotonic: a received document moves to `processing`,
    /// an in-flight run re-marks `processing` (re-trigger), finishes in
    /// `completed` or `needs_review`, or is forced to `failed` from any
    /// in-flight state. Terminal states never move again.
    pub fn can_transition_to(self, next: ScanStatus) -> bool {
        use ScanStatus::*;
        matches!(
            (self, next),
            (Received, Processing)
                | (Processing, Processing)
                | (Processing, Completed)
                | (Processing, NeedsReview)
                | (Received, Failed)
                | (Processing, Failed)
        )
    }
}

impl fmt::Display for ScanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

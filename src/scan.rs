//! Scan orchestration: one document through the full pipeline, strictly
//! forward, one run per trigger.
//!
//! ## Failure policy
//!
//! Conditions split into two tiers:
//!
//! * **Fatal**, returned as `Err(ScanError)`: bad input, store read or
//!   download failure, vision call failure, terminal-write failure. After
//!   intake, every fatal error also force-marks the document `failed`,
//!   best effort.
//! * **Recoverable**, returned as `Ok` with `requires_manual_review`: PDF
//!   formats and unparsable model replies persist a `needs_review` outcome
//!   and report success. Extraction unreliability never blocks the
//!   document-review workflow.
//!
//! Same-id coordination is the caller's concern: concurrent runs targeting
//! one document are not locked out here.

use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use tracing::{debug, error, info, warn};

use crate::error::ScanError;
use crate::pipeline::classify::{classify, FormatClass};
use crate::pipeline::parse::{excerpt, parse_extraction};
use crate::pipeline::score::validation_score;
use crate::pipeline::vision::VisionModel;
use crate::prompts::EXTRACTION_PROMPT;
use crate::record::{ScanData, ScanRequest};
use crate::status::ScanStatus;
use crate::store::{ContentStore, DocumentPatch};

/// Confidence reported on a fully parsed extraction. A fixed placeholder;
/// override with [`Scanner::with_confidence_score`].
pub const DEFAULT_CONFIDENCE_SCORE: f64 = 0.85;

/// Fixed validation and confidence scores for a format routed to review.
const UNSCANNABLE_SCORE: f64 = 0.5;

/// Media type assumed when the row does not declare one. Conservative:
/// unknown uploads go to manual review rather than to the model.
const FALLBACK_MEDIA_TYPE: &str = "application/pdf";

/// Raw-reply excerpt length persisted alongside a parse failure.
const RAW_EXCERPT_CHARS: usize = 500;

/// Drives the scan pipeline end to end.
///
/// Cheap to clone: collaborators are shared behind `Arc`, so one `Scanner`
/// can serve every request a process handles.
#[derive(Clone)]
pub struct Scanner {
    store: Arc<dyn ContentStore>,
    vision: Arc<dyn VisionModel>,
    confidence_score: f64,
}

impl Scanner {
    pub fn new(store: Arc<dyn ContentStore>, vision: Arc<dyn VisionModel>) -> Self {
        Self {
            store,
            vision,
            confidence_score: DEFAULT_CONFIDENCE_SCORE,
        }
    }

    /// Override the fixed confidence reported on successful extractions.
    /// Clamped to `[0.0, 1.0]`.
    pub fn with_confidence_score(mut self, confidence_score: f64) -> Self {
        self.confidence_score = confidence_score.clamp(0.0, 1.0);
        self
    }

    /// Run the full pipeline for one document.
    ///
    /// # Arguments
    /// * `request` - trigger payload naming the document and its uploaded
    ///   file
    ///
    /// # Returns
    /// `Ok(ScanData)` for both fully automated extractions and
    /// manual-review outcomes; check `requires_manual_review` to tell them
    /// apart.
    ///
    /// # Errors
    /// Returns `Err(ScanError)` only for fatal conditions (see the module
    /// docs). On every fatal error after input validation the document is
    /// force-marked `failed`, best effort.
    pub async fn scan(&self, request: ScanRequest) -> Result<ScanData, ScanError> {
        // ── Step 1: Validate input ───────────────────────────────────────
        // Rejected before any side effect; the document row is untouched.
        let document_id = require_field(request.document_id, "documentId")?;
        let file_url = require_field(request.file_url, "fileUrl")?;

        info!(%document_id, "Starting insurance document scan");

        match self.run(&document_id, &file_url).await {
            Ok(data) => Ok(data),
            Err(err) => {
                self.mark_failed(&document_id, &err).await;
                Err(err)
            }
        }
    }

    async fn run(&self, document_id: &str, file_url: &str) -> Result<ScanData, ScanError> {
        let mut status = StatusTrack::new();

        // ── Step 2: Mark processing ──────────────────────────────────────
        status.advance(ScanStatus::Processing)?;
        if let Err(err) = self
            .store
            .update_document(document_id, &DocumentPatch::status(ScanStatus::Processing))
            .await
        {
            // The intake mark is advisory; the terminal write is the one
            // that must stick.
            warn!(%document_id, %err, "Could not mark document as processing");
        }

        // ── Step 3: Read the document row ────────────────────────────────
        let row = self
            .store
            .fetch_document(document_id)
            .await
            .map_err(|err| ScanError::ContentUnavailable {
                id: document_id.to_string(),
                reason: err.to_string(),
            })?;

        let stored_path = row
            .file_url
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| file_url.to_string());
        let media_type = row
            .mime_type
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| FALLBACK_MEDIA_TYPE.to_string());
        debug!(%document_id, %stored_path, %media_type, "Resolved stored file");

        // ── Step 4: Classify the format ──────────────────────────────────
        // Runs before the download: a PDF never costs bytes or tokens.
        if classify(&media_type, &stored_path) == FormatClass::NonAnalyzable {
            info!(%document_id, "Format is not analyzable; routing to manual review");
            return self.review_unscannable(document_id, &mut status).await;
        }

        // ── Step 5: Download the stored bytes ────────────────────────────
        let bytes = self
            .store
            .download(&stored_path)
            .await
            .map_err(|err| ScanError::ContentUnavailable {
                id: document_id.to_string(),
                reason: err.to_string(),
            })?;
        if bytes.is_empty() {
            return Err(ScanError::ContentUnavailable {
                id: document_id.to_string(),
                reason: format!("stored object '{stored_path}' is empty"),
            });
        }
        debug!(%document_id, bytes = bytes.len(), "Downloaded stored object");

        // ── Step 6: Vision extraction ────────────────────────────────────
        let raw = self
            .vision
            .extract(&bytes, &media_type, EXTRACTION_PROMPT)
            .await
            .map_err(|err| ScanError::ExternalService {
                status: err.status(),
                message: err.to_string(),
            })?;

        // ── Step 7: Parse the reply ──────────────────────────────────────
        let record = match parse_extraction(&raw) {
            Ok(record) => record,
            Err(err) => {
                warn!(%document_id, %err, "Model reply did not parse; routing to manual review");
                return self.review_unparsable(document_id, &raw, &mut status).await;
            }
        };

        // ── Step 8: Score ────────────────────────────────────────────────
        let score = validation_score(&record, Utc::now().date_naive());
        info!(%document_id, score, "Extraction scored");

        // ── Step 9: Persist the completed outcome ────────────────────────
        status.advance(ScanStatus::Completed)?;
        let patch = DocumentPatch::outcome(
            ScanStatus::Completed,
            serde_json::to_value(&record).unwrap_or_default(),
            score,
            self.confidence_score,
            Utc::now(),
        );
        self.persist(document_id, &patch).await?;

        Ok(ScanData::completed(record, score, self.confidence_score))
    }

    /// Terminal review outcome for a format the model cannot analyse.
    async fn review_unscannable(
        &self,
        document_id: &str,
        status: &mut StatusTrack,
    ) -> Result<ScanData, ScanError> {
        status.advance(ScanStatus::NeedsReview)?;
        let placeholder = json!({
            "note": "PDF documents require manual review. Please verify the insurance details.",
            "provider": null,
            "policyNumber": null,
            "startDate": null,
            "endDate": null,
        });
        let patch = DocumentPatch::outcome(
            ScanStatus::NeedsReview,
            placeholder,
            UNSCANNABLE_SCORE,
            UNSCANNABLE_SCORE,
            Utc::now(),
        );
        self.persist(document_id, &patch).await?;

        Ok(ScanData::review(
            "PDF requires manual review",
            UNSCANNABLE_SCORE,
            UNSCANNABLE_SCORE,
        ))
    }

    /// Terminal review outcome for a model reply that did not parse.
    /// Keeps the head of the raw reply for the human audit trail.
    async fn review_unparsable(
        &self,
        document_id: &str,
        raw: &str,
        status: &mut StatusTrack,
    ) -> Result<ScanData, ScanError> {
        status.advance(ScanStatus::NeedsReview)?;
        let placeholder = json!({
            "note": "AI could not extract structured data from this document",
            "raw_response": excerpt(raw, RAW_EXCERPT_CHARS),
        });
        let patch = DocumentPatch::outcome(ScanStatus::NeedsReview, placeholder, 0.0, 0.0, Utc::now());
        self.persist(document_id, &patch).await?;

        Ok(ScanData::review("Document requires manual review", 0.0, 0.0))
    }

    /// Terminal write; a failure here fails the whole run.
    async fn persist(&self, document_id: &str, patch: &DocumentPatch) -> Result<(), ScanError> {
        self.store
            .update_document(document_id, patch)
            .await
            .map_err(|err| ScanError::Persistence {
                id: document_id.to_string(),
                reason: err.to_string(),
            })
    }

    /// Best-effort recovery write after a fatal error. A secondary store
    /// error is logged and swallowed.
    async fn mark_failed(&self, document_id: &str, cause: &ScanError) {
        error!(%document_id, %cause, "Scan failed");
        let patch = DocumentPatch::failed(cause.to_string());
        if let Err(err) = self.store.update_document(document_id, &patch).await {
            warn!(%document_id, %err, "Could not mark document as failed");
        }
    }
}

/// Extract a required request field, rejecting missing or blank values.
fn require_field(value: Option<String>, name: &str) -> Result<String, ScanError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ScanError::InvalidRequest(format!("{name} is required"))),
    }
}

/// The run's own view of the document lifecycle. Refuses moves the state
/// machine does not allow, so an invalid status can never be persisted.
struct StatusTrack {
    current: ScanStatus,
}

impl StatusTrack {
    fn new() -> Self {
        Self {
            current: ScanStatus::Received,
        }
    }

    fn advance(&mut self, next: ScanStatus) -> Result<(), ScanError> {
        if !self.current.can_transition_to(next) {
            return Err(ScanError::InvalidTransition {
                from: self.current,
                to: next,
            });
        }
        self.current = next;
        Ok(())
    }
}

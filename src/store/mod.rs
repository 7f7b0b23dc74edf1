//! Content store seam: document rows and raw object bytes.
//!
//! One scan run touches the store three ways: read one row, download one
//! object, patch one row. [`ContentStore`] keeps exactly those operations
//! behind a trait so the scan logic runs against [`MemoryStore`] in tests
//! and [`RestStore`] in production.

pub mod memory;
pub mod rest;

pub use memory::MemoryStore;
pub use rest::RestStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::status::ScanStatus;

/// Errors from the content store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No row or object matched the requested key.
    #[error("not found in store: '{0}'")]
    NotFound(String),

    /// The store answered with a non-success HTTP status.
    #[error("store request failed with HTTP {status}: {body}")]
    RequestFailed { status: u16, body: String },

    /// The request or its response never made it across the wire intact.
    #[error("store transport error: {0}")]
    Transport(String),
}

/// The columns one scan run reads for a document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentRow {
    /// Stored file path inside the customer-documents bucket.
    pub file_url: Option<String>,
    /// Declared media type recorded at upload.
    pub mime_type: Option<String>,
}

/// Partial update written back to a document row.
///
/// `None` fields are omitted from the serialized body and left untouched by
/// the store.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DocumentPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_scan_status: Option<ScanStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_extracted_data: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_validation_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_confidence_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scanned_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_scan_errors: Option<Vec<String>>,
}

impl DocumentPatch {
    /// Patch that only moves the status column.
    pub fn status(status: ScanStatus) -> Self {
        Self {
            ai_scan_status: Some(status),
            ..Self::default()
        }
    }

    /// Terminal patch: status, extracted payload, both scores, and the
    /// completion timestamp.
    pub fn outcome(
        status: ScanStatus,
        extracted: serde_json::Value,
        validation_score: f64,
        confidence_score: f64,
        scanned_at: DateTime<Utc>,
    ) -> Self {
        Self {
            ai_scan_status: Some(status),
            ai_extracted_data: Some(extracted),
            ai_validation_score: Some(validation_score),
            ai_confidence_score: Some(confidence_score),
            scanned_at: Some(scanned_at),
            ai_scan_errors: None,
        }
    }

    /// Recovery patch: `failed` status plus the triggering message.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            ai_scan_status: Some(ScanStatus::Failed),
            ai_scan_errors: Some(vec![message.into()]),
            ..Self::default()
        }
    }
}

/// The three store operations one scan run needs.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Read the stored file path and declared media type for a document.
    async fn fetch_document(&self, id: &str) -> Result<DocumentRow, StoreError>;

    /// Apply a partial update to a document row.
    async fn update_document(&self, id: &str, patch: &DocumentPatch) -> Result<(), StoreError>;

    /// Download raw object bytes by stored path.
    async fn download(&self, path: &str) -> Result<Vec<u8>, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn patch_omits_untouched_fields() {
        let patch = DocumentPatch::status(ScanStatus::Processing);
        let value = serde_json::to_value(&patch).unwrap();
        assert_eq!(value, json!({ "ai_scan_status": "processing" }));
    }

    #[test]
    fn failed_patch_records_the_message() {
        let patch = DocumentPatch::failed("store download failed");
        let value = serde_json::to_value(&patch).unwrap();
        assert_eq!(
            value,
            json!({
                "ai_scan_status": "failed",
                "ai_scan_errors": ["store download failed"]
            })
        );
    }

    #[test]
    fn outcome_patch_carries_scores_and_timestamp() {
        let at = "2025-06-01T12:00:00Z".parse::<DateTime<Utc>>().unwrap();
        let patch = DocumentPatch::outcome(
            ScanStatus::Completed,
            json!({ "isValid": true }),
            0.85,
            0.85,
            at,
        );
        let value = serde_json::to_value(&patch).unwrap();
        assert_eq!(value["ai_scan_status"], json!("completed"));
        assert_eq!(value["ai_validation_score"], json!(0.85));
        assert_eq!(value["ai_confidence_score"], json!(0.85));
        assert_eq!(value["scanned_at"], json!("2025-06-01T12:00:00Z"));
        assert!(value.get("ai_scan_errors").is_none());
    }

    #[test]
    fn document_row_decodes_missing_columns() {
        let row: DocumentRow = serde_json::from_str("{}").unwrap();
        assert!(row.file_url.is_none());
        assert!(row.mime_type.is_none());
    }
}

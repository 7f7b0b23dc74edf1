//! Wire and domain types: the trigger request, the extracted insurance
//! record, and the response envelope.
//!
//! Everything here is camelCase on the wire. The extraction record is
//! decoded *strictly*: a missing field falls back to its default (absence is
//! an expected model behaviour, never an error), but a type mismatch is a
//! decode failure and routes the document to manual review.

use serde::{Deserialize, Serialize};

/// Trigger payload: `{ "documentId": "...", "fileUrl": "..." }`.
///
/// Both fields are optional at the decode layer so that a missing or empty
/// value is rejected by the pipeline's own validation (HTTP 400 with a named
/// field) instead of a generic body-decode error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScanRequest {
    pub document_id: Option<String>,
    pub file_url: Option<String>,
}

impl ScanRequest {
    pub fn new(document_id: impl Into<String>, file_url: impl Into<String>) -> Self {
        Self {
            document_id: Some(document_id.into()),
            file_url: Some(file_url.into()),
        }
    }
}

/// Structured output of AI extraction.
///
/// Every field is independently optional; the scorer treats an absent field
/// as zero contribution. Dates stay strings here, validity checking belongs
/// to the scorer. A new extraction overwrites the stored record wholesale.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InsuranceRecord {
    pub policy_number: Option<String>,
    pub provider: Option<String>,
    /// `YYYY-MM-DD`, as the model was instructed to produce.
    pub start_date: Option<String>,
    /// `YYYY-MM-DD`; must also not be in the past to count as valid.
    pub end_date: Option<String>,
    pub coverage_amount: Option<f64>,
    /// The model's own self-assessed validity judgment.
    pub is_valid: bool,
    /// Free-text issues or confirmations from the model.
    pub validation_notes: String,
}

/// The `extractedData` field of a scan response: either the full record or
/// a short note explaining why a human has to look at the document.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ExtractedPayload {
    Record(InsuranceRecord),
    Note { note: String },
}

impl ExtractedPayload {
    pub fn note(message: impl Into<String>) -> Self {
        ExtractedPayload::Note {
            note: message.into(),
        }
    }
}

fn is_false(flag: &bool) -> bool {
    !*flag
}

/// Scan outcome returned to the caller on success or recoverable review.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanData {
    pub extracted_data: ExtractedPayload,
    pub validation_score: f64,
    pub confidence_score: f64,
    /// Present (and `true`) only on manual-review outcomes.
    #[serde(skip_serializing_if = "is_false")]
    pub requires_manual_review: bool,
}

impl ScanData {
    /// Outcome of a fully automated extraction.
    pub fn completed(record: InsuranceRecord, validation_score: f64, confidence_score: f64) -> Self {
        Self {
            extracted_data: ExtractedPayload::Record(record),
            validation_score,
            confidence_score,
            requires_manual_review: false,
        }
    }

    /// Outcome that needs a human: placeholder note plus fixed scores.
    pub fn review(note: impl Into<String>, validation_score: f64, confidence_score: f64) -> Self {
        Self {
            extracted_data: ExtractedPayload::note(note),
            validation_score,
            confidence_score,
            requires_manual_review: true,
        }
    }
}

/// Top-level response envelope.
///
/// Success and failure shapes never mix: `{"success":true,"data":{...}}` or
/// `{"success":false,"error":"..."}`.
#[derive(Debug, Clone, Serialize)]
pub struct ScanResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<ScanData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ScanResponse {
    pub fn ok(data: ScanData) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn record_decodes_camel_case() {
        let record: InsuranceRecord = serde_json::from_value(json!({
            "policyNumber": "POL-123",
            "provider": "Acme Insurance",
            "startDate": "2025-01-01",
            "endDate": "2026-01-01",
            "coverageAmount": 50000.0,
            "isValid": true,
            "validationNotes": "All fields present"
        }))
        .unwrap();
        assert_eq!(record.policy_number.as_deref(), Some("POL-123"));
        assert_eq!(record.coverage_amount, Some(50000.0));
        assert!(record.is_valid);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let record: InsuranceRecord = serde_json::from_value(json!({
            "provider": "Acme Insurance"
        }))
        .unwrap();
        assert_eq!(record.policy_number, None);
        assert_eq!(record.start_date, None);
        assert_eq!(record.coverage_amount, None);
        assert!(!record.is_valid);
        assert_eq!(record.validation_notes, "");
    }

    #[test]
    fn explicit_nulls_decode_as_absent() {
        let record: InsuranceRecord = serde_json::from_value(json!({
            "policyNumber": null,
            "provider": null,
            "startDate": null,
            "endDate": null,
            "coverageAmount": null,
            "isValid": false,
            "validationNotes": "nothing legible"
        }))
        .unwrap();
        assert_eq!(record, InsuranceRecord {
            validation_notes: "nothing legible".into(),
            ..InsuranceRecord::default()
        });
    }

    #[test]
    fn type_mismatch_is_a_decode_failure() {
        // coverageAmount as a string violates the instructed shape.
        let result = serde_json::from_value::<InsuranceRecord>(json!({
            "coverageAmount": "50000"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn review_payload_serializes_note_only() {
        let data = ScanData::review("PDF requires manual review", 0.5, 0.5);
        let value = serde_json::to_value(&data).unwrap();
        assert_eq!(
            value,
            json!({
                "extractedData": { "note": "PDF requires manual review" },
                "validationScore": 0.5,
                "confidenceScore": 0.5,
                "requiresManualReview": true
            })
        );
    }

    #[test]
    fn completed_payload_omits_review_flag() {
        let data = ScanData::completed(InsuranceRecord::default(), 0.0, 0.85);
        let value = serde_json::to_value(&data).unwrap();
        assert!(value.get("requiresManualReview").is_none());
        assert_eq!(value["extractedData"]["isValid"], json!(false));
    }

    #[test]
    fn envelope_shapes_never_mix() {
        let ok = serde_json::to_value(ScanResponse::ok(ScanData::review("n", 0.0, 0.0))).unwrap();
        assert_eq!(ok["success"], json!(true));
        assert!(ok.get("error").is_none());

        let fail = serde_json::to_value(ScanResponse::fail("store unreachable")).unwrap();
        assert_eq!(fail["success"], json!(false));
        assert_eq!(fail["error"], json!("store unreachable"));
        assert!(fail.get("data").is_none());
    }

    #[test]
    fn request_tolerates_missing_fields() {
        let req: ScanRequest = serde_json::from_str("{}").unwrap();
        assert!(req.document_id.is_none());
        assert!(req.file_url.is_none());
    }
}

//! Extraction parsing: raw model text → structured [`InsuranceRecord`].
//!
//! Despite being asked for bare JSON, models routinely wrap their reply in
//! markdown code fences. Fence markers are removed literally (every
//! occurrence of ```` ```json ```` and ```` ``` ````), the remainder is
//! trimmed and decoded strictly.
//!
//! A failed parse is a recoverable condition, not a pipeline error: the
//! orchestrator turns it into a manual-review outcome and keeps the first
//! 500 characters of the raw reply for the human audit trail.

use thiserror::Error;

use crate::record::InsuranceRecord;

/// The model reply was not the instructed JSON shape.
#[derive(Debug, Error)]
#[error("Model reply is not valid extraction JSON: {reason}")]
pub struct ParseFailure {
    pub reason: String,
}

/// Remove markdown code fences and surrounding whitespace.
fn strip_fences(raw: &str) -> String {
    raw.replace("```json", "").replace("```", "").trim().to_string()
}

/// Parse the raw model reply into a structured record.
///
/// Missing fields decode to their defaults; a type mismatch fails the whole
/// parse (see [`crate::record`]).
pub fn parse_extraction(raw: &str) -> Result<InsuranceRecord, ParseFailure> {
    let cleaned = strip_fences(raw);
    serde_json::from_str(&cleaned).map_err(|err| ParseFailure {
        reason: err.to_string(),
    })
}

/// First `limit` characters of the raw reply, for persistence alongside a
/// failed parse. Counted in chars so a multi-byte boundary cannot split.
pub fn excerpt(raw: &str, limit: usize) -> String {
    raw.chars().take(limit).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const BARE: &str = r#"{"policyNumber": "POL-9", "isValid": true}"#;

    #[test]
    fn parses_bare_json() {
        let record = parse_extraction(BARE).expect("bare JSON parses");
        assert_eq!(record.policy_number.as_deref(), Some("POL-9"));
        assert!(record.is_valid);
    }

    #[test]
    fn fenced_and_unfenced_parse_identically() {
        let fenced = format!("```json\n{BARE}\n```");
        assert_eq!(
            parse_extraction(&fenced).unwrap(),
            parse_extraction(BARE).unwrap()
        );

        let plain_fence = format!("```\n{BARE}\n```");
        assert_eq!(
            parse_extraction(&plain_fence).unwrap(),
            parse_extraction(BARE).unwrap()
        );
    }

    #[test]
    fn tolerates_surrounding_whitespace() {
        let padded = format!("\n\n  {BARE}  \n");
        assert!(parse_extraction(&padded).is_ok());
    }

    #[test]
    fn prose_reply_is_a_parse_failure() {
        let err = parse_extraction("I cannot analyze this image.").unwrap_err();
        assert!(err.to_string().contains("not valid extraction JSON"));
    }

    #[test]
    fn type_mismatch_is_a_parse_failure() {
        assert!(parse_extraction(r#"{"coverageAmount": "a lot"}"#).is_err());
    }

    #[test]
    fn empty_reply_is_a_parse_failure() {
        assert!(parse_extraction("").is_err());
        assert!(parse_extraction("``````").is_err());
    }

    #[test]
    fn excerpt_truncates_by_chars() {
        let long = "é".repeat(600);
        let cut = excerpt(&long, 500);
        assert_eq!(cut.chars().count(), 500);

        assert_eq!(excerpt("short", 500), "short");
    }
}

//! Fixed prompts for the vision extraction call.
//!
//! Centralising the prompts here serves two purposes:
//!
//! 1. **Single source of truth**: the field list, the typing hints, and the
//!    "null rather than guess" instruction must stay in lockstep with
//!    [`crate::record::InsuranceRecord`]; one place to edit keeps them honest.
//!
//! 2. **Wire contract**: the extraction parser assumes the model was asked
//!    for bare JSON in exactly this shape. A reworded prompt changes what
//!    arrives on the wire, so treat edits here as behavioural changes, not
//!    copy tweaks.

/// System persona for the extraction call.
pub const SYSTEM_PROMPT: &str = "You are an expert at analyzing insurance documents. Extract structured information from the provided document image accurately.";

/// User instruction sent alongside the document image.
///
/// Enumerates the record fields with explicit typing hints and instructs the
/// model to answer with bare JSON. [`crate::pipeline::parse`] still strips
/// code fences, since models do not always comply.
pub const EXTRACTION_PROMPT: &str = r#"Analyze this insurance document image and extract the following information. Return ONLY valid JSON without any markdown formatting or code blocks:
{
  "policyNumber": "string or null",
  "provider": "string or null",
  "startDate": "YYYY-MM-DD or null",
  "endDate": "YYYY-MM-DD or null",
  "coverageAmount": number or null,
  "isValid": boolean,
  "validationNotes": "string describing any issues or confirmations"
}

If any field cannot be determined, use null. Be strict and only extract data you are confident about."#;

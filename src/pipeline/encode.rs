//! Image encoding: raw stored bytes → base64 data URI.
//!
//! The vision endpoint accepts images embedded in the JSON request body as
//! `data:<media type>;base64,<payload>` URIs. The declared media type is
//! carried through verbatim; the bytes are never sniffed or re-encoded.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use tracing::debug;

/// Wrap raw image bytes as a base64 data URI for the vision request body.
pub fn to_data_uri(bytes: &[u8], media_type: &str) -> String {
    let b64 = STANDARD.encode(bytes);
    debug!("Encoded image: {} bytes base64", b64.len());
    format!("data:{media_type};base64,{b64}")
}

//! Format classification: can this file go to the vision model at all?
//!
//! The vision endpoint accepts images only. PDFs (and anything declaring
//! itself one) are routed to manual review before any bytes are downloaded
//! or tokens spent. Every other declared type is treated as an image and
//! passed through; if the model cannot read it, the parse stage catches the
//! fallout and routes to review anyway.

/// What the pipeline can do with a stored file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatClass {
    /// An image the vision model can analyse directly.
    AnalyzableImage,
    /// A PDF; automated analysis is not attempted.
    NonAnalyzable,
}

/// Classify a stored file by its declared media type and path.
///
/// A file is non-analyzable iff the media type is exactly
/// `application/pdf` or the path ends in `.pdf` (case-insensitive).
/// No I/O, no network.
pub fn classify(media_type: &str, file_path: &str) -> FormatClass {
    if media_type == "application/pdf" || file_path.to_lowercase().ends_with(".pdf") {
        FormatClass::NonAnalyzable
    } else {
        FormatClass::AnalyzableImage
    }
}

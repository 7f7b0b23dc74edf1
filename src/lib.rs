//! # insurascan
//!
//! AI-assisted scanning and validation of uploaded insurance documents.
//!
//! ## What it does
//!
//! A customer uploads a photo of their insurance certificate; this crate
//! reads the stored image with a vision-capable language model, extracts a
//! structured record (policy number, provider, coverage dates, amount),
//! scores the record's completeness deterministically, and writes status,
//! record, and scores back to the content store. Documents automation
//! cannot handle (PDFs, replies that do not parse) are parked for human
//! review instead of being rejected: extraction unreliability never blocks
//! the review workflow.
//!
//! ## Pipeline Overview
//!
//! ```text
//! trigger {documentId, fileUrl}
//!  │
//!  ├─ 1. Intake    mark processing, read stored path + media type
//!  ├─ 2. Classify  PDF? park for manual review before spending anything
//!  ├─ 3. Fetch     download the stored bytes
//!  ├─ 4. Extract   one vision chat completion, image as base64 data URI
//!  ├─ 5. Parse     strip code fences, strict JSON decode
//!  ├─ 6. Score     fixed per-field weights, result in [0.0, 1.0]
//!  └─ 7. Persist   status + record + scores + scanned_at
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use insurascan::{OpenAiVision, RestStore, ScanRequest, Scanner};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Arc::new(RestStore::new(
//!         "https://project.supabase.co",
//!         std::env::var("STORE_SERVICE_KEY")?,
//!     ));
//!     let vision = Arc::new(OpenAiVision::new(std::env::var("OPENAI_API_KEY")?));
//!     let scanner = Scanner::new(store, vision);
//!
//!     let data = scanner
//!         .scan(ScanRequest::new("doc-123", "uploads/doc-123.jpg"))
//!         .await?;
//!     println!("validation score: {}", data.validation_score);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature  | Default | Description |
//! |----------|---------|-------------|
//! | `server` | on      | HTTP surface and the `insurascan` binary (axum + tower-http + clap) |
//!
//! Disable `server` when embedding only the pipeline:
//! ```toml
//! insurascan = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod error;
pub mod pipeline;
pub mod prompts;
pub mod record;
pub mod scan;
#[cfg(feature = "server")]
pub mod server;
pub mod status;
pub mod store;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use error::ScanError;
pub use pipeline::vision::{OpenAiVision, VisionError, VisionModel};
pub use record::{ExtractedPayload, InsuranceRecord, ScanData, ScanRequest, ScanResponse};
pub use scan::{Scanner, DEFAULT_CONFIDENCE_SCORE};
pub use status::ScanStatus;
pub use store::{ContentStore, DocumentPatch, DocumentRow, MemoryStore, RestStore, StoreError};

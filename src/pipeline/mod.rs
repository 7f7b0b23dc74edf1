//! Pipeline stages for insurance-document scanning.
//!
//! Each submodule implements exactly one transformation step. Keeping stages
//! separate makes each independently testable and lets the orchestrator in
//! [`crate::scan`] stay a plain forward sequence of calls.
//!
//! ## Data Flow
//!
//! ```text
//! classify ──▶ download ──▶ encode ──▶ vision ──▶ parse ──▶ score
//! (media type)  (store)     (base64)   (model)    (JSON)   (weights)
//! ```
//!
//! 1. [`classify`] decides from the declared media type / path whether the
//!    file can be analysed at all; PDFs short-circuit to manual review
//! 2. [`encode`] wraps the downloaded bytes as a base64 data URI for the
//!    multimodal request body
//! 3. [`vision`] makes the single model call; the only stage here with
//!    network I/O
//! 4. [`parse`] strips code fences and decodes the strict JSON record
//! 5. [`score`] computes the deterministic weighted completeness score
//!
//! The download step lives with the store seam in [`crate::store`].

pub mod classify;
pub mod encode;
pub mod parse;
pub mod score;
pub mod vision;

//! Core library for identity document ingestion.
//!
//! This crate provides:
//! - Remote document retrieval with content-type validation
//! - A transient, per-run document store with guaranteed cleanup
//! - PDF text decoding
//! - Rule-based extraction of identity fields (name, CPF, filiation, birth date,
//!   nationality, sex, marital status)

pub mod error;
pub mod fetch;
pub mod identity;
pub mod models;
pub mod pdf;
pub mod pipeline;
pub mod store;

#[cfg(test)]
mod test_support;

pub use error::{ErrorKind, PipelineError, Result};
pub use fetch::{DocumentFetcher, HttpFetcher, RetrievedDocument};
pub use identity::{extract_identity, ExtractionResult, IdentityParser, RuleSet};
pub use models::{DocidConfig, IdentityField, IdentityRecord, JobRequest};
pub use pdf::{PdfTextDecoder, TextDecoder};
pub use pipeline::{Pipeline, RunReport};
pub use store::{RunId, TransientArtifact, TransientStore};

//! Document-to-text decoding.

mod decoder;

pub use decoder::{PdfDocument, PdfTextDecoder};

use crate::error::DecodeError;

/// The single content type accepted for retrieval.
pub const PDF_MIME: &str = "application/pdf";

/// Result type for decode operations.
pub type Result<T> = std::result::Result<T, DecodeError>;

/// Converts stored document bytes into plain text.
///
/// Decoding is a bounded, blocking call; async callers should run it on a
/// blocking thread.
pub trait TextDecoder: Send + Sync {
    /// Decode raw document bytes into text.
    fn decode(&self, data: &[u8]) -> Result<String>;
}

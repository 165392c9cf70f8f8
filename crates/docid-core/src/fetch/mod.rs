//! Remote document retrieval.

mod http;

pub use http::HttpFetcher;

use async_trait::async_trait;
use futures_util::stream::BoxStream;
pub use reqwest::Url;

use crate::error::{FetchError, ValidationError};
use crate::pdf::PDF_MIME;

/// Body of a retrieved document, delivered in chunks.
pub type ByteStream = BoxStream<'static, Result<Vec<u8>, FetchError>>;

/// A document whose headers have arrived and whose body is still pending.
pub struct RetrievedDocument {
    /// Declared content type, if the server sent one.
    pub content_type: Option<String>,
    /// Declared body length, if known.
    pub content_length: Option<u64>,
    /// Body stream. Nothing is read until the caller polls it.
    pub body: ByteStream,
}

impl RetrievedDocument {
    pub fn new(content_type: Option<String>, body: ByteStream) -> Self {
        Self {
            content_type,
            content_length: None,
            body,
        }
    }

    pub fn with_content_length(mut self, length: Option<u64>) -> Self {
        self.content_length = length;
        self
    }
}

impl std::fmt::Debug for RetrievedDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetrievedDocument")
            .field("content_type", &self.content_type)
            .field("content_length", &self.content_length)
            .finish_non_exhaustive()
    }
}

/// Retrieves documents from remote references.
#[async_trait]
pub trait DocumentFetcher: Send + Sync {
    /// Start retrieving `url`, returning once headers are available.
    async fn fetch(&self, url: &Url) -> Result<RetrievedDocument, FetchError>;
}

/// Check that a declared content type is the accepted PDF type.
///
/// The header must equal the PDF media type exactly; parameters, other
/// spellings and an absent header are all rejected.
pub fn validate_content_type(content_type: Option<&str>) -> Result<(), ValidationError> {
    match content_type {
        Some(PDF_MIME) => Ok(()),
        other => Err(ValidationError::ContentType {
            found: other.map(str::to_string),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_content_type() {
        assert!(validate_content_type(Some("application/pdf")).is_ok());

        assert_eq!(
            validate_content_type(None),
            Err(ValidationError::ContentType { found: None })
        );
        assert_eq!(
            validate_content_type(Some("application/x-pdf")),
            Err(ValidationError::ContentType {
                found: Some("application/x-pdf".to_string())
            })
        );
        assert!(validate_content_type(Some("application/octet-stream")).is_err());
        assert!(validate_content_type(Some("")).is_err());
    }

    #[test]
    fn test_content_type_must_match_exactly() {
        assert_eq!(
            validate_content_type(Some("application/pdf; charset=binary")),
            Err(ValidationError::ContentType {
                found: Some("application/pdf; charset=binary".to_string())
            })
        );
        assert!(validate_content_type(Some("APPLICATION/PDF")).is_err());
        assert!(validate_content_type(Some(" application/pdf")).is_err());
    }
}

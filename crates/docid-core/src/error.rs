//! Error types for the docid-core library.
//!
//! Every pipeline failure is classified into one of five classes. A field
//! that could not be extracted is not an error; it is an absent value in the
//! [`IdentityRecord`](crate::IdentityRecord).

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Main error type for a pipeline run.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The job request itself was unusable.
    #[error("request error: {0}")]
    Request(#[from] RequestError),

    /// The remote document could not be retrieved.
    #[error("fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// The retrieved document is not acceptable.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The transient artifact could not be written or read.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// The stored document could not be turned into text.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// The caller-supplied deadline elapsed before the run finished.
    #[error("deadline of {0:?} exceeded")]
    DeadlineExceeded(Duration),
}

/// Coarse failure classification surfaced to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Request,
    Fetch,
    Validation,
    Store,
    Decode,
    Timeout,
}

impl ErrorKind {
    /// Stable upper-case code used on the wire.
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::Request => "REQUEST",
            ErrorKind::Fetch => "FETCH",
            ErrorKind::Validation => "VALIDATION",
            ErrorKind::Store => "STORE",
            ErrorKind::Decode => "DECODE",
            ErrorKind::Timeout => "TIMEOUT",
        }
    }
}

impl PipelineError {
    /// Classification of this failure.
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::Request(_) => ErrorKind::Request,
            PipelineError::Fetch(_) => ErrorKind::Fetch,
            PipelineError::Validation(_) => ErrorKind::Validation,
            PipelineError::Store(_) => ErrorKind::Store,
            PipelineError::Decode(_) => ErrorKind::Decode,
            PipelineError::DeadlineExceeded(_) => ErrorKind::Timeout,
        }
    }

    /// Whether the failure was caused by what the caller sent.
    pub fn is_caller_error(&self) -> bool {
        matches!(self, PipelineError::Request(_) | PipelineError::Validation(_))
    }
}

/// Errors in the incoming job request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    /// No document URI was supplied.
    #[error("the document URL was not provided")]
    MissingUri,

    /// The URI could not be parsed.
    #[error("invalid document URL {uri:?}: {reason}")]
    InvalidUri { uri: String, reason: String },

    /// The URI scheme is not fetchable.
    #[error("unsupported URL scheme {0:?}, expected http or https")]
    UnsupportedScheme(String),
}

/// Transport-level retrieval failures.
#[derive(Error, Debug)]
pub enum FetchError {
    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// The request could not be completed.
    #[error("failed to download {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success status.
    #[error("server returned HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    /// The body stream broke off mid-transfer.
    #[error("download interrupted: {0}")]
    Body(String),
}

/// Rejections of a retrieved document.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The declared content type is not the accepted one.
    #[error("the file is not a valid PDF (content type: {})", found.as_deref().unwrap_or("none"))]
    ContentType { found: Option<String> },

    /// The document exceeds the configured size limit.
    #[error("document exceeds the {limit} byte limit")]
    TooLarge { limit: u64 },
}

/// Failures of the transient store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The store root or artifact could not be created.
    #[error("failed to create transient artifact in {path}: {source}")]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Writing to the artifact failed.
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Reading the artifact back failed.
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Removing the artifact failed.
    #[error("failed to remove {path}: {source}")]
    Release {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failures of the text decoder.
#[derive(Error, Debug)]
pub enum DecodeError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// Decoding produced no usable text.
    #[error("no text could be extracted from the document")]
    EmptyText,

    /// The blocking decode task did not complete.
    #[error("decode task failed: {0}")]
    Task(String),
}

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_codes() {
        let err: PipelineError = RequestError::MissingUri.into();
        assert_eq!(err.kind(), ErrorKind::Request);
        assert_eq!(err.kind().code(), "REQUEST");
        assert!(err.is_caller_error());

        let err: PipelineError = DecodeError::EmptyText.into();
        assert_eq!(err.kind().code(), "DECODE");
        assert!(!err.is_caller_error());

        let err = PipelineError::DeadlineExceeded(Duration::from_secs(3));
        assert_eq!(err.kind(), ErrorKind::Timeout);
    }

    #[test]
    fn test_content_type_message() {
        let err = ValidationError::ContentType { found: None };
        assert_eq!(err.to_string(), "the file is not a valid PDF (content type: none)");

        let err = ValidationError::ContentType {
            found: Some("text/html".to_string()),
        };
        assert!(err.to_string().contains("text/html"));
    }
}

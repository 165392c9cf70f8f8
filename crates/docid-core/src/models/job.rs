//! Job request accepted by the pipeline.

use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::error::RequestError;

/// A request to process one remotely hosted document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRequest {
    /// Location of the document.
    #[serde(rename = "fileUrl", default)]
    pub file_url: Option<String>,
}

impl JobRequest {
    /// Create a request for the given URI.
    pub fn new(file_url: impl Into<String>) -> Self {
        Self {
            file_url: Some(file_url.into()),
        }
    }

    /// Parse and check the document URI.
    ///
    /// Runs before any network activity; a missing, blank, malformed or
    /// non-HTTP URI is a caller error.
    pub fn target(&self) -> Result<Url, RequestError> {
        let raw = self
            .file_url
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(RequestError::MissingUri)?;

        let url = Url::parse(raw).map_err(|e| RequestError::InvalidUri {
            uri: raw.to_string(),
            reason: e.to_string(),
        })?;

        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(RequestError::UnsupportedScheme(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_uri() {
        assert_eq!(JobRequest::default().target(), Err(RequestError::MissingUri));
        assert_eq!(JobRequest::new("   ").target(), Err(RequestError::MissingUri));
    }

    #[test]
    fn test_malformed_uri() {
        let err = JobRequest::new("not a url").target().unwrap_err();
        assert!(matches!(err, RequestError::InvalidUri { .. }));
    }

    #[test]
    fn test_scheme_must_be_http() {
        let err = JobRequest::new("ftp://example.com/doc.pdf").target().unwrap_err();
        assert_eq!(err, RequestError::UnsupportedScheme("ftp".to_string()));
    }

    #[test]
    fn test_valid_uri() {
        let url = JobRequest::new(" https://example.com/docs/cpf.pdf ")
            .target()
            .unwrap();
        assert_eq!(url.host_str(), Some("example.com"));
        assert_eq!(url.path(), "/docs/cpf.pdf");
    }

    #[test]
    fn test_deserialize_wire_key() {
        let request: JobRequest =
            serde_json::from_str(r#"{"fileUrl": "http://host/a.pdf"}"#).unwrap();
        assert_eq!(request.file_url.as_deref(), Some("http://host/a.pdf"));

        let empty: JobRequest = serde_json::from_str("{}").unwrap();
        assert!(empty.file_url.is_none());
    }
}

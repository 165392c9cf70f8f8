//! HTTP document fetcher built on reqwest.

use async_trait::async_trait;
use futures_util::{StreamExt, TryStreamExt};
use reqwest::header::CONTENT_TYPE;
use reqwest::{redirect, Client, Url};
use tracing::debug;

use super::{DocumentFetcher, RetrievedDocument};
use crate::error::FetchError;
use crate::models::config::FetchConfig;

/// Fetches documents over HTTP(S), streaming the body.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Build a fetcher from configuration.
    pub fn new(config: &FetchConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout())
            .connect_timeout(config.connect_timeout())
            .redirect(redirect::Policy::limited(config.max_redirects))
            .build()
            .map_err(FetchError::Client)?;

        Ok(Self { client })
    }

    /// Wrap an existing client.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DocumentFetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<RetrievedDocument, FetchError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|source| FetchError::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let content_length = response.content_length();

        debug!(
            "Response headers for {}: status={}, content_type={:?}, content_length={:?}",
            url, status, content_type, content_length
        );

        let body = response
            .bytes_stream()
            .map_ok(Vec::from)
            .map_err(|e| FetchError::Body(e.to_string()))
            .boxed();

        Ok(RetrievedDocument::new(content_type, body).with_content_length(content_length))
    }
}

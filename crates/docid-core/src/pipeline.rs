//! Pipeline orchestrator: fetch, store, decode, extract.
//!
//! Stages run strictly in order. Any failure aborts the remaining stages and
//! the run's transient artifact is released before the error is returned.

use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::Url;
use tracing::{debug, info, warn, Instrument};

use crate::error::{DecodeError, PipelineError, Result, ValidationError};
use crate::fetch::{validate_content_type, DocumentFetcher, HttpFetcher, RetrievedDocument};
use crate::identity::{ExtractionResult, IdentityParser};
use crate::models::config::{DocidConfig, PipelineConfig};
use crate::models::identity::IdentityRecord;
use crate::models::job::JobRequest;
use crate::pdf::{PdfTextDecoder, TextDecoder};
use crate::store::{RunId, TransientArtifact, TransientStore};

/// Outcome of a successful run.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Identifier the run's artifact was stored under.
    pub run_id: RunId,
    /// Extraction output.
    pub extraction: ExtractionResult,
    /// Size of the stored document.
    pub document_bytes: u64,
    /// Wall time of the whole run.
    pub elapsed: Duration,
}

/// Drives job requests through the ingestion stages.
pub struct Pipeline {
    fetcher: Arc<dyn DocumentFetcher>,
    decoder: Arc<dyn TextDecoder>,
    store: TransientStore,
    parser: Arc<IdentityParser>,
    config: PipelineConfig,
    max_document_bytes: Option<u64>,
}

impl Pipeline {
    /// Assemble a pipeline from its collaborators.
    pub fn new(
        fetcher: Arc<dyn DocumentFetcher>,
        decoder: Arc<dyn TextDecoder>,
        store: TransientStore,
    ) -> Self {
        Self {
            fetcher,
            decoder,
            store,
            parser: Arc::new(IdentityParser::new()),
            config: PipelineConfig::default(),
            max_document_bytes: None,
        }
    }

    /// Build the standard HTTP + PDF pipeline from configuration.
    pub fn from_config(config: &DocidConfig) -> Result<Self> {
        let fetcher = HttpFetcher::new(&config.fetch)?;
        let store = TransientStore::open(config.store.root_dir())?;

        Ok(Self::new(Arc::new(fetcher), Arc::new(PdfTextDecoder::new()), store)
            .with_config(config.pipeline.clone())
            .with_max_document_bytes(config.store.size_limit()))
    }

    /// Use a custom identity parser.
    pub fn with_parser(mut self, parser: IdentityParser) -> Self {
        self.parser = Arc::new(parser);
        self
    }

    pub fn with_config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    /// Limit the size of stored documents.
    pub fn with_max_document_bytes(mut self, limit: Option<u64>) -> Self {
        self.max_document_bytes = limit;
        self
    }

    pub fn store(&self) -> &TransientStore {
        &self.store
    }

    /// Process one request and return the identity record.
    pub async fn run(&self, request: &JobRequest) -> Result<IdentityRecord> {
        self.run_with_report(request)
            .await
            .map(|report| report.extraction.record)
    }

    /// Process one request and return the full run report.
    pub async fn run_with_report(&self, request: &JobRequest) -> Result<RunReport> {
        // Request errors surface before any stage runs
        let url = request.target()?;
        let run_id = RunId::new();
        let span = tracing::info_span!("pipeline_run", run_id = %run_id, url = %url);

        let run = self.execute(run_id, url).instrument(span.clone());
        let outcome = match self.config.deadline() {
            Some(deadline) => tokio::time::timeout(deadline, run)
                .await
                .unwrap_or(Err(PipelineError::DeadlineExceeded(deadline))),
            None => run.await,
        };

        span.in_scope(|| match &outcome {
            Ok(report) => info!(
                "Run completed: {}/7 fields, {} bytes, {:?}",
                report.extraction.matched_fields, report.document_bytes, report.elapsed
            ),
            Err(e) => warn!(kind = e.kind().code(), "Run failed: {}", e),
        });
        outcome
    }

    async fn execute(&self, run_id: RunId, url: Url) -> Result<RunReport> {
        let start = Instant::now();

        debug!("Fetching document");
        let document = self.fetcher.fetch(&url).await?;

        // Nothing is persisted until the declared type is accepted
        validate_content_type(document.content_type.as_deref())?;
        if let (Some(limit), Some(length)) = (self.max_document_bytes, document.content_length) {
            if length > limit {
                return Err(ValidationError::TooLarge { limit }.into());
            }
        }

        let mut artifact = self.store.acquire_for(run_id).await?;
        let outcome = self.process(&mut artifact, document).await;

        let document_bytes = artifact.bytes_written();
        if let Err(e) = artifact.release() {
            warn!("Failed to release transient artifact: {}", e);
        }

        let extraction = outcome?;
        Ok(RunReport {
            run_id,
            extraction,
            document_bytes,
            elapsed: start.elapsed(),
        })
    }

    async fn process(
        &self,
        artifact: &mut TransientArtifact,
        document: RetrievedDocument,
    ) -> Result<ExtractionResult> {
        let written = artifact
            .write_stream(document.body, self.max_document_bytes)
            .await?;
        debug!("Stored {} bytes at {}", written, artifact.path().display());

        let data = artifact.read().await?;
        let text = self.decode(data).await?;
        debug!("Decoded {} chars of text", text.len());

        Ok(self.parser.parse(&text))
    }

    async fn decode(&self, data: Vec<u8>) -> Result<String> {
        let decoder = Arc::clone(&self.decoder);
        let text = tokio::task::spawn_blocking(move || decoder.decode(&data))
            .await
            .map_err(|e| DecodeError::Task(e.to_string()))??;

        if text.trim().is_empty() {
            return Err(DecodeError::EmptyText.into());
        }
        Ok(text)
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("store", &self.store)
            .field("parser", &self.parser)
            .field("config", &self.config)
            .field("max_document_bytes", &self.max_document_bytes)
            .finish_non_exhaustive()
    }
}

//! Serve command - HTTP transport for the extraction pipeline.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use clap::Args;
use console::style;
use serde::Serialize;
use tracing::{error, info};

use docid_core::error::ValidationError;
use docid_core::models::config::DocidConfig;
use docid_core::{ErrorKind, IdentityRecord, JobRequest, Pipeline, PipelineError};

use super::load_config;

const SUCCESS_MESSAGE: &str = "File processed successfully";

/// Arguments for the serve command.
#[derive(Args)]
pub struct ServeArgs {
    /// Address to bind (overrides config)
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on (overrides config)
    #[arg(short, long)]
    port: Option<u16>,
}

/// Successful extraction response.
#[derive(Debug, Serialize)]
pub struct ExtractResponse {
    pub message: &'static str,
    pub data: IdentityRecord,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// Structured error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub message: String,
}

/// Failure of an API call, mapped onto an HTTP status.
#[derive(Debug)]
pub enum ApiError {
    /// The request body could not be read as a job request.
    Body(JsonRejection),
    /// The pipeline run failed.
    Pipeline(PipelineError),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Body(rejection)
    }
}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        ApiError::Pipeline(err)
    }
}

fn status_for(err: &PipelineError) -> StatusCode {
    match err {
        PipelineError::Validation(ValidationError::TooLarge { .. }) => StatusCode::PAYLOAD_TOO_LARGE,
        _ => match err.kind() {
            ErrorKind::Request | ErrorKind::Validation => StatusCode::BAD_REQUEST,
            ErrorKind::Fetch => StatusCode::BAD_GATEWAY,
            ErrorKind::Store => StatusCode::INTERNAL_SERVER_ERROR,
            ErrorKind::Decode => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorKind::Timeout => StatusCode::GATEWAY_TIMEOUT,
        },
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            ApiError::Body(rejection) => {
                let status = if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
                    StatusCode::PAYLOAD_TOO_LARGE
                } else {
                    StatusCode::BAD_REQUEST
                };
                (status, ErrorKind::Request.code(), rejection.body_text())
            }
            ApiError::Pipeline(err) => {
                if !err.is_caller_error() {
                    error!(code = err.kind().code(), "Extraction failed: {}", err);
                }
                (status_for(err), err.kind().code(), err.to_string())
            }
        };

        let body = ErrorBody {
            error: ErrorDetail { code, message },
        };
        (status, Json(body)).into_response()
    }
}

/// Build the HTTP router around a shared pipeline.
pub fn router(pipeline: Arc<Pipeline>, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/api", post(extract))
        .route("/health", get(health))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .with_state(pipeline)
}

/// `POST /api` - run one document through the pipeline.
async fn extract(
    State(pipeline): State<Arc<Pipeline>>,
    payload: Result<Json<JobRequest>, JsonRejection>,
) -> Result<Json<ExtractResponse>, ApiError> {
    let Json(request) = payload?;
    let record = pipeline.run(&request).await?;

    Ok(Json(ExtractResponse {
        message: SUCCESS_MESSAGE,
        data: record,
    }))
}

/// `GET /health` - liveness check.
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub async fn run(args: ServeArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let mut config: DocidConfig = load_config(config_path)?;
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    let pipeline = Arc::new(Pipeline::from_config(&config)?);
    let app = router(pipeline, config.server.max_body_bytes);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid address: {e}"))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("Starting server on http://{}", addr);
    println!(
        "{} Listening on http://{} (POST /api)",
        style("✓").green(),
        addr
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
}

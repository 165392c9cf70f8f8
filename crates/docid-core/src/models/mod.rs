//! Data models shared across the pipeline.

pub mod config;
pub mod identity;
pub mod job;

pub use config::{DocidConfig, FetchConfig, PipelineConfig, ServerConfig, StoreConfig};
pub use identity::{IdentityField, IdentityRecord};
pub use job::JobRequest;

//! Transient store for downloaded documents.
//!
//! Every pipeline run acquires exactly one [`TransientArtifact`], named after
//! a fresh [`RunId`]. The artifact is removed when it is released or, if the
//! run ends early, when the guard is dropped.

use std::path::{Path, PathBuf};

use futures_util::StreamExt;
use tempfile::NamedTempFile;
use tokio::io::AsyncWriteExt;
use tracing::{debug, trace, warn};
use uuid::Uuid;

use crate::error::{PipelineError, StoreError, ValidationError};
use crate::fetch::ByteStream;

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Identifier of one pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RunId(Uuid);

impl RunId {
    /// Generate a fresh identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Directory holding in-flight artifacts.
#[derive(Debug, Clone)]
pub struct TransientStore {
    root: PathBuf,
}

impl TransientStore {
    /// Open a store rooted at `root`, creating the directory if needed.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root).map_err(|source| StoreError::Create {
            path: root.clone(),
            source,
        })?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Allocate a new artifact location for a run.
    ///
    /// The file is created exclusively; an existing file with the same name
    /// is an error, never overwritten.
    pub async fn acquire(&self) -> Result<TransientArtifact> {
        let run_id = RunId::new();
        self.acquire_for(run_id).await
    }

    /// Allocate the artifact location for a known run identifier.
    pub async fn acquire_for(&self, run_id: RunId) -> Result<TransientArtifact> {
        let root = self.root.clone();
        let prefix = run_id.to_string();

        let file = tokio::task::spawn_blocking(move || {
            tempfile::Builder::new()
                .prefix(&prefix)
                .suffix(".pdf")
                .rand_bytes(0)
                .tempfile_in(&root)
                .map_err(|source| StoreError::Create { path: root, source })
        })
        .await
        .map_err(|e| StoreError::Create {
            path: self.root.clone(),
            source: std::io::Error::other(e),
        })??;

        let writer = file
            .as_file()
            .try_clone()
            .map(tokio::fs::File::from_std)
            .map_err(|source| StoreError::Create {
                path: file.path().to_path_buf(),
                source,
            })?;

        debug!(run_id = %run_id, path = %file.path().display(), "Acquired transient artifact");

        Ok(TransientArtifact {
            run_id,
            file: Some(file),
            writer: Some(writer),
            written: 0,
        })
    }
}

/// Scoped, single-use storage location for one run's document.
#[derive(Debug)]
pub struct TransientArtifact {
    run_id: RunId,
    file: Option<NamedTempFile>,
    writer: Option<tokio::fs::File>,
    written: u64,
}

impl TransientArtifact {
    pub fn run_id(&self) -> RunId {
        self.run_id
    }

    /// Location of the artifact on disk.
    pub fn path(&self) -> &Path {
        match &self.file {
            Some(file) => file.path(),
            None => Path::new(""),
        }
    }

    /// Bytes written so far.
    pub fn bytes_written(&self) -> u64 {
        self.written
    }

    /// Append a chunk to the artifact.
    pub async fn write(&mut self, chunk: &[u8]) -> Result<()> {
        let path = self.path().to_path_buf();
        let writer = self.writer.as_mut().ok_or_else(|| StoreError::Write {
            path: path.clone(),
            source: std::io::Error::other("artifact is no longer writable"),
        })?;

        writer
            .write_all(chunk)
            .await
            .map_err(|source| StoreError::Write { path, source })?;

        self.written += chunk.len() as u64;
        trace!(run_id = %self.run_id, bytes = self.written, "Wrote chunk");
        Ok(())
    }

    /// Persist a fetched body stream and close the write handle.
    ///
    /// A broken stream surfaces as the fetch error it carries, a disk failure
    /// as a store error, and a body larger than `limit` as
    /// [`ValidationError::TooLarge`]. The partial artifact stays owned by the
    /// guard and is removed on release or drop.
    pub async fn write_stream(
        &mut self,
        mut body: ByteStream,
        limit: Option<u64>,
    ) -> std::result::Result<u64, PipelineError> {
        while let Some(chunk) = body.next().await {
            let chunk = chunk?;
            if let Some(limit) = limit {
                if self.written + chunk.len() as u64 > limit {
                    return Err(ValidationError::TooLarge { limit }.into());
                }
            }
            self.write(&chunk).await?;
        }

        Ok(self.finish().await?)
    }

    /// Flush and close the write handle.
    pub async fn finish(&mut self) -> Result<u64> {
        if let Some(mut writer) = self.writer.take() {
            let path = self.path().to_path_buf();
            writer
                .flush()
                .await
                .map_err(|source| StoreError::Write { path: path.clone(), source })?;
            writer
                .sync_all()
                .await
                .map_err(|source| StoreError::Write { path, source })?;
        }
        Ok(self.written)
    }

    /// Read the persisted bytes back.
    pub async fn read(&self) -> Result<Vec<u8>> {
        let path = self.path().to_path_buf();
        tokio::fs::read(&path)
            .await
            .map_err(|source| StoreError::Read { path, source })
    }

    /// Delete the artifact.
    ///
    /// Consumes the guard, so a location can only be released once.
    pub fn release(mut self) -> Result<()> {
        self.writer.take();
        match self.file.take() {
            Some(file) => {
                let path = file.path().to_path_buf();
                file.close()
                    .map_err(|source| StoreError::Release { path: path.clone(), source })?;
                debug!(run_id = %self.run_id, path = %path.display(), "Released transient artifact");
                Ok(())
            }
            None => Ok(()),
        }
    }
}

impl Drop for TransientArtifact {
    fn drop(&mut self) {
        // Dropping the NamedTempFile removes the file
        if let Some(file) = self.file.take() {
            self.writer.take();
            warn!(
                run_id = %self.run_id,
                path = %file.path().display(),
                "Transient artifact dropped without release, removing"
            );
        }
    }
}

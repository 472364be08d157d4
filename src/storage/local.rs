// src/storage/local.rs

//! Local filesystem checkpoint implementation.
//!
//! One JSON snapshot file, written atomically (write to temp, then
//! rename) so an interrupted save never corrupts the previous
//! snapshot.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::Corpus;
use crate::storage::CheckpointStore;

/// Envelope written to disk around the corpus.
#[derive(Debug, Serialize, Deserialize)]
struct Snapshot {
    saved_at: DateTime<Utc>,
    document_count: usize,
    corpus: Corpus,
}

/// Checkpoint store backed by a single local file.
#[derive(Debug, Clone)]
pub struct LocalCheckpoint {
    path: PathBuf,
}

impl LocalCheckpoint {
    /// Create a checkpoint store writing to the given file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn ensure_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, bytes: &[u8]) -> Result<()> {
        self.ensure_dir().await?;

        let tmp = self.path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl CheckpointStore for LocalCheckpoint {
    async fn save(&self, corpus: &Corpus) -> Result<()> {
        let snapshot = Snapshot {
            saved_at: Utc::now(),
            document_count: corpus.len(),
            corpus: corpus.clone(),
        };
        let bytes = serde_json::to_vec_pretty(&snapshot)?;
        self.write_bytes(&bytes).await?;
        log::debug!(
            "Checkpointed {} documents to {}",
            snapshot.document_count,
            self.path.display()
        );
        Ok(())
    }

    async fn load(&self) -> Result<Corpus> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(AppError::CheckpointMissing(
                    self.path.display().to_string(),
                ));
            }
            Err(e) => return Err(AppError::Io(e)),
        };
        let snapshot: Snapshot = serde_json::from_slice(&bytes)?;
        Ok(snapshot.corpus)
    }

    async fn exists(&self) -> bool {
        self.path.exists()
    }
}

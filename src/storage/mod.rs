// src/storage/mod.rs

//! Durable checkpoint persistence for the in-progress corpus.

mod local;

pub use local::LocalCheckpoint;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::Corpus;

/// Durable key→blob persistence for corpus snapshots.
///
/// Enables resume-after-interruption: the crawl loop saves
/// periodically, and a later run can reload the most recent snapshot
/// instead of recrawling. No concurrent writers assumed.
#[async_trait]
pub trait CheckpointStore: Send + Sync {
    /// Serialize the full current corpus, overwriting any prior
    /// snapshot. Safe to call repeatedly mid-crawl.
    async fn save(&self, corpus: &Corpus) -> Result<()>;

    /// Reconstruct a corpus from the most recent snapshot.
    ///
    /// Fails with [`crate::error::AppError::CheckpointMissing`] when no
    /// snapshot exists, or a JSON error when the snapshot is corrupt.
    async fn load(&self) -> Result<Corpus>;

    /// Whether a snapshot is present, used to decide between resume
    /// and fresh crawl.
    async fn exists(&self) -> bool;
}

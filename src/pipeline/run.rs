// src/pipeline/run.rs

//! Pipeline orchestration: corpus acquisition and generation.

use std::sync::Arc;

use rand::Rng;
use tokio::sync::watch;

use crate::error::{AppError, Result};
use crate::models::{Config, Corpus};
use crate::pipeline::{self, Generation};
use crate::services::{LinkCrawler, PageFetcher};
use crate::storage::CheckpointStore;

/// Load the corpus from a checkpoint when one exists, otherwise crawl.
///
/// A corrupt checkpoint on a resume is fatal: silently proceeding with
/// a partial corpus is never acceptable. Pass `fresh = true` to ignore
/// any existing snapshot and recrawl.
pub async fn acquire_corpus(
    config: &Config,
    store: &dyn CheckpointStore,
    fetcher: Arc<dyn PageFetcher>,
    cancel: watch::Receiver<bool>,
    fresh: bool,
) -> Result<Corpus> {
    if !fresh && store.exists().await {
        let corpus = store.load().await?;
        log::info!(
            "Resumed {} documents ({} tokens) from checkpoint",
            corpus.len(),
            corpus.token_count()
        );
        return Ok(corpus);
    }

    let crawler = LinkCrawler::new(config.crawler.clone(), fetcher)?;
    let outcome = crawler.crawl(store, cancel).await?;
    Ok(outcome.corpus)
}

/// Build the model from an acquired corpus and run one generation.
pub fn run_generation<R: Rng + ?Sized>(
    corpus: &Corpus,
    config: &Config,
    rng: &mut R,
) -> Result<Generation> {
    if corpus.is_empty() {
        return Err(AppError::degenerate(
            "corpus is empty; crawl before generating",
        ));
    }

    let model = pipeline::build_model(corpus, &config.model)?;
    if model.is_empty() {
        return Err(AppError::degenerate(
            "corpus produced no n-grams at the configured width",
        ));
    }
    log::info!(
        "Built model with {} distinct {}-grams",
        model.len(),
        model.width()
    );

    pipeline::generate(&model, &config.generation, config.model.sentinel_mode, rng)
}

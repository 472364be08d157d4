// src/services/crawler.rs

//! One-level link crawler.
//!
//! Fetches the seed page, enumerates eligible outbound links (anchors
//! carrying a `title` attribute inside the content region), fetches
//! each in discovery order with a mandatory courtesy delay, and
//! accumulates a corpus with periodic checkpoints. Links discovered on
//! the depth-1 pages are never followed; that is a scope limit, not a
//! bug.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use scraper::{Html, Selector};
use tokio::sync::watch;
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{Corpus, CrawlerConfig};
use crate::services::{DocumentExtractor, PageFetcher};
use crate::storage::CheckpointStore;
use crate::utils::url as url_util;

/// Summary of a crawl run.
#[derive(Debug, Clone)]
pub struct CrawlStats {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// Eligible links found on the seed page.
    pub links_discovered: usize,
    /// Outbound fetches actually attempted (seed excluded).
    pub links_fetched: usize,
    /// Fetches that failed and were skipped.
    pub fetch_failures: usize,
    /// Documents kept after finalization.
    pub documents: usize,
}

/// Result of a crawl: the finalized corpus plus run statistics.
#[derive(Debug)]
pub struct CrawlOutcome {
    pub corpus: Corpus,
    pub stats: CrawlStats,
}

/// Service crawling one level deep from a configured seed page.
pub struct LinkCrawler {
    config: CrawlerConfig,
    fetcher: Arc<dyn PageFetcher>,
    extractor: DocumentExtractor,
    link_selector: Selector,
}

impl LinkCrawler {
    /// Create a crawler from configuration and a fetch capability.
    pub fn new(config: CrawlerConfig, fetcher: Arc<dyn PageFetcher>) -> Result<Self> {
        let extractor = DocumentExtractor::new(&config.content_selector)?;
        let link_selector = Selector::parse("a[title][href]")
            .map_err(|e| AppError::selector("a[title][href]", format!("{e:?}")))?;
        Ok(Self {
            config,
            fetcher,
            extractor,
            link_selector,
        })
    }

    /// Run the crawl to completion, early stop, or cancellation.
    ///
    /// A fetch failure for one link is logged and skipped; a failed
    /// checkpoint write is logged and ignored. Only a failed seed
    /// fetch aborts the whole crawl.
    pub async fn crawl(
        &self,
        store: &dyn CheckpointStore,
        mut cancel: watch::Receiver<bool>,
    ) -> Result<CrawlOutcome> {
        let start_time = Utc::now();
        let base = Url::parse(&self.config.base_url)?;
        let seed = url_util::resolve(&base, &self.config.seed_url)?;

        // Nothing to crawl without the seed page: fatal.
        let seed_markup = self.fetcher.fetch(seed.as_str()).await?;
        let links = self.extract_links(&seed_markup, &base);
        log::info!("Crawling {} eligible links from {seed}", links.len());

        let mut corpus = Corpus::new();
        let mut links_fetched = 0usize;
        let mut fetch_failures = 0usize;

        for (i, link) in links.iter().enumerate() {
            if *cancel.borrow() {
                log::warn!("Crawl cancelled after {i} links; checkpointing progress");
                break;
            }

            links_fetched += 1;
            match self.fetcher.fetch(link).await {
                Ok(markup) => {
                    let document = self.extractor.extract(&markup, link);
                    if document.is_empty() {
                        log::debug!("No tokens extracted from {link}");
                    } else {
                        corpus.push(document);
                    }
                }
                Err(error) => {
                    fetch_failures += 1;
                    log::warn!("Skipping {link}: {error}");
                }
            }

            self.courtesy_pause(&mut cancel).await;

            if i % self.config.save_frequency == 0 && !corpus.is_empty() {
                if let Err(error) = store.save(&corpus).await {
                    log::warn!("Checkpoint write failed: {error}");
                }
            }

            if links_fetched >= self.config.max_requests {
                log::info!("Request budget of {} reached", self.config.max_requests);
                break;
            }
        }

        corpus.finalize();
        if !corpus.is_empty() {
            if let Err(error) = store.save(&corpus).await {
                log::warn!("Final checkpoint write failed: {error}");
            }
        }

        let stats = CrawlStats {
            start_time,
            end_time: Utc::now(),
            links_discovered: links.len(),
            links_fetched,
            fetch_failures,
            documents: corpus.len(),
        };
        log::info!(
            "Crawl finished: {} documents from {}/{} links ({} failures)",
            stats.documents,
            stats.links_fetched,
            stats.links_discovered,
            stats.fetch_failures
        );

        Ok(CrawlOutcome { corpus, stats })
    }

    /// Enumerate eligible outbound links from the seed markup.
    ///
    /// The `title` attribute is the eligibility filter separating
    /// article links from navigation/utility anchors. Links are
    /// resolved against the base URL, restricted to the base domain,
    /// and deduplicated preserving discovery order.
    fn extract_links(&self, markup: &str, base: &Url) -> Vec<String> {
        let html = Html::parse_document(markup);
        let content_selector = self.extractor.content_selector();

        let region = match html.select(content_selector).last() {
            Some(region) => region,
            None => return Vec::new(),
        };

        let mut seen = HashSet::new();
        let mut links = Vec::new();
        for anchor in region.select(&self.link_selector) {
            let Some(href) = anchor.value().attr("href") else {
                continue;
            };
            let Ok(resolved) = url_util::resolve(base, href) else {
                log::debug!("Ignoring unresolvable href {href}");
                continue;
            };
            if !url_util::same_domain(base, &resolved) {
                continue;
            }
            let resolved = resolved.to_string();
            if seen.insert(resolved.clone()) {
                links.push(resolved);
            }
        }
        links
    }

    /// Fixed inter-request pause; a cancellation signal cuts it short.
    async fn courtesy_pause(&self, cancel: &mut watch::Receiver<bool>) {
        let delay = self.config.courtesy_delay();
        if delay.is_zero() {
            return;
        }
        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            _ = cancel.changed() => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeFetcher {
        pages: HashMap<String, String>,
        calls: AtomicUsize,
    }

    impl FakeFetcher {
        fn new(pages: Vec<(&str, String)>) -> Self {
            Self {
                pages: pages
                    .into_iter()
                    .map(|(url, body)| (url.to_string(), body))
                    .collect(),
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl PageFetcher for FakeFetcher {
        async fn fetch(&self, url: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.pages
                .get(url)
                .cloned()
                .ok_or_else(|| AppError::fetch(url, "status 404"))
        }
    }

    /// Store that records the document count of every save.
    #[derive(Default)]
    struct RecordingStore {
        saves: Mutex<Vec<usize>>,
    }

    impl RecordingStore {
        fn save_count(&self) -> usize {
            self.saves.lock().unwrap().len()
        }

        fn last_save(&self) -> Option<usize> {
            self.saves.lock().unwrap().last().copied()
        }
    }

    #[async_trait]
    impl CheckpointStore for RecordingStore {
        async fn save(&self, corpus: &Corpus) -> Result<()> {
            self.saves.lock().unwrap().push(corpus.len());
            Ok(())
        }

        async fn load(&self) -> Result<Corpus> {
            Err(AppError::CheckpointMissing("memory".into()))
        }

        async fn exists(&self) -> bool {
            false
        }
    }

    /// Fetcher that raises the cancellation flag after serving one
    /// designated URL, simulating an interrupt arriving mid-crawl.
    struct SignallingFetcher {
        pages: HashMap<String, String>,
        trigger_url: String,
        cancel_tx: Mutex<Option<watch::Sender<bool>>>,
    }

    #[async_trait]
    impl PageFetcher for SignallingFetcher {
        async fn fetch(&self, url: &str) -> Result<String> {
            let body = self
                .pages
                .get(url)
                .cloned()
                .ok_or_else(|| AppError::fetch(url, "status 404"))?;
            if url == self.trigger_url {
                if let Some(tx) = self.cancel_tx.lock().unwrap().take() {
                    tx.send(true).unwrap();
                    std::mem::forget(tx);
                }
            }
            Ok(body)
        }
    }

    /// Store whose writes always fail; the crawl must shrug it off.
    struct FailingStore;

    #[async_trait]
    impl CheckpointStore for FailingStore {
        async fn save(&self, _corpus: &Corpus) -> Result<()> {
            Err(AppError::Io(std::io::Error::other("disk full")))
        }

        async fn load(&self) -> Result<Corpus> {
            Err(AppError::CheckpointMissing("memory".into()))
        }

        async fn exists(&self) -> bool {
            false
        }
    }

    const BASE: &str = "https://en.test.org/";
    const SEED: &str = "https://en.test.org/wiki/Seed";

    fn article(words: &str) -> String {
        format!(r#"<html><body><div class="mw-body-content">{words}</div></body></html>"#)
    }

    fn seed_page(hrefs: &[&str]) -> String {
        let anchors: String = hrefs
            .iter()
            .map(|h| format!(r#"<a href="{h}" title="article">{h}</a>"#))
            .collect();
        format!(
            r#"<html><body>
            <a href="/wiki/Nav" title="nav outside region">nav</a>
            <div class="mw-body-content">{anchors}
            <a href="/wiki/Untitled">no title attribute</a></div>
            </body></html>"#
        )
    }

    fn test_config() -> CrawlerConfig {
        CrawlerConfig {
            seed_url: "wiki/Seed".to_string(),
            base_url: BASE.to_string(),
            courtesy_delay_ms: 0,
            ..CrawlerConfig::default()
        }
    }

    fn cancel_rx() -> watch::Receiver<bool> {
        let (tx, rx) = watch::channel(false);
        // Keep the sender alive for the duration of the test.
        std::mem::forget(tx);
        rx
    }

    fn crawler(config: CrawlerConfig, fetcher: Arc<FakeFetcher>) -> LinkCrawler {
        LinkCrawler::new(config, fetcher).unwrap()
    }

    #[tokio::test]
    async fn crawl_collects_documents_one_level_deep() {
        let fetcher = Arc::new(FakeFetcher::new(vec![
            (SEED, seed_page(&["/wiki/A", "/wiki/B"])),
            ("https://en.test.org/wiki/A", article("alpha beta gamma")),
            ("https://en.test.org/wiki/B", article("delta epsilon")),
        ]));
        let store = RecordingStore::default();

        let outcome = crawler(test_config(), Arc::clone(&fetcher))
            .crawl(&store, cancel_rx())
            .await
            .unwrap();

        assert_eq!(outcome.corpus.len(), 2);
        assert_eq!(outcome.stats.links_discovered, 2);
        assert_eq!(outcome.stats.links_fetched, 2);
        assert_eq!(outcome.stats.fetch_failures, 0);
        // Seed plus two links; depth-1 pages are never followed.
        assert_eq!(fetcher.calls(), 3);
    }

    #[tokio::test]
    async fn max_requests_bounds_outbound_fetches() {
        let fetcher = Arc::new(FakeFetcher::new(vec![
            (SEED, seed_page(&["/wiki/A", "/wiki/B", "/wiki/C", "/wiki/D"])),
            ("https://en.test.org/wiki/A", article("alpha beta")),
            ("https://en.test.org/wiki/B", article("gamma delta")),
            ("https://en.test.org/wiki/C", article("epsilon zeta")),
            ("https://en.test.org/wiki/D", article("eta theta")),
        ]));
        let store = RecordingStore::default();
        let mut config = test_config();
        config.max_requests = 2;

        let outcome = crawler(config, Arc::clone(&fetcher))
            .crawl(&store, cancel_rx())
            .await
            .unwrap();

        assert_eq!(outcome.stats.links_fetched, 2);
        assert_eq!(outcome.corpus.len(), 2);
        assert_eq!(fetcher.calls(), 3); // seed + 2
    }

    #[tokio::test]
    async fn failed_link_is_skipped_not_fatal() {
        let fetcher = Arc::new(FakeFetcher::new(vec![
            (SEED, seed_page(&["/wiki/A", "/wiki/Missing", "/wiki/C"])),
            ("https://en.test.org/wiki/A", article("alpha beta")),
            ("https://en.test.org/wiki/C", article("gamma delta")),
        ]));
        let store = RecordingStore::default();

        let outcome = crawler(test_config(), fetcher)
            .crawl(&store, cancel_rx())
            .await
            .unwrap();

        assert_eq!(outcome.stats.fetch_failures, 1);
        assert_eq!(outcome.corpus.len(), 2);
    }

    #[tokio::test]
    async fn seed_fetch_failure_is_fatal() {
        let fetcher = Arc::new(FakeFetcher::new(vec![]));
        let store = RecordingStore::default();

        let result = crawler(test_config(), fetcher)
            .crawl(&store, cancel_rx())
            .await;

        assert!(matches!(result, Err(AppError::Fetch { .. })));
    }

    #[tokio::test]
    async fn checkpoint_cadence_follows_save_frequency() {
        let fetcher = Arc::new(FakeFetcher::new(vec![
            (SEED, seed_page(&["/wiki/A", "/wiki/B", "/wiki/C", "/wiki/D"])),
            ("https://en.test.org/wiki/A", article("alpha beta")),
            ("https://en.test.org/wiki/B", article("gamma delta")),
            ("https://en.test.org/wiki/C", article("epsilon zeta")),
            ("https://en.test.org/wiki/D", article("eta theta")),
        ]));
        let store = RecordingStore::default();
        let mut config = test_config();
        config.save_frequency = 2;

        crawler(config, fetcher)
            .crawl(&store, cancel_rx())
            .await
            .unwrap();

        // Periodic saves at link indices 0 and 2, plus the final one.
        assert_eq!(store.save_count(), 3);
    }

    #[tokio::test]
    async fn checkpoint_write_failure_does_not_abort() {
        let fetcher = Arc::new(FakeFetcher::new(vec![
            (SEED, seed_page(&["/wiki/A"])),
            ("https://en.test.org/wiki/A", article("alpha beta")),
        ]));

        let outcome = crawler(test_config(), fetcher)
            .crawl(&FailingStore, cancel_rx())
            .await
            .unwrap();

        assert_eq!(outcome.corpus.len(), 1);
    }

    #[tokio::test]
    async fn cancellation_stops_before_fetching() {
        let fetcher = Arc::new(FakeFetcher::new(vec![
            (SEED, seed_page(&["/wiki/A"])),
            ("https://en.test.org/wiki/A", article("alpha beta")),
        ]));
        let store = RecordingStore::default();
        let (tx, rx) = watch::channel(true);

        let outcome = crawler(test_config(), Arc::clone(&fetcher))
            .crawl(&store, rx)
            .await
            .unwrap();
        drop(tx);

        assert_eq!(outcome.stats.links_fetched, 0);
        assert_eq!(fetcher.calls(), 1); // seed only
    }

    #[tokio::test]
    async fn cancellation_mid_crawl_checkpoints_partial_progress() {
        let (tx, rx) = watch::channel(false);
        let fetcher = Arc::new(SignallingFetcher {
            pages: vec![
                (SEED, seed_page(&["/wiki/A", "/wiki/B", "/wiki/C"])),
                ("https://en.test.org/wiki/A", article("alpha beta")),
                ("https://en.test.org/wiki/B", article("gamma delta")),
                ("https://en.test.org/wiki/C", article("epsilon zeta")),
            ]
            .into_iter()
            .map(|(url, body)| (url.to_string(), body))
            .collect(),
            trigger_url: "https://en.test.org/wiki/A".to_string(),
            cancel_tx: Mutex::new(Some(tx)),
        });
        let store = RecordingStore::default();

        let outcome = LinkCrawler::new(test_config(), fetcher)
            .unwrap()
            .crawl(&store, rx)
            .await
            .unwrap();

        // The interrupt lands after the first link; the crawl stops
        // there but keeps what it fetched.
        assert_eq!(outcome.stats.links_fetched, 1);
        assert_eq!(outcome.corpus.len(), 1);

        // Partial progress made it to the checkpoint store, and the
        // most recent snapshot is never empty.
        assert!(store.save_count() >= 1);
        assert_eq!(store.last_save(), Some(1));
    }

    #[tokio::test]
    async fn offsite_and_duplicate_links_are_filtered() {
        let seed_markup = r#"<html><body><div class="mw-body-content">
            <a href="/wiki/A" title="a">a</a>
            <a href="/wiki/A" title="a again">a</a>
            <a href="https://other.example.com/x" title="offsite">x</a>
            </div></body></html>"#
            .to_string();
        let fetcher = Arc::new(FakeFetcher::new(vec![
            (SEED, seed_markup),
            ("https://en.test.org/wiki/A", article("alpha beta")),
        ]));
        let store = RecordingStore::default();

        let outcome = crawler(test_config(), fetcher)
            .crawl(&store, cancel_rx())
            .await
            .unwrap();

        assert_eq!(outcome.stats.links_discovered, 1);
        assert_eq!(outcome.corpus.len(), 1);
    }
}

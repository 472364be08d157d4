// src/services/mod.rs

//! Crawling services: page fetching, document extraction, and the
//! one-level link crawler.

mod crawler;
mod extract;
mod fetch;

pub use crawler::{CrawlOutcome, CrawlStats, LinkCrawler};
pub use extract::DocumentExtractor;
pub use fetch::{HttpFetcher, PageFetcher};

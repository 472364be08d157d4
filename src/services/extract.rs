// src/services/extract.rs

//! Document extraction from raw page markup.
//!
//! Fixed pipeline, order matters: locate the content region, tokenize
//! its visible text, keep purely alphabetic tokens, drop stopwords,
//! deduplicate within the page keeping first occurrence. Deduplication
//! preserves the tokenization order, so the resulting sequence is
//! usable for adjacency-based model building.

use std::collections::HashSet;

use scraper::{Html, Selector};

use crate::error::{AppError, Result};
use crate::models::Document;
use crate::utils::text;

/// Produces a cleaned token sequence per fetched page.
pub struct DocumentExtractor {
    content_selector: Selector,
}

impl DocumentExtractor {
    /// Create an extractor for the given content-container selector.
    pub fn new(content_selector: &str) -> Result<Self> {
        let content_selector = Selector::parse(content_selector)
            .map_err(|e| AppError::selector(content_selector, format!("{e:?}")))?;
        Ok(Self { content_selector })
    }

    /// The content-container selector, shared with link discovery.
    pub(crate) fn content_selector(&self) -> &Selector {
        &self.content_selector
    }

    /// Extract a document from raw markup.
    ///
    /// A page without a content region yields an empty document rather
    /// than an error; the crawl must not lose other pages over one
    /// malformed one.
    pub fn extract(&self, markup: &str, source_url: &str) -> Document {
        let html = Html::parse_document(markup);

        // The last match is authoritative: earlier matches can be
        // navigation scaffolding that merely references the container.
        let region = match html.select(&self.content_selector).last() {
            Some(region) => region,
            None => {
                log::debug!("No content region in {source_url}");
                return Document::new(source_url, Vec::new());
            }
        };

        let body: String = region.text().collect::<Vec<_>>().join(" ");

        let mut seen = HashSet::new();
        let tokens: Vec<String> = text::tokenize(&body)
            .into_iter()
            .filter(|t| text::is_alphabetic(t))
            .filter(|t| !text::is_stopword(t))
            .filter(|t| seen.insert(t.clone()))
            .collect();

        Document::new(source_url, tokens)
    }
}

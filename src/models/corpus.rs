// src/models/corpus.rs

//! Corpus and document types accumulated by the crawler.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Token substring marking meta/index pages; matching tokens are
/// discarded when the corpus is finalized.
pub const NOISE_MARKER: &str = "list";

/// The cleaned token sequence extracted from one fetched page.
///
/// Tokens are non-empty, purely alphabetic, stopword-free and
/// deduplicated within the document (first occurrence kept, so the
/// tokenization order survives into model building). Immutable once
/// created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// URL the page was fetched from.
    pub source_url: String,
    /// Ordered, deduplicated tokens.
    pub tokens: Vec<String>,
}

impl Document {
    pub fn new(source_url: impl Into<String>, tokens: Vec<String>) -> Self {
        Self {
            source_url: source_url.into(),
            tokens,
        }
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// Documents accumulated across one crawl session.
///
/// Appended to only by the crawl loop; snapshotted by the checkpoint
/// store; loaded once at startup. Per-document token sequences are kept
/// so that n-grams never span two unrelated documents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Corpus {
    pub documents: Vec<Document>,
}

impl Corpus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, document: Document) {
        self.documents.push(document);
    }

    /// Number of documents.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Total token count across all documents.
    pub fn token_count(&self) -> usize {
        self.documents.iter().map(Document::len).sum()
    }

    /// Post-crawl cleanup: drop noise tokens (those containing
    /// [`NOISE_MARKER`], case-insensitive), re-deduplicate each
    /// document, and drop documents that end up empty or repeat an
    /// earlier document's token sequence.
    pub fn finalize(&mut self) {
        for doc in &mut self.documents {
            let mut seen = HashSet::new();
            doc.tokens.retain(|t| {
                !t.to_lowercase().contains(NOISE_MARKER) && seen.insert(t.clone())
            });
        }

        let mut seen_docs = HashSet::new();
        self.documents
            .retain(|doc| !doc.is_empty() && seen_docs.insert(doc.tokens.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(url: &str, tokens: &[&str]) -> Document {
        Document::new(url, tokens.iter().map(|t| t.to_string()).collect())
    }

    #[test]
    fn finalize_drops_noise_tokens() {
        let mut corpus = Corpus::new();
        corpus.push(doc("u1", &["apple", "Listing", "banana", "checklist"]));
        corpus.finalize();

        assert_eq!(corpus.documents[0].tokens, vec!["apple", "banana"]);
    }

    #[test]
    fn finalize_deduplicates_within_document() {
        let mut corpus = Corpus::new();
        corpus.push(doc("u1", &["a", "b", "a", "c", "b"]));
        corpus.finalize();

        assert_eq!(corpus.documents[0].tokens, vec!["a", "b", "c"]);
    }

    #[test]
    fn finalize_drops_empty_and_duplicate_documents() {
        let mut corpus = Corpus::new();
        corpus.push(doc("u1", &["alpha", "beta"]));
        corpus.push(doc("u2", &["listing"]));
        corpus.push(doc("u3", &["alpha", "beta"]));
        corpus.finalize();

        assert_eq!(corpus.len(), 1);
        assert_eq!(corpus.documents[0].source_url, "u1");
    }

    #[test]
    fn token_count_sums_documents() {
        let mut corpus = Corpus::new();
        corpus.push(doc("u1", &["a", "b"]));
        corpus.push(doc("u2", &["c"]));
        assert_eq!(corpus.token_count(), 3);
    }
}

// src/models/mod.rs

//! Domain models for the wikigram application.

mod config;
mod corpus;
mod ngram;

// Re-export all public types
pub use config::{Config, CrawlerConfig, GenerationConfig, ModelConfig, Normalization};
pub use corpus::{Corpus, Document};
pub use ngram::{Ngram, NgramModel, Symbol};

// src/models/config.rs

//! Application configuration structures.

use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP and crawling behavior settings
    #[serde(default)]
    pub crawler: CrawlerConfig,

    /// N-gram model settings
    #[serde(default)]
    pub model: ModelConfig,

    /// Generation settings
    #[serde(default)]
    pub generation: GenerationConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.crawler.seed_url.trim().is_empty() {
            return Err(AppError::validation("crawler.seed_url is empty"));
        }
        if self.crawler.base_url.trim().is_empty() {
            return Err(AppError::validation("crawler.base_url is empty"));
        }
        if self.crawler.user_agent.trim().is_empty() {
            return Err(AppError::validation("crawler.user_agent is empty"));
        }
        if self.crawler.timeout_secs == 0 {
            return Err(AppError::validation("crawler.timeout_secs must be > 0"));
        }
        if self.crawler.save_frequency == 0 {
            return Err(AppError::validation("crawler.save_frequency must be > 0"));
        }
        if self.crawler.max_requests == 0 {
            return Err(AppError::validation("crawler.max_requests must be > 0"));
        }
        if self.model.width < 2 {
            return Err(AppError::validation("model.width must be >= 2"));
        }
        if self.generation.max_length == 0 {
            return Err(AppError::validation("generation.max_length must be > 0"));
        }
        Ok(())
    }
}

/// HTTP client and crawling behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlerConfig {
    /// Seed page, relative to `base_url` or absolute
    #[serde(default = "defaults::seed_url")]
    pub seed_url: String,

    /// Base URL; only links resolving under this domain are followed
    #[serde(default = "defaults::base_url")]
    pub base_url: String,

    /// CSS selector for the primary content container
    #[serde(default = "defaults::content_selector")]
    pub content_selector: String,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Checkpoint after every Nth processed link
    #[serde(default = "defaults::save_frequency")]
    pub save_frequency: usize,

    /// Hard cap on outbound link fetches (seed excluded)
    #[serde(default = "defaults::max_requests")]
    pub max_requests: usize,

    /// Fixed pause between outbound fetches, in milliseconds
    #[serde(default = "defaults::courtesy_delay")]
    pub courtesy_delay_ms: u64,
}

impl CrawlerConfig {
    /// The courtesy delay as a [`Duration`].
    pub fn courtesy_delay(&self) -> Duration {
        Duration::from_millis(self.courtesy_delay_ms)
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            seed_url: defaults::seed_url(),
            base_url: defaults::base_url(),
            content_selector: defaults::content_selector(),
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            save_frequency: defaults::save_frequency(),
            max_requests: defaults::max_requests(),
            courtesy_delay_ms: defaults::courtesy_delay(),
        }
    }
}

/// N-gram model settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// N-gram width; must be >= 2
    #[serde(default = "defaults::width")]
    pub width: usize,

    /// Count trailing windows shorter than `width` instead of
    /// rejecting them
    #[serde(default)]
    pub allow_variable_size: bool,

    /// Insert START/STOP sentinels at document boundaries
    #[serde(default)]
    pub sentinel_mode: bool,

    /// Weight normalization scheme
    #[serde(default)]
    pub normalization: Normalization,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            width: defaults::width(),
            allow_variable_size: false,
            sentinel_mode: false,
            normalization: Normalization::default(),
        }
    }
}

/// Weight normalization scheme for the frequency model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Normalization {
    /// Each count divided by the number of distinct n-grams observed.
    /// Rank-preserving rescaling into (0, 1].
    #[default]
    UniqueCount,
    /// Each count transformed to (count - mean) / population std dev.
    /// Requires at least two distinct n-grams with nonzero variance.
    StandardScore,
}

impl FromStr for Normalization {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "unique_count" => Ok(Self::UniqueCount),
            "standard_score" => Ok(Self::StandardScore),
            other => Err(AppError::config(format!(
                "unknown normalization '{other}' (expected unique_count or standard_score)"
            ))),
        }
    }
}

/// Generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Maximum number of emitted words
    #[serde(default = "defaults::max_length")]
    pub max_length: usize,

    /// Minimum weight for a sentinel-mode start candidate
    #[serde(default)]
    pub min_start_weight: f64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_length: defaults::max_length(),
            min_start_weight: 0.0,
        }
    }
}

mod defaults {
    // Crawler defaults
    pub fn seed_url() -> String {
        "wiki/Lists_of_companies".into()
    }
    pub fn base_url() -> String {
        "https://en.wikipedia.org/".into()
    }
    pub fn content_selector() -> String {
        "div.mw-body-content".into()
    }
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; wikigram/0.1)".into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn save_frequency() -> usize {
        10
    }
    pub fn max_requests() -> usize {
        100
    }
    pub fn courtesy_delay() -> u64 {
        1000
    }

    // Model defaults
    pub fn width() -> usize {
        2
    }

    // Generation defaults
    pub fn max_length() -> usize {
        20
    }
}

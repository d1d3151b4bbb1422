//! Core types for aggregated results, source identification and
//! rate-limit state.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// A single item discovered by one source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Display title. Adapters substitute a source-specific placeholder
    /// when the upstream record has none.
    pub title: String,
    /// Summary text, possibly truncated by the adapter.
    pub description: String,
    /// Which source produced this result. Fixed at construction.
    source: Source,
    /// Link to the upstream record, if the source supplied one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Source-reported relevance, conventionally in `[0.0, 1.0]`.
    #[serde(default)]
    pub relevance: f64,
    /// Source-specific extension fields. A missing map and an empty map
    /// are the same thing.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub metadata: Map<String, Value>,
}

impl SearchResult {
    /// Create a result with no URL, zero relevance and empty metadata.
    pub fn new(source: Source, title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            source,
            url: None,
            relevance: 0.0,
            metadata: Map::new(),
        }
    }

    /// Set the result URL.
    #[must_use]
    pub fn with_url(mut self, url: Option<String>) -> Self {
        self.url = url;
        self
    }

    /// Set the relevance score.
    #[must_use]
    pub fn with_relevance(mut self, relevance: f64) -> Self {
        self.relevance = relevance;
        self
    }

    /// Insert one metadata field.
    #[must_use]
    pub fn with_meta(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.to_owned(), value.into());
        self
    }

    /// The source that produced this result.
    pub fn source(&self) -> Source {
        self.source
    }

    /// Look up a metadata field.
    pub fn meta(&self, key: &str) -> Option<&Value> {
        self.metadata.get(key)
    }
}

/// External sources the engine knows how to query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    /// Structured climate-risk data service.
    PhysRisk,
    /// Hosted content-extraction / news search service.
    Trafilatura,
    /// Sanctions-registry service.
    Watchman,
}

impl Source {
    /// Service name: the credential and rate-limit bucket key, and the
    /// name used in logs and output.
    pub fn name(&self) -> &'static str {
        match self {
            Self::PhysRisk => "physrisk",
            Self::Trafilatura => "trafilatura",
            Self::Watchman => "watchman",
        }
    }

    /// Returns all source variants in default query order.
    pub fn all() -> &'static [Source] {
        &[Self::PhysRisk, Self::Trafilatura, Self::Watchman]
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Rate-limit budget a service advertised on its latest successful response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitSnapshot {
    /// Total requests allowed in the current window.
    pub limit: u64,
    /// Requests left in the current window.
    pub remaining: u64,
    /// Seconds until the window resets. Advisory only.
    pub reset: u64,
}

/// Extracted readable content from a fetched web page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageContent {
    /// The URL that was fetched.
    pub url: String,
    /// The page title extracted from HTML.
    pub title: String,
    /// Cleaned, readable text content with HTML boilerplate stripped.
    pub text: String,
    /// Number of words in the extracted text.
    pub word_count: usize,
}

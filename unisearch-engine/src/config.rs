//! Search configuration with sensible defaults.
//!
//! [`SearchConfig`] controls which sources are queried, per-request and
//! aggregate deadlines, pacing, caching and the source endpoints. It
//! deserialises from any serde format with missing fields defaulted, so
//! hosts can embed it in their own config files.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::SearchError;
use crate::pacing::Pacer;
use crate::types::Source;

/// Upper bound for both timeouts: one day.
pub const MAX_TIMEOUT_SECONDS: u64 = 86_400;

/// Configuration for the aggregation engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Which sources to query, in concatenation order. Queried concurrently.
    pub sources: Vec<Source>,
    /// `limit` parameter sent to each source.
    pub result_limit: usize,
    /// Maximum characters kept from extracted page text.
    pub description_max_chars: usize,
    /// Per-request HTTP timeout in seconds.
    pub request_timeout_seconds: u64,
    /// Deadline for the whole aggregate search in seconds. Sources that
    /// have not answered by then contribute nothing.
    pub search_timeout_seconds: u64,
    /// How long to cache complete aggregate results. 0 disables caching.
    pub cache_ttl_seconds: u64,
    /// Minimum spacing between consecutive calls to the same source,
    /// expressed as calls per second. `None` disables pacing.
    pub calls_per_second: Option<f64>,
    /// Custom User-Agent string.
    pub user_agent: Option<String>,
    /// Base URLs of the source APIs.
    pub endpoints: Endpoints,
}

/// Base URLs for each source API. Adapters append their own paths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub physrisk: String,
    pub trafilatura: String,
    pub watchman: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            physrisk: "http://localhost:8000/api/v1".into(),
            trafilatura: "https://api.trafilatura.com/v1".into(),
            watchman: "http://localhost:8080/api/v1".into(),
        }
    }
}

impl Endpoints {
    /// Base URL configured for `source`.
    pub fn for_source(&self, source: Source) -> &str {
        match source {
            Source::PhysRisk => &self.physrisk,
            Source::Trafilatura => &self.trafilatura,
            Source::Watchman => &self.watchman,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            sources: Source::all().to_vec(),
            result_limit: 10,
            description_max_chars: 500,
            request_timeout_seconds: 10,
            search_timeout_seconds: 30,
            cache_ttl_seconds: 0,
            calls_per_second: None,
            user_agent: None,
            endpoints: Endpoints::default(),
        }
    }
}

impl SearchConfig {
    /// Validates this configuration, returning an error if any field is invalid.
    ///
    /// Checks:
    /// - `result_limit`, `description_max_chars` and both timeouts must be greater than 0
    /// - both timeouts must not exceed [`MAX_TIMEOUT_SECONDS`]
    /// - `sources` must not be empty or contain duplicates
    /// - `calls_per_second`, when set, must be a positive finite number whose
    ///   interval fits in a [`std::time::Duration`]
    /// - every endpoint must parse as an absolute URL
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.result_limit == 0 {
            return Err(SearchError::Config(
                "result_limit must be greater than 0".into(),
            ));
        }
        if self.description_max_chars == 0 {
            return Err(SearchError::Config(
                "description_max_chars must be greater than 0".into(),
            ));
        }
        if self.request_timeout_seconds == 0 {
            return Err(SearchError::Config(
                "request_timeout_seconds must be greater than 0".into(),
            ));
        }
        if self.search_timeout_seconds == 0 {
            return Err(SearchError::Config(
                "search_timeout_seconds must be greater than 0".into(),
            ));
        }
        for (name, secs) in [
            ("request_timeout_seconds", self.request_timeout_seconds),
            ("search_timeout_seconds", self.search_timeout_seconds),
        ] {
            if secs > MAX_TIMEOUT_SECONDS {
                return Err(SearchError::Config(format!(
                    "{name} must be at most {MAX_TIMEOUT_SECONDS}, got {secs}"
                )));
            }
        }
        if self.sources.is_empty() {
            return Err(SearchError::Config(
                "at least one source must be enabled".into(),
            ));
        }
        for (i, source) in self.sources.iter().enumerate() {
            if self.sources[..i].contains(source) {
                return Err(SearchError::Config(format!(
                    "source {source} is listed more than once"
                )));
            }
        }
        if let Some(rate) = self.calls_per_second {
            Pacer::new(rate)?;
        }
        for source in Source::all() {
            let raw = self.endpoints.for_source(*source);
            if let Err(e) = Url::parse(raw) {
                return Err(SearchError::Config(format!(
                    "endpoint for {source} is not a valid URL ({raw:?}): {e}"
                )));
            }
        }
        Ok(())
    }
}

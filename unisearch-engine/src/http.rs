//! Shared HTTP client construction.
//!
//! One [`reqwest::Client`] is built per [`crate::client::RateLimitedClient`]
//! and reused for every source request and page fetch, so connection
//! pools are shared across adapters.

use crate::config::SearchConfig;
use crate::error::SearchError;
use std::time::Duration;

/// User-Agent sent when the config does not override it.
pub const DEFAULT_USER_AGENT: &str = concat!("unisearch/", env!("CARGO_PKG_VERSION"));

/// Build a [`reqwest::Client`] for source API requests.
///
/// The client has:
/// - Per-request timeout from `config.request_timeout_seconds`
/// - The configured User-Agent, or [`DEFAULT_USER_AGENT`]
/// - A bounded redirect policy (page fetches commonly redirect)
///
/// # Errors
///
/// Returns [`SearchError::Config`] if the client cannot be constructed.
pub fn build_client(config: &SearchConfig) -> Result<reqwest::Client, SearchError> {
    let ua = config
        .user_agent
        .clone()
        .unwrap_or_else(|| DEFAULT_USER_AGENT.to_owned());

    reqwest::Client::builder()
        .timeout(Duration::from_secs(config.request_timeout_seconds))
        .user_agent(ua)
        .redirect(reqwest::redirect::Policy::limited(10))
        .build()
        .map_err(|e| SearchError::Config(format!("failed to build HTTP client: {e}")))
}

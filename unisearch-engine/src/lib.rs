//! # unisearch-engine
//!
//! One query, several specialised sources, one ranked answer.
//!
//! This crate fans a query out to heterogeneous search backends
//! (structured climate-risk data, extracted news content and a sanctions
//! registry), normalises their records into [`SearchResult`] and orders
//! them with a source-aware composite ranking.
//!
//! ## Design
//!
//! - One [`RateLimitedClient`] owns credentials and per-service rate-limit
//!   snapshots, shared by every adapter
//! - Adapters run concurrently under one aggregate deadline
//! - Graceful degradation: a failing, panicking or slow source contributes
//!   nothing and is reported to a [`FailureSink`], never to the caller
//! - Optional per-source pacing and an in-memory result cache
//!
//! ## Security
//!
//! - Credentials are only sent to the service they were registered for
//! - Page fetches for content extraction never carry a credential
//! - Queries are logged only at trace level

pub mod adapter;
pub mod adapters;
pub mod aggregator;
pub mod cache;
pub mod client;
pub mod config;
pub mod content;
pub mod error;
pub mod http;
pub mod pacing;
pub mod report;
pub mod types;

pub use adapter::SourceAdapter;
pub use aggregator::{rank, Aggregator, AggregatorBuilder, RankKey};
pub use client::RateLimitedClient;
pub use config::{Endpoints, SearchConfig};
pub use error::{Result, SearchError};
pub use report::{FailureRecord, FailureSink, MemorySink, TracingSink};
pub use types::{PageContent, RateLimitSnapshot, SearchResult, Source};

/// Search every source in `config` once.
///
/// Builds a throwaway [`Aggregator`] with default collaborators. Hosts that
/// search repeatedly, set credentials or read rate-limit state should keep
/// an [`Aggregator`] instead.
///
/// # Errors
///
/// Returns [`SearchError::Config`] if `config` is invalid. Source failures
/// never surface here; they shrink the result set instead.
///
/// # Examples
///
/// ```no_run
/// # async fn example() -> unisearch_engine::Result<()> {
/// let config = unisearch_engine::SearchConfig::default();
/// let results = unisearch_engine::search("coastal flooding", &config).await?;
/// for result in &results {
///     println!("[{}] {}", result.source(), result.title);
/// }
/// # Ok(())
/// # }
/// ```
pub async fn search(query: &str, config: &SearchConfig) -> Result<Vec<SearchResult>> {
    let aggregator = Aggregator::new(config.clone())?;
    Ok(aggregator.search(query).await)
}

/// Fetch a page and extract its readable text.
///
/// # Errors
///
/// Returns [`SearchError::Transport`] or [`SearchError::RequestFailed`] if
/// the page cannot be fetched, or [`SearchError::Parse`] if it has no
/// extractable text.
pub async fn fetch_page_content(url: &str, config: &SearchConfig) -> Result<PageContent> {
    let client = RateLimitedClient::from_config(config)?;
    let html = client.fetch_text(url).await?;
    content::extract_content(&html, url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn search_validates_config_zero_result_limit() {
        let config = SearchConfig {
            result_limit: 0,
            ..Default::default()
        };
        let err = search("test", &config).await.unwrap_err();
        assert!(err.to_string().contains("result_limit"));
    }

    #[tokio::test]
    async fn search_validates_config_empty_sources() {
        let config = SearchConfig {
            sources: vec![],
            ..Default::default()
        };
        let err = search("test", &config).await.unwrap_err();
        assert!(err.to_string().contains("source"));
    }

    #[tokio::test]
    async fn search_validates_config_zero_timeout() {
        let config = SearchConfig {
            search_timeout_seconds: 0,
            ..Default::default()
        };
        let err = search("test", &config).await.unwrap_err();
        assert!(err.to_string().contains("timeout"));
    }

    #[tokio::test]
    async fn fetch_page_content_extracts_article() {
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/story"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                "<html><head><title>Story</title></head>\
                 <body><nav>menu</nav><article><p>Rivers rose overnight.</p></article></body></html>",
            ))
            .mount(&server)
            .await;

        let page = fetch_page_content(&format!("{}/story", server.uri()), &SearchConfig::default())
            .await
            .expect("extract");
        assert_eq!(page.title, "Story");
        assert_eq!(page.text, "Rivers rose overnight.");
        assert_eq!(page.word_count, 3);
    }
}

//! Trafilatura adapter: news and web content with extracted article text.
//!
//! The mode is fixed at construction:
//!
//! | Credential `trafilatura` | Mode   | Behaviour                                   |
//! |--------------------------|--------|---------------------------------------------|
//! | present                  | remote | `{base}/search`, then fetch + extract pages |
//! | absent                   | local  | delegate to the injected [`LocalSearch`]    |
//!
//! In remote mode each listed page is fetched and reduced to its main text.
//! When extraction fails or yields nothing the API's own description is
//! used instead, so a broken page never drops the record.

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use serde_json::Value;

use super::{degrade, endpoint, fields, objects, SourceRequester};
use crate::adapter::SourceAdapter;
use crate::client::RateLimitedClient;
use crate::content::ContentExtractor;
use crate::error::Result;
use crate::pacing::Pacer;
use crate::report::FailureSink;
use crate::types::{SearchResult, Source};

const DEFAULT_TITLE: &str = "News Article";
const DEFAULT_LANGUAGE: &str = "en";

/// Content search that runs without the remote API.
#[async_trait]
pub trait LocalSearch: Send + Sync {
    /// # Errors
    ///
    /// Implementations may fail; the adapter reports the error and
    /// contributes nothing.
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>>;
}

/// Stand-in local search returning one fixed example result.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlaceholderLocalSearch;

#[async_trait]
impl LocalSearch for PlaceholderLocalSearch {
    async fn search(&self, _query: &str) -> Result<Vec<SearchResult>> {
        Ok(vec![SearchResult::new(
            Source::Trafilatura,
            "Local News Article",
            "Example result from local trafilatura search",
        )
        .with_relevance(0.6)])
    }
}

enum Mode {
    Remote,
    Local,
}

/// Content-extraction source adapter.
pub struct TrafilaturaAdapter {
    requester: SourceRequester,
    sink: Arc<dyn FailureSink>,
    base_url: String,
    extractor: Arc<dyn ContentExtractor>,
    local: Arc<dyn LocalSearch>,
    mode: Mode,
    result_limit: usize,
    description_max_chars: usize,
}

impl TrafilaturaAdapter {
    /// Build the adapter. Remote mode is selected when `client` already
    /// holds a `trafilatura` credential.
    pub fn new(
        client: Arc<RateLimitedClient>,
        sink: Arc<dyn FailureSink>,
        base_url: impl Into<String>,
        extractor: Arc<dyn ContentExtractor>,
        local: Arc<dyn LocalSearch>,
    ) -> Self {
        let mode = if client.credential(Source::Trafilatura.name()).is_some() {
            Mode::Remote
        } else {
            Mode::Local
        };
        Self {
            requester: SourceRequester::new(Source::Trafilatura, client),
            sink,
            base_url: base_url.into(),
            extractor,
            local,
            mode,
            result_limit: 10,
            description_max_chars: 500,
        }
    }

    #[must_use]
    pub fn with_result_limit(mut self, limit: usize) -> Self {
        self.result_limit = limit;
        self
    }

    /// Maximum description length, in characters.
    #[must_use]
    pub fn with_description_max_chars(mut self, max_chars: usize) -> Self {
        self.description_max_chars = max_chars;
        self
    }

    #[must_use]
    pub fn with_pacer(mut self, pacer: Pacer) -> Self {
        self.requester = self.requester.with_pacer(pacer);
        self
    }

    pub fn is_remote(&self) -> bool {
        matches!(self.mode, Mode::Remote)
    }

    async fn fetch_remote(&self, query: &str) -> Result<Vec<SearchResult>> {
        tracing::trace!(query, "Trafilatura remote search");

        let url = endpoint(&self.base_url, "search");
        let params = [
            ("query", query.to_owned()),
            ("limit", self.result_limit.to_string()),
            ("lang", DEFAULT_LANGUAGE.to_owned()),
        ];
        let payload = self.requester.get(&url, &params).await?;
        let items = fields::records(&payload, "results")?;
        let items = objects(Source::Trafilatura, self.sink.as_ref(), items);

        Ok(join_all(items.into_iter().map(|item| self.enrich(item))).await)
    }

    /// Build one result, preferring extracted page text over the API's
    /// description.
    async fn enrich(&self, item: &Value) -> SearchResult {
        let link = fields::string(item, "url");

        let extracted = match link.as_deref() {
            Some(page) => match self.extractor.fetch_and_extract(page).await {
                Ok(content) if !content.text.trim().is_empty() => Some(content.text),
                Ok(_) => None,
                Err(err) => {
                    tracing::debug!(
                        url = page,
                        error = %err,
                        "content extraction failed, using API description"
                    );
                    None
                }
            },
            None => None,
        };

        let text = extracted
            .or_else(|| fields::string(item, "description"))
            .unwrap_or_default();
        trafilatura_result(item, link, &text, self.description_max_chars)
    }

    async fn fetch_local(&self, query: &str) -> Result<Vec<SearchResult>> {
        tracing::trace!(query, "Trafilatura local search");
        self.local.search(query).await
    }
}

#[async_trait]
impl SourceAdapter for TrafilaturaAdapter {
    fn source(&self) -> Source {
        Source::Trafilatura
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchResult>> {
        let outcome = match self.mode {
            Mode::Remote => self.fetch_remote(query).await,
            Mode::Local => self.fetch_local(query).await,
        };
        Ok(degrade(Source::Trafilatura, self.sink.as_ref(), outcome))
    }
}

fn trafilatura_result(
    item: &Value,
    link: Option<String>,
    text: &str,
    max_chars: usize,
) -> SearchResult {
    let description = fields::truncate_chars(text, max_chars);
    let words = fields::word_count(&description);
    SearchResult::new(
        Source::Trafilatura,
        fields::string_or(item, "title", DEFAULT_TITLE),
        description,
    )
    .with_url(link)
    .with_relevance(fields::relevance(item))
    .with_meta("source_domain", fields::passthrough(item, "domain"))
    .with_meta(
        "language",
        fields::string_or(item, "language", DEFAULT_LANGUAGE),
    )
    .with_meta("date", fields::date_or_now(item))
    .with_meta("word_count", words)
}

//! Watchman adapter: sanctions and watch-list records.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use super::{degrade, endpoint, fields, objects, SourceRequester};
use crate::adapter::SourceAdapter;
use crate::client::RateLimitedClient;
use crate::error::Result;
use crate::pacing::Pacer;
use crate::report::FailureSink;
use crate::types::{SearchResult, Source};

const DEFAULT_TITLE: &str = "Sanction Record";

/// Registry/sanctions source adapter.
///
/// Each entry of the `sanctions` array becomes one result; the listed
/// `entities` are kept in metadata and feed the ranking tie-break.
pub struct WatchmanAdapter {
    requester: SourceRequester,
    sink: Arc<dyn FailureSink>,
    base_url: String,
    result_limit: usize,
}

impl WatchmanAdapter {
    pub fn new(
        client: Arc<RateLimitedClient>,
        sink: Arc<dyn FailureSink>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            requester: SourceRequester::new(Source::Watchman, client),
            sink,
            base_url: base_url.into(),
            result_limit: 10,
        }
    }

    #[must_use]
    pub fn with_result_limit(mut self, limit: usize) -> Self {
        self.result_limit = limit;
        self
    }

    #[must_use]
    pub fn with_pacer(mut self, pacer: Pacer) -> Self {
        self.requester = self.requester.with_pacer(pacer);
        self
    }

    async fn fetch(&self, query: &str) -> Result<Vec<SearchResult>> {
        tracing::trace!(query, "Watchman search");

        let url = endpoint(&self.base_url, "sanctions/search");
        let params = [
            ("query", query.to_owned()),
            ("limit", self.result_limit.to_string()),
            ("sort", "relevance".to_owned()),
        ];
        let payload = self.requester.get(&url, &params).await?;
        parse_watchman_payload(&payload, self.sink.as_ref())
    }
}

#[async_trait]
impl SourceAdapter for WatchmanAdapter {
    fn source(&self) -> Source {
        Source::Watchman
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchResult>> {
        let outcome = self.fetch(query).await;
        Ok(degrade(Source::Watchman, self.sink.as_ref(), outcome))
    }
}

pub(crate) fn parse_watchman_payload(
    payload: &Value,
    sink: &dyn FailureSink,
) -> Result<Vec<SearchResult>> {
    let items = fields::records(payload, "sanctions")?;
    Ok(objects(Source::Watchman, sink, items)
        .into_iter()
        .map(watchman_result)
        .collect())
}

fn watchman_result(item: &Value) -> SearchResult {
    SearchResult::new(
        Source::Watchman,
        fields::string_or(item, "name", DEFAULT_TITLE),
        fields::string(item, "reason").unwrap_or_default(),
    )
    .with_url(fields::string(item, "source_url"))
    .with_relevance(fields::relevance(item))
    .with_meta("country", fields::passthrough(item, "country"))
    .with_meta("type", fields::passthrough(item, "type"))
    .with_meta("issued_date", fields::passthrough(item, "issued_date"))
    .with_meta("expiration_date", fields::passthrough(item, "expiration_date"))
    .with_meta("entities", fields::array_or_empty(item, "entities"))
}

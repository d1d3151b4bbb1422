//! PhysRisk adapter: structured climate-risk records.
//!
//! Queries `{base}/risks/search` and maps each entry of the `results`
//! array into a [`SearchResult`] carrying location, risk type and date.

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

const DEFAULT_TITLE: &str = "Climate Risk Data";

/// Structured-data source adapter.
pub struct PhysRiskAdapter {
    requester: SourceRequester,
    sink: Arc<dyn FailureSink>,
    base_url: String,
    result_limit: usize,
}

impl PhysRiskAdapter {
    pub fn new(
        client: Arc<RateLimitedClient>,
        sink: Arc<dyn FailureSink>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            requester: SourceRequester::new(Source::PhysRisk, client),
            sink,
            base_url: base_url.into(),
            result_limit: 10,
        }
    }

    /// Number of records requested from the API.
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
        tracing::trace!(query, "PhysRisk search");

        let url = endpoint(&self.base_url, "risks/search");
        let params = [
            ("query", query.to_owned()),
            ("limit", self.result_limit.to_string()),
            ("sort", "relevance".to_owned()),
        ];
        let payload = self.requester.get(&url, &params).await?;
        parse_physrisk_payload(&payload, self.sink.as_ref())
    }
}

#[async_trait]
impl SourceAdapter for PhysRiskAdapter {
    fn source(&self) -> Source {
        Source::PhysRisk
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchResult>> {
        let outcome = self.fetch(query).await;
        Ok(degrade(Source::PhysRisk, self.sink.as_ref(), outcome))
    }
}

/// Map a PhysRisk response body into results.
pub(crate) fn parse_physrisk_payload(
    payload: &Value,
    sink: &dyn FailureSink,
) -> Result<Vec<SearchResult>> {
    let items = fields::records(payload, "results")?;
    Ok(objects(Source::PhysRisk, sink, items)
        .into_iter()
        .map(physrisk_result)
        .collect())
}

fn physrisk_result(item: &Value) -> SearchResult {
    SearchResult::new(
        Source::PhysRisk,
        fields::string_or(item, "title", DEFAULT_TITLE),
        fields::string(item, "description").unwrap_or_default(),
    )
    .with_url(fields::string(item, "url"))
    .with_relevance(fields::relevance(item))
    .with_meta("location", fields::passthrough(item, "location"))
    .with_meta("risk_type", fields::passthrough(item, "risk_type"))
    .with_meta("date", fields::date_or_now(item))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::MemorySink;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn adapter(server: &MockServer, sink: Arc<MemorySink>) -> (PhysRiskAdapter, Arc<RateLimitedClient>) {
        let client = Arc::new(RateLimitedClient::new(reqwest::Client::new()));
        let adapter = PhysRiskAdapter::new(
            Arc::clone(&client),
            sink,
            format!("{}/api/v1", server.uri()),
        );
        (adapter, client)
    }

    #[test]
    fn maps_full_record() {
        let sink = MemorySink::new();
        let payload = json!({
            "results": [{
                "title": "Flood exposure, Rotterdam",
                "description": "Coastal flood risk assessment",
                "url": "https://physrisk.example/r/1",
                "relevance_score": 0.82,
                "location": "Rotterdam, NL",
                "risk_type": "flood",
                "date": "2024-03-01T00:00:00Z"
            }]
        });

        let results = parse_physrisk_payload(&payload, &sink).expect("parse");
        assert_eq!(results.len(), 1);
        let r = &results[0];
        assert_eq!(r.source(), Source::PhysRisk);
        assert_eq!(r.title, "Flood exposure, Rotterdam");
        assert_eq!(r.description, "Coastal flood risk assessment");
        assert_eq!(r.url.as_deref(), Some("https://physrisk.example/r/1"));
        assert!((r.relevance - 0.82).abs() < f64::EPSILON);
        assert_eq!(r.meta("location"), Some(&json!("Rotterdam, NL")));
        assert_eq!(r.meta("risk_type"), Some(&json!("flood")));
        assert_eq!(r.meta("date"), Some(&json!("2024-03-01T00:00:00Z")));
        assert!(sink.is_empty());
    }

    #[test]
    fn missing_fields_use_defaults() {
        let sink = MemorySink::new();
        let payload = json!({ "results": [{}] });

        let results = parse_physrisk_payload(&payload, &sink).expect("parse");
        let r = &results[0];
        assert_eq!(r.title, DEFAULT_TITLE);
        assert_eq!(r.description, "");
        assert_eq!(r.url, None);
        assert_eq!(r.relevance, 0.0);
        assert_eq!(r.meta("location"), Some(&Value::Null));
        let date = r.meta("date").and_then(Value::as_str).expect("date");
        assert!(chrono::DateTime::parse_from_rfc3339(date).is_ok());
    }

    #[test]
    fn numeric_string_relevance_is_accepted() {
        let sink = MemorySink::new();
        let payload = json!({ "results": [{ "relevance_score": "0.4" }, { "relevance_score": "high" }] });
        let results = parse_physrisk_payload(&payload, &sink).expect("parse");
        assert!((results[0].relevance - 0.4).abs() < f64::EPSILON);
        assert_eq!(results[1].relevance, 0.0);
    }

    #[test]
    fn missing_results_key_is_empty() {
        let sink = MemorySink::new();
        let results = parse_physrisk_payload(&json!({ "total": 0 }), &sink).expect("parse");
        assert!(results.is_empty());
    }

    #[test]
    fn non_array_results_is_an_error() {
        let sink = MemorySink::new();
        let err = parse_physrisk_payload(&json!({ "results": "oops" }), &sink).unwrap_err();
        assert_eq!(err.kind(), "parse");
    }

    #[tokio::test]
    async fn sends_expected_query_and_auth() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/risks/search"))
            .and(query_param("query", "flood"))
            .and(query_param("limit", "5"))
            .and(query_param("sort", "relevance"))
            .and(header("authorization", "Bearer pr-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [{ "title": "Flood", "relevance_score": 0.9 }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let sink = Arc::new(MemorySink::new());
        let (adapter, client) = adapter(&server, Arc::clone(&sink));
        client.set_credential("physrisk", "pr-token");
        let adapter = adapter.with_result_limit(5);

        let results = adapter.search("flood").await.expect("search");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].title, "Flood");
        assert!(sink.is_empty());
    }

    #[tokio::test]
    async fn server_error_degrades_to_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/risks/search"))
            .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
            .mount(&server)
            .await;

        let sink = Arc::new(MemorySink::new());
        let (adapter, _client) = adapter(&server, Arc::clone(&sink));

        let results = adapter.search("flood").await.expect("never errors");
        assert!(results.is_empty());

        let records = sink.for_source(Source::PhysRisk);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].kind, "request_failed");
        assert!(records[0].message.contains("503"));
    }

    #[test]
    fn is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PhysRiskAdapter>();
    }
}

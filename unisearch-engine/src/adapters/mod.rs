//! Source adapter implementations.
//!
//! Each module provides a struct implementing [`crate::adapter::SourceAdapter`]
//! for one external source. They share a [`SourceRequester`] (the shared
//! client plus optional pacing) and the same degrade-on-failure policy.

pub(crate) mod fields;
pub mod physrisk;
pub mod trafilatura;
pub mod watchman;

pub use physrisk::PhysRiskAdapter;
pub use trafilatura::{LocalSearch, PlaceholderLocalSearch, TrafilaturaAdapter};
pub use watchman::WatchmanAdapter;

use std::sync::Arc;

use serde_json::Value;

use crate::client::RateLimitedClient;
use crate::error::{Result, SearchError};
use crate::pacing::Pacer;
use crate::report::{FailureRecord, FailureSink, FailureStage};
use crate::types::{SearchResult, Source};

/// Issues a source's API requests through the shared client, under the
/// source's service bucket, optionally paced.
pub struct SourceRequester {
    source: Source,
    client: Arc<RateLimitedClient>,
    pacer: Option<Pacer>,
}

impl SourceRequester {
    pub fn new(source: Source, client: Arc<RateLimitedClient>) -> Self {
        Self {
            source,
            client,
            pacer: None,
        }
    }

    /// Space this source's requests at most `calls_per_second` apart.
    #[must_use]
    pub fn with_pacer(mut self, pacer: Pacer) -> Self {
        self.pacer = Some(pacer);
        self
    }

    /// GET `url` with `params` under this source's service name.
    ///
    /// # Errors
    ///
    /// Propagates [`RateLimitedClient::request`] errors unchanged.
    pub async fn get(&self, url: &str, params: &[(&str, String)]) -> Result<Value> {
        let service = self.source.name();
        match &self.pacer {
            Some(pacer) => {
                pacer
                    .call(|| self.client.request(service, url, params, &[]))
                    .await
            }
            None => self.client.request(service, url, params, &[]).await,
        }
    }
}

/// Turn an adapter's internal outcome into its contribution: results pass
/// through, errors are reported to `sink` and become an empty list.
pub(crate) fn degrade(
    source: Source,
    sink: &dyn FailureSink,
    outcome: Result<Vec<SearchResult>>,
) -> Vec<SearchResult> {
    match outcome {
        Ok(results) => {
            tracing::debug!(%source, count = results.len(), "source returned results");
            results
        }
        Err(err) => {
            sink.record(FailureRecord::new(source, FailureStage::Adapter, &err));
            Vec::new()
        }
    }
}

/// The object records in `items`. Anything else carries no fields at all,
/// so it is reported to `sink` and skipped.
pub(crate) fn objects<'a>(
    source: Source,
    sink: &dyn FailureSink,
    items: &'a [Value],
) -> Vec<&'a Value> {
    items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| {
            if item.is_object() {
                Some(item)
            } else {
                let err = SearchError::Parse(format!(
                    "record {index} is not an object, skipping"
                ));
                sink.record(FailureRecord::new(source, FailureStage::Adapter, &err));
                None
            }
        })
        .collect()
}

/// Join a base URL and a path without doubling the slash.
pub(crate) fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), path.trim_start_matches('/'))
}

//! The aggregator: concurrent fan-out with failure isolation.
//!
//! # Pipeline
//!
//! 1. Serve from the result cache when enabled and warm
//! 2. Spawn one task per configured adapter
//! 3. Await every task against a single aggregate deadline; late tasks
//!    are aborted, and dropping the search aborts every task still running
//! 4. Turn adapter errors, panics and missed deadlines into
//!    [`SearchError::AdapterFailure`] records and empty contributions
//! 5. Concatenate contributions in configured order and [`rank`] them
//! 6. Cache the ranked set if no failure was recorded along the way

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tokio::time::Instant;
use tokio_util::task::AbortOnDropHandle;

use super::ranking::rank;
use crate::adapter::SourceAdapter;
use crate::adapters::{
    LocalSearch, PhysRiskAdapter, PlaceholderLocalSearch, TrafilaturaAdapter, WatchmanAdapter,
};
use crate::cache::{CacheKey, ResultCache};
use crate::client::RateLimitedClient;
use crate::config::{SearchConfig, MAX_TIMEOUT_SECONDS};
use crate::content::{ContentExtractor, HttpContentExtractor};
use crate::error::{Result, SearchError};
use crate::pacing::Pacer;
use crate::report::{CountingSink, FailureRecord, FailureSink, FailureStage, TracingSink};
use crate::types::{RateLimitSnapshot, SearchResult, Source};

/// Queries every configured source concurrently and returns one ranked list.
///
/// Never fails at query time: whatever the sources do, [`search`](Self::search)
/// returns the results that could be gathered, possibly none.
pub struct Aggregator {
    config: SearchConfig,
    client: Arc<RateLimitedClient>,
    sink: Arc<CountingSink>,
    adapters: Vec<Arc<dyn SourceAdapter>>,
    cache: ResultCache,
}

impl Aggregator {
    /// Build an aggregator for `config` with default collaborators.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] if the configuration is invalid or
    /// the HTTP client cannot be built.
    pub fn new(config: SearchConfig) -> Result<Self> {
        Self::builder(config).build()
    }

    pub fn builder(config: SearchConfig) -> AggregatorBuilder {
        AggregatorBuilder::new(config)
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// The shared client; credentials set here apply to later requests.
    pub fn client(&self) -> &Arc<RateLimitedClient> {
        &self.client
    }

    /// Sources of the configured adapters, in concatenation order.
    pub fn sources(&self) -> Vec<Source> {
        self.adapters.iter().map(|a| a.source()).collect()
    }

    /// Run `query` against every adapter and return the ranked union.
    pub async fn search(&self, query: &str) -> Vec<SearchResult> {
        tracing::trace!(query, "aggregate search");

        let key = CacheKey::new(query, &self.sources());
        if let Some(hit) = self.cache.get(&key).await {
            tracing::debug!(count = hit.len(), "serving cached results");
            return hit;
        }

        let failures_before = self.sink.count();
        let now = Instant::now();
        let deadline = now
            .checked_add(Duration::from_secs(self.config.search_timeout_seconds))
            .unwrap_or_else(|| now + Duration::from_secs(MAX_TIMEOUT_SECONDS));

        let tasks = self.adapters.iter().map(|adapter| {
            let source = adapter.source();
            let adapter = Arc::clone(adapter);
            let query = query.to_owned();
            let handle =
                AbortOnDropHandle::new(tokio::spawn(async move { adapter.search(&query).await }));
            self.collect(source, handle, deadline)
        });
        let contributions = join_all(tasks).await;

        let results: Vec<SearchResult> = contributions.into_iter().flatten().collect();
        let ranked = rank(results);
        tracing::debug!(count = ranked.len(), "aggregate search complete");

        if self.cache.is_enabled() && self.sink.count() == failures_before {
            self.cache.insert(key, ranked.clone()).await;
        }
        ranked
    }

    /// Await one adapter task, converting every failure into an empty
    /// contribution plus a failure record.
    async fn collect(
        &self,
        source: Source,
        mut handle: AbortOnDropHandle<Result<Vec<SearchResult>>>,
        deadline: Instant,
    ) -> Vec<SearchResult> {
        let message = match tokio::time::timeout_at(deadline, &mut handle).await {
            Ok(Ok(Ok(results))) => return results,
            Ok(Ok(Err(err))) => err.to_string(),
            Ok(Err(join_err)) if join_err.is_panic() => "adapter panicked".to_owned(),
            Ok(Err(join_err)) => format!("adapter task did not complete: {join_err}"),
            Err(_) => {
                handle.abort();
                format!(
                    "no response within {}s",
                    self.config.search_timeout_seconds
                )
            }
        };

        let err = SearchError::AdapterFailure {
            adapter: source.name().to_owned(),
            message,
        };
        self.sink
            .record(FailureRecord::new(source, FailureStage::Aggregator, &err));
        Vec::new()
    }

    /// Latest rate-limit snapshot per configured source. `None` until the
    /// source has answered with a complete set of rate-limit headers.
    pub fn rate_limit_info(&self) -> BTreeMap<Source, Option<RateLimitSnapshot>> {
        self.adapters
            .iter()
            .map(|a| {
                let source = a.source();
                (source, self.client.rate_limit_info(source.name()))
            })
            .collect()
    }
}

/// Assembles an [`Aggregator`], defaulting every collaborator that is not
/// supplied.
///
/// | Collaborator      | Default                                      |
/// |-------------------|----------------------------------------------|
/// | client            | built from the config (timeout, User-Agent)  |
/// | failure sink      | [`TracingSink`]                              |
/// | content extractor | [`HttpContentExtractor`] on the shared client |
/// | local search      | [`PlaceholderLocalSearch`]                   |
/// | adapters          | one per entry of `config.sources`            |
pub struct AggregatorBuilder {
    config: SearchConfig,
    client: Option<Arc<RateLimitedClient>>,
    credentials: Vec<(Source, String)>,
    sink: Option<Arc<dyn FailureSink>>,
    extractor: Option<Arc<dyn ContentExtractor>>,
    local_search: Option<Arc<dyn LocalSearch>>,
    adapters: Option<AdapterFactory>,
}

/// Builds custom adapters from the aggregator's failure sink.
type AdapterFactory = Box<dyn FnOnce(Arc<dyn FailureSink>) -> Vec<Arc<dyn SourceAdapter>>>;

impl AggregatorBuilder {
    pub fn new(config: SearchConfig) -> Self {
        Self {
            config,
            client: None,
            credentials: Vec::new(),
            sink: None,
            extractor: None,
            local_search: None,
            adapters: None,
        }
    }

    /// Register a bearer token for `source`. Applied to the client before
    /// adapters are built, so it also selects Trafilatura's remote mode.
    #[must_use]
    pub fn credential(mut self, source: Source, token: impl Into<String>) -> Self {
        self.credentials.push((source, token.into()));
        self
    }

    #[must_use]
    pub fn client(mut self, client: Arc<RateLimitedClient>) -> Self {
        self.client = Some(client);
        self
    }

    #[must_use]
    pub fn sink(mut self, sink: Arc<dyn FailureSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    #[must_use]
    pub fn content_extractor(mut self, extractor: Arc<dyn ContentExtractor>) -> Self {
        self.extractor = Some(extractor);
        self
    }

    #[must_use]
    pub fn local_search(mut self, local: Arc<dyn LocalSearch>) -> Self {
        self.local_search = Some(local);
        self
    }

    /// Replace the configured adapters entirely. `config.sources` is then
    /// ignored.
    ///
    /// Failures these adapters report to their own sinks are invisible to
    /// the aggregator, so a degraded result can be cached. Use
    /// [`adapters_with_sink`](Self::adapters_with_sink) when caching is on.
    #[must_use]
    pub fn adapters(mut self, adapters: Vec<Arc<dyn SourceAdapter>>) -> Self {
        self.adapters = Some(Box::new(move |_| adapters));
        self
    }

    /// Replace the configured adapters with ones built around the
    /// aggregator's own failure sink. Records they write count against
    /// caching and reach the sink set with [`sink`](Self::sink).
    #[must_use]
    pub fn adapters_with_sink<F>(mut self, build: F) -> Self
    where
        F: FnOnce(Arc<dyn FailureSink>) -> Vec<Arc<dyn SourceAdapter>> + 'static,
    {
        self.adapters = Some(Box::new(build));
        self
    }

    /// # Errors
    ///
    /// Returns [`SearchError::Config`] if the configuration fails
    /// validation or the HTTP client cannot be built.
    pub fn build(self) -> Result<Aggregator> {
        self.config.validate()?;

        let client = match self.client {
            Some(client) => client,
            None => Arc::new(RateLimitedClient::from_config(&self.config)?),
        };
        for (source, token) in self.credentials {
            client.set_credential(source.name(), token);
        }

        let sink = Arc::new(CountingSink::new(
            self.sink.unwrap_or_else(|| Arc::new(TracingSink)),
        ));

        let adapters = match self.adapters {
            Some(build) => build(Arc::clone(&sink) as Arc<dyn FailureSink>),
            None => {
                let extractor = self
                    .extractor
                    .unwrap_or_else(|| Arc::new(HttpContentExtractor::new(Arc::clone(&client))));
                let local = self
                    .local_search
                    .unwrap_or_else(|| Arc::new(PlaceholderLocalSearch));
                default_adapters(&self.config, &client, &sink, &extractor, &local)?
            }
        };

        tracing::debug!(
            sources = ?adapters.iter().map(|a| a.source()).collect::<Vec<_>>(),
            "aggregator ready"
        );

        Ok(Aggregator {
            cache: ResultCache::new(self.config.cache_ttl_seconds),
            config: self.config,
            client,
            sink,
            adapters,
        })
    }
}

fn default_adapters(
    config: &SearchConfig,
    client: &Arc<RateLimitedClient>,
    sink: &Arc<CountingSink>,
    extractor: &Arc<dyn ContentExtractor>,
    local: &Arc<dyn LocalSearch>,
) -> Result<Vec<Arc<dyn SourceAdapter>>> {
    let mut adapters: Vec<Arc<dyn SourceAdapter>> = Vec::with_capacity(config.sources.len());

    for &source in &config.sources {
        let client = Arc::clone(client);
        let sink: Arc<dyn FailureSink> = sink.clone();
        let base_url = config.endpoints.for_source(source);
        // Each adapter paces independently.
        let pacer = config.calls_per_second.map(Pacer::new).transpose()?;

        let adapter: Arc<dyn SourceAdapter> = match source {
            Source::PhysRisk => {
                let mut adapter = PhysRiskAdapter::new(client, sink, base_url)
                    .with_result_limit(config.result_limit);
                if let Some(pacer) = pacer {
                    adapter = adapter.with_pacer(pacer);
                }
                Arc::new(adapter)
            }
            Source::Trafilatura => {
                let mut adapter = TrafilaturaAdapter::new(
                    client,
                    sink,
                    base_url,
                    Arc::clone(extractor),
                    Arc::clone(local),
                )
                .with_result_limit(config.result_limit)
                .with_description_max_chars(config.description_max_chars);
                if let Some(pacer) = pacer {
                    adapter = adapter.with_pacer(pacer);
                }
                Arc::new(adapter)
            }
            Source::Watchman => {
                let mut adapter = WatchmanAdapter::new(client, sink, base_url)
                    .with_result_limit(config.result_limit);
                if let Some(pacer) = pacer {
                    adapter = adapter.with_pacer(pacer);
                }
                Arc::new(adapter)
            }
        };
        adapters.push(adapter);
    }

    Ok(adapters)
}

//! Per-aggregator result cache.
//!
//! Stores ranked aggregate results keyed by the normalised query and the
//! set of sources that produced them. Backed by [`moka`] with a TTL;
//! a TTL of zero disables caching entirely.

use std::time::Duration;

use moka::future::Cache;

use crate::types::{SearchResult, Source};

/// Maximum number of cached result sets.
const MAX_CACHE_ENTRIES: u64 = 100;

/// Composite cache key: normalised query + sorted source set.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    query: String,
    sources: Vec<Source>,
}

impl CacheKey {
    /// The query is trimmed and lowercased; source order does not matter.
    pub fn new(query: &str, sources: &[Source]) -> Self {
        let mut sources = sources.to_vec();
        sources.sort();
        sources.dedup();
        Self {
            query: query.trim().to_lowercase(),
            sources,
        }
    }
}

/// TTL-bounded cache of aggregate results.
pub struct ResultCache {
    inner: Option<Cache<CacheKey, Vec<SearchResult>>>,
}

impl ResultCache {
    /// A cache whose entries live for `ttl_seconds`. Zero disables it.
    pub fn new(ttl_seconds: u64) -> Self {
        let inner = (ttl_seconds > 0).then(|| {
            Cache::builder()
                .max_capacity(MAX_CACHE_ENTRIES)
                .time_to_live(Duration::from_secs(ttl_seconds))
                .build()
        });
        Self { inner }
    }

    pub fn is_enabled(&self) -> bool {
        self.inner.is_some()
    }

    pub async fn get(&self, key: &CacheKey) -> Option<Vec<SearchResult>> {
        match &self.inner {
            Some(cache) => cache.get(key).await,
            None => None,
        }
    }

    pub async fn insert(&self, key: CacheKey, results: Vec<SearchResult>) {
        if let Some(cache) = &self.inner {
            cache.insert(key, results).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(title: &str) -> Vec<SearchResult> {
        vec![SearchResult::new(Source::Watchman, title, "cached")]
    }

    #[test]
    fn key_normalises_query() {
        assert_eq!(
            CacheKey::new("  Acme SHIPPING ", &[Source::Watchman]),
            CacheKey::new("acme shipping", &[Source::Watchman])
        );
    }

    #[test]
    fn key_ignores_source_order() {
        assert_eq!(
            CacheKey::new("q", &[Source::Watchman, Source::PhysRisk]),
            CacheKey::new("q", &[Source::PhysRisk, Source::Watchman])
        );
    }

    #[test]
    fn key_differs_by_source_set() {
        assert_ne!(
            CacheKey::new("q", &[Source::PhysRisk]),
            CacheKey::new("q", &[Source::PhysRisk, Source::Trafilatura])
        );
    }

    #[tokio::test]
    async fn zero_ttl_disables_cache() {
        let cache = ResultCache::new(0);
        assert!(!cache.is_enabled());

        let key = CacheKey::new("q", Source::all());
        cache.insert(key.clone(), sample("A")).await;
        assert!(cache.get(&key).await.is_none());
    }

    #[tokio::test]
    async fn insert_then_get() {
        let cache = ResultCache::new(60);
        let key = CacheKey::new("q", Source::all());
        assert!(cache.get(&key).await.is_none());

        cache.insert(key.clone(), sample("A")).await;
        let hit = cache.get(&key).await.expect("cached");
        assert_eq!(hit[0].title, "A");

        cache.insert(key.clone(), sample("B")).await;
        assert_eq!(cache.get(&key).await.expect("cached")[0].title, "B");
    }

    #[tokio::test]
    async fn instances_are_independent() {
        let first = ResultCache::new(60);
        let second = ResultCache::new(60);
        let key = CacheKey::new("q", &[Source::PhysRisk]);

        first.insert(key.clone(), sample("A")).await;
        assert!(second.get(&key).await.is_none());
    }
}

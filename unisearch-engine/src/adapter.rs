//! Trait definition for pluggable source adapters.
//!
//! Each external source (PhysRisk, Trafilatura, Watchman) implements
//! [`SourceAdapter`] to translate its native response into
//! [`SearchResult`] values.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{SearchResult, Source};

/// A pluggable source backend.
///
/// Implementors own:
///
/// - Request construction for their endpoint
/// - Mapping each upstream record into a [`SearchResult`]
/// - Handling of their own expected failures
///
/// The shipped adapters never return `Err`: remote errors and malformed
/// payloads are reported to their failure sink and degrade to an empty
/// list. An `Err` (or a panic) from a custom adapter is treated by the
/// aggregator as an adapter failure and also becomes an empty contribution.
///
/// All implementations must be `Send + Sync`; the aggregator runs each
/// adapter on its own task.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Which source this adapter queries.
    fn source(&self) -> Source;

    /// Search the source for `query`.
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>>;
}

//! Structured failure reporting.
//!
//! Adapters and the aggregator never let source failures escape; instead
//! they hand a [`FailureRecord`] to an injected [`FailureSink`]. The default
//! [`TracingSink`] turns records into `warn` events. [`MemorySink`] keeps
//! them in memory so callers and tests can inspect what went wrong.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use serde::Serialize;

use crate::error::SearchError;
use crate::types::Source;

/// Where a failure was caught.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureStage {
    /// Caught inside the adapter (remote error, malformed payload).
    Adapter,
    /// Caught by the aggregator (adapter error, panic, missed deadline).
    Aggregator,
}

/// One failure that was converted into an empty contribution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureRecord {
    pub source: Source,
    pub stage: FailureStage,
    /// Machine-readable error kind, see [`SearchError::kind`].
    pub kind: &'static str,
    pub message: String,
}

impl FailureRecord {
    pub fn new(source: Source, stage: FailureStage, err: &SearchError) -> Self {
        Self {
            source,
            stage,
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

/// Receiver for failure records.
pub trait FailureSink: Send + Sync {
    fn record(&self, record: FailureRecord);
}

/// Emits each record as a `tracing` warning.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl FailureSink for TracingSink {
    fn record(&self, record: FailureRecord) {
        tracing::warn!(
            source = %record.source,
            stage = ?record.stage,
            kind = record.kind,
            error = %record.message,
            "source query failed"
        );
    }
}

/// Collects records in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<FailureRecord>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far.
    pub fn records(&self) -> Vec<FailureRecord> {
        self.records
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Records for one source only.
    pub fn for_source(&self, source: Source) -> Vec<FailureRecord> {
        self.records()
            .into_iter()
            .filter(|r| r.source == source)
            .collect()
    }
}

impl FailureSink for MemorySink {
    fn record(&self, record: FailureRecord) {
        self.records
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(record);
    }
}

/// Forwards to an inner sink while counting records.
///
/// The aggregator uses the count to tell whether an aggregate search saw
/// any failure before deciding to cache it.
pub struct CountingSink {
    inner: Arc<dyn FailureSink>,
    count: AtomicU64,
}

impl CountingSink {
    pub fn new(inner: Arc<dyn FailureSink>) -> Self {
        Self {
            inner,
            count: AtomicU64::new(0),
        }
    }

    /// Total records forwarded since construction.
    pub fn count(&self) -> u64 {
        self.count.load(Ordering::SeqCst)
    }
}

impl FailureSink for CountingSink {
    fn record(&self, record: FailureRecord) {
        self.count.fetch_add(1, Ordering::SeqCst);
        self.inner.record(record);
    }
}

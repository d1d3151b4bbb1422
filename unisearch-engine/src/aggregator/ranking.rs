//! Composite, source-aware ranking.
//!
//! Results are ordered by a [`RankKey`], compared descending:
//!
//! | Priority | Field         | Applies to  | Neutral value |
//! |----------|---------------|-------------|---------------|
//! | 1        | `relevance`   | all sources | `0.0`         |
//! | 2        | entity count  | Watchman    | `0`           |
//! | 3        | `word_count`  | Trafilatura | `0`           |
//!
//! The sort is stable: results with equal keys keep their input order,
//! which is the configured adapter order.

use std::cmp::Ordering;

use serde_json::Value;

use crate::types::{SearchResult, Source};

/// The fields a result is ranked by. Anything missing or malformed
/// resolves to the neutral value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankKey {
    pub relevance: f64,
    pub entities: usize,
    pub word_count: u64,
}

impl RankKey {
    pub fn for_result(result: &SearchResult) -> Self {
        let relevance = if result.relevance.is_nan() {
            0.0
        } else {
            result.relevance
        };

        let entities = match result.source() {
            Source::Watchman => result
                .meta("entities")
                .and_then(Value::as_array)
                .map_or(0, Vec::len),
            _ => 0,
        };

        let word_count = match result.source() {
            Source::Trafilatura => result.meta("word_count").map_or(0, word_count_value),
            _ => 0,
        };

        Self {
            relevance,
            entities,
            word_count,
        }
    }
}

impl Eq for RankKey {}

impl PartialOrd for RankKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RankKey {
    fn cmp(&self, other: &Self) -> Ordering {
        // NaN is excluded in `for_result`; treat it as equal if a key was
        // built by hand.
        self.relevance
            .partial_cmp(&other.relevance)
            .unwrap_or(Ordering::Equal)
            // Higher key ranks first, so more entities win a relevance tie.
            .then(self.entities.cmp(&other.entities))
            .then(self.word_count.cmp(&other.word_count))
    }
}

fn word_count_value(value: &Value) -> u64 {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite() && *f > 0.0).map(|f| f as u64))
            .unwrap_or(0),
        Value::String(s) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

/// Order results best-first. Deterministic for a given input.
pub fn rank(results: Vec<SearchResult>) -> Vec<SearchResult> {
    let mut keyed: Vec<(RankKey, SearchResult)> = results
        .into_iter()
        .map(|r| (RankKey::for_result(&r), r))
        .collect();
    keyed.sort_by(|a, b| b.0.cmp(&a.0));
    keyed.into_iter().map(|(_, r)| r).collect()
}

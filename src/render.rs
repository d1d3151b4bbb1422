//! Terminal and JSON rendering of aggregate results.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use unisearch_engine::{RateLimitSnapshot, SearchResult, Source};

use crate::error::{AppError, Result};

/// Characters of description shown per result in text output.
pub const PREVIEW_CHARS: usize = 200;

/// Human-readable listing: one block per result, then the rate-limit table.
pub fn render_text(
    results: &[SearchResult],
    rate_limits: &BTreeMap<Source, Option<RateLimitSnapshot>>,
) -> String {
    let mut out = String::new();

    if results.is_empty() {
        out.push_str("No results.\n");
    }
    for (index, result) in results.iter().enumerate() {
        let _ = writeln!(out, "{}. [{}] {}", index + 1, result.source(), result.title);
        if !result.description.is_empty() {
            let _ = writeln!(out, "   {}", preview(&result.description, PREVIEW_CHARS));
        }
        if let Some(url) = &result.url {
            let _ = writeln!(out, "   {url}");
        }
        let _ = writeln!(out, "   relevance: {:.2}", result.relevance);
    }

    let reported: Vec<_> = rate_limits
        .iter()
        .filter_map(|(source, snapshot)| snapshot.map(|s| (source, s)))
        .collect();
    if !reported.is_empty() {
        out.push_str("\nRate limits:\n");
        for (source, snapshot) in reported {
            let _ = writeln!(out, "  {}", rate_limit_line(*source, &snapshot));
        }
    }

    out
}

/// `service: remaining/limit (resets in Ns)`.
pub fn rate_limit_line(source: Source, snapshot: &RateLimitSnapshot) -> String {
    format!(
        "{source}: {}/{} (resets in {}s)",
        snapshot.remaining, snapshot.limit, snapshot.reset
    )
}

/// Results as a pretty-printed JSON array.
///
/// # Errors
///
/// Returns [`AppError::Render`] if serialisation fails.
pub fn render_json(results: &[SearchResult]) -> Result<String> {
    serde_json::to_string_pretty(results).map_err(|e| AppError::Render(e.to_string()))
}

/// First `max_chars` characters of `text` on one line, with an ellipsis
/// when something was cut.
pub fn preview(text: &str, max_chars: usize) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    match flat.char_indices().nth(max_chars) {
        Some((end, _)) => format!("{}...", &flat[..end]),
        None => flat,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn snapshot(limit: u64, remaining: u64, reset: u64) -> RateLimitSnapshot {
        RateLimitSnapshot {
            limit,
            remaining,
            reset,
        }
    }

    #[test]
    fn preview_keeps_short_text() {
        assert_eq!(preview("short  text\nhere", 200), "short text here");
    }

    #[test]
    fn preview_cuts_on_char_boundary() {
        let text = "ü".repeat(250);
        let shown = preview(&text, 200);
        assert!(shown.ends_with("..."));
        assert_eq!(shown.trim_end_matches("...").chars().count(), 200);
    }

    #[test]
    fn text_output_lists_results_and_limits() {
        let results = vec![
            SearchResult::new(Source::Watchman, "Acme Shipping", "Sanctions evasion")
                .with_url(Some("https://watchman.example/s/1".into()))
                .with_relevance(0.9),
            SearchResult::new(Source::PhysRisk, "Flood risk", ""),
        ];
        let mut limits = BTreeMap::new();
        limits.insert(Source::Watchman, Some(snapshot(100, 42, 30)));
        limits.insert(Source::PhysRisk, None);

        let out = render_text(&results, &limits);
        assert!(out.contains("1. [watchman] Acme Shipping"));
        assert!(out.contains("   Sanctions evasion"));
        assert!(out.contains("   https://watchman.example/s/1"));
        assert!(out.contains("relevance: 0.90"));
        assert!(out.contains("2. [physrisk] Flood risk"));
        assert!(out.contains("watchman: 42/100 (resets in 30s)"));
        assert!(!out.contains("physrisk: "));
    }

    #[test]
    fn empty_results_say_so() {
        let out = render_text(&[], &BTreeMap::new());
        assert_eq!(out, "No results.\n");
    }

    #[test]
    fn json_output_includes_source_and_metadata() {
        let results = vec![SearchResult::new(Source::Trafilatura, "Story", "Body")
            .with_meta("word_count", 1)];
        let out = render_json(&results).expect("json");
        let parsed: serde_json::Value = serde_json::from_str(&out).expect("parse");
        assert_eq!(parsed[0]["source"], json!("trafilatura"));
        assert_eq!(parsed[0]["metadata"]["word_count"], json!(1));
    }
}

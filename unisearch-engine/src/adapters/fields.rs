//! Tolerant field access for upstream JSON records.
//!
//! Sources omit fields, send numbers as strings and occasionally send the
//! wrong type altogether. These helpers resolve every such case to a
//! neutral default instead of dropping the record.

use serde_json::Value;

use crate::error::{Result, SearchError};

/// The array of records under `key`. A missing key (or a payload that is
/// not an object) is an empty list; a key holding a non-array is a
/// malformed payload.
pub(crate) fn records<'a>(payload: &'a Value, key: &str) -> Result<&'a [Value]> {
    match payload.get(key) {
        None | Some(Value::Null) => Ok(&[]),
        Some(Value::Array(items)) => Ok(items),
        Some(other) => Err(SearchError::Parse(format!(
            "malformed payload: `{key}` should be an array, got {}",
            type_name(other)
        ))),
    }
}

/// A string field, or `None` when absent or not a string.
pub(crate) fn string(item: &Value, key: &str) -> Option<String> {
    item.get(key).and_then(Value::as_str).map(str::to_owned)
}

/// A non-blank string field, or `default`.
pub(crate) fn string_or(item: &Value, key: &str, default: &str) -> String {
    string(item, key)
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| default.to_owned())
}

/// A field copied verbatim into metadata; `null` when absent.
pub(crate) fn passthrough(item: &Value, key: &str) -> Value {
    item.get(key).cloned().unwrap_or(Value::Null)
}

/// `relevance_score` as a finite float. Accepts numbers and numeric
/// strings; anything else is `0.0`.
pub(crate) fn relevance(item: &Value) -> f64 {
    let score = match item.get("relevance_score") {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    score.filter(|s| s.is_finite()).unwrap_or(0.0)
}

/// The record's `date`, or the current UTC time in RFC 3339.
pub(crate) fn date_or_now(item: &Value) -> Value {
    match item.get("date") {
        Some(Value::String(s)) if !s.is_empty() => Value::String(s.clone()),
        _ => Value::String(chrono::Utc::now().to_rfc3339()),
    }
}

/// An array field, or an empty array.
pub(crate) fn array_or_empty(item: &Value, key: &str) -> Value {
    match item.get(key) {
        Some(Value::Array(items)) => Value::Array(items.clone()),
        _ => Value::Array(Vec::new()),
    }
}

/// First `max_chars` characters of `text`.
pub(crate) fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => text[..end].to_owned(),
        None => text.to_owned(),
    }
}

pub(crate) fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn records_handles_missing_and_wrong_types() {
        assert!(records(&json!({}), "results").expect("missing").is_empty());
        assert!(records(&json!({"results": null}), "results")
            .expect("null")
            .is_empty());
        assert!(records(&json!([1, 2]), "results").expect("not an object").is_empty());
        assert_eq!(
            records(&json!({"results": [1, 2]}), "results")
                .expect("array")
                .len(),
            2
        );
        let err = records(&json!({"results": "nope"}), "results").expect_err("string");
        assert!(err.to_string().contains("should be an array, got string"));
    }

    #[test]
    fn string_or_defaults_blank_values() {
        let item = json!({"title": "  ", "name": 42, "ok": "Value"});
        assert_eq!(string_or(&item, "title", "Default"), "Default");
        assert_eq!(string_or(&item, "name", "Default"), "Default");
        assert_eq!(string_or(&item, "missing", "Default"), "Default");
        assert_eq!(string_or(&item, "ok", "Default"), "Value");
    }

    #[test]
    fn relevance_parses_numbers_and_strings() {
        assert!((relevance(&json!({"relevance_score": 0.42})) - 0.42).abs() < f64::EPSILON);
        assert!((relevance(&json!({"relevance_score": "0.7"})) - 0.7).abs() < f64::EPSILON);
        assert!((relevance(&json!({"relevance_score": 1})) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn relevance_defaults_to_zero() {
        for item in [
            json!({}),
            json!({"relevance_score": null}),
            json!({"relevance_score": "high"}),
            json!({"relevance_score": "NaN"}),
            json!({"relevance_score": [0.5]}),
        ] {
            assert!(relevance(&item).abs() < f64::EPSILON, "{item} should be 0.0");
        }
    }

    #[test]
    fn date_or_now_prefers_record_date() {
        assert_eq!(
            date_or_now(&json!({"date": "2024-01-02"})),
            json!("2024-01-02")
        );
        let now = date_or_now(&json!({}));
        let parsed = chrono::DateTime::parse_from_rfc3339(now.as_str().expect("string"));
        assert!(parsed.is_ok());
    }

    #[test]
    fn array_or_empty_rejects_non_arrays() {
        assert_eq!(array_or_empty(&json!({"e": ["a"]}), "e"), json!(["a"]));
        assert_eq!(array_or_empty(&json!({"e": "a"}), "e"), json!([]));
        assert_eq!(array_or_empty(&json!({}), "e"), json!([]));
    }

    #[test]
    fn passthrough_uses_null_for_missing() {
        assert_eq!(passthrough(&json!({"a": {"b": 1}}), "a"), json!({"b": 1}));
        assert_eq!(passthrough(&json!({}), "a"), Value::Null);
    }

    #[test]
    fn truncate_chars_counts_characters_not_bytes() {
        assert_eq!(truncate_chars("héllo wörld", 5), "héllo");
        assert_eq!(truncate_chars("short", 500), "short");
        assert_eq!(truncate_chars("", 3), "");
        assert_eq!(truncate_chars("abc", 3), "abc");
    }

    #[test]
    fn word_count_splits_on_whitespace() {
        assert_eq!(word_count("one  two\nthree"), 3);
        assert_eq!(word_count("   "), 0);
    }
}

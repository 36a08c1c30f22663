//! Execution helpers
//!
//! Parameter merging, wire rendering of dynamic values, response previews
//! and timing for a single proxy execution.

use std::time::Duration;

use serde_json::Value;
use uuid::Uuid;

use crate::domain::errors::ProxyError;
use crate::domain::value_objects::JsonMap;

/// Fixed upper bound on a single upstream call
pub const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(30);

/// Characters of the upstream body kept in a log entry
pub const RESPONSE_PREVIEW_CHARS: usize = 1000;

/// Error recorded for an upstream timeout
pub const TIMEOUT_ERROR: &str = "Request timeout";

/// Parse a path segment into a Definition id
pub fn parse_api_id(raw: &str) -> Result<Uuid, ProxyError> {
    Uuid::parse_str(raw.trim()).map_err(|_| ProxyError::InvalidIdentifier)
}

/// Collapse raw query pairs into a map, keeping the first value per key
pub fn caller_params<I>(pairs: I) -> JsonMap
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut params = JsonMap::new();
    for (key, value) in pairs {
        params.entry(key).or_insert(Value::String(value));
    }
    params
}

/// Overlay caller params on stored defaults; caller values win
pub fn merge_params(defaults: &JsonMap, overrides: JsonMap) -> JsonMap {
    let mut merged = defaults.clone();
    merged.extend(overrides);
    merged
}

/// Render params as query pairs.
///
/// Nulls are skipped and arrays repeat the key once per element.
pub fn query_pairs(params: &JsonMap) -> Vec<(String, String)> {
    let mut pairs = Vec::with_capacity(params.len());
    for (key, value) in params {
        match value {
            Value::Array(items) => {
                pairs.extend(
                    items
                        .iter()
                        .filter_map(scalar_text)
                        .map(|text| (key.clone(), text)),
                );
            }
            other => {
                if let Some(text) = scalar_text(other) {
                    pairs.push((key.clone(), text));
                }
            }
        }
    }
    pairs
}

/// Render a stored header value; `None` for null
pub fn render_header_value(value: &Value) -> Option<String> {
    scalar_text(value)
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        nested => Some(nested.to_string()),
    }
}

/// Whether a Content-Type header value declares JSON
pub fn is_json_content_type(content_type: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    mime == "application/json" || (mime.starts_with("application/") && mime.ends_with("+json"))
}

/// First `max` characters of `text`
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

/// Milliseconds rounded to 2 decimal places
pub fn round_ms(ms: f64) -> f64 {
    (ms * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(value: Value) -> JsonMap {
        match value {
            Value::Object(m) => m,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_caller_wins_on_collision() {
        let defaults = map(json!({"a": 1, "b": 2}));
        let caller = caller_params(vec![
            ("b".to_string(), "3".to_string()),
            ("c".to_string(), "4".to_string()),
        ]);

        let merged = merge_params(&defaults, caller);

        assert_eq!(merged.len(), 3);
        assert_eq!(merged["a"], json!(1));
        assert_eq!(merged["b"], json!("3"));
        assert_eq!(merged["c"], json!("4"));

        let mut pairs = query_pairs(&merged);
        pairs.sort();
        assert_eq!(
            pairs,
            vec![
                ("a".to_string(), "1".to_string()),
                ("b".to_string(), "3".to_string()),
                ("c".to_string(), "4".to_string()),
            ]
        );
    }

    #[test]
    fn test_merge_is_idempotent() {
        let defaults = map(json!({"a": 1, "b": 2}));
        let caller = map(json!({"b": "3", "c": "4"}));

        let once = merge_params(&defaults, caller.clone());
        let twice = merge_params(&once, caller);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_caller_params_keep_first_value() {
        let params = caller_params(vec![
            ("q".to_string(), "first".to_string()),
            ("q".to_string(), "second".to_string()),
        ]);
        assert_eq!(params["q"], json!("first"));
    }

    #[test]
    fn test_query_pairs_rendering() {
        let params = map(json!({
            "skip": null,
            "flag": true,
            "tags": ["x", "y"],
            "filter": {"k": "v"}
        }));
        let mut pairs = query_pairs(&params);
        pairs.sort();
        assert_eq!(
            pairs,
            vec![
                ("filter".to_string(), r#"{"k":"v"}"#.to_string()),
                ("flag".to_string(), "true".to_string()),
                ("tags".to_string(), "x".to_string()),
                ("tags".to_string(), "y".to_string()),
            ]
        );
    }

    #[test]
    fn test_json_content_type_detection() {
        assert!(is_json_content_type("application/json"));
        assert!(is_json_content_type("application/json; charset=utf-8"));
        assert!(is_json_content_type("Application/JSON"));
        assert!(is_json_content_type("application/problem+json"));
        assert!(!is_json_content_type("text/plain"));
        assert!(!is_json_content_type("application/x-www-form-urlencoded"));
        assert!(!is_json_content_type(""));
    }

    #[test]
    fn test_truncate_exactly_1000_chars() {
        let body = "a".repeat(5000);
        assert_eq!(truncate_chars(&body, RESPONSE_PREVIEW_CHARS).len(), 1000);

        let short = "short body";
        assert_eq!(truncate_chars(short, RESPONSE_PREVIEW_CHARS), short);
    }

    #[test]
    fn test_truncate_counts_characters_not_bytes() {
        let body = "\u{3042}".repeat(1200);
        let truncated = truncate_chars(&body, RESPONSE_PREVIEW_CHARS);
        assert_eq!(truncated.chars().count(), 1000);
    }

    #[test]
    fn test_round_ms() {
        assert_eq!(round_ms(12.3456), 12.35);
        assert_eq!(round_ms(0.001), 0.0);
    }

    #[test]
    fn test_parse_api_id() {
        let id = Uuid::new_v4();
        assert_eq!(parse_api_id(&id.to_string()).unwrap(), id);
        assert!(matches!(
            parse_api_id("not-an-id"),
            Err(ProxyError::InvalidIdentifier)
        ));
        assert!(matches!(
            parse_api_id("507f1f77bcf86cd799439011"),
            Err(ProxyError::InvalidIdentifier)
        ));
    }
}

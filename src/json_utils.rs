//! Strict handling of completion payloads.
//!
//! Models like to wrap JSON in a Markdown fence; that wrapper is the only
//! thing removed. The remainder must be one JSON array, nothing before or
//! after it.

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, instrument};

/// Trim the payload and drop a surrounding ```` ```json ```` / ```` ``` ```` fence.
pub fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string ("json", "JSON", ...) on the opening line
    let body = match rest.find('\n') {
        Some(newline) if rest[..newline].chars().all(|c| c.is_ascii_alphanumeric()) => &rest[newline + 1..],
        _ => rest,
    };
    body.strip_suffix("```").unwrap_or(body).trim()
}

/// Why a payload could not be read as an array of `T`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArrayParseError {
    Empty,
    NotJson(String),
    NotAnArray(&'static str),
    Schema(String),
}

impl std::fmt::Display for ArrayParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "response is empty"),
            Self::NotJson(e) => write!(f, "response is not valid JSON: {}", e),
            Self::NotAnArray(kind) => write!(f, "response is a JSON {}, expected an array", kind),
            Self::Schema(e) => write!(f, "response does not match the question schema: {}", e),
        }
    }
}

impl std::error::Error for ArrayParseError {}

/// Parse the whole (fence-stripped) payload as `Vec<T>`.
#[instrument(target = "kidsquiz::json", skip(raw), fields(raw_len = raw.len()))]
pub fn parse_json_array<T: DeserializeOwned>(raw: &str) -> Result<Vec<T>, ArrayParseError> {
    let cleaned = strip_code_fence(raw);
    if cleaned.is_empty() {
        return Err(ArrayParseError::Empty);
    }

    let value: Value = serde_json::from_str(cleaned).map_err(|e| ArrayParseError::NotJson(e.to_string()))?;
    let kind = match &value {
        Value::Array(_) => None,
        Value::Object(_) => Some("object"),
        Value::String(_) => Some("string"),
        Value::Number(_) => Some("number"),
        Value::Bool(_) => Some("boolean"),
        Value::Null => Some("null"),
    };
    if let Some(kind) = kind {
        return Err(ArrayParseError::NotAnArray(kind));
    }

    let items: Vec<T> = serde_json::from_value(value).map_err(|e| ArrayParseError::Schema(e.to_string()))?;
    debug!(target: "kidsquiz::json", items = items.len(), "parsed JSON array");
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    #[serde(deny_unknown_fields)]
    struct Item {
        x: i32,
    }

    #[test]
    fn strips_json_fence() {
        assert_eq!(strip_code_fence("```json\n[1,2]\n```"), "[1,2]");
        assert_eq!(strip_code_fence("  ```\n[1]\n```  "), "[1]");
        assert_eq!(strip_code_fence("[3]"), "[3]");
    }

    #[test]
    fn parses_plain_and_fenced_arrays() {
        let v: Vec<Item> = parse_json_array(r#"[{"x":1},{"x":2}]"#).unwrap();
        assert_eq!(v, vec![Item { x: 1 }, Item { x: 2 }]);

        let v: Vec<Item> = parse_json_array("```json\n[{\"x\":7}]\n```").unwrap();
        assert_eq!(v, vec![Item { x: 7 }]);
    }

    #[test]
    fn rejects_prose_around_json() {
        let err = parse_json_array::<Item>(r#"Here you go: [{"x":1}]"#).unwrap_err();
        assert!(matches!(err, ArrayParseError::NotJson(_)));
    }

    #[test]
    fn rejects_non_arrays_and_schema_drift() {
        assert_eq!(
            parse_json_array::<Item>(r#"{"x":1}"#).unwrap_err(),
            ArrayParseError::NotAnArray("object")
        );
        assert!(matches!(
            parse_json_array::<Item>(r#"[{"x":1,"y":2}]"#).unwrap_err(),
            ArrayParseError::Schema(_)
        ));
        assert_eq!(parse_json_array::<Item>("   ").unwrap_err(), ArrayParseError::Empty);
    }
}

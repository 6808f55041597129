//! Helpers for navigating and shaping `serde_json::Value` record trees
//!
//! Records are handled as untyped value trees throughout the pipeline;
//! these helpers give dotted-path access with the crate's missing-field
//! policy: `require*` for fields whose absence is fatal, `get*` for fields
//! whose absence degrades.

use crate::error::{Error, Result};
use serde_json::{Map, Value};

/// Look up a dotted path (`metadata.dates.revision`) in a value tree.
pub fn get_path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = value;
    for segment in path.split('.') {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

/// Look up a dotted path and return it as a non-empty string.
pub fn get_str<'a>(value: &'a Value, path: &str) -> Option<&'a str> {
    get_path(value, path)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

/// Look up a dotted path, failing with `MissingField` when absent.
pub fn require<'a>(value: &'a Value, path: &str) -> Result<&'a Value> {
    get_path(value, path).ok_or_else(|| Error::missing_field(path))
}

/// Look up a dotted path as a non-empty string, failing when absent.
pub fn require_str<'a>(value: &'a Value, path: &str) -> Result<&'a str> {
    get_str(value, path).ok_or_else(|| Error::missing_field(path))
}

/// Select a language entry from a language-keyed map at `path`.
pub fn lang_str<'a>(value: &'a Value, path: &str, language: &str) -> Option<&'a str> {
    get_path(value, path)?
        .as_object()?
        .get(language)?
        .as_str()
        .filter(|s| !s.is_empty())
}

/// Select a language entry, failing with the full `path.language` when absent.
pub fn require_lang_str<'a>(value: &'a Value, path: &str, language: &str) -> Result<&'a str> {
    lang_str(value, path, language)
        .ok_or_else(|| Error::missing_field(format!("{path}.{language}")))
}

/// Read a value that may be either a bare string or a language-keyed map.
pub fn string_or_lang<'a>(value: &'a Value, language: &str) -> Option<&'a str> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s),
        Value::Object(map) => map
            .get(language)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty()),
        _ => None,
    }
}

/// True for `null`, empty strings, empty arrays, and empty objects.
pub fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
        _ => false,
    }
}

/// Remove empty values from a target mapping before serialization.
pub fn drop_empty_values(map: &mut Map<String, Value>) {
    map.retain(|_, value| !is_empty_value(value));
}

/// Insert `value` only when it is non-empty.
pub fn insert_non_empty(map: &mut Map<String, Value>, key: &str, value: Value) {
    if !is_empty_value(&value) {
        map.insert(key.to_string(), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_get_path() {
        let record = json!({"metadata": {"dates": {"revision": "2023-01-01"}}});
        assert_eq!(
            get_path(&record, "metadata.dates.revision"),
            Some(&json!("2023-01-01"))
        );
        assert_eq!(get_path(&record, "metadata.dates.creation"), None);
        assert_eq!(get_path(&record, "identification.title"), None);
    }

    #[test]
    fn test_require_reports_full_path() {
        let record = json!({"metadata": {}});
        let err = require(&record, "metadata.identifier").unwrap_err();
        assert!(err.to_string().contains("metadata.identifier"));
    }

    #[test]
    fn test_lang_selection() {
        let record = json!({"identification": {"title": {"en": "Title", "fr": "Titre"}}});
        assert_eq!(lang_str(&record, "identification.title", "fr"), Some("Titre"));
        assert_eq!(lang_str(&record, "identification.title", "de"), None);

        let err = require_lang_str(&record, "identification.title", "de").unwrap_err();
        assert!(err.to_string().contains("identification.title.de"));
    }

    #[test]
    fn test_string_or_lang() {
        assert_eq!(string_or_lang(&json!("plain"), "en"), Some("plain"));
        assert_eq!(string_or_lang(&json!({"en": "mapped"}), "en"), Some("mapped"));
        assert_eq!(string_or_lang(&json!({"fr": "seul"}), "en"), None);
        assert_eq!(string_or_lang(&json!(42), "en"), None);
    }

    #[test]
    fn test_drop_empty_values() {
        let mut map = json!({
            "keep": "x",
            "zero": 0,
            "none": null,
            "empty": "",
            "empty_list": [],
            "empty_map": {},
        })
        .as_object()
        .unwrap()
        .clone();
        drop_empty_values(&mut map);
        let keys: Vec<&str> = map.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["keep", "zero"]);
    }
}

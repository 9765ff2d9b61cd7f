//! JSON settings flattening

use serde_json::Value;

use super::KEY_DELIMITER;
use crate::error::ConfigError;

/// Flatten a JSON settings document into `(path, value)` pairs
///
/// Objects nest by key, arrays by index. `null` leaves the path unset.
pub(crate) fn flatten(source_name: &str, content: &str) -> Result<Vec<(String, String)>, ConfigError> {
    let root: Value = serde_json::from_str(content)
        .map_err(|e| ConfigError::parse(source_name, e.to_string()))?;

    let Value::Object(map) = root else {
        return Err(ConfigError::InvalidRoot {
            source_name: source_name.to_string(),
        });
    };

    let mut entries = Vec::new();
    for (key, value) in map {
        visit(key, value, &mut entries);
    }
    Ok(entries)
}

fn visit(path: String, value: Value, entries: &mut Vec<(String, String)>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                visit(format!("{}{}{}", path, KEY_DELIMITER, key), child, entries);
            }
        }
        Value::Array(items) => {
            for (index, child) in items.into_iter().enumerate() {
                visit(format!("{}{}{}", path, KEY_DELIMITER, index), child, entries);
            }
        }
        Value::Null => {}
        Value::String(s) => entries.push((path, s)),
        Value::Bool(true) => entries.push((path, "True".to_string())),
        Value::Bool(false) => entries.push((path, "False".to_string())),
        // Source text, kept as written through `arbitrary_precision`
        Value::Number(n) => entries.push((path, n.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup<'a>(entries: &'a [(String, String)], key: &str) -> Option<&'a str> {
        entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_nested_objects() {
        let entries = flatten(
            "test",
            r#"{"AppConfiguration": {"SecretValue": "s3cr3t", "Nested": {"Deep": "d"}}}"#,
        )
        .unwrap();

        assert_eq!(lookup(&entries, "AppConfiguration:SecretValue"), Some("s3cr3t"));
        assert_eq!(lookup(&entries, "AppConfiguration:Nested:Deep"), Some("d"));
    }

    #[test]
    fn test_arrays_and_scalars() {
        let entries = flatten(
            "test",
            r#"{"Hosts": ["a", "b"], "Enabled": true, "Legacy": false, "Port": 5432, "Ratio": 0.5}"#,
        )
        .unwrap();

        assert_eq!(lookup(&entries, "Hosts:0"), Some("a"));
        assert_eq!(lookup(&entries, "Hosts:1"), Some("b"));
        assert_eq!(lookup(&entries, "Enabled"), Some("True"));
        assert_eq!(lookup(&entries, "Legacy"), Some("False"));
        assert_eq!(lookup(&entries, "Port"), Some("5432"));
        assert_eq!(lookup(&entries, "Ratio"), Some("0.5"));
    }

    #[test]
    fn test_numbers_keep_source_text() {
        let entries = flatten(
            "test",
            r#"{"App": {"Version": 1.10, "Big": 12345678901234567890123, "Exp": 1E3, "Neg": -0.0}}"#,
        )
        .unwrap();

        assert_eq!(lookup(&entries, "App:Version"), Some("1.10"));
        assert_eq!(lookup(&entries, "App:Big"), Some("12345678901234567890123"));
        assert_eq!(lookup(&entries, "App:Exp"), Some("1E3"));
        assert_eq!(lookup(&entries, "App:Neg"), Some("-0.0"));
    }

    #[test]
    fn test_null_is_absent_and_empty_is_kept() {
        let entries = flatten("test", r#"{"Unset": null, "Empty": ""}"#).unwrap();
        assert_eq!(lookup(&entries, "Unset"), None);
        assert_eq!(lookup(&entries, "Empty"), Some(""));
    }

    #[test]
    fn test_root_must_be_object() {
        let result = flatten("test", r#"["not", "an", "object"]"#);
        assert!(matches!(result, Err(ConfigError::InvalidRoot { .. })));
    }

    #[test]
    fn test_invalid_json() {
        let result = flatten("test", "{");
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }
}

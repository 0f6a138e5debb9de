//! Utility functions for the templating system.

use serde_json::Value;

use super::context::ContextMap;

/// Perform a deep merge of two JSON values.
///
/// Recursively merges `overrides` into `base`. For objects, fields from `overrides`
/// are added or replace fields in `base`. For arrays and primitives, `overrides`
/// completely replaces `base`.
///
/// # Examples
///
/// ```rust
/// use serde_json::json;
/// use cotton::templating::deep_merge_json;
///
/// let base = json!({ "site": { "name": "docs", "theme": "light" } });
/// let overrides = json!({ "site": { "theme": "dark", "lang": "en" } });
///
/// let result = deep_merge_json(base, &overrides);
/// assert_eq!(result, json!({ "site": { "name": "docs", "theme": "dark", "lang": "en" } }));
/// ```
pub fn deep_merge_json(mut base: Value, overrides: &Value) -> Value {
    match (base.as_object_mut(), overrides.as_object()) {
        (Some(base_obj), Some(override_obj)) => {
            for (key, override_value) in override_obj {
                match base_obj.get_mut(key) {
                    Some(base_value) if base_value.is_object() && override_value.is_object() => {
                        let merged = deep_merge_json(base_value.take(), override_value);
                        *base_value = merged;
                    }
                    _ => {
                        base_obj.insert(key.clone(), override_value.clone());
                    }
                }
            }
            base
        }
        (_, _) => overrides.clone(),
    }
}

/// Text of an attribute value as it appears in the `attrs` string.
///
/// Strings are used verbatim, `null` is empty and everything else uses its
/// JSON text (`true`, `42`, `["a","b"]`).
pub fn attr_value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Quote a value for use in an HTML attribute list.
///
/// Values already wrapped in double quotes are returned unchanged. Values
/// containing a double quote (but no single quote) are wrapped in single
/// quotes; anything else is wrapped in double quotes.
///
/// ```
/// use cotton::templating::ensure_quoted;
///
/// assert_eq!(ensure_quoted("btn"), "\"btn\"");
/// assert_eq!(ensure_quoted("\"btn\""), "\"btn\"");
/// assert_eq!(ensure_quoted(r#"{"a":1}"#), r#"'{"a":1}'"#);
/// ```
pub fn ensure_quoted(value: &str) -> String {
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        value.to_string()
    } else if value.contains('"') && !value.contains('\'') {
        format!("'{value}'")
    } else {
        format!("\"{value}\"")
    }
}

/// Serialize attributes as space separated `key="value"` pairs.
pub fn format_attrs(attrs: &ContextMap) -> String {
    attrs
        .iter()
        .map(|(key, value)| format!("{}={}", key, ensure_quoted(&attr_value_text(value))))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Name under which an attribute is exposed as a template variable.
///
/// `x-init` becomes `x_init` so that it is addressable as `{{ x_init }}`.
pub fn context_var_name(attr: &str) -> String {
    attr.replace('-', "_")
}

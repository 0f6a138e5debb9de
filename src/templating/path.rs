//! Component template path resolution.
//!
//! Maps a component identifier to the template that implements it:
//! `widgets.icon-button` → `<cotton_dir>/widgets/icon_button.html`. The
//! `component` sentinel takes its identifier from the resolved `is`
//! attribute instead.

use serde_json::Value;

use super::context::{ContextMap, value_kind};
use super::error::TemplateError;
use crate::constants::{COMPONENT_TEMPLATE_EXTENSION, DYNAMIC_COMPONENT_PATH, DYNAMIC_TARGET_ATTR};

/// Normalize a component identifier: `.` → `/`, `-` → `_`.
pub fn normalize_component_path(identifier: &str) -> String {
    identifier.replace('.', "/").replace('-', "_")
}

/// Resolve the template path of a component invocation.
///
/// `attrs` are the fully resolved attributes, so `is` may have come from a
/// dynamic expression or an interpolated slot.
///
/// # Errors
///
/// - [`TemplateError::MissingDynamicTarget`] when the path is the
///   `component` sentinel and there is no `is` attribute
/// - [`TemplateError::InvalidComponentPath`] when the identifier is not a
///   string or number, or normalizes to an unsafe path
///
/// # Examples
///
/// ```
/// use cotton::templating::{ContextMap, component_template_path};
/// use serde_json::json;
///
/// let attrs: ContextMap = serde_json::from_value(json!({"is": "widgets.button"})).unwrap();
/// assert_eq!(
///     component_template_path("component", "c_0", &attrs, "cotton").unwrap(),
///     "cotton/widgets/button.html"
/// );
/// assert_eq!(
///     component_template_path("my-thing", "c_1", &ContextMap::new(), "cotton").unwrap(),
///     "cotton/my_thing.html"
/// );
/// ```
pub fn component_template_path(
    declared_path: &str,
    component_key: &str,
    attrs: &ContextMap,
    cotton_dir: &str,
) -> Result<String, TemplateError> {
    let identifier = if declared_path == DYNAMIC_COMPONENT_PATH {
        match attrs.get(DYNAMIC_TARGET_ATTR) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            Some(other) => {
                return Err(TemplateError::InvalidComponentPath {
                    path: other.to_string(),
                    reason: format!("\"is\" must be a string, got {}", value_kind(other)),
                });
            }
            None => {
                return Err(TemplateError::MissingDynamicTarget {
                    key: component_key.to_string(),
                });
            }
        }
    } else {
        declared_path.to_string()
    };

    let normalized = normalize_component_path(identifier.trim());
    validate_component_path(&identifier, &normalized)?;

    let base = cotton_dir.trim_end_matches('/');
    if base.is_empty() {
        Ok(format!("{normalized}.{COMPONENT_TEMPLATE_EXTENSION}"))
    } else {
        Ok(format!("{base}/{normalized}.{COMPONENT_TEMPLATE_EXTENSION}"))
    }
}

/// Reject normalized identifiers that could address a template outside the
/// component directory.
///
/// `..` can never survive normalization (dots become separators), so a
/// traversal attempt shows up as an empty segment.
fn validate_component_path(identifier: &str, normalized: &str) -> Result<(), TemplateError> {
    let reject = |reason: &str| -> Result<(), TemplateError> {
        Err(TemplateError::InvalidComponentPath {
            path: identifier.to_string(),
            reason: reason.to_string(),
        })
    };

    if normalized.is_empty() {
        return reject("component path is empty");
    }
    if normalized.starts_with('/') {
        return reject("absolute component paths are not allowed");
    }
    if normalized.split('/').any(str::is_empty) {
        return reject("component path contains an empty segment");
    }
    if normalized.contains('\\') || normalized.contains(':') {
        return reject("component path contains a path separator or drive marker");
    }
    if normalized.chars().any(char::is_control) {
        return reject("component path contains control characters");
    }
    Ok(())
}

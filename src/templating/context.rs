//! Render context handling.
//!
//! A render context is an ordered JSON object. Component nodes copy it,
//! add their own entries (`slot`, `attrs`, one entry per attribute) and pass
//! the copy to the component template, so the caller's context is never
//! mutated by a nested render.

use serde::Serialize;
use serde_json::{Map, Value};
use tera::Context as TeraContext;

use super::error::TemplateError;

/// Ordered mapping of context variable names to values.
pub type ContextMap = Map<String, Value>;

/// Convert any serializable value into a context mapping.
///
/// # Errors
///
/// Returns [`TemplateError::InvalidContext`] if the value does not serialize
/// to a JSON object.
pub fn context_from_serialize<T: Serialize + ?Sized>(value: &T) -> Result<ContextMap, TemplateError> {
    match serde_json::to_value(value) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(TemplateError::InvalidContext {
            message: format!("expected an object, got {}", value_kind(&other)),
        }),
        Err(e) => Err(TemplateError::InvalidContext {
            message: e.to_string(),
        }),
    }
}

/// Build a Tera context holding the same variables as `ctx`.
pub(crate) fn to_tera_context(ctx: &ContextMap) -> Result<TeraContext, TemplateError> {
    TeraContext::from_value(Value::Object(ctx.clone())).map_err(|e| TemplateError::InvalidContext {
        message: e.to_string(),
    })
}

/// Resolve a dotted variable path against the context.
///
/// Each segment is looked up as an object key; on arrays a numeric segment
/// is used as an index. Returns `None` if any segment is missing, so that a
/// bound `null` is distinguishable from an absent variable.
///
/// ```
/// use cotton::templating::{ContextMap, lookup_path};
/// use serde_json::json;
///
/// let ctx: ContextMap = serde_json::from_value(json!({
///     "user": { "tags": ["admin", "staff"] }
/// })).unwrap();
///
/// assert_eq!(lookup_path(&ctx, "user.tags.1"), Some(&json!("staff")));
/// assert_eq!(lookup_path(&ctx, "user.name"), None);
/// ```
pub fn lookup_path<'a>(ctx: &'a ContextMap, path: &str) -> Option<&'a Value> {
    if path.is_empty() {
        return None;
    }

    let mut segments = path.split('.');
    let mut current = ctx.get(segments.next()?)?;
    for segment in segments {
        if segment.is_empty() {
            return None;
        }
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Human readable name of a JSON value's type.
pub(crate) fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

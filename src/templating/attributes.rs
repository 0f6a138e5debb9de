//! Component attribute parsing.
//!
//! A component tag carries `key="value"`, `:key="expression"` and bare
//! `flag` tokens after its path and key. This module splits the tag interior
//! into tokens, turns tokens into an ordered raw attribute mapping and
//! resolves that mapping into final attribute values.

use serde_json::Value;

use super::context::ContextMap;
use super::resolver::DynamicAttributeResolver;
use crate::constants::DYNAMIC_ATTR_PREFIX;

/// Split a tag interior on whitespace, keeping quoted runs together.
///
/// A quote opens a run only at a token start or right after `=`, matching
/// how attribute values are written; everything up to the matching quote
/// (including whitespace) stays in the same token.
///
/// ```
/// use cotton::templating::split_contents;
///
/// assert_eq!(
///     split_contents(r#"cotton_component 'card' 'card_0' class="a b" :open"#),
///     vec!["cotton_component", "'card'", "'card_0'", r#"class="a b""#, ":open"],
/// );
/// ```
pub fn split_contents(input: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;

    for c in input.chars() {
        match quote {
            Some(q) => {
                current.push(c);
                if c == q {
                    quote = None;
                }
            }
            None if c.is_whitespace() => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            None => {
                if (c == '"' || c == '\'') && (current.is_empty() || current.ends_with('=')) {
                    quote = Some(c);
                }
                current.push(c);
            }
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

/// Strip surrounding quotes when the same quote character is on both ends.
pub fn strip_matching_quotes(value: &str) -> &str {
    let bytes = value.as_bytes();
    if bytes.len() >= 2
        && bytes[0] == bytes[bytes.len() - 1]
        && (bytes[0] == b'"' || bytes[0] == b'\'')
    {
        &value[1..value.len() - 1]
    } else {
        value
    }
}

/// Split one attribute token into key and raw value.
///
/// The split happens at the first `=` only. A token without `=` is a flag
/// and gets an empty value.
pub fn parse_attribute_token(token: &str) -> (String, String) {
    match token.split_once('=') {
        Some((key, value)) => (key.to_string(), value.to_string()),
        None => (token.to_string(), String::new()),
    }
}

/// Ordered attribute name → raw token value mapping of one invocation.
///
/// Raw values keep their quotes; quotes are stripped when attributes are
/// built. A repeated name replaces the earlier value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawAttributes {
    entries: Vec<(String, String)>,
}

impl RawAttributes {
    /// Parse attribute tokens (everything after the component path and key).
    pub fn parse<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut attrs = Self::default();
        for token in tokens {
            let (key, value) = parse_attribute_token(token.as_ref());
            attrs.insert(key, value);
        }
        attrs
    }

    /// Insert or replace an attribute.
    pub fn insert(&mut self, key: String, value: String) {
        match self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Raw value of an attribute.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolve the raw attributes against the render context.
    ///
    /// - `:name="expr"` is stored as `name` with the resolved value
    /// - `name` (no value, or `name=""`) is boolean `true`
    /// - anything else is kept as a string with matching quotes stripped
    pub fn build(&self, ctx: &ContextMap, resolver: &DynamicAttributeResolver) -> ContextMap {
        let mut attrs = ContextMap::new();
        for (key, raw) in self.iter() {
            let value = strip_matching_quotes(raw);
            if let Some(name) = key.strip_prefix(DYNAMIC_ATTR_PREFIX) {
                attrs.insert(name.to_string(), resolver.resolve(value, ctx));
            } else if value.is_empty() {
                attrs.insert(key.to_string(), Value::Bool(true));
            } else {
                attrs.insert(key.to_string(), Value::String(value.to_string()));
            }
        }
        attrs
    }
}

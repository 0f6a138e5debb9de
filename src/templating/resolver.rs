//! Dynamic attribute evaluation.
//!
//! A `:`-prefixed attribute is resolved against the render context by an
//! ordered list of strategies. Each strategy either produces the final value
//! or hands a (possibly rewritten) string to the next one; the first
//! strategy to produce a value wins. When every strategy passes, the last
//! string is the value.
//!
//! The standard order is:
//!
//! 1. [`VariableStrategy`] - dotted lookup in the context, type preserving
//! 2. [`BareFlagStrategy`] - an empty value is boolean `true`
//! 3. [`TemplateStringStrategy`] - interpolate `{{ }}` / `{% %}` with Tera
//! 4. [`LiteralStrategy`] - strict literal parsing of the interpolated text
//!
//! A context variable therefore always wins over a literal, and literals are
//! parsed only after embedded expressions have been interpolated.

use std::fmt;

use serde_json::Value;
use tera::Tera;

use super::context::{ContextMap, lookup_path, to_tera_context};
use super::literal::parse_literal;

/// Outcome of one resolution strategy.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// Final value; later strategies are skipped.
    Resolved(Value),
    /// Not resolved; the text is handed to the next strategy.
    Continue(String),
}

/// One step of the dynamic attribute resolution cascade.
pub trait ResolveStrategy: fmt::Debug + Send + Sync {
    /// Short name used in trace output.
    fn name(&self) -> &'static str;

    /// Try to resolve `text` against `ctx`.
    fn resolve(&self, text: String, ctx: &ContextMap) -> Resolution;
}

/// Resolve the text as a variable path in the context.
#[derive(Debug, Default)]
pub struct VariableStrategy;

impl ResolveStrategy for VariableStrategy {
    fn name(&self) -> &'static str {
        "variable"
    }

    fn resolve(&self, text: String, ctx: &ContextMap) -> Resolution {
        match lookup_path(ctx, &text) {
            Some(value) => Resolution::Resolved(value.clone()),
            None => Resolution::Continue(text),
        }
    }
}

/// A dynamic attribute without a value is a boolean flag.
#[derive(Debug, Default)]
pub struct BareFlagStrategy;

impl ResolveStrategy for BareFlagStrategy {
    fn name(&self) -> &'static str {
        "bare-flag"
    }

    fn resolve(&self, text: String, _ctx: &ContextMap) -> Resolution {
        if text.is_empty() {
            Resolution::Resolved(Value::Bool(true))
        } else {
            Resolution::Continue(text)
        }
    }
}

/// Render the text as an isolated Tera template.
///
/// Parse and render failures leave the text untouched.
#[derive(Debug, Default)]
pub struct TemplateStringStrategy {
    pub autoescape: bool,
}

impl ResolveStrategy for TemplateStringStrategy {
    fn name(&self) -> &'static str {
        "template-string"
    }

    fn resolve(&self, text: String, ctx: &ContextMap) -> Resolution {
        if !contains_template_syntax(&text) {
            return Resolution::Continue(text);
        }

        let rendered = to_tera_context(ctx)
            .ok()
            .and_then(|tera_ctx| match Tera::one_off(&text, &tera_ctx, self.autoescape) {
                Ok(rendered) => Some(rendered),
                Err(e) => {
                    tracing::trace!(
                        "Keeping raw attribute value '{}': {}",
                        text,
                        super::error::format_tera_error(&e)
                    );
                    None
                }
            });
        Resolution::Continue(rendered.unwrap_or(text))
    }
}

/// Parse the text as a literal value.
#[derive(Debug, Default)]
pub struct LiteralStrategy;

impl ResolveStrategy for LiteralStrategy {
    fn name(&self) -> &'static str {
        "literal"
    }

    fn resolve(&self, text: String, _ctx: &ContextMap) -> Resolution {
        match parse_literal(&text) {
            Ok(value) => Resolution::Resolved(value),
            Err(_) => Resolution::Continue(text),
        }
    }
}

/// Ordered list of resolution strategies.
#[derive(Debug)]
pub struct DynamicAttributeResolver {
    strategies: Vec<Box<dyn ResolveStrategy>>,
}

impl DynamicAttributeResolver {
    /// Resolver running the given strategies in order.
    pub fn new(strategies: Vec<Box<dyn ResolveStrategy>>) -> Self {
        Self {
            strategies,
        }
    }

    /// The standard variable → flag → template string → literal cascade.
    pub fn standard(autoescape: bool) -> Self {
        Self::new(vec![
            Box::new(VariableStrategy),
            Box::new(BareFlagStrategy),
            Box::new(TemplateStringStrategy {
                autoescape,
            }),
            Box::new(LiteralStrategy),
        ])
    }

    /// Resolve a raw dynamic attribute value. Never fails.
    pub fn resolve(&self, raw: &str, ctx: &ContextMap) -> Value {
        let mut text = raw.to_string();
        for strategy in &self.strategies {
            match strategy.resolve(text, ctx) {
                Resolution::Resolved(value) => {
                    tracing::trace!("Resolved '{}' via {} strategy", raw, strategy.name());
                    return value;
                }
                Resolution::Continue(next) => text = next,
            }
        }
        tracing::trace!("Resolved '{}' as plain string", raw);
        Value::String(text)
    }
}

impl Default for DynamicAttributeResolver {
    fn default() -> Self {
        Self::standard(false)
    }
}

/// Whether text contains Tera expression, statement or comment delimiters.
pub(crate) fn contains_template_syntax(text: &str) -> bool {
    text.contains("{{") || text.contains("{%") || text.contains("{#")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ctx(value: Value) -> ContextMap {
        super::super::context::context_from_serialize(&value).unwrap()
    }

    #[test]
    fn test_variable_wins_and_preserves_type() {
        let resolver = DynamicAttributeResolver::default();
        let ctx = ctx(json!({"items": [1, 2], "user": {"active": false}, "42": "shadowed"}));
        assert_eq!(resolver.resolve("items", &ctx), json!([1, 2]));
        assert_eq!(resolver.resolve("user.active", &ctx), json!(false));
        // A variable named like a literal still wins
        assert_eq!(resolver.resolve("42", &ctx), json!("shadowed"));
    }

    #[test]
    fn test_empty_value_is_flag() {
        let resolver = DynamicAttributeResolver::default();
        assert_eq!(resolver.resolve("", &ContextMap::new()), json!(true));
    }

    #[test]
    fn test_interpolates_before_literal() {
        let resolver = DynamicAttributeResolver::default();
        let ctx = ctx(json!({"y": "val", "n": 4}));
        assert_eq!(resolver.resolve("prefix-{{ y }}", &ctx), json!("prefix-val"));
        assert_eq!(resolver.resolve("{{ n }}2", &ctx), json!(42));
        assert_eq!(resolver.resolve("[{{ n }}, 'x']", &ctx), json!([4, "x"]));
    }

    #[test]
    fn test_literals() {
        let resolver = DynamicAttributeResolver::default();
        let empty = ContextMap::new();
        assert_eq!(resolver.resolve("42", &empty), json!(42));
        assert_eq!(resolver.resolve("True", &empty), json!(true));
        assert_eq!(resolver.resolve("{'a': 1}", &empty), json!({"a": 1}));
        assert_eq!(resolver.resolve("plain words", &empty), json!("plain words"));
    }

    #[test]
    fn test_broken_template_keeps_raw_text() {
        let resolver = DynamicAttributeResolver::default();
        let empty = ContextMap::new();
        assert_eq!(resolver.resolve("{{ unclosed", &empty), json!("{{ unclosed"));
        assert_eq!(resolver.resolve("{{ missing }}", &empty), json!("{{ missing }}"));
    }

    #[test]
    fn test_custom_strategy_order() {
        let resolver = DynamicAttributeResolver::new(vec![Box::new(LiteralStrategy)]);
        let ctx = ctx(json!({"x": 1}));
        assert_eq!(resolver.resolve("x", &ctx), json!("x"));
    }
}

//! Render tree of a component template.
//!
//! A parsed template is a list of [`Node`]s. Plain text (including any Tera
//! syntax that does not wrap a component) is rendered by Tera; component,
//! slot and structural control-flow nodes are rendered here.

use serde_json::{Value, json};

use super::attributes::RawAttributes;
use super::context::{ContextMap, to_tera_context, value_kind};
use super::engine::Engine;
use super::error::TemplateError;
use super::path::component_template_path;
use super::slots::SlotStore;
use super::template::Template;
use super::utils::{context_var_name, format_attrs};
use crate::constants::{ATTRS_DICT_KEY, ATTRS_KEY, SLOT_KEY};

/// State shared by every node rendered during one top-level render call.
#[derive(Debug, Default)]
pub struct RenderPass {
    /// Named slots captured by slot nodes, consumed by their components
    pub slots: SlotStore,
    /// Component templates currently being rendered, outermost first
    pub(crate) chain: Vec<String>,
    /// Components of the current template whose bodies are being rendered,
    /// as (component key, slot store key)
    open: Vec<(String, String)>,
    invocations: usize,
}

impl RenderPass {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current component nesting depth.
    pub fn depth(&self) -> usize {
        self.chain.len()
    }

    /// Start rendering the body of an invocation of `component_key`.
    ///
    /// Returns the slot store key of this invocation. Component keys are only
    /// unique within one template, so slots are stored per invocation.
    pub(crate) fn begin_invocation(&mut self, component_key: &str) -> String {
        let slot_key = format!("{component_key}#{}", self.invocations);
        self.invocations += 1;
        self.open.push((component_key.to_string(), slot_key.clone()));
        slot_key
    }

    pub(crate) fn end_invocation(&mut self) {
        self.open.pop();
    }

    /// Slot store key of the innermost open invocation of `component_key`.
    pub(crate) fn slot_key(&self, component_key: &str) -> String {
        self.open
            .iter()
            .rev()
            .find(|(key, _)| key == component_key)
            .map_or_else(|| component_key.to_string(), |(_, slot_key)| slot_key.clone())
    }

    /// Enter a component template. Invocations open in the caller are not
    /// visible from inside it.
    pub(crate) fn enter_template(&mut self, path: &str) -> Vec<(String, String)> {
        self.chain.push(path.to_string());
        std::mem::take(&mut self.open)
    }

    pub(crate) fn leave_template(&mut self, open: Vec<(String, String)>) {
        self.chain.pop();
        self.open = open;
    }
}

/// What a node needs from its surroundings while rendering.
#[derive(Clone, Copy)]
pub(crate) struct RenderScope<'a> {
    pub(crate) engine: &'a Engine,
    pub(crate) template: &'a Template,
}

/// A Tera source fragment compiled into the owning template's Tera instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub source: String,
    /// Byte offset of the fragment in the template source
    pub offset: usize,
    /// Name of the compiled Tera template, `None` for literal text
    pub(crate) compiled: Option<String>,
}

impl Fragment {
    pub(crate) fn new(source: impl Into<String>, offset: usize) -> Self {
        Self {
            source: source.into(),
            offset,
            compiled: None,
        }
    }
}

/// One element of a parsed template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Text rendered by Tera (or copied verbatim when it has no Tera syntax)
    Text(Fragment),
    Component(ComponentNode),
    Slot(SlotNode),
    For(ForNode),
    If(IfNode),
}

/// A component invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentNode {
    /// Declared path, or the `component` sentinel
    pub path: String,
    /// Identifies this occurrence for slot scoping
    pub key: String,
    pub attrs: RawAttributes,
    /// Default slot content
    pub body: Vec<Node>,
}

/// A named slot filled for an enclosing component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotNode {
    pub name: String,
    pub component_key: String,
    /// Content is a deferred dynamic attribute rather than markup
    pub expression_attr: bool,
    pub body: Vec<Node>,
}

/// A `for` loop whose body contains components or slots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForNode {
    pub key_var: Option<String>,
    pub value_var: String,
    /// Tera expression producing the iterable
    pub iterable: Fragment,
    pub body: Vec<Node>,
}

/// An `if` chain whose branches contain components or slots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IfNode {
    pub branches: Vec<IfBranch>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IfBranch {
    /// Tera condition, `None` for `else`
    pub condition: Option<Fragment>,
    pub body: Vec<Node>,
}

/// Render a node list with one context.
pub(crate) fn render_nodes(
    nodes: &[Node],
    ctx: &ContextMap,
    scope: RenderScope<'_>,
    pass: &mut RenderPass,
) -> Result<String, TemplateError> {
    let mut out = String::new();
    let mut tera_ctx = None;

    for node in nodes {
        match node {
            Node::Text(fragment) => match &fragment.compiled {
                None => out.push_str(&fragment.source),
                Some(name) => {
                    if tera_ctx.is_none() {
                        tera_ctx = Some(to_tera_context(ctx)?);
                    }
                    if let Some(tera_ctx) = &tera_ctx {
                        out.push_str(&scope.template.render_fragment(name, tera_ctx)?);
                    }
                }
            },
            Node::Component(component) => out.push_str(&component.render(ctx, scope, pass)?),
            Node::Slot(slot) => slot.render(ctx, scope, pass)?,
            Node::For(for_node) => out.push_str(&for_node.render(ctx, scope, pass)?),
            Node::If(if_node) => out.push_str(&if_node.render(ctx, scope, pass)?),
        }
    }

    Ok(out)
}

impl ComponentNode {
    /// Render the component: resolve attributes, render the default slot,
    /// merge named slots, then render the component template with the
    /// assembled context.
    pub(crate) fn render(
        &self,
        ctx: &ContextMap,
        scope: RenderScope<'_>,
        pass: &mut RenderPass,
    ) -> Result<String, TemplateError> {
        let engine = scope.engine;
        let resolver = engine.resolver();

        let mut attrs = self.attrs.build(ctx, resolver);

        let mut local_ctx = ctx.clone();
        let slot_key = pass.begin_invocation(&self.key);
        let default_slot = render_nodes(&self.body, ctx, scope, pass);
        pass.end_invocation();
        local_ctx.insert(SLOT_KEY.to_string(), Value::String(default_slot?));

        // Consuming the entry also removes it, so nothing carries over to a
        // later invocation.
        let named = pass.slots.take(&slot_key);
        named.merge_into(&mut local_ctx);

        for name in named.expression_attrs() {
            if let Some(raw) = named.get(name) {
                let value = resolver.resolve(raw, &local_ctx);
                attrs.insert(name.trim_start_matches(':').to_string(), value);
            }
        }

        local_ctx.insert(ATTRS_KEY.to_string(), Value::String(format_attrs(&attrs)));
        local_ctx.insert(ATTRS_DICT_KEY.to_string(), Value::Object(attrs.clone()));
        for (name, value) in &attrs {
            local_ctx.insert(context_var_name(name), value.clone());
        }

        let template_path =
            component_template_path(&self.path, &self.key, &attrs, &engine.config().cotton_dir)?;
        tracing::debug!(
            "Rendering component '{}' ({}) with {} attribute(s)",
            self.key,
            template_path,
            attrs.len()
        );

        engine.render_component(&template_path, &local_ctx, pass)
    }
}

impl SlotNode {
    /// Render the slot body into the pass's slot store. Slots produce no output.
    pub(crate) fn render(
        &self,
        ctx: &ContextMap,
        scope: RenderScope<'_>,
        pass: &mut RenderPass,
    ) -> Result<(), TemplateError> {
        let slot_key = pass.slot_key(&self.component_key);
        let content = match render_nodes(&self.body, ctx, scope, pass) {
            Ok(content) => content,
            // The resolver falls back to the raw text, as for tag-syntax
            // dynamic attributes.
            Err(e) if self.expression_attr => {
                tracing::debug!("Attribute '{}' of '{}' kept as written: {}", self.name, self.component_key, e);
                raw_source(&self.body)
            }
            Err(e) => return Err(e),
        };
        pass.slots.insert(&slot_key, &self.name, content);
        if self.expression_attr {
            pass.slots.mark_expression_attr(&slot_key, &self.name);
        }
        Ok(())
    }
}

/// Source text of literal and Tera text nodes.
fn raw_source(nodes: &[Node]) -> String {
    nodes
        .iter()
        .filter_map(|node| match node {
            Node::Text(fragment) => Some(fragment.source.as_str()),
            _ => None,
        })
        .collect()
}

impl ForNode {
    pub(crate) fn render(
        &self,
        ctx: &ContextMap,
        scope: RenderScope<'_>,
        pass: &mut RenderPass,
    ) -> Result<String, TemplateError> {
        let iterable = scope.template.evaluate_json(&self.iterable, ctx)?;

        let items: Vec<(Option<Value>, Value)> = match (&self.key_var, iterable) {
            (None, Value::Array(items)) => items.into_iter().map(|item| (None, item)).collect(),
            (Some(_), Value::Object(map)) => {
                map.into_iter().map(|(k, v)| (Some(Value::String(k)), v)).collect()
            }
            (key_var, other) => {
                let expected = if key_var.is_some() {
                    "an object"
                } else {
                    "an array"
                };
                return Err(TemplateError::Render {
                    template: scope.template.name().to_string(),
                    message: format!(
                        "for loop over '{}' expected {}, got {}",
                        self.iterable.source.trim(),
                        expected,
                        value_kind(&other)
                    ),
                });
            }
        };

        let len = items.len();
        let mut out = String::new();
        for (index0, (key, value)) in items.into_iter().enumerate() {
            let mut loop_ctx = ctx.clone();
            if let (Some(key_var), Some(key)) = (&self.key_var, key) {
                loop_ctx.insert(key_var.clone(), key);
            }
            loop_ctx.insert(self.value_var.clone(), value);
            loop_ctx.insert(
                "loop".to_string(),
                json!({
                    "index": index0 + 1,
                    "index0": index0,
                    "first": index0 == 0,
                    "last": index0 + 1 == len,
                }),
            );
            out.push_str(&render_nodes(&self.body, &loop_ctx, scope, pass)?);
        }
        Ok(out)
    }
}

impl IfNode {
    pub(crate) fn render(
        &self,
        ctx: &ContextMap,
        scope: RenderScope<'_>,
        pass: &mut RenderPass,
    ) -> Result<String, TemplateError> {
        for branch in &self.branches {
            let taken = match &branch.condition {
                None => true,
                Some(condition) => scope.template.evaluate_condition(condition, ctx)?,
            };
            if taken {
                return render_nodes(&branch.body, ctx, scope, pass);
            }
        }
        Ok(String::new())
    }
}

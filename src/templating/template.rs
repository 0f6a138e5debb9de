//! Compiled component templates.
//!
//! A [`Template`] owns its parsed node tree and a private Tera instance that
//! holds every Tera fragment of the tree: text segments with template
//! syntax, `if` conditions and `for` iterables. Fragments are compiled once
//! when the template is built, so Tera syntax errors surface at load time
//! with the line they occur on.

use serde_json::Value;
use tera::{Context as TeraContext, Tera};

use super::context::{ContextMap, to_tera_context};
use super::engine::Engine;
use super::error::{TemplateError, format_tera_error};
use super::node::{Fragment, Node, RenderPass, RenderScope, render_nodes};
use super::parser::parse_template;
use super::resolver::contains_template_syntax;

/// A parsed and compiled template.
#[derive(Debug)]
pub struct Template {
    name: String,
    nodes: Vec<Node>,
    tera: Tera,
}

impl Template {
    /// Parse `source` and compile its Tera fragments.
    ///
    /// With `autoescape` on, every `{{ }}` output of the template is HTML
    /// escaped unless marked `| safe`.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::Syntax`] for malformed cotton tags or Tera
    /// fragments that fail to parse.
    pub fn compile(name: &str, source: &str, autoescape: bool) -> Result<Self, TemplateError> {
        let mut nodes = parse_template(name, source)?;

        let mut tera = Tera::default();
        if autoescape {
            // Every name ends with the empty suffix.
            tera.autoescape_on(vec![""]);
        } else {
            tera.autoescape_on(vec![]);
        }

        let mut compiler = FragmentCompiler {
            template: name,
            source,
            tera: &mut tera,
            count: 0,
        };
        compiler.compile_nodes(&mut nodes)?;
        tracing::trace!("Compiled '{}' with {} Tera fragment(s)", name, compiler.count);

        Ok(Self {
            name: name.to_string(),
            nodes,
            tera,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Render the template within an ongoing render pass.
    pub(crate) fn render_with(
        &self,
        engine: &Engine,
        ctx: &ContextMap,
        pass: &mut RenderPass,
    ) -> Result<String, TemplateError> {
        let scope = RenderScope {
            engine,
            template: self,
        };
        render_nodes(&self.nodes, ctx, scope, pass)
    }

    pub(crate) fn render_fragment(&self, compiled: &str, ctx: &TeraContext) -> Result<String, TemplateError> {
        self.tera.render(compiled, ctx).map_err(|e| TemplateError::from_tera(&self.name, &e))
    }

    /// Evaluate a compiled `if` condition.
    pub(crate) fn evaluate_condition(&self, condition: &Fragment, ctx: &ContextMap) -> Result<bool, TemplateError> {
        let rendered = self.render_compiled(condition, ctx)?;
        Ok(rendered == "true")
    }

    /// Evaluate a compiled expression to a JSON value.
    pub(crate) fn evaluate_json(&self, expression: &Fragment, ctx: &ContextMap) -> Result<Value, TemplateError> {
        let rendered = self.render_compiled(expression, ctx)?;
        serde_json::from_str(&rendered).map_err(|e| TemplateError::Render {
            template: self.name.clone(),
            message: format!("'{}' did not evaluate to a value: {e}", expression.source.trim()),
        })
    }

    fn render_compiled(&self, fragment: &Fragment, ctx: &ContextMap) -> Result<String, TemplateError> {
        let Some(compiled) = &fragment.compiled else {
            return Err(TemplateError::Render {
                template: self.name.clone(),
                message: format!("expression '{}' was not compiled", fragment.source.trim()),
            });
        };
        self.render_fragment(compiled, &to_tera_context(ctx)?)
    }
}

/// Walks a node tree and registers its Tera fragments.
struct FragmentCompiler<'a> {
    template: &'a str,
    source: &'a str,
    tera: &'a mut Tera,
    count: usize,
}

impl FragmentCompiler<'_> {
    fn compile_nodes(&mut self, nodes: &mut [Node]) -> Result<(), TemplateError> {
        for node in nodes {
            match node {
                Node::Text(fragment) => {
                    if contains_template_syntax(&fragment.source) {
                        let body = fragment.source.clone();
                        self.register(fragment, &body)?;
                    }
                }
                Node::Component(component) => self.compile_nodes(&mut component.body)?,
                Node::Slot(slot) => self.compile_nodes(&mut slot.body)?,
                Node::For(for_node) => {
                    let body = format!("{{{{ {} | json_encode() | safe }}}}", for_node.iterable.source.trim());
                    self.register(&mut for_node.iterable, &body)?;
                    self.compile_nodes(&mut for_node.body)?;
                }
                Node::If(if_node) => {
                    for branch in &mut if_node.branches {
                        if let Some(condition) = &mut branch.condition {
                            let body = format!("{{% if {} %}}true{{% endif %}}", condition.source.trim());
                            self.register(condition, &body)?;
                        }
                        self.compile_nodes(&mut branch.body)?;
                    }
                }
            }
        }
        Ok(())
    }

    fn register(&mut self, fragment: &mut Fragment, body: &str) -> Result<(), TemplateError> {
        let compiled = format!("{}#{}", self.template, self.count);
        self.count += 1;
        self.tera.add_raw_template(&compiled, body).map_err(|e| {
            TemplateError::syntax_at(self.template, self.source, fragment.offset, format_tera_error(&e))
        })?;
        fragment.compiled = Some(compiled);
        Ok(())
    }
}

//! Component rendering engine.
//!
//! The [`Engine`] ties the pieces together: it loads template sources
//! through a [`TemplateLoader`], compiles them (HTML syntax, tag parsing,
//! Tera fragments), caches the result and renders templates with a fresh
//! [`RenderPass`] per call.

use std::borrow::Cow;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;

use super::cache::{CacheStats, TemplateCache};
use super::compiler::compile_html;
use super::context::{ContextMap, context_from_serialize};
use super::error::TemplateError;
use super::loader::{FileSystemLoader, TemplateLoader};
use super::node::RenderPass;
use super::resolver::DynamicAttributeResolver;
use super::template::Template;
use crate::config::CottonConfig;

/// Name given to templates rendered from a string.
const INLINE_TEMPLATE_NAME: &str = "<string>";

/// Renders templates containing cotton components.
///
/// An `Engine` is `Send + Sync`; concurrent renders each get their own
/// render pass and share only the compiled template cache.
///
/// # Examples
///
/// ```
/// use cotton::config::CottonConfig;
/// use cotton::templating::{Engine, MemoryLoader};
/// use serde_json::json;
///
/// let loader = MemoryLoader::new()
///     .with_template("cotton/greeting.html", "<p {{ attrs }}>Hello {{ slot }}</p>");
/// let engine = Engine::new(CottonConfig::default(), loader);
///
/// let html = engine
///     .render_str(r#"<c-greeting class="big">{{ name }}</c-greeting>"#, &json!({"name": "Ada"}))
///     .unwrap();
/// assert_eq!(html, r#"<p class="big">Hello Ada</p>"#);
/// ```
#[derive(Debug)]
pub struct Engine {
    config: CottonConfig,
    loader: Box<dyn TemplateLoader>,
    resolver: DynamicAttributeResolver,
    cache: Mutex<TemplateCache>,
}

impl Engine {
    pub fn new(config: CottonConfig, loader: impl TemplateLoader + 'static) -> Self {
        let resolver = DynamicAttributeResolver::standard(config.autoescape);
        Self {
            config,
            loader: Box::new(loader),
            resolver,
            cache: Mutex::new(TemplateCache::new()),
        }
    }

    /// Engine loading templates from the configured template directories.
    pub fn from_config(config: CottonConfig) -> Self {
        let loader = FileSystemLoader::new(config.template_dirs.clone());
        Self::new(config, loader)
    }

    pub fn config(&self) -> &CottonConfig {
        &self.config
    }

    pub fn loader(&self) -> &dyn TemplateLoader {
        self.loader.as_ref()
    }

    pub fn resolver(&self) -> &DynamicAttributeResolver {
        &self.resolver
    }

    /// Render a template by name.
    ///
    /// `context` may be any value that serializes to a JSON object.
    ///
    /// # Errors
    ///
    /// Returns an error if the context is not an object, if the template or
    /// any component it uses cannot be loaded or compiled, or if rendering
    /// fails.
    pub fn render<C: Serialize + ?Sized>(&self, name: &str, context: &C) -> Result<String, TemplateError> {
        let ctx = context_from_serialize(context)?;
        let template = self.get_template(name)?;
        tracing::debug!("Rendering template '{}'", name);
        self.render_template(&template, &ctx)
    }

    /// Render template source directly, bypassing the loader and cache for
    /// the outer template. Components are still loaded and cached.
    ///
    /// # Errors
    ///
    /// Same as [`Engine::render`].
    pub fn render_str<C: Serialize + ?Sized>(&self, source: &str, context: &C) -> Result<String, TemplateError> {
        let ctx = context_from_serialize(context)?;
        let template = self.compile_template(INLINE_TEMPLATE_NAME, source)?;
        self.render_template(&template, &ctx)
    }

    /// Compile HTML component syntax into tag syntax without rendering.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::Syntax`] for malformed component elements.
    pub fn compile_source(&self, source: &str) -> Result<String, TemplateError> {
        compile_html(INLINE_TEMPLATE_NAME, source)
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.lock_cache().stats()
    }

    /// Drop all compiled templates, e.g. after templates changed on disk.
    pub fn clear_cache(&self) {
        self.lock_cache().clear();
    }

    fn render_template(&self, template: &Template, ctx: &ContextMap) -> Result<String, TemplateError> {
        let mut pass = RenderPass::new();
        template.render_with(self, ctx, &mut pass)
    }

    /// Render a component template inside an ongoing pass.
    pub(crate) fn render_component(
        &self,
        path: &str,
        ctx: &ContextMap,
        pass: &mut RenderPass,
    ) -> Result<String, TemplateError> {
        if pass.depth() >= self.config.max_depth {
            let mut chain = pass.chain.clone();
            chain.push(path.to_string());
            return Err(TemplateError::RecursionLimit {
                depth: self.config.max_depth,
                chain,
            });
        }

        let template = self.get_template(path)?;
        let caller_open = pass.enter_template(path);
        let result = template.render_with(self, ctx, pass);
        pass.leave_template(caller_open);
        result
    }

    fn get_template(&self, name: &str) -> Result<Arc<Template>, TemplateError> {
        if self.config.cache_templates {
            if let Some(template) = self.lock_cache().get(name) {
                return Ok(template);
            }
        }

        let source = self.loader.load_source(name)?;
        let template = Arc::new(self.compile_template(name, &source)?);
        tracing::debug!("Compiled template '{}'", name);

        if self.config.cache_templates {
            self.lock_cache().insert(name.to_string(), Arc::clone(&template));
        }
        Ok(template)
    }

    fn compile_template(&self, name: &str, source: &str) -> Result<Template, TemplateError> {
        let source = if self.config.compile_html {
            Cow::Owned(compile_html(name, source)?)
        } else {
            Cow::Borrowed(source)
        };
        Template::compile(name, &source, self.config.autoescape)
    }

    fn lock_cache(&self) -> MutexGuard<'_, TemplateCache> {
        // The cache holds no invariants a panicking holder could break.
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

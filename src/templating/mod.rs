//! Component templating for Tera.
//!
//! This module adds reusable HTML components to Tera templates. A component
//! is a template under the component directory (`cotton/` by default) that
//! is invoked with attributes and slot content:
//!
//! ```text
//! <c-card title="Welcome" :items="products" wide>
//!     <c-slot name="footer">{{ year }}</c-slot>
//!     Default slot content
//! </c-card>
//! ```
//!
//! # Pipeline
//!
//! 1. [`compile_html`] rewrites `<c-...>` elements into tag syntax
//!    (`{% cotton_component 'card' 'card_0' ... %}`)
//! 2. [`parse_template`] builds a [`Node`] tree; text between component tags
//!    stays Tera source
//! 3. [`Template::compile`] registers every Tera fragment in a per-template
//!    Tera instance
//! 4. [`Engine`] renders the tree, loading component templates through a
//!    [`TemplateLoader`] and caching compiled templates
//!
//! # Component Context
//!
//! A component template sees the caller's context plus:
//! - `slot`: rendered default slot (the component body)
//! - one variable per named slot
//! - `attrs`: attributes as a `key="value"` string
//! - `attrs_dict`: attributes as a mapping
//! - one variable per attribute, dashes replaced by underscores
//!   (`x-init` → `x_init`)
//!
//! # Dynamic Attributes
//!
//! `:name="expr"` attributes are resolved by [`DynamicAttributeResolver`]:
//! a context variable wins, an empty value is `true`, embedded `{{ }}` is
//! interpolated, and the result is parsed as a literal when it is one
//! (`42`, `True`, `['a', 'b']`, `{'k': 1}`). Anything else stays a string.

mod attributes;
mod cache;
mod compiler;
mod context;
mod engine;
mod error;
mod literal;
mod loader;
mod node;
mod parser;
mod path;
mod resolver;
mod slots;
mod template;
mod utils;


pub use attributes::{RawAttributes, parse_attribute_token, split_contents, strip_matching_quotes};
pub use cache::{CacheStats, TemplateCache};
pub use compiler::compile_html;
pub use context::{ContextMap, context_from_serialize, lookup_path};
pub use engine::Engine;
pub use error::{TemplateError, format_tera_error};
pub use literal::{LiteralError, parse_literal};
pub use loader::{FileSystemLoader, MemoryLoader, TemplateLoader, suggest_similar};
pub use node::{ComponentNode, ForNode, Fragment, IfBranch, IfNode, Node, RenderPass, SlotNode};
pub use parser::parse_template;
pub use path::{component_template_path, normalize_component_path};
pub use resolver::{
    BareFlagStrategy, DynamicAttributeResolver, LiteralStrategy, Resolution, ResolveStrategy,
    TemplateStringStrategy, VariableStrategy,
};
pub use slots::{NamedSlots, SlotStore};
pub use template::Template;
pub use utils::{attr_value_text, context_var_name, deep_merge_json, ensure_quoted, format_attrs};

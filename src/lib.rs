//! cotton - HTML-like components for Tera templates
//!
//! cotton lets Tera templates use reusable components. A component is an
//! ordinary template under the component directory (`cotton/` by default),
//! invoked with HTML-like elements or the equivalent tags:
//!
//! ```text
//! <c-button class="primary" :disabled="is_locked">Save</c-button>
//!
//! {% cotton_component 'button' 'button_0' class="primary" :disabled="is_locked" %}
//!     Save
//! {% end_cotton_component %}
//! ```
//!
//! The component template receives the rendered body as `slot`, named slots
//! as variables of their own, and its attributes as `attrs` (a ready-to-use
//! `key="value"` string), `attrs_dict` (a mapping) and one variable each.
//!
//! # Core Modules
//!
//! - [`templating`] - Component compiler, parser, loaders and the render [`templating::Engine`]
//! - [`config`] - `cotton.toml` configuration
//! - [`core`] - Error types and user-facing error formatting
//! - [`cli`] - The `cotton` command-line interface
//! - [`constants`] - Tag names, reserved context keys and defaults
//!
//! # Example
//!
//! ```rust,no_run
//! use cotton::config::CottonConfig;
//! use cotton::templating::Engine;
//! use serde_json::json;
//!
//! # fn main() -> anyhow::Result<()> {
//! let engine = Engine::from_config(CottonConfig::load(None)?);
//! let html = engine.render("pages/home.html", &json!({ "user": { "name": "Ada" } }))?;
//! println!("{html}");
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod constants;
pub mod core;
pub mod templating;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

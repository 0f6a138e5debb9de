//! Render a template from the command line.
//!
//! The render context is assembled from `--context` JSON files, deep-merged
//! in the order given, followed by `--var KEY=VALUE` assignments. Variable
//! values go through the same literal evaluator as dynamic attributes, so
//! `--var count=3` is a number and `--var tags="['a', 'b']"` a list; anything
//! that is not a literal stays a string.

use anyhow::{Context, Result};
use clap::Args;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

use crate::config::CottonConfig;
use crate::core::CottonError;
use crate::templating::{ContextMap, Engine, deep_merge_json, parse_literal};

/// Command to render a template.
#[derive(Args, Debug)]
pub struct RenderCommand {
    /// Template name, relative to a template directory (e.g. `pages/home.html`)
    pub(super) name: String,

    /// Template directory to search (repeatable, replaces configured directories)
    #[arg(short = 't', long = "template-dir", value_name = "DIR")]
    pub(super) template_dirs: Vec<PathBuf>,

    /// JSON file providing render context (repeatable, later files win)
    #[arg(long = "context", value_name = "FILE")]
    pub(super) contexts: Vec<PathBuf>,

    /// Context variable assignment (repeatable)
    ///
    /// # Examples
    ///
    /// ```bash
    /// cotton render page.html --var title='Hello' --var count=3 --var debug=True
    /// ```
    #[arg(long = "var", value_name = "KEY=VALUE")]
    pub(super) vars: Vec<String>,

    /// Component directory inside the template directories
    #[arg(long, value_name = "DIR")]
    pub(super) cotton_dir: Option<String>,

    /// Write output to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub(super) output: Option<PathBuf>,
}

impl RenderCommand {
    /// Render with `config`, after applying this command's overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the context cannot be built, rendering fails or
    /// the output file cannot be written.
    pub fn execute(self, config: CottonConfig) -> Result<()> {
        let config = self.apply_overrides(config);
        let context = self.build_context()?;

        tracing::debug!(
            "Rendering '{}' from {:?} with cotton_dir '{}'",
            self.name,
            config.template_dirs,
            config.cotton_dir
        );
        let engine = Engine::from_config(config);
        let html = engine.render(&self.name, &context)?;

        match &self.output {
            Some(path) => {
                std::fs::write(path, &html).with_context(|| CottonError::FileSystemError {
                    operation: "writing output".to_string(),
                    path: path.display().to_string(),
                })?;
                tracing::info!("Wrote {}", path.display());
            }
            None => print!("{html}"),
        }
        Ok(())
    }

    fn apply_overrides(&self, mut config: CottonConfig) -> CottonConfig {
        if !self.template_dirs.is_empty() {
            config.template_dirs.clone_from(&self.template_dirs);
        }
        if let Some(dir) = &self.cotton_dir {
            config.cotton_dir.clone_from(dir);
        }
        config
    }

    /// Merge context files, then variable assignments, into one mapping.
    pub(super) fn build_context(&self) -> Result<ContextMap> {
        let mut merged = Value::Object(Map::new());
        for path in &self.contexts {
            let value = read_context_file(path)?;
            merged = deep_merge_json(merged, &value);
        }

        let Value::Object(mut context) = merged else {
            return Ok(ContextMap::new());
        };

        for assignment in &self.vars {
            let (key, value) = parse_assignment(assignment)?;
            context.insert(key, value);
        }
        Ok(context)
    }
}

fn read_context_file(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read context file: {}", path.display()))?;

    let value: Value = serde_json::from_str(&content).map_err(|e| CottonError::ContextParseError {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;

    if !value.is_object() {
        return Err(CottonError::ContextParseError {
            path: path.display().to_string(),
            reason: "expected a JSON object at the top level".to_string(),
        }
        .into());
    }
    Ok(value)
}

/// Split `KEY=VALUE`; the value is a literal when it parses as one.
fn parse_assignment(assignment: &str) -> Result<(String, Value), CottonError> {
    let invalid = || CottonError::InvalidVariable {
        assignment: assignment.to_string(),
    };

    let (key, raw) = assignment.split_once('=').ok_or_else(invalid)?;
    let key = key.trim();
    if key.is_empty() {
        return Err(invalid());
    }

    let value = parse_literal(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    Ok((key.to_string(), value))
}

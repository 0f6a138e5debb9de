//! Template error handling for cotton
//!
//! This module provides the structured error type returned by the templating
//! layer, with enough context (template name, line, component chain) for the
//! CLI to print a useful message.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while compiling, loading or rendering component templates.
///
/// Dynamic attribute resolution never produces one of these: the resolution
/// cascade always falls back to some value. Everything else that can go wrong
/// during a render surfaces here.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// The `component` sentinel path was used without an `is` attribute.
    #[error("dynamic component '{key}' must be accompanied by an \"is\" attribute")]
    MissingDynamicTarget {
        /// Key of the offending component occurrence
        key: String,
    },

    /// A component identifier failed path sanitizing.
    #[error("invalid component path '{path}': {reason}")]
    InvalidComponentPath {
        path: String,
        reason: String,
    },

    /// A template name that could address a file outside the loader roots.
    #[error("invalid template name '{name}': {reason}")]
    InvalidTemplateName {
        name: String,
        reason: String,
    },

    /// No loader root contains the requested template.
    #[error("template '{name}' not found")]
    TemplateNotFound {
        name: String,
        /// Template roots that were searched, if the loader is filesystem-backed
        searched: Vec<PathBuf>,
        /// Similarly named templates, closest first
        suggestions: Vec<String>,
    },

    /// Malformed component, slot or control-flow tags.
    #[error("syntax error in '{template}'{}: {message}", line_suffix(.line))]
    Syntax {
        template: String,
        line: Option<usize>,
        message: String,
    },

    /// Tera failed to parse or render a text segment or condition.
    #[error("failed to render '{template}': {message}")]
    Render {
        template: String,
        message: String,
    },

    /// Component nesting exceeded the configured maximum depth.
    #[error("component nesting exceeded {depth} levels: {}", .chain.join(" -> "))]
    RecursionLimit {
        depth: usize,
        chain: Vec<String>,
    },

    /// The render context could not be turned into a mapping.
    #[error("invalid render context: {message}")]
    InvalidContext {
        message: String,
    },

    /// Reading a template file failed.
    #[error("failed to read template '{}'", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn line_suffix(line: &Option<usize>) -> String {
    match line {
        Some(line) => format!(" at line {line}"),
        None => String::new(),
    }
}

impl TemplateError {
    /// Build a syntax error located at a byte offset of `source`.
    pub(crate) fn syntax_at(
        template: &str,
        source: &str,
        offset: usize,
        message: impl Into<String>,
    ) -> Self {
        Self::Syntax {
            template: template.to_string(),
            line: Some(line_of_offset(source, offset)),
            message: message.into(),
        }
    }

    /// Build a render error from a Tera error, cleaning up Tera's internal names.
    pub(crate) fn from_tera(template: &str, error: &tera::Error) -> Self {
        Self::Render {
            template: template.to_string(),
            message: format_tera_error(error),
        }
    }
}

/// 1-based line number of a byte offset.
pub(crate) fn line_of_offset(source: &str, offset: usize) -> usize {
    let end = offset.min(source.len());
    source.as_bytes()[..end].iter().filter(|&&b| b == b'\n').count() + 1
}

/// Format a Tera error by walking its source chain.
///
/// Tera nests the useful message (e.g. "Variable `foo` not found") a few
/// levels deep behind generic "Failed to render" wrappers that mention
/// internal template names like `__tera_one_off`. This keeps only the
/// informative parts.
pub fn format_tera_error(error: &tera::Error) -> String {
    use std::error::Error;

    let mut all_messages = vec![error.to_string()];
    let mut current_error: Option<&dyn Error> = error.source();
    while let Some(err) = current_error {
        all_messages.push(err.to_string());
        current_error = err.source();
    }

    let messages: Vec<String> = all_messages
        .into_iter()
        .map(|msg| {
            msg.replace("while rendering '__tera_one_off'", "")
                .replace("Failed to render '__tera_one_off'", "Template rendering failed")
                .replace("Failed to parse '__tera_one_off'", "Template syntax error")
                .replace("'__tera_one_off'", "template")
                .trim()
                .to_string()
        })
        .filter(|cleaned| {
            !cleaned.is_empty()
                && cleaned != "Template rendering failed"
                && cleaned != "Template syntax error"
                && !cleaned.starts_with("Failed to render '")
        })
        .collect();

    if messages.is_empty() {
        "template syntax error".to_string()
    } else {
        messages.join("\n  → ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_of_offset() {
        let source = "a\nb\nc";
        assert_eq!(line_of_offset(source, 0), 1);
        assert_eq!(line_of_offset(source, 2), 2);
        assert_eq!(line_of_offset(source, 4), 3);
        assert_eq!(line_of_offset(source, 100), 3);
    }

    #[test]
    fn test_syntax_error_display_includes_line() {
        let err = TemplateError::syntax_at("page.html", "x\n{% oops %}", 2, "unexpected tag");
        assert_eq!(err.to_string(), "syntax error in 'page.html' at line 2: unexpected tag");
    }

    #[test]
    fn test_format_tera_error_hides_one_off_names() {
        let err = tera::Tera::one_off("{{ missing }}", &tera::Context::new(), false).unwrap_err();
        let formatted = format_tera_error(&err);
        assert!(!formatted.contains("__tera_one_off"), "got: {formatted}");
        assert!(formatted.contains("missing"), "got: {formatted}");
    }

    #[test]
    fn test_recursion_limit_display() {
        let err = TemplateError::RecursionLimit {
            depth: 2,
            chain: vec!["cotton/a.html".into(), "cotton/b.html".into()],
        };
        assert_eq!(
            err.to_string(),
            "component nesting exceeded 2 levels: cotton/a.html -> cotton/b.html"
        );
    }
}

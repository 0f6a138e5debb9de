//! Error handling for cotton
//!
//! The error system follows two principles:
//! 1. **Strongly-typed errors** for precise error handling in code
//! 2. **User-friendly messages** with actionable suggestions for CLI users
//!
//! [`CottonError`] enumerates failures of CLI operations (reading context
//! files, parsing `--var` assignments, writing output) and wraps
//! [`TemplateError`] for everything the engine reports. [`ErrorContext`]
//! adds details and a suggestion on top, and [`user_friendly_error`] builds
//! one from any [`anyhow::Error`].
//!
//! # Examples
//!
//! ```rust,no_run
//! use cotton::core::{CottonError, ErrorContext, user_friendly_error};
//!
//! let error = CottonError::InvalidVariable {
//!     assignment: "title".to_string(),
//! };
//! let ctx = user_friendly_error(anyhow::Error::from(error));
//! ctx.display(); // Shows colored error with suggestion
//!
//! let manual = ErrorContext::new(CottonError::Other {
//!     message: "nothing to render".to_string(),
//! })
//! .with_suggestion("Pass a template name");
//! println!("{manual}");
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

use crate::templating::TemplateError;

/// Failures of cotton operations.
#[derive(Error, Debug)]
pub enum CottonError {
    /// Compiling, loading or rendering a template failed
    #[error(transparent)]
    Template(#[from] TemplateError),

    /// A `--context` file is not a JSON object
    #[error("Invalid context file {path}: {reason}")]
    ContextParseError {
        /// Path of the context file
        path: String,
        /// Parser message or shape problem
        reason: String,
    },

    /// A `--var` argument without `=`
    #[error("Invalid variable assignment '{assignment}': expected KEY=VALUE")]
    InvalidVariable {
        /// The argument as given
        assignment: String,
    },

    /// Configuration file problems
    #[error("Configuration error: {message}")]
    ConfigError {
        message: String,
    },

    /// Reading or writing a file failed
    #[error("File system error during {operation}: {path}")]
    FileSystemError {
        /// What was being done, e.g. "writing output"
        operation: String,
        path: String,
    },

    /// Anything else, already formatted
    #[error("{message}")]
    Other {
        message: String,
    },
}

/// Error wrapper adding details and an actionable suggestion.
///
/// ```rust,no_run
/// use cotton::core::{CottonError, ErrorContext};
///
/// let context = ErrorContext::new(CottonError::ConfigError {
///     message: "max_depth must be positive".to_string(),
/// })
/// .with_suggestion("Set max_depth to a positive number in cotton.toml")
/// .with_details("max_depth limits how deeply components may nest");
///
/// context.display();
/// ```
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: CottonError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    #[must_use]
    pub const fn new(error: CottonError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error (shown in green).
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add details explaining the error (shown in yellow).
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print the error, details and suggestion to stderr with terminal colors.
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error to a user-friendly [`ErrorContext`] with actionable suggestions
///
/// Recognizes [`CottonError`], [`TemplateError`], [`std::io::Error`] and
/// [`toml::de::Error`] anywhere in the error chain; anything else is shown
/// with its full cause chain.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    let error = match error.downcast::<CottonError>() {
        Ok(cotton_error) => return create_error_context(cotton_error),
        Err(error) => error,
    };

    let error = match error.downcast::<TemplateError>() {
        Ok(template_error) => return create_error_context(CottonError::Template(template_error)),
        Err(error) => error,
    };

    if let Some(io_error) = error.downcast_ref::<std::io::Error>() {
        match io_error.kind() {
            std::io::ErrorKind::PermissionDenied => {
                return ErrorContext::new(CottonError::Other {
                    message: error_with_chain(&error),
                })
                .with_suggestion("Check file permissions and ownership")
                .with_details("cotton could not read or write a file it needed");
            }
            std::io::ErrorKind::NotFound => {
                return ErrorContext::new(CottonError::Other {
                    message: error_with_chain(&error),
                })
                .with_suggestion("Check that the file or directory exists and the path is correct");
            }
            _ => {}
        }
    }

    if error.downcast_ref::<toml::de::Error>().is_some() {
        return ErrorContext::new(CottonError::ConfigError {
            message: error_with_chain(&error),
        })
        .with_suggestion("Check the TOML syntax and key names in your configuration file")
        .with_details(
            "Valid keys are cotton_dir, template_dirs, autoescape, compile_html, cache_templates and max_depth",
        );
    }

    if error.downcast_ref::<serde_json::Error>().is_some() {
        return ErrorContext::new(CottonError::Other {
            message: error_with_chain(&error),
        })
        .with_suggestion("Context files must contain a single JSON object");
    }

    ErrorContext::new(CottonError::Other {
        message: error_with_chain(&error),
    })
}

/// Error message followed by its numbered causes.
fn error_with_chain(error: &anyhow::Error) -> String {
    let mut message = error.to_string();
    let chain: Vec<String> = error.chain().skip(1).map(std::string::ToString::to_string).collect();

    if !chain.is_empty() {
        message.push_str("\n\nCaused by:");
        for (i, cause) in chain.iter().enumerate() {
            message.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
    }
    message
}

/// Map each error to tailored suggestions and details.
fn create_error_context(error: CottonError) -> ErrorContext {
    let (suggestion, details) = match &error {
        CottonError::Template(template_error) => template_hints(template_error),
        CottonError::ContextParseError { .. } => (
            Some("Context files must contain a single JSON object, e.g. {\"title\": \"Home\"}".to_string()),
            Some("Multiple --context files are deep-merged in the order given".to_string()),
        ),
        CottonError::InvalidVariable { .. } => (
            Some("Use --var name=value, e.g. --var count=3 or --var title='Hello'".to_string()),
            Some("Values are parsed as literals (numbers, True/False, lists, dicts) and fall back to strings".to_string()),
        ),
        CottonError::ConfigError { .. } => (
            Some("Check cotton.toml or the file given with --config".to_string()),
            None,
        ),
        CottonError::FileSystemError { path, .. } => (
            Some(format!("Check that '{path}' is writable and its parent directory exists")),
            None,
        ),
        CottonError::Other { .. } => (None, None),
    };

    let mut context = ErrorContext::new(error);
    context.suggestion = suggestion;
    context.details = details;
    context
}

fn template_hints(error: &TemplateError) -> (Option<String>, Option<String>) {
    match error {
        TemplateError::MissingDynamicTarget { .. } => (
            Some("Add an is attribute, e.g. <c-component is=\"widgets.button\" /> or :is=\"variable\"".to_string()),
            Some("<c-component> renders the component named by its is attribute".to_string()),
        ),
        TemplateError::InvalidComponentPath { .. } => (
            Some("Component names may only use letters, digits, '.', '-' and '_'".to_string()),
            Some("Component paths are resolved inside the component directory and may not leave it".to_string()),
        ),
        TemplateError::InvalidTemplateName { .. } => (
            Some("Use a template name relative to one of the template directories".to_string()),
            None,
        ),
        TemplateError::TemplateNotFound {
            searched,
            suggestions,
            ..
        } => {
            let suggestion = if suggestions.is_empty() {
                "Create the template or add its directory with --template-dir".to_string()
            } else {
                format!("Did you mean: {}?", suggestions.join(", "))
            };
            let details = (!searched.is_empty()).then(|| {
                let dirs: Vec<String> = searched.iter().map(|dir| dir.display().to_string()).collect();
                format!("Searched: {}", dirs.join(", "))
            });
            (Some(suggestion), details)
        }
        TemplateError::Syntax { .. } => (
            Some(
                "Check that every <c-...> element, {% cotton_component %} and {% cotton_slot %} tag is closed \
                 and that for/if blocks around components are balanced"
                    .to_string(),
            ),
            None,
        ),
        TemplateError::Render { .. } => (
            Some("Check template syntax: variables use {{ var }}, control flow uses {% %}".to_string()),
            Some(
                "Template errors occur when Tera cannot render the template. Common issues:\n\
                 - Undefined variables (use the default filter or `is defined`)\n\
                 - Invalid filters or functions\n\
                 - Type mismatches in operations"
                    .to_string(),
            ),
        ),
        TemplateError::RecursionLimit { .. } => (
            Some("Check for a component that renders itself, or raise max_depth in cotton.toml".to_string()),
            None,
        ),
        TemplateError::InvalidContext { .. } => (
            Some("The render context must be a JSON object".to_string()),
            None,
        ),
        TemplateError::Io { .. } => (Some("Check that the template file is readable".to_string()), None),
    }
}

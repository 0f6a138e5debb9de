//! Core types shared by the CLI and library.
//!
//! # Modules
//!
//! ## `error` - Error Handling
//!
//! - [`CottonError`] - Failures of CLI operations, wrapping
//!   [`TemplateError`](crate::templating::TemplateError) for render failures
//! - [`ErrorContext`] - User-friendly error wrapper with suggestions and details
//! - [`user_friendly_error`] - Convert any error to user-friendly format
//!
//! Library code returns typed errors; command handlers work with
//! [`anyhow::Result`] and the binary turns whatever reaches `main` into an
//! [`ErrorContext`] printed in colour.

pub mod error;

pub use error::{CottonError, ErrorContext, user_friendly_error};

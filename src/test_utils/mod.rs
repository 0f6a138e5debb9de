//! Test utilities for cotton
//!
//! Helpers shared by unit and integration tests: once-only logging setup and
//! [`TemplateDir`], a temporary template root that cleans up after itself.
//!
//! # Example
//!
//! ```rust,no_run
//! use cotton::test_utils::TemplateDir;
//! use serde_json::json;
//!
//! let dir = TemplateDir::new()
//!     .unwrap()
//!     .with_template("cotton/badge.html", "<b>{{ slot }}</b>")
//!     .unwrap()
//!     .with_template("page.html", "<c-badge>{{ n }}</c-badge>")
//!     .unwrap();
//!
//! let html = dir.engine().render("page.html", &json!({"n": 3})).unwrap();
//! assert_eq!(html, "<b>3</b>");
//! ```

use std::path::{Path, PathBuf};
use std::sync::Once;

use anyhow::{Context, Result};
use tempfile::TempDir;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::config::CottonConfig;
use crate::templating::{Engine, FileSystemLoader};

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Only the first call has an effect. Uses `level` when given, otherwise
/// `RUST_LOG`; with neither, logging stays off.
///
/// ```bash
/// RUST_LOG=cotton=trace cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_ansi(true)
            .try_init();
    });
}

/// A temporary template root.
#[derive(Debug)]
pub struct TemplateDir {
    temp: TempDir,
}

impl TemplateDir {
    /// # Errors
    ///
    /// Returns an error if the temporary directory cannot be created.
    pub fn new() -> Result<Self> {
        let temp = TempDir::new().context("Failed to create temporary template directory")?;
        Ok(Self {
            temp,
        })
    }

    /// Builder form of [`TemplateDir::write`].
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn with_template(self, name: &str, content: &str) -> Result<Self> {
        self.write(name, content)?;
        Ok(self)
    }

    /// Write a template, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn write(&self, name: &str, content: &str) -> Result<PathBuf> {
        let path = self.temp.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        std::fs::write(&path, content).with_context(|| format!("Failed to write template: {}", path.display()))?;
        Ok(path)
    }

    pub fn path(&self) -> &Path {
        self.temp.path()
    }

    pub fn loader(&self) -> FileSystemLoader {
        FileSystemLoader::new([self.path().to_path_buf()])
    }

    /// Default configuration with this directory as the only template root.
    pub fn config(&self) -> CottonConfig {
        CottonConfig {
            template_dirs: vec![self.path().to_path_buf()],
            ..CottonConfig::default()
        }
    }

    pub fn engine(&self) -> Engine {
        Engine::new(self.config(), self.loader())
    }
}

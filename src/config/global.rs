//! Cotton configuration.
//!
//! Settings are read from a TOML file. Every key is optional:
//!
//! ```toml
//! # Directory (inside a template root) holding component templates
//! cotton_dir = "cotton"
//! # Template roots, searched in order
//! template_dirs = ["templates"]
//! # HTML-escape {{ }} output
//! autoescape = false
//! # Accept <c-...> element syntax
//! compile_html = true
//! # Keep compiled templates in memory
//! cache_templates = true
//! # Maximum component nesting depth
//! max_depth = 32
//! ```
//!
//! # Locations
//!
//! The first of these that applies is used:
//!
//! 1. An explicit path (`--config`)
//! 2. `COTTON_CONFIG_PATH`
//! 3. `./cotton.toml`
//! 4. `<config dir>/cotton/config.toml` (e.g. `~/.config/cotton/config.toml`)
//!
//! With none of them present the defaults apply. `COTTON_DIR` overrides
//! `cotton_dir` after loading.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::parse_config;
use crate::constants::{
    COTTON_CONFIG_PATH_ENV, COTTON_DIR_ENV, DEFAULT_COTTON_DIR, DEFAULT_MAX_DEPTH, DEFAULT_TEMPLATE_DIR,
    PROJECT_CONFIG_FILE,
};

/// Engine and CLI settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CottonConfig {
    /// Directory holding component templates, relative to a template root
    pub cotton_dir: String,

    /// Template roots searched by the filesystem loader, in order
    pub template_dirs: Vec<PathBuf>,

    /// HTML-escape `{{ }}` output unless marked `| safe`.
    ///
    /// With this on, component templates should output `slot` and `attrs`
    /// with `| safe`, since both are already rendered markup.
    pub autoescape: bool,

    /// Compile `<c-...>` element syntax before parsing
    pub compile_html: bool,

    /// Keep compiled templates for the lifetime of the engine
    pub cache_templates: bool,

    /// Maximum component nesting depth
    pub max_depth: usize,
}

impl Default for CottonConfig {
    fn default() -> Self {
        Self {
            cotton_dir: DEFAULT_COTTON_DIR.to_string(),
            template_dirs: vec![PathBuf::from(DEFAULT_TEMPLATE_DIR)],
            autoescape: false,
            compile_html: true,
            cache_templates: true,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl CottonConfig {
    /// Load configuration from the first applicable location, then apply
    /// environment overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicitly named file (argument or
    /// `COTTON_CONFIG_PATH`) is missing, or if the chosen file cannot be read
    /// or parsed.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = match Self::locate(explicit)? {
            Some(path) => {
                tracing::debug!("Loading configuration from {}", path.display());
                Self::load_from(&path)?
            }
            None => {
                tracing::debug!("No configuration file found, using defaults");
                Self::default()
            }
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse a configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid
    /// configuration TOML.
    pub fn load_from(path: &Path) -> Result<Self> {
        parse_config(path)
    }

    /// Path of the configuration file to use, if any.
    ///
    /// # Errors
    ///
    /// Returns an error when an explicitly requested file does not exist.
    pub fn locate(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
        if let Some(path) = explicit {
            return require_file(path, "--config");
        }

        if let Ok(env_path) = std::env::var(COTTON_CONFIG_PATH_ENV) {
            if !env_path.is_empty() {
                return require_file(Path::new(&env_path), COTTON_CONFIG_PATH_ENV);
            }
        }

        let project = PathBuf::from(PROJECT_CONFIG_FILE);
        if project.is_file() {
            return Ok(Some(project));
        }

        Ok(Self::user_config_path().filter(|path| path.is_file()))
    }

    /// Per-user configuration file, `<config dir>/cotton/config.toml`.
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("cotton").join("config.toml"))
    }

    /// Apply `COTTON_DIR`.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(dir) = std::env::var(COTTON_DIR_ENV) {
            if !dir.is_empty() {
                tracing::debug!("{} overrides cotton_dir: {}", COTTON_DIR_ENV, dir);
                self.cotton_dir = dir;
            }
        }
    }

    /// Serialize the effective configuration as TOML.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration")
    }
}

fn require_file(path: &Path, source: &str) -> Result<Option<PathBuf>> {
    if path.is_file() {
        Ok(Some(path.to_path_buf()))
    } else {
        anyhow::bail!("Config file {} (from {}) does not exist", path.display(), source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = CottonConfig::default();
        assert_eq!(config.cotton_dir, "cotton");
        assert_eq!(config.template_dirs, vec![PathBuf::from("templates")]);
        assert!(!config.autoescape);
        assert!(config.compile_html);
        assert!(config.cache_templates);
        assert_eq!(config.max_depth, 32);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("cotton.toml");
        std::fs::write(&path, "cotton_dir = \"components\"\nmax_depth = 8\n").unwrap();

        let config = CottonConfig::load_from(&path).unwrap();
        assert_eq!(config.cotton_dir, "components");
        assert_eq!(config.max_depth, 8);
        assert!(config.compile_html);
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("cotton.toml");
        std::fs::write(&path, "cotton_directory = \"x\"\n").unwrap();

        let err = CottonConfig::load_from(&path).unwrap_err();
        assert!(format!("{err:#}").contains("Failed to parse config file"));
    }

    #[test]
    fn test_toml_round_trip() {
        let config = CottonConfig {
            autoescape: true,
            template_dirs: vec![PathBuf::from("a"), PathBuf::from("b")],
            ..CottonConfig::default()
        };
        let parsed: CottonConfig = toml::from_str(&config.to_toml().unwrap()).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    #[serial]
    fn test_explicit_path_must_exist() {
        let err = CottonConfig::load(Some(Path::new("/nonexistent/cotton.toml"))).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    #[serial]
    fn test_env_path_and_dir_override() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("custom.toml");
        std::fs::write(&path, "cotton_dir = \"from-file\"\nautoescape = true\n").unwrap();

        // SAFETY: serialized with every other test touching the environment
        unsafe {
            std::env::set_var(COTTON_CONFIG_PATH_ENV, &path);
            std::env::set_var(COTTON_DIR_ENV, "from-env");
        }
        let config = CottonConfig::load(None);
        unsafe {
            std::env::remove_var(COTTON_CONFIG_PATH_ENV);
            std::env::remove_var(COTTON_DIR_ENV);
        }

        let config = config.unwrap();
        assert!(config.autoescape);
        assert_eq!(config.cotton_dir, "from-env");
    }
}

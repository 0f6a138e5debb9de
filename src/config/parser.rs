//! Generic configuration parsing utilities.
//!
//! TOML parsing for any `DeserializeOwned` configuration type, with the file
//! path attached to read and parse errors.
//!
//! ```rust,no_run
//! use cotton::config::parse_config;
//! use serde::Deserialize;
//! use std::path::Path;
//!
//! #[derive(Deserialize)]
//! struct SiteConfig {
//!     title: String,
//! }
//!
//! # fn example() -> anyhow::Result<()> {
//! let config: SiteConfig = parse_config(Path::new("site.toml"))?;
//! println!("Building {}", config.title);
//! # Ok(())
//! # }
//! ```
//!
//! Example error output:
//! ```text
//! Failed to parse config file: /path/to/cotton.toml
//! Caused by:
//!     invalid type: string "yes", expected a boolean
//! ```

use anyhow::{Context, Result};
use std::path::Path;

/// Parse a TOML configuration file into the specified type.
///
/// # Errors
///
/// Returns an error if the file cannot be read ("Failed to read config
/// file") or does not deserialize into `T` ("Failed to parse config file").
/// The underlying I/O or TOML error is preserved as the cause.
pub fn parse_config<T>(path: &Path) -> Result<T>
where
    T: serde::de::DeserializeOwned,
{
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: T = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[derive(Debug, serde::Deserialize)]
    struct TestConfig {
        name: String,
        value: i32,
    }

    #[test]
    fn test_parse_config() {
        let temp = tempdir().unwrap();
        let config_path = temp.path().join("test.toml");
        std::fs::write(&config_path, "name = \"test\"\nvalue = 42\n").unwrap();

        let config: TestConfig = parse_config(&config_path).unwrap();
        assert_eq!(config.name, "test");
        assert_eq!(config.value, 42);
    }

    #[test]
    fn test_parse_config_error_mentions_path() {
        let temp = tempdir().unwrap();
        let config_path = temp.path().join("invalid.toml");
        std::fs::write(&config_path, "invalid = toml {").unwrap();

        let err = parse_config::<TestConfig>(&config_path).unwrap_err();
        assert!(err.to_string().contains("invalid.toml"));
    }

    #[test]
    fn test_missing_file() {
        let temp = tempdir().unwrap();
        let err = parse_config::<TestConfig>(&temp.path().join("missing.toml")).unwrap_err();
        assert!(err.to_string().starts_with("Failed to read config file"));
    }
}

//! Integration test suite for cotton
//!
//! End-to-end tests against real template directories and the `cotton`
//! binary.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **cli**: `cotton render` and `cotton compile`
//! - **components**: filesystem-backed rendering through the engine
//! - **config**: configuration file discovery and overrides

mod cli;
mod components;
mod config;

use assert_cmd::Command;
use std::path::Path;

/// `cotton` run from `dir`, isolated from the user's configuration and
/// environment.
fn cotton_cmd(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("cotton").unwrap();
    cmd.current_dir(dir)
        .env("HOME", dir)
        .env("XDG_CONFIG_HOME", dir.join(".config"))
        .env("NO_COLOR", "1")
        .env_remove("COTTON_CONFIG_PATH")
        .env_remove("COTTON_DIR")
        .env_remove("RUST_LOG");
    cmd
}

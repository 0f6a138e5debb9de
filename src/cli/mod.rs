//! Command-line interface for cotton.
//!
//! # Available Commands
//!
//! - `render` - Render a template (and every component it uses) to stdout or a file
//! - `compile` - Print the tag syntax that `<c-...>` elements compile to
//!
//! # Global Options
//!
//! All commands support these global options:
//! - `--verbose` - Enable debug output
//! - `--quiet` - Suppress all output except errors
//! - `--config` - Path to a configuration file (see [`crate::config::CottonConfig`])
//!
//! # Example
//!
//! ```bash
//! # Render templates/pages/home.html with a JSON context
//! cotton render pages/home.html --context data.json --var title='Welcome'
//!
//! # Use another template root and component directory
//! cotton render index.html --template-dir site --cotton-dir components
//!
//! # Inspect what the HTML syntax turns into
//! cotton compile templates/pages/home.html
//! ```

mod compile;
mod render;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use crate::config::CottonConfig;

pub use compile::CompileCommand;
pub use render::RenderCommand;

/// Main CLI structure for cotton.
#[derive(Parser, Debug)]
#[command(
    name = "cotton",
    about = "HTML-like components for Tera templates",
    version,
    long_about = "cotton renders Tera templates that use reusable components, written as <c-name> elements \
                  or {% cotton_component %} tags, with attributes, dynamic attributes and named slots."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output (debug logging)
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only print errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to a configuration file
    ///
    /// Defaults to `COTTON_CONFIG_PATH`, then `./cotton.toml`, then the
    /// per-user configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render a template with its components
    Render(RenderCommand),

    /// Compile <c-...> element syntax into tag syntax
    Compile(CompileCommand),
}

impl Cli {
    /// Install logging, load configuration and run the selected command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded or the command fails.
    pub fn execute(self) -> Result<()> {
        self.init_logging();

        match self.command {
            Commands::Render(cmd) => {
                let config = CottonConfig::load(self.config.as_deref())?;
                cmd.execute(config)
            }
            Commands::Compile(cmd) => cmd.execute(),
        }
    }

    /// Log filter for the chosen verbosity; `RUST_LOG` applies when neither
    /// flag is given.
    #[must_use]
    pub fn log_filter(&self) -> EnvFilter {
        if self.verbose {
            EnvFilter::new("debug")
        } else if self.quiet {
            EnvFilter::new("error")
        } else {
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
        }
    }

    fn init_logging(&self) {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(self.log_filter())
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_render_command() {
        let cli = Cli::try_parse_from([
            "cotton",
            "-v",
            "render",
            "pages/home.html",
            "--template-dir",
            "a",
            "--template-dir",
            "b",
            "--var",
            "count=3",
        ])
        .unwrap();

        assert!(cli.verbose);
        match cli.command {
            Commands::Render(cmd) => {
                assert_eq!(cmd.name, "pages/home.html");
                assert_eq!(cmd.template_dirs, vec![PathBuf::from("a"), PathBuf::from("b")]);
                assert_eq!(cmd.vars, vec!["count=3".to_string()]);
            }
            Commands::Compile(_) => panic!("expected render"),
        }
    }

    #[test]
    fn test_global_config_after_subcommand() {
        let cli = Cli::try_parse_from(["cotton", "compile", "page.html", "--config", "x.toml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("x.toml")));
    }

    #[test]
    fn test_verbose_and_quiet_conflict() {
        assert!(Cli::try_parse_from(["cotton", "-v", "-q", "compile", "page.html"]).is_err());
    }

    #[test]
    fn test_log_filter_levels() {
        let cli = Cli::try_parse_from(["cotton", "-q", "compile", "page.html"]).unwrap();
        assert_eq!(cli.log_filter().to_string(), "error");

        let cli = Cli::try_parse_from(["cotton", "--verbose", "compile", "page.html"]).unwrap();
        assert_eq!(cli.log_filter().to_string(), "debug");
    }
}

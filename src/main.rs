//! cotton CLI entry point
//!
//! Parses arguments, runs the selected command and prints failures through
//! [`user_friendly_error`] before exiting with status 1.

use clap::Parser;
use cotton::cli;
use cotton::core::user_friendly_error;

fn main() {
    let cli = cli::Cli::parse();

    // Set up colored output for Windows
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    if let Err(e) = cli.execute() {
        let error_ctx = user_friendly_error(e);
        error_ctx.display();
        std::process::exit(1);
    }
}

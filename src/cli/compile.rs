//! Show the tag syntax a template's `<c-...>` elements compile to.

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use crate::templating::compile_html;

/// Command to compile HTML component syntax.
#[derive(Args, Debug)]
pub struct CompileCommand {
    /// Template file to compile
    pub(super) file: PathBuf,
}

impl CompileCommand {
    /// Print the compiled template to stdout.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or contains malformed
    /// component elements.
    pub fn execute(self) -> Result<()> {
        let source = std::fs::read_to_string(&self.file)
            .with_context(|| format!("Failed to read template: {}", self.file.display()))?;

        let compiled = compile_html(&self.file.display().to_string(), &source)?;
        print!("{compiled}");
        Ok(())
    }
}

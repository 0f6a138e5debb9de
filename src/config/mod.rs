//! Configuration for cotton.
//!
//! # Modules
//!
//! - `global` - [`CottonConfig`], its file locations and environment overrides
//! - `parser` - Generic TOML parsing with file path context

mod global;
mod parser;

pub use global::CottonConfig;
pub use parser::parse_config;

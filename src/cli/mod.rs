//! Command-line interface for news-forge.
//!
//! Runs the daily pipeline once and returns the rendered page.

mod commands;

pub use commands::{parse_cli, run_with_cli, Cli};

//! Subcommand handlers

pub mod config;
pub mod run;

use anyhow::{Context, Result};
use reviewload_config::{ConfigLoader, ReviewloadConfig};
use std::path::Path;

/// Load configuration from a file when given, otherwise from the environment
/// on top of the defaults
pub fn load_config(config_path: Option<&Path>) -> Result<ReviewloadConfig> {
    let loader = ConfigLoader::new();

    match config_path {
        Some(path) => loader
            .from_file(path)
            .with_context(|| format!("Failed to load configuration from {:?}", path)),
        None => loader
            .from_env()
            .context("Failed to load configuration from environment"),
    }
}

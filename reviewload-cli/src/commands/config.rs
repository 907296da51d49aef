//! `config validate` and `config generate`

use super::load_config;
use anyhow::{Context, Result};
use colored::Colorize;
use reviewload_config::ReviewloadConfig;
use std::fs;
use std::path::Path;
use tracing::{error, info};

/// Handle configuration validation
pub fn validate(config_file: &Path) -> Result<()> {
    info!("Validating configuration file: {:?}", config_file);

    if !config_file.exists() {
        return Err(anyhow::anyhow!(
            "Configuration file not found: {:?}",
            config_file
        ));
    }

    match load_config(Some(config_file)) {
        Ok(config) => {
            println!("{} Configuration file is valid", "✓".green());
            println!(
                "  target {}, {} ramp stages, {} seed teams",
                config.target.base_url,
                config.ramp.stages.len(),
                config.seed.teams.len()
            );
            Ok(())
        }
        Err(e) => {
            println!("{} Configuration validation failed: {:#}", "✗".red(), e);
            error!("Configuration validation failed: {:#}", e);
            Err(e)
        }
    }
}

/// Write the default configuration as YAML
pub fn generate(output: &Path, force: bool) -> Result<()> {
    info!("Generating configuration at: {:?}", output);

    if output.exists() && !force {
        return Err(anyhow::anyhow!(
            "Output file already exists: {:?}. Use --force to overwrite.",
            output
        ));
    }

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).context("Failed to create output directory")?;
    }

    let content =
        ReviewloadConfig::generate_sample().context("Failed to render default configuration")?;
    fs::write(output, content).context("Failed to write configuration file")?;

    println!("{} Configuration generated at: {:?}", "✓".green(), output);
    println!(
        "Validate with: reviewload config validate --config-file {:?}",
        output
    );
    Ok(())
}

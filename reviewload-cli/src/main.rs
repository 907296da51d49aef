use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;
use tracing::info;

mod cli;
mod commands;
mod logging;
mod summary;

use cli::{Cli, Commands, ConfigCommands};
use commands::run::RunOverrides;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Config { config_cmd } => {
            logging::init_logging(cli.log_level.as_deref(), &Default::default())?;
            match config_cmd {
                ConfigCommands::Validate { config_file } => commands::config::validate(&config_file)?,
                ConfigCommands::Generate { output, force } => {
                    commands::config::generate(&output, force)?
                }
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Run {
            base_url,
            seed,
            summary_export,
        } => {
            let config = commands::load_config(cli.config.as_deref())?;
            logging::init_logging(cli.log_level.as_deref(), &config.logging)?;
            info!("Reviewload starting");

            commands::run::run(
                config,
                RunOverrides {
                    base_url,
                    seed,
                    summary_export,
                },
            )
            .await
        }
    }
}

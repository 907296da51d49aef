//! CLI argument parsing definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about = "Load generator for the PR review service", long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Set the log level (trace, debug, info, warn, error)
    #[arg(long, value_name = "LEVEL", global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run setup, the ramped steady state and teardown against the target
    Run {
        /// Base URL of the service under test (overrides configuration)
        #[arg(long, value_name = "URL")]
        base_url: Option<String>,

        /// Seed for reproducible random draws
        #[arg(long, value_name = "N")]
        seed: Option<u64>,

        /// Write the JSON run report to this path
        #[arg(long, value_name = "PATH")]
        summary_export: Option<PathBuf>,
    },

    /// Configuration management commands
    Config {
        #[command(subcommand)]
        config_cmd: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Validate a configuration file
    Validate {
        /// Path to the configuration file
        #[arg(long, value_name = "PATH")]
        config_file: PathBuf,
    },

    /// Generate a configuration file with every default spelled out
    Generate {
        /// Output file path
        #[arg(long, value_name = "PATH")]
        output: PathBuf,

        /// Overwrite existing file
        #[arg(long)]
        force: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_arguments() {
        let cli = Cli::parse_from([
            "reviewload",
            "--log-level",
            "debug",
            "run",
            "--base-url",
            "http://service:8080",
            "--seed",
            "42",
        ]);
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        match cli.command {
            Commands::Run {
                base_url,
                seed,
                summary_export,
            } => {
                assert_eq!(base_url.as_deref(), Some("http://service:8080"));
                assert_eq!(seed, Some(42));
                assert!(summary_export.is_none());
            }
            Commands::Config { .. } => panic!("expected run command"),
        }
    }

    #[test]
    fn test_global_config_after_subcommand() {
        let cli = Cli::parse_from([
            "reviewload",
            "config",
            "generate",
            "--output",
            "out.yaml",
            "--config",
            "base.yaml",
        ]);
        assert_eq!(cli.config, Some(PathBuf::from("base.yaml")));
        assert!(matches!(
            cli.command,
            Commands::Config {
                config_cmd: ConfigCommands::Generate { force: false, .. }
            }
        ));
    }

    #[test]
    fn test_command_is_required() {
        assert!(Cli::try_parse_from(["reviewload"]).is_err());
    }
}

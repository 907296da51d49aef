//! Tracing subscriber bootstrap

use anyhow::Result;
use reviewload_config::domains::logging::LogFormat;
use reviewload_config::LoggingConfig;
use tracing_subscriber::EnvFilter;

/// Pick the filter directive: `--log-level` first, then `RUST_LOG`, then the
/// configured level.
pub fn resolve_filter(cli_level: Option<&str>, config: &LoggingConfig) -> EnvFilter {
    if let Some(level) = cli_level {
        return EnvFilter::try_new(level).unwrap_or_else(|_| {
            eprintln!("Invalid log level '{}', falling back to '{}'", level, config.level);
            EnvFilter::new(config.level.as_str())
        });
    }

    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.level.as_str()))
}

/// Install the global subscriber. A second call leaves the first in place.
pub fn init_logging(cli_level: Option<&str>, config: &LoggingConfig) -> Result<()> {
    let env_filter = resolve_filter(cli_level, config);
    let builder = tracing_subscriber::fmt().with_env_filter(env_filter);

    let result = match config.format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Text => builder.try_init(),
    };

    if let Err(e) = result {
        eprintln!("Tracing already initialized: {}", e);
    }
    Ok(())
}

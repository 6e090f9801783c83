use std::io::IsTerminal;

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::config::LoggingConfigFile;
use crate::error::ConfigError;

/// Installs the global `tracing` subscriber described by `config`.
///
/// Fails instead of panicking when a global subscriber is already set.
pub fn init_logging(config: &LoggingConfigFile) -> Result<(), ConfigError> {
    let env_filter =
        EnvFilter::try_new(&config.level).map_err(|e| ConfigError::InvalidValue {
            key: "logging.level".to_string(),
            reason: e.to_string(),
        })?;

    let is_terminal = std::io::stdout().is_terminal();

    let fmt_layer = match config.format.to_lowercase().as_str() {
        "json" => fmt::layer().json().with_target(true).boxed(),
        "compact" => fmt::layer()
            .compact()
            .with_ansi(is_terminal)
            .with_target(true)
            .boxed(),
        _ => fmt::layer()
            .pretty()
            .with_ansi(is_terminal)
            .with_target(true)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(env_filter)
        .try_init()
        .map_err(|e| ConfigError::SubscriberInit(e.to_string()))
}

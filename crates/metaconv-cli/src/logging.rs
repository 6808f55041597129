//! Logging setup for the CLI
//!
//! Builds a tracing subscriber from the CLI verbosity flags. `RUST_LOG`
//! takes precedence over the verbosity-derived level, so targeted module
//! filters keep working.

use crate::error::{Error, Result};
use tracing_subscriber::EnvFilter;

/// Logging configuration derived from CLI flags
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Log level filter
    pub level: String,
    /// Include file and line numbers
    pub source_location: bool,
}

impl LoggingConfig {
    /// Create logging config from verbosity level
    pub fn from_verbosity(verbosity: u8) -> Self {
        match verbosity {
            0 => Self {
                level: "warn".to_string(),
                source_location: false,
            },
            1 => Self {
                level: "info".to_string(),
                source_location: false,
            },
            2 => Self {
                level: "debug".to_string(),
                source_location: true,
            },
            _ => Self {
                level: "trace".to_string(),
                source_location: true,
            },
        }
    }
}

/// Initialize the global logging system
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| Error::other(format!("Invalid log filter: {e}")))?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_file(config.source_location)
        .with_line_number(config.source_location)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| Error::other(format!("Failed to initialize logging: {e}")))
}

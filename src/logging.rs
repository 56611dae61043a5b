//! Tracing setup for the binary.
//!
//! The TUI owns the terminal, so it logs to a file; report mode logs to stderr.

use color_eyre::eyre::eyre;
use color_eyre::Result;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;

/// Environment variable that overrides the configured filter, e.g. `ORDERDASH_LOG=orderdash=trace`.
pub const LOG_ENV: &str = "ORDERDASH_LOG";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    Stderr,
    File(PathBuf),
}

/// Filter directive from the config level, `--debug` forcing `debug`.
pub fn filter_directive(config: &LoggingConfig, debug: bool) -> String {
    if debug {
        "debug".to_string()
    } else {
        config.level.to_lowercase()
    }
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init(config: &LoggingConfig, debug: bool, target: &LogTarget) -> Result<()> {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(config, debug)));

    match target {
        LogTarget::Stderr => tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .try_init()
            .map_err(|e| eyre!("Failed to initialize logging: {}", e)),
        LogTarget::File(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_ansi(false)
                        .with_writer(Mutex::new(file)),
                )
                .try_init()
                .map_err(|e| eyre!("Failed to initialize logging: {}", e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_flag_wins() {
        let config = LoggingConfig {
            level: "WARN".to_string(),
            file: None,
        };
        assert_eq!(filter_directive(&config, false), "warn");
        assert_eq!(filter_directive(&config, true), "debug");
    }
}

//! Logging bootstrap.
//!
//! The terminal belongs to the UI, so log lines go to a daily rolling file.

use std::fs;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

use crate::config::LogConfig;

/// `RUST_LOG` when set, otherwise the configured default.
pub fn env_filter(config: &LogConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.default_filter))
}

/// Install the global subscriber. Keep the guard alive until shutdown or
/// buffered lines are lost.
pub fn init_logging(config: &LogConfig) -> Result<WorkerGuard> {
    fs::create_dir_all(&config.directory)
        .with_context(|| format!("creating log directory {}", config.directory.display()))?;

    let appender = tracing_appender::rolling::daily(&config.directory, &config.file_prefix);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    Registry::default()
        .with(env_filter(config))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true),
        )
        .try_init()
        .context("installing tracing subscriber")?;

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_applies_without_rust_log() {
        let config = LogConfig::default();
        if std::env::var("RUST_LOG").is_err() {
            assert_eq!(env_filter(&config).to_string(), "trendboard=info");
        }
    }
}

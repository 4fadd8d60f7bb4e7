use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Registry};

use crate::config::LogConfig;

/// Environment variable holding an `EnvFilter` directive.
pub const LOG_ENV: &str = "KOT_LOG";

/// Builds the filter: `KOT_LOG` wins, then `--verbose`, then the config level.
pub fn env_filter(config: &LogConfig, verbose: bool) -> EnvFilter {
    if let Ok(directive) = std::env::var(LOG_ENV) {
        if let Ok(filter) = EnvFilter::try_new(&directive) {
            return filter;
        }
    }
    let fallback = if verbose { "debug" } else { config.level.as_str() };
    EnvFilter::try_new(fallback).unwrap_or_else(|_| EnvFilter::new("warn"))
}

/// Installs the global subscriber writing to stderr. Returns false when a
/// subscriber was already installed.
pub fn init_logging(config: &LogConfig, verbose: bool) -> bool {
    let filter = env_filter(config, verbose);
    if config.json {
        Registry::default()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
            .is_ok()
    } else {
        Registry::default()
            .with(filter)
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .try_init()
            .is_ok()
    }
}

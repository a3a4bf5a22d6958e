//! Tracing subscriber setup
//!
//! Installs a global `tracing` subscriber built from [`LoggingConfig`]:
//! an `EnvFilter` (`RUST_LOG` wins over the configured level) feeding either
//! a compact or a JSON `fmt` layer.

use anistream_domain::{AniStreamError, LoggingConfig, Result};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Install the global subscriber
///
/// Returns `Ok(false)` when a subscriber was already installed, so calling it
/// more than once is harmless.
///
/// # Errors
/// Returns `AniStreamError::Config` if the filter directives do not parse.
pub fn init_tracing(config: &LoggingConfig) -> Result<bool> {
    let filter = match std::env::var(EnvFilter::DEFAULT_ENV) {
        Ok(directives) if !directives.trim().is_empty() => parse_filter(&directives)?,
        _ => parse_filter(&config.level)?,
    };

    let registry = tracing_subscriber::registry().with(filter);
    let installed = if config.json {
        registry.with(fmt::layer().json()).try_init().is_ok()
    } else {
        registry.with(fmt::layer().compact().with_target(true)).try_init().is_ok()
    };

    if installed {
        tracing::debug!(level = %config.level, json = config.json, "tracing initialised");
    }
    Ok(installed)
}

fn parse_filter(directives: &str) -> Result<EnvFilter> {
    EnvFilter::try_new(directives).map_err(|e| {
        AniStreamError::Config(format!("Invalid log filter '{}': {}", directives, e))
    })
}

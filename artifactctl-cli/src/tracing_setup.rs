//! Tracing setup for the artifactctl CLI
//!
//! Usage:
//!   artifactctl --debug ...                  # Debug logging to stderr
//!   RUST_LOG=artifactctl_core=debug ...      # Fine-grained log control
//!
//! Environment variables:
//!   RUST_LOG                                 # Log filter (default: info)

use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;

/// Tracing configuration options
#[derive(Debug, Clone, Default)]
pub struct TracingConfig {
    /// Enable debug logging (sets RUST_LOG=debug if not already set)
    pub debug: bool,
}

/// Initialize console tracing on stderr so stdout stays clean for `--json`
pub fn init(config: &TracingConfig) -> Result<()> {
    let filter = if config.debug {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(config.debug) // Show targets in debug mode
        .with_writer(std::io::stderr)
        .compact()
        .try_init()
        .map_err(|err| anyhow!(err))
}
